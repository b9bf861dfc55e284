//! PostgreSQL-backed [`MediaRepository`].
//!
//! A [`MediaPredicate`] becomes a boxed `image_meta` query: the visibility
//! clause first, then one equality per filter. Every value is a bound
//! parameter.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageWindow;

use crate::domain::ports::{MediaRepository, MediaRepositoryError};
use crate::domain::{
    AccountId, MediaId, MediaPredicate, MediaRecord, MediaType, NewMediaRecord, Visibility,
};

use super::error_mapping::map_diesel_error;
use super::models::{MediaMetadataUpdate, MediaRow, NewMediaRow};
use super::pool::{DbPool, PoolError};
use super::schema::image_meta;

/// Diesel implementation of [`MediaRepository`] over `image_meta`.
#[derive(Clone)]
pub struct DieselMediaRepository {
    pool: DbPool,
}

impl DieselMediaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MediaRepositoryError {
    MediaRepositoryError::connection(error.into_message())
}

fn map_error(error: diesel::result::Error, operation: &'static str) -> MediaRepositoryError {
    map_diesel_error(
        error,
        operation,
        MediaRepositoryError::query,
        MediaRepositoryError::connection,
    )
}

fn size_column(size: u64) -> Result<i64, MediaRepositoryError> {
    i64::try_from(size).map_err(|_| MediaRepositoryError::query(format!("size {size} out of range")))
}

fn row_to_record(row: MediaRow) -> Result<MediaRecord, MediaRepositoryError> {
    let media_type = MediaType::from_mime(&row.encoding).ok_or_else(|| {
        MediaRepositoryError::query(format!("row {} has unknown encoding {}", row.id, row.encoding))
    })?;
    let size = u64::try_from(row.size)
        .map_err(|_| MediaRepositoryError::query(format!("row {} has negative size", row.id)))?;
    Ok(MediaRecord {
        id: MediaId::new(row.id),
        owner: AccountId::new(row.uid),
        title: row.title,
        reference: row.reference,
        size,
        media_type,
        shareable: row.shareable,
    })
}

fn metadata_changes(title: &str, shareable: bool) -> MediaMetadataUpdate<'_> {
    MediaMetadataUpdate { title, shareable }
}

/// `SELECT ... FROM image_meta WHERE <visibility> AND <filters>`.
fn filtered(predicate: &MediaPredicate) -> image_meta::BoxedQuery<'static, Pg> {
    let mut query = image_meta::table.into_boxed();
    query = match predicate.visibility {
        Visibility::OwnedBy(caller) => query.filter(image_meta::uid.eq(caller.get())),
        Visibility::OwnedOrShareable(caller) => query.filter(
            image_meta::uid
                .eq(caller.get())
                .or(image_meta::shareable.eq(true)),
        ),
    };

    let filters = &predicate.filters;
    if let Some(id) = filters.id {
        query = query.filter(image_meta::id.eq(id.get()));
    }
    if let Some(owner) = filters.owner {
        query = query.filter(image_meta::uid.eq(owner.get()));
    }
    if let Some(title) = &filters.title {
        query = query.filter(image_meta::title.eq(title.clone()));
    }
    if let Some(encoding) = &filters.encoding {
        query = query.filter(image_meta::encoding.eq(encoding.clone()));
    }
    if let Some(shareable) = filters.shareable {
        query = query.filter(image_meta::shareable.eq(shareable));
    }
    query
}

#[async_trait]
impl MediaRepository for DieselMediaRepository {
    async fn insert(&self, record: &NewMediaRecord) -> Result<MediaRecord, MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewMediaRow {
            uid: record.owner.get(),
            title: &record.title,
            size: size_column(record.size)?,
            encoding: record.media_type.mime(),
            shareable: record.shareable,
        };
        let stored = diesel::insert_into(image_meta::table)
            .values(&row)
            .returning(MediaRow::as_returning())
            .get_result::<MediaRow>(&mut conn)
            .await
            .map_err(|err| map_error(err, "insert media"))?;
        row_to_record(stored)
    }

    async fn update_reference(
        &self,
        id: MediaId,
        reference: &str,
    ) -> Result<(), MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(image_meta::table.find(id.get()))
            .set(image_meta::reference.eq(reference))
            .execute(&mut conn)
            .await
            .map_err(|err| map_error(err, "update media reference"))?;
        if updated == 0 {
            return Err(MediaRepositoryError::missing(id.get()));
        }
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: MediaId,
        title: &str,
        shareable: bool,
    ) -> Result<MediaRecord, MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = diesel::update(image_meta::table.find(id.get()))
            .set(&metadata_changes(title, shareable))
            .returning(MediaRow::as_returning())
            .get_result::<MediaRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err, "update media metadata"))?
            .ok_or_else(|| MediaRepositoryError::missing(id.get()))?;
        row_to_record(stored)
    }

    async fn delete(&self, id: MediaId) -> Result<(), MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(image_meta::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| map_error(err, "delete media"))
    }

    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        image_meta::table
            .find(id.get())
            .select(MediaRow::as_select())
            .first::<MediaRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_error(err, "find media"))?
            .map(row_to_record)
            .transpose()
    }

    async fn count(&self, predicate: &MediaPredicate) -> Result<u64, MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total = filtered(predicate)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|err| map_error(err, "count media"))?;
        u64::try_from(total).map_err(|_| MediaRepositoryError::query("negative count"))
    }

    async fn select(
        &self,
        predicate: &MediaPredicate,
        window: PageWindow,
    ) -> Result<Vec<MediaRecord>, MediaRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = filtered(predicate)
            .order(image_meta::id.asc())
            .limit(window.limit())
            .offset(window.offset())
            .select(MediaRow::as_select())
            .load::<MediaRow>(&mut conn)
            .await
            .map_err(|err| map_error(err, "select media"))?;
        rows.into_iter().map(row_to_record).collect()
    }
}
