//! In-memory media metadata repository.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use pagination::PageWindow;

use super::lock;
use crate::domain::ports::{MediaRepository, MediaRepositoryError};
use crate::domain::{AccountId, MediaId, MediaPredicate, MediaRecord, NewMediaRecord};

/// Media repository operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaOp {
    Insert,
    UpdateReference,
    UpdateMetadata,
    Delete,
    FindById,
    Count,
    Select,
}

#[derive(Default)]
struct MediaState {
    rows: BTreeMap<MediaId, MediaRecord>,
    last_id: i64,
    failing: HashSet<MediaOp>,
}

/// Media table ordered by id, evaluating predicates in memory.
#[derive(Default)]
pub struct InMemoryMediaRepository(Mutex<MediaState>);

impl InMemoryMediaRepository {
    /// Make every later call to `op` fail with a query error.
    pub fn fail_on(&self, op: MediaOp) {
        lock(&self.0).failing.insert(op);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        lock(&self.0).failing.clear();
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn seed(&self, record: NewMediaRecord) -> MediaRecord {
        let mut state = lock(&self.0);
        state.last_id += 1;
        let stored = record.into_record(MediaId::new(state.last_id));
        state.rows.insert(stored.id, stored.clone());
        stored
    }

    /// Snapshot of every row in id order.
    pub fn records(&self) -> Vec<MediaRecord> {
        lock(&self.0).rows.values().cloned().collect()
    }

    /// Number of rows owned by `owner`.
    pub fn count_owned_by(&self, owner: AccountId) -> usize {
        lock(&self.0)
            .rows
            .values()
            .filter(|row| row.owner == owner)
            .count()
    }

    fn check(&self, op: MediaOp) -> Result<(), MediaRepositoryError> {
        if lock(&self.0).failing.contains(&op) {
            Err(MediaRepositoryError::query(format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn insert(&self, record: &NewMediaRecord) -> Result<MediaRecord, MediaRepositoryError> {
        self.check(MediaOp::Insert)?;
        Ok(self.seed(record.clone()))
    }

    async fn update_reference(
        &self,
        id: MediaId,
        reference: &str,
    ) -> Result<(), MediaRepositoryError> {
        self.check(MediaOp::UpdateReference)?;
        let mut state = lock(&self.0);
        let row = state
            .rows
            .get_mut(&id)
            .ok_or_else(|| MediaRepositoryError::missing(id.get()))?;
        reference.clone_into(&mut row.reference);
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: MediaId,
        title: &str,
        shareable: bool,
    ) -> Result<MediaRecord, MediaRepositoryError> {
        self.check(MediaOp::UpdateMetadata)?;
        let mut state = lock(&self.0);
        let row = state
            .rows
            .get_mut(&id)
            .ok_or_else(|| MediaRepositoryError::missing(id.get()))?;
        title.clone_into(&mut row.title);
        row.shareable = shareable;
        Ok(row.clone())
    }

    async fn delete(&self, id: MediaId) -> Result<(), MediaRepositoryError> {
        self.check(MediaOp::Delete)?;
        lock(&self.0).rows.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: MediaId) -> Result<Option<MediaRecord>, MediaRepositoryError> {
        self.check(MediaOp::FindById)?;
        Ok(lock(&self.0).rows.get(&id).cloned())
    }

    async fn count(&self, predicate: &MediaPredicate) -> Result<u64, MediaRepositoryError> {
        self.check(MediaOp::Count)?;
        let matching = lock(&self.0)
            .rows
            .values()
            .filter(|row| predicate.matches(row))
            .count();
        Ok(u64::try_from(matching).unwrap_or(u64::MAX))
    }

    async fn select(
        &self,
        predicate: &MediaPredicate,
        window: PageWindow,
    ) -> Result<Vec<MediaRecord>, MediaRepositoryError> {
        self.check(MediaOp::Select)?;
        let Some((offset, limit)) = window.as_range_bounds() else {
            return Ok(Vec::new());
        };
        Ok(lock(&self.0)
            .rows
            .values()
            .filter(|row| predicate.matches(row))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
