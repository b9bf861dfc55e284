//! Diesel row structs. Never exposed outside the persistence layer.

use diesel::prelude::*;

use super::schema::{image_meta, user_meta, user_pass};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_meta)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_meta)]
pub(crate) struct NewAccountRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_pass)]
pub(crate) struct NewCredentialRow<'a> {
    pub account_id: i64,
    pub digest: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = image_meta)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MediaRow {
    pub id: i64,
    pub uid: i64,
    pub title: String,
    pub reference: String,
    pub size: i64,
    pub encoding: String,
    pub shareable: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = image_meta)]
pub(crate) struct NewMediaRow<'a> {
    pub uid: i64,
    pub title: &'a str,
    pub size: i64,
    pub encoding: &'a str,
    pub shareable: bool,
}

/// Client-editable columns of an image row; excludes `ref`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = image_meta)]
pub(crate) struct MediaMetadataUpdate<'a> {
    pub title: &'a str,
    pub shareable: bool,
}
