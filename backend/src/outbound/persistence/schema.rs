//! Diesel table definitions.
//!
//! Must match `migrations/` exactly; regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// Registered accounts.
    user_meta (id) {
        id -> Int8,
        first_name -> Text,
        last_name -> Text,
        /// Unique login identifier.
        email -> Text,
    }
}

diesel::table! {
    /// bcrypt digests, one per account.
    user_pass (account_id) {
        account_id -> Int8,
        digest -> Text,
    }
}

diesel::table! {
    /// Image metadata. Bytes live in the blob store.
    image_meta (id) {
        id -> Int8,
        /// Owner account id.
        uid -> Int8,
        title -> Text,
        /// Public locator; empty until the insert is followed by an update.
        #[sql_name = "ref"]
        reference -> Text,
        size -> Int8,
        /// MIME type.
        encoding -> Text,
        shareable -> Bool,
    }
}

diesel::joinable!(user_pass -> user_meta (account_id));
diesel::allow_tables_to_appear_in_same_query!(user_meta, user_pass);
