//! Read and write permissions over media records.
//!
//! Owners may read and modify their records. Anyone authenticated may read a
//! record flagged `shareable`. Nobody else may do either.

use tracing::debug;

use super::{AccountId, Error, MediaLocator, MediaRecord};

/// Pure permission checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// `caller` owns the record or the record is shareable.
    #[must_use]
    pub fn can_read(caller: AccountId, record: &MediaRecord) -> bool {
        caller == record.owner || record.shareable
    }

    /// `caller` owns the record.
    #[must_use]
    pub fn can_write(caller: AccountId, record: &MediaRecord) -> bool {
        caller == record.owner
    }

    /// Reject a path whose owner segment or extension disagrees with the
    /// stored record.
    ///
    /// Checked before either permission so a stale or forged path is
    /// reported as a bad request rather than a denial.
    pub fn ensure_locator_matches(locator: &MediaLocator, record: &MediaRecord) -> Result<(), Error> {
        if locator.owner != record.owner {
            debug!(
                path_owner = %locator.owner,
                record_owner = %record.owner,
                media_id = %record.id,
                "owner mismatch"
            );
            return Err(Error::invalid_request(
                "owner mismatch; check the image reference",
            ));
        }
        match locator.media_type {
            Some(requested) if requested != record.media_type => {
                debug!(
                    requested = %requested,
                    stored = %record.media_type,
                    media_id = %record.id,
                    "extension mismatch"
                );
                Err(Error::invalid_request(format!(
                    "image {} is stored as {}",
                    record.id,
                    record.media_type.extension()
                )))
            }
            _ => Ok(()),
        }
    }

    /// [`Self::can_read`] as a result.
    pub fn authorize_read(caller: AccountId, record: &MediaRecord) -> Result<(), Error> {
        if Self::can_read(caller, record) {
            Ok(())
        } else {
            Err(Error::unauthorized("this image is private"))
        }
    }

    /// [`Self::can_write`] as a result.
    pub fn authorize_write(caller: AccountId, record: &MediaRecord) -> Result<(), Error> {
        if Self::can_write(caller, record) {
            Ok(())
        } else {
            Err(Error::unauthorized(
                "you do not have permission to modify this image",
            ))
        }
    }
}
