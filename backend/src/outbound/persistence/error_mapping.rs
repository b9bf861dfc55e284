//! Diesel error translation shared by the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Whether `error` is a unique-constraint violation.
pub(super) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Split Diesel failures into connection and query errors.
///
/// Database messages are logged at debug level and replaced by fixed text
/// so column values never reach callers.
pub(super) fn map_diesel_error<E>(
    error: DieselError,
    operation: &'static str,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "database error");
        }
        other => debug!(error = %other, operation, "diesel error"),
    }
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => connection(format!("{operation}: connection lost")),
        DieselError::NotFound => query(format!("{operation}: row not found")),
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            query(format!("{operation}: column conversion failed"))
        }
        _ => query(format!("{operation}: database error")),
    }
}
