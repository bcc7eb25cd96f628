//! Error helpers for aero-store
//!
//! Maps SQLite and migration failures onto `StorageError`.

use aero_core::errors::{StorageError, StorageErrorKind};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type alias using StorageError
pub type Result<T> = std::result::Result<T, StorageError>;

/// Migration runner failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("migration {id} failed: {reason}")]
    Failed { id: String, reason: String },

    #[error("checksum mismatch for migration {id}: expected {expected}, found {found}")]
    ChecksumMismatch {
        id: String,
        expected: String,
        found: String,
    },

    /// The database was migrated by a newer build
    #[error("database records migration {id}, which this build does not know")]
    UnknownMigration { id: String },
}

impl From<MigrationError> for StorageError {
    fn from(err: MigrationError) -> Self {
        StorageError::new(StorageErrorKind::Migration)
            .with_op("migration")
            .with_message(err.to_string())
    }
}

/// Classify a rusqlite error raised by `op`
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> StorageError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => StorageErrorKind::Timeout,
            ErrorCode::ConstraintViolation => StorageErrorKind::ConstraintViolation,
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::SystemIoFailure
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::DiskFull => StorageErrorKind::Connection,
            _ => StorageErrorKind::Backend,
        },
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => StorageErrorKind::Serialization,
        _ => StorageErrorKind::Backend,
    };

    StorageError::new(kind)
        .with_op(op)
        .with_message(err.to_string())
}

/// Configuration could not be read or parsed
pub fn config_error(reason: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorKind::Serialization)
        .with_op("load_config")
        .with_message(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(code: ErrorCode, extended: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code,
                extended_code: extended,
            },
            None,
        )
    }

    #[test]
    fn test_busy_maps_to_timeout() {
        let err = from_rusqlite("save", sqlite_failure(ErrorCode::DatabaseBusy, 5));
        assert_eq!(err.kind(), StorageErrorKind::Timeout);
        assert_eq!(err.op(), Some("save"));
    }

    #[test]
    fn test_constraint_maps_to_constraint_violation() {
        let err = from_rusqlite("save", sqlite_failure(ErrorCode::ConstraintViolation, 19));
        assert_eq!(err.kind(), StorageErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_cannot_open_maps_to_connection() {
        let err = from_rusqlite("open", sqlite_failure(ErrorCode::CannotOpen, 14));
        assert_eq!(err.kind(), StorageErrorKind::Connection);
    }

    #[test]
    fn test_migration_error_converts() {
        let err: StorageError = MigrationError::UnknownMigration {
            id: "999_future".to_string(),
        }
        .into();
        assert_eq!(err.kind(), StorageErrorKind::Migration);
        assert!(err.message().contains("999_future"));
    }
}
