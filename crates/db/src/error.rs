//! Classification of raw `sqlx` errors into the storage failure kinds the
//! service layer reacts to.

/// PostgreSQL SQLSTATE codes we distinguish.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// A query expected a row and got none.
    NotFound,
    /// Duplicate key, e.g. a `(playlist_id, track_id)` pair inserted twice.
    UniqueViolation,
    /// Dangling reference, e.g. a join row pointing at a missing track.
    ForeignKeyViolation,
    /// A `CHECK` constraint rejected the row.
    CheckViolation,
    /// Transient conflict between concurrent transactions; safe to retry.
    SerializationFailure,
    /// Connection, pool or protocol failure.
    Other,
}

impl StorageErrorKind {
    /// Integrity violations are caller or logic defects, never retried.
    pub fn is_integrity_violation(self) -> bool {
        matches!(
            self,
            Self::UniqueViolation | Self::ForeignKeyViolation | Self::CheckViolation
        )
    }

    pub fn is_retryable(self) -> bool {
        self == Self::SerializationFailure
    }
}

/// Classify a `sqlx` error by variant and SQLSTATE.
pub fn classify(err: &sqlx::Error) -> StorageErrorKind {
    match err {
        sqlx::Error::RowNotFound => StorageErrorKind::NotFound,
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => StorageErrorKind::UniqueViolation,
            Some(FOREIGN_KEY_VIOLATION) => StorageErrorKind::ForeignKeyViolation,
            Some(CHECK_VIOLATION) => StorageErrorKind::CheckViolation,
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                StorageErrorKind::SerializationFailure
            }
            _ => StorageErrorKind::Other,
        },
        _ => StorageErrorKind::Other,
    }
}

/// Name of the violated constraint, when the database reported one.
pub fn constraint_name(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
