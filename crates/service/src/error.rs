use tunehost_core::error::CoreError;
use tunehost_db::error::{classify, constraint_name, StorageErrorKind};

/// Error type returned by every [`crate::PlaylistService`] operation.
///
/// Domain failures (validation, not-found, integrity conflicts) arrive as
/// [`CoreError`]; connection and transaction failures pass through as the
/// original `sqlx` error.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage failure: {0}")]
    Storage(sqlx::Error),

    /// The operation's deadline expired before commit; nothing was persisted.
    #[error("Operation timed out")]
    Timeout,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// A transient conflict between concurrent transactions.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(err) if classify(err).is_retryable())
    }
}

/// Integrity violations become [`CoreError::Conflict`]; anything else is a
/// storage failure and is passed through unchanged.
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        let kind = classify(&err);
        if kind.is_integrity_violation() {
            let constraint = constraint_name(&err).unwrap_or("unknown");
            let what = match kind {
                StorageErrorKind::UniqueViolation => "duplicate value",
                StorageErrorKind::ForeignKeyViolation => "dangling reference",
                _ => "invalid value",
            };
            return Self::Core(CoreError::Conflict(format!(
                "{what} violates constraint {constraint}"
            )));
        }
        Self::Storage(err)
    }
}
