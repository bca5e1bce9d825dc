use crate::types::DbId;

/// Domain errors surfaced to callers of the playlist core.
///
/// Storage failures (connections, transactions) are not represented here;
/// the service layer passes them through as their original error.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage-level integrity violation (duplicate pair, dangling reference).
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    pub fn playlist_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Playlist",
            id,
        }
    }

    pub fn track_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "Track",
            id,
        }
    }
}
