//! Primitive aliases shared by every crate in the workspace.

/// Primary keys of `playlists` and `tracks` (PostgreSQL BIGSERIAL).
pub type DbId = i64;

/// Stored as TIMESTAMPTZ, always handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
