//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads and
//! single-statement writes accept any `PgExecutor`, so they run equally on
//! `&PgPool` or inside a caller's transaction (`&mut *tx`). Operations that
//! must be atomic on their own (cascading deletes) take `&PgPool` and open
//! their own transaction.

pub mod playlist_repo;
pub mod track_repo;

pub use playlist_repo::PlaylistRepo;
pub use track_repo::TrackRepo;
