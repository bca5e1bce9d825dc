//! Playlist entity model and DTOs.
//!
//! Membership is not a column: it lives in the `playlist_tracks` join table
//! and is aggregated into [`PlaylistWithTracks`] when read together.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tunehost_core::types::{DbId, Timestamp};

/// A row from the `playlists` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Playlist {
    pub id: DbId,
    pub name: String,
    pub owner_user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A playlist together with its member track ids (sorted, duplicate-free).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PlaylistWithTracks {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub playlist: Playlist,
    pub track_ids: Vec<DbId>,
}

/// DTO for creating a new playlist row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
    pub owner_user_id: DbId,
}
