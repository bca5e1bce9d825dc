//! Track CRUD with input validation.
//!
//! Deleting a track touches playlist membership and therefore lives on
//! [`crate::PlaylistService::delete_track`].

use sqlx::PgPool;
use tunehost_core::error::CoreError;
use tunehost_core::types::DbId;
use tunehost_core::validation::validate_input;
use tunehost_db::models::track::{CreateTrack, Track, UpdateTrack};
use tunehost_db::repositories::TrackRepo;

use crate::error::ServiceResult;

/// Largest page `list_tracks` will return.
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone)]
pub struct TrackService {
    pool: PgPool,
}

impl TrackService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_track(&self, input: &CreateTrack) -> ServiceResult<Track> {
        validate_input(input)?;
        let track = TrackRepo::create(&self.pool, input).await?;
        tracing::info!(track_id = track.id, "Created track");
        Ok(track)
    }

    pub async fn get_track(&self, id: DbId) -> ServiceResult<Track> {
        Ok(TrackRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::track_not_found(id))?)
    }

    /// One page of tracks ordered by id. `limit` is clamped to
    /// `1..=MAX_PAGE_SIZE`, a negative `offset` to zero.
    pub async fn list_tracks(&self, offset: i64, limit: i64) -> ServiceResult<Vec<Track>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(TrackRepo::list(&self.pool, offset.max(0), limit).await?)
    }

    pub async fn list_tracks_by_name(&self, name: &str) -> ServiceResult<Vec<Track>> {
        Ok(TrackRepo::list_by_name(&self.pool, name).await?)
    }

    pub async fn list_tracks_by_artist(&self, artist: &str) -> ServiceResult<Vec<Track>> {
        Ok(TrackRepo::list_by_artist(&self.pool, artist).await?)
    }

    pub async fn update_track(&self, id: DbId, input: &UpdateTrack) -> ServiceResult<Track> {
        validate_input(input)?;
        let track = TrackRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| CoreError::track_not_found(id))?;
        tracing::info!(track_id = id, "Updated track");
        Ok(track)
    }
}
