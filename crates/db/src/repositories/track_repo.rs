//! Repository for the `tracks` table.

use sqlx::{PgConnection, PgExecutor, PgPool};
use tunehost_core::types::DbId;

use crate::models::track::{CreateTrack, Track, UpdateTrack};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, artist, url, likes, dislikes, created_at, updated_at";

/// Provides CRUD operations and existence checks for tracks.
pub struct TrackRepo;

impl TrackRepo {
    /// Insert a new track, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTrack) -> Result<Track, sqlx::Error> {
        let query = format!(
            "INSERT INTO tracks (name, artist, url, likes, dislikes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(&input.name)
            .bind(&input.artist)
            .bind(&input.url)
            .bind(input.likes)
            .bind(input.dislikes)
            .fetch_one(pool)
            .await
    }

    /// Find a track by its internal ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Track>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1");
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Single round trip existence check.
    pub async fn exists<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM tracks WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// Load every track whose id is in `ids`.
    ///
    /// Ids that do not resolve are skipped; callers that need all of them
    /// compare lengths. Ordered by id.
    pub async fn get_many<'e, E>(executor: E, ids: &[DbId]) -> Result<Vec<Track>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, Track>(&query)
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// Page through all tracks ordered by id.
    pub async fn list(pool: &PgPool, offset: i64, limit: i64) -> Result<Vec<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks ORDER BY id OFFSET $1 LIMIT $2");
        sqlx::query_as::<_, Track>(&query)
            .bind(offset)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// All tracks with exactly this name.
    pub async fn list_by_name(pool: &PgPool, name: &str) -> Result<Vec<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE name = $1 ORDER BY id");
        sqlx::query_as::<_, Track>(&query)
            .bind(name)
            .fetch_all(pool)
            .await
    }

    /// All tracks by exactly this artist.
    pub async fn list_by_artist(pool: &PgPool, artist: &str) -> Result<Vec<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE artist = $1 ORDER BY id");
        sqlx::query_as::<_, Track>(&query)
            .bind(artist)
            .fetch_all(pool)
            .await
    }

    /// Update a track. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrack,
    ) -> Result<Option<Track>, sqlx::Error> {
        let query = format!(
            "UPDATE tracks SET \
                name = COALESCE($2, name), \
                artist = COALESCE($3, artist), \
                url = COALESCE($4, url), \
                likes = COALESCE($5, likes), \
                dislikes = COALESCE($6, dislikes), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.artist)
            .bind(&input.url)
            .bind(input.likes)
            .bind(input.dislikes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a track and every membership row that references it.
    ///
    /// Run inside the caller's transaction. Playlists that lose the track get
    /// their `updated_at` refreshed. Returns `false` if the track does not
    /// exist, in which case nothing was written.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let touched = sqlx::query(
            "UPDATE playlists SET updated_at = NOW() \
             WHERE id IN (SELECT playlist_id FROM playlist_tracks WHERE track_id = $1)",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let unlinked = sqlx::query("DELETE FROM playlist_tracks WHERE track_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(
            track_id = id,
            playlists_touched = touched.rows_affected(),
            memberships_removed = unlinked.rows_affected(),
            found = result.rows_affected() > 0,
            "Deleted track rows"
        );
        Ok(result.rows_affected() > 0)
    }
}
