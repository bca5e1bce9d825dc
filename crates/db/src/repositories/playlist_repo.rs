//! Repository for the `playlists` and `playlist_tracks` tables.
//!
//! Membership primitives (`add_tracks`, `remove_tracks`) are single
//! statements meant to be composed inside the caller's transaction after
//! [`PlaylistRepo::lock_for_update`].

use sqlx::{PgConnection, PgExecutor, PgPool};
use tunehost_core::types::DbId;

use crate::models::playlist::{CreatePlaylist, Playlist, PlaylistWithTracks};

/// Column list for the `playlists` table.
const COLUMNS: &str = "id, name, owner_user_id, created_at, updated_at";

/// Playlist metadata joined with its aggregated, ascending member ids.
/// Callers append `WHERE` (optional) and `GROUP BY p.id`.
const WITH_TRACKS: &str = "SELECT p.id, p.name, p.owner_user_id, p.created_at, p.updated_at, \
     COALESCE(array_agg(pt.track_id ORDER BY pt.track_id) \
              FILTER (WHERE pt.track_id IS NOT NULL), '{}'::BIGINT[]) AS track_ids \
     FROM playlists p \
     LEFT JOIN playlist_tracks pt ON pt.playlist_id = p.id";

/// High 16 bits of every playlist advisory-lock key (ASCII "pl").
///
/// Keeps playlist locks out of the key space of other advisory-lock users
/// in the same database.
pub const PLAYLIST_LOCK_NAMESPACE: i64 = 0x706C << 48;

/// Advisory-lock key for a playlist. XOR is a bijection on `i64`, so two
/// playlists never share a key.
pub fn playlist_lock_key(playlist_id: DbId) -> i64 {
    PLAYLIST_LOCK_NAMESPACE ^ playlist_id
}

/// Provides CRUD operations for playlists and their track memberships.
pub struct PlaylistRepo;

impl PlaylistRepo {
    /// Insert a new playlist row. Membership is untouched.
    pub async fn create<'e, E>(executor: E, input: &CreatePlaylist) -> Result<Playlist, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO playlists (name, owner_user_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(&input.name)
            .bind(input.owner_user_id)
            .fetch_one(executor)
            .await
    }

    /// Find a playlist by its internal ID. Metadata only.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Playlist>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE id = $1");
        sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Metadata and membership of one playlist, read in a single statement.
    pub async fn find_with_tracks<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<PlaylistWithTracks>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{WITH_TRACKS} WHERE p.id = $1 GROUP BY p.id");
        sqlx::query_as::<_, PlaylistWithTracks>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all playlists with their members, ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<PlaylistWithTracks>, sqlx::Error> {
        let query = format!("{WITH_TRACKS} GROUP BY p.id ORDER BY p.id");
        sqlx::query_as::<_, PlaylistWithTracks>(&query)
            .fetch_all(pool)
            .await
    }

    /// List playlists owned by a user, ordered by id.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_user_id: DbId,
    ) -> Result<Vec<PlaylistWithTracks>, sqlx::Error> {
        let query =
            format!("{WITH_TRACKS} WHERE p.owner_user_id = $1 GROUP BY p.id ORDER BY p.id");
        sqlx::query_as::<_, PlaylistWithTracks>(&query)
            .bind(owner_user_id)
            .fetch_all(pool)
            .await
    }

    /// List playlists with exactly this name, ordered by id.
    pub async fn list_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Vec<PlaylistWithTracks>, sqlx::Error> {
        let query = format!("{WITH_TRACKS} WHERE p.name = $1 GROUP BY p.id ORDER BY p.id");
        sqlx::query_as::<_, PlaylistWithTracks>(&query)
            .bind(name)
            .fetch_all(pool)
            .await
    }

    /// Rename a playlist and refresh `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_metadata<'e, E>(
        executor: E,
        id: DbId,
        name: &str,
    ) -> Result<Option<Playlist>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE playlists SET name = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    /// Refresh `updated_at` after a membership-only change.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn touch<'e, E>(executor: E, id: DbId) -> Result<Option<Playlist>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE playlists SET updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Playlist>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Delete a playlist and all of its membership rows.
    ///
    /// Run inside the caller's transaction: the playlist's advisory lock is
    /// taken first, so an in-flight membership update finishes (or sees the
    /// deletion) before rows disappear. Returns `false` if the playlist does
    /// not exist, in which case nothing was deleted.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        Self::lock_for_update(&mut *conn, id).await?;

        let unlinked = sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(
            playlist_id = id,
            memberships_removed = unlinked.rows_affected(),
            found = result.rows_affected() > 0,
            "Deleted playlist rows"
        );
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Member track ids of a playlist, ascending. Empty when it has none.
    pub async fn track_ids<'e, E>(executor: E, playlist_id: DbId) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, DbId>(
            "SELECT track_id FROM playlist_tracks WHERE playlist_id = $1 ORDER BY track_id",
        )
        .bind(playlist_id)
        .fetch_all(executor)
        .await
    }

    /// Insert one join row per id in a single statement.
    ///
    /// A pair that already exists fails with a unique violation and a
    /// missing track with a foreign-key violation; either way no row from
    /// this call is kept. Returns the number of rows inserted.
    pub async fn add_tracks<'e, E>(
        executor: E,
        playlist_id: DbId,
        track_ids: &[DbId],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if track_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO playlist_tracks (playlist_id, track_id) \
             SELECT $1, t.track_id FROM UNNEST($2::BIGINT[]) AS t(track_id)",
        )
        .bind(playlist_id)
        .bind(track_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete the join rows for the given ids. Absent pairs are ignored.
    ///
    /// Returns the number of rows deleted.
    pub async fn remove_tracks<'e, E>(
        executor: E,
        playlist_id: DbId,
        track_ids: &[DbId],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if track_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM playlist_tracks \
             WHERE playlist_id = $1 AND track_id = ANY($2)",
        )
        .bind(playlist_id)
        .bind(track_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Block until this transaction holds the playlist's advisory lock.
    ///
    /// The lock is transaction-scoped: it is released on commit or rollback.
    /// Keys come from [`playlist_lock_key`], so distinct playlists never
    /// contend.
    pub async fn lock_for_update<'e, E>(executor: E, playlist_id: DbId) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(playlist_lock_key(playlist_id))
            .execute(executor)
            .await?;
        Ok(())
    }
}
