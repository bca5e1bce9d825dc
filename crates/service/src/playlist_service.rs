//! Playlist orchestration: validation, membership reconciliation and the
//! transactional application of the resulting diff.
//!
//! Every membership-mutating operation runs as
//! `BEGIN -> advisory lock -> read -> reconcile -> validate -> write -> COMMIT`.
//! The lock is taken before the existing membership is read, so two
//! concurrent updates of one playlist never diff against a stale set.
//! Any error before `COMMIT` drops the transaction, which rolls it back.
//! The operation deadline covers everything up to `COMMIT` but not the
//! commit itself, so a `Timeout` always means nothing was persisted.

use std::collections::BTreeSet;
use std::future::Future;

use serde::Serialize;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tunehost_core::error::CoreError;
use tunehost_core::membership::{self, MembershipDiff};
use tunehost_core::types::DbId;
use tunehost_core::validation::{unknown_track_error, validate_playlist_name};
use tunehost_db::models::playlist::{CreatePlaylist, Playlist, PlaylistWithTracks};
use tunehost_db::models::track::Track;
use tunehost_db::repositories::{PlaylistRepo, TrackRepo};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// An attempt's uncommitted transaction and the value it will return once
/// committed.
type Staged<T> = (Transaction<'static, Postgres>, T);

/// Result of a membership-changing operation.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistUpdate {
    /// The playlist as persisted after the operation.
    pub playlist: PlaylistWithTracks,
    /// The diff that was applied. Empty when the call was a no-op.
    pub diff: MembershipDiff,
}

/// The three ways membership can be changed.
enum MembershipEdit<'a> {
    /// Full replacement, together with the playlist name.
    Replace { name: &'a str, desired: &'a [DbId] },
    Add(&'a [DbId]),
    Remove(&'a [DbId]),
}

impl MembershipEdit<'_> {
    fn diff(&self, existing: &[DbId]) -> MembershipDiff {
        match self {
            Self::Replace { desired, .. } => membership::reconcile(existing, desired),
            Self::Add(ids) => membership::additions(existing, ids),
            Self::Remove(ids) => membership::removals(existing, ids),
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Replace { name, .. } => Some(name),
            Self::Add(_) | Self::Remove(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistService {
    pool: PgPool,
    config: ServiceConfig,
}

impl PlaylistService {
    pub fn new(pool: PgPool, config: ServiceConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a playlist with an initial (possibly empty) track set.
    ///
    /// Duplicate ids collapse. Every id must name an existing track.
    pub async fn create_playlist(
        &self,
        name: &str,
        owner_user_id: DbId,
        track_ids: &[DbId],
    ) -> ServiceResult<PlaylistWithTracks> {
        validate_playlist_name(name)?;
        let desired = membership::dedup_ids(track_ids);

        let created = self
            .run_atomic("create_playlist", || {
                self.insert_playlist(name, owner_user_id, &desired)
            })
            .await?;

        tracing::info!(
            playlist_id = created.playlist.id,
            owner_user_id,
            tracks = created.track_ids.len(),
            "Created playlist"
        );
        Ok(created)
    }

    /// Metadata plus membership of a single playlist.
    pub async fn get_playlist(&self, id: DbId) -> ServiceResult<PlaylistWithTracks> {
        let playlist = PlaylistRepo::find_with_tracks(&self.pool, id)
            .await?
            .ok_or_else(|| CoreError::playlist_not_found(id))?;
        Ok(playlist)
    }

    /// The playlist's member tracks as full records, ordered by id.
    pub async fn get_playlist_tracks(&self, id: DbId) -> ServiceResult<Vec<Track>> {
        let playlist = self.get_playlist(id).await?;
        Ok(TrackRepo::get_many(&self.pool, &playlist.track_ids).await?)
    }

    pub async fn list_playlists(&self) -> ServiceResult<Vec<PlaylistWithTracks>> {
        Ok(PlaylistRepo::list(&self.pool).await?)
    }

    pub async fn list_playlists_by_owner(
        &self,
        owner_user_id: DbId,
    ) -> ServiceResult<Vec<PlaylistWithTracks>> {
        Ok(PlaylistRepo::list_by_owner(&self.pool, owner_user_id).await?)
    }

    pub async fn list_playlists_by_name(
        &self,
        name: &str,
    ) -> ServiceResult<Vec<PlaylistWithTracks>> {
        Ok(PlaylistRepo::list_by_name(&self.pool, name).await?)
    }

    /// Metadata-only update. A single statement, so no explicit transaction.
    pub async fn rename_playlist(&self, id: DbId, name: &str) -> ServiceResult<Playlist> {
        validate_playlist_name(name)?;
        let playlist = PlaylistRepo::update_metadata(&self.pool, id, name)
            .await?
            .ok_or_else(|| CoreError::playlist_not_found(id))?;
        tracing::info!(playlist_id = id, "Renamed playlist");
        Ok(playlist)
    }

    /// Replace a playlist's name and full membership.
    ///
    /// Only the difference between the stored and the desired set is
    /// written. When both the set and the name are unchanged nothing is
    /// written at all. On any failure the persisted playlist is unchanged.
    pub async fn update_playlist(
        &self,
        id: DbId,
        name: &str,
        desired_track_ids: &[DbId],
    ) -> ServiceResult<PlaylistUpdate> {
        validate_playlist_name(name)?;
        let edit = MembershipEdit::Replace {
            name,
            desired: desired_track_ids,
        };
        self.edit_membership("update_playlist", id, &edit).await
    }

    /// Add tracks that are not yet members. Existing members are ignored.
    pub async fn add_tracks(&self, id: DbId, track_ids: &[DbId]) -> ServiceResult<PlaylistUpdate> {
        self.edit_membership("add_tracks", id, &MembershipEdit::Add(track_ids))
            .await
    }

    /// Remove tracks that are members. Non-members are ignored.
    pub async fn remove_tracks(
        &self,
        id: DbId,
        track_ids: &[DbId],
    ) -> ServiceResult<PlaylistUpdate> {
        self.edit_membership("remove_tracks", id, &MembershipEdit::Remove(track_ids))
            .await
    }

    /// Delete a playlist together with all of its membership rows.
    pub async fn delete_playlist(&self, id: DbId) -> ServiceResult<()> {
        let deleted = self
            .run_atomic("delete_playlist", || async move {
                let mut tx = self.pool.begin().await?;
                let deleted = PlaylistRepo::delete(&mut tx, id).await?;
                Ok::<_, ServiceError>((tx, deleted))
            })
            .await?;
        if !deleted {
            return Err(CoreError::playlist_not_found(id).into());
        }
        tracing::info!(playlist_id = id, "Deleted playlist");
        Ok(())
    }

    /// Delete a track, removing it from every playlist that contains it.
    pub async fn delete_track(&self, id: DbId) -> ServiceResult<()> {
        let deleted = self
            .run_atomic("delete_track", || async move {
                let mut tx = self.pool.begin().await?;
                let deleted = TrackRepo::delete(&mut tx, id).await?;
                Ok::<_, ServiceError>((tx, deleted))
            })
            .await?;
        if !deleted {
            return Err(CoreError::track_not_found(id).into());
        }
        tracing::info!(track_id = id, "Deleted track");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Run one transactional attempt per call of `attempt`, retrying only on
    /// serialization conflicts, then commit the surviving attempt.
    ///
    /// The deadline bounds the attempts but not the final `COMMIT`: expiry
    /// drops the in-flight attempt and with it its uncommitted transaction,
    /// while a commit that has been sent is always awaited.
    async fn run_atomic<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> ServiceResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ServiceResult<Staged<T>>>,
    {
        let max_retries = self.config.max_retries;
        let retrying = async {
            let mut tries: u32 = 0;
            loop {
                match attempt().await {
                    Err(err) if err.is_retryable() && tries < max_retries => {
                        tries += 1;
                        tracing::warn!(op, attempt = tries, error = %err, "Transaction conflict, retrying");
                    }
                    result => return result,
                }
            }
        };

        let (tx, value) = match tokio::time::timeout(self.config.op_timeout, retrying).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(op, timeout = ?self.config.op_timeout, "Operation deadline exceeded");
                return Err(ServiceError::Timeout);
            }
        };
        tx.commit().await?;
        Ok(value)
    }

    async fn edit_membership(
        &self,
        op: &'static str,
        id: DbId,
        edit: &MembershipEdit<'_>,
    ) -> ServiceResult<PlaylistUpdate> {
        let update = self.run_atomic(op, || self.apply_edit(id, edit)).await?;
        if update.diff.is_empty() {
            tracing::debug!(playlist_id = id, op, "Playlist membership already up to date");
        } else {
            tracing::info!(
                playlist_id = id,
                op,
                to_add = update.diff.to_add.len(),
                to_remove = update.diff.to_remove.len(),
                "Applied playlist membership diff"
            );
        }
        Ok(update)
    }

    async fn insert_playlist(
        &self,
        name: &str,
        owner_user_id: DbId,
        track_ids: &[DbId],
    ) -> ServiceResult<Staged<PlaylistWithTracks>> {
        let mut tx = self.pool.begin().await?;

        let input = CreatePlaylist {
            name: name.to_string(),
            owner_user_id,
        };
        let playlist = PlaylistRepo::create(&mut *tx, &input).await?;

        ensure_tracks_exist(&mut tx, track_ids).await?;
        PlaylistRepo::add_tracks(&mut *tx, playlist.id, track_ids).await?;

        let created = PlaylistWithTracks {
            playlist,
            track_ids: track_ids.to_vec(),
        };
        Ok((tx, created))
    }

    /// Stage one membership edit. A no-op stages a transaction with no
    /// writes, so committing it leaves `updated_at` untouched.
    async fn apply_edit(
        &self,
        id: DbId,
        edit: &MembershipEdit<'_>,
    ) -> ServiceResult<Staged<PlaylistUpdate>> {
        let mut tx = self.pool.begin().await?;
        PlaylistRepo::lock_for_update(&mut *tx, id).await?;

        let playlist = PlaylistRepo::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::playlist_not_found(id))?;
        let existing = PlaylistRepo::track_ids(&mut *tx, id).await?;

        let diff = edit.diff(&existing);
        let rename = edit.name().filter(|name| *name != playlist.name);

        if diff.is_empty() && rename.is_none() {
            let unchanged = PlaylistUpdate {
                playlist: PlaylistWithTracks {
                    playlist,
                    track_ids: existing,
                },
                diff,
            };
            return Ok((tx, unchanged));
        }

        ensure_tracks_exist(&mut tx, &diff.to_add).await?;

        let playlist = match rename {
            Some(name) => PlaylistRepo::update_metadata(&mut *tx, id, name).await?,
            None => PlaylistRepo::touch(&mut *tx, id).await?,
        }
        .ok_or_else(|| CoreError::playlist_not_found(id))?;

        PlaylistRepo::remove_tracks(&mut *tx, id, &diff.to_remove).await?;
        PlaylistRepo::add_tracks(&mut *tx, id, &diff.to_add).await?;

        let update = PlaylistUpdate {
            playlist: PlaylistWithTracks {
                playlist,
                track_ids: apply_diff(&existing, &diff),
            },
            diff,
        };
        Ok((tx, update))
    }
}

/// Fail with a validation error on the first id with no track row.
async fn ensure_tracks_exist(conn: &mut PgConnection, track_ids: &[DbId]) -> ServiceResult<()> {
    for &track_id in track_ids {
        if !TrackRepo::exists(&mut *conn, track_id).await? {
            tracing::debug!(track_id, "Rejected reference to unknown track");
            return Err(unknown_track_error(track_id).into());
        }
    }
    Ok(())
}

/// Membership after applying `diff` to `existing`, ascending.
fn apply_diff(existing: &[DbId], diff: &MembershipDiff) -> Vec<DbId> {
    let mut set: BTreeSet<DbId> = existing.iter().copied().collect();
    for id in &diff.to_remove {
        set.remove(id);
    }
    set.extend(diff.to_add.iter().copied());
    set.into_iter().collect()
}
