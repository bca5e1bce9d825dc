//! Integration tests for the track store.
//!
//! Exercises `TrackRepo` against a real database:
//! - CRUD (create, find_by_id, list, list_by_name, list_by_artist, update)
//! - Existence checks and partial bulk reads
//! - Deletion cascading into playlist membership

use sqlx::PgPool;
use tunehost_db::models::playlist::CreatePlaylist;
use tunehost_db::models::track::{CreateTrack, UpdateTrack};
use tunehost_db::repositories::{PlaylistRepo, TrackRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_track(name: &str, artist: &str) -> CreateTrack {
    CreateTrack {
        name: name.to_string(),
        artist: artist.to_string(),
        url: format!("https://media.example.com/{name}.mp3"),
        likes: 0,
        dislikes: 0,
    }
}

fn new_playlist(name: &str) -> CreatePlaylist {
    CreatePlaylist {
        name: name.to_string(),
        owner_user_id: 1,
    }
}

// ---------------------------------------------------------------------------
// Test: CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_crud(pool: PgPool) {
    let track = TrackRepo::create(&pool, &new_track("Intro", "Band"))
        .await
        .unwrap();
    assert_eq!(track.name, "Intro");
    assert_eq!(track.artist, "Band");
    assert_eq!(track.likes, 0);

    let found = TrackRepo::find_by_id(&pool, track.id)
        .await
        .unwrap()
        .expect("track should exist");
    assert_eq!(found, track);

    let updated = TrackRepo::update(
        &pool,
        track.id,
        &UpdateTrack {
            name: Some("Intro (Live)".to_string()),
            likes: Some(7),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .expect("update should return the row");
    assert_eq!(updated.name, "Intro (Live)");
    assert_eq!(updated.artist, "Band"); // unchanged
    assert_eq!(updated.likes, 7);
    assert!(updated.updated_at >= track.updated_at);

    let missing = TrackRepo::update(&pool, 999_999, &UpdateTrack::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_filters(pool: PgPool) {
    let a = TrackRepo::create(&pool, &new_track("One", "Alpha")).await.unwrap();
    let b = TrackRepo::create(&pool, &new_track("Two", "Alpha")).await.unwrap();
    let c = TrackRepo::create(&pool, &new_track("One", "Beta")).await.unwrap();

    let page = TrackRepo::list(&pool, 0, 2).await.unwrap();
    assert_eq!(page.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, b.id]);
    let rest = TrackRepo::list(&pool, 2, 10).await.unwrap();
    assert_eq!(rest.iter().map(|t| t.id).collect::<Vec<_>>(), vec![c.id]);

    let by_name = TrackRepo::list_by_name(&pool, "One").await.unwrap();
    assert_eq!(by_name.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, c.id]);

    let by_artist = TrackRepo::list_by_artist(&pool, "Alpha").await.unwrap();
    assert_eq!(by_artist.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_counters_cannot_go_negative(pool: PgPool) {
    let track = TrackRepo::create(&pool, &new_track("Solo", "Band")).await.unwrap();
    let result = TrackRepo::update(
        &pool,
        track.id,
        &UpdateTrack {
            dislikes: Some(-1),
            ..Default::default()
        },
    )
    .await;
    let err = result.expect_err("CHECK constraint should reject negative counters");
    assert_eq!(
        tunehost_db::error::classify(&err),
        tunehost_db::error::StorageErrorKind::CheckViolation
    );
}

// ---------------------------------------------------------------------------
// Test: existence and bulk reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exists(pool: PgPool) {
    let track = TrackRepo::create(&pool, &new_track("Here", "Band")).await.unwrap();
    assert!(TrackRepo::exists(&pool, track.id).await.unwrap());
    assert!(!TrackRepo::exists(&pool, track.id + 1000).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_many_returns_found_subset(pool: PgPool) {
    let a = TrackRepo::create(&pool, &new_track("A", "Band")).await.unwrap();
    let b = TrackRepo::create(&pool, &new_track("B", "Band")).await.unwrap();

    let tracks = TrackRepo::get_many(&pool, &[b.id, 424_242, a.id]).await.unwrap();
    assert_eq!(tracks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, b.id]);

    let none = TrackRepo::get_many(&pool, &[]).await.unwrap();
    assert!(none.is_empty());
}

// ---------------------------------------------------------------------------
// Test: deletion cascades into membership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_track_removes_memberships(pool: PgPool) {
    let keep = TrackRepo::create(&pool, &new_track("Keep", "Band")).await.unwrap();
    let gone = TrackRepo::create(&pool, &new_track("Gone", "Band")).await.unwrap();
    let playlist = PlaylistRepo::create(&pool, &new_playlist("Mix")).await.unwrap();
    PlaylistRepo::add_tracks(&pool, playlist.id, &[keep.id, gone.id])
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert!(TrackRepo::delete(&mut tx, gone.id).await.unwrap());
    tx.commit().await.unwrap();

    assert!(TrackRepo::find_by_id(&pool, gone.id).await.unwrap().is_none());
    let members = PlaylistRepo::track_ids(&pool, playlist.id).await.unwrap();
    assert_eq!(members, vec![keep.id]);

    let orphans: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM playlist_tracks WHERE track_id = $1")
            .bind(gone.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(orphans.0, 0);

    let touched = PlaylistRepo::find_by_id(&pool, playlist.id)
        .await
        .unwrap()
        .unwrap();
    assert!(touched.updated_at >= playlist.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_missing_track_returns_false(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    assert!(!TrackRepo::delete(&mut tx, 31_337).await.unwrap());
    tx.commit().await.unwrap();
}
