//! Integration tests for `TrackService`.

use assert_matches::assert_matches;
use sqlx::PgPool;
use tunehost_core::error::CoreError;
use tunehost_db::models::track::{CreateTrack, UpdateTrack};
use tunehost_service::{ServiceError, TrackService};

fn new_track(name: &str, artist: &str, url: &str) -> CreateTrack {
    CreateTrack {
        name: name.to_string(),
        artist: artist.to_string(),
        url: url.to_string(),
        likes: 0,
        dislikes: 0,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_get(pool: PgPool) {
    let svc = TrackService::new(pool);
    let track = svc
        .create_track(&new_track("Halo", "Choir", "https://media.example.com/halo.mp3"))
        .await
        .unwrap();
    assert_eq!(svc.get_track(track.id).await.unwrap(), track);
    assert_matches!(
        svc.get_track(track.id + 1).await,
        Err(ServiceError::Core(CoreError::NotFound { entity: "Track", .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_invalid_fields(pool: PgPool) {
    let svc = TrackService::new(pool.clone());

    for input in [
        new_track("", "Choir", "https://media.example.com/a.mp3"),
        new_track("Halo", "", "https://media.example.com/a.mp3"),
        new_track("Halo", "Choir", "not a url"),
        CreateTrack {
            likes: -1,
            ..new_track("Halo", "Choir", "https://media.example.com/a.mp3")
        },
    ] {
        assert_matches!(
            svc.create_track(&input).await,
            Err(ServiceError::Core(CoreError::Validation(_)))
        );
    }
    assert!(svc.list_tracks(0, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_listing(pool: PgPool) {
    let svc = TrackService::new(pool);
    let a = svc
        .create_track(&new_track("A", "Duo", "https://media.example.com/a.mp3"))
        .await
        .unwrap();
    let b = svc
        .create_track(&new_track("B", "Duo", "https://media.example.com/b.mp3"))
        .await
        .unwrap();

    let updated = svc
        .update_track(
            a.id,
            &UpdateTrack {
                dislikes: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.dislikes, 2);

    assert_matches!(
        svc.update_track(a.id, &UpdateTrack {
            url: Some("nope".to_string()),
            ..Default::default()
        })
        .await,
        Err(ServiceError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        svc.update_track(9_999, &UpdateTrack::default()).await,
        Err(ServiceError::Core(CoreError::NotFound { .. }))
    );

    let page = svc.list_tracks(-5, 0).await.unwrap();
    assert_eq!(page.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id]);
    let by_artist = svc.list_tracks_by_artist("Duo").await.unwrap();
    assert_eq!(by_artist.len(), 2);
    let by_name = svc.list_tracks_by_name("B").await.unwrap();
    assert_eq!(by_name.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id]);
}
