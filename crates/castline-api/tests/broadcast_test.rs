//! Broadcast integration tests: per-platform isolation, remembered connections, audit.
//!
//! Run with: `cargo test -p castline-api --test broadcast_test`

mod helpers;

use castline_core::models::Platform;
use helpers::auth::bearer;
use helpers::fixtures::{connect, finalized_episode, seed_podcast};
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_partial_failure_is_reported_per_platform() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let podcast = seed_podcast(&app.store, owner).await;
    let episode_id = finalized_episode(&app, owner, podcast.id).await;
    connect(&app, owner, "spotify", 3600).await;
    connect(&app, owner, "apple", 3600).await;
    app.publisher(Platform::Apple).reject_all();

    let response = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({
            "platforms": ["spotify", "apple"],
            "metadata": { "title": "Pilot (remastered)" }
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report["success"], true);
    let results = report["results"].as_object().expect("results map");
    assert_eq!(results.len(), 2);
    assert_eq!(results["spotify"]["success"], true);
    assert_eq!(results["spotify"]["external_ref"], "spotify-episode-1");
    assert_eq!(results["apple"]["success"], false);
    assert!(results["apple"]["error"].as_str().is_some());

    let spotify_requests = app.publisher(Platform::Spotify).requests();
    assert_eq!(spotify_requests.len(), 1);
    assert_eq!(spotify_requests[0].access_token, "spotify-access");
    assert_eq!(spotify_requests[0].show_ref, "spotify-show-1");
    assert_eq!(spotify_requests[0].metadata.episode_title, "Pilot (remastered)");
    assert!(spotify_requests[0].audio_url.contains("method=GET"));

    let episode: Value = app
        .client()
        .get(&api_path(&format!("/episodes/{}", episode_id)))
        .add_header("Authorization", bearer(owner))
        .await
        .json();
    assert!(!episode["last_broadcast_at"].is_null());
}

#[tokio::test]
async fn test_unconnected_platform_fails_without_adapter_call() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let podcast = seed_podcast(&app.store, owner).await;
    let episode_id = finalized_episode(&app, owner, podcast.id).await;

    let report: Value = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "platforms": ["google"] }))
        .await
        .json();

    assert_eq!(report["results"]["google"]["success"], false);
    assert_eq!(
        report["results"]["google"]["error"],
        "not connected or token expired"
    );
    assert_eq!(app.publisher(Platform::Google).calls(), 0);
}

#[tokio::test]
async fn test_quick_broadcast_without_connections_is_empty_success() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let podcast = seed_podcast(&app.store, owner).await;
    let episode_id = finalized_episode(&app, owner, podcast.id).await;

    let response = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast/quick", episode_id)))
        .add_header("Authorization", bearer(owner))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: Value = response.json();
    assert_eq!(report, json!({ "success": true, "results": {} }));
    for platform in Platform::ALL {
        assert_eq!(app.publisher(platform).calls(), 0);
    }
}

#[tokio::test]
async fn test_quick_broadcast_uses_remembered_connections() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let podcast = seed_podcast(&app.store, owner).await;
    let episode_id = finalized_episode(&app, owner, podcast.id).await;
    connect(&app, owner, "spotify", 3600).await;

    let report: Value = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast/quick", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "platforms": ["apple"] }))
        .await
        .json();

    let results = report["results"].as_object().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results["spotify"]["success"], true);
    // Requested but never connected
    assert_eq!(results["apple"]["success"], false);
    assert_eq!(app.publisher(Platform::Apple).calls(), 0);

    let opted_out: Value = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast/quick", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "use_remembered": false }))
        .await
        .json();
    assert_eq!(opted_out["results"], json!({}));
}

#[tokio::test]
async fn test_request_level_checks_precede_platform_calls() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let podcast = seed_podcast(&app.store, owner).await;
    let episode_id = finalized_episode(&app, owner, podcast.id).await;
    connect(&app, owner, "spotify", 3600).await;

    let intruder = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", episode_id)))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .json(&json!({ "platforms": ["spotify"] }))
        .await;
    assert_eq!(intruder.status_code(), 403);

    let missing = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", Uuid::new_v4())))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "platforms": ["spotify"] }))
        .await;
    assert_eq!(missing.status_code(), 404);

    let empty = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "platforms": [] }))
        .await;
    assert_eq!(empty.status_code(), 400);

    let unknown = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "platforms": ["myspace"] }))
        .await;
    assert_eq!(unknown.status_code(), 400);

    assert_eq!(app.publisher(Platform::Spotify).calls(), 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_publishing() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let podcast = seed_podcast(&app.store, owner).await;
    let episode_id = finalized_episode(&app, owner, podcast.id).await;
    connect(&app, owner, "spotify", 0).await;

    let report: Value = app
        .client()
        .post(&api_path(&format!("/episodes/{}/broadcast", episode_id)))
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "platforms": ["spotify"] }))
        .await
        .json();

    assert_eq!(report["results"]["spotify"]["success"], true);
    assert_eq!(app.refresher.calls(), 1);
    let requests = app.publisher(Platform::Spotify).requests();
    assert_eq!(requests[0].access_token, "refreshed-token");
}
