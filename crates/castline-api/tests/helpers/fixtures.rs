use super::{api_path, auth::bearer, TestApp};
use castline_core::models::{Platform, Podcast};
use castline_db::{InMemoryStore, PodcastStore};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Bytes standing in for an MP3 upload
pub fn audio_bytes() -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    data.extend((0..4096u32).map(|i| (i % 251) as u8));
    data
}

pub async fn seed_podcast(store: &InMemoryStore, owner_id: Uuid) -> Podcast {
    let mut external_show_ids = HashMap::new();
    external_show_ids.insert(Platform::Spotify, "spotify-show-1".to_string());
    external_show_ids.insert(Platform::Apple, "apple-show-1".to_string());
    let podcast = Podcast {
        id: Uuid::new_v4(),
        owner_id,
        title: "Integration Show".to_string(),
        external_show_ids,
        created_at: Utc::now(),
    };
    store
        .create_podcast(&podcast)
        .await
        .expect("Failed to seed podcast");
    podcast
}

/// Create a draft, upload audio through its signed URL and confirm it. Returns the draft id.
pub async fn uploaded_draft(app: &TestApp, owner_id: Uuid, podcast_id: Uuid) -> Uuid {
    let client = app.client();
    let created = client
        .post(&api_path("/drafts"))
        .add_header("Authorization", bearer(owner_id))
        .json(&json!({ "podcast_id": podcast_id, "content_type": "audio/mpeg" }))
        .await;
    assert_eq!(created.status_code(), 201, "create draft");
    let created: Value = created.json();

    let upload_url = created["upload_url"].as_str().expect("upload_url");
    let put = app.upload_to(upload_url, "audio/mpeg", &audio_bytes()).await;
    assert_eq!(put.status_code(), 200, "signed upload");

    let draft_id: Uuid = created["draft_id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("draft_id");
    let confirmed = client
        .post(&api_path(&format!("/drafts/{}/uploaded", draft_id)))
        .add_header("Authorization", bearer(owner_id))
        .await;
    assert_eq!(confirmed.status_code(), 200, "confirm upload");

    draft_id
}

/// Full path from a new draft to an episode. Returns the episode id.
pub async fn finalized_episode(app: &TestApp, owner_id: Uuid, podcast_id: Uuid) -> Uuid {
    let draft_id = uploaded_draft(app, owner_id, podcast_id).await;
    let response = app
        .client()
        .post(&api_path(&format!("/drafts/{}/finalize", draft_id)))
        .add_header("Authorization", bearer(owner_id))
        .json(&finalize_body("Pilot"))
        .await;
    assert_eq!(response.status_code(), 201, "finalize");
    let episode: Value = response.json();
    episode["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("episode id")
}

pub fn finalize_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Recorded for the integration suite",
        "duration_sec": 1800,
        "explicit": false,
        "keywords": ["rust", "podcasting"],
        "episode_number": 1
    })
}

/// Store an OAuth grant for `platform` through the API
pub async fn connect(app: &TestApp, user_id: Uuid, platform: &str, expires_in: i64) {
    let response = app
        .client()
        .put(&api_path(&format!("/connections/{}", platform)))
        .add_header("Authorization", bearer(user_id))
        .json(&json!({
            "access_token": format!("{}-access", platform),
            "refresh_token": format!("{}-refresh", platform),
            "expires_in": expires_in,
            "account_email": "host@example.com"
        }))
        .await;
    assert_eq!(response.status_code(), 200, "connect {}", platform);
}
