use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A permanent, publishable episode. Created only by finalizing a draft.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Episode {
    pub id: Uuid,
    pub podcast_id: Uuid,
    pub title: String,
    pub description: String,
    pub audio_object_path: Option<String>,
    pub duration_sec: i32,
    pub explicit: bool,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub source_draft_id: Uuid,
    pub last_broadcast_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written by finalize
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub id: Uuid,
    pub podcast_id: Uuid,
    pub source_draft_id: Uuid,
    pub audio_object_path: String,
    pub metadata: FinalizeMetadata,
}

impl NewEpisode {
    pub fn into_episode(self, now: DateTime<Utc>) -> Episode {
        Episode {
            id: self.id,
            podcast_id: self.podcast_id,
            title: self.metadata.title,
            description: self.metadata.description,
            audio_object_path: Some(self.audio_object_path),
            duration_sec: self.metadata.duration_sec,
            explicit: self.metadata.explicit,
            keywords: self.metadata.keywords,
            episode_number: self.metadata.episode_number,
            season_number: self.metadata.season_number,
            published_at: None,
            is_published: false,
            source_draft_id: self.source_draft_id,
            last_broadcast_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Metadata supplied when a draft is finalized into an episode
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct FinalizeMetadata {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration_sec: i32,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 keywords are allowed"))]
    pub keywords: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub episode_number: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub season_number: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BeginAudioReplacementRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CompleteAudioReplacementRequest {
    /// Object path returned by the begin call
    #[validate(length(min = 1, max = 1024))]
    pub object_path: String,
}
