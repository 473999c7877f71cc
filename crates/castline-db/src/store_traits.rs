//! Store abstractions
//!
//! These traits define the data access the pipeline services need, so they can
//! run against PostgreSQL or the in-memory store without change.

use async_trait::async_trait;
use castline_core::models::{
    Draft, DraftStatus, Episode, NewEpisode, Platform, PlatformConnection, Podcast,
};
use castline_core::AppError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait PodcastStore: Send + Sync {
    async fn get_podcast(&self, id: Uuid) -> Result<Option<Podcast>, AppError>;

    async fn create_podcast(&self, podcast: &Podcast) -> Result<(), AppError>;
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn insert_draft(&self, draft: &Draft) -> Result<(), AppError>;

    async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError>;

    /// Compare-and-set the status. Returns `None` when the stored status is no longer `expected`.
    ///
    /// `edited_object_path` is recorded when given and left untouched otherwise.
    async fn advance_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        next: DraftStatus,
        edited_object_path: Option<&str>,
    ) -> Result<Option<Draft>, AppError>;

    /// Insert the episode and delete the draft in one step.
    ///
    /// Returns `None` when the draft no longer exists (already finalized).
    async fn finalize_draft(
        &self,
        draft_id: Uuid,
        episode: NewEpisode,
    ) -> Result<Option<Episode>, AppError>;
}

#[async_trait]
pub trait EpisodeStore: Send + Sync {
    async fn get_episode(&self, id: Uuid) -> Result<Option<Episode>, AppError>;

    async fn find_by_source_draft(&self, draft_id: Uuid) -> Result<Option<Episode>, AppError>;

    /// Set the published flag. `published_at` is only written when the episode has none.
    async fn set_published(
        &self,
        id: Uuid,
        is_published: bool,
        published_at: DateTime<Utc>,
    ) -> Result<Option<Episode>, AppError>;

    /// Swap the audio object. Returns the updated episode and the path it replaced.
    async fn replace_audio(
        &self,
        id: Uuid,
        new_path: &str,
    ) -> Result<Option<(Episode, Option<String>)>, AppError>;

    async fn record_broadcast(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;
}

/// Platform credentials keyed by `(user_id, platform)`
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn get_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<PlatformConnection>, AppError>;

    /// Insert or replace the connection for `(user_id, platform)`
    async fn upsert_connection(&self, connection: &PlatformConnection) -> Result<(), AppError>;

    /// Returns whether a connection was removed
    async fn delete_connection(&self, user_id: Uuid, platform: Platform)
        -> Result<bool, AppError>;

    /// Delete only if the row still carries `updated_at`, so a reconnect that
    /// landed in between survives. Returns whether a connection was removed.
    async fn delete_connection_if_unchanged(
        &self,
        user_id: Uuid,
        platform: Platform,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn list_connections(&self, user_id: Uuid) -> Result<Vec<PlatformConnection>, AppError>;
}
