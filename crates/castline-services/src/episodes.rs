//! Episode operations: owner fetch, publish state, playback and feed URLs, audio replacement

use std::sync::Arc;

use castline_core::models::{Episode, Podcast, SignedUrlResponse};
use castline_core::{AppError, Config};
use castline_db::{EpisodeStore, PodcastStore};
use castline_storage::keys::{episode_audio_key, episode_prefix, validate_key};
use castline_storage::{SignedUrl, SignedUrlIssuer, Storage};
use chrono::Utc;
use uuid::Uuid;

use crate::drafts::ensure_allowed_content_type;

pub struct EpisodeService {
    podcasts: Arc<dyn PodcastStore>,
    episodes: Arc<dyn EpisodeStore>,
    storage: Arc<dyn Storage>,
    issuer: SignedUrlIssuer,
    allowed_content_types: Vec<String>,
}

impl EpisodeService {
    pub fn new(
        podcasts: Arc<dyn PodcastStore>,
        episodes: Arc<dyn EpisodeStore>,
        storage: Arc<dyn Storage>,
        issuer: SignedUrlIssuer,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            podcasts,
            episodes,
            storage,
            issuer,
            allowed_content_types,
        }
    }

    pub fn from_config(
        config: &Config,
        podcasts: Arc<dyn PodcastStore>,
        episodes: Arc<dyn EpisodeStore>,
        storage: Arc<dyn Storage>,
        issuer: SignedUrlIssuer,
    ) -> Self {
        Self::new(
            podcasts,
            episodes,
            storage,
            issuer,
            config.audio_allowed_content_types().to_vec(),
        )
    }

    pub async fn get(&self, requester: Uuid, episode_id: Uuid) -> Result<Episode, AppError> {
        let (episode, _) = self.owned_episode(requester, episode_id).await?;
        Ok(episode)
    }

    #[tracing::instrument(skip(self))]
    pub async fn publish(&self, requester: Uuid, episode_id: Uuid) -> Result<Episode, AppError> {
        let (episode, _) = self.owned_episode(requester, episode_id).await?;
        if episode.audio_object_path.is_none() {
            return Err(AppError::InvalidInput(
                "Episode has no audio and cannot be published".to_string(),
            ));
        }

        let updated = self
            .episodes
            .set_published(episode_id, true, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Episode {}", episode_id)))?;

        tracing::info!(episode_id = %episode_id, published_at = ?updated.published_at, "Episode published");
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn unpublish(&self, requester: Uuid, episode_id: Uuid) -> Result<Episode, AppError> {
        self.owned_episode(requester, episode_id).await?;

        let updated = self
            .episodes
            .set_published(episode_id, false, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Episode {}", episode_id)))?;

        tracing::info!(episode_id = %episode_id, "Episode unpublished");
        Ok(updated)
    }

    /// Preview-TTL read URL for the owner
    pub async fn playback_url(
        &self,
        requester: Uuid,
        episode_id: Uuid,
    ) -> Result<SignedUrl, AppError> {
        let (episode, _) = self.owned_episode(requester, episode_id).await?;
        let path = audio_path(&episode)?;
        self.issuer.preview_url(path).await
    }

    /// Long-TTL read URL for the feed renderer. Unpublished episodes look absent.
    pub async fn feed_audio_url(&self, episode_id: Uuid) -> Result<SignedUrl, AppError> {
        let episode = self
            .episodes
            .get_episode(episode_id)
            .await?
            .filter(|e| e.is_published)
            .ok_or_else(|| AppError::NotFound(format!("Episode {}", episode_id)))?;
        let path = audio_path(&episode)?;
        self.issuer.feed_url(path).await
    }

    /// Write URL for a new audio revision; nothing changes until completion
    #[tracing::instrument(skip(self))]
    pub async fn begin_audio_replacement(
        &self,
        requester: Uuid,
        episode_id: Uuid,
        content_type: &str,
    ) -> Result<SignedUrlResponse, AppError> {
        let (episode, _) = self.owned_episode(requester, episode_id).await?;
        let content_type = ensure_allowed_content_type(&self.allowed_content_types, content_type)?;

        let object_path =
            episode_audio_key(episode.podcast_id, episode.id, Uuid::new_v4(), &content_type);
        let upload = self.issuer.upload_url(&object_path, &content_type).await?;

        Ok(SignedUrlResponse {
            url: upload.url,
            object_path: Some(object_path),
            expires_at: upload.expires_at,
        })
    }

    /// Point the episode at the uploaded revision and drop the previous object
    #[tracing::instrument(skip(self))]
    pub async fn complete_audio_replacement(
        &self,
        requester: Uuid,
        episode_id: Uuid,
        object_path: &str,
    ) -> Result<Episode, AppError> {
        let (episode, _) = self.owned_episode(requester, episode_id).await?;

        validate_key(object_path)?;
        if !object_path.starts_with(&episode_prefix(episode.podcast_id, episode.id)) {
            return Err(AppError::InvalidInput(
                "Object path does not belong to this episode".to_string(),
            ));
        }
        if episode.audio_object_path.as_deref() == Some(object_path) {
            return Ok(episode);
        }
        if !self.storage.exists(object_path).await? {
            return Err(AppError::InvalidInput(
                "Replacement audio has not been uploaded yet".to_string(),
            ));
        }

        let (updated, previous) = self
            .episodes
            .replace_audio(episode_id, object_path)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Episode {}", episode_id)))?;

        if let Some(previous) = previous.filter(|p| p != object_path) {
            if let Err(e) = self.storage.delete(&previous).await {
                tracing::warn!(error = %e, storage_key = %previous, "Failed to delete replaced audio");
            }
        }

        tracing::info!(episode_id = %episode_id, "Episode audio replaced");
        Ok(updated)
    }

    async fn owned_episode(
        &self,
        requester: Uuid,
        episode_id: Uuid,
    ) -> Result<(Episode, Podcast), AppError> {
        let episode = self
            .episodes
            .get_episode(episode_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Episode {}", episode_id)))?;
        let podcast = self
            .podcasts
            .get_podcast(episode.podcast_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Podcast {}", episode.podcast_id)))?;
        if !podcast.is_owned_by(requester) {
            return Err(AppError::OwnershipViolation(format!(
                "Episode {} belongs to another user",
                episode_id
            )));
        }
        Ok((episode, podcast))
    }
}

fn audio_path(episode: &Episode) -> Result<&str, AppError> {
    episode
        .audio_object_path
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("Audio for episode {}", episode.id)))
}
