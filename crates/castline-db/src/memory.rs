//! In-memory implementation of every store trait
//!
//! Backs unit and integration tests and single-node development. One mutex
//! guards all tables so `finalize_draft` is atomic like the Postgres transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use castline_core::models::{
    Draft, DraftStatus, Episode, NewEpisode, Platform, PlatformConnection, Podcast,
};
use castline_core::AppError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store_traits::{ConnectionStore, DraftStore, EpisodeStore, PodcastStore};

#[derive(Default)]
struct MemoryState {
    podcasts: HashMap<Uuid, Podcast>,
    drafts: HashMap<Uuid, Draft>,
    episodes: HashMap<Uuid, Episode>,
    connections: HashMap<(Uuid, Platform), PlatformConnection>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of episodes created from drafts of `podcast_id`
    pub fn episode_count(&self, podcast_id: Uuid) -> usize {
        self.state()
            .episodes
            .values()
            .filter(|e| e.podcast_id == podcast_id)
            .count()
    }
}

#[async_trait]
impl PodcastStore for InMemoryStore {
    async fn get_podcast(&self, id: Uuid) -> Result<Option<Podcast>, AppError> {
        Ok(self.state().podcasts.get(&id).cloned())
    }

    async fn create_podcast(&self, podcast: &Podcast) -> Result<(), AppError> {
        self.state().podcasts.insert(podcast.id, podcast.clone());
        Ok(())
    }
}

#[async_trait]
impl DraftStore for InMemoryStore {
    async fn insert_draft(&self, draft: &Draft) -> Result<(), AppError> {
        self.state().drafts.insert(draft.id, draft.clone());
        Ok(())
    }

    async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError> {
        Ok(self.state().drafts.get(&id).cloned())
    }

    async fn advance_draft(
        &self,
        id: Uuid,
        expected: DraftStatus,
        next: DraftStatus,
        edited_object_path: Option<&str>,
    ) -> Result<Option<Draft>, AppError> {
        expected.ensure_can_advance_to(next)?;

        let mut state = self.state();
        let Some(draft) = state.drafts.get_mut(&id) else {
            return Ok(None);
        };
        if draft.status != expected {
            return Ok(None);
        }

        draft.status = next;
        if let Some(path) = edited_object_path {
            draft.edited_object_path = Some(path.to_string());
        }
        draft.updated_at = Utc::now();
        Ok(Some(draft.clone()))
    }

    async fn finalize_draft(
        &self,
        draft_id: Uuid,
        episode: NewEpisode,
    ) -> Result<Option<Episode>, AppError> {
        let mut state = self.state();

        match state.drafts.get(&draft_id) {
            Some(draft) if draft.status.has_audio() => {}
            _ => return Ok(None),
        }
        if state
            .episodes
            .values()
            .any(|e| e.source_draft_id == draft_id)
        {
            return Ok(None);
        }

        state.drafts.remove(&draft_id);
        let created = episode.into_episode(Utc::now());
        state.episodes.insert(created.id, created.clone());
        Ok(Some(created))
    }
}

#[async_trait]
impl EpisodeStore for InMemoryStore {
    async fn get_episode(&self, id: Uuid) -> Result<Option<Episode>, AppError> {
        Ok(self.state().episodes.get(&id).cloned())
    }

    async fn find_by_source_draft(&self, draft_id: Uuid) -> Result<Option<Episode>, AppError> {
        Ok(self
            .state()
            .episodes
            .values()
            .find(|e| e.source_draft_id == draft_id)
            .cloned())
    }

    async fn set_published(
        &self,
        id: Uuid,
        is_published: bool,
        published_at: DateTime<Utc>,
    ) -> Result<Option<Episode>, AppError> {
        let mut state = self.state();
        let Some(episode) = state.episodes.get_mut(&id) else {
            return Ok(None);
        };

        episode.is_published = is_published;
        if is_published && episode.published_at.is_none() {
            episode.published_at = Some(published_at);
        }
        episode.updated_at = Utc::now();
        Ok(Some(episode.clone()))
    }

    async fn replace_audio(
        &self,
        id: Uuid,
        new_path: &str,
    ) -> Result<Option<(Episode, Option<String>)>, AppError> {
        let mut state = self.state();
        let Some(episode) = state.episodes.get_mut(&id) else {
            return Ok(None);
        };

        let previous = episode.audio_object_path.replace(new_path.to_string());
        episode.updated_at = Utc::now();
        Ok(Some((episode.clone(), previous)))
    }

    async fn record_broadcast(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(episode) = self.state().episodes.get_mut(&id) {
            episode.last_broadcast_at = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionStore for InMemoryStore {
    async fn get_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<PlatformConnection>, AppError> {
        Ok(self.state().connections.get(&(user_id, platform)).cloned())
    }

    async fn upsert_connection(&self, connection: &PlatformConnection) -> Result<(), AppError> {
        let mut state = self.state();
        let key = (connection.user_id, connection.platform);
        let mut stored = connection.clone();
        if let Some(existing) = state.connections.get(&key) {
            stored.created_at = existing.created_at;
            if stored.account_email.is_none() {
                stored.account_email = existing.account_email.clone();
            }
        }
        state.connections.insert(key, stored);
        Ok(())
    }

    async fn delete_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<bool, AppError> {
        Ok(self
            .state()
            .connections
            .remove(&(user_id, platform))
            .is_some())
    }

    async fn delete_connection_if_unchanged(
        &self,
        user_id: Uuid,
        platform: Platform,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut state = self.state();
        let key = (user_id, platform);
        if state
            .connections
            .get(&key)
            .is_some_and(|c| c.updated_at == updated_at)
        {
            state.connections.remove(&key);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list_connections(&self, user_id: Uuid) -> Result<Vec<PlatformConnection>, AppError> {
        let mut connections: Vec<_> = self
            .state()
            .connections
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        connections.sort_by_key(|c| c.platform);
        Ok(connections)
    }
}
