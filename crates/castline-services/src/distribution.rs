//! Distribution orchestrator
//!
//! Fans one episode out to several podcast platforms. Each platform runs as
//! its own task; a failure on one platform is recorded in that platform's
//! result and never touches its siblings. Request-level checks (episode
//! exists, requester owns it, audio present) run before any platform is
//! contacted.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use castline_core::models::{
    BroadcastMode, BroadcastReport, BroadcastRequest, BroadcastResult, Episode, MetadataOverrides,
    Platform, Podcast, QuickBroadcastRequest,
};
use castline_core::{AppError, Config};
use castline_db::{EpisodeStore, PodcastStore};
use castline_publishers::{
    PodcastPublisher, PublishError, PublishMetadata, PublishReceipt, PublishRequest,
    PublisherRegistry,
};
use castline_storage::SignedUrlIssuer;
use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::Validate;

use crate::vault::CredentialVault;

pub const NOT_CONNECTED: &str = "not connected or token expired";
pub const NOT_SUPPORTED: &str = "platform not supported";

/// Timeout and retry policy applied to every upstream publish call
#[derive(Debug, Clone, Copy)]
pub struct DistributionSettings {
    pub platform_timeout: Duration,
    /// Extra attempts after `UpstreamUnavailable`; rejections are never retried
    pub unavailable_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            platform_timeout: Duration::from_secs(30),
            unavailable_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl DistributionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            platform_timeout: Duration::from_secs(config.platform_timeout_secs()),
            unavailable_retries: config.broadcast_unavailable_retries(),
            retry_backoff: Duration::from_millis(config.broadcast_retry_backoff_ms()),
        }
    }
}

pub struct DistributionOrchestrator {
    podcasts: Arc<dyn PodcastStore>,
    episodes: Arc<dyn EpisodeStore>,
    vault: Arc<CredentialVault>,
    registry: PublisherRegistry,
    issuer: SignedUrlIssuer,
    settings: DistributionSettings,
}

impl DistributionOrchestrator {
    pub fn new(
        podcasts: Arc<dyn PodcastStore>,
        episodes: Arc<dyn EpisodeStore>,
        vault: Arc<CredentialVault>,
        registry: PublisherRegistry,
        issuer: SignedUrlIssuer,
        settings: DistributionSettings,
    ) -> Self {
        Self {
            podcasts,
            episodes,
            vault,
            registry,
            issuer,
            settings,
        }
    }

    /// Broadcast to exactly the requested platforms, with optional metadata overrides
    pub async fn broadcast_explicit(
        &self,
        requester: Uuid,
        episode_id: Uuid,
        request: BroadcastRequest,
    ) -> Result<BroadcastReport, AppError> {
        request.validate()?;
        let (episode, podcast) = self.authorize(requester, episode_id).await?;
        if request.platforms.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one platform is required".to_string(),
            ));
        }
        let platforms: BTreeSet<Platform> = request.platforms.into_iter().collect();

        self.broadcast(
            requester,
            &episode,
            &podcast,
            platforms,
            BroadcastMode::Explicit,
            request.metadata,
        )
        .await
    }

    /// Broadcast to the custom platforms plus, unless opted out, every connected one
    pub async fn broadcast_quick(
        &self,
        requester: Uuid,
        episode_id: Uuid,
        request: QuickBroadcastRequest,
    ) -> Result<BroadcastReport, AppError> {
        let (episode, podcast) = self.authorize(requester, episode_id).await?;

        let mut platforms: BTreeSet<Platform> = request.platforms.into_iter().collect();
        if request.use_remembered {
            platforms.extend(
                self.vault
                    .connected_platforms(requester)
                    .await?
                    .into_iter()
                    .map(|c| c.platform),
            );
        }

        self.broadcast(
            requester,
            &episode,
            &podcast,
            platforms,
            BroadcastMode::Quick,
            MetadataOverrides::default(),
        )
        .await
    }

    async fn authorize(
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
        if episode.audio_object_path.is_none() {
            return Err(AppError::InvalidInput(
                "Episode has no audio to distribute".to_string(),
            ));
        }
        Ok((episode, podcast))
    }

    #[tracing::instrument(
        skip(self, episode, podcast, platforms, overrides),
        fields(episode_id = %episode.id, mode = ?mode, platform_count = platforms.len())
    )]
    async fn broadcast(
        &self,
        requester: Uuid,
        episode: &Episode,
        podcast: &Podcast,
        platforms: BTreeSet<Platform>,
        mode: BroadcastMode,
        overrides: MetadataOverrides,
    ) -> Result<BroadcastReport, AppError> {
        if platforms.is_empty() {
            tracing::info!("Nothing to broadcast");
            return Ok(BroadcastReport::new(BTreeMap::new()));
        }

        let audio_path = episode
            .audio_object_path
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput("Episode has no audio".to_string()))?;
        let audio_url = self.issuer.feed_url(audio_path).await?.url;
        let metadata = match mode {
            BroadcastMode::Explicit => merge_metadata(episode, &overrides),
            BroadcastMode::Quick => merge_metadata(episode, &MetadataOverrides::default()),
        };

        // Spawned tasks keep running if the caller goes away
        let handles: Vec<(Platform, JoinHandle<BroadcastResult>)> = platforms
            .iter()
            .map(|&platform| {
                let task = PlatformTask {
                    requester,
                    platform,
                    show_ref: podcast.show_ref_for(platform),
                    metadata: metadata.clone(),
                    audio_url: audio_url.clone(),
                    vault: self.vault.clone(),
                    registry: self.registry.clone(),
                    settings: self.settings,
                };
                (platform, tokio::spawn(task.run()))
            })
            .collect();

        let mut results = BTreeMap::new();
        for (platform, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                tracing::error!(platform = %platform, error = %e, "Broadcast task failed");
                BroadcastResult::failed(platform, "internal error")
            });
            results.insert(platform, result);
        }

        if let Err(e) = self.episodes.record_broadcast(episode.id, Utc::now()).await {
            tracing::error!(error = %e, "Failed to record broadcast timestamp");
        }

        let succeeded = results.values().filter(|r| r.success).count();
        tracing::info!(
            succeeded,
            failed = results.len() - succeeded,
            "Broadcast completed"
        );

        Ok(BroadcastReport::new(results))
    }
}

/// Episode record with caller overrides applied
fn merge_metadata(episode: &Episode, overrides: &MetadataOverrides) -> PublishMetadata {
    PublishMetadata {
        episode_title: overrides
            .title
            .clone()
            .unwrap_or_else(|| episode.title.clone()),
        episode_description: overrides
            .description
            .clone()
            .unwrap_or_else(|| episode.description.clone()),
        episode_number: overrides.episode_number.or(episode.episode_number),
        season_number: overrides.season_number.or(episode.season_number),
        explicit: overrides.explicit.unwrap_or(episode.explicit),
        publish_date: overrides
            .publish_date
            .or(episode.published_at)
            .unwrap_or_else(Utc::now),
        keywords: overrides
            .keywords
            .clone()
            .unwrap_or_else(|| episode.keywords.clone()),
        subtitle: overrides.subtitle.clone(),
        summary: overrides.summary.clone(),
        category: overrides.category.clone(),
        account_email: None,
    }
}

/// One platform's share of a broadcast, owned so it can run as a spawned task
struct PlatformTask {
    requester: Uuid,
    platform: Platform,
    show_ref: String,
    metadata: PublishMetadata,
    audio_url: String,
    vault: Arc<CredentialVault>,
    registry: PublisherRegistry,
    settings: DistributionSettings,
}

impl PlatformTask {
    async fn run(self) -> BroadcastResult {
        let platform = self.platform;

        let Some(publisher) = self.registry.get(platform).await else {
            return BroadcastResult::failed(platform, NOT_SUPPORTED);
        };

        let credential = match self.vault.get_valid_credential(self.requester, platform).await {
            Ok(Some(credential)) => credential,
            Ok(None) => return BroadcastResult::failed(platform, NOT_CONNECTED),
            Err(e) => {
                tracing::error!(platform = %platform, error = %e, "Credential lookup failed");
                return BroadcastResult::failed(platform, "credential lookup failed");
            }
        };

        let request = PublishRequest {
            access_token: credential.access_token,
            show_ref: self.show_ref,
            metadata: PublishMetadata {
                account_email: credential.account_email,
                ..self.metadata
            },
            audio_url: self.audio_url,
        };

        match publish_with_retry(publisher.as_ref(), &request, &self.settings).await {
            Ok(receipt) => {
                tracing::info!(
                    platform = %platform,
                    external_ref = ?receipt.external_ref,
                    "Episode created on platform"
                );
                BroadcastResult::succeeded(platform, receipt.external_ref)
            }
            Err(e) => {
                let error = e.into_app_error(platform);
                tracing::warn!(platform = %platform, error = %error, "Platform publish failed");
                BroadcastResult::failed(platform, error.to_string())
            }
        }
    }
}

async fn publish_with_retry(
    publisher: &dyn PodcastPublisher,
    request: &PublishRequest,
    settings: &DistributionSettings,
) -> Result<PublishReceipt, PublishError> {
    let mut attempt = 0;
    loop {
        let outcome =
            match tokio::time::timeout(settings.platform_timeout, publisher.create_episode(request))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(PublishError::Unavailable(format!(
                    "timed out after {:?}",
                    settings.platform_timeout
                ))),
            };

        match outcome {
            Err(e) if e.is_unavailable() && attempt < settings.unavailable_retries => {
                attempt += 1;
                tracing::debug!(
                    platform = %publisher.platform(),
                    attempt,
                    error = %e,
                    "Retrying unavailable platform"
                );
                tokio::time::sleep(settings.retry_backoff).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{finalize_metadata, seed_podcast, MemoryStorage};
    use async_trait::async_trait;
    use castline_core::models::{
        Draft, DraftStatus, NewEpisode, PlatformConnection, TokenGrant,
    };
    use castline_db::{ConnectionStore, DraftStore, InMemoryStore};
    use castline_publishers::{OAuthError, TokenRefresher};
    use castline_storage::UrlTtls;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Succeed(&'static str),
        Reject,
        Unavailable,
        Hang,
        Panic,
    }

    struct RecordingPublisher {
        platform: Platform,
        behavior: Behavior,
        calls: AtomicUsize,
        seen: Mutex<Vec<PublishRequest>>,
    }

    impl RecordingPublisher {
        fn new(platform: Platform, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                platform,
                behavior,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PodcastPublisher for RecordingPublisher {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn create_episode(
            &self,
            request: &PublishRequest,
        ) -> Result<PublishReceipt, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            match self.behavior {
                Behavior::Succeed(id) => Ok(PublishReceipt {
                    external_ref: Some(id.to_string()),
                }),
                Behavior::Reject => Err(PublishError::Rejected {
                    status: 400,
                    message: "category is required".to_string(),
                }),
                Behavior::Unavailable => Err(PublishError::Unavailable("502".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(PublishReceipt { external_ref: None })
                }
                Behavior::Panic => panic!("adapter bug: unexpected response shape"),
            }
        }
    }

    struct NoRefresh;

    #[async_trait]
    impl TokenRefresher for NoRefresh {
        async fn refresh(
            &self,
            _platform: Platform,
            _refresh_token: &str,
        ) -> Result<TokenGrant, OAuthError> {
            Err(OAuthError::Unavailable("refresh disabled".to_string()))
        }
    }

    struct Harness {
        store: InMemoryStore,
        registry: PublisherRegistry,
        orchestrator: DistributionOrchestrator,
        owner: Uuid,
        episode: Episode,
    }

    async fn harness(settings: DistributionSettings) -> Harness {
        let store = InMemoryStore::new();
        let storage = MemoryStorage::new();
        let owner = Uuid::new_v4();
        let podcast = seed_podcast(&store, owner).await;

        let draft_id = Uuid::new_v4();
        let now = Utc::now();
        store
            .insert_draft(&Draft {
                id: draft_id,
                owner_id: owner,
                podcast_id: podcast.id,
                original_object_path: "drafts/o/original.mp3".to_string(),
                edited_object_path: None,
                content_type: "audio/mpeg".to_string(),
                status: DraftStatus::Uploaded,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let episode = store
            .finalize_draft(
                draft_id,
                NewEpisode {
                    id: Uuid::new_v4(),
                    podcast_id: podcast.id,
                    source_draft_id: draft_id,
                    audio_object_path: format!("episodes/{}/e/r.mp3", podcast.id),
                    metadata: finalize_metadata("Pilot"),
                },
            )
            .await
            .unwrap()
            .unwrap();

        let registry = PublisherRegistry::new();
        let vault = Arc::new(CredentialVault::new(
            Arc::new(store.clone()),
            Arc::new(NoRefresh),
            chrono::Duration::seconds(60),
        ));
        let orchestrator = DistributionOrchestrator::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            vault,
            registry.clone(),
            SignedUrlIssuer::new(storage, UrlTtls::default()),
            settings,
        );

        Harness {
            store,
            registry,
            orchestrator,
            owner,
            episode,
        }
    }

    impl Harness {
        async fn connect(&self, platform: Platform) {
            let now = Utc::now();
            self.store
                .upsert_connection(&PlatformConnection {
                    user_id: self.owner,
                    platform,
                    access_token: format!("{}-token", platform),
                    refresh_token: "refresh".to_string(),
                    expires_at: now + chrono::Duration::hours(1),
                    account_email: Some("host@castline.test".to_string()),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        async fn explicit(&self, platforms: Vec<Platform>) -> BroadcastReport {
            self.orchestrator
                .broadcast_explicit(
                    self.owner,
                    self.episode.id,
                    BroadcastRequest {
                        platforms,
                        metadata: MetadataOverrides::default(),
                    },
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_per_platform() {
        let h = harness(DistributionSettings::default()).await;
        let spotify = RecordingPublisher::new(Platform::Spotify, Behavior::Succeed("sp-1"));
        let apple = RecordingPublisher::new(Platform::Apple, Behavior::Reject);
        h.registry.register(spotify.clone()).await;
        h.registry.register(apple.clone()).await;
        h.connect(Platform::Spotify).await;
        h.connect(Platform::Apple).await;

        let report = h.explicit(vec![Platform::Spotify, Platform::Apple]).await;

        assert!(report.success);
        assert_eq!(
            report.results.keys().copied().collect::<Vec<_>>(),
            vec![Platform::Spotify, Platform::Apple]
        );
        let spotify_result = &report.results[&Platform::Spotify];
        assert!(spotify_result.success);
        assert_eq!(spotify_result.external_ref.as_deref(), Some("sp-1"));
        let apple_result = &report.results[&Platform::Apple];
        assert!(!apple_result.success);
        assert!(apple_result
            .error
            .as_deref()
            .unwrap()
            .contains("category is required"));

        let stored = h.store.get_episode(h.episode.id).await.unwrap().unwrap();
        assert!(stored.last_broadcast_at.is_some());
    }

    #[tokio::test]
    async fn test_panicking_adapter_does_not_sink_siblings() {
        let h = harness(DistributionSettings::default()).await;
        let spotify = RecordingPublisher::new(Platform::Spotify, Behavior::Succeed("sp-1"));
        let apple = RecordingPublisher::new(Platform::Apple, Behavior::Panic);
        h.registry.register(spotify.clone()).await;
        h.registry.register(apple.clone()).await;
        h.connect(Platform::Spotify).await;
        h.connect(Platform::Apple).await;

        let report = h.explicit(vec![Platform::Spotify, Platform::Apple]).await;

        assert!(report.success);
        assert_eq!(
            report.results.keys().copied().collect::<Vec<_>>(),
            vec![Platform::Spotify, Platform::Apple]
        );
        assert!(report.results[&Platform::Spotify].success);
        assert_eq!(
            report.results[&Platform::Spotify].external_ref.as_deref(),
            Some("sp-1")
        );
        let apple_result = &report.results[&Platform::Apple];
        assert!(!apple_result.success);
        assert_eq!(apple_result.error.as_deref(), Some("internal error"));
        assert_eq!(apple.calls(), 1);

        let stored = h.store.get_episode(h.episode.id).await.unwrap().unwrap();
        assert!(stored.last_broadcast_at.is_some());
    }

    #[tokio::test]
    async fn test_not_connected_platform_never_reaches_adapter() {
        let h = harness(DistributionSettings::default()).await;
        let google = RecordingPublisher::new(Platform::Google, Behavior::Succeed("g-1"));
        h.registry.register(google.clone()).await;

        let report = h.explicit(vec![Platform::Google]).await;

        let result = &report.results[&Platform::Google];
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(NOT_CONNECTED));
        assert_eq!(google.calls(), 0);
    }

    #[tokio::test]
    async fn test_result_keys_match_requested_set() {
        let h = harness(DistributionSettings::default()).await;
        h.registry
            .register(RecordingPublisher::new(Platform::Spotify, Behavior::Succeed("sp")))
            .await;
        h.connect(Platform::Spotify).await;

        // Apple has no adapter, Google has no connection
        let report = h
            .explicit(vec![Platform::Google, Platform::Spotify, Platform::Apple, Platform::Spotify])
            .await;

        assert_eq!(report.results.len(), 3);
        assert_eq!(
            report.results[&Platform::Apple].error.as_deref(),
            Some(NOT_SUPPORTED)
        );
        assert!(!report.results[&Platform::Google].success);
        assert!(report.results[&Platform::Spotify].success);
    }

    #[tokio::test]
    async fn test_adapter_receives_signed_url_and_overrides() {
        let h = harness(DistributionSettings::default()).await;
        let apple = RecordingPublisher::new(Platform::Apple, Behavior::Succeed("ap"));
        h.registry.register(apple.clone()).await;
        h.connect(Platform::Apple).await;

        h.orchestrator
            .broadcast_explicit(
                h.owner,
                h.episode.id,
                BroadcastRequest {
                    platforms: vec![Platform::Apple],
                    metadata: MetadataOverrides {
                        title: Some("Pilot (remastered)".to_string()),
                        category: Some("Technology".to_string()),
                        ..Default::default()
                    },
                },
            )
            .await
            .unwrap();

        let seen = apple.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.access_token, "apple-token");
        assert_eq!(request.show_ref, h.episode.podcast_id.to_string());
        assert_eq!(request.metadata.episode_title, "Pilot (remastered)");
        assert_eq!(request.metadata.episode_description, "Show notes");
        assert_eq!(request.metadata.category.as_deref(), Some("Technology"));
        assert_eq!(
            request.metadata.account_email.as_deref(),
            Some("host@castline.test")
        );
        assert!(request.audio_url.contains("ttl=86400"));
    }

    #[tokio::test]
    async fn test_quick_broadcast_without_connections_is_empty() {
        let h = harness(DistributionSettings::default()).await;
        let spotify = RecordingPublisher::new(Platform::Spotify, Behavior::Succeed("sp"));
        h.registry.register(spotify.clone()).await;

        let report = h
            .orchestrator
            .broadcast_quick(h.owner, h.episode.id, QuickBroadcastRequest::default())
            .await
            .unwrap();

        assert!(report.success);
        assert!(report.results.is_empty());
        assert_eq!(spotify.calls(), 0);
    }

    #[tokio::test]
    async fn test_quick_broadcast_uses_remembered_connections() {
        let h = harness(DistributionSettings::default()).await;
        for platform in Platform::ALL {
            h.registry
                .register(RecordingPublisher::new(platform, Behavior::Succeed("ok")))
                .await;
        }
        h.connect(Platform::Spotify).await;
        h.connect(Platform::Google).await;

        let report = h
            .orchestrator
            .broadcast_quick(
                h.owner,
                h.episode.id,
                QuickBroadcastRequest {
                    use_remembered: true,
                    platforms: vec![Platform::Apple],
                },
            )
            .await
            .unwrap();
        assert_eq!(report.results.len(), 3);
        assert!(!report.results[&Platform::Apple].success);

        let opted_out = h
            .orchestrator
            .broadcast_quick(
                h.owner,
                h.episode.id,
                QuickBroadcastRequest {
                    use_remembered: false,
                    platforms: vec![Platform::Spotify],
                },
            )
            .await
            .unwrap();
        assert_eq!(
            opted_out.results.keys().copied().collect::<Vec<_>>(),
            vec![Platform::Spotify]
        );
    }

    #[tokio::test]
    async fn test_request_level_checks_happen_before_any_platform() {
        let h = harness(DistributionSettings::default()).await;
        let spotify = RecordingPublisher::new(Platform::Spotify, Behavior::Succeed("sp"));
        h.registry.register(spotify.clone()).await;
        h.connect(Platform::Spotify).await;

        let err = h
            .orchestrator
            .broadcast_explicit(
                Uuid::new_v4(),
                h.episode.id,
                BroadcastRequest {
                    platforms: vec![Platform::Spotify],
                    metadata: MetadataOverrides::default(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OwnershipViolation(_)));

        let err = h
            .orchestrator
            .broadcast_quick(h.owner, Uuid::new_v4(), QuickBroadcastRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(spotify.calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_is_retried_but_rejection_is_not() {
        let settings = DistributionSettings {
            platform_timeout: Duration::from_secs(5),
            unavailable_retries: 2,
            retry_backoff: Duration::from_millis(1),
        };
        let h = harness(settings).await;
        let spotify = RecordingPublisher::new(Platform::Spotify, Behavior::Unavailable);
        let apple = RecordingPublisher::new(Platform::Apple, Behavior::Reject);
        h.registry.register(spotify.clone()).await;
        h.registry.register(apple.clone()).await;
        h.connect(Platform::Spotify).await;
        h.connect(Platform::Apple).await;

        let report = h.explicit(vec![Platform::Spotify, Platform::Apple]).await;

        assert!(!report.results[&Platform::Spotify].success);
        assert_eq!(spotify.calls(), 3);
        assert_eq!(apple.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_scoped_to_one_platform() {
        let settings = DistributionSettings {
            platform_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let h = harness(settings).await;
        h.registry
            .register(RecordingPublisher::new(Platform::Spotify, Behavior::Hang))
            .await;
        h.registry
            .register(RecordingPublisher::new(Platform::Google, Behavior::Succeed("g")))
            .await;
        h.connect(Platform::Spotify).await;
        h.connect(Platform::Google).await;

        let report = h.explicit(vec![Platform::Spotify, Platform::Google]).await;

        let spotify = &report.results[&Platform::Spotify];
        assert!(!spotify.success);
        assert!(spotify.error.as_deref().unwrap().contains("timed out"));
        assert!(report.results[&Platform::Google].success);
    }

    #[test]
    fn test_publish_date_falls_back_to_published_at() {
        let mut episode = Episode {
            id: Uuid::new_v4(),
            podcast_id: Uuid::new_v4(),
            title: "Pilot".to_string(),
            description: String::new(),
            audio_object_path: None,
            duration_sec: 0,
            explicit: true,
            keywords: vec![],
            episode_number: Some(3),
            season_number: None,
            published_at: None,
            is_published: false,
            source_draft_id: Uuid::new_v4(),
            last_broadcast_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let published_at = Utc::now() - chrono::Duration::days(2);
        episode.published_at = Some(published_at);

        let merged = merge_metadata(&episode, &MetadataOverrides::default());
        assert_eq!(merged.publish_date, published_at);
        assert!(merged.explicit);
        assert_eq!(merged.episode_number, Some(3));

        let overridden = merge_metadata(
            &episode,
            &MetadataOverrides {
                explicit: Some(false),
                ..Default::default()
            },
        );
        assert!(!overridden.explicit);
    }
}
