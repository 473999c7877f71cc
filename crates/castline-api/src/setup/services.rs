//! Service wiring
//!
//! Builds every service over one set of stores. Postgres backs the binary;
//! tests and single-node development use [`Stores::in_memory`].

use crate::state::AppState;
use castline_core::{Config, EncryptionService};
use castline_db::{
    ConnectionRepository, ConnectionStore, DraftRepository, DraftStore, EpisodeRepository,
    EpisodeStore, InMemoryStore, PodcastRepository, PodcastStore,
};
use castline_publishers::{PublisherRegistry, TokenRefresher};
use castline_services::{
    CredentialVault, DistributionOrchestrator, DistributionSettings, DraftService, EpisodeService,
};
use castline_storage::{SignedUrlIssuer, StorageHandle, UrlTtls};
use sqlx::PgPool;
use std::sync::Arc;

/// The four store traits the services depend on, plus the pool when Postgres backs them
#[derive(Clone)]
pub struct Stores {
    pub podcasts: Arc<dyn PodcastStore>,
    pub drafts: Arc<dyn DraftStore>,
    pub episodes: Arc<dyn EpisodeStore>,
    pub connections: Arc<dyn ConnectionStore>,
    pub pool: Option<PgPool>,
}

impl Stores {
    pub fn postgres(pool: PgPool, encryption: EncryptionService) -> Self {
        Self {
            podcasts: Arc::new(PodcastRepository::new(pool.clone())),
            drafts: Arc::new(DraftRepository::new(pool.clone())),
            episodes: Arc::new(EpisodeRepository::new(pool.clone())),
            connections: Arc::new(ConnectionRepository::new(pool.clone(), encryption)),
            pool: Some(pool),
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            podcasts: Arc::new(store.clone()),
            drafts: Arc::new(store.clone()),
            episodes: Arc::new(store.clone()),
            connections: Arc::new(store),
            pool: None,
        }
    }
}

pub fn build_state(
    config: &Config,
    stores: Stores,
    storage: StorageHandle,
    registry: PublisherRegistry,
    refresher: Arc<dyn TokenRefresher>,
) -> Arc<AppState> {
    let issuer = SignedUrlIssuer::new(storage.storage.clone(), UrlTtls::from_config(config));

    let vault = Arc::new(CredentialVault::from_config(
        config,
        stores.connections.clone(),
        refresher,
    ));

    let drafts = Arc::new(DraftService::from_config(
        config,
        stores.podcasts.clone(),
        stores.drafts.clone(),
        stores.episodes.clone(),
        storage.storage.clone(),
        issuer.clone(),
    ));

    let episodes = Arc::new(EpisodeService::from_config(
        config,
        stores.podcasts.clone(),
        stores.episodes.clone(),
        storage.storage.clone(),
        issuer.clone(),
    ));

    let distribution = Arc::new(DistributionOrchestrator::new(
        stores.podcasts.clone(),
        stores.episodes.clone(),
        vault.clone(),
        registry.clone(),
        issuer,
        DistributionSettings::from_config(config),
    ));

    tracing::info!(
        persistence = if stores.pool.is_some() { "postgres" } else { "memory" },
        "Services initialized"
    );

    Arc::new(AppState {
        drafts,
        episodes,
        distribution,
        vault,
        registry,
        storage: storage.storage,
        objects: storage.local,
        pool: stores.pool,
        config: config.clone(),
    })
}
