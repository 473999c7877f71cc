//! Application state shared by every handler

use castline_core::Config;
use castline_publishers::PublisherRegistry;
use castline_services::{CredentialVault, DistributionOrchestrator, DraftService, EpisodeService};
use castline_storage::{LocalStorage, Storage};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub drafts: Arc<DraftService>,
    pub episodes: Arc<EpisodeService>,
    pub distribution: Arc<DistributionOrchestrator>,
    pub vault: Arc<CredentialVault>,
    pub registry: PublisherRegistry,
    pub storage: Arc<dyn Storage>,
    /// Set only for the local backend; serves `/objects/{*key}`
    pub objects: Option<LocalStorage>,
    /// `None` when running over the in-memory stores
    pub pool: Option<PgPool>,
    pub config: Config,
}
