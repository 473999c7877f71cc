//! Publisher registry keyed by platform

use anyhow::Result;
use castline_core::models::Platform;
use castline_core::Config;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::publisher::PodcastPublisher;

/// Registry of platform adapters.
///
/// Reads happen concurrently from every broadcast task; registration is
/// serialized and normally only happens at startup.
#[derive(Clone)]
pub struct PublisherRegistry {
    publishers: Arc<RwLock<HashMap<Platform, Arc<dyn PodcastPublisher>>>>,
}

impl PublisherRegistry {
    pub fn new() -> Self {
        Self {
            publishers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build a registry with every adapter compiled into this build
    pub async fn from_config(config: &Config) -> Result<Self> {
        let registry = Self::new();
        #[allow(unused_variables)]
        let timeout = Duration::from_secs(config.platform_timeout_secs());

        #[cfg(feature = "publisher-spotify")]
        registry
            .register(Arc::new(crate::SpotifyPublisher::new(
                config.platform_client(Platform::Spotify).api_base.clone(),
                timeout,
            )?))
            .await;

        #[cfg(feature = "publisher-apple")]
        registry
            .register(Arc::new(crate::ApplePublisher::new(
                config.platform_client(Platform::Apple).api_base.clone(),
                timeout,
            )?))
            .await;

        #[cfg(feature = "publisher-google")]
        registry
            .register(Arc::new(crate::GooglePublisher::new(
                config.platform_client(Platform::Google).api_base.clone(),
                timeout,
            )?))
            .await;

        tracing::info!(
            platforms = ?registry.list().await,
            "Publisher registry initialized"
        );
        Ok(registry)
    }

    /// Register an adapter; replaces any adapter already bound to its platform
    pub async fn register(&self, publisher: Arc<dyn PodcastPublisher>) {
        let platform = publisher.platform();
        let mut publishers = self.publishers.write().await;
        if publishers.insert(platform, publisher).is_some() {
            tracing::debug!(platform = %platform, "Replaced registered publisher");
        }
    }

    pub async fn get(&self, platform: Platform) -> Option<Arc<dyn PodcastPublisher>> {
        let publishers = self.publishers.read().await;
        publishers.get(&platform).cloned()
    }

    /// Registered platforms in a stable order
    pub async fn list(&self) -> Vec<Platform> {
        let publishers = self.publishers.read().await;
        let mut platforms: Vec<Platform> = publishers.keys().copied().collect();
        platforms.sort();
        platforms
    }

    pub async fn contains(&self, platform: Platform) -> bool {
        let publishers = self.publishers.read().await;
        publishers.contains_key(&platform)
    }
}

impl Default for PublisherRegistry {
    fn default() -> Self {
        Self::new()
    }
}
