//! Castline Publishers
//!
//! One `PodcastPublisher` adapter per external platform, the registry the
//! distribution orchestrator selects them from, and the OAuth token refresher.

#[cfg(feature = "publisher-apple")]
pub mod apple;
#[cfg(feature = "publisher-google")]
pub mod google;
mod http;
pub mod oauth;
pub mod publisher;
pub mod registry;
#[cfg(feature = "publisher-spotify")]
pub mod spotify;

#[cfg(feature = "publisher-apple")]
pub use apple::ApplePublisher;
#[cfg(feature = "publisher-google")]
pub use google::GooglePublisher;
pub use oauth::{HttpTokenRefresher, OAuthClient, OAuthError, TokenRefresher};
pub use publisher::{PodcastPublisher, PublishError, PublishMetadata, PublishReceipt, PublishRequest};
pub use registry::PublisherRegistry;
#[cfg(feature = "publisher-spotify")]
pub use spotify::SpotifyPublisher;
