//! Publisher trait and the request/response types shared by every adapter

use async_trait::async_trait;
use castline_core::models::Platform;
use castline_core::AppError;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use thiserror::Error;

/// Platform-neutral episode metadata. Adapters map it to their native schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishMetadata {
    pub episode_title: String,
    pub episode_description: String,
    pub episode_number: Option<i32>,
    pub season_number: Option<i32>,
    pub explicit: bool,
    pub publish_date: DateTime<Utc>,
    pub keywords: Vec<String>,
    /// Apple only
    pub subtitle: Option<String>,
    /// Apple only
    pub summary: Option<String>,
    /// Apple only
    pub category: Option<String>,
    /// Google only; the upload is rejected without it
    pub account_email: Option<String>,
}

/// Everything an adapter needs to create one episode
#[derive(Clone)]
pub struct PublishRequest {
    pub access_token: String,
    pub show_ref: String,
    pub metadata: PublishMetadata,
    /// Long-lived signed read URL the platform ingests the audio from
    pub audio_url: String,
}

impl Debug for PublishRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PublishRequest")
            .field("access_token", &"[REDACTED]")
            .field("show_ref", &self.show_ref)
            .field("metadata", &self.metadata)
            .field("audio_url", &"[SIGNED]")
            .finish()
    }
}

/// Successful creation on the platform
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReceipt {
    /// The platform's episode id; `None` when a 2xx response omitted it
    pub external_ref: Option<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    /// The platform answered 4xx, or the request was invalid before sending
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx, timeout or connection failure
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl PublishError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PublishError::Unavailable(_))
    }

    pub fn into_app_error(self, platform: Platform) -> AppError {
        match self {
            PublishError::Rejected { status, message } => AppError::UpstreamRejected {
                platform: platform.to_string(),
                status,
                message,
            },
            PublishError::Unavailable(message) => AppError::UpstreamUnavailable {
                platform: platform.to_string(),
                message,
            },
        }
    }
}

/// A podcast platform capable of creating an episode from a hosted audio URL.
///
/// Adapters never retry; retry policy belongs to the caller.
#[async_trait]
pub trait PodcastPublisher: Send + Sync {
    fn platform(&self) -> Platform;

    async fn create_episode(&self, request: &PublishRequest)
        -> Result<PublishReceipt, PublishError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_debug_hides_credentials() {
        let rendered = format!("{:?}", test_support::request("show-1"));
        assert!(!rendered.contains("platform-access-token"));
        assert!(!rendered.contains("sig=abc"));
    }

    #[test]
    fn test_publish_error_maps_to_upstream_taxonomy() {
        let rejected = PublishError::Rejected {
            status: 422,
            message: "bad category".to_string(),
        }
        .into_app_error(Platform::Apple);
        assert!(matches!(
            rejected,
            AppError::UpstreamRejected { status: 422, .. }
        ));

        let unavailable =
            PublishError::Unavailable("timed out".to_string()).into_app_error(Platform::Spotify);
        assert!(matches!(unavailable, AppError::UpstreamUnavailable { .. }));
    }
}
