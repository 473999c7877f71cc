use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::Platform;

/// How the effective platform set is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastMode {
    /// Exactly the supplied platforms, with optional metadata overrides
    Explicit,
    /// Supplied platforms plus every platform the user has connected
    Quick,
}

/// Caller-supplied metadata for an explicit broadcast. Unset fields fall back to the episode.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct MetadataOverrides {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    pub episode_number: Option<i32>,
    pub season_number: Option<i32>,
    pub explicit: Option<bool>,
    pub publish_date: Option<DateTime<Utc>>,
    #[validate(length(max = 50))]
    pub keywords: Option<Vec<String>>,
    /// Apple only
    #[validate(length(max = 255))]
    pub subtitle: Option<String>,
    /// Apple only
    #[validate(length(max = 4000))]
    pub summary: Option<String>,
    /// Apple only
    #[validate(length(max = 255))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct BroadcastRequest {
    pub platforms: Vec<Platform>,
    #[serde(default)]
    #[validate(nested)]
    pub metadata: MetadataOverrides,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuickBroadcastRequest {
    /// Include every platform the user has already connected
    #[serde(default = "default_use_remembered")]
    pub use_remembered: bool,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl Default for QuickBroadcastRequest {
    fn default() -> Self {
        Self {
            use_remembered: true,
            platforms: Vec::new(),
        }
    }
}

fn default_use_remembered() -> bool {
    true
}

/// Outcome for one platform in one broadcast call
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BroadcastResult {
    pub platform: Platform,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
}

impl BroadcastResult {
    pub fn succeeded(platform: Platform, external_ref: Option<String>) -> Self {
        Self {
            platform,
            success: true,
            error: None,
            external_ref,
        }
    }

    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            error: Some(error.into()),
            external_ref: None,
        }
    }
}

/// Aggregated broadcast response. `success` is the request-level outcome;
/// per-platform outcomes live in `results`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BroadcastReport {
    pub success: bool,
    #[schema(value_type = Object)]
    pub results: BTreeMap<Platform, BroadcastResult>,
}

impl BroadcastReport {
    pub fn new(results: BTreeMap<Platform, BroadcastResult>) -> Self {
        Self {
            success: true,
            results,
        }
    }
}
