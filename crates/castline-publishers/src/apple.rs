//! Apple Podcasts Connect adapter
//!
//! Uses a JSON:API style envelope. Apple additionally accepts subtitle, summary
//! and category; summary falls back to the description.

use anyhow::Result;
use async_trait::async_trait;
use castline_core::models::Platform;
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::http::{build_client, id_at, send_json};
use crate::publisher::{PodcastPublisher, PublishError, PublishReceipt, PublishRequest};

pub struct ApplePublisher {
    http_client: Client,
    base_url: String,
}

impl Debug for ApplePublisher {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ApplePublisher")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApplePublisher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn body(request: &PublishRequest) -> Value {
        let metadata = &request.metadata;
        let mut attributes = json!({
            "title": metadata.episode_title,
            "description": metadata.episode_description,
            "summary": metadata
                .summary
                .as_deref()
                .unwrap_or(&metadata.episode_description),
            "explicit": metadata.explicit,
            "publishDate": metadata.publish_date.to_rfc3339(),
            "keywords": metadata.keywords.join(","),
            "audioUrl": request.audio_url,
        });
        if let Some(subtitle) = &metadata.subtitle {
            attributes["subtitle"] = json!(subtitle);
        }
        if let Some(category) = &metadata.category {
            attributes["category"] = json!(category);
        }
        if let Some(number) = metadata.episode_number {
            attributes["episodeNumber"] = json!(number);
        }
        if let Some(season) = metadata.season_number {
            attributes["seasonNumber"] = json!(season);
        }

        json!({
            "data": {
                "type": "episodes",
                "attributes": attributes,
                "relationships": {
                    "show": { "data": { "type": "shows", "id": request.show_ref } }
                }
            }
        })
    }
}

#[async_trait]
impl PodcastPublisher for ApplePublisher {
    fn platform(&self) -> Platform {
        Platform::Apple
    }

    async fn create_episode(
        &self,
        request: &PublishRequest,
    ) -> Result<PublishReceipt, PublishError> {
        let url = format!("{}/episodes", self.base_url);
        let response = send_json(
            self.http_client
                .post(&url)
                .bearer_auth(&request.access_token)
                .json(&Self::body(request)),
        )
        .await?;

        let external_ref = id_at(&response, "/data/id");
        tracing::info!(
            show_ref = %request.show_ref,
            external_ref = ?external_ref,
            "Apple Podcasts episode created"
        );

        Ok(PublishReceipt { external_ref })
    }
}
