//! OAuth2 refresh-token exchange
//!
//! `TokenRefresher` is the seam the credential vault refreshes through, so it
//! can be replaced in tests. The HTTP implementation posts
//! `grant_type=refresh_token` to each platform's token endpoint.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use castline_core::models::{Platform, TokenGrant};
use castline_core::Config;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::http::build_client;

#[derive(Debug, Error)]
pub enum OAuthError {
    /// The provider answered `invalid_grant`: the refresh token is revoked or expired
    #[error("refresh token rejected: {0}")]
    Rejected(String),

    /// Anything else, including client misconfiguration (`invalid_client`);
    /// the stored credential may still be valid
    #[error("token endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("no OAuth client configured for {0}")]
    NotConfigured(Platform),
}

#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, platform: Platform, refresh_token: &str)
        -> Result<TokenGrant, OAuthError>;
}

/// Client credentials and token endpoint for one platform
#[derive(Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl Debug for OAuthClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .finish()
    }
}

pub struct HttpTokenRefresher {
    http_client: Client,
    clients: HashMap<Platform, OAuthClient>,
}

impl HttpTokenRefresher {
    pub fn new(clients: HashMap<Platform, OAuthClient>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            clients,
        })
    }

    /// Registers only platforms with client credentials; the rest answer `NotConfigured`
    pub fn from_config(config: &Config) -> Result<Self> {
        let clients: HashMap<Platform, OAuthClient> = Platform::ALL
            .into_iter()
            .filter_map(|platform| {
                let client = config.platform_client(platform);
                if !client.is_configured() {
                    tracing::warn!(
                        platform = %platform,
                        "No OAuth client credentials, token refresh disabled"
                    );
                    return None;
                }
                Some((
                    platform,
                    OAuthClient {
                        client_id: client.client_id.clone(),
                        client_secret: client.client_secret.clone(),
                        token_url: client.token_url.clone(),
                    },
                ))
            })
            .collect();
        Self::new(
            clients,
            Duration::from_secs(config.platform_timeout_secs()),
        )
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(
        &self,
        platform: Platform,
        refresh_token: &str,
    ) -> Result<TokenGrant, OAuthError> {
        let client = self
            .clients
            .get(&platform)
            .ok_or(OAuthError::NotConfigured(platform))?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&client.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| OAuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                platform = %platform,
                status = status.as_u16(),
                "Token refresh failed"
            );
            let message = format!("{} - {}", status, error_text);
            return Err(
                if status.is_client_error() && is_invalid_grant(&error_text) {
                    OAuthError::Rejected(message)
                } else {
                    OAuthError::Unavailable(message)
                },
            );
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| OAuthError::Unavailable(format!("Failed to parse token response: {}", e)))
    }
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
}

/// Whether a token endpoint error body carries the RFC 6749 `invalid_grant` code
fn is_invalid_grant(body: &str) -> bool {
    serde_json::from_str::<OAuthErrorBody>(body).is_ok_and(|parsed| parsed.error == "invalid_grant")
}
