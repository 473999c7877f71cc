//! Credential vault
//!
//! Hands out usable platform access tokens, refreshing them through the
//! platform's OAuth endpoint when they are about to expire. Refreshes are
//! single-flight per `(user_id, platform)`: the first caller to find a stale
//! token starts one refresh task, and every caller that arrives while it runs
//! receives that task's outcome, failures included.
//!
//! The refresh runs on its own task so a caller that gives up (a broadcast
//! timeout) does not abandon a refresh the provider may already have applied.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use castline_core::models::{ConnectionSummary, Platform, PlatformConnection, TokenGrant};
use castline_core::{AppError, Config};
use castline_db::ConnectionStore;
use castline_publishers::{OAuthError, TokenRefresher};
use chrono::{Duration, Utc};
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// A token ready to send upstream, plus the account it belongs to
#[derive(Clone)]
pub struct AccessCredential {
    pub access_token: String,
    pub account_email: Option<String>,
}

impl From<PlatformConnection> for AccessCredential {
    fn from(connection: PlatformConnection) -> Self {
        Self {
            access_token: connection.access_token,
            account_email: connection.account_email,
        }
    }
}

type RefreshKey = (Uuid, Platform);

/// What a finished refresh hands to every caller that waited on it.
/// Store errors travel as their message since `AppError` is not `Clone`.
type RefreshOutcome = Result<Option<AccessCredential>, String>;

type InflightTable = Arc<Mutex<HashMap<RefreshKey, watch::Receiver<Option<RefreshOutcome>>>>>;

pub struct CredentialVault {
    connections: Arc<dyn ConnectionStore>,
    refresher: Arc<dyn TokenRefresher>,
    inflight: InflightTable,
    refresh_margin: Duration,
}

impl CredentialVault {
    pub fn new(
        connections: Arc<dyn ConnectionStore>,
        refresher: Arc<dyn TokenRefresher>,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            connections,
            refresher,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            refresh_margin,
        }
    }

    pub fn from_config(
        config: &Config,
        connections: Arc<dyn ConnectionStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self::new(
            connections,
            refresher,
            Duration::seconds(config.token_refresh_margin_secs()),
        )
    }

    /// Access token for `platform`, refreshed if needed.
    ///
    /// `None` means the platform must be treated as not connected for this call.
    pub async fn get_valid_access_token(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<String>, AppError> {
        Ok(self
            .get_valid_credential(user_id, platform)
            .await?
            .map(|credential| credential.access_token))
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, platform = %platform))]
    pub async fn get_valid_credential(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<AccessCredential>, AppError> {
        let Some(connection) = self.connections.get_connection(user_id, platform).await? else {
            return Ok(None);
        };
        if connection.is_fresh(Utc::now(), self.refresh_margin) {
            return Ok(Some(connection.into()));
        }

        let mut receiver = self.join_or_start_refresh((user_id, platform));
        let outcome = {
            let seen = receiver
                .wait_for(Option::is_some)
                .await
                .map_err(|_| AppError::Internal("Token refresh ended without a result".to_string()))?;
            (*seen).clone()
        };
        match outcome {
            Some(result) => result.map_err(AppError::Internal),
            None => Err(AppError::Internal(
                "Token refresh ended without a result".to_string(),
            )),
        }
    }

    /// Subscribe to the refresh running for `key`, starting one if there is none
    fn join_or_start_refresh(&self, key: RefreshKey) -> watch::Receiver<Option<RefreshOutcome>> {
        let mut table = self.inflight.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(receiver) = table.get(&key) {
            tracing::debug!("Joining in-flight token refresh");
            return receiver.clone();
        }

        let (sender, receiver) = watch::channel(None);
        table.insert(key, receiver.clone());
        drop(table);

        let task = RefreshTask {
            connections: Arc::clone(&self.connections),
            refresher: Arc::clone(&self.refresher),
            refresh_margin: self.refresh_margin,
            slot: InflightSlot {
                table: Arc::clone(&self.inflight),
                key,
            },
        };
        tokio::spawn(task.run(sender).instrument(tracing::Span::current()));
        receiver
    }

    /// Number of refreshes currently running
    pub fn refreshes_in_flight(&self) -> usize {
        self.inflight.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Store the grant returned by the OAuth callback
    #[tracing::instrument(skip(self, grant), fields(user_id = %user_id, platform = %platform))]
    pub async fn connect(
        &self,
        user_id: Uuid,
        platform: Platform,
        grant: TokenGrant,
    ) -> Result<ConnectionSummary, AppError> {
        if grant.access_token.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "access_token must not be empty".to_string(),
            ));
        }

        let existing = self.connections.get_connection(user_id, platform).await?;
        let refresh_token = match (grant.refresh_token.clone(), existing.as_ref()) {
            (Some(token), _) if !token.trim().is_empty() => token,
            (_, Some(previous)) => previous.refresh_token.clone(),
            _ => {
                return Err(AppError::InvalidInput(
                    "refresh_token is required for a new connection".to_string(),
                ))
            }
        };

        let now = Utc::now();
        let connection = PlatformConnection {
            user_id,
            platform,
            access_token: grant.access_token.clone(),
            refresh_token,
            expires_at: grant.expires_at(now),
            account_email: grant
                .account_email
                .clone()
                .or_else(|| existing.as_ref().and_then(|c| c.account_email.clone())),
            created_at: existing.as_ref().map(|c| c.created_at).unwrap_or(now),
            updated_at: now,
        };
        self.connections.upsert_connection(&connection).await?;
        tracing::info!("Platform connected");

        Ok(ConnectionSummary::from(&connection))
    }

    pub async fn disconnect(&self, user_id: Uuid, platform: Platform) -> Result<(), AppError> {
        if self.connections.delete_connection(user_id, platform).await? {
            tracing::info!(user_id = %user_id, platform = %platform, "Platform disconnected");
            Ok(())
        } else {
            Err(AppError::NotConnected(platform.to_string()))
        }
    }

    pub async fn connected_platforms(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConnectionSummary>, AppError> {
        let mut summaries: Vec<ConnectionSummary> = self
            .connections
            .list_connections(user_id)
            .await?
            .iter()
            .map(ConnectionSummary::from)
            .collect();
        summaries.sort_by_key(|s| s.platform);
        Ok(summaries)
    }
}

/// Removes the in-flight entry once its refresh task finishes or unwinds
struct InflightSlot {
    table: InflightTable,
    key: RefreshKey,
}

impl Drop for InflightSlot {
    fn drop(&mut self) {
        self.table
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&self.key);
    }
}

struct RefreshTask {
    connections: Arc<dyn ConnectionStore>,
    refresher: Arc<dyn TokenRefresher>,
    refresh_margin: Duration,
    slot: InflightSlot,
}

impl RefreshTask {
    async fn run(self, sender: watch::Sender<Option<RefreshOutcome>>) {
        let outcome = self.refresh().await.map_err(|e| e.to_string());
        // Free the slot first: once waiters wake, the next stale read starts afresh
        drop(self);
        sender.send_replace(Some(outcome));
    }

    async fn refresh(&self) -> Result<Option<AccessCredential>, AppError> {
        let (user_id, platform) = self.slot.key;

        // A refresh that finished just before this one started may have left a
        // fresh token, or a rejected one may have dropped the connection
        let Some(connection) = self.connections.get_connection(user_id, platform).await? else {
            return Ok(None);
        };
        if connection.is_fresh(Utc::now(), self.refresh_margin) {
            tracing::debug!("Reusing token refreshed by a concurrent caller");
            return Ok(Some(connection.into()));
        }

        let outcome = self
            .refresher
            .refresh(platform, &connection.refresh_token)
            .await;
        match outcome {
            Ok(grant) => {
                let now = Utc::now();
                let refreshed = PlatformConnection {
                    access_token: grant.access_token.clone(),
                    expires_at: grant.expires_at(now),
                    refresh_token: grant
                        .refresh_token
                        .clone()
                        .unwrap_or(connection.refresh_token),
                    account_email: grant.account_email.clone().or(connection.account_email),
                    updated_at: now,
                    ..connection
                };
                self.connections.upsert_connection(&refreshed).await?;
                tracing::info!(expires_at = %refreshed.expires_at, "Access token refreshed");
                Ok(Some(refreshed.into()))
            }
            Err(OAuthError::Rejected(message)) => {
                let error = AppError::RefreshFailed {
                    platform: platform.to_string(),
                    message,
                };
                let removed = self
                    .connections
                    .delete_connection_if_unchanged(user_id, platform, connection.updated_at)
                    .await?;
                if removed {
                    tracing::warn!(error = %error, "Refresh token rejected, removing connection");
                } else {
                    tracing::warn!(
                        error = %error,
                        "Refresh token rejected, but the connection was replaced meanwhile"
                    );
                }
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Token refresh unavailable, keeping stored connection"
                );
                Ok(None)
            }
        }
    }
}
