//! Signed URL issuer
//!
//! Every URL handed to a client, a platform adapter or the feed renderer is
//! minted here, fresh per request. Transient object-store failures get exactly
//! one retry before surfacing as `StorageUnavailable`.

use std::sync::Arc;
use std::time::Duration;

use castline_core::{AppError, Config};
use chrono::{DateTime, Utc};

use crate::{Storage, StorageError, StorageResult};

/// TTL presets for the three kinds of signed URL the pipeline issues
#[derive(Debug, Clone, Copy)]
pub struct UrlTtls {
    /// Client uploads of draft and replacement audio
    pub upload: Duration,
    /// Editing preview and owner playback
    pub preview: Duration,
    /// RSS feed and platform ingestion
    pub feed: Duration,
}

impl Default for UrlTtls {
    fn default() -> Self {
        Self {
            upload: Duration::from_secs(15 * 60),
            preview: Duration::from_secs(15 * 60),
            feed: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl UrlTtls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload: Duration::from_secs(config.upload_url_ttl_secs()),
            preview: Duration::from_secs(config.preview_url_ttl_secs()),
            feed: Duration::from_secs(config.feed_url_ttl_secs()),
        }
    }
}

/// A signed URL and the moment it stops working
#[derive(Debug, Clone)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SignedUrlIssuer {
    storage: Arc<dyn Storage>,
    ttls: UrlTtls,
}

impl SignedUrlIssuer {
    pub fn new(storage: Arc<dyn Storage>, ttls: UrlTtls) -> Self {
        Self { storage, ttls }
    }

    pub fn ttls(&self) -> UrlTtls {
        self.ttls
    }

    /// Grant direct write access to `path`
    pub async fn issue_write_url(
        &self,
        path: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<SignedUrl, AppError> {
        let issued_at = Utc::now();
        let url = with_one_retry("presign_put", path, || {
            self.storage.presigned_put_url(path, content_type, ttl)
        })
        .await?;
        Ok(SignedUrl {
            url,
            expires_at: expiry(issued_at, ttl),
        })
    }

    /// Grant direct read access to `path`
    pub async fn issue_read_url(&self, path: &str, ttl: Duration) -> Result<SignedUrl, AppError> {
        let issued_at = Utc::now();
        let url = with_one_retry("presign_get", path, || {
            self.storage.presigned_get_url(path, ttl)
        })
        .await?;
        Ok(SignedUrl {
            url,
            expires_at: expiry(issued_at, ttl),
        })
    }

    pub async fn upload_url(&self, path: &str, content_type: &str) -> Result<SignedUrl, AppError> {
        self.issue_write_url(path, content_type, self.ttls.upload)
            .await
    }

    pub async fn preview_url(&self, path: &str) -> Result<SignedUrl, AppError> {
        self.issue_read_url(path, self.ttls.preview).await
    }

    pub async fn feed_url(&self, path: &str) -> Result<SignedUrl, AppError> {
        self.issue_read_url(path, self.ttls.feed).await
    }
}

fn expiry(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    issued_at + chrono::Duration::seconds(ttl.as_secs() as i64)
}

async fn with_one_retry<F, Fut>(
    op: &'static str,
    path: &str,
    mut call: F,
) -> Result<String, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = StorageResult<String>>,
{
    match call().await {
        Ok(url) => Ok(url),
        Err(err) if err.is_transient() => {
            tracing::warn!(op, key = %path, error = %err, "Signing failed, retrying once");
            call().await.map_err(|err| {
                tracing::error!(op, key = %path, error = %err, "Signing failed after retry");
                unavailable(err)
            })
        }
        Err(err) => Err(err.into()),
    }
}

fn unavailable(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidKey(_) | StorageError::NotFound(_) => err.into(),
        other => AppError::StorageUnavailable(other.to_string()),
    }
}
