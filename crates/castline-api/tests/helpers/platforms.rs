use async_trait::async_trait;
use castline_core::models::{Platform, TokenGrant};
use castline_publishers::{
    OAuthError, PodcastPublisher, PublishError, PublishReceipt, PublishRequest, TokenRefresher,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Adapter that records every request and succeeds unless told to reject
pub struct StubPublisher {
    platform: Platform,
    reject: AtomicBool,
    requests: Mutex<Vec<PublishRequest>>,
}

impl StubPublisher {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            reject: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reject_all(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<PublishRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PodcastPublisher for StubPublisher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn create_episode(
        &self,
        request: &PublishRequest,
    ) -> Result<PublishReceipt, PublishError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.reject.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected {
                status: 422,
                message: "invalid category".to_string(),
            });
        }
        Ok(PublishReceipt {
            external_ref: Some(format!("{}-episode-1", self.platform)),
        })
    }
}

/// OAuth refresher that always grants `refreshed-token`
#[derive(Default)]
pub struct StubRefresher {
    calls: AtomicUsize,
}

impl StubRefresher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for StubRefresher {
    async fn refresh(
        &self,
        _platform: Platform,
        _refresh_token: &str,
    ) -> Result<TokenGrant, OAuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenGrant {
            access_token: "refreshed-token".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            account_email: None,
        })
    }
}
