//! HMAC signatures for local-backend object URLs.
//!
//! Signed message: `method \n key \n expires \n content_type`, where `expires` is a
//! unix timestamp in seconds and `content_type` is empty for reads.
//! Signature = base64url(HMAC-SHA256(secret, message)).

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies object URLs served by the API's `/objects` route
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl UrlSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> StorageResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(StorageError::ConfigError(
                "URL signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self { secret })
    }

    fn mac(
        &self,
        method: &str,
        key: &str,
        expires: i64,
        content_type: &str,
    ) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StorageError::ConfigError(format!("Invalid signing key: {}", e)))?;
        mac.update(method.to_ascii_uppercase().as_bytes());
        mac.update(b"\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac.update(b"\n");
        mac.update(content_type.as_bytes());
        Ok(mac)
    }

    /// Signature for a request that must happen before `expires`
    pub fn sign(
        &self,
        method: &str,
        key: &str,
        expires: i64,
        content_type: &str,
    ) -> StorageResult<String> {
        let tag = self.mac(method, key, expires, content_type)?.finalize().into_bytes();
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag))
    }

    /// Check a presented signature. Expired and mismatched signatures are both `InvalidKey`.
    pub fn verify(
        &self,
        method: &str,
        key: &str,
        expires: i64,
        content_type: &str,
        signature: &str,
        now: i64,
    ) -> StorageResult<()> {
        if now > expires {
            return Err(StorageError::InvalidKey("Signed URL has expired".to_string()));
        }
        let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::InvalidKey("Invalid URL signature".to_string()))?;
        self.mac(method, key, expires, content_type)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::InvalidKey("Invalid URL signature".to_string()))
    }
}
