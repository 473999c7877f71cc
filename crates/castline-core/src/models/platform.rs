use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppError;

/// External podcast platform an episode can be distributed to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Spotify,
    Apple,
    Google,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Spotify, Platform::Apple, Platform::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Spotify => "spotify",
            Platform::Apple => "apple",
            Platform::Google => "google",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spotify" => Ok(Platform::Spotify),
            "apple" => Ok(Platform::Apple),
            "google" => Ok(Platform::Google),
            other => Err(AppError::InvalidInput(format!(
                "Unknown platform: {}",
                other
            ))),
        }
    }
}

/// Stored OAuth credential set for one user on one platform
#[derive(Clone, PartialEq)]
pub struct PlatformConnection {
    pub user_id: Uuid,
    pub platform: Platform,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub account_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for PlatformConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConnection")
            .field("user_id", &self.user_id)
            .field("platform", &self.platform)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("account_email", &self.account_email)
            .finish()
    }
}

impl PlatformConnection {
    /// True when the access token outlives `now + margin`.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at > now + margin
    }
}

/// Token material returned by an OAuth authorization or refresh exchange
#[derive(Clone, Deserialize, ToSchema)]
pub struct TokenGrant {
    pub access_token: String,
    /// Absent when the provider does not rotate refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds; absent means the one-hour fallback applies
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub account_email: Option<String>,
}

/// Lifetime recorded when the provider omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

impl TokenGrant {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("account_email", &self.account_email)
            .finish()
    }
}

/// Public view of a connection; never carries tokens
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionSummary {
    pub platform: Platform,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    pub connected_at: DateTime<Utc>,
}

impl From<&PlatformConnection> for ConnectionSummary {
    fn from(conn: &PlatformConnection) -> Self {
        Self {
            platform: conn.platform,
            expires_at: conn.expires_at,
            account_email: conn.account_email.clone(),
            connected_at: conn.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(expires_at: DateTime<Utc>) -> PlatformConnection {
        let now = Utc::now();
        PlatformConnection {
            user_id: Uuid::new_v4(),
            platform: Platform::Spotify,
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            account_email: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_platform_parse_roundtrip() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("Spotify".parse::<Platform>().unwrap(), Platform::Spotify);
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_is_fresh_honours_margin() {
        let now = Utc::now();
        let margin = Duration::seconds(60);
        assert!(connection(now + Duration::seconds(600)).is_fresh(now, margin));
        assert!(!connection(now + Duration::seconds(30)).is_fresh(now, margin));
        assert!(!connection(now - Duration::seconds(1)).is_fresh(now, margin));
    }

    #[test]
    fn test_grant_without_expiry_gets_one_hour() {
        let grant: TokenGrant = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        let now = Utc::now();
        assert_eq!(grant.expires_at(now), now + Duration::seconds(3600));
        assert!(grant.refresh_token.is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", connection(Utc::now()));
        assert!(!rendered.contains("access\""));
        assert!(!rendered.contains("refresh\""));
        assert!(rendered.contains("[REDACTED]"));
    }
}
