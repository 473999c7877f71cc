//! Configuration module
//!
//! Configuration for the publishing pipeline: server, database, object storage,
//! signed-URL lifetimes, credential refresh and the per-platform OAuth clients.

use std::env;
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};

use crate::models::Platform;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_TTL_SECS: u64 = 15 * 60;
const PREVIEW_URL_TTL_SECS: u64 = 15 * 60;
const FEED_URL_TTL_SECS: u64 = 24 * 60 * 60;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
const PLATFORM_TIMEOUT_SECS: u64 = 30;
const BROADCAST_UNAVAILABLE_RETRIES: u32 = 0;
const BROADCAST_RETRY_BACKOFF_MS: u64 = 500;
const DEFAULT_AUDIO_CONTENT_TYPES: &str =
    "audio/mpeg,audio/mp4,audio/x-m4a,audio/wav,audio/x-wav,audio/ogg,audio/flac,audio/aac";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
    /// `json` switches the log formatter to JSON lines
    pub log_format: String,
}

/// OAuth client and API endpoint for one platform
#[derive(Clone)]
pub struct PlatformClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub token_url: String,
}

impl std::fmt::Debug for PlatformClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl PlatformClientConfig {
    /// Both OAuth client credentials are present
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    fn with_endpoints(api_base: &str, token_url: &str) -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: api_base.to_string(),
            token_url: token_url.to_string(),
        }
    }

    fn from_env(prefix: &str, default_api_base: &str, default_token_url: &str) -> Self {
        Self {
            client_id: env::var(format!("{}_CLIENT_ID", prefix)).unwrap_or_default(),
            client_secret: env::var(format!("{}_CLIENT_SECRET", prefix)).unwrap_or_default(),
            api_base: env::var(format!("{}_API_BASE", prefix))
                .unwrap_or_else(|_| default_api_base.to_string()),
            token_url: env::var(format!("{}_TOKEN_URL", prefix))
                .unwrap_or_else(|_| default_token_url.to_string()),
        }
    }
}

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Shared key for the downstream feed renderer
    pub feed_service_key: Option<String>,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub url_signing_secret: Option<String>,
    // Signed URL lifetimes
    pub upload_url_ttl_secs: u64,
    pub preview_url_ttl_secs: u64,
    pub feed_url_ttl_secs: u64,
    pub audio_allowed_content_types: Vec<String>,
    // Credentials and distribution
    pub token_refresh_margin_secs: i64,
    pub platform_timeout_secs: u64,
    pub broadcast_unavailable_retries: u32,
    pub broadcast_retry_backoff_ms: u64,
    pub encryption_key: Option<String>,
    pub spotify: PlatformClientConfig,
    pub apple: PlatformClientConfig,
    pub google: PlatformClientConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
                jwt_secret: String::new(),
                environment: "development".to_string(),
                log_format: "pretty".to_string(),
            },
            database_url: String::new(),
            feed_service_key: None,
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("./storage".to_string()),
            local_storage_base_url: Some(format!("http://localhost:{}", SERVER_PORT)),
            url_signing_secret: None,
            upload_url_ttl_secs: UPLOAD_URL_TTL_SECS,
            preview_url_ttl_secs: PREVIEW_URL_TTL_SECS,
            feed_url_ttl_secs: FEED_URL_TTL_SECS,
            audio_allowed_content_types: split_list(DEFAULT_AUDIO_CONTENT_TYPES),
            token_refresh_margin_secs: TOKEN_REFRESH_MARGIN_SECS,
            platform_timeout_secs: PLATFORM_TIMEOUT_SECS,
            broadcast_unavailable_retries: BROADCAST_UNAVAILABLE_RETRIES,
            broadcast_retry_backoff_ms: BROADCAST_RETRY_BACKOFF_MS,
            encryption_key: None,
            spotify: PlatformClientConfig::with_endpoints(
                "https://partner-api.spotify.com/v1",
                "https://accounts.spotify.com/api/token",
            ),
            apple: PlatformClientConfig::with_endpoints(
                "https://api.podcastsconnect.apple.com/v1",
                "https://appleid.apple.com/auth/oauth2/token",
            ),
            google: PlatformClientConfig::with_endpoints(
                "https://www.googleapis.com/youtube/v3",
                "https://oauth2.googleapis.com/token",
            ),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => defaults.storage_backend,
        };

        let server_port = env_parse("PORT", SERVER_PORT);

        let audio_allowed_content_types = env::var("AUDIO_ALLOWED_CONTENT_TYPES")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.audio_allowed_content_types);

        Ok(Self {
            base: BaseConfig {
                server_port,
                cors_origins,
                db_max_connections: env_parse("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
                db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
                jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
                environment,
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            },
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            feed_service_key: env::var("FEED_SERVICE_KEY").ok().filter(|s| !s.is_empty()),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .ok()
                .or(defaults.local_storage_path),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .ok()
                .or_else(|| Some(format!("http://localhost:{}", server_port))),
            url_signing_secret: env::var("URL_SIGNING_SECRET").ok(),
            upload_url_ttl_secs: env_parse("UPLOAD_URL_TTL_SECS", UPLOAD_URL_TTL_SECS),
            preview_url_ttl_secs: env_parse("PREVIEW_URL_TTL_SECS", PREVIEW_URL_TTL_SECS),
            feed_url_ttl_secs: env_parse("FEED_URL_TTL_SECS", FEED_URL_TTL_SECS),
            audio_allowed_content_types,
            token_refresh_margin_secs: env_parse(
                "TOKEN_REFRESH_MARGIN_SECS",
                TOKEN_REFRESH_MARGIN_SECS,
            ),
            platform_timeout_secs: env_parse("PLATFORM_TIMEOUT_SECS", PLATFORM_TIMEOUT_SECS),
            broadcast_unavailable_retries: env_parse(
                "BROADCAST_UNAVAILABLE_RETRIES",
                BROADCAST_UNAVAILABLE_RETRIES,
            ),
            broadcast_retry_backoff_ms: env_parse(
                "BROADCAST_RETRY_BACKOFF_MS",
                BROADCAST_RETRY_BACKOFF_MS,
            ),
            encryption_key: env::var("ENCRYPTION_KEY").ok(),
            spotify: PlatformClientConfig::from_env(
                "SPOTIFY",
                &defaults.spotify.api_base,
                &defaults.spotify.token_url,
            ),
            apple: PlatformClientConfig::from_env(
                "APPLE",
                &defaults.apple.api_base,
                &defaults.apple.token_url,
            ),
            google: PlatformClientConfig::from_env(
                "GOOGLE",
                &defaults.google.api_base,
                &defaults.google.token_url,
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                match &self.url_signing_secret {
                    Some(secret) if secret.len() >= 32 => {}
                    _ => {
                        return Err(anyhow::anyhow!(
                            "URL_SIGNING_SECRET must be at least 32 characters when using local storage backend"
                        ));
                    }
                }
            }
        }

        let key = self
            .encryption_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("ENCRYPTION_KEY must be set"))?;
        let decoded = general_purpose::STANDARD
            .decode(key.trim())
            .map_err(|e| anyhow::anyhow!("ENCRYPTION_KEY must be valid base64: {}", e))?;
        if decoded.len() != 32 {
            return Err(anyhow::anyhow!(
                "ENCRYPTION_KEY must decode to exactly 32 bytes"
            ));
        }

        if self.audio_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "AUDIO_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PipelineConfig>);

impl Config {
    fn as_pipeline(&self) -> &PipelineConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_pipeline().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PipelineConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_pipeline().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_pipeline().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_pipeline().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_pipeline().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_pipeline().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_pipeline().base.db_timeout_seconds
    }

    pub fn log_json(&self) -> bool {
        self.as_pipeline().base.log_format.eq_ignore_ascii_case("json")
    }

    pub fn database_url(&self) -> &str {
        &self.as_pipeline().database_url
    }

    pub fn feed_service_key(&self) -> Option<&str> {
        self.as_pipeline().feed_service_key.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_pipeline().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_pipeline().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_pipeline().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_pipeline().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_pipeline().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_pipeline().local_storage_base_url.as_deref()
    }

    pub fn url_signing_secret(&self) -> Option<&str> {
        self.as_pipeline().url_signing_secret.as_deref()
    }

    pub fn upload_url_ttl_secs(&self) -> u64 {
        self.as_pipeline().upload_url_ttl_secs
    }

    pub fn preview_url_ttl_secs(&self) -> u64 {
        self.as_pipeline().preview_url_ttl_secs
    }

    pub fn feed_url_ttl_secs(&self) -> u64 {
        self.as_pipeline().feed_url_ttl_secs
    }

    pub fn audio_allowed_content_types(&self) -> &[String] {
        &self.as_pipeline().audio_allowed_content_types
    }

    pub fn token_refresh_margin_secs(&self) -> i64 {
        self.as_pipeline().token_refresh_margin_secs
    }

    pub fn platform_timeout_secs(&self) -> u64 {
        self.as_pipeline().platform_timeout_secs
    }

    pub fn broadcast_unavailable_retries(&self) -> u32 {
        self.as_pipeline().broadcast_unavailable_retries
    }

    pub fn broadcast_retry_backoff_ms(&self) -> u64 {
        self.as_pipeline().broadcast_retry_backoff_ms
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.as_pipeline().encryption_key.as_deref()
    }

    pub fn platform_client(&self, platform: Platform) -> &PlatformClientConfig {
        match platform {
            Platform::Spotify => &self.as_pipeline().spotify,
            Platform::Apple => &self.as_pipeline().apple,
            Platform::Google => &self.as_pipeline().google,
        }
    }
}
