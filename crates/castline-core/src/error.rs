//! Error types module
//!
//! All pipeline errors are unified under the `AppError` enum. Per-platform
//! failures during a broadcast are reported as data inside the result map and
//! never surface as an `AppError`; the variants here are request-level.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;
use uuid::Uuid;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like upstream outages
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "ALREADY_FINALIZED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Ownership violation: {0}")]
    OwnershipViolation(String),

    #[error("Draft {0} is already finalized")]
    AlreadyFinalized(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Platform not connected: {0}")]
    NotConnected(String),

    #[error("Token expired for platform {0}")]
    TokenExpired(String),

    #[error("Token refresh failed for {platform}: {message}")]
    RefreshFailed { platform: String, message: String },

    #[error("{platform} rejected the request ({status}): {message}")]
    UpstreamRejected {
        platform: String,
        status: u16,
        message: String,
    },

    #[error("{platform} unavailable: {message}")]
    UpstreamUnavailable { platform: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::StorageUnavailable(_) => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the bearer token"),
            false,
            LogLevel::Debug,
        ),
        AppError::OwnershipViolation(_) => (
            403,
            "OWNERSHIP_VIOLATION",
            false,
            Some("Only the podcast owner can perform this operation"),
            false,
            LogLevel::Warn,
        ),
        AppError::AlreadyFinalized(_) => (
            409,
            "ALREADY_FINALIZED",
            false,
            Some("Fetch the episode created by the first finalize call"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidStateTransition { .. } => (
            409,
            "INVALID_STATE_TRANSITION",
            false,
            Some("Check the draft status before retrying"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotConnected(_) => (
            409,
            "NOT_CONNECTED",
            false,
            Some("Connect the platform account first"),
            false,
            LogLevel::Debug,
        ),
        AppError::TokenExpired(_) => (
            401,
            "TOKEN_EXPIRED",
            false,
            Some("Reconnect the platform account"),
            false,
            LogLevel::Debug,
        ),
        AppError::RefreshFailed { .. } => (
            401,
            "REFRESH_FAILED",
            false,
            Some("Reconnect the platform account"),
            false,
            LogLevel::Warn,
        ),
        AppError::UpstreamRejected { .. } => (
            422,
            "UPSTREAM_REJECTED",
            false,
            Some("Check the episode metadata against the platform's requirements"),
            false,
            LogLevel::Warn,
        ),
        AppError::UpstreamUnavailable { .. } => (
            502,
            "UPSTREAM_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::OwnershipViolation(_) => "OwnershipViolation",
            AppError::AlreadyFinalized(_) => "AlreadyFinalized",
            AppError::InvalidStateTransition { .. } => "InvalidStateTransition",
            AppError::NotConnected(_) => "NotConnected",
            AppError::TokenExpired(_) => "TokenExpired",
            AppError::RefreshFailed { .. } => "RefreshFailed",
            AppError::UpstreamRejected { .. } => "UpstreamRejected",
            AppError::UpstreamUnavailable { .. } => "UpstreamUnavailable",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::StorageUnavailable(_) => "Object storage is unavailable".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::OwnershipViolation(ref msg) => msg.clone(),
            AppError::AlreadyFinalized(id) => format!("Draft {} is already finalized", id),
            AppError::InvalidStateTransition { from, to } => {
                format!("Cannot move draft from {} to {}", from, to)
            }
            AppError::NotConnected(platform) => format!("{} is not connected", platform),
            AppError::TokenExpired(platform) => format!("{} token has expired", platform),
            AppError::RefreshFailed { platform, .. } => {
                format!("Could not refresh the {} connection", platform)
            }
            AppError::UpstreamRejected {
                platform, message, ..
            } => format!("{} rejected the request: {}", platform, message),
            AppError::UpstreamUnavailable { platform, .. } => {
                format!("{} is temporarily unavailable", platform)
            }
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
