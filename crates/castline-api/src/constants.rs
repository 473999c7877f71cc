//! API constants

/// Versioned prefix for every JSON route
pub const API_PREFIX: &str = "/api/v1";

/// Header the feed renderer authenticates with
pub const FEED_SERVICE_KEY_HEADER: &str = "x-service-key";

/// Largest object accepted through the local `/objects` route
pub const MAX_OBJECT_BYTES: usize = 512 * 1024 * 1024;

/// Largest JSON body accepted by the versioned API
pub const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Upper bound on one API request; broadcasts bound each platform separately
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default server-wide in-flight request limit
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;
