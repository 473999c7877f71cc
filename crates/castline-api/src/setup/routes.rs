//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, feed_key_middleware, AuthState};
use crate::auth::JwtService;
use crate::constants::{
    API_PREFIX, DEFAULT_HTTP_CONCURRENCY_LIMIT, MAX_JSON_BODY_BYTES, MAX_OBJECT_BYTES,
    REQUEST_TIMEOUT_SECS,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use castline_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: JwtService::new(config.jwt_secret()),
        feed_service_key: config.feed_service_key().map(String::from),
    });
    if auth_state.feed_service_key.is_none() {
        tracing::warn!("FEED_SERVICE_KEY not set; feed routes will reject every request");
    }

    let protected = protected_routes().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        auth_middleware,
    ));
    let feed = feed_routes().layer(axum::middleware::from_fn_with_state(
        auth_state,
        feed_key_middleware,
    ));

    let api = protected
        .merge(feed)
        .layer(RequestBodyLimitLayer::new(MAX_JSON_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let app = public_routes()
        .merge(api)
        .merge(object_routes())
        .with_state(state)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Signed object routes; the URL signature is the only credential
fn object_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/objects/{*key}",
            put(handlers::objects::put_object).get(handlers::objects::get_object),
        )
        .layer(DefaultBodyLimit::max(MAX_OBJECT_BYTES))
}

/// Routes for the feed renderer, authenticated by the service key
fn feed_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/feed/episodes/{{id}}/audio", API_PREFIX),
        get(handlers::feed::feed_audio_url),
    )
}

/// Bearer-authenticated user routes
fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(draft_routes())
        .merge(episode_routes())
        .merge(connection_routes())
}

fn draft_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/drafts", API_PREFIX),
            post(handlers::drafts::create_draft),
        )
        .route(
            &format!("{}/drafts/{{id}}/uploaded", API_PREFIX),
            post(handlers::drafts::confirm_upload),
        )
        .route(
            &format!("{}/drafts/{{id}}/edit", API_PREFIX),
            post(handlers::drafts::begin_edit),
        )
        .route(
            &format!("{}/drafts/{{id}}/edit/complete", API_PREFIX),
            post(handlers::drafts::complete_edit),
        )
        .route(
            &format!("{}/drafts/{{id}}/preview", API_PREFIX),
            get(handlers::drafts::preview_draft),
        )
        .route(
            &format!("{}/drafts/{{id}}/finalize", API_PREFIX),
            post(handlers::drafts::finalize_draft),
        )
}

fn episode_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/episodes/{{id}}", API_PREFIX),
            get(handlers::episodes::get_episode),
        )
        .route(
            &format!("{}/episodes/{{id}}/publish", API_PREFIX),
            post(handlers::episodes::publish_episode),
        )
        .route(
            &format!("{}/episodes/{{id}}/unpublish", API_PREFIX),
            post(handlers::episodes::unpublish_episode),
        )
        .route(
            &format!("{}/episodes/{{id}}/playback", API_PREFIX),
            get(handlers::episodes::playback_url),
        )
        .route(
            &format!("{}/episodes/{{id}}/audio", API_PREFIX),
            post(handlers::episodes::begin_audio_replacement),
        )
        .route(
            &format!("{}/episodes/{{id}}/audio/complete", API_PREFIX),
            post(handlers::episodes::complete_audio_replacement),
        )
        .route(
            &format!("{}/episodes/{{id}}/broadcast", API_PREFIX),
            post(handlers::broadcast::broadcast_episode),
        )
        .route(
            &format!("{}/episodes/{{id}}/broadcast/quick", API_PREFIX),
            post(handlers::broadcast::quick_broadcast),
        )
}

fn connection_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/connections", API_PREFIX),
            get(handlers::connections::list_connections),
        )
        .route(
            &format!("{}/connections/{{platform}}", API_PREFIX),
            put(handlers::connections::put_connection)
                .delete(handlers::connections::delete_connection),
        )
}
