//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::FEED_SERVICE_KEY_HEADER;
use crate::error;
use crate::handlers;
use castline_core::models;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "service_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(FEED_SERVICE_KEY_HEADER))),
        );
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Castline API",
        version = "0.1.0",
        description = "Podcast episode publishing and distribution: draft uploads through signed URLs, finalize into episodes, and broadcast to Spotify, Apple Podcasts and Google. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Drafts
        handlers::drafts::create_draft,
        handlers::drafts::confirm_upload,
        handlers::drafts::begin_edit,
        handlers::drafts::complete_edit,
        handlers::drafts::preview_draft,
        handlers::drafts::finalize_draft,
        // Episodes
        handlers::episodes::get_episode,
        handlers::episodes::publish_episode,
        handlers::episodes::unpublish_episode,
        handlers::episodes::playback_url,
        handlers::episodes::begin_audio_replacement,
        handlers::episodes::complete_audio_replacement,
        // Broadcast
        handlers::broadcast::broadcast_episode,
        handlers::broadcast::quick_broadcast,
        // Connections
        handlers::connections::list_connections,
        handlers::connections::put_connection,
        handlers::connections::delete_connection,
        // Feed
        handlers::feed::feed_audio_url,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::CreateDraftRequest,
            models::CreatedDraft,
            models::Draft,
            models::DraftStatus,
            models::SignedUrlResponse,
            models::CompleteEditRequest,
            models::FinalizeMetadata,
            models::Episode,
            models::BeginAudioReplacementRequest,
            models::CompleteAudioReplacementRequest,
            models::Platform,
            models::BroadcastMode,
            models::BroadcastRequest,
            models::QuickBroadcastRequest,
            models::MetadataOverrides,
            models::BroadcastResult,
            models::BroadcastReport,
            models::TokenGrant,
            models::ConnectionSummary,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "drafts", description = "Draft creation, signed uploads, edits and finalize"),
        (name = "episodes", description = "Episode reads, publication state and audio replacement"),
        (name = "broadcast", description = "Distribution to external podcast platforms"),
        (name = "connections", description = "Per-platform OAuth connections"),
        (name = "feed", description = "Read URLs for the RSS feed renderer"),
        (name = "health", description = "Liveness and dependency health")
    )
)]
pub struct ApiDoc;
