use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use castline_core::models::SignedUrlResponse;
use std::sync::Arc;
use uuid::Uuid;

/// Long-lived read URL for the RSS renderer. Unpublished episodes answer 404.
#[utoipa::path(
    get,
    path = "/api/v1/feed/episodes/{id}/audio",
    tag = "feed",
    params(("id" = Uuid, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Feed-TTL read URL", body = SignedUrlResponse),
        (status = 401, description = "Missing or invalid service key", body = ErrorResponse),
        (status = 404, description = "Episode not found or not published", body = ErrorResponse)
    ),
    security(("service_key" = []))
)]
#[tracing::instrument(skip(state), fields(episode_id = %id, operation = "feed_audio_url"))]
pub async fn feed_audio_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SignedUrlResponse>, HttpAppError> {
    let signed = state.episodes.feed_audio_url(id).await?;
    Ok(Json(SignedUrlResponse {
        url: signed.url,
        object_path: None,
        expires_at: signed.expires_at,
    }))
}
