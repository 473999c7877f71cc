use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use castline_core::models::{
    BeginAudioReplacementRequest, CompleteAudioReplacementRequest, Episode, SignedUrlResponse,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/episodes/{id}",
    tag = "episodes",
    params(("id" = Uuid, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Episode found", body = Episode),
        (status = 403, description = "Episode belongs to another user", body = ErrorResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, episode_id = %id, operation = "get_episode")
)]
pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Episode>, HttpAppError> {
    Ok(Json(state.episodes.get(user.user_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/publish",
    tag = "episodes",
    params(("id" = Uuid, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Episode published", body = Episode),
        (status = 403, description = "Episode belongs to another user", body = ErrorResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, episode_id = %id, operation = "publish_episode")
)]
pub async fn publish_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Episode>, HttpAppError> {
    Ok(Json(state.episodes.publish(user.user_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/unpublish",
    tag = "episodes",
    params(("id" = Uuid, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Episode unpublished", body = Episode),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, episode_id = %id, operation = "unpublish_episode")
)]
pub async fn unpublish_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Episode>, HttpAppError> {
    Ok(Json(state.episodes.unpublish(user.user_id, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/episodes/{id}/playback",
    tag = "episodes",
    params(("id" = Uuid, Path, description = "Episode ID")),
    responses(
        (status = 200, description = "Short-lived read URL for the episode audio", body = SignedUrlResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, episode_id = %id, operation = "playback_url")
)]
pub async fn playback_url(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SignedUrlResponse>, HttpAppError> {
    let signed = state.episodes.playback_url(user.user_id, id).await?;
    Ok(Json(SignedUrlResponse {
        url: signed.url,
        object_path: None,
        expires_at: signed.expires_at,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/audio",
    tag = "episodes",
    params(("id" = Uuid, Path, description = "Episode ID")),
    request_body = BeginAudioReplacementRequest,
    responses(
        (status = 200, description = "Signed URL for the replacement audio", body = SignedUrlResponse),
        (status = 400, description = "Unsupported content type", body = ErrorResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, episode_id = %id, operation = "begin_audio_replacement")
)]
pub async fn begin_audio_replacement(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<BeginAudioReplacementRequest>,
) -> Result<Json<SignedUrlResponse>, HttpAppError> {
    let response = state
        .episodes
        .begin_audio_replacement(user.user_id, id, &request.content_type)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/audio/complete",
    tag = "episodes",
    params(("id" = Uuid, Path, description = "Episode ID")),
    request_body = CompleteAudioReplacementRequest,
    responses(
        (status = 200, description = "Episode now points at the new audio", body = Episode),
        (status = 400, description = "Object path invalid or not uploaded", body = ErrorResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, episode_id = %id, operation = "complete_audio_replacement")
)]
pub async fn complete_audio_replacement(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CompleteAudioReplacementRequest>,
) -> Result<Json<Episode>, HttpAppError> {
    let episode = state
        .episodes
        .complete_audio_replacement(user.user_id, id, &request.object_path)
        .await?;
    Ok(Json(episode))
}
