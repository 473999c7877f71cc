use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use castline_core::models::{BroadcastReport, BroadcastRequest, QuickBroadcastRequest};
use std::sync::Arc;
use uuid::Uuid;

/// Per-platform failures come back inside `results`; only request-level problems produce an error status.
#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/broadcast",
    tag = "broadcast",
    params(("id" = Uuid, Path, description = "Episode ID")),
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "One result per requested platform", body = BroadcastReport),
        (status = 400, description = "No platforms or invalid metadata", body = ErrorResponse),
        (status = 403, description = "Episode belongs to another user", body = ErrorResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        user_id = %user.user_id,
        episode_id = %id,
        platforms = ?request.platforms,
        operation = "broadcast_episode"
    )
)]
pub async fn broadcast_episode(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<BroadcastRequest>,
) -> Result<Json<BroadcastReport>, HttpAppError> {
    let report = state
        .distribution
        .broadcast_explicit(user.user_id, id, request)
        .await?;
    Ok(Json(report))
}

/// The body is optional; an empty request broadcasts to every connected platform.
#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/broadcast/quick",
    tag = "broadcast",
    params(("id" = Uuid, Path, description = "Episode ID")),
    request_body = QuickBroadcastRequest,
    responses(
        (status = 200, description = "One result per effective platform", body = BroadcastReport),
        (status = 403, description = "Episode belongs to another user", body = ErrorResponse),
        (status = 404, description = "Episode not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, body),
    fields(user_id = %user.user_id, episode_id = %id, operation = "quick_broadcast")
)]
pub async fn quick_broadcast(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    body: Result<Json<QuickBroadcastRequest>, JsonRejection>,
) -> Result<Json<BroadcastReport>, HttpAppError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => QuickBroadcastRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let report = state
        .distribution
        .broadcast_quick(user.user_id, id, request)
        .await?;
    Ok(Json(report))
}
