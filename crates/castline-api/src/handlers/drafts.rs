use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use castline_core::models::{
    CompleteEditRequest, CreateDraftRequest, CreatedDraft, Draft, Episode, FinalizeMetadata,
    SignedUrlResponse,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/drafts",
    tag = "drafts",
    request_body = CreateDraftRequest,
    responses(
        (status = 201, description = "Draft created with a signed upload URL", body = CreatedDraft),
        (status = 400, description = "Unsupported content type", body = ErrorResponse),
        (status = 403, description = "Podcast belongs to another user", body = ErrorResponse),
        (status = 404, description = "Podcast not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, podcast_id = %request.podcast_id, operation = "create_draft")
)]
pub async fn create_draft(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateDraftRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created = state.drafts.create(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/drafts/{id}/uploaded",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Upload recorded", body = Draft),
        (status = 400, description = "Audio not in storage yet", body = ErrorResponse),
        (status = 404, description = "Draft not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, draft_id = %id, operation = "confirm_upload")
)]
pub async fn confirm_upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Draft>, HttpAppError> {
    Ok(Json(state.drafts.confirm_upload(user.user_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/drafts/{id}/edit",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Signed URL for the edited audio", body = SignedUrlResponse),
        (status = 400, description = "Draft has no audio yet", body = ErrorResponse),
        (status = 404, description = "Draft not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, draft_id = %id, operation = "begin_edit")
)]
pub async fn begin_edit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SignedUrlResponse>, HttpAppError> {
    Ok(Json(state.drafts.begin_edit(user.user_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/drafts/{id}/edit/complete",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    request_body = CompleteEditRequest,
    responses(
        (status = 200, description = "Edit recorded", body = Draft),
        (status = 400, description = "Edited audio not in storage yet", body = ErrorResponse),
        (status = 404, description = "Draft not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, draft_id = %id, operation = "complete_edit")
)]
pub async fn complete_edit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CompleteEditRequest>,
) -> Result<Json<Draft>, HttpAppError> {
    Ok(Json(
        state
            .drafts
            .complete_edit(user.user_id, id, &request.object_path)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/drafts/{id}/preview",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    responses(
        (status = 200, description = "Short-lived read URL", body = SignedUrlResponse),
        (status = 404, description = "Draft not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, draft_id = %id, operation = "preview_draft")
)]
pub async fn preview_draft(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SignedUrlResponse>, HttpAppError> {
    Ok(Json(state.drafts.preview_url(user.user_id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/drafts/{id}/finalize",
    tag = "drafts",
    params(("id" = Uuid, Path, description = "Draft ID")),
    request_body = FinalizeMetadata,
    responses(
        (status = 201, description = "Episode created", body = Episode),
        (status = 403, description = "Draft belongs to another user", body = ErrorResponse),
        (status = 409, description = "Draft already finalized", body = ErrorResponse),
        (status = 503, description = "Storage unavailable; retry", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, metadata),
    fields(user_id = %user.user_id, draft_id = %id, operation = "finalize_draft")
)]
pub async fn finalize_draft(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(metadata): ValidatedJson<FinalizeMetadata>,
) -> Result<impl IntoResponse, HttpAppError> {
    let episode = state.drafts.finalize(user.user_id, id, metadata).await?;
    Ok((StatusCode::CREATED, Json(episode)))
}
