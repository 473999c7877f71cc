use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use castline_core::models::{ConnectionSummary, Platform, TokenGrant};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/v1/connections",
    tag = "connections",
    responses(
        (status = 200, description = "Connected platforms, without tokens", body = Vec<ConnectionSummary>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_connections"))]
pub async fn list_connections(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<ConnectionSummary>>, HttpAppError> {
    Ok(Json(state.vault.connected_platforms(user.user_id).await?))
}

/// Store the result of the OAuth authorization exchange for one platform
#[utoipa::path(
    put,
    path = "/api/v1/connections/{platform}",
    tag = "connections",
    params(("platform" = Platform, Path, description = "spotify, apple or google")),
    request_body = TokenGrant,
    responses(
        (status = 200, description = "Connection stored", body = ConnectionSummary),
        (status = 400, description = "Unknown platform or incomplete grant", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, grant),
    fields(user_id = %user.user_id, platform = %platform, operation = "put_connection")
)]
pub async fn put_connection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(platform): Path<String>,
    grant: Result<Json<TokenGrant>, JsonRejection>,
) -> Result<Json<ConnectionSummary>, HttpAppError> {
    let platform = platform.parse::<Platform>()?;
    let Json(grant) = grant?;
    let summary = state.vault.connect(user.user_id, platform, grant).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    delete,
    path = "/api/v1/connections/{platform}",
    tag = "connections",
    params(("platform" = Platform, Path, description = "spotify, apple or google")),
    responses(
        (status = 204, description = "Connection removed"),
        (status = 409, description = "Platform was not connected", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, platform = %platform, operation = "delete_connection")
)]
pub async fn delete_connection(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(platform): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let platform = platform.parse::<Platform>()?;
    state.vault.disconnect(user.user_id, platform).await?;
    Ok(StatusCode::NO_CONTENT)
}
