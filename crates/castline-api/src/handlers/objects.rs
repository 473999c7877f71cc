//! Signed object routes for the local storage backend
//!
//! Local signed URLs point here. The query carries the method, expiry and HMAC
//! signature minted by `LocalStorage`; nothing else authenticates these requests.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use castline_core::AppError;
use castline_storage::LocalStorage;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignedObjectQuery {
    pub method: String,
    pub expires: i64,
    pub signature: String,
}

fn local_objects(state: &AppState) -> Result<&LocalStorage, AppError> {
    state
        .objects
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Object route is not enabled".to_string()))
}

fn verify(
    objects: &LocalStorage,
    expected_method: &str,
    key: &str,
    query: &SignedObjectQuery,
    content_type: &str,
) -> Result<(), AppError> {
    if query.method != expected_method {
        return Err(AppError::Unauthorized(
            "Signed URL was issued for a different method".to_string(),
        ));
    }
    objects
        .verify_signed_request(
            expected_method,
            key,
            query.expires,
            content_type,
            &query.signature,
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected signed object request");
            AppError::Unauthorized("Invalid or expired signed URL".to_string())
        })
}

/// Content type served for a stored object, from its extension
fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next().unwrap_or_default() {
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}

#[tracing::instrument(skip(state, query, headers, body), fields(bytes = body.len()))]
pub async fn put_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedObjectQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let objects = local_objects(&state)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    verify(objects, "PUT", &key, &query, content_type)?;

    state
        .storage
        .put(&key, body.to_vec(), content_type)
        .await
        .map_err(AppError::from)?;
    tracing::debug!(key = %key, "Object stored");

    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(state, query))]
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedObjectQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let objects = local_objects(&state)?;
    verify(objects, "GET", &key, &query, "")?;

    let data = state
        .storage
        .download(&key)
        .await
        .map_err(AppError::from)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&key))],
        data,
    ))
}
