use crate::auth::jwt::JwtService;
use crate::auth::models::AuthUser;
use crate::constants::FEED_SERVICE_KEY_HEADER;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use castline_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    /// Shared secret of the feed renderer; `None` disables the feed routes
    pub feed_service_key: Option<String>,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Bearer JWT authentication for user routes
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match auth_state.jwt.validate(token.trim()) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
            });
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

/// Service-key authentication for the feed renderer
pub async fn feed_key_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(FEED_SERVICE_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let authorized = match (auth_state.feed_service_key.as_deref(), provided) {
        (Some(expected), Some(provided)) => secure_compare(provided, expected),
        _ => false,
    };

    if !authorized {
        tracing::debug!("Rejected feed request with missing or invalid service key");
        return HttpAppError(AppError::Unauthorized("Invalid service key".to_string()))
            .into_response();
    }

    next.run(request).await
}
