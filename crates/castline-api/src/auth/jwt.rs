//! HS256 JWT validation
//!
//! Tokens are minted by the identity service sharing `JWT_SECRET`; `sub` is the user id.

use crate::auth::models::JwtClaims;
use castline_core::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `user_id`, valid for `ttl_seconds`
    pub fn issue(&self, user_id: uuid::Uuid, ttl_seconds: i64) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user_id,
            exp: now + ttl_seconds,
            iat: now,
            nbf: None,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                        AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
                    }
                    _ => AppError::Unauthorized("Invalid or expired token".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = service.issue(user_id, 300).unwrap();
        assert_eq!(service.validate(&token).unwrap().sub, user_id);
    }

    #[test]
    fn test_expired_and_foreign_tokens_rejected() {
        let service = JwtService::new(SECRET);
        let expired = service.issue(Uuid::new_v4(), -60).unwrap();
        assert!(matches!(
            service.validate(&expired),
            Err(AppError::Unauthorized(msg)) if msg.contains("expired")
        ));

        let other = JwtService::new("another-secret-that-is-at-least-32-chars");
        let foreign = other.issue(Uuid::new_v4(), 300).unwrap();
        assert!(service.validate(&foreign).is_err());
    }
}
