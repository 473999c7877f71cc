use castline_api::auth::JwtService;
use uuid::Uuid;

/// Must match the secret `setup_test_app` configures.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Authorization header value for `user_id`
pub fn bearer(user_id: Uuid) -> String {
    let token = JwtService::new(TEST_JWT_SECRET)
        .issue(user_id, 3600)
        .expect("Failed to issue test token");
    format!("Bearer {}", token)
}
