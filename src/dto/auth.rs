use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Deserialize, Debug, ToSchema)]
pub struct SignupRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Access-token claims. `sub` is the user id. `token_type` keeps the two
/// token kinds from being interchangeable, since both are signed with the
/// same secret.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub email: String,
    pub nickname: String,
    pub exp: usize,
    pub token_type: String,
}

/// Refresh-token claims deliberately omit the role; it is re-read from the
/// user record when the pair is refreshed.
#[derive(Debug, Deserialize, Serialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
    pub token_type: String,
}
