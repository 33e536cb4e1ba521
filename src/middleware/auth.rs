use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use uuid::Uuid;

use crate::{config::AppConfig, error::AppError, services::auth_service};

pub const ADMIN_ROLE: &str = "admin";

/// Caller identity established from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Admin-only gate for whole-collection endpoints.
pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Ownership gate: admins pass, everyone else must own the resource.
pub fn ensure_owner(user: &AuthUser, resource_owner: Uuid) -> Result<(), AppError> {
    if user.is_admin() || user.user_id == resource_owner {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let config = AppConfig::from_ref(state);
        let claims = auth_service::verify_access_token(&config.auth, token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: role.into(),
        }
    }

    #[test]
    fn admin_passes_both_gates() {
        let admin = user("admin");
        assert!(ensure_admin(&admin).is_ok());
        assert!(ensure_owner(&admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn owner_passes_ownership_gate_only() {
        let caller = user("user");
        assert!(ensure_owner(&caller, caller.user_id).is_ok());
        assert!(matches!(ensure_admin(&caller), Err(AppError::Forbidden)));
    }

    #[test]
    fn non_owner_is_forbidden() {
        let caller = user("user");
        assert!(matches!(
            ensure_owner(&caller, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }
}
