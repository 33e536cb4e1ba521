use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    dto::auth::{Claims, RefreshClaims},
    error::{AppError, AppResult},
};

const ACCESS_TOKEN_TYPE: &str = "access";
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Identity embedded into an access token at issue time.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub user_id: Uuid,
    pub role: String,
    pub email: String,
    pub nickname: String,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// A mismatched password is `Ok(false)`, never an error; only a corrupt
/// stored hash is reported as a fault.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Issue a signed access/refresh token pair. The refresh token omits the
/// role so a refreshed pair must re-derive it from the user record.
pub fn issue_token_pair(auth: &AuthConfig, identity: &TokenIdentity) -> AppResult<(String, String)> {
    let access_exp = Utc::now()
        .checked_add_signed(Duration::hours(auth.access_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: identity.user_id.to_string(),
        role: identity.role.clone(),
        email: identity.email.clone(),
        nickname: identity.nickname.clone(),
        exp: access_exp.timestamp() as usize,
        token_type: ACCESS_TOKEN_TYPE.into(),
    };

    let key = EncodingKey::from_secret(auth.jwt_secret.as_bytes());
    let access = encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let refresh_exp = Utc::now()
        .checked_add_signed(Duration::days(auth.refresh_ttl_days))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let refresh_claims = RefreshClaims {
        sub: identity.user_id.to_string(),
        email: identity.email.clone(),
        exp: refresh_exp.timestamp() as usize,
        token_type: REFRESH_TOKEN_TYPE.into(),
    };

    let refresh = encode(&Header::default(), &refresh_claims, &key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok((access, refresh))
}

pub fn verify_access_token(auth: &AuthConfig, token: &str) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    if decoded.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(AppError::Unauthorized("Invalid or expired token".into()));
    }
    Ok(decoded.claims)
}

pub fn verify_refresh_token(auth: &AuthConfig, token: &str) -> AppResult<RefreshClaims> {
    let decoded = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".into()))?;
    if decoded.claims.token_type != REFRESH_TOKEN_TYPE {
        return Err(AppError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ));
    }
    Ok(decoded.claims)
}

/// Extract the user id out of a verified refresh token. Fails closed when
/// the token is expired, garbled, or signed with another key.
pub fn refresh_token_user_id(auth: &AuthConfig, refresh_token: &str) -> AppResult<Uuid> {
    let claims = verify_refresh_token(auth, refresh_token)?;
    Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in refresh token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new("unit-test-secret")
    }

    fn identity() -> TokenIdentity {
        TokenIdentity {
            user_id: Uuid::new_v4(),
            role: "user".into(),
            email: "player@example.com".into(),
            nickname: "player1".into(),
        }
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("hunter42").unwrap();
        assert_ne!(hash, "hunter42");
        assert!(verify_password("hunter42", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn corrupt_hash_is_a_fault_not_a_mismatch() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn token_pair_round_trip() {
        let config = test_config();
        let identity = identity();
        let (access, refresh) = issue_token_pair(&config, &identity).unwrap();

        let claims = verify_access_token(&config, &access).unwrap();
        assert_eq!(claims.sub, identity.user_id.to_string());
        assert_eq!(claims.role, "user");
        assert_eq!(claims.nickname, "player1");

        let refresh_claims = verify_refresh_token(&config, &refresh).unwrap();
        assert_eq!(refresh_claims.sub, identity.user_id.to_string());
        assert_eq!(refresh_claims.email, "player@example.com");
    }

    #[test]
    fn refresh_token_resolves_user_id() {
        let config = test_config();
        let identity = identity();
        let (_, refresh) = issue_token_pair(&config, &identity).unwrap();
        assert_eq!(
            refresh_token_user_id(&config, &refresh).unwrap(),
            identity.user_id
        );
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let config = test_config();
        let (access, refresh) = issue_token_pair(&config, &identity()).unwrap();
        // Same secret either way, so only the token_type claim keeps a
        // leaked 24h access token from minting 7d refresh pairs.
        assert!(verify_refresh_token(&config, &access).is_err());
        assert!(verify_access_token(&config, &refresh).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let other = AuthConfig::new("some-other-secret");
        let (access, refresh) = issue_token_pair(&config, &identity()).unwrap();
        assert!(verify_access_token(&other, &access).is_err());
        assert!(verify_refresh_token(&other, &refresh).is_err());
    }

    #[test]
    fn garbled_token_is_rejected() {
        let config = test_config();
        assert!(verify_access_token(&config, "not.a.jwt").is_err());
        assert!(refresh_token_user_id(&config, "").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let identity = identity();
        // Sign claims that expired beyond the default validation leeway.
        let exp = (Utc::now() - Duration::minutes(10)).timestamp() as usize;
        let claims = Claims {
            sub: identity.user_id.to_string(),
            role: identity.role,
            email: identity.email,
            nickname: identity.nickname,
            exp,
            token_type: ACCESS_TOKEN_TYPE.into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_access_token(&config, &token).is_err());
    }
}
