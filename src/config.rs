use std::env;

/// Signing key and token lifetimes for the token authority.
///
/// Built once at startup and carried inside [`AppConfig`]; nothing in the
/// crate reads `JWT_SECRET` from the environment after this point.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_hours: 24,
            refresh_ttl_days: 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")?;
        Ok(Self {
            database_url,
            host,
            port,
            auth: AuthConfig::new(jwt_secret),
        })
    }
}
