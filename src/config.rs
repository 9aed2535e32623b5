/*
 * Responsibility
 * - load environment configuration (DATABASE_URL, JWT secret, CORS, auth knobs)
 * - validate eagerly: a missing signing key fails startup, not the first request
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    /// Shared HMAC secret for access tokens. Required.
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in seconds (default: 24h, matching issued `exp`).
    pub token_ttl_seconds: u64,
    /// Where the middleware looks for the token, e.g. "header:Authorization,query:token".
    pub auth_token_lookup: String,
    /// Scheme expected in front of header-sourced tokens.
    pub auth_scheme: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| ConfigError::Missing("JWT_SECRET_KEY"))?
            .into_bytes();
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET_KEY"));
        }

        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(24 * 60 * 60);

        let auth_token_lookup = std::env::var("AUTH_TOKEN_LOOKUP")
            .unwrap_or_else(|_| "header:Authorization".to_string());

        let auth_scheme = std::env::var("AUTH_SCHEME").unwrap_or_else(|_| "Bearer".to_string());

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            token_ttl_seconds,
            auth_token_lookup,
            auth_scheme,
        })
    }
}
