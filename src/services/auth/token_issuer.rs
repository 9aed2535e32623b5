/*
 * Responsibility
 * - mint access tokens at login
 * - claims shape matches what the middleware verifies:
 *   { user: { _id, email }, exp: now + ttl }
 */
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tracing::error;

use crate::error::AppError;
use crate::middleware::auth::verify::{Claims, UserClaim};

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    pub fn sign(&self, user_id: &str, email: &str) -> Result<String, AppError> {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AppError::Internal)?
            .saturating_add(self.ttl)
            .as_secs();

        let claims = Claims {
            user: Some(UserClaim {
                id: Some(user_id.to_string()),
                email: Some(email.to_string()),
            }),
            exp,
            nbf: None,
            iat: None,
        };

        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(
            |e| {
                error!(error = %e, "failed to sign access token");
                AppError::Internal
            },
        )
    }
}
