/*
 * Responsibility
 * - signature verification + claim decoding for bearer tokens
 * - pins the algorithm: a token declaring anything else is rejected outright
 * - multi-key deployments resolve the key via `kid`; unknown kid never falls
 *   back to a default key
 */
use std::collections::HashMap;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key material accepted at construction time.
#[derive(Clone)]
pub enum SigningKeys {
    /// One shared secret for every token.
    Single(Vec<u8>),
    /// kid -> secret. Tokens must carry a matching `kid` header.
    Keyed(HashMap<String, Vec<u8>>),
}

impl SigningKeys {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(key) => key.is_empty(),
            Self::Keyed(keys) => keys.is_empty(),
        }
    }
}

/// Decoded token payload. A fixed schema instead of a free-form claim map:
/// everything the service trusts is read out of here exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserClaim>,
    /// Unix timestamp; tokens past this instant are invalid.
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// Nested subject claim. `_id` is the sole trust anchor; `email` rides along
/// for convenience only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaim {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("token verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("unexpected signing algorithm: {got:?} (expected {expected:?})")]
    AlgorithmMismatch { expected: Algorithm, got: Algorithm },
    #[error("unknown signing key id: {0:?}")]
    UnknownKeyId(Option<String>),
}

enum VerifierKeys {
    Single(DecodingKey),
    Keyed(HashMap<String, DecodingKey>),
}

pub struct TokenVerifier {
    keys: VerifierKeys,
    algorithm: Algorithm,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(keys: &SigningKeys, algorithm: Algorithm) -> Self {
        let keys = match keys {
            SigningKeys::Single(secret) => VerifierKeys::Single(DecodingKey::from_secret(secret)),
            SigningKeys::Keyed(secrets) => VerifierKeys::Keyed(
                secrets
                    .iter()
                    .map(|(kid, secret)| (kid.clone(), DecodingKey::from_secret(secret)))
                    .collect(),
            ),
        };

        let mut validation = Validation::new(algorithm);
        // Strict time validation: no leeway, and honor nbf when present.
        validation.leeway = 0;
        validation.validate_nbf = true;

        Self {
            keys,
            algorithm,
            validation,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Verify a compact-form token and decode its claims.
    ///
    /// Order matters: the declared algorithm and (in keyed mode) the `kid` are
    /// checked before any signature work, so nothing is ever verified against
    /// the wrong key family.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = jsonwebtoken::decode_header(token)?;

        if header.alg != self.algorithm {
            return Err(VerifyError::AlgorithmMismatch {
                expected: self.algorithm,
                got: header.alg,
            });
        }

        let key = match &self.keys {
            VerifierKeys::Single(key) => key,
            VerifierKeys::Keyed(keys) => {
                let kid = header.kid.as_deref();
                kid.and_then(|kid| keys.get(kid))
                    .ok_or_else(|| VerifyError::UnknownKeyId(header.kid.clone()))?
            }
        };

        let data = jsonwebtoken::decode::<Claims>(token, key, &self.validation)?;
        Ok(data.claims)
    }
}
