/*
 * Responsibility
 * - per-route-group auth configuration, immutable once built
 * - eager validation: missing key material or a bad lookup spec fails at
 *   construction (startup), never at first request
 */
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use jsonwebtoken::Algorithm;
use thiserror::Error;

use super::access::AuthFailure;
use super::extract::{TokenSource, parse_token_lookup};
use super::resolve::UserStore;
use super::verify::{SigningKeys, TokenVerifier};

/// Predicate that lets specific requests skip authentication entirely.
pub type BypassFilter = Arc<dyn Fn(&Request<Body>) -> bool + Send + Sync>;

/// Override for the terminal failure response. The default maps
/// MissingCredential to 400 and everything else to 401.
pub type ErrorHandler = Arc<dyn Fn(&AuthFailure) -> Response + Send + Sync>;

#[derive(Debug, Error)]
pub enum AuthConfigError {
    #[error("auth middleware requires a non-empty signing key")]
    MissingSigningKey,
    #[error("invalid token lookup entry: {0:?}")]
    InvalidTokenLookup(String),
}

/// Shared, read-only state for the authorization pipeline. One instance per
/// protected route group, safely shared across concurrent requests.
pub struct AuthConfig {
    verifier: TokenVerifier,
    sources: Vec<TokenSource>,
    auth_scheme: String,
    filter: Option<BypassFilter>,
    on_error: Option<ErrorHandler>,
    store: Arc<dyn UserStore>,
}

impl AuthConfig {
    /// Defaults: lookup `header:Authorization`, scheme `Bearer`, no filter,
    /// default error mapping.
    pub fn new(
        keys: SigningKeys,
        algorithm: Algorithm,
        store: Arc<dyn UserStore>,
    ) -> Result<Self, AuthConfigError> {
        if keys.is_empty() {
            return Err(AuthConfigError::MissingSigningKey);
        }

        Ok(Self {
            verifier: TokenVerifier::new(&keys, algorithm),
            sources: parse_token_lookup("header:Authorization")?,
            auth_scheme: "Bearer".to_string(),
            filter: None,
            on_error: None,
            store,
        })
    }

    pub fn with_token_lookup(mut self, spec: &str) -> Result<Self, AuthConfigError> {
        self.sources = parse_token_lookup(spec)?;
        Ok(self)
    }

    pub fn with_auth_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    pub fn with_filter(mut self, filter: BypassFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }

    pub fn auth_scheme(&self) -> &str {
        &self.auth_scheme
    }

    pub fn filter(&self) -> Option<&BypassFilter> {
        self.filter.as_ref()
    }

    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        self.on_error.as_ref()
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("verifier", &self.verifier)
            .field("sources", &self.sources)
            .field("auth_scheme", &self.auth_scheme)
            .field("has_filter", &self.filter.is_some())
            .field("has_error_handler", &self.on_error.is_some())
            .finish()
    }
}
