/*
 * Responsibility
 * - shared context bound to the Router (AppState)
 * - cheap to Clone (PgPool and Arc internals)
 *
 * Note: the auth middleware carries its own Arc<AuthConfig> as layer state,
 * so it is not duplicated here.
 */
use std::sync::Arc;

use crate::services::auth::token_issuer::TokenIssuer;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, issuer: Arc<TokenIssuer>) -> Self {
        Self { db, issuer }
    }
}
