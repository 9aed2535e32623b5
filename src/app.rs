/*
 * Responsibility
 * - Config load → dependency construction → Router assembly
 * - middleware application (CORS, transport plumbing, auth on the v1 group)
 * - axum::serve()
 */
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use jsonwebtoken::Algorithm;
use sqlx::PgPool;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{
    api,
    config::Config,
    middleware::{
        self,
        auth::{AuthConfig, SigningKeys},
    },
    repos::user_repo::PgUserStore,
    services::auth::token_issuer::TokenIssuer,
    state::AppState,
};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = PgPool::connect(&config.database_url).await?;

    // Auth collaborators are constructed once, up front: a missing or empty
    // signing key and a bad lookup spec both abort startup here.
    let store = Arc::new(PgUserStore::new(db.clone()));
    let auth = Arc::new(
        AuthConfig::new(
            SigningKeys::Single(config.jwt_secret.clone()),
            Algorithm::HS256,
            store,
        )?
        .with_token_lookup(&config.auth_token_lookup)?
        .with_auth_scheme(config.auth_scheme.clone()),
    );
    let issuer = Arc::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl_seconds));

    let state = AppState::new(db, issuer);
    let app = build_router(state, auth, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState, auth: Arc<AuthConfig>, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(auth))
        .with_state(state);

    let router = middleware::cors::apply(router, config);

    // Transport plumbing: request id, access log, body limit, timeout.
    let request_id_header = HeaderName::from_static("x-request-id");
    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    router.layer(layers)
}
