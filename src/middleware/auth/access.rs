/*
 * Responsibility
 * - the authorization pipeline: bypass filter → extract → verify → resolve
 * - on success, bind RawToken + AuthCtx into request extensions and continue
 * - on failure, short-circuit with a terminal response; one outcome per request
 */
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{RawPathParams, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;

use super::config::AuthConfig;
use super::{extract, resolve};

/// The raw verified token, exposed downstream for callers that need it
/// (e.g. forwarding to another service).
#[derive(Debug, Clone)]
pub struct RawToken(pub String);

/// Failure category handed to the error handler. Everything past extraction
/// is collapsed into InvalidCredential: callers cannot distinguish a bad
/// signature from a deleted user, which keeps account existence unguessable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingCredential,
    InvalidCredential,
}

/// Guard a router with the authorization pipeline.
pub fn apply<S>(router: Router<S>, auth: Arc<AuthConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, authenticate))
}

async fn authenticate(
    State(auth): State<Arc<AuthConfig>>,
    params: RawPathParams,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Bypass: filtered requests proceed unauthenticated, with no identity bound.
    if auth.filter().is_some_and(|filter| filter(&req)) {
        return next.run(req).await;
    }

    let Some(raw) = extract::extract(auth.sources(), auth.auth_scheme(), &req, &params) else {
        return reject(&auth, AuthFailure::MissingCredential);
    };

    let claims = match auth.verifier().verify(&raw) {
        Ok(claims) => claims,
        Err(err) => {
            // The specific cryptographic reason stays in the logs.
            tracing::warn!(error = %err, "token verification failed");
            return reject(&auth, AuthFailure::InvalidCredential);
        }
    };

    let identity = match resolve::resolve(&claims, auth.store()).await {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(error = %err, "identity resolution failed");
            return reject(&auth, AuthFailure::InvalidCredential);
        }
    };

    req.extensions_mut().insert(RawToken(raw));
    req.extensions_mut().insert(AuthCtx {
        user_id: identity.user_id,
        email: identity.email,
    });

    next.run(req).await
}

fn reject(auth: &AuthConfig, failure: AuthFailure) -> Response {
    if let Some(handler) = auth.error_handler() {
        return handler(&failure);
    }

    match failure {
        AuthFailure::MissingCredential => AppError::MissingCredential.into_response(),
        AuthFailure::InvalidCredential => AppError::Unauthorized.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use axum::http::StatusCode;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::middleware::auth::resolve::tests::FakeUserStore;
    use crate::middleware::auth::verify::{Claims, SigningKeys, UserClaim};

    const SECRET: &[u8] = b"pipeline-test-secret";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn token_for(user_id: &str, exp: u64) -> String {
        let claims = Claims {
            user: Some(UserClaim {
                id: Some(user_id.to_string()),
                email: Some(format!("{user_id}@example.com")),
            }),
            exp,
            nbf: None,
            iat: None,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn config_with(store: FakeUserStore) -> AuthConfig {
        AuthConfig::new(
            SigningKeys::Single(SECRET.to_vec()),
            Algorithm::HS256,
            Arc::new(store),
        )
        .unwrap()
    }

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        ctx.user_id.unwrap_or_default()
    }

    async fn ping() -> &'static str {
        "pong"
    }

    async fn echo_token(axum::Extension(RawToken(token)): axum::Extension<RawToken>) -> String {
        token
    }

    fn router(config: AuthConfig) -> Router {
        let protected = Router::new()
            .route("/profile", get(whoami))
            .route("/token", get(echo_token))
            .route("/ping", get(ping));
        apply(protected, Arc::new(config))
    }

    fn get_request(uri: &str, auth_header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth_header {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(res: Response) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_binds_user_id() {
        let app = router(config_with(FakeUserStore::with_users(&["u-1"])));
        let token = token_for("u-1", now() + 3600);

        let res = app
            .oneshot(get_request("/profile", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "u-1");
    }

    #[tokio::test]
    async fn raw_token_is_exposed_downstream() {
        let app = router(config_with(FakeUserStore::with_users(&["u-1"])));
        let token = token_for("u-1", now() + 3600);

        let res = app
            .oneshot(get_request("/token", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, token);
    }

    #[tokio::test]
    async fn missing_token_is_bad_request() {
        let app = router(config_with(FakeUserStore::with_users(&["u-1"])));

        let res = app.oneshot(get_request("/profile", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_scheme_is_bad_request() {
        let app = router(config_with(FakeUserStore::with_users(&["u-1"])));
        let token = token_for("u-1", now() + 3600);

        let res = app
            .oneshot(get_request("/profile", Some(&format!("Token {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let app = router(config_with(FakeUserStore::with_users(&["u-1"])));
        let token = token_for("u-1", now() - 1);

        let res = app
            .oneshot(get_request("/profile", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Revocation-by-deletion: cryptographically valid token, subject gone.
    // The response category is the same generic 401 as a bad signature.
    #[tokio::test]
    async fn deleted_subject_is_unauthorized() {
        let app = router(config_with(FakeUserStore::with_users(&[])));
        let token = token_for("u-gone", now() + 3600);

        let res = app
            .oneshot(get_request("/profile", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn store_failure_is_unauthorized() {
        let app = router(config_with(FakeUserStore::failing()));
        let token = token_for("u-1", now() + 3600);

        let res = app
            .oneshot(get_request("/profile", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn header_is_preferred_over_query() {
        let config = config_with(FakeUserStore::with_users(&["u-1"]))
            .with_token_lookup("header:Authorization,query:token")
            .unwrap();
        let app = router(config);
        let token = token_for("u-1", now() + 3600);

        // Valid header token plus a garbage query token: header wins.
        let res = app
            .oneshot(get_request(
                "/profile?token=garbage",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn query_fallback_is_used_when_header_absent() {
        let config = config_with(FakeUserStore::with_users(&["u-1"]))
            .with_token_lookup("header:Authorization,query:token")
            .unwrap();
        let app = router(config);
        let token = token_for("u-1", now() + 3600);

        let res = app
            .oneshot(get_request(&format!("/profile?token={token}"), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cookie_source_extracts_token() {
        let config = config_with(FakeUserStore::with_users(&["u-1"]))
            .with_token_lookup("cookie:session")
            .unwrap();
        let app = router(config);
        let token = token_for("u-1", now() + 3600);

        let req = Request::builder()
            .uri("/profile")
            .header("cookie", format!("session={token}"))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn path_param_source_extracts_token() {
        let config = config_with(FakeUserStore::with_users(&["u-1"]))
            .with_token_lookup("param:token")
            .unwrap();
        let protected = Router::new().route("/t/{token}", get(whoami));
        let app = apply(protected, Arc::new(config));
        let token = token_for("u-1", now() + 3600);

        let res = app
            .oneshot(get_request(&format!("/t/{token}"), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bypass_filter_skips_the_pipeline() {
        let config = config_with(FakeUserStore::with_users(&[])).with_filter(Arc::new(
            |req: &Request<Body>| req.uri().path() == "/ping",
        ));
        let app = router(config);

        // No token at all, but the filter lets /ping through unauthenticated.
        let res = app.oneshot(get_request("/ping", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    // Permissive default: a verified token with no user claim passes the
    // pipeline with an empty identity. Handlers that require a subject still
    // reject it (the extractor finds AuthCtx, but user_id is None).
    #[tokio::test]
    async fn token_without_subject_passes_with_empty_identity() {
        let app = router(config_with(FakeUserStore::with_users(&[])));
        let claims = Claims {
            user: None,
            exp: now() + 3600,
            nbf: None,
            iat: None,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let res = app
            .oneshot(get_request("/profile", Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "");
    }

    #[tokio::test]
    async fn custom_error_handler_overrides_default_mapping() {
        let config = config_with(FakeUserStore::with_users(&[])).with_error_handler(Arc::new(
            |failure: &AuthFailure| {
                let status = match failure {
                    AuthFailure::MissingCredential => StatusCode::IM_A_TEAPOT,
                    AuthFailure::InvalidCredential => StatusCode::FORBIDDEN,
                };
                status.into_response()
            },
        ));
        let app = router(config);

        let res = app
            .clone()
            .oneshot(get_request("/profile", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);

        let res = app
            .oneshot(get_request("/profile", Some("Bearer garbage")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    // Running the pipeline twice on identical requests yields the same
    // category both times: no state leaks between runs.
    #[tokio::test]
    async fn outcome_is_idempotent_across_runs() {
        let app = router(config_with(FakeUserStore::with_users(&["u-1"])));
        let token = token_for("u-1", now() + 3600);

        for _ in 0..2 {
            let res = app
                .clone()
                .oneshot(get_request("/profile", Some(&format!("Bearer {token}"))))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        for _ in 0..2 {
            let res = app
                .clone()
                .oneshot(get_request("/profile", None))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }
}
