/*
 * Responsibility
 * - v1 URL structure
 * - decide which routes sit behind the auth pipeline (route-group scoping)
 */
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::{AuthConfig, access};
use crate::state::AppState;

use crate::api::v1::handlers::{
    comments::{add_comment, film_comments},
    films::{get_film, list_films},
    health::health,
    users::{login, profile, signup},
};

pub fn routes(auth: Arc<AuthConfig>) -> Router<AppState> {
    let open = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/user/signup", post(signup));

    let protected = Router::new()
        .route("/user/profile", get(profile))
        .route("/films", get(list_films))
        .route("/films/{film_id}", get(get_film))
        .route("/comments", post(add_comment))
        .route("/comments/{film_id}", get(film_comments));

    open.merge(access::apply(protected, auth))
}
