/*
 * Responsibility
 * - signup / login / profile handlers
 * - login mints the access token; profile reads AuthCtx bound by the middleware
 */
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    api::v1::dto::users::{LoginRequest, LoginResponse, SignupRequest, UserResponse},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    repos::user_repo::{self, UserRow},
    services::password,
    state::AppState,
};

fn to_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let email = req.email.trim().to_ascii_lowercase();

    if user_repo::get_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::bad_request("USER_EXISTS", "user already exists"));
    }

    let password_hash = password::hash(&req.password)?;
    let row = user_repo::create(
        &state.db,
        req.first_name.trim(),
        req.last_name.trim(),
        &email,
        &password_hash,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let email = req.email.trim().to_ascii_lowercase();

    // Same generic error for unknown email and wrong password.
    let invalid = || AppError::bad_request("INVALID_CREDENTIALS", "invalid login credentials");

    let row = user_repo::get_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify(&req.password, &row.password_hash) {
        return Err(invalid());
    }

    let token = state.issuer.sign(&row.id.to_string(), &row.email)?;

    Ok(Json(LoginResponse {
        user: to_response(row),
        token,
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserResponse>, AppError> {
    // Tighten the middleware's permissive default: the profile route needs a
    // bound subject.
    let user_id = ctx.require_user_id()?;
    let user_id = Uuid::parse_str(user_id).map_err(|_| AppError::Unauthorized)?;

    let row = user_repo::get(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    Ok(Json(to_response(row)))
}
