/*
 * Responsibility
 * - comment handlers: add (author from AuthCtx) + paginated list per film
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::dto::comments::{CommentResponse, NewCommentRequest},
    api::v1::dto::films::{PageQuery, Paginated},
    api::v1::extractors::AuthCtxExtractor,
    error::AppError,
    repos::comment_repo::{self, CommentRow},
    repos::film_repo,
    state::AppState,
};

fn to_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        film_id: row.film_id,
        user_id: row.user_id,
        summary: row.summary,
        created_at: row.created_at,
    }
}

pub async fn add_comment(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<NewCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let user_id = ctx.require_user_id()?;
    let user_id = Uuid::parse_str(user_id).map_err(|_| AppError::Unauthorized)?;

    if film_repo::get(&state.db, req.film_id).await?.is_none() {
        return Err(AppError::not_found("film"));
    }

    let row = comment_repo::create(&state.db, req.film_id, user_id, req.summary.trim()).await?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn film_comments(
    State(state): State<AppState>,
    Path(film_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<CommentResponse>>, AppError> {
    let (page, limit) = query.normalize();

    let (rows, total) = comment_repo::list_for_film(&state.db, film_id, page, limit).await?;

    Ok(Json(Paginated {
        data: rows.into_iter().map(to_response).collect(),
        page,
        limit,
        total,
    }))
}
