/*
 * Responsibility
 * - film catalog read handlers (paginated list + point lookup)
 */
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    api::v1::dto::films::{FilmResponse, PageQuery, Paginated},
    error::AppError,
    repos::film_repo::{self, FilmRow},
    state::AppState,
};

fn to_response(row: FilmRow) -> FilmResponse {
    FilmResponse {
        id: row.id,
        title: row.title,
        release_date: row.release_date,
        comment_count: row.comment_count,
    }
}

pub async fn list_films(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<FilmResponse>>, AppError> {
    let (page, limit) = query.normalize();

    let (rows, total) = film_repo::list(&state.db, page, limit).await?;

    Ok(Json(Paginated {
        data: rows.into_iter().map(to_response).collect(),
        page,
        limit,
        total,
    }))
}

pub async fn get_film(
    State(state): State<AppState>,
    Path(film_id): Path<Uuid>,
) -> Result<Json<FilmResponse>, AppError> {
    let row = film_repo::get(&state.db, film_id)
        .await?
        .ok_or_else(|| AppError::not_found("film"))?;

    Ok(Json(to_response(row)))
}
