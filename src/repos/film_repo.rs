/*
 * Responsibility
 * - SQLx operations for the films table (catalog mirrored from the external source)
 * - paginated scans + point lookup; comment_count is denormalized here
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct FilmRow {
    pub id: Uuid,
    pub title: String,
    pub release_date: String,
    pub comment_count: i64,
}

pub async fn get(db: &PgPool, film_id: Uuid) -> Result<Option<FilmRow>, RepoError> {
    let row = sqlx::query_as::<_, FilmRow>(
        r#"
        SELECT id, title, release_date, comment_count
        FROM films
        WHERE id = $1
        "#,
    )
    .bind(film_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Page is 1-based. Returns the page rows plus the total film count so the
/// handler can report pagination metadata.
pub async fn list(db: &PgPool, page: i64, limit: i64) -> Result<(Vec<FilmRow>, i64), RepoError> {
    let offset = page.saturating_sub(1).saturating_mul(limit).max(0);

    let rows = sqlx::query_as::<_, FilmRow>(
        r#"
        SELECT id, title, release_date, comment_count
        FROM films
        ORDER BY release_date, id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM films")
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}
