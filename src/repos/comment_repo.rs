/*
 * Responsibility
 * - SQLx operations for the comments table
 * - create bumps the film's comment_count in the same transaction
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub film_id: Uuid,
    pub user_id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    db: &PgPool,
    film_id: Uuid,
    user_id: Uuid,
    summary: &str,
) -> Result<CommentRow, RepoError> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        INSERT INTO comments (film_id, user_id, summary)
        VALUES ($1, $2, $3)
        RETURNING id, film_id, user_id, summary, created_at
        "#,
    )
    .bind(film_id)
    .bind(user_id)
    .bind(summary)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE films SET comment_count = comment_count + 1 WHERE id = $1")
        .bind(film_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(row)
}

/// Page is 1-based. Returns the page rows plus the film's total comment count.
pub async fn list_for_film(
    db: &PgPool,
    film_id: Uuid,
    page: i64,
    limit: i64,
) -> Result<(Vec<CommentRow>, i64), RepoError> {
    let offset = page.saturating_sub(1).saturating_mul(limit).max(0);

    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT id, film_id, user_id, summary, created_at
        FROM comments
        WHERE film_id = $1
        ORDER BY created_at DESC, id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(film_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE film_id = $1")
        .bind(film_id)
        .fetch_one(db)
        .await?;

    Ok((rows, total))
}
