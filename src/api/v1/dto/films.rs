/*
 * Responsibility
 * - film response DTOs + shared pagination shapes
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct FilmResponse {
    pub id: Uuid,
    pub title: String,
    pub release_date: String,
    pub comment_count: i64,
}

/// ?page=&limit= query, 1-based. Defaults: page 1, limit 20.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

const MAX_LIMIT: i64 = 100;
// Upper bound keeps (page - 1) * limit inside i64 for any allowed limit.
const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

impl PageQuery {
    pub fn normalize(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let limit = self.limit.unwrap_or(20).clamp(1, MAX_LIMIT);
        (page, limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}
