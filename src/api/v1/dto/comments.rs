/*
 * Responsibility
 * - comment request/response DTOs
 * - the author is never taken from the body; it comes from AuthCtx
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NewCommentRequest {
    pub film_id: Uuid,
    pub summary: String,
}

impl NewCommentRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.summary.trim().is_empty() {
            return Err("summary is required");
        }
        if self.summary.len() > 500 {
            return Err("summary must be <= 500 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub film_id: Uuid,
    pub user_id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}
