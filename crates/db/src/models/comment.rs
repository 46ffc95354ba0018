//! Comment entity model and DTOs.

use mediaboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `comments`, joined with the author's nick.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub text: String,
    pub is_deleted: bool,
    pub author_nick: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new comment.
#[derive(Debug)]
pub struct CreateComment {
    pub post_id: DbId,
    pub user_id: DbId,
    pub text: String,
}
