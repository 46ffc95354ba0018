//! Post entity model and DTOs.

use mediaboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `posts`, joined with the author's nick.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub user_id: DbId,
    pub text: Option<String>,
    pub is_deleted: bool,
    pub upvotes: i32,
    pub author_nick: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new post.
#[derive(Debug)]
pub struct CreatePost {
    pub user_id: DbId,
    /// `None` when the post carries only files.
    pub text: Option<String>,
}
