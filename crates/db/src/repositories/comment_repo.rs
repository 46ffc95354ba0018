//! Repository for the `comments` table.

use mediaboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};
use crate::models::ListOptions;

/// Column list over `c` (comments) and `u` (users).
const COLUMNS: &str = "c.id, c.post_id, c.user_id, c.text, c.is_deleted, \
                       u.nick AS author_nick, c.created_at, c.updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning it with the author's nick.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (post_id, user_id, text) VALUES ($1, $2, $3) RETURNING *
             )
             SELECT {COLUMNS} FROM c JOIN users u ON u.id = c.user_id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.post_id)
            .bind(input.user_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Find a comment within a post, including soft-deleted comments.
    pub async fn find_in_post(
        pool: &PgPool,
        post_id: DbId,
        comment_id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.id = $1 AND c.post_id = $2"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(comment_id)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// Comments of a post, oldest first.
    pub async fn list_by_post(
        pool: &PgPool,
        post_id: DbId,
        opts: ListOptions,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.post_id = $1 AND ($2 OR c.is_deleted = false)
             ORDER BY c.created_at ASC, c.id ASC
             OFFSET $3 LIMIT $4"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .bind(opts.include_deleted)
            .bind(opts.skip)
            .bind(opts.limit)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a comment. Returns `false` if it was already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET is_deleted = true WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
