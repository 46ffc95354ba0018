//! Repository for the `posts` table.
//!
//! Every read joins the author so responses can carry `author_nick`. Writes
//! use a CTE around `RETURNING` to produce the same shape.

use mediaboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{CreatePost, Post};
use crate::models::ListOptions;

/// Column list over `p` (posts) and `u` (users).
const COLUMNS: &str = "p.id, p.user_id, p.text, p.is_deleted, p.upvotes, \
                       u.nick AS author_nick, p.created_at, p.updated_at";

/// Provides CRUD operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post, returning it with the author's nick.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                INSERT INTO posts (user_id, text) VALUES ($1, $2) RETURNING *
             )
             SELECT {COLUMNS} FROM p JOIN users u ON u.id = p.user_id"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(input.user_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Find a post by ID, including soft-deleted posts.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id WHERE p.id = $1"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List posts newest first.
    pub async fn list(pool: &PgPool, opts: ListOptions) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts p JOIN users u ON u.id = p.user_id
             WHERE ($1 OR p.is_deleted = false)
             ORDER BY p.created_at DESC, p.id DESC
             OFFSET $2 LIMIT $3"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(opts.include_deleted)
            .bind(opts.skip)
            .bind(opts.limit)
            .fetch_all(pool)
            .await
    }

    /// Replace the text of a live post.
    ///
    /// Returns `None` if the post does not exist or is deleted.
    pub async fn set_text(
        pool: &PgPool,
        id: DbId,
        text: Option<&str>,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                UPDATE posts SET text = $2 WHERE id = $1 AND is_deleted = false RETURNING *
             )
             SELECT {COLUMNS} FROM p JOIN users u ON u.id = p.user_id"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(text)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a post by setting `is_deleted = true`.
    ///
    /// Returns `true` if the row was updated, `false` if it was already
    /// deleted or does not exist.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE posts SET is_deleted = true WHERE id = $1 AND is_deleted = false")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a post. Files and comments go with it via cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically add `delta` to a live post's upvotes.
    ///
    /// Returns `None` if the post does not exist or is deleted.
    pub async fn add_votes(
        pool: &PgPool,
        id: DbId,
        delta: i32,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                UPDATE posts SET upvotes = upvotes + $2
                WHERE id = $1 AND is_deleted = false
                RETURNING *
             )
             SELECT {COLUMNS} FROM p JOIN users u ON u.id = p.user_id"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(delta)
            .fetch_optional(pool)
            .await
    }
}
