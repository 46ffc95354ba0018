//! Repository for the `post_files` table.

use std::collections::HashMap;

use mediaboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::post_file::{CreatePostFile, PostFile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, file_path, file_type, file_name, file_size, position, \
                       created_at, updated_at";

/// Provides CRUD operations for files attached to posts.
pub struct PostFileRepo;

impl PostFileRepo {
    /// Record a stored file against a post.
    pub async fn create(pool: &PgPool, input: &CreatePostFile) -> Result<PostFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_files (post_id, file_path, file_type, file_name, file_size, position)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostFile>(&query)
            .bind(input.post_id)
            .bind(&input.file_path)
            .bind(&input.file_type)
            .bind(&input.file_name)
            .bind(input.file_size)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// Files of one post in display order.
    pub async fn list_by_post(pool: &PgPool, post_id: DbId) -> Result<Vec<PostFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_files WHERE post_id = $1 ORDER BY position ASC, id ASC"
        );
        sqlx::query_as::<_, PostFile>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Files of many posts at once, grouped by post and in display order.
    pub async fn list_by_posts(
        pool: &PgPool,
        post_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<PostFile>>, sqlx::Error> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM post_files
             WHERE post_id = ANY($1)
             ORDER BY post_id, position ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, PostFile>(&query)
            .bind(post_ids)
            .fetch_all(pool)
            .await?;

        let mut grouped: HashMap<DbId, Vec<PostFile>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(row);
        }
        Ok(grouped)
    }

    /// Every file attached to any post by `user_id`, deleted posts included.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<PostFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_files
             WHERE post_id IN (SELECT id FROM posts WHERE user_id = $1)
             ORDER BY post_id, position ASC, id ASC"
        );
        sqlx::query_as::<_, PostFile>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// First file of a post (lowest position), if any.
    pub async fn find_primary(pool: &PgPool, post_id: DbId) -> Result<Option<PostFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_files
             WHERE post_id = $1
             ORDER BY position ASC, id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, PostFile>(&query)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// A specific file, scoped to its post.
    pub async fn find_in_post(
        pool: &PgPool,
        post_id: DbId,
        file_id: DbId,
    ) -> Result<Option<PostFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM post_files WHERE id = $1 AND post_id = $2");
        sqlx::query_as::<_, PostFile>(&query)
            .bind(file_id)
            .bind(post_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove every file record of a post, returning the removed rows so the
    /// caller can delete the files from disk.
    pub async fn delete_by_post(pool: &PgPool, post_id: DbId) -> Result<Vec<PostFile>, sqlx::Error> {
        let query = format!("DELETE FROM post_files WHERE post_id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, PostFile>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Remove specific file records, returning the removed rows.
    pub async fn delete_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<PostFile>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("DELETE FROM post_files WHERE id = ANY($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, PostFile>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Keep only the `keep` files of a post and renumber them from 0 in
    /// their current order, in one transaction. Returns the removed rows.
    pub async fn replace(
        pool: &PgPool,
        post_id: DbId,
        keep: &[DbId],
    ) -> Result<Vec<PostFile>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "DELETE FROM post_files WHERE post_id = $1 AND NOT (id = ANY($2)) RETURNING {COLUMNS}"
        );
        let removed = sqlx::query_as::<_, PostFile>(&query)
            .bind(post_id)
            .bind(keep)
            .fetch_all(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE post_files pf SET position = ranked.rn::int - 1
             FROM (
                 SELECT id, ROW_NUMBER() OVER (ORDER BY position ASC, id ASC) AS rn
                 FROM post_files WHERE post_id = $1
             ) ranked
             WHERE pf.id = ranked.id",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(removed)
    }
}
