//! Files attached to a post.

use mediaboard_core::responder::StoredFile;
use mediaboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `post_files`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostFile {
    pub id: DbId,
    pub post_id: DbId,
    /// Path relative to the upload root.
    pub file_path: String,
    pub file_type: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PostFile {
    /// View of this record as input to the media responder.
    pub fn stored_file(&self) -> StoredFile {
        StoredFile {
            path: self.file_path.clone(),
            media_type: self.file_type.clone(),
            original_name: self.file_name.clone(),
            recorded_size: self.file_size.and_then(|s| u64::try_from(s).ok()),
        }
    }
}

/// DTO for attaching a stored file to a post.
#[derive(Debug, Clone)]
pub struct CreatePostFile {
    pub post_id: DbId,
    pub file_path: String,
    pub file_type: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub position: i32,
}
