//! Response shapes for posts, their files, and comments.
//!
//! Posts expose every attached file under `files` plus the legacy
//! single-file fields (`file_path`, `file_type`, `file_name`, `file_url`),
//! which mirror the first file so older clients keep working.

use mediaboard_core::types::{DbId, Timestamp};
use mediaboard_db::models::comment::Comment;
use mediaboard_db::models::post::Post;
use mediaboard_db::models::post_file::PostFile;
use serde::Serialize;

/// Prefix every API route is nested under.
pub const API_PREFIX: &str = "/api/v1";

/// URL that serves the first file of a post.
pub fn primary_file_url(post_id: DbId) -> String {
    format!("{API_PREFIX}/posts/{post_id}/file")
}

/// URL that serves a specific file of a post.
pub fn file_url(post_id: DbId, file_id: DbId) -> String {
    format!("{API_PREFIX}/posts/{post_id}/files/{file_id}")
}

#[derive(Debug, Clone, Serialize)]
pub struct PostFileResponse {
    pub id: DbId,
    pub file_path: String,
    pub file_type: String,
    pub file_name: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub order: i32,
}

impl From<PostFile> for PostFileResponse {
    fn from(file: PostFile) -> Self {
        Self {
            file_url: file_url(file.post_id, file.id),
            id: file.id,
            file_path: file.file_path,
            file_type: file.file_type,
            file_name: file.file_name,
            file_size: file.file_size,
            order: file.position,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: DbId,
    pub text: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub files: Vec<PostFileResponse>,
    pub date: Timestamp,
    pub is_deleted: bool,
    pub upvotes: i32,
    pub author_nick: String,
    pub author_id: DbId,
}

impl PostResponse {
    /// Combine a post with its files, which must already be in display order.
    pub fn new(post: Post, files: Vec<PostFile>) -> Self {
        let files: Vec<PostFileResponse> = files.into_iter().map(PostFileResponse::from).collect();
        let first = files.first();

        Self {
            file_path: first.map(|f| f.file_path.clone()),
            file_type: first.map(|f| f.file_type.clone()),
            file_name: first.map(|f| f.file_name.clone()),
            file_url: first.map(|_| primary_file_url(post.id)),
            id: post.id,
            text: post.text,
            files,
            date: post.created_at,
            is_deleted: post.is_deleted,
            upvotes: post.upvotes,
            author_nick: post.author_nick,
            author_id: post.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub text: String,
    pub date: Timestamp,
    pub is_deleted: bool,
    pub author_nick: String,
    pub author_id: DbId,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            text: comment.text,
            date: comment.created_at,
            is_deleted: comment.is_deleted,
            author_nick: comment.author_nick,
            author_id: comment.user_id,
        }
    }
}
