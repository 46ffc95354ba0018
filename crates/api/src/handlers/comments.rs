//! Handlers for comments, nested under `/posts/{post_id}/comments`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mediaboard_core::error::CoreError;
use mediaboard_core::types::DbId;
use mediaboard_db::models::comment::CreateComment;
use mediaboard_db::repositories::CommentRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::posts::find_post;
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::response::CommentResponse;
use crate::state::AppState;

/// Request body for `POST /posts/{post_id}/comments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub text: String,
}

/// GET /api/v1/posts/{post_id}/comments
///
/// Oldest first. Comments of deleted posts remain readable.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let opts = params.to_options()?;
    find_post(&state, post_id).await?;

    let comments = CommentRepo::list_by_post(&state.pool, post_id, opts).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// POST /api/v1/posts/{post_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<DbId>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    input.validate()?;

    let post = find_post(&state, post_id).await?;
    if post.is_deleted {
        return Err(AppError::BadRequest(format!(
            "Cannot comment on deleted post {post_id}"
        )));
    }

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            post_id,
            user_id: user.user_id,
            text: input.text,
        },
    )
    .await?;

    tracing::info!(
        comment_id = comment.id,
        post_id,
        user_id = user.user_id,
        "Comment created"
    );

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// DELETE /api/v1/posts/{post_id}/comments/{comment_id}
///
/// Soft delete, allowed for the author or an admin.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((post_id, comment_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<CommentResponse>> {
    let comment = CommentRepo::find_in_post(&state.pool, post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment", comment_id))?;

    if !user.can_modify(comment.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own comments".into(),
        )));
    }
    if comment.is_deleted || !CommentRepo::soft_delete(&state.pool, comment_id).await? {
        return Err(AppError::BadRequest(format!(
            "Comment {comment_id} has already been deleted"
        )));
    }

    tracing::info!(comment_id, post_id, user_id = user.user_id, "Comment deleted");

    let comment = CommentRepo::find_in_post(&state.pool, post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment", comment_id))?;
    Ok(Json(CommentResponse::from(comment)))
}
