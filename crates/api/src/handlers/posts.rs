//! Handlers for the `/posts` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mediaboard_core::error::CoreError;
use mediaboard_core::types::DbId;
use mediaboard_db::models::post::{CreatePost, Post};
use mediaboard_db::repositories::{PostFileRepo, PostRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::{
    discard_uploads, normalize_text, read_post_form, remove_stored, store_upload,
};
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::response::PostResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a post (deleted or not) or 404.
pub(crate) async fn find_post(state: &AppState, id: DbId) -> AppResult<Post> {
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))
}

/// Reject edits to a soft-deleted post.
fn ensure_live(post: &Post) -> AppResult<()> {
    if post.is_deleted {
        return Err(AppError::BadRequest(format!(
            "Post {} has been deleted",
            post.id
        )));
    }
    Ok(())
}

fn ensure_owner(user: &AuthUser, post: &Post) -> AppResult<()> {
    if !user.can_modify(post.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only modify your own posts".into(),
        )));
    }
    Ok(())
}

async fn with_files(state: &AppState, post: Post) -> AppResult<PostResponse> {
    let files = PostFileRepo::list_by_post(&state.pool, post.id).await?;
    Ok(PostResponse::new(post, files))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/posts
///
/// Newest first. `?include_deleted=true` also returns soft-deleted posts.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let opts = params.to_options()?;
    let posts = PostRepo::list(&state.pool, opts).await?;

    let ids: Vec<DbId> = posts.iter().map(|p| p.id).collect();
    let mut files = PostFileRepo::list_by_posts(&state.pool, &ids).await?;

    let items = posts
        .into_iter()
        .map(|post| {
            let post_files = files.remove(&post.id).unwrap_or_default();
            PostResponse::new(post, post_files)
        })
        .collect();
    Ok(Json(items))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PostResponse>> {
    let post = find_post(&state, id).await?;
    Ok(Json(with_files(&state, post).await?))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/posts
///
/// Multipart form with an optional `text` field and any number of `files`.
/// At least one of the two is required.
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let form = read_post_form(&mut multipart, state.config.max_upload_bytes).await?;
    let text = normalize_text(form.text);

    if text.is_none() && form.files.is_empty() {
        return Err(AppError::BadRequest(
            "A post needs text or at least one file".into(),
        ));
    }

    let post = PostRepo::create(
        &state.pool,
        &CreatePost {
            user_id: user.user_id,
            text,
        },
    )
    .await?;

    let mut position = 0;
    for upload in &form.files {
        match store_upload(&state, post.id, position, upload).await {
            Ok(_) => position += 1,
            Err(e) => {
                tracing::warn!(
                    post_id = post.id,
                    file_name = %upload.file_name,
                    error = %e,
                    "Skipping file that could not be stored"
                );
            }
        }
    }

    if position == 0 && post.text.is_none() {
        PostRepo::delete(&state.pool, post.id).await?;
        return Err(AppError::BadRequest(
            "None of the uploaded files could be stored".into(),
        ));
    }

    tracing::info!(
        post_id = post.id,
        user_id = user.user_id,
        file_count = position,
        "Post created"
    );

    Ok((StatusCode::CREATED, Json(with_files(&state, post).await?)))
}

/// PUT /api/v1/posts/{id}
///
/// Multipart form. A `text` field replaces the text (blank clears it). An
/// uploaded file replaces every existing file of the post.
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<PostResponse>> {
    let post = find_post(&state, id).await?;
    ensure_owner(&user, &post)?;
    ensure_live(&post)?;

    let form = read_post_form(&mut multipart, state.config.max_upload_bytes).await?;

    // New files go in after the current ones; the old set is only dropped
    // once every upload is stored.
    if !form.files.is_empty() {
        let offset = PostFileRepo::list_by_post(&state.pool, id)
            .await?
            .iter()
            .map(|f| f.position + 1)
            .max()
            .unwrap_or(0);

        let mut added = Vec::with_capacity(form.files.len());
        for (position, upload) in (offset..).zip(&form.files) {
            match store_upload(&state, id, position, upload).await {
                Ok(file) => added.push(file),
                Err(e) => {
                    discard_uploads(&state, &added).await;
                    return Err(e);
                }
            }
        }

        let keep: Vec<DbId> = added.iter().map(|f| f.id).collect();
        let replaced = match PostFileRepo::replace(&state.pool, id, &keep).await {
            Ok(replaced) => replaced,
            Err(e) => {
                discard_uploads(&state, &added).await;
                return Err(e.into());
            }
        };
        remove_stored(&state, &replaced).await;
        tracing::debug!(
            post_id = id,
            replaced = replaced.len(),
            added = added.len(),
            "Post files replaced"
        );
    }

    if let Some(text) = form.text {
        let text = normalize_text(Some(text));
        PostRepo::set_text(&state.pool, id, text.as_deref())
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Post {id} has been deleted")))?;
    }

    tracing::info!(post_id = id, user_id = user.user_id, "Post updated");

    let post = find_post(&state, id).await?;
    Ok(Json(with_files(&state, post).await?))
}

/// DELETE /api/v1/posts/{id}
///
/// Soft-delete a post. Its files are removed from disk and detached.
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<PostResponse>> {
    let post = find_post(&state, id).await?;
    ensure_owner(&user, &post)?;
    ensure_live(&post)?;

    if !PostRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::BadRequest(format!("Post {id} has been deleted")));
    }

    let removed = PostFileRepo::delete_by_post(&state.pool, id).await?;
    remove_stored(&state, &removed).await;

    tracing::info!(
        post_id = id,
        user_id = user.user_id,
        removed_files = removed.len(),
        "Post deleted"
    );

    let post = find_post(&state, id).await?;
    Ok(Json(PostResponse::new(post, Vec::new())))
}

async fn vote(state: &AppState, id: DbId, delta: i32) -> AppResult<PostResponse> {
    let post = find_post(state, id).await?;
    ensure_live(&post)?;

    let post = PostRepo::add_votes(&state.pool, id, delta)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Post {id} has been deleted")))?;

    tracing::debug!(post_id = id, delta, upvotes = post.upvotes, "Vote recorded");
    with_files(state, post).await
}

/// POST /api/v1/posts/{id}/upvote
pub async fn upvote_post(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PostResponse>> {
    Ok(Json(vote(&state, id, 1).await?))
}

/// POST /api/v1/posts/{id}/downvote
pub async fn downvote_post(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PostResponse>> {
    Ok(Json(vote(&state, id, -1).await?))
}
