//! File download endpoints backed by the range-aware media responder.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use mediaboard_core::responder::{self, MediaBody, MediaHeaders, MediaResponse};
use mediaboard_core::types::DbId;
use mediaboard_db::models::post::Post;
use mediaboard_db::models::post_file::PostFile;
use mediaboard_db::repositories::PostFileRepo;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::handlers::posts::find_post;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Lookup helpers (shared with metadata)
// ---------------------------------------------------------------------------

/// A post that exists and is not soft-deleted, else 404.
pub(crate) async fn live_post(state: &AppState, id: DbId) -> AppResult<Post> {
    let post = find_post(state, id).await?;
    if post.is_deleted {
        return Err(AppError::not_found("Post", id));
    }
    Ok(post)
}

/// First file of a live post.
pub(crate) async fn primary_file(state: &AppState, post_id: DbId) -> AppResult<PostFile> {
    live_post(state, post_id).await?;
    PostFileRepo::find_primary(&state.pool, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("PostFile", post_id))
}

/// A specific file of a live post.
pub(crate) async fn post_file(state: &AppState, post_id: DbId, file_id: DbId) -> AppResult<PostFile> {
    live_post(state, post_id).await?;
    PostFileRepo::find_in_post(&state.pool, post_id, file_id)
        .await?
        .ok_or_else(|| AppError::not_found("PostFile", file_id))
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

/// Raw `Range` header. A value that is not valid UTF-8 counts as absent.
fn range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::RANGE).and_then(|v| v.to_str().ok())
}

fn stream_response(status: StatusCode, headers: MediaHeaders, body: MediaBody) -> AppResult<Response> {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, headers.content_type)
        .header(header::CONTENT_DISPOSITION, headers.content_disposition)
        .header(header::ACCEPT_RANGES, headers.accept_ranges)
        .header(header::CONTENT_LENGTH, headers.content_length.to_string());
    if let Some(range) = headers.content_range {
        builder = builder.header(header::CONTENT_RANGE, range);
    }
    if let Some(cache) = headers.cache_control {
        builder = builder.header(header::CACHE_CONTROL, cache);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(body.into_reader())))
        .map_err(|e| AppError::InternalError(format!("Failed to build media response: {e}")))
}

/// Map a responder outcome for `file` onto an HTTP response.
fn into_http(outcome: MediaResponse, file: &PostFile) -> AppResult<Response> {
    match outcome {
        MediaResponse::Full { headers, body } => stream_response(StatusCode::OK, headers, body),
        MediaResponse::Partial { headers, body, .. } => {
            stream_response(StatusCode::PARTIAL_CONTENT, headers, body)
        }
        MediaResponse::RangeNotSatisfiable { total } => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{total}"))
            .body(Body::empty())
            .map_err(|e| AppError::InternalError(e.to_string())),
        MediaResponse::NotFound => {
            tracing::warn!(
                file_id = file.id,
                path = %file.file_path,
                "File record has no file on disk"
            );
            Err(AppError::not_found("PostFile", file.id))
        }
    }
}

async fn serve(state: &AppState, file: &PostFile, headers: &HeaderMap) -> AppResult<Response> {
    let outcome = responder::serve(&state.storage, &file.stored_file(), range_header(headers))
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read stored file: {e}")))?;
    into_http(outcome, file)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/posts/{id}/file
///
/// Serve the first file of a post. Honours `Range: bytes=START-END`.
pub async fn serve_primary_file(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let file = primary_file(&state, id).await?;
    serve(&state, &file, &headers).await
}

/// GET /api/v1/posts/{id}/files/{file_id}
pub async fn serve_post_file(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(DbId, DbId)>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let file = post_file(&state, id, file_id).await?;
    serve(&state, &file, &headers).await
}
