//! Audio tag and cover art endpoints.
//!
//! Tag extraction is best effort: a file that cannot be parsed yields a
//! response with every field null, never an error.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mediaboard_core::audio_tags::{read_audio_tags, AudioTags};
use mediaboard_core::media::{MediaCategory, AUDIO_CACHE_CONTROL};
use mediaboard_core::types::DbId;
use mediaboard_db::models::post_file::PostFile;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::media::{post_file, primary_file};
use crate::response::API_PREFIX;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Cover art as a `data:` URL.
    pub cover: Option<String>,
    /// Endpoint that serves the cover art as raw bytes.
    pub cover_url: Option<String>,
}

impl MetadataResponse {
    fn new(tags: AudioTags, cover_url: String) -> Self {
        let cover = tags.cover.as_ref().map(|c| c.data_url());
        Self {
            cover_url: cover.as_ref().map(|_| cover_url),
            title: tags.title,
            artist: tags.artist,
            album: tags.album,
            cover,
        }
    }
}

/// Read tags from a stored audio file.
///
/// `None` means the file is missing from disk; any other read failure is
/// logged and reported as empty tags.
async fn load_tags(state: &AppState, file: &PostFile) -> Option<AudioTags> {
    let path = state.storage.resolve(&file.file_path)?;
    match read_audio_tags(&path, &file.file_name, &file.file_type).await {
        Ok(tags) => Some(tags),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(file_id = file.id, error = %e, "Failed to read audio tags");
            Some(AudioTags::default())
        }
    }
}

fn is_audio(file: &PostFile) -> bool {
    MediaCategory::from_media_type(&file.file_type) == MediaCategory::Audio
}

async fn metadata_for(state: &AppState, file: &PostFile, cover_url: String) -> AppResult<MetadataResponse> {
    if !is_audio(file) {
        return Err(AppError::BadRequest(format!(
            "File {} is not an audio file",
            file.id
        )));
    }
    let tags = load_tags(state, file)
        .await
        .ok_or_else(|| AppError::not_found("PostFile", file.id))?;
    Ok(MetadataResponse::new(tags, cover_url))
}

/// Cover image bytes with their sniffed type. 404 when there is no cover.
async fn cover_for(state: &AppState, file: &PostFile) -> AppResult<Response> {
    let no_cover = || AppError::not_found("Cover", file.id);
    if !is_audio(file) {
        return Err(no_cover());
    }
    let cover = load_tags(state, file)
        .await
        .and_then(|tags| tags.cover)
        .ok_or_else(no_cover)?;

    Ok((
        [
            (header::CONTENT_TYPE, cover.mime_type),
            (header::CACHE_CONTROL, AUDIO_CACHE_CONTROL),
        ],
        cover.data,
    )
        .into_response())
}

/// GET /api/v1/posts/{id}/metadata
pub async fn get_post_metadata(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<MetadataResponse>> {
    let file = primary_file(&state, id).await?;
    let cover_url = format!("{API_PREFIX}/posts/{id}/cover");
    Ok(Json(metadata_for(&state, &file, cover_url).await?))
}

/// GET /api/v1/posts/{id}/files/{file_id}/metadata
pub async fn get_file_metadata(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<MetadataResponse>> {
    let file = post_file(&state, id, file_id).await?;
    let cover_url = format!("{API_PREFIX}/posts/{id}/files/{file_id}/cover");
    Ok(Json(metadata_for(&state, &file, cover_url).await?))
}

/// GET /api/v1/posts/{id}/cover
pub async fn get_post_cover(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let file = primary_file(&state, id).await?;
    cover_for(&state, &file).await
}

/// GET /api/v1/posts/{id}/files/{file_id}/cover
pub async fn get_file_cover(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let file = post_file(&state, id, file_id).await?;
    cover_for(&state, &file).await
}
