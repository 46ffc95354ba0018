//! Multipart form parsing and upload persistence shared by the post handlers.

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use mediaboard_core::media::DEFAULT_MEDIA_TYPE;
use mediaboard_core::types::DbId;
use mediaboard_db::models::post_file::{CreatePostFile, PostFile};
use mediaboard_db::repositories::PostFileRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A file received in a multipart form, fully buffered.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Parsed body of a create/update post form.
#[derive(Debug, Default)]
pub struct PostForm {
    /// Raw `text` field, if the client sent one.
    pub text: Option<String>,
    /// Files from `files` (repeated) and `file` fields, in upload order.
    pub files: Vec<Upload>,
}

/// Blank text is stored as NULL.
pub fn normalize_text(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Buffer one file field, rejecting it as soon as it exceeds `max_bytes`.
async fn read_file_field(mut field: Field<'_>, max_bytes: u64) -> AppResult<Upload> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let media_type = field
        .content_type()
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_string();

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if (data.len() + chunk.len()) as u64 > max_bytes {
            return Err(AppError::BadRequest(format!(
                "File '{file_name}' exceeds the maximum upload size of {max_bytes} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(Upload {
        file_name,
        media_type,
        data,
    })
}

/// Read `text`, `files` and `file` fields. Unknown fields are ignored, as
/// are file fields sent without a file name (an empty file input).
pub async fn read_post_form(multipart: &mut Multipart, max_file_bytes: u64) -> AppResult<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.text = Some(text);
            }
            "files" | "file" => {
                if field.file_name().map_or(true, str::is_empty) {
                    continue;
                }
                form.files.push(read_file_field(field, max_file_bytes).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Write an upload under the storage root and record it against a post.
///
/// The file is removed again if the database insert fails.
pub async fn store_upload(
    state: &AppState,
    post_id: DbId,
    position: i32,
    upload: &Upload,
) -> AppResult<PostFile> {
    let stored = state.storage.allocate(&upload.file_name, &upload.media_type);
    state
        .storage
        .save(&stored, &upload.data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    let input = CreatePostFile {
        post_id,
        file_path: stored.clone(),
        file_type: upload.media_type.clone(),
        file_name: upload.file_name.clone(),
        file_size: i64::try_from(upload.data.len()).ok(),
        position,
    };
    match PostFileRepo::create(&state.pool, &input).await {
        Ok(file) => Ok(file),
        Err(e) => {
            state.storage.remove(&stored).await;
            Err(e.into())
        }
    }
}

/// Delete the on-disk files behind removed records.
pub async fn remove_stored(state: &AppState, files: &[PostFile]) {
    for file in files {
        state.storage.remove(&file.file_path).await;
    }
}

/// Undo uploads stored earlier in a request that then failed: drop their
/// records and their files.
pub async fn discard_uploads(state: &AppState, files: &[PostFile]) {
    let ids: Vec<DbId> = files.iter().map(|f| f.id).collect();
    if let Err(e) = PostFileRepo::delete_by_ids(&state.pool, &ids).await {
        tracing::warn!(error = %e, "Failed to drop records of discarded uploads");
    }
    remove_stored(state, files).await;
}
