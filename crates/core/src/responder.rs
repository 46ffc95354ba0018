//! Range-aware media responder.
//!
//! [`serve`] turns a stored file plus an optional `Range` header into one of
//! four outcomes. It knows nothing about HTTP types; the api crate maps
//! [`MediaResponse`] onto status codes and headers.
//!
//! Each call opens its own file handle, seeks once, and hands back a reader
//! limited to the bytes that should be sent. Nothing is shared between
//! requests.

use std::io::{self, SeekFrom};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};

use crate::disposition::content_disposition;
use crate::media::{MediaCategory, DEFAULT_MEDIA_TYPE};
use crate::range::{evaluate, ByteRange, RangeOutcome};
use crate::storage::StorageRoot;

/// Value of `Accept-Ranges` on every served file.
pub const ACCEPT_RANGES_BYTES: &str = "bytes";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A file as recorded in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Path relative to the storage root. Empty means "no file".
    pub path: String,
    /// Declared MIME type from upload time.
    pub media_type: String,
    /// Name the uploader gave the file.
    pub original_name: String,
    /// Size recorded at upload. Informational only; never used for ranges.
    pub recorded_size: Option<u64>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Headers common to full and partial responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHeaders {
    pub content_type: String,
    pub content_disposition: String,
    pub accept_ranges: &'static str,
    pub content_length: u64,
    /// Present only on partial responses.
    pub content_range: Option<String>,
    /// Present only for audio.
    pub cache_control: Option<&'static str>,
}

/// An open file positioned at the first byte to send.
#[derive(Debug)]
pub struct MediaBody {
    file: File,
    len: u64,
}

impl MediaBody {
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reader that yields exactly the bytes of this response.
    pub fn into_reader(self) -> Take<File> {
        self.file.take(self.len)
    }

    /// Buffer the whole body. Intended for small files and tests.
    pub async fn read_to_vec(self) -> io::Result<Vec<u8>> {
        let capacity = usize::try_from(self.len).unwrap_or(0);
        let mut buf = Vec::with_capacity(capacity);
        self.into_reader().read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

/// Outcome of serving a stored file.
#[derive(Debug)]
pub enum MediaResponse {
    /// Whole file (200).
    Full { headers: MediaHeaders, body: MediaBody },
    /// Inclusive slice of the file (206).
    Partial {
        headers: MediaHeaders,
        range: ByteRange,
        total: u64,
        body: MediaBody,
    },
    /// Requested range lies outside the file (416).
    RangeNotSatisfiable { total: u64 },
    /// No file on disk for this record (404).
    NotFound,
}

impl MediaResponse {
    /// HTTP status code this outcome maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Full { .. } => 200,
            Self::Partial { .. } => 206,
            Self::RangeNotSatisfiable { .. } => 416,
            Self::NotFound => 404,
        }
    }

    pub fn headers(&self) -> Option<&MediaHeaders> {
        match self {
            Self::Full { headers, .. } | Self::Partial { headers, .. } => Some(headers),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

fn build_headers(file: &StoredFile, content_length: u64, range: Option<(ByteRange, u64)>) -> MediaHeaders {
    let content_type = if file.media_type.trim().is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        file.media_type.clone()
    };
    let category = MediaCategory::from_media_type(&content_type);

    MediaHeaders {
        content_disposition: content_disposition(&content_type, &file.original_name),
        content_type,
        accept_ranges: ACCEPT_RANGES_BYTES,
        content_length,
        content_range: range.map(|(r, total)| r.content_range(total)),
        cache_control: category.cache_control(),
    }
}

/// Open the backing file, or `None` when it does not exist as a regular file.
async fn open_regular(storage: &StorageRoot, stored: &str) -> io::Result<Option<(File, u64)>> {
    let Some(path) = storage.resolve(stored) else {
        return Ok(None);
    };

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Ok(None);
    }
    Ok(Some((file, metadata.len())))
}

/// Serve `file` from `storage`, honouring an optional raw `Range` header.
///
/// The total length always comes from the file on disk. A missing or
/// malformed header yields the full file; a well-formed header outside the
/// file yields [`MediaResponse::RangeNotSatisfiable`]. I/O failures other
/// than a missing file are returned unchanged.
pub async fn serve(
    storage: &StorageRoot,
    file: &StoredFile,
    range_header: Option<&str>,
) -> io::Result<MediaResponse> {
    let Some((mut handle, total)) = open_regular(storage, &file.path).await? else {
        tracing::debug!(path = %file.path, "Stored file missing on disk");
        return Ok(MediaResponse::NotFound);
    };

    if let Some(recorded) = file.recorded_size {
        if recorded != total {
            tracing::debug!(
                path = %file.path,
                recorded,
                actual = total,
                "Recorded size differs from file on disk"
            );
        }
    }

    match evaluate(range_header, total) {
        RangeOutcome::Unspecified => Ok(MediaResponse::Full {
            headers: build_headers(file, total, None),
            body: MediaBody { file: handle, len: total },
        }),
        RangeOutcome::NotSatisfiable => Ok(MediaResponse::RangeNotSatisfiable { total }),
        RangeOutcome::Satisfiable(range) => {
            handle.seek(SeekFrom::Start(range.start)).await?;
            Ok(MediaResponse::Partial {
                headers: build_headers(file, range.len(), Some((range, total))),
                range,
                total,
                body: MediaBody {
                    file: handle,
                    len: range.len(),
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    const AUDIO_NAME: &str = "audio/track.mp3";

    fn sample_bytes() -> Vec<u8> {
        (0..1000u32).map(|i| (i % 251) as u8).collect()
    }

    fn setup(stored: &str, bytes: &[u8]) -> (TempDir, StorageRoot) {
        let dir = tempfile::tempdir().unwrap();
        let root = StorageRoot::new(dir.path());
        let path = root.resolve(stored).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        (dir, root)
    }

    fn stored(path: &str, media_type: &str, name: &str) -> StoredFile {
        StoredFile {
            path: path.to_string(),
            media_type: media_type.to_string(),
            original_name: name.to_string(),
            recorded_size: None,
        }
    }

    async fn body_of(response: MediaResponse) -> (MediaHeaders, Vec<u8>) {
        match response {
            MediaResponse::Full { headers, body } | MediaResponse::Partial { headers, body, .. } => {
                (headers, body.read_to_vec().await.unwrap())
            }
            other => panic!("expected a body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_range_serves_full_file() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        let response = serve(&root, &file, None).await.unwrap();
        assert_eq!(response.status_code(), 200);
        let (headers, body) = body_of(response).await;

        assert_eq!(body, data);
        assert_eq!(headers.content_length, 1000);
        assert_eq!(headers.accept_ranges, "bytes");
        assert_eq!(headers.content_range, None);
        assert_eq!(headers.cache_control, Some("public, max-age=3600"));
        assert_eq!(headers.content_type, "audio/mpeg");
        assert_eq!(headers.content_disposition, "inline; filename=\"track.mp3\"");
    }

    #[tokio::test]
    async fn leading_range_is_partial() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        let response = serve(&root, &file, Some("bytes=0-99")).await.unwrap();
        assert_eq!(response.status_code(), 206);
        assert_matches!(
            &response,
            MediaResponse::Partial { range, total: 1000, .. } if *range == ByteRange { start: 0, end: 99 }
        );
        let (headers, body) = body_of(response).await;

        assert_eq!(body, &data[0..100]);
        assert_eq!(headers.content_length, 100);
        assert_eq!(headers.content_range.as_deref(), Some("bytes 0-99/1000"));
        assert_eq!(headers.cache_control, Some("public, max-age=3600"));
    }

    #[tokio::test]
    async fn last_byte_range() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        let response = serve(&root, &file, Some("bytes=999-999")).await.unwrap();
        let (headers, body) = body_of(response).await;

        assert_eq!(body, vec![data[999]]);
        assert_eq!(headers.content_length, 1);
        assert_eq!(headers.content_range.as_deref(), Some("bytes 999-999/1000"));
    }

    #[tokio::test]
    async fn open_ended_range_runs_to_end() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        let response = serve(&root, &file, Some("bytes=900-")).await.unwrap();
        let (headers, body) = body_of(response).await;

        assert_eq!(body, &data[900..]);
        assert_eq!(headers.content_range.as_deref(), Some("bytes 900-999/1000"));
    }

    #[tokio::test]
    async fn every_valid_range_has_exact_length() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        for (start, end) in [(0u64, 0u64), (1, 1), (10, 500), (250, 999), (0, 999)] {
            let header = format!("bytes={start}-{end}");
            let response = serve(&root, &file, Some(&header)).await.unwrap();
            let (headers, body) = body_of(response).await;
            assert_eq!(body.len() as u64, end - start + 1, "{header}");
            assert_eq!(body, &data[start as usize..=end as usize], "{header}");
            assert_eq!(
                headers.content_range,
                Some(format!("bytes {start}-{end}/1000")),
                "{header}"
            );
        }
    }

    #[tokio::test]
    async fn range_past_end_is_not_satisfiable() {
        let (_dir, root) = setup(AUDIO_NAME, &sample_bytes());
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        for header in ["bytes=1000-1000", "bytes=0-1000", "bytes=2000-"] {
            let response = serve(&root, &file, Some(header)).await.unwrap();
            assert_matches!(response, MediaResponse::RangeNotSatisfiable { total: 1000 }, "{header}");
        }
    }

    #[tokio::test]
    async fn malformed_range_serves_full_file() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        let response = serve(&root, &file, Some("bytes=abc-def")).await.unwrap();
        assert_eq!(response.status_code(), 200);
        let (headers, body) = body_of(response).await;
        assert_eq!(body, data);
        assert_eq!(headers.content_length, 1000);
    }

    #[tokio::test]
    async fn size_comes_from_disk_not_record() {
        let data = sample_bytes();
        let (_dir, root) = setup(AUDIO_NAME, &data);
        let mut file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");
        file.recorded_size = Some(5);

        let response = serve(&root, &file, Some("bytes=500-")).await.unwrap();
        let (headers, body) = body_of(response).await;
        assert_eq!(body.len(), 500);
        assert_eq!(headers.content_range.as_deref(), Some("bytes 500-999/1000"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let root = StorageRoot::new(dir.path());

        let missing = stored("audio/gone.mp3", "audio/mpeg", "gone.mp3");
        assert_matches!(serve(&root, &missing, None).await.unwrap(), MediaResponse::NotFound);

        let empty = stored("", "audio/mpeg", "gone.mp3");
        assert_matches!(serve(&root, &empty, Some("bytes=0-1")).await.unwrap(), MediaResponse::NotFound);
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("image")).unwrap();
        let root = StorageRoot::new(dir.path());

        let file = stored("image", "image/png", "a.png");
        assert_matches!(serve(&root, &file, None).await.unwrap(), MediaResponse::NotFound);
    }

    #[tokio::test]
    async fn disposition_and_cache_follow_media_type() {
        let (_dir, root) = setup("other/a.bin", b"hello");

        let png = stored("other/a.bin", "image/png", "a.png");
        let (headers, _) = body_of(serve(&root, &png, None).await.unwrap()).await;
        assert!(headers.content_disposition.starts_with("inline"));
        assert_eq!(headers.cache_control, None);

        let zip = stored("other/a.bin", "application/zip", "a.zip");
        let (headers, _) = body_of(serve(&root, &zip, None).await.unwrap()).await;
        assert!(headers.content_disposition.starts_with("attachment"));

        let mp4 = stored("other/a.bin", "video/mp4", "a.mp4");
        let (headers, _) = body_of(serve(&root, &mp4, None).await.unwrap()).await;
        assert_eq!(headers.cache_control, None);

        let untyped = stored("other/a.bin", "", "a");
        let (headers, _) = body_of(serve(&root, &untyped, None).await.unwrap()).await;
        assert_eq!(headers.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn non_ascii_name_uses_extended_filename() {
        let (_dir, root) = setup(AUDIO_NAME, b"abc");
        let file = stored(AUDIO_NAME, "audio/mpeg", "песня.mp3");

        let (headers, _) = body_of(serve(&root, &file, None).await.unwrap()).await;
        assert!(
            headers.content_disposition.contains("filename*=UTF-8''"),
            "{}",
            headers.content_disposition
        );
    }

    #[tokio::test]
    async fn serving_is_idempotent() {
        let (_dir, root) = setup(AUDIO_NAME, &sample_bytes());
        let file = stored(AUDIO_NAME, "audio/mpeg", "track.mp3");

        let (first_headers, first_body) =
            body_of(serve(&root, &file, Some("bytes=100-199")).await.unwrap()).await;
        let (second_headers, second_body) =
            body_of(serve(&root, &file, Some("bytes=100-199")).await.unwrap()).await;

        assert_eq!(first_headers, second_headers);
        assert_eq!(first_body, second_body);
    }

    #[tokio::test]
    async fn empty_file_serves_empty_body() {
        let (_dir, root) = setup("other/empty.txt", b"");
        let file = stored("other/empty.txt", "text/plain", "empty.txt");

        let response = serve(&root, &file, None).await.unwrap();
        let (headers, body) = body_of(response).await;
        assert!(body.is_empty());
        assert_eq!(headers.content_length, 0);

        assert_matches!(
            serve(&root, &file, Some("bytes=0-")).await.unwrap(),
            MediaResponse::RangeNotSatisfiable { total: 0 }
        );
    }
}
