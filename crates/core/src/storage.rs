//! Upload storage root: path allocation, resolution, and file lifecycle.
//!
//! Stored paths are always relative to the root (`audio/<uuid>.mp3`), so the
//! upload directory can move without rewriting database rows.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::media::{extension_for_media_type, MediaCategory};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default upload directory, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default per-file upload cap (200 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Longest file-name extension copied into a stored path.
const MAX_EXTENSION_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Extension selection
// ---------------------------------------------------------------------------

/// Extension (with leading dot, lowercased) taken from an original file name.
///
/// Only short ASCII-alphanumeric extensions are accepted so a stored path
/// never carries separators or shell-hostile characters.
fn extension_from_name(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Pick the stored extension: the original name's, else one derived from the
/// media type, else `.bin`.
pub fn choose_extension(original_name: &str, media_type: &str) -> String {
    extension_from_name(original_name)
        .unwrap_or_else(|| extension_for_media_type(media_type).to_string())
}

// ---------------------------------------------------------------------------
// StorageRoot
// ---------------------------------------------------------------------------

/// The directory all uploads live under.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    base: PathBuf,
}

impl StorageRoot {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a stored relative path to an absolute location under the root.
    ///
    /// Returns `None` for empty paths and for anything that would escape the
    /// root (absolute paths, `..` components).
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        if stored.is_empty() {
            return None;
        }
        let relative = Path::new(stored);
        let mut resolved = self.base.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return None;
                }
            }
        }
        if resolved == self.base {
            return None;
        }
        Some(resolved)
    }

    /// Allocate a fresh relative path `<category>/<uuid><ext>` for an upload.
    pub fn allocate(&self, original_name: &str, media_type: &str) -> String {
        let category = MediaCategory::from_media_type(media_type);
        format!(
            "{}/{}{}",
            category.as_str(),
            uuid::Uuid::new_v4(),
            choose_extension(original_name, media_type)
        )
    }

    /// Write `bytes` to a stored path, creating parent directories.
    pub async fn save(&self, stored: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.resolve(stored).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid stored path '{stored}'"),
            )
        })?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Delete a stored file. Missing files and failures are logged, not fatal.
    ///
    /// Returns `true` when a file was actually removed.
    pub async fn remove(&self, stored: &str) -> bool {
        let Some(path) = self.resolve(stored) else {
            return false;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored file");
                false
            }
        }
    }
}
