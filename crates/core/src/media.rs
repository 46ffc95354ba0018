//! MIME classification for stored media.
//!
//! Every policy that depends on a file's media type (inline vs attachment
//! disposition, audio caching, storage subdirectory) derives from
//! [`MediaCategory::from_media_type`] so the rules cannot drift apart.

/// Media type used when an upload does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Cache directive attached to every audio response.
pub const AUDIO_CACHE_CONTROL: &str = "public, max-age=3600";

/// Extension used when neither the file name nor the media type yields one.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Closed set of categories a media type can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaCategory {
    /// Classify a MIME string by its top-level type.
    ///
    /// Parameters (`; charset=...`) and letter case are ignored. Anything
    /// without a `type/subtype` shape is [`MediaCategory::Other`].
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        let Some((top, subtype)) = essence.split_once('/') else {
            return Self::Other;
        };
        if subtype.trim().is_empty() {
            return Self::Other;
        }

        match top.trim().to_ascii_lowercase().as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => Self::Other,
        }
    }

    /// Lowercase name, also used as the storage subdirectory.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }

    /// Whether a client can render this category directly.
    pub fn is_renderable(self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Cache directive for responses of this category, if any.
    pub fn cache_control(self) -> Option<&'static str> {
        match self {
            Self::Audio => Some(AUDIO_CACHE_CONTROL),
            _ => None,
        }
    }
}

/// Map a declared media type to a file extension (with leading dot).
///
/// Used when the uploaded file name carries no usable extension.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/ogg" => ".ogv",
        "video/quicktime" => ".mov",
        "video/x-msvideo" => ".avi",
        "video/x-matroska" => ".mkv",
        "audio/mpeg" => ".mp3",
        "audio/ogg" => ".ogg",
        "audio/wav" => ".wav",
        "audio/webm" => ".weba",
        "audio/flac" | "audio/x-flac" => ".flac",
        "audio/aac" => ".aac",
        "audio/x-m4a" => ".m4a",
        "application/pdf" => ".pdf",
        "application/zip" => ".zip",
        "application/x-rar-compressed" => ".rar",
        "text/plain" => ".txt",
        _ => FALLBACK_EXTENSION,
    }
}
