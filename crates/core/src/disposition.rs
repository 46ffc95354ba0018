//! `Content-Disposition` header construction.

use crate::media::MediaCategory;

/// Name used when a stored file has no original name.
const DEFAULT_FILE_NAME: &str = "file";

/// Whether the client should render the file or save it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispositionKind {
    Inline,
    Attachment,
}

impl DispositionKind {
    /// Image, video and audio render inline; everything else downloads.
    pub fn for_category(category: MediaCategory) -> Self {
        if category.is_renderable() {
            Self::Inline
        } else {
            Self::Attachment
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// A name survives as a plain quoted `filename` only if it is printable ASCII.
fn is_plain_ascii(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}

/// Build the header value for a file of the given media type and name.
///
/// ASCII names become `filename="<name>"` with quotes and backslashes
/// escaped. Anything else becomes the RFC 5987 form
/// `filename*=UTF-8''<percent-encoded>`.
pub fn content_disposition(media_type: &str, original_name: &str) -> String {
    let kind = DispositionKind::for_category(MediaCategory::from_media_type(media_type));
    let name = if original_name.is_empty() {
        DEFAULT_FILE_NAME
    } else {
        original_name
    };

    if is_plain_ascii(name) {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{}; filename=\"{}\"", kind.as_str(), escaped)
    } else {
        format!(
            "{}; filename*=UTF-8''{}",
            kind.as_str(),
            urlencoding::encode(name)
        )
    }
}
