//! Best-effort audio tag and cover art extraction.
//!
//! Extraction runs a fixed, ordered list of [`TagSource`] strategies and
//! stops at the first one that yields anything. Every failure (unreadable
//! tag, unknown container, corrupt data) degrades to "no tags", never to an
//! error; only reading the file itself can fail.

use std::io::{self, Cursor};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use id3::TagLike as _;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey, StandardVisualKey};
use symphonia::core::probe::Hint;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Embedded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    /// Media type sniffed from the image bytes.
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl CoverArt {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            mime_type: sniff_image_type(&data),
            data,
        }
    }

    /// `data:<mime>;base64,<payload>` URL for inline embedding.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Tags read from an audio file. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover: Option<CoverArt>,
}

impl AudioTags {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none() && self.cover.is_none()
    }
}

/// Where tags are read from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    /// ID3v2 frames (`TIT2`, `TPE1`, `TALB`, `APIC`).
    Id3,
    /// Container metadata found by the demuxer probe (Vorbis comments,
    /// FLAC pictures, MP4 atoms, RIFF INFO).
    Container,
}

/// Strategies tried by [`extract_tags`], first match wins.
pub const TAG_SOURCES: [TagSource; 2] = [TagSource::Id3, TagSource::Container];

impl TagSource {
    fn extract(self, data: &Bytes, file_name: &str, media_type: &str) -> Option<AudioTags> {
        match self {
            Self::Id3 => extract_id3(data),
            Self::Container => extract_container(data, file_name, media_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Cover sniffing
// ---------------------------------------------------------------------------

/// Detect an image type from its magic bytes. Unknown data is assumed JPEG.
pub fn sniff_image_type(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG") {
        "image/png"
    } else if data.starts_with(&[0xff, 0xd8]) {
        "image/jpeg"
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// ID3
// ---------------------------------------------------------------------------

fn extract_id3(data: &[u8]) -> Option<AudioTags> {
    let tag = id3::Tag::read_from2(Cursor::new(data)).ok()?;

    let cover = tag
        .pictures()
        .find(|p| p.picture_type == id3::frame::PictureType::CoverFront)
        .or_else(|| tag.pictures().next())
        .filter(|p| !p.data.is_empty())
        .map(|p| CoverArt::new(p.data.clone()));

    let tags = AudioTags {
        title: tag.title().and_then(non_blank),
        artist: tag.artist().and_then(non_blank),
        album: tag.album().and_then(non_blank),
        cover,
    };
    (!tags.is_empty()).then_some(tags)
}

// ---------------------------------------------------------------------------
// Container metadata (symphonia)
// ---------------------------------------------------------------------------

fn extension_hint(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|e| e.to_str())
}

/// Fill fields that are still missing from one metadata revision.
fn apply_revision(tags: &mut AudioTags, revision: &MetadataRevision) {
    for tag in revision.tags() {
        let slot = match tag.std_key {
            Some(StandardTagKey::TrackTitle) => &mut tags.title,
            Some(StandardTagKey::Artist) => &mut tags.artist,
            Some(StandardTagKey::Album) => &mut tags.album,
            _ => continue,
        };
        if slot.is_none() {
            *slot = non_blank(&tag.value.to_string());
        }
    }

    if tags.cover.is_none() {
        let visuals = revision.visuals();
        tags.cover = visuals
            .iter()
            .find(|v| v.usage == Some(StandardVisualKey::FrontCover))
            .or_else(|| visuals.first())
            .filter(|v| !v.data.is_empty())
            .map(|v| CoverArt::new(v.data.to_vec()));
    }
}

/// The probe reads through a shared handle to `data`, never a copy.
fn extract_container(data: &Bytes, file_name: &str, media_type: &str) -> Option<AudioTags> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(data.clone())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint(file_name) {
        hint.with_extension(ext);
    }
    if !media_type.is_empty() {
        hint.mime_type(media_type);
    }

    let mut probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .ok()?;

    let mut tags = AudioTags::default();
    if let Some(mut metadata) = probed.metadata.get() {
        if let Some(revision) = metadata.skip_to_latest() {
            apply_revision(&mut tags, revision);
        }
    }
    let mut metadata = probed.format.metadata();
    if let Some(revision) = metadata.skip_to_latest() {
        apply_revision(&mut tags, revision);
    }

    (!tags.is_empty()).then_some(tags)
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run every [`TagSource`] in order over in-memory file contents.
pub fn extract_tags(data: impl Into<Bytes>, file_name: &str, media_type: &str) -> AudioTags {
    let data = data.into();
    TAG_SOURCES
        .iter()
        .find_map(|source| source.extract(&data, file_name, media_type))
        .unwrap_or_default()
}

/// Read a file from disk and extract its tags on the blocking pool.
pub async fn read_audio_tags(path: &Path, file_name: &str, media_type: &str) -> io::Result<AudioTags> {
    let data = tokio::fs::read(path).await?;
    let file_name = file_name.to_string();
    let media_type = media_type.to_string();

    tokio::task::spawn_blocking(move || extract_tags(data, &file_name, &media_type))
        .await
        .map_err(io::Error::other)
}
