//! Domain logic for the mediaboard backend.
//!
//! Everything here is independent of HTTP and the database: MIME
//! classification, byte-range resolution, content disposition, the upload
//! storage root, audio tag extraction and the media responder that ties them
//! together.

pub mod audio_tags;
pub mod disposition;
pub mod error;
pub mod media;
pub mod range;
pub mod responder;
pub mod roles;
pub mod storage;
pub mod types;
