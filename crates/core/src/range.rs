//! `Range: bytes=START-END` parsing and bounds checking.
//!
//! A header that cannot be parsed is never an error: the caller falls back
//! to serving the whole file. Only a well-formed range that falls outside
//! the file is rejected.

/// Inclusive byte interval `[start, end]` within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a `ByteRange` covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` header value for a file of `total` bytes.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

/// What a request's `Range` header means for a file of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No header, or a header that could not be parsed. Serve everything.
    Unspecified,
    /// Serve exactly this slice.
    Satisfiable(ByteRange),
    /// The requested bounds lie outside the file.
    NotSatisfiable,
}

/// Raw bounds as written in the header; either side may be omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeSpec {
    start: Option<u64>,
    end: Option<u64>,
}

fn parse_bound(raw: &str) -> Result<Option<u64>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u64>().map(Some).map_err(|_| ())
}

/// Parse a `bytes=START-END` header value. Returns `None` when malformed.
fn parse_range_header(value: &str) -> Option<RangeSpec> {
    let value = value.trim().strip_prefix("bytes=")?;
    let (start, end) = value.split_once('-')?;
    Some(RangeSpec {
        start: parse_bound(start).ok()?,
        end: parse_bound(end).ok()?,
    })
}

/// Evaluate an optional `Range` header against a file of `total` bytes.
///
/// A missing start means 0 and a missing end means the last byte. Bounds
/// at or beyond `total` are unsatisfiable, so every range against an empty
/// file is. An inverted range (`end < start`) is treated as malformed.
pub fn evaluate(header: Option<&str>, total: u64) -> RangeOutcome {
    let Some(requested) = header.and_then(parse_range_header) else {
        return RangeOutcome::Unspecified;
    };

    let start = requested.start.unwrap_or(0);
    let end = requested.end.unwrap_or_else(|| total.saturating_sub(1));

    if start >= total || end >= total {
        return RangeOutcome::NotSatisfiable;
    }
    if end < start {
        return RangeOutcome::Unspecified;
    }

    RangeOutcome::Satisfiable(ByteRange { start, end })
}
