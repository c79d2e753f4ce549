use thiserror::Error;

/// Everything that can go wrong decoding a frame off the wire.
///
/// Callers that need to bucket these into the sink's coarse error taxonomy
/// (`MalformedFrame` vs. `OversizeLength`) can match on [`FrameError::is_oversize`]
/// rather than enumerating variants by hand.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("metadata is not valid JSON: {0}")]
    InvalidMetadata(#[from] serde_json::Error),

    #[error("frame of {len} bytes exceeds the {max}-byte limit")]
    OversizeFrame { len: u64, max: u64 },

    #[error("crop of {len} bytes exceeds the {max}-byte limit")]
    OversizeCrop { len: u64, max: u64 },
}

impl FrameError {
    /// True for the two size-limit variants, false for the two
    /// structurally-malformed variants.
    #[must_use]
    pub fn is_oversize(&self) -> bool {
        matches!(self, FrameError::OversizeFrame { .. } | FrameError::OversizeCrop { .. })
    }
}
