use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;
use roisink_decode::{DecodeError, LicenseError};
use roisink_journal::JournalError;
use roisink_proto::FrameError;

/// The sink's aggregate error taxonomy (spec.md §7), gathered from every
/// crate the pipeline touches via `thiserror`'s `#[from]`.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Covers both `MalformedFrame` and `OversizeLength` from spec.md's
    /// taxonomy — `roisink_proto::FrameError::is_oversize` distinguishes
    /// them for callers that need to bucket counters separately.
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    License(#[from] LicenseError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
