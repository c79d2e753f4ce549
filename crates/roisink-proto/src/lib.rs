//! Wire framing and metadata types shared by every component that touches
//! a camera-capture message: the receiver (decoding), the ACK emitter and
//! manual-trigger path (encoding, for tests and simulators), and the
//! journal writer (metadata field extraction).

mod error;
mod frame;
mod jpeg;
mod metadata;

pub use error::FrameError;
pub use frame::{decode_frame, decode_frame_with_limits, encode_frame, CropRecord, Frame, FrameLimits};
pub use jpeg::{jpeg_decode, JpegDecodeError};
pub use metadata::{Camera, MetadataExt, Pose, Roi};
