//! Wire framing for camera-capture messages.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! [ frame_sequence: u16 ][ timestamp_ms: u32 ] {
//!     [ metadata_length: u32 ][ metadata: metadata_length bytes, JSON ]
//!     [ image_length: u32    ][ image: image_length bytes, JPEG      ]
//! } *
//! ```
//!
//! Zero or more crop records follow the six-byte header, back to back,
//! until the buffer is exhausted. A frame with no crops is valid (it still
//! advances `frame_sequence` for loss detection purposes).

use crate::error::FrameError;
use serde_json::Value;

const HEADER_LEN: usize = 6;
const LEN_FIELD: usize = 4;

/// One detected region plus its JPEG crop, as it travels over the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRecord {
    pub metadata: Value,
    pub image: Vec<u8>,
}

/// A fully decoded camera-capture message.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub frame_sequence: u16,
    pub timestamp_ms: u32,
    pub crops: Vec<CropRecord>,
}

/// Size ceilings applied while decoding, to keep an untrusted length field
/// from driving an allocation larger than the sender could legitimately
/// produce.
#[derive(Debug, Clone, Copy)]
pub struct FrameLimits {
    pub max_frame_bytes: u64,
    pub max_crop_bytes: u64,
}

impl FrameLimits {
    pub const DEFAULT_MAX_FRAME_BYTES: u64 = 64 * 1024 * 1024;
    pub const DEFAULT_MAX_CROP_BYTES: u64 = 16 * 1024 * 1024;
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_frame_bytes: Self::DEFAULT_MAX_FRAME_BYTES,
            max_crop_bytes: Self::DEFAULT_MAX_CROP_BYTES,
        }
    }
}

/// Decode a frame using [`FrameLimits::default`].
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, FrameError> {
    decode_frame_with_limits(bytes, FrameLimits::default())
}

/// Decode a frame, enforcing the given size limits.
///
/// A length field that would read past the end of `bytes` is rejected as
/// [`FrameError::Truncated`] — a length exactly equal to the remaining
/// bytes is accepted, one byte larger is not.
pub fn decode_frame_with_limits(bytes: &[u8], limits: FrameLimits) -> Result<Frame, FrameError> {
    if bytes.len() as u64 > limits.max_frame_bytes {
        return Err(FrameError::OversizeFrame { len: bytes.len() as u64, max: limits.max_frame_bytes });
    }
    if bytes.len() < HEADER_LEN {
        return Err(FrameError::Truncated { needed: HEADER_LEN, available: bytes.len() });
    }

    let frame_sequence = u16::from_be_bytes([bytes[0], bytes[1]]);
    let timestamp_ms = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);

    let mut pos = HEADER_LEN;
    let mut crops = Vec::new();

    while pos < bytes.len() {
        let metadata_length = read_u32_field(bytes, pos, limits.max_crop_bytes)?;
        pos += LEN_FIELD;
        let metadata_bytes = take_bytes(bytes, pos, metadata_length)?;
        pos += metadata_length;
        let metadata: Value = serde_json::from_slice(metadata_bytes)?;

        let image_length = read_u32_field(bytes, pos, limits.max_crop_bytes)?;
        pos += LEN_FIELD;
        let image = take_bytes(bytes, pos, image_length)?.to_vec();
        pos += image_length;

        crops.push(CropRecord { metadata, image });
    }

    Ok(Frame { frame_sequence, timestamp_ms, crops })
}

fn read_u32_field(bytes: &[u8], pos: usize, max: u64) -> Result<usize, FrameError> {
    if pos + LEN_FIELD > bytes.len() {
        return Err(FrameError::Truncated { needed: pos + LEN_FIELD, available: bytes.len() });
    }
    let len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);
    if u64::from(len) > max {
        return Err(FrameError::OversizeCrop { len: u64::from(len), max });
    }
    Ok(len as usize)
}

fn take_bytes(bytes: &[u8], pos: usize, len: usize) -> Result<&[u8], FrameError> {
    if pos + len > bytes.len() {
        return Err(FrameError::Truncated { needed: pos + len, available: bytes.len() });
    }
    Ok(&bytes[pos..pos + len])
}

/// Encode a frame back to wire bytes. The inverse of [`decode_frame`]:
/// `decode_frame(&encode_frame(&f)).unwrap() == f` for any `f` whose crop
/// metadata and image sizes stay within [`FrameLimits::default`].
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(&frame.frame_sequence.to_be_bytes());
    out.extend_from_slice(&frame.timestamp_ms.to_be_bytes());

    for crop in &frame.crops {
        let metadata_bytes = serde_json::to_vec(&crop.metadata).expect("Value always serializes");
        out.extend_from_slice(&(metadata_bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&metadata_bytes);
        out.extend_from_slice(&(crop.image.len() as u32).to_be_bytes());
        out.extend_from_slice(&crop.image);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_frame() -> Frame {
        Frame {
            frame_sequence: 42,
            timestamp_ms: 1_700_000_000,
            crops: vec![CropRecord {
                metadata: json!({"roi": {"x": 1, "y": 2, "width": 3, "height": 4, "label": "qr", "confidence": 0.9}}),
                image: vec![0xFF, 0xD8, 0xFF, 0xD9],
            }],
        }
    }

    #[test]
    fn round_trips_through_encode_decode() {
        let frame = sample_frame();
        let bytes = encode_frame(&frame);
        let decoded = decode_frame(&bytes).expect("decode");
        assert_eq!(decoded, frame);
    }

    #[test]
    fn empty_payload_is_malformed() {
        let err = decode_frame(&[]).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { .. }));
    }

    #[test]
    fn frame_with_zero_crops_decodes() {
        let frame = Frame { frame_sequence: 7, timestamp_ms: 123, crops: vec![] };
        let bytes = encode_frame(&frame);
        assert_eq!(decode_frame(&bytes).unwrap(), frame);
    }

    #[test]
    fn length_equal_to_remainder_is_accepted() {
        let frame = sample_frame();
        let bytes = encode_frame(&frame);
        // Sanity: the bytes as produced decode cleanly (length fields exactly
        // match what follows, with nothing left over).
        assert!(decode_frame(&bytes).is_ok());
    }

    #[test]
    fn length_one_byte_too_large_is_malformed() {
        let frame = sample_frame();
        let mut bytes = encode_frame(&frame);
        // Bump the metadata_length field (bytes[6..10]) by one.
        let inflated = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) + 1;
        bytes[6..10].copy_from_slice(&inflated.to_be_bytes());
        let err = decode_frame(&bytes).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { .. }));
    }

    #[test]
    fn invalid_json_metadata_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        let bad_json = b"{not json";
        bytes.extend_from_slice(&(bad_json.len() as u32).to_be_bytes());
        bytes.extend_from_slice(bad_json);
        bytes.extend_from_slice(&0u32.to_be_bytes());
        let err = decode_frame(&bytes).unwrap_err();
        assert!(matches!(err, FrameError::InvalidMetadata(_)));
    }

    #[test]
    fn oversize_crop_is_rejected_before_allocating() {
        let limits = FrameLimits { max_frame_bytes: FrameLimits::DEFAULT_MAX_FRAME_BYTES, max_crop_bytes: 10 };
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&1_000_000u32.to_be_bytes());
        let err = decode_frame_with_limits(&bytes, limits).unwrap_err();
        assert!(matches!(err, FrameError::OversizeCrop { .. }));
        assert!(err.is_oversize());
    }
}
