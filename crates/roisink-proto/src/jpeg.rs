//! Stand-alone JPEG decode (spec.md §4.1's second C1 operation).
//!
//! `jpeg_decode` is used only by the viewer, to turn a crop's raw bytes
//! into pixels for display — the decoder pool (C6) never calls it; it
//! hands the same raw JPEG bytes straight to its own symbology reader,
//! which does its own internal decode. Kept here rather than in
//! `roisink-decode` because it's a framing-layer concern (turning wire
//! bytes into a displayable image), not a barcode-recognition one.

use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JpegDecodeError {
    #[error("jpeg payload could not be decoded: {0}")]
    Invalid(String),
}

/// Decode a crop's JPEG bytes into pixels, for display.
pub fn jpeg_decode(bytes: &[u8]) -> Result<DynamicImage, JpegDecodeError> {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
        .map_err(|source| JpegDecodeError::Invalid(source.to_string()))
}
