//! The `rxing`-backed decoder. Each decoder pool worker owns one
//! `RxingDecoder` instance (thread-affine, never shared — spec.md §4.6 and
//! §5's shared-resource policy).

use std::collections::{HashMap, HashSet};

use rxing::common::HybridBinarizer;
use rxing::{BarcodeFormat, BinaryBitmap, BufferedImageLuminanceSource, DecodeHintType, DecodeHintValue, DecodingHintDictionary, MultiFormatReader, Reader};

use crate::error::DecodeError;
use crate::symbology::Symbology;
use roisink_ring::DecodedItem;

pub struct RxingDecoder {
    reader: MultiFormatReader,
    hints: DecodingHintDictionary,
}

impl RxingDecoder {
    #[must_use]
    pub fn new(symbologies: &[Symbology]) -> Self {
        let formats: HashSet<BarcodeFormat> = symbologies.iter().map(|s| s.to_barcode_format()).collect();
        let mut hints: DecodingHintDictionary = HashMap::new();
        hints.insert(DecodeHintType::POSSIBLE_FORMATS, DecodeHintValue::PossibleFormats(formats));
        hints.insert(DecodeHintType::TRY_HARDER, DecodeHintValue::TryHarder(true));
        Self { reader: MultiFormatReader::default(), hints }
    }

    /// Decode a single JPEG crop. An empty `Vec` means the image decoded
    /// fine but no symbol was found — not an error (spec.md §4.6 step 6:
    /// "if zero items decoded: discard silently", handled by the caller).
    pub fn decode(&mut self, jpeg_bytes: &[u8]) -> Result<Vec<DecodedItem>, DecodeError> {
        let image = image::load_from_memory_with_format(jpeg_bytes, image::ImageFormat::Jpeg)
            .map_err(|source| DecodeError::InvalidJpeg(source.to_string()))?;

        let luminance = BufferedImageLuminanceSource::new(image);
        let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(luminance));

        match self.reader.decode_with_hints(&mut bitmap, &self.hints) {
            Ok(result) => Ok(vec![DecodedItem {
                format: format!("{:?}", result.getBarcodeFormat()),
                text: result.getText().to_owned(),
                confidence: None,
            }]),
            Err(rxing::Exceptions::NotFoundException(_)) => Ok(Vec::new()),
            Err(other) => Err(DecodeError::Backend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_an_invalid_jpeg_not_a_panic() {
        let mut decoder = RxingDecoder::new(&Symbology::ALL);
        let err = decoder.decode(b"not a jpeg").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJpeg(_)));
    }
}
