use serde_json::Value;
use std::sync::Arc;

/// One decoded barcode/QR symbol, as produced by a decoder worker.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedItem {
    pub format: String,
    pub text: String,
    pub confidence: Option<f64>,
}

/// A worker's completed decode, attached to a slot via write-back.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub elapsed_ms: f32,
    pub items: Vec<DecodedItem>,
}

/// One element of the ring: a received crop plus (once decoded) its
/// recognition results.
///
/// `recv_seq` doubles as the identity tag used by [`crate::SlotRing::publish_decoded`]
/// to detect that a slot has been overwritten by a newer crop since a
/// worker picked up its job.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub metadata: Value,
    pub image_bytes: Arc<[u8]>,
    pub recv_seq: u64,
    pub frame_sequence: u16,
    pub slot_index: usize,
    pub decoded: Option<Decoded>,
}

impl Slot {
    /// Construct a freshly-received slot with no decode result yet.
    /// `slot_index` is filled in by [`crate::SlotRing::write`]; `0` here is a
    /// placeholder.
    #[must_use]
    pub fn new(metadata: Value, image_bytes: Arc<[u8]>, recv_seq: u64, frame_sequence: u16) -> Self {
        Self { metadata, image_bytes, recv_seq, frame_sequence, slot_index: 0, decoded: None }
    }
}
