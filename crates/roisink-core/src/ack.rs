//! ACK emitter (C3): fire-and-forget, 6 bytes per received frame header.

use crate::transport::FrameSink;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct AckEmitter<S: FrameSink> {
    sink: S,
    failures: AtomicU64,
}

impl<S: FrameSink> AckEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, failures: AtomicU64::new(0) }
    }

    /// Emit the 6-byte ACK payload for `frame_sequence`/`timestamp_ms`.
    /// Never propagates a send failure — it's counted and logged at
    /// `warn`, and the receive path carries on (spec.md §4.3).
    pub fn emit(&self, frame_sequence: u16, timestamp_ms: u32) {
        let mut payload = [0u8; 6];
        payload[0..2].copy_from_slice(&frame_sequence.to_be_bytes());
        payload[2..6].copy_from_slice(&timestamp_ms.to_be_bytes());

        if let Err(err) = self.sink.send(&payload) {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(%err, frame_sequence, "ack send failed");
        }
    }

    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
