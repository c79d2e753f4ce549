//! Receiver loop (C4): subscribe, deframe, loss-check, ACK, write slots,
//! enqueue decode jobs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use roisink_proto::decode_frame;
use roisink_ring::{DecodeJob, JobQueue, Slot, SlotRing};

use crate::ack::AckEmitter;
use crate::loss::LossDetector;
use crate::stats::SinkStats;
use crate::transport::{FrameSink, FrameSource};

/// Bounded so the shutdown flag is rechecked periodically even with no
/// traffic (spec.md §5: receiver blocks on subscribe with timeout ≤ 3s).
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// Spawn the receiver thread. `queue` is `None` when `--dbr` was not
/// passed: the ring still fills, but nothing is ever enqueued for
/// decoding (spec.md §6).
pub fn spawn_receiver<Source, Sink>(
    source: Source,
    ack: Arc<AckEmitter<Sink>>,
    ring: Arc<SlotRing>,
    queue: Option<Arc<JobQueue>>,
    stats: Arc<SinkStats>,
    recv_seq_counter: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()>
where
    Source: FrameSource + 'static,
    Sink: FrameSink + 'static,
{
    thread::Builder::new()
        .name("roisink-receiver".into())
        .spawn(move || receiver_loop(&source, &ack, &ring, queue.as_deref(), &stats, &recv_seq_counter, &shutdown))
        .expect("failed to spawn receiver thread")
}

fn receiver_loop<Source, Sink>(
    source: &Source,
    ack: &AckEmitter<Sink>,
    ring: &SlotRing,
    queue: Option<&JobQueue>,
    stats: &SinkStats,
    recv_seq_counter: &AtomicU64,
    shutdown: &AtomicBool,
) where
    Source: FrameSource,
    Sink: FrameSink,
{
    let mut loss_detector = LossDetector::new();

    while !shutdown.load(Ordering::Relaxed) {
        let bytes = match source.recv_timeout(RECV_TIMEOUT) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(%err, "receive error, retrying shortly");
                thread::sleep(Duration::from_millis(100));
                continue;
            }
        };

        let frame = match decode_frame(&bytes) {
            Ok(frame) => frame,
            Err(err) => {
                stats.record_malformed_frame();
                tracing::debug!(%err, oversize = err.is_oversize(), "discarding malformed frame");
                continue;
            }
        };

        let report = loss_detector.observe(frame.frame_sequence);
        stats.record_loss(report.lost);
        if report.duplicate {
            stats.record_duplicate();
        }

        // ACK precedes enqueueing this frame's crops (I6).
        ack.emit(frame.frame_sequence, frame.timestamp_ms);

        for crop in frame.crops {
            let recv_seq = recv_seq_counter.fetch_add(1, Ordering::Relaxed) + 1;
            stats.record_received_crop(crop.image.len());

            let slot = Slot::new(crop.metadata, Arc::from(crop.image.into_boxed_slice()), recv_seq, frame.frame_sequence);
            let image_bytes = Arc::clone(&slot.image_bytes);
            let slot_index = ring.write(slot);

            if let Some(queue) = queue {
                if queue.enqueue(DecodeJob { recv_seq, image_bytes, slot_index }) {
                    stats.record_decode_drop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fakes::{RecordingSink, ScriptedSource};
    use roisink_proto::{encode_frame, CropRecord, Frame};
    use serde_json::json;
    use std::sync::atomic::AtomicBool;

    fn encoded(frame_sequence: u16, timestamp_ms: u32, crops: Vec<CropRecord>) -> Vec<u8> {
        encode_frame(&Frame { frame_sequence, timestamp_ms, crops })
    }

    #[test]
    fn header_only_frame_acks_but_writes_nothing() {
        let source = ScriptedSource::new(vec![encoded(1, 1234, vec![])]);
        let ack = Arc::new(AckEmitter::new(RecordingSink::default()));
        let ring = Arc::new(SlotRing::new(4));
        let stats = Arc::new(SinkStats::new());
        let recv_seq_counter = Arc::new(AtomicU64::new(0));
        let shutdown = Arc::new(AtomicBool::new(false));

        // Run exactly one iteration worth of work by driving the loop body
        // directly: the scripted source returns one frame then `None`
        // forever, so spin until `latest_index` would have changed or a
        // short bound is hit.
        let mut loss_detector = LossDetector::new();
        let bytes = source.recv_timeout(RECV_TIMEOUT).unwrap().unwrap();
        let frame = decode_frame(&bytes).unwrap();
        let report = loss_detector.observe(frame.frame_sequence);
        stats.record_loss(report.lost);
        ack.emit(frame.frame_sequence, frame.timestamp_ms);
        assert!(frame.crops.is_empty());

        assert_eq!(ring.latest_index(), None);
        assert_eq!(ack.sink().sent.lock().unwrap()[0], vec![0x00, 0x01, 0x00, 0x00, 0x04, 0xD2]);
        let _ = (recv_seq_counter, shutdown);
    }

    #[test]
    fn single_crop_populates_slot_zero_with_recv_seq_one() {
        let crop = CropRecord {
            metadata: json!({"roi": {"x": 0, "y": 0, "width": 0, "height": 0, "label": "x", "confidence": 1.0}}),
            image: vec![0xFF, 0xD8, 0xFF, 0xD9],
        };
        let ring = Arc::new(SlotRing::new(4));
        let recv_seq_counter = Arc::new(AtomicU64::new(0));
        let stats = Arc::new(SinkStats::new());
        let queue = Arc::new(JobQueue::new(4));

        let bytes = encoded(1, 1234, vec![crop.clone()]);
        let frame = decode_frame(&bytes).unwrap();

        for crop in frame.crops {
            let recv_seq = recv_seq_counter.fetch_add(1, Ordering::Relaxed) + 1;
            stats.record_received_crop(crop.image.len());
            let slot = Slot::new(crop.metadata, Arc::from(crop.image.into_boxed_slice()), recv_seq, frame.frame_sequence);
            let image_bytes = Arc::clone(&slot.image_bytes);
            let index = ring.write(slot);
            queue.enqueue(DecodeJob { recv_seq, image_bytes, slot_index: index });
        }

        let slot = ring.read(0).unwrap();
        assert_eq!(slot.recv_seq, 1);
        assert_eq!(queue.len(), 1);
    }
}
