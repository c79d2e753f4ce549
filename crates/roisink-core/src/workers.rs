//! Decoder pool scheduling (C6): `thread_count` long-lived workers, each
//! with its own thread-affine `RxingDecoder`, served by the shared
//! drop-oldest job queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use roisink_decode::{RxingDecoder, Symbology};
use roisink_journal::JournalWriter;
use roisink_proto::MetadataExt;
use roisink_ring::{Decoded, JobQueue, SlotRing};

use crate::stats::SinkStats;

/// Decoder workers re-check shutdown every time a queue pop times out
/// (spec.md §5: bounded wait ≤ 200ms).
const WORKER_POLL_TIMEOUT: Duration = Duration::from_millis(200);

pub struct WorkerPoolConfig {
    pub thread_count: usize,
    pub decode_timeout_ms: u64,
    pub symbologies: Vec<Symbology>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { thread_count: 8, decode_timeout_ms: 10_000, symbologies: Symbology::ALL.to_vec() }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_workers(
    config: &WorkerPoolConfig,
    queue: Arc<JobQueue>,
    ring: Arc<SlotRing>,
    journal: Arc<JournalWriter>,
    stats: Arc<SinkStats>,
    shutdown: Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    let decode_timeout = Duration::from_millis(config.decode_timeout_ms);
    (0..config.thread_count)
        .map(|worker_id| {
            let queue = Arc::clone(&queue);
            let ring = Arc::clone(&ring);
            let journal = Arc::clone(&journal);
            let stats = Arc::clone(&stats);
            let symbologies = config.symbologies.clone();
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name(format!("roisink-decode-{worker_id}"))
                .spawn(move || worker_loop(worker_id, &queue, &ring, &journal, &stats, &symbologies, &shutdown, decode_timeout))
                .expect("failed to spawn decoder worker thread")
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    worker_id: usize,
    queue: &JobQueue,
    ring: &SlotRing,
    journal: &JournalWriter,
    stats: &SinkStats,
    symbologies: &[Symbology],
    shutdown: &AtomicBool,
    decode_timeout: Duration,
) {
    let mut decoder = RxingDecoder::new(symbologies);

    while !shutdown.load(Ordering::Relaxed) {
        let Some(job) = queue.pop_timeout(WORKER_POLL_TIMEOUT) else {
            continue;
        };

        let t0 = Instant::now();
        let outcome = decoder.decode(&job.image_bytes);
        let elapsed = t0.elapsed();

        if elapsed > decode_timeout {
            tracing::debug!(worker_id, recv_seq = job.recv_seq, ?elapsed, "decode exceeded budget, discarding");
            continue;
        }
        stats.record_decode_attempt(elapsed);

        let items = match outcome {
            Ok(items) => items,
            Err(err) => {
                tracing::debug!(worker_id, recv_seq = job.recv_seq, %err, "decode failed, discarding job");
                continue;
            }
        };
        if items.is_empty() {
            continue;
        }
        stats.record_decode_success(items.len());

        let slot = ring.read(job.slot_index);
        let position = slot.as_ref().and_then(|s| s.metadata.pose()).map(|pose| pose.position);
        let slot_status = slot.as_ref().filter(|s| s.recv_seq == job.recv_seq).map(|_| job.slot_index);

        if let Err(err) = journal.append_items(job.recv_seq, worker_id, slot_status, position, &items) {
            tracing::warn!(%err, "journal append failed");
        }

        let decoded = Decoded { elapsed_ms: elapsed.as_secs_f32() * 1000.0, items };
        ring.publish_decoded(job.slot_index, job.recv_seq, decoded);
    }
}
