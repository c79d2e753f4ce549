//! Statistics & health (C9): plain atomic counters plus a rolling window
//! of frame-arrival intervals.
//!
//! Every counter here is `Ordering::Relaxed`. That's correct, not lazy:
//! each field is an independent running total with no cross-field
//! invariant a reader depends on ("if `decode_successes` is N, then
//! `decode_attempts` must already be M" isn't something any caller
//! relies on atomically) — callers only ever want the current value of
//! one counter at a time, the same reasoning the teacher's
//! `CollectorMetrics` documents for its own counters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const FRAME_INTERVAL_WINDOW: usize = 1000;
const TCP_CONNECTED_WINDOW_MS: u64 = 30_000;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// A point-in-time snapshot of [`SinkStats`], returned by `snapshot_stats`
/// (C10). `success_rate` is deliberately absent (spec.md §9: its
/// definition in the source is ambiguous; callers that want it compute
/// their own from `decode_successes`/`decode_attempts`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub received_crops: u64,
    pub total_bytes: u64,
    pub lost_frames: u64,
    pub duplicate_frames: u64,
    pub decode_attempts: u64,
    pub decode_successes: u64,
    pub decode_items_total: u64,
    pub decode_total_time_ms: u64,
    pub decode_drops: u64,
    pub malformed_frames: u64,
    pub tcp_connected: bool,
    pub mean_frame_interval_ms: Option<f64>,
}

pub struct SinkStats {
    received_crops: AtomicU64,
    total_bytes: AtomicU64,
    lost_frames: AtomicU64,
    duplicate_frames: AtomicU64,
    decode_attempts: AtomicU64,
    decode_successes: AtomicU64,
    decode_items_total: AtomicU64,
    decode_total_time_ms: AtomicU64,
    decode_drops: AtomicU64,
    malformed_frames: AtomicU64,
    last_receive_epoch_ms: AtomicU64,
    last_frame_epoch_ms: AtomicU64,
    frame_intervals: Mutex<VecDeque<f64>>,
}

impl Default for SinkStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            received_crops: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            lost_frames: AtomicU64::new(0),
            duplicate_frames: AtomicU64::new(0),
            decode_attempts: AtomicU64::new(0),
            decode_successes: AtomicU64::new(0),
            decode_items_total: AtomicU64::new(0),
            decode_total_time_ms: AtomicU64::new(0),
            decode_drops: AtomicU64::new(0),
            malformed_frames: AtomicU64::new(0),
            last_receive_epoch_ms: AtomicU64::new(0),
            last_frame_epoch_ms: AtomicU64::new(0),
            frame_intervals: Mutex::new(VecDeque::with_capacity(FRAME_INTERVAL_WINDOW)),
        }
    }

    pub fn record_received_crop(&self, bytes: usize) {
        self.received_crops.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(bytes as u64, Ordering::Relaxed);

        let now = now_ms();
        self.last_receive_epoch_ms.store(now, Ordering::Relaxed);
        let prev = self.last_frame_epoch_ms.swap(now, Ordering::Relaxed);
        if prev != 0 {
            let mut intervals = self.frame_intervals.lock().unwrap();
            if intervals.len() == FRAME_INTERVAL_WINDOW {
                intervals.pop_front();
            }
            intervals.push_back(now.saturating_sub(prev) as f64);
        }
    }

    pub fn record_loss(&self, lost: u64) {
        if lost > 0 {
            self.lost_frames.fetch_add(lost, Ordering::Relaxed);
        }
    }

    pub fn record_duplicate(&self) {
        self.duplicate_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_attempt(&self, elapsed: Duration) {
        self.decode_attempts.fetch_add(1, Ordering::Relaxed);
        self.decode_total_time_ms.fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_decode_success(&self, item_count: usize) {
        self.decode_successes.fetch_add(1, Ordering::Relaxed);
        self.decode_items_total.fetch_add(item_count as u64, Ordering::Relaxed);
    }

    pub fn record_decode_drop(&self) {
        self.decode_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// A frame failed to deframe (`MalformedFrame`/`OversizeLength`,
    /// spec.md §4.4 step 3 / §7) and was discarded before reaching the
    /// ring.
    pub fn record_malformed_frame(&self) {
        self.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    /// True iff some crop was received within the last 30s (spec.md §4.9).
    #[must_use]
    pub fn tcp_connected(&self) -> bool {
        let last = self.last_receive_epoch_ms.load(Ordering::Relaxed);
        last != 0 && now_ms().saturating_sub(last) < TCP_CONNECTED_WINDOW_MS
    }

    #[must_use]
    pub fn mean_frame_interval_ms(&self) -> Option<f64> {
        let intervals = self.frame_intervals.lock().unwrap();
        if intervals.is_empty() {
            None
        } else {
            Some(intervals.iter().sum::<f64>() / intervals.len() as f64)
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Stats {
        Stats {
            received_crops: self.received_crops.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            lost_frames: self.lost_frames.load(Ordering::Relaxed),
            duplicate_frames: self.duplicate_frames.load(Ordering::Relaxed),
            decode_attempts: self.decode_attempts.load(Ordering::Relaxed),
            decode_successes: self.decode_successes.load(Ordering::Relaxed),
            decode_items_total: self.decode_items_total.load(Ordering::Relaxed),
            decode_total_time_ms: self.decode_total_time_ms.load(Ordering::Relaxed),
            decode_drops: self.decode_drops.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            tcp_connected: self.tcp_connected(),
            mean_frame_interval_ms: self.mean_frame_interval_ms(),
        }
    }
}
