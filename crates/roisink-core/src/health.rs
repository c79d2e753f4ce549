//! The stats/health thread (C9 + the merged `tcp_health_check_loop` from
//! `original_source`, per SPEC_FULL §6): periodically logs a snapshot.
//! Sleeps in 1s ticks rather than one long `stats_interval_sec` sleep so
//! shutdown is still observed promptly — the same "no unbounded blocking
//! call" discipline spec.md §9 asks for everywhere else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::stats::SinkStats;

const TICK: Duration = Duration::from_secs(1);

pub fn spawn_stats_thread(stats: Arc<SinkStats>, stats_interval: Duration, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::Builder::new()
        .name("roisink-stats".into())
        .spawn(move || {
            let mut since_last_snapshot = Duration::ZERO;
            while !shutdown.load(Ordering::Relaxed) {
                thread::sleep(TICK);
                since_last_snapshot += TICK;
                if since_last_snapshot >= stats_interval {
                    since_last_snapshot = Duration::ZERO;
                    log_snapshot(&stats);
                }
            }
        })
        .expect("failed to spawn stats thread")
}

fn log_snapshot(stats: &SinkStats) {
    let snapshot = stats.snapshot();
    tracing::info!(
        received_crops = snapshot.received_crops,
        total_bytes = snapshot.total_bytes,
        lost_frames = snapshot.lost_frames,
        duplicate_frames = snapshot.duplicate_frames,
        decode_attempts = snapshot.decode_attempts,
        decode_successes = snapshot.decode_successes,
        decode_items_total = snapshot.decode_items_total,
        decode_drops = snapshot.decode_drops,
        malformed_frames = snapshot.malformed_frames,
        tcp_connected = snapshot.tcp_connected,
        mean_frame_interval_ms = snapshot.mean_frame_interval_ms,
        "sink stats snapshot"
    );
}
