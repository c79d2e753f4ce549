//! `JobQueue`: the bounded, drop-oldest FIFO between the receiver and the
//! decoder pool (§9 design note: "implement as a single bounded channel
//! with an explicit try-send-else-pop-then-send path on the producer
//! side"). A generic channel crate has no dropping policy built in, so
//! this is hand-rolled over `Mutex<VecDeque>` + `Condvar`, the same shape
//! the teacher reaches for when a capability needs an explicit eviction
//! rule rather than backpressure.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use std::sync::Arc;

/// `(recv_seq, jpeg_bytes, slot_index)`, queued for a decoder worker.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub recv_seq: u64,
    pub image_bytes: Arc<[u8]>,
    pub slot_index: usize,
}

/// The legacy and current job-queue capacity coincide at 200 (spec.md §3);
/// unlike the ring, there's only one value here.
pub const DEFAULT_CAPACITY: usize = 200;

pub struct JobQueue {
    capacity: usize,
    inner: Mutex<VecDeque<DecodeJob>>,
    not_empty: Condvar,
    dropped: AtomicU64,
}

impl JobQueue {
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            dropped: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueue a job. When the queue is already at capacity, the oldest
    /// pending job is discarded first (I5) and the drop counter is
    /// incremented; the receiver thread never blocks here. Returns `true`
    /// if a job had to be dropped to make room.
    pub fn enqueue(&self, job: DecodeJob) -> bool {
        let mut guard = self.inner.lock().unwrap();
        let dropped = guard.len() >= self.capacity;
        if dropped {
            guard.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(job);
        self.not_empty.notify_one();
        dropped
    }

    /// Block for up to `timeout` waiting for a job, re-checking the
    /// predicate on spurious wakeups. Returns `None` on timeout so the
    /// caller can recheck its shutdown flag (§5 suspension-boundary rule).
    pub fn pop_timeout(&self, timeout: Duration) -> Option<DecodeJob> {
        let guard = self.inner.lock().unwrap();
        let (mut guard, _timed_out) =
            self.not_empty.wait_timeout_while(guard, timeout, VecDeque::is_empty).unwrap();
        guard.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(recv_seq: u64) -> DecodeJob {
        DecodeJob { recv_seq, image_bytes: Arc::from(&b"x"[..]), slot_index: 0 }
    }

    #[test]
    fn never_exceeds_capacity_and_drops_oldest() {
        let queue = JobQueue::new(4);
        for recv_seq in 1..=10 {
            queue.enqueue(job(recv_seq));
            assert!(queue.len() <= 4);
        }
        assert_eq!(queue.dropped_count(), 6);
        // The surviving jobs are the 4 most recently enqueued.
        let remaining: Vec<u64> =
            std::iter::from_fn(|| queue.pop_timeout(Duration::from_millis(1)).map(|j| j.recv_seq)).collect();
        assert_eq!(remaining, vec![7, 8, 9, 10]);
    }

    #[test]
    fn pop_timeout_returns_none_when_empty() {
        let queue = JobQueue::new(4);
        assert!(queue.pop_timeout(Duration::from_millis(5)).is_none());
    }

    #[test]
    fn fifo_order_preserved_under_capacity() {
        let queue = JobQueue::new(4);
        queue.enqueue(job(1));
        queue.enqueue(job(2));
        assert_eq!(queue.pop_timeout(Duration::from_millis(1)).unwrap().recv_seq, 1);
        assert_eq!(queue.pop_timeout(Duration::from_millis(1)).unwrap().recv_seq, 2);
    }
}
