//! `SlotRing`: a fixed-capacity circular store with one writer (the
//! receiver loop) and many readers (decoder workers doing write-back, the
//! viewer doing reads).
//!
//! Each cell pairs a lock-free `recv_seq` tag with a mutex-guarded slot
//! body. The tag lets [`SlotRing::publish_decoded`] reject a stale job
//! without taking the lock in the common case (the slot has already
//! lapped); the lock itself supplies the happens-before edge the teacher's
//! `Ring<T>` gets from explicit release/acquire fences on raw cells — here
//! the mutex is the release/acquire boundary, which is the safe
//! counterpart of the same discipline. The tag is stored with `Release`
//! after the body is written, and loaded with `Acquire` before a reader
//! trusts it, so a reader that sees the new `recv_seq` is guaranteed to
//! see the new body if it goes on to take the lock.
use crate::slot::{Decoded, Slot};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

struct Cell {
    recv_seq: AtomicU64,
    body: Mutex<Option<Slot>>,
}

impl Cell {
    fn empty() -> Self {
        Self { recv_seq: AtomicU64::new(0), body: Mutex::new(None) }
    }
}

/// The legacy ring capacity, kept only for parity testing against the
/// original fixed-size deployment.
pub const LEGACY_SLOT_NUM: usize = 200;

/// The default ring capacity (§9 design note: adopt a single configurable
/// value, default to the larger of the two capacities the source used).
pub const DEFAULT_SLOT_NUM: usize = 5000;

pub struct SlotRing {
    cells: Vec<Cell>,
    slot_num: usize,
    write_index: AtomicUsize,
    latest_index: AtomicUsize,
    has_latest: AtomicBool,
}

impl SlotRing {
    /// # Panics
    /// Panics if `slot_num` is zero.
    #[must_use]
    pub fn new(slot_num: usize) -> Self {
        assert!(slot_num > 0, "slot_num must be positive");
        let cells = (0..slot_num).map(|_| Cell::empty()).collect();
        Self {
            cells,
            slot_num,
            write_index: AtomicUsize::new(0),
            latest_index: AtomicUsize::new(0),
            has_latest: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn slot_num(&self) -> usize {
        self.slot_num
    }

    /// Write a new slot, claiming the next ring index. Exclusive to the
    /// receiver loop (I3) — callers must not invoke this concurrently from
    /// more than one thread, or `write_index` advancement races.
    pub fn write(&self, mut slot: Slot) -> usize {
        let index = self.write_index.fetch_add(1, Ordering::Relaxed) % self.slot_num;
        slot.slot_index = index;
        let recv_seq = slot.recv_seq;

        {
            let mut body = self.cells[index].body.lock().unwrap();
            *body = Some(slot);
        }
        // Published only after the body is fully stored: a reader that
        // observes this store and then takes the lock sees the new slot.
        self.cells[index].recv_seq.store(recv_seq, Ordering::Release);
        self.latest_index.store(index, Ordering::Release);
        self.has_latest.store(true, Ordering::Release);
        index
    }

    /// Read a snapshot of the slot at `index` (modulo `slot_num`).
    #[must_use]
    pub fn read(&self, index: usize) -> Option<Slot> {
        let index = index % self.slot_num;
        self.cells[index].body.lock().unwrap().clone()
    }

    /// Publish a worker's decode result into slot `slot_index`, iff the
    /// slot still holds `recv_seq` (I4). Returns `true` on success, `false`
    /// if the slot had already lapped — the caller's journal entry remains
    /// the authoritative record of the stale decode either way.
    pub fn publish_decoded(&self, slot_index: usize, recv_seq: u64, decoded: Decoded) -> bool {
        let index = slot_index % self.slot_num;
        let cell = &self.cells[index];

        if cell.recv_seq.load(Ordering::Acquire) != recv_seq {
            return false;
        }

        let mut body = cell.body.lock().unwrap();
        match body.as_mut() {
            Some(slot) if slot.recv_seq == recv_seq => {
                slot.decoded = Some(decoded);
                true
            }
            _ => false,
        }
    }

    /// The most recently written index, or `None` if nothing has been
    /// written yet.
    #[must_use]
    pub fn latest_index(&self) -> Option<usize> {
        if self.has_latest.load(Ordering::Acquire) {
            Some(self.latest_index.load(Ordering::Acquire))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn slot(recv_seq: u64) -> Slot {
        Slot::new(json!({}), Arc::from(&b"jpeg"[..]), recv_seq, 1)
    }

    #[test]
    fn write_then_read_round_trips() {
        let ring = SlotRing::new(4);
        let index = ring.write(slot(1));
        let read = ring.read(index).unwrap();
        assert_eq!(read.recv_seq, 1);
        assert_eq!(read.slot_index, index);
        assert_eq!(ring.latest_index(), Some(index));
    }

    #[test]
    fn read_of_never_written_slot_is_none() {
        let ring = SlotRing::new(4);
        assert!(ring.read(2).is_none());
        assert_eq!(ring.latest_index(), None);
    }

    #[test]
    fn publish_decoded_succeeds_when_recv_seq_matches() {
        let ring = SlotRing::new(4);
        let index = ring.write(slot(7));
        let decoded = Decoded { elapsed_ms: 1.5, items: vec![] };
        assert!(ring.publish_decoded(index, 7, decoded.clone()));
        assert_eq!(ring.read(index).unwrap().decoded, Some(decoded));
    }

    #[test]
    fn publish_decoded_is_dropped_after_lap() {
        let ring = SlotRing::new(4);
        let index = ring.write(slot(7));
        // Lap the ring: overwrite the same index three more times.
        for recv_seq in [8, 9, 10] {
            ring.write(slot(recv_seq));
        }
        let decoded = Decoded { elapsed_ms: 1.5, items: vec![] };
        assert!(!ring.publish_decoded(index, 7, decoded));
        // The slot still reflects the newest writer, untouched by the stale worker.
        assert_eq!(ring.read(index).unwrap().recv_seq, 10);
        assert_eq!(ring.read(index).unwrap().decoded, None);
    }

    #[test]
    fn indexing_wraps_modulo_slot_num() {
        let ring = SlotRing::new(4);
        for recv_seq in 1..=5 {
            ring.write(slot(recv_seq));
        }
        // The 5th write (recv_seq=5) lapped back to index 0.
        assert_eq!(ring.read(0).unwrap().recv_seq, 5);
    }
}
