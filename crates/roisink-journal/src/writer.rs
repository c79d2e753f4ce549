//! Append-only journal writer (spec.md §4.7). `global_seq` allocation and
//! the file handle share one mutex so that allocation order and
//! write-to-disk order always agree (I2), exactly as spec.md mandates.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::JournalError;
use crate::row::format_row;
use roisink_ring::DecodedItem;

struct WriterState {
    global_seq: u64,
    file: File,
}

pub struct JournalWriter {
    path: PathBuf,
    state: Mutex<WriterState>,
}

impl JournalWriter {
    /// Open a fresh journal file under `base_dir`, named with the current
    /// local time. The journal never rotates during a run — one file per
    /// process lifetime.
    pub fn create(base_dir: &Path) -> Result<Self, JournalError> {
        fs::create_dir_all(base_dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = base_dir.join(format!("dbr_multithread_result_{stamp}.log"));

        let mut file = File::create(&path)?;
        writeln!(file, "# global_seq, recv_seq, worker_id, slot_status, position, format, text")?;
        file.flush()?;

        Ok(Self { path, state: Mutex::new(WriterState { global_seq: 0, file }) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per decoded item, sharing `recv_seq` and `worker_id`
    /// across the whole job. Returns the `global_seq` allocated to each
    /// row, in the same order as `items`. An empty `items` slice is a
    /// no-op (spec.md §4.6 step 6: zero items decoded is discarded before
    /// reaching the journal).
    pub fn append_items(
        &self,
        recv_seq: u64,
        worker_id: usize,
        slot_status: Option<usize>,
        position: Option<[f64; 3]>,
        items: &[DecodedItem],
    ) -> Result<Vec<u64>, JournalError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.state.lock().unwrap();
        let mut allocated = Vec::with_capacity(items.len());

        for item in items {
            state.global_seq += 1;
            let global_seq = state.global_seq;
            let line = format_row(global_seq, recv_seq, worker_id, slot_status, position, &item.format, &item.text);
            state.file.write_all(line.as_bytes())?;
            allocated.push(global_seq);
        }

        state.file.flush()?;
        Ok(allocated)
    }
}
