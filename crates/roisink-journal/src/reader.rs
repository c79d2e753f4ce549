//! Tailing-friendly reader over a journal file (§9 "append-only log as
//! source of truth" — the viewer tails this, not the ring).

use std::fs;
use std::path::Path;

use crate::error::JournalError;
use crate::row::{parse_row, JournalRow};

pub struct JournalReader;

impl JournalReader {
    /// Read every data row in the file, skipping comment (`#`) and blank
    /// lines. Intended for tests and one-shot tools; a long-running
    /// viewer would instead track a byte offset and only read new
    /// appended bytes, which is out of scope for the core crate.
    pub fn read_rows(path: &Path) -> Result<Vec<JournalRow>, JournalError> {
        let contents = fs::read_to_string(path)?;
        contents.lines().filter(|line| !line.is_empty() && !line.starts_with('#')).map(parse_row).collect()
    }
}
