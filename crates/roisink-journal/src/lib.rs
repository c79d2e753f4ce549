//! The append-only result journal (C7): a writer with monotonic
//! `global_seq` under a single mutex, and a reader that recovers rows
//! using the right-split policy needed for a `text` field that may
//! itself contain commas.

mod error;
mod reader;
mod row;
mod writer;

pub use error::JournalError;
pub use reader::JournalReader;
pub use row::{parse_row, JournalRow};
pub use writer::JournalWriter;
