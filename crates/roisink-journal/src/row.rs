//! CSV row shape shared by the writer and the reader.
//!
//! Column order: `global_seq, recv_seq, worker_id, slot_status, position,
//! format, text`. `position` renders as spec §3 mandates, `(x,y,z)` with
//! two decimal digits — the same shape the original writes
//! (`examples/original_source/simple_receiver.py`'s
//! `f"({px},{py},{pz})"`) — so it is *not* comma-free: `parse_row` can't
//! just left-peel six fields. Instead it peels from both ends: `text`
//! (last) and `format` (second-from-last) come off the right first, since
//! `text` is the only column that may contain arbitrary embedded commas;
//! what's left — `global_seq,recv_seq,worker_id,slot_status,position` —
//! then peels its first four comma-free fields off the left, leaving
//! `position` (itself comma-bearing when present) as the remainder.

use crate::error::JournalError;

#[derive(Debug, Clone, PartialEq)]
pub struct JournalRow {
    pub global_seq: u64,
    pub recv_seq: u64,
    pub worker_id: usize,
    pub slot_status: Option<usize>,
    pub position: Option<[f64; 3]>,
    pub format: String,
    pub text: String,
}

pub(crate) fn format_slot_status(slot_status: Option<usize>) -> String {
    match slot_status {
        Some(index) => index.to_string(),
        None => "N/A".to_string(),
    }
}

pub(crate) fn format_position(position: Option<[f64; 3]>) -> String {
    match position {
        Some([x, y, z]) => format!("({x:.2},{y:.2},{z:.2})"),
        None => "NA".to_string(),
    }
}

pub(crate) fn format_row(
    global_seq: u64,
    recv_seq: u64,
    worker_id: usize,
    slot_status: Option<usize>,
    position: Option<[f64; 3]>,
    format: &str,
    text: &str,
) -> String {
    format!(
        "{global_seq},{recv_seq},{worker_id},{slot_status},{position},{format},{text}\n",
        slot_status = format_slot_status(slot_status),
        position = format_position(position),
    )
}

/// Parse one journal line, rejecting comment lines (`#`) by returning
/// `None` at the call site rather than here.
///
/// `text` and `format` are peeled off the right first (`text` is last,
/// `format` second-from-last) — `text` is the only field that may carry
/// arbitrary embedded commas, so the right side must come off before
/// anything is assumed about the left side's comma count. What remains,
/// `global_seq,recv_seq,worker_id,slot_status,position`, then peels its
/// four comma-free fields off the left, leaving `position` — `NA` or a
/// parenthesized `(x,y,z)` that may itself contain commas — as the
/// untouched remainder.
pub fn parse_row(line: &str) -> Result<JournalRow, JournalError> {
    let bad = || JournalError::MalformedRow(line.to_string());

    let mut from_right = line.rsplitn(3, ',');
    let text = from_right.next().ok_or_else(bad)?;
    let format = from_right.next().ok_or_else(bad)?;
    let left = from_right.next().ok_or_else(bad)?;

    let mut from_left = left.splitn(5, ',');
    let global_seq: u64 = from_left.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let recv_seq: u64 = from_left.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let worker_id: usize = from_left.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;

    let slot_status_raw = from_left.next().ok_or_else(bad)?;
    let slot_status = if slot_status_raw == "N/A" { None } else { Some(slot_status_raw.parse().map_err(|_| bad())?) };

    let position_raw = from_left.next().ok_or_else(bad)?;
    let position = parse_position(position_raw)?;

    Ok(JournalRow { global_seq, recv_seq, worker_id, slot_status, position, format: format.to_string(), text: text.to_string() })
}

fn parse_position(raw: &str) -> Result<Option<[f64; 3]>, JournalError> {
    if raw == "NA" {
        return Ok(None);
    }
    let bad = || JournalError::MalformedRow(raw.to_string());
    let inner = raw.strip_prefix('(').and_then(|s| s.strip_suffix(')')).ok_or_else(bad)?;
    let mut parts = inner.split(',');
    let x: f64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let y: f64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let z: f64 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    Ok(Some([x, y, z]))
}
