//! The concurrent heart of the sink: the ring of crop slots (C2/C8) and the
//! bounded decoder job queue (C6's intake side).

mod queue;
mod ring;
mod slot;

pub use queue::{DecodeJob, JobQueue, DEFAULT_CAPACITY};
pub use ring::{SlotRing, DEFAULT_SLOT_NUM, LEGACY_SLOT_NUM};
pub use slot::{Decoded, DecodedItem, Slot};
