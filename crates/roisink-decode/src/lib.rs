//! The decoder pool's backend: symbology configuration, the simulated
//! license gate, and the `rxing`-backed decode call itself. The pool
//! scheduling (workers, queue, timeout enforcement) lives in
//! `roisink-core::workers`, which treats this crate as a leaf dependency.

mod decode;
mod error;
mod license;
mod symbology;

pub use decode::RxingDecoder;
pub use error::{DecodeError, LicenseError};
pub use license::{install_license, LicenseKey};
pub use symbology::Symbology;
