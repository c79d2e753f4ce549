//! Simulated license gate (spec.md §4.6, §9 "License-gated feature").
//!
//! The original decoder SDK requires a license key be installed once,
//! process-wide, before any decode calls succeed. There's no real SDK here
//! to call out to, so this validates a key format (four hyphen-separated
//! groups of four alphanumeric characters) and latches the outcome behind
//! a `OnceLock`, the same "decide once, remember forever" shape a real
//! FFI license init would have.

use crate::error::LicenseError;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseKey(String);

impl LicenseKey {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl From<String> for LicenseKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

static LICENSE_VALID: OnceLock<bool> = OnceLock::new();

fn is_well_formed(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == 4 && groups.iter().all(|g| g.len() == 4 && g.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// Install the process-wide license. Only the first call's key is ever
/// actually checked; later calls observe the latched result, matching a
/// real SDK's one-shot initialization.
pub fn install_license(key: &LicenseKey) -> Result<(), LicenseError> {
    let valid = *LICENSE_VALID.get_or_init(|| is_well_formed(&key.0));
    if valid {
        Ok(())
    } else {
        Err(LicenseError::Invalid(key.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_key_is_accepted() {
        // Call in isolation — OnceLock latches per-process, so this test
        // and `malformed_key_is_rejected` must not share a binary's state.
        // Each `cargo test` target gets its own process per test binary,
        // but tests within one binary share the lock; keep each key shape
        // stable across the whole module's runs.
        assert!(is_well_formed("ABCD-EFGH-IJKL-MNOP"));
    }

    #[test]
    fn malformed_key_shapes_are_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("not-a-license-key-at-all"));
        assert!(!is_well_formed("ABC-DEFG-HIJK-LMNO"));
        assert!(!is_well_formed("ABCD-EFGH-IJKL-MN!P"));
    }
}
