//! Typed views over the per-crop metadata JSON object.
//!
//! Metadata arrives as a JSON object with a handful of required keys (§3 of
//! the design doc); any other keys present are application-defined and must
//! survive a decode/encode round trip untouched. We therefore keep the raw
//! [`serde_json::Value`] as the source of truth and only parse out the
//! fields callers actually need, on demand.

use serde::Deserialize;

/// One ROI rectangle plus its classifier output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Roi {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub label: String,
    pub confidence: f64,
}

/// The producing camera's identity.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Camera {
    pub id: i64,
}

/// Producer pose at capture time.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Pose {
    pub position: [f64; 3],
}

/// Convenience accessors over the metadata JSON object.
///
/// These never fail the framing step (`decode_frame` only rejects metadata
/// that isn't valid JSON) — a crop missing a required key simply yields
/// `None` from the matching accessor, and callers (journal row formatting,
/// stats) fall back to their own defaults (e.g. `position` prints as `NA`).
pub trait MetadataExt {
    fn roi(&self) -> Option<Roi>;
    fn camera(&self) -> Option<Camera>;
    fn pose(&self) -> Option<Pose>;
    fn yaw_deg(&self) -> Option<f64>;
}

impl MetadataExt for serde_json::Value {
    fn roi(&self) -> Option<Roi> {
        serde_json::from_value(self.get("roi")?.clone()).ok()
    }

    fn camera(&self) -> Option<Camera> {
        serde_json::from_value(self.get("camera")?.clone()).ok()
    }

    fn pose(&self) -> Option<Pose> {
        serde_json::from_value(self.get("pose")?.clone()).ok()
    }

    fn yaw_deg(&self) -> Option<f64> {
        self.get("yaw_deg")?.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_known_fields_and_keeps_extras() {
        let meta = json!({
            "roi": {"x": 1, "y": 2, "width": 10, "height": 20, "label": "qr", "confidence": 0.9},
            "camera": {"id": 3},
            "pose": {"position": [1.0, 2.0, 3.0]},
            "yaw_deg": 12.5,
            "extra_field": "kept"
        });

        assert_eq!(
            meta.roi(),
            Some(Roi { x: 1, y: 2, width: 10, height: 20, label: "qr".into(), confidence: 0.9 })
        );
        assert_eq!(meta.camera(), Some(Camera { id: 3 }));
        assert_eq!(meta.pose(), Some(Pose { position: [1.0, 2.0, 3.0] }));
        assert_eq!(meta.yaw_deg(), Some(12.5));
        assert_eq!(meta.get("extra_field").and_then(|v| v.as_str()), Some("kept"));
    }

    #[test]
    fn missing_keys_yield_none_not_error() {
        let meta = json!({"unrelated": true});
        assert_eq!(meta.roi(), None);
        assert_eq!(meta.camera(), None);
        assert_eq!(meta.pose(), None);
        assert_eq!(meta.yaw_deg(), None);
    }
}
