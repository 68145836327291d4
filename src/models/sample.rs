use serde::{Deserialize, Serialize};

/// Vertical extent of a target's bounding box when a sample was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectSnapshot {
    pub top: f64,
    pub bottom: f64,
}

/// One observed crossing of a target into or out of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionSample {
    /// Wall-clock epoch milliseconds.
    pub timestamp_milli: i64,
    pub is_intersecting: bool,
    pub rect: RectSnapshot,
}

impl IntersectionSample {
    pub fn new(timestamp_milli: i64, is_intersecting: bool, rect: RectSnapshot) -> Self {
        Self {
            timestamp_milli,
            is_intersecting,
            rect,
        }
    }
}
