use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{IntersectionSample, Target};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotal {
    pub visible_time_milli: u64,
    pub last_sample: Option<IntersectionSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotalSample {
    pub target: Target,
    pub running_total: RunningTotal,
}

/// Per-target totals as of one aggregator tick. Published whole, never patched.
pub type RunningTotalSnapshot = BTreeMap<String, RunningTotalSample>;
