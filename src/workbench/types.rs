use serde::{Deserialize, Serialize};

use crate::models::{IntersectionSample, RunningTotalSample, Target};

const MILLISECOND_TO_SECOND: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchRunningTotal {
    pub read_time_second: u64,
    pub visible_time_milli: u64,
    pub last_sample: Option<IntersectionSample>,
}

/// A running total as the workbench displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchSample {
    pub target: Target,
    pub running_total: WorkbenchRunningTotal,
}

impl WorkbenchSample {
    /// Ranking and binning score.
    pub fn score(&self) -> u64 {
        self.running_total.visible_time_milli
    }
}

impl From<&RunningTotalSample> for WorkbenchSample {
    fn from(sample: &RunningTotalSample) -> Self {
        let visible_time_milli = sample.running_total.visible_time_milli;
        Self {
            target: sample.target.clone(),
            running_total: WorkbenchRunningTotal {
                read_time_second: (visible_time_milli as f64 / MILLISECOND_TO_SECOND).round()
                    as u64,
                visible_time_milli,
                last_sample: sample.running_total.last_sample,
            },
        }
    }
}

/// A workbench sample with its competition rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedSample {
    pub target_id: String,
    pub sample: WorkbenchSample,
    pub rank: u32,
}

impl KeyedSample {
    pub fn score(&self) -> u64 {
        self.sample.score()
    }
}

/// Renders a read time as whole seconds or as minutes with one decimal.
pub fn format_read_time(read_time_second: u64, show_minute: bool) -> String {
    if show_minute {
        format!("{:.1}m", read_time_second as f64 / 60.0)
    } else {
        format!("{read_time_second}s")
    }
}
