use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    IntersectionSample, RunningTotal, RunningTotalSample, RunningTotalSnapshot,
};
use crate::sampling::SampleStore;
use crate::visibility::PageVisibility;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AggregatorStatus {
    #[default]
    Stopped,
    Active,
}

/// Accumulated visible time per target plus the instant of the previous tick.
#[derive(Debug, Clone, Default)]
pub struct AggregatorState {
    pub status: AggregatorStatus,
    totals: BTreeMap<String, RunningTotal>,
    last_tick_milli: Option<i64>,
}

impl AggregatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, now_milli: i64) {
        *self = Self {
            status: AggregatorStatus::Active,
            totals: BTreeMap::new(),
            last_tick_milli: Some(now_milli),
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn last_tick(&self) -> Option<i64> {
        self.last_tick_milli
    }

    /// Folds the window since the previous tick into the totals and returns the
    /// resulting snapshot. Every registered target is present, sampled or not.
    pub fn advance(
        &mut self,
        store: &SampleStore,
        page: &PageVisibility,
        active_bands: &[String],
        now_milli: i64,
    ) -> RunningTotalSnapshot {
        let tick_start = self.last_tick_milli.unwrap_or(now_milli).min(now_milli);
        let visible_end = page.visible_until(tick_start, now_milli);

        let mut snapshot = BTreeMap::new();
        for target in store.targets() {
            let running_total = self.totals.entry(target.id.clone()).or_default();
            let per_band: Vec<&[IntersectionSample]> = active_bands
                .iter()
                .map(|band| store.samples(&target.id, band))
                .collect();

            if let Some(visible_end) = visible_end {
                running_total.visible_time_milli = running_total
                    .visible_time_milli
                    .saturating_add(intersecting_milli(&per_band, tick_start, visible_end));
            }
            if let Some(latest) = latest_sample(&per_band) {
                running_total.last_sample = Some(latest);
            }

            snapshot.insert(
                target.id.clone(),
                RunningTotalSample {
                    target: target.clone(),
                    running_total: *running_total,
                },
            );
        }

        self.last_tick_milli = Some(now_milli);
        snapshot
    }
}

/// Milliseconds of `[from, to]` during which at least one band saw the target
/// intersecting. The state at `from` is that of the latest sample at or before
/// it; a band with no such sample counts as not intersecting.
pub fn intersecting_milli(per_band: &[&[IntersectionSample]], from: i64, to: i64) -> u64 {
    if to <= from {
        return 0;
    }

    let mut intervals: Vec<(i64, i64)> = Vec::new();
    for samples in per_band {
        let mut state = samples
            .iter()
            .take_while(|s| s.timestamp_milli <= from)
            .last()
            .map(|s| s.is_intersecting)
            .unwrap_or(false);
        let mut cursor = from;

        for sample in samples
            .iter()
            .skip_while(|s| s.timestamp_milli <= from)
            .take_while(|s| s.timestamp_milli <= to)
        {
            if state {
                intervals.push((cursor, sample.timestamp_milli));
            }
            state = sample.is_intersecting;
            cursor = sample.timestamp_milli;
        }
        if state {
            intervals.push((cursor, to));
        }
    }

    intervals.sort_unstable();
    let mut total = 0i64;
    let mut current: Option<(i64, i64)> = None;
    for (start, end) in intervals {
        current = match current {
            Some((cur_start, cur_end)) if start <= cur_end => Some((cur_start, cur_end.max(end))),
            Some((cur_start, cur_end)) => {
                total += cur_end - cur_start;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((start, end)) = current {
        total += end - start;
    }
    total.max(0) as u64
}

fn latest_sample(per_band: &[&[IntersectionSample]]) -> Option<IntersectionSample> {
    per_band
        .iter()
        .filter_map(|samples| samples.last())
        .max_by_key(|sample| sample.timestamp_milli)
        .copied()
}
