use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::percentile::{bounded_ranks, percentile_scores, Percentile, PercentileRankStyle};
use super::types::KeyedSample;

pub const DEFAULT_PERCENTILE_RANKS: [u32; 2] = [50, 75];
pub const DEFAULT_TOP_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionOptions {
    pub ascending: bool,
    pub top_count: usize,
    pub hide_unread: bool,
    pub label_style: PercentileRankStyle,
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            ascending: false,
            top_count: DEFAULT_TOP_COUNT,
            hide_unread: false,
            label_style: PercentileRankStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileBin {
    pub percentile: Percentile,
    pub samples: Vec<KeyedSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partitioned {
    pub percentiles: Vec<Percentile>,
    pub top: Vec<KeyedSample>,
    pub remaining: Vec<KeyedSample>,
    pub bins: Vec<PercentileBin>,
}

/// Splits a ranked sequence (as returned by `rank`) into the header group and
/// the percentile bins.
///
/// The header holds the `top_count` highest-ranked samples: the head of the
/// sequence, or its tail when `ascending`. Percentile boundaries are computed
/// over every score, header included. Bins are visited highest first in
/// descending mode and lowest first in ascending mode.
pub fn partition(
    ranked: &[KeyedSample],
    percentile_ranks: &[u32],
    options: &PartitionOptions,
) -> Partitioned {
    let top_count = options.top_count.min(ranked.len());
    let (top, remaining) = if options.ascending {
        let (remaining, top) = ranked.split_at(ranked.len() - top_count);
        (top, remaining)
    } else {
        ranked.split_at(top_count)
    };

    let mut bounded = bounded_ranks(percentile_ranks);
    if !options.ascending {
        bounded.reverse();
    }

    let values: Vec<f64> = ranked.iter().map(|keyed| keyed.score() as f64).collect();
    let percentiles = percentile_scores(&bounded, &values, options.label_style);
    let min_score = values.iter().copied().reduce(f64::min);
    let bins = assign_bins(remaining, &percentiles, min_score, options.hide_unread);

    Partitioned {
        percentiles,
        top: top.to_vec(),
        remaining: remaining.to_vec(),
        bins,
    }
}

/// Places each sample in the first bin that contains its score. Samples scoring
/// the distribution minimum always land in the lowest bin, since that score
/// sits on the lowest bin's exclusive bound. A target joins at most one bin.
pub fn assign_bins(
    samples: &[KeyedSample],
    percentiles: &[Percentile],
    min_score: Option<f64>,
    hide_unread: bool,
) -> Vec<PercentileBin> {
    let mut seen: HashSet<&str> = HashSet::new();

    percentiles
        .iter()
        .map(|percentile| {
            let mut binned = Vec::new();
            for keyed in samples {
                let score = keyed.score() as f64;
                if seen.contains(keyed.target_id.as_str()) {
                    continue;
                }
                if hide_unread && keyed.score() == 0 {
                    continue;
                }
                let is_min = percentile.is_lowest() && min_score == Some(score);
                if !percentile.contains(score) && !is_min {
                    continue;
                }
                seen.insert(keyed.target_id.as_str());
                binned.push(keyed.clone());
            }
            PercentileBin {
                percentile: percentile.clone(),
                samples: binned,
            }
        })
        .collect()
}
