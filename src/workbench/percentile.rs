use serde::{Deserialize, Serialize};

pub const SMALLEST_PERCENTILE_RANK: u32 = 0;
pub const LARGEST_PERCENTILE_RANK: u32 = 100;

/// How percentile bin labels are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentileRankStyle {
    /// `p75`
    P,
    /// `75th`
    #[default]
    Th,
    /// `75th percentile`
    FullLower,
    /// `75th Percentile`
    FullUpper,
}

impl PercentileRankStyle {
    pub fn format(self, rank: u32) -> String {
        match self {
            PercentileRankStyle::P => format!("p{rank}"),
            PercentileRankStyle::Th => format!("{rank}th"),
            PercentileRankStyle::FullLower => format!("{rank}th percentile"),
            PercentileRankStyle::FullUpper => format!("{rank}th Percentile"),
        }
    }
}

/// A pair of consecutive percentile ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedPercentileRank {
    pub lower: u32,
    pub upper: u32,
}

/// One bin over the current score distribution: `(score_lower, score_upper]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentile {
    pub label: String,
    pub rank_lower: u32,
    pub rank_upper: u32,
    pub score_lower: f64,
    pub score_upper: f64,
}

impl Percentile {
    pub fn contains(&self, score: f64) -> bool {
        score > self.score_lower && score <= self.score_upper
    }

    pub fn is_lowest(&self) -> bool {
        self.rank_lower == SMALLEST_PERCENTILE_RANK
    }
}

/// Turns cut ranks into consecutive pairs, always bounded by 0 and 100.
/// Duplicates and ranks above 100 are dropped.
pub fn bounded_ranks(cuts: &[u32]) -> Vec<BoundedPercentileRank> {
    let mut ranks: Vec<u32> = cuts
        .iter()
        .copied()
        .filter(|rank| *rank <= LARGEST_PERCENTILE_RANK)
        .chain([SMALLEST_PERCENTILE_RANK, LARGEST_PERCENTILE_RANK])
        .collect();
    ranks.sort_unstable();
    ranks.dedup();

    ranks
        .windows(2)
        .map(|pair| BoundedPercentileRank {
            lower: pair[0],
            upper: pair[1],
        })
        .collect()
}

/// Linearly interpolated percentile of an ascending slice, `None` when empty.
pub fn percentile(rank: u32, sorted: &[f64]) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = last as f64 * f64::from(rank.min(LARGEST_PERCENTILE_RANK)) / 100.0;
    let below = position.floor() as usize;
    let above = (below + 1).min(last);
    let fraction = position - below as f64;
    Some(sorted[below] + fraction * (sorted[above] - sorted[below]))
}

/// Score boundaries for each bounded rank over `values`. An empty distribution
/// has no bins.
pub fn percentile_scores(
    bounded: &[BoundedPercentileRank],
    values: &[f64],
    style: PercentileRankStyle,
) -> Vec<Percentile> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    bounded
        .iter()
        .filter_map(|bounded_rank| {
            Some(Percentile {
                label: style.format(bounded_rank.upper),
                rank_lower: bounded_rank.lower,
                rank_upper: bounded_rank.upper,
                score_lower: percentile(bounded_rank.lower, &sorted)?,
                score_upper: percentile(bounded_rank.upper, &sorted)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cuts_produce_three_bins() {
        let bounded = bounded_ranks(&[50, 75]);
        assert_eq!(
            bounded,
            vec![
                BoundedPercentileRank { lower: 0, upper: 50 },
                BoundedPercentileRank { lower: 50, upper: 75 },
                BoundedPercentileRank { lower: 75, upper: 100 },
            ]
        );
    }

    #[test]
    fn explicit_bounds_and_duplicates_collapse() {
        let bounded = bounded_ranks(&[100, 50, 0, 50, 120]);
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded_ranks(&[]), vec![BoundedPercentileRank { lower: 0, upper: 100 }]);
    }

    #[test]
    fn interpolates_between_closest_ranks() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(0, &values), Some(10.0));
        assert_eq!(percentile(50, &values), Some(30.0));
        assert_eq!(percentile(75, &values), Some(40.0));
        assert_eq!(percentile(100, &values), Some(50.0));
        assert_eq!(percentile(25, &values), Some(20.0));
        assert_eq!(percentile(50, &[0.0, 10.0]), Some(5.0));
        assert_eq!(percentile(50, &[7.0]), Some(7.0));
        assert_eq!(percentile(50, &[]), None);
    }

    #[test]
    fn scores_follow_label_style() {
        let bounded = bounded_ranks(&[50]);
        let percentiles = percentile_scores(&bounded, &[4.0, 0.0, 2.0], PercentileRankStyle::P);
        assert_eq!(percentiles.len(), 2);
        assert_eq!(percentiles[0].label, "p50");
        assert_eq!((percentiles[0].score_lower, percentiles[0].score_upper), (0.0, 2.0));
        assert_eq!((percentiles[1].score_lower, percentiles[1].score_upper), (2.0, 4.0));
        assert!(percentiles[0].is_lowest());
        assert!(!percentiles[1].contains(2.0));
        assert!(percentiles[1].contains(4.0));
    }

    #[test]
    fn empty_distribution_has_no_bins() {
        assert!(percentile_scores(&bounded_ranks(&[50]), &[], PercentileRankStyle::Th).is_empty());
    }

    #[test]
    fn label_styles() {
        assert_eq!(PercentileRankStyle::Th.format(75), "75th");
        assert_eq!(PercentileRankStyle::FullLower.format(75), "75th percentile");
        assert_eq!(PercentileRankStyle::FullUpper.format(75), "75th Percentile");
    }
}
