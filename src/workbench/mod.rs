pub mod partition;
pub mod percentile;
pub mod rank_change;
pub mod ranking;
pub mod types;

pub use partition::{
    assign_bins, partition, PartitionOptions, Partitioned, PercentileBin,
    DEFAULT_PERCENTILE_RANKS, DEFAULT_TOP_COUNT,
};
pub use percentile::{
    bounded_ranks, percentile, percentile_scores, BoundedPercentileRank, Percentile,
    PercentileRankStyle,
};
pub use rank_change::{RankChange, RankTracker};
pub use ranking::{assign_ranks, rank};
pub use types::{format_read_time, KeyedSample, WorkbenchRunningTotal, WorkbenchSample};
