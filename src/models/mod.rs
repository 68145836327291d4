pub mod running_total;
pub mod sample;
pub mod target;

pub use running_total::{RunningTotal, RunningTotalSample, RunningTotalSnapshot};
pub use sample::{IntersectionSample, RectSnapshot};
pub use target::{target_id, Target, TargetSource};
