use std::cmp::Ordering;

use crate::models::RunningTotalSnapshot;

use super::types::{KeyedSample, WorkbenchSample};

/// Descending by score, then ascending by case-insensitive target id. The raw
/// id settles ids that differ only in case.
pub fn compare_descending(a: (&str, u64), b: (&str, u64)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
        .then_with(|| a.0.cmp(b.0))
}

/// Sorts the snapshot and assigns competition ranks. In ascending mode the
/// ranked sequence is only reversed; ranks always come from descending order.
pub fn rank(snapshot: &RunningTotalSnapshot, ascending: bool) -> Vec<KeyedSample> {
    let mut sorted: Vec<(String, WorkbenchSample)> = snapshot
        .iter()
        .map(|(target_id, sample)| (target_id.clone(), WorkbenchSample::from(sample)))
        .collect();
    sorted.sort_by(|a, b| {
        compare_descending((a.0.as_str(), a.1.score()), (b.0.as_str(), b.1.score()))
    });

    let mut ranked = assign_ranks(sorted);
    if ascending {
        ranked.reverse();
    }
    ranked
}

/// Standard competition ranking ("1224") over a descending sequence.
///
/// # Panics
///
/// Panics if `sorted` is not in descending score order.
pub fn assign_ranks(sorted: Vec<(String, WorkbenchSample)>) -> Vec<KeyedSample> {
    let len = sorted.len();
    sorted.into_iter().enumerate().fold(
        Vec::with_capacity(len),
        |mut ranked: Vec<KeyedSample>, (position, (target_id, sample))| {
            let rank = match ranked.last() {
                None => 1,
                Some(previous) => {
                    assert!(
                        previous.score() >= sample.score(),
                        "expected samples sorted in descending order"
                    );
                    if previous.score() == sample.score() {
                        previous.rank
                    } else {
                        position as u32 + 1
                    }
                }
            };
            ranked.push(KeyedSample {
                target_id,
                sample,
                rank,
            });
            ranked
        },
    )
}
