use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::models::{IntersectionSample, Target};

#[derive(Debug, Error, PartialEq)]
pub enum SampleRejected {
    #[error("target {0} is not registered")]
    UnknownTarget(String),

    #[error("sample at {timestamp_milli} is not after the previous sample at {previous_milli}")]
    NotIncreasing {
        timestamp_milli: i64,
        previous_milli: i64,
    },

    #[error("sample repeats the previous intersecting state ({0})")]
    NotAlternating(bool),
}

#[derive(Debug, Default)]
struct TargetEntry {
    target: Option<Target>,
    bands: HashMap<String, Vec<IntersectionSample>>,
}

/// Per-target, per-band log of intersection transitions for one page view.
#[derive(Debug, Default)]
pub struct SampleStore {
    entries: BTreeMap<String, TargetEntry>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target so it shows up in totals before its first sample.
    pub fn register(&mut self, target: Target) {
        let entry = self.entries.entry(target.id.clone()).or_default();
        entry.target = Some(target);
    }

    /// Appends one transition. Samples that would break timestamp ordering or
    /// state alternation for the (target, band) pair are rejected untouched.
    pub fn append(
        &mut self,
        target_id: &str,
        band_key: &str,
        sample: IntersectionSample,
    ) -> Result<(), SampleRejected> {
        let entry = self
            .entries
            .get_mut(target_id)
            .ok_or_else(|| SampleRejected::UnknownTarget(target_id.to_string()))?;
        let samples = entry.bands.entry(band_key.to_string()).or_default();

        if let Some(previous) = samples.last() {
            if sample.timestamp_milli <= previous.timestamp_milli {
                return Err(SampleRejected::NotIncreasing {
                    timestamp_milli: sample.timestamp_milli,
                    previous_milli: previous.timestamp_milli,
                });
            }
            if sample.is_intersecting == previous.is_intersecting {
                return Err(SampleRejected::NotAlternating(sample.is_intersecting));
            }
        }

        samples.push(sample);
        Ok(())
    }

    pub fn samples(&self, target_id: &str, band_key: &str) -> &[IntersectionSample] {
        self.entries
            .get(target_id)
            .and_then(|entry| entry.bands.get(band_key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.entries.values().filter_map(|entry| entry.target.as_ref())
    }

    pub fn target_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RectSnapshot, TargetSource};

    fn target(id: &str) -> Target {
        Target {
            id: id.to_string(),
            source: TargetSource {
                href: "https://docs/page".into(),
            },
            snippet: format!("snippet {id}"),
        }
    }

    fn sample(at: i64, on: bool) -> IntersectionSample {
        IntersectionSample::new(at, on, RectSnapshot::default())
    }

    #[test]
    fn appends_alternating_samples_in_order() {
        let mut store = SampleStore::new();
        store.register(target("a"));
        store.append("a", "B2", sample(10, true)).unwrap();
        store.append("a", "B2", sample(20, false)).unwrap();
        store.append("a", "B3", sample(15, true)).unwrap();

        let b2 = store.samples("a", "B2");
        assert_eq!(b2.len(), 2);
        assert!(b2[0].is_intersecting && !b2[1].is_intersecting);
        assert_eq!(store.samples("a", "B3").len(), 1);
    }

    #[test]
    fn rejects_out_of_order_and_repeated_states() {
        let mut store = SampleStore::new();
        store.register(target("a"));
        store.append("a", "B2", sample(10, true)).unwrap();

        assert_eq!(
            store.append("a", "B2", sample(10, false)),
            Err(SampleRejected::NotIncreasing {
                timestamp_milli: 10,
                previous_milli: 10
            })
        );
        assert_eq!(
            store.append("a", "B2", sample(11, true)),
            Err(SampleRejected::NotAlternating(true))
        );
        assert_eq!(store.samples("a", "B2").len(), 1);
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut store = SampleStore::new();
        assert_eq!(
            store.append("ghost", "B2", sample(1, true)),
            Err(SampleRejected::UnknownTarget("ghost".into()))
        );
    }

    #[test]
    fn missing_band_reads_as_empty_and_clear_drops_everything() {
        let mut store = SampleStore::new();
        store.register(target("a"));
        assert!(store.samples("a", "B0").is_empty());
        assert!(store.samples("nope", "B0").is_empty());
        assert_eq!(store.targets().count(), 1);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.targets().count(), 0);
    }
}
