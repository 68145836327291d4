use std::sync::{Arc, Mutex};

use crate::models::IntersectionSample;
use crate::utils::lock_or_recover;

use super::host::{Observation, ObservationCallback};
use super::store::SampleStore;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Builds the callback for one (target, band) pair. Only real transitions reach
/// the store: the first observation, then every change of state.
pub fn create_on_visibility_change(
    store: Arc<Mutex<SampleStore>>,
    target_id: String,
    band_key: String,
) -> ObservationCallback {
    let mut previous: Option<bool> = None;

    Box::new(move |observation: Observation| {
        if previous == Some(observation.is_intersecting) {
            return;
        }

        let sample = IntersectionSample::new(
            observation.timestamp_milli,
            observation.is_intersecting,
            observation.rect,
        );

        let result = lock_or_recover(&store).append(&target_id, &band_key, sample);
        match result {
            Ok(()) => {
                previous = Some(observation.is_intersecting);
                log_debug!(
                    "{} {} band {} at {}",
                    target_id,
                    if observation.is_intersecting { "entered" } else { "left" },
                    band_key,
                    observation.timestamp_milli
                );
            }
            Err(err) => {
                log_warn!("dropping sample for {} in band {}: {}", target_id, band_key, err);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RectSnapshot, Target, TargetSource};
    use proptest::prelude::*;

    fn observation(at: i64, on: bool) -> Observation {
        Observation {
            timestamp_milli: at,
            is_intersecting: on,
            rect: RectSnapshot { top: 0.0, bottom: 10.0 },
        }
    }

    fn store_with(id: &str) -> Arc<Mutex<SampleStore>> {
        let mut store = SampleStore::new();
        store.register(Target {
            id: id.into(),
            source: TargetSource { href: "h".into() },
            snippet: String::new(),
        });
        Arc::new(Mutex::new(store))
    }

    #[test]
    fn repeated_states_are_not_recorded() {
        let store = store_with("a");
        let mut callback = create_on_visibility_change(store.clone(), "a".into(), "B2".into());

        callback(observation(1, false));
        callback(observation(2, false));
        callback(observation(3, true));
        callback(observation(4, true));
        callback(observation(5, false));

        let guard = store.lock().unwrap();
        let states: Vec<bool> = guard
            .samples("a", "B2")
            .iter()
            .map(|s| s.is_intersecting)
            .collect();
        assert_eq!(states, vec![false, true, false]);
    }

    #[test]
    fn stale_timestamp_is_dropped_and_next_change_still_lands() {
        let store = store_with("a");
        let mut callback = create_on_visibility_change(store.clone(), "a".into(), "B2".into());

        callback(observation(10, true));
        callback(observation(5, false));
        callback(observation(12, false));

        let guard = store.lock().unwrap();
        let timestamps: Vec<i64> = guard
            .samples("a", "B2")
            .iter()
            .map(|s| s.timestamp_milli)
            .collect();
        assert_eq!(timestamps, vec![10, 12]);
    }

    proptest! {
        #[test]
        fn stored_sequence_is_increasing_and_alternating(
            observations in prop::collection::vec((-1_000i64..1_000, any::<bool>()), 0..64)
        ) {
            let store = store_with("a");
            let mut callback = create_on_visibility_change(store.clone(), "a".into(), "B2".into());
            for (at, on) in &observations {
                callback(observation(*at, *on));
            }

            let guard = store.lock().unwrap();
            let samples = guard.samples("a", "B2");
            prop_assert!(samples.len() <= observations.len());
            for pair in samples.windows(2) {
                prop_assert!(pair[0].timestamp_milli < pair[1].timestamp_milli);
                prop_assert_ne!(pair[0].is_intersecting, pair[1].is_intersecting);
            }
            if let Some((at, on)) = observations.first() {
                prop_assert_eq!(samples[0].timestamp_milli, *at);
                prop_assert_eq!(samples[0].is_intersecting, *on);
            }
        }
    }
}
