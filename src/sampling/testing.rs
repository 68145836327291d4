//! In-memory host and locator used by sampler and session tests.

use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::bands::RootMargin;
use crate::models::RectSnapshot;

use super::host::{
    AnchorError, ContentLocator, Located, Observation, ObservationCallback, ObservationHandle,
    ObservationHost, ObserveError,
};

#[derive(Debug, Clone)]
pub struct FakeRegion {
    pub key: String,
    pub text: Option<String>,
}

impl FakeRegion {
    pub fn text(key: &str, text: &str) -> Self {
        Self {
            key: key.into(),
            text: Some(text.into()),
        }
    }

    pub fn image(key: &str) -> Self {
        Self {
            key: key.into(),
            text: None,
        }
    }
}

struct Registration {
    id: usize,
    region: String,
    band_index: usize,
    margin: RootMargin,
    callback: ObservationCallback,
}

#[derive(Default)]
struct Registry {
    next_id: usize,
    live: Vec<Registration>,
}

pub struct FakeHost {
    supported: bool,
    observe_limit: Option<usize>,
    viewport_height: f64,
    registry: Arc<Mutex<Registry>>,
}

impl FakeHost {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            supported: true,
            observe_limit: None,
            viewport_height,
            registry: Arc::default(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(800.0)
        }
    }

    /// Reports support, but `observe` fails with `Unsupported` after `limit`
    /// registrations.
    pub fn unsupported_after(viewport_height: f64, limit: usize) -> Self {
        Self {
            observe_limit: Some(limit),
            ..Self::new(viewport_height)
        }
    }

    pub fn live_count(&self) -> usize {
        self.registry.lock().unwrap().live.len()
    }

    pub fn margins_for(&self, region: &str) -> Vec<RootMargin> {
        self.registry
            .lock()
            .unwrap()
            .live
            .iter()
            .filter(|r| r.region == region)
            .map(|r| r.margin)
            .collect()
    }

    /// Delivers an observation to the `band_index`-th registration of `region`.
    /// Returns false when nothing is listening.
    pub fn fire(&self, region: &str, band_index: usize, at: i64, is_intersecting: bool) -> bool {
        let mut registry = self.registry.lock().unwrap();
        let Some(registration) = registry
            .live
            .iter_mut()
            .find(|r| r.region == region && r.band_index == band_index)
        else {
            return false;
        };
        (registration.callback)(Observation {
            timestamp_milli: at,
            is_intersecting,
            rect: RectSnapshot {
                top: 0.0,
                bottom: 20.0,
            },
        });
        true
    }
}

impl ObservationHost for FakeHost {
    type Region = FakeRegion;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn observe(
        &self,
        region: &FakeRegion,
        margin: RootMargin,
        callback: ObservationCallback,
    ) -> Result<ObservationHandle, ObserveError> {
        if !self.supported {
            return Err(ObserveError::Unsupported);
        }
        let mut registry = self.registry.lock().unwrap();
        if self.observe_limit.is_some_and(|limit| registry.next_id >= limit) {
            return Err(ObserveError::Unsupported);
        }
        let id = registry.next_id;
        registry.next_id += 1;
        let band_index = registry
            .live
            .iter()
            .filter(|r| r.region == region.key)
            .count();
        registry.live.push(Registration {
            id,
            region: region.key.clone(),
            band_index,
            margin,
            callback,
        });

        let registry = Arc::clone(&self.registry);
        Ok(ObservationHandle::new(move || {
            registry.lock().unwrap().live.retain(|r| r.id != id);
        }))
    }
}

pub struct FakeLocator;

impl ContentLocator<FakeRegion> for FakeLocator {
    fn locate(&self, region: &FakeRegion) -> Result<Located, AnchorError> {
        let text = region.text.as_ref().ok_or(AnchorError::NonText)?;
        Ok(Located {
            selector: json!({ "region": region.key }),
            snippet: text.clone(),
        })
    }
}
