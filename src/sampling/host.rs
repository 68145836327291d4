use std::fmt;

use thiserror::Error;

use crate::bands::RootMargin;
use crate::models::RectSnapshot;

/// One firing of an observation region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp_milli: i64,
    pub is_intersecting: bool,
    pub rect: RectSnapshot,
}

pub type ObservationCallback = Box<dyn FnMut(Observation) + Send>;

#[derive(Debug, Error, PartialEq)]
pub enum ObserveError {
    #[error("observation is not supported by this host")]
    Unsupported,

    #[error("failed to observe region: {0}")]
    Failed(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum AnchorError {
    #[error("region has no text content to anchor")]
    NonText,

    #[error("failed to anchor region: {0}")]
    Other(String),
}

/// Output of a successful anchoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub selector: serde_json::Value,
    pub snippet: String,
}

/// Resolves a content region to a stable selector and a readable snippet.
pub trait ContentLocator<R> {
    fn locate(&self, region: &R) -> Result<Located, AnchorError>;
}

/// The environment that watches regions cross band lines.
pub trait ObservationHost: Send + Sync {
    type Region;

    fn is_supported(&self) -> bool {
        true
    }

    fn viewport_height(&self) -> f64;

    fn observe(
        &self,
        region: &Self::Region,
        margin: RootMargin,
        callback: ObservationCallback,
    ) -> Result<ObservationHandle, ObserveError>;
}

/// Cancels its observation when dropped or when [`ObservationHandle::cancel`]
/// is called, whichever comes first.
pub struct ObservationHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ObservationHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for ObservationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("active", &self.is_active())
            .finish()
    }
}
