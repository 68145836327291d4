pub mod host;
pub mod producer;
pub mod sampler;
pub mod store;

pub use host::{
    AnchorError, ContentLocator, Located, Observation, ObservationCallback, ObservationHandle,
    ObservationHost, ObserveError,
};
pub use sampler::{SamplingReport, VisibilitySampler};
pub use store::{SampleRejected, SampleStore};

#[cfg(test)]
pub(crate) mod testing;
