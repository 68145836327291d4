//! Reading-time measurement for document content regions.
//!
//! Content regions are observed against horizontal viewport bands; every band
//! crossing lands in a [`SampleStore`]. An [`Aggregator`] folds those samples
//! into pause-aware running totals on a fixed tick, and the [`workbench`]
//! functions rank and bucket a snapshot for display.

pub mod aggregator;
pub mod bands;
pub mod models;
pub mod sampling;
pub mod session;
pub mod settings;
pub mod utils;
pub mod visibility;
pub mod workbench;

pub use aggregator::{Aggregator, AggregatorStatus, Subscription};
pub use bands::{default_active_bands, default_bands, Band, RootMargin};
pub use models::{
    IntersectionSample, RectSnapshot, RunningTotal, RunningTotalSample, RunningTotalSnapshot,
    Target,
};
pub use sampling::{
    AnchorError, ContentLocator, Located, Observation, ObservationHandle, ObservationHost,
    ObserveError, SampleStore, VisibilitySampler,
};
pub use session::ReadingSession;
pub use settings::{ReadTimeSettings, SettingsStore};
pub use visibility::PageVisibility;
pub use workbench::{partition, rank, KeyedSample, PartitionOptions, Partitioned, Percentile};

/// Initializes `env_logger` (reads `RUST_LOG`, defaults to Info). Safe to call
/// more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();

    log::info!("readtime logging initialized");
}
