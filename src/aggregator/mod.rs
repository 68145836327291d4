pub mod controller;
pub mod state;

pub use controller::{Aggregator, Clock, Subscription};
pub use state::{intersecting_milli, AggregatorState, AggregatorStatus};
