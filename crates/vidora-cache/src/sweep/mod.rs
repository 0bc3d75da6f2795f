//! Background sweeping of expired entries.
//!
//! Lookups already re-check expiry, so the sweeper only bounds memory held by
//! keys that are never queried again.

mod scheduler;

pub use scheduler::{SweepConfig, SweepHandle, SweepScheduler};
