//! Common types shared across the Itinera crates.
//!
//! This crate holds the value types that flow through a planning run:
//! the traveler's [`TripPreferences`], the [`TaskSpec`] chain built from
//! them, and the [`TaskResult`]s each stage produces.

pub mod error;
pub mod preferences;
pub mod security;
pub mod task;

pub use error::{ItineraError, Result};
pub use preferences::{
    AccommodationPreference, BudgetTier, TransportationPreference, TripPreferences,
    TripPreferencesBuilder,
};
pub use task::{StageId, TaskResult, TaskSpec};
