//! Planner orchestration for Itinera.
//!
//! [`TravelPlanner`] wires a language model client, the detected research
//! tools and the five role agents together, runs the stage pipeline for a set
//! of [`TripPreferences`](itinera_common::TripPreferences), and writes the
//! final itinerary to `<destination>_<YYYYMMDD_HHMMSS>.md`.
//!
//! ```text
//! PlannerConfig ──► TravelPlanner::from_config
//!                        │  build_llm_client + Toolbox::detect + build_agents
//!                        ▼
//!                  TravelPlanner::run(&prefs)
//!                        │  SequentialPipeline (5 stages)
//!                        ▼
//!                  ItineraryDocument::save ──► travel_plans/Tokyo_Japan_20250615_090503.md
//! ```

pub mod config;
pub mod output;
pub mod planner;

pub use config::PlannerConfig;
pub use output::{ItineraryDocument, destination_token, plan_file_name};
pub use planner::{PlanOutcome, TravelPlanner};
