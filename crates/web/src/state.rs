//! Application state for the web server.

use std::sync::Arc;
use std::time::Instant;

use itinera_common::Result;
use itinera_orchestrator::{PlannerConfig, TravelPlanner};

use crate::jobs::JobRegistry;

/// Builds a fresh planner for each submitted request.
pub trait PlannerFactory: Send + Sync {
    fn build(&self, config: &PlannerConfig) -> Result<TravelPlanner>;
}

/// Builds planners from configuration: real model client, detected tools.
pub struct ConfiguredPlanners;

impl PlannerFactory for ConfiguredPlanners {
    fn build(&self, config: &PlannerConfig) -> Result<TravelPlanner> {
        TravelPlanner::from_config(config)
    }
}

/// Shared application state. Only the job registry changes after startup.
pub struct AppState {
    /// Base configuration; per-request credentials are layered on a copy
    pub config: PlannerConfig,

    pub planners: Arc<dyn PlannerFactory>,

    /// Background planning runs started from the form
    pub jobs: Arc<JobRegistry>,

    /// Server start time (for health checks)
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: PlannerConfig) -> Self {
        Self::with_factory(config, Arc::new(ConfiguredPlanners))
    }

    pub fn with_factory(config: PlannerConfig, planners: Arc<dyn PlannerFactory>) -> Self {
        Self {
            config,
            planners,
            jobs: Arc::new(JobRegistry::default()),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
