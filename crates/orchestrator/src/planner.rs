//! The planner entry point: preferences in, saved itinerary out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use itinera_agents::{
    Agent, PipelineObserver, PipelineResult, SequentialPipeline, build_agents, build_tasks,
};
use itinera_common::{ItineraError, Result, TaskResult, TripPreferences};
use itinera_llm::build_llm_client;
use itinera_tools::Toolbox;
use tracing::info;

use crate::config::PlannerConfig;
use crate::output::ItineraryDocument;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Text of the final stage
    pub itinerary: String,
    /// Where the itinerary document was written
    pub path: PathBuf,
    pub stage_results: Vec<TaskResult>,
}

impl PlanOutcome {
    /// Bare file name of the saved document.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Runs the five planning stages for a set of preferences.
pub struct TravelPlanner {
    agents: Vec<Arc<dyn Agent>>,
    output_dir: PathBuf,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl TravelPlanner {
    /// Build the model client, detect tools and create the five agents.
    ///
    /// A missing model credential fails here, before any stage can run.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;

        let llm = build_llm_client(&config.provider)?;
        let toolbox = Toolbox::detect(&config.tools)?;
        let agents = build_agents(llm, &toolbox, config.agent_settings());

        info!(
            provider = %config.provider.provider,
            model = %config.provider.model,
            search_tools = toolbox.search_tools().len(),
            output_dir = %config.output_dir.display(),
            "Travel planner initialized"
        );

        Ok(Self::with_agents(agents, config.output_dir.clone()))
    }

    /// Assemble a planner from ready-made agents.
    pub fn with_agents(agents: Vec<Arc<dyn Agent>>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            agents,
            output_dir: output_dir.into(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn pipeline(&self) -> SequentialPipeline {
        let pipeline = self
            .agents
            .iter()
            .fold(SequentialPipeline::new("travel-plan"), |p, agent| {
                p.add_agent(Arc::clone(agent))
            });
        match &self.observer {
            Some(observer) => pipeline.with_observer(Arc::clone(observer)),
            None => pipeline,
        }
    }

    /// Run every stage without writing anything.
    pub async fn plan(&self, prefs: &TripPreferences) -> Result<PipelineResult> {
        info!(
            destination = prefs.destination().unwrap_or("(to be recommended)"),
            days = prefs.trip_days(),
            travelers = prefs.travelers(),
            "Planning trip"
        );
        self.pipeline().run(build_tasks(prefs)).await
    }

    /// Run every stage and save the itinerary. Nothing is written on failure.
    pub async fn run(&self, prefs: &TripPreferences) -> Result<PlanOutcome> {
        let result = self.plan(prefs).await?;
        let itinerary = result
            .final_output()
            .ok_or_else(|| ItineraError::Pipeline("Pipeline produced no output".to_string()))?
            .to_string();

        let document = ItineraryDocument::new(prefs, itinerary.clone());
        let path = document.save(&self.output_dir, chrono::Local::now().naive_local())?;

        Ok(PlanOutcome {
            itinerary,
            path,
            stage_results: result.stage_results,
        })
    }
}
