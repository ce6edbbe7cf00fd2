//! Sequential execution of the planning stages.
//!
//! Stages run strictly one after another in list order. Before each stage the
//! full output of every prerequisite is concatenated, in declared order, under
//! a `--- <stage title> ---` heading and handed to the agent as context.
//!
//! ```ignore
//! let pipeline = SequentialPipeline::new("travel-plan")
//!     .add_agent(researcher)
//!     .add_agent(compiler);
//!
//! let result = pipeline.run(build_tasks(&prefs)).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use itinera_common::{ItineraError, Result, StageId, TaskResult, TaskSpec};
use tracing::{error, info};

use crate::traits::Agent;

/// Receives stage boundary notifications during a run.
pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _task: &TaskSpec, _agent_name: &str) {}

    fn stage_completed(&self, _result: &TaskResult) {}
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub pipeline_name: String,
    /// One entry per stage, in execution order.
    pub stage_results: Vec<TaskResult>,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Output of the last stage.
    pub fn final_output(&self) -> Option<&str> {
        self.stage_results.last().map(|r| r.output.as_str())
    }

    pub fn output_of(&self, stage: StageId) -> Option<&str> {
        self.stage_results
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| r.output.as_str())
    }
}

/// Runs task lists against a fixed set of agents, keyed by role.
pub struct SequentialPipeline {
    name: String,
    agents: HashMap<String, Arc<dyn Agent>>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl SequentialPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: HashMap::new(),
            observer: None,
        }
    }

    /// Register an agent under its role key.
    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.id().to_string(), agent);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute `tasks` in order. The first failing stage aborts the run.
    pub async fn run(&self, tasks: Vec<TaskSpec>) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!(
            pipeline = %self.name,
            stages = tasks.len(),
            "Starting sequential pipeline"
        );

        if tasks.is_empty() {
            return Err(ItineraError::Pipeline(format!(
                "Pipeline '{}' has no stages",
                self.name
            )));
        }

        let mut stage_results: Vec<TaskResult> = Vec::with_capacity(tasks.len());

        for (i, task) in tasks.iter().enumerate() {
            let agent = self.agents.get(&task.role).ok_or_else(|| {
                ItineraError::Pipeline(format!(
                    "No agent registered for role '{}' (stage {})",
                    task.role, task.stage
                ))
            })?;

            if stage_results.iter().any(|r| r.stage == task.stage) {
                return Err(ItineraError::Pipeline(format!(
                    "Stage {} appears more than once",
                    task.stage
                )));
            }

            let context = build_context(task, &stage_results)?;

            info!(
                pipeline = %self.name,
                step = i + 1,
                stage = %task.stage,
                agent = %agent.id(),
                context_len = context.len(),
                "Executing stage"
            );
            if let Some(observer) = &self.observer {
                observer.stage_started(task, agent.name());
            }

            let step_start = Instant::now();
            let output = agent.perform(task, &context).await.map_err(|e| {
                error!(
                    pipeline = %self.name,
                    stage = %task.stage,
                    agent = %agent.id(),
                    error = %e,
                    "Stage failed"
                );
                ItineraError::Pipeline(format!("Stage '{}' failed: {e}", task.stage.title()))
            })?;

            let result = TaskResult {
                stage: task.stage,
                agent_name: agent.name().to_string(),
                output,
                duration_ms: step_start.elapsed().as_millis() as u64,
            };

            info!(
                pipeline = %self.name,
                stage = %task.stage,
                output_len = result.output.len(),
                duration_ms = result.duration_ms,
                "Stage completed"
            );
            if let Some(observer) = &self.observer {
                observer.stage_completed(&result);
            }

            stage_results.push(result);
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            pipeline = %self.name,
            stages = stage_results.len(),
            duration_ms,
            "Pipeline completed"
        );

        Ok(PipelineResult {
            pipeline_name: self.name.clone(),
            stage_results,
            duration_ms,
        })
    }
}

/// Concatenate prerequisite outputs for `task`, failing if any is missing.
pub fn build_context(task: &TaskSpec, completed: &[TaskResult]) -> Result<String> {
    let mut sections = Vec::with_capacity(task.depends_on.len());
    for dep in &task.depends_on {
        let result = completed.iter().find(|r| r.stage == *dep).ok_or_else(|| {
            ItineraError::Pipeline(format!(
                "Stage {} requires {} which has not completed",
                task.stage, dep
            ))
        })?;
        sections.push(format!("--- {} ---\n{}", dep.title(), result.output));
    }
    Ok(sections.join("\n\n"))
}
