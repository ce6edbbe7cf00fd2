//! Background planning runs and their stage-by-stage progress.
//!
//! A form submission registers a job, then the planner runs on its own task.
//! A [`JobObserver`] attached to the planner moves each stage from pending to
//! running to completed, so status pages can poll while the run is going.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use itinera_agents::PipelineObserver;
use itinera_common::{StageId, TaskResult, TaskSpec};
use itinera_orchestrator::PlanOutcome;
use serde::Serialize;
use uuid::Uuid;

/// Finished jobs older than this are dropped when a new job starts.
pub const FINISHED_JOB_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Pending,
    Running,
    Completed,
}

/// Progress of one stage within a job.
#[derive(Debug, Clone, Serialize)]
pub struct StageStatus {
    pub stage: StageId,
    pub title: &'static str,
    pub agent: Option<String>,
    pub state: StageState,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum JobOutcome {
    Running,
    Completed {
        itinerary: String,
        file: Option<String>,
        results: Vec<TaskResult>,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub destination: Option<String>,
    pub stages: Vec<StageStatus>,
    pub outcome: JobOutcome,
    created: Instant,
}

impl Job {
    fn new(id: Uuid, destination: Option<String>) -> Self {
        Self {
            id,
            destination,
            stages: StageId::ORDERED
                .iter()
                .map(|stage| StageStatus {
                    stage: *stage,
                    title: stage.title(),
                    agent: None,
                    state: StageState::Pending,
                    duration_ms: None,
                })
                .collect(),
            outcome: JobOutcome::Running,
            created: Instant::now(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self.outcome {
            JobOutcome::Running => "running",
            JobOutcome::Completed { .. } => "completed",
            JobOutcome::Failed(_) => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.outcome, JobOutcome::Running)
    }

    fn stage_mut(&mut self, stage: StageId) -> Option<&mut StageStatus> {
        self.stages.iter_mut().find(|s| s.stage == stage)
    }
}

/// All jobs known to this server process.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobRegistry {
    /// Register a new running job and return its id.
    pub fn start(&self, destination: Option<String>) -> Uuid {
        let id = Uuid::new_v4();
        let mut jobs = self.jobs.write();
        jobs.retain(|_, job| !job.is_finished() || job.created.elapsed() < FINISHED_JOB_TTL);
        jobs.insert(id, Job::new(id, destination));
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut Job)) {
        if let Some(job) = self.jobs.write().get_mut(&id) {
            apply(job);
        }
    }

    pub fn stage_started(&self, id: Uuid, stage: StageId, agent_name: &str) {
        self.update(id, |job| {
            if let Some(status) = job.stage_mut(stage) {
                status.state = StageState::Running;
                status.agent = Some(agent_name.to_string());
            }
        });
    }

    pub fn stage_completed(&self, id: Uuid, result: &TaskResult) {
        self.update(id, |job| {
            if let Some(status) = job.stage_mut(result.stage) {
                status.state = StageState::Completed;
                status.agent = Some(result.agent_name.clone());
                status.duration_ms = Some(result.duration_ms);
            }
        });
    }

    pub fn complete(&self, id: Uuid, outcome: PlanOutcome) {
        let file = outcome.file_name().map(str::to_string);
        self.update(id, |job| {
            job.outcome = JobOutcome::Completed {
                itinerary: outcome.itinerary,
                file,
                results: outcome.stage_results,
            };
        });
    }

    pub fn fail(&self, id: Uuid, message: impl Into<String>) {
        let message = message.into();
        self.update(id, |job| job.outcome = JobOutcome::Failed(message));
    }
}

/// Feeds stage boundaries of one run into the registry.
pub struct JobObserver {
    jobs: Arc<JobRegistry>,
    id: Uuid,
}

impl JobObserver {
    pub fn new(jobs: Arc<JobRegistry>, id: Uuid) -> Self {
        Self { jobs, id }
    }
}

impl PipelineObserver for JobObserver {
    fn stage_started(&self, task: &TaskSpec, agent_name: &str) {
        self.jobs.stage_started(self.id, task.stage, agent_name);
    }

    fn stage_completed(&self, result: &TaskResult) {
        self.jobs.stage_completed(self.id, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(stage: StageId, ms: u64) -> TaskResult {
        TaskResult {
            stage,
            agent_name: "Researcher".into(),
            output: "notes".into(),
            duration_ms: ms,
        }
    }

    #[test]
    fn new_job_has_five_pending_stages() {
        let jobs = JobRegistry::default();
        let id = jobs.start(Some("Tokyo, Japan".into()));
        let job = jobs.get(id).unwrap();

        assert_eq!(job.status(), "running");
        assert_eq!(job.stages.len(), 5);
        assert!(job.stages.iter().all(|s| s.state == StageState::Pending));
        assert_eq!(job.stages[4].title, "Final Itinerary");
    }

    #[test]
    fn observer_moves_stages_forward() {
        let jobs = Arc::new(JobRegistry::default());
        let id = jobs.start(None);
        let observer = JobObserver::new(Arc::clone(&jobs), id);

        let task = TaskSpec::new(StageId::DestinationResearch, "destination_researcher", "x");
        observer.stage_started(&task, "Researcher");
        let job = jobs.get(id).unwrap();
        assert_eq!(job.stages[0].state, StageState::Running);
        assert_eq!(job.stages[0].agent.as_deref(), Some("Researcher"));
        assert_eq!(job.stages[1].state, StageState::Pending);

        observer.stage_completed(&result(StageId::DestinationResearch, 1200));
        let job = jobs.get(id).unwrap();
        assert_eq!(job.stages[0].state, StageState::Completed);
        assert_eq!(job.stages[0].duration_ms, Some(1200));
    }

    #[test]
    fn finishing_records_outcome() {
        let jobs = JobRegistry::default();
        let done = jobs.start(None);
        jobs.complete(
            done,
            PlanOutcome {
                itinerary: "Day 1".into(),
                path: PathBuf::from("travel_plans/trip_20250101_120000.md"),
                stage_results: vec![result(StageId::ItineraryCompilation, 5)],
            },
        );
        match jobs.get(done).unwrap().outcome {
            JobOutcome::Completed { itinerary, file, results } => {
                assert_eq!(itinerary, "Day 1");
                assert_eq!(file.as_deref(), Some("trip_20250101_120000.md"));
                assert_eq!(results.len(), 1);
            }
            other => panic!("expected completion, got {other:?}"),
        }

        let failed = jobs.start(None);
        jobs.fail(failed, "Stage 'Transportation Plan' failed");
        assert_eq!(jobs.get(failed).unwrap().status(), "failed");
        assert!(jobs.get(Uuid::new_v4()).is_none());
        assert_eq!(jobs.len(), 2);
    }
}
