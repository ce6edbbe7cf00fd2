//! Terminal progress for a planning run.

use std::sync::atomic::{AtomicUsize, Ordering};

use itinera_agents::PipelineObserver;
use itinera_common::{StageId, TaskResult, TaskSpec};

/// Prints one line per stage boundary to stderr.
#[derive(Default)]
pub struct StageProgress {
    started: AtomicUsize,
}

pub fn started_line(position: usize, task: &TaskSpec, agent_name: &str) -> String {
    format!(
        "[{position}/{}] {} ({agent_name})...",
        StageId::ORDERED.len(),
        task.stage.title()
    )
}

pub fn completed_line(result: &TaskResult) -> String {
    format!(
        "      done in {:.1}s",
        result.duration_ms as f64 / 1000.0
    )
}

impl PipelineObserver for StageProgress {
    fn stage_started(&self, task: &TaskSpec, agent_name: &str) {
        let position = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        eprintln!("{}", started_line(position, task, agent_name));
    }

    fn stage_completed(&self, result: &TaskResult) {
        eprintln!("{}", completed_line(result));
    }
}
