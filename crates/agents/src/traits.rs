//! The agent seam the pipeline drives.

use async_trait::async_trait;
use itinera_common::{Result, TaskSpec};

/// A role-bound worker that turns one task plus upstream context into text.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Role key this agent serves (e.g. "destination_researcher").
    fn id(&self) -> &str;

    /// Human-readable role name.
    fn name(&self) -> &str;

    /// System prompt used to condition the model.
    fn system_prompt(&self) -> &str;

    /// Perform `task`. `context` holds the prerequisite stages' output,
    /// empty for stages without prerequisites.
    async fn perform(&self, task: &TaskSpec, context: &str) -> Result<String>;
}
