//! Planning agents and the pipeline that runs them.
//!
//! - [`roles`]: the five fixed personas (name, goal, backstory, tool needs)
//! - [`LlmAgent`]: one role answering through a language model and its tools
//! - [`tasks::build_tasks`]: the five stage instructions for a set of preferences
//! - [`SequentialPipeline`]: runs the stages in order with context propagation
//!
//! Stage prerequisites:
//!
//! ```text
//! destination_research     -> (none)
//! accommodation_search     -> destination_research
//! activities_planning      -> destination_research
//! transportation_planning  -> destination_research, activities_planning
//! itinerary_compilation    -> all four above
//! ```

pub mod agent;
pub mod pipeline;
pub mod roles;
pub mod tasks;
pub mod traits;

use std::sync::Arc;

use itinera_llm::LlmClient;
use itinera_tools::Toolbox;

pub use agent::{DEFAULT_MAX_TOOL_ROUNDS, LlmAgent};
pub use pipeline::{PipelineObserver, PipelineResult, SequentialPipeline};
pub use roles::{ROLES, RoleDefinition};
pub use tasks::build_tasks;
pub use traits::Agent;

/// Settings applied to every agent built by [`build_agents`].
#[derive(Debug, Clone, Copy)]
pub struct AgentSettings {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub max_tool_rounds: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

/// One agent per role, sharing `llm` and drawing tools from `toolbox`.
pub fn build_agents(
    llm: Arc<dyn LlmClient>,
    toolbox: &Toolbox,
    settings: AgentSettings,
) -> Vec<Arc<dyn Agent>> {
    ROLES
        .iter()
        .map(|role| {
            let agent = LlmAgent::new(*role, Arc::clone(&llm), toolbox.select(role.tools))
                .with_temperature(settings.temperature)
                .with_max_tokens(settings.max_tokens)
                .with_max_tool_rounds(settings.max_tool_rounds);
            Arc::new(agent) as Arc<dyn Agent>
        })
        .collect()
}
