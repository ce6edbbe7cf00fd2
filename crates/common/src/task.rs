//! Task types for the planning pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one of the five planning stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    DestinationResearch,
    AccommodationSearch,
    ActivitiesPlanning,
    TransportationPlanning,
    ItineraryCompilation,
}

impl StageId {
    /// Stages in execution order.
    pub const ORDERED: [StageId; 5] = [
        StageId::DestinationResearch,
        StageId::AccommodationSearch,
        StageId::ActivitiesPlanning,
        StageId::TransportationPlanning,
        StageId::ItineraryCompilation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::DestinationResearch => "destination_research",
            StageId::AccommodationSearch => "accommodation_search",
            StageId::ActivitiesPlanning => "activities_planning",
            StageId::TransportationPlanning => "transportation_planning",
            StageId::ItineraryCompilation => "itinerary_compilation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StageId::DestinationResearch => "Destination Research",
            StageId::AccommodationSearch => "Accommodation Options",
            StageId::ActivitiesPlanning => "Activities and Attractions",
            StageId::TransportationPlanning => "Transportation Plan",
            StageId::ItineraryCompilation => "Final Itinerary",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of the pipeline: instructions for a role plus its prerequisites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Which stage this is
    pub stage: StageId,

    /// Key of the role that performs the task
    pub role: String,

    /// Instructions with the traveler's preferences filled in
    pub description: String,

    /// What a good answer looks like
    pub expected_output: String,

    /// Stages whose results must exist before this one runs
    #[serde(default)]
    pub depends_on: Vec<StageId>,
}

impl TaskSpec {
    pub fn new(stage: StageId, role: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            stage,
            role: role.into(),
            description: description.into(),
            expected_output: String::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    pub fn depends_on(mut self, stages: &[StageId]) -> Self {
        self.depends_on = stages.to_vec();
        self
    }
}

/// Output of one completed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub stage: StageId,

    /// Name of the agent that produced the output
    pub agent_name: String,

    /// Unstructured text returned by the agent
    pub output: String,

    /// Wall-clock time for the stage in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_spec_builder_methods() {
        let task = TaskSpec::new(StageId::TransportationPlanning, "transportation_coordinator", "Plan it")
            .with_expected_output("A plan")
            .depends_on(&[StageId::DestinationResearch, StageId::ActivitiesPlanning]);

        assert_eq!(task.stage, StageId::TransportationPlanning);
        assert_eq!(task.role, "transportation_coordinator");
        assert_eq!(task.expected_output, "A plan");
        assert_eq!(
            task.depends_on,
            vec![StageId::DestinationResearch, StageId::ActivitiesPlanning]
        );
    }

    #[test]
    fn test_stage_order_matches_declaration() {
        let mut sorted = StageId::ORDERED;
        sorted.sort();
        assert_eq!(sorted, StageId::ORDERED);
    }

    #[test]
    fn test_stage_id_serializes_snake_case() {
        for stage in StageId::ORDERED {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }
}
