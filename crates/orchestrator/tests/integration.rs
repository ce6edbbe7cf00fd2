//! End-to-end planner runs with a scripted language model.
//!
//! The model never asks for tools here, so no network access is needed.

use async_trait::async_trait;
use chrono::{NaiveDate, Timelike};
use itinera_agents::{AgentSettings, build_agents};
use itinera_common::{ItineraError, Result, StageId, TripPreferences};
use itinera_llm::{LlmClient, LlmRequest, LlmResponse};
use itinera_orchestrator::{PlannerConfig, TravelPlanner};
use itinera_tools::{Toolbox, ToolsConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replies with a stage-specific paragraph; optionally fails on the Nth call.
struct ScriptedModel {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl ScriptedModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        })
    }

    fn failing_on(call: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_on_call: Some(call),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedModel {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(ItineraError::Llm("OpenAI API error 500: upstream".to_string()));
        }

        let prompt = &request.messages[0].content;
        let text = if prompt.starts_with("Compile all the research") {
            "# Tokyo Itinerary\n\nDay 1: Asakusa and Senso-ji.\nDay 2: Tsukiji outer market."
                .to_string()
        } else {
            format!("Findings for call {call}")
        };
        Ok(LlmResponse::text("scripted", text))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn tokyo() -> TripPreferences {
    TripPreferences::builder(
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
        NaiveDate::from_ymd_opt(2025, 6, 22).unwrap(),
    )
    .destination("Tokyo, Japan")
    .travelers(2)
    .interests(["Technology", "Food", "Culture", "Shopping"])
    .notes("Vegetarian meals")
    .build()
    .unwrap()
}

fn planner_with(model: Arc<ScriptedModel>, output_dir: &std::path::Path) -> TravelPlanner {
    let toolbox = Toolbox::detect(&ToolsConfig::default()).unwrap();
    let agents = build_agents(model, &toolbox, AgentSettings::default());
    TravelPlanner::with_agents(agents, output_dir)
}

#[tokio::test]
async fn test_tokyo_run_saves_itinerary() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("travel_plans");
    let model = ScriptedModel::new();
    let planner = planner_with(model.clone(), &out_dir);

    let started = chrono::Local::now().naive_local().with_nanosecond(0).unwrap();
    let outcome = planner.run(&tokyo()).await.unwrap();
    let finished = chrono::Local::now().naive_local();

    assert!(outcome.itinerary.contains("Day 1: Asakusa"));
    assert_eq!(outcome.stage_results.len(), 5);
    assert_eq!(
        outcome.stage_results.last().unwrap().stage,
        StageId::ItineraryCompilation
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 5);

    let name = outcome.file_name().unwrap();
    assert!(name.starts_with("Tokyo_Japan_"), "{name}");
    assert!(name.ends_with(".md"));
    let stamp = name
        .trim_start_matches("Tokyo_Japan_")
        .trim_end_matches(".md");
    assert_eq!(stamp.len(), 15);
    let saved_at = chrono::NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").unwrap();
    assert!(
        started <= saved_at && saved_at <= finished,
        "{saved_at} outside {started}..{finished}"
    );

    assert!(outcome.path.starts_with(&out_dir));
    let saved = std::fs::read_to_string(&outcome.path).unwrap();
    assert!(saved.contains("destination: Tokyo, Japan\n"));
    assert!(saved.contains("interests: Culture, Food, Shopping, Technology\n"));
    assert!(saved.contains("additional_notes: Vegetarian meals\n"));
    assert!(saved.contains("# Tokyo Itinerary"));
}

#[tokio::test]
async fn test_plan_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("travel_plans");
    let planner = planner_with(ScriptedModel::new(), &out_dir);

    let result = planner.plan(&tokyo()).await.unwrap();
    assert_eq!(result.stage_results.len(), 5);
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn test_stage_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("travel_plans");
    let planner = planner_with(ScriptedModel::failing_on(3), &out_dir);

    let err = planner.run(&tokyo()).await.unwrap_err();
    assert!(matches!(err, ItineraError::Pipeline(_)));
    assert!(err.to_string().contains("Activities and Attractions"));
    assert!(!out_dir.exists());
}

#[test]
fn test_missing_credential_fails_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PlannerConfig {
        output_dir: dir.path().join("travel_plans"),
        ..Default::default()
    };
    config.apply_env_with(|_| None);

    let err = TravelPlanner::from_config(&config).err().unwrap();
    assert!(matches!(err, ItineraError::Config(_)));
    assert!(!config.output_dir.exists());
}

#[test]
fn test_zero_search_tools_is_a_config_error() {
    let mut config = PlannerConfig::default();
    config.provider.provider = "ollama".to_string();
    config.tools.enable_duckduckgo = false;
    config.apply_env_with(|_| None);

    assert!(matches!(
        TravelPlanner::from_config(&config),
        Err(ItineraError::Config(_))
    ));
}

#[test]
fn test_local_provider_builds_without_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PlannerConfig {
        output_dir: dir.path().join("plans"),
        ..Default::default()
    };
    config.provider.provider = "ollama".to_string();
    config.provider.model = "llama3.1".to_string();
    config.apply_env_with(|_| None);

    let planner = TravelPlanner::from_config(&config).unwrap();
    assert_eq!(planner.output_dir(), config.output_dir.as_path());
}
