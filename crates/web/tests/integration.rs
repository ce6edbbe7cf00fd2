//! Integration tests for the web layer.
//!
//! A real server is started on a random port. Planning runs use a factory
//! that hands out simulated agents, so no model or network is involved.
//! Form submissions run as background jobs; tests poll the job status route.

use async_trait::async_trait;
use itinera_agents::Agent;
use itinera_common::{ItineraError, Result, TaskSpec};
use itinera_orchestrator::{PlannerConfig, TravelPlanner};
use itinera_web::{AppState, PlannerFactory, create_router};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const ROLE_KEYS: [&str; 5] = [
    "destination_researcher",
    "accommodation_specialist",
    "activities_planner",
    "transportation_coordinator",
    "itinerary_compiler",
];

struct StubAgent {
    id: &'static str,
    fail: bool,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl Agent for StubAgent {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.id
    }

    fn system_prompt(&self) -> &str {
        "stub"
    }

    async fn perform(&self, task: &TaskSpec, _context: &str) -> Result<String> {
        if self.fail {
            return Err(ItineraError::Llm("upstream unavailable".into()));
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(format!("# {} <done>", task.stage.title()))
    }
}

/// Records the model key each planner was built with.
///
/// `fail` breaks the activities stage; `gate` holds the compiler until notified.
#[derive(Default)]
struct StubPlanners {
    keys_seen: Mutex<Vec<Option<String>>>,
    fail: bool,
    gate: Option<Arc<Notify>>,
}

impl PlannerFactory for StubPlanners {
    fn build(&self, config: &PlannerConfig) -> Result<TravelPlanner> {
        self.keys_seen
            .lock()
            .unwrap()
            .push(config.provider.api_key.clone());
        let agents: Vec<Arc<dyn Agent>> = ROLE_KEYS
            .iter()
            .map(|&id| {
                Arc::new(StubAgent {
                    id,
                    fail: self.fail && id == "activities_planner",
                    gate: self.gate.clone().filter(|_| id == "itinerary_compiler"),
                }) as Arc<dyn Agent>
            })
            .collect();
        Ok(TravelPlanner::with_agents(agents, config.output_dir.clone()))
    }
}

/// Spin up a test server on a random port and return the base URL.
async fn start_test_server(output_dir: &Path, planners: Arc<StubPlanners>) -> String {
    let config = PlannerConfig {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    };
    let state = Arc::new(AppState::with_factory(config, planners));
    let router = create_router(state, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Helper to GET a URL and return (status, body_string).
async fn get(base: &str, path: &str) -> (u16, String) {
    let resp = reqwest::get(format!("{}{}", base, path)).await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap();
    (status, body)
}

/// Helper to POST a form and return (status, body_string).
async fn post_form(base: &str, path: &str, fields: &[(&str, &str)]) -> (u16, String) {
    let (status, _, body) = submit_form(base, path, fields).await;
    (status, body)
}

/// POST a form, following redirects. Returns (status, final path, body).
async fn submit_form(base: &str, path: &str, fields: &[(&str, &str)]) -> (u16, String, String) {
    let resp = reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .form(fields)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let final_path = resp.url().path().to_string();
    let body = resp.text().await.unwrap();
    (status, final_path, body)
}

/// Submit the form and return the id of the job it started.
async fn start_job(base: &str, fields: &[(&str, &str)]) -> String {
    let (status, final_path, _) = submit_form(base, "/plan", fields).await;
    assert!(status == 200 || status == 500, "unexpected status {status}");
    final_path
        .strip_prefix("/jobs/")
        .unwrap_or_else(|| panic!("not redirected to a job page: {final_path}"))
        .to_string()
}

async fn job_status(base: &str, id: &str) -> serde_json::Value {
    let (status, body) = get(base, &format!("/api/v1/jobs/{id}")).await;
    assert_eq!(status, 200);
    serde_json::from_str(&body).unwrap()
}

/// Poll the job until `done` holds for its status JSON.
async fn wait_for_job(
    base: &str,
    id: &str,
    done: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    for _ in 0..250 {
        let json = job_status(base, id).await;
        if done(&json) {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {id} did not reach the expected state");
}

fn finished(json: &serde_json::Value) -> bool {
    json["status"] != "running"
}

/// Helper to POST JSON and return (status, parsed body).
async fn post_json(base: &str, path: &str, json: serde_json::Value) -> (u16, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .json(&json)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap();
    (status, body)
}

const TOKYO_FORM: [(&str, &str); 8] = [
    ("openai_api_key", "sk-form"),
    ("destination", "Tokyo, Japan"),
    ("start_date", "2025-06-15"),
    ("end_date", "2025-06-22"),
    ("travelers", "2"),
    ("budget", "Mid-range"),
    ("interests", "Culture"),
    ("interests", "Food"),
];

fn saved_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path(), Arc::default()).await;
    let (status, body) = get(&base, "/health").await;
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["provider"], "openai");
    assert_eq!(json["credential_configured"], false);
}

#[tokio::test]
async fn test_index_serves_form() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path(), Arc::default()).await;
    let (status, body) = get(&base, "/").await;
    assert_eq!(status, 200);
    assert!(body.contains("<form method=\"post\" action=\"/plan\">"));
    assert!(body.contains("name=\"openai_api_key\""));
    assert!(body.contains("name=\"interests\" value=\"Family-friendly\""));
}

#[tokio::test]
async fn test_missing_key_renders_error_without_planning() {
    let dir = tempfile::tempdir().unwrap();
    let planners = Arc::new(StubPlanners::default());
    let base = start_test_server(dir.path(), Arc::clone(&planners)).await;

    let (status, body) = post_form(&base, "/plan", &TOKYO_FORM[1..]).await;
    assert_eq!(status, 400);
    assert!(body.contains("Please enter your OpenAI API key"));
    assert!(body.contains("Check your API key and internet connection"));
    assert!(planners.keys_seen.lock().unwrap().is_empty());
    assert!(saved_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_form_submission_renders_and_saves_itinerary() {
    let dir = tempfile::tempdir().unwrap();
    let planners = Arc::new(StubPlanners::default());
    let base = start_test_server(dir.path(), Arc::clone(&planners)).await;

    let id = start_job(&base, &TOKYO_FORM).await;
    let json = wait_for_job(&base, &id, finished).await;
    assert_eq!(json["status"], "completed");
    assert_eq!(json["destination"], "Tokyo, Japan");
    assert!(json["stages"]
        .as_array()
        .unwrap()
        .iter()
        .all(|stage| stage["state"] == "completed"));

    let (status, body) = get(&base, &format!("/jobs/{id}")).await;
    assert_eq!(status, 200);
    assert!(body.contains("# Final Itinerary &lt;done&gt;"));
    assert!(body.contains("Destination Research by destination_researcher"));
    assert_eq!(
        planners.keys_seen.lock().unwrap().as_slice(),
        &[Some("sk-form".to_string())]
    );

    let files = saved_files(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("Tokyo_Japan_"));
    assert!(body.contains(&format!("href=\"/plans/{}\"", files[0])));
    assert_eq!(json["download_url"], format!("/plans/{}", files[0]));

    let (status, document) = get(&base, &format!("/plans/{}", files[0])).await;
    assert_eq!(status, 200);
    assert!(document.contains("# Final Itinerary <done>"));
}

#[tokio::test]
async fn test_invalid_dates_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path(), Arc::default()).await;
    let (status, body) = post_form(
        &base,
        "/plan",
        &[
            ("openai_api_key", "sk-form"),
            ("start_date", "2025-06-22"),
            ("end_date", "2025-06-15"),
        ],
    )
    .await;
    assert_eq!(status, 400);
    assert!(body.contains("Invalid preferences"));
}

#[tokio::test]
async fn test_stage_failure_renders_generic_error() {
    let dir = tempfile::tempdir().unwrap();
    let planners = Arc::new(StubPlanners {
        fail: true,
        ..Default::default()
    });
    let base = start_test_server(dir.path(), planners).await;

    let id = start_job(&base, &TOKYO_FORM).await;
    let json = wait_for_job(&base, &id, finished).await;
    assert_eq!(json["status"], "failed");
    assert!(json["error"].as_str().unwrap().contains("Activities and Attractions"));
    assert!(json["itinerary"].is_null());

    let (status, body) = get(&base, &format!("/jobs/{id}")).await;
    assert_eq!(status, 500);
    assert!(body.contains("Activities and Attractions"));
    assert!(body.contains("Try again with different preferences"));
    assert!(saved_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_job_page_reports_stage_progress() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let planners = Arc::new(StubPlanners {
        gate: Some(Arc::clone(&gate)),
        ..Default::default()
    });
    let base = start_test_server(dir.path(), planners).await;

    let id = start_job(&base, &TOKYO_FORM).await;
    let json = wait_for_job(&base, &id, |json| json["stages"][4]["state"] == "running").await;
    assert_eq!(json["status"], "running");
    for stage in &json["stages"].as_array().unwrap()[..4] {
        assert_eq!(stage["state"], "completed");
        assert!(stage["duration_ms"].is_u64());
    }
    assert_eq!(json["stages"][4]["stage"], "itinerary_compilation");
    assert_eq!(json["stages"][4]["agent"], "itinerary_compiler");
    assert!(json["stages"][4]["duration_ms"].is_null());

    let (status, body) = get(&base, &format!("/jobs/{id}")).await;
    assert_eq!(status, 200);
    assert!(body.contains("<meta http-equiv=\"refresh\" content=\"3\">"));
    assert!(body.contains("Final Itinerary: in progress (itinerary_compiler is working)"));
    assert!(body.contains("Transportation Plan: done by transportation_coordinator"));
    assert!(saved_files(dir.path()).is_empty());

    gate.notify_one();
    let json = wait_for_job(&base, &id, finished).await;
    assert_eq!(json["status"], "completed");
    assert_eq!(json["itinerary"], "# Final Itinerary <done>");
    assert_eq!(saved_files(dir.path()).len(), 1);
}

#[tokio::test]
async fn test_api_job_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path(), Arc::default()).await;

    let (status, json) = post_json(
        &base,
        "/api/v1/jobs",
        serde_json::json!({
            "openai_api_key": "sk-json",
            "destination": "Lisbon",
            "start_date": "2025-06-15",
            "end_date": "2025-06-18"
        }),
    )
    .await;
    assert_eq!(status, 202);
    let id = json["id"].as_str().unwrap().to_string();
    assert_eq!(json["status_url"], format!("/api/v1/jobs/{id}"));

    let json = wait_for_job(&base, &id, finished).await;
    assert_eq!(json["status"], "completed");
    let file = json["file"].as_str().unwrap();
    assert!(file.starts_with("Lisbon_"));
    let (status, _) = get(&base, json["download_url"].as_str().unwrap()).await;
    assert_eq!(status, 200);

    let (status, json) = post_json(
        &base,
        "/api/v1/jobs",
        serde_json::json!({"start_date": "2025-06-15", "end_date": "2025-06-18"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(json["code"], "MISSING_CREDENTIAL");

    let unknown = "00000000-0000-4000-8000-000000000000";
    let (status, body) = get(&base, &format!("/api/v1/jobs/{unknown}")).await;
    assert_eq!(status, 404);
    assert!(body.contains("JOB_NOT_FOUND"));
    let (status, _) = get(&base, &format!("/jobs/{unknown}")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_api_itinerary_json() {
    let dir = tempfile::tempdir().unwrap();
    let base = start_test_server(dir.path(), Arc::default()).await;

    let (status, json) = post_json(
        &base,
        "/api/v1/itinerary",
        serde_json::json!({
            "openai_api_key": "sk-json",
            "start_date": "2025-06-15",
            "end_date": "2025-06-20",
            "interests": ["Nature"]
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(json["stages"].as_array().unwrap().len(), 5);
    assert_eq!(json["stages"][4]["stage"], "itinerary_compilation");
    let file = json["file"].as_str().unwrap();
    assert!(file.starts_with("trip_"));
    assert_eq!(json["download_url"], format!("/plans/{file}"));

    let (status, json) = post_json(
        &base,
        "/api/v1/itinerary",
        serde_json::json!({"start_date": "2025-06-15", "end_date": "2025-06-20"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(json["code"], "MISSING_CREDENTIAL");
}

#[tokio::test]
async fn test_download_rejects_unknown_and_traversal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "private").unwrap();
    let base = start_test_server(dir.path(), Arc::default()).await;

    let (status, _) = get(&base, "/plans/missing_20250101_120000.md").await;
    assert_eq!(status, 404);
    let (status, _) = get(&base, "/plans/notes.txt").await;
    assert_eq!(status, 404);
    let (status, _) = get(&base, "/plans/..%2F..%2Fetc%2Fpasswd.md").await;
    assert_eq!(status, 404);
}
