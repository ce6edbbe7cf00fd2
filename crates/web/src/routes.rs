//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use itinera_common::{ItineraError, TaskResult, TripPreferences, security::resolve_plan_file};
use itinera_orchestrator::{PlanOutcome, PlannerConfig, TravelPlanner};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::form::PlanRequest;
use crate::jobs::{Job, JobObserver, JobOutcome, StageStatus};
use crate::pages;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub provider: String,
    pub model: String,
    pub credential_configured: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let provider = &state.config.provider;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        provider: provider.provider.clone(),
        model: provider.model.clone(),
        credential_configured: provider.has_api_key(),
    })
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip)]
    status: StatusCode,
}

impl ErrorResponse {
    fn from_failure(failure: &PlanFailure) -> Self {
        let (status, code) = match failure {
            PlanFailure::MissingCredential => (StatusCode::BAD_REQUEST, "MISSING_CREDENTIAL"),
            PlanFailure::Invalid(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            PlanFailure::Failed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PLANNING_FAILED"),
        };
        Self {
            error: failure.message(),
            code,
            status,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Why a planning request did not produce an itinerary.
#[derive(Debug)]
enum PlanFailure {
    MissingCredential,
    Invalid(String),
    Failed(String),
}

impl PlanFailure {
    fn message(&self) -> String {
        match self {
            PlanFailure::MissingCredential => pages::MISSING_KEY_MESSAGE.to_string(),
            PlanFailure::Invalid(msg) | PlanFailure::Failed(msg) => msg.clone(),
        }
    }
}

impl From<ItineraError> for PlanFailure {
    fn from(err: ItineraError) -> Self {
        match err {
            ItineraError::InvalidPreferences(_) => PlanFailure::Invalid(err.to_string()),
            other => PlanFailure::Failed(other.to_string()),
        }
    }
}

/// Validate the request and build a planner with the request's keys.
fn prepare(
    state: &AppState,
    request: &PlanRequest,
) -> Result<(TravelPlanner, TripPreferences), PlanFailure> {
    let prefs = request.preferences()?;
    let config: PlannerConfig = request.config_for(&state.config);
    if config.provider.requires_api_key() && !config.provider.has_api_key() {
        return Err(PlanFailure::MissingCredential);
    }

    info!(
        destination = prefs.destination().unwrap_or("(to be recommended)"),
        days = prefs.trip_days(),
        "Received planning request"
    );

    let planner = state.planners.build(&config)?;
    Ok((planner, prefs))
}

/// Validate, then run the planner to completion.
async fn execute(state: &AppState, request: &PlanRequest) -> Result<PlanOutcome, PlanFailure> {
    let (planner, prefs) = prepare(state, request)?;
    let outcome = planner.run(&prefs).await.map_err(|e| {
        error!(error = %e, "Planning failed");
        PlanFailure::from(e)
    })?;

    info!(path = %outcome.path.display(), "Itinerary saved");
    Ok(outcome)
}

/// Validate, then run the planner on a background task tracked as a job.
fn start_job(state: &AppState, request: &PlanRequest) -> Result<Uuid, PlanFailure> {
    let (planner, prefs) = prepare(state, request)?;
    let jobs = Arc::clone(&state.jobs);
    let id = jobs.start(prefs.destination().map(str::to_string));
    let planner = planner.with_observer(Arc::new(JobObserver::new(Arc::clone(&jobs), id)));

    tokio::spawn(async move {
        match planner.run(&prefs).await {
            Ok(outcome) => {
                info!(job = %id, path = %outcome.path.display(), "Itinerary saved");
                jobs.complete(id, outcome);
            }
            Err(e) => {
                error!(job = %id, error = %e, "Planning failed");
                jobs.fail(id, e.to_string());
            }
        }
    });

    info!(job = %id, "Planning job started");
    Ok(id)
}

fn failure_page(failure: &PlanFailure) -> Response {
    let status = match failure {
        PlanFailure::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Html(pages::error_page(&failure.message()))).into_response()
}

/// The preferences form.
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let today = chrono::Local::now().date_naive();
    Html(pages::index_page(today, state.config.provider.has_api_key()))
}

/// Form submission: start a job and redirect to its progress page.
///
/// Invalid input and a missing key are reported immediately.
pub async fn submit_plan(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let started = PlanRequest::from_form(fields)
        .map_err(PlanFailure::from)
        .and_then(|request| start_job(&state, &request));

    match started {
        Ok(id) => Redirect::to(&format!("/jobs/{id}")).into_response(),
        Err(failure) => failure_page(&failure),
    }
}

/// Progress page while running, then the itinerary or the error page.
pub async fn job_page(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(job) = state.jobs.get(id) else {
        return (StatusCode::NOT_FOUND, Html(pages::error_page("Planning job not found")))
            .into_response();
    };

    match &job.outcome {
        JobOutcome::Running => Html(pages::progress_page(&job)).into_response(),
        JobOutcome::Completed {
            itinerary,
            file,
            results,
        } => Html(pages::result_page(itinerary, file.as_deref(), results)).into_response(),
        JobOutcome::Failed(message) => failure_page(&PlanFailure::Failed(message.clone())),
    }
}

/// Summary of one finished stage.
#[derive(Debug, Serialize)]
pub struct StageSummary {
    pub stage: String,
    pub title: &'static str,
    pub agent: String,
    pub duration_ms: u64,
}

impl From<&TaskResult> for StageSummary {
    fn from(result: &TaskResult) -> Self {
        Self {
            stage: result.stage.as_str().to_string(),
            title: result.stage.title(),
            agent: result.agent_name.clone(),
            duration_ms: result.duration_ms,
        }
    }
}

/// JSON planning response.
#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub itinerary: String,
    pub file: Option<String>,
    pub download_url: Option<String>,
    pub stages: Vec<StageSummary>,
}

/// JSON variant of the form submission.
pub async fn api_itinerary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<ItineraryResponse>, ErrorResponse> {
    let outcome = execute(&state, &request)
        .await
        .map_err(|failure| ErrorResponse::from_failure(&failure))?;

    let file = outcome.file_name().map(str::to_string);
    Ok(Json(ItineraryResponse {
        download_url: file.as_ref().map(|f| format!("/plans/{f}")),
        file,
        stages: outcome.stage_results.iter().map(StageSummary::from).collect(),
        itinerary: outcome.itinerary,
    }))
}

/// Accepted background job.
#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub id: Uuid,
    pub status_url: String,
}

/// JSON variant of the form submission that returns before the run finishes.
pub async fn api_start_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlanRequest>,
) -> Result<(StatusCode, Json<JobAccepted>), ErrorResponse> {
    let id = start_job(&state, &request).map_err(|failure| ErrorResponse::from_failure(&failure))?;
    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted {
            id,
            status_url: format!("/api/v1/jobs/{id}"),
        }),
    ))
}

/// Job status, including the itinerary once it is ready.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub id: Uuid,
    pub status: &'static str,
    pub destination: Option<String>,
    pub stages: Vec<StageStatus>,
    pub itinerary: Option<String>,
    pub file: Option<String>,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        let status = job.status();
        let (itinerary, file, error) = match job.outcome {
            JobOutcome::Running => (None, None, None),
            JobOutcome::Completed {
                itinerary, file, ..
            } => (Some(itinerary), file, None),
            JobOutcome::Failed(message) => (None, None, Some(message)),
        };
        Self {
            id: job.id,
            status,
            destination: job.destination,
            stages: job.stages,
            itinerary,
            download_url: file.as_ref().map(|f| format!("/plans/{f}")),
            file,
            error,
        }
    }
}

/// Poll a job's stage-by-stage status.
pub async fn api_job_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, ErrorResponse> {
    state
        .jobs
        .get(id)
        .map(|job| Json(JobStatusResponse::from(job)))
        .ok_or_else(|| ErrorResponse {
            error: format!("Unknown planning job: {id}"),
            code: "JOB_NOT_FOUND",
            status: StatusCode::NOT_FOUND,
        })
}

/// Serve a saved itinerary document as a Markdown download.
pub async fn download_plan(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Response {
    let path = match resolve_plan_file(&file, &state.config.output_dir) {
        Ok(path) => path,
        Err(e) => {
            warn!(file = %file, error = %e, "Rejected itinerary download");
            return (StatusCode::NOT_FOUND, "Itinerary not found").into_response();
        }
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(contents) => (
            [
                (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file}\""),
                ),
            ],
            contents,
        )
            .into_response(),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read itinerary");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read itinerary").into_response()
        }
    }
}
