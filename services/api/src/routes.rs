use crate::infra::{evaluation_date, load_project_blocking, AppState};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use task_pulse::error::AppError;
use task_pulse::tasks::{
    completion_rate, compute_task_timeline, read_delimited, summarize, ProjectDashboard,
    ProjectSummary, SourceId, Task, TaskSet, TaskTimeline,
};
use tracing::info;

const UPLOADED_PROJECT: &str = "Uploaded tasks";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EvaluationQuery {
    #[serde(default)]
    pub(crate) today: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) today: Option<String>,
    #[serde(default)]
    pub(crate) assignee: Option<String>,
    #[serde(default)]
    pub(crate) include_tasks: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) project: Option<String>,
    #[serde(default)]
    pub(crate) today: Option<String>,
    #[serde(default)]
    pub(crate) assignee: Option<String>,
    #[serde(default)]
    pub(crate) include_tasks: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectView {
    pub(crate) label: String,
    pub(crate) source: SourceId,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectListResponse {
    pub(crate) projects: Vec<ProjectView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SummaryResponse {
    pub(crate) today: NaiveDate,
    pub(crate) completion_rate: u8,
    #[serde(flatten)]
    pub(crate) summary: ProjectSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    #[serde(flatten)]
    pub(crate) dashboard: ProjectDashboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tasks: Option<Vec<Task>>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/projects", get(list_projects))
        .route("/api/v1/projects/:label/summary", get(project_summary))
        .route("/api/v1/projects/:label/dashboard", get(project_dashboard))
        .route(
            "/api/v1/projects/:label/tasks/:task_no/timeline",
            get(task_timeline),
        )
        .route("/api/v1/tasks/analyze", post(analyze_tasks))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };

    (status, Json(json!({ "status": label })))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_projects(
    Extension(state): Extension<AppState>,
) -> Json<ProjectListResponse> {
    let projects = state
        .projects
        .entries()
        .iter()
        .map(|entry| ProjectView {
            label: entry.label.clone(),
            source: entry.source.clone(),
        })
        .collect();

    Json(ProjectListResponse { projects })
}

pub(crate) async fn project_summary(
    Extension(state): Extension<AppState>,
    Path(label): Path<String>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let today = evaluation_date(query.today.as_deref())?;
    let (entry, tasks) = load_project_blocking(&state, label).await?;

    Ok(Json(SummaryResponse {
        today,
        completion_rate: completion_rate(tasks.tasks()),
        summary: summarize(tasks.tasks(), &entry.label, today),
    }))
}

pub(crate) async fn project_dashboard(
    Extension(state): Extension<AppState>,
    Path(label): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let today = evaluation_date(query.today.as_deref())?;
    let (entry, tasks) = load_project_blocking(&state, label).await?;

    let dashboard = ProjectDashboard::build(&entry.label, &tasks, today, query.assignee.as_deref());
    let tasks = query.include_tasks.then(|| visible_tasks(&tasks, &dashboard));

    Ok(Json(DashboardResponse { dashboard, tasks }))
}

pub(crate) async fn task_timeline(
    Extension(state): Extension<AppState>,
    Path((label, task_no)): Path<(String, i64)>,
    Query(query): Query<EvaluationQuery>,
) -> Result<Json<TaskTimeline>, AppError> {
    let today = evaluation_date(query.today.as_deref())?;
    let (entry, tasks) = load_project_blocking(&state, label).await?;

    let task = tasks.find(task_no).ok_or_else(|| AppError::UnknownTask {
        project: entry.label.clone(),
        task_no,
    })?;

    Ok(Json(compute_task_timeline(task, today)))
}

/// Analyzes an inline CSV body. Results are never cached.
pub(crate) async fn analyze_tasks(
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let AnalyzeRequest {
        csv,
        project,
        today,
        assignee,
        include_tasks,
    } = payload;

    let today = evaluation_date(today.as_deref())?;
    let tasks = read_delimited(Cursor::new(csv.into_bytes()))?;
    let project = project
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UPLOADED_PROJECT.to_string());
    info!(%project, tasks = tasks.len(), "analyzed uploaded task sheet");

    let dashboard = ProjectDashboard::build(&project, &tasks, today, assignee.as_deref());
    let tasks = include_tasks.then(|| visible_tasks(&tasks, &dashboard));

    Ok(Json(DashboardResponse { dashboard, tasks }))
}

fn visible_tasks(tasks: &TaskSet, dashboard: &ProjectDashboard) -> Vec<Task> {
    match dashboard.assignee.as_deref() {
        Some(name) => tasks.filtered_by_assignee(name).tasks().to_vec(),
        None => tasks.tasks().to_vec(),
    }
}
