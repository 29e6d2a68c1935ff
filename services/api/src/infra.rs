use chrono::{Local, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use task_pulse::config::{ProjectCatalog, ProjectEntry};
use task_pulse::error::AppError;
use task_pulse::tasks::{InMemoryTaskSetStore, TaskLoader, TaskSet, TaskSetStore};

pub(crate) type SharedLoader = Arc<TaskLoader<InMemoryTaskSetStore>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) projects: Arc<ProjectCatalog>,
    pub(crate) loader: SharedLoader,
}

pub(crate) fn shared_loader() -> SharedLoader {
    Arc::new(TaskLoader::new(Arc::new(InMemoryTaskSetStore::default())))
}

/// Looks up a configured project and loads its task set through the cache.
pub(crate) fn load_project<'a, S: TaskSetStore>(
    projects: &'a ProjectCatalog,
    loader: &TaskLoader<S>,
    label: &str,
) -> Result<(&'a ProjectEntry, Arc<TaskSet>), AppError> {
    let entry = projects
        .find(label)
        .ok_or_else(|| AppError::UnknownProject(label.to_string()))?;
    let tasks = loader.load_tasks(&entry.source)?;
    Ok((entry, tasks))
}

/// Same as [`load_project`], but runs file and spreadsheet reads on the blocking pool
/// so a cold load does not stall the async workers.
pub(crate) async fn load_project_blocking(
    state: &AppState,
    label: String,
) -> Result<(ProjectEntry, Arc<TaskSet>), AppError> {
    let projects = Arc::clone(&state.projects);
    let loader = Arc::clone(&state.loader);

    tokio::task::spawn_blocking(move || {
        load_project(&projects, loader.as_ref(), &label)
            .map(|(entry, tasks)| (entry.clone(), tasks))
    })
    .await
    .map_err(|err| AppError::Io(std::io::Error::other(err)))?
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Evaluation date for a request: the supplied `YYYY-MM-DD` value, or the local date.
pub(crate) fn evaluation_date(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value).map_err(AppError::InvalidRequest),
        None => Ok(Local::now().date_naive()),
    }
}
