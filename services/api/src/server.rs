use crate::cli::ServeArgs;
use crate::infra::{shared_loader, AppState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use task_pulse::config::AppConfig;
use task_pulse::error::AppError;
use task_pulse::telemetry;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if config.projects.is_empty() {
        warn!("no projects configured; set APP_PROJECTS to Label=path entries");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        projects: Arc::new(config.projects.clone()),
        loader: shared_loader(),
    };

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        projects = config.projects.entries().len(),
        "task dashboard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
