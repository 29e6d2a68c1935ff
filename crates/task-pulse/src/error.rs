use crate::config::ConfigError;
use crate::tasks::LoadError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Load(LoadError),
    UnknownProject(String),
    UnknownTask { project: String, task_no: i64 },
    InvalidRequest(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Load(LoadError::NotFound(_))
            | AppError::UnknownProject(_)
            | AppError::UnknownTask { .. } => StatusCode::NOT_FOUND,
            AppError::Load(LoadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Load(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Load(err) => write!(f, "{err}"),
            AppError::UnknownProject(label) => write!(f, "unknown project '{label}'"),
            AppError::UnknownTask { project, task_no } => {
                write!(f, "project '{project}' has no task #{task_no}")
            }
            AppError::InvalidRequest(reason) => write!(f, "invalid request: {reason}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Load(err) => Some(err),
            AppError::UnknownProject(_)
            | AppError::UnknownTask { .. }
            | AppError::InvalidRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<LoadError> for AppError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{NormalizeError, SchemaError};
    use std::path::PathBuf;

    #[test]
    fn data_problems_are_client_errors() {
        let schema = AppError::from(LoadError::Normalize(NormalizeError::Schema(SchemaError {
            missing: vec!["Status".to_string()],
        })));
        assert_eq!(schema.status_code(), StatusCode::BAD_REQUEST);

        let format = AppError::from(LoadError::UnsupportedFormat(PathBuf::from("notes.pdf")));
        assert_eq!(format.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn lookups_map_to_not_found() {
        let missing = AppError::from(LoadError::NotFound(PathBuf::from("data/1.csv")));
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let task = AppError::UnknownTask {
            project: "ECG".to_string(),
            task_no: 7,
        };
        assert_eq!(task.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(task.to_string(), "project 'ECG' has no task #7");
    }

    #[test]
    fn infrastructure_failures_are_server_errors() {
        let io = AppError::from(std::io::Error::other("disk gone"));
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(io.to_string().starts_with("io error"));
    }

    #[test]
    fn bind_and_serve_failures_surface_as_io_errors() {
        let bind = AppError::from(std::io::Error::from(std::io::ErrorKind::AddrInUse));
        assert!(matches!(bind, AppError::Io(_)));
        assert_eq!(bind.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
