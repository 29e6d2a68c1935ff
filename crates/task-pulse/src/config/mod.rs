use crate::tasks::SourceId;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the dashboard service and CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub projects: ProjectCatalog,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let project_dir = env::var("APP_PROJECT_DIR").unwrap_or_else(|_| "data".to_string());
        let projects = match env::var("APP_PROJECTS") {
            Ok(raw) => ProjectCatalog::parse(&raw, Path::new(&project_dir))?,
            Err(_) => ProjectCatalog::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            projects,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filter applied when `RUST_LOG` is unset.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub label: String,
    pub source: SourceId,
}

/// Named task sources selectable from the dashboard, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectCatalog {
    entries: Vec<ProjectEntry>,
}

impl ProjectCatalog {
    pub fn new(entries: Vec<ProjectEntry>) -> Self {
        Self { entries }
    }

    /// Parses `Label=path` entries separated by `;`. Relative paths are resolved
    /// against `base_dir`.
    pub fn parse(raw: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut entries: Vec<ProjectEntry> = Vec::new();

        for item in raw.split(';').map(str::trim).filter(|item| !item.is_empty()) {
            let (label, path) = item
                .split_once('=')
                .map(|(label, path)| (label.trim(), path.trim()))
                .filter(|(label, path)| !label.is_empty() && !path.is_empty())
                .ok_or_else(|| ConfigError::InvalidProjectEntry(item.to_string()))?;

            if entries.iter().any(|entry| entry.label == label) {
                return Err(ConfigError::DuplicateProject(label.to_string()));
            }

            let path = Path::new(path);
            let resolved = if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            };

            entries.push(ProjectEntry {
                label: label.to_string(),
                source: SourceId::new(resolved),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }

    pub fn find(&self, label: &str) -> Option<&ProjectEntry> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidProjectEntry(String),
    DuplicateProject(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidProjectEntry(entry) => {
                write!(f, "APP_PROJECTS entry '{entry}' must look like Label=path")
            }
            ConfigError::DuplicateProject(label) => {
                write!(f, "APP_PROJECTS lists project '{label}' more than once")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidProjectEntry(_)
            | ConfigError::DuplicateProject(_) => None,
        }
    }
}
