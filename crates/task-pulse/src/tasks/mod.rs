//! Task-state analysis: normalization, alerts, rollups and timelines.

pub mod alerts;
pub mod dashboard;
pub mod domain;
pub mod loader;
pub mod schema;
pub mod store;
pub mod summary;
pub mod timeline;

pub use alerts::{evaluate_alerts, evaluate_task, Alert, AlertSeverity};
pub use dashboard::{OverdueTaskView, ProjectDashboard};
pub use domain::{Task, TaskSet, TaskStatus};
pub use loader::{read_delimited, read_source, LoadError, SourceFormat, SourceId, TaskLoader};
pub use schema::{
    normalize, DataIntegrityError, NormalizeError, RawTable, RawValue, SchemaError,
    REQUIRED_COLUMNS,
};
pub use store::{InMemoryTaskSetStore, TaskSetStore};
pub use summary::{
    assignee_load, completion_rate, summarize, AssigneeLoadEntry, ProjectSummary,
    StatusCountEntry,
};
pub use timeline::{compute_task_timeline, ProgressBand, RiskBand, TaskTimeline, TimelineIssue};
