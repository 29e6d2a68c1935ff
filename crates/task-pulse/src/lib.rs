//! Task-state analysis engine behind the project task dashboard.
//!
//! Raw task sheets are loaded and normalized by [`tasks::TaskLoader`], then fed to the
//! alert, summary and timeline calculators in [`tasks`].

pub mod config;
pub mod error;
pub mod tasks;
pub mod telemetry;
