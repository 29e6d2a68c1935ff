use super::domain::{Task, TaskStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Per-project rollup shown on the overview page.
///
/// `overdue_tasks` counts every task whose end date is before the evaluation date,
/// completed ones included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project: String,
    pub total_tasks: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub unknown: usize,
    pub average_progress: f64,
    pub overdue_tasks: usize,
}

impl ProjectSummary {
    pub fn empty(project: &str) -> Self {
        Self {
            project: project.to_string(),
            total_tasks: 0,
            completed: 0,
            in_progress: 0,
            not_started: 0,
            unknown: 0,
            average_progress: 0.0,
            overdue_tasks: 0,
        }
    }

    pub fn count_for(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Completed => self.completed,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::NotStarted => self.not_started,
            TaskStatus::Unknown => self.unknown,
        }
    }

    /// Non-empty status buckets, for status distribution charts.
    pub fn status_breakdown(&self) -> Vec<StatusCountEntry> {
        TaskStatus::ordered()
            .into_iter()
            .map(|status| StatusCountEntry {
                status,
                status_label: status.label(),
                count: self.count_for(status),
            })
            .filter(|entry| entry.count > 0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCountEntry {
    pub status: TaskStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeLoadEntry {
    pub assignees: String,
    pub total: usize,
    pub open: usize,
    pub overdue: usize,
    pub average_progress: f64,
}

pub fn summarize(tasks: &[Task], project: &str, today: NaiveDate) -> ProjectSummary {
    let mut summary = ProjectSummary::empty(project);
    let mut progress_total: u64 = 0;

    for task in tasks {
        summary.total_tasks += 1;
        progress_total += u64::from(task.progress);

        match task.status {
            TaskStatus::Completed => summary.completed += 1,
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::NotStarted => summary.not_started += 1,
            TaskStatus::Unknown => summary.unknown += 1,
        }

        if task.is_past_due(today) {
            summary.overdue_tasks += 1;
        }
    }

    if summary.total_tasks > 0 {
        summary.average_progress = progress_total as f64 / summary.total_tasks as f64;
    }

    summary
}

/// Share of tasks marked Completed, as a whole percentage.
pub fn completion_rate(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }

    let completed = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .count();
    ((completed * 100) / tasks.len()) as u8
}

#[derive(Default)]
struct AssigneeTally {
    total: usize,
    open: usize,
    overdue: usize,
    progress_total: u64,
}

/// Workload per distinct assignees value, in first-seen order. Unassigned tasks are
/// grouped under an empty name.
pub fn assignee_load(tasks: &[Task], today: NaiveDate) -> Vec<AssigneeLoadEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, AssigneeTally> = HashMap::new();

    for task in tasks {
        let key = task.assignees.as_str();
        let tally = tallies.entry(key).or_insert_with(|| {
            order.push(key);
            AssigneeTally::default()
        });

        tally.total += 1;
        tally.progress_total += u64::from(task.progress);
        if task.status != TaskStatus::Completed {
            tally.open += 1;
        }
        if task.is_past_due(today) {
            tally.overdue += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            tallies.remove(key).map(|tally| AssigneeLoadEntry {
                assignees: key.to_string(),
                total: tally.total,
                open: tally.open,
                overdue: tally.overdue,
                average_progress: tally.progress_total as f64 / tally.total as f64,
            })
        })
        .collect()
}
