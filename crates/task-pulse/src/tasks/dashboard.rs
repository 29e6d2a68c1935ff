use super::alerts::{evaluate_alerts, Alert, AlertSeverity};
use super::domain::{TaskSet, TaskStatus};
use super::summary::{
    assignee_load, completion_rate, summarize, AssigneeLoadEntry, ProjectSummary,
    StatusCountEntry,
};
use super::timeline::{compute_task_timeline, TaskTimeline};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct OverdueTaskView {
    pub task_no: i64,
    pub title: String,
    pub assignees: String,
    pub end_date: NaiveDate,
    pub days_overdue: i64,
    pub status: TaskStatus,
    pub status_label: &'static str,
}

/// Everything the task dashboard shows for one project on one evaluation date.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDashboard {
    pub project: String,
    pub today: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Assignee values available for filtering, from the unfiltered task set.
    pub assignees: Vec<String>,
    pub summary: ProjectSummary,
    pub completion_rate: u8,
    pub status_breakdown: Vec<StatusCountEntry>,
    pub assignee_load: Vec<AssigneeLoadEntry>,
    pub alerts: Vec<Alert>,
    pub overdue_tasks: Vec<OverdueTaskView>,
    pub timelines: Vec<TaskTimeline>,
}

impl ProjectDashboard {
    /// Builds the dashboard, narrowing every view to `assignee` when one is given.
    pub fn build(
        project: &str,
        tasks: &TaskSet,
        today: NaiveDate,
        assignee: Option<&str>,
    ) -> Self {
        let assignee = assignee
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("all"));
        let assignees = tasks.assignees().into_iter().map(str::to_string).collect();

        let filtered;
        let visible = match assignee {
            Some(name) => {
                filtered = tasks.filtered_by_assignee(name);
                &filtered
            }
            None => tasks,
        };
        let rows = visible.tasks();

        let summary = summarize(rows, project, today);
        let mut overdue_tasks: Vec<OverdueTaskView> = rows
            .iter()
            .filter_map(|task| {
                let end_date = task.end_date.filter(|end| *end < today)?;
                Some(OverdueTaskView {
                    task_no: task.task_no,
                    title: task.title.clone(),
                    assignees: task.assignees.clone(),
                    end_date,
                    days_overdue: (today - end_date).num_days(),
                    status: task.status,
                    status_label: task.status.label(),
                })
            })
            .collect();
        overdue_tasks.sort_by(|a, b| a.end_date.cmp(&b.end_date));

        Self {
            project: project.to_string(),
            today,
            assignee: assignee.map(str::to_string),
            assignees,
            completion_rate: completion_rate(rows),
            status_breakdown: summary.status_breakdown(),
            assignee_load: assignee_load(rows, today),
            alerts: evaluate_alerts(rows, today),
            overdue_tasks,
            timelines: rows
                .iter()
                .map(|task| compute_task_timeline(task, today))
                .collect(),
            summary,
        }
    }

    pub fn critical_alerts(&self) -> usize {
        self.alerts
            .iter()
            .filter(|alert| alert.severity == AlertSeverity::Critical)
            .count()
    }
}
