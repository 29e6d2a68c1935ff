use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Unknown,
}

impl TaskStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Completed,
            Self::InProgress,
            Self::NotStarted,
            Self::Unknown,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Unknown => "Unknown",
        }
    }

    /// Maps sheet status text onto the closed status set. Matching ignores case and
    /// repeated whitespace; anything else is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match normalize_label(raw).as_str() {
            "not started" => Self::NotStarted,
            "in progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Unknown,
        }
    }
}

pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Canonical task record produced by the schema normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub task_no: i64,
    pub title: String,
    pub status: TaskStatus,
    /// Status text as it appeared in the source sheet.
    pub status_text: String,
    pub progress: u8,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub assignees: String,
    pub remarks: Option<String>,
}

impl Task {
    /// Start and end dates, when the sheet provided both.
    pub fn scheduled_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }

    pub fn is_assigned_to(&self, assignee: &str) -> bool {
        let needle = assignee.trim().to_lowercase();
        needle.is_empty() || self.assignees.to_lowercase().contains(&needle)
    }
}

/// Tasks of one loaded project, kept in source row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, task_no: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.task_no == task_no)
    }

    /// Distinct assignee values in first-seen order.
    pub fn assignees(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tasks
            .iter()
            .map(|task| task.assignees.as_str())
            .filter(|assignees| !assignees.is_empty() && seen.insert(*assignees))
            .collect()
    }

    pub fn filtered_by_assignee(&self, assignee: &str) -> TaskSet {
        let tasks = self
            .tasks
            .iter()
            .filter(|task| task.is_assigned_to(assignee))
            .cloned()
            .collect();
        TaskSet { tasks }
    }
}

impl From<Vec<Task>> for TaskSet {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::task;
    use super::*;

    #[test]
    fn status_parsing_ignores_case_and_spacing() {
        assert_eq!(TaskStatus::parse("Completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse("  IN   progress "), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("not started"), TaskStatus::NotStarted);
        assert_eq!(TaskStatus::parse("Blocked"), TaskStatus::Unknown);
        assert_eq!(TaskStatus::parse("Done"), TaskStatus::Unknown);
    }

    #[test]
    fn assignee_match_is_case_insensitive_substring() {
        let mut shared = task(1, TaskStatus::InProgress, 10);
        shared.assignees = "Asha Rao, Miguel Ortiz".to_string();

        assert!(shared.is_assigned_to("miguel"));
        assert!(shared.is_assigned_to("ASHA RAO"));
        assert!(!shared.is_assigned_to("Priya"));
    }

    #[test]
    fn assignees_are_distinct_in_first_seen_order() {
        let mut first = task(1, TaskStatus::InProgress, 10);
        first.assignees = "Miguel".to_string();
        let mut second = task(2, TaskStatus::Completed, 100);
        second.assignees = "Asha".to_string();
        let mut third = task(3, TaskStatus::NotStarted, 0);
        third.assignees = "Miguel".to_string();
        let unassigned = task(4, TaskStatus::NotStarted, 0);

        let set = TaskSet::new(vec![first, second, third, unassigned]);
        assert_eq!(set.assignees(), vec!["Miguel", "Asha"]);

        let filtered = set.filtered_by_assignee("miguel");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.find(2).is_none());
    }
}
