use super::domain::{Task, TaskStatus};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Medium => "Medium risk",
            Self::High => "High risk",
        }
    }

    fn from_elapsed(fraction: f64) -> Self {
        if fraction < 1.0 / 3.0 {
            Self::Low
        } else if fraction < 2.0 / 3.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Per-task progress colouring bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBand {
    Stalled,
    Lagging,
    Moderate,
    OnTrack,
    Complete,
}

impl ProgressBand {
    pub const fn for_progress(progress: u8) -> Self {
        match progress {
            100..=u8::MAX => Self::Complete,
            75..=99 => Self::OnTrack,
            50..=74 => Self::Moderate,
            25..=49 => Self::Lagging,
            _ => Self::Stalled,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Stalled => "Stalled",
            Self::Lagging => "Lagging",
            Self::Moderate => "Moderate",
            Self::OnTrack => "On track",
            Self::Complete => "Complete",
        }
    }
}

/// Why a task could not be placed on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineIssue {
    MissingDates,
    EndBeforeStart,
}

impl TimelineIssue {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingDates => "Missing start or end date",
            Self::EndBeforeStart => "End date before start date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskTimeline {
    pub task_no: i64,
    pub title: String,
    pub status: TaskStatus,
    pub status_text: String,
    pub assignees: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Days until the end date; negative once the task is overdue.
    pub remaining_days: Option<i64>,
    pub deadline_label: String,
    pub completion_rate: u8,
    pub progress_band: ProgressBand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_band: Option<RiskBand>,
    pub overdue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<TimelineIssue>,
}

pub fn compute_task_timeline(task: &Task, today: NaiveDate) -> TaskTimeline {
    let remaining_days = task.end_date.map(|end| (end - today).num_days());
    let overdue = task.end_date.is_some_and(|end| today > end);
    let completion_rate = task.progress.min(100);

    let (elapsed_fraction, issue) = match task.scheduled_window() {
        None => (None, Some(TimelineIssue::MissingDates)),
        Some((start, end)) if end < start => (None, Some(TimelineIssue::EndBeforeStart)),
        Some((start, end)) => (Some(elapsed_fraction(start, end, today)), None),
    };

    let risk_band = elapsed_fraction.map(|fraction| {
        if overdue {
            RiskBand::High
        } else {
            RiskBand::from_elapsed(fraction)
        }
    });

    TaskTimeline {
        task_no: task.task_no,
        title: task.title.clone(),
        status: task.status,
        status_text: task.status_text.clone(),
        assignees: task.assignees.clone(),
        start_date: task.start_date,
        end_date: task.end_date,
        remaining_days,
        deadline_label: deadline_label(remaining_days),
        completion_rate,
        progress_band: ProgressBand::for_progress(completion_rate),
        elapsed_fraction,
        risk_band,
        overdue,
        issue,
    }
}

/// Elapsed share of the planned window, clamped to `[0, 1]`. A zero-length window
/// counts as fully elapsed.
fn elapsed_fraction(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> f64 {
    let total_days = (end - start).num_days();
    if total_days == 0 {
        return 1.0;
    }

    let elapsed_days = (today - start).num_days();
    (elapsed_days as f64 / total_days as f64).clamp(0.0, 1.0)
}

pub fn deadline_label(remaining_days: Option<i64>) -> String {
    match remaining_days {
        None => "No end date".to_string(),
        Some(0) => "Due today".to_string(),
        Some(days) if days < 0 => format!("Overdue by {} days", -days),
        Some(days) => format!("{days} days remaining"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::domain::fixtures::{date, scheduled, task};

    #[test]
    fn remaining_days_are_signed() {
        let task = scheduled(1, 40, date(2024, 1, 1), date(2024, 1, 11));

        let ahead = compute_task_timeline(&task, date(2024, 1, 8));
        assert_eq!(ahead.remaining_days, Some(3));
        assert_eq!(ahead.deadline_label, "3 days remaining");
        assert!(!ahead.overdue);

        let late = compute_task_timeline(&task, date(2024, 1, 15));
        assert_eq!(late.remaining_days, Some(-4));
        assert_eq!(late.deadline_label, "Overdue by 4 days");
        assert!(late.overdue);

        let due = compute_task_timeline(&task, date(2024, 1, 11));
        assert_eq!(due.deadline_label, "Due today");
    }

    #[test]
    fn risk_band_follows_elapsed_thirds() {
        let task = scheduled(1, 40, date(2024, 1, 1), date(2024, 1, 31));

        let early = compute_task_timeline(&task, date(2024, 1, 5));
        assert_eq!(early.risk_band, Some(RiskBand::Low));

        let middle = compute_task_timeline(&task, date(2024, 1, 15));
        assert_eq!(middle.risk_band, Some(RiskBand::Medium));

        let late = compute_task_timeline(&task, date(2024, 1, 25));
        assert_eq!(late.risk_band, Some(RiskBand::High));

        let before_start = compute_task_timeline(&task, date(2023, 12, 20));
        assert_eq!(before_start.elapsed_fraction, Some(0.0));
        assert_eq!(before_start.risk_band, Some(RiskBand::Low));
    }

    #[test]
    fn overdue_forces_high_risk() {
        let task = scheduled(1, 95, date(2024, 1, 1), date(2024, 1, 31));
        let timeline = compute_task_timeline(&task, date(2024, 2, 2));
        assert_eq!(timeline.elapsed_fraction, Some(1.0));
        assert_eq!(timeline.risk_band, Some(RiskBand::High));
    }

    #[test]
    fn zero_length_window_counts_as_elapsed() {
        let task = scheduled(1, 10, date(2024, 1, 5), date(2024, 1, 5));
        let timeline = compute_task_timeline(&task, date(2024, 1, 5));
        assert_eq!(timeline.elapsed_fraction, Some(1.0));
        assert_eq!(timeline.risk_band, Some(RiskBand::High));
        assert!(timeline.issue.is_none());
    }

    #[test]
    fn unusable_windows_are_flagged() {
        let inverted = scheduled(1, 10, date(2024, 1, 5), date(2024, 1, 1));
        let timeline = compute_task_timeline(&inverted, date(2024, 1, 3));
        assert_eq!(timeline.issue, Some(TimelineIssue::EndBeforeStart));
        assert!(timeline.risk_band.is_none());
        assert_eq!(timeline.remaining_days, Some(-2));

        let mut open_ended = task(2, TaskStatus::InProgress, 55);
        open_ended.start_date = Some(date(2024, 1, 1));
        let timeline = compute_task_timeline(&open_ended, date(2024, 1, 3));
        assert_eq!(timeline.issue, Some(TimelineIssue::MissingDates));
        assert_eq!(timeline.remaining_days, None);
        assert_eq!(timeline.deadline_label, "No end date");
        assert_eq!(timeline.completion_rate, 55);
        assert_eq!(timeline.progress_band, ProgressBand::Moderate);
    }

    #[test]
    fn progress_bands_cover_the_gauge() {
        assert_eq!(ProgressBand::for_progress(0), ProgressBand::Stalled);
        assert_eq!(ProgressBand::for_progress(24), ProgressBand::Stalled);
        assert_eq!(ProgressBand::for_progress(25), ProgressBand::Lagging);
        assert_eq!(ProgressBand::for_progress(74), ProgressBand::Moderate);
        assert_eq!(ProgressBand::for_progress(75), ProgressBand::OnTrack);
        assert_eq!(ProgressBand::for_progress(100), ProgressBand::Complete);
    }
}
