use super::domain::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub task_no: i64,
    pub title: String,
    pub progress: u8,
    pub message: &'static str,
    pub severity: AlertSeverity,
    pub severity_label: &'static str,
}

/// Schedule position of one task on the evaluation date.
struct ScheduleContext {
    past_end: bool,
    progress: u8,
    elapsed_days: i64,
    timeline_pct: f64,
}

struct AlertRule {
    severity: AlertSeverity,
    message: &'static str,
    applies: fn(&ScheduleContext) -> bool,
}

/// Evaluated top to bottom; the first rule that applies decides the alert.
const ALERT_RULES: &[AlertRule] = &[
    AlertRule {
        severity: AlertSeverity::Critical,
        message: "Task is overdue.",
        applies: |ctx| ctx.past_end && ctx.progress < 100,
    },
    AlertRule {
        severity: AlertSeverity::Warning,
        message: "Task has not been started.",
        applies: |ctx| ctx.progress == 0 && ctx.elapsed_days >= 0,
    },
    AlertRule {
        severity: AlertSeverity::Critical,
        message: "Task is critically behind; completion at risk.",
        applies: |ctx| ctx.timeline_pct >= 75.0 && ctx.progress <= 60,
    },
    AlertRule {
        severity: AlertSeverity::Warning,
        message: "Task is running behind schedule.",
        applies: |ctx| ctx.timeline_pct >= 50.0 && ctx.progress <= 30,
    },
    AlertRule {
        severity: AlertSeverity::Warning,
        message: "Task is at risk of delay.",
        applies: |ctx| ctx.timeline_pct >= 25.0 && ctx.progress <= 15,
    },
];

impl ScheduleContext {
    /// `None` for unscheduled tasks, tasks that have not started yet, and rows whose
    /// end date is not after their start date.
    fn for_task(task: &Task, today: NaiveDate) -> Option<Self> {
        let (start, end) = task.scheduled_window()?;
        if today < start || end <= start {
            return None;
        }

        let duration = (end - start).num_days();
        let elapsed_days = (today - start).num_days();
        let timeline_pct = (elapsed_days as f64 / duration as f64).min(1.0) * 100.0;

        Some(Self {
            past_end: today > end,
            progress: task.progress,
            elapsed_days,
            timeline_pct,
        })
    }
}

pub fn evaluate_task(task: &Task, today: NaiveDate) -> Option<Alert> {
    let context = ScheduleContext::for_task(task, today)?;
    let rule = ALERT_RULES.iter().find(|rule| (rule.applies)(&context))?;

    Some(Alert {
        task_no: task.task_no,
        title: task.title.clone(),
        progress: task.progress,
        message: rule.message,
        severity: rule.severity,
        severity_label: rule.severity.label(),
    })
}

/// Alerts for every task that trips a rule, in input order.
pub fn evaluate_alerts(tasks: &[Task], today: NaiveDate) -> Vec<Alert> {
    tasks
        .iter()
        .filter_map(|task| evaluate_task(task, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::domain::fixtures::{date, scheduled, task};
    use crate::tasks::domain::TaskStatus;

    fn ten_day_task(progress: u8) -> Task {
        scheduled(1, progress, date(2024, 1, 1), date(2024, 1, 11))
    }

    #[test]
    fn late_timeline_with_low_progress_is_critical() {
        let alert = evaluate_task(&ten_day_task(40), date(2024, 1, 9)).expect("alert raised");
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.message, "Task is critically behind; completion at risk.");
    }

    #[test]
    fn unstarted_task_warns_before_timeline_rules() {
        let alert = evaluate_task(&ten_day_task(0), date(2024, 1, 2)).expect("alert raised");
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.message, "Task has not been started.");

        let late = evaluate_task(&ten_day_task(0), date(2024, 1, 10)).expect("alert raised");
        assert_eq!(late.message, "Task has not been started.");
    }

    #[test]
    fn past_end_date_is_overdue() {
        let task = scheduled(7, 90, date(2023, 11, 1), date(2023, 12, 1));
        let alert = evaluate_task(&task, date(2024, 1, 1)).expect("alert raised");
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.message, "Task is overdue.");
        assert_eq!(alert.task_no, 7);
        assert_eq!(alert.progress, 90);
    }

    #[test]
    fn finished_task_past_end_date_is_quiet() {
        let task = scheduled(7, 100, date(2023, 11, 1), date(2023, 12, 1));
        assert!(evaluate_task(&task, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn middle_rules_fire_at_their_thresholds() {
        let behind = evaluate_task(&ten_day_task(30), date(2024, 1, 6)).expect("alert raised");
        assert_eq!(behind.severity, AlertSeverity::Warning);
        assert_eq!(behind.message, "Task is running behind schedule.");

        let at_risk = evaluate_task(&ten_day_task(15), date(2024, 1, 4)).expect("alert raised");
        assert_eq!(at_risk.message, "Task is at risk of delay.");

        assert!(evaluate_task(&ten_day_task(16), date(2024, 1, 4)).is_none());
        assert!(evaluate_task(&ten_day_task(61), date(2024, 1, 9)).is_none());
    }

    #[test]
    fn degenerate_and_future_windows_are_skipped() {
        let same_day = scheduled(2, 10, date(2024, 1, 5), date(2024, 1, 5));
        assert!(evaluate_task(&same_day, date(2024, 2, 1)).is_none());

        let inverted = scheduled(3, 10, date(2024, 1, 5), date(2024, 1, 1));
        assert!(evaluate_task(&inverted, date(2024, 2, 1)).is_none());

        let future = ten_day_task(0);
        assert!(evaluate_task(&future, date(2023, 12, 31)).is_none());

        let unscheduled = task(4, TaskStatus::NotStarted, 0);
        assert!(evaluate_task(&unscheduled, date(2024, 1, 5)).is_none());
    }

    #[test]
    fn alerts_keep_input_order_and_one_per_task() {
        let tasks = vec![
            scheduled(5, 10, date(2024, 1, 1), date(2024, 1, 3)),
            scheduled(2, 0, date(2024, 1, 1), date(2024, 1, 30)),
            scheduled(9, 90, date(2024, 1, 1), date(2024, 1, 30)),
            scheduled(1, 20, date(2024, 1, 1), date(2024, 1, 11)),
        ];

        let alerts = evaluate_alerts(&tasks, date(2024, 1, 9));
        let numbers: Vec<i64> = alerts.iter().map(|alert| alert.task_no).collect();
        assert_eq!(numbers, vec![5, 2, 1]);
        assert_eq!(alerts[0].message, "Task is overdue.");
        assert_eq!(alerts[2].severity_label, "Critical");
    }
}
