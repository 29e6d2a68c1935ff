use crate::infra::{load_project, parse_date, shared_loader};
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Args};
use std::path::PathBuf;
use task_pulse::config::AppConfig;
use task_pulse::error::AppError;
use task_pulse::tasks::{
    compute_task_timeline, summarize, ProjectDashboard, SourceId, TaskSet, TaskTimeline,
};
use task_pulse::telemetry;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "project"])))]
pub(crate) struct ReportArgs {
    /// Task sheet to analyze (.csv, .tsv, .xlsx, .xls, .ods)
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Configured project label to analyze
    #[arg(long)]
    pub(crate) project: Option<String>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Only include tasks whose assignees contain this name
    #[arg(long)]
    pub(crate) assignee: Option<String>,
    /// Show the timeline of a single task number
    #[arg(long)]
    pub(crate) task: Option<i64>,
    /// Include a full task listing in the output
    #[arg(long)]
    pub(crate) list_tasks: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OverviewArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        file,
        project,
        today,
        assignee,
        task,
        list_tasks,
    } = args;

    let config = bootstrap()?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let loader = shared_loader();

    let (label, source, tasks) = match (file, project) {
        (Some(path), _) => {
            let label = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let source = SourceId::new(path);
            let tasks = loader.load_tasks(&source)?;
            (label, source, tasks)
        }
        (None, Some(label)) => {
            let (entry, tasks) = load_project(&config.projects, loader.as_ref(), &label)?;
            (entry.label.clone(), entry.source.clone(), tasks)
        }
        (None, None) => {
            return Err(AppError::InvalidRequest(
                "either --file or --project is required".to_string(),
            ))
        }
    };

    if let Some(task_no) = task {
        let task = tasks.find(task_no).ok_or_else(|| AppError::UnknownTask {
            project: label.clone(),
            task_no,
        })?;
        render_task_timeline(&label, &compute_task_timeline(task, today), today);
        return Ok(());
    }

    let dashboard = ProjectDashboard::build(&label, &tasks, today, assignee.as_deref());
    render_dashboard(&dashboard, &source);
    if list_tasks {
        render_task_listing(&dashboard, &tasks);
    }

    Ok(())
}

pub(crate) fn run_overview(args: OverviewArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    if config.projects.is_empty() {
        println!("No projects configured (set APP_PROJECTS to Label=path entries)");
        return Ok(());
    }

    let loader = shared_loader();
    println!("Project overview (evaluated {today})");
    for entry in config.projects.entries() {
        match loader.load_tasks(&entry.source) {
            Ok(tasks) => {
                let summary = summarize(tasks.tasks(), &entry.label, today);
                println!(
                    "- {}: {} tasks | {} completed | {} in progress | {} not started | {:.1}% avg progress | {} overdue",
                    summary.project,
                    summary.total_tasks,
                    summary.completed,
                    summary.in_progress,
                    summary.not_started,
                    summary.average_progress,
                    summary.overdue_tasks
                );
            }
            Err(err) => println!("- {}: unavailable ({})", entry.label, err),
        }
    }

    Ok(())
}

pub(crate) fn run_projects() -> Result<(), AppError> {
    let config = bootstrap()?;

    if config.projects.is_empty() {
        println!("No projects configured (set APP_PROJECTS to Label=path entries)");
        return Ok(());
    }

    println!("Configured projects");
    for entry in config.projects.entries() {
        println!("- {} -> {}", entry.label, entry.source);
    }
    Ok(())
}

fn render_dashboard(dashboard: &ProjectDashboard, source: &SourceId) {
    let summary = &dashboard.summary;

    println!("Task dashboard: {}", dashboard.project);
    println!("Data source: {source}");
    match &dashboard.assignee {
        Some(name) => println!("Evaluated {} | Assignee filter: {}", dashboard.today, name),
        None => println!("Evaluated {} | Assignee filter: All", dashboard.today),
    }

    println!("\nSummary");
    println!(
        "- {} tasks | {} completed ({}%) | {} overdue",
        summary.total_tasks, summary.completed, dashboard.completion_rate, summary.overdue_tasks
    );
    println!("- Average progress {:.1}%", summary.average_progress);

    if !dashboard.status_breakdown.is_empty() {
        println!("\nStatus breakdown");
        for entry in &dashboard.status_breakdown {
            println!("- {}: {}", entry.status_label, entry.count);
        }
    }

    if !dashboard.assignee_load.is_empty() {
        println!("\nAssignee workload");
        for load in &dashboard.assignee_load {
            let name = if load.assignees.is_empty() {
                "Unassigned"
            } else {
                load.assignees.as_str()
            };
            println!(
                "- {}: {} tasks, {} open, {} overdue, {:.0}% avg progress",
                name, load.total, load.open, load.overdue, load.average_progress
            );
        }
    }

    if dashboard.overdue_tasks.is_empty() {
        println!("\nOverdue tasks: none");
    } else {
        println!("\nOverdue tasks");
        for task in &dashboard.overdue_tasks {
            println!(
                "- #{} {} | due {} ({} days late) | {} | {}",
                task.task_no,
                task.title,
                task.end_date,
                task.days_overdue,
                task.status_label,
                task.assignees
            );
        }
    }

    if dashboard.alerts.is_empty() {
        println!("\nAlerts: none");
    } else {
        println!(
            "\nAlerts ({} critical)",
            dashboard.critical_alerts()
        );
        for alert in &dashboard.alerts {
            println!(
                "- [{}] #{} {} ({}%): {}",
                alert.severity_label, alert.task_no, alert.title, alert.progress, alert.message
            );
        }
    }
}

fn render_task_listing(dashboard: &ProjectDashboard, tasks: &TaskSet) {
    println!("\nTask timelines");
    for timeline in &dashboard.timelines {
        let remarks = tasks
            .find(timeline.task_no)
            .and_then(|task| task.remarks.as_deref())
            .map(|remarks| format!(" | {remarks}"))
            .unwrap_or_default();
        println!(
            "- #{} {} | {} | {}% ({}) | {}{}",
            timeline.task_no,
            timeline.title,
            timeline.status_text,
            timeline.completion_rate,
            timeline.progress_band.label(),
            timeline.deadline_label,
            remarks
        );
    }
}

fn render_task_timeline(project: &str, timeline: &TaskTimeline, today: NaiveDate) {
    println!("Task #{} in {}: {}", timeline.task_no, project, timeline.title);
    println!("Evaluated {today}");
    println!("Status: {}", timeline.status_text);
    println!(
        "Assignees: {}",
        if timeline.assignees.is_empty() {
            "Unassigned"
        } else {
            timeline.assignees.as_str()
        }
    );

    match (timeline.start_date, timeline.end_date) {
        (Some(start), Some(end)) => println!("Window: {start} -> {end}"),
        (Some(start), None) => println!("Window: {start} -> ?"),
        (None, Some(end)) => println!("Window: ? -> {end}"),
        (None, None) => println!("Window: not scheduled"),
    }

    println!(
        "Completion: {}% ({})",
        timeline.completion_rate,
        timeline.progress_band.label()
    );
    println!("Deadline: {}", timeline.deadline_label);

    match (timeline.elapsed_fraction, timeline.risk_band, timeline.issue) {
        (Some(fraction), Some(risk), _) => println!(
            "Timeline: {:.0}% elapsed ({})",
            fraction * 100.0,
            risk.label()
        ),
        (_, _, Some(issue)) => println!("Timeline unavailable: {}", issue.label()),
        _ => {}
    }
}
