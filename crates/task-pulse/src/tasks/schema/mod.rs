//! Validation and coercion of raw sheet rows into canonical [`Task`] records.

mod coerce;

use super::domain::{Task, TaskSet, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

pub const TASK_NO_COLUMN: &str = "Task No";
pub const TITLE_COLUMN: &str = "Task";
pub const STATUS_COLUMN: &str = "Status";
pub const PROGRESS_COLUMN: &str = "Progress";
pub const START_DATE_COLUMN: &str = "Start date";
pub const END_DATE_COLUMN: &str = "End date";
pub const ASSIGNEES_COLUMN: &str = "Assignees";
pub const REMARKS_COLUMN: &str = "Remarks";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    TASK_NO_COLUMN,
    TITLE_COLUMN,
    STATUS_COLUMN,
    PROGRESS_COLUMN,
    START_DATE_COLUMN,
    END_DATE_COLUMN,
    ASSIGNEES_COLUMN,
    REMARKS_COLUMN,
];

static EMPTY_CELL: RawValue = RawValue::Empty;

/// Loosely-typed cell as read from a delimited file or a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawValue>>) -> Self {
        Self { columns, rows }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.trim() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryField {
    TaskNo,
    Title,
    Status,
}

impl MandatoryField {
    pub const fn column(self) -> &'static str {
        match self {
            Self::TaskNo => TASK_NO_COLUMN,
            Self::Title => TITLE_COLUMN,
            Self::Status => STATUS_COLUMN,
        }
    }
}

/// One empty or unparsable mandatory cell; `row` counts data rows from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityViolation {
    pub row: usize,
    pub field: MandatoryField,
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} ({})", self.row, self.field.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid or missing data in 'Task No', 'Task', or 'Status': {}", render_violations(.violations))]
pub struct DataIntegrityError {
    pub violations: Vec<IntegrityViolation>,
}

fn render_violations(violations: &[IntegrityViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}

struct ColumnMap {
    task_no: usize,
    title: usize,
    status: usize,
    progress: usize,
    start_date: usize,
    end_date: usize,
    assignees: usize,
    remarks: usize,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self, SchemaError> {
        let indices: Vec<Option<usize>> = REQUIRED_COLUMNS
            .iter()
            .map(|column| table.column_index(column))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&indices)
            .filter(|(_, index)| index.is_none())
            .map(|(column, _)| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError { missing });
        }

        let resolved: Vec<usize> = indices.into_iter().flatten().collect();
        Ok(Self {
            task_no: resolved[0],
            title: resolved[1],
            status: resolved[2],
            progress: resolved[3],
            start_date: resolved[4],
            end_date: resolved[5],
            assignees: resolved[6],
            remarks: resolved[7],
        })
    }
}

fn cell(row: &[RawValue], index: usize) -> &RawValue {
    row.get(index).unwrap_or(&EMPTY_CELL)
}

/// Turns a raw table into a [`TaskSet`].
///
/// Missing columns fail the whole table with [`SchemaError`]; rows with an empty or
/// unparsable task number, title or status fail it with [`DataIntegrityError`] listing
/// every offending cell. Bad progress values become 0 and bad dates become `None`.
pub fn normalize(table: &RawTable) -> Result<TaskSet, NormalizeError> {
    let columns = ColumnMap::resolve(table)?;
    let mut tasks = Vec::with_capacity(table.rows.len());
    let mut violations = Vec::new();
    let mut seen_task_numbers = HashSet::new();

    for (index, row) in table.rows.iter().enumerate() {
        let row_no = index + 1;
        let task_no = coerce::integer(cell(row, columns.task_no));
        let title = coerce::text(cell(row, columns.title));
        let status_text = coerce::text(cell(row, columns.status));

        let mandatory = [
            (MandatoryField::TaskNo, task_no.is_some()),
            (MandatoryField::Title, title.is_some()),
            (MandatoryField::Status, status_text.is_some()),
        ];
        for (field, present) in mandatory {
            if !present {
                violations.push(IntegrityViolation { row: row_no, field });
            }
        }

        let (Some(task_no), Some(title), Some(status_text)) = (task_no, title, status_text)
        else {
            continue;
        };

        if !seen_task_numbers.insert(task_no) {
            warn!(task_no, row = row_no, "duplicate task number in source");
        }

        let progress_cell = cell(row, columns.progress);
        let progress = coerce::progress(progress_cell).unwrap_or_else(|| {
            if *progress_cell != RawValue::Empty {
                debug!(task_no, value = ?progress_cell, "progress not numeric, using 0");
            }
            0
        });

        tasks.push(Task {
            task_no,
            title,
            status: TaskStatus::parse(&status_text),
            status_text,
            progress,
            start_date: date_field(row, columns.start_date, task_no, START_DATE_COLUMN),
            end_date: date_field(row, columns.end_date, task_no, END_DATE_COLUMN),
            assignees: coerce::text(cell(row, columns.assignees)).unwrap_or_default(),
            remarks: coerce::text(cell(row, columns.remarks)),
        });
    }

    if !violations.is_empty() {
        return Err(DataIntegrityError { violations }.into());
    }

    Ok(TaskSet::new(tasks))
}

fn date_field(row: &[RawValue], index: usize, task_no: i64, column: &str) -> Option<NaiveDate> {
    let raw = cell(row, index);
    let parsed = coerce::date(raw);
    if parsed.is_none() && *raw != RawValue::Empty {
        debug!(task_no, column, value = ?raw, "unparsable date, leaving it empty");
    }
    parsed
}
