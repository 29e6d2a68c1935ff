use super::delimited::{header_name, text_cell};
use super::LoadError;
use crate::tasks::schema::{RawTable, RawValue};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Reads the first worksheet; its first row holds the column names.
pub(crate) fn read_table(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::EmptyWorkbook(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::default());
    };

    let columns = header.iter().map(column_name).collect();
    let rows = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| *cell != RawValue::Empty))
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn column_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(name) => header_name(name),
        other => header_name(&other.to_string()),
    }
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Empty,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text_cell(text),
        Data::Int(value) => RawValue::Number(*value as f64),
        Data::Float(value) => RawValue::Number(*value),
        Data::Bool(value) => RawValue::Text(value.to_string()),
        Data::DateTime(value) => value
            .as_datetime()
            .map(RawValue::DateTime)
            .unwrap_or(RawValue::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cells_map_to_raw_values() {
        assert_eq!(cell_value(&Data::Int(7)), RawValue::Number(7.0));
        assert_eq!(cell_value(&Data::Float(42.5)), RawValue::Number(42.5));
        assert_eq!(
            cell_value(&Data::String("In Progress".to_string())),
            RawValue::Text("In Progress".to_string())
        );
        assert_eq!(cell_value(&Data::String("#N/A".to_string())), RawValue::Empty);
        assert_eq!(cell_value(&Data::Empty), RawValue::Empty);
    }

    #[test]
    fn header_cells_are_trimmed() {
        assert_eq!(column_name(&Data::String(" Task No ".to_string())), "Task No");
        assert_eq!(column_name(&Data::Empty), "");
    }
}
