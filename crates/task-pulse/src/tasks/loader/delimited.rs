use crate::tasks::schema::{RawTable, RawValue};
use std::io::Read;
use tracing::warn;

/// Cell texts read as missing values, matching what spreadsheet exports commonly emit.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub(crate) fn text_cell(raw: &str) -> RawValue {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        RawValue::Empty
    } else {
        RawValue::Text(trimmed.to_string())
    }
}

pub(crate) fn header_name(raw: &str) -> String {
    raw.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Reads a delimited table. Rows carrying more fields than the header are skipped
/// with a warning; shorter rows are kept and padded later by the normalizer.
pub(crate) fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<RawTable, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader.headers()?.iter().map(header_name).collect();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        if record.len() > columns.len() {
            warn!(
                line = ?record.position().map(|position| position.line()),
                fields = record.len(),
                expected = columns.len(),
                "skipping malformed row"
            );
            continue;
        }

        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_become_empty_cells() {
        assert_eq!(text_cell("  "), RawValue::Empty);
        assert_eq!(text_cell("NaN"), RawValue::Empty);
        assert_eq!(text_cell("n/a"), RawValue::Empty);
        assert_eq!(text_cell(" Asha "), RawValue::Text("Asha".to_string()));
    }

    #[test]
    fn overlong_rows_are_skipped() {
        let csv = "\u{feff}Task No,Task\n1,Plan\n2,Build,extra\n3\n";
        let table = read_table(csv.as_bytes(), b',').expect("csv parses");

        assert_eq!(table.columns, vec!["Task No", "Task"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec![RawValue::Text("3".to_string())]);
    }

    #[test]
    fn tab_delimited_input_is_supported() {
        let tsv = "Task No\tTask\n1\tPlan, then build\n";
        let table = read_table(tsv.as_bytes(), b'\t').expect("tsv parses");
        assert_eq!(
            table.rows[0][1],
            RawValue::Text("Plan, then build".to_string())
        );
    }
}
