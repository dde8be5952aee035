/// CSV import/export and JSON rendering for record tables.
///
/// Import infers a type per cell rather than per column, so a column may
/// arrive mixed. That is the raw state the cleaning pipeline expects.

use crate::dates::parse_iso_date;
use crate::error::{Result, TableError};
use crate::table::{ensure_unique, RecordTable, Row};
use crate::value::ColumnValue;
use log::{info, warn};
use serde_json::{Map, Value as JsonValue};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Columns of the empty table handed out when a dataset cannot be read.
pub const FALLBACK_COLUMNS: [&str; 3] = ["date", "province", "cases"];

/// Tokens read as a missing cell.
const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

/// Infer a cell value from its raw CSV text.
///
/// Integers and floats are detected first, then strict `YYYY-MM-DD` dates.
/// Anything else stays text, untrimmed, so the cleaning pipeline sees the
/// value as it was written.
pub fn parse_cell(raw: &str) -> ColumnValue {
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return ColumnValue::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return ColumnValue::Int64(n);
    }
    // Requiring a digit keeps "inf" and "infinity" as text.
    if trimmed.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = trimmed.parse::<f64>() {
            return ColumnValue::Float64(f);
        }
    }
    if let Some(date) = parse_iso_date(trimmed) {
        return ColumnValue::Date(date);
    }
    ColumnValue::String(raw.to_string())
}

/// Read a table from CSV. The first record is the header row.
///
/// Short records are padded with missing cells and blank lines are skipped.
pub fn read_csv<R: Read>(reader: R) -> Result<RecordTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(TableError::EmptyCsv);
    }
    ensure_unique(&columns)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row: Row = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), parse_cell(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(row);
    }

    Ok(RecordTable::from_rows(columns, rows))
}

/// Load a CSV file, falling back to an empty table on any failure.
///
/// The failure is logged; the returned table has `fallback_columns` and no
/// rows so a display still has something to show.
pub fn load_csv<P: AsRef<Path>, S: AsRef<str>>(path: P, fallback_columns: &[S]) -> RecordTable {
    let path = path.as_ref();
    match File::open(path).map_err(TableError::from).and_then(read_csv) {
        Ok(table) => {
            info!(
                "loaded {} rows x {} columns from {}",
                table.row_count(),
                table.columns().len(),
                path.display()
            );
            table
        }
        Err(e) => {
            warn!("could not load {}: {}; using empty table", path.display(), e);
            RecordTable::new(fallback_columns.iter().map(|c| c.as_ref().to_string()).collect())
        }
    }
}

/// Write the table as CSV: header row, then one record per row in column
/// order. Missing cells and invalid dates are written empty.
pub fn write_csv<W: Write>(table: &RecordTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.all_rows() {
        wtr.write_record(
            table
                .columns()
                .iter()
                .map(|column| row.get(column).map(ColumnValue::to_string).unwrap_or_default()),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(table: &RecordTable, path: P) -> Result<()> {
    let path = path.as_ref();
    write_csv(table, File::create(path)?)?;
    info!("saved {} rows to {}", table.row_count(), path.display());
    Ok(())
}

/// Render the table as a pretty-printed JSON array of row objects.
pub fn to_json(table: &RecordTable) -> Result<String> {
    let rows: Vec<JsonValue> = table
        .all_rows()
        .iter()
        .map(|row| {
            let object: Map<String, JsonValue> = table
                .columns()
                .iter()
                .map(|column| {
                    let value = row.get(column).map_or(JsonValue::Null, column_value_to_json);
                    (column.clone(), value)
                })
                .collect();
            JsonValue::Object(object)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn column_value_to_json(value: &ColumnValue) -> JsonValue {
    match value {
        ColumnValue::String(s) => JsonValue::String(s.clone()),
        ColumnValue::Int64(n) => JsonValue::from(*n),
        ColumnValue::Float64(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        ColumnValue::Date(_) => JsonValue::String(value.to_string()),
        ColumnValue::InvalidDate | ColumnValue::Null => JsonValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write as _;

    const SAMPLE: &str = "date,province,cases\n\
2020-03-01,Hanoi,12\n\
2020-03-02, Ho Chi Minh ,3.5\n\
03/04/2020,Da Nang,\n\
\n\
2020-03-05,Hue\n";

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("42"), ColumnValue::Int64(42));
        assert_eq!(parse_cell(" 2.5 "), ColumnValue::Float64(2.5));
        assert_eq!(parse_cell("NaN"), ColumnValue::Null);
        assert_eq!(parse_cell("  "), ColumnValue::Null);
        assert_eq!(parse_cell("inf"), ColumnValue::from("inf"));
        assert_eq!(
            parse_cell("2020-01-02"),
            ColumnValue::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
        );
        // Only ISO dates are recognised on import.
        assert_eq!(parse_cell("01/02/2020"), ColumnValue::from("01/02/2020"));
        assert_eq!(parse_cell(" Hanoi "), ColumnValue::from(" Hanoi "));
    }

    #[test]
    fn test_read_csv() {
        let table = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["date", "province", "cases"]);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.value(0, "cases").unwrap(), &ColumnValue::Int64(12));
        assert_eq!(table.value(1, "province").unwrap(), &ColumnValue::from(" Ho Chi Minh "));
        assert_eq!(table.value(1, "cases").unwrap(), &ColumnValue::Float64(3.5));
        assert_eq!(table.value(2, "date").unwrap(), &ColumnValue::from("03/04/2020"));
        assert!(table.value(2, "cases").unwrap().is_null());
        // Short record padded.
        assert!(table.value(3, "cases").unwrap().is_null());
    }

    #[test]
    fn test_read_csv_empty_input() {
        assert!(matches!(read_csv("".as_bytes()), Err(TableError::EmptyCsv)));
    }

    #[test]
    fn test_read_csv_repeated_header() {
        let err = read_csv("date,cases,cases\n2020-03-01,1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(ref c) if c == "cases"));
    }

    #[test]
    fn test_load_csv_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_csv(dir.path().join("missing.csv"), &FALLBACK_COLUMNS);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["date", "province", "cases"]);
    }

    #[test]
    fn test_save_and_load() {
        let original = read_csv(SAMPLE.as_bytes()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write_csv(&original, file.as_file_mut()).unwrap();
        file.as_file_mut().flush().unwrap();

        let loaded = load_csv(file.path(), &FALLBACK_COLUMNS);
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_write_csv_blanks_missing() {
        let mut table = RecordTable::new(vec!["a".to_string(), "b".to_string()]);
        let mut row = Row::new();
        row.insert("a".to_string(), ColumnValue::InvalidDate);
        row.insert("b".to_string(), ColumnValue::from("x, y"));
        table.add(row);

        let mut out = Vec::new();
        write_csv(&table, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\n,\"x, y\"\n");
    }

    #[test]
    fn test_to_json() {
        let table = read_csv("province,cases\nHanoi,3\nHue,\n".as_bytes()).unwrap();
        let parsed: JsonValue = serde_json::from_str(&to_json(&table).unwrap()).unwrap();
        assert_eq!(parsed[0]["province"], "Hanoi");
        assert_eq!(parsed[0]["cases"], 3);
        assert!(parsed[1]["cases"].is_null());
    }
}
