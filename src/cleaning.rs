/// Data-cleaning pipeline.
///
/// A `CleaningConfig` switches individual passes on or off. Enabled passes
/// always run in the same order:
///
/// 1. missing-value imputation
/// 2. deduplication
/// 3. case standardisation
/// 4. date coercion
///
/// The pipeline never fails on bad data. Cells it cannot fix are replaced by
/// a sentinel and counted in the `CleaningReport`. The only error is being
/// asked to clean when no table is loaded.
///
/// # Examples
///
/// ```
/// use casetable::{CleaningConfig, CleaningPipeline, ColumnValue, RecordTable, Row};
///
/// let columns = vec!["country".to_string(), "cases".to_string()];
/// let mut table = RecordTable::new(columns);
/// for country in ["Vietnam", "vietnam "] {
///     let mut row = Row::new();
///     row.insert("country".to_string(), ColumnValue::from(country));
///     row.insert("cases".to_string(), ColumnValue::from("10"));
///     table.add(row);
/// }
///
/// let pipeline = CleaningPipeline::new(CleaningConfig::default());
/// let (cleaned, report) = pipeline.clean(Some(&table)).unwrap();
/// assert_eq!(cleaned.row_count(), 1);
/// assert_eq!(cleaned.value(0, "country").unwrap().as_string(), Some("vietnam"));
/// assert_eq!(report.duplicate_rows, 1);
/// ```

use crate::dates::{is_date_column, parse_date, EPOCH_SENTINEL};
use crate::error::{Result, TableError};
use crate::table::{RecordTable, Row};
use crate::value::{ColumnValue, ValueKind};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Literal used to fill missing cells in text columns.
pub const UNKNOWN_MARKER: &str = "unknown";

/// Which cleaning passes to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub impute_missing: bool,
    pub remove_duplicates: bool,
    pub standardize_case: bool,
    pub coerce_dates: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        CleaningConfig {
            impute_missing: true,
            remove_duplicates: true,
            standardize_case: true,
            coerce_dates: true,
        }
    }
}

impl CleaningConfig {
    /// A config with every pass disabled; enable passes with the `with_*` methods.
    pub fn none() -> Self {
        CleaningConfig {
            impute_missing: false,
            remove_duplicates: false,
            standardize_case: false,
            coerce_dates: false,
        }
    }

    pub fn with_imputation(mut self, enabled: bool) -> Self {
        self.impute_missing = enabled;
        self
    }

    pub fn with_deduplication(mut self, enabled: bool) -> Self {
        self.remove_duplicates = enabled;
        self
    }

    pub fn with_case_standardization(mut self, enabled: bool) -> Self {
        self.standardize_case = enabled;
        self
    }

    pub fn with_date_coercion(mut self, enabled: bool) -> Self {
        self.coerce_dates = enabled;
        self
    }
}

/// Diagnostic counts from a cleaning run or an inspection.
///
/// `duplicate_rows` is only computed when deduplication is enabled and
/// `date_failures` only when date coercion is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: usize,
    /// Missing cells before cleaning.
    pub missing_cells: usize,
    pub duplicate_rows: usize,
    /// Unparseable values per date column. Columns without failures are absent.
    /// Only cells that held a value before cleaning are counted, so `clean`
    /// and `inspect` agree.
    pub date_failures: BTreeMap<String, usize>,
}

impl CleaningReport {
    pub fn total_date_failures(&self) -> usize {
        self.date_failures.values().sum()
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// True when no issue of any kind was counted.
    pub fn is_clean(&self) -> bool {
        self.missing_cells == 0 && self.duplicate_rows == 0 && self.total_date_failures() == 0
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total rows: {}", self.rows_before)?;
        writeln!(f, "Total columns: {}", self.columns)?;
        writeln!(f, "Missing cells: {}", self.missing_cells)?;
        writeln!(f, "Duplicate rows: {}", self.duplicate_rows)?;
        if self.date_failures.is_empty() {
            writeln!(f, "No date format errors.")?;
        } else {
            writeln!(f, "Date columns with format errors:")?;
            for (column, count) in &self.date_failures {
                writeln!(f, "  {} ({} invalid values)", column, count)?;
            }
        }
        write!(f, "Rows after cleaning: {}", self.rows_after)
    }
}

pub struct CleaningPipeline {
    config: CleaningConfig,
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}

impl CleaningPipeline {
    pub fn new(config: CleaningConfig) -> Self {
        CleaningPipeline { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run the enabled passes and return the cleaned table with its report.
    ///
    /// The input table is left untouched.
    pub fn clean(&self, table: Option<&RecordTable>) -> Result<(RecordTable, CleaningReport)> {
        let table = table.ok_or(TableError::NoTable)?;
        let columns = table.columns();

        let mut report = CleaningReport {
            rows_before: table.row_count(),
            columns: columns.len(),
            missing_cells: table.missing_count(),
            ..CleaningReport::default()
        };

        let mut rows = table.all_rows().to_vec();

        if self.config.impute_missing {
            self.impute_missing(table, &mut rows);
        }
        if self.config.remove_duplicates {
            let before = rows.len();
            rows = self.remove_duplicates(columns, rows);
            report.duplicate_rows = before - rows.len();
        }
        if self.config.standardize_case {
            standardize_case(columns, &mut rows);
        }
        if self.config.coerce_dates {
            report.date_failures = coerce_dates(columns, &mut rows);
        }

        report.rows_after = rows.len();
        info!(
            "cleaned table: {} -> {} rows, {} missing, {} duplicates, {} bad dates",
            report.rows_before,
            report.rows_after,
            report.missing_cells,
            report.duplicate_rows,
            report.total_date_failures()
        );
        Ok((table.with_rows(rows), report))
    }

    /// Count the issues the enabled passes would address, without cleaning.
    pub fn inspect(&self, table: Option<&RecordTable>) -> Result<CleaningReport> {
        let table = table.ok_or(TableError::NoTable)?;
        let columns = table.columns();

        let mut report = CleaningReport {
            rows_before: table.row_count(),
            rows_after: table.row_count(),
            columns: columns.len(),
            missing_cells: table.missing_count(),
            ..CleaningReport::default()
        };

        if self.config.remove_duplicates {
            let mut seen = HashSet::new();
            report.duplicate_rows = table
                .all_rows()
                .iter()
                .filter(|row| !seen.insert(self.identity(columns, row)))
                .count();
        }
        if self.config.coerce_dates {
            for column in columns.iter().filter(|c| is_date_column(c)) {
                let failures = table
                    .column_values(column)
                    .filter(|v| coerce_date(v).1)
                    .count();
                if failures > 0 {
                    report.date_failures.insert(column.clone(), failures);
                }
            }
        }
        Ok(report)
    }

    /// Fill missing cells column by column according to the column's kind.
    ///
    /// Runs first, so `table` still describes `rows` exactly.
    fn impute_missing(&self, table: &RecordTable, rows: &mut [Row]) {
        for column in table.columns() {
            if !table.column_values(column).any(ColumnValue::is_null) {
                continue;
            }

            let fill = match self.imputation_kind(table, column) {
                ValueKind::Numeric => match table.mean(column) {
                    Ok(Some(mean)) => ColumnValue::Float64(mean),
                    _ => continue,
                },
                ValueKind::Date => ColumnValue::Date(EPOCH_SENTINEL),
                // Date coercion would turn the text marker into an invalid date
                // anyway; filling the marker directly keeps the cell out of
                // the parse-failure count.
                ValueKind::Text if self.config.coerce_dates && is_date_column(column) => {
                    ColumnValue::InvalidDate
                }
                ValueKind::Text => ColumnValue::String(UNKNOWN_MARKER.to_string()),
                ValueKind::Empty => {
                    debug!("impute: column '{}' has no values, leaving it missing", column);
                    continue;
                }
            };

            for row in rows.iter_mut() {
                let cell = row.entry(column.clone()).or_insert(ColumnValue::Null);
                if cell.is_null() {
                    *cell = fill.clone();
                }
            }
        }
    }

    /// Column kind for imputation. A date-named text column whose values all
    /// parse as dates counts as a date column when date coercion will run.
    fn imputation_kind(&self, table: &RecordTable, column: &str) -> ValueKind {
        let kind = table.column_kind(column).unwrap_or(ValueKind::Empty);
        if kind == ValueKind::Text && self.config.coerce_dates && is_date_column(column) {
            let all_dates = table
                .column_values(column)
                .filter(|v| !v.is_null())
                .all(|v| !coerce_date(v).1);
            if all_dates {
                return ValueKind::Date;
            }
        }
        kind
    }

    /// Drop rows whose cleaned form equals an earlier row's, keeping the first.
    fn remove_duplicates(&self, columns: &[String], rows: Vec<Row>) -> Vec<Row> {
        let mut seen = HashSet::new();
        rows.into_iter()
            .filter(|row| seen.insert(self.identity(columns, row)))
            .collect()
    }

    /// Comparison key for a row as it will look after the later passes.
    fn identity(&self, columns: &[String], row: &Row) -> Vec<String> {
        columns
            .iter()
            .map(|column| {
                let mut value = row.get(column).cloned().unwrap_or(ColumnValue::Null);
                if self.config.standardize_case {
                    value = standardize_value(value);
                }
                if self.config.coerce_dates && is_date_column(column) {
                    value = coerce_date(&value).0;
                }
                value.identity_key()
            })
            .collect()
    }
}

fn standardize_value(value: ColumnValue) -> ColumnValue {
    match value {
        ColumnValue::String(s) => ColumnValue::String(s.trim().to_lowercase()),
        other => other,
    }
}

/// Trim and lowercase every string cell of every text column.
fn standardize_case(columns: &[String], rows: &mut [Row]) {
    for column in columns {
        let is_text = rows
            .iter()
            .any(|row| matches!(row.get(column), Some(ColumnValue::String(_))));
        if !is_text {
            continue;
        }
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(column) {
                let value = std::mem::replace(cell, ColumnValue::Null);
                *cell = standardize_value(value);
            }
        }
    }
}

/// Coerce one cell to a date. The flag is true when the cell was a new parse
/// failure.
fn coerce_date(value: &ColumnValue) -> (ColumnValue, bool) {
    match value {
        ColumnValue::Date(_) | ColumnValue::InvalidDate | ColumnValue::Null => (value.clone(), false),
        ColumnValue::String(s) => match parse_date(s) {
            Some(date) => (ColumnValue::Date(date), false),
            None => (ColumnValue::InvalidDate, true),
        },
        ColumnValue::Int64(_) | ColumnValue::Float64(_) => (ColumnValue::InvalidDate, true),
    }
}

/// Parse every cell of date-named columns, returning failures per column.
fn coerce_dates(columns: &[String], rows: &mut [Row]) -> BTreeMap<String, usize> {
    let mut failures = BTreeMap::new();
    for column in columns.iter().filter(|c| is_date_column(c)) {
        let mut failed = 0;
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(column) {
                let (coerced, is_failure) = coerce_date(cell);
                if is_failure {
                    failed += 1;
                }
                *cell = coerced;
            }
        }
        if failed > 0 {
            debug!("coerce_dates: {} unparseable value(s) in '{}'", failed, column);
            failures.insert(column.clone(), failed);
        }
    }
    failures
}
