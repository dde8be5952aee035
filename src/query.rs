/// Keyword search and column sort.
///
/// Both operations are copy-on-transform: they read the input table and
/// return a new RecordTable holding their own copies of the rows. The input
/// is never modified, so a caller can keep the previous table around and it
/// stays valid.

use crate::error::Result;
use crate::table::{RecordTable, Row};
use crate::value::ColumnValue;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction for `QueryEngine::sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    #[default]
    Ascending,
    /// Descending order (largest first)
    Descending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// How the values of the sort column are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortDomain {
    Numeric,
    Chronological,
    Lexicographic,
}

/// A precomputed comparison key for one cell.
#[derive(Debug)]
enum SortValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            // One domain per column, so mixed keys never meet.
            _ => Ordering::Equal,
        }
    }
}

pub struct QueryEngine;

impl QueryEngine {
    /// Keep the rows for which `predicate` returns true, in their original order.
    pub fn filter<F>(table: &RecordTable, predicate: F) -> RecordTable
    where
        F: Fn(&Row) -> bool,
    {
        let rows: Vec<Row> = table
            .all_rows()
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect();
        table.with_rows(rows)
    }

    /// Case-insensitive substring search over the given columns.
    ///
    /// An empty `columns` slice searches every column. A row matches when any
    /// selected cell's display text contains `keyword`. An empty keyword
    /// matches every row.
    pub fn search<S: AsRef<str>>(table: &RecordTable, columns: &[S], keyword: &str) -> Result<RecordTable> {
        let selected: Vec<String> = if columns.is_empty() {
            table.columns().to_vec()
        } else {
            let mut selected = Vec::with_capacity(columns.len());
            for column in columns {
                let column = column.as_ref();
                table.require_column(column)?;
                selected.push(column.to_string());
            }
            selected
        };

        let needle = keyword.to_lowercase();
        let result = Self::filter(table, |row| {
            selected.iter().any(|column| {
                row.get(column)
                    .map(|v| v.to_string().to_lowercase().contains(&needle))
                    .unwrap_or(needle.is_empty())
            })
        });
        debug!(
            "search '{}' over {} column(s): {} of {} rows",
            keyword,
            selected.len(),
            result.row_count(),
            table.row_count()
        );
        Ok(result)
    }

    /// Stable sort of all rows by one column.
    ///
    /// Numeric columns (including numeric-looking strings) compare as
    /// numbers, date columns chronologically, anything else by display text.
    /// Missing cells go last in either direction. Rows with equal keys keep
    /// their relative order.
    pub fn sort(table: &RecordTable, column: &str, order: SortOrder) -> Result<RecordTable> {
        table.require_column(column)?;
        let domain = Self::sort_domain(table, column);

        let mut keyed: Vec<(Option<SortValue>, &Row)> = table
            .all_rows()
            .iter()
            .map(|row| {
                let key = row.get(column).and_then(|v| Self::sort_value(v, domain));
                (key, row)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => match order {
                SortOrder::Ascending => a.compare(b),
                SortOrder::Descending => b.compare(a),
            },
        });

        debug!("sort by '{}' ({:?}, {:?})", column, domain, order);
        let rows = keyed.into_iter().map(|(_, row)| row.clone()).collect();
        Ok(table.with_rows(rows))
    }

    fn sort_domain(table: &RecordTable, column: &str) -> SortDomain {
        let mut numeric = true;
        let mut dates = true;
        let mut any = false;

        for value in table.column_values(column).filter(|v| !v.is_blank()) {
            any = true;
            if value.numeric_key().is_none() {
                numeric = false;
            }
            if value.as_date().is_none() {
                dates = false;
            }
            if !numeric && !dates {
                break;
            }
        }

        match (any, numeric, dates) {
            (true, true, _) => SortDomain::Numeric,
            (true, _, true) => SortDomain::Chronological,
            _ => SortDomain::Lexicographic,
        }
    }

    fn sort_value(value: &ColumnValue, domain: SortDomain) -> Option<SortValue> {
        if value.is_blank() {
            return None;
        }
        match domain {
            SortDomain::Numeric => value.numeric_key().map(SortValue::Number),
            SortDomain::Chronological => value.as_date().map(SortValue::Date),
            SortDomain::Lexicographic => Some(SortValue::Text(value.to_string())),
        }
    }
}
