/// RecordTable: the in-memory table of case records.
///
/// A RecordTable is an ordered list of rows sharing one column schema. Row
/// position is the only addressing mechanism: the 0-based index a caller got
/// from a page is what it passes back to `update` and `delete`. Inserting or
/// deleting shifts every later position, so callers recompute indices after
/// a structural mutation.
///
/// # Examples
///
/// ```
/// use casetable::{ColumnValue, RecordTable, Row};
///
/// let mut table = RecordTable::new(vec!["country".to_string(), "cases".to_string()]);
///
/// let mut row = Row::new();
/// row.insert("country".to_string(), ColumnValue::from("Vietnam"));
/// row.insert("cases".to_string(), ColumnValue::Int64(10));
/// table.add(row);
///
/// assert_eq!(table.row_count(), 1);
/// assert_eq!(table.value(0, "country").unwrap().as_string(), Some("Vietnam"));
/// ```

use crate::error::{Result, TableError};
use crate::value::{classify, ColumnValue, ValueKind};
use log::debug;
use std::collections::{BTreeSet, HashMap, HashSet};

static NULL_VALUE: ColumnValue = ColumnValue::Null;

/// One record: column name to value.
pub type Row = HashMap<String, ColumnValue>;

/// Ordered rows plus the column schema they share.
///
/// Search, sort and clean never touch a table in place; they build a new one.
/// Only `add`, `update`, `delete` and the schema helpers mutate, and each of
/// them bumps `revision` so displays can tell their cached pages are stale.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    revision: u64,
}

impl RecordTable {
    /// Create an empty, schema-only table.
    pub fn new(columns: Vec<String>) -> Self {
        RecordTable {
            columns,
            rows: Vec::new(),
            revision: 0,
        }
    }

    /// Create a table over existing rows.
    ///
    /// Every row is normalised to the schema: absent columns become `Null`
    /// and keys outside the schema are dropped.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| conform_row(&columns, row))
            .collect();
        RecordTable {
            columns,
            rows,
            revision: 0,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in current order.
    pub fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutation counter; changes after every add/update/delete.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fail with `UnknownColumn` unless `column` is in the schema.
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(TableError::UnknownColumn(column.to_string()))
        }
    }

    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(TableError::RowOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    pub fn value(&self, index: usize, column: &str) -> Result<&ColumnValue> {
        self.require_column(column)?;
        let row = self.row(index)?;
        Ok(row.get(column).unwrap_or(&NULL_VALUE))
    }

    /// Iterate one column's cells in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a ColumnValue> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&NULL_VALUE))
    }

    /// Append a row. Missing columns default to `Null`.
    ///
    /// Keys that are not in the schema are accepted but not stored; widen the
    /// schema first with `add_column` to keep them.
    pub fn add(&mut self, record: Row) {
        let dropped = record.keys().filter(|k| !self.has_column(k)).count();
        if dropped > 0 {
            debug!("add: ignoring {} value(s) outside the schema", dropped);
        }
        let row = conform_row(&self.columns, record);
        self.rows.push(row);
        self.revision += 1;
    }

    /// Set each column named in `record` on the row at `index`.
    ///
    /// Columns not named in `record` keep their values. Nothing is written
    /// unless the index and every column name are valid.
    pub fn update(&mut self, index: usize, record: Row) -> Result<()> {
        let len = self.rows.len();
        if index >= len {
            return Err(TableError::RowOutOfRange { index, len });
        }
        for column in record.keys() {
            self.require_column(column)?;
        }

        let row = &mut self.rows[index];
        for (column, value) in record {
            row.insert(column, value);
        }
        self.revision += 1;
        Ok(())
    }

    /// Remove and return the row at `index`; later rows shift down by one.
    pub fn delete(&mut self, index: usize) -> Result<Row> {
        let len = self.rows.len();
        if index >= len {
            return Err(TableError::RowOutOfRange { index, len });
        }
        let row = self.rows.remove(index);
        self.revision += 1;
        Ok(row)
    }

    /// Delete several rows addressed by positions taken from the same view.
    ///
    /// Positions are validated before anything is removed, then applied in
    /// descending order so each deletion leaves the remaining positions valid.
    /// Duplicate positions are removed once.
    pub fn delete_many(&mut self, indices: &[usize]) -> Result<usize> {
        let len = self.rows.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(TableError::RowOutOfRange { index, len });
        }

        let unique: BTreeSet<usize> = indices.iter().copied().collect();
        for &index in unique.iter().rev() {
            self.rows.remove(index);
        }
        if !unique.is_empty() {
            self.revision += 1;
        }
        debug!("delete_many: removed {} row(s)", unique.len());
        Ok(unique.len())
    }

    /// Widen the schema with a new column, `Null` in every existing row.
    ///
    /// Returns false if the column already exists.
    pub fn add_column(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_column(&name) {
            return false;
        }
        for row in &mut self.rows {
            row.insert(name.clone(), ColumnValue::Null);
        }
        self.columns.push(name);
        self.revision += 1;
        true
    }

    /// Rename columns using an old-name to new-name map.
    ///
    /// Columns without an entry keep their names. Fails with
    /// `DuplicateColumn`, leaving the table unchanged, when two columns would
    /// end up with the same name.
    pub fn rename_columns(&mut self, mapping: &HashMap<String, String>) -> Result<()> {
        let renamed = self.columns.iter().filter(|c| mapping.contains_key(*c)).count();
        if renamed == 0 {
            return Ok(());
        }

        let rename = |c: &String| mapping.get(c).cloned().unwrap_or_else(|| c.clone());
        let columns: Vec<String> = self.columns.iter().map(rename).collect();
        ensure_unique(&columns)?;

        for row in &mut self.rows {
            *row = row.drain().map(|(k, v)| (rename(&k), v)).collect();
        }
        self.columns = columns;
        self.revision += 1;
        debug!("rename_columns: renamed {} column(s)", renamed);
        Ok(())
    }

    /// Mean of the numeric cells in a column. `None` if there are none.
    pub fn mean(&self, column: &str) -> Result<Option<f64>> {
        self.require_column(column)?;
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in self.column_values(column) {
            if let Some(num) = value.as_f64() {
                sum += num;
                count += 1;
            }
        }
        if count > 0 {
            Ok(Some(sum / count as f64))
        } else {
            Ok(None)
        }
    }

    /// Infer what kind of data a column holds from its non-missing cells.
    pub fn column_kind(&self, column: &str) -> Result<ValueKind> {
        self.require_column(column)?;
        Ok(classify(self.column_values(column)))
    }

    /// Number of `Null` cells across the whole table.
    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .filter(|c| row.get(c.as_str()).map_or(true, ColumnValue::is_null))
                    .count()
            })
            .sum()
    }

    /// Build a table with the same schema over a new set of rows.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> RecordTable {
        RecordTable {
            columns: self.columns.clone(),
            rows,
            revision: 0,
        }
    }
}

/// Tables compare by schema and rows; the revision counter is ignored.
impl PartialEq for RecordTable {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.rows == other.rows
    }
}

fn conform_row(columns: &[String], mut record: Row) -> Row {
    columns
        .iter()
        .map(|c| {
            let value = record.remove(c).unwrap_or(ColumnValue::Null);
            (c.clone(), value)
        })
        .collect()
}

/// Fail with `DuplicateColumn` on the first name that appears twice.
pub(crate) fn ensure_unique(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    match columns.iter().find(|c| !seen.insert(c.as_str())) {
        Some(duplicate) => Err(TableError::DuplicateColumn(duplicate.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["country".to_string(), "cases".to_string()]
    }

    fn record(country: &str, cases: i64) -> Row {
        let mut row = Row::new();
        row.insert("country".to_string(), ColumnValue::from(country));
        row.insert("cases".to_string(), ColumnValue::Int64(cases));
        row
    }

    fn numbered(n: usize) -> RecordTable {
        let mut table = RecordTable::new(columns());
        for i in 0..n {
            table.add(record(&format!("c{}", i), i as i64));
        }
        table
    }

    fn cases(table: &RecordTable) -> Vec<i64> {
        table
            .column_values("cases")
            .map(|v| v.as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_table_basic() {
        let table = numbered(3);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.columns(), &["country".to_string(), "cases".to_string()]);
        assert_eq!(table.value(1, "country").unwrap().as_string(), Some("c1"));
        assert_eq!(table.value(2, "cases").unwrap().as_i64(), Some(2));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_add_defaults_missing_columns() {
        let mut table = RecordTable::new(columns());
        let mut row = Row::new();
        row.insert("country".to_string(), ColumnValue::from("Laos"));
        row.insert("region".to_string(), ColumnValue::from("Asia"));
        table.add(row);

        assert!(table.value(0, "cases").unwrap().is_null());
        assert!(!table.all_rows()[0].contains_key("region"));
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_update_changes_only_given_keys() {
        let mut table = numbered(3);
        let before = table.all_rows().to_vec();

        let mut patch = Row::new();
        patch.insert("cases".to_string(), ColumnValue::Int64(99));
        table.update(1, patch).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value(1, "cases").unwrap().as_i64(), Some(99));
        assert_eq!(table.value(1, "country").unwrap(), &before[1]["country"]);
        assert_eq!(table.all_rows()[0], before[0]);
        assert_eq!(table.all_rows()[2], before[2]);
    }

    #[test]
    fn test_update_out_of_range() {
        let mut table = numbered(2);
        let err = table.update(2, record("x", 1)).unwrap_err();
        assert!(matches!(err, TableError::RowOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_update_unknown_column_writes_nothing() {
        let mut table = numbered(2);
        let mut patch = record("changed", 5);
        patch.insert("bogus".to_string(), ColumnValue::Int64(1));

        let err = table.update(0, patch).unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(table.value(0, "country").unwrap().as_string(), Some("c0"));
    }

    #[test]
    fn test_delete_shifts_rows() {
        let mut table = numbered(4);
        let removed = table.delete(1).unwrap();
        assert_eq!(removed["cases"], ColumnValue::Int64(1));
        assert_eq!(table.row_count(), 3);
        assert_eq!(cases(&table), vec![0, 2, 3]);

        assert!(table.delete(3).unwrap_err().is_index_error());
    }

    #[test]
    fn test_delete_many_descending() {
        let mut table = numbered(10);
        let removed = table.delete_many(&[2, 5]).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cases(&table), vec![0, 1, 3, 4, 6, 7, 8, 9]);
    }

    #[test]
    fn test_delete_many_validates_first() {
        let mut table = numbered(3);
        let err = table.delete_many(&[0, 7]).unwrap_err();
        assert!(err.is_index_error());
        assert_eq!(table.row_count(), 3);

        assert_eq!(table.delete_many(&[1, 1]).unwrap(), 1);
        assert_eq!(cases(&table), vec![0, 2]);
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let mut table = numbered(2);
        let r0 = table.revision();
        table.update(0, record("a", 1)).unwrap();
        assert!(table.revision() > r0);
        let r1 = table.revision();
        let _ = table.delete(5);
        assert_eq!(table.revision(), r1);
    }

    #[test]
    fn test_add_column_widens_schema() {
        let mut table = numbered(2);
        assert!(table.add_column("deaths"));
        assert!(!table.add_column("deaths"));
        assert!(table.value(1, "deaths").unwrap().is_null());

        let mut row = record("new", 3);
        row.insert("deaths".to_string(), ColumnValue::Int64(1));
        table.add(row);
        assert_eq!(table.value(2, "deaths").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn test_rename_columns() {
        let mut table = numbered(1);
        let mut mapping = HashMap::new();
        mapping.insert("country".to_string(), "Quốc gia".to_string());
        table.rename_columns(&mapping).unwrap();

        assert_eq!(table.columns()[0], "Quốc gia");
        assert_eq!(table.value(0, "Quốc gia").unwrap().as_string(), Some("c0"));
        assert!(table.value(0, "country").is_err());
    }

    #[test]
    fn test_rename_onto_existing_column_rejected() {
        let mut table = numbered(2);
        let before = table.clone();
        let revision = table.revision();

        let mut mapping = HashMap::new();
        mapping.insert("country".to_string(), "cases".to_string());
        let err = table.rename_columns(&mapping).unwrap_err();

        assert!(matches!(err, TableError::DuplicateColumn(ref c) if c == "cases"));
        assert!(err.is_configuration_error());
        assert_eq!(table, before);
        assert_eq!(table.revision(), revision);
    }

    #[test]
    fn test_rename_swap_keeps_values() {
        let mut table = numbered(1);
        let mut mapping = HashMap::new();
        mapping.insert("country".to_string(), "cases".to_string());
        mapping.insert("cases".to_string(), "country".to_string());
        table.rename_columns(&mapping).unwrap();

        assert_eq!(table.columns(), &["cases", "country"]);
        assert_eq!(table.value(0, "cases").unwrap().as_string(), Some("c0"));
    }

    #[test]
    fn test_mean_and_kind() {
        let mut table = numbered(4);
        table.add({
            let mut r = Row::new();
            r.insert("country".to_string(), ColumnValue::from("none"));
            r
        });
        assert_eq!(table.mean("cases").unwrap(), Some(1.5));
        assert_eq!(table.column_kind("cases").unwrap(), ValueKind::Numeric);
        assert_eq!(table.column_kind("country").unwrap(), ValueKind::Text);
        assert_eq!(table.missing_count(), 1);
        assert!(table.mean("missing").is_err());
    }

    #[test]
    fn test_from_rows_conforms() {
        let mut extra = record("a", 1);
        extra.insert("zzz".to_string(), ColumnValue::Null);
        let mut partial = Row::new();
        partial.insert("cases".to_string(), ColumnValue::Int64(2));

        let table = RecordTable::from_rows(columns(), vec![extra, partial]);
        assert_eq!(table.row_count(), 2);
        assert!(!table.all_rows()[0].contains_key("zzz"));
        assert!(table.value(1, "country").unwrap().is_null());
    }

    #[test]
    fn test_equality_ignores_revision() {
        let a = numbered(2);
        let b = RecordTable::from_rows(columns(), a.all_rows().to_vec());
        assert_ne!(a.revision(), b.revision());
        assert_eq!(a, b);
    }
}
