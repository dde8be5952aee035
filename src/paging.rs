/// Page slicing over a RecordTable.
///
/// Paging is stateless: every call recomputes the slice from the table's
/// current row order. Page numbers are 1-based and clamped into range, so a
/// display can ask for page 0 or page 999 and still get something sensible.
/// Row indices passed to `update`/`delete` are never clamped; translate a
/// position within a page with `PagingView::absolute_index` first.
///
/// # Examples
///
/// ```
/// use casetable::{ColumnValue, PagingView, RecordTable, Row};
///
/// let mut table = RecordTable::new(vec!["n".to_string()]);
/// for i in 0..45 {
///     let mut row = Row::new();
///     row.insert("n".to_string(), ColumnValue::Int64(i));
///     table.add(row);
/// }
///
/// assert_eq!(PagingView::total_pages(&table, 20).unwrap(), 3);
/// let last = PagingView::page(&table, 3, 20).unwrap();
/// assert_eq!(last.rows().len(), 5);
/// ```

use crate::error::{Result, TableError};
use crate::table::{RecordTable, Row};

/// A read-only slice of a table, cut at a known revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    number: usize,
    total_pages: usize,
    offset: usize,
    rows: Vec<Row>,
    revision: u64,
}

impl Page {
    /// The resolved (clamped) 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Table position of the first row on this page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True once the table has been mutated since this page was cut.
    pub fn is_stale(&self, table: &RecordTable) -> bool {
        self.revision != table.revision()
    }
}

pub struct PagingView;

impl PagingView {
    /// Number of pages for `page_size`; an empty table still has one page.
    pub fn total_pages(table: &RecordTable, page_size: usize) -> Result<usize> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        let rows = table.row_count();
        if rows == 0 {
            return Ok(1);
        }
        Ok(rows.div_ceil(page_size))
    }

    /// Resolve a requested page number into `[1, total_pages]`.
    pub fn clamp_page(table: &RecordTable, page_number: i64, page_size: usize) -> Result<usize> {
        let total = Self::total_pages(table, page_size)?;
        if page_number < 1 {
            return Ok(1);
        }
        Ok(usize::try_from(page_number).map_or(total, |p| p.min(total)))
    }

    /// Rows `[(p-1)*size, p*size)` of the table, clipped to its length.
    pub fn page(table: &RecordTable, page_number: i64, page_size: usize) -> Result<Page> {
        let total_pages = Self::total_pages(table, page_size)?;
        let number = Self::clamp_page(table, page_number, page_size)?;

        let len = table.row_count();
        let start = ((number - 1) * page_size).min(len);
        let end = start.saturating_add(page_size).min(len);

        Ok(Page {
            number,
            total_pages,
            offset: start,
            rows: table.all_rows()[start..end].to_vec(),
            revision: table.revision(),
        })
    }

    /// Map a position within page `page_number` to a table position.
    ///
    /// `None` when the position does not fit in a `usize`.
    pub fn absolute_index(page_number: usize, page_size: usize, index_in_page: usize) -> Option<usize> {
        page_number
            .saturating_sub(1)
            .checked_mul(page_size)?
            .checked_add(index_in_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ColumnValue;

    fn table_of(n: usize) -> RecordTable {
        let mut table = RecordTable::new(vec!["n".to_string()]);
        for i in 0..n {
            let mut row = Row::new();
            row.insert("n".to_string(), ColumnValue::Int64(i as i64));
            table.add(row);
        }
        table
    }

    fn numbers(page: &Page) -> Vec<i64> {
        page.rows().iter().map(|r| r["n"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(PagingView::total_pages(&table_of(45), 20).unwrap(), 3);
        assert_eq!(PagingView::total_pages(&table_of(40), 20).unwrap(), 2);
        assert_eq!(PagingView::total_pages(&table_of(1), 20).unwrap(), 1);
        assert_eq!(PagingView::total_pages(&table_of(7), 1).unwrap(), 7);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let table = table_of(0);
        assert_eq!(PagingView::total_pages(&table, 20).unwrap(), 1);
        let page = PagingView::page(&table, 1, 20).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.number(), 1);
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let table = table_of(3);
        assert!(matches!(
            PagingView::page(&table, 1, 0),
            Err(TableError::InvalidPageSize)
        ));
        assert!(PagingView::total_pages(&table, 0).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_last_page_partial() {
        let table = table_of(45);
        let page = PagingView::page(&table, 3, 20).unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page.offset(), 40);
        assert_eq!(numbers(&page), vec![40, 41, 42, 43, 44]);
    }

    #[test]
    fn test_out_of_range_pages_clamp() {
        let table = table_of(45);
        assert_eq!(PagingView::page(&table, 0, 20).unwrap().number(), 1);
        assert_eq!(PagingView::page(&table, -4, 20).unwrap().number(), 1);
        let far = PagingView::page(&table, 99, 20).unwrap();
        assert_eq!(far.number(), 3);
        assert_eq!(far.len(), 5);
        assert_eq!(PagingView::clamp_page(&table, i64::MAX, 20).unwrap(), 3);
    }

    #[test]
    fn test_pages_partition_rows() {
        for (rows, size) in [(0, 3), (1, 3), (9, 3), (10, 3), (45, 20), (17, 4)] {
            let table = table_of(rows);
            let total = PagingView::total_pages(&table, size).unwrap();
            let mut seen = Vec::new();
            for p in 1..=total {
                let page = PagingView::page(&table, p as i64, size).unwrap();
                assert!(page.len() <= size);
                seen.extend(numbers(&page));
            }
            let expected: Vec<i64> = (0..rows as i64).collect();
            assert_eq!(seen, expected, "rows={} size={}", rows, size);
        }
    }

    #[test]
    fn test_absolute_index() {
        assert_eq!(PagingView::absolute_index(1, 20, 0), Some(0));
        assert_eq!(PagingView::absolute_index(3, 20, 4), Some(44));
        assert_eq!(PagingView::absolute_index(0, 20, 2), Some(2));
    }

    #[test]
    fn test_absolute_index_overflow() {
        assert_eq!(PagingView::absolute_index(usize::MAX, 2, 0), None);
        assert_eq!(PagingView::absolute_index(2, usize::MAX, 1), None);
        assert_eq!(PagingView::absolute_index(1, usize::MAX, usize::MAX), Some(usize::MAX));
    }

    #[test]
    fn test_page_goes_stale_after_mutation() {
        let mut table = table_of(5);
        let page = PagingView::page(&table, 1, 2).unwrap();
        assert!(!page.is_stale(&table));
        table.delete(0).unwrap();
        assert!(page.is_stale(&table));
    }
}
