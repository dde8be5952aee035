/// Interactive session over one dataset.
///
/// A `Session` owns the loaded dataset, the current derived table (the result
/// of the last search or sort, if any) and the current page number. It is the
/// layer a display sits on: navigation never fails for out-of-range pages
/// (they clamp), while edits address rows by their position on the current
/// page.
///
/// Mutations always apply to the current table. When a search or sort result
/// is showing, edits land in that result and not in the loaded dataset; the
/// two never share rows.

use crate::cleaning::{CleaningPipeline, CleaningReport};
use crate::config::SessionConfig;
use crate::error::{Result, TableError};
use crate::io;
use crate::paging::{Page, PagingView};
use crate::query::{QueryEngine, SortOrder};
use crate::table::{RecordTable, Row};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

pub struct Session {
    config: SessionConfig,
    dataset: Option<RecordTable>,
    derived: Option<RecordTable>,
    page: usize,
    dirty: bool,
}

impl Session {
    /// Create a session with nothing loaded.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Session {
            config,
            dataset: None,
            derived: None,
            page: 1,
            dirty: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Replace the loaded dataset and go back to page 1.
    pub fn open(&mut self, table: RecordTable) {
        info!("opened table with {} rows", table.row_count());
        self.dataset = Some(table);
        self.derived = None;
        self.page = 1;
        self.dirty = false;
    }

    /// Load a CSV file. Unreadable files open as an empty table with the
    /// configured fallback columns.
    pub fn open_csv<P: AsRef<Path>>(&mut self, path: P) {
        let table = io::load_csv(path, self.config.fallback_columns.as_slice());
        self.open(table);
    }

    /// Write the current table to CSV and clear the unsaved-changes flag.
    pub fn save_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        io::save_csv(self.current()?, path)?;
        self.dirty = false;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// The loaded dataset, ignoring any search or sort.
    pub fn dataset(&self) -> Option<&RecordTable> {
        self.dataset.as_ref()
    }

    /// The table being displayed: the last search/sort result, or the dataset.
    pub fn current(&self) -> Result<&RecordTable> {
        self.derived
            .as_ref()
            .or(self.dataset.as_ref())
            .ok_or(TableError::NoTable)
    }

    fn current_mut(&mut self) -> Result<&mut RecordTable> {
        self.derived
            .as_mut()
            .or(self.dataset.as_mut())
            .ok_or(TableError::NoTable)
    }

    /// Whether a search or sort result is showing.
    pub fn is_derived(&self) -> bool {
        self.derived.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Rows in the current table; zero when nothing is loaded.
    pub fn total_records(&self) -> usize {
        self.current().map_or(0, RecordTable::row_count)
    }

    /// Pages in the current table; zero when nothing is loaded.
    pub fn total_pages(&self) -> usize {
        self.current()
            .and_then(|t| PagingView::total_pages(t, self.config.page_size))
            .unwrap_or(0)
    }

    pub fn page_number(&self) -> usize {
        self.page
    }

    /// Slice the current page, clamping the stored page number first.
    pub fn current_page(&mut self) -> Result<Page> {
        let page = PagingView::page(self.current()?, self.page as i64, self.config.page_size)?;
        self.page = page.number();
        Ok(page)
    }

    pub fn first_page(&mut self) -> Result<Page> {
        self.page = 1;
        self.current_page()
    }

    pub fn last_page(&mut self) -> Result<Page> {
        self.page = PagingView::total_pages(self.current()?, self.config.page_size)?;
        self.current_page()
    }

    /// Advance one page; stays put on the last page.
    pub fn next_page(&mut self) -> Result<Page> {
        let total = PagingView::total_pages(self.current()?, self.config.page_size)?;
        if self.page < total {
            self.page += 1;
        }
        self.current_page()
    }

    /// Go back one page; stays put on the first page.
    pub fn prev_page(&mut self) -> Result<Page> {
        if self.page > 1 {
            self.page -= 1;
        }
        self.current_page()
    }

    /// Jump to an explicit page number.
    ///
    /// Unlike the other navigation calls this does not clamp: a number
    /// outside `[1, total_pages]` is rejected and the page is unchanged.
    pub fn goto_page(&mut self, page: i64) -> Result<Page> {
        let total = PagingView::total_pages(self.current()?, self.config.page_size)?;
        match usize::try_from(page) {
            Ok(p) if (1..=total).contains(&p) => {
                self.page = p;
                self.current_page()
            }
            _ => Err(TableError::PageOutOfRange { page, total }),
        }
    }

    /// Search the loaded dataset (not the current result) in one column.
    ///
    /// The keyword is trimmed and must not be empty. Shows page 1 of the
    /// result.
    pub fn search(&mut self, column: &str, keyword: &str) -> Result<Page> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(TableError::EmptyKeyword);
        }
        let dataset = self.dataset.as_ref().ok_or(TableError::NoTable)?;
        let found = QueryEngine::search(dataset, &[column], keyword)?;
        debug!("search '{}' in '{}': {} rows", keyword, column, found.row_count());
        self.derived = Some(found);
        self.first_page()
    }

    /// Drop any search or sort result and show the loaded dataset again.
    pub fn clear_search(&mut self) -> Result<Page> {
        self.derived = None;
        self.first_page()
    }

    /// Sort the current table by one column and show page 1.
    pub fn sort(&mut self, column: &str, order: SortOrder) -> Result<Page> {
        let sorted = QueryEngine::sort(self.current()?, column, order)?;
        self.derived = Some(sorted);
        self.first_page()
    }

    /// Append a record to the current table and jump to the page showing it.
    pub fn add(&mut self, record: Row) -> Result<Page> {
        self.current_mut()?.add(record);
        self.dirty = true;
        self.last_page()
    }

    /// Row `index_in_page` of the current page, e.g. to prefill an edit form.
    pub fn row_on_page(&self, index_in_page: usize) -> Result<&Row> {
        let absolute = self.absolute_index(index_in_page)?;
        self.current()?.row(absolute)
    }

    /// Update row `index_in_page` of the current page.
    pub fn update_on_page(&mut self, index_in_page: usize, record: Row) -> Result<Page> {
        let absolute = self.absolute_index(index_in_page)?;
        self.current_mut()?.update(absolute, record)?;
        self.dirty = true;
        self.current_page()
    }

    /// Delete rows of the current page by their positions on it.
    ///
    /// All positions are checked before anything is removed. Returns the
    /// number of rows deleted.
    pub fn delete_on_page(&mut self, indices_in_page: &[usize]) -> Result<usize> {
        let absolute = indices_in_page
            .iter()
            .map(|&i| self.absolute_index(i))
            .collect::<Result<Vec<_>>>()?;
        let removed = self.current_mut()?.delete_many(&absolute)?;
        if removed > 0 {
            self.dirty = true;
        }
        self.current_page()?;
        Ok(removed)
    }

    /// Rename columns in the dataset and in any derived result.
    ///
    /// A rename that would produce a duplicate column changes nothing.
    pub fn rename_columns(&mut self, mapping: &HashMap<String, String>) -> Result<()> {
        let dataset = self.dataset.as_mut().ok_or(TableError::NoTable)?;
        dataset.rename_columns(mapping)?;
        if let Some(derived) = self.derived.as_mut() {
            derived.rename_columns(mapping)?;
        }
        Ok(())
    }

    /// Clean the loaded dataset with the configured passes.
    ///
    /// Rows hidden by an active search are cleaned too. The cleaned table
    /// becomes the loaded dataset and any search or sort result is dropped,
    /// along with edits made to it.
    pub fn clean(&mut self) -> Result<CleaningReport> {
        let pipeline = CleaningPipeline::new(self.config.cleaning);
        let (cleaned, report) = pipeline.clean(self.dataset.as_ref())?;
        self.dataset = Some(cleaned);
        self.derived = None;
        self.page = 1;
        self.dirty = true;
        Ok(report)
    }

    /// Report data-quality issues in the loaded dataset without changing it.
    pub fn inspect(&self) -> Result<CleaningReport> {
        CleaningPipeline::new(self.config.cleaning).inspect(self.dataset.as_ref())
    }

    fn absolute_index(&self, index_in_page: usize) -> Result<usize> {
        let table = self.current()?;
        let size = self.config.page_size;
        let page = PagingView::clamp_page(table, self.page as i64, size)?;
        let start = PagingView::absolute_index(page, size, 0).unwrap_or(usize::MAX);
        let on_page = table.row_count().saturating_sub(start).min(size);
        if index_in_page >= on_page {
            return Err(TableError::RowOutOfRange {
                index: index_in_page,
                len: on_page,
            });
        }
        Ok(start + index_in_page)
    }
}
