/// Error taxonomy for the record store.
///
/// Structural and configuration mistakes are returned as `TableError` and are
/// fatal to the call that made them. Data-quality problems (bad dates, empty
/// columns) never show up here; the cleaning pipeline records them in its
/// report instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Error)]
pub enum TableError {
    /// Update/delete addressed a row outside `[0, len)`.
    #[error("Row {index} out of range [0, {len})")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    /// Two columns would share a name, so one would shadow the other in every row.
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("Page {page} out of range [1, {total}]")]
    PageOutOfRange { page: i64, total: usize },

    #[error("Search keyword is empty")]
    EmptyKeyword,

    #[error("CSV input has no header row")]
    EmptyCsv,

    #[error("No table loaded")]
    NoTable,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TableError {
    pub fn is_index_error(&self) -> bool {
        matches!(self, TableError::RowOutOfRange { .. })
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            TableError::InvalidPageSize
                | TableError::UnknownColumn(_)
                | TableError::DuplicateColumn(_)
                | TableError::PageOutOfRange { .. }
                | TableError::EmptyKeyword
        )
    }

    pub fn is_precondition_error(&self) -> bool {
        matches!(self, TableError::NoTable)
    }
}
