/// CaseTable - In-memory store for epidemiological case records
///
/// Holds one tabular dataset of case records (date, region, counts) and
/// offers paging, keyword search, type-aware sorting and a configurable
/// cleaning pipeline with a data-quality report. Search, sort and cleaning
/// return new tables and never modify their input.

pub mod value;
pub mod error;
pub mod dates;
pub mod table;
pub mod paging;
pub mod query;
pub mod cleaning;
pub mod io;
pub mod config;
pub mod session;

pub use value::{ColumnValue, ValueKind};
pub use error::{Result, TableError};
pub use table::{RecordTable, Row};
pub use paging::{Page, PagingView};
pub use query::{QueryEngine, SortOrder};
pub use cleaning::{CleaningConfig, CleaningPipeline, CleaningReport};
pub use config::SessionConfig;
pub use session::Session;
