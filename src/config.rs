/// Session configuration.
///
/// Loaded from an optional JSON file, then overridden from the environment
/// (`CASETABLE_PAGE_SIZE`). Every field has a default, so an empty JSON
/// object is a valid configuration.

use crate::cleaning::CleaningConfig;
use crate::error::{Result, TableError};
use crate::io::FALLBACK_COLUMNS;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Environment variable overriding `page_size`.
pub const PAGE_SIZE_ENV: &str = "CASETABLE_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rows per page. Must be positive.
    pub page_size: usize,
    /// Schema of the empty table used when a dataset fails to load.
    pub fallback_columns: Vec<String>,
    /// Passes run by `Session::clean` and `Session::inspect`.
    pub cleaning: CleaningConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            page_size: DEFAULT_PAGE_SIZE,
            fallback_columns: FALLBACK_COLUMNS.iter().map(|c| c.to_string()).collect(),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` in place of the environment.
    ///
    /// Unparsable values are logged and ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(size) => self.page_size = size,
                Err(_) => warn!("ignoring {}={:?}: not a page size", PAGE_SIZE_ENV, raw),
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }
        Ok(())
    }
}
