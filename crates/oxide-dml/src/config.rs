//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Default number of rows fetched per search page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default number of ids or rows listed in a preview result.
pub const DEFAULT_MAX_PREVIEW_ROWS: usize = 100;

/// Tunables for [`DmlExecutor`](crate::executor::DmlExecutor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutorConfig {
    /// Rows requested per search page. Searches stop at the first short page.
    pub page_size: usize,
    /// Preview results list at most this many ids or rows. Counts are
    /// always complete.
    pub max_preview_rows: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_preview_rows: DEFAULT_MAX_PREVIEW_ROWS,
        }
    }
}

impl ExecutorConfig {
    /// Sets the search page size. Zero is raised to one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the preview listing cap.
    #[must_use]
    pub const fn with_max_preview_rows(mut self, max_preview_rows: usize) -> Self {
        self.max_preview_rows = max_preview_rows;
        self
    }
}
