//! Extraction options and configuration.

use super::table_detector::TableDetectorConfig;

/// Options for walking a roster PDF.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Table detector tuning
    pub detector: TableDetectorConfig,

    /// Rows shown per table in console previews
    pub preview_rows: usize,

    /// Characters of fallback text shown in console previews
    pub preview_chars: usize,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient mode (skip pages that fail to extract).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set how many rows per table the preview shows.
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Set how many characters of fallback text the preview shows.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            detector: TableDetectorConfig::default(),
            preview_rows: 5,
            preview_chars: 500,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip pages that fail and continue
    Lenient,
}
