//! Walks a roster PDF page by page.

use std::path::Path;

use crate::error::Result;
use crate::model::{PageExtract, RosterDocument};
use crate::parser::{
    spans_to_text, ErrorMode, ExtractOptions, LopdfBackend, PdfBackend, SpanExtractor,
    TableDetector,
};

/// Extracts tables (or fallback text) from every page of a roster PDF.
pub struct RosterExtractor {
    backend: Box<dyn PdfBackend>,
    options: ExtractOptions,
    version: Option<String>,
}

impl RosterExtractor {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        let backend = LopdfBackend::load_file(path)?;
        let version = backend.version();
        log::debug!("Opened {} (PDF {})", path.display(), version);

        Ok(Self {
            backend: Box::new(backend),
            options,
            version: Some(version),
        })
    }

    /// Load a PDF held in memory.
    pub fn from_bytes(data: &[u8], options: ExtractOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data)?;
        let version = backend.version();
        Ok(Self {
            backend: Box::new(backend),
            options,
            version: Some(version),
        })
    }

    /// Use an existing backend.
    pub fn from_backend(backend: Box<dyn PdfBackend>, options: ExtractOptions) -> Self {
        Self {
            backend,
            options,
            version: None,
        }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.backend.page_count()
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Walk every page. See [`extract_with_progress`](Self::extract_with_progress).
    pub fn extract(&self) -> Result<RosterDocument> {
        self.extract_with_progress(|_| {})
    }

    /// Walk every page in order, calling `on_page` after each one.
    ///
    /// In lenient mode a page that fails is logged and left out of the result.
    pub fn extract_with_progress<F>(&self, mut on_page: F) -> Result<RosterDocument>
    where
        F: FnMut(&PageExtract),
    {
        let mut document = RosterDocument::new(self.page_count());
        document.pdf_version = self.version.clone();

        for page_num in self.backend.pages().into_keys() {
            match self.extract_page(page_num) {
                Ok(page) => {
                    on_page(&page);
                    document.add_page(page);
                }
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Skipping page {}: {}", page_num, e);
                }
            }
        }

        Ok(document)
    }

    /// Extract a single page (1-indexed).
    ///
    /// Pages where the detector finds no table carry their plain text instead.
    pub fn extract_page(&self, page_num: u32) -> Result<PageExtract> {
        let spans = SpanExtractor::new(self.backend.as_ref()).extract_page_spans(page_num)?;
        let tables = TableDetector::with_config(self.options.detector.clone()).detect_tables(&spans);

        if !tables.is_empty() {
            log::debug!("Page {}: {} table(s)", page_num, tables.len());
            return Ok(PageExtract::with_tables(page_num, tables));
        }

        let text = match self.backend.page_text(page_num) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => spans_to_text(&spans),
            Err(e) => {
                log::debug!("Falling back to span text on page {}: {}", page_num, e);
                spans_to_text(&spans)
            }
        };
        Ok(PageExtract::with_text(page_num, text))
    }

    /// Every page's text followed by a newline.
    pub fn extract_text(&self) -> Result<String> {
        let mut out = String::new();

        for page_num in self.backend.pages().into_keys() {
            let text = match self.backend.page_text(page_num) {
                Ok(text) => text,
                Err(e) => match SpanExtractor::new(self.backend.as_ref()).extract_page_spans(page_num) {
                    Ok(spans) => spans_to_text(&spans),
                    Err(_) if self.options.error_mode == ErrorMode::Lenient => {
                        log::warn!("No text for page {}: {}", page_num, e);
                        String::new()
                    }
                    Err(_) => return Err(e),
                },
            };
            out.push_str(&text);
            out.push('\n');
        }

        Ok(out)
    }
}
