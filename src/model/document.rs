//! Document-level types.

use serde::{Deserialize, Serialize};

use super::RawTable;

/// What one PDF page yielded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageExtract {
    /// Page number (1-indexed)
    pub number: u32,

    /// Tables detected on the page
    pub tables: Vec<RawTable>,

    /// Plain text, filled only when no table was detected
    pub text: Option<String>,
}

impl PageExtract {
    /// Create a page result carrying tables.
    pub fn with_tables(number: u32, tables: Vec<RawTable>) -> Self {
        Self {
            number,
            tables,
            text: None,
        }
    }

    /// Create a page result carrying fallback text.
    pub fn with_text(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            tables: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Check whether any table was found on this page.
    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }
}

/// The result of walking a roster PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterDocument {
    /// PDF version from the file header
    pub pdf_version: Option<String>,

    /// Total pages in the source document
    pub page_count: u32,

    /// Per-page results, in page order
    pub pages: Vec<PageExtract>,
}

impl RosterDocument {
    /// Create a new empty document.
    pub fn new(page_count: u32) -> Self {
        Self {
            pdf_version: None,
            page_count,
            pages: Vec::new(),
        }
    }

    /// Add a page result.
    pub fn add_page(&mut self, page: PageExtract) {
        self.pages.push(page);
    }

    /// Every table of every page, once each, in page order.
    pub fn tables(&self) -> impl Iterator<Item = &RawTable> {
        self.pages.iter().flat_map(|p| p.tables.iter())
    }

    /// Total number of tables.
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }

    /// Check whether any page produced a table.
    pub fn has_tables(&self) -> bool {
        self.pages.iter().any(PageExtract::has_tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_flattened_in_page_order() {
        let mut doc = RosterDocument::new(3);
        doc.add_page(PageExtract::with_tables(
            1,
            vec![
                RawTable::from_strings(vec![vec!["a"]]),
                RawTable::from_strings(vec![vec!["b"]]),
            ],
        ));
        doc.add_page(PageExtract::with_text(2, "cover letter"));
        doc.add_page(PageExtract::with_tables(
            3,
            vec![RawTable::from_strings(vec![vec!["c"]])],
        ));

        let firsts: Vec<_> = doc
            .tables()
            .map(|t| t.rows[0][0].clone().unwrap())
            .collect();
        assert_eq!(firsts, vec!["a", "b", "c"]);
        assert_eq!(doc.table_count(), 3);
        assert!(doc.has_tables());
    }

    #[test]
    fn test_text_only_document_has_no_tables() {
        let mut doc = RosterDocument::new(1);
        doc.add_page(PageExtract::with_text(1, "scanned page"));
        assert!(!doc.has_tables());
        assert_eq!(doc.tables().count(), 0);
    }
}
