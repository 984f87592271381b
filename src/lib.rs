//! # chapterkit
//!
//! Maintenance tooling for a chapter website.
//!
//! - **Roster extraction**: pull tables out of a membership roster PDF and
//!   write them as a 14-column CSV, with a raw dump for inspection.
//! - **Page rewriting**: normalize the shared header, navigation and footer
//!   across the site's static pages, either by rebuilding each page around its
//!   `<main>` element or by stripping legacy markup in place.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chapterkit::{extract_roster, roster};
//!
//! fn main() -> chapterkit::Result<()> {
//!     let doc = extract_roster("assets/old member roster.pdf")?;
//!     let rows = roster::write_roster_file(
//!         "admin/old-member-roster.csv",
//!         doc.tables(),
//!         roster::RowWidthPolicy::WriteThrough,
//!     )?;
//!     println!("{} rows", rows);
//!     Ok(())
//! }
//! ```
//!
//! ```no_run
//! use chapterkit::{config::SiteConfig, site};
//!
//! let config = SiteConfig::default().with_root("public");
//! let report = site::strip_pages(&config, |_| {});
//! println!("Updated {}/{} pages", report.succeeded(), report.total());
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod roster;
pub mod site;

pub use config::{Config, RosterConfig, SiteConfig};
pub use detect::{is_valid_version, pdf_version_from_bytes, pdf_version_from_path};
pub use error::{Error, Result};
pub use model::{PageExtract, RawTable, RosterDocument, Row};
pub use parser::{ErrorMode, ExtractOptions, TableDetectorConfig};
pub use roster::{RosterExtractor, RowWidthPolicy, ROSTER_HEADERS};
pub use site::{BatchReport, PageOutcome, PageTemplate, StripOutcome, StripRules};

use std::path::Path;

/// Extract tables from a roster PDF with default options.
///
/// # Example
///
/// ```no_run
/// let doc = chapterkit::extract_roster("roster.pdf").unwrap();
/// println!("{} table(s)", doc.table_count());
/// ```
pub fn extract_roster<P: AsRef<Path>>(path: P) -> Result<RosterDocument> {
    RosterExtractor::open(path, ExtractOptions::default())?.extract()
}

/// Extract a roster PDF held in memory.
pub fn extract_roster_bytes(data: &[u8]) -> Result<RosterDocument> {
    RosterExtractor::from_bytes(data, ExtractOptions::default())?.extract()
}

/// Plain text of every page, each followed by a newline.
pub fn extract_roster_text<P: AsRef<Path>>(path: P) -> Result<String> {
    RosterExtractor::open(path, ExtractOptions::default())?.extract_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_roster_bytes_empty_data() {
        assert!(extract_roster_bytes(&[]).is_err());
    }

    #[test]
    fn test_extract_roster_bytes_not_pdf() {
        assert!(extract_roster_bytes(b"<!doctype html><html></html>").is_err());
    }

    #[test]
    fn test_extract_roster_missing_file() {
        assert!(matches!(
            extract_roster("/nonexistent/roster.pdf"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_default_options_are_strict() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.preview_rows, 5);
        assert_eq!(options.preview_chars, 500);
    }
}
