//! Roster PDF extraction.
//!
//! [`RosterExtractor`] walks the PDF, [`csv`] writes the normalized roster and
//! [`dump`] writes the raw table and text dumps.

pub mod csv;
pub mod dump;
mod extractor;

pub use csv::{
    escape_field, normalize_row, write_roster_file, CsvWriter, RowWidthPolicy, ROSTER_HEADERS,
};
pub use dump::{format_row, text_preview, write_raw_file, write_raw_tables, write_text_file};
pub use extractor::RosterExtractor;
