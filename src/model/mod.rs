//! Extraction model for roster documents.
//!
//! Rows keep the shape the table detector found; nothing here knows about the
//! 14-column roster header. Reinterpreting rows against that header is the
//! CSV writer's job.

mod document;
mod table;

pub use document::{PageExtract, RosterDocument};
pub use table::{RawTable, Row};
