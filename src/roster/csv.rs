//! Roster CSV output.
//!
//! Fields are quoted only when they contain the delimiter, a quote or a line
//! break; embedded quotes are doubled and records end with `\r\n`.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{RawTable, Row};

/// Header of the roster CSV.
pub const ROSTER_HEADERS: [&str; 14] = [
    "Title",
    "First Name",
    "Last Name",
    "Suffix",
    "Professional Suffix",
    "Salutation (Casual)",
    "Salutation (Formal)",
    "Address Street 1",
    "Address Street 2",
    "Address City",
    "Address State",
    "Address ZIP",
    "Address Country",
    "Accept Mail",
];

/// How rows whose cell count differs from the header are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowWidthPolicy {
    /// Write the row as extracted
    #[default]
    WriteThrough,
    /// Pad with empty fields or drop trailing cells to match the header
    PadOrTruncate,
    /// Fail with [`Error::RowWidth`]
    Reject,
}

/// Trim every cell and map missing cells to `""`.
///
/// Returns `None` when no cell has visible text; such rows are not written.
pub fn normalize_row(row: &Row) -> Option<Vec<String>> {
    let cells: Vec<String> = row
        .iter()
        .map(|cell| cell.as_deref().map(str::trim).unwrap_or("").to_string())
        .collect();

    if cells.iter().all(String::is_empty) {
        None
    } else {
        Some(cells)
    }
}

fn needs_quotes(field: &str, delimiter: char) -> bool {
    field.contains(delimiter) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Quote a field if it needs it.
pub fn escape_field(field: &str, delimiter: char) -> Cow<'_, str> {
    if needs_quotes(field, delimiter) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

const DELIMITER: char = ',';

/// Writes roster records to any [`Write`].
pub struct CsvWriter<W: Write> {
    writer: W,
    policy: RowWidthPolicy,
}

impl<W: Write> CsvWriter<W> {
    /// Create a comma-delimited writer with the default row width policy.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            policy: RowWidthPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RowWidthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Write one record.
    pub fn write_record<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        let mut first = true;
        for field in fields {
            if !first {
                write!(self.writer, "{}", DELIMITER)?;
            }
            first = false;
            self.writer
                .write_all(escape_field(field.as_ref(), DELIMITER).as_bytes())?;
        }
        self.writer.write_all(b"\r\n")?;
        Ok(())
    }

    /// Write `header`, then every non-empty row of every table in order.
    ///
    /// Returns the number of data rows written.
    pub fn write_roster<'t, I>(&mut self, header: &[&str], tables: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'t RawTable>,
    {
        self.write_record(header)?;

        let mut written = 0;
        for row in tables.into_iter().flat_map(|t| t.rows.iter()) {
            let Some(mut cells) = normalize_row(row) else {
                continue;
            };

            if cells.len() != header.len() {
                match self.policy {
                    RowWidthPolicy::WriteThrough => {
                        log::debug!(
                            "Row {} has {} cells, header has {}",
                            written + 1,
                            cells.len(),
                            header.len()
                        );
                    }
                    RowWidthPolicy::PadOrTruncate => cells.resize(header.len(), String::new()),
                    RowWidthPolicy::Reject => {
                        return Err(Error::RowWidth {
                            row: written + 1,
                            actual: cells.len(),
                            expected: header.len(),
                        });
                    }
                }
            }

            self.write_record(&cells)?;
            written += 1;
        }

        self.writer.flush()?;
        Ok(written)
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Write the roster CSV to `path`, creating parent directories.
pub fn write_roster_file<'t, P, I>(path: P, tables: I, policy: RowWidthPolicy) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'t RawTable>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    let mut writer = CsvWriter::new(file).with_policy(policy);
    let rows = writer.write_roster(&ROSTER_HEADERS, tables)?;
    log::info!("Wrote {} roster rows to {}", rows, path.display());
    Ok(rows)
}
