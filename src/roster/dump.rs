//! Raw dumps and console previews of extracted roster data.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::model::{RawTable, Row};

/// Write each table as one JSON array of rows followed by a blank line.
///
/// Missing cells are written as `null`.
pub fn write_raw_tables<'t, W, I>(mut writer: W, tables: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'t RawTable>,
{
    let mut count = 0;
    for table in tables {
        serde_json::to_writer(&mut writer, table)?;
        writer.write_all(b"\n\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// [`write_raw_tables`] into a file, creating parent directories.
pub fn write_raw_file<'t, P, I>(path: P, tables: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'t RawTable>,
{
    let path = path.as_ref();
    create_parent(path)?;
    let file = std::io::BufWriter::new(fs::File::create(path)?);
    let count = write_raw_tables(file, tables)?;
    log::info!("Wrote {} raw table(s) to {}", count, path.display());
    Ok(count)
}

/// Write the plain-text dump, creating parent directories.
pub fn write_text_file<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, text)?;
    log::info!("Wrote {} characters to {}", text.chars().count(), path.display());
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Render a row for console output, e.g. `['Mr.', None, 'Smith']`.
pub fn format_row(row: &Row) -> String {
    let cells: Vec<String> = row
        .iter()
        .map(|cell| match cell {
            Some(text) => format!("'{}'", text.replace('\'', "\\'")),
            None => "None".to_string(),
        })
        .collect();
    format!("[{}]", cells.join(", "))
}

/// At most the first `max_chars` characters of `text`.
pub fn text_preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
