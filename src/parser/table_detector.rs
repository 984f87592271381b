//! Table detection using text position analysis (stream mode).
//!
//! Roster PDFs carry no ruling lines, so tables are found purely from how
//! span left edges line up across consecutive rows.

use std::collections::{HashMap, HashSet};

use crate::model::{RawTable, Row};

use super::layout::{group_into_lines, TextSpan};

/// Left edges within this many points share a column bucket.
const BUCKET_SIZE: f32 = 5.0;

/// A detected table region with its content.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Detected column boundaries (left X of each column)
    pub columns: Vec<f32>,
    /// Rightmost span edge in the region
    pub right_x: f32,
    /// Rows of text spans grouped by Y position
    pub rows: Vec<TableRowData>,
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Average baseline of this row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Fraction of a row's spans that must sit on a column edge
    pub min_alignment_ratio: f32,
    /// Fraction of rows that must share a left edge for it to become a column
    pub min_column_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
    /// Distance (points) within which a span counts as aligned to a column
    pub alignment_tolerance: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            // Roster sheets run to 14 columns
            max_columns: 16,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.5,
            min_column_ratio: 0.15,
            min_column_gap: 15.0,
            alignment_tolerance: 5.0,
        }
    }
}

impl TableDetectorConfig {
    /// Set the maximum column count.
    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }
}

/// Detects tables in a list of text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables and return them as raw row lists.
    pub fn detect_tables(&self, spans: &[TextSpan]) -> Vec<RawTable> {
        self.detect(spans)
            .iter()
            .map(|t| self.to_raw_table(t))
            .collect()
    }

    /// Detect table regions in the given spans.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            log::debug!("TableDetector: not enough spans ({})", spans.len());
            return vec![];
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            log::debug!("TableDetector: not enough rows ({})", rows.len());
            return vec![];
        }

        let columns = self.detect_columns(&rows);
        log::debug!("TableDetector: page columns at {:?}", columns);
        if columns.len() < self.config.min_columns {
            return vec![];
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = rows[start..=end].to_vec();

            // Re-detect columns for this specific region
            let region_columns = self.detect_columns(&region);
            if region_columns.len() < self.config.min_columns {
                continue;
            }
            if region_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping region, too many columns ({} > {})",
                    region_columns.len(),
                    self.config.max_columns
                );
                continue;
            }
            if is_list_pattern(&region, &region_columns) {
                log::debug!("TableDetector: skipping region, detected as list pattern");
                continue;
            }

            let right_x = region
                .iter()
                .flat_map(|r| r.spans.iter())
                .map(TextSpan::right)
                .fold(f32::MIN, f32::max);

            tables.push(DetectedTable {
                columns: region_columns,
                right_x,
                rows: region,
            });
        }

        log::debug!("TableDetector: {} table(s)", tables.len());
        tables
    }

    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        group_into_lines(spans, self.config.y_tolerance_factor)
            .into_iter()
            .map(|line| {
                let y = line.spans.iter().map(|s| s.y).sum::<f32>() / line.spans.len() as f32;
                TableRowData {
                    y,
                    spans: line.spans,
                }
            })
            .collect()
    }

    /// Detect column boundaries from span left edges that recur across rows.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        let multi_span: Vec<&TableRowData> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let candidates: Vec<&TableRowData> = if multi_span.len() >= self.config.min_rows {
            multi_span
        } else {
            rows.iter().collect()
        };

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &candidates {
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / BUCKET_SIZE).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((candidates.len() as f32 * self.config.min_column_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .iter()
            .filter(|(_, count)| **count >= min_occurrences)
            .map(|(bucket, _)| *bucket as f32 * BUCKET_SIZE)
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Find contiguous row ranges whose spans sit on the column edges.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if self.alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }

        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    fn alignment_score(&self, row: &TableRowData, columns: &[f32]) -> f32 {
        if row.spans.is_empty() || columns.is_empty() {
            return 0.0;
        }
        let aligned = row
            .spans
            .iter()
            .filter(|span| {
                columns
                    .iter()
                    .any(|col| (span.x - col).abs() <= self.config.alignment_tolerance)
            })
            .count();
        aligned as f32 / row.spans.len() as f32
    }

    /// Convert a detected table into rows of optional cells.
    ///
    /// Every row has one cell per detected column; a column that received no
    /// span in that row is `None`.
    pub fn to_raw_table(&self, detected: &DetectedTable) -> RawTable {
        let columns = &detected.columns;
        let mut table = RawTable::new();

        for row_data in &detected.rows {
            let mut contents: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for span in &row_data.spans {
                let col = find_column_for_span(span.x, columns, detected.right_x);
                if let Some(cell) = contents.get_mut(col) {
                    cell.push(span.text.trim());
                }
            }

            let row: Row = contents
                .into_iter()
                .map(|parts| {
                    let text = parts.join(" ");
                    if text.is_empty() {
                        None
                    } else {
                        Some(text)
                    }
                })
                .collect();
            table.add_row(row);
        }

        table
    }
}

/// Find which column a span belongs to based on its left edge.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    // Allow 10pt of slack for spans starting slightly before their column
    for (i, &col_start) in columns.iter().enumerate() {
        let col_end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= col_start - 10.0 && span_x < col_end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (span_x - **a)
                .abs()
                .partial_cmp(&(span_x - **b).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Check if the rows are a bulleted or numbered list rather than a table.
fn is_list_pattern(rows: &[TableRowData], columns: &[f32]) -> bool {
    if columns.len() < 2 || rows.is_empty() {
        return false;
    }

    let mut bullets = 0;
    let mut numbers = 0;
    for row in rows {
        let Some(first) = row.spans.first() else {
            continue;
        };
        let text = first.text.trim();
        if is_bullet_marker(text) {
            bullets += 1;
        } else if is_number_marker(text) {
            numbers += 1;
        }
    }

    let bullet_ratio = bullets as f32 / rows.len() as f32;
    let marker_ratio = (bullets + numbers) as f32 / rows.len() as f32;

    // Numbered first columns are common in real tables; only reject 2-column ones
    bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "►" | "■" | "●"
    )
}

fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    let digits = cleaned.chars().take_while(char::is_ascii_digit).count();
    let suffix = &cleaned[digits..];
    if digits > 0 && (suffix == "." || suffix == ")") {
        return true;
    }

    let chars: Vec<char> = cleaned.chars().collect();
    chars.len() == 2 && chars[0].is_alphabetic() && (chars[1] == '.' || chars[1] == ')')
}
