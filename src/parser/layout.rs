//! Positioned text extraction.
//!
//! Walks a page's content stream, tracks the text matrix and font size, and
//! emits one [`TextSpan`] per shown string. The spans feed the table detector
//! and, when lopdf's own text extraction fails, a line-based text fallback.

use std::cmp::Ordering;

use crate::error::{Error, Result};

use super::backend::{number_from_value, PageId, PdfBackend, PdfValue};

/// TJ adjustments larger than this (in 1/1000 text space units) become a space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and size information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a new text span, estimating its width from the glyph count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A text line composed of spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Spans sorted by X
    pub spans: Vec<TextSpan>,
    /// Baseline of the first span
    pub y: f32,
}

impl TextLine {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        let y = spans.first().map(|s| s.y).unwrap_or(0.0);
        Self { spans, y }
    }

    /// Combined text, inserting a space where spans are visibly apart.
    pub fn text(&self) -> String {
        let mut result = String::new();
        let mut prev: Option<&TextSpan> = None;

        for span in &self.spans {
            if let Some(prev) = prev {
                let gap = span.x - prev.right();
                let needs_space = gap > span.font_size * 0.1
                    && !result.ends_with(' ')
                    && !span.text.starts_with(' ');
                if needs_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
            prev = Some(span);
        }

        result
    }
}

/// Group spans into lines top to bottom (PDF Y grows upwards).
pub fn group_into_lines(spans: &[TextSpan], tolerance_factor: f32) -> Vec<TextLine> {
    let mut sorted = spans.to_vec();
    sorted.sort_by(|a, b| match b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
        other => other,
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in sorted {
        let tolerance = span.font_size * tolerance_factor;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Render spans as plain text, one line per baseline.
pub fn spans_to_text(spans: &[TextSpan]) -> String {
    group_into_lines(spans, 0.3)
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts positioned spans from pages of a [`PdfBackend`].
pub struct SpanExtractor<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> SpanExtractor<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }

    /// Extract text spans from a page (1-indexed).
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let ops = self.backend.page_operations(page_id)?;

        let mut spans = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut ctm = IDENTITY;
        let mut saved: Vec<Matrix> = Vec::new();
        let mut in_text_block = false;

        for op in ops {
            let operands = &op.operands;
            let num = |i: usize, default: f32| {
                operands.get(i).and_then(number_from_value).unwrap_or(default)
            };

            let shown: Option<String> = match op.operator.as_str() {
                "q" => {
                    saved.push(ctm);
                    None
                }
                "Q" => {
                    ctm = saved.pop().unwrap_or(IDENTITY);
                    None
                }
                "cm" => {
                    let m = [
                        num(0, 1.0),
                        num(1, 0.0),
                        num(2, 0.0),
                        num(3, 1.0),
                        num(4, 0.0),
                        num(5, 0.0),
                    ];
                    ctm = multiply(&m, &ctm);
                    None
                }
                "BT" => {
                    in_text_block = true;
                    matrix = TextMatrix::default();
                    None
                }
                "ET" => {
                    in_text_block = false;
                    None
                }
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = operands.first() {
                        font_name = name.clone();
                    }
                    font_size = num(1, 12.0);
                    None
                }
                "TL" => {
                    matrix.leading = Some(num(0, 0.0));
                    None
                }
                "Td" => {
                    matrix.translate(num(0, 0.0), num(1, 0.0));
                    None
                }
                "TD" => {
                    let ty = num(1, 0.0);
                    matrix.leading = Some(-ty);
                    matrix.translate(num(0, 0.0), ty);
                    None
                }
                "Tm" => {
                    matrix.set([
                        num(0, 1.0),
                        num(1, 0.0),
                        num(2, 0.0),
                        num(3, 1.0),
                        num(4, 0.0),
                        num(5, 0.0),
                    ]);
                    None
                }
                "T*" => {
                    matrix.next_line();
                    None
                }
                "Tj" | "TJ" => operands.first().map(|v| self.show(page_id, &font_name, v)),
                "'" => {
                    matrix.next_line();
                    operands.first().map(|v| self.show(page_id, &font_name, v))
                }
                "\"" => {
                    matrix.next_line();
                    operands.get(2).map(|v| self.show(page_id, &font_name, v))
                }
                _ => None,
            };

            if let Some(text) = shown {
                if in_text_block && !text.trim().is_empty() {
                    let (x, y) = matrix.position(&ctm);
                    spans.push(TextSpan::new(text, x, y, font_size * matrix.scale(&ctm)));
                }
            }
        }

        log::debug!("Page {}: {} spans", page_num, spans.len());
        Ok(spans)
    }

    /// Decode a Tj string or TJ array into text.
    fn show(&self, page_id: PageId, font_name: &[u8], value: &PdfValue) -> String {
        match value {
            PdfValue::Str(bytes) => self.backend.decode_text(page_id, font_name, bytes),
            PdfValue::Array(items) => {
                let mut combined = String::new();
                for item in items {
                    match item {
                        PdfValue::Str(bytes) => {
                            combined.push_str(&self.backend.decode_text(page_id, font_name, bytes))
                        }
                        PdfValue::Integer(_) | PdfValue::Real(_) => {
                            let adjustment = -number_from_value(item).unwrap_or(0.0);
                            if adjustment > TJ_SPACE_THRESHOLD
                                && !combined.is_empty()
                                && !combined.ends_with(' ')
                            {
                                combined.push(' ');
                            }
                        }
                        _ => {}
                    }
                }
                combined
            }
            _ => String::new(),
        }
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector order.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `lhs × rhs`; `cm` applies as `m × CTM`.
fn multiply(lhs: &Matrix, rhs: &Matrix) -> Matrix {
    let [a1, b1, c1, d1, e1, f1] = *lhs;
    let [a2, b2, c2, d2, e2, f2] = *rhs;
    [
        a1 * a2 + b1 * c2,
        a1 * b2 + b1 * d2,
        c1 * a2 + d1 * c2,
        c1 * b2 + d1 * d2,
        e1 * a2 + f1 * c2 + e2,
        e1 * b2 + f1 * d2 + f2,
    ]
}

/// Text and line matrices for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    m: Matrix,
    line_origin: (f32, f32),
    leading: Option<f32>,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            m: IDENTITY,
            line_origin: (0.0, 0.0),
            leading: None,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, m: Matrix) {
        self.m = m;
        self.line_origin = (m[4], m[5]);
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, _, _] = self.m;
        let (lx, ly) = self.line_origin;
        let origin = (lx + tx * a + ty * c, ly + tx * b + ty * d);
        self.line_origin = origin;
        self.m[4] = origin.0;
        self.m[5] = origin.1;
    }

    fn next_line(&mut self) {
        let leading = self.leading.unwrap_or(12.0);
        self.translate(0.0, -leading);
    }

    /// Text origin in default user space.
    fn position(&self, ctm: &Matrix) -> (f32, f32) {
        let m = multiply(&self.m, ctm);
        (m[4], m[5])
    }

    /// Vertical scale of text space, so mirrored pages keep a positive size.
    fn scale(&self, ctm: &Matrix) -> f32 {
        let [_, _, c, d, _, _] = multiply(&self.m, ctm);
        let scale = (c * c + d * d).sqrt();
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }
}
