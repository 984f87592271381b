//! PDF access, positioned text extraction and table detection.

mod backend;
mod layout;
mod options;
mod table_detector;

pub use backend::{decode_text_simple, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue};
pub use layout::{group_into_lines, spans_to_text, SpanExtractor, TextLine, TextSpan};
pub use options::{ErrorMode, ExtractOptions};
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
