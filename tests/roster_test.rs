//! Integration tests for roster extraction on generated PDFs.

use std::fs;
use std::path::Path;

use chapterkit::roster::{self, RowWidthPolicy};
use chapterkit::{Error, ExtractOptions, RosterExtractor};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One page worth of text, each entry shown at (x, y) in 10pt Helvetica.
type PageText<'a> = &'a [(f32, f32, &'a str)];

fn build_pdf(pages: &[PageText<'_>]) -> Vec<u8> {
    build_pdf_with(pages, false)
}

/// With `flipped`, each page draws in a y-down space the way browser
/// print engines do: `cm` flips the page and `Tm` flips the glyphs back.
fn build_pdf_with(pages: &[PageText<'_>], flipped: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        if flipped {
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![1.into(), 0.into(), 0.into(), (-1).into(), 0.into(), 792.into()],
            ));
        }
        for (x, y, text) in page.iter() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            if flipped {
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        (-1).into(),
                        (*x).into(),
                        (792.0 - *y).into(),
                    ],
                ));
            } else {
                operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        if flipped {
            operations.push(Operation::new("Q", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

const ROSTER_PAGE: PageText<'static> = &[
    (72.0, 700.0, "Mr."),
    (250.0, 700.0, "Smith, Jr."),
    (72.0, 680.0, "Dr."),
    (250.0, 680.0, "Lee"),
    (72.0, 660.0, "Ms."),
    (250.0, 660.0, "Day"),
];

const LETTER_PAGE: PageText<'static> = &[(72.0, 700.0, "Thank you for your membership")];

fn write_pdf(dir: &Path, pages: &[PageText<'_>]) -> std::path::PathBuf {
    let path = dir.join("roster.pdf");
    fs::write(&path, build_pdf(pages)).unwrap();
    path
}

#[test]
fn test_extract_tables_and_fallback_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), &[ROSTER_PAGE, LETTER_PAGE]);

    let extractor = RosterExtractor::open(&path, ExtractOptions::default()).unwrap();
    assert_eq!(extractor.page_count(), 2);

    let doc = extractor.extract().unwrap();
    assert_eq!(doc.pdf_version.as_deref(), Some("1.5"));
    assert_eq!(doc.pages.len(), 2);
    assert_eq!(doc.table_count(), 1);

    let table = doc.tables().next().unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(
        table.rows[0],
        vec![Some("Mr.".to_string()), Some("Smith, Jr.".to_string())]
    );

    let letter = &doc.pages[1];
    assert!(!letter.has_tables());
    assert!(letter
        .text
        .as_deref()
        .unwrap_or_default()
        .contains("membership"));
}

#[test]
fn test_roster_csv_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), &[ROSTER_PAGE]);
    let csv_path = dir.path().join("admin").join("old-member-roster.csv");
    let raw_path = dir.path().join("assets").join("extracted-data-raw.txt");

    let doc = chapterkit::extract_roster(&path).unwrap();
    roster::write_raw_file(&raw_path, doc.tables()).unwrap();
    let rows = roster::write_roster_file(&csv_path, doc.tables(), RowWidthPolicy::WriteThrough)
        .unwrap();
    assert_eq!(rows, 3);

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0].split(',').count(), 14);
    assert_eq!(lines[1], "Mr.,\"Smith, Jr.\"");
    assert_eq!(lines[2], "Dr.,Lee");
    assert_eq!(lines[3], "Ms.,Day");

    let raw = fs::read_to_string(&raw_path).unwrap();
    assert!(raw.starts_with("[[\"Mr.\",\"Smith, Jr.\"],"));
    assert!(raw.ends_with("]]\n\n"));
}

#[test]
fn test_flipped_page_keeps_row_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.pdf");
    fs::write(&path, build_pdf_with(&[ROSTER_PAGE], true)).unwrap();

    let doc = chapterkit::extract_roster(&path).unwrap();
    let table = doc.tables().next().unwrap();
    let first_column: Vec<_> = table.rows.iter().map(|r| r[0].as_deref()).collect();
    assert_eq!(first_column, vec![Some("Mr."), Some("Dr."), Some("Ms.")]);
    assert_eq!(table.rows[0][1].as_deref(), Some("Smith, Jr."));
}

#[test]
fn test_padded_csv_matches_header_width() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), &[ROSTER_PAGE]);
    let csv_path = dir.path().join("padded.csv");

    let doc = chapterkit::extract_roster(&path).unwrap();
    roster::write_roster_file(&csv_path, doc.tables(), RowWidthPolicy::PadOrTruncate).unwrap();

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[2], format!("Dr.,Lee{}", ",".repeat(12)));
    assert_eq!(lines[3], format!("Ms.,Day{}", ",".repeat(12)));
}

#[test]
fn test_text_variant() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), &[LETTER_PAGE, LETTER_PAGE]);

    let text = chapterkit::extract_roster_text(&path).unwrap();
    assert_eq!(text.matches("membership").count(), 2);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_page_without_tables_has_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), &[LETTER_PAGE]);

    let doc = chapterkit::extract_roster(&path).unwrap();
    assert!(!doc.has_tables());
    assert_eq!(doc.tables().count(), 0);
}

#[test]
fn test_non_pdf_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.pdf");
    fs::write(&path, "<!doctype html><p>not a roster</p>").unwrap();

    assert!(matches!(
        RosterExtractor::open(&path, ExtractOptions::default()),
        Err(Error::UnknownFormat)
    ));
}
