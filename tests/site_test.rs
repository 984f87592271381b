//! Integration tests for page rebuilding and legacy markup stripping.

use std::fs;

use chapterkit::site::{self, PageOutcome, PageTemplate, StripRules};
use chapterkit::SiteConfig;
use tempfile::tempdir;

const LEGACY_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Scholarship | CVCWVUAA</title>
  <meta name="description" content="Apply for the chapter scholarship">
  <link rel="stylesheet" href="/css/old.css">
</head>
<body>
  <header class="header">
    <div class="logo">CVCWVUAA</div>
    <nav class="nav-menu"><a href="/">Home</a></nav>
  </header>

  <main class="container">
    <section class="hero">
      <header><h1>Scholarship</h1></header>
      <p>Deadline: {deadline}</p>
    </section>
  </main>

  <footer class="footer">
    <p>&copy; 2024 CVCWVUAA</p>
  </footer>

  <script>
    // Mobile: hamburger menu
    document.querySelector('.hamburger').addEventListener('click', toggle);
  </script>
  <!-- Dropdown Navigation -->
  <script src="/js/dropdown.js"></script>
</body>
</html>
"#;

#[test]
fn test_rebuild_preserves_main_verbatim() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("scholarship.html"), LEGACY_PAGE).unwrap();

    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_rebuild_pages(["scholarship.html"]);
    let report = site::rebuild_pages(&config, |_| {});
    assert_eq!(report.succeeded(), 1);

    let page = fs::read_to_string(dir.path().join("scholarship.html")).unwrap();
    let main_start = LEGACY_PAGE.find("<main").unwrap();
    let main_end = LEGACY_PAGE.find("</main>").unwrap() + "</main>".len();
    assert!(page.contains(&LEGACY_PAGE[main_start..main_end]));

    assert!(page.contains("<title>Scholarship | CVCWVUAA</title>"));
    assert!(page.contains(r#"content="Apply for the chapter scholarship""#));
    assert!(page.contains("Deadline: {deadline}"));
    assert!(!page.contains("old.css"));
    assert!(!page.contains("nav-menu"));
    assert!(page.contains("component-loader.min.js"));
}

#[test]
fn test_rebuild_uses_defaults_for_bare_page() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pay.html"), "<main><p>Pay dues</p></main>").unwrap();

    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_rebuild_pages(["pay.html"]);
    site::rebuild_pages(&config, |_| {});

    let page = fs::read_to_string(dir.path().join("pay.html")).unwrap();
    assert!(page.contains("<title>CVCWVUAA</title>"));
    assert!(page.contains(
        r#"content="Central Virginia Chapter of the WVU Alumni Association""#
    ));
}

#[test]
fn test_rebuild_without_main_leaves_file_identical() {
    let dir = tempdir().unwrap();
    let original = "<html><body><div class=\"content\">no main</div></body></html>\n";
    fs::write(dir.path().join("search.html"), original).unwrap();

    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_rebuild_pages(["search.html", "missing.html"]);
    let report = site::rebuild_pages(&config, |_| {});

    assert_eq!(report.total(), 2);
    assert_eq!(report.succeeded(), 0);
    assert!(matches!(report.entries[0].outcome, PageOutcome::NoMainContent));
    assert!(matches!(report.entries[1].outcome, PageOutcome::NotFound));
    assert_eq!(
        fs::read(dir.path().join("search.html")).unwrap(),
        original.as_bytes()
    );
    assert!(!dir.path().join("missing.html").exists());
}

#[test]
fn test_custom_template() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("news.html"), LEGACY_PAGE).unwrap();

    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_rebuild_pages(["news.html"])
        .with_template(PageTemplate {
            head: "<title>{title}</title><meta content=\"{description}\">\n".to_string(),
            footer: "\n<!-- end -->".to_string(),
        });
    site::rebuild_pages(&config, |_| {});

    let page = fs::read_to_string(dir.path().join("news.html")).unwrap();
    assert!(page.starts_with("<title>Scholarship | CVCWVUAA</title>"));
    assert!(page.ends_with("</main>\n<!-- end -->"));
}

#[test]
fn test_strip_then_strip_again_is_stable() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("about.html"), LEGACY_PAGE).unwrap();

    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_strip_pages(["about.html"]);

    let first = site::strip_pages(&config, |_| {});
    assert!(matches!(first.entries[0].outcome, PageOutcome::Updated));
    let once = fs::read_to_string(dir.path().join("about.html")).unwrap();

    assert!(once.contains(r#"<div id="wvu-masthead"></div>"#));
    assert!(once.contains(r#"<div id="wvu-footer"></div>"#));
    assert!(once.contains(r#"<main id="main-content" class="container">"#));
    assert!(once.contains("<header><h1>Scholarship</h1></header>"));
    assert!(!once.contains("hamburger"));
    assert!(!once.contains("dropdown.js"));
    assert!(once.contains("<script src=\"/includes/component-loader.js\"></script>\n</body>"));
    assert!(once.contains("<title>Scholarship | CVCWVUAA</title>"));

    let second = site::strip_pages(&config, |_| {});
    assert!(matches!(second.entries[0].outcome, PageOutcome::Unchanged));
    assert_eq!(
        fs::read_to_string(dir.path().join("about.html")).unwrap(),
        once
    );
}

#[test]
fn test_strip_after_rebuild_only_adds_main_id() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("events.html"), LEGACY_PAGE).unwrap();

    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_rebuild_pages(["events.html"])
        .with_strip_pages(["events.html"]);

    site::rebuild_pages(&config, |_| {});
    let rebuilt = fs::read_to_string(dir.path().join("events.html")).unwrap();

    // The template already carries the mount points and loader; only the id is added.
    let report = site::strip_pages(&config, |_| {});
    assert!(matches!(report.entries[0].outcome, PageOutcome::Updated));
    assert_eq!(
        fs::read_to_string(dir.path().join("events.html")).unwrap(),
        rebuilt.replace(
            r#"<main class="container">"#,
            r#"<main id="main-content" class="container">"#
        )
    );
}

#[test]
fn test_strip_with_custom_rules() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("history.html"), LEGACY_PAGE).unwrap();

    let rules = StripRules {
        footer_replacement: "  <div id=\"site-footer\"></div>".to_string(),
        loader_markup: "  <script src=\"/js/components.js\"></script>".to_string(),
        loader_marker: "components.js".to_string(),
        ..StripRules::default()
    };
    let config = SiteConfig::default()
        .with_root(dir.path())
        .with_strip_pages(["history.html"])
        .with_strip_rules(rules);

    let report = site::strip_pages(&config, |_| {});
    assert!(matches!(report.entries[0].outcome, PageOutcome::Updated));

    let page = fs::read_to_string(dir.path().join("history.html")).unwrap();
    assert!(page.contains(r#"<div id="site-footer"></div>"#));
    assert!(!page.contains("wvu-footer"));
    assert!(page.contains("<script src=\"/js/components.js\"></script>\n</body>"));
    assert!(!page.contains("component-loader"));
}

#[test]
fn test_strip_reports_missing_files() {
    let dir = tempdir().unwrap();
    let config = SiteConfig::default().with_root(dir.path());

    let report = site::strip_pages(&config, |_| {});
    assert_eq!(report.total(), 17);
    assert_eq!(report.succeeded(), 0);
    assert!(report
        .entries
        .iter()
        .all(|e| matches!(e.outcome, PageOutcome::NotFound)));
}
