//! Runs the rebuild and strip passes over the configured page lists.
//!
//! A page that fails is recorded and the loop moves on.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::{Error, Result};

use super::fragment::{FragmentDefaults, PageFragments};
use super::strip::{strip_page, StripOutcome, StripRules};
use super::template::PageTemplate;

/// What happened to one page.
#[derive(Debug)]
pub enum PageOutcome {
    /// Rewritten from the template
    Rebuilt,
    /// Legacy markup stripped and written back
    Updated,
    /// Already clean; not written
    Unchanged,
    /// The file does not exist
    NotFound,
    /// No closed `<main>` element; left untouched
    NoMainContent,
    /// Reading or writing failed
    Failed(Error),
}

impl PageOutcome {
    /// Whether the page was written.
    pub fn is_written(&self) -> bool {
        matches!(self, PageOutcome::Rebuilt | PageOutcome::Updated)
    }
}

/// Outcome for one listed page.
#[derive(Debug)]
pub struct PageReport {
    /// Page name as listed in the config
    pub page: String,
    /// Resolved path
    pub path: PathBuf,
    pub outcome: PageOutcome,
}

/// Outcomes for a whole page list, in list order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<PageReport>,
}

impl BatchReport {
    /// Number of listed pages.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of pages written.
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_written()).count()
    }

    /// Number of pages that failed or were missing.
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.outcome,
                    PageOutcome::NotFound | PageOutcome::NoMainContent | PageOutcome::Failed(_)
                )
            })
            .count()
    }
}

/// Rebuild one page in place from `template`.
///
/// The file is left byte-identical when it has no main content.
pub fn rebuild_page(
    path: &Path,
    template: &PageTemplate,
    defaults: &FragmentDefaults,
) -> Result<PageOutcome> {
    let html = fs::read_to_string(path)?;
    let Some(fragments) = PageFragments::extract(&html, defaults) else {
        log::warn!("No <main> content in {}", path.display());
        return Ok(PageOutcome::NoMainContent);
    };

    fs::write(path, template.compose(&fragments))?;
    log::info!("Rebuilt {}", path.display());
    Ok(PageOutcome::Rebuilt)
}

/// Strip legacy markup from one page, writing only when it changed.
pub fn strip_file(path: &Path, rules: &StripRules) -> Result<PageOutcome> {
    let html = fs::read_to_string(path)?;
    match strip_page(&html, rules) {
        StripOutcome::Updated(stripped) => {
            fs::write(path, stripped)?;
            log::info!("Updated {}", path.display());
            Ok(PageOutcome::Updated)
        }
        StripOutcome::Unchanged => Ok(PageOutcome::Unchanged),
    }
}

/// Rebuild every page in `config.rebuild_pages`.
///
/// `on_page` is called before each page with its name and after with its report.
pub fn rebuild_pages<F>(config: &SiteConfig, on_page: F) -> BatchReport
where
    F: FnMut(BatchEvent<'_>),
{
    run_batch(config, &config.rebuild_pages, on_page, |path| {
        rebuild_page(path, &config.template, &config.defaults)
    })
}

/// Strip every page in `config.strip_pages`.
pub fn strip_pages<F>(config: &SiteConfig, on_page: F) -> BatchReport
where
    F: FnMut(BatchEvent<'_>),
{
    run_batch(config, &config.strip_pages, on_page, |path| {
        strip_file(path, &config.strip_rules)
    })
}

/// Progress notifications from a batch run.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// About to process a page that exists
    Started(&'a str),
    /// Finished a page
    Finished(&'a PageReport),
}

fn run_batch<F, P>(config: &SiteConfig, pages: &[String], mut on_page: F, mut process: P) -> BatchReport
where
    F: FnMut(BatchEvent<'_>),
    P: FnMut(&Path) -> Result<PageOutcome>,
{
    let mut report = BatchReport::default();

    for page in pages {
        let path = config.page_path(page);
        let outcome = if !path.is_file() {
            log::warn!("{} not found", path.display());
            PageOutcome::NotFound
        } else {
            on_page(BatchEvent::Started(page));
            process(&path).unwrap_or_else(|e| {
                log::warn!("Failed to process {}: {}", path.display(), e);
                PageOutcome::Failed(e)
            })
        };

        report.entries.push(PageReport {
            page: page.clone(),
            path,
            outcome,
        });
        if let Some(entry) = report.entries.last() {
            on_page(BatchEvent::Finished(entry));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rebuild_reports_each_page() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "<title>A</title><main>a</main>").unwrap();
        fs::write(dir.path().join("b.html"), "<p>no main here</p>").unwrap();

        let config = SiteConfig::default()
            .with_root(dir.path())
            .with_rebuild_pages(["a.html", "b.html", "c.html"]);

        let mut started = Vec::new();
        let report = rebuild_pages(&config, |event| {
            if let BatchEvent::Started(page) = event {
                started.push(page.to_string());
            }
        });

        assert_eq!(started, vec!["a.html", "b.html"]);
        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        assert!(matches!(report.entries[0].outcome, PageOutcome::Rebuilt));
        assert!(matches!(report.entries[1].outcome, PageOutcome::NoMainContent));
        assert!(matches!(report.entries[2].outcome, PageOutcome::NotFound));

        let rebuilt = fs::read_to_string(dir.path().join("a.html")).unwrap();
        assert!(rebuilt.contains("<title>A</title>"));
        assert_eq!(
            fs::read_to_string(dir.path().join("b.html")).unwrap(),
            "<p>no main here</p>"
        );
    }

    #[test]
    fn test_strip_writes_only_on_change() {
        let dir = tempdir().unwrap();
        let clean = "<body><main id=\"main-content\">x</main>\n<script src=\"/includes/component-loader.js\"></script>\n</body>";
        fs::write(dir.path().join("clean.html"), clean).unwrap();
        fs::write(
            dir.path().join("old.html"),
            "<body><header>nav</header><main>x</main></body>",
        )
        .unwrap();

        let config = SiteConfig::default()
            .with_root(dir.path())
            .with_strip_pages(["clean.html", "old.html"]);
        let report = strip_pages(&config, |_| {});

        assert!(matches!(report.entries[0].outcome, PageOutcome::Unchanged));
        assert!(matches!(report.entries[1].outcome, PageOutcome::Updated));
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("clean.html")).unwrap(),
            clean
        );
    }

    #[test]
    fn test_unreadable_page_is_failed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bin.html"), [0xff, 0xfe, 0x00]).unwrap();

        let config = SiteConfig::default()
            .with_root(dir.path())
            .with_strip_pages(["bin.html"]);
        let report = strip_pages(&config, |_| {});
        assert!(matches!(report.entries[0].outcome, PageOutcome::Failed(_)));
    }
}
