//! Run configuration for both pipelines.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "site": { "root": "public" }, "roster": { "csv_output": "out/roster.csv" } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roster::RowWidthPolicy;
use crate::site::{FragmentDefaults, PageTemplate, StripRules};

/// Pages rebuilt from the shared template.
pub const DEFAULT_REBUILD_PAGES: &[&str] = &[
    "bylaws.html",
    "scores.html",
    "resources.html",
    "media.html",
    "news.html",
    "scholarship.html",
    "programs.html",
    "minutes.html",
    "board.html",
    "contact.html",
    "pay.html",
    "events.html",
    "membership.html",
    "alumni-spotlight.html",
    "alumni-spotlight-submit.html",
];

/// Pages cleaned by the legacy markup stripper.
pub const DEFAULT_STRIP_PAGES: &[&str] = &[
    "about.html",
    "alumni-spotlight-submit.html",
    "alumni-spotlight.html",
    "board.html",
    "bylaws.html",
    "contact.html",
    "events.html",
    "media.html",
    "membership.html",
    "minutes.html",
    "news.html",
    "pay.html",
    "programs.html",
    "resources.html",
    "scholarship.html",
    "scores.html",
    "search.html",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub roster: RosterConfig,
    pub site: SiteConfig,
}

impl Config {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        for page in self
            .site
            .rebuild_pages
            .iter()
            .chain(self.site.strip_pages.iter())
        {
            if page.trim().is_empty() {
                return Err(Error::Config("page list contains an empty entry".into()));
            }
        }
        let missing = self.site.template.missing_placeholders();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "template head is missing placeholder(s): {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Replace the site section.
    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }
}

/// Paths and knobs for roster extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Roster PDF
    pub input: PathBuf,
    /// Raw table dump
    pub raw_output: PathBuf,
    /// Plain-text dump
    pub text_output: PathBuf,
    /// Normalized CSV
    pub csv_output: PathBuf,
    /// Rows printed per table
    pub preview_rows: usize,
    /// Characters printed for pages without tables
    pub preview_chars: usize,
    /// Characters printed by the plain-text variant
    pub text_preview_chars: usize,
    pub row_width: RowWidthPolicy,
    /// Skip pages that fail to extract instead of aborting
    pub lenient: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("assets/old member roster.pdf"),
            raw_output: PathBuf::from("assets/extracted-data-raw.txt"),
            text_output: PathBuf::from("assets/extracted-text.txt"),
            csv_output: PathBuf::from("admin/old-member-roster.csv"),
            preview_rows: 5,
            preview_chars: 500,
            text_preview_chars: 2000,
            row_width: RowWidthPolicy::default(),
            lenient: false,
        }
    }
}

impl RosterConfig {
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = path.into();
        self
    }

    pub fn with_raw_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_output = path.into();
        self
    }

    pub fn with_text_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.text_output = path.into();
        self
    }

    pub fn with_csv_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_output = path.into();
        self
    }

    pub fn with_row_width(mut self, policy: RowWidthPolicy) -> Self {
        self.row_width = policy;
        self
    }

    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

/// Page lists and rewrite settings for the static site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory page names are resolved against
    pub root: PathBuf,
    pub rebuild_pages: Vec<String>,
    pub strip_pages: Vec<String>,
    pub defaults: FragmentDefaults,
    pub template: PageTemplate,
    pub strip_rules: StripRules,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            rebuild_pages: DEFAULT_REBUILD_PAGES.iter().map(|p| p.to_string()).collect(),
            strip_pages: DEFAULT_STRIP_PAGES.iter().map(|p| p.to_string()).collect(),
            defaults: FragmentDefaults::default(),
            template: PageTemplate::default(),
            strip_rules: StripRules::default(),
        }
    }
}

impl SiteConfig {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_rebuild_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rebuild_pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strip_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strip_pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_template(mut self, template: PageTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_strip_rules(mut self, rules: StripRules) -> Self {
        self.strip_rules = rules;
        self
    }

    /// Path of a listed page under the site root.
    pub fn page_path(&self, page: &str) -> PathBuf {
        self.root.join(page)
    }
}
