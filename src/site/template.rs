//! Shared page shell used when rebuilding pages.

use serde::{Deserialize, Serialize};

use super::fragment::PageFragments;

/// Head of every rebuilt page. `{title}` and `{description}` are filled in.
pub const DEFAULT_HEAD: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <meta name="theme-color" content="#EEAA00">

  <link rel="icon" type="image/png" href="/assets/favicon.png">
  <!-- WVU Official Fonts -->
  <link rel="preconnect" href="https://cdn.fonts.net">
  <link href="https://cdn.fonts.net/kit/b339d500-35c3-11ed-aaf7-06b70d83f6b0/b339d500-35c3-11ed-aaf7-06b70d83f6b0.css" rel="stylesheet">

  <link rel="stylesheet" href="/css/styles.min.css">
  <link rel="stylesheet" href="/css/wvu-components.min.css">
  <link rel="stylesheet" href="/css/wvu-cta.min.css">
  <link rel="stylesheet" href="/css/wvu-cards.min.css">
  <link rel="stylesheet" href="/assets/enhanced-styles.css">
  <link rel="stylesheet" href="/css/social-media.min.css">

  <!-- Google tag (gtag.js) -->
  <script async src="https://www.googletagmanager.com/gtag/js?id=G-G14Q10H6Y2"></script>
  <script>
    window.dataLayer = window.dataLayer || [];
    function gtag(){dataLayer.push(arguments);}
    gtag('js', new Date());
    gtag('config', 'G-G14Q10H6Y2');
  </script>
</head>
<body>

<!-- Skip to main content for accessibility -->
<a href="#main-content" class="skip-to-main">Skip to main content</a>

<!-- WVU Masthead Component -->
<div id="wvu-masthead"></div>

<!-- WVU Primary Navigation Component -->
<div id="wvu-navigation"></div>

"##;

/// Tail of every rebuilt page.
pub const DEFAULT_FOOTER: &str = r#"
<div id="wvu-footer"></div>

<!-- Social Media Integration -->
<script src="/js/social-media.min.js"></script>
<script src="/js/theme-toggle.min.js"></script>
<script src="/js/mobile-enhancer.js"></script>

<!-- Load WVU Components (Masthead, Navigation, Footer) -->
<script src="/includes/component-loader.min.js"></script>

</body>
</html>"#;

/// Head and footer wrapped around a page's main content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTemplate {
    pub head: String,
    pub footer: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            head: DEFAULT_HEAD.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

impl PageTemplate {
    /// Build a full page: filled head, main content verbatim, footer.
    pub fn compose(&self, fragments: &PageFragments) -> String {
        let description = fragments.description.replace('"', "&quot;");
        let head = fill_placeholders(
            &self.head,
            &[
                ("title", fragments.title.as_str()),
                ("description", description.as_str()),
            ],
        );

        let mut page =
            String::with_capacity(head.len() + fragments.main_content.len() + self.footer.len());
        page.push_str(&head);
        page.push_str(&fragments.main_content);
        page.push_str(&self.footer);
        page
    }

    /// Names of `{placeholder}`s the head template is missing.
    pub fn missing_placeholders(&self) -> Vec<&'static str> {
        ["title", "description"]
            .into_iter()
            .filter(|name| !self.head.contains(&format!("{{{}}}", name)))
            .collect()
    }
}

/// Replace `{name}` placeholders in one pass.
///
/// Unknown `{...}` sequences and lone braces are copied as-is, and inserted
/// values are never scanned again.
pub fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });

        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
