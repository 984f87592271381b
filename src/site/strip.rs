//! In-place removal of legacy header, footer and navigation scripts.
//!
//! Each pass re-parses the page it receives, so byte offsets never go stale
//! between passes.

use serde::{Deserialize, Serialize};

use super::markup::{apply_edits, Edit, Markup, Token};

/// What the stripper inserts and what it looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripRules {
    /// Replaces each legacy `<header>` outside the main content
    pub header_replacement: String,
    /// Replaces each legacy `<footer>` outside the main content
    pub footer_replacement: String,
    /// `id` given to the first `<main>` when no element carries it yet
    pub main_id: String,
    /// Bare `<script>` blocks whose leading `//` comment starts with one of these are removed
    pub script_signatures: Vec<String>,
    /// Text of the comment preceding the dropdown script include
    pub dropdown_comment: String,
    /// `src` of the dropdown script include
    pub dropdown_src: String,
    /// A script whose `src` contains this counts as the component loader
    pub loader_marker: String,
    /// Inserted before `</body>` when no loader script is present
    pub loader_markup: String,
}

impl Default for StripRules {
    fn default() -> Self {
        Self {
            header_replacement: "    <div id=\"wvu-masthead\"></div>\n    <div id=\"wvu-navigation\"></div>"
                .to_string(),
            footer_replacement: "    <div id=\"wvu-footer\"></div>".to_string(),
            main_id: "main-content".to_string(),
            script_signatures: vec!["Mobile:".to_string(), "Theme toggle".to_string()],
            dropdown_comment: "Dropdown Navigation".to_string(),
            dropdown_src: "/js/dropdown.js".to_string(),
            loader_marker: "component-loader".to_string(),
            loader_markup: "    <script src=\"/includes/component-loader.js\"></script>".to_string(),
        }
    }
}

/// Result of stripping one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripOutcome {
    /// The page changed; carries the new text
    Updated(String),
    /// Nothing to do
    Unchanged,
}

/// Strip a page and report whether anything changed (byte-for-byte).
pub fn strip_page(html: &str, rules: &StripRules) -> StripOutcome {
    let stripped = strip_legacy_markup(html, rules);
    if stripped == html {
        StripOutcome::Unchanged
    } else {
        StripOutcome::Updated(stripped)
    }
}

/// Apply every stripping pass in order.
pub fn strip_legacy_markup(html: &str, rules: &StripRules) -> String {
    let html = replace_outside_main(html, "header", &rules.header_replacement);
    let html = replace_outside_main(&html, "footer", &rules.footer_replacement);
    let html = ensure_main_id(&html, &rules.main_id);
    let html = remove_signed_scripts(&html, &rules.script_signatures);
    let html = remove_dropdown_include(&html, &rules.dropdown_comment, &rules.dropdown_src);
    ensure_loader(&html, &rules.loader_marker, &rules.loader_markup)
}

/// Replace each outermost `name` element that is not part of the main content.
fn replace_outside_main(html: &str, name: &str, replacement: &str) -> String {
    let markup = Markup::parse(html);
    let edits: Vec<Edit> = markup
        .outermost_outside(name, "main")
        .into_iter()
        .map(|el| Edit::replace(el.outer(), replacement))
        .collect();
    log::debug!("Replacing {} <{}> element(s)", edits.len(), name);
    apply_edits(html, edits)
}

fn ensure_main_id(html: &str, main_id: &str) -> String {
    let markup = Markup::parse(html);
    if markup.elements().iter().any(|el| el.attr("id") == Some(main_id)) {
        return html.to_string();
    }

    let Some(main) = markup
        .elements_named("main")
        .find(|el| el.attr("id").is_none())
    else {
        return html.to_string();
    };

    let after_name = main.start_tag.start + "<main".len();
    apply_edits(
        html,
        vec![Edit::insert(after_name, format!(" id=\"{}\"", main_id))],
    )
}

fn remove_signed_scripts(html: &str, signatures: &[String]) -> String {
    let markup = Markup::parse(html);
    let edits: Vec<Edit> = markup
        .elements_named("script")
        .filter(|el| el.attrs.is_empty() && el.is_closed())
        .filter(|el| {
            let body = markup.slice(el.inner()).trim_start();
            body.strip_prefix("//").is_some_and(|comment| {
                let comment = comment.trim_start();
                signatures.iter().any(|sig| comment.starts_with(sig.as_str()))
            })
        })
        .map(|el| Edit::remove(el.outer()))
        .collect();
    apply_edits(html, edits)
}

/// Remove `<!-- Dropdown Navigation -->` followed by the dropdown script include.
fn remove_dropdown_include(html: &str, comment_text: &str, src: &str) -> String {
    let markup = Markup::parse(html);
    let tokens = markup.tokens();
    let mut edits = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let Token::Comment { span, body } = token else {
            continue;
        };
        if markup.slice(body.clone()).trim() != comment_text {
            continue;
        }

        let mut rest = tokens[i + 1..].iter().peekable();
        if let Some(Token::Text { span: gap }) = rest.peek() {
            if markup.slice(gap.clone()).trim().is_empty() {
                rest.next();
            }
        }

        let open = rest.next();
        let close = rest.next();
        if let (
            Some(Token::StartTag {
                name: open_name,
                attrs,
                ..
            }),
            Some(Token::EndTag {
                name: close_name,
                span: close_span,
            }),
        ) = (open, close)
        {
            let is_include = open_name == "script"
                && close_name == "script"
                && attrs.len() == 1
                && attrs[0].name == "src"
                && attrs[0].value.as_deref() == Some(src);
            if is_include {
                edits.push(Edit::remove(span.start..close_span.end));
            }
        }
    }

    apply_edits(html, edits)
}

fn ensure_loader(html: &str, marker: &str, loader_markup: &str) -> String {
    let markup = Markup::parse(html);
    let has_loader = markup
        .elements_named("script")
        .any(|el| el.attr("src").is_some_and(|src| src.contains(marker)));
    if has_loader {
        return html.to_string();
    }

    let body_close = markup.tokens().iter().find_map(|t| match t {
        Token::EndTag { name, span } if name == "body" => Some(span.start),
        _ => None,
    });

    match body_close {
        Some(at) => apply_edits(html, vec![Edit::insert(at, format!("{}\n", loader_markup))]),
        None => html.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"<!doctype html>
<html>
<head><title>News</title></head>
<body>
<header class="site-header">
  <nav><ul><li><a href="/">Home</a></li></ul></nav>
</header>
<main class="content">
  <article><header><h2>Story</h2></header><p>Text</p></article>
</main>
<footer class="site-footer"><p>&copy; CVCWVUAA</p></footer>
<script>
  // Mobile: toggle the menu
  document.querySelector('.menu').onclick = () => {};
</script>
<script>// Theme toggle
  localStorage.theme = 'dark';
</script>
<script>
  // Analytics helper
  track();
</script>
<!-- Dropdown Navigation -->
<script src="/js/dropdown.js"></script>
</body>
</html>"#;

    #[test]
    fn test_strip_legacy_page() {
        let out = strip_legacy_markup(LEGACY, &StripRules::default());

        assert!(!out.contains("site-header"));
        assert!(!out.contains("site-footer"));
        assert!(out.contains("<div id=\"wvu-masthead\"></div>\n    <div id=\"wvu-navigation\"></div>"));
        assert!(out.contains("<div id=\"wvu-footer\"></div>"));
        assert!(out.contains(r#"<main id="main-content" class="content">"#));
        assert!(out.contains("<header><h2>Story</h2></header>"));
        assert!(!out.contains("Mobile:"));
        assert!(!out.contains("Theme toggle"));
        assert!(out.contains("// Analytics helper"));
        assert!(!out.contains("dropdown.js"));
        assert!(!out.contains("Dropdown Navigation"));
        assert!(out.contains("<script src=\"/includes/component-loader.js\"></script>\n</body>"));
    }

    #[test]
    fn test_strip_is_idempotent() {
        let rules = StripRules::default();
        let first = match strip_page(LEGACY, &rules) {
            StripOutcome::Updated(text) => text,
            StripOutcome::Unchanged => panic!("legacy page should change"),
        };
        assert_eq!(strip_page(&first, &rules), StripOutcome::Unchanged);
    }

    #[test]
    fn test_existing_main_content_id_is_respected() {
        let html = r#"<body><div id="main-content"></div><main class="x"></main></body>"#;
        let out = ensure_main_id(html, "main-content");
        assert_eq!(out, html);
    }

    #[test]
    fn test_main_with_other_id_is_left_alone() {
        let html = r#"<main id="home">x</main>"#;
        assert_eq!(ensure_main_id(html, "main-content"), html);
    }

    #[test]
    fn test_minified_loader_counts_as_present() {
        let html = "<body><script src=\"/includes/component-loader.min.js\"></script></body>";
        assert_eq!(strip_page(html, &StripRules::default()), StripOutcome::Unchanged);
    }

    #[test]
    fn test_no_body_no_loader_insert() {
        let html = "<main id=\"main-content\">fragment</main>";
        assert_eq!(strip_page(html, &StripRules::default()), StripOutcome::Unchanged);
    }

    #[test]
    fn test_dropdown_script_without_comment_is_kept() {
        let html = "<body><script src=\"/js/dropdown.js\"></script><script src=\"/includes/component-loader.js\"></script></body>";
        assert_eq!(strip_page(html, &StripRules::default()), StripOutcome::Unchanged);
    }

    #[test]
    fn test_signed_script_with_attributes_is_kept() {
        let html = "<body><script type=\"module\">\n  // Mobile: menu\n</script><script>// Mobile: menu</script><script src=\"/includes/component-loader.js\"></script></body>";
        let out = strip_legacy_markup(html, &StripRules::default());
        assert_eq!(
            out,
            "<body><script type=\"module\">\n  // Mobile: menu\n</script><script src=\"/includes/component-loader.js\"></script></body>"
        );
    }
}
