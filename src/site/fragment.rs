//! Pulls the page-specific pieces out of an existing page.

use serde::{Deserialize, Serialize};

use super::markup::Markup;

/// Values used when a page has no title or no description meta tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentDefaults {
    pub title: String,
    pub description: String,
}

impl Default for FragmentDefaults {
    fn default() -> Self {
        Self {
            title: "CVCWVUAA".to_string(),
            description: "Central Virginia Chapter of the WVU Alumni Association".to_string(),
        }
    }
}

/// The parts of a page that survive a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFragments {
    pub title: String,
    pub description: String,
    /// The main-content element, start tag through end tag, verbatim
    pub main_content: String,
}

impl PageFragments {
    /// Extract fragments from `html`. Returns `None` when the page has no
    /// closed `<main>` element; such a page cannot be rebuilt.
    pub fn extract(html: &str, defaults: &FragmentDefaults) -> Option<Self> {
        let markup = Markup::parse(html);
        let main_content = extract_main_content(&markup)?;

        Some(Self {
            title: extract_title(&markup).unwrap_or_else(|| defaults.title.clone()),
            description: extract_description(&markup)
                .unwrap_or_else(|| defaults.description.clone()),
            main_content,
        })
    }
}

/// Text of the first `<title>` element.
pub fn extract_title(markup: &Markup<'_>) -> Option<String> {
    markup
        .first_named("title")
        .filter(|el| el.is_closed())
        .map(|el| markup.slice(el.inner()).to_string())
}

/// `content` of the first `<meta name="description">`, in whatever attribute order.
pub fn extract_description(markup: &Markup<'_>) -> Option<String> {
    markup
        .elements_named("meta")
        .find(|el| {
            el.attr("name")
                .is_some_and(|n| n.eq_ignore_ascii_case("description"))
        })
        .and_then(|el| el.attr("content").map(str::to_string))
}

/// The first `<main>` element through its matching `</main>`.
///
/// Only the first `<main>` is considered: if it is unterminated the page has
/// no usable main content, even when a later one is closed.
pub fn extract_main_content(markup: &Markup<'_>) -> Option<String> {
    let main = markup.first_named("main")?;
    if !main.is_closed() {
        return None;
    }
    Some(markup.slice(main.outer()).to_string())
}
