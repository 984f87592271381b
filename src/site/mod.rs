//! Static page rewriting.
//!
//! Two passes share the [`markup`] scanner:
//!
//! - **rebuild**: keep a page's title, description and `<main>` element and
//!   wrap them in the shared [`PageTemplate`];
//! - **strip**: remove legacy header, footer and navigation scripts in place
//!   with [`strip_page`].

pub mod batch;
pub mod fragment;
pub mod markup;
pub mod strip;
pub mod template;

pub use batch::{
    rebuild_page, rebuild_pages, strip_file, strip_pages, BatchEvent, BatchReport, PageOutcome,
    PageReport,
};
pub use fragment::{
    extract_description, extract_main_content, extract_title, FragmentDefaults, PageFragments,
};
pub use markup::{apply_edits, Edit, Element, Markup, Token};
pub use strip::{strip_legacy_markup, strip_page, StripOutcome, StripRules};
pub use template::{fill_placeholders, PageTemplate, DEFAULT_FOOTER, DEFAULT_HEAD};
