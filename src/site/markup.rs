//! Markup scanner for static pages.
//!
//! Pages are tokenized into tags, comments and text with byte spans into the
//! original source, then start tags are paired with their end tags using an
//! open-element stack. Rewrites are expressed as byte-range [`Edit`]s, so every
//! byte outside an edit survives untouched.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Elements that never have an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose body is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("attribute pattern is valid")
    })
}

/// A tag attribute. Names are lowercased; values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// One lexical unit of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
        span: Range<usize>,
    },
    EndTag {
        name: String,
        span: Range<usize>,
    },
    /// `<!-- ... -->`; `body` covers the text between the delimiters
    Comment {
        span: Range<usize>,
        body: Range<usize>,
    },
    /// `<!doctype ...>` and other declarations
    Declaration {
        span: Range<usize>,
    },
    Text {
        span: Range<usize>,
    },
}

impl Token {
    /// Byte range of this token in the source.
    pub fn span(&self) -> Range<usize> {
        match self {
            Token::StartTag { span, .. }
            | Token::EndTag { span, .. }
            | Token::Comment { span, .. }
            | Token::Declaration { span }
            | Token::Text { span } => span.clone(),
        }
    }
}

/// An element located in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Span of the start tag
    pub start_tag: Range<usize>,
    /// Span of the matching end tag; `None` for void or unterminated elements
    pub end_tag: Option<Range<usize>>,
}

impl Element {
    /// Look up an attribute value. Valueless attributes yield `Some("")`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// Whether the element was closed by an explicit end tag.
    pub fn is_closed(&self) -> bool {
        self.end_tag.is_some()
    }

    /// From the start of the start tag through the end of the end tag.
    pub fn outer(&self) -> Range<usize> {
        let end = self
            .end_tag
            .as_ref()
            .map(|r| r.end)
            .unwrap_or(self.start_tag.end);
        self.start_tag.start..end
    }

    /// Between the start tag and the end tag.
    pub fn inner(&self) -> Range<usize> {
        let end = self
            .end_tag
            .as_ref()
            .map(|r| r.start)
            .unwrap_or(self.start_tag.end);
        self.start_tag.end..end
    }

    /// Whether `other` lies entirely inside this element.
    pub fn contains(&self, other: &Element) -> bool {
        let outer = self.outer();
        let theirs = other.outer();
        outer.start <= theirs.start && theirs.end <= outer.end && outer != theirs
    }
}

/// A tokenized page with its elements.
#[derive(Debug, Clone)]
pub struct Markup<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    elements: Vec<Element>,
}

impl<'a> Markup<'a> {
    /// Tokenize `source` and pair start tags with end tags.
    pub fn parse(source: &'a str) -> Self {
        let tokens = tokenize(source);
        let elements = build_elements(&tokens);
        Self {
            source,
            tokens,
            elements,
        }
    }

    /// The original source.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// All elements in document order of their start tags.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements with the given (case-insensitive) tag name.
    pub fn elements_named(&self, name: &str) -> impl Iterator<Item = &Element> + '_ {
        let name = name.to_ascii_lowercase();
        self.elements.iter().filter(move |e| e.name == name)
    }

    /// The first element with the given tag name.
    pub fn first_named(&self, name: &str) -> Option<&Element> {
        self.elements_named(name).next()
    }

    /// Source text of a byte range.
    pub fn slice(&self, range: Range<usize>) -> &'a str {
        &self.source[range]
    }

    /// Outermost closed elements named `name` that are not inside any `excluded` element.
    pub fn outermost_outside(&self, name: &str, excluded: &str) -> Vec<&Element> {
        let fences: Vec<&Element> = self.elements_named(excluded).collect();
        let mut picked: Vec<&Element> = Vec::new();

        for el in self.elements_named(name).filter(|e| e.is_closed()) {
            if fences.iter().any(|f| f.contains(el)) {
                continue;
            }
            if picked.iter().any(|p| p.contains(el)) {
                continue;
            }
            picked.push(el);
        }
        picked
    }
}

/// Replace `range` of the source with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn remove(range: Range<usize>) -> Self {
        Self::replace(range, "")
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }
}

/// Apply non-overlapping edits to `source`. Edits overlapping an earlier one are dropped.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.range.start, e.range.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.range.start < cursor {
            log::debug!("Dropping overlapping edit at {:?}", edit.range);
            continue;
        }
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Split markup into tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let lower = source.to_ascii_lowercase();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        let Some((token, end)) = scan_tag(source, &lower, pos) else {
            pos += 1;
            continue;
        };

        if text_start < pos {
            tokens.push(Token::Text {
                span: text_start..pos,
            });
        }

        let raw_text_name = match &token {
            Token::StartTag {
                name, self_closing, ..
            } if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
            _ => None,
        };
        tokens.push(token);
        pos = end;

        if let Some(name) = raw_text_name {
            let closer = format!("</{}", name);
            let body_end = lower[pos..]
                .find(&closer)
                .map(|i| pos + i)
                .unwrap_or(bytes.len());
            if pos < body_end {
                tokens.push(Token::Text {
                    span: pos..body_end,
                });
            }
            pos = body_end;
        }
        text_start = pos;
    }

    if text_start < bytes.len() {
        tokens.push(Token::Text {
            span: text_start..bytes.len(),
        });
    }

    tokens
}

/// Scan one tag-like construct starting at `start` (which holds `<`).
fn scan_tag(source: &str, lower: &str, start: usize) -> Option<(Token, usize)> {
    let bytes = source.as_bytes();
    let rest = &lower[start..];

    if rest.starts_with("<!--") {
        let body_start = start + 4;
        let (body_end, end) = match lower[body_start..].find("-->") {
            Some(i) => (body_start + i, body_start + i + 3),
            None => (bytes.len(), bytes.len()),
        };
        return Some((
            Token::Comment {
                span: start..end,
                body: body_start..body_end,
            },
            end,
        ));
    }

    if rest.starts_with("<!") || rest.starts_with("<?") {
        let end = lower[start..]
            .find('>')
            .map(|i| start + i + 1)
            .unwrap_or(bytes.len());
        return Some((Token::Declaration { span: start..end }, end));
    }

    let is_end = rest.starts_with("</");
    let name_start = if is_end { start + 2 } else { start + 1 };
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
        return None;
    }

    let name_end = name_start
        + bytes[name_start..]
            .iter()
            .position(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
            .unwrap_or(bytes.len() - name_start);
    let name = lower[name_start..name_end].to_string();

    let close = find_tag_close(bytes, name_end)?;
    let end = close + 1;

    if is_end {
        return Some((Token::EndTag { name, span: start..end }, end));
    }

    let body = &source[name_end..close];
    let self_closing = body.trim_end().ends_with('/');
    let attrs = parse_attributes(body);

    Some((
        Token::StartTag {
            name,
            attrs,
            self_closing,
            span: start..end,
        },
        end,
    ))
}

/// Position of the `>` closing a tag, skipping quoted attribute values.
fn find_tag_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_attributes(body: &str) -> Vec<Attribute> {
    attribute_regex()
        .captures_iter(body)
        .map(|caps| Attribute {
            name: caps[1].to_ascii_lowercase(),
            value: caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string()),
        })
        .collect()
}

fn build_elements(tokens: &[Token]) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for token in tokens {
        match token {
            Token::StartTag {
                name,
                attrs,
                self_closing,
                span,
            } => {
                elements.push(Element {
                    name: name.clone(),
                    attrs: attrs.clone(),
                    start_tag: span.clone(),
                    end_tag: None,
                });
                if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                    open.push(elements.len() - 1);
                }
            }
            Token::EndTag { name, span } => {
                // Unmatched end tags are ignored; anything opened after the match is left unterminated
                if let Some(depth) = open.iter().rposition(|&i| elements[i].name == *name) {
                    let idx = open[depth];
                    elements[idx].end_tag = Some(span.clone());
                    open.truncate(depth);
                }
            }
            _ => {}
        }
    }

    elements
}
