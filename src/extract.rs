//! HTML → plain text.
//!
//! Story bodies arrive from NewsBlur as HTML fragments and backfilled pages
//! arrive as full documents; both go through [`extract_text`]. The parser is
//! html5ever (via [`scraper`]), which recovers from any input, so extraction
//! never fails: the worst case is an empty string.

use scraper::{ElementRef, Html, Node};

/// Elements whose text content is never reader-visible.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "noembed", "noframes",
];

/// Elements html5ever keeps as raw text even though authors put markup in
/// them. Their text is parsed again as a fragment.
const RAW_TEXT_ELEMENTS: &[&str] = &["title", "textarea", "xmp", "plaintext"];

/// Elements that start a new run of text. Everything else is inline and its
/// text is glued to its neighbours.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "plaintext", "pre",
    "section", "table", "td", "textarea", "th", "title", "tr", "ul", "xmp",
];

/// Nesting bound for re-parsing raw-text content.
const MAX_REPARSE_DEPTH: usize = 3;

/// Strip markup from `html` and return its visible text.
///
/// Block elements are separated by a space, inline runs are kept together,
/// and whitespace is collapsed. `None` and empty input both yield `""`.
pub fn extract_text(html: Option<&str>) -> String {
    let html = match html {
        Some(h) if !h.trim().is_empty() => h,
        _ => return String::new(),
    };

    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.root_element(), &mut out, 0);

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String, depth: usize) {
    let raw = RAW_TEXT_ELEMENTS.contains(&element.value().name());

    for child in element.children() {
        match child.value() {
            Node::Text(text) if raw => reparse_text(text, out, depth),
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                let name = e.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push(' ');
                }
                collect_text(child, out, depth);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Raw-text content may itself hold tags; parse it as a fragment. Past the
/// depth bound, anything still holding a `<` is dropped.
fn reparse_text(text: &str, out: &mut String, depth: usize) {
    if !text.contains('<') {
        out.push_str(text);
        return;
    }
    if depth >= MAX_REPARSE_DEPTH {
        return;
    }
    let fragment = Html::parse_fragment(text);
    collect_text(fragment.root_element(), out, depth + 1);
}

/// Like [`extract_text`] for a raw response body of unknown encoding.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn extract_text_bytes(bytes: &[u8]) -> String {
    extract_text(Some(&String::from_utf8_lossy(bytes)))
}

/// Hard-cut `text` to at most `max` characters. No ellipsis, not word-aware.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
