//! HTML reduction to compact text.
//!
//! Keeps the body only. Drops images, links, inputs, scripts and
//! invisible metadata together with their content. Unwraps layout wrappers
//! (`div`, `span`, `strong`, `li`) in place, strips every attribute, then
//! collapses the result into trimmed, non-empty lines.
//!
//! The output parses back to the same tree, so normalizing it again is a
//! no-op.
//!
//! Remaining block tags such as `<p>` or `<h2>` stay as bare tags; they cost
//! a few characters and help the extraction model tell sections apart.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::types::document::{NormalizedText, RawDocument};

/// Elements removed together with everything inside them.
const REMOVED: &[&str] = &[
    "img", "picture", "source", "track", "embed", "a", "input", "script",
    // never rendered, or relocated by the parser on a second pass
    "iframe", "style", "link", "meta", "base", "title", "noscript", "template",
];

/// Elements replaced by their children.
const UNWRAPPED: &[&str] = &["div", "span", "strong", "li"];

/// Elements serialized with no closing tag.
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is emitted without escaping.
const RAW_TEXT: &[&str] = &["xmp", "noembed", "noframes"];

/// Elements whose first newline the parser swallows.
const LEADING_NEWLINE: &[&str] = &["pre", "listing", "textarea"];

/// Normalize a fetched document.
pub fn normalize(document: &RawDocument) -> NormalizedText {
    let text = normalize_html(&document.body);
    debug!(
        url = %document.final_url,
        raw_bytes = document.content_length(),
        chars = text.char_count(),
        lines = text.line_count(),
        "Normalized listing page"
    );
    text
}

/// Normalize an HTML string. Total: any input yields a (possibly empty) text.
pub fn normalize_html(html: &str) -> NormalizedText {
    let document = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 2);

    match body(&document) {
        Some(body) => write_children(body, &mut out),
        // No body (frameset documents): keep whatever content the root has.
        None => write_children(document.root_element(), &mut out),
    }

    NormalizedText::collapse(&out)
}

fn body(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

fn write_children(element: ElementRef<'_>, out: &mut String) {
    let raw = RAW_TEXT.contains(&element.value().name());

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if raw {
                    out.push_str(text);
                } else {
                    push_escaped(out, text);
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, out);
                }
            }
            // comments, doctypes, processing instructions
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    if REMOVED.contains(&name) {
        return;
    }

    // The document skeleton is transparent too. `plaintext` has no end tag,
    // so its text is kept as ordinary escaped text.
    if UNWRAPPED.contains(&name) || matches!(name, "html" | "head" | "body" | "plaintext") {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);
    out.push('>');

    if VOID.contains(&name) {
        return;
    }

    let start = out.len();
    write_children(element, out);
    if LEADING_NEWLINE.contains(&name) {
        trim_start_at(out, start);
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Drop whitespace written after `start`, up to the first visible character.
fn trim_start_at(out: &mut String, start: usize) {
    let leading = out[start..].len() - out[start..].trim_start().len();
    out.replace_range(start..start + leading, "");
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
