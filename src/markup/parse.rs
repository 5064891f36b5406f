//! JSX-aware parsing on top of the `tl` HTML parser.
//!
//! Input is the JSX fragment of a generated component (the markup returned
//! by the generator), not a whole JS module. `tl` cannot take raw JSX because
//! of brace-expression attributes (`style={{...}}`, `onClick={...}`), so
//! parsing runs in three steps:
//!
//! 1. pre-scan: every `={...}` attribute value (balanced braces, quote-aware)
//!    is swapped for a quoted placeholder and remembered
//! 2. `tl::parse` over the neutralized text
//! 3. conversion into the owned tree, restoring placeholders: `style={{...}}`
//!    becomes a [`StyleMap`], any other expression stays opaque
//!
//! Comments and whitespace-only text are dropped; the printer re-indents.

use thiserror::Error;

use super::node::{Attr, AttrValue, Document, Element, Node, StyleMap};

/// Parse failures are fatal: the pipeline never runs on a broken tree.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("markup parse error: {0}")]
    Parse(String),

    #[error("input contains no elements")]
    Empty,
}

// Private-use sentinels, cannot occur in real input text.
const SWAP_OPEN: char = '\u{E000}';
const SWAP_CLOSE: char = '\u{E001}';

/// Parse JSX markup text into a [`Document`].
pub fn parse_document(input: &str) -> Result<Document, MarkupError> {
    let (neutral, swaps) = neutralize_expressions(input);

    let dom = tl::parse(&neutral, tl::ParserOptions::default())
        .map_err(|e| MarkupError::Parse(e.to_string()))?;

    let parser = dom.parser();
    let mut roots = Vec::new();
    for handle in dom.children() {
        if let Some(node) = convert_node(*handle, parser, &swaps) {
            roots.push(node);
        }
    }

    if roots.iter().all(|n| matches!(n, Node::Text(_))) {
        return Err(MarkupError::Empty);
    }

    Ok(Document { roots })
}

// ============================================================================
// Expression neutralization
// ============================================================================

/// Replace every `={...}` with `="<sentinel>"`, collecting the originals.
///
/// Brace matching is quote-aware so `={() => f('}')}` captures correctly.
/// A stray `={` in text content is also swapped; [`restore_text`] undoes it.
fn neutralize_expressions(input: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(input.len());
    let mut swaps = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'=' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            if let Some(end) = matching_brace(input, i + 1) {
                let expr = &input[i + 1..=end];
                out.push_str(&format!("=\"{}expr:{}{}\"", SWAP_OPEN, swaps.len(), SWAP_CLOSE));
                swaps.push(expr.to_string());
                i = end + 1;
                continue;
            }
        }
        // Advance one char (not byte) to keep UTF-8 intact
        let ch_len = input[i..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&input[i..i + ch_len]);
        i += ch_len;
    }

    (out, swaps)
}

/// Index of the brace matching the one at `open` (byte offset of `{`).
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (off, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + off);
                }
            }
            _ => {}
        }
    }
    None
}

/// Undo sentinel substitution inside text content.
fn restore_text(text: &str, swaps: &[String]) -> String {
    if !text.contains(SWAP_OPEN) {
        return text.to_string();
    }
    let mut out = text.to_string();
    for (i, swap) in swaps.iter().enumerate() {
        let quoted = format!("=\"{SWAP_OPEN}expr:{i}{SWAP_CLOSE}\"");
        if out.contains(&quoted) {
            out = out.replace(&quoted, &format!("={swap}"));
        }
        let bare = format!("{SWAP_OPEN}expr:{i}{SWAP_CLOSE}");
        if out.contains(&bare) {
            out = out.replace(&bare, swap);
        }
    }
    out
}

/// Recover a swapped expression from a placeholder attribute value.
fn swap_index(value: &str) -> Option<usize> {
    let inner = value.strip_prefix(SWAP_OPEN)?.strip_suffix(SWAP_CLOSE)?;
    inner.strip_prefix("expr:")?.parse().ok()
}

// ============================================================================
// tl DOM conversion
// ============================================================================

/// Convert a tl node handle into an owned tree node.
fn convert_node(handle: tl::NodeHandle, parser: &tl::Parser, swaps: &[String]) -> Option<Node> {
    let node = handle.get(parser)?;

    match node {
        tl::Node::Tag(tag) => {
            let tag_name = tag.name().as_utf8_str().to_string();

            let mut elem = Element::new(tag_name);
            for (key, value) in tag.attributes().iter() {
                let name = key.as_ref().to_string();
                let raw = value.map(|v| v.to_string()).unwrap_or_default();
                elem.attrs.push(Attr {
                    value: convert_attr_value(&name, &raw, swaps),
                    name,
                });
            }

            for child_handle in tag.children().top().iter() {
                if let Some(child) = convert_node(*child_handle, parser, swaps) {
                    elem.children.push(child);
                }
            }

            Some(Node::element(elem))
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            if text.trim().is_empty() {
                None
            } else {
                Some(Node::Text(restore_text(text.trim(), swaps)))
            }
        }
        tl::Node::Comment(_) => None, // Skip comments
    }
}

/// Restore a placeholder attribute value to its structured form.
fn convert_attr_value(name: &str, raw: &str, swaps: &[String]) -> AttrValue {
    let Some(idx) = swap_index(raw) else {
        return AttrValue::Literal(raw.to_string());
    };
    let Some(expr) = swaps.get(idx) else {
        return AttrValue::Literal(raw.to_string());
    };

    // `style={{...}}` object literals get parsed; anything else stays opaque
    if name == "style" && expr.starts_with("{{") && expr.ends_with("}}") {
        return AttrValue::Style(StyleMap::parse_object(expr));
    }

    // Drop the single outer brace pair of the JSX expression
    let inner = expr
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(expr);
    AttrValue::Expr(inner.trim().to_string())
}
