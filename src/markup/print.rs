//! Deterministic JSX printer.
//!
//! Output formatting is canonical rather than source-preserving: two-space
//! indentation, attributes in stored order, childless elements self-closed,
//! a single text child kept on one line. For a fixed tree the output is
//! byte-identical across runs.

use super::node::{AttrValue, Document, Element, Node};

const INDENT: &str = "  ";

/// Serialize a document back to JSX text. Ends with a newline.
pub fn print_document(doc: &Document) -> String {
    let mut out = String::with_capacity(1024);
    for root in &doc.roots {
        print_node(root, 0, &mut out);
    }
    out
}

fn print_node(node: &Node, depth: usize, out: &mut String) {
    match node {
        Node::Text(text) => {
            push_indent(depth, out);
            out.push_str(text);
            out.push('\n');
        }
        Node::Element(elem) => print_element(elem, depth, out),
    }
}

fn print_element(elem: &Element, depth: usize, out: &mut String) {
    push_indent(depth, out);
    out.push('<');
    out.push_str(&elem.tag);

    for attr in &elem.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        match &attr.value {
            AttrValue::Literal(value) => {
                out.push_str("=\"");
                // Quotes are the only character that can break the attribute
                for c in value.chars() {
                    match c {
                        '"' => out.push_str("&quot;"),
                        c => out.push(c),
                    }
                }
                out.push('"');
            }
            AttrValue::Expr(expr) => {
                out.push_str("={");
                out.push_str(expr);
                out.push('}');
            }
            AttrValue::Style(map) => {
                out.push('=');
                out.push_str(&map.to_jsx());
            }
        }
    }

    if elem.children.is_empty() {
        out.push_str(" />\n");
        return;
    }
    out.push('>');

    // Single text child stays inline: <p>label</p>
    if let [Node::Text(text)] = elem.children.as_slice() {
        out.push_str(text);
        out.push_str("</");
        out.push_str(&elem.tag);
        out.push_str(">\n");
        return;
    }

    out.push('\n');
    for child in &elem.children {
        print_node(child, depth + 1, out);
    }
    push_indent(depth, out);
    out.push_str("</");
    out.push_str(&elem.tag);
    out.push_str(">\n");
}

#[inline]
fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
