//! Markup tree: owned element model, JSX-aware parser and printer.
//!
//! The tree is created once by parsing input text, mutated in place by the
//! pipeline passes, serialized once by the printer, then discarded. No node
//! is ever shared between two trees.

mod node;
mod parse;
mod print;

pub use node::{Attr, AttrValue, Document, Element, Node, StyleMap, split_top_level};
pub use parse::{MarkupError, parse_document};
pub use print::print_document;
