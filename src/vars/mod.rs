//! Design-variable handling.
//!
//! - [`table`]: the read-only variable table loaded from the companion
//!   definitions file (hierarchical name -> literal or font descriptor)
//! - [`placeholder`]: textual `var(--Name/Sub, fallback)` parsing and the
//!   arbitrary-value token escaping rules
//! - [`resolve`]: the single placeholder-resolution implementation shared by
//!   the tree-based variables pass and the text-level safety-net sweep

pub mod placeholder;
pub mod resolve;
pub mod table;

pub use placeholder::{ArbitraryToken, Placeholder};
pub use resolve::{Resolution, prefix_properties, resolve_class_placeholder, resolve_style_value};
pub use table::{FontDesc, VarValue, VariableTable, css_ident};
