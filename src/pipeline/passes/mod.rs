//! The transformation passes.
//!
//! Each pass is independently testable as "input markup snippet -> output
//! markup snippet + delta stats". Unrecognized patterns are always left
//! untouched; a false-positive rewrite is worse than a missed one.

mod cleanup;
mod font;
mod optimize;
mod paint;
mod svg;
mod variables;

pub use cleanup::ClassCleanup;
pub use font::FontInline;
pub use optimize::ClassOptimize;
pub use paint::PaintFix;
pub use svg::{SvgCompositeInline, SvgWrapperFlatten};
pub use variables::VariableResolve;
