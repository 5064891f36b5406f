//! Per-run rewrite statistics.
//!
//! Counters are split into two groups:
//! - **change counters**: increments mean the tree or text was mutated.
//!   Running the pipeline on its own output must leave all of these at zero.
//! - **observation counters**: verification-only signals (blend-mode checks,
//!   sweep scan hits). These recur on every run and carry no idempotence
//!   guarantee.

use owo_colors::OwoColorize;
use std::fmt;

/// Counters accumulated across one pipeline invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    // -- change counters --
    /// Font-class tokens materialized into inline style.
    pub fonts_inlined: u64,
    /// Artifact class tokens removed by cleanup.
    pub classes_removed: u64,
    /// Tokens rewritten to canonical scale steps (cleanup + optimizer).
    pub classes_optimized: u64,
    /// Duplicate tokens dropped by the optimizer.
    pub classes_deduped: u64,
    /// Overflow containment guards added to root containers.
    pub overflow_guards: u64,
    /// Explicit widths added to basis-0 grow children.
    pub widths_added: u64,
    /// Decomposed image stacks replaced by a single vector element.
    pub composites_inlined: u64,
    /// Absolute wrappers collapsed into their image child.
    pub wrappers_flattened: u64,
    /// Gradient class compositions rewritten to inline backgrounds.
    pub gradients_fixed: u64,
    /// Shape-container geometry corrections (circle radius, etc).
    pub shapes_fixed: u64,
    /// Variable placeholders rewritten to canonical or synthesized classes.
    pub variables_resolved: u64,
    /// New utility-class rules synthesized for variable references.
    pub variables_synthesized: u64,
    /// Residual placeholders fixed by the text sweep.
    pub sweep_fixed: u64,

    // -- observation counters --
    /// Blend-mode tokens matching the CSS allow-list.
    pub blend_modes_verified: u64,
    /// Blend-mode tokens with unrecognized values (left untouched).
    pub blend_modes_unknown: u64,
    /// Residual placeholders found by the text sweep.
    pub sweep_found: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of mutations made during the run.
    ///
    /// Zero means the input was already fully processed.
    pub fn changes(&self) -> u64 {
        self.fonts_inlined
            + self.classes_removed
            + self.classes_optimized
            + self.classes_deduped
            + self.overflow_guards
            + self.widths_added
            + self.composites_inlined
            + self.wrappers_flattened
            + self.gradients_fixed
            + self.shapes_fixed
            + self.variables_resolved
            + self.variables_synthesized
            + self.sweep_fixed
    }

    pub fn is_clean(&self) -> bool {
        self.changes() == 0
    }

    /// (label, value) pairs for every nonzero counter, change counters first.
    fn nonzero(&self) -> Vec<(&'static str, u64)> {
        let all = [
            ("fonts inlined", self.fonts_inlined),
            ("classes removed", self.classes_removed),
            ("classes optimized", self.classes_optimized),
            ("classes deduped", self.classes_deduped),
            ("overflow guards", self.overflow_guards),
            ("widths added", self.widths_added),
            ("composites inlined", self.composites_inlined),
            ("wrappers flattened", self.wrappers_flattened),
            ("gradients fixed", self.gradients_fixed),
            ("shapes fixed", self.shapes_fixed),
            ("variables resolved", self.variables_resolved),
            ("variables synthesized", self.variables_synthesized),
            ("sweep fixed", self.sweep_fixed),
            ("blend modes verified", self.blend_modes_verified),
            ("blend modes unknown", self.blend_modes_unknown),
            ("sweep found", self.sweep_found),
        ];
        all.into_iter().filter(|(_, v)| *v > 0).collect()
    }
}

/// One-line summary: `fonts inlined(2) gradients fixed(1) ...`
impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.nonzero();
        if entries.is_empty() {
            return write!(f, "{}", "no changes".dimmed());
        }
        let mut first = true;
        for (label, value) in entries {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}({})", label, value.to_string().bold())?;
            first = false;
        }
        Ok(())
    }
}
