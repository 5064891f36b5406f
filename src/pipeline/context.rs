//! Per-run shared rewrite state.
//!
//! One [`RewriteContext`] is constructed for each pipeline invocation and
//! dropped with it, so nothing leaks between runs (stale synthesized rules,
//! the root-container flag). Every pass receives the same context mutably.

use rustc_hash::FxHashMap;
use std::path::PathBuf;

use crate::stats::Stats;
use crate::vars::VariableTable;

/// A synthesized utility-class rule bound to a variable reference.
///
/// `properties` holds more than one entry for compound directions
/// (`px-` emits padding-left and padding-right under one selector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticRule {
    /// Generated class name, e.g. `p-margin-r`.
    pub name: String,
    /// CSS properties the rule sets.
    pub properties: Vec<String>,
    /// Custom-property ident the rule references (no `--`).
    pub var_ident: String,
    /// Fallback literal inside the `var()` reference.
    pub fallback: String,
}

/// A distinct (family, weight) pair observed by the font pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontUse {
    pub family: String,
    pub weight: u16,
}

/// Mutable state shared by all passes within one run.
#[derive(Debug)]
pub struct RewriteContext {
    /// Read-only variable definitions.
    pub vars: VariableTable,
    /// Synthesized rules in insertion order (flushed once, by the emitter).
    synthesized: Vec<SyntheticRule>,
    /// Class name -> index into `synthesized`.
    by_name: FxHashMap<String, usize>,
    /// Distinct fonts observed, in first-seen order.
    pub fonts: Vec<FontUse>,
    /// One-shot: only the first qualifying root container gets the
    /// overflow containment guard.
    pub root_overflow_applied: bool,
    /// Directory of the input file, for resolving referenced asset files.
    pub source_dir: Option<PathBuf>,
    pub stats: Stats,
}

impl RewriteContext {
    pub fn new(vars: VariableTable, source_dir: Option<PathBuf>) -> Self {
        Self {
            vars,
            synthesized: Vec::new(),
            by_name: FxHashMap::default(),
            fonts: Vec::new(),
            root_overflow_applied: false,
            source_dir,
            stats: Stats::new(),
        }
    }

    /// Register a synthesized rule, deduplicating identical ones.
    ///
    /// Returns the class name to reference. A second registration with the
    /// same (properties, variable, fallback) reuses the existing entry; a
    /// name collision with a *different* rule gets a numeric suffix so both
    /// stay addressable.
    pub fn add_synthesized(&mut self, rule: SyntheticRule) -> String {
        if let Some(&idx) = self.by_name.get(&rule.name) {
            if self.synthesized[idx] == rule {
                return rule.name;
            }
            // Same deterministic name, different rule: disambiguate
            for n in 2.. {
                let candidate = format!("{}-{}", rule.name, n);
                match self.by_name.get(&candidate) {
                    Some(&idx) if self.synthesized[idx].eq_ignoring_name(&rule) => {
                        return candidate;
                    }
                    Some(_) => continue,
                    None => {
                        let mut rule = rule;
                        rule.name = candidate.clone();
                        self.push_rule(rule);
                        return candidate;
                    }
                }
            }
            unreachable!("suffix search is unbounded");
        }

        let name = rule.name.clone();
        self.push_rule(rule);
        name
    }

    fn push_rule(&mut self, rule: SyntheticRule) {
        self.by_name.insert(rule.name.clone(), self.synthesized.len());
        self.synthesized.push(rule);
        self.stats.variables_synthesized += 1;
    }

    pub fn synthesized(&self) -> &[SyntheticRule] {
        &self.synthesized
    }

    /// Record a font use, deduplicating (family, weight) pairs.
    pub fn record_font(&mut self, family: &str, weight: u16) {
        if !self
            .fonts
            .iter()
            .any(|f| f.family == family && f.weight == weight)
        {
            self.fonts.push(FontUse {
                family: family.to_string(),
                weight,
            });
        }
    }
}

impl SyntheticRule {
    /// Rule equality modulo the generated name (for collision reuse).
    fn eq_ignoring_name(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.var_ident == other.var_ident
            && self.fallback == other.fallback
    }
}
