//! The rewrite pipeline: pass trait, registry, and run loop.
//!
//! # Stage order
//!
//! Passes run in ascending priority. The defaults encode real read/write
//! dependencies, not just taste:
//!
//! | pass        | prio | reads                     | writes                        |
//! |-------------|------|---------------------------|-------------------------------|
//! | font        | 0    | `font-['F:Style',..]`     | inline fontFamily/fontWeight  |
//! | cleanup     | 10   | class tokens              | removes artifacts, adds guards|
//! | svg-inline  | 15   | img stacks + asset files  | replaces container with svg   |
//! | svg-flatten | 18   | wrapper + img child       | collapses one nesting level   |
//! | paint       | 22   | gradient/shape/blend      | inline background, radius fix |
//! | variables   | 30   | `var(--X,fb)` placeholders| canonical/synthesized classes |
//! | optimize    | 40   | remaining tokens          | scale collapse + dedup        |
//!
//! The load-bearing edge: **font must precede cleanup**, because cleanup
//! deletes the `font-[...]` token the font pass reads. The registry rejects
//! priority overrides that break this. variables must also see the tokens
//! paint produces or consumes, and optimize expects plain canonical tokens,
//! so their relative defaults matter too.

pub mod context;
pub mod passes;

pub use context::RewriteContext;

use anyhow::{Context as _, Result, bail};

use crate::config::PipelineConfig;
use crate::debug;
use crate::markup::Document;

/// One tree-rewrite stage.
pub trait Pass {
    fn name(&self) -> &'static str;
    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()>;
}

/// Names of all known passes, in default execution order.
pub const PASS_NAMES: &[&str] = &[
    "font",
    "cleanup",
    "svg-inline",
    "svg-flatten",
    "paint",
    "variables",
    "optimize",
];

struct Entry {
    pass: Box<dyn Pass>,
    priority: i32,
    enabled: bool,
}

/// Ordered, configurable list of passes.
pub struct PassRegistry {
    entries: Vec<Entry>,
    continue_on_error: bool,
}

impl PassRegistry {
    /// All passes with default priorities, nothing disabled.
    pub fn standard() -> Self {
        let defaults: Vec<(Box<dyn Pass>, i32)> = vec![
            (Box::new(passes::FontInline), 0),
            (Box::new(passes::ClassCleanup), 10),
            (Box::new(passes::SvgCompositeInline), 15),
            (Box::new(passes::SvgWrapperFlatten), 18),
            (Box::new(passes::PaintFix), 22),
            (Box::new(passes::VariableResolve), 30),
            (Box::new(passes::ClassOptimize), 40),
        ];
        Self {
            entries: defaults
                .into_iter()
                .map(|(pass, priority)| Entry {
                    pass,
                    priority,
                    enabled: true,
                })
                .collect(),
            continue_on_error: false,
        }
    }

    /// Build from configuration: per-pass enable/priority plus the global
    /// continue-on-error flag. Rejects unknown pass names and orderings
    /// that break the font-before-cleanup dependency.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut registry = Self::standard();
        registry.continue_on_error = config.continue_on_error;

        for (name, toggle) in &config.passes {
            let entry = registry
                .entries
                .iter_mut()
                .find(|e| e.pass.name() == name.as_str());
            let Some(entry) = entry else {
                bail!(
                    "unknown pass `{name}` in [pipeline.passes] (known: {})",
                    PASS_NAMES.join(", ")
                );
            };
            entry.enabled = toggle.enable;
            if let Some(priority) = toggle.priority {
                entry.priority = priority;
            }
        }

        registry.validate_order()?;
        Ok(registry)
    }

    /// Cleanup deletes the token the font pass reads; enforce the ordering
    /// here instead of trusting priority magic numbers.
    fn validate_order(&self) -> Result<()> {
        let prio = |name: &str| {
            self.entries
                .iter()
                .find(|e| e.enabled && e.pass.name() == name)
                .map(|e| e.priority)
        };
        if let (Some(font), Some(cleanup)) = (prio("font"), prio("cleanup"))
            && font >= cleanup
        {
            bail!(
                "invalid pass priorities: font ({font}) must run before cleanup ({cleanup}), \
                 which strips the font tokens it reads"
            );
        }
        Ok(())
    }

    /// Enabled passes in execution order.
    fn ordered(&self) -> Vec<&Entry> {
        let mut enabled: Vec<_> = self.entries.iter().filter(|e| e.enabled).collect();
        // Stable sort keyed by (priority, name): deterministic on ties
        enabled.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.pass.name().cmp(b.pass.name()))
        });
        enabled
    }

    /// Run every enabled pass over the tree, in order.
    ///
    /// Default failure semantics: the first pass error aborts the run and
    /// the caller writes nothing. With continue-on-error, the failing pass's
    /// partial mutation is kept (no rollback) and later passes still run.
    pub fn run(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        for entry in self.ordered() {
            let name = entry.pass.name();
            let before = ctx.stats.changes();
            let result = entry.pass.apply(doc, ctx);

            match result {
                Ok(()) => {
                    debug!("pipeline"; "{name}: {} changes", ctx.stats.changes() - before);
                }
                Err(e) if self.continue_on_error => {
                    crate::log!("warning"; "pass {name} failed ({e:#}), continuing");
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("pass `{name}` failed"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PassToggle, PipelineConfig};
    use crate::markup::parse_document;
    use crate::vars::VariableTable;

    fn toggle(enable: bool, priority: Option<i32>) -> PassToggle {
        PassToggle { enable, priority }
    }

    #[test]
    fn test_standard_order() {
        let registry = PassRegistry::standard();
        let names: Vec<_> = registry.ordered().iter().map(|e| e.pass.name()).collect();
        assert_eq!(names, PASS_NAMES);
    }

    #[test]
    fn test_disable_pass() {
        let mut config = PipelineConfig::default();
        config.passes.insert("paint".to_string(), toggle(false, None));
        let registry = PassRegistry::from_config(&config).unwrap();
        assert!(!registry.ordered().iter().any(|e| e.pass.name() == "paint"));
    }

    #[test]
    fn test_priority_override_reorders() {
        let mut config = PipelineConfig::default();
        config
            .passes
            .insert("optimize".to_string(), toggle(true, Some(25)));
        let registry = PassRegistry::from_config(&config).unwrap();
        let names: Vec<_> = registry.ordered().iter().map(|e| e.pass.name()).collect();
        let optimize = names.iter().position(|n| *n == "optimize").unwrap();
        let variables = names.iter().position(|n| *n == "variables").unwrap();
        assert!(optimize < variables);
    }

    #[test]
    fn test_unknown_pass_rejected() {
        let mut config = PipelineConfig::default();
        config.passes.insert("nope".to_string(), toggle(true, None));
        assert!(PassRegistry::from_config(&config).is_err());
    }

    #[test]
    fn test_cleanup_before_font_rejected() {
        let mut config = PipelineConfig::default();
        config
            .passes
            .insert("cleanup".to_string(), toggle(true, Some(-5)));
        assert!(PassRegistry::from_config(&config).is_err());
    }

    #[test]
    fn test_disabled_cleanup_lifts_ordering_constraint() {
        let mut config = PipelineConfig::default();
        config
            .passes
            .insert("cleanup".to_string(), toggle(false, Some(-5)));
        assert!(PassRegistry::from_config(&config).is_ok());
    }

    struct FailingPass;
    impl Pass for FailingPass {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn apply(&self, _doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
            ctx.stats.classes_removed += 1; // partial mutation before the error
            bail!("boom")
        }
    }

    fn failing_registry(continue_on_error: bool) -> PassRegistry {
        PassRegistry {
            entries: vec![
                Entry {
                    pass: Box::new(FailingPass),
                    priority: 0,
                    enabled: true,
                },
                Entry {
                    pass: Box::new(passes::ClassOptimize),
                    priority: 10,
                    enabled: true,
                },
            ],
            continue_on_error,
        }
    }

    #[test]
    fn test_pass_failure_aborts_by_default() {
        let mut doc = parse_document("<div>x</div>").unwrap();
        let mut ctx = RewriteContext::new(VariableTable::empty(), None);
        let err = failing_registry(false).run(&mut doc, &mut ctx).unwrap_err();
        assert!(err.to_string().contains("failing"));
    }

    #[test]
    fn test_continue_on_error_keeps_partial_mutation() {
        let mut doc = parse_document("<div>x</div>").unwrap();
        let mut ctx = RewriteContext::new(VariableTable::empty(), None);
        failing_registry(true).run(&mut doc, &mut ctx).unwrap();
        assert_eq!(ctx.stats.classes_removed, 1);
    }
}
