//! Class cleanup (priority 10).
//!
//! Removes generator-artifact tokens, adds compensating layout tokens, and
//! snaps arbitrary pixel font sizes onto the canonical scale. Runs after the
//! font pass (which still needs the `font-[...]` tokens this pass deletes).

use anyhow::Result;

use crate::markup::{Document, Element, Node};
use crate::pipeline::Pass;
use crate::pipeline::context::RewriteContext;
use crate::utils::tw;
use crate::vars::placeholder::ArbitraryToken;

pub struct ClassCleanup;

/// Generator artifacts with no corresponding rule in the target system.
const INVALID_TOKENS: &[&str] = &["content-stretch", "leading-[normal]"];

/// Tags that count as root-level containers for the overflow guard.
const CONTAINER_TAGS: &[&str] = &["div", "main", "section"];

const OVERFLOW_GUARD: &str = "overflow-x-clip";

impl Pass for ClassCleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        apply_overflow_guard(doc, ctx);

        doc.for_each_element_mut(&mut |elem| {
            clean_tokens(elem, ctx);
            ensure_grow_width(elem, ctx);
        });
        Ok(())
    }
}

/// Add horizontal-overflow containment to the first root-level container.
///
/// One-shot per run: nested containers and later qualifying roots are never
/// touched. Non-container roots (fragments often lead with an `<img />`) are
/// skipped, not treated as the root. A guard already present sets the flag
/// without counting, so reruns are clean.
fn apply_overflow_guard(doc: &mut Document, ctx: &mut RewriteContext) {
    if ctx.root_overflow_applied {
        return;
    }
    let Some(root) = doc
        .roots
        .iter_mut()
        .filter_map(Node::as_element_mut)
        .find(|e| CONTAINER_TAGS.contains(&e.tag.as_str()))
    else {
        return;
    };

    ctx.root_overflow_applied = true;
    let has_overflow = root.classes().iter().any(|t| t.starts_with("overflow-"));
    if !has_overflow {
        root.add_class(OVERFLOW_GUARD);
        ctx.stats.overflow_guards += 1;
    }
}

fn clean_tokens(elem: &mut Element, ctx: &mut RewriteContext) {
    let tokens = elem.classes();
    if tokens.is_empty() {
        return;
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut changed = false;

    for token in tokens {
        // Font tokens were already materialized into inline style
        if is_font_token(&token) || INVALID_TOKENS.contains(&token.as_str()) {
            ctx.stats.classes_removed += 1;
            changed = true;
            continue;
        }

        if let Some(snapped) = snap_font_size(&token) {
            ctx.stats.classes_optimized += 1;
            changed = true;
            out.push(snapped);
            continue;
        }

        out.push(token);
    }

    if changed {
        elem.set_classes(&out);
    }
}

/// `basis-0` + `grow` children need an explicit full width to lay out the
/// way the design renders.
fn ensure_grow_width(elem: &mut Element, ctx: &mut RewriteContext) {
    let tokens = elem.classes();
    let qualifies = tokens.iter().any(|t| t == "basis-0") && tokens.iter().any(|t| t == "grow");
    if !qualifies {
        return;
    }
    let has_width = tokens
        .iter()
        .any(|t| t == "w-full" || t.starts_with("w-") || t.starts_with("size-"));
    if !has_width {
        elem.add_class("w-full");
        ctx.stats.widths_added += 1;
    }
}

fn is_font_token(token: &str) -> bool {
    ArbitraryToken::split(token).is_some_and(|arb| arb.prefix == "font")
}

/// `text-[Npx]` -> `text-{step}` when N sits unambiguously on the scale.
fn snap_font_size(token: &str) -> Option<String> {
    let arb = ArbitraryToken::split(token)?;
    if arb.prefix != "text" {
        return None;
    }
    let px = tw::parse_px(arb.body)?;
    let step = tw::font_size_step(px)?;
    Some(format!("text-{step}"))
}
