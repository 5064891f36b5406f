//! Variable-placeholder resolution (priority 30).
//!
//! Finds raw `var(--Name/Sub, fallback)` placeholders in class tokens and
//! inline-style values and rewrites them through the shared resolver: class
//! tokens become canonical or synthesized utility classes, style values keep
//! the var() indirection under its slugged custom-property name.
//!
//! The text-level sweep reuses the same resolver after serialization, so the
//! two stages cannot drift apart.

use anyhow::Result;

use crate::markup::Document;
use crate::pipeline::Pass;
use crate::pipeline::context::RewriteContext;
use crate::vars::placeholder::{ArbitraryToken, parse_var_expr, unescape_arbitrary};
use crate::vars::resolve::{Resolution, resolve_class_placeholder, resolve_style_value};

pub struct VariableResolve;

impl Pass for VariableResolve {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        doc.for_each_element_mut(&mut |elem| {
            let tokens = elem.classes();
            if !tokens.is_empty() {
                let mut out = Vec::with_capacity(tokens.len());
                let mut changed = false;
                for token in tokens {
                    match resolve_token(&token, ctx) {
                        Some(resolved) => {
                            ctx.stats.variables_resolved += 1;
                            changed = true;
                            out.push(resolved);
                        }
                        None => out.push(token),
                    }
                }
                if changed {
                    elem.set_classes(&out);
                }
            }

            if elem.style().is_some() {
                // Two-phase: resolver needs &mut ctx, style map borrows elem
                let rewrites: Vec<(String, String)> = elem
                    .style()
                    .into_iter()
                    .flat_map(|s| s.iter())
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .filter_map(|(k, v)| resolve_style_value(&v, ctx).map(|new| (k, new)))
                    .collect();
                for (key, value) in rewrites {
                    elem.style_mut().set(&key, value);
                    ctx.stats.variables_resolved += 1;
                }
            }
        });
        Ok(())
    }
}

/// `prefix-[var(--name, fb)]` -> rewritten token, or None to keep as-is.
///
/// The whole bracket body must be a single var() expression; composite
/// bodies (`calc`, multiple values) are out of scope for token rewriting
/// and fall through to the sweep's style handling.
fn resolve_token(token: &str, ctx: &mut RewriteContext) -> Option<String> {
    let arb = ArbitraryToken::split(token)?;
    let body = unescape_arbitrary(arb.body);
    let (placeholder, consumed) = parse_var_expr(&body)?;
    if consumed != body.len() {
        return None;
    }

    match resolve_class_placeholder(arb.prefix, &placeholder, ctx) {
        Resolution::Canonical(t) | Resolution::Synthesized(t) => Some(t),
        Resolution::Skipped => None,
    }
}
