//! Class-name optimizer (priority 40, runs last).
//!
//! Collapses arbitrary bracketed values onto the standard scale where the
//! mapping is lossless (`p-[32px]` -> `p-8`, `w-[100%]` -> `w-full`) and
//! deduplicates repeated tokens. Anything without an exact scale equivalent
//! stays arbitrary; approximation belongs to no pass.

use anyhow::Result;

use crate::markup::Document;
use crate::pipeline::Pass;
use crate::pipeline::context::RewriteContext;
use crate::utils::tw;
use crate::vars::placeholder::ArbitraryToken;

pub struct ClassOptimize;

/// Prefixes whose pixel values live on the shared spacing scale.
const SPACING_PREFIXES: &[&str] = &[
    "p", "px", "py", "pt", "pr", "pb", "pl", "m", "mx", "my", "mt", "mr", "mb", "ml", "gap",
    "gap-x", "gap-y", "w", "h", "size", "top", "right", "bottom", "left", "inset",
];

impl Pass for ClassOptimize {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        doc.for_each_element_mut(&mut |elem| {
            let tokens = elem.classes();
            if tokens.is_empty() {
                return;
            }

            let mut out: Vec<String> = Vec::with_capacity(tokens.len());
            let mut changed = false;

            for token in tokens {
                let token = match canonicalize(&token) {
                    Some(canonical) => {
                        ctx.stats.classes_optimized += 1;
                        changed = true;
                        canonical
                    }
                    None => token,
                };
                if out.contains(&token) {
                    ctx.stats.classes_deduped += 1;
                    changed = true;
                    continue;
                }
                out.push(token);
            }

            if changed {
                elem.set_classes(&out);
            }
        });
        Ok(())
    }
}

fn canonicalize(token: &str) -> Option<String> {
    let arb = ArbitraryToken::split(token)?;

    match (arb.prefix, arb.body) {
        ("w", "100%") => return Some("w-full".to_string()),
        ("h", "100%") => return Some("h-full".to_string()),
        ("size", "100%") => return Some("size-full".to_string()),
        ("rounded", "9999px") => return Some("rounded-full".to_string()),
        _ => {}
    }

    if !SPACING_PREFIXES.contains(&arb.prefix) {
        return None;
    }
    let px = tw::parse_px(arb.body)?;
    let step = tw::spacing_step(px)?;
    Some(format!("{}-{step}", arb.prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;
    use crate::vars::VariableTable;

    fn run(input: &str) -> (Document, RewriteContext) {
        let mut doc = parse_document(input).unwrap();
        let mut ctx = RewriteContext::new(VariableTable::empty(), None);
        ClassOptimize.apply(&mut doc, &mut ctx).unwrap();
        (doc, ctx)
    }

    #[test]
    fn test_spacing_collapse() {
        let (mut doc, ctx) = run(r#"<div className="p-[32px] gap-[16px] mt-[7px]">x</div>"#);
        let classes = doc.root_element_mut().unwrap().classes();
        // 7px is off-scale and must stay arbitrary
        assert_eq!(classes, vec!["p-8", "gap-4", "mt-[7px]"]);
        assert_eq!(ctx.stats.classes_optimized, 2);
    }

    #[test]
    fn test_percent_and_pill_shorthands() {
        let (mut doc, ctx) = run(r#"<div className="w-[100%] rounded-[9999px]">x</div>"#);
        let classes = doc.root_element_mut().unwrap().classes();
        assert_eq!(classes, vec!["w-full", "rounded-full"]);
        assert_eq!(ctx.stats.classes_optimized, 2);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let (mut doc, ctx) = run(r#"<div className="flex p-4 flex gap-2 p-4">x</div>"#);
        let classes = doc.root_element_mut().unwrap().classes();
        assert_eq!(classes, vec!["flex", "p-4", "gap-2"]);
        assert_eq!(ctx.stats.classes_deduped, 2);
    }

    #[test]
    fn test_collapse_then_dedup() {
        let (mut doc, ctx) = run(r#"<div className="p-8 p-[32px]">x</div>"#);
        assert_eq!(doc.root_element_mut().unwrap().classes(), vec!["p-8"]);
        assert_eq!(ctx.stats.classes_optimized, 1);
        assert_eq!(ctx.stats.classes_deduped, 1);
    }

    #[test]
    fn test_fractional_radius_preserved() {
        // The shape fixer emits exact fractional radii; they must survive.
        let (mut doc, ctx) = run(r#"<div className="rounded-[12.5px] w-[25px]">x</div>"#);
        let classes = doc.root_element_mut().unwrap().classes();
        assert!(classes.contains(&"rounded-[12.5px]".to_string()));
        assert_eq!(ctx.stats.classes_optimized, 0);
    }

    #[test]
    fn test_optimizer_is_idempotent() {
        let (doc, _) = run(r#"<div className="p-[32px] w-[100%] flex flex">x</div>"#);
        let printed = crate::markup::print_document(&doc);
        let (_, ctx2) = run(&printed);
        assert_eq!(ctx2.stats.changes(), 0);
    }
}
