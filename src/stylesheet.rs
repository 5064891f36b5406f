//! Companion stylesheet emitter.
//!
//! Serializes everything the run accumulated: a font-loading directive for
//! the (family, weight) pairs the font pass observed, `:root` custom
//! properties derived from the variable table (grouped by the name's first
//! segment), and one rule block per synthesized class.
//!
//! Output order is fully determined by table order and insertion order, so
//! a fixed input always produces a byte-identical sheet.

use std::fmt::Write as _;

use crate::pipeline::context::RewriteContext;
use crate::vars::table::{VarValue, css_ident};

/// Render the full companion stylesheet.
pub fn render_stylesheet(ctx: &RewriteContext, google_fonts: bool) -> String {
    let mut out = String::new();

    if google_fonts {
        render_font_imports(&mut out, ctx);
    }
    render_root_properties(&mut out, ctx);
    render_synthesized_rules(&mut out, ctx);

    out
}

/// One `@import` per family, weights merged and sorted:
/// `@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;700&display=swap');`
fn render_font_imports(out: &mut String, ctx: &RewriteContext) {
    if ctx.fonts.is_empty() {
        return;
    }

    // Group weights under each family, keeping first-seen family order
    let mut families: Vec<(&str, Vec<u16>)> = Vec::new();
    for font in &ctx.fonts {
        match families.iter_mut().find(|(f, _)| *f == font.family) {
            Some((_, weights)) => {
                if !weights.contains(&font.weight) {
                    weights.push(font.weight);
                }
            }
            None => families.push((&font.family, vec![font.weight])),
        }
    }

    for (family, mut weights) in families {
        weights.sort_unstable();
        let weights = weights
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(";");
        let family = family.replace(' ', "+");
        let _ = writeln!(
            out,
            "@import url('https://fonts.googleapis.com/css2?family={family}:wght@{weights}&display=swap');"
        );
    }
    out.push('\n');
}

/// `:root` block with one custom property per literal variable and a
/// family/size/weight triple per font descriptor, grouped under comment
/// headings by the name's first segment.
fn render_root_properties(out: &mut String, ctx: &RewriteContext) {
    if ctx.vars.is_empty() {
        return;
    }

    out.push_str(":root {\n");
    let mut current_group: Option<String> = None;

    for (name, value) in ctx.vars.iter() {
        let group = name.split('/').next().unwrap_or(name).trim().to_string();
        if current_group.as_ref() != Some(&group) {
            if current_group.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "  /* {group} */");
            current_group = Some(group);
        }

        let ident = css_ident(name);
        if ident.is_empty() {
            continue;
        }
        match value {
            VarValue::Literal(literal) => {
                let _ = writeln!(out, "  --{ident}: {literal};");
            }
            VarValue::Font(font) => {
                let _ = writeln!(out, "  --{ident}-family: {};", font.family);
                if font.size > 0.0 {
                    let _ = writeln!(out, "  --{ident}-size: {}px;", font.size);
                }
                let _ = writeln!(out, "  --{ident}-weight: {};", font.weight);
            }
        }
    }
    out.push_str("}\n");
}

/// `.p-margin-r { padding: var(--margin-r, 32px); }`, compound properties
/// as multiple declarations under one selector.
fn render_synthesized_rules(out: &mut String, ctx: &RewriteContext) {
    let rules = ctx.synthesized();
    if rules.is_empty() {
        return;
    }

    if !out.is_empty() {
        out.push('\n');
    }
    for rule in rules {
        let _ = writeln!(out, ".{} {{", rule.name);
        for property in &rule.properties {
            let _ = writeln!(
                out,
                "  {property}: var(--{}, {});",
                rule.var_ident, rule.fallback
            );
        }
        out.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::context::SyntheticRule;
    use crate::vars::VariableTable;

    fn ctx_with(vars: &str) -> RewriteContext {
        RewriteContext::new(VariableTable::from_json_str(vars).unwrap(), None)
    }

    #[test]
    fn test_font_imports_grouped_and_sorted() {
        let mut ctx = ctx_with("{}");
        ctx.record_font("Source Sans 3", 700);
        ctx.record_font("Inter", 400);
        ctx.record_font("Source Sans 3", 400);

        let sheet = render_stylesheet(&ctx, true);
        assert!(sheet.contains(
            "@import url('https://fonts.googleapis.com/css2?family=Source+Sans+3:wght@400;700&display=swap');"
        ));
        assert!(sheet.contains(
            "@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400&display=swap');"
        ));
        // First-seen family comes first
        assert!(sheet.find("Source+Sans+3").unwrap() < sheet.find("family=Inter").unwrap());
    }

    #[test]
    fn test_imports_suppressed_when_disabled() {
        let mut ctx = ctx_with("{}");
        ctx.record_font("Inter", 400);
        assert!(!render_stylesheet(&ctx, false).contains("@import"));
    }

    #[test]
    fn test_root_properties_grouped_by_segment() {
        let ctx = ctx_with(
            r##"{
                "Colors/White": "#ffffff",
                "Colors/Ink": "#111827",
                "margin/r": "32px",
                "Font/Body": { "family": "Inter", "size": 16, "weight": 400 }
            }"##,
        );
        let sheet = render_stylesheet(&ctx, false);
        assert!(sheet.contains("  /* Colors */\n  --colors-white: #ffffff;\n  --colors-ink: #111827;\n"));
        assert!(sheet.contains("  /* margin */\n  --margin-r: 32px;\n"));
        assert!(sheet.contains("  --font-body-family: Inter;"));
        assert!(sheet.contains("  --font-body-size: 16px;"));
        assert!(sheet.contains("  --font-body-weight: 400;"));
    }

    #[test]
    fn test_synthesized_rule_blocks() {
        let mut ctx = ctx_with("{}");
        ctx.add_synthesized(SyntheticRule {
            name: "p-margin-r".to_string(),
            properties: vec!["padding".to_string()],
            var_ident: "margin-r".to_string(),
            fallback: "32px".to_string(),
        });
        ctx.add_synthesized(SyntheticRule {
            name: "px-spacing-block".to_string(),
            properties: vec!["padding-left".to_string(), "padding-right".to_string()],
            var_ident: "spacing-block".to_string(),
            fallback: "24px".to_string(),
        });

        let sheet = render_stylesheet(&ctx, false);
        assert!(sheet.contains(".p-margin-r {\n  padding: var(--margin-r, 32px);\n}\n"));
        assert!(sheet.contains(
            ".px-spacing-block {\n  padding-left: var(--spacing-block, 24px);\n  padding-right: var(--spacing-block, 24px);\n}\n"
        ));
    }

    #[test]
    fn test_deterministic_output() {
        let mut ctx = ctx_with(r##"{"Colors/White": "#ffffff", "margin/r": "32px"}"##);
        ctx.record_font("Inter", 700);
        let a = render_stylesheet(&ctx, true);
        let b = render_stylesheet(&ctx, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_run_emits_empty_sheet() {
        let ctx = ctx_with("{}");
        assert!(render_stylesheet(&ctx, true).is_empty());
    }
}
