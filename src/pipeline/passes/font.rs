//! Font-class inlining (priority 0 - must run first).
//!
//! The generator encodes fonts as a class token like
//! `font-['Inter:Bold',sans-serif]`, which no style system understands.
//! This pass materializes the information into the element's inline style
//! (`fontFamily`/`fontWeight`) and records the (family, weight) pair for
//! font loading. It removes nothing: the cleanup pass strips the
//! now-redundant token, which is why this pass must run before it.

use anyhow::Result;

use crate::markup::Document;
use crate::pipeline::context::RewriteContext;
use crate::pipeline::Pass;
use crate::vars::placeholder::{ArbitraryToken, unescape_arbitrary};

pub struct FontInline;

/// A font token's parsed content.
#[derive(Debug, PartialEq)]
struct FontSpec {
    family: String,
    /// Full family stack including fallbacks, e.g. `Inter, sans-serif`.
    stack: String,
    weight: u16,
}

impl Pass for FontInline {
    fn name(&self) -> &'static str {
        "font"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        doc.for_each_element_mut(&mut |elem| {
            let specs: Vec<FontSpec> = elem
                .classes()
                .iter()
                .filter_map(|token| parse_font_token(token))
                .collect();

            for spec in specs {
                let style = elem.style_mut();
                let family_set = style.set_if_absent("fontFamily", spec.stack.clone());
                let weight_set = style.set_if_absent("fontWeight", spec.weight.to_string());
                if family_set || weight_set {
                    ctx.stats.fonts_inlined += 1;
                }
                ctx.record_font(&spec.family, spec.weight);
            }
        });
        Ok(())
    }
}

/// Parse `font-['Family:Style',fallback,...]` into a [`FontSpec`].
fn parse_font_token(token: &str) -> Option<FontSpec> {
    let arb = ArbitraryToken::split(token)?;
    if arb.prefix != "font" {
        return None;
    }
    let body = unescape_arbitrary(arb.body);

    // First comma-separated segment is the quoted 'Family:Style' spec
    let mut segments = crate::markup::split_top_level(&body, ',');
    if segments.is_empty() {
        return None;
    }
    let head = segments.remove(0);
    let head = head.trim().trim_matches('\'').trim_matches('"');

    let (family, style) = match head.split_once(':') {
        Some((family, style)) => (family.trim(), style.trim()),
        None => (head.trim(), ""),
    };
    if family.is_empty() {
        return None;
    }

    let mut stack = family.to_string();
    for fallback in &segments {
        stack.push_str(", ");
        stack.push_str(fallback.trim());
    }

    Some(FontSpec {
        family: family.to_string(),
        stack,
        weight: style_weight(style),
    })
}

/// Named style to numeric weight. Unrecognized names default to 400.
fn style_weight(style: &str) -> u16 {
    match style.to_ascii_lowercase().as_str() {
        "thin" => 100,
        "extralight" | "extra light" | "ultralight" => 200,
        "light" => 300,
        "regular" | "normal" | "" => 400,
        "medium" => 500,
        "semibold" | "semi bold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "extra bold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;
    use crate::vars::VariableTable;

    fn run(input: &str) -> (Document, RewriteContext) {
        let mut doc = parse_document(input).unwrap();
        let mut ctx = RewriteContext::new(VariableTable::empty(), None);
        FontInline.apply(&mut doc, &mut ctx).unwrap();
        (doc, ctx)
    }

    #[test]
    fn test_inlines_family_and_weight() {
        let (mut doc, ctx) =
            run(r#"<p className="font-['Inter:Bold',sans-serif] text-base">x</p>"#);
        let elem = doc.root_element_mut().unwrap();
        let style = elem.style().unwrap();
        assert_eq!(style.get("fontFamily"), Some("Inter, sans-serif"));
        assert_eq!(style.get("fontWeight"), Some("700"));
        // Token removal belongs to cleanup, not this pass
        assert!(elem.classes().iter().any(|t| t.starts_with("font-[")));
        assert_eq!(ctx.stats.fonts_inlined, 1);
        assert_eq!(ctx.fonts.len(), 1);
        assert_eq!(ctx.fonts[0].weight, 700);
    }

    #[test]
    fn test_existing_style_keys_not_overwritten() {
        let (mut doc, ctx) = run(
            r#"<p className="font-['Inter:Medium']" style={{ fontWeight: 300, color: 'red' }}>x</p>"#,
        );
        let elem = doc.root_element_mut().unwrap();
        let style = elem.style().unwrap();
        assert_eq!(style.get("fontWeight"), Some("300"));
        assert_eq!(style.get("fontFamily"), Some("Inter"));
        // fontFamily was still added, so the token counts as inlined
        assert_eq!(ctx.stats.fonts_inlined, 1);
    }

    #[test]
    fn test_underscore_escaped_family() {
        let (mut doc, _ctx) = run(r#"<p className="font-['Source_Sans_3:Regular',sans-serif]">x</p>"#);
        let elem = doc.root_element_mut().unwrap();
        assert_eq!(
            elem.style().unwrap().get("fontFamily"),
            Some("Source Sans 3, sans-serif")
        );
    }

    #[test]
    fn test_unrecognized_style_defaults_to_400() {
        assert_eq!(style_weight("Chonky"), 400);
        assert_eq!(style_weight(""), 400);
        assert_eq!(style_weight("SemiBold"), 600);
        assert_eq!(style_weight("Black"), 900);
    }

    #[test]
    fn test_non_font_tokens_ignored() {
        let (mut doc, ctx) = run(r#"<p className="text-base flex">x</p>"#);
        assert!(doc.root_element_mut().unwrap().style().is_none());
        assert_eq!(ctx.stats.fonts_inlined, 0);
    }
}
