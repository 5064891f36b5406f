//! Placeholder resolution.
//!
//! One implementation of "resolve a variable placeholder to a canonical
//! token or a synthesized rule", called from both the tree-based variables
//! pass and the text-level safety-net sweep so the two phases can never
//! disagree.

use crate::pipeline::context::{RewriteContext, SyntheticRule};
use crate::utils::tw;

use super::placeholder::{Placeholder, find_var};
use super::table::{VarValue, css_ident};

/// Outcome of resolving one class-token placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Rewritten to an existing canonical token (e.g. `bg-white`).
    Canonical(String),
    /// Rewritten to a synthesized class registered in the context.
    Synthesized(String),
    /// Left untouched (unknown prefix, unresolvable value, font variable).
    Skipped,
}

/// Utility prefixes whose value is a color (canonical palette rewriting
/// applies to these only; see DESIGN.md on spacing variables).
const COLOR_PREFIXES: &[&str] = &["bg", "text", "border", "fill", "stroke"];

/// CSS properties addressed by a utility prefix.
pub fn prefix_properties(prefix: &str) -> Option<&'static [&'static str]> {
    Some(match prefix {
        "p" => &["padding"],
        "px" => &["padding-left", "padding-right"],
        "py" => &["padding-top", "padding-bottom"],
        "pt" => &["padding-top"],
        "pr" => &["padding-right"],
        "pb" => &["padding-bottom"],
        "pl" => &["padding-left"],
        "m" => &["margin"],
        "mx" => &["margin-left", "margin-right"],
        "my" => &["margin-top", "margin-bottom"],
        "mt" => &["margin-top"],
        "mr" => &["margin-right"],
        "mb" => &["margin-bottom"],
        "ml" => &["margin-left"],
        "gap" => &["gap"],
        "gap-x" => &["column-gap"],
        "gap-y" => &["row-gap"],
        "bg" => &["background-color"],
        "text" => &["color"],
        "border" => &["border-color"],
        "fill" => &["fill"],
        "stroke" => &["stroke"],
        "rounded" => &["border-radius"],
        "w" => &["width"],
        "h" => &["height"],
        "size" => &["width", "height"],
        "top" => &["top"],
        "right" => &["right"],
        "bottom" => &["bottom"],
        "left" => &["left"],
        "inset" => &["inset"],
        "leading" => &["line-height"],
        "tracking" => &["letter-spacing"],
        _ => return None,
    })
}

/// Resolve a placeholder found in a `{prefix}-[var(...)]` class token.
///
/// Fail-open: anything this function does not understand resolves to
/// [`Resolution::Skipped`] and the caller leaves the token alone.
pub fn resolve_class_placeholder(
    prefix: &str,
    ph: &Placeholder,
    ctx: &mut RewriteContext,
) -> Resolution {
    let Some(properties) = prefix_properties(prefix) else {
        return Resolution::Skipped;
    };

    // Resolve the variable; fall back to the embedded literal
    let value = match ctx.vars.get(&ph.name) {
        Some(VarValue::Literal(v)) => v.clone(),
        Some(VarValue::Font(_)) => return Resolution::Skipped,
        None => match &ph.fallback {
            Some(fb) => fb.clone(),
            None => return Resolution::Skipped,
        },
    };

    // Color variables with an exact palette name go canonical; everything
    // else keeps the var() indirection through a synthesized rule.
    if COLOR_PREFIXES.contains(&prefix)
        && let Some(name) = tw::canonical_color(&value)
    {
        return Resolution::Canonical(format!("{prefix}-{name}"));
    }

    let ident = css_ident(&ph.name);
    if ident.is_empty() {
        return Resolution::Skipped;
    }

    let name = ctx.add_synthesized(SyntheticRule {
        name: format!("{prefix}-{ident}"),
        properties: properties.iter().map(|p| (*p).to_string()).collect(),
        var_ident: ident,
        fallback: value,
    });
    Resolution::Synthesized(name)
}

/// Rewrite every raw placeholder inside an inline-style value.
///
/// `var(--Colors/White, #fff)` becomes `var(--colors-white, #fff)` so the
/// reference matches the custom property the stylesheet emits. Returns None
/// when nothing needed rewriting.
pub fn resolve_style_value(value: &str, ctx: &mut RewriteContext) -> Option<String> {
    let mut out = String::new();
    let mut rest = value;
    let mut changed = false;

    while let Some((start, ph, end)) = find_var(rest) {
        out.push_str(&rest[..start]);

        let ident = css_ident(&ph.name);
        let raw = &rest[start..end];
        if ident.is_empty() || raw.contains(&format!("--{ident}")) {
            // Already canonical (or unusable): keep verbatim
            out.push_str(raw);
        } else {
            let fallback = match ctx.vars.get(&ph.name) {
                Some(VarValue::Literal(v)) => Some(v.clone()),
                _ => ph.fallback.clone(),
            };
            match fallback {
                Some(fb) => out.push_str(&format!("var(--{ident}, {fb})")),
                None => out.push_str(&format!("var(--{ident})")),
            }
            changed = true;
        }
        rest = &rest[end..];
    }

    if !changed {
        return None;
    }
    out.push_str(rest);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::VariableTable;

    fn ctx_with(vars: &str) -> RewriteContext {
        RewriteContext::new(VariableTable::from_json_str(vars).unwrap(), None)
    }

    #[test]
    fn test_spacing_variable_synthesizes() {
        let mut ctx = ctx_with(r#"{"margin/r": "32px"}"#);
        let ph = Placeholder {
            name: "margin/r".to_string(),
            fallback: Some("32px".to_string()),
        };
        let res = resolve_class_placeholder("p", &ph, &mut ctx);
        assert_eq!(res, Resolution::Synthesized("p-margin-r".to_string()));

        let rule = &ctx.synthesized()[0];
        assert_eq!(rule.properties, vec!["padding"]);
        assert_eq!(rule.var_ident, "margin-r");
        assert_eq!(rule.fallback, "32px");
    }

    #[test]
    fn test_color_variable_goes_canonical() {
        let mut ctx = ctx_with(r##"{"Colors/White": "#ffffff"}"##);
        let ph = Placeholder {
            name: "Colors/White".to_string(),
            fallback: Some("#ffffff".to_string()),
        };
        let res = resolve_class_placeholder("bg", &ph, &mut ctx);
        assert_eq!(res, Resolution::Canonical("bg-white".to_string()));
        assert!(ctx.synthesized().is_empty());
    }

    #[test]
    fn test_off_palette_color_synthesizes() {
        let mut ctx = ctx_with(r##"{"Brand/Primary": "#ff6b00"}"##);
        let ph = Placeholder {
            name: "Brand/Primary".to_string(),
            fallback: None,
        };
        let res = resolve_class_placeholder("bg", &ph, &mut ctx);
        assert_eq!(res, Resolution::Synthesized("bg-brand-primary".to_string()));
        assert_eq!(ctx.synthesized()[0].fallback, "#ff6b00");
    }

    #[test]
    fn test_unknown_prefix_skips() {
        let mut ctx = ctx_with(r#"{"margin/r": "32px"}"#);
        let ph = Placeholder {
            name: "margin/r".to_string(),
            fallback: None,
        };
        assert_eq!(
            resolve_class_placeholder("shadow", &ph, &mut ctx),
            Resolution::Skipped
        );
    }

    #[test]
    fn test_unresolvable_without_fallback_skips() {
        let mut ctx = ctx_with("{}");
        let ph = Placeholder {
            name: "missing".to_string(),
            fallback: None,
        };
        assert_eq!(
            resolve_class_placeholder("p", &ph, &mut ctx),
            Resolution::Skipped
        );
    }

    #[test]
    fn test_compound_prefix_properties() {
        let mut ctx = ctx_with(r#"{"spacing/block": "24px"}"#);
        let ph = Placeholder {
            name: "spacing/block".to_string(),
            fallback: None,
        };
        let res = resolve_class_placeholder("px", &ph, &mut ctx);
        assert_eq!(res, Resolution::Synthesized("px-spacing-block".to_string()));
        assert_eq!(
            ctx.synthesized()[0].properties,
            vec!["padding-left", "padding-right"]
        );
    }

    #[test]
    fn test_resolve_style_value_rewrites_ident() {
        let mut ctx = ctx_with(r##"{"Border/Subtle": "#e5e7eb"}"##);
        let out = resolve_style_value("1px solid var(--Border/Subtle, #ccc)", &mut ctx);
        assert_eq!(
            out.as_deref(),
            Some("1px solid var(--border-subtle, #e5e7eb)")
        );
    }

    #[test]
    fn test_resolve_style_value_leaves_canonical() {
        let mut ctx = ctx_with("{}");
        assert_eq!(
            resolve_style_value("var(--border-subtle, #ccc)", &mut ctx),
            None
        );
    }
}
