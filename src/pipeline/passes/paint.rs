//! Gradient, shape and blend-mode fixes (priority 22).
//!
//! The generator emits gradients as utility-class compositions the target
//! style system has no rules for (`bg-gradient-to-b from-[#a] to-[#b]` with
//! separate percent tokens). Those become a single inline `background`
//! value. Circular shapes come out with an off-by-rounding border radius.
//! Blend modes are only audited against an allow-list, never rewritten.
//!
//! Unrecognized variants are skipped without error.

use anyhow::Result;

use crate::markup::{Document, Element};
use crate::pipeline::Pass;
use crate::pipeline::context::RewriteContext;
use crate::utils::tw;
use crate::vars::placeholder::{ArbitraryToken, unescape_arbitrary};

pub struct PaintFix;

impl Pass for PaintFix {
    fn name(&self) -> &'static str {
        "paint"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        doc.for_each_element_mut(&mut |elem| {
            fix_gradient(elem, ctx);
            fix_circle_radius(elem, ctx);
            audit_blend_modes(elem, ctx);
        });
        Ok(())
    }
}

// ============================================================================
// Gradients
// ============================================================================

#[derive(Debug, Default)]
struct Stop {
    color: Option<String>,
    position: Option<String>,
}

impl Stop {
    fn render(&self, default_position: &str) -> Option<String> {
        let color = self.color.as_ref()?;
        let position = self.position.as_deref().unwrap_or(default_position);
        Some(format!("{color} {position}"))
    }
}

fn fix_gradient(elem: &mut Element, ctx: &mut RewriteContext) {
    // An existing background wins; rewriting under it would be destructive.
    if elem.style().is_some_and(|s| s.get("background").is_some()) {
        return;
    }

    let tokens = elem.classes();
    let mut direction: Option<&'static str> = None;
    let mut radial = false;
    let mut from = Stop::default();
    let mut via = Stop::default();
    let mut to = Stop::default();
    let mut consumed: Vec<String> = Vec::new();

    for token in &tokens {
        if let Some(dir) = token.strip_prefix("bg-gradient-to-") {
            if let Some(css) = gradient_direction(dir) {
                direction = Some(css);
                consumed.push(token.clone());
            }
            continue;
        }
        if token == "bg-radial" {
            radial = true;
            consumed.push(token.clone());
            continue;
        }
        let Some(arb) = ArbitraryToken::split(token) else {
            continue;
        };
        let stop = match arb.prefix {
            "from" => &mut from,
            "via" => &mut via,
            "to" => &mut to,
            _ => continue,
        };
        let body = unescape_arbitrary(arb.body);
        if body.ends_with('%') && body[..body.len() - 1].parse::<f32>().is_ok() {
            stop.position = Some(body);
            consumed.push(token.clone());
        } else if is_color_value(&body) {
            stop.color = Some(body);
            consumed.push(token.clone());
        }
    }

    let background = match (direction, radial) {
        (Some(dir), false) => {
            let Some(stops) = render_stops(&from, &via, &to) else {
                return;
            };
            format!("linear-gradient({dir}, {stops})")
        }
        (None, true) => {
            let Some(stops) = render_stops(&from, &via, &to) else {
                return;
            };
            format!("radial-gradient(circle, {stops})")
        }
        _ => return,
    };

    let kept: Vec<String> = tokens
        .into_iter()
        .filter(|t| !consumed.contains(t))
        .collect();
    elem.set_classes(&kept);
    elem.style_mut().set("background", background);
    ctx.stats.gradients_fixed += 1;
}

/// Both endpoint colors are required; an endpoint-less composition is some
/// other pattern and is left alone.
fn render_stops(from: &Stop, via: &Stop, to: &Stop) -> Option<String> {
    let first = from.render("0%")?;
    let last = to.render("100%")?;
    Some(match via.render("50%") {
        Some(mid) => format!("{first}, {mid}, {last}"),
        None => format!("{first}, {last}"),
    })
}

fn gradient_direction(suffix: &str) -> Option<&'static str> {
    Some(match suffix {
        "t" => "to top",
        "tr" => "to top right",
        "r" => "to right",
        "br" => "to bottom right",
        "b" => "to bottom",
        "bl" => "to bottom left",
        "l" => "to left",
        "tl" => "to top left",
        _ => return None,
    })
}

fn is_color_value(body: &str) -> bool {
    body.starts_with('#')
        || body.starts_with("rgb(")
        || body.starts_with("rgba(")
        || body.starts_with("hsl(")
        || body.starts_with("var(")
}

// ============================================================================
// Circle radius
// ============================================================================

/// A circle's radius must be exactly half the smaller dimension. The
/// generator rounds it independently, which leaves a visible flat edge at
/// some sizes. Only fires when both dimensions are explicit pixel values.
fn fix_circle_radius(elem: &mut Element, ctx: &mut RewriteContext) {
    let tokens = elem.classes();

    let mut width: Option<f32> = None;
    let mut height: Option<f32> = None;
    let mut radius: Option<(usize, f32)> = None;

    for (i, token) in tokens.iter().enumerate() {
        let Some(arb) = ArbitraryToken::split(token) else {
            continue;
        };
        let Some(px) = tw::parse_px(arb.body) else {
            continue;
        };
        match arb.prefix {
            "w" => width = Some(px),
            "h" => height = Some(px),
            "size" => {
                width = Some(px);
                height = Some(px);
            }
            "rounded" => radius = Some((i, px)),
            _ => {}
        }
    }

    let (Some(w), Some(h), Some((index, r))) = (width, height, radius) else {
        return;
    };
    let half = w.min(h) / 2.0;
    let error = (half - r).abs();
    // Off by rounding: close to a circle but not one. A radius far from
    // half-size is an intentional rounded rectangle.
    if error == 0.0 || error > 1.0 {
        return;
    }

    let mut fixed = tokens;
    fixed[index] = format!("rounded-[{}px]", fmt_px(half));
    elem.set_classes(&fixed);
    ctx.stats.shapes_fixed += 1;
}

fn fmt_px(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ============================================================================
// Blend modes
// ============================================================================

const BLEND_MODES: &[&str] = &[
    "normal",
    "multiply",
    "screen",
    "overlay",
    "darken",
    "lighten",
    "color-dodge",
    "color-burn",
    "hard-light",
    "soft-light",
    "difference",
    "exclusion",
    "hue",
    "saturation",
    "color",
    "luminosity",
    "plus-darker",
    "plus-lighter",
];

/// Observation only. Counters recur on every run by design; they are not
/// part of the idempotence contract.
fn audit_blend_modes(elem: &Element, ctx: &mut RewriteContext) {
    for token in elem.classes() {
        let Some(mode) = token.strip_prefix("mix-blend-") else {
            continue;
        };
        if BLEND_MODES.contains(&mode) {
            ctx.stats.blend_modes_verified += 1;
        } else {
            ctx.stats.blend_modes_unknown += 1;
        }
    }
}
