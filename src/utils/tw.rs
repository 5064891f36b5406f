//! Utility-class scale tables.
//!
//! Fixed lookup tables for the target style system: the spacing scale, the
//! font-size scale, and the core color palette. Used by the cleanup and
//! optimizer passes (arbitrary-value collapse) and by the variable resolver
//! (canonical color rewriting). Mappings are exact; anything off-scale stays
//! an arbitrary value.

/// Spacing steps available on the standard scale, in units of 4px.
const SPACING_STEPS: &[u32] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60,
    64, 72, 80, 96,
];

/// Font-size scale: pixel value to suffix.
const FONT_SIZES: &[(f32, &str)] = &[
    (12.0, "xs"),
    (14.0, "sm"),
    (16.0, "base"),
    (18.0, "lg"),
    (20.0, "xl"),
    (24.0, "2xl"),
    (30.0, "3xl"),
    (36.0, "4xl"),
    (48.0, "5xl"),
    (60.0, "6xl"),
];

/// Core palette: normalized 6-digit hex to canonical color name.
const COLORS: &[(&str, &str)] = &[
    ("#ffffff", "white"),
    ("#000000", "black"),
    ("#f9fafb", "gray-50"),
    ("#f3f4f6", "gray-100"),
    ("#e5e7eb", "gray-200"),
    ("#9ca3af", "gray-400"),
    ("#6b7280", "gray-500"),
    ("#374151", "gray-700"),
    ("#111827", "gray-900"),
    ("#ef4444", "red-500"),
    ("#22c55e", "green-500"),
    ("#3b82f6", "blue-500"),
    ("#eab308", "yellow-500"),
];

/// Parse a `Npx` length. Returns None for any other unit.
pub fn parse_px(value: &str) -> Option<f32> {
    value.strip_suffix("px")?.trim().parse().ok()
}

/// Spacing step suffix for an exact on-scale pixel value: 16px -> "4".
pub fn spacing_step(px: f32) -> Option<String> {
    if px < 0.0 || px.fract() != 0.0 {
        return None;
    }
    let px = px as u32;
    if px % 4 != 0 {
        return None;
    }
    let step = px / 4;
    SPACING_STEPS.contains(&step).then(|| step.to_string())
}

/// Font-size suffix when `px` is within 1px of exactly one scale step.
///
/// Equidistant values (15px sits between 14 and 16) have no unambiguous
/// step and map to nothing.
pub fn font_size_step(px: f32) -> Option<&'static str> {
    let mut matched = None;
    for (size, suffix) in FONT_SIZES {
        if (px - size).abs() <= 1.0 {
            if matched.is_some() {
                return None; // ambiguous
            }
            matched = Some(*suffix);
        }
    }
    matched
}

/// Canonical color name for a hex value, if it is on the core palette.
pub fn canonical_color(value: &str) -> Option<&'static str> {
    let hex = normalize_hex(value)?;
    COLORS
        .iter()
        .find_map(|(h, name)| (*h == hex).then_some(*name))
}

/// Normalize `#rgb`/`#rrggbb`/`#rrggbbff` to lowercase `#rrggbb`.
/// An alpha channel other than full opacity has no canonical name.
pub fn normalize_hex(value: &str) -> Option<String> {
    let body = value.trim().strip_prefix('#')?;
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let lower = body.to_ascii_lowercase();
    match lower.len() {
        3 => {
            let mut out = String::from("#");
            for c in lower.chars() {
                out.push(c);
                out.push(c);
            }
            Some(out)
        }
        6 => Some(format!("#{lower}")),
        8 => lower
            .ends_with("ff")
            .then(|| format!("#{}", &lower[..6])),
        _ => None,
    }
}
