//! Variable table: design-variable definitions loaded once per run.
//!
//! The companion file is JSON mapping hierarchical names to either a literal
//! value or a font descriptor:
//!
//! ```json
//! {
//!   "Colors/White": "#ffffff",
//!   "margin/r": "32px",
//!   "Font/Body": { "family": "Inter", "style": "Regular", "size": 16, "weight": 400 }
//! }
//! ```
//!
//! Entry order follows the file (serde_json `preserve_order`), which keeps
//! stylesheet emission deterministic. The table is read-only during passes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Font descriptor variable (family + named style + metrics).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontDesc {
    pub family: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub size: f32,
    #[serde(default = "default_weight")]
    pub weight: u16,
}

fn default_weight() -> u16 {
    400
}

/// A resolved variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// Color or length literal, e.g. `#ffffff` or `32px`.
    Literal(String),
    Font(FontDesc),
}

/// Flat mapping from hierarchical variable name to value, in file order.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    entries: Vec<(String, VarValue)>,
}

impl VariableTable {
    /// Empty table: every lookup falls back to the placeholder's literal.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a JSON definitions file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read variables file `{}`", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("invalid variables file `{}`", path.display()))
    }

    /// Parse from JSON text, preserving entry order.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;

        let mut entries = Vec::with_capacity(map.len());
        for (name, value) in map {
            let value = match value {
                serde_json::Value::String(s) => VarValue::Literal(s),
                serde_json::Value::Number(n) => VarValue::Literal(n.to_string()),
                obj @ serde_json::Value::Object(_) => {
                    let font: FontDesc = serde_json::from_value(obj)
                        .with_context(|| format!("variable `{name}` is not a font descriptor"))?;
                    VarValue::Font(font)
                }
                other => {
                    anyhow::bail!("variable `{name}` has unsupported value: {other}")
                }
            };
            entries.push((name, value));
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.entries
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VarValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Slugify a hierarchical variable name into a CSS identifier.
///
/// `Colors/White` -> `colors-white`, `margin/r` -> `margin-r`.
pub fn css_ident(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let mut out = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "Colors/White": "#ffffff",
        "margin/r": "32px",
        "Radius/Base": 8,
        "Font/Body": { "family": "Inter", "style": "Bold", "size": 16, "weight": 700 }
    }"##;

    #[test]
    fn test_from_json_str_preserves_order() {
        let table = VariableTable::from_json_str(SAMPLE).unwrap();
        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Colors/White", "margin/r", "Radius/Base", "Font/Body"]);
    }

    #[test]
    fn test_lookup_literal_and_font() {
        let table = VariableTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(
            table.get("margin/r"),
            Some(&VarValue::Literal("32px".to_string()))
        );
        match table.get("Font/Body") {
            Some(VarValue::Font(font)) => {
                assert_eq!(font.family, "Inter");
                assert_eq!(font.weight, 700);
            }
            other => panic!("expected font descriptor, got {other:?}"),
        }
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn test_number_becomes_literal() {
        let table = VariableTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(
            table.get("Radius/Base"),
            Some(&VarValue::Literal("8".to_string()))
        );
    }

    #[test]
    fn test_invalid_value_rejected() {
        assert!(VariableTable::from_json_str(r#"{"x": [1,2]}"#).is_err());
    }

    #[test]
    fn test_css_ident() {
        assert_eq!(css_ident("Colors/White"), "colors-white");
        assert_eq!(css_ident("margin/r"), "margin-r");
        assert_eq!(css_ident("Spacing / XL 2"), "spacing-xl-2");
        assert_eq!(css_ident("Größe/Teilung"), "grosse-teilung");
    }
}
