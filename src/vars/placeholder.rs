//! Variable-placeholder and arbitrary-value token parsing.
//!
//! A placeholder is a textual `var(--Name/Sub, fallback)` reference embedded
//! either in an arbitrary-value class token (`p-[var(--margin/r,32px)]`) or
//! in an inline style value. Inside class tokens, spaces are escaped as `_`
//! (with `\_` for a literal underscore), so bodies are unescaped before
//! parsing and matching.

/// A parsed variable reference: name (without the `--`) plus fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub fallback: Option<String>,
}

/// An arbitrary-value class token split into `prefix-[body]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitraryToken<'a> {
    pub prefix: &'a str,
    pub body: &'a str,
}

impl<'a> ArbitraryToken<'a> {
    /// Split a class token of the shape `prefix-[body]`.
    pub fn split(token: &'a str) -> Option<Self> {
        let open = token.find("-[")?;
        if open == 0 || !token.ends_with(']') {
            return None;
        }
        Some(Self {
            prefix: &token[..open],
            body: &token[open + 2..token.len() - 1],
        })
    }
}

/// Unescape an arbitrary-value body: `_` -> space, `\_` -> `_`.
pub fn unescape_arbitrary(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'_') => {
                chars.next();
                out.push('_');
            }
            '_' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Parse a `var(...)` expression at the start of `s`.
///
/// Returns the placeholder and the byte length consumed (through the closing
/// paren). The fallback may itself contain parenthesized values.
pub fn parse_var_expr(s: &str) -> Option<(Placeholder, usize)> {
    let rest = s.strip_prefix("var(")?;
    let close = matching_paren(rest)?;
    let inner = &rest[..close];

    let (name_part, fallback) = match top_level_comma(inner) {
        Some(pos) => (
            inner[..pos].trim(),
            Some(inner[pos + 1..].trim().to_string()),
        ),
        None => (inner.trim(), None),
    };

    let name = name_part.strip_prefix("--")?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let fallback = fallback.filter(|f| !f.is_empty());
    Some((Placeholder { name, fallback }, 4 + close + 1))
}

/// Find the first `var(--...)` expression anywhere in `s`.
///
/// Returns (start, placeholder, end-exclusive) byte offsets.
pub fn find_var(s: &str) -> Option<(usize, Placeholder, usize)> {
    let mut from = 0;
    while let Some(rel) = s[from..].find("var(--") {
        let start = from + rel;
        if let Some((ph, len)) = parse_var_expr(&s[start..]) {
            return Some((start, ph, start + len));
        }
        from = start + 4;
    }
    None
}

/// Offset of the paren closing an expression that starts at depth 1.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// First comma at paren depth zero.
fn top_level_comma(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_arbitrary_token() {
        let token = ArbitraryToken::split("p-[var(--margin/r,32px)]").unwrap();
        assert_eq!(token.prefix, "p");
        assert_eq!(token.body, "var(--margin/r,32px)");

        let token = ArbitraryToken::split("gap-x-[16px]").unwrap();
        assert_eq!(token.prefix, "gap-x");
        assert_eq!(token.body, "16px");

        assert_eq!(ArbitraryToken::split("flex"), None);
        assert_eq!(ArbitraryToken::split("-[32px]"), None);
    }

    #[test]
    fn test_unescape_arbitrary() {
        assert_eq!(unescape_arbitrary("Inter,_sans-serif"), "Inter, sans-serif");
        assert_eq!(unescape_arbitrary(r"snake\_case"), "snake_case");
        assert_eq!(unescape_arbitrary("32px"), "32px");
    }

    #[test]
    fn test_parse_var_expr_with_fallback() {
        let (ph, len) = parse_var_expr("var(--margin/r,32px)").unwrap();
        assert_eq!(ph.name, "margin/r");
        assert_eq!(ph.fallback.as_deref(), Some("32px"));
        assert_eq!(len, "var(--margin/r,32px)".len());
    }

    #[test]
    fn test_parse_var_expr_without_fallback() {
        let (ph, _) = parse_var_expr("var(--Colors/White)").unwrap();
        assert_eq!(ph.name, "Colors/White");
        assert_eq!(ph.fallback, None);
    }

    #[test]
    fn test_parse_var_expr_nested_parens_in_fallback() {
        let (ph, len) = parse_var_expr("var(--Overlay/Dim, rgba(0,0,0,0.5)) rest").unwrap();
        assert_eq!(ph.fallback.as_deref(), Some("rgba(0,0,0,0.5)"));
        assert_eq!(&"var(--Overlay/Dim, rgba(0,0,0,0.5)) rest"[len..], " rest");
    }

    #[test]
    fn test_find_var_skips_prefix_text() {
        let s = "1px solid var(--Border/Subtle, #e5e7eb)";
        let (start, ph, end) = find_var(s).unwrap();
        assert_eq!(&s[..start], "1px solid ");
        assert_eq!(ph.name, "Border/Subtle");
        assert_eq!(end, s.len());
    }

    #[test]
    fn test_parse_var_expr_rejects_malformed() {
        assert_eq!(parse_var_expr("var(margin, 1px)"), None); // missing --
        assert_eq!(parse_var_expr("var(--x"), None); // unterminated
        assert_eq!(parse_var_expr("x(--y,1)"), None);
    }
}
