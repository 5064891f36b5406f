//! Safety-net text sweep.
//!
//! Runs after the tree has been serialized back to text and scans for raw
//! variable placeholders the tree-based pass never saw, typically because
//! they sat inside an opaque attribute expression. Replacement goes through
//! the same resolver as the tree pass, so both stages agree on every name.
//!
//! A nonzero found-count is a quality signal about the tree pass, not a
//! failure. `sweep_found` is observational and recurs for placeholders the
//! sweep cannot fix; `sweep_fixed` is a change counter and goes to zero on
//! a second run.

use regex::Regex;
use std::sync::LazyLock;

use crate::debug;
use crate::pipeline::context::RewriteContext;
use crate::vars::placeholder::{parse_var_expr, unescape_arbitrary};
use crate::vars::resolve::{Resolution, resolve_class_placeholder, resolve_style_value};
use crate::vars::table::css_ident;

/// Candidate locator; structure (nested parens in fallbacks) is handled by
/// the placeholder parser, not the pattern.
static VAR_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"var\(--").unwrap());

/// Scan serialized markup for leftover placeholders and fix what the
/// resolver understands. Returns the swept text.
pub fn sweep_text(text: &str, ctx: &mut RewriteContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let Some(found) = VAR_REF.find(rest) else {
            break;
        };
        let start = found.start();
        let Some((ph, len)) = parse_var_expr(&rest[start..]) else {
            // Malformed reference (unterminated, empty name): pass through
            out.push_str(&rest[..found.end()]);
            rest = &rest[found.end()..];
            continue;
        };
        let end = start + len;
        let canonical = css_ident(&ph.name) == ph.name;

        // Class-token shape: `prefix-[var(...)]` with the var spanning the
        // whole bracket body. Resolved regardless of how the name is spelled,
        // matching what the tree pass does for className tokens.
        if let Some((token_start, prefix)) = token_context(rest, start, end) {
            let body = unescape_arbitrary(&rest[start..end]);
            if let Some((unescaped, consumed)) = parse_var_expr(&body)
                && consumed == body.len()
            {
                match resolve_class_placeholder(prefix, &unescaped, ctx) {
                    Resolution::Canonical(t) | Resolution::Synthesized(t) => {
                        debug!("sweep"; "{} -> {t}", &rest[token_start..end + 1]);
                        ctx.stats.sweep_found += 1;
                        out.push_str(&rest[..token_start]);
                        out.push_str(&t);
                        rest = &rest[end + 1..];
                        ctx.stats.sweep_fixed += 1;
                        continue;
                    }
                    Resolution::Skipped => {}
                }
            }
            // Unknown prefix with an already-canonical name: the in-place
            // rewrite would be a no-op, and counting it would recur forever.
            if canonical {
                out.push_str(&rest[..end]);
                rest = &rest[end..];
                continue;
            }
            ctx.stats.sweep_found += 1;
            // Unresolvable as a token: slug the reference in place, keeping
            // the escaped fallback valid inside the bracket body.
            let ident = css_ident(&ph.name);
            if !ident.is_empty() {
                out.push_str(&rest[..start]);
                match top_level_fallback(&rest[start..end]) {
                    Some(fb) => out.push_str(&format!("var(--{ident},{fb})")),
                    None => out.push_str(&format!("var(--{ident})")),
                }
                rest = &rest[end..];
                ctx.stats.sweep_fixed += 1;
            } else {
                out.push_str(&rest[..end]);
                rest = &rest[end..];
            }
            continue;
        }

        // Already-canonical free-standing references are the tree pass's own
        // output
        if canonical {
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }
        ctx.stats.sweep_found += 1;

        // Free-standing reference (style value or plain text): same rewrite
        // the tree pass applies to style values.
        match resolve_style_value(&rest[start..end], ctx) {
            Some(rewritten) => {
                debug!("sweep"; "{} -> {rewritten}", &rest[start..end]);
                out.push_str(&rest[..start]);
                out.push_str(&rewritten);
                ctx.stats.sweep_fixed += 1;
            }
            None => out.push_str(&rest[..end]),
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

/// If the var expression at `start..end` fills a `prefix-[...]` token,
/// return the token's start offset and its prefix.
fn token_context<'a>(text: &'a str, start: usize, end: usize) -> Option<(usize, &'a str)> {
    if !text[end..].starts_with(']') {
        return None;
    }
    let before = &text[..start];
    if !before.ends_with("-[") {
        return None;
    }
    let dash = before.len() - 2;

    let prefix_start = before[..dash]
        .rfind(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .map(|i| i + c_len(&before[..dash], i))
        .unwrap_or(0);
    let prefix = &text[prefix_start..dash];
    if prefix.is_empty() || !prefix.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    Some((prefix_start, prefix))
}

fn c_len(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(1, char::len_utf8)
}

/// Raw (still escaped) fallback text of a var expression.
fn top_level_fallback(raw: &str) -> Option<String> {
    let (ph_raw, _) = parse_var_expr(raw)?;
    ph_raw.fallback
}
