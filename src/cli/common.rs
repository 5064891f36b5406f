//! Common utilities shared across CLI commands.
//!
//! Both `fix` and `check` run the same parse -> passes -> print -> sweep
//! sequence; the only difference is whether the results land on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::FixConfig;
use crate::markup::{parse_document, print_document};
use crate::pipeline::{PassRegistry, RewriteContext};
use crate::stylesheet::render_stylesheet;
use crate::sweep::sweep_text;
use crate::utils::path::resolve_path;
use crate::vars::VariableTable;

/// Everything one pipeline invocation produces.
pub struct Processed {
    pub markup: String,
    pub stylesheet: String,
    pub ctx: RewriteContext,
}

/// Run the full pipeline over `text`. Nothing is written to disk here.
pub fn process(
    text: &str,
    vars: VariableTable,
    source_dir: Option<PathBuf>,
    config: &FixConfig,
) -> Result<Processed> {
    let mut doc = parse_document(text).context("failed to parse input markup")?;

    let registry = PassRegistry::from_config(&config.pipeline)?;
    let mut ctx = RewriteContext::new(vars, source_dir);
    registry.run(&mut doc, &mut ctx)?;

    let printed = print_document(&doc);
    let markup = sweep_text(&printed, &mut ctx);
    let stylesheet = render_stylesheet(&ctx, config.stylesheet.google_fonts);

    Ok(Processed {
        markup,
        stylesheet,
        ctx,
    })
}

/// Resolve and load the variable table for an input file.
///
/// Priority: explicit CLI path, then `[variables] file` from config, then a
/// `variables.json` sitting next to the input. With none of those, lookups
/// fall back to the placeholders' embedded literals.
pub fn load_variables(
    explicit: Option<&Path>,
    config: &FixConfig,
    input: &Path,
) -> Result<VariableTable> {
    let input_dir = input.parent().unwrap_or(Path::new("."));
    if let Some(path) = explicit {
        return VariableTable::load(&resolve_path(path, input_dir));
    }
    if let Some(path) = config.variables_file() {
        return VariableTable::load(&path);
    }
    let sibling = input_dir.join("variables.json");
    if sibling.is_file() {
        return VariableTable::load(&sibling);
    }
    Ok(VariableTable::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_process_end_to_end() {
        let input = r#"
            <div className="flex content-stretch font-['Inter:Bold',sans-serif] p-[var(--margin/r,32px)]">
              <p className="text-[var(--Colors/White,#ffffff)] basis-0 grow">hello</p>
            </div>
        "#;
        let vars =
            VariableTable::from_json_str(r##"{"Colors/White": "#ffffff", "margin/r": "32px"}"##)
                .unwrap();
        let config = FixConfig::default();

        let result = process(input, vars, None, &config).unwrap();
        assert!(result.markup.contains("p-margin-r"));
        assert!(result.markup.contains("text-white"));
        assert!(result.markup.contains("overflow-x-clip"));
        assert!(result.markup.contains("fontFamily: 'Inter, sans-serif'"));
        assert!(!result.markup.contains("font-['Inter"));
        assert!(!result.markup.contains("content-stretch"));
        assert!(
            result
                .stylesheet
                .contains(".p-margin-r {\n  padding: var(--margin-r, 32px);\n}")
        );
        assert!(result.stylesheet.contains("family=Inter:wght@700"));
        assert!(result.ctx.stats.changes() > 0);
    }

    #[test]
    fn test_process_twice_is_clean() {
        let input = r#"<div className="p-[32px] font-['Inter:Regular'] gap-[16px]">x</div>"#;
        let config = FixConfig::default();

        let first = process(input, VariableTable::empty(), None, &config).unwrap();
        let second = process(&first.markup, VariableTable::empty(), None, &config).unwrap();
        assert_eq!(second.ctx.stats.changes(), 0);
        assert_eq!(second.markup, first.markup);
    }

    #[test]
    fn test_process_deterministic() {
        let input = r#"<div className="p-[var(--a/b,4px)] m-[var(--c/d,8px)]">x</div>"#;
        let config = FixConfig::default();
        let a = process(input, VariableTable::empty(), None, &config).unwrap();
        let b = process(input, VariableTable::empty(), None, &config).unwrap();
        assert_eq!(a.markup, b.markup);
        assert_eq!(a.stylesheet, b.stylesheet);
    }

    #[test]
    fn test_parse_failure_is_fatal() {
        let config = FixConfig::default();
        assert!(process("", VariableTable::empty(), None, &config).is_err());
    }

    #[test]
    fn test_load_variables_sibling_default() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("page.tsx");
        fs::write(&input, "<div />").unwrap();
        fs::write(
            tmp.path().join("variables.json"),
            r##"{"Colors/White": "#ffffff"}"##,
        )
        .unwrap();

        let config = FixConfig::default();
        let table = load_variables(None, &config, &input).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_load_variables_empty_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("page.tsx");
        let config = FixConfig::default();
        let table = load_variables(None, &config, &input).unwrap();
        assert!(table.is_empty());
    }
}
