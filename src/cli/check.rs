//! The `check` command: dry-run the pipeline and report what would change.
//!
//! Also re-runs the pipeline over its own output: a nonzero second-run
//! change count means some pass matches its own output, which breaks the
//! rerun-safety contract and is worth surfacing even in a dry run.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::CheckArgs;
use crate::cli::common::{load_variables, process};
use crate::config::FixConfig;
use crate::{log, logger};

pub fn run_check(args: &CheckArgs, config: &FixConfig) -> Result<()> {
    logger::set_verbose(args.verbose);

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read `{}`", args.input.display()))?;
    let source_dir = args.input.parent().map(PathBuf::from);

    let vars = load_variables(args.variables.as_deref(), config, &args.input)?;
    let first = process(&text, vars, source_dir.clone(), config)?;
    let stats = &first.ctx.stats;

    if stats.is_clean() {
        log!("check"; "{} is clean", args.input.display());
    } else {
        log!("check"; "{} would change: {}", args.input.display(), stats);
    }
    if stats.sweep_found > 0 {
        log!("sweep"; "{} placeholder(s) would survive tree resolution", stats.sweep_found);
    }

    let vars = load_variables(args.variables.as_deref(), config, &args.input)?;
    let second = process(&first.markup, vars, source_dir, config)?;
    let unstable = second.ctx.stats.changes() > 0;
    if unstable {
        log!("warning"; "output is not stable under a second run: {}", second.ctx.stats);
    }

    if args.strict && (!stats.is_clean() || unstable) {
        log!("error"; "`{}` needs fixing", args.input.display());
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::CheckArgs;

    fn args(input: PathBuf) -> CheckArgs {
        CheckArgs {
            input,
            variables: None,
            strict: false,
            verbose: false,
        }
    }

    #[test]
    fn test_check_never_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("page.tsx");
        let original = r#"<div className="p-[32px]">x</div>"#;
        fs::write(&input, original).unwrap();

        run_check(&args(input.clone()), &FixConfig::default()).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), original);
        assert!(!tmp.path().join("page.css").exists());
    }

    #[test]
    fn test_check_missing_input_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let result = run_check(&args(tmp.path().join("missing.tsx")), &FixConfig::default());
        assert!(result.is_err());
    }
}
