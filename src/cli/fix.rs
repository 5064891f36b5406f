//! The `fix` command: rewrite one markup file and emit its stylesheet.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::FixArgs;
use crate::cli::common::{load_variables, process};
use crate::config::FixConfig;
use crate::{log, logger};

pub fn run_fix(args: &FixArgs, config: &FixConfig) -> Result<()> {
    logger::set_verbose(args.verbose);

    let mut config = config.clone();
    if args.keep_going {
        config.pipeline.continue_on_error = true;
    }

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read `{}`", args.input.display()))?;
    let vars = load_variables(args.variables.as_deref(), &config, &args.input)?;
    let source_dir = args.input.parent().map(PathBuf::from);

    // Any failure up to here leaves the input untouched
    let result = process(&text, vars, source_dir, &config)?;

    let output = args.output.as_deref().unwrap_or(&args.input);
    if !args.dry {
        fs::write(output, &result.markup)
            .with_context(|| format!("failed to write `{}`", output.display()))?;
    }

    let stats = &result.ctx.stats;
    if !result.stylesheet.is_empty() {
        let sheet_path = args
            .stylesheet
            .clone()
            .or_else(|| config.stylesheet_path())
            .unwrap_or_else(|| output.with_extension("css"));
        if !args.dry {
            fs::write(&sheet_path, &result.stylesheet)
                .with_context(|| format!("failed to write `{}`", sheet_path.display()))?;
        }
        log!("fix"; "{}", sheet_path.display());
    }

    if stats.sweep_found > 0 {
        log!("sweep"; "{} placeholder(s) survived tree resolution, {} fixed in text",
            stats.sweep_found, stats.sweep_fixed);
    }

    let mark = if args.dry { " [dry]" } else { "" };
    if stats.is_clean() {
        log!("fix"; "{}{mark} (already clean)", output.display());
    } else {
        log!("fix"; "{}{mark} ({})", output.display(), stats);
    }
    Ok(())
}
