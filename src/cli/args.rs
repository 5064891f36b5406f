//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Figtree markup fixer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: figtree.toml)
    #[arg(short = 'C', long, default_value = "figtree.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rewrite a markup file in place (or to --output)
    #[command(visible_alias = "f")]
    Fix {
        #[command(flatten)]
        args: FixArgs,
    },

    /// Dry-run the pipeline and report what would change
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },
}

/// Fix command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct FixArgs {
    /// Input markup file
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output file (default: rewrite the input in place)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Variable-definitions JSON file (default: variables.json next to the
    /// input, when present)
    #[arg(long = "vars", value_hint = clap::ValueHint::FilePath)]
    pub variables: Option<PathBuf>,

    /// Companion stylesheet output path (default: output path with a .css
    /// extension)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub stylesheet: Option<PathBuf>,

    /// Keep running when a pass fails, retaining its partial changes
    /// (overrides [pipeline] continue_on_error)
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Compute and report changes without writing any file
    #[arg(long)]
    pub dry: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Check command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Input markup file
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Variable-definitions JSON file (default: variables.json next to the
    /// input, when present)
    #[arg(long = "vars", value_hint = clap::ValueHint::FilePath)]
    pub variables: Option<PathBuf>,

    /// Exit nonzero when the file still needs fixing or a pass is unstable
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}
