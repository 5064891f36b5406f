//! Figtree - fixes Figma-generated React/Tailwind markup.

mod cli;
mod config;
mod logger;
mod markup;
mod pipeline;
mod stats;
mod stylesheet;
mod sweep;
mod utils;
mod vars;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::FixConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = FixConfig::load(&cli)?;

    match &cli.command {
        Commands::Fix { args } => cli::fix::run_fix(args, &config),
        Commands::Check { args } => cli::check::run_check(args, &config),
    }
}
