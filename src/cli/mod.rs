//! Command-line interface module.

pub mod args;
pub mod check;
pub mod common;
pub mod fix;

pub use args::{CheckArgs, Cli, Commands, FixArgs};
