//! Tool configuration management for `figtree.toml`.
//!
//! # Sections
//!
//! | Section             | Purpose                                       |
//! |---------------------|-----------------------------------------------|
//! | `[pipeline]`        | Global pass behavior (continue_on_error)      |
//! | `[pipeline.passes]` | Per-pass enable/priority overrides            |
//! | `[variables]`       | Variable-definitions file location            |
//! | `[stylesheet]`      | Companion stylesheet output settings          |
//!
//! The config file is optional; a missing file means all defaults. When a
//! file exists it is found by searching upward from the working directory,
//! and its parent directory becomes the project root that relative paths
//! resolve against.

mod error;

pub use error::ConfigError;

use crate::cli::Cli;
use crate::log;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing figtree.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Absolute path to the config file, when one was found (internal)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file, or cwd (internal)
    #[serde(skip)]
    pub root: PathBuf,

    /// Pass pipeline settings
    pub pipeline: PipelineConfig,

    /// Variable table settings
    pub variables: VariablesConfig,

    /// Stylesheet emitter settings
    pub stylesheet: StylesheetConfig,
}

/// `[pipeline]`: global pass behavior plus per-pass overrides.
///
/// Pass names under `[pipeline.passes.<name>]` must match
/// [`crate::pipeline::PASS_NAMES`]; unknown names are rejected when the
/// registry is built, not here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Keep running after a pass fails, retaining its partial mutation.
    pub continue_on_error: bool,

    /// Per-pass overrides, keyed by pass name. BTreeMap keeps iteration
    /// (and therefore error reporting) deterministic.
    pub passes: BTreeMap<String, PassToggle>,
}

/// One `[pipeline.passes.<name>]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PassToggle {
    pub enable: bool,
    /// Overrides the pass's default position in the run order.
    pub priority: Option<i32>,
}

impl Default for PassToggle {
    fn default() -> Self {
        Self {
            enable: true,
            priority: None,
        }
    }
}

/// `[variables]`: where the variable-definitions JSON lives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VariablesConfig {
    /// Explicit definitions file, resolved against the project root.
    /// When unset, a `variables.json` next to the input file is used if
    /// present.
    pub file: Option<PathBuf>,
}

/// `[stylesheet]`: companion stylesheet output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StylesheetConfig {
    /// Output path, resolved against the project root. When unset, the
    /// sheet lands next to the output markup with a `.css` extension.
    pub path: Option<PathBuf>,

    /// Emit a Google Fonts `@import` for detected fonts.
    pub google_fonts: bool,
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            path: None,
            google_fonts: true,
        }
    }
}

impl FixConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; a missing file is not
    /// an error and yields defaults rooted at cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None => {
                let mut config = Self::default();
                config.root = std::env::current_dir().unwrap_or_default();
                config
            }
        };

        if config.root.as_os_str().is_empty() {
            config.root = PathBuf::from(".");
        }
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Warn about unknown fields and move on; this tool runs inside
    /// non-interactive scripts, so there is no confirmation prompt.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {display_path}, ignoring:");
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Join a path with the project root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Configured variables file as an absolute-ish path, if set.
    pub fn variables_file(&self) -> Option<PathBuf> {
        self.variables.file.as_ref().map(|f| self.root_join(f))
    }

    /// Configured stylesheet output path, if set.
    pub fn stylesheet_path(&self) -> Option<PathBuf> {
        self.stylesheet.path.as_ref().map(|p| self.root_join(p))
    }
}

/// Find config file by searching upward from current directory.
///
/// An absolute `config_name` is used as-is when it exists.
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// tests
// ============================================================================
