//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values (`$GENEE_CONFIG` or `~/.config/genee/config.yaml`)
//! 3. Environment variables (`GENEE_REGISTRY`)
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use libgenee::config::{ColorChoice, Config, OutputFormat};
use libgenee::Genee;
use std::env;
use std::path::PathBuf;

/// Verbosity level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Warnings and errors only
    Normal,
    /// -v
    Verbose,
    /// -vv
    VeryVerbose,
    /// -vvv and above
    Trace,
}

impl VerbosityLevel {
    /// Maps the `-v` count to a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Trace,
        }
    }

    /// Default `tracing` filter directive for the level.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::VeryVerbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Values given on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub registry: Option<String>,
    pub format: Option<OutputFormat>,
    pub color: Option<ColorChoice>,
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Verbosity from `-v` flags
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(cli: CliOverrides, verbosity: VerbosityLevel) -> Self {
        let file_config = match config_path() {
            Some(path) if path.exists() => Config::load(Some(&path)).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                Config::default()
            }),
            _ => Config::default(),
        };

        let env_registry = env::var("GENEE_REGISTRY").ok();
        Self::from_layers(file_config, env_registry, cli, verbosity)
    }

    /// Applies environment and CLI layers over an already loaded config.
    pub fn from_layers(
        mut config: Config,
        env_registry: Option<String>,
        cli: CliOverrides,
        verbosity: VerbosityLevel,
    ) -> Self {
        if let Some(registry) = env_registry.filter(|r| !r.trim().is_empty()) {
            config.registry = registry;
        }

        if let Some(registry) = cli.registry {
            config.registry = registry;
        }
        if let Some(format) = cli.format {
            config.output.format = format;
        }
        if let Some(color) = cli.color {
            config.output.color = color;
        }

        Self { config, verbosity }
    }

    /// Output format after all layers.
    pub fn output_format(&self) -> OutputFormat {
        self.config.output.format
    }

    /// Opens a session on the configured registry.
    pub fn session(&self) -> Result<Genee, String> {
        Genee::builder()
            .config(self.config.clone())
            .build()
            .map_err(|e| e.to_string())
    }
}

/// Location of the config file: `$GENEE_CONFIG`, else `~/.config/genee/config.yaml`.
pub fn config_path() -> Option<PathBuf> {
    match env::var_os("GENEE_CONFIG") {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(".config").join("genee").join("config.yaml")),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
