//! XDG-compliant path resolution for ngram-bot.
//!
//! The bot keeps two things on disk: its TOML config and the chart artifacts
//! it hands to the transport for delivery.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(ngram::paths::no_home),
        help("Set the HOME environment variable or pass `--config` explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(ngram::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for ngram-bot.
#[derive(Debug, Clone)]
pub struct BotPaths {
    /// `$XDG_CONFIG_HOME/ngram-bot/`
    pub config_dir: PathBuf,
    /// `$XDG_STATE_HOME/ngram-bot/`
    pub state_dir: PathBuf,
}

impl BotPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("ngram-bot");

        let state_dir = std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/state"))
            .join("ngram-bot");

        Ok(Self {
            config_dir,
            state_dir,
        })
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default directory for rendered charts.
    pub fn chart_dir(&self) -> PathBuf {
        self.state_dir.join("charts")
    }

    /// Create all base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.state_dir, &self.chart_dir()] {
            ensure_dir(dir)?;
        }
        Ok(())
    }
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &std::path::Path) -> PathResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
        path: dir.display().to_string(),
        source: e,
    })
}
