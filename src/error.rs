//! Rich diagnostic error types for ngram-bot.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Every failure is scoped to the single
//! command that triggered it; nothing here is meant to end the process.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::channel::ChannelError;
pub use crate::paths::PathError;

/// Top-level error type for the bot.
#[derive(Debug, Error, Diagnostic)]
pub enum BotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

/// Convenience alias for top-level operations.
pub type BotResult<T> = std::result::Result<T, BotError>;

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("corpus fetch failed for \"{url}\": {message}")]
    #[diagnostic(
        code(ngram::query::fetch),
        help(
            "The n-gram endpoint could not be reached or answered with an error status. \
             Check network connectivity and the `corpus.endpoint` setting."
        )
    )]
    Fetch { url: String, message: String },

    #[error("corpus response could not be decoded: {message}")]
    #[diagnostic(
        code(ngram::query::decode),
        help(
            "The endpoint answered, but not with a JSON array of series objects \
             carrying a `timeseries` field. The corpus API may have changed."
        )
    )]
    Decode { message: String },

    #[error("corpus has no data for \"{term}\"")]
    #[diagnostic(
        code(ngram::query::no_series),
        help("The n-gram does not occur in the corpus. Check the spelling or widen the year range.")
    )]
    NoSeries { term: String },

    #[error("series is empty or all zero: no reference value to normalize against")]
    #[diagnostic(
        code(ngram::query::all_zero),
        help(
            "Every sample in the requested range is zero. \
             Try a wider year range or a more common term."
        )
    )]
    EmptyOrAllZeroSeries,
}

/// Convenience alias for query operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("failed to write chart: {path}")]
    #[diagnostic(
        code(ngram::render::write),
        help("Ensure the chart output directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing to plot: {message}")]
    #[diagnostic(
        code(ngram::render::empty),
        help("The renderer needs at least one value and a non-empty year range.")
    )]
    Empty { message: String },
}

/// Convenience alias for render operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ngram::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(ngram::config::parse),
        help("Check the TOML syntax. `ngram-bot config init` writes a file with every default spelled out.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(ngram::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {message}")]
    #[diagnostic(
        code(ngram::config::invalid),
        help(
            "Year bounds must satisfy min_year <= default_start <= default_end <= max_year, \
             and the trigger, join and separator characters must be distinct."
        )
    )]
    Invalid { message: String },
}

/// Convenience alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
