//! Bot configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the stock
//! behaviour: `.` directives, Google Books corpus 26 between 1500 and 2019,
//! and at most three retracted items per bounded `!delete`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::history::ENTRIES_PER_ITEM;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub syntax: SyntaxConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retraction: RetractionConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Directive surface syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxConfig {
    /// Leading character that marks a directive.
    #[serde(default = "default_trigger")]
    pub trigger: char,
    /// Splits the search term from option segments.
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Replaces spaces inside the search term.
    #[serde(default = "default_join")]
    pub join: char,
}

fn default_trigger() -> char {
    '.'
}
fn default_separator() -> char {
    ','
}
fn default_join() -> char {
    '+'
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            trigger: default_trigger(),
            separator: default_separator(),
            join: default_join(),
        }
    }
}

/// Corpus endpoint and year bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// JSON endpoint queried with the compiled parameters.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Corpus identifier (26 = English 2019).
    #[serde(default = "default_corpus_id")]
    pub corpus_id: u32,
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
    /// Earliest year the corpus covers.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Latest year the corpus covers.
    #[serde(default = "default_max_year")]
    pub max_year: i32,
    /// Start year used when a directive gives none (or an out-of-range one).
    #[serde(default = "default_start")]
    pub default_start: i32,
    /// End year used when a directive gives none (or an out-of-range one).
    #[serde(default = "default_end")]
    pub default_end: i32,
    /// Fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://books.google.com/ngrams/json".into()
}
fn default_corpus_id() -> u32 {
    26
}
fn default_case_insensitive() -> bool {
    true
}
fn default_min_year() -> i32 {
    1500
}
fn default_max_year() -> i32 {
    2019
}
fn default_start() -> i32 {
    1800
}
fn default_end() -> i32 {
    2019
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            corpus_id: default_corpus_id(),
            case_insensitive: default_case_insensitive(),
            min_year: default_min_year(),
            max_year: default_max_year(),
            default_start: default_start(),
            default_end: default_end(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CorpusConfig {
    /// Whether `year` lies within the corpus bounds (inclusive).
    pub fn in_bounds(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }

    /// The fetch timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `!delete` command settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetractionConfig {
    /// Command prefix.
    #[serde(default = "default_command")]
    pub command: String,
    /// Keyword anywhere in the command that selects the unbounded scope.
    #[serde(default = "default_all_keyword")]
    pub all_keyword: String,
    /// Ceiling for a bounded retraction, in items (directive + response).
    #[serde(default = "default_max_items")]
    pub max_items: u32,
    /// Fragment identifying the bot's own refusal warnings in history.
    #[serde(default = "default_warning_marker")]
    pub warning_marker: String,
}

fn default_command() -> String {
    "!delete".into()
}
fn default_all_keyword() -> String {
    "all".into()
}
fn default_max_items() -> u32 {
    3
}
fn default_warning_marker() -> String {
    "you can only".into()
}

impl Default for RetractionConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            all_keyword: default_all_keyword(),
            max_items: default_max_items(),
            warning_marker: default_warning_marker(),
        }
    }
}

impl RetractionConfig {
    /// The ceiling in transcript entries.
    pub fn max_entries(&self) -> u32 {
        self.max_items.saturating_mul(ENTRIES_PER_ITEM)
    }

    /// The refusal text sent to `name`. Always contains `warning_marker`
    /// for the stock settings, so later scans can find and remove it.
    pub fn warning_text(&self, name: &str) -> String {
        format!(
            "{name}, {} delete {} search histories at a time. To delete more, specify '{}'.",
            self.warning_marker, self.max_items, self.all_keyword
        )
    }
}

/// Chart output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Directory charts are written to. `None` uses the XDG state dir.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// File stem of the chart artifact; each new chart overwrites the last.
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_file_stem() -> String {
    "pic".into()
}
fn default_width() -> u32 {
    1700
}
fn default_height() -> u32 {
    1000
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_stem: default_file_stem(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl BotConfig {
    /// Check cross-field invariants.
    pub fn validate(&self) -> ConfigResult<()> {
        let c = &self.corpus;
        if !(c.min_year <= c.default_start
            && c.default_start <= c.default_end
            && c.default_end <= c.max_year)
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "year bounds out of order: min {} / start {} / end {} / max {}",
                    c.min_year, c.default_start, c.default_end, c.max_year
                ),
            });
        }
        let s = &self.syntax;
        if s.trigger == s.separator || s.trigger == s.join || s.separator == s.join {
            return Err(ConfigError::Invalid {
                message: format!(
                    "trigger '{}', separator '{}' and join '{}' must differ",
                    s.trigger, s.separator, s.join
                ),
            });
        }
        if self.retraction.command.is_empty() {
            return Err(ConfigError::Invalid {
                message: "retraction command must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
