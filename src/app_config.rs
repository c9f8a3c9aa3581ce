use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::subtitle_processor::{InvalidTimingPolicy, ParseOptions};

/// Application configuration module
///
/// Loads, validates and saves the JSON configuration shared by the CLI and
/// by hosts embedding the library.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Subtitle parsing options
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// Translation options
    #[serde(default)]
    pub translation: TranslationConfig,

    /// How often a player should re-query the timeline, in ms
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Where translated subtitle files are saved
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Subtitle parsing configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// Repair or drop entries whose end precedes their start
    #[serde(default)]
    pub invalid_timing: InvalidTimingPolicy,

    /// Remove inline `<...>` markup from entry text
    #[serde(default = "default_true")]
    pub strip_markup: bool,
}

impl SubtitleConfig {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            invalid_timing: self.invalid_timing,
            strip_markup: self.strip_markup,
        }
    }
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            invalid_timing: InvalidTimingPolicy::default(),
            strip_markup: true,
        }
    }
}

/// Translation configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Translated strings kept in the LRU cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    // @field: Max concurrent backend requests
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    // @field: Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Pause between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    // @field: Pause between entries when translating a whole track
    #[serde(default = "default_entry_delay_ms")]
    pub entry_delay_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            entry_delay_ms: default_entry_delay_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_cache_capacity() -> usize {
    500
}

fn default_max_concurrent_requests() -> usize {
    2
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_entry_delay_ms() -> u64 {
    20
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let config: Config = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration, writing a default file first if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        for (field, code) in [
            ("source_language", &self.source_language),
            ("target_language", &self.target_language),
        ] {
            crate::language_utils::get_language_name(code).map_err(|e| ConfigError::InvalidValue {
                field,
                message: e.to_string(),
            })?;
        }

        if self.translation.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "translation.cache_capacity",
                message: "must be greater than zero".to_string(),
            }
            .into());
        }

        if self.translation.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "translation.max_concurrent_requests",
                message: "must be greater than zero".to_string(),
            }
            .into());
        }

        if !(1..=1000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                message: format!("{} is outside 1..=1000", self.poll_interval_ms),
            }
            .into());
        }

        Ok(())
    }

    /// Directory translated subtitles are written to
    ///
    /// Falls back to a `Subtitles` folder in the user's download directory,
    /// then to the current directory.
    pub fn output_directory(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| dirs::download_dir().map(|dir| dir.join("Subtitles")))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "ro".to_string(),
            subtitle: SubtitleConfig::default(),
            translation: TranslationConfig::default(),
            poll_interval_ms: default_poll_interval_ms(),
            output_dir: None,
            log_level: LogLevel::default(),
        }
    }
}
