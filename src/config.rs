//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.wikitally.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Fetcher settings.
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of concurrent topic fetches.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    3
}

/// Wikipedia API fetcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Query API endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Rate-limit retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum fetch attempts per topic, first attempt included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Lower bound of the backoff delay in seconds.
    #[serde(default = "default_min_delay")]
    pub min_delay_secs: u64,

    /// Upper bound (inclusive) of the backoff delay in seconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> usize {
    3
}

fn default_min_delay() -> u64 {
    1
}

fn default_max_delay() -> u64 {
    7
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".wikitally.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Fetcher settings - URL always overrides since it has a CLI default
        self.fetcher.api_url = args.api_url.clone();

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.fetcher.timeout_seconds = timeout;
        }

        // Pool and retry settings - always override
        self.general.workers = args.workers;
        self.retry.max_attempts = args.max_attempts;
        self.retry.min_delay_secs = args.backoff_min;
        self.retry.max_delay_secs = args.backoff_max;

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.workers, 3);
        assert_eq!(config.fetcher.api_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.min_delay_secs, 1);
        assert_eq!(config.retry.max_delay_secs, 7);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
workers = 8

[fetcher]
api_url = "https://de.wikipedia.org/w/api.php"
timeout_seconds = 10

[retry]
max_attempts = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.workers, 8);
        assert_eq!(config.fetcher.api_url, "https://de.wikipedia.org/w/api.php");
        assert_eq!(config.fetcher.timeout_seconds, 10);
        assert_eq!(config.retry.max_attempts, 5);
        // Unset fields keep their defaults.
        assert_eq!(config.retry.min_delay_secs, 1);
        assert_eq!(config.retry.max_delay_secs, 7);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[fetcher]"));
        assert!(toml_str.contains("[retry]"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[general]\nworkers = 2\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.general.workers, 2);
    }
}
