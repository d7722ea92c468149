//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::pipeline::PoolMode;
use clap::Parser;
use std::path::PathBuf;

/// WikiTally - concurrent Wikipedia word-distribution counter
///
/// Fetch the Wikipedia page for every topic in a list, count word
/// frequencies per topic, and write one sparse topic×word table.
///
/// Examples:
///   wikitally --topics topic.txt
///   wikitally --topics topic.txt --workers 8 --output words.csv
///   wikitally --topics topic.txt --format json --output words.json
///   wikitally --topics topic.txt --dry-run
///   wikitally --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the newline-separated topic list
    ///
    /// One topic per line; lines are trimmed and lower-cased, empty lines
    /// are skipped.
    #[arg(short, long, default_value = "topic.txt", value_name = "FILE")]
    pub topics: PathBuf,

    /// Output file path for the word-distribution table
    ///
    /// Overwritten on each run.
    #[arg(
        short,
        long,
        default_value = "word_distribution.csv",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Output format (csv, json)
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Wikipedia query API endpoint URL
    #[arg(
        long,
        default_value = "https://en.wikipedia.org/w/api.php",
        env = "WIKITALLY_API_URL"
    )]
    pub api_url: String,

    /// Request timeout in seconds
    ///
    /// How long a single fetch attempt may take. Default: from config
    /// or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent topic fetches
    #[arg(short, long, default_value = "3", value_name = "NUM")]
    pub workers: usize,

    /// Concurrency strategy (tasks, workers)
    ///
    /// Both strategies produce the same table; they differ only in how
    /// the concurrency bound is enforced.
    #[arg(long, default_value = "tasks", value_name = "MODE")]
    pub mode: PoolMode,

    /// Maximum fetch attempts per topic, first attempt included
    #[arg(long, default_value = "3", value_name = "COUNT")]
    pub max_attempts: usize,

    /// Minimum rate-limit backoff delay in seconds
    #[arg(long, default_value = "1", value_name = "SECS")]
    pub backoff_min: u64,

    /// Maximum rate-limit backoff delay in seconds (inclusive)
    #[arg(long, default_value = "7", value_name = "SECS")]
    pub backoff_max: u64,

    /// Path to configuration file
    ///
    /// If not specified, looks for .wikitally.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: read and list the topics without fetching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .wikitally.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the word-distribution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// JSON with run metadata
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate API URL format (not needed for dry-run)
        if !self.dry_run {
            if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate worker pool size
        if self.workers == 0 {
            return Err("Workers must be at least 1".to_string());
        }

        // Validate retry attempts
        if self.max_attempts == 0 {
            return Err("Max attempts must be at least 1".to_string());
        }

        // Validate backoff range
        if self.backoff_min > self.backoff_max {
            return Err("Backoff minimum must not exceed backoff maximum".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            topics: PathBuf::from("topic.txt"),
            output: PathBuf::from("word_distribution.csv"),
            format: OutputFormat::Csv,
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            timeout: None,
            workers: 3,
            mode: PoolMode::Tasks,
            max_attempts: 3,
            backoff_min: 1,
            backoff_max: 7,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_api_url() {
        let mut args = make_args();
        args.api_url = "ftp://example.org".to_string();
        assert!(args.validate().is_err());

        // A dry run never touches the API, so the URL is not checked.
        args.dry_run = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_workers() {
        let mut args = make_args();
        args.workers = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_inverted_backoff_range() {
        let mut args = make_args();
        args.backoff_min = 9;
        args.backoff_max = 2;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
