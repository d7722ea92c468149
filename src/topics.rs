//! Topic list loading.
//!
//! Reads the newline-separated topic file and normalizes each entry into
//! the canonical topic form used as table row labels.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to produce a topic list.
///
/// Fatal to the run (there is nothing to process) but reported as a
/// diagnostic rather than crashing the process.
#[derive(Debug, Error)]
pub enum TopicSourceError {
    /// The topic file does not exist.
    #[error("topic file does not exist: {path}")]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The topic file exists but could not be read.
    #[error("failed to read topic file {path}: {source}")]
    Unreadable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Read the topic file and return the normalized topic list.
///
/// Each line is trimmed and lower-cased; empty lines are skipped. Exact
/// duplicates (after normalization) are dropped so every topic is unique
/// within the run, preserving first-occurrence order.
pub fn read_topic_file(path: &Path) -> Result<Vec<String>, TopicSourceError> {
    if !path.exists() {
        return Err(TopicSourceError::Missing {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| TopicSourceError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut topics = Vec::new();
    for line in content.lines() {
        let topic = line.trim().to_lowercase();
        if topic.is_empty() {
            continue;
        }
        if topics.contains(&topic) {
            debug!("Skipping duplicate topic: {}", topic);
            continue;
        }
        topics.push(topic);
    }

    if topics.is_empty() {
        warn!("Topic file {} contains no topics", path.display());
    }

    debug!("Loaded {} topics from {}", topics.len(), path.display());
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_topic_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_and_normalizes_topics() {
        let file = write_topic_file("Cat\n  Dog  \nRust (programming language)\n");
        let topics = read_topic_file(file.path()).unwrap();
        assert_eq!(topics, vec!["cat", "dog", "rust (programming language)"]);
    }

    #[test]
    fn test_skips_empty_lines() {
        let file = write_topic_file("cat\n\n   \ndog\n");
        let topics = read_topic_file(file.path()).unwrap();
        assert_eq!(topics, vec!["cat", "dog"]);
    }

    #[test]
    fn test_drops_exact_duplicates() {
        let file = write_topic_file("Cat\ncat\nCAT\ndog\n");
        let topics = read_topic_file(file.path()).unwrap();
        assert_eq!(topics, vec!["cat", "dog"]);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_topic_file(Path::new("/nonexistent/topic.txt")).unwrap_err();
        assert!(matches!(err, TopicSourceError::Missing { .. }));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_empty_file_yields_empty_list() {
        let file = write_topic_file("");
        let topics = read_topic_file(file.path()).unwrap();
        assert!(topics.is_empty());
    }
}
