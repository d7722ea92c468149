//! Data models for the word-distribution pipeline.
//!
//! This module contains the core data structures shared between the
//! fetcher, the retry policy, the pipeline and the output writer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Word-frequency map for one topic's page content.
///
/// Keys are normalized words (ASCII letters only, lower-cased), values are
/// occurrence counts.
pub type WordCount = HashMap<String, u64>;

/// Result of a single fetch attempt against the Wikipedia API.
///
/// Produced once per attempt by [`crate::fetcher::PageClient::fetch_once`]
/// and consumed immediately by the retry wrapper or the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page exists and has non-empty revision content.
    Content(String),
    /// The lookup resolved to the sentinel page id ("-1").
    NotFound,
    /// The API throttled the request (HTTP 429, or a null/structureless
    /// body, which the API uses to signal exhaustion in practice).
    RateLimited,
    /// Network or protocol failure; carries detail for logging.
    TransportError(String),
}

impl FetchOutcome {
    /// Whether this outcome is worth a delayed retry.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchOutcome::RateLimited)
    }
}

/// Terminal state of one topic's unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    /// The page was fetched and its words were absorbed into the table.
    Counted {
        /// Number of distinct words on the page.
        distinct_words: usize,
        /// Total word occurrences on the page.
        total_occurrences: u64,
    },
    /// No page exists for this topic; its table row stays empty.
    NotFound,
    /// Every attempt came back rate-limited; the topic was abandoned.
    RetriesExhausted {
        /// Number of attempts made before giving up.
        attempts: usize,
    },
    /// A network/protocol failure ended the unit of work.
    TransportFailed {
        /// Human-readable failure detail.
        detail: String,
    },
}

impl TopicOutcome {
    /// Whether the topic contributed a populated row to the table.
    pub fn is_counted(&self) -> bool {
        matches!(self, TopicOutcome::Counted { .. })
    }

    /// Returns an emoji representation of the outcome.
    pub fn emoji(&self) -> &'static str {
        match self {
            TopicOutcome::Counted { .. } => "✅",
            TopicOutcome::NotFound => "❓",
            TopicOutcome::RetriesExhausted { .. } => "⏳",
            TopicOutcome::TransportFailed { .. } => "⛔",
        }
    }
}

impl fmt::Display for TopicOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicOutcome::Counted {
                distinct_words,
                total_occurrences,
            } => write!(
                f,
                "counted {} distinct words ({} occurrences)",
                distinct_words, total_occurrences
            ),
            TopicOutcome::NotFound => write!(f, "page not found"),
            TopicOutcome::RetriesExhausted { attempts } => {
                write!(f, "could not retrieve after {} attempts", attempts)
            }
            TopicOutcome::TransportFailed { detail } => {
                write!(f, "transport failure: {}", detail)
            }
        }
    }
}

/// Report for one topic after its unit of work reached a terminal state.
#[derive(Debug, Clone)]
pub struct TopicReport {
    /// The normalized topic.
    pub topic: String,
    /// How the unit of work ended.
    pub outcome: TopicOutcome,
    /// Wall-clock time spent on this topic, retries included.
    pub elapsed: Duration,
}

/// Summary of how a run's topics fared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total number of topics processed.
    pub total: usize,
    /// Topics whose words were counted into the table.
    pub counted: usize,
    /// Topics with no matching page.
    pub not_found: usize,
    /// Topics abandoned after exhausting rate-limit retries.
    pub retries_exhausted: usize,
    /// Topics that hit a transport failure.
    pub transport_failed: usize,
}

impl RunSummary {
    /// Creates a summary from the per-topic reports.
    pub fn from_reports(reports: &[TopicReport]) -> Self {
        let mut summary = Self::default();
        summary.total = reports.len();

        for report in reports {
            match report.outcome {
                TopicOutcome::Counted { .. } => summary.counted += 1,
                TopicOutcome::NotFound => summary.not_found += 1,
                TopicOutcome::RetriesExhausted { .. } => summary.retries_exhausted += 1,
                TopicOutcome::TransportFailed { .. } => summary.transport_failed += 1,
            }
        }

        summary
    }

    /// Whether any topic failed to contribute a populated row.
    pub fn has_failures(&self) -> bool {
        self.counted < self.total
    }
}
