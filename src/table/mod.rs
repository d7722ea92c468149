//! Shared topic×word aggregation table.
//!
//! One row per topic, one column per word ever seen across the run. The
//! table is the pipeline's only shared mutable state: workers call
//! [`DistributionTable::absorb`] concurrently, and every mutation happens
//! under a single mutex acquisition so no writer observes a partial column
//! set. Fetching and tokenizing stay outside the lock.

use crate::models::WordCount;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Concurrently-mutated sparse topic×word count matrix.
pub struct DistributionTable {
    inner: Mutex<TableInner>,
}

struct TableInner {
    /// Row labels in input order; fixed at construction.
    topics: Vec<String>,
    /// Column labels in first-seen order; grows monotonically.
    columns: Vec<String>,
    /// Membership index for `columns`.
    column_set: HashSet<String>,
    /// Populated cells, keyed by topic then word.
    cells: HashMap<String, WordCount>,
}

impl DistributionTable {
    /// Create a table with one (empty) row per topic.
    pub fn new(topics: &[String]) -> Self {
        Self {
            inner: Mutex::new(TableInner {
                topics: topics.to_vec(),
                columns: Vec::new(),
                column_set: HashSet::new(),
                cells: HashMap::new(),
            }),
        }
    }

    /// Merge one topic's word counts into the table.
    ///
    /// Creates columns for unseen words and writes the topic's cells in one
    /// critical section. Called at most once per topic; the pipeline's
    /// lifecycle enforces that no absorb happens after [`freeze`].
    ///
    /// [`freeze`]: DistributionTable::freeze
    pub fn absorb(&self, topic: &str, counts: WordCount) {
        let mut inner = self.inner.lock().expect("table lock poisoned");

        if !inner.topics.iter().any(|t| t == topic) {
            // A row for an unknown topic means the caller broke the
            // lifecycle; record it rather than silently dropping counts.
            warn!("Absorbing counts for topic not in the row set: {}", topic);
            inner.topics.push(topic.to_string());
        }

        for word in counts.keys() {
            if inner.column_set.insert(word.clone()) {
                inner.columns.push(word.clone());
            }
        }

        debug!(
            topic = topic,
            distinct_words = counts.len(),
            "Absorbed word counts into table"
        );
        inner.cells.insert(topic.to_string(), counts);
    }

    /// Snapshot of the current column labels, in first-seen order.
    pub fn columns(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("table lock poisoned")
            .columns
            .clone()
    }

    /// Consume the table into its immutable, output-ready form.
    pub fn freeze(self) -> FrozenTable {
        let inner = self.inner.into_inner().expect("table lock poisoned");
        FrozenTable {
            topics: inner.topics,
            columns: inner.columns,
            cells: inner.cells,
        }
    }
}

/// Finished table, handed to the output writer after the run barrier.
pub struct FrozenTable {
    topics: Vec<String>,
    columns: Vec<String>,
    cells: HashMap<String, WordCount>,
}

impl FrozenTable {
    /// Row labels in input order.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Column labels in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Count for one cell; `None` when the word never occurred for the
    /// topic (serialized as an absent/empty cell).
    pub fn cell(&self, topic: &str, word: &str) -> Option<u64> {
        self.cells.get(topic).and_then(|row| row.get(word)).copied()
    }

    /// Populated row for a topic, if it absorbed any counts.
    pub fn row(&self, topic: &str) -> Option<&WordCount> {
        self.cells.get(topic)
    }
}
