//! Word-distribution file generation.
//!
//! Serializes the frozen table with topics as row labels and words as
//! columns. A word that never occurred for a topic serializes as an empty
//! cell (CSV) or an absent key (JSON). The caller overwrites the output
//! file on each run.

use crate::models::RunSummary;
use crate::table::FrozenTable;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata attached to JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct TallyMetadata {
    /// API endpoint the pages were fetched from.
    pub api_url: String,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// How the run's topics fared.
    pub summary: RunSummary,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a TallyMetadata,
    columns: &'a [String],
    rows: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    topic: &'a str,
    counts: &'a crate::models::WordCount,
}

/// Generate the CSV form of the table.
///
/// First column holds the topic labels; remaining columns are words in
/// first-seen order. Absent cells are empty fields.
pub fn generate_csv(table: &FrozenTable) -> String {
    let mut output = String::new();

    output.push_str("topic");
    for column in table.columns() {
        output.push(',');
        output.push_str(&quote_field(column));
    }
    output.push('\n');

    for topic in table.topics() {
        output.push_str(&quote_field(topic));
        for column in table.columns() {
            output.push(',');
            if let Some(count) = table.cell(topic, column) {
                output.push_str(&count.to_string());
            }
        }
        output.push('\n');
    }

    output
}

/// Generate the JSON form of the table with run metadata.
pub fn generate_json(table: &FrozenTable, metadata: &TallyMetadata) -> Result<String> {
    let rows = table
        .topics()
        .iter()
        .map(|topic| JsonRow {
            topic,
            counts: table.row(topic).unwrap_or(empty_counts()),
        })
        .collect();

    let report = JsonReport {
        metadata,
        columns: table.columns(),
        rows,
    };

    serde_json::to_string_pretty(&report).context("Failed to serialize JSON report")
}

/// Shared empty row for topics that absorbed nothing.
fn empty_counts() -> &'static crate::models::WordCount {
    use std::sync::OnceLock;
    static EMPTY: OnceLock<crate::models::WordCount> = OnceLock::new();
    EMPTY.get_or_init(crate::models::WordCount::new)
}

/// Quote a CSV field when it contains the delimiter, quotes or newlines.
fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DistributionTable;
    use crate::tokenize::word_counts;

    fn frozen_cat_dog() -> FrozenTable {
        let topics = vec!["cat".to_string(), "dog".to_string(), "empty".to_string()];
        let table = DistributionTable::new(&topics);
        table.absorb("cat", word_counts("cat cat dog"));
        table.absorb("dog", word_counts("dog dog cat"));
        table.freeze()
    }

    fn metadata() -> TallyMetadata {
        TallyMetadata {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            generated_at: Utc::now(),
            summary: RunSummary::default(),
            duration_seconds: 1.5,
        }
    }

    #[test]
    fn test_csv_shape() {
        let csv = generate_csv(&frozen_cat_dog());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);

        let header: Vec<&str> = lines[0].split(',').collect();
        assert_eq!(header[0], "topic");
        assert_eq!(header.len(), 3);

        let cat_row: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(cat_row[0], "cat");

        // Cell values line up with the header columns.
        let cat_index = header.iter().position(|c| *c == "cat").unwrap();
        let dog_index = header.iter().position(|c| *c == "dog").unwrap();
        assert_eq!(cat_row[cat_index], "2");
        assert_eq!(cat_row[dog_index], "1");
    }

    #[test]
    fn test_csv_absent_cells_are_empty() {
        let csv = generate_csv(&frozen_cat_dog());
        let empty_row = csv.lines().nth(3).unwrap();
        assert_eq!(empty_row, "empty,,");
    }

    #[test]
    fn test_csv_quotes_fields_with_delimiters() {
        let topics = vec!["washington, d.c.".to_string()];
        let table = DistributionTable::new(&topics);
        table.absorb("washington, d.c.", word_counts("city"));
        let csv = generate_csv(&table.freeze());

        assert!(csv.contains("\"washington, d.c.\""));
    }

    #[test]
    fn test_json_round_trips() {
        let json = generate_json(&frozen_cat_dog(), &metadata()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["metadata"]["api_url"],
            "https://en.wikipedia.org/w/api.php"
        );
        assert_eq!(value["rows"][0]["topic"], "cat");
        assert_eq!(value["rows"][0]["counts"]["cat"], 2);
        // The empty topic serializes as a row with no counts.
        assert_eq!(value["rows"][2]["topic"], "empty");
        assert_eq!(value["rows"][2]["counts"], serde_json::json!({}));
    }
}
