//! Pipeline orchestration.
//!
//! Drives every topic through retry-wrapped fetch → tokenize → absorb
//! under a bounded concurrency limit, then waits for all units of work to
//! reach a terminal state before the table is frozen. One topic's failure
//! never aborts another's: each unit ends in a [`TopicOutcome`] that the
//! run summary reports.
//!
//! Two pool strategies satisfy the same contract and produce the same
//! table contents: a cooperative task pool (all topics on a bounded
//! stream) and a worker pool (fixed workers draining a shared queue).

use crate::fetcher::{retry_rate_limited, RandomBackoff, RetryPolicy};
use crate::models::{FetchOutcome, TopicOutcome, TopicReport};
use crate::table::DistributionTable;
use crate::tokenize;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Concurrency strategy for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PoolMode {
    /// Cooperative task pool: every topic becomes a task on one bounded
    /// stream (default).
    #[default]
    Tasks,
    /// Worker pool: a fixed set of workers drains a shared topic queue.
    Workers,
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Maximum fetch+tokenize+absorb sequences in flight at once.
    pub workers: usize,
    /// Concurrency strategy.
    pub mode: PoolMode,
    /// Retry bounds for rate-limited fetches.
    pub retry: RetryPolicy,
    /// Whether to render a progress bar on the console.
    pub show_progress: bool,
}

/// Run an operation and measure its wall-clock time.
pub async fn timed<T>(operation: impl Future<Output = T>) -> (T, Duration) {
    let start = Instant::now();
    let result = operation.await;
    (result, start.elapsed())
}

/// Drive the full topic list to completion.
///
/// Blocks until every topic's unit of work has reached a terminal state,
/// then returns one report per topic in input order. The fetch function is
/// generic so tests can script outcomes instead of hitting the network.
pub async fn run<F, Fut>(
    topics: Vec<String>,
    table: Arc<DistributionTable>,
    settings: PipelineSettings,
    fetch: F,
) -> Result<Vec<TopicReport>>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
{
    let workers = settings.workers.max(1);
    let progress = topic_progress(settings.show_progress, topics.len() as u64);

    info!(
        topics = topics.len(),
        workers,
        mode = ?settings.mode,
        "Starting fetch-and-aggregate pipeline"
    );

    let mut indexed = match settings.mode {
        PoolMode::Tasks => {
            run_task_pool(topics, table, settings.retry, workers, fetch, &progress).await
        }
        PoolMode::Workers => {
            run_worker_pool(topics, table, settings.retry, workers, fetch, &progress).await?
        }
    };
    progress.finish_and_clear();

    // Completion order depends on the interleaving; reports do not.
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, report)| report).collect())
}

/// Cooperative task pool: one bounded stream over all topics.
async fn run_task_pool<F, Fut>(
    topics: Vec<String>,
    table: Arc<DistributionTable>,
    retry: RetryPolicy,
    workers: usize,
    fetch: F,
    progress: &ProgressBar,
) -> Vec<(usize, TopicReport)>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
{
    stream::iter(topics.into_iter().enumerate())
        .map(|(index, topic)| {
            let fetch = fetch.clone();
            let table = table.clone();
            let progress = progress.clone();
            async move {
                let report = process_topic(topic, retry, &table, fetch).await;
                progress.inc(1);
                (index, report)
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await
}

/// Worker pool: fixed workers draining a shared queue of topics.
async fn run_worker_pool<F, Fut>(
    topics: Vec<String>,
    table: Arc<DistributionTable>,
    retry: RetryPolicy,
    workers: usize,
    fetch: F,
    progress: &ProgressBar,
) -> Result<Vec<(usize, TopicReport)>>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = FetchOutcome> + Send + 'static,
{
    let queue: Arc<Mutex<VecDeque<(usize, String)>>> =
        Arc::new(Mutex::new(topics.into_iter().enumerate().collect()));

    let mut pool = JoinSet::new();
    for worker_id in 0..workers {
        let queue = queue.clone();
        let table = table.clone();
        let fetch = fetch.clone();
        let progress = progress.clone();
        pool.spawn(async move {
            let mut reports = Vec::new();
            loop {
                let next = queue.lock().expect("topic queue lock poisoned").pop_front();
                let Some((index, topic)) = next else {
                    break;
                };
                debug!(worker = worker_id, topic = %topic, "Worker picked up topic");
                let report = process_topic(topic, retry, &table, fetch.clone()).await;
                progress.inc(1);
                reports.push((index, report));
            }
            reports
        });
    }

    let mut all = Vec::new();
    while let Some(joined) = pool.join_next().await {
        all.extend(joined.context("collecting results from one worker")?);
    }
    Ok(all)
}

/// Run one topic's full unit of work to a terminal state.
async fn process_topic<F, Fut>(
    topic: String,
    retry: RetryPolicy,
    table: &DistributionTable,
    fetch: F,
) -> TopicReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = FetchOutcome>,
{
    let backoff = RandomBackoff::new(&retry);
    let (fetched, elapsed) = timed(async {
        retry_rate_limited(&retry, backoff, || fetch(topic.clone())).await
    })
    .await;

    let outcome = match fetched {
        FetchOutcome::Content(text) => {
            let counts = tokenize::word_counts(&text);
            let distinct_words = counts.len();
            let total_occurrences = counts.values().sum();
            table.absorb(&topic, counts);
            TopicOutcome::Counted {
                distinct_words,
                total_occurrences,
            }
        }
        FetchOutcome::NotFound => {
            info!("Page not found for topic: {}", topic);
            TopicOutcome::NotFound
        }
        // A rate-limited outcome surviving the retry wrapper means the
        // attempt budget is spent.
        FetchOutcome::RateLimited => TopicOutcome::RetriesExhausted {
            attempts: retry.max_attempts,
        },
        FetchOutcome::TransportError(detail) => {
            warn!("Transport failure for topic {}: {}", topic, detail);
            TopicOutcome::TransportFailed { detail }
        }
    };

    debug!(
        topic = %topic,
        elapsed_ms = elapsed.as_millis() as u64,
        "Topic reached terminal state: {}",
        outcome
    );
    TopicReport {
        topic,
        outcome,
        elapsed,
    }
}

/// Progress bar over topics, hidden in quiet mode.
fn topic_progress(show: bool, total: u64) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}
