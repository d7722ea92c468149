//! Wikipedia page fetching.
//!
//! This module provides the one-attempt API client and the bounded retry
//! wrapper that turns transient rate limiting into delayed re-attempts.

pub mod client;
pub mod retry;

pub use client::PageClient;
pub use retry::{retry_rate_limited, Backoff, RandomBackoff, RetryPolicy};
