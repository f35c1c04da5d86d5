//! Retry utilities for transient remote failures
//!
//! Fixed delay between attempts; the last error is returned once attempts
//! are exhausted.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Execute an operation with retry logic
///
/// # Arguments
///
/// * `policy` - Retry configuration
/// * `operation` - Async closure performing one attempt
/// * `operation_name` - Human-readable name for logging
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
    operation_name: &str,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "Operation '{}' succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return Ok(result);
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name, attempt, max_attempts, policy.delay, err
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(
                    "Operation '{}' failed after {} attempts: {}",
                    operation_name, max_attempts, err
                );
                return Err(err);
            }
        }
    }
}
