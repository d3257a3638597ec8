//! Retry policies for node execution and model calls.

use std::time::Duration;

/// How many times to retry a failed operation and how long to wait in between.
///
/// Attempt numbers start at 0 for the first retry.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Fail immediately.
    #[default]
    None,
    /// Constant delay between attempts.
    Fixed {
        max_attempts: usize,
        interval: Duration,
    },
    /// Delay grows by `multiplier` per attempt, capped at `max_interval`.
    Exponential {
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy::None
    }

    pub fn fixed(max_attempts: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_attempts,
            interval,
        }
    }

    pub fn exponential(
        max_attempts: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_attempts,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// Backoff used for model calls: `max_retries` retries starting at 500ms, doubling, capped at 8s.
    pub fn model_backoff(max_retries: usize) -> Self {
        if max_retries == 0 {
            return RetryPolicy::None;
        }
        Self::exponential(
            max_retries,
            Duration::from_millis(500),
            Duration::from_secs(8),
            2.0,
        )
    }

    /// Whether retry number `attempt` (0-based) is allowed.
    pub fn should_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts()
    }

    /// Delay before retry number `attempt`.
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                let delay_secs = initial_interval.as_secs_f64() * multiplier.powi(attempt as i32);
                Duration::from_secs_f64(delay_secs).min(*max_interval)
            }
        }
    }

    /// Sum of the delays before every allowed retry.
    pub fn total_delay(&self) -> Duration {
        (0..self.max_attempts()).map(|attempt| self.delay(attempt)).sum()
    }

    pub fn max_attempts(&self) -> usize {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Fixed { max_attempts, .. } => *max_attempts,
            RetryPolicy::Exponential { max_attempts, .. } => *max_attempts,
        }
    }
}
