use chatops_core::api::{RetryConfig, RetryStrategyPlugin};
use std::time::Duration;

/// Retry budget plus the delay bounds shared by every strategy.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryBudget {
    pub fn new(max_retries: u32, cfg: &RetryConfig) -> Self {
        Self {
            max_retries,
            base_delay_ms: cfg.base_delay_ms,
            max_delay_ms: cfg.max_delay_ms.max(cfg.base_delay_ms),
        }
    }

    /// `base * multiplier`, capped at the maximum delay. `None` once the
    /// retry for `attempt` would exceed the budget.
    pub fn delay(&self, attempt: u32, multiplier: u64) -> Option<Duration> {
        (attempt < self.max_retries).then(|| {
            let ms = self.base_delay_ms.saturating_mul(multiplier);
            Duration::from_millis(ms.min(self.max_delay_ms))
        })
    }
}

pub struct ExponentialBackoffPlugin {
    budget: RetryBudget,
}

pub struct LinearRetryPlugin {
    budget: RetryBudget,
}

/// Retries right away.
pub struct ImmediateRetryPlugin {
    max_retries: u32,
}

impl ExponentialBackoffPlugin {
    pub fn new(budget: RetryBudget) -> Self {
        Self { budget }
    }
}

impl LinearRetryPlugin {
    pub fn new(budget: RetryBudget) -> Self {
        Self { budget }
    }
}

impl ImmediateRetryPlugin {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl RetryStrategyPlugin for ExponentialBackoffPlugin {
    fn name(&self) -> &str {
        "exponential-backoff"
    }

    /// base, 2x base, 4x base, ...
    fn next_delay(&self, attempt: u32, _error: &str) -> Option<Duration> {
        self.budget.delay(attempt, 1u64 << attempt.min(30))
    }

    fn max_retries(&self) -> u32 {
        self.budget.max_retries
    }
}

impl RetryStrategyPlugin for LinearRetryPlugin {
    fn name(&self) -> &str {
        "linear"
    }

    fn next_delay(&self, attempt: u32, _error: &str) -> Option<Duration> {
        self.budget.delay(attempt, u64::from(attempt) + 1)
    }

    fn max_retries(&self) -> u32 {
        self.budget.max_retries
    }
}

impl RetryStrategyPlugin for ImmediateRetryPlugin {
    fn name(&self) -> &str {
        "none"
    }

    fn next_delay(&self, _attempt: u32, _error: &str) -> Option<Duration> {
        None
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
