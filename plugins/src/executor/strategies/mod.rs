pub mod retry;

pub use retry::{ExponentialBackoffPlugin, ImmediateRetryPlugin, LinearRetryPlugin, RetryBudget};
