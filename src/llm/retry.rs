use std::fmt::Debug;
use std::time::Duration;

use crate::error::ApiError;

/// Decides whether a failed chat call is attempted again.
///
/// The client consults the policy after every failed attempt. Returning
/// `None` gives up and surfaces the error; returning a delay sleeps for that
/// long and tries again.
pub trait RetryPolicy: Debug + Send + Sync {
    /// `failures` counts failed attempts so far, starting at 1.
    fn next_delay(&self, failures: u32, error: &ApiError) -> Option<Duration>;
}

/// Single attempt, never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _failures: u32, _error: &ApiError) -> Option<Duration> {
        None
    }
}
