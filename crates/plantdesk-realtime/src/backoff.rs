//! Exponential reconnect backoff.

use std::time::Duration;

/// Delay before reconnect attempt `attempt` (1-based): `base * 2^(attempt - 1)`, capped at `max`.
///
/// Attempt 0 is treated as attempt 1.
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.checked_mul(1u32 << exponent)
        .map_or(max, |delay| delay.min(max))
}

/// Result of a finished reconnect chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// A connection was confirmed after this many attempts.
    Connected {
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed.
    GaveUp {
        /// Attempts made.
        attempts: u32,
    },
    /// The chain was cancelled by teardown or a newer chain.
    Cancelled,
}
