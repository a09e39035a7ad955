//! Reconnect backoff schedule

use std::time::Duration;

/// Backoff delays never exceed this, however many attempts have failed.
pub const MAX_DELAY: Duration = Duration::from_secs(30);

/// Delay before reconnect attempt `attempt` (zero-based):
/// `initial * 2^attempt`, capped at [`MAX_DELAY`].
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    initial.checked_mul(factor).unwrap_or(MAX_DELAY).min(MAX_DELAY)
}
