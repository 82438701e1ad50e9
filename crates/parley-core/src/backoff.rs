//! Reconnect backoff state machine.
//!
//! Explicit state (attempt count, next delay, ceiling) instead of ad hoc
//! timers, so cancellation and testing stay deterministic. The session
//! consumes delays from here when scheduling reconnect attempts and resets
//! the machine whenever a connection is established or a fresh `connect` is
//! requested.

use std::time::Duration;

/// Default delay before the first reconnect attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default cap on the per-attempt delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Default attempt ceiling before the session parks disconnected.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Backoff configuration.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Number of attempts before giving up.
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Exponential backoff with an attempt ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    /// Create a fresh backoff machine.
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Number of attempts consumed so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the attempt ceiling has been reached.
    pub fn exhausted(&self) -> bool {
        self.attempt >= self.config.max_attempts
    }

    /// Consume one attempt and return the delay before it.
    ///
    /// Returns `None` once the ceiling is reached; the caller must stop
    /// retrying until an explicit reconnect resets the machine.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }

        let exponent = self.attempt.min(31);
        let delay = self
            .config
            .base_delay
            .checked_mul(1u32.checked_shl(exponent).unwrap_or(u32::MAX))
            .unwrap_or(self.config.max_delay)
            .min(self.config.max_delay);

        self.attempt += 1;
        Some(delay)
    }

    /// Reset after a successful connection or an explicit connect request.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_capped() {
        let mut backoff = Backoff::new(BackoffConfig {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            max_attempts: 6,
        });

        let delays: Vec<_> = std::iter::from_fn(|| backoff.next_delay()).collect();
        assert_eq!(delays, vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
            Duration::from_secs(8),
            Duration::from_secs(8),
        ]);
    }

    #[test]
    fn ceiling_stops_retries() {
        let mut backoff = Backoff::new(BackoffConfig {
            max_attempts: 2,
            ..BackoffConfig::default()
        });

        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.exhausted());
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn reset_restores_attempts() {
        let mut backoff = Backoff::new(BackoffConfig {
            max_attempts: 1,
            ..BackoffConfig::default()
        });

        backoff.next_delay().unwrap();
        assert!(backoff.exhausted());

        backoff.reset();
        assert!(!backoff.exhausted());
        assert_eq!(backoff.next_delay(), Some(DEFAULT_BASE_DELAY));
    }
}
