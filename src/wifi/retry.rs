//! Connection state and reconnect policy.
//!
//! The station moves `Disconnected -> Connecting -> Connected`, falling back
//! to `Connecting` when an established link drops. Failed attempts are
//! retried with capped exponential backoff until the attempt budget runs
//! out, at which point the supervisor gives up and publishes failure.

use std::fmt;
use std::time::Duration;

/// Connection state of the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected and no attempt in flight.
    #[default]
    Disconnected,
    /// Association or DHCP in progress.
    Connecting,
    /// Associated with an IP address.
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}

/// Bounded retry with capped exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection attempts before giving up.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound for the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Delay before the next attempt, given how many attempts have failed
    /// so far (1-based). `None` means the budget is exhausted.
    pub fn delay_after_failure(&self, failures: u32) -> Option<Duration> {
        if failures >= self.max_attempts {
            return None;
        }
        // Shift bounded so the multiplier cannot overflow; the cap applies
        // long before that anyway.
        let exponent = (failures.saturating_sub(1)).min(16);
        let delay = self.base_delay.saturating_mul(1 << exponent);
        Some(delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }

    #[test]
    fn test_state_is_connected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_after_failure(1),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            policy.delay_after_failure(2),
            Some(Duration::from_secs(6))
        );
        assert_eq!(
            policy.delay_after_failure(3),
            Some(Duration::from_secs(12))
        );
    }

    #[test]
    fn test_budget_exhaustion() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after_failure(4), None);
        assert_eq!(policy.delay_after_failure(5), None);
    }

    #[test]
    fn test_backoff_saturates_at_cap() {
        let policy = RetryPolicy::new(100, Duration::from_secs(3), Duration::from_secs(30));
        assert_eq!(
            policy.delay_after_failure(10),
            Some(Duration::from_secs(30))
        );
        assert_eq!(
            policy.delay_after_failure(99),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after_failure(1), None);
    }
}
