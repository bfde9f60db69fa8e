// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// How a wait treats its maximum duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaitPolicy {
    /// Stop waiting once the maximum duration has elapsed.
    #[default]
    Deadline,
    /// Keep waiting until the operation is decided; the maximum duration is ignored.
    Unbounded,
}

/// Tuning for waits on inventory results.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use inventory_result::{WaitOptions, WaitPolicy};
///
/// let options = WaitOptions::default()
///     .poll_interval(Duration::from_millis(10))
///     .policy(WaitPolicy::Unbounded);
///
/// assert_eq!(options.get_poll_interval(), Duration::from_millis(10));
/// assert_eq!(options.get_max_wait(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitOptions {
    poll_interval: Duration,
    max_wait: Duration,
    policy: WaitPolicy,
}

impl WaitOptions {
    /// Interval between two status polls while a wait is in progress.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

    /// Maximum duration of waits that do not specify one.
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);

    /// Sets the interval between two status polls. Zero is raised to one millisecond.
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Sets the maximum duration used by waits that do not specify one.
    #[must_use]
    pub const fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Sets how the maximum duration of a wait is treated.
    #[must_use]
    pub const fn policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Interval between two status polls.
    #[must_use]
    pub const fn get_poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Maximum duration of waits that do not specify one.
    #[must_use]
    pub const fn get_max_wait(&self) -> Duration {
        self.max_wait
    }

    /// How the maximum duration of a wait is treated.
    #[must_use]
    pub const fn get_policy(&self) -> WaitPolicy {
        self.policy
    }

    pub(crate) fn expired(&self, elapsed: Duration, max_wait: Duration) -> bool {
        match self.policy {
            WaitPolicy::Deadline => elapsed >= max_wait,
            WaitPolicy::Unbounded => false,
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_wait: Self::DEFAULT_MAX_WAIT,
            policy: WaitPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = WaitOptions::default();

        assert_eq!(options.get_poll_interval(), Duration::from_millis(5));
        assert_eq!(options.get_max_wait(), Duration::from_secs(5));
        assert_eq!(options.get_policy(), WaitPolicy::Deadline);
    }

    #[test]
    fn zero_poll_interval_is_raised() {
        let options = WaitOptions::default().poll_interval(Duration::ZERO);
        assert_eq!(options.get_poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn expired_respects_policy() {
        let deadline = WaitOptions::default();
        assert!(!deadline.expired(Duration::from_millis(999), Duration::from_secs(1)));
        assert!(deadline.expired(Duration::from_secs(1), Duration::from_secs(1)));

        let unbounded = deadline.policy(WaitPolicy::Unbounded);
        assert!(!unbounded.expired(Duration::from_secs(3600), Duration::from_secs(1)));
    }
}
