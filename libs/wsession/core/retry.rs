//! Retry scheduler
//!
//! Owns the reconnect timer and the attempt counter of a session. The timer
//! is an owned `tokio::time::Sleep`; cancelling means dropping it, which is
//! the single cancellation path shared by `disconnect()` and teardown.
//!
//! ```text
//!  close ──> on_disconnect() ──┬──> Scheduled  (timer armed, status Reconnecting)
//!                              ├──> Disabled   (reconnect off or max_retries == 0)
//!                              └──> Exhausted  (attempts == max_retries)
//!
//!  timer fires ──> expired() ──> attempts += 1 ──> controller reconnects
//! ```

use std::pin::Pin;
use std::time::Duration;
use tokio::time::Sleep;

/// Constant-interval retry bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub interval: Duration,
    pub max_retries: usize,
}

impl RetryPolicy {
    pub fn new(enabled: bool, interval: Duration, max_retries: usize) -> Self {
        Self {
            enabled,
            interval,
            max_retries,
        }
    }

    /// Retry switched off entirely
    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO, 0)
    }

    /// Whether another attempt may follow `attempts` completed ones
    ///
    /// `max_retries == 0` disables retry regardless of `enabled`.
    pub fn allows(&self, attempts: usize) -> bool {
        self.enabled && attempts < self.max_retries
    }
}

/// Outcome of [`RetryScheduler::on_disconnect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Timer armed; `attempt` is the number the next try will carry
    Scheduled { attempt: usize, delay: Duration },
    /// Retry is switched off
    Disabled,
    /// All attempts used up
    Exhausted { attempts: usize },
}

/// Reconnect timer and attempt counter
pub struct RetryScheduler {
    policy: RetryPolicy,
    attempts: usize,
    timer: Option<Pin<Box<Sleep>>>,
}

impl RetryScheduler {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            timer: None,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Attempts made since the last successful open
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Decide what follows an unexpected close and arm the timer if allowed
    pub fn on_disconnect(&mut self) -> RetryDecision {
        self.timer = None;

        if !self.policy.enabled || self.policy.max_retries == 0 {
            return RetryDecision::Disabled;
        }
        if !self.policy.allows(self.attempts) {
            return RetryDecision::Exhausted {
                attempts: self.attempts,
            };
        }

        let delay = self.policy.interval;
        self.timer = Some(Box::pin(tokio::time::sleep(delay)));
        RetryDecision::Scheduled {
            attempt: self.attempts + 1,
            delay,
        }
    }

    /// Drop the armed timer, if any
    ///
    /// Returns `true` when a timer was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        self.timer.take().is_some()
    }

    /// Cancel the timer and forget all attempts
    pub fn reset(&mut self) {
        self.cancel();
        self.attempts = 0;
    }

    /// Resolve when the armed timer fires
    ///
    /// Pending forever while no timer is armed. On expiry the timer is
    /// consumed and the attempt counter incremented; the new count is
    /// returned. Dropping the future before it resolves changes nothing.
    pub async fn expired(&mut self) -> usize {
        if let Some(timer) = self.timer.as_mut() {
            timer.as_mut().await;
        } else {
            std::future::pending::<()>().await;
        }

        self.timer = None;
        self.attempts += 1;
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy::new(true, Duration::from_millis(100), max_retries)
    }

    #[test]
    fn test_zero_max_retries_disables_retry() {
        assert!(!policy(0).allows(0));
        assert!(!RetryPolicy::disabled().allows(0));
        assert!(!RetryPolicy::new(false, Duration::from_secs(1), 5).allows(0));
        assert!(policy(2).allows(1));
        assert!(!policy(2).allows(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedules_until_exhausted() {
        let mut scheduler = RetryScheduler::new(policy(2));

        assert_eq!(
            scheduler.on_disconnect(),
            RetryDecision::Scheduled {
                attempt: 1,
                delay: Duration::from_millis(100)
            }
        );
        assert_eq!(scheduler.expired().await, 1);
        assert!(!scheduler.is_armed());

        assert!(matches!(
            scheduler.on_disconnect(),
            RetryDecision::Scheduled { attempt: 2, .. }
        ));
        assert_eq!(scheduler.expired().await, 2);

        assert_eq!(
            scheduler.on_disconnect(),
            RetryDecision::Exhausted { attempts: 2 }
        );
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_waits_for_interval() {
        let mut scheduler = RetryScheduler::new(policy(1));
        scheduler.on_disconnect();

        let start = tokio::time::Instant::now();
        scheduler.expired().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_timer_from_firing() {
        let mut scheduler = RetryScheduler::new(policy(3));
        scheduler.on_disconnect();

        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());

        let fired =
            tokio::time::timeout(Duration::from_secs(1), scheduler.expired()).await;
        assert!(fired.is_err(), "cancelled timer must not fire");
        assert_eq!(scheduler.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_attempts() {
        let mut scheduler = RetryScheduler::new(policy(3));
        scheduler.on_disconnect();
        scheduler.expired().await;
        scheduler.on_disconnect();

        scheduler.reset();
        assert_eq!(scheduler.attempts(), 0);
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_disabled_policy_never_arms() {
        let mut scheduler = RetryScheduler::new(RetryPolicy::new(
            false,
            Duration::from_millis(10),
            5,
        ));
        assert_eq!(scheduler.on_disconnect(), RetryDecision::Disabled);
        assert!(!scheduler.is_armed());
    }
}
