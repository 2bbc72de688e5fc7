//! Reconnect state machine
//!
//! Pure bookkeeping for automatic reconnection. The session feeds it
//! close, timer, ready and manual-reconnect signals and acts on the
//! returned decisions; nothing here touches sockets or timers.
//!
//! Backoff for the n-th retry (1-based) is `base_delay * 2^(n-1)`. After
//! `max_attempts` retries the next close gives up permanently until
//! [`ReconnectState::rearm`] is called.

use std::time::Duration;

/// Retry limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum automatic retries (0 disables reconnection)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to use when `attempts` retries have already been scheduled
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let factor = 1u32.checked_shl(attempts).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Why a close did not lead to a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Destroyed,
    /// Reconnection disabled or already given up
    Disabled,
    /// A retry is already scheduled
    TimerPending,
}

/// Outcome of a close signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Arm a timer; `attempt` is the 1-based retry number
    Schedule { delay: Duration, attempt: u32 },
    /// Attempt budget exhausted; report once and stop
    GiveUp { attempts: u32 },
    Skip(SkipReason),
}

/// Connection attempt state
#[derive(Debug, Clone)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    attempts: u32,
    timer_pending: bool,
    should_reconnect: bool,
    destroyed: bool,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            timer_pending: false,
            should_reconnect: true,
            destroyed: false,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn timer_pending(&self) -> bool {
        self.timer_pending
    }

    pub fn should_reconnect(&self) -> bool {
        self.should_reconnect
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The connection closed; decide whether to retry
    pub fn on_close(&mut self) -> RetryDecision {
        if self.destroyed {
            return RetryDecision::Skip(SkipReason::Destroyed);
        }
        if !self.should_reconnect || self.policy.max_attempts == 0 {
            return RetryDecision::Skip(SkipReason::Disabled);
        }
        if self.timer_pending {
            return RetryDecision::Skip(SkipReason::TimerPending);
        }

        if self.attempts >= self.policy.max_attempts {
            self.should_reconnect = false;
            self.timer_pending = false;
            return RetryDecision::GiveUp {
                attempts: self.attempts,
            };
        }

        let delay = self.policy.delay_for(self.attempts);
        self.attempts += 1;
        self.timer_pending = true;

        RetryDecision::Schedule {
            delay,
            attempt: self.attempts,
        }
    }

    /// The retry timer elapsed. Returns whether a connection should be opened.
    pub fn on_timer_fired(&mut self) -> bool {
        self.timer_pending = false;
        !self.destroyed && self.should_reconnect
    }

    pub fn cancel_timer(&mut self) {
        self.timer_pending = false;
    }

    /// Media became ready. Returns true if this ended a reconnection.
    pub fn on_ready(&mut self) -> bool {
        self.timer_pending = false;
        let was_reconnecting = self.attempts > 0;
        self.attempts = 0;
        was_reconnecting
    }

    /// Re-enable reconnection after a manual request
    pub fn rearm(&mut self) {
        self.should_reconnect = true;
        self.attempts = 0;
        self.timer_pending = false;
    }

    /// Returns false if already destroyed
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.should_reconnect = false;
        self.timer_pending = false;
        true
    }
}
