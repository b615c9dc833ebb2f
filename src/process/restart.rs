use std::time::Duration;

/// Restart policy configuration
///
/// One immutable instance per supervisor lifetime, built from
/// [`crate::config::SupervisorSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Consecutive counted failures before the circuit opens
    pub max_consecutive_failures: u32,
    /// Delay before the first restart attempt
    pub base_backoff: Duration,
    /// Multiplier applied after each counted failure
    pub backoff_multiplier: u64,
    /// Upper bound on the restart delay
    pub backoff_cap: Duration,
    /// How long the circuit stays open before a trial restart
    pub cooldown: Duration,
    /// Uptime below which an exit is treated as a crash
    pub min_stable_uptime: Duration,
}

impl RestartPolicy {
    /// Policy invariants: all values positive, cap >= base
    pub fn is_valid(&self) -> bool {
        self.max_consecutive_failures > 0
            && !self.base_backoff.is_zero()
            && self.backoff_multiplier > 0
            && self.backoff_cap >= self.base_backoff
            && !self.cooldown.is_zero()
            && !self.min_stable_uptime.is_zero()
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 5,
            base_backoff: Duration::from_secs(1),
            backoff_multiplier: 2,
            backoff_cap: Duration::from_secs(60),
            cooldown: Duration::from_secs(60),
            min_stable_uptime: Duration::from_secs(30),
        }
    }
}

/// Computes the delay before each restart attempt
///
/// The delay grows geometrically from the base and is clamped to the cap,
/// so successive delays are non-decreasing. A stable worker resets the
/// sequence back to the base.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    multiplier: u64,
    cap: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: &RestartPolicy) -> Self {
        Self {
            base: policy.base_backoff,
            multiplier: policy.backoff_multiplier,
            cap: policy.backoff_cap,
            attempt: 0,
        }
    }

    /// Delay to wait before the next restart, advancing the sequence
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current_delay();
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Delay the next call to `next_delay` would return
    pub fn current_delay(&self) -> Duration {
        let base_secs = self.base.as_secs().max(1);
        let delay_secs = base_secs
            .saturating_mul(self.multiplier.saturating_pow(self.attempt))
            .min(self.cap.as_secs());
        Duration::from_secs(delay_secs)
    }

    /// Number of restarts attempted since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Reset to the base delay after a stable run
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
