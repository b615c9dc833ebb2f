use crate::process::restart::RestartPolicy;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How far the cool-down may grow when trial restarts keep failing
/// (multiples of the configured cool-down).
const COOLDOWN_GROWTH_CAP: u32 = 8;

/// Circuit breaker state
///
/// - `Closed`: restarts permitted
/// - `Open`: restarts suppressed until the cool-down elapses
/// - `HalfOpen`: a single trial restart permitted to test recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Result of one supervised run, as reported by the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The worker reached minimum stable uptime
    Success,
    /// The worker crashed, exited non-zero, or failed its health checks
    Failure,
}

/// Gates restart attempts to stop a crash-looping worker from burning
/// host CPU/IO quota with unbounded respawns.
///
/// Transitions:
/// ```text
/// Closed   → Open:     consecutive failures reach the threshold
/// Open     → HalfOpen: cool-down elapsed (observed in allow_restart)
/// HalfOpen → Closed:   trial worker reached minimum stable uptime
/// HalfOpen → Open:     trial worker failed; cool-down doubles (capped)
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    max_consecutive_failures: u32,
    base_cooldown: Duration,
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(policy: &RestartPolicy) -> Self {
        Self {
            max_consecutive_failures: policy.max_consecutive_failures,
            base_cooldown: policy.cooldown,
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            cooldown: policy.cooldown,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Record the outcome of one supervised run
    pub fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => {
                if self.state != CircuitState::Closed {
                    info!(state = %self.state, "Circuit closing after successful trial run");
                }
                self.state = CircuitState::Closed;
                self.consecutive_failures = 0;
                self.opened_at = None;
                self.cooldown = self.base_cooldown;
            }
            Outcome::Failure => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);

                match self.state {
                    CircuitState::HalfOpen => {
                        // Trial failed: reopen with a longer cool-down
                        let grown = self.cooldown.saturating_mul(2);
                        let cap = self.base_cooldown.saturating_mul(COOLDOWN_GROWTH_CAP);
                        self.cooldown = grown.min(cap);
                        self.state = CircuitState::Open;
                        self.opened_at = Some(Instant::now());
                        warn!(
                            cooldown_secs = self.cooldown.as_secs(),
                            "Trial restart failed, circuit re-opened"
                        );
                    }
                    CircuitState::Closed => {
                        if self.consecutive_failures >= self.max_consecutive_failures {
                            self.state = CircuitState::Open;
                            self.opened_at = Some(Instant::now());
                            warn!(
                                consecutive_failures = self.consecutive_failures,
                                cooldown_secs = self.cooldown.as_secs(),
                                "Failure threshold reached, circuit opened"
                            );
                        }
                    }
                    CircuitState::Open => {
                        // Already open; the failure only deepens the count
                    }
                }
            }
        }
    }

    /// The single gate consulted before every spawn
    ///
    /// Observes cool-down expiry, so an Open circuit becomes HalfOpen here
    /// once its timer has elapsed.
    pub fn allow_restart(&mut self) -> bool {
        match self.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = self
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.cooldown {
                    self.state = CircuitState::HalfOpen;
                    info!("Cool-down elapsed, circuit half-open for one trial restart");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remaining cool-down while Open; `None` otherwise
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        match (self.state, self.opened_at) {
            (CircuitState::Open, Some(opened_at)) => {
                Some(self.cooldown.saturating_sub(opened_at.elapsed()))
            }
            _ => None,
        }
    }
}
