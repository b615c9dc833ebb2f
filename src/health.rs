use crate::config::HealthSettings;
use crate::error::{Result, WardenError};
use crate::events::{RestartReason, SupervisorEvent};
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Classified result of one liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// The worker answered within the deadline
    Healthy,
    /// Timeout, connection failure, or a non-2xx response
    Unhealthy,
    /// No worker is currently running; does not count as a failure
    Unknown,
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Health::Healthy => write!(f, "healthy"),
            Health::Unhealthy => write!(f, "unhealthy"),
            Health::Unknown => write!(f, "unknown"),
        }
    }
}

/// Last observed liveness state of the worker
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub health: Health,
    pub last_checked: Option<SystemTime>,
    pub consecutive_failures: u32,
}

impl HealthStatus {
    fn new() -> Self {
        Self {
            health: Health::Unknown,
            last_checked: None,
            consecutive_failures: 0,
        }
    }
}

/// Periodic HTTP liveness probe against the worker
///
/// A worker can be alive as a process yet hung or deadlocked; reaching
/// the consecutive-failure threshold requests a forced restart through
/// the supervisor's event channel, with the same failure accounting as a
/// crash.
pub struct HealthProbe {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    max_consecutive_failures: u32,
    status: HealthStatus,
    events: mpsc::Sender<SupervisorEvent>,
    pid: watch::Receiver<Option<u32>>,
}

impl HealthProbe {
    pub fn new(
        url: String,
        settings: &HealthSettings,
        events: mpsc::Sender<SupervisorEvent>,
        pid: watch::Receiver<Option<u32>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| WardenError::ProbeError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            interval: settings.interval(),
            max_consecutive_failures: settings.max_consecutive_failures,
            status: HealthStatus::new(),
            events,
            pid,
        })
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    /// Run the probe loop until shutdown
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            url = %self.url,
            interval_secs = self.interval.as_secs(),
            "Starting health probe"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.check().await.is_err() {
                        // Supervisor is gone; nothing left to report to
                        break;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Health probe stopped");
    }

    /// Perform a single probe cycle
    ///
    /// Returns `Err` only when the supervisor's event channel is closed.
    async fn check(&mut self) -> std::result::Result<(), ()> {
        if self.pid.borrow().is_none() {
            // Worker is down between restarts; nothing to probe
            self.observe(Health::Unknown);
            return Ok(());
        }

        let health = match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => Health::Healthy,
            Ok(response) => {
                warn!(status = %response.status(), url = %self.url, "Liveness probe returned failure");
                Health::Unhealthy
            }
            Err(e) => {
                warn!(error = %e, url = %self.url, "Liveness probe failed");
                Health::Unhealthy
            }
        };

        self.observe(health);

        if self.status.health == Health::Unhealthy
            && self.status.consecutive_failures >= self.max_consecutive_failures
        {
            let reason = RestartReason::HealthCheck {
                consecutive_failures: self.status.consecutive_failures,
            };
            warn!(%reason, "Requesting forced restart");
            self.status.consecutive_failures = 0;

            if self
                .events
                .send(SupervisorEvent::ForceRestart { reason })
                .await
                .is_err()
            {
                return Err(());
            }
        }

        Ok(())
    }

    fn observe(&mut self, health: Health) {
        if health != self.status.health {
            info!(from = %self.status.health, to = %health, "Health transition");
        }

        match health {
            Health::Healthy => self.status.consecutive_failures = 0,
            Health::Unhealthy => {
                self.status.consecutive_failures = self.status.consecutive_failures.saturating_add(1)
            }
            // Unknown readings neither count nor reset
            Health::Unknown => {}
        }

        self.status.health = health;
        self.status.last_checked = Some(SystemTime::now());
    }
}
