use crate::config::MemorySettings;
use crate::events::{RestartReason, SupervisorEvent};
use std::collections::VecDeque;
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, System};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Rolling window of resident-memory samples
///
/// Pressure is judged on the rolling average over a full window, so a
/// single allocation spike cannot trigger a restart.
#[derive(Debug)]
pub struct MemoryWindow {
    capacity: usize,
    samples: VecDeque<u64>,
}

impl MemoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: u64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Rolling average of the current samples
    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as u64)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Samples the worker's resident memory and requests a proactive restart
/// under sustained pressure
///
/// The restart request is tagged as proactive: the worker did not fail,
/// so it must not count against the circuit breaker.
pub struct MemoryGuard {
    system: System,
    threshold_bytes: u64,
    window: MemoryWindow,
    interval: Duration,
    events: mpsc::Sender<SupervisorEvent>,
    pid: watch::Receiver<Option<u32>>,
    last_pid: Option<u32>,
}

impl MemoryGuard {
    pub fn new(
        threshold_bytes: u64,
        settings: &MemorySettings,
        events: mpsc::Sender<SupervisorEvent>,
        pid: watch::Receiver<Option<u32>>,
    ) -> Self {
        Self {
            system: System::new_all(),
            threshold_bytes,
            window: MemoryWindow::new(settings.window),
            interval: settings.sample_interval(),
            events,
            pid,
            last_pid: None,
        }
    }

    /// Run the sampling loop until shutdown
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            threshold_bytes = self.threshold_bytes,
            window = self.window.capacity,
            interval_secs = self.interval.as_secs(),
            "Starting memory guard"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.sample().await.is_err() {
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

        debug!("Memory guard stopped");
    }

    /// Take one sample and emit at most one memory-critical event
    ///
    /// Returns `Err` only when the supervisor's event channel is closed.
    async fn sample(&mut self) -> std::result::Result<(), ()> {
        let current_pid = *self.pid.borrow();

        // A replaced worker starts with a fresh window
        if current_pid != self.last_pid {
            self.window.clear();
            self.last_pid = current_pid;
        }

        let Some(pid) = current_pid else {
            return Ok(());
        };

        let sys_pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::everything(),
        );

        let Some(process) = self.system.process(sys_pid) else {
            // Worker exited between the watch update and the refresh
            self.window.clear();
            return Ok(());
        };

        self.window.push(process.memory());

        if self.window.is_full() {
            if let Some(avg) = self.window.average() {
                if avg > self.threshold_bytes {
                    let reason = RestartReason::MemoryPressure {
                        rolling_avg_bytes: avg,
                    };
                    warn!(
                        rolling_avg_bytes = avg,
                        threshold_bytes = self.threshold_bytes,
                        "Sustained memory pressure, requesting proactive restart"
                    );
                    self.window.clear();

                    if self
                        .events
                        .send(SupervisorEvent::ForceRestart { reason })
                        .await
                        .is_err()
                    {
                        return Err(());
                    }
                }
            }
        }

        Ok(())
    }
}
