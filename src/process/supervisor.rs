use crate::breaker::{CircuitBreaker, CircuitState, Outcome};
use crate::config::WardenConfig;
use crate::error::{Result, WardenError};
use crate::events::{RestartReason, SupervisorEvent};
use crate::health::HealthProbe;
use crate::keepalive::KeepAlive;
use crate::memory::MemoryGuard;
use crate::process::handle::ProcessHandle;
use crate::process::restart::{Backoff, RestartPolicy};
use crate::process::spawner::spawn_worker;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// How one supervised run ended
#[derive(Debug)]
enum RunOutcome {
    /// The worker exited on its own
    Exited {
        code: Option<i32>,
        uptime: Duration,
    },
    /// A monitoring loop requested the worker be replaced
    Forced(RestartReason),
    /// External termination signal
    Shutdown,
}

/// Owns the worker lifecycle: spawn, wait, signal, restart
///
/// `run` returns only on intentional shutdown. Worker failures are
/// classified against the minimum stable uptime, fed to the circuit
/// breaker, and answered with bounded backoff; the breaker is consulted
/// before every spawn so a crash-looping worker cannot burn the host's
/// quota.
pub struct ProcessSupervisor {
    config: WardenConfig,
    policy: RestartPolicy,
    breaker: CircuitBreaker,
    backoff: Backoff,
    events_tx: mpsc::Sender<SupervisorEvent>,
    events_rx: mpsc::Receiver<SupervisorEvent>,
    pid_tx: watch::Sender<Option<u32>>,
    circuit_tx: watch::Sender<CircuitState>,
    shutdown: watch::Receiver<bool>,
    last_exit_code: Option<i32>,
}

impl ProcessSupervisor {
    pub fn new(config: WardenConfig, shutdown: watch::Receiver<bool>) -> Self {
        let policy = config.restart_policy();
        let (events_tx, events_rx) = mpsc::channel(16);
        let (pid_tx, _) = watch::channel(None);
        let (circuit_tx, _) = watch::channel(CircuitState::Closed);

        Self {
            breaker: CircuitBreaker::new(&policy),
            backoff: Backoff::new(&policy),
            policy,
            config,
            events_tx,
            events_rx,
            pid_tx,
            circuit_tx,
            shutdown,
            last_exit_code: None,
        }
    }

    /// Sender half of the supervisor's event channel
    ///
    /// All restart requests come in here; the monitoring loops hold
    /// clones of this sender.
    pub fn event_sender(&self) -> mpsc::Sender<SupervisorEvent> {
        self.events_tx.clone()
    }

    /// Watch the pid of the current worker (`None` while down)
    pub fn pid_watch(&self) -> watch::Receiver<Option<u32>> {
        self.pid_tx.subscribe()
    }

    /// Watch circuit breaker transitions
    pub fn circuit_watch(&self) -> watch::Receiver<CircuitState> {
        self.circuit_tx.subscribe()
    }

    /// Exit code of the most recently reaped worker
    pub fn last_exit_code(&self) -> Option<i32> {
        self.last_exit_code
    }

    /// Supervise the worker until shutdown
    ///
    /// Never returns because of worker failures; only an external
    /// termination signal ends the run.
    pub async fn run(mut self) -> Result<()> {
        self.spawn_observers()?;

        info!(
            worker = %self.config.worker.name,
            command = %self.config.worker.command.display(),
            "Supervisor starting"
        );

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            if !self.breaker.allow_restart() {
                self.publish_circuit();
                let wait = self
                    .breaker
                    .cooldown_remaining()
                    .unwrap_or(self.policy.cooldown);
                warn!(
                    wait_secs = wait.as_secs(),
                    "Circuit open, restarts suppressed; worker stays down"
                );
                if self.wait_or_shutdown(wait).await {
                    break;
                }
                continue;
            }
            self.publish_circuit();

            // Restart requests queued while no worker was running refer
            // to a worker that no longer exists
            self.drain_stale_events();

            let mut handle = match spawn_worker(&self.config.worker).await {
                Ok(handle) => handle,
                Err(e) => {
                    error!(error = %e, "Failed to spawn worker");
                    self.record_failure();
                    let delay = self.backoff.next_delay();
                    info!(delay_secs = delay.as_secs(), "Backing off before next spawn attempt");
                    if self.wait_or_shutdown(delay).await {
                        break;
                    }
                    continue;
                }
            };

            info!(
                worker = %self.config.worker.name,
                pid = handle.pid,
                "Worker spawned"
            );
            let _ = self.pid_tx.send(Some(handle.pid));

            let outcome = self.supervise(&mut handle).await;
            let _ = self.pid_tx.send(None);

            match outcome {
                RunOutcome::Shutdown => {
                    self.stop_worker(&mut handle).await;
                    break;
                }
                RunOutcome::Exited { code, uptime } => {
                    self.last_exit_code = code;
                    let benign = code == Some(0) && uptime >= self.policy.min_stable_uptime;
                    if benign {
                        info!(
                            uptime_secs = uptime.as_secs(),
                            "Worker exited cleanly after a stable run, respawning"
                        );
                    } else {
                        warn!(
                            code = ?code,
                            uptime_ms = uptime.as_millis() as u64,
                            "Worker exit counted as failure"
                        );
                        self.record_failure();
                        let delay = self.backoff.next_delay();
                        info!(delay_secs = delay.as_secs(), "Backing off before restart");
                        if self.wait_or_shutdown(delay).await {
                            break;
                        }
                    }
                }
                RunOutcome::Forced(reason) => {
                    info!(%reason, "Replacing worker");
                    self.stop_worker(&mut handle).await;
                    if reason.counts_as_failure() {
                        self.record_failure();
                        let delay = self.backoff.next_delay();
                        info!(delay_secs = delay.as_secs(), "Backing off before restart");
                        if self.wait_or_shutdown(delay).await {
                            break;
                        }
                    }
                    // Proactive restarts respawn without delay: nothing failed
                }
            }
        }

        info!("Supervisor stopped");
        Ok(())
    }

    /// Wait for the current worker to exit, a restart request, stable
    /// uptime, or shutdown
    async fn supervise(&mut self, handle: &mut ProcessHandle) -> RunOutcome {
        let stable_timer = tokio::time::sleep(self.policy.min_stable_uptime);
        tokio::pin!(stable_timer);
        let mut stable_pending = true;
        let mut shutdown_armed = true;

        loop {
            tokio::select! {
                status = handle.child.wait() => {
                    let uptime = handle.uptime();
                    let code = match status {
                        Ok(status) => status.code(),
                        Err(e) => {
                            error!(error = %e, "Failed to reap worker");
                            None
                        }
                    };
                    return RunOutcome::Exited { code, uptime };
                }
                _ = &mut stable_timer, if stable_pending => {
                    stable_pending = false;
                    debug!(
                        pid = handle.pid,
                        "Worker reached minimum stable uptime"
                    );
                    self.record_success();
                }
                event = self.events_rx.recv() => {
                    // The channel cannot close while we hold a sender;
                    // `None` is unreachable in practice
                    if let Some(SupervisorEvent::ForceRestart { reason }) = event {
                        return RunOutcome::Forced(reason);
                    }
                }
                result = self.shutdown.changed(), if shutdown_armed => {
                    match result {
                        Ok(()) => {
                            if *self.shutdown.borrow() {
                                return RunOutcome::Shutdown;
                            }
                        }
                        Err(_) => shutdown_armed = false,
                    }
                }
            }
        }
    }

    /// Graceful-kill protocol: stop signal, grace period, then SIGKILL
    async fn stop_worker(&self, handle: &mut ProcessHandle) {
        if let Ok(Some(status)) = handle.child.try_wait() {
            debug!(status = ?status, "Worker already exited");
            return;
        }

        let name = &self.config.worker.name;
        let nix_pid = Pid::from_raw(handle.pid as i32);
        let stop_signal = match parse_signal(&self.config.worker.stop_signal) {
            Ok(sig) => sig,
            Err(e) => {
                // Validation rejects unknown names; fall back anyway
                error!(error = %e, "Invalid stop signal, using SIGTERM");
                Signal::SIGTERM
            }
        };

        info!(
            worker = %name,
            pid = handle.pid,
            signal = %self.config.worker.stop_signal,
            "Stopping worker"
        );

        if let Err(e) = signal::kill(nix_pid, stop_signal) {
            warn!(error = %e, "Failed to send stop signal");
        }

        let timeout = self.config.supervisor.grace_kill_timeout();
        match tokio::time::timeout(timeout, handle.child.wait()).await {
            Ok(Ok(status)) => {
                info!(worker = %name, status = ?status, "Worker exited gracefully");
            }
            Ok(Err(e)) => {
                error!(worker = %name, error = %e, "Wait for worker failed");
            }
            Err(_) => {
                warn!(
                    worker = %name,
                    timeout_secs = timeout.as_secs(),
                    "Worker did not exit within grace period, sending SIGKILL"
                );
                if let Err(e) = signal::kill(nix_pid, Signal::SIGKILL) {
                    warn!(error = %e, "Failed to send SIGKILL");
                }
                let _ = handle.child.wait().await;
            }
        }
    }

    /// Start the configured monitoring loops as independent tasks
    fn spawn_observers(&self) -> Result<()> {
        if let Some(url) = self.config.health.url.clone() {
            let probe = HealthProbe::new(
                url,
                &self.config.health,
                self.events_tx.clone(),
                self.pid_tx.subscribe(),
            )?;
            tokio::spawn(probe.run(self.shutdown.clone()));
        }

        if let Some(threshold) = self.config.memory.threshold_bytes() {
            let guard = MemoryGuard::new(
                threshold,
                &self.config.memory,
                self.events_tx.clone(),
                self.pid_tx.subscribe(),
            );
            tokio::spawn(guard.run(self.shutdown.clone()));
        }

        if let Some(url) = self.config.keepalive.url.clone() {
            let keepalive = KeepAlive::new(url, &self.config.keepalive)?;
            tokio::spawn(keepalive.run(self.shutdown.clone()));
        }

        Ok(())
    }

    fn record_failure(&mut self) {
        self.breaker.record_outcome(Outcome::Failure);
        self.publish_circuit();
    }

    fn record_success(&mut self) {
        self.breaker.record_outcome(Outcome::Success);
        self.backoff.reset();
        self.publish_circuit();
    }

    fn publish_circuit(&self) {
        let state = self.breaker.state();
        self.circuit_tx.send_if_modified(|current| {
            if *current != state {
                *current = state;
                true
            } else {
                false
            }
        });
    }

    fn drain_stale_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            debug!(event = ?event, "Discarding restart request for replaced worker");
        }
    }

    /// Sleep, returning early with `true` if shutdown is requested
    async fn wait_or_shutdown(&mut self, duration: Duration) -> bool {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        let mut shutdown_armed = true;

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                result = self.shutdown.changed(), if shutdown_armed => {
                    match result {
                        Ok(()) => {
                            if *self.shutdown.borrow() {
                                return true;
                            }
                        }
                        Err(_) => shutdown_armed = false,
                    }
                }
            }
        }
    }
}

fn parse_signal(signal_name: &str) -> Result<Signal> {
    match signal_name {
        "SIGTERM" => Ok(Signal::SIGTERM),
        "SIGINT" => Ok(Signal::SIGINT),
        "SIGQUIT" => Ok(Signal::SIGQUIT),
        "SIGKILL" => Ok(Signal::SIGKILL),
        "SIGHUP" => Ok(Signal::SIGHUP),
        "SIGUSR1" => Ok(Signal::SIGUSR1),
        "SIGUSR2" => Ok(Signal::SIGUSR2),
        _ => Err(WardenError::SignalError(format!(
            "Invalid signal name: {}",
            signal_name
        ))),
    }
}
