use std::time::{Duration, Instant};
use tokio::process::Child;

/// Identity of the one currently-spawned worker
///
/// Exclusively owned by the supervisor and replaced wholesale on every
/// restart; other components observe the worker only through the pid
/// watch channel or over the network.
#[derive(Debug)]
pub struct ProcessHandle {
    /// The child process handle
    pub child: Child,

    /// Process ID assigned by the OS
    pub pid: u32,

    started_at: Instant,
}

impl ProcessHandle {
    pub fn new(child: Child, pid: u32) -> Self {
        Self {
            child,
            pid,
            started_at: Instant::now(),
        }
    }

    /// Time since this worker was spawned
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
