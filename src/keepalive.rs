use crate::config::KeepAliveSettings;
use crate::error::{Result, WardenError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Best-effort keep-warm loop
///
/// Free hosting tiers suspend services that go quiet; touching an
/// endpoint on an interval shorter than the idle window keeps the host
/// from idling the service out. Failures are logged and nothing more:
/// this loop never feeds the circuit breaker and never triggers a
/// restart.
pub struct KeepAlive {
    client: reqwest::Client,
    url: String,
    interval: Duration,
}

impl KeepAlive {
    pub fn new(url: String, settings: &KeepAliveSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| WardenError::ProbeError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            interval: settings.interval(),
        })
    }

    /// Run the keep-alive loop until shutdown
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            url = %self.url,
            interval_secs = self.interval.as_secs(),
            "Starting keep-alive loop"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.touch().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Keep-alive loop stopped");
    }

    async fn touch(&self) {
        match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url = %self.url, "Keep-alive touch ok");
            }
            Ok(response) => {
                warn!(status = %response.status(), url = %self.url, "Keep-alive touch returned failure");
            }
            Err(e) => {
                warn!(error = %e, url = %self.url, "Keep-alive touch failed");
            }
        }
    }
}
