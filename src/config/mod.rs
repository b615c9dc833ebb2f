use crate::error::{Result, WardenError};
use crate::process::restart::RestartPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for a warden run
///
/// One instance supervises exactly one worker process. Loaded from a TOML
/// or JSON file, then overridden by `WARDEN_*` environment variables so
/// the whole surface is reachable on hosts that only offer env-style
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardenConfig {
    /// The worker process to supervise
    pub worker: WorkerConfig,

    /// Restart policy and shutdown behavior
    #[serde(default)]
    pub supervisor: SupervisorSettings,

    /// Liveness probing
    #[serde(default)]
    pub health: HealthSettings,

    /// Memory pressure monitoring
    #[serde(default)]
    pub memory: MemorySettings,

    /// Keep-warm pinging
    #[serde(default)]
    pub keepalive: KeepAliveSettings,
}

/// Configuration of the supervised worker process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Display name used in log lines
    #[serde(default = "default_worker_name")]
    pub name: String,

    /// Path to the executable to run
    pub command: PathBuf,

    /// Command-line arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the worker
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Environment variables passed to the worker
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Signal sent to stop the worker (default: SIGTERM)
    #[serde(default = "default_stop_signal")]
    pub stop_signal: String,
}

/// Restart policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSettings {
    /// Consecutive counted failures before the circuit opens
    #[serde(default = "default_max_process_failures")]
    pub max_consecutive_failures: u32,

    /// First restart delay (in seconds)
    #[serde(default = "default_base_backoff")]
    pub base_backoff_secs: u64,

    /// Multiplier applied to the delay after each counted failure
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u64,

    /// Upper bound on the restart delay (in seconds)
    #[serde(default = "default_backoff_cap")]
    pub backoff_cap_secs: u64,

    /// How long the circuit stays open before a trial restart (in seconds)
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,

    /// Uptime below which an exit is treated as a crash (in seconds)
    #[serde(default = "default_min_stable_uptime")]
    pub min_stable_uptime_secs: u64,

    /// Grace period between the stop signal and SIGKILL (in seconds)
    #[serde(default = "default_grace_kill_timeout")]
    pub grace_kill_timeout_secs: u64,
}

/// Liveness probe settings
///
/// Probing is disabled when no URL is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSettings {
    /// Liveness endpoint of the worker, e.g. `http://127.0.0.1:5000/health`
    #[serde(default)]
    pub url: Option<String>,

    /// Seconds between probes
    #[serde(default = "default_probe_interval")]
    pub interval_secs: u64,

    /// Per-probe deadline (in seconds)
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Consecutive unhealthy readings before a forced restart
    #[serde(default = "default_max_health_failures")]
    pub max_consecutive_failures: u32,
}

/// Memory guard settings
///
/// Monitoring is disabled when no threshold is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Resident memory threshold in megabytes
    #[serde(default)]
    pub threshold_mb: Option<u64>,

    /// Seconds between samples
    #[serde(default = "default_memory_interval")]
    pub sample_interval_secs: u64,

    /// Number of samples in the rolling window
    #[serde(default = "default_memory_window")]
    pub window: usize,
}

/// Keep-alive settings
///
/// The loop is disabled when no URL is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveSettings {
    /// Endpoint touched to keep the host from idling the service out
    #[serde(default)]
    pub url: Option<String>,

    /// Seconds between touches; keep below the host's idle-suspend window
    #[serde(default = "default_keepalive_interval")]
    pub interval_secs: u64,

    /// Per-request deadline (in seconds)
    #[serde(default = "default_keepalive_timeout")]
    pub timeout_secs: u64,
}

// Default value functions for serde
fn default_worker_name() -> String {
    "worker".to_string()
}

fn default_stop_signal() -> String {
    "SIGTERM".to_string()
}

fn default_max_process_failures() -> u32 {
    5
}

fn default_base_backoff() -> u64 {
    1
}

fn default_backoff_multiplier() -> u64 {
    2
}

fn default_backoff_cap() -> u64 {
    60
}

fn default_cooldown() -> u64 {
    60
}

fn default_min_stable_uptime() -> u64 {
    30
}

fn default_grace_kill_timeout() -> u64 {
    10
}

fn default_probe_interval() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_max_health_failures() -> u32 {
    5
}

fn default_memory_interval() -> u64 {
    15
}

fn default_memory_window() -> usize {
    8
}

fn default_keepalive_interval() -> u64 {
    240
}

fn default_keepalive_timeout() -> u64 {
    10
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_process_failures(),
            base_backoff_secs: default_base_backoff(),
            backoff_multiplier: default_backoff_multiplier(),
            backoff_cap_secs: default_backoff_cap(),
            cooldown_secs: default_cooldown(),
            min_stable_uptime_secs: default_min_stable_uptime(),
            grace_kill_timeout_secs: default_grace_kill_timeout(),
        }
    }
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            url: None,
            interval_secs: default_probe_interval(),
            timeout_secs: default_probe_timeout(),
            max_consecutive_failures: default_max_health_failures(),
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            threshold_mb: None,
            sample_interval_secs: default_memory_interval(),
            window: default_memory_window(),
        }
    }
}

impl Default for KeepAliveSettings {
    fn default() -> Self {
        Self {
            url: None,
            interval_secs: default_keepalive_interval(),
            timeout_secs: default_keepalive_timeout(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from a file (supports TOML and JSON), apply
    /// `WARDEN_*` environment overrides, and validate
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WardenError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(WardenError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.apply_env_overrides()?;
        config.expand_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration purely from `WARDEN_*` environment variables
    ///
    /// Requires at least `WARDEN_WORKER_COMMAND`; everything else falls
    /// back to defaults.
    pub fn from_env() -> Result<Self> {
        let command = std::env::var("WARDEN_WORKER_COMMAND")
            .map_err(|_| WardenError::MissingConfigField("WARDEN_WORKER_COMMAND".to_string()))?;

        let mut config = Self {
            worker: WorkerConfig {
                name: default_worker_name(),
                command: PathBuf::from(command),
                args: Vec::new(),
                cwd: None,
                env: HashMap::new(),
                stop_signal: default_stop_signal(),
            },
            supervisor: SupervisorSettings::default(),
            health: HealthSettings::default(),
            memory: MemorySettings::default(),
            keepalive: KeepAliveSettings::default(),
        };

        config.apply_env_overrides()?;
        config.expand_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Parse TOML configuration
    fn parse_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| WardenError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse JSON configuration
    fn parse_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| WardenError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Apply `WARDEN_*` environment variable overrides
    ///
    /// The environment wins over the file so a PaaS dashboard can adjust
    /// any knob without a redeploy.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_string("WARDEN_WORKER_NAME") {
            self.worker.name = v;
        }
        if let Some(v) = env_string("WARDEN_WORKER_COMMAND") {
            self.worker.command = PathBuf::from(v);
        }
        if let Some(v) = env_string("WARDEN_WORKER_ARGS") {
            self.worker.args = v.split_whitespace().map(String::from).collect();
        }
        if let Some(v) = env_string("WARDEN_WORKER_CWD") {
            self.worker.cwd = Some(PathBuf::from(v));
        }
        if let Some(v) = env_string("WARDEN_STOP_SIGNAL") {
            self.worker.stop_signal = v;
        }

        env_parse(
            "WARDEN_MAX_PROCESS_FAILURES",
            &mut self.supervisor.max_consecutive_failures,
        )?;
        env_parse(
            "WARDEN_BASE_BACKOFF_SECS",
            &mut self.supervisor.base_backoff_secs,
        )?;
        env_parse(
            "WARDEN_BACKOFF_MULTIPLIER",
            &mut self.supervisor.backoff_multiplier,
        )?;
        env_parse(
            "WARDEN_BACKOFF_CAP_SECS",
            &mut self.supervisor.backoff_cap_secs,
        )?;
        env_parse("WARDEN_COOLDOWN_SECS", &mut self.supervisor.cooldown_secs)?;
        env_parse(
            "WARDEN_MIN_STABLE_UPTIME_SECS",
            &mut self.supervisor.min_stable_uptime_secs,
        )?;
        env_parse(
            "WARDEN_GRACE_KILL_TIMEOUT_SECS",
            &mut self.supervisor.grace_kill_timeout_secs,
        )?;

        if let Some(v) = env_string("WARDEN_HEALTH_URL") {
            self.health.url = Some(v);
        }
        env_parse("WARDEN_PROBE_INTERVAL_SECS", &mut self.health.interval_secs)?;
        env_parse("WARDEN_PROBE_TIMEOUT_SECS", &mut self.health.timeout_secs)?;
        env_parse(
            "WARDEN_MAX_HEALTH_FAILURES",
            &mut self.health.max_consecutive_failures,
        )?;

        if let Some(v) = env_string("WARDEN_MEMORY_THRESHOLD_MB") {
            let parsed = v.parse().map_err(|_| {
                WardenError::ConfigError(format!(
                    "Invalid value for WARDEN_MEMORY_THRESHOLD_MB: {}",
                    v
                ))
            })?;
            self.memory.threshold_mb = Some(parsed);
        }
        env_parse(
            "WARDEN_MEMORY_INTERVAL_SECS",
            &mut self.memory.sample_interval_secs,
        )?;
        env_parse("WARDEN_MEMORY_WINDOW", &mut self.memory.window)?;

        if let Some(v) = env_string("WARDEN_KEEPALIVE_URL") {
            self.keepalive.url = Some(v);
        }
        env_parse(
            "WARDEN_KEEPALIVE_INTERVAL_SECS",
            &mut self.keepalive.interval_secs,
        )?;
        env_parse(
            "WARDEN_KEEPALIVE_TIMEOUT_SECS",
            &mut self.keepalive.timeout_secs,
        )?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.worker.name.is_empty() {
            return Err(WardenError::MissingConfigField("worker.name".to_string()));
        }

        if self.worker.command.as_os_str().is_empty() {
            return Err(WardenError::MissingConfigField(
                "worker.command".to_string(),
            ));
        }

        let valid_signals = [
            "SIGTERM", "SIGINT", "SIGQUIT", "SIGKILL", "SIGHUP", "SIGUSR1", "SIGUSR2",
        ];
        if !valid_signals.contains(&self.worker.stop_signal.as_str()) {
            return Err(WardenError::ConfigValidationError(format!(
                "Invalid stop_signal: {}. Must be one of: {}",
                self.worker.stop_signal,
                valid_signals.join(", ")
            )));
        }

        if let Some(ref cwd) = self.worker.cwd {
            if !cwd.is_dir() {
                return Err(WardenError::ConfigValidationError(format!(
                    "Working directory does not exist: {}",
                    cwd.display()
                )));
            }
        }

        let s = &self.supervisor;
        if s.max_consecutive_failures == 0 {
            return Err(WardenError::ConfigValidationError(
                "max_consecutive_failures must be at least 1".to_string(),
            ));
        }
        if s.base_backoff_secs == 0 {
            return Err(WardenError::ConfigValidationError(
                "base_backoff_secs must be positive".to_string(),
            ));
        }
        if s.backoff_multiplier == 0 {
            return Err(WardenError::ConfigValidationError(
                "backoff_multiplier must be positive".to_string(),
            ));
        }
        if s.backoff_cap_secs < s.base_backoff_secs {
            return Err(WardenError::ConfigValidationError(
                "backoff_cap_secs must be >= base_backoff_secs".to_string(),
            ));
        }
        if s.cooldown_secs == 0 {
            return Err(WardenError::ConfigValidationError(
                "cooldown_secs must be positive".to_string(),
            ));
        }
        if s.min_stable_uptime_secs == 0 {
            return Err(WardenError::ConfigValidationError(
                "min_stable_uptime_secs must be positive".to_string(),
            ));
        }
        if s.grace_kill_timeout_secs == 0 {
            return Err(WardenError::ConfigValidationError(
                "grace_kill_timeout_secs must be positive".to_string(),
            ));
        }

        if self.health.url.is_some() {
            if self.health.interval_secs == 0 || self.health.timeout_secs == 0 {
                return Err(WardenError::ConfigValidationError(
                    "health interval and timeout must be positive".to_string(),
                ));
            }
            if self.health.max_consecutive_failures == 0 {
                return Err(WardenError::ConfigValidationError(
                    "health max_consecutive_failures must be at least 1".to_string(),
                ));
            }
        }

        if self.memory.threshold_mb.is_some() {
            if self.memory.window == 0 {
                return Err(WardenError::ConfigValidationError(
                    "memory window must be at least 1".to_string(),
                ));
            }
            if self.memory.sample_interval_secs == 0 {
                return Err(WardenError::ConfigValidationError(
                    "memory sample_interval_secs must be positive".to_string(),
                ));
            }
        }

        if self.keepalive.url.is_some() && self.keepalive.interval_secs == 0 {
            return Err(WardenError::ConfigValidationError(
                "keepalive interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Expand environment variables in worker configuration fields
    fn expand_env_vars(&mut self) {
        self.worker.command = expand_env_in_path(&self.worker.command);

        if let Some(ref cwd) = self.worker.cwd {
            self.worker.cwd = Some(expand_env_in_path(cwd));
        }

        self.worker.args = self
            .worker
            .args
            .iter()
            .map(|arg| expand_env_in_string(arg))
            .collect();

        self.worker.env = self
            .worker
            .env
            .iter()
            .map(|(k, v)| (k.clone(), expand_env_in_string(v)))
            .collect();
    }

    /// Build the restart policy from supervisor settings
    pub fn restart_policy(&self) -> RestartPolicy {
        let s = &self.supervisor;
        RestartPolicy {
            max_consecutive_failures: s.max_consecutive_failures,
            base_backoff: Duration::from_secs(s.base_backoff_secs),
            backoff_multiplier: s.backoff_multiplier,
            backoff_cap: Duration::from_secs(s.backoff_cap_secs),
            cooldown: Duration::from_secs(s.cooldown_secs),
            min_stable_uptime: Duration::from_secs(s.min_stable_uptime_secs),
        }
    }
}

impl SupervisorSettings {
    pub fn grace_kill_timeout(&self) -> Duration {
        Duration::from_secs(self.grace_kill_timeout_secs)
    }
}

impl HealthSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MemorySettings {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs)
    }

    /// Threshold in bytes, if configured
    pub fn threshold_bytes(&self) -> Option<u64> {
        self.threshold_mb.map(|mb| mb * 1024 * 1024)
    }
}

impl KeepAliveSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Some(v) = env_string(key) {
        *target = v
            .parse()
            .map_err(|_| WardenError::ConfigError(format!("Invalid value for {}: {}", key, v)))?;
    }
    Ok(())
}

/// Expand `$VAR` and `${VAR}` references in a string
fn expand_env_in_string(s: &str) -> String {
    let mut result = s.to_string();

    for (key, value) in std::env::vars() {
        result = result.replace(&format!("${{{}}}", key), &value);
        result = result.replace(&format!("${}", key), &value);
    }

    result
}

fn expand_env_in_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(expand_env_in_string(&path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> WardenConfig {
        WardenConfig {
            worker: WorkerConfig {
                name: "test".to_string(),
                command: PathBuf::from("/bin/echo"),
                args: vec![],
                cwd: None,
                env: HashMap::new(),
                stop_signal: "SIGTERM".to_string(),
            },
            supervisor: SupervisorSettings::default(),
            health: HealthSettings::default(),
            memory: MemorySettings::default(),
            keepalive: KeepAliveSettings::default(),
        }
    }

    #[test]
    fn test_supervisor_defaults() {
        let s = SupervisorSettings::default();
        assert_eq!(s.max_consecutive_failures, 5);
        assert_eq!(s.base_backoff_secs, 1);
        assert_eq!(s.backoff_multiplier, 2);
        assert_eq!(s.backoff_cap_secs, 60);
        assert_eq!(s.cooldown_secs, 60);
        assert_eq!(s.min_stable_uptime_secs, 30);
        assert_eq!(s.grace_kill_timeout_secs, 10);
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(minimal_config().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = minimal_config();
        config.worker.command = PathBuf::new();
        assert!(matches!(
            config.validate(),
            Err(WardenError::MissingConfigField(_))
        ));
    }

    #[test]
    fn test_validate_invalid_signal() {
        let mut config = minimal_config();
        config.worker.stop_signal = "INVALID".to_string();
        assert!(matches!(
            config.validate(),
            Err(WardenError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_validate_cap_below_base() {
        let mut config = minimal_config();
        config.supervisor.base_backoff_secs = 30;
        config.supervisor.backoff_cap_secs = 10;
        assert!(matches!(
            config.validate(),
            Err(WardenError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_cooldown() {
        let mut config = minimal_config();
        config.supervisor.cooldown_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(WardenError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_memory_window() {
        let mut config = minimal_config();
        config.memory.threshold_mb = Some(256);
        config.memory.window = 0;
        assert!(matches!(
            config.validate(),
            Err(WardenError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let toml_content = r#"
            [worker]
            name = "docgen"
            command = "/usr/bin/python3"
            args = ["start_server.py"]

            [supervisor]
            max_consecutive_failures = 3
            cooldown_secs = 120

            [health]
            url = "http://127.0.0.1:5000/health"
            interval_secs = 20
        "#;

        let config = WardenConfig::parse_toml(toml_content).unwrap();
        assert_eq!(config.worker.name, "docgen");
        assert_eq!(config.worker.args, vec!["start_server.py"]);
        assert_eq!(config.supervisor.max_consecutive_failures, 3);
        assert_eq!(config.supervisor.cooldown_secs, 120);
        assert_eq!(
            config.health.url.as_deref(),
            Some("http://127.0.0.1:5000/health")
        );
        assert_eq!(config.health.interval_secs, 20);
        // Untouched sections fall back to defaults
        assert_eq!(config.supervisor.base_backoff_secs, 1);
        assert!(config.keepalive.url.is_none());
    }

    #[test]
    fn test_parse_json() {
        let json_content = r#"
            {
                "worker": {
                    "command": "/usr/bin/node",
                    "args": ["server.js"]
                },
                "memory": {
                    "threshold_mb": 256,
                    "window": 4
                }
            }
        "#;

        let config = WardenConfig::parse_json(json_content).unwrap();
        assert_eq!(config.worker.command, PathBuf::from("/usr/bin/node"));
        assert_eq!(config.memory.threshold_mb, Some(256));
        assert_eq!(config.memory.window, 4);
    }

    #[test]
    fn test_threshold_bytes() {
        let mut settings = MemorySettings::default();
        assert_eq!(settings.threshold_bytes(), None);
        settings.threshold_mb = Some(2);
        assert_eq!(settings.threshold_bytes(), Some(2 * 1024 * 1024));
    }

    #[test]
    fn test_restart_policy_from_settings() {
        let config = minimal_config();
        let policy = config.restart_policy();
        assert_eq!(policy.max_consecutive_failures, 5);
        assert_eq!(policy.base_backoff, Duration::from_secs(1));
        assert_eq!(policy.backoff_cap, Duration::from_secs(60));
        assert_eq!(policy.min_stable_uptime, Duration::from_secs(30));
    }

    #[test]
    fn test_env_override_numeric() {
        std::env::set_var("WARDEN_COOLDOWN_SECS", "300");

        let mut config = minimal_config();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.supervisor.cooldown_secs, 300);

        std::env::remove_var("WARDEN_COOLDOWN_SECS");
    }

    #[test]
    fn test_env_override_invalid_numeric() {
        std::env::set_var("WARDEN_PROBE_TIMEOUT_SECS", "not-a-number");

        let mut config = minimal_config();
        assert!(matches!(
            config.apply_env_overrides(),
            Err(WardenError::ConfigError(_))
        ));

        std::env::remove_var("WARDEN_PROBE_TIMEOUT_SECS");
    }

    #[test]
    fn test_env_override_health_url() {
        std::env::set_var("WARDEN_HEALTH_URL", "http://127.0.0.1:9000/ping");

        let mut config = minimal_config();
        config.apply_env_overrides().unwrap();
        assert_eq!(
            config.health.url.as_deref(),
            Some("http://127.0.0.1:9000/ping")
        );

        std::env::remove_var("WARDEN_HEALTH_URL");
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("WARDEN_TEST_DIR", "/tmp");

        let mut config = minimal_config();
        config.worker.command = PathBuf::from("$WARDEN_TEST_DIR/run.sh");
        config.worker.args = vec!["--root=${WARDEN_TEST_DIR}".to_string()];
        config.expand_env_vars();

        assert_eq!(config.worker.command, PathBuf::from("/tmp/run.sh"));
        assert_eq!(config.worker.args[0], "--root=/tmp");

        std::env::remove_var("WARDEN_TEST_DIR");
    }
}
