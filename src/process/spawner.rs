use crate::config::WorkerConfig;
use crate::error::{Result, WardenError};
use crate::process::handle::ProcessHandle;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Spawn the worker process described by the configuration
///
/// Applies working directory, environment variables and arguments, and
/// captures stdout/stderr as pipes so the worker's output lands in the
/// supervisor's own log stream.
pub async fn spawn_worker(config: &WorkerConfig) -> Result<ProcessHandle> {
    if !config.command.exists() {
        return Err(WardenError::SpawnError(format!(
            "Command does not exist: {}",
            config.command.display()
        )));
    }

    let mut command = Command::new(&config.command);

    if !config.args.is_empty() {
        command.args(&config.args);
    }

    if let Some(ref cwd) = config.cwd {
        command.current_dir(cwd);
    }

    for (key, value) in &config.env {
        command.env(key, value);
    }

    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| {
        WardenError::SpawnError(format!("Failed to spawn worker '{}': {}", config.name, e))
    })?;

    let pid = child.id().ok_or_else(|| {
        WardenError::SpawnError(format!("Failed to get PID for worker '{}'", config.name))
    })?;

    forward_output(&mut child, &config.name);

    Ok(ProcessHandle::new(child, pid))
}

/// Forward the worker's stdout and stderr line-by-line into tracing
///
/// The forwarding tasks end on their own when the pipes close with the
/// worker.
fn forward_output(child: &mut Child, name: &str) {
    if let Some(stdout) = child.stdout.take() {
        let worker = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(target: "worker", worker = %worker, "{}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let worker = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "worker", worker = %worker, "{}", line);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_config(name: &str, command: PathBuf) -> WorkerConfig {
        WorkerConfig {
            name: name.to_string(),
            command,
            args: vec![],
            cwd: None,
            env: HashMap::new(),
            stop_signal: "SIGTERM".to_string(),
        }
    }

    #[tokio::test]
    async fn test_spawn_simple_worker() {
        let config = create_test_config("test-echo", PathBuf::from("/bin/echo"));

        let result = spawn_worker(&config).await;
        assert!(result.is_ok());

        let handle = result.unwrap();
        assert!(handle.pid > 0);
    }

    #[tokio::test]
    async fn test_spawn_with_args() {
        let mut config = create_test_config("test-echo-args", PathBuf::from("/bin/echo"));
        config.args = vec!["hello".to_string(), "world".to_string()];

        let result = spawn_worker(&config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_spawn_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config("test-pwd", PathBuf::from("/bin/pwd"));
        config.cwd = Some(temp_dir.path().to_path_buf());

        let result = spawn_worker(&config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_spawn_with_env_vars() {
        let mut config = create_test_config("test-env", PathBuf::from("/bin/sh"));
        config.args = vec!["-c".to_string(), "echo $TEST_VAR".to_string()];
        config
            .env
            .insert("TEST_VAR".to_string(), "test_value".to_string());

        let result = spawn_worker(&config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_spawn_nonexistent_command() {
        let config = create_test_config("test-missing", PathBuf::from("/nonexistent/command"));

        let result = spawn_worker(&config).await;
        match result {
            Err(WardenError::SpawnError(msg)) => {
                assert!(msg.contains("does not exist"));
            }
            _ => panic!("Expected SpawnError"),
        }
    }

    #[tokio::test]
    async fn test_spawn_invalid_working_directory() {
        let mut config = create_test_config("test-bad-cwd", PathBuf::from("/bin/echo"));
        config.cwd = Some(PathBuf::from("/nonexistent/directory"));

        let result = spawn_worker(&config).await;
        assert!(matches!(result, Err(WardenError::SpawnError(_))));
    }

    #[tokio::test]
    async fn test_uptime_advances() {
        let mut config = create_test_config("test-uptime", PathBuf::from("/bin/sleep"));
        config.args = vec!["5".to_string()];

        let mut handle = spawn_worker(&config).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(handle.uptime() >= std::time::Duration::from_millis(50));

        let _ = handle.child.kill().await;
    }
}
