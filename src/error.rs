use thiserror::Error;

/// Main error type for the warden supervisor
#[derive(Debug, Error)]
pub enum WardenError {
    // Worker process errors
    #[error("Failed to spawn worker: {0}")]
    SpawnError(String),

    #[error("Failed to stop worker {0}: {1}")]
    StopError(String, String),

    #[error("Signal error: {0}")]
    SignalError(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration field: {0}")]
    MissingConfigField(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // Probe errors
    #[error("Probe error: {0}")]
    ProbeError(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for warden operations
pub type Result<T> = std::result::Result<T, WardenError>;
