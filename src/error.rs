//! Error types for lempkit
//!
//! Uses `thiserror` for library errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::Step;

/// Result type alias for lempkit operations
pub type LempResult<T> = Result<T, LempError>;

/// Main error type for lempkit operations
#[derive(Error, Debug)]
pub enum LempError {
    /// Malformed line in the credentials file
    #[error("malformed credentials in {file}:{line}: expected KEY=VALUE, got '{content}'")]
    MalformedCredentials {
        file: PathBuf,
        line: usize,
        content: String,
    },

    /// Credentials file is missing a required key
    #[error("credentials file {file} is missing required key '{key}'")]
    MissingCredential { file: PathBuf, key: &'static str },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Scaffolded application settings file never appeared
    #[error("settings file not found at {path} - scaffold may have failed")]
    SettingsMissing { path: PathBuf },

    /// External command could not be launched (binary missing or not executable)
    #[error("failed to launch '{command}': {source}")]
    CommandLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// External command exited non-zero
    #[error("command '{command}' failed with exit code {code:?}{detail}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        detail: String,
    },

    /// Neither `docker compose` nor `docker-compose` is available
    #[error("no compose command available - install Docker Compose (tried 'docker compose' and 'docker-compose')")]
    ComposeUnavailable,

    /// A readiness probe exhausted its time budget
    #[error("timed out waiting for {what} after {waited_secs}s ({attempts} attempts)")]
    ReadinessTimeout {
        what: String,
        waited_secs: u64,
        attempts: u32,
    },

    /// A workflow step failed
    #[error("step '{step}' failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: Box<LempError>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl LempError {
    /// Wrap an error with the workflow step that raised it.
    pub fn at_step(self, step: Step) -> Self {
        LempError::Step {
            step,
            source: Box::new(self),
        }
    }
}
