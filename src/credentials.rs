//! Database credentials record.
//!
//! The credentials file (`lempkit.env`) is created once with fixed defaults
//! and reused by every later run. It is parsed into an immutable
//! [`Credentials`] value that the rest of the workflow receives explicitly;
//! nothing is exported into the process environment.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::emit;
use crate::envfile::{EnvFile, Line};
use crate::error::{LempError, LempResult};

pub const KEY_ROOT_PASSWORD: &str = "DB_ROOT_PASSWORD";
pub const KEY_DATABASE: &str = "DB_DATABASE";
pub const KEY_USERNAME: &str = "DB_USERNAME";
pub const KEY_PASSWORD: &str = "DB_PASSWORD";

/// Database credentials shared by the MariaDB container and the
/// scaffolded application's settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub root_password: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Whether the credentials file was created this run or already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsOrigin {
    Created,
    Reused,
}

impl fmt::Display for CredentialsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsOrigin::Created => write!(f, "created"),
            CredentialsOrigin::Reused => write!(f, "reused"),
        }
    }
}

impl Credentials {
    /// The values written when no credentials file exists yet.
    pub fn defaults() -> Self {
        Credentials {
            root_password: "rootpassword".to_string(),
            database: "app".to_string(),
            username: "app".to_string(),
            password: "secret".to_string(),
        }
    }

    /// Load credentials from `path`, creating the file with defaults first
    /// if it does not exist. An existing file is never rewritten.
    pub fn load_or_create(path: &Path) -> LempResult<(Self, CredentialsOrigin)> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let creds = Self::parse(path, &content)?;
            return Ok((creds, CredentialsOrigin::Reused));
        }
        let creds = Self::defaults();
        emit::atomic_write(path, &creds.to_env_string())?;
        Ok((creds, CredentialsOrigin::Created))
    }

    /// Strict parse: every non-blank, non-comment line must be a
    /// `KEY=VALUE` assignment, and all four documented keys must be
    /// present. Extra keys are tolerated.
    pub fn parse(path: &Path, content: &str) -> LempResult<Self> {
        let env = EnvFile::parse(content);
        for (i, line) in env.lines().iter().enumerate() {
            if let Line::Raw(raw) = line {
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                return Err(LempError::MalformedCredentials {
                    file: path.to_path_buf(),
                    line: i + 1,
                    content: raw.clone(),
                });
            }
        }
        let require = |key: &'static str| -> LempResult<String> {
            env.get(key)
                .map(str::to_string)
                .ok_or(LempError::MissingCredential {
                    file: path.to_path_buf(),
                    key,
                })
        };
        Ok(Credentials {
            root_password: require(KEY_ROOT_PASSWORD)?,
            database: require(KEY_DATABASE)?,
            username: require(KEY_USERNAME)?,
            password: require(KEY_PASSWORD)?,
        })
    }

    /// Render as the flat `KEY=VALUE` file format.
    pub fn to_env_string(&self) -> String {
        let mut env = EnvFile::new();
        env.set(KEY_ROOT_PASSWORD, &self.root_password);
        env.set(KEY_DATABASE, &self.database);
        env.set(KEY_USERNAME, &self.username);
        env.set(KEY_PASSWORD, &self.password);
        env.to_string()
    }
}
