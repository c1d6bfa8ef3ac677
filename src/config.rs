//! Runtime settings for lempkit.
//!
//! Resolution order:
//! 1. Environment variables (LEMPKIT_*)
//! 2. Workspace config (`lempkit.toml`)
//! 3. User config (`~/.config/lempkit/config.toml`)
//! 4. Built-in defaults
//!
//! Defaults reproduce the documented bootstrap behavior exactly; the file is
//! entirely optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LempError, LempResult};

/// Published HTTP port of the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
        }
    }
}

fn default_http_port() -> u16 {
    8220
}

/// Readiness-polling budgets, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Budget for the proxy and database probes after `up`.
    #[serde(default = "default_services_timeout")]
    pub services_timeout_secs: u64,

    /// Budget for the scaffold's settings file to appear.
    #[serde(default = "default_scaffold_timeout")]
    pub scaffold_timeout_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            services_timeout_secs: default_services_timeout(),
            scaffold_timeout_secs: default_scaffold_timeout(),
        }
    }
}

fn default_services_timeout() -> u64 {
    60
}

fn default_scaffold_timeout() -> u64 {
    120
}

/// Status report shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Log lines shown per service.
    #[serde(default = "default_log_tail")]
    pub log_tail: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_tail: default_log_tail(),
        }
    }
}

fn default_log_tail() -> u32 {
    20
}

/// Main settings structure (`lempkit.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub wait: WaitConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> LempResult<Self> {
        let (settings, _warnings) = Self::load_with_warnings(path)?;
        Ok(settings)
    }

    /// Load settings and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> LempResult<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let settings: Self = serde_ignored::deserialize(deserializer, |path| {
            unknown_paths.push(path.to_string());
        })
        .map_err(|e| LempError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|path_str| {
                let key = path_str
                    .split('.')
                    .next_back()
                    .unwrap_or(path_str.as_str())
                    .to_string();
                ConfigWarning {
                    key: key.clone(),
                    file: path.to_path_buf(),
                    line: find_line_number(&content, &key),
                    suggestion: suggest_key(&key),
                }
            })
            .collect();

        Ok((settings, warnings))
    }

    /// Load from the workspace config, the user config, or defaults, then
    /// apply environment overrides. Warnings come from whichever file was
    /// actually read.
    pub fn load_or_default(workspace_root: &Path) -> (Self, Vec<ConfigWarning>) {
        let workspace_config = workspace_root.join("lempkit.toml");
        if workspace_config.exists() {
            if let Ok((settings, warnings)) = Self::load_with_warnings(&workspace_config) {
                return (settings.with_env_overrides(), warnings);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lempkit").join("config.toml");
            if user_config.exists() {
                if let Ok((settings, warnings)) = Self::load_with_warnings(&user_config) {
                    return (settings.with_env_overrides(), warnings);
                }
            }
        }

        (Self::default().with_env_overrides(), Vec::new())
    }

    /// Apply environment variable overrides (LEMPKIT_* prefix).
    /// Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("LEMPKIT_HTTP_PORT") {
            if let Ok(port) = port.parse() {
                self.server.http_port = port;
            }
        }

        if let Ok(secs) = std::env::var("LEMPKIT_SERVICES_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.wait.services_timeout_secs = secs;
            }
        }

        if let Ok(secs) = std::env::var("LEMPKIT_SCAFFOLD_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.wait.scaffold_timeout_secs = secs;
            }
        }

        if let Ok(tail) = std::env::var("LEMPKIT_LOG_TAIL") {
            if let Ok(tail) = tail.parse() {
                self.report.log_tail = tail;
            }
        }

        self
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "server",
        "http_port",
        "wait",
        "services_timeout_secs",
        "scaffold_timeout_secs",
        "report",
        "log_tail",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = std::cmp::min(
                std::cmp::min(prev[j + 1] + 1, curr[j] + 1),
                prev[j] + cost,
            );
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();

        assert_eq!(settings.server.http_port, 8220);
        assert_eq!(settings.wait.services_timeout_secs, 60);
        assert_eq!(settings.wait.scaffold_timeout_secs, 120);
        assert_eq!(settings.report.log_tail, 20);
    }

    #[test]
    fn test_settings_parse_toml() {
        let toml = r#"
[server]
http_port = 9080

[wait]
services_timeout_secs = 30
scaffold_timeout_secs = 90

[report]
log_tail = 50
"#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert_eq!(settings.server.http_port, 9080);
        assert_eq!(settings.wait.services_timeout_secs, 30);
        assert_eq!(settings.wait.scaffold_timeout_secs, 90);
        assert_eq!(settings.report.log_tail, 50);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_the_rest() {
        let settings: Settings = toml::from_str("[server]\nhttp_port = 8080\n").unwrap();
        assert_eq!(settings.server.http_port, 8080);
        assert_eq!(settings.wait.services_timeout_secs, 60);
        assert_eq!(settings.report.log_tail, 20);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lempkit.toml");
        fs::write(&path, "[server\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, LempError::InvalidConfig { .. }));
    }

    #[test]
    fn test_env_override_http_port() {
        // SAFETY: Single-threaded test, no concurrent access to env vars
        unsafe { std::env::set_var("LEMPKIT_HTTP_PORT", "9999") };
        let settings = Settings::default().with_env_overrides();
        assert_eq!(settings.server.http_port, 9999);
        unsafe { std::env::remove_var("LEMPKIT_HTTP_PORT") };
    }

    #[test]
    fn test_env_override_ignores_garbage() {
        // SAFETY: Single-threaded test, no concurrent access to env vars
        unsafe { std::env::set_var("LEMPKIT_LOG_TAIL", "lots") };
        let settings = Settings::default().with_env_overrides();
        assert_eq!(settings.report.log_tail, 20);
        unsafe { std::env::remove_var("LEMPKIT_LOG_TAIL") };
    }

    #[test]
    fn test_load_with_warnings_reports_unknown_key_with_suggestion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lempkit.toml");

        fs::write(&path, "[servr]\nhttp_port = 8080\n").unwrap();

        let (_settings, warnings) = Settings::load_with_warnings(&path).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "servr");
        assert_eq!(warnings[0].line, Some(1));
        assert_eq!(warnings[0].suggestion, Some("server".to_string()));
    }

    #[test]
    fn test_load_or_default_prefers_workspace_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("lempkit.toml"),
            "[report]\nlog_tail = 7\n",
        )
        .unwrap();

        let (settings, warnings) = Settings::load_or_default(dir.path());
        assert_eq!(settings.report.log_tail, 7);
        assert!(warnings.is_empty());
    }
}
