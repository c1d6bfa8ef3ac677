//! Status report.
//!
//! Collects `compose ps` plus a log tail for each of the three services and
//! passes the raw output through for operator inspection.

use chrono::{DateTime, Utc};

use crate::compose::Compose;
use crate::config::ReportConfig;
use crate::error::LempResult;
use crate::runner::CommandRunner;

/// The three services, in report order.
pub const SERVICES: [&str; 3] = ["nginx", "php", "mariadb"];

/// Raw container status collected from Compose.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub generated_at: DateTime<Utc>,
    pub log_tail: u32,
    pub ps: String,
    pub logs: Vec<(String, String)>,
}

/// Query Compose for container status and recent logs.
pub fn collect(
    compose: &Compose,
    runner: &dyn CommandRunner,
    config: &ReportConfig,
) -> LempResult<StatusReport> {
    let ps = compose.ps(runner)?;

    let mut logs = Vec::with_capacity(SERVICES.len());
    for service in SERVICES {
        let output = compose.logs_tail(runner, service, config.log_tail)?;
        // Compose writes log payloads to stdout and its own chatter to
        // stderr; keep both, stdout first.
        let mut text = output.stdout;
        if !output.stderr.is_empty() {
            text.push_str(&output.stderr);
        }
        logs.push((service.to_string(), text));
    }

    Ok(StatusReport {
        generated_at: Utc::now(),
        log_tail: config.log_tail,
        ps: ps.stdout,
        logs,
    })
}

impl StatusReport {
    /// Render for human consumption.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== container status @ {} ===\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&self.ps);
        for (service, text) in &self.logs {
            out.push_str(&format!(
                "\n--- {service} (last {} lines) ---\n",
                self.log_tail
            ));
            out.push_str(text);
        }
        out
    }
}
