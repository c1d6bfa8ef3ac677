//! Bootstrap workflow.
//!
//! Runs the provisioning steps in their fixed order, inspecting every
//! result: the first failure aborts the remaining steps and the error names
//! the step that raised it. Progress is reported through an [`EventSink`],
//! with a human implementation and an NDJSON implementation for CI.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::compose::Compose;
use crate::config::Settings;
use crate::credentials::{Credentials, CredentialsOrigin};
use crate::emit::{self, EmitOutcome};
use crate::error::LempResult;
use crate::installer::Installer;
use crate::manifest;
use crate::readiness::{probe_tcp, wait_until, RetryPolicy};
use crate::reporter;
use crate::runner::CommandRunner;
use crate::templates;
use crate::workspace::Workspace;

/// One named step of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Credentials,
    Render,
    Teardown,
    Start,
    WaitServices,
    Scaffold,
    Customize,
    Report,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Credentials => "credentials",
            Step::Render => "render",
            Step::Teardown => "teardown",
            Step::Start => "start",
            Step::WaitServices => "wait-services",
            Step::Scaffold => "scaffold",
            Step::Customize => "customize",
            Step::Report => "report",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one executed step, for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub step: Step,
    pub ok: bool,
    pub duration: Duration,
}

/// Progress events emitted while the workflow runs.
#[derive(Debug)]
pub enum RunEvent<'a> {
    StepStarted {
        step: Step,
    },
    StepSucceeded {
        step: Step,
        duration: Duration,
    },
    StepFailed {
        step: Step,
        duration: Duration,
        error: &'a str,
    },
    CredentialsLoaded {
        origin: CredentialsOrigin,
        path: &'a Path,
    },
    FileEmitted {
        path: &'a Path,
        outcome: EmitOutcome,
    },
    Waiting {
        what: &'a str,
    },
    Report {
        text: &'a str,
    },
    Summary {
        records: &'a [StepRecord],
    },
}

/// Receives workflow progress events.
pub trait EventSink {
    fn on_event(&mut self, event: RunEvent<'_>);
}

/// Human-readable output on stdout/stderr.
pub struct HumanSink {
    verbose: bool,
}

impl HumanSink {
    pub fn new(verbose: bool) -> Self {
        HumanSink { verbose }
    }
}

impl EventSink for HumanSink {
    fn on_event(&mut self, event: RunEvent<'_>) {
        match event {
            RunEvent::StepStarted { step } => {
                if self.verbose {
                    println!("→ {step}");
                }
            }
            RunEvent::StepSucceeded { step, duration } => {
                println!("✓ {step} ({}ms)", duration.as_millis());
            }
            RunEvent::StepFailed { step, duration, .. } => {
                eprintln!("✗ {step} ({}ms)", duration.as_millis());
            }
            RunEvent::CredentialsLoaded { origin, path } => {
                println!("  credentials {origin}: {}", path.display());
            }
            RunEvent::FileEmitted { path, outcome } => match outcome {
                EmitOutcome::Written => println!("  wrote {}", path.display()),
                EmitOutcome::Unchanged => {
                    if self.verbose {
                        println!("  unchanged {}", path.display());
                    }
                }
            },
            RunEvent::Waiting { what } => {
                println!("  waiting for {what}...");
            }
            RunEvent::Report { text } => {
                println!("{text}");
            }
            RunEvent::Summary { records } => {
                println!("\nrun summary:");
                for record in records {
                    let icon = if record.ok { "✓" } else { "✗" };
                    println!(
                        "  {icon} {} ({}ms)",
                        record.step,
                        record.duration.as_millis()
                    );
                }
            }
        }
    }
}

/// NDJSON events on stdout, one object per line, for CI consumption.
pub struct JsonSink {
    writer: Box<dyn Write>,
}

impl JsonSink {
    pub fn stdout() -> Self {
        JsonSink {
            writer: Box::new(io::stdout()),
        }
    }

    pub fn with_writer<W: Write + 'static>(writer: W) -> Self {
        JsonSink {
            writer: Box::new(writer),
        }
    }

    fn write_event(&mut self, value: serde_json::Value) {
        let _ = writeln!(self.writer, "{value}");
        let _ = self.writer.flush();
    }
}

impl EventSink for JsonSink {
    fn on_event(&mut self, event: RunEvent<'_>) {
        let ts = chrono::Utc::now().to_rfc3339();
        let value = match event {
            RunEvent::StepStarted { step } => serde_json::json!({
                "event": "step_started",
                "ts": ts,
                "step": step.name(),
            }),
            RunEvent::StepSucceeded { step, duration } => serde_json::json!({
                "event": "step_succeeded",
                "ts": ts,
                "step": step.name(),
                "duration_ms": duration.as_millis() as u64,
            }),
            RunEvent::StepFailed {
                step,
                duration,
                error,
            } => serde_json::json!({
                "event": "step_failed",
                "ts": ts,
                "step": step.name(),
                "duration_ms": duration.as_millis() as u64,
                "error": error,
            }),
            RunEvent::CredentialsLoaded { origin, path } => serde_json::json!({
                "event": "credentials",
                "ts": ts,
                "origin": origin.to_string(),
                "path": path.display().to_string(),
            }),
            RunEvent::FileEmitted { path, outcome } => serde_json::json!({
                "event": "file_emitted",
                "ts": ts,
                "path": path.display().to_string(),
                "outcome": match outcome {
                    EmitOutcome::Written => "written",
                    EmitOutcome::Unchanged => "unchanged",
                },
            }),
            RunEvent::Waiting { what } => serde_json::json!({
                "event": "waiting",
                "ts": ts,
                "what": what,
            }),
            RunEvent::Report { text } => serde_json::json!({
                "event": "report",
                "ts": ts,
                "text": text,
            }),
            RunEvent::Summary { records } => serde_json::json!({
                "event": "summary",
                "ts": ts,
                "steps": records.iter().map(|r| serde_json::json!({
                    "step": r.step.name(),
                    "ok": r.ok,
                    "duration_ms": r.duration.as_millis() as u64,
                })).collect::<Vec<_>>(),
            }),
        };
        self.write_event(value);
    }
}

fn run_step<T>(
    step: Step,
    sink: &mut dyn EventSink,
    records: &mut Vec<StepRecord>,
    f: impl FnOnce(&mut dyn EventSink) -> LempResult<T>,
) -> LempResult<T> {
    sink.on_event(RunEvent::StepStarted { step });
    let start = Instant::now();
    match f(sink) {
        Ok(value) => {
            let duration = start.elapsed();
            records.push(StepRecord {
                step,
                ok: true,
                duration,
            });
            sink.on_event(RunEvent::StepSucceeded { step, duration });
            Ok(value)
        }
        Err(err) => {
            let duration = start.elapsed();
            records.push(StepRecord {
                step,
                ok: false,
                duration,
            });
            sink.on_event(RunEvent::StepFailed {
                step,
                duration,
                error: &err.to_string(),
            });
            Err(err.at_step(step))
        }
    }
}

fn load_and_render(
    workspace: &Workspace,
    http_port: u16,
    sink: &mut dyn EventSink,
    records: &mut Vec<StepRecord>,
) -> LempResult<Credentials> {
    let credentials = run_step(Step::Credentials, sink, records, |sink| {
        let path = workspace.credentials_file();
        let (credentials, origin) = Credentials::load_or_create(&path)?;
        sink.on_event(RunEvent::CredentialsLoaded {
            origin,
            path: &path,
        });
        Ok(credentials)
    })?;

    run_step(Step::Render, sink, records, |sink| {
        let manifest_yaml = manifest::render(&credentials, http_port)?;
        let files: [(std::path::PathBuf, &str); 3] = [
            (workspace.manifest_file(), manifest_yaml.as_str()),
            (workspace.dockerfile(), templates::RUNTIME_DOCKERFILE),
            (workspace.proxy_conf(), templates::PROXY_CONF),
        ];
        for (path, content) in &files {
            let outcome = emit::emit(path, content)?;
            sink.on_event(RunEvent::FileEmitted { path, outcome });
        }
        Ok(())
    })?;

    Ok(credentials)
}

/// Loader + Emitter only: ensure credentials exist and regenerate the three
/// configuration files.
pub fn render(
    workspace: &Workspace,
    settings: &Settings,
    sink: &mut dyn EventSink,
) -> LempResult<Credentials> {
    let mut records = Vec::new();
    load_and_render(workspace, settings.server.http_port, sink, &mut records)
}

/// Teardown only: `compose down --volumes --remove-orphans`.
pub fn teardown(
    workspace: &Workspace,
    runner: &dyn CommandRunner,
    sink: &mut dyn EventSink,
) -> LempResult<()> {
    let mut records = Vec::new();
    run_step(Step::Teardown, sink, &mut records, |_| {
        let compose = Compose::detect(runner, workspace)?;
        compose.down_volumes(runner)
    })
}

/// Reporter only: container status and recent logs.
pub fn report(
    workspace: &Workspace,
    settings: &Settings,
    runner: &dyn CommandRunner,
    sink: &mut dyn EventSink,
) -> LempResult<()> {
    let mut records = Vec::new();
    run_step(Step::Report, sink, &mut records, |sink| {
        let compose = Compose::detect(runner, workspace)?;
        let status = reporter::collect(&compose, runner, &settings.report)?;
        sink.on_event(RunEvent::Report {
            text: &status.render(),
        });
        Ok(())
    })
}

/// The full bootstrap: Loader → Emitter → Orchestrator → Installer →
/// Customizer → Reporter. A per-step summary is emitted at the end of the
/// run, successful or not.
pub fn bootstrap(
    workspace: &Workspace,
    settings: &Settings,
    runner: &dyn CommandRunner,
    sink: &mut dyn EventSink,
    stream_output: bool,
) -> LempResult<()> {
    let mut records = Vec::new();
    let result = bootstrap_steps(workspace, settings, runner, sink, stream_output, &mut records);
    sink.on_event(RunEvent::Summary { records: &records });
    result
}

fn bootstrap_steps(
    workspace: &Workspace,
    settings: &Settings,
    runner: &dyn CommandRunner,
    sink: &mut dyn EventSink,
    stream_output: bool,
    records: &mut Vec<StepRecord>,
) -> LempResult<()> {
    let credentials = load_and_render(workspace, settings.server.http_port, sink, records)?;

    let compose = run_step(Step::Teardown, sink, records, |_| {
        let compose = Compose::detect(runner, workspace)?;
        compose.down_volumes(runner)?;
        Ok(compose)
    })?;

    run_step(Step::Start, sink, records, |_| {
        compose.up_detached_build(runner, stream_output)
    })?;

    run_step(Step::WaitServices, sink, records, |sink| {
        let policy =
            RetryPolicy::with_budget(Duration::from_secs(settings.wait.services_timeout_secs));

        let proxy = format!("proxy on 127.0.0.1:{}", settings.server.http_port);
        sink.on_event(RunEvent::Waiting { what: &proxy });
        let addr = SocketAddr::from(([127, 0, 0, 1], settings.server.http_port));
        wait_until(&proxy, &policy, || probe_tcp(addr, Duration::from_secs(2)))?;

        sink.on_event(RunEvent::Waiting { what: "database" });
        wait_until("database", &policy, || compose.database_responds(runner))?;
        Ok(())
    })?;

    run_step(Step::Scaffold, sink, records, |_| {
        let scaffold_wait =
            RetryPolicy::with_budget(Duration::from_secs(settings.wait.scaffold_timeout_secs));
        Installer::new(&compose, runner, workspace, scaffold_wait).run(&credentials)
    })?;

    run_step(Step::Customize, sink, records, |sink| {
        fs::create_dir_all(workspace.views_dir())?;
        let path = workspace.landing_page();
        let outcome = emit::emit(&path, templates::LANDING_PAGE)?;
        sink.on_event(RunEvent::FileEmitted {
            path: &path,
            outcome,
        });
        Ok(())
    })?;

    run_step(Step::Report, sink, records, |sink| {
        let status = reporter::collect(&compose, runner, &settings.report)?;
        sink.on_event(RunEvent::Report {
            text: &status.render(),
        });
        Ok(())
    })?;

    Ok(())
}
