//! Docker Compose invocation.
//!
//! Detects which Compose binary is installed (`docker compose` preferred,
//! `docker-compose` as the fallback) and wraps the handful of verbs the
//! workflow uses. Every invocation is exit-code checked.

use std::path::PathBuf;

use crate::error::{LempError, LempResult};
use crate::runner::{ensure_success, CommandOutput, CommandRunner, CommandSpec};
use crate::workspace::Workspace;

/// The detected Compose entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeCommand {
    program: &'static str,
    prefix: &'static [&'static str],
}

impl ComposeCommand {
    /// Probe for a working Compose binary with `version`.
    pub fn detect(runner: &dyn CommandRunner) -> LempResult<Self> {
        const CANDIDATES: [ComposeCommand; 2] = [
            ComposeCommand {
                program: "docker",
                prefix: &["compose"],
            },
            ComposeCommand {
                program: "docker-compose",
                prefix: &[],
            },
        ];

        for candidate in CANDIDATES {
            let spec = CommandSpec::new(candidate.program)
                .args(candidate.prefix.iter().copied())
                .arg("version");
            if runner
                .run_captured(&spec)
                .map(|o| o.success())
                .unwrap_or(false)
            {
                return Ok(candidate);
            }
        }
        Err(LempError::ComposeUnavailable)
    }
}

/// Compose bound to one workspace's manifest.
#[derive(Debug, Clone)]
pub struct Compose {
    command: ComposeCommand,
    manifest: PathBuf,
    project_dir: PathBuf,
}

impl Compose {
    pub fn new(command: ComposeCommand, workspace: &Workspace) -> Self {
        Compose {
            command,
            manifest: workspace.manifest_file(),
            project_dir: workspace.root().to_path_buf(),
        }
    }

    /// Detect the Compose binary and bind it to `workspace`.
    pub fn detect(runner: &dyn CommandRunner, workspace: &Workspace) -> LempResult<Self> {
        Ok(Compose::new(ComposeCommand::detect(runner)?, workspace))
    }

    fn spec(&self, args: &[&str]) -> CommandSpec {
        CommandSpec::new(self.command.program)
            .args(self.command.prefix.iter().copied())
            .arg("-f")
            .arg(self.manifest.display().to_string())
            .args(args.iter().copied())
            .cwd(&self.project_dir)
    }

    /// `down --volumes --remove-orphans`: destructive teardown including
    /// persisted database volumes.
    pub fn down_volumes(&self, runner: &dyn CommandRunner) -> LempResult<()> {
        let spec = self.spec(&["down", "--volumes", "--remove-orphans"]);
        let output = runner.run_captured(&spec)?;
        ensure_success(&spec, &output)
    }

    /// `up -d --build`: rebuild images and start all services detached.
    /// Output is streamed through when `stream` is set (human mode).
    pub fn up_detached_build(&self, runner: &dyn CommandRunner, stream: bool) -> LempResult<()> {
        let spec = self.spec(&["up", "-d", "--build"]);
        let output = if stream {
            runner.run_streamed(&spec)?
        } else {
            runner.run_captured(&spec)?
        };
        ensure_success(&spec, &output)
    }

    /// `ps`: aggregate container status.
    pub fn ps(&self, runner: &dyn CommandRunner) -> LempResult<CommandOutput> {
        let spec = self.spec(&["ps"]);
        let output = runner.run_captured(&spec)?;
        ensure_success(&spec, &output)?;
        Ok(output)
    }

    /// `logs --tail <n> <service>`: recent log output for one service.
    pub fn logs_tail(
        &self,
        runner: &dyn CommandRunner,
        service: &str,
        tail: u32,
    ) -> LempResult<CommandOutput> {
        let tail = tail.to_string();
        let spec = self.spec(&["logs", "--tail", tail.as_str(), service]);
        let output = runner.run_captured(&spec)?;
        ensure_success(&spec, &output)?;
        Ok(output)
    }

    /// `exec -T <service> <cmd...>`: run a command inside a service
    /// container without a TTY.
    pub fn exec(
        &self,
        runner: &dyn CommandRunner,
        service: &str,
        cmd: &[&str],
    ) -> LempResult<CommandOutput> {
        let mut args = vec!["exec", "-T", service];
        args.extend_from_slice(cmd);
        let spec = self.spec(&args);
        let output = runner.run_captured(&spec)?;
        ensure_success(&spec, &output)?;
        Ok(output)
    }

    /// Probe the database by pinging the MariaDB server in its container.
    /// Returns false instead of erroring so it can drive a readiness poll.
    pub fn database_responds(&self, runner: &dyn CommandRunner) -> bool {
        let spec = self.spec(&[
            "exec",
            "-T",
            "mariadb",
            "mariadb-admin",
            "ping",
            "-h",
            "127.0.0.1",
            "--silent",
        ]);
        runner
            .run_captured(&spec)
            .map(|o| o.success())
            .unwrap_or(false)
    }
}
