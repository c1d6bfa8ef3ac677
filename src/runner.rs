//! External command execution seam.
//!
//! All shell-outs go through the [`CommandRunner`] trait so the provisioning
//! logic can be unit tested against a scripted [`MockRunner`] without Docker
//! installed.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{LempError, LempResult};

/// A fully described external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// The command line as shown in errors and verbose output.
    pub fn rendered(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes external commands.
pub trait CommandRunner {
    /// Run with stdout/stderr captured.
    fn run_captured(&self, spec: &CommandSpec) -> LempResult<CommandOutput>;

    /// Run with stdout/stderr inherited (streamed to the operator).
    /// The returned output carries only the exit code.
    fn run_streamed(&self, spec: &CommandSpec) -> LempResult<CommandOutput>;
}

/// Turn a non-zero exit into a [`LempError::CommandFailed`] carrying the
/// rendered command line and a stderr tail.
pub fn ensure_success(spec: &CommandSpec, output: &CommandOutput) -> LempResult<()> {
    if output.success() {
        return Ok(());
    }
    let tail = stderr_tail(&output.stderr, 5);
    let detail = if tail.is_empty() {
        String::new()
    } else {
        format!(": {tail}")
    };
    Err(LempError::CommandFailed {
        command: spec.rendered(),
        code: output.code,
        detail,
    })
}

fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join(" / ")
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for ProcessRunner {
    fn run_captured(&self, spec: &CommandSpec) -> LempResult<CommandOutput> {
        let output = self
            .command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LempError::CommandLaunch {
                command: spec.rendered(),
                source,
            })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run_streamed(&self, spec: &CommandSpec) -> LempResult<CommandOutput> {
        let status = self
            .command(spec)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| LempError::CommandLaunch {
                command: spec.rendered(),
                source,
            })?;
        Ok(CommandOutput {
            code: status.code(),
            ..CommandOutput::default()
        })
    }
}

/// Scripted runner for unit tests. Records every invocation; outcomes are
/// consumed in push order, defaulting to success once the script runs out.
#[cfg(test)]
pub struct MockRunner {
    script: std::sync::Mutex<std::collections::VecDeque<CommandOutput>>,
    calls: std::sync::Mutex<Vec<CommandSpec>>,
}

#[cfg(test)]
impl MockRunner {
    pub fn new() -> Self {
        MockRunner {
            script: std::sync::Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn push_success(&self) {
        self.push_output(0, "", "");
    }

    pub fn push_failure(&self, code: i32, stderr: &str) {
        self.push_output(code, "", stderr);
    }

    pub fn push_output(&self, code: i32, stdout: &str, stderr: &str) {
        self.script.lock().unwrap().push_back(CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
    }

    /// Every invocation so far, rendered as command lines.
    pub fn rendered_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(CommandSpec::rendered)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandRunner for MockRunner {
    fn run_captured(&self, spec: &CommandSpec) -> LempResult<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }))
    }

    fn run_streamed(&self, spec: &CommandSpec) -> LempResult<CommandOutput> {
        self.run_captured(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_joins_program_and_args() {
        let spec = CommandSpec::new("docker").args(["compose", "up", "-d", "--build"]);
        assert_eq!(spec.rendered(), "docker compose up -d --build");
    }

    #[test]
    fn test_ensure_success_passes_zero_exit() {
        let spec = CommandSpec::new("true");
        let output = CommandOutput {
            code: Some(0),
            ..CommandOutput::default()
        };
        assert!(ensure_success(&spec, &output).is_ok());
    }

    #[test]
    fn test_ensure_success_carries_stderr_tail() {
        let spec = CommandSpec::new("docker").args(["compose", "up"]);
        let output = CommandOutput {
            code: Some(125),
            stdout: String::new(),
            stderr: "pulling image\nError: no such image\n".to_string(),
        };
        let err = ensure_success(&spec, &output).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("docker compose up"));
        assert!(msg.contains("125"));
        assert!(msg.contains("Error: no such image"));
    }

    #[test]
    fn test_process_runner_reports_missing_binary() {
        let spec = CommandSpec::new("lempkit-definitely-not-a-binary");
        let err = ProcessRunner::new().run_captured(&spec).unwrap_err();
        assert!(matches!(err, LempError::CommandLaunch { .. }));
    }

    #[test]
    fn test_process_runner_captures_output() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2"]);
        let output = ProcessRunner::new().run_captured(&spec).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[test]
    fn test_mock_runner_scripts_in_order() {
        let mock = MockRunner::new();
        mock.push_success();
        mock.push_failure(1, "boom");

        let first = mock.run_captured(&CommandSpec::new("a")).unwrap();
        let second = mock.run_captured(&CommandSpec::new("b")).unwrap();
        let third = mock.run_captured(&CommandSpec::new("c")).unwrap();

        assert!(first.success());
        assert_eq!(second.code, Some(1));
        assert!(third.success());
        assert_eq!(mock.rendered_calls(), vec!["a", "b", "c"]);
    }
}
