//! Test environment builder for isolated lempkit testing.
//!
//! Provides `TestEnv` - a temp workspace with a stub `docker` executable on
//! PATH that logs every invocation and fakes the side effects lempkit
//! observes (the scaffold's settings file, the generated app key), plus a
//! live TCP listener standing in for the published proxy port.

use std::fs;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Result of running a lempkit CLI command.
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Stub `docker` executable. Logs `docker <args>` per invocation, simulates
/// the bind-mount side effects of `composer create-project` and
/// `artisan key:generate`, and answers `ps`/`logs` with canned output.
/// `LEMPKIT_STUB_FAIL` makes any invocation whose argument line contains
/// the given substring exit 1.
const DOCKER_STUB: &str = r#"#!/bin/sh
if [ -n "$LEMPKIT_STUB_LOG" ]; then
    echo "docker $*" >> "$LEMPKIT_STUB_LOG"
fi
if [ -n "$LEMPKIT_STUB_FAIL" ]; then
    case "$*" in
        *"$LEMPKIT_STUB_FAIL"*)
            echo "stub: simulated failure" >&2
            exit 1
            ;;
    esac
fi
case "$*" in
    *create-project*)
        mkdir -p "$LEMPKIT_STUB_WWW"
        printf 'APP_NAME=Laravel\nAPP_KEY=\n\nDB_CONNECTION=mysql\nDB_HOST=127.0.0.1\nDB_PORT=3306\nDB_DATABASE=laravel\nDB_USERNAME=root\nDB_PASSWORD=\n' > "$LEMPKIT_STUB_WWW/.env.example"
        ;;
    *key:generate*)
        sed -i 's|^APP_KEY=.*|APP_KEY=base64:c3R1YmtleXN0dWJrZXlzdHVia2V5c3R1YmtleQ==|' "$LEMPKIT_STUB_WWW/.env"
        ;;
    *" ps")
        echo "NAME           STATUS"
        echo "lemp-nginx     running"
        echo "lemp-php       running"
        echo "lemp-mariadb   running"
        ;;
    *" logs "*)
        echo "stub log: $*"
        ;;
esac
exit 0
"#;

/// Isolated workspace with a stubbed container runtime.
pub struct TestEnv {
    pub workspace: TempDir,
    bin_dir: TempDir,
    // Held so the proxy readiness probe has something to connect to.
    _listener: TcpListener,
    pub http_port: u16,
    lempkit_bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("create workspace tempdir");
        let bin_dir = TempDir::new().expect("create bin tempdir");

        let stub = bin_dir.path().join("docker");
        fs::write(&stub, DOCKER_STUB).expect("write docker stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&stub, fs::Permissions::from_mode(0o755))
                .expect("chmod docker stub");
        }

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind proxy stand-in");
        let http_port = listener.local_addr().unwrap().port();

        let env = TestEnv {
            workspace,
            bin_dir,
            _listener: listener,
            http_port,
            lempkit_bin: PathBuf::from(env!("CARGO_BIN_EXE_lempkit")),
        };
        env.write_config(&format!("[server]\nhttp_port = {http_port}\n"));
        env
    }

    /// Overwrite the workspace `lempkit.toml`.
    pub fn write_config(&self, content: &str) {
        fs::write(self.path("lempkit.toml"), content).expect("write lempkit.toml");
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.workspace.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("read {relative}: {e}"))
    }

    /// The stub's invocation log, one `docker <args>` line per call.
    pub fn docker_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    fn log_path(&self) -> PathBuf {
        self.path("docker-invocations.log")
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let path = format!(
            "{}:{}",
            self.bin_dir.path().display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let mut cmd = Command::new(&self.lempkit_bin);
        cmd.current_dir(self.workspace.path())
            .args(args)
            .env("PATH", path)
            .env("LEMPKIT_STUB_LOG", self.log_path())
            .env("LEMPKIT_STUB_WWW", self.path("www"));

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("failed to execute lempkit");
        output_to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
