//! Application installer.
//!
//! Scaffolds a fresh Laravel application into the shared volume and wires
//! its settings file to the database credentials. Strictly ordered; the
//! first failing step aborts the rest.

use std::fs;
use std::path::Path;

use crate::compose::Compose;
use crate::credentials::Credentials;
use crate::emit;
use crate::envfile::EnvFile;
use crate::error::{LempError, LempResult};
use crate::readiness::{wait_until, RetryPolicy};
use crate::runner::CommandRunner;
use crate::workspace::Workspace;

pub struct Installer<'a> {
    compose: &'a Compose,
    runner: &'a dyn CommandRunner,
    workspace: &'a Workspace,
    scaffold_wait: RetryPolicy,
}

impl<'a> Installer<'a> {
    pub fn new(
        compose: &'a Compose,
        runner: &'a dyn CommandRunner,
        workspace: &'a Workspace,
        scaffold_wait: RetryPolicy,
    ) -> Self {
        Installer {
            compose,
            runner,
            workspace,
            scaffold_wait,
        }
    }

    /// Run the full install sequence. Destroys any existing application
    /// directory first.
    pub fn run(&self, credentials: &Credentials) -> LempResult<()> {
        self.workspace.clear_app_dir()?;

        self.compose.exec(
            self.runner,
            "php",
            &[
                "composer",
                "create-project",
                "--prefer-dist",
                "laravel/laravel",
                ".",
            ],
        )?;

        // The scaffold lands on the host through the bind mount; wait for
        // its example settings file rather than sleeping a fixed delay.
        let example = self.workspace.settings_example();
        wait_until("scaffolded settings file", &self.scaffold_wait, || {
            example.exists()
        })?;

        fs::copy(&example, self.workspace.settings_file())?;
        self.compose.exec(
            self.runner,
            "php",
            &["php", "artisan", "key:generate", "--force"],
        )?;

        apply_credentials(&self.workspace.settings_file(), credentials)?;

        self.compose
            .exec(self.runner, "php", &["mkdir", "-p", "storage", "bootstrap/cache"])?;
        // Wide open on purpose: this is a disposable dev environment.
        self.compose.exec(
            self.runner,
            "php",
            &["chmod", "-R", "777", "storage", "bootstrap/cache"],
        )?;

        Ok(())
    }
}

/// Point the application's settings file at the provisioned database.
///
/// The file is parsed into a structured key/value model and exactly three
/// keys are mutated; a key the scaffold's file does not contain is appended
/// instead of silently skipped.
pub fn apply_credentials(path: &Path, credentials: &Credentials) -> LempResult<()> {
    if !path.exists() {
        return Err(LempError::SettingsMissing {
            path: path.to_path_buf(),
        });
    }
    let mut env = EnvFile::parse(&fs::read_to_string(path)?);
    env.set("DB_DATABASE", &credentials.database);
    env.set("DB_USERNAME", &credentials.username);
    env.set("DB_PASSWORD", &credentials.password);
    emit::atomic_write(path, &env.to_string())
}
