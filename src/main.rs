//! lempkit CLI - LEMP development environment bootstrapper
//!
//! Usage: lempkit [COMMAND]
//!
//! Commands:
//!   up      Full bootstrap (default when no command is given)
//!   render  Generate credentials and configuration files only
//!   status  Show container status and recent logs
//!   down    Tear down the environment including volumes

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use lempkit::config::{ConfigWarning, Settings};
use lempkit::error::LempError;
use lempkit::runner::ProcessRunner;
use lempkit::workflow::{self, EventSink, HumanSink, JsonSink};
use lempkit::workspace::Workspace;

/// lempkit - Dockerized LEMP development environment bootstrapper
#[derive(Parser, Debug)]
#[command(name = "lempkit")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Running 'lempkit' without a command performs the full bootstrap.")]
struct Cli {
    /// NDJSON event output for CI
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace directory
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full bootstrap: render configs, provision containers, scaffold the
    /// application, customize the landing page, report status
    Up,

    /// Generate credentials and the three configuration files, nothing else
    Render,

    /// Show container status and recent logs for each service
    Status,

    /// Tear down the environment, removing containers and volumes
    Down,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace = Workspace::new(&cli.workspace);
    let (settings, warnings) = Settings::load_or_default(workspace.root());
    print_warnings(&warnings);

    let mut sink: Box<dyn EventSink> = if cli.json {
        Box::new(JsonSink::stdout())
    } else {
        Box::new(HumanSink::new(cli.verbose))
    };

    let result = match cli.command.unwrap_or(Commands::Up) {
        Commands::Up => {
            // Stream build output through only when a human is watching.
            let stream = !cli.json;
            workflow::bootstrap(
                &workspace,
                &settings,
                &ProcessRunner::new(),
                sink.as_mut(),
                stream,
            )
        }
        Commands::Render => {
            workflow::render(&workspace, &settings, sink.as_mut()).map(|_| ())
        }
        Commands::Status => {
            workflow::report(&workspace, &settings, &ProcessRunner::new(), sink.as_mut())
        }
        Commands::Down => {
            workflow::teardown(&workspace, &ProcessRunner::new(), sink.as_mut())
        }
    };

    if let Err(err) = result {
        report_failure(&err, cli.json);
        std::process::exit(1);
    }
    Ok(())
}

fn print_warnings(warnings: &[ConfigWarning]) {
    for warning in warnings {
        let location = match warning.line {
            Some(line) => format!("{}:{line}", warning.file.display()),
            None => warning.file.display().to_string(),
        };
        match &warning.suggestion {
            Some(suggestion) => eprintln!(
                "⚠ unknown config key '{}' in {location} (did you mean '{suggestion}'?)",
                warning.key
            ),
            None => eprintln!("⚠ unknown config key '{}' in {location}", warning.key),
        }
    }
}

fn report_failure(err: &LempError, json: bool) {
    if json {
        let value = match err {
            LempError::Step { step, source } => serde_json::json!({
                "event": "error",
                "step": step.name(),
                "error": source.to_string(),
            }),
            other => serde_json::json!({
                "event": "error",
                "error": other.to_string(),
            }),
        };
        println!("{value}");
    } else {
        match err {
            LempError::Step { step, source } => {
                eprintln!("✗ bootstrap failed at step '{step}': {source}");
            }
            other => eprintln!("✗ {other}"),
        }
    }
}
