//! lempkit - Dockerized LEMP development environment bootstrapper
//!
//! lempkit generates the configuration for a three-service LEMP stack
//! (nginx reverse proxy, PHP-FPM runtime, MariaDB database), provisions it
//! through Docker Compose, scaffolds a fresh Laravel application inside the
//! runtime container, and wires the application settings to the generated
//! database credentials.

pub mod compose;
pub mod config;
pub mod credentials;
pub mod emit;
pub mod envfile;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod readiness;
pub mod reporter;
pub mod runner;
pub mod templates;
pub mod workflow;
pub mod workspace;

// Re-exports for convenience
pub use compose::Compose;
pub use config::Settings;
pub use credentials::{Credentials, CredentialsOrigin};
pub use envfile::EnvFile;
pub use error::{LempError, LempResult};
pub use runner::{CommandRunner, CommandSpec, ProcessRunner};
pub use workflow::{bootstrap, EventSink, HumanSink, JsonSink, Step};
pub use workspace::Workspace;
