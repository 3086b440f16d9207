//! Core library for `mmv`.
//!
//! Moves, copies or links many files at once: a FROM glob selects files, a TO
//! template builds each new name from the wildcard matches, and the resulting
//! batch is checked and ordered so that chains and cycles of renames are safe.
//!
//! The binary is a thin wrapper around [`app::run`]; everything it does is
//! reachable from here so tests can drive a whole batch via [`run::run`].

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod executor;
pub mod fs_ops;
pub mod logging;
pub mod output;
pub mod pattern;
pub mod plan;
pub mod platform;
pub mod prompt;
pub mod run;
pub mod shutdown;

pub use config::{BadOpPolicy, Config, DeletionPolicy, LogLevel, ReportMode};
pub use errors::{Collision, ErrorKind, MmvError, EXIT_FAILURE, EXIT_INTERRUPTED};
pub use executor::{ExecutionReport, Outcome};
pub use pattern::{GlobPattern, Template};
pub use plan::{OpKind, Operation};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};

/// Crate version (from Cargo).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
