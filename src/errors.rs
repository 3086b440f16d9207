//! Typed error definitions for mmv.
//! One enum covers the whole run so the top-level handler can decide reporting and exit status.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::plan::{OpKind, Operation};

/// Exit status for fatal configuration, matching, pre-flight and operation failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status after a user interrupt (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Two operations that would write the same destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub first: PathBuf,
    pub second: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Error)]
pub enum MmvError {
    #[error("at most one {category} is allowed")]
    ConflictingOptions { category: &'static str },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid from pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("to pattern contains invalid glob reference #{index}")]
    InvalidReference { index: usize },

    #[error("no matches for {from} -> {to}")]
    NoMatches { from: String, to: String },

    #[error("stopping, as there are multiple \"from\" files with the same \"to\" name")]
    Collisions(Vec<Collision>),

    #[error("stopping, as {source_path} would be overwritten by {writer} before it is used by {kind}")]
    SourceOverwritten {
        source_path: PathBuf,
        writer: PathBuf,
        kind: OpKind,
    },

    #[error("destination {0} already exists")]
    DestinationExists(PathBuf),

    #[error("parent directory of destination {0} does not exist")]
    MissingParentDirectory(PathBuf),

    #[error("{source_path} -> {name} : bad new name")]
    BadNewName { source_path: PathBuf, name: String },

    #[error("stopping, as {} problem(s) were found; nothing was changed", .0.len())]
    Rejected(Vec<MmvError>),

    #[error("could not {} {} -> {}: {source}", .op.kind, .op.source.display(), .op.destination.display())]
    Operation {
        op: Operation,
        #[source]
        source: io::Error,
    },

    #[error("{failed} operation(s) failed")]
    OperationsFailed { failed: usize },

    #[error("operation interrupted by user")]
    Interrupted,
}

/// Coarse classification of where in the run an error arose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Matching,
    Preflight,
    Execution,
    Interrupted,
}

impl MmvError {
    /// Process exit status for this error.
    pub fn code(&self) -> i32 {
        match self {
            MmvError::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MmvError::ConflictingOptions { .. }
            | MmvError::Config(_)
            | MmvError::InvalidPattern { .. }
            | MmvError::InvalidReference { .. } => ErrorKind::Configuration,
            MmvError::NoMatches { .. }
            | MmvError::Collisions(_)
            | MmvError::SourceOverwritten { .. } => ErrorKind::Matching,
            MmvError::DestinationExists(_)
            | MmvError::MissingParentDirectory(_)
            | MmvError::BadNewName { .. }
            | MmvError::Rejected(_) => ErrorKind::Preflight,
            MmvError::Operation { .. } | MmvError::OperationsFailed { .. } => ErrorKind::Execution,
            MmvError::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// True when the error was raised before any filesystem mutation.
    pub fn is_fatal_before_mutation(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Execution | ErrorKind::Interrupted)
    }
}
