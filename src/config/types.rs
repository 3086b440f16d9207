//! Core configuration types.
//! - Config holds the run-scoped settings with sensible defaults.
//! - Each policy is a closed set with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::plan::OpKind;

/// Program-defined verbosity levels for the diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// No diagnostic log (default); user-facing output is unaffected
    #[default]
    Quiet,
    /// Warnings and notable events
    Normal,
    /// Per-operation detail
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "off" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// What to do when a destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionPolicy {
    /// Ask before overwriting each existing destination
    #[default]
    Ask,
    /// Overwrite without asking (`-d`)
    Force,
    /// Refuse and stop (`-p`)
    Protect,
}

impl FromStr for DeletionPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ask" => Ok(DeletionPolicy::Ask),
            "force" | "delete" => Ok(DeletionPolicy::Force),
            "protect" | "abort" => Ok(DeletionPolicy::Protect),
            other => Err(format!("invalid deletion policy: '{other}' (expected ask|force|protect)")),
        }
    }
}

/// What to do after an operation fails during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BadOpPolicy {
    /// Ask whether to continue, stop or undo
    #[default]
    Ask,
    /// Report and carry on (`-g`)
    Skip,
    /// Report and stop (`-t`)
    Abort,
}

impl FromStr for BadOpPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ask" => Ok(BadOpPolicy::Ask),
            "skip" | "go" => Ok(BadOpPolicy::Skip),
            "abort" | "terminate" => Ok(BadOpPolicy::Abort),
            other => Err(format!("invalid bad-operation policy: '{other}' (expected ask|skip|abort)")),
        }
    }
}

/// How much of the plan to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    Quiet,
    /// Print each step as it is performed
    Verbose,
    /// Print the steps without performing them
    DryRun,
}

/// Runtime configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Operation kind applied to every matched file
    pub kind: OpKind,
    /// Let wildcards match names starting with '.'
    pub hidden: bool,
    /// Create missing destination directories
    pub makedirs: bool,
    pub deletion: DeletionPolicy,
    pub bad_ops: BadOpPolicy,
    pub report: ReportMode,
    /// Diagnostic log verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Emit the diagnostic log as JSON
    pub json: bool,
    /// Directory in which the run's scratch directory is created
    /// (default: the directory of the first staged source)
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    /// Defaults with the given operation kind.
    pub fn with_kind(kind: OpKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn dry_run(&self) -> bool {
        self.report == ReportMode::DryRun
    }
}
