//! CLI definition and parsing.
//! Defines Args and folds the flags into a Config.
//!
//! Notes:
//! - `-h` means `--hidden`, so help is only available as `--help`.
//! - Flags of one category (mode, deletion, bad-operation, report) exclude each other;
//!   that check happens in `apply_overrides` so it can report which category clashed.
//! - The default mode follows the invocation name: `mcp` copies, `mln` hard-links.

use clap::{ArgAction, Parser, ValueHint};
use std::path::{Path, PathBuf};

use crate::config::{BadOpPolicy, Config, DeletionPolicy, LogLevel, ReportMode};
use crate::errors::MmvError;
use crate::plan::OpKind;

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    s.parse()
}

/// Move, copy or link multiple files by wildcard patterns.
///
/// Use #[l|u]N in the TO pattern to get the string matched by the Nth FROM
/// pattern wildcard [lowercased|uppercased]. Patterns should be quoted.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mmv", version, about, disable_help_flag = true)]
pub struct Args {
    /// Pattern selecting the files to act on
    #[arg(value_name = "FROM", required_unless_present = "print_config")]
    pub from: Option<String>,

    /// Template for the new names
    #[arg(value_name = "TO", required_unless_present = "print_config")]
    pub to: Option<String>,

    /// Move source files to target names (default)
    #[arg(short = 'm', long = "move")]
    pub mode_move: bool,

    /// Copy source files to target names, then delete the sources
    #[arg(short = 'x', long = "copydel")]
    pub mode_copydel: bool,

    /// Rename sources within their own directories
    #[arg(short = 'r', long = "rename")]
    pub mode_rename: bool,

    /// Copy source files to target names
    #[arg(short = 'c', long = "copy")]
    pub mode_copy: bool,

    /// Overwrite targets with source files, keeping target permissions
    #[arg(short = 'o', long = "overwrite")]
    pub mode_overwrite: bool,

    /// Hard-link target names to source files
    #[arg(short = 'l', long = "hardlink")]
    pub mode_hardlink: bool,

    /// Symlink target names to source files
    #[arg(short = 's', long = "symlink")]
    pub mode_symlink: bool,

    /// Let wildcards match names starting with '.'
    #[arg(short = 'h', long)]
    pub hidden: bool,

    /// Create missing directories for targets
    #[arg(short = 'D', long)]
    pub makedirs: bool,

    /// Overwrite existing targets without asking
    #[arg(short = 'd', long)]
    pub force: bool,

    /// Refuse to overwrite existing targets
    #[arg(short = 'p', long)]
    pub protect: bool,

    /// Continue after a failed operation
    #[arg(short = 'g', long = "go")]
    pub go: bool,

    /// Stop after a failed operation
    #[arg(short = 't', long = "terminate")]
    pub terminate: bool,

    /// Print each operation as it is performed
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the operations without performing them
    #[arg(short = 'n', long = "dryrun")]
    pub dry_run: bool,

    /// Diagnostic log level: quiet, normal, info, debug
    #[arg(long, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    /// Also write the diagnostic log to this file
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit the diagnostic log as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the config file location in use and exit
    #[arg(long)]
    pub print_config: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// At most one of `flags` may be set.
fn pick<T: Copy>(category: &'static str, flags: &[(bool, T)]) -> Result<Option<T>, MmvError> {
    let mut chosen = flags.iter().filter(|(on, _)| *on).map(|(_, v)| *v);
    let first = chosen.next();
    if chosen.next().is_some() {
        return Err(MmvError::ConflictingOptions { category });
    }
    Ok(first)
}

impl Args {
    /// Apply CLI overrides to a Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) -> Result<(), MmvError> {
        let kind = pick(
            "mode option (-m -x -r -c -o -l -s)",
            &[
                (self.mode_move, OpKind::Move),
                (self.mode_copydel, OpKind::CopyDelete),
                (self.mode_rename, OpKind::Rename),
                (self.mode_copy, OpKind::Copy),
                (self.mode_overwrite, OpKind::Overwrite),
                (self.mode_hardlink, OpKind::HardLink),
                (self.mode_symlink, OpKind::SymLink),
            ],
        )?;
        let deletion = pick(
            "deletion option (-d -p)",
            &[(self.force, DeletionPolicy::Force), (self.protect, DeletionPolicy::Protect)],
        )?;
        let bad_ops = pick(
            "bad-operation option (-g -t)",
            &[(self.go, BadOpPolicy::Skip), (self.terminate, BadOpPolicy::Abort)],
        )?;
        let report = pick(
            "report option (-v -n)",
            &[(self.verbose, ReportMode::Verbose), (self.dry_run, ReportMode::DryRun)],
        )?;

        if let Some(kind) = kind {
            cfg.kind = kind;
        }
        match (deletion, bad_ops) {
            (Some(d), _) => cfg.deletion = d,
            // unattended runs must not stop to ask
            (None, Some(_)) if cfg.deletion == DeletionPolicy::Ask => cfg.deletion = DeletionPolicy::Protect,
            _ => {}
        }
        if let Some(b) = bad_ops {
            cfg.bad_ops = b;
        }
        if let Some(r) = report {
            cfg.report = r;
        }
        if self.hidden {
            cfg.hidden = true;
        }
        if self.makedirs {
            cfg.makedirs = true;
        }
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        if self.json {
            cfg.json = true;
        }
        Ok(())
    }
}

/// Name the program was invoked as (`mmv`, `mcp`, `mln`, ...).
pub fn invocation_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|a| Path::new(&a).file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "mmv".to_string())
}

/// Default operation kind for an invocation name.
pub fn default_kind_for(program: &str) -> OpKind {
    match program {
        "mcp" => OpKind::Copy,
        "mln" => OpKind::HardLink,
        _ => OpKind::Move,
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("mmv").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn short_h_is_hidden() {
        let a = args(&["-h", "*", "#1"]);
        assert!(a.hidden);
        assert_eq!(a.from.as_deref(), Some("*"));
    }

    #[test]
    fn one_flag_per_category() {
        let mut cfg = Config::default();
        let err = args(&["-c", "-l", "a", "b"]).apply_overrides(&mut cfg).unwrap_err();
        assert!(matches!(err, MmvError::ConflictingOptions { .. }));
        assert!(args(&["-v", "-n", "a", "b"]).apply_overrides(&mut cfg).is_err());
        assert!(args(&["-d", "-p", "a", "b"]).apply_overrides(&mut cfg).is_err());
        assert!(args(&["-g", "-t", "a", "b"]).apply_overrides(&mut cfg).is_err());
    }

    #[test]
    fn overrides_fill_config() {
        let mut cfg = Config::with_kind(default_kind_for("mcp"));
        assert_eq!(cfg.kind, OpKind::Copy);
        args(&["-r", "-D", "-d", "-n", "--log-level", "info", "a", "b"])
            .apply_overrides(&mut cfg)
            .unwrap();
        assert_eq!(cfg.kind, OpKind::Rename);
        assert!(cfg.makedirs);
        assert_eq!(cfg.deletion, DeletionPolicy::Force);
        assert_eq!(cfg.report, ReportMode::DryRun);
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn bad_op_policy_implies_protect() {
        let mut cfg = Config::default();
        args(&["-g", "a", "b"]).apply_overrides(&mut cfg).unwrap();
        assert_eq!(cfg.bad_ops, BadOpPolicy::Skip);
        assert_eq!(cfg.deletion, DeletionPolicy::Protect);

        let mut cfg = Config::default();
        args(&["-t", "-d", "a", "b"]).apply_overrides(&mut cfg).unwrap();
        assert_eq!(cfg.deletion, DeletionPolicy::Force);
    }

    #[test]
    fn patterns_required_unless_printing_config() {
        assert!(Args::try_parse_from(["mmv", "a"]).is_err());
        assert!(Args::try_parse_from(["mmv", "--print-config"]).is_ok());
    }

    #[test]
    fn invocation_name_picks_mode() {
        assert_eq!(default_kind_for("mln"), OpKind::HardLink);
        assert_eq!(default_kind_for("mmv"), OpKind::Move);
    }
}
