//! Build the operation set for one invocation and validate it before anything
//! on disk is touched.
//!
//! Steps, in order:
//! - enumerate sources matching the from pattern;
//! - expand each match into its destination;
//! - reject destinations shared by two sources;
//! - check existing destinations and missing parents (pre-flight).

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use ::glob::{glob_with, MatchOptions};
use tracing::{debug, warn};

use crate::config::{Config, DeletionPolicy};
use crate::errors::{Collision, MmvError};
use crate::output;
use crate::pattern::{GlobPattern, Template};
use crate::plan::{path_key, OpKind, Operation};
use crate::prompt::{confirm, Prompter};

/// Operations for one run plus the matches that map onto themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSet {
    pub ops: Vec<Operation>,
    /// Sources whose destination equals the source; dropped from `ops`.
    pub unchanged: Vec<PathBuf>,
}

/// Enumerate existing paths matching the from pattern.
///
/// Unreadable entries are logged and skipped.
pub fn expand_sources(glob: &GlobPattern, hidden: bool) -> Result<Vec<PathBuf>, MmvError> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: !hidden,
    };
    let paths = glob_with(glob.expansion(), options).map_err(|e| MmvError::InvalidPattern {
        pattern: glob.as_str().to_string(),
        reason: e.msg.to_string(),
    })?;

    let mut sources = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => sources.push(path),
            Err(e) => warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable entry"),
        }
    }
    debug!(pattern = glob.as_str(), count = sources.len(), "enumerated sources");
    Ok(sources)
}

fn bad_name(source: &Path, name: impl Into<String>) -> MmvError {
    MmvError::BadNewName {
        source_path: source.to_path_buf(),
        name: name.into(),
    }
}

/// Turn matched sources into operations of `kind`.
///
/// Fails with `NoMatches` when nothing matched and with `Rejected` when any
/// source or expanded name is unusable.
pub fn build_operations(
    glob: &GlobPattern,
    template: &Template,
    sources: &[PathBuf],
    kind: OpKind,
) -> Result<OperationSet, MmvError> {
    let mut set = OperationSet::default();
    let mut problems = Vec::new();
    let mut matched = 0usize;

    for source in sources {
        let Some(text) = source.to_str() else {
            output::print_warn(&format!("{}: skipping name that is not valid UTF-8", source.display()));
            continue;
        };
        let Some(caps) = glob.captures(text) else {
            debug!(src = text, "enumerated path does not match pattern");
            continue;
        };
        matched += 1;
        let expanded = template.expand(&caps);

        // `.` and `..` have no file name to move
        if source.file_name().is_none() || expanded.is_empty() {
            problems.push(bad_name(source, expanded));
            continue;
        }

        let destination = if kind == OpKind::Rename {
            if expanded.contains('/') {
                problems.push(bad_name(source, expanded));
                continue;
            }
            match source.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.join(&expanded),
                _ => PathBuf::from(&expanded),
            }
        } else {
            PathBuf::from(&expanded)
        };

        if path_key(&destination) == path_key(source) {
            output::print_warn(&format!("{} -> {} : no change", source.display(), destination.display()));
            set.unchanged.push(source.clone());
            continue;
        }
        set.ops.push(Operation::new(source.clone(), destination, kind));
    }

    if matched == 0 {
        return Err(MmvError::NoMatches {
            from: glob.as_str().to_string(),
            to: template.as_str().to_string(),
        });
    }
    if !problems.is_empty() {
        return Err(MmvError::Rejected(problems));
    }
    Ok(set)
}

/// Reject any two operations writing the same destination.
pub fn check_collisions(ops: &[Operation]) -> Result<(), MmvError> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::with_capacity(ops.len());
    let mut collisions = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        match seen.get(&path_key(&op.destination)) {
            Some(&j) => collisions.push(Collision {
                first: ops[j].source.clone(),
                second: op.source.clone(),
                destination: op.destination.clone(),
            }),
            None => {
                seen.insert(path_key(&op.destination), i);
            }
        }
    }
    if collisions.is_empty() {
        Ok(())
    } else {
        Err(MmvError::Collisions(collisions))
    }
}

/// Check destinations and their parent directories once, before mutation.
///
/// Approved overwrites are recorded in `Operation::replaces`. A destination
/// that another operation moves away does not count as existing.
pub fn preflight(
    ops: &mut [Operation],
    cfg: &Config,
    prompter: &mut dyn Prompter,
) -> Result<(), MmvError> {
    let vacated: HashSet<PathBuf> = ops
        .iter()
        .filter(|op| op.kind.vacates_source())
        .map(|op| path_key(&op.source))
        .collect();

    let mut problems = Vec::new();
    for op in ops.iter_mut() {
        if !vacated.contains(&path_key(&op.destination)) {
            if let Ok(meta) = fs::symlink_metadata(&op.destination) {
                if meta.is_dir() {
                    problems.push(MmvError::DestinationExists(op.destination.clone()));
                    continue;
                }
                let approved = match (op.kind, cfg.deletion) {
                    (OpKind::Overwrite, _) | (_, DeletionPolicy::Force) => true,
                    (_, DeletionPolicy::Protect) => false,
                    (_, DeletionPolicy::Ask) => confirm(
                        prompter,
                        &format!(
                            "{} -> {} : delete old {}?",
                            op.source.display(),
                            op.destination.display(),
                            op.destination.display()
                        ),
                    ),
                };
                if !approved {
                    problems.push(MmvError::DestinationExists(op.destination.clone()));
                    continue;
                }
                op.replaces = true;
            }
        }

        if !cfg.makedirs {
            if let Some(parent) = op.destination.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    problems.push(MmvError::MissingParentDirectory(op.destination.clone()));
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(MmvError::Rejected(problems))
    }
}
