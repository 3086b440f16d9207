//! One invocation end to end: parse both patterns, build and check the
//! operation set, classify it, then execute.
//!
//! Everything up to execution is free of side effects on the filesystem, so
//! any error returned before `execute` means nothing was changed.

use tracing::info;

use crate::config::{Config, DeletionPolicy};
use crate::errors::MmvError;
use crate::executor::{execute, ExecutionReport};
use crate::pattern::{GlobPattern, Template};
use crate::plan::{build_operations, check_collisions, classify, expand_sources, preflight};
use crate::prompt::Prompter;

/// Run `from` -> `to` under `cfg`.
///
/// Returns the execution report even when individual operations failed; use
/// `ExecutionReport::into_result` to turn failures into an error.
pub fn run(cfg: &Config, from: &str, to: &str, prompter: &mut dyn Prompter) -> Result<ExecutionReport, MmvError> {
    let glob = GlobPattern::parse(from)?;
    let template = Template::parse(to, glob.wildcards())?;

    let sources = expand_sources(&glob, cfg.hidden)?;
    let set = build_operations(&glob, &template, &sources, cfg.kind)?;
    let mut ops = set.ops;
    check_collisions(&ops)?;
    let classification = classify(&ops)?;

    // a dry run shows what would be asked instead of asking
    let mut checks = cfg.clone();
    if cfg.dry_run() && checks.deletion == DeletionPolicy::Ask {
        checks.deletion = DeletionPolicy::Force;
    }
    preflight(&mut ops, &checks, prompter)?;

    info!(
        operations = ops.len(),
        unchanged = set.unchanged.len(),
        staged = classification.with_temp().len(),
        kind = %cfg.kind,
        "plan ready"
    );
    Ok(execute(&ops, &classification, cfg, prompter))
}
