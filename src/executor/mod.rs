//! Staged execution of a classified operation set.
//!
//! Phases always run in this order:
//! 1. every WithTemp operation moves its source to a fresh temporary name;
//! 2. every Clashing operation runs directly (its destination was just vacated);
//! 3. every Free operation runs directly;
//! 4. every WithTemp operation moves its temporary to the real destination.
//!
//! A failed operation never takes another file with it: any later step that
//! would write over the still-present source of a failed or skipped operation
//! is skipped as well. Files left in the scratch directory when a run stops
//! early are moved back before the directory is removed.

pub mod temp;
mod undo;

pub use temp::TempAllocator;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::{BadOpPolicy, Config, ReportMode};
use crate::errors::MmvError;
use crate::fs_ops;
use crate::output;
use crate::plan::{path_key, Classification, OpKind, Operation};
use crate::prompt::Prompter;
use crate::shutdown;

/// One side of a step: a real path or a name in the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Real(PathBuf),
    Staged(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Real(p) => write!(f, "{}", p.display()),
            Endpoint::Staged(name) => f.write_str(&temp::display_name(name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InitialTemp,
    Clash,
    Free,
    FinalTemp,
}

/// A single filesystem action derived from an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Index of the operation in the operation set.
    pub op: usize,
    pub phase: Phase,
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Step {
    /// Plan line, `SOURCE -> DESTINATION`, with ` (*)` when an existing file is replaced.
    pub fn line(&self, ops: &[Operation]) -> String {
        let replaces = matches!(self.to, Endpoint::Real(_)) && ops[self.op].replaces;
        format!("{} -> {}{}", self.from, self.to, if replaces { " (*)" } else { "" })
    }

    /// True when performing the step leaves nothing at `from`.
    fn vacates(&self, ops: &[Operation]) -> bool {
        self.phase == Phase::InitialTemp || self.phase == Phase::FinalTemp || ops[self.op].kind.vacates_source()
    }
}

/// Lay out the four phases. Temporary names are allocated but not created.
pub fn schedule(ops: &[Operation], classification: &Classification, alloc: &TempAllocator) -> Vec<Step> {
    let staged: Vec<(usize, String)> = classification
        .with_temp()
        .into_iter()
        .map(|i| (i, alloc.allocate(&ops[i].destination)))
        .collect();

    let mut steps = Vec::with_capacity(ops.len() + staged.len());
    for (i, name) in &staged {
        steps.push(Step {
            op: *i,
            phase: Phase::InitialTemp,
            from: Endpoint::Real(ops[*i].source.clone()),
            to: Endpoint::Staged(name.clone()),
        });
    }
    for (phase, indices) in [(Phase::Clash, classification.clashing()), (Phase::Free, classification.free())] {
        for i in indices {
            steps.push(Step {
                op: i,
                phase,
                from: Endpoint::Real(ops[i].source.clone()),
                to: Endpoint::Real(ops[i].destination.clone()),
            });
        }
    }
    for (i, name) in staged {
        steps.push(Step {
            op: i,
            phase: Phase::FinalTemp,
            from: Endpoint::Staged(name),
            to: Endpoint::Real(ops[i].destination.clone()),
        });
    }
    steps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Completed,
    DryRun,
    /// Stopped after a failure, completed steps left in place.
    Stopped,
    /// Stopped after a failure and completed steps rolled back.
    Undone,
    Interrupted,
}

/// What happened during one execution.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Plan lines printed (dry-run or verbose).
    pub lines: Vec<String>,
    /// Operations carried out in full.
    pub completed: usize,
    pub failed: usize,
    /// Operations not attempted because they would overwrite a file still needed.
    pub skipped: usize,
    /// Steps reversed by an undo.
    pub undone: usize,
    pub outcome: Outcome,
    /// Scratch directory left behind holding files that could not be restored.
    pub kept_scratch: Option<PathBuf>,
}

impl ExecutionReport {
    /// Turn an unsuccessful run into its error.
    pub fn into_result(self) -> Result<Self, MmvError> {
        if self.outcome == Outcome::Interrupted {
            Err(MmvError::Interrupted)
        } else if self.failed > 0 || self.skipped > 0 {
            Err(MmvError::OperationsFailed {
                failed: self.failed + self.skipped,
            })
        } else {
            Ok(self)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpState {
    Pending,
    Parked,
    Done,
    Failed,
    Skipped,
}

enum Choice {
    Continue,
    Stop,
    Undo,
}

struct Execution<'a> {
    ops: &'a [Operation],
    cfg: &'a Config,
    prompter: &'a mut dyn Prompter,
    alloc: TempAllocator,
    states: Vec<OpState>,
    /// Operation index -> temporary name, while the file sits in the scratch directory.
    parked: BTreeMap<usize, String>,
    /// Paths that must not be written: sources of operations that did not happen.
    blocked: HashSet<PathBuf>,
    /// Indices of completed steps, in order.
    journal: Vec<usize>,
    report: ExecutionReport,
}

/// Run `ops` in four phases according to `classification`.
pub fn execute(
    ops: &[Operation],
    classification: &Classification,
    cfg: &Config,
    prompter: &mut dyn Prompter,
) -> ExecutionReport {
    // next to the first staged source unless configured: that directory exists
    // (destination parents may only appear under -D) and staging stays a rename
    let base = cfg.scratch_dir.clone().unwrap_or_else(|| {
        classification
            .with_temp()
            .first()
            .and_then(|&i| ops[i].source.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });
    let alloc = TempAllocator::new_in(base);
    let steps = schedule(ops, classification, &alloc);

    if cfg.report == ReportMode::DryRun {
        let mut report = ExecutionReport {
            outcome: Outcome::DryRun,
            ..Default::default()
        };
        for step in &steps {
            let line = step.line(ops);
            output::print_user(&line);
            report.lines.push(line);
        }
        return report;
    }

    let mut run = Execution {
        ops,
        cfg,
        prompter,
        alloc,
        states: vec![OpState::Pending; ops.len()],
        parked: BTreeMap::new(),
        blocked: HashSet::new(),
        journal: Vec::new(),
        report: ExecutionReport::default(),
    };
    run.run_steps(&steps);
    run.finish()
}

impl Execution<'_> {
    fn run_steps(&mut self, steps: &[Step]) {
        for (idx, step) in steps.iter().enumerate() {
            if shutdown::is_requested() {
                warn!("shutdown requested; stopping before next step");
                self.report.outcome = Outcome::Interrupted;
                return;
            }
            if matches!(self.states[step.op], OpState::Failed | OpState::Skipped) {
                continue;
            }
            if let Endpoint::Real(dest) = &step.to {
                if self.blocked.contains(&path_key(dest)) {
                    output::print_warn(&format!(
                        "{} : skipped, as {} is still in place",
                        step.line(self.ops),
                        dest.display()
                    ));
                    self.skip(step.op);
                    continue;
                }
            }

            match self.perform(step) {
                Ok(()) => self.completed(idx, step),
                Err(e) => {
                    let interrupted = e.kind() == io::ErrorKind::Interrupted && shutdown::is_requested();
                    self.failed(step, e);
                    if interrupted {
                        self.report.outcome = Outcome::Interrupted;
                        return;
                    }
                    match self.choose() {
                        Choice::Continue => {}
                        Choice::Stop => {
                            self.report.outcome = Outcome::Stopped;
                            return;
                        }
                        Choice::Undo => {
                            let journal = std::mem::take(&mut self.journal);
                            self.report.undone =
                                undo::rollback(steps, &journal, self.ops, &mut self.alloc, &mut self.parked);
                            self.report.outcome = Outcome::Undone;
                            return;
                        }
                    }
                }
            }
        }
    }

    fn perform(&mut self, step: &Step) -> io::Result<()> {
        let ops = self.ops;
        let op = &ops[step.op];
        if let Endpoint::Real(dest) = &step.to {
            if self.cfg.makedirs {
                if let Some(parent) = dest.parent() {
                    fs_ops::make_directories(parent)?;
                }
            }
        }
        match (&step.from, &step.to) {
            (Endpoint::Real(src), Endpoint::Staged(name)) => {
                let tmp = self.alloc.resolve(name)?;
                fs_ops::apply(OpKind::Move, src, &tmp, false)
            }
            (Endpoint::Staged(name), Endpoint::Real(dest)) => {
                let tmp = self.alloc.resolve(name)?;
                fs_ops::apply(OpKind::Move, &tmp, dest, op.replaces)
            }
            (Endpoint::Real(src), Endpoint::Real(dest)) => fs_ops::apply(op.kind, src, dest, op.replaces),
            (Endpoint::Staged(_), Endpoint::Staged(_)) => Err(io::Error::other("step between two temporary names")),
        }
    }

    fn completed(&mut self, idx: usize, step: &Step) {
        info!(src = %step.from, dest = %step.to, phase = ?step.phase, "done");
        self.journal.push(idx);
        match (step.phase, &step.to) {
            (Phase::InitialTemp, Endpoint::Staged(name)) => {
                self.parked.insert(step.op, name.clone());
                self.states[step.op] = OpState::Parked;
            }
            _ => {
                self.parked.remove(&step.op);
                self.states[step.op] = OpState::Done;
                self.report.completed += 1;
            }
        }
        if self.cfg.report == ReportMode::Verbose {
            let line = format!("{} : done", step.line(self.ops));
            output::print_user(&line);
            self.report.lines.push(line);
        }
    }

    fn failed(&mut self, step: &Step, source: io::Error) {
        let op = &self.ops[step.op];
        error!(src = %step.from, dest = %step.to, error = %source, "operation failed");
        if self.states[step.op] == OpState::Pending || !step.vacates(self.ops) {
            self.blocked.insert(path_key(&op.source));
        }
        self.states[step.op] = OpState::Failed;
        self.report.failed += 1;
        let err = MmvError::Operation { op: op.clone(), source };
        output::print_error(&err.to_string());
    }

    fn skip(&mut self, op: usize) {
        if self.states[op] == OpState::Pending {
            self.blocked.insert(path_key(&self.ops[op].source));
        }
        self.states[op] = OpState::Skipped;
        self.report.skipped += 1;
    }

    fn choose(&mut self) -> Choice {
        match self.cfg.bad_ops {
            BadOpPolicy::Skip => Choice::Continue,
            BadOpPolicy::Abort => Choice::Stop,
            BadOpPolicy::Ask => {
                let answer = self.prompter.ask("continue, stop or undo completed operations? [c/s/u]");
                match answer.map(|a| a.trim().to_ascii_lowercase()) {
                    Some(a) if a.starts_with('c') => Choice::Continue,
                    Some(a) if a.starts_with('u') => Choice::Undo,
                    _ => Choice::Stop,
                }
            }
        }
    }

    /// Move files still in the scratch directory back where they came from,
    /// or on to their destination if the source has been taken.
    fn rescue(&mut self) {
        let mut stranded = false;
        for (op, name) in std::mem::take(&mut self.parked) {
            let o = &self.ops[op];
            let tmp = match self.alloc.resolve(&name) {
                Ok(p) => p,
                Err(e) => {
                    output::print_error(&e.to_string());
                    stranded = true;
                    continue;
                }
            };
            let target: Option<&Path> = [o.source.as_path(), o.destination.as_path()]
                .into_iter()
                .find(|p| !fs_ops::exists(p));
            match target {
                Some(target) => match fs_ops::move_entry(&tmp, target, false) {
                    Ok(()) => {
                        output::print_warn(&format!("{} restored to {}", temp::display_name(&name), target.display()));
                    }
                    Err(e) => {
                        output::print_error(&format!("could not restore {}: {e}", o.source.display()));
                        stranded = true;
                    }
                },
                None => {
                    output::print_error(&format!(
                        "could not restore {}: both {} and {} are occupied",
                        o.source.display(),
                        o.source.display(),
                        o.destination.display()
                    ));
                    stranded = true;
                }
            }
        }
        if stranded {
            self.report.kept_scratch = self.alloc.keep();
            if let Some(dir) = &self.report.kept_scratch {
                output::print_warn(&format!("unrestored files were left in {}", dir.display()));
            }
        }
    }

    fn finish(mut self) -> ExecutionReport {
        if !self.parked.is_empty() {
            self.rescue();
        }
        self.report
    }
}
