//! Best-effort rollback of completed steps, newest first.
//!
//! Moves are moved back; created copies and links are removed. A destination
//! that was overwritten cannot be brought back and is reported instead.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use tracing::info;

use super::temp::TempAllocator;
use super::{Endpoint, Phase, Step};
use crate::fs_ops;
use crate::output;
use crate::plan::{OpKind, Operation};

fn resolve(endpoint: &Endpoint, alloc: &mut TempAllocator) -> io::Result<PathBuf> {
    match endpoint {
        Endpoint::Real(p) => Ok(p.clone()),
        Endpoint::Staged(name) => alloc.resolve(name),
    }
}

fn reverse(step: &Step, ops: &[Operation], alloc: &mut TempAllocator) -> io::Result<()> {
    let op = &ops[step.op];
    let from = resolve(&step.from, alloc)?;
    let to = resolve(&step.to, alloc)?;
    let replaced = op.replaces && matches!(step.to, Endpoint::Real(_));

    if step.vacates(ops) {
        fs_ops::apply(OpKind::Move, &to, &from, false)?;
    } else if !replaced {
        fs_ops::remove_entry(&to)?;
    }
    if replaced {
        output::print_warn(&format!("{}: previous contents were overwritten and cannot be restored", to.display()));
    }
    Ok(())
}

/// Reverse the steps listed in `journal`; returns how many were reversed.
pub(super) fn rollback(
    steps: &[Step],
    journal: &[usize],
    ops: &[Operation],
    alloc: &mut TempAllocator,
    parked: &mut BTreeMap<usize, String>,
) -> usize {
    let mut undone = 0;
    for &idx in journal.iter().rev() {
        let step = &steps[idx];
        match reverse(step, ops, alloc) {
            Ok(()) => {
                info!(src = %step.to, dest = %step.from, "undone");
                match (step.phase, &step.to) {
                    (Phase::InitialTemp, _) => {
                        parked.remove(&step.op);
                    }
                    (Phase::FinalTemp, Endpoint::Real(_)) => {
                        if let Endpoint::Staged(name) = &step.from {
                            parked.insert(step.op, name.clone());
                        }
                    }
                    _ => {}
                }
                undone += 1;
            }
            Err(e) => output::print_error(&format!("could not undo {} -> {}: {e}", step.from, step.to)),
        }
    }
    undone
}
