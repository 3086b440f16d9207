//! Partition an operation set into Free, Clashing and WithTemp groups.
//!
//! Running operations in request order can destroy a file another operation
//! still needs (`a -> b` followed by `b -> c`). The executor avoids that by
//! parking every operation whose source is some other operation's
//! destination in a scratch directory first, then running the operations
//! whose destination was just vacated, then everything else, and finally
//! moving the parked files to their real destinations.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::MmvError;
use crate::plan::{path_key, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// No dependency on any other operation.
    Free,
    /// Destination is another operation's source.
    Clashing,
    /// Source is another operation's destination; staged through a temporary path.
    WithTemp,
}

/// One group per operation, in operation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub groups: Vec<Group>,
}

impl Classification {
    fn indices(&self, group: Group) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| **g == group)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn free(&self) -> Vec<usize> {
        self.indices(Group::Free)
    }

    pub fn clashing(&self) -> Vec<usize> {
        self.indices(Group::Clashing)
    }

    pub fn with_temp(&self) -> Vec<usize> {
        self.indices(Group::WithTemp)
    }
}

/// Classify `ops` in one pass over two hash indexes.
///
/// Kinds that keep their source in place cannot be staged, so for them any
/// dependency between operations is reported as `SourceOverwritten`.
pub fn classify(ops: &[Operation]) -> Result<Classification, MmvError> {
    let by_source: HashMap<PathBuf, usize> = ops
        .iter()
        .enumerate()
        .map(|(i, op)| (path_key(&op.source), i))
        .collect();
    let by_destination: HashMap<PathBuf, usize> = ops
        .iter()
        .enumerate()
        .map(|(i, op)| (path_key(&op.destination), i))
        .collect();

    let mut groups = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        let written_by = by_destination
            .get(&path_key(&op.source))
            .copied()
            .filter(|&j| j != i);
        let feeds = by_source
            .get(&path_key(&op.destination))
            .copied()
            .filter(|&j| j != i);

        if !op.kind.vacates_source() {
            if let Some(j) = written_by {
                return Err(MmvError::SourceOverwritten {
                    source_path: op.source.clone(),
                    writer: ops[j].source.clone(),
                    kind: op.kind,
                });
            }
            if feeds.is_some() {
                return Err(MmvError::SourceOverwritten {
                    source_path: op.destination.clone(),
                    writer: op.source.clone(),
                    kind: op.kind,
                });
            }
        }

        let group = if written_by.is_some() {
            Group::WithTemp
        } else if feeds.is_some() {
            Group::Clashing
        } else {
            Group::Free
        };
        tracing::trace!(src = %op.source.display(), dest = %op.destination.display(), ?group, "classified");
        groups.push(group);
    }

    Ok(Classification { groups })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::OpKind;

    fn moves(pairs: &[(&str, &str)]) -> Vec<Operation> {
        pairs
            .iter()
            .map(|(s, d)| Operation::new(*s, *d, OpKind::Move))
            .collect()
    }

    #[test]
    fn independent_operations_are_free() {
        let c = classify(&moves(&[("a", "x"), ("b", "y")])).unwrap();
        assert_eq!(c.groups, vec![Group::Free, Group::Free]);
        assert!(c.with_temp().is_empty());
    }

    #[test]
    fn two_cycle_is_staged_entirely() {
        let c = classify(&moves(&[("a", "b"), ("b", "a")])).unwrap();
        assert_eq!(c.groups, vec![Group::WithTemp, Group::WithTemp]);
    }

    #[test]
    fn chain_head_clashes_and_tail_is_staged() {
        let c = classify(&moves(&[("a", "b"), ("b", "c"), ("c", "d"), ("e", "f")])).unwrap();
        assert_eq!(
            c.groups,
            vec![Group::Clashing, Group::WithTemp, Group::WithTemp, Group::Free]
        );
        assert_eq!(c.clashing(), vec![0]);
        assert_eq!(c.with_temp(), vec![1, 2]);
        assert_eq!(c.free(), vec![3]);
    }

    #[test]
    fn order_of_requests_does_not_matter() {
        let c = classify(&moves(&[("b", "c"), ("a", "b")])).unwrap();
        assert_eq!(c.groups, vec![Group::WithTemp, Group::Clashing]);
    }

    #[test]
    fn lexically_equal_paths_are_linked() {
        let c = classify(&moves(&[("./a", "b"), ("b", "a")])).unwrap();
        assert_eq!(c.groups, vec![Group::WithTemp, Group::WithTemp]);
    }

    #[test]
    fn copy_into_another_source_is_fatal() {
        let ops = vec![
            Operation::new("a", "b", OpKind::Copy),
            Operation::new("b", "c", OpKind::Copy),
        ];
        match classify(&ops) {
            Err(MmvError::SourceOverwritten { source_path, writer, kind }) => {
                assert_eq!(source_path, PathBuf::from("b"));
                assert_eq!(writer, PathBuf::from("a"));
                assert_eq!(kind, OpKind::Copy);
            }
            other => panic!("expected SourceOverwritten, got {other:?}"),
        }
    }

    #[test]
    fn independent_links_are_fine() {
        let ops = vec![
            Operation::new("a", "x", OpKind::SymLink),
            Operation::new("b", "y", OpKind::SymLink),
        ];
        assert_eq!(classify(&ops).unwrap().free(), vec![0, 1]);
    }
}
