//! Operation model, operation-set construction and conflict classification.

pub mod builder;
pub mod classify;

use std::fmt;
use std::path::{Component, Path, PathBuf};

pub use builder::{build_operations, check_collisions, expand_sources, preflight, OperationSet};
pub use classify::{classify, Classification, Group};

/// What to do with each matched source. Exactly one kind applies to a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpKind {
    /// Move source to destination (rename, or copy+delete across filesystems)
    #[default]
    Move,
    /// Copy source to destination, then delete source
    CopyDelete,
    /// Rename source within its own directory
    Rename,
    /// Copy source to destination, preserving source permissions
    Copy,
    /// Overwrite destination with source, preserving destination permissions
    Overwrite,
    /// Hard-link destination name to source
    HardLink,
    /// Symlink destination name to source
    SymLink,
}

impl OpKind {
    /// Kinds that leave nothing behind at the source path once done.
    pub fn vacates_source(self) -> bool {
        matches!(self, OpKind::Move | OpKind::CopyDelete | OpKind::Rename)
    }

    /// Verb used in diagnostics ("could not move a -> b").
    pub fn verb(self) -> &'static str {
        match self {
            OpKind::Move => "move",
            OpKind::CopyDelete => "copy+delete",
            OpKind::Rename => "rename",
            OpKind::Copy => "copy",
            OpKind::Overwrite => "overwrite",
            OpKind::HardLink => "link",
            OpKind::SymLink => "symlink",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// One requested filesystem operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: OpKind,
    /// Set during pre-flight when overwriting an existing destination was approved.
    pub replaces: bool,
}

impl Operation {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, kind: OpKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
            replaces: false,
        }
    }
}

/// Lexical identity of a path for conflict lookups.
///
/// `./a/b`, `a/./b` and `a//b` all name the same entry; no filesystem access
/// and no `..` resolution (that would need symlink knowledge).
pub fn path_key(path: &Path) -> PathBuf {
    let mut key = PathBuf::new();
    for component in path.components() {
        if component != Component::CurDir {
            key.push(component);
        }
    }
    if key.as_os_str().is_empty() {
        key.push(".");
    }
    key
}
