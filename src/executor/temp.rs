//! Temporary names for operations staged through a scratch directory.
//!
//! The scratch directory is created on first use (a dry run never creates it)
//! and removed when the allocator is dropped, unless `keep` was called because
//! files could not be rescued from it.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;
use tracing::debug;

use crate::fs_ops::io_error_with_help;

/// How a temporary path is shown in plan lines.
pub fn display_name(name: &str) -> String {
    format!("<tmp>/{name}")
}

#[derive(Debug)]
pub struct TempAllocator {
    base: PathBuf,
    dir: Option<TempDir>,
    counter: AtomicU64,
}

impl TempAllocator {
    /// Allocator whose scratch directory will live under `base`.
    pub fn new_in(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            dir: None,
            counter: AtomicU64::new(0),
        }
    }

    /// Fresh name derived from `dest`: `b.txt` becomes `b_1.txt`.
    pub fn allocate(&self, dest: &Path) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let stem = dest
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tmp".to_string());
        match dest.extension() {
            Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
            None => format!("{stem}_{n}"),
        }
    }

    /// Full path of `name`, creating the scratch directory if needed.
    pub fn resolve(&mut self, name: &str) -> io::Result<PathBuf> {
        if self.dir.is_none() {
            let dir = tempfile::Builder::new()
                .prefix(".mmv-")
                .tempdir_in(&self.base)
                .map_err(io_error_with_help("create scratch directory in", &self.base))?;
            debug!(path = %dir.path().display(), "created scratch directory");
            self.dir = Some(dir);
        }
        match &self.dir {
            Some(dir) => Ok(dir.path().join(name)),
            None => Err(io::Error::other("scratch directory unavailable")),
        }
    }

    /// Scratch directory, if it has been created.
    pub fn location(&self) -> Option<&Path> {
        self.dir.as_ref().map(TempDir::path)
    }

    /// Leave the scratch directory on disk and return its path.
    pub fn keep(&mut self) -> Option<PathBuf> {
        self.dir.take().map(TempDir::keep)
    }
}
