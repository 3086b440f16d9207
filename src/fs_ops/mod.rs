//! Filesystem primitives used by the executor: one dispatch per operation kind.

mod atomic;
mod copy;
mod helpers;
mod io_copy;
mod link;
mod meta;
mod util;

pub use copy::{copy_entry, PermSource};
pub use helpers::io_error_with_help;
pub use util::exists;

use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::plan::OpKind;
use atomic::try_atomic_move;

fn already_exists(dst: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("'{}' already exists", dst.display()),
    )
}

/// Perform one operation of `kind` from `src` to `dst`.
///
/// Unless `replaces` is set, an existing `dst` is never touched.
pub fn apply(kind: OpKind, src: &Path, dst: &Path, replaces: bool) -> io::Result<()> {
    if !replaces && exists(dst) {
        return Err(already_exists(dst));
    }
    match kind {
        OpKind::Move | OpKind::Rename => move_entry(src, dst, replaces),
        OpKind::CopyDelete => {
            copy_entry(src, dst, PermSource::Source, true, replaces)?;
            remove_entry(src)
        }
        OpKind::Copy => copy_entry(src, dst, PermSource::Source, false, replaces),
        OpKind::Overwrite => copy_entry(src, dst, PermSource::Destination, false, replaces),
        OpKind::HardLink => link::hard_link(src, dst, replaces),
        OpKind::SymLink => link::symlink(src, dst, replaces),
    }
}

/// Rename `src` to `dst`, falling back to copy+delete across filesystems.
pub fn move_entry(src: &Path, dst: &Path, replaces: bool) -> io::Result<()> {
    match try_atomic_move(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if util::is_cross_device(&e) => {
            warn!(src = %src.display(), dest = %dst.display(), "cross-filesystem; copying instead of renaming");
            copy_entry(src, dst, PermSource::Source, true, replaces)?;
            remove_entry(src)
        }
        Err(e) => Err(io_error_with_help("rename", src)(e)),
    }
}

/// Remove a file, symlink or whole directory tree.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path).map_err(io_error_with_help("stat", path))?;
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(io_error_with_help("remove directory", path))
    } else {
        fs::remove_file(path).map_err(io_error_with_help("remove", path))
    }
}

/// Create `dir` and any missing ancestors.
pub fn make_directories(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;
    info!(path = %dir.display(), "created directory");
    Ok(())
}
