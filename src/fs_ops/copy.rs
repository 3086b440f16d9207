//! Copies that never leave a half-written destination behind.
//! - Files are streamed into a hidden temp name in the destination directory,
//!   then atomically renamed over the destination.
//! - Directory trees are built under a temp name the same way, with their
//!   files copied in parallel, then renamed into place.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::{io_copy, link, meta, util};
use crate::shutdown;

/// Whose permission bits the copy ends up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermSource {
    /// Those of the source
    Source,
    /// Those of the destination being overwritten, if it existed
    Destination,
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "shutdown requested")
}

/// Copy file `src` to `dest` through a temp file in the destination directory.
pub(super) fn safe_copy_and_rename(src: &Path, dest: &Path) -> io::Result<()> {
    let tmp_path = util::unique_temp_path(util::parent_dir(dest));

    if let Err(e) = io_copy::copy_streaming(src, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
    }
    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("rename temporary file into place", dest)(e));
    }
    Ok(())
}

/// Recursively copy directory `src` into the new path `dest`.
pub(super) fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    let staging = util::unique_temp_path(util::parent_dir(dest));
    match build_tree(src, &staging) {
        Ok(()) => try_atomic_move(&staging, dest).map_err(|e| {
            let _ = fs::remove_dir_all(&staging);
            io_error_with_help("rename copied directory into place", dest)(e)
        }),
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            Err(e)
        }
    }
}

fn build_tree(src: &Path, target: &Path) -> io::Result<()> {
    let mut files: Vec<(PathBuf, PathBuf)> = Vec::new();
    let mut dirs: Vec<(PathBuf, PathBuf)> = Vec::new();

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            let err = e.into_io_error().unwrap_or_else(|| io::Error::other("directory walk failed"));
            io_error_with_help("read directory", &path)(err)
        })?;
        let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let out = target.join(rel);
        let ft = entry.file_type();
        if ft.is_dir() {
            fs::create_dir_all(&out).map_err(io_error_with_help("create directory", &out))?;
            dirs.push((entry.into_path(), out));
        } else if ft.is_symlink() {
            let link_target = fs::read_link(entry.path()).map_err(io_error_with_help("read link", entry.path()))?;
            link::make_symlink(&link_target, &out)?;
        } else {
            files.push((entry.into_path(), out));
        }
    }

    files.par_iter().try_for_each(|(from, to)| -> io::Result<()> {
        if shutdown::is_requested() {
            return Err(interrupted());
        }
        io_copy::copy_streaming(from, to).map_err(io_error_with_help("copy file", from))?;
        let m = fs::metadata(from).map_err(io_error_with_help("stat", from))?;
        meta::apply_permissions(&m, to)?;
        meta::apply_times(&m, to);
        Ok(())
    })?;

    // deepest first so read-only parents are restricted last
    for (from, to) in dirs.iter().rev() {
        let m = fs::metadata(from).map_err(io_error_with_help("stat", from))?;
        meta::apply_permissions(&m, to)?;
        meta::apply_times(&m, to);
    }
    debug!(src = %src.display(), files = files.len(), dirs = dirs.len(), "copied directory tree");
    Ok(())
}

/// Copy a file or directory tree from `src` to `dest`.
///
/// `keep_times` carries the source timestamps over, for copies that stand in for a move.
pub fn copy_entry(src: &Path, dest: &Path, perms: PermSource, keep_times: bool, replaces: bool) -> io::Result<()> {
    if shutdown::is_requested() {
        return Err(interrupted());
    }
    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat", src))?;
    let old_dest = match perms {
        PermSource::Destination => fs::metadata(dest).ok(),
        PermSource::Source => None,
    };

    if src_meta.is_dir() {
        if replaces && util::exists(dest) {
            super::remove_entry(dest)?;
        }
        copy_tree(src, dest)?;
    } else {
        safe_copy_and_rename(src, dest)?;
        meta::apply_permissions(old_dest.as_ref().unwrap_or(&src_meta), dest)?;
    }
    if keep_times {
        meta::apply_times(&src_meta, dest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_file_and_overwrites_atomically() {
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, "new").unwrap();
        fs::write(&b, "old").unwrap();
        copy_entry(&a, &b, PermSource::Source, false, true).unwrap();
        assert_eq!(fs::read_to_string(&b).unwrap(), "new");
        assert_eq!(fs::read_to_string(&a).unwrap(), "new");
        let leftovers: Vec<_> = fs::read_dir(td.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".mmv."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn copies_nested_tree() {
        let td = tempfile::tempdir().unwrap();
        let src = td.path().join("src");
        fs::create_dir_all(src.join("x/y")).unwrap();
        fs::write(src.join("top.txt"), "1").unwrap();
        fs::write(src.join("x/y/deep.txt"), "2").unwrap();
        let dest = td.path().join("dest");

        copy_entry(&src, &dest, PermSource::Source, true, false).unwrap();
        assert_eq!(fs::read_to_string(dest.join("top.txt")).unwrap(), "1");
        assert_eq!(fs::read_to_string(dest.join("x/y/deep.txt")).unwrap(), "2");
        assert!(src.join("x/y/deep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_keeps_destination_mode() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, "new").unwrap();
        fs::write(&b, "old").unwrap();
        fs::set_permissions(&a, fs::Permissions::from_mode(0o644)).unwrap();
        fs::set_permissions(&b, fs::Permissions::from_mode(0o600)).unwrap();

        copy_entry(&a, &b, PermSource::Destination, false, true).unwrap();
        assert_eq!(fs::read_to_string(&b).unwrap(), "new");
        assert_eq!(fs::metadata(&b).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
