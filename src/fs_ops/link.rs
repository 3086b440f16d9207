//! Hard and symbolic link creation.
//!
//! When an existing destination is being replaced, the link is created under
//! a temp name next to it and renamed over it, so the old entry is never
//! missing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::util;
use crate::plan::path_key;

/// Create `dest` through `make`, replacing an existing entry atomically if asked.
fn create_link(dest: &Path, replaces: bool, make: impl Fn(&Path) -> io::Result<()>) -> io::Result<()> {
    if !replaces {
        return make(dest);
    }
    let tmp = util::unique_temp_path(util::parent_dir(dest));
    make(&tmp)?;
    try_atomic_move(&tmp, dest).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_error_with_help("rename link into place", dest)(e)
    })
}

pub(super) fn hard_link(src: &Path, dest: &Path, replaces: bool) -> io::Result<()> {
    create_link(dest, replaces, |at| {
        fs::hard_link(src, at).map_err(io_error_with_help("hard link", at))
    })
}

/// Target to store in a symlink at `dest` pointing at `src`.
///
/// Relative sources stay relative when the link lands in the same directory;
/// otherwise they are made absolute so the link resolves from anywhere.
pub(super) fn link_target(src: &Path, dest: &Path) -> io::Result<PathBuf> {
    if src.is_absolute() {
        return Ok(src.to_path_buf());
    }
    let same_dir = path_key(util::parent_dir(src)) == path_key(util::parent_dir(dest));
    match src.file_name() {
        Some(name) if same_dir => Ok(PathBuf::from(name)),
        _ => Ok(std::env::current_dir()?.join(src)),
    }
}

pub(super) fn symlink(src: &Path, dest: &Path, replaces: bool) -> io::Result<()> {
    let target = link_target(src, dest)?;
    create_link(dest, replaces, |at| make_symlink(&target, at))
}

#[cfg(unix)]
pub(super) fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(io_error_with_help("create symlink", link))
}

#[cfg(windows)]
pub(super) fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    let resolved = util::parent_dir(link).join(target);
    let res = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    res.map_err(io_error_with_help("create symlink", link))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_target_in_same_directory_stays_relative() {
        let t = link_target(Path::new("d/a.txt"), Path::new("d/b.txt")).unwrap();
        assert_eq!(t, PathBuf::from("a.txt"));
        let t = link_target(Path::new("a.txt"), Path::new("./b.txt")).unwrap();
        assert_eq!(t, PathBuf::from("a.txt"));
    }

    #[test]
    fn relative_target_elsewhere_becomes_absolute() {
        let t = link_target(Path::new("a.txt"), Path::new("sub/a.txt")).unwrap();
        assert!(t.is_absolute());
        assert!(t.ends_with("a.txt"));
    }

    #[test]
    fn hard_link_replaces_existing() {
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        assert!(hard_link(&a, &b, false).is_err());
        hard_link(&a, &b, true).unwrap();
        assert_eq!(fs::read_to_string(&b).unwrap(), "a");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_absolute_source() {
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        fs::write(&a, "a").unwrap();
        let l = td.path().join("l");
        symlink(&a, &l, false).unwrap();
        assert_eq!(fs::read_link(&l).unwrap(), a);
        assert_eq!(fs::read_to_string(&l).unwrap(), "a");
    }
}
