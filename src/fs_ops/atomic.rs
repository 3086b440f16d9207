//! Atomic rename helper.
//! - On Windows, removes an existing destination first (RenameFile doesn't overwrite).
//! - On Unix, best-effort fsync of the destination directory after rename.
//!
//! The rename error is returned untouched so callers can detect EXDEV.

use std::fs;
use std::io;
use std::path::Path;

pub fn try_atomic_move(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if let Ok(meta) = fs::symlink_metadata(dst) {
            if !meta.is_dir() {
                if let Err(e) = fs::remove_file(dst) {
                    if e.kind() != io::ErrorKind::NotFound {
                        return Err(e);
                    }
                }
            }
        }
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    {
        let _ = super::util::fsync_dir(super::util::parent_dir(dst));
    }

    Ok(())
}
