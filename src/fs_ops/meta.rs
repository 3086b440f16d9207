//! Metadata carried over by copies.
//! Permissions come from whichever side the operation kind asks for; timestamps
//! are carried only when a copy stands in for a move.

use filetime::{set_file_times, FileTime};
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use super::helpers::io_error_with_help;

/// Apply the permission bits recorded in `meta` to `dest`.
pub(super) fn apply_permissions(meta: &Metadata, dest: &Path) -> io::Result<()> {
    fs::set_permissions(dest, meta.permissions()).map_err(io_error_with_help("set permissions", dest))
}

/// Best-effort: give `dest` the access/modification times recorded in `meta`.
pub(super) fn apply_times(meta: &Metadata, dest: &Path) {
    let (at, mt) = {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            (
                Some(FileTime::from_unix_time(meta.atime(), meta.atime_nsec() as u32)),
                Some(FileTime::from_unix_time(meta.mtime(), meta.mtime_nsec() as u32)),
            )
        }
        #[cfg(not(unix))]
        {
            (
                meta.accessed().ok().map(FileTime::from_system_time),
                meta.modified().ok().map(FileTime::from_system_time),
            )
        }
    };
    if let (Some(at), Some(mt)) = (at, mt) {
        if let Err(e) = set_file_times(dest, at, mt) {
            tracing::debug!(path = %dest.display(), error = %e, "could not preserve timestamps");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_are_copied() {
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let old = FileTime::from_unix_time(1_000_000_000, 0);
        set_file_times(&a, old, old).unwrap();

        apply_times(&fs::metadata(&a).unwrap(), &b);
        let got = FileTime::from_last_modification_time(&fs::metadata(&b).unwrap());
        assert_eq!(got, old);
    }

    #[cfg(unix)]
    #[test]
    fn permissions_are_copied() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempfile::tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        fs::set_permissions(&a, fs::Permissions::from_mode(0o640)).unwrap();

        apply_permissions(&fs::metadata(&a).unwrap(), &b).unwrap();
        assert_eq!(fs::metadata(&b).unwrap().permissions().mode() & 0o777, 0o640);
    }
}
