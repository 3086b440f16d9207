//! I/O helper utilities.
//!
//! Enriches io::Error with the failing step, the path and an actionable hint
//! while preserving the original ErrorKind, so callers can still match on it.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;

use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            let hint = match code {
                libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
                libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
                libc::EBUSY => Some("resource busy; ensure no other process is using it"),
                libc::ENOENT => Some("path not found; it may have been moved by another process"),
                libc::EEXIST => Some("already exists"),
                libc::ENOTEMPTY => Some("directory not empty"),
                libc::EISDIR => Some("is a directory"),
                libc::ENOSPC => Some("insufficient space on device"),
                libc::EROFS => Some("read-only filesystem; cannot write here"),
                libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
                libc::ENAMETOOLONG => Some("filename or path too long"),
                libc::EMLINK => Some("too many links to the source"),
                _ => None,
            };
            if let Some(hint) = hint {
                msg.push_str(" (");
                msg.push_str(hint);
                msg.push(')');
            }
        }
        #[cfg(windows)]
        {
            let hint = match code {
                5 => Some("access denied; check permissions"),
                17 => Some("not same device; cross-filesystem move"),
                32 => Some("sharing violation; file is in use"),
                2 | 3 => Some("path not found"),
                80 | 183 => Some("already exists"),
                112 => Some("insufficient disk space"),
                _ => None,
            };
            if let Some(hint) = hint {
                msg.push_str(" (");
                msg.push_str(hint);
                msg.push(')');
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    }

    msg
}

/// Returns a closure for `.map_err(...)` converting io::Error -> io::Error
/// with enriched context in the message; the ErrorKind is kept.
pub fn io_error_with_help<'a>(op: &'a str, path: &'a Path) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_kind_and_names_path() {
        let e = io::Error::from(io::ErrorKind::NotFound);
        let wrapped = io_error_with_help("open", Path::new("/nope"))(e);
        assert_eq!(wrapped.kind(), io::ErrorKind::NotFound);
        assert!(wrapped.to_string().starts_with("open '/nope'"));
    }

    #[cfg(unix)]
    #[test]
    fn adds_hint_for_raw_os_errors() {
        let e = io::Error::from_raw_os_error(libc::EXDEV);
        let wrapped = io_error_with_help("rename", Path::new("a"))(e);
        let msg = wrapped.to_string();
        assert!(msg.contains("cross-filesystem"), "{msg}");
        assert!(msg.contains(&format!("[os code: {}]", libc::EXDEV)));
    }
}
