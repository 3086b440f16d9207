//! Windows implementations of platform helpers.
//!
//! Windows lacks POSIX mode semantics; no ACL management is attempted.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Open the log file for appending, creating its directory if needed.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}
