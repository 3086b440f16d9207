//! Default path helpers and symlink checks.
//! Determines the OS-appropriate config path and detects symlinked ancestors for safety.

use dirs::config_dir;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MMV_CONFIG";

/// Config file in use: `$MMV_CONFIG` if set, else the OS-appropriate default.
pub fn config_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_ENV) {
        Some(p) if !p.is_empty() => Some(PathBuf::from(p)),
        _ => default_config_path(),
    }
}

/// OS-appropriate default config path.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(mut base) = config_dir() {
        base.push("mmv");
        base.push("config.xml");
        Some(base)
    } else {
        env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config").join("mmv").join("config.xml"))
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if !anc.as_os_str().is_empty() && anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_in_mmv_config() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("mmv/config.xml"));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn detects_symlinked_ancestor() {
        let td = tempfile::tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("x.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("x.log")).unwrap());
    }
}
