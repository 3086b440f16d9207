//! XML configuration support.
//! - Loads optional defaults from config.xml (quick_xml + serde).
//! - Unknown elements and unparsable values are hard errors so typos surface early.
//!
//! Command-line flags are applied on top of these values by the CLI layer.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::config_path;
use crate::config::types::{BadOpPolicy, Config, DeletionPolicy, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    hidden: Option<bool>,
    makedirs: Option<bool>,
    deletion: Option<String>,
    bad_ops: Option<String>,
    scratch_dir: Option<String>,
}

/// Settings read from a config file; `None` leaves the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub hidden: Option<bool>,
    pub makedirs: Option<bool>,
    pub deletion: Option<DeletionPolicy>,
    pub bad_ops: Option<BadOpPolicy>,
    pub scratch_dir: Option<PathBuf>,
}

impl FileSettings {
    /// Overlay these settings onto `cfg`.
    pub fn apply_to(&self, cfg: &mut Config) {
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        if let Some(hidden) = self.hidden {
            cfg.hidden = hidden;
        }
        if let Some(makedirs) = self.makedirs {
            cfg.makedirs = makedirs;
        }
        if let Some(deletion) = self.deletion {
            cfg.deletion = deletion;
        }
        if let Some(bad_ops) = self.bad_ops {
            cfg.bad_ops = bad_ops;
        }
        if let Some(dir) = &self.scratch_dir {
            cfg.scratch_dir = Some(dir.clone());
        }
    }
}

fn non_empty_path(s: Option<String>) -> Option<PathBuf> {
    s.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() { None } else { Some(PathBuf::from(trimmed)) }
    })
}

/// Parse config XML text.
pub fn parse_config_xml(contents: &str) -> Result<FileSettings> {
    let parsed: XmlConfig = from_xml_str(contents).context("parse config xml")?;

    let log_level = parsed
        .log_level
        .as_deref()
        .map(|s| s.trim().parse::<LogLevel>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let deletion = parsed
        .deletion
        .as_deref()
        .map(|s| s.parse::<DeletionPolicy>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let bad_ops = parsed
        .bad_ops
        .as_deref()
        .map(|s| s.parse::<BadOpPolicy>().map_err(|e| anyhow!(e)))
        .transpose()?;

    Ok(FileSettings {
        log_level,
        log_file: non_empty_path(parsed.log_file),
        hidden: parsed.hidden,
        makedirs: parsed.makedirs,
        deletion,
        bad_ops,
        scratch_dir: non_empty_path(parsed.scratch_dir),
    })
}

/// Load settings from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<FileSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    parse_config_xml(&contents).with_context(|| format!("in '{}'", path.display()))
}

/// Load the config file in use, if there is one.
///
/// A missing default file is not an error; a missing `$MMV_CONFIG` file is.
pub fn load_config() -> Result<Option<(PathBuf, FileSettings)>> {
    let explicit = std::env::var_os(super::paths::CONFIG_ENV).is_some_and(|p| !p.is_empty());
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if !explicit && !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }
    let settings = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), ?settings, "loaded config file");
    Ok(Some((path, settings)))
}
