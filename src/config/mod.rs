//! Config module.
//! Provides configuration types, the config file location and XML loading.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{config_path, default_config_path, path_has_symlink_ancestor, CONFIG_ENV};
pub use types::{BadOpPolicy, Config, DeletionPolicy, LogLevel, ReportMode};
pub use xml::{load_config, load_config_from_xml_path, parse_config_xml, FileSettings};
