//! Configuration types for the takeout sorter

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Names and extensions treated as junk inside an extracted archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunkRules {
    /// File extensions of metadata sidecars (without the dot, exact case)
    pub metadata_extensions: Vec<String>,

    /// Exact file names of OS artifacts
    pub file_names: Vec<String>,

    /// Exact directory names of OS artifacts; removed with all contents
    pub dir_names: Vec<String>,
}

impl Default for JunkRules {
    fn default() -> Self {
        Self {
            metadata_extensions: vec!["json".into()],
            file_names: vec![".DS_Store".into()],
            dir_names: vec!["__MACOSX".into()],
        }
    }
}

impl JunkRules {
    /// Check if a file should be removed
    pub fn is_junk_file(&self, path: &Path) -> bool {
        let name_matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.file_names.iter().any(|f| f == name));

        name_matches
            || path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| self.metadata_extensions.iter().any(|m| m == ext))
    }

    /// Check if a directory should be removed as a whole
    pub fn is_junk_dir(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.dir_names.iter().any(|d| d == name))
    }
}

/// Configuration for the takeout sorter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing the exported archives
    pub source_dir: PathBuf,

    /// Directory receiving one folder per archive
    pub dest_dir: PathBuf,

    /// Where per-archive working directories are created (defaults to source_dir)
    pub work_dir: Option<PathBuf>,

    /// Leading name segment of matching archives
    pub archive_prefix: String,

    /// Archive file extension (without the dot)
    pub archive_extension: String,

    /// Path inside each extracted archive holding the photos
    pub content_subpath: PathBuf,

    /// Junk removal rules
    pub junk: JunkRules,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("output"),
            work_dir: None,
            archive_prefix: "takeout".into(),
            archive_extension: "zip".into(),
            content_subpath: PathBuf::from("Takeout").join("Google Fotos"),
            junk: JunkRules::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// Root under which working directories are created
    pub fn work_root(&self) -> &Path {
        self.work_dir.as_deref().unwrap_or(&self.source_dir)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    #[error("Failed to parse config file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
