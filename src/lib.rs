//! Takeout Sorter - Consolidate Google Photos Takeout archives
//!
//! This library turns a folder of numbered Takeout exports into an
//! organized destination tree:
//! - Discovery of `takeout-*-<number>.zip` archives
//! - ZIP extraction into per-archive working directories
//! - Removal of metadata sidecars and OS artifacts
//! - Relocation of the photo folder into `<destination>/<number>/`
//! - Guaranteed cleanup of working directories

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod relocate;
pub mod sanitize;
pub mod workdir;

pub use cli::Cli;
pub use config::{Config, ConfigError, JunkRules};
pub use discovery::{ArchiveEntry, ArchivePattern, find_archives};
pub use error::{Error, Result};
pub use pipeline::{ArchiveFailure, ArchiveResult, ArchiveStage, ProcessingStats, Processor, process_archive};
pub use workdir::WorkingDirectory;
