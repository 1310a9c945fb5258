//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Takeout Sorter - Consolidate Google Photos Takeout archives
///
/// Finds `takeout-*-<number>.zip` archives in SOURCE, extracts each one,
/// strips metadata sidecars and OS artifacts, and moves the photos into
/// DESTINATION/<number>/.
#[derive(Parser, Debug)]
#[command(name = "takeout-sorter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the takeout archives
    pub source: PathBuf,

    /// Directory receiving one folder per archive
    pub destination: PathBuf,

    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI arguments win.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Directory for temporary extraction (defaults to SOURCE)
    #[arg(short, long, env = "TAKEOUT_SORTER_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory for log files (defaults to `Log/` next to the executable)
    #[arg(long, env = "TAKEOUT_SORTER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Output log file as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        config.source_dir = self.source.clone();
        config.dest_dir = self.destination.clone();
        if let Some(ref work_dir) = self.work_dir {
            config.work_dir = Some(work_dir.clone());
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JunkRules;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["takeout-sorter", "in", "out"]).unwrap();
        let config = cli.to_config();

        assert_eq!(config.source_dir, PathBuf::from("in"));
        assert_eq!(config.dest_dir, PathBuf::from("out"));
        assert!(config.work_dir.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(Cli::try_parse_from(["takeout-sorter"]).is_err());
        assert!(Cli::try_parse_from(["takeout-sorter", "in"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let cli = Cli::try_parse_from([
            "takeout-sorter",
            "-v",
            "--work-dir",
            "/scratch",
            "in",
            "out",
        ])
        .unwrap();
        let file_config = Config {
            archive_prefix: "export".into(),
            work_dir: Some(PathBuf::from("/elsewhere")),
            ..Config::default()
        };

        let config = cli.merge_with_config(file_config);

        assert_eq!(config.archive_prefix, "export");
        assert_eq!(config.work_dir, Some(PathBuf::from("/scratch")));
        assert_eq!(config.source_dir, PathBuf::from("in"));
        assert!(config.verbose);
        assert_eq!(config.junk, JunkRules::default());
    }

    #[test]
    fn test_config_name() {
        let cli = Cli::try_parse_from(["takeout-sorter", "-C", "cfg/home.toml", "in", "out"]).unwrap();
        assert_eq!(cli.config_name().as_deref(), Some("home"));
    }

    #[test]
    fn test_verbose_from_config_file_is_kept() {
        let cli = Cli::try_parse_from(["takeout-sorter", "in", "out"]).unwrap();
        let file_config = Config {
            verbose: true,
            ..Config::default()
        };

        assert!(cli.merge_with_config(file_config).verbose);
    }

    #[test]
    fn test_log_dir_argument() {
        let cli = Cli::try_parse_from(["takeout-sorter", "--log-dir", "/var/log/takeout", "in", "out"])
            .unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("/var/log/takeout")));
    }
}
