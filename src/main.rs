//! Takeout Sorter - Consolidate Google Photos Takeout archives
//!
//! Extracts numbered Takeout exports, strips metadata sidecars and OS
//! artifacts, and moves the photos into one folder per archive.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use takeout_sorter::{Cli, Config, Processor};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Console styling for banners and the final summary.

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "=".repeat(60))));
    }

    /// Print a title centered in the separator width
    pub fn print_title(title: &str) {
        let padding = 60usize.saturating_sub(title.len()) / 2;
        let _ = stdout().execute(Print(" ".repeat(padding)));
        let _ = stdout().execute(Print(title.bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_success(msg: &str) {
        let _ = stdout().execute(Print(style("✓ ").with(CliTheme::SUCCESS).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a key/value pair
    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        print_key_value(key, value, Some(color));
    }

    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style("Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    // Usage errors exit with 1; help and version exit with 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let exe_dir = get_executable_dir()?;
    let (mut config, config_file) = load_config(&cli, &exe_dir)?;

    let log_path = get_log_path(&exe_dir, &cli);
    let guard = setup_logging(&log_path, config.verbose, cli.json_log);
    let log_file = guard.as_ref().map(|_| log_path.as_path());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Takeout Sorter starting"
    );
    if let Some(ref path) = config_file {
        info!(config_file = %path.display(), "Loaded configuration from file");
    }

    config.source_dir = std::path::absolute(&config.source_dir)?;
    config.dest_dir = std::path::absolute(&config.dest_dir)?;

    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    if let Some(path) = log_file {
        info!(log_file = %path.display(), "Log file location");
    }

    {
        use cli_output::*;
        print_blank();
        print_separator();
        print_title("Google Photos Backup Processor");
        print_separator();
        print_key_value("From", &config.source_dir.display().to_string(), None);
        print_key_value("To", &config.dest_dir.display().to_string(), None);
        print_blank();
    }

    let mut processor = Processor::new(config)?;

    match processor.run() {
        Ok(results) => {
            use cli_output::*;

            let stats = processor.stats();

            print_blank();
            print_separator();
            if stats.archives_found == 0 {
                print_warning(&format!(
                    "No archives found in {} matching {}-*-<number>.{}",
                    processor.config().source_dir.display(),
                    processor.config().archive_prefix,
                    processor.config().archive_extension
                ));
            } else {
                print_success("Backup completed!");
            }
            print_separator();

            print_blank();
            print_stat("Archives found", &stats.archives_found.to_string(), CliTheme::ACCENT);
            print_stat("Succeeded", &stats.succeeded.to_string(), CliTheme::SUCCESS);
            print_stat("Failed", &stats.failed.to_string(), CliTheme::ERROR);
            print_stat("Items moved", &stats.items_moved.to_string(), CliTheme::SUCCESS);
            print_stat("Junk removed", &stats.junk_removed.to_string(), CliTheme::WARNING);
            print_stat("Junk not removed", &stats.junk_failed.to_string(), CliTheme::WARNING);
            print_blank();

            let failed: Vec<_> = results.iter().filter(|r| !r.is_success()).collect();
            if !failed.is_empty() {
                print_separator();
                print_error(&format!("{} archive(s) failed", failed.len()));
                print_blank();
                for result in &failed {
                    let msg = result.error.as_deref().unwrap_or("unknown error");
                    print_key_value(&result.archive, msg, Some(CliTheme::ERROR));
                    if let Some(ref cause) = result.extraction_error {
                        print_key_value("    extraction", cause, Some(CliTheme::ERROR));
                    }
                }
                print_blank();
            }

            // Archives that finished with only part of their contents
            let partial: Vec<_> = results
                .iter()
                .filter(|r| r.is_success() && r.extraction_error.is_some())
                .collect();
            if !partial.is_empty() {
                print_separator();
                print_warning(&format!("{} archive(s) were only partially extracted", partial.len()));
                print_blank();
                for result in &partial {
                    let msg = result.extraction_error.as_deref().unwrap_or_default();
                    print_key_value(&result.archive, msg, Some(CliTheme::WARNING));
                }
                print_blank();
            }

            for result in results.iter().filter(|r| r.junk_failed > 0) {
                print_warning(&format!(
                    "{}: {} junk item(s) could not be removed",
                    result.archive, result.junk_failed
                ));
            }

            print_separator();
            match log_file {
                Some(path) => {
                    print_log_path(&path.display().to_string());
                    info!(log_file = %path.display(), "Processing complete. Log saved to");
                }
                None => info!("Processing complete"),
            }

            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            Err(e.into())
        }
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Log file path: `--log-dir` (or `<exe_dir>/Log`), per config name or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = cli.log_dir.clone().unwrap_or_else(|| exe_dir.join("Log"));
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    match cli.config_name() {
        Some(config_name) => log_dir
            .join(&config_name)
            .join(format!("{}_{}.log", config_name, timestamp)),
        None => log_dir.join(format!("TakeoutRun_{}.log", timestamp)),
    }
}

/// Resolve config path - supports shorthand syntax
///
/// `home` resolves to `home.toml`, then to `<exe_dir>/Config/home.toml`.
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    let filename = with_extension.file_name().unwrap_or(config_path.as_os_str());
    let candidates = [
        config_path.to_path_buf(),
        with_extension.clone(),
        exe_dir.join("Config").join(filename),
    ];

    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| config_path.to_path_buf())
}

/// Load configuration from file or CLI arguments
///
/// Returns the merged config and the config file actually read, if any.
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    let (config, config_file) = match cli.config {
        Some(ref config_path) => {
            let resolved_path = resolve_config_path(exe_dir, config_path);
            let file_config = Config::load_from_file(&resolved_path)?;
            (cli.merge_with_config(file_config), Some(resolved_path))
        }
        None => (cli.to_config(), None),
    };

    if config.archive_prefix.is_empty() || config.archive_extension.is_empty() {
        anyhow::bail!("archive_prefix and archive_extension must not be empty");
    }

    Ok((config, config_file))
}

fn open_log_file(log_path: &Path) -> io::Result<File> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
}

/// Setup logging: console always, plus a log file when one can be created
///
/// A log file that cannot be opened is not fatal; the run continues with
/// console output only and the returned guard is `None`.
fn setup_logging(log_path: &Path, verbose: bool, json_log: bool) -> Option<WorkerGuard> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    let file = match open_log_file(log_path) {
        Ok(file) => file,
        Err(e) => {
            subscriber.init();
            warn!(
                log_file = %log_path.display(),
                error = %e,
                "Unable to create log file, logging to console only"
            );
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);

    if json_log {
        subscriber.with(file_layer.json()).init();
    } else {
        subscriber.with(file_layer).init();
    }

    Some(guard)
}
