//! ZIP extraction

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Unpack every entry of `archive` into `target`
///
/// Entries whose names would land outside `target` are skipped.
/// Returns the number of entries written.
pub fn extract_archive(archive: &Path, target: &Path) -> Result<usize> {
    info!(archive = %archive.display(), target = %target.display(), "Extracting archive...");

    let file = File::open(archive).map_err(|e| Error::Extraction {
        archive: archive.to_path_buf(),
        message: format!("Failed to open archive: {}", e),
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| Error::Extraction {
        archive: archive.to_path_buf(),
        message: format!("Failed to read archive: {}", e),
    })?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "Skipping entry with unsafe path");
            continue;
        };
        let out_path = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            io::copy(&mut entry, &mut out_file).map_err(|e| Error::Extraction {
                archive: archive.to_path_buf(),
                message: format!("Failed to write {}: {}", out_path.display(), e),
            })?;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            // Keep directories traversable so later stages can clean them up
            let mode = if entry.is_dir() { mode | 0o700 } else { mode | 0o600 };
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
        }

        debug!(path = %out_path.display(), "Extracted entry");
        written += 1;
    }

    info!(archive = %archive.display(), entries = written, "Extraction complete");
    Ok(written)
}
