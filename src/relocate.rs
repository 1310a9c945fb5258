//! Moving extracted content into the destination tree

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Create `path` and any missing parents; succeeds if it already exists
pub fn ensure_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path)?;
    debug!(directory = %path.display(), "Ensured directory exists");
    Ok(path.to_path_buf())
}

/// Move every direct child of `source` into `destination`
///
/// Children keep their names and are moved as a unit (directories are not
/// merged). An existing entry with the same name in `destination` is an
/// error; nothing is overwritten. Returns the new paths in name order.
pub fn move_contents(source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    info!(from = %source.display(), to = %destination.display(), "Moving contents...");

    let mut children = fs::read_dir(source)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();

    let mut moved = Vec::with_capacity(children.len());
    for name in children {
        let from = source.join(&name);
        let to = destination.join(&name);

        if fs::symlink_metadata(&to).is_ok() {
            return Err(Error::Relocation {
                from,
                to,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            });
        }

        fs::rename(&from, &to).map_err(|e| Error::Relocation {
            from: from.clone(),
            to: to.clone(),
            source: e,
        })?;

        debug!(from = %from.display(), to = %to.display(), "Moved");
        moved.push(to);
    }

    info!(count = moved.len(), destination = %destination.display(), "Move complete");
    Ok(moved)
}
