//! Per-archive working directory
//!
//! The directory is removed when [`WorkingDirectory::release`] is called or,
//! failing that, when the guard is dropped, so every exit path of an
//! archive's processing cleans up after itself.

use crate::error::{Error, Result};
use crate::sanitize::remove_item;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Scoped temporary extraction directory
#[derive(Debug)]
pub struct WorkingDirectory {
    path: PathBuf,
    released: bool,
}

impl WorkingDirectory {
    /// Create `<root>/<name>`; an existing directory is never taken over
    pub fn create(root: &Path, name: &str) -> Result<Self> {
        let path = root.join(name);
        if fs::symlink_metadata(&path).is_ok() {
            return Err(Error::WorkingDirectoryExists { path });
        }

        fs::create_dir_all(&path)?;
        debug!(directory = %path.display(), "Created working directory");
        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory now; returns `true` if it is gone
    pub fn release(mut self) -> bool {
        self.released = true;
        let removed = remove_item(&self.path);
        if removed {
            info!(directory = %self.path.display(), "Removed working directory");
        }
        removed
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        if !self.released {
            remove_item(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_release_removes_tree() {
        let dir = tempdir().unwrap();
        let work = WorkingDirectory::create(dir.path(), "takeout-a-001").unwrap();
        let path = work.path().to_path_buf();
        fs::create_dir_all(path.join("Takeout/Google Fotos")).unwrap();
        fs::write(path.join("Takeout/Google Fotos/img.jpg"), b"x").unwrap();

        assert!(work.release());
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_tree() {
        let dir = tempdir().unwrap();
        let path = {
            let work = WorkingDirectory::create(dir.path(), "takeout-a-002").unwrap();
            fs::write(work.path().join("leftover"), b"x").unwrap();
            work.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_existing_directory_is_not_reused() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("takeout-a-003");
        fs::create_dir(&existing).unwrap();
        fs::write(existing.join("keep.jpg"), b"x").unwrap();

        let err = WorkingDirectory::create(dir.path(), "takeout-a-003").unwrap_err();

        assert!(matches!(err, Error::WorkingDirectoryExists { .. }));
        assert!(existing.join("keep.jpg").is_file());
    }
}
