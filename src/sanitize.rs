//! Junk removal
//!
//! Strips metadata sidecars (`*.json`) and OS artifacts (`.DS_Store`,
//! `__MACOSX/`) from an extracted archive. Removal is best-effort: a
//! failure is logged and counted, never returned.

use crate::config::JunkRules;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of a sanitization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Items deleted
    pub removed: usize,
    /// Items that could not be deleted
    pub failed: usize,
}

/// Remove every junk file and junk directory below `directory`
pub fn remove_junk(directory: &Path, rules: &JunkRules) -> SanitizeReport {
    info!(directory = %directory.display(), "Checking for unnecessary files...");

    let mut report = SanitizeReport::default();
    for path in collect_junk(directory, rules, &mut report) {
        if remove_item(&path) {
            report.removed += 1;
        } else {
            report.failed += 1;
        }
    }

    info!(removed = report.removed, failed = report.failed, "Cleanup of unnecessary files complete");
    report
}

/// Depth-first walk collecting junk paths; junk directories are not descended into
fn collect_junk(directory: &Path, rules: &JunkRules, report: &mut SanitizeReport) -> Vec<PathBuf> {
    let mut junk = Vec::new();
    let mut walker = WalkDir::new(directory).min_depth(1).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Unable to inspect item");
                report.failed += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if rules.is_junk_dir(entry.path()) {
                junk.push(entry.into_path());
                walker.skip_current_dir();
            }
        } else if file_type.is_file() && rules.is_junk_file(entry.path()) {
            junk.push(entry.into_path());
        }
    }

    junk
}

/// Delete a file or directory tree, logging instead of failing
///
/// Returns `true` when the item is gone afterwards.
pub fn remove_item(path: &Path) -> bool {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            debug!(path = %path.display(), "Deleted");
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unable to delete item");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"data").unwrap();
    }

    #[test]
    fn test_remove_junk_at_any_depth() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let keep = [
            "img1.jpg",
            "album/img2.png",
            "album/deep/er/img3.heic",
            "album/json",
            "album/notes.txt",
            "album/deep/er/metadata.JSON",
        ];
        let junk = [
            "meta.json",
            ".DS_Store",
            "album/img2.png.json",
            "album/deep/.DS_Store",
        ];
        for path in keep.iter().chain(junk.iter()) {
            touch(&root.join(path));
        }
        touch(&root.join("__MACOSX/foo"));
        touch(&root.join("album/deep/__MACOSX/._img3.heic"));

        let report = remove_junk(root, &JunkRules::default());

        // Four junk files plus two junk directories
        assert_eq!(report, SanitizeReport { removed: 6, failed: 0 });
        for path in keep {
            assert!(root.join(path).is_file(), "{path} should be kept");
        }
        for path in junk {
            assert!(!root.join(path).exists(), "{path} should be removed");
        }
        assert!(!root.join("__MACOSX").exists());
        assert!(!root.join("album/deep/__MACOSX").exists());
        assert!(root.join("album/deep/er").is_dir());
    }

    #[test]
    fn test_directory_named_like_metadata_is_traversed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("export.json/photo.jpg"));
        touch(&root.join("export.json/photo.jpg.json"));

        let report = remove_junk(root, &JunkRules::default());

        assert_eq!(report.removed, 1);
        assert!(root.join("export.json/photo.jpg").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_undeletable_item_does_not_stop_cleanup() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("locked/meta.json"));
        touch(&root.join("locked/photo.jpg"));
        touch(&root.join("open/meta.json"));
        touch(&root.join("z/.DS_Store"));

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
        // Permission bits do not bind root; nothing to check then
        if fs::write(locked.join("write-check"), b"").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = remove_junk(root, &JunkRules::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report, SanitizeReport { removed: 2, failed: 1 });
        assert!(root.join("locked/meta.json").exists());
        assert!(!root.join("open/meta.json").exists());
        assert!(!root.join("z/.DS_Store").exists());
    }

    #[test]
    fn test_remove_junk_empty_dir() {
        let dir = tempdir().unwrap();
        let report = remove_junk(dir.path(), &JunkRules::default());
        assert_eq!(report, SanitizeReport::default());
    }

    #[test]
    fn test_remove_item_missing_is_ok() {
        let dir = tempdir().unwrap();
        assert!(remove_item(&dir.path().join("gone")));
    }

    #[test]
    fn test_remove_item_tree() {
        let dir = tempdir().unwrap();
        let tree = dir.path().join("tree");
        touch(&tree.join("a/b/c.txt"));

        assert!(remove_item(&tree));
        assert!(!tree.exists());
    }
}
