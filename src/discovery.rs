//! Archive discovery
//!
//! Finds numbered export archives such as `takeout-20240101T000000Z-001.zip`
//! at the top level of a source directory.

use crate::error::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// An archive found in the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File name, e.g. `takeout-myexport-001.zip`
    pub filename: String,
    /// File name without its extension, used for the working directory
    pub base_name: String,
    /// Full path to the archive
    pub path: PathBuf,
    /// Sequence number exactly as written in the file name (`001`)
    pub number: String,
}

/// Matcher for `<prefix>-<anything>-<digits>.<extension>`
#[derive(Debug, Clone)]
pub struct ArchivePattern {
    regex: Regex,
}

impl ArchivePattern {
    pub fn new(prefix: &str, extension: &str) -> Result<Self> {
        let pattern = format!(
            r"^{}-.+-([0-9]+)\.{}$",
            regex::escape(prefix),
            regex::escape(extension)
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// Return the sequence number if the file name matches
    pub fn sequence_number<'a>(&self, filename: &'a str) -> Option<&'a str> {
        self.regex
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Build an entry for `path` if its file name matches
    pub fn match_path(&self, path: &Path) -> Option<ArchiveEntry> {
        let filename = path.file_name()?.to_str()?;
        let number = self.sequence_number(filename)?;
        let base_name = path.file_stem()?.to_str()?;

        Some(ArchiveEntry {
            filename: filename.to_string(),
            base_name: base_name.to_string(),
            path: path.to_path_buf(),
            number: number.to_string(),
        })
    }
}

/// Scan `source` (non-recursively) for matching archives, sorted by file name
pub fn find_archives(source: &Path, pattern: &ArchivePattern) -> Result<Vec<ArchiveEntry>> {
    info!(source = %source.display(), "Searching for archives...");

    let mut archives = Vec::new();
    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // The source directory itself could not be read
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_none() {
            warn!(path = %entry.path().display(), "Skipping file with a non UTF-8 name");
            continue;
        }

        match pattern.match_path(entry.path()) {
            Some(archive) => {
                info!(archive = %archive.filename, number = %archive.number, "Found archive");
                archives.push(archive);
            }
            None => debug!(path = %entry.path().display(), "Ignoring non-matching file"),
        }
    }

    Ok(archives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn takeout() -> ArchivePattern {
        ArchivePattern::new("takeout", "zip").unwrap()
    }

    #[test]
    fn test_pattern_matches() {
        let pattern = takeout();

        assert_eq!(pattern.sequence_number("takeout-myexport-001.zip"), Some("001"));
        assert_eq!(
            pattern.sequence_number("takeout-20240101T101010Z-42.zip"),
            Some("42")
        );
        // Greedy middle segment: the last digit group is the number
        assert_eq!(pattern.sequence_number("takeout-a-1-007.zip"), Some("007"));
    }

    #[test]
    fn test_pattern_rejects() {
        let pattern = takeout();

        for name in [
            "takeout--001.zip",
            "takeout-001.zip",
            "takeout-x-.zip",
            "takeout-x-01a.zip",
            "takeout-x-001.zip.part",
            "takeout-x-001.tar",
            "Takeout-x-001.zip",
            "my-takeout-x-001.zip",
            "takeout-x-٣.zip",
            "takeout-x-001zip",
        ] {
            assert_eq!(pattern.sequence_number(name), None, "{name} should not match");
        }
    }

    #[test]
    fn test_custom_pattern_escapes() {
        let pattern = ArchivePattern::new("my.export", "tar.gz").unwrap();
        assert_eq!(pattern.sequence_number("my.export-a-3.tar.gz"), Some("3"));
        assert_eq!(pattern.sequence_number("myXexport-a-3.tar.gz"), None);
    }

    #[test]
    fn test_match_path_fields() {
        let pattern = takeout();
        let entry = pattern
            .match_path(Path::new("/src/takeout-myexport-001.zip"))
            .unwrap();

        assert_eq!(entry.filename, "takeout-myexport-001.zip");
        assert_eq!(entry.base_name, "takeout-myexport-001");
        assert_eq!(entry.number, "001");
        assert_eq!(entry.path, PathBuf::from("/src/takeout-myexport-001.zip"));
    }

    #[test]
    fn test_find_archives_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        for name in [
            "takeout-b-002.zip",
            "takeout-a-001.zip",
            "notes.txt",
            "takeout-a-003.rar",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        // Directories with matching names are not archives
        fs::create_dir(dir.path().join("takeout-dir-009.zip")).unwrap();
        // Nested archives are not picked up
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/takeout-n-005.zip"), b"x").unwrap();

        let archives = find_archives(dir.path(), &takeout()).unwrap();
        let names: Vec<_> = archives.iter().map(|a| a.filename.as_str()).collect();

        assert_eq!(names, vec!["takeout-a-001.zip", "takeout-b-002.zip"]);
        assert_eq!(archives[1].number, "002");
    }

    #[cfg(unix)]
    #[test]
    fn test_find_archives_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let odd = OsStr::from_bytes(b"takeout-\xff-004.zip");
        // Some filesystems reject invalid UTF-8 names outright
        if fs::write(dir.path().join(odd), b"x").is_err() {
            return;
        }
        fs::write(dir.path().join("takeout-a-001.zip"), b"x").unwrap();

        let archives = find_archives(dir.path(), &takeout()).unwrap();

        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].number, "001");
    }

    #[test]
    fn test_find_archives_missing_dir() {
        let dir = tempdir().unwrap();
        let result = find_archives(&dir.path().join("missing"), &takeout());
        assert!(result.is_err());
    }
}
