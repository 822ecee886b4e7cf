//! Fingerprint type for change detection

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Expected state of a tracked resource
///
/// A fingerprint pairs a resource name (typically a relative path) with a
/// numeric signature, usually the last-modified timestamp in milliseconds.
/// Two fingerprints are equal only when both fields match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub name: String,
    pub signature: i64,
}

impl Fingerprint {
    pub fn new(name: impl Into<String>, signature: i64) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }

    /// Compute a fingerprint from a file's metadata
    ///
    /// `name` is the identifier recorded in the fingerprint, typically the
    /// same relative path used as the cache key; `path` is where the file
    /// actually lives. Uses the mtime in milliseconds as the signature.
    /// Does not read file contents.
    pub fn of_file(name: impl Into<String>, path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

        let mtime = metadata
            .modified()
            .with_context(|| format!("Failed to get mtime: {}", path.display()))?;

        let signature = match mtime.duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_millis() as i64,
            // mtime before the epoch, seen on some restored archives
            Err(e) => -(e.duration().as_millis() as i64),
        };

        Ok(Self {
            name: name.into(),
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_equality_requires_both_fields() {
        let fp = Fingerprint::new("foo", 123);

        assert_eq!(fp, Fingerprint::new("foo", 123));
        assert_ne!(fp, Fingerprint::new("foo", 456));
        assert_ne!(fp, Fingerprint::new("bar", 123));
    }

    #[test]
    fn test_of_file_uses_caller_name() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "hello world").unwrap();

        // the name is the relative cache key, not the resolved path
        let fp = Fingerprint::of_file("test.txt", &file_path).unwrap();
        assert_eq!(fp.name, "test.txt");
        assert!(fp.signature > 0);
    }

    #[test]
    fn test_of_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = Fingerprint::of_file("absent.txt", &temp_dir.path().join("absent.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_of_file_stable_until_modified() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original").unwrap();

        let fp1 = Fingerprint::of_file("test.txt", &file_path).unwrap();
        let fp2 = Fingerprint::of_file("test.txt", &file_path).unwrap();
        assert_eq!(fp1, fp2);

        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&file_path, "modified content").unwrap();

        let fp3 = Fingerprint::of_file("test.txt", &file_path).unwrap();
        assert_ne!(fp1, fp3);
    }
}
