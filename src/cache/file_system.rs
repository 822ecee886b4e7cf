//! File-backed cache store

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One persisted cache entry, serialized as a single JSON line
#[derive(Serialize, Deserialize)]
struct Record {
    key: String,
    name: String,
    signature: i64,
}

/// Cache of extracted-file fingerprints backed by a single snapshot file
///
/// Construction loads the snapshot left by the previous run; a missing or
/// corrupt snapshot degrades to an empty cache and never fails the caller.
/// During a run, `put` and `is_up_to_date` mark keys as touched. `save`
/// persists the touched entries only, skipping the write entirely when
/// nothing changed since load, and `existing_untouched_files` reports the
/// previously known entries this run never revisited.
pub struct FileSystemCache {
    /// Snapshot file location; need not exist beforehand
    path: PathBuf,
    /// Entries as loaded at construction, untouched for the whole run
    snapshot: BTreeMap<String, Fingerprint>,
    /// Entries as of this run, mutated by put and stale checks
    working: BTreeMap<String, Fingerprint>,
    /// Keys checked or inserted this run; grows monotonically
    touched: BTreeSet<String>,
}

impl FileSystemCache {
    /// Open a cache against the given snapshot file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = load_snapshot(&path);
        debug!(
            path = %path.display(),
            entries = snapshot.len(),
            "loaded cache snapshot"
        );

        Self {
            working: snapshot.clone(),
            snapshot,
            path,
            touched: BTreeSet::new(),
        }
    }

    /// Insert or overwrite the fingerprint for a key and mark it touched
    pub fn put(&mut self, key: &str, fingerprint: Fingerprint) {
        self.touched.insert(key.to_string());
        self.working.insert(key.to_string(), fingerprint);
    }

    /// Check whether a key's stored fingerprint matches the supplied one
    ///
    /// The key is marked touched regardless of the outcome, so a stale
    /// check still keeps the entry alive across `save`. On a match this
    /// returns true. On a mismatch the stored entry is overwritten with
    /// the supplied fingerprint (same semantics as `put`), so the next
    /// `save` records the fingerprint the caller is about to extract
    /// rather than the stale one.
    pub fn is_up_to_date(&mut self, key: &str, fingerprint: &Fingerprint) -> bool {
        self.touched.insert(key.to_string());

        match self.working.get(key) {
            Some(existing) if existing == fingerprint => true,
            Some(_) => {
                self.working.insert(key.to_string(), fingerprint.clone());
                false
            }
            None => false,
        }
    }

    /// Persist the touched entries as the next snapshot
    ///
    /// Entries never touched this run are dropped from both the snapshot
    /// file and the in-memory working set. If the touched entries are
    /// identical to the snapshot loaded at construction the write is
    /// skipped entirely, leaving the backing file untouched (it is not
    /// recreated if something deleted it in the meantime).
    pub fn save(&mut self) -> Result<(), CacheError> {
        let next: BTreeMap<String, Fingerprint> = self
            .working
            .iter()
            .filter(|(key, _)| self.touched.contains(*key))
            .map(|(key, fp)| (key.clone(), fp.clone()))
            .collect();

        self.working = next.clone();

        if next == self.snapshot {
            debug!(path = %self.path.display(), "cache unchanged, skipping write");
            return Ok(());
        }

        let mut contents = String::new();
        for (key, fp) in &next {
            let record = Record {
                key: key.clone(),
                name: fp.name.clone(),
                signature: fp.signature,
            };
            let line = serde_json::to_string(&record).map_err(|e| CacheError::Save {
                path: self.path.clone(),
                source: std::io::Error::new(ErrorKind::InvalidData, e),
            })?;
            contents.push_str(&line);
            contents.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| CacheError::Save {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        fs::write(&self.path, contents).map_err(|source| CacheError::Save {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            entries = next.len(),
            "wrote cache snapshot"
        );
        Ok(())
    }

    /// Resolve previously known entries this run never touched
    ///
    /// Each untouched key from the snapshot loaded at construction is
    /// joined onto `base` and included only when a file actually exists
    /// there. These are the extracted files the caller should delete. An
    /// existence probe that fails for a reason other than not-found is an
    /// error; a partial listing must not pass for a complete one.
    pub fn existing_untouched_files(&self, base: &Path) -> Result<HashSet<PathBuf>, CacheError> {
        let mut files = HashSet::new();

        for key in self.snapshot.keys() {
            if self.touched.contains(key) {
                continue;
            }

            let candidate = base.join(key);
            match candidate.try_exists() {
                Ok(true) => {
                    files.insert(candidate);
                }
                Ok(false) => {}
                Err(source) => {
                    return Err(CacheError::Resolve {
                        path: candidate,
                        source,
                    })
                }
            }
        }

        Ok(files)
    }
}

/// Read a snapshot file, degrading to empty on any failure
///
/// A missing file is the normal first-run case. An unreadable file or a
/// garbled record means everything gets re-extracted, which is always
/// safe; individual unparseable lines are skipped so the readable
/// remainder still counts.
fn load_snapshot(path: &Path) -> BTreeMap<String, Fingerprint> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cache snapshot unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    let mut entries = BTreeMap::new();
    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(record) => {
                entries.insert(record.key, Fingerprint::new(record.name, record.signature));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unparseable cache record");
            }
        }
    }

    entries
}
