//! Persistent extraction cache
//!
//! Tracks (key, fingerprint) pairs across runs. Keys checked or inserted
//! during a run are "touched"; at save time only touched keys survive into
//! the next snapshot, so entries from a prior run that were never revisited
//! fall out of the cache and can be reported as deletion candidates.

pub mod file_system;

pub use file_system::FileSystemCache;
