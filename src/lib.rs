//! Extraction cache library
//!
//! Tracks which extracted files are still up to date across runs so the
//! extraction tool can skip unchanged files and delete files that dropped
//! out of the input set. This crate owns only the cache; copying files,
//! walking directories, and deciding what to extract belong to the caller.

pub mod cache;
pub mod error;
pub mod fingerprint;

pub use cache::FileSystemCache;
pub use error::CacheError;
pub use fingerprint::Fingerprint;
