//! Error types for cache operations
//!
//! Only two conditions surface to the caller: a failed snapshot write
//! (silently losing it would corrupt future runs) and a failed existence
//! probe while collecting deletion candidates (a partial result must not
//! be reported as complete). Everything else degrades to an empty cache
//! or a `false` answer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to write cache snapshot to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to check for untouched file at {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
