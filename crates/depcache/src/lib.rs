//! Shared dependency cache: one line per analyzed source file listing the
//! files it imports.
//!
//! Several analyzer processes update the same cache concurrently. Each update
//! takes an exclusive lock with bounded retries, reads the whole cache,
//! replaces the line for its own file and atomically rewrites the cache. When
//! the lock cannot be taken the update is skipped.

mod cache;
pub mod lock;
pub mod record;

pub use cache::{DependencyCache, MergeOutcome};
pub use lock::{CacheLock, RetryPolicy};
pub use record::{import_target, record_key, DependencyRecord, ImportEntry};

/// Default cache file name inside the output directory.
pub const DEFAULT_CACHE_FILE: &str = "incdeps.txt";

#[cfg(test)]
mod tests;
