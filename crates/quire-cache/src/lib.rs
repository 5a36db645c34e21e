//! Cache abstraction for Quire.
//!
//! Consumers talk to two traits and never to a concrete store:
//!
//! - [`Cache`]: factory for named cache buckets
//! - [`CacheBucket`]: key-value store with etag-based invalidation
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: caching disabled (always miss)
//! - [`MemoryCache`]: process-local buckets shared between handles
//!
//! # Example
//!
//! ```
//! use quire_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("templates");
//! bucket.set("invoice", "v1", b"{}");
//! assert_eq!(bucket.get("invoice", "v1"), Some(b"{}".to_vec()));
//! assert_eq!(bucket.get("invoice", "v2"), None);
//! ```

mod ext;
mod memory;

pub use ext::CacheBucketExt;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Values are stored together with an etag, an opaque string picked by the
/// caller (a version counter, a timestamp, a content hash). A lookup hits only
/// when both the key and the etag match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on a miss or when the entry was stored under another
    /// etag. An empty `etag` skips validation.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any existing entry for `key`.
    fn set(&self, key: &str, etag: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets with different names never see each other's entries. Opening the
/// same name twice yields handles over the same entries.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`]: every `get` misses, every `set` is dropped.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}
}

/// No-op [`Cache`], used when `[cache] enabled = false`.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
