//! Typed access on top of raw byte buckets.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON convenience methods for every [`CacheBucket`].
///
/// Implementors only deal in bytes; callers store and load serde types.
///
/// ```
/// use quire_cache::{Cache, CacheBucketExt, MemoryCache};
///
/// let bucket = MemoryCache::new().bucket("templates");
/// bucket.set_json("invoice", "3", &vec!["a", "b"]);
///
/// let hit: Option<Vec<String>> = bucket.get_json("invoice", "3");
/// assert_eq!(hit, Some(vec!["a".to_owned(), "b".to_owned()]));
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Load and deserialize a cached value.
    ///
    /// Entries that no longer deserialize count as misses.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serialize and store a value. Serialization failures are logged and skipped.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::warn!(key, error = %e, "failed to encode cache entry"),
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}
