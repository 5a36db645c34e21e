//! In-process cache backed by hash maps.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Cache, CacheBucket};

/// Bucket name to entries.
type Buckets = HashMap<String, HashMap<String, Entry>>;

struct Entry {
    etag: String,
    data: Vec<u8>,
}

/// Process-local [`Cache`].
///
/// Bucket handles share one map, so an entry written through one handle is
/// visible through every other handle of the same bucket. Lock poisoning is
/// treated as a miss.
#[derive(Clone, Default)]
pub struct MemoryCache {
    buckets: Arc<RwLock<Buckets>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            buckets: Arc::clone(&self.buckets),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    buckets: Arc<RwLock<Buckets>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let buckets = self.buckets.read().ok()?;
        let entry = buckets.get(&self.name)?.get(key)?;
        if !etag.is_empty() && entry.etag != etag {
            return None;
        }
        Some(entry.data.clone())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let Ok(mut buckets) = self.buckets.write() else {
            tracing::warn!(bucket = %self.name, "cache lock poisoned, skipping write");
            return;
        };
        buckets.entry(self.name.clone()).or_default().insert(
            key.to_owned(),
            Entry {
                etag: etag.to_owned(),
                data: value.to_vec(),
            },
        );
    }
}
