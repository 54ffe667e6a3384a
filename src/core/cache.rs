//! Optional memoization of encoded tokens.
//!
//! The cache is split into shards, each an LRU behind its own mutex. A miss is
//! computed while the shard is locked, so concurrent callers asking for the
//! same token compute it once and the others wait for the stored result.

use lru::LruCache;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Suggested capacity when enabling the cache.
pub const DEFAULT_CACHE_SIZE: usize = 4096;

const MAX_SHARDS: usize = 16;

type Shard = Mutex<LruCache<Vec<u8>, Vec<String>>>;

/// Sharded LRU from raw token bytes to encoded symbols.
pub(crate) struct EncodeCache {
    shards: Box<[Shard]>,
    capacity: usize,
}

impl EncodeCache {
    /// Create a cache holding at most `capacity` entries, or `None` for zero.
    ///
    /// The capacity is split exactly across shards; the first
    /// `capacity % shard_count` shards take one extra entry.
    pub(crate) fn new(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        let shard_count = capacity.get().min(MAX_SHARDS);
        let base = capacity.get() / shard_count;
        let extra = capacity.get() % shard_count;

        let shards = (0..shard_count)
            .map(|i| {
                let size = base + usize::from(i < extra);
                let size = NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN);
                Mutex::new(LruCache::new(size))
            })
            .collect();

        Some(Self {
            shards,
            capacity: capacity.get(),
        })
    }

    fn shard(&self, key: &[u8]) -> &Shard {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// A poisoned shard is bypassed and `compute` runs uncached.
    pub(crate) fn get_or_compute(
        &self,
        key: &[u8],
        compute: impl FnOnce() -> Vec<String>,
    ) -> Vec<String> {
        let Ok(mut shard) = self.shard(key).lock() else {
            return compute();
        };
        if let Some(cached) = shard.get(key) {
            return cached.clone();
        }
        let value = compute();
        shard.put(key.to_vec(), value.clone());
        value
    }

    pub(crate) fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|shard| shard.lock().ok().map(|s| s.len()))
            .sum()
    }

    pub(crate) fn clear(&self) {
        for shard in self.shards.iter() {
            if let Ok(mut shard) = shard.lock() {
                shard.clear();
            }
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}
