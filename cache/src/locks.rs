use crate::listener::{EvictionListener, EvictionReason};

use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use ahash::HashMap;
use crossbeam_utils::CachePadded;
use parking_lot::Mutex;

/// The lock guarding fetch execution for one key.
pub(crate) type KeyLock = Arc<Mutex<()>>;

/// One exclusive lock per cache key, created on demand.
///
/// The table is split into independently locked shards. A shard mutex is only
/// held for map bookkeeping; fetches run under the per-key lock, so callers of
/// different keys never wait on each other for longer than a map operation.
///
/// Locks are reference counted. A lock is only dropped from the table when
/// nobody else holds a clone of it, which makes removal safe while a fetch is
/// in flight: the holder and its waiters keep sharing the same lock.
pub(crate) struct KeyLocks<K> {
  shards: Box<[CachePadded<Mutex<HashMap<K, KeyLock>>>]>,
  hasher: ahash::RandomState,
}

impl<K: Eq + Hash + Clone> KeyLocks<K> {
  /// `shards` must be a power of two.
  pub(crate) fn new(shards: usize) -> Self {
    debug_assert!(shards.is_power_of_two());
    let shards = (0..shards)
      .map(|_| CachePadded::new(Mutex::new(HashMap::default())))
      .collect::<Vec<_>>()
      .into_boxed_slice();
    Self {
      shards,
      hasher: ahash::RandomState::new(),
    }
  }

  #[inline]
  fn shard(&self, key: &K) -> &Mutex<HashMap<K, KeyLock>> {
    let hash = BuildHasher::hash_one(&self.hasher, key);
    &self.shards[hash as usize & (self.shards.len() - 1)]
  }

  /// Returns the lock for `key`, creating it if this is the first contender.
  pub(crate) fn get_or_create(&self, key: &K) -> KeyLock {
    let mut shard = self.shard(key).lock();
    if let Some(lock) = shard.get(key) {
      return lock.clone();
    }
    let lock = KeyLock::default();
    shard.insert(key.clone(), lock.clone());
    lock
  }

  /// Hands a slow-path caller's `lock` back to the table.
  ///
  /// The table entry is dropped when the caller is its last user and
  /// `still_cached` reports that the store no longer has the key (the fetch
  /// failed, or the entry was evicted while the fetch was running).
  ///
  /// The caller's reference is dropped before the shard is unlocked, so a
  /// concurrent `discard` never counts it.
  pub(crate) fn release<F>(&self, key: &K, lock: KeyLock, still_cached: F)
  where
    F: FnOnce(&K) -> bool,
  {
    let mut shard = self.shard(key).lock();
    // One reference is the table's, the other the caller's.
    let last_user = shard
      .get(key)
      .map_or(false, |held| Arc::ptr_eq(held, &lock) && Arc::strong_count(&lock) == 2);
    if last_user && !still_cached(key) {
      shard.remove(key);
    }
    drop(lock);
    drop(shard);
  }

  /// Drops the lock for an evicted key unless a caller still holds it.
  pub(crate) fn discard(&self, key: &K) -> bool {
    let mut shard = self.shard(key).lock();
    let idle = shard
      .get(key)
      .map_or(false, |lock| Arc::strong_count(lock) == 1);
    if idle {
      shard.remove(key);
    }
    idle
  }

  pub(crate) fn len(&self) -> usize {
    self.shards.iter().map(|shard| shard.lock().len()).sum()
  }

  #[cfg(test)]
  fn contains(&self, key: &K) -> bool {
    self.shard(key).lock().contains_key(key)
  }
}

/// Eviction callback that keeps the lock table from outliving the store.
pub(crate) struct LockCleanup<K> {
  pub(crate) locks: Arc<KeyLocks<K>>,
}

impl<K, V> EvictionListener<K, V> for LockCleanup<K>
where
  K: Eq + Hash + Clone + Send + Sync,
{
  fn on_evict(&self, key: K, _value: Arc<V>, _reason: EvictionReason) {
    if !self.locks.discard(&key) {
      tracing::trace!("key lock still held during eviction; its holder will release it");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_key_shares_one_lock() {
    let locks = KeyLocks::new(4);
    let a = locks.get_or_create(&"tenant-a");
    let b = locks.get_or_create(&"tenant-a");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(locks.len(), 1);

    let other = locks.get_or_create(&"tenant-b");
    assert!(!Arc::ptr_eq(&a, &other));
    assert_eq!(locks.len(), 2);
  }

  #[test]
  fn discard_skips_held_locks() {
    let locks = KeyLocks::new(1);
    let held = locks.get_or_create(&1);
    assert!(!locks.discard(&1), "A held lock must survive eviction");
    assert!(locks.contains(&1));

    drop(held);
    assert!(locks.discard(&1));
    assert!(!locks.contains(&1));
    assert!(!locks.discard(&1));
  }

  #[test]
  fn release_keeps_lock_while_key_is_cached() {
    let locks = KeyLocks::new(2);
    let lock = locks.get_or_create(&"k");
    locks.release(&"k", lock, |_| true);
    assert!(locks.contains(&"k"));
  }

  #[test]
  fn eviction_after_release_discards_the_lock() {
    let locks = KeyLocks::new(1);
    let lock = locks.get_or_create(&"k");
    locks.release(&"k", lock, |_| true);

    // The key is evicted right after its fetcher left.
    assert!(locks.discard(&"k"));
    assert_eq!(locks.len(), 0);
  }

  #[test]
  fn release_drops_idle_lock_for_uncached_key() {
    let locks = KeyLocks::new(2);
    let lock = locks.get_or_create(&"k");
    locks.release(&"k", lock, |_| false);
    assert_eq!(locks.len(), 0);
  }

  #[test]
  fn release_keeps_lock_while_others_wait() {
    let locks = KeyLocks::new(2);
    let first = locks.get_or_create(&"k");
    let waiter = locks.get_or_create(&"k");
    locks.release(&"k", first, |_| false);
    assert!(locks.contains(&"k"), "The waiter still needs the same lock");

    locks.release(&"k", waiter, |_| false);
    assert!(!locks.contains(&"k"));
  }
}
