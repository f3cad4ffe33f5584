use crate::entry::CacheEntry;
use crate::listener::{EvictionListener, EvictionReason};
use crate::lru_list::LruList;
use crate::metrics::Metrics;

use core::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

type Removed<K, V> = Vec<(K, Arc<V>, EvictionReason)>;

/// A bounded map from key to value with TTL expiry and LRU eviction.
///
/// The mutex guards only O(1) structural operations; no user code runs while
/// it is held. Removals are collected under the lock and reported to the
/// listeners after it is released, in registration order.
pub(crate) struct TtlLruStore<K, V> {
  entries: Mutex<LruList<K, CacheEntry<V>>>,
  capacity: Option<NonZeroUsize>,
  time_to_live: Option<Duration>,
  listeners: Vec<Arc<dyn EvictionListener<K, V>>>,
  metrics: Arc<Metrics>,
}

impl<K, V> fmt::Debug for TtlLruStore<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TtlLruStore")
      .field("capacity", &self.capacity)
      .field("time_to_live", &self.time_to_live)
      .field("listeners", &self.listeners.len())
      .finish_non_exhaustive()
  }
}

impl<K: Eq + Hash + Clone, V> TtlLruStore<K, V> {
  /// `capacity: None` means unbounded, `time_to_live: None` means entries never expire.
  pub(crate) fn new(
    capacity: Option<NonZeroUsize>,
    time_to_live: Option<Duration>,
    listeners: Vec<Arc<dyn EvictionListener<K, V>>>,
    metrics: Arc<Metrics>,
  ) -> Self {
    Self {
      entries: Mutex::new(LruList::new()),
      capacity,
      time_to_live,
      listeners,
      metrics,
    }
  }

  pub(crate) fn time_to_live(&self) -> Option<Duration> {
    self.time_to_live
  }

  /// Returns the live value for `key` and marks it most recently used.
  ///
  /// An expired entry is treated as absent and removed on the spot.
  pub(crate) fn get(&self, key: &K) -> Option<Arc<V>> {
    let expired = {
      let mut entries = self.entries.lock();
      match entries.peek(key) {
        None => return None,
        Some(entry) if !entry.is_expired(self.time_to_live) => {
          let value = entry.value();
          entries.move_to_front(key);
          return Some(value);
        }
        Some(_) => entries.remove(key),
      }
    };

    if let Some(entry) = expired {
      self.notify(vec![(key.clone(), entry.value, EvictionReason::Expired)]);
    }
    None
  }

  /// Checks for a live entry without touching recency.
  pub(crate) fn contains_live(&self, key: &K) -> bool {
    self
      .entries
      .lock()
      .peek(key)
      .map_or(false, |entry| !entry.is_expired(self.time_to_live))
  }

  /// Checks for any entry, expired or not. Used for lock-table accounting.
  pub(crate) fn contains_key(&self, key: &K) -> bool {
    self.entries.lock().contains(key)
  }

  /// Stores `value` under `key` with a fresh timestamp, evicting the least
  /// recently used entries while over capacity.
  pub(crate) fn insert(&self, key: K, value: Arc<V>) {
    let mut removed = Vec::new();
    {
      let mut entries = self.entries.lock();
      // A replaced value is an overwrite, not an eviction.
      entries.push_front(key, CacheEntry::new(value));

      if let Some(capacity) = self.capacity {
        while entries.len() > capacity.get() {
          match entries.pop_back() {
            Some((victim, entry)) => {
              removed.push((victim, entry.value, EvictionReason::Capacity));
            }
            None => break,
          }
        }
      }
    }
    self.notify(removed);
  }

  pub(crate) fn remove(&self, key: &K) -> bool {
    let removed = self.entries.lock().remove(key);
    match removed {
      Some(entry) => {
        self.notify(vec![(key.clone(), entry.value, EvictionReason::Invalidated)]);
        true
      }
      None => false,
    }
  }

  pub(crate) fn clear(&self) {
    let drained = self.entries.lock().drain_all();
    self.notify(
      drained
        .into_iter()
        .map(|(key, entry)| (key, entry.value, EvictionReason::Invalidated))
        .collect(),
    );
  }

  /// Removes every expired entry. Returns how many were purged.
  pub(crate) fn purge_expired(&self) -> usize {
    let ttl = match self.time_to_live {
      Some(ttl) => ttl,
      None => return 0,
    };

    let expired = self
      .entries
      .lock()
      .drain_where(|entry| entry.is_expired(Some(ttl)));
    let count = expired.len();
    self.notify(
      expired
        .into_iter()
        .map(|(key, entry)| (key, entry.value, EvictionReason::Expired))
        .collect(),
    );
    count
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.lock().len()
  }

  // Must be called without holding `entries`.
  fn notify(&self, removed: Removed<K, V>) {
    for (key, value, reason) in removed {
      self.metrics.record_removal(reason);
      tracing::debug!(%reason, "cache entry removed");
      for listener in &self.listeners {
        listener.on_evict(key.clone(), value.clone(), reason);
      }
    }
  }
}
