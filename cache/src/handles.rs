use crate::loader::PreloadReport;
use crate::locks::KeyLock;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::shared::CacheShared;

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A thread-safe cache that memoizes a scoped computation per key.
///
/// Every lookup derives its key from the calling context. Lookups for a key
/// that is cached and younger than the TTL return without taking any per-key
/// lock. On a miss, callers for the same key serialize on that key's lock and
/// exactly one of them runs the fetch function; the rest receive its result.
/// Callers for different keys never wait on each other's fetches.
///
/// Cloning is cheap and yields a handle to the same cache.
#[derive(Debug)]
pub struct ScopedCache<C, K, V, E> {
  pub(crate) shared: Arc<CacheShared<C, K, V, E>>,
}

impl<C, K, V, E> Clone for ScopedCache<C, K, V, E> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<C, K, V, E> ScopedCache<C, K, V, E>
where
  K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Returns the memoized value for the context's key, fetching it on a miss.
  ///
  /// A context without a key bypasses the cache: the fetch function runs on
  /// every such call and its result is never stored.
  ///
  /// Fetch errors are returned unchanged and leave nothing behind, so the
  /// next call for the key fetches again. A panicking fetch unwinds through
  /// this call the same way.
  pub fn get(&self, ctx: &C) -> Result<Arc<V>, E> {
    let shared = &*self.shared;

    let key = match shared.scope.key_of(ctx) {
      Some(key) => key,
      None => {
        Metrics::incr(&shared.metrics.bypasses);
        tracing::warn!("no cache key in context; calling fetch without caching");
        return (shared.fetch)(ctx).map(Arc::new);
      }
    };

    if let Some(value) = shared.store.get(&key) {
      Metrics::incr(&shared.metrics.hits);
      tracing::trace!(?key, "cache hit");
      return Ok(value);
    }

    self.load(ctx, key)
  }

  /// The miss path: double-checked under the key's lock.
  fn load(&self, ctx: &C, key: K) -> Result<Arc<V>, E> {
    let shared = &*self.shared;
    let flight = InFlight {
      lock: Some(shared.locks.get_or_create(&key)),
      shared,
      key,
    };
    let _guard = flight.lock.as_deref().map(|lock| lock.lock());

    // Another caller may have completed the fetch while we waited.
    if let Some(value) = shared.store.get(&flight.key) {
      Metrics::incr(&shared.metrics.coalesced);
      tracing::trace!(key = ?flight.key, "value loaded by a concurrent caller");
      return Ok(value);
    }

    Metrics::incr(&shared.metrics.misses);
    tracing::debug!(key = ?flight.key, "cache miss; fetching");

    match (shared.fetch)(ctx) {
      Ok(value) => {
        let value = Arc::new(value);
        shared.store.insert(flight.key.clone(), value.clone());
        Ok(value)
      }
      Err(err) => {
        Metrics::incr(&shared.metrics.fetch_failures);
        tracing::debug!(key = ?flight.key, "fetch failed; nothing cached");
        Err(err)
      }
    }
  }

  /// Fetches and stores each key in turn, ahead of traffic.
  ///
  /// Keys are processed sequentially with a context built by the key scope.
  /// Results go straight into the store without taking per-key locks, so a
  /// `get` racing a preload of the same key is not excluded and may fetch as
  /// well. Run preload before the cache serves requests if that matters.
  ///
  /// A failing key is reported and skipped; the remaining keys still load.
  pub fn preload<I>(&self, ctx: &C, keys: I) -> PreloadReport<K, E>
  where
    I: IntoIterator<Item = K>,
  {
    let shared = &*self.shared;
    let mut report = PreloadReport::new();

    for key in keys {
      let scoped = shared.scope.scoped(ctx, &key);
      match (shared.fetch)(&scoped) {
        Ok(value) => {
          shared.store.insert(key.clone(), Arc::new(value));
          Metrics::incr(&shared.metrics.preloaded);
          tracing::debug!(?key, "preloaded cache entry");
          report.loaded.push(key);
        }
        Err(err) => {
          tracing::warn!(?key, "preload fetch failed; key left uncached");
          report.failed.push((key, err));
        }
      }
    }

    tracing::debug!(
      loaded = report.loaded.len(),
      failed = report.failed.len(),
      "preload finished"
    );
    report
  }

  /// Removes the entry for `key`, returning `true` if it was present.
  pub fn invalidate(&self, key: &K) -> bool {
    self.shared.store.remove(key)
  }

  /// Removes all entries from the cache.
  pub fn clear(&self) {
    self.shared.store.clear();
  }

  /// Checks whether `key` holds an unexpired value, without touching recency.
  pub fn contains(&self, key: &K) -> bool {
    self.shared.store.contains_live(key)
  }

  /// Number of stored entries. Expired entries count until they are purged.
  pub fn len(&self) -> usize {
    self.shared.store.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The maximum number of keys retained, or `None` when unbounded.
  pub fn capacity(&self) -> Option<usize> {
    self.shared.capacity.map(|c| c.get())
  }

  /// The entry time-to-live, or `None` when entries never expire.
  pub fn time_to_live(&self) -> Option<Duration> {
    self.shared.store.time_to_live()
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self
      .shared
      .metrics
      .snapshot(self.shared.store.len(), self.shared.locks.len())
  }
}

/// A slow-path caller's claim on a key lock.
///
/// Dropping it hands the lock back to the table, including when the fetch
/// unwinds, so a failed or evicted key never strands its lock.
struct InFlight<'a, C, K, V, E>
where
  K: Eq + Hash + Clone,
{
  shared: &'a CacheShared<C, K, V, E>,
  key: K,
  /// Always `Some` until the guard is dropped.
  lock: Option<KeyLock>,
}

impl<'a, C, K, V, E> Drop for InFlight<'a, C, K, V, E>
where
  K: Eq + Hash + Clone,
{
  fn drop(&mut self) {
    if thread::panicking() {
      Metrics::incr(&self.shared.metrics.fetch_failures);
    }
    if let Some(lock) = self.lock.take() {
      let store = &self.shared.store;
      self
        .shared
        .locks
        .release(&self.key, lock, |key| store.contains_key(key));
    }
  }
}
