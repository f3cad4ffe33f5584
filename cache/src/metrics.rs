use crate::listener::EvictionReason;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Counters bumped on every lookup, fetch and removal. Each counter is
/// cache-padded.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) coalesced: CachePadded<AtomicU64>,
  pub(crate) bypasses: CachePadded<AtomicU64>,

  // --- Fetches ---
  pub(crate) fetch_failures: CachePadded<AtomicU64>,
  pub(crate) preloaded: CachePadded<AtomicU64>,

  // --- Removals ---
  pub(crate) evicted_by_capacity: CachePadded<AtomicU64>,
  pub(crate) evicted_by_ttl: CachePadded<AtomicU64>,
  pub(crate) invalidations: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      coalesced: CachePadded::new(AtomicU64::new(0)),
      bypasses: CachePadded::new(AtomicU64::new(0)),
      fetch_failures: CachePadded::new(AtomicU64::new(0)),
      preloaded: CachePadded::new(AtomicU64::new(0)),
      evicted_by_capacity: CachePadded::new(AtomicU64::new(0)),
      evicted_by_ttl: CachePadded::new(AtomicU64::new(0)),
      invalidations: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  pub(crate) fn record_removal(&self, reason: EvictionReason) {
    let counter = match reason {
      EvictionReason::Capacity => &self.evicted_by_capacity,
      EvictionReason::Expired => &self.evicted_by_ttl,
      EvictionReason::Invalidated => &self.invalidations,
    };
    Self::incr(counter);
  }

  /// Creates a point-in-time snapshot. Gauges that live outside the counters
  /// (entry and lock counts) are supplied by the caller.
  pub(crate) fn snapshot(&self, entries: usize, key_locks: usize) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let coalesced = self.coalesced.load(Ordering::Relaxed);
    let served_from_cache = hits + coalesced;
    let total_lookups = served_from_cache + misses;

    MetricsSnapshot {
      hits,
      misses,
      coalesced,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        served_from_cache as f64 / total_lookups as f64
      },
      bypasses: self.bypasses.load(Ordering::Relaxed),
      fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
      preloaded: self.preloaded.load(Ordering::Relaxed),
      evicted_by_capacity: self.evicted_by_capacity.load(Ordering::Relaxed),
      evicted_by_ttl: self.evicted_by_ttl.load(Ordering::Relaxed),
      invalidations: self.invalidations.load(Ordering::Relaxed),
      entries: entries as u64,
      key_locks: key_locks as u64,
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// Counters and gauges of a cache, read at one point in time.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Lookups answered by the lock-free fast path.
  pub hits: u64,
  /// Lookups that ran the fetch function (cache misses).
  pub misses: u64,
  /// Slow-path lookups that found the value after waiting on another caller's fetch.
  pub coalesced: u64,
  /// The fraction of scoped lookups served without running a fetch.
  pub hit_ratio: f64,
  /// Calls with no extractable key that bypassed the cache.
  pub bypasses: u64,
  /// Fetches started by `get` that returned an error or panicked.
  pub fetch_failures: u64,
  /// Keys written by `preload`.
  pub preloaded: u64,
  /// Entries evicted to stay within capacity.
  pub evicted_by_capacity: u64,
  /// Entries removed because they outlived the TTL.
  pub evicted_by_ttl: u64,
  /// Entries removed by `invalidate` or `clear`.
  pub invalidations: u64,
  /// Entries currently held by the store, expired ones included until purged.
  pub entries: u64,
  /// Per-key locks currently alive in the lock table.
  pub key_locks: u64,
  /// Seconds since the cache was built.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("coalesced", &self.coalesced)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("bypasses", &self.bypasses)
      .field("fetch_failures", &self.fetch_failures)
      .field("preloaded", &self.preloaded)
      .field("evicted_by_capacity", &self.evicted_by_capacity)
      .field("evicted_by_ttl", &self.evicted_by_ttl)
      .field("invalidations", &self.invalidations)
      .field("entries", &self.entries)
      .field("key_locks", &self.key_locks)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
