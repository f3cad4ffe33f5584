use crate::time;

use std::sync::Arc;
use std::time::Duration;

/// A value held by the store together with the time it was stored.
///
/// Never handed out to callers; they receive a clone of `value`.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  pub(crate) value: Arc<V>,
  /// Insertion (or last refresh) timestamp in nanoseconds since the cache epoch.
  inserted_at: u64,
}

impl<V> CacheEntry<V> {
  pub(crate) fn new(value: Arc<V>) -> Self {
    Self {
      value,
      inserted_at: time::now_nanos(),
    }
  }

  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  /// Checks the entry's age against `ttl`. `None` means entries never expire.
  #[inline]
  pub(crate) fn is_expired(&self, ttl: Option<Duration>) -> bool {
    match ttl {
      Some(ttl) => {
        let age = time::now_nanos().saturating_sub(self.inserted_at);
        age >= time::saturating_nanos(ttl)
      }
      None => false,
    }
  }
}
