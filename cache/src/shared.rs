use crate::janitor::Janitor;
use crate::loader::Fetch;
use crate::locks::KeyLocks;
use crate::metrics::Metrics;
use crate::scope::KeyScope;
use crate::store::TtlLruStore;

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// The internal, thread-safe core of the cache.
pub(crate) struct CacheShared<C, K, V, E> {
  pub(crate) store: Arc<TtlLruStore<K, V>>,
  pub(crate) locks: Arc<KeyLocks<K>>,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) fetch: Fetch<C, V, E>,
  pub(crate) scope: Arc<dyn KeyScope<C, K>>,
  pub(crate) capacity: Option<NonZeroUsize>,
  pub(crate) janitor: Option<Janitor>,
}

impl<C, K, V, E> fmt::Debug for CacheShared<C, K, V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("store", &self.store)
      .field("capacity", &self.capacity)
      .field("janitor", &self.janitor.is_some())
      .finish_non_exhaustive()
  }
}

impl<C, K, V, E> Drop for CacheShared<C, K, V, E> {
  fn drop(&mut self) {
    if let Some(janitor) = self.janitor.take() {
      janitor.stop();
    }
  }
}
