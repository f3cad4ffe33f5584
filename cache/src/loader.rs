use std::sync::Arc;

/// The memoized computation. Receives the caller's context unchanged, so any
/// deadline or cancellation it carries is the fetch function's to honor.
pub(crate) type Fetch<C, V, E> = Arc<dyn Fn(&C) -> Result<V, E> + Send + Sync>;

/// Outcome of a [`ScopedCache::preload`](crate::ScopedCache::preload) run.
#[derive(Debug)]
pub struct PreloadReport<K, E> {
  /// Keys fetched and stored, in the order they were given.
  pub loaded: Vec<K>,
  /// Keys whose fetch failed, with the error. Nothing was stored for them.
  pub failed: Vec<(K, E)>,
}

impl<K, E> PreloadReport<K, E> {
  pub(crate) fn new() -> Self {
    Self {
      loaded: Vec::new(),
      failed: Vec::new(),
    }
  }

  pub fn is_complete(&self) -> bool {
    self.failed.is_empty()
  }
}
