use crate::error::BuildError;
use crate::handles::ScopedCache;
use crate::janitor::Janitor;
use crate::loader::Fetch;
use crate::locks::{KeyLocks, LockCleanup};
use crate::metrics::Metrics;
use crate::scope::KeyScope;
use crate::shared::CacheShared;
use crate::store::TtlLruStore;
use crate::{time, EvictionListener};

use core::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// How often the janitor purges expired entries unless configured otherwise.
pub const DEFAULT_JANITOR_TICK: Duration = Duration::from_secs(1);

/// A builder for [`ScopedCache`].
///
/// ```
/// use scopecache::{scope::scope_fn, CacheBuilder};
/// use std::convert::Infallible;
/// use std::time::Duration;
///
/// struct Ctx {
///   tenant: Option<String>,
/// }
///
/// let cache = CacheBuilder::new()
///   .capacity(100)
///   .time_to_live(Duration::from_secs(30))
///   .scope(scope_fn(
///     |ctx: &Ctx| ctx.tenant.clone(),
///     |_: &Ctx, tenant: &String| Ctx { tenant: Some(tenant.clone()) },
///   ))
///   .fetch(|ctx: &Ctx| Ok::<_, Infallible>(format!("index for {:?}", ctx.tenant)))
///   .build()
///   .unwrap();
///
/// let value = cache.get(&Ctx { tenant: Some("org-1".into()) }).unwrap();
/// assert_eq!(*value, "index for Some(\"org-1\")");
/// ```
pub struct CacheBuilder<C, K, V, E> {
  capacity: Option<NonZeroUsize>,
  time_to_live: Option<Duration>,
  janitor_tick_interval: Option<Duration>,
  janitor_enabled: bool,
  lock_shards: usize,
  fetch: Option<Fetch<C, V, E>>,
  scope: Option<Arc<dyn KeyScope<C, K>>>,
  listeners: Vec<Arc<dyn EvictionListener<K, V>>>,
}

impl<C, K, V, E> fmt::Debug for CacheBuilder<C, K, V, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("capacity", &self.capacity)
      .field("time_to_live", &self.time_to_live)
      .field("janitor_enabled", &self.janitor_enabled)
      .field("lock_shards", &self.lock_shards)
      .field("has_fetch", &self.fetch.is_some())
      .field("has_scope", &self.scope.is_some())
      .field("listeners", &self.listeners.len())
      .finish_non_exhaustive()
  }
}

impl<C, K, V, E> Default for CacheBuilder<C, K, V, E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C, K, V, E> CacheBuilder<C, K, V, E> {
  /// Creates a builder for an unbounded cache whose entries never expire.
  pub fn new() -> Self {
    Self {
      capacity: None,
      time_to_live: None,
      janitor_tick_interval: None,
      janitor_enabled: true,
      lock_shards: (num_cpus::get() * 4).max(1).next_power_of_two(),
      fetch: None,
      scope: None,
      listeners: Vec::new(),
    }
  }

  /// Sets the maximum number of keys retained. Zero means unbounded.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = NonZeroUsize::new(capacity);
    self
  }

  /// Removes any capacity bound.
  pub fn unbounded(mut self) -> Self {
    self.capacity = None;
    self
  }

  /// Sets the maximum entry age. A zero duration disables expiration.
  pub fn time_to_live(mut self, duration: Duration) -> Self {
    self.time_to_live = time::effective_ttl(Some(duration));
    self
  }

  /// Sets the computation to memoize.
  pub fn fetch<F>(mut self, f: F) -> Self
  where
    F: Fn(&C) -> Result<V, E> + Send + Sync + 'static,
  {
    self.fetch = Some(Arc::new(f));
    self
  }

  /// Sets how cache keys are derived from contexts.
  pub fn scope<S>(mut self, scope: S) -> Self
  where
    S: KeyScope<C, K> + 'static,
  {
    self.scope = Some(Arc::new(scope));
    self
  }

  /// Adds a listener notified of every entry removal. May be called repeatedly;
  /// listeners run in the order they were added.
  pub fn eviction_listener<Listener>(mut self, listener: Listener) -> Self
  where
    Listener: EvictionListener<K, V> + 'static,
  {
    self.listeners.push(Arc::new(listener));
    self
  }

  /// Sets how often the background janitor purges expired entries.
  pub fn janitor_tick_interval(mut self, duration: Duration) -> Self {
    self.janitor_tick_interval = Some(duration);
    self
  }

  /// Disables the background janitor. Expired entries are then only removed
  /// when a lookup finds them.
  pub fn without_janitor(mut self) -> Self {
    self.janitor_enabled = false;
    self
  }

  /// Sets the number of shards in the per-key lock table, rounded up to a
  /// power of two.
  pub fn lock_shards(mut self, shards: usize) -> Self {
    self.lock_shards = shards.max(1).next_power_of_two();
    self
  }

  /// Applies capacity, TTL and janitor settings from a loaded configuration.
  #[cfg(feature = "serde")]
  pub fn config(mut self, config: &crate::config::CacheConfig) -> Self {
    self.capacity = config.capacity();
    self.time_to_live = config.time_to_live();
    if let Some(interval) = config.janitor_interval {
      self.janitor_tick_interval = Some(interval);
    }
    self
  }
}

impl<C, K, V, E> CacheBuilder<C, K, V, E>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Builds the cache, spawning the janitor when a TTL is set.
  pub fn build(self) -> Result<ScopedCache<C, K, V, E>, BuildError> {
    self.validate()?;
    let fetch = self.fetch.ok_or(BuildError::MissingFetch)?;
    let scope = self.scope.ok_or(BuildError::MissingScope)?;

    let metrics = Arc::new(Metrics::new());
    let locks = Arc::new(KeyLocks::new(self.lock_shards));

    // Lock cleanup runs before any user listener.
    let mut listeners: Vec<Arc<dyn EvictionListener<K, V>>> = Vec::with_capacity(self.listeners.len() + 1);
    listeners.push(Arc::new(LockCleanup {
      locks: Arc::clone(&locks),
    }));
    listeners.extend(self.listeners);

    let store = Arc::new(TtlLruStore::new(
      self.capacity,
      self.time_to_live,
      listeners,
      Arc::clone(&metrics),
    ));

    let janitor = if self.janitor_enabled && self.time_to_live.is_some() {
      let tick = self.janitor_tick_interval.unwrap_or(DEFAULT_JANITOR_TICK);
      Some(Janitor::spawn(Arc::clone(&store), tick))
    } else {
      None
    };

    Ok(ScopedCache {
      shared: Arc::new(CacheShared {
        store,
        locks,
        metrics,
        fetch,
        scope,
        capacity: self.capacity,
        janitor,
      }),
    })
  }

  fn validate(&self) -> Result<(), BuildError> {
    if self.fetch.is_none() {
      return Err(BuildError::MissingFetch);
    }
    if self.scope.is_none() {
      return Err(BuildError::MissingScope);
    }
    if self.janitor_tick_interval == Some(Duration::ZERO) {
      return Err(BuildError::ZeroJanitorInterval);
    }
    Ok(())
  }
}
