use crate::context::{NamespaceScope, RequestContext};
use crate::error::ProviderError;
use crate::index::DataSourceIndex;
use crate::lister::DataSourceLister;

use scopecache::{BuildError, CacheBuilder, CacheConfig, MetricsSnapshot, PreloadReport, ScopedCache};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default number of namespaces whose index is kept.
pub const DEFAULT_CAPACITY: i64 = 1000;
/// Default age after which a namespace's index is rebuilt.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(10);

/// Serves the datasource index of the context's namespace.
pub trait DataSourceIndexProvider: Send + Sync {
  fn index(&self, ctx: &RequestContext) -> Result<Arc<DataSourceIndex>, ProviderError>;
}

/// Lists and builds a fresh index on every call.
#[derive(Debug, Clone)]
pub struct DirectIndexProvider<L> {
  lister: L,
}

impl<L: DataSourceLister> DirectIndexProvider<L> {
  pub fn new(lister: L) -> Self {
    Self { lister }
  }
}

impl<L: DataSourceLister> DataSourceIndexProvider for DirectIndexProvider<L> {
  fn index(&self, ctx: &RequestContext) -> Result<Arc<DataSourceIndex>, ProviderError> {
    build_index(&self.lister, ctx).map(Arc::new)
  }
}

fn build_index<L>(lister: &L, ctx: &RequestContext) -> Result<DataSourceIndex, ProviderError>
where
  L: DataSourceLister + ?Sized,
{
  ctx.check_deadline()?;
  let records = lister.list(ctx)?;
  ctx.check_deadline()?;

  let count = records.len();
  let index = DataSourceIndex::build(records);
  tracing::debug!(
    namespace = ctx.namespace().unwrap_or_default(),
    records = count,
    "built datasource index"
  );
  Ok(index)
}

pub fn default_config() -> CacheConfig {
  CacheConfig::new(DEFAULT_CAPACITY, DEFAULT_TIME_TO_LIVE)
}

/// A [`DataSourceIndexProvider`] that memoizes each namespace's index.
///
/// At most one listing per namespace is in flight. Listings for different
/// namespaces run in parallel. Contexts without a namespace are listed
/// directly and never cached.
#[derive(Clone)]
pub struct CachedIndexProvider {
  cache: ScopedCache<RequestContext, String, DataSourceIndex, ProviderError>,
}

impl fmt::Debug for CachedIndexProvider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CachedIndexProvider")
      .field("capacity", &self.cache.capacity())
      .field("time_to_live", &self.cache.time_to_live())
      .field("namespaces", &self.cache.len())
      .finish()
  }
}

impl CachedIndexProvider {
  /// A provider with the default capacity and TTL.
  pub fn new<L>(lister: L) -> Result<Self, BuildError>
  where
    L: DataSourceLister + 'static,
  {
    Self::with_config(lister, &default_config())
  }

  pub fn with_config<L>(lister: L, config: &CacheConfig) -> Result<Self, BuildError>
  where
    L: DataSourceLister + 'static,
  {
    let cache = CacheBuilder::new()
      .config(config)
      .scope(NamespaceScope)
      .fetch(move |ctx: &RequestContext| build_index(&lister, ctx))
      .build()?;
    Ok(Self { cache })
  }

  /// Builds and caches the index of each namespace, one after another.
  ///
  /// Preload does not take the per-namespace locks. Run it before the
  /// provider serves requests.
  pub fn preload<I, S>(&self, ctx: &RequestContext, namespaces: I) -> PreloadReport<String, ProviderError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let report = self.cache.preload(ctx, namespaces.into_iter().map(Into::into));
    for (namespace, err) in &report.failed {
      tracing::warn!(namespace, error = %err, "failed to preload datasource index");
    }
    report
  }

  /// Drops a namespace's index so the next lookup rebuilds it.
  pub fn invalidate(&self, namespace: &str) -> bool {
    self.cache.invalidate(&namespace.to_string())
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.cache.metrics()
  }
}

impl DataSourceIndexProvider for CachedIndexProvider {
  fn index(&self, ctx: &RequestContext) -> Result<Arc<DataSourceIndex>, ProviderError> {
    self.cache.get(ctx)
  }
}
