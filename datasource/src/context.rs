use crate::error::ProviderError;
use crate::namespace::NamespaceInfo;

use scopecache::KeyScope;
use std::time::{Duration, Instant};

/// The calling context handed through the cache to the datasource lister.
///
/// The namespace is the cache key. The deadline is never enforced by the
/// cache itself; fetches check it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
  namespace: Option<String>,
  deadline: Option<Instant>,
}

impl RequestContext {
  /// A context with no namespace and no deadline. Lookups through it bypass
  /// the cache.
  pub fn background() -> Self {
    Self::default()
  }

  pub fn with_namespace(namespace: impl Into<String>) -> Self {
    Self {
      namespace: Some(namespace.into()),
      deadline: None,
    }
  }

  /// Scopes a context to `namespace` and parses its tenant.
  ///
  /// An empty namespace yields an unscoped context. A namespace that does not
  /// parse still scopes the context; only the tenant info is missing.
  pub fn for_namespace(namespace: &str) -> (Self, Option<NamespaceInfo>) {
    if namespace.is_empty() {
      return (Self::background(), None);
    }

    let ctx = Self::with_namespace(namespace);
    match NamespaceInfo::parse(namespace) {
      Ok(info) => (ctx, Some(info)),
      Err(err) => {
        tracing::debug!(namespace, error = %err, "namespace has no tenant info");
        (ctx, None)
      }
    }
  }

  pub fn deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(deadline);
    self
  }

  /// Sets the deadline `timeout` from now. A timeout too large to represent
  /// leaves the context without a deadline.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.deadline = Instant::now().checked_add(timeout);
    self
  }

  pub fn namespace(&self) -> Option<&str> {
    self.namespace.as_deref()
  }

  pub fn deadline_at(&self) -> Option<Instant> {
    self.deadline
  }

  pub fn is_expired(&self) -> bool {
    self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
  }

  /// Fails with [`ProviderError::DeadlineExceeded`] once the deadline has passed.
  pub fn check_deadline(&self) -> Result<(), ProviderError> {
    if self.is_expired() {
      return Err(ProviderError::DeadlineExceeded {
        namespace: self.namespace().unwrap_or_default().to_string(),
      });
    }
    Ok(())
  }
}

/// Keys the cache by namespace. A missing or empty namespace has no key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceScope;

impl KeyScope<RequestContext, String> for NamespaceScope {
  fn key_of(&self, ctx: &RequestContext) -> Option<String> {
    ctx.namespace().filter(|ns| !ns.is_empty()).map(str::to_string)
  }

  fn scoped(&self, ctx: &RequestContext, namespace: &String) -> RequestContext {
    RequestContext {
      namespace: Some(namespace.clone()),
      deadline: ctx.deadline,
    }
  }
}
