#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scopecache::{CacheBuilder, KeyScope, ScopedCache};

/// A stand-in for a request context: an optional tenant plus a marker that
/// fetches echo back, so tests can tell which context reached the fetch.
#[derive(Clone, Debug, Default)]
pub struct TestCtx {
  pub tenant: Option<String>,
  pub marker: &'static str,
}

impl TestCtx {
  pub fn tenant(tenant: &str) -> Self {
    Self {
      tenant: Some(tenant.to_string()),
      marker: "request",
    }
  }

  pub fn unscoped() -> Self {
    Self {
      tenant: None,
      marker: "request",
    }
  }
}

/// Keys are tenant names; empty tenants count as unscoped.
pub struct TenantScope;

impl KeyScope<TestCtx, String> for TenantScope {
  fn key_of(&self, ctx: &TestCtx) -> Option<String> {
    ctx.tenant.clone().filter(|t| !t.is_empty())
  }

  fn scoped(&self, ctx: &TestCtx, key: &String) -> TestCtx {
    TestCtx {
      tenant: Some(key.clone()),
      marker: if ctx.marker == "startup" { "preload" } else { ctx.marker },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestError(pub String);

impl fmt::Display for TestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "fetch failed: {}", self.0)
  }
}

impl std::error::Error for TestError {}

pub type TestCache = ScopedCache<TestCtx, String, String, TestError>;
pub type TestBuilder = CacheBuilder<TestCtx, String, String, TestError>;

pub fn render(ctx: &TestCtx) -> String {
  format!("{}:{}", ctx.tenant.as_deref().unwrap_or("<none>"), ctx.marker)
}

/// Builds a cache whose fetch renders the context and counts its calls.
pub fn counting_cache<F>(configure: F) -> (TestCache, Arc<AtomicUsize>)
where
  F: FnOnce(TestBuilder) -> TestBuilder,
{
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  let builder = TestBuilder::new().scope(TenantScope).fetch(move |ctx: &TestCtx| {
    counter.fetch_add(1, Ordering::SeqCst);
    Ok(render(ctx))
  });
  let cache = configure(builder).build().unwrap();
  (cache, calls)
}

pub fn calls(counter: &AtomicUsize) -> usize {
  counter.load(Ordering::SeqCst)
}
