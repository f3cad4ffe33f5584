#![allow(dead_code)]

use parking_lot::Mutex;
use scopecache_datasource::{DataSourceInfo, DataSourceLister, ProviderError, RequestContext};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// A lister that serves a fixed catalog per namespace, counting calls and
/// tracking how many listings overlap.
#[derive(Default)]
pub struct CountingLister {
  pub calls: AtomicUsize,
  pub running: AtomicUsize,
  pub peak: AtomicUsize,
  pub delay: Duration,
  pub failing: Mutex<Vec<String>>,
  pub seen: Mutex<Vec<Option<String>>>,
}

impl CountingLister {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn slow(delay: Duration) -> Self {
    Self {
      delay,
      ..Self::default()
    }
  }

  pub fn fail_for(&self, namespace: &str) {
    self.failing.lock().push(namespace.to_string());
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn peak(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }
}

/// Every namespace has a default Prometheus and a Loki datasource, with UIDs
/// derived from the namespace.
pub fn catalog(namespace: &str) -> Vec<DataSourceInfo> {
  vec![
    DataSourceInfo::new(format!("{namespace}-prom"), "Prometheus", "prometheus").with_default(true),
    DataSourceInfo::new(format!("{namespace}-loki"), "Loki", "loki"),
  ]
}

impl DataSourceLister for CountingLister {
  fn list(&self, ctx: &RequestContext) -> Result<Vec<DataSourceInfo>, ProviderError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.seen.lock().push(ctx.namespace().map(str::to_string));

    let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);
    if !self.delay.is_zero() {
      thread::sleep(self.delay);
    }
    self.running.fetch_sub(1, Ordering::SeqCst);

    let namespace = ctx.namespace().unwrap_or("default");
    if self.failing.lock().iter().any(|ns| ns == namespace) {
      return Err(ProviderError::backend(namespace, "backend unavailable"));
    }
    Ok(catalog(namespace))
  }
}
