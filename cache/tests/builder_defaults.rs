mod common;

use common::{render, TenantScope, TestBuilder, TestCtx};

use scopecache::{BuildError, CacheConfig};
use std::time::Duration;

#[test]
fn test_default_cache_is_unbounded_and_eternal() {
  let cache = TestBuilder::new()
    .scope(TenantScope)
    .fetch(|ctx: &TestCtx| Ok(render(ctx)))
    .build()
    .unwrap();

  assert_eq!(cache.capacity(), None);
  assert_eq!(cache.time_to_live(), None);
  assert!(cache.is_empty());
}

#[test]
fn test_build_requires_fetch_and_scope() {
  let err = TestBuilder::new().scope(TenantScope).build().unwrap_err();
  assert_eq!(err, BuildError::MissingFetch);

  let err = TestBuilder::new()
    .fetch(|ctx: &TestCtx| Ok(render(ctx)))
    .build()
    .unwrap_err();
  assert_eq!(err, BuildError::MissingScope);
}

#[test]
fn test_zero_janitor_interval_is_rejected() {
  let err = TestBuilder::new()
    .scope(TenantScope)
    .fetch(|ctx: &TestCtx| Ok(render(ctx)))
    .time_to_live(Duration::from_secs(1))
    .janitor_tick_interval(Duration::ZERO)
    .build()
    .unwrap_err();
  assert_eq!(err, BuildError::ZeroJanitorInterval);
  assert_eq!(err.to_string(), "janitor tick interval cannot be zero");
}

#[test]
fn test_unbounded_overrides_capacity() {
  let cache = TestBuilder::new()
    .capacity(10)
    .unbounded()
    .lock_shards(3)
    .scope(TenantScope)
    .fetch(|ctx: &TestCtx| Ok(render(ctx)))
    .build()
    .unwrap();

  assert_eq!(cache.capacity(), None);
  for i in 0..20 {
    cache.get(&TestCtx::tenant(&format!("org-{i}"))).unwrap();
  }
  assert_eq!(cache.len(), 20);
}

#[test]
fn test_builder_applies_yaml_config() {
  let config = CacheConfig::from_yaml_str("capacity: 2\ntime_to_live: 10s\njanitor_interval: 250ms\n").unwrap();
  let cache = TestBuilder::new()
    .config(&config)
    .scope(TenantScope)
    .fetch(|ctx: &TestCtx| Ok(render(ctx)))
    .build()
    .unwrap();

  assert_eq!(cache.capacity(), Some(2));
  assert_eq!(cache.time_to_live(), Some(Duration::from_secs(10)));
}

#[test]
fn test_non_positive_config_values_disable_bounds() {
  let config = CacheConfig::new(-1, Duration::ZERO);
  let cache = TestBuilder::new()
    .capacity(5)
    .config(&config)
    .scope(TenantScope)
    .fetch(|ctx: &TestCtx| Ok(render(ctx)))
    .build()
    .unwrap();

  assert_eq!(cache.capacity(), None);
  assert_eq!(cache.time_to_live(), None);
}
