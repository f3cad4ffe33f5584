//! A concurrent, namespace-scoped memoization cache.
//!
//! # Features
//! - **Single-Flight**: At most one fetch per key is in flight; concurrent
//!   callers for that key wait for it and share its result.
//! - **Per-Key Locking**: Misses for different keys never block each other.
//! - **TTL and LRU**: Entries expire after a time-to-live and the least
//!   recently used keys are evicted past a capacity bound.
//! - **Preload**: Warm a known set of keys before serving traffic.
//! - **Observability**: Eviction listeners, `tracing` events and a metrics
//!   snapshot that includes the live per-key lock count.
//! - **Configuration**: Optional `serde` feature for YAML-driven settings.

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod listener;
pub mod loader;
pub mod metrics;
pub mod scope;

#[cfg(feature = "serde")]
pub mod config;

// Internal, crate-only modules
mod entry;
mod janitor;
mod locks;
mod lru_list;
mod shared;
mod store;
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use error::BuildError;
pub use handles::ScopedCache;
pub use listener::{EvictionListener, EvictionReason};
pub use loader::PreloadReport;
pub use metrics::MetricsSnapshot;
pub use scope::{scope_fn, KeyScope};

#[cfg(feature = "serde")]
pub use config::CacheConfig;
