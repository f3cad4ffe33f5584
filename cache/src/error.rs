use thiserror::Error;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// No fetch function was configured. The cache has nothing to memoize.
  #[error("a fetch function is required to build a scoped cache")]
  MissingFetch,
  /// No key scope was configured, so keys cannot be derived from contexts.
  #[error("a key scope is required to build a scoped cache")]
  MissingScope,
  /// The janitor was configured with a zero tick interval.
  #[error("janitor tick interval cannot be zero")]
  ZeroJanitorInterval,
}

/// Errors raised while loading a [`CacheConfig`](crate::config::CacheConfig).
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(String),
}
