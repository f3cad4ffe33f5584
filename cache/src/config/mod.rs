//! File-driven cache settings.
//!
//! ```yaml
//! capacity: 1000        # <= 0 means unbounded
//! time_to_live: 10s     # 0s means entries never expire
//! janitor_interval: 1s  # optional
//! ```

mod de;

use crate::error::ConfigError;
use crate::time;

use serde::Deserialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
  /// Maximum number of keys. Zero or negative means unbounded.
  #[serde(default)]
  pub capacity: i64,
  /// Maximum entry age. Zero disables expiration.
  #[serde(default, deserialize_with = "de::duration")]
  pub time_to_live: Duration,
  /// Janitor tick; defaults to one second when a TTL is set.
  #[serde(default, deserialize_with = "de::optional_duration")]
  pub janitor_interval: Option<Duration>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      capacity: 0,
      time_to_live: Duration::ZERO,
      janitor_interval: None,
    }
  }
}

impl CacheConfig {
  pub fn new(capacity: i64, time_to_live: Duration) -> Self {
    Self {
      capacity,
      time_to_live,
      janitor_interval: None,
    }
  }

  pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }

  /// The capacity bound, `None` when unbounded.
  pub fn capacity(&self) -> Option<NonZeroUsize> {
    usize::try_from(self.capacity).ok().and_then(NonZeroUsize::new)
  }

  /// The TTL, `None` when expiration is disabled.
  pub fn time_to_live(&self) -> Option<Duration> {
    time::effective_ttl(Some(self.time_to_live))
  }
}
