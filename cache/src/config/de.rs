// Custom deserializers for config fields.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Reads a humantime string such as `"30s"`, `"5m"` or `"1h 30m"`.
pub(crate) fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

pub(crate) fn optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<String>::deserialize(deserializer)?;
  raw
    .map(|s| humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom))
    .transpose()
}
