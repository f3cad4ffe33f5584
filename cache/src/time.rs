use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single reference point for entry timestamps. Initialized on first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Nanoseconds elapsed since the cache epoch.
///
/// Stored in entries instead of an `Instant` so that age checks are plain
/// integer arithmetic.
#[inline]
pub(crate) fn now_nanos() -> u64 {
  saturating_nanos(Instant::now().saturating_duration_since(*CACHE_EPOCH))
}

/// `duration` in nanoseconds, clamped to `u64::MAX`.
#[inline]
pub(crate) fn saturating_nanos(duration: Duration) -> u64 {
  u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Normalizes a configured TTL: a zero duration disables expiration.
#[inline]
pub(crate) fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
  ttl.filter(|d| !d.is_zero())
}
