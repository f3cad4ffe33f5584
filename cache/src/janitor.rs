use crate::store::TtlLruStore;

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Background thread that purges expired entries on a fixed tick.
///
/// Lazy expiry on lookup only catches keys that are requested again. The
/// janitor also catches the rest, so their eviction callbacks (and with them
/// the lock-table cleanup) still run.
pub(crate) struct Janitor {
  handle: Option<JoinHandle<()>>,
  stop_flag: Arc<AtomicBool>,
}

impl Janitor {
  pub(crate) fn spawn<K, V>(store: Arc<TtlLruStore<K, V>>, tick_interval: Duration) -> Self
  where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
  {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_clone = stop_flag.clone();

    let handle = thread::Builder::new()
      .name("scopecache-janitor".into())
      .spawn(move || {
        while !stop_clone.load(Ordering::Acquire) {
          let tick_start = Instant::now();

          let purged = store.purge_expired();
          if purged > 0 {
            tracing::debug!(purged, "janitor purged expired entries");
          }

          // Parked rather than slept so that `stop` can wake us early.
          if let Some(remaining) = tick_interval.checked_sub(tick_start.elapsed()) {
            thread::park_timeout(remaining);
          }
        }
      });

    let handle = match handle {
      Ok(handle) => Some(handle),
      Err(err) => {
        tracing::warn!(error = %err, "failed to spawn cache janitor; expired entries will only be removed on lookup");
        None
      }
    };

    Self { handle, stop_flag }
  }

  /// Signals the thread to exit and waits for it.
  pub(crate) fn stop(mut self) {
    self.stop_flag.store(true, Ordering::Release);
    if let Some(handle) = self.handle.take() {
      handle.thread().unpark();
      let _ = handle.join();
    }
  }
}
