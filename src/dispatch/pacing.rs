//! Post-request pacing
//!
//! In per-worker mode each worker sleeps `delay` after every probe, so the
//! overall rate is roughly `workers / delay`. In global mode workers reserve
//! release slots from a shared clock, so completions across the whole pool
//! are at least `delay` apart.

use crate::config::DelayMode;
use crate::dispatch::Shutdown;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    mode: DelayMode,
    last_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(delay: Duration, mode: DelayMode) -> Self {
        Self {
            delay,
            mode,
            last_slot: Mutex::new(None),
        }
    }

    /// Blocks the calling worker according to the pacing mode
    ///
    /// Returns early if shutdown is requested.
    pub async fn pace(&self, shutdown: &Shutdown) {
        if self.delay.is_zero() {
            return;
        }

        let wait = match self.mode {
            DelayMode::PerWorker => self.delay,
            DelayMode::Global => self.reserve(Instant::now()),
        };
        shutdown.sleep(wait).await;
    }

    /// Claims the next global slot and returns how long to wait for it
    fn reserve(&self, now: Instant) -> Duration {
        let mut last = self
            .last_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let slot = last.map_or(now, |previous| previous.max(now)) + self.delay;
        *last = Some(slot);
        slot - now
    }
}
