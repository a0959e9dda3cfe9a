//! Time sources implementing the [`Clock`] trait.
//!
//! [`SystemClock`] reads wall-clock time; [`ManualClock`] is advanced
//! explicitly and drives tests and the simulator.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use ramp_core::traits::Clock;
use ramp_core::types::Timestamp;

/// Wall-clock time in Unix seconds. Times before the epoch read as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: Timestamp) -> Self {
        Self { now: AtomicU64::new(start) }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs`, saturating at `u64::MAX`. Returns the new time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let mut current = self.now.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(secs);
            match self
                .now
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
