//! Time source for cache expiry.

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
  fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// Clock that only moves when told to. Used for deterministic expiry.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<Instant>,
}

impl ManualClock {
  pub fn new() -> Self {
    Self {
      now: Mutex::new(Instant::now()),
    }
  }

  pub fn advance(&self, by: Duration) {
    if let Ok(mut now) = self.now.lock() {
      *now += by;
    }
  }
}

impl Default for ManualClock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Instant {
    match self.now.lock() {
      Ok(now) => *now,
      Err(poisoned) => *poisoned.into_inner(),
    }
  }
}
