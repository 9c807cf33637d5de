use {parking_lot::Mutex, time::OffsetDateTime};

/// Source of the current time for flows and the notary.
pub trait Clock: Send + Sync {
  fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> OffsetDateTime {
    OffsetDateTime::now_utc()
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<OffsetDateTime>,
}

impl ManualClock {
  pub fn new(now: OffsetDateTime) -> Self {
    Self {
      now: Mutex::new(now),
    }
  }

  pub fn set(&self, now: OffsetDateTime) {
    *self.now.lock() = now;
  }

  pub fn advance(&self, by: time::Duration) {
    *self.now.lock() += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> OffsetDateTime {
    *self.now.lock()
  }
}
