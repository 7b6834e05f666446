//! Timestamp source for generated events.

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send {
    fn now(&mut self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&mut self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// UTC wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Starts at a fixed instant and advances by `tick` on every read. Makes
/// timestamps (and the hour feature derived from them) reproducible.
#[derive(Debug, Clone)]
pub struct ManualClock {
    next: DateTime<Utc>,
    tick: Duration,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>, tick: Duration) -> Self {
        Self { next: start, tick }
    }

    pub fn peek(&self) -> DateTime<Utc> {
        self.next
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> DateTime<Utc> {
        let t = self.next;
        self.next = self.next + self.tick;
        t
    }
}
