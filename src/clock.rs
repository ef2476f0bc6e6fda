use chrono::Utc;
use std::sync::Arc;

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// Generators read the time through this trait so that tests can drive the
/// clock by hand.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}
