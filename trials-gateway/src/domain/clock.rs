use chrono::{DateTime, Datelike, Duration, Utc};

pub type Timestamp = DateTime<Utc>;

/// Source of the current time
///
/// The rate limiter, the response cache and enrollment-rate calculations all
/// read time through this trait so tests can drive it by hand.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Calendar year of `now()` in UTC
    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

/// A clock that can be moved by hand (tests and local simulation)
pub trait ControllableClock: Clock {
    /// Advance time by a duration
    fn advance(&self, duration: Duration);

    /// Set time to a specific value
    fn set_time(&self, time: Timestamp);
}
