use crate::domain::{Clock, ControllableClock, Timestamp};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Hand-driven clock for tests
///
/// Stays frozen until advanced or set. Clones share the same time.
#[derive(Debug)]
pub struct SimulationClock {
    time: Arc<RwLock<Timestamp>>,
}

impl SimulationClock {
    /// Frozen clock at a specific time
    pub fn at(time: DateTime<Utc>) -> Self {
        SimulationClock {
            time: Arc::new(RwLock::new(time)),
        }
    }

    /// Frozen clock at the current time
    pub fn fixed() -> Self {
        Self::at(Utc::now())
    }
}

impl Clone for SimulationClock {
    fn clone(&self) -> Self {
        SimulationClock {
            time: Arc::clone(&self.time),
        }
    }
}

impl Clock for SimulationClock {
    fn now(&self) -> Timestamp {
        *self.time.read()
    }
}

impl ControllableClock for SimulationClock {
    fn advance(&self, duration: Duration) {
        *self.time.write() += duration;
    }

    fn set_time(&self, time: Timestamp) {
        *self.time.write() = time;
    }
}
