mod simulation_clock;

pub use simulation_clock::SimulationClock;

use crate::domain::{Clock, Timestamp};
use chrono::Utc;

/// Wall clock used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}
