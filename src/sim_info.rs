use crate::units::{Time, Timestamp};
use std::time::{Duration, Instant};

/// Bookkeeping for a run: where simulated time is, how many ticks have
/// elapsed, and how long we've been at it in wall-clock terms.
#[derive(Debug, Clone)]
pub struct SimulationInfo {
    pub timestamp: Timestamp,
    pub tick: u64,
    pub relative_time: Time,
    pub real_time_start: Instant,
    pub real_time: Duration,
}

impl Default for SimulationInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationInfo {
    pub fn new() -> Self {
        SimulationInfo {
            timestamp: Timestamp::epoch(),
            tick: 0,
            relative_time: Time::from_secs(0.0),
            real_time_start: Instant::now(),
            real_time: Duration::ZERO,
        }
    }

    pub fn tick_step(&mut self, timestamp: Timestamp, dt: Time) {
        self.tick += 1;
        self.timestamp = timestamp;
        self.relative_time += dt;
        self.real_time = Instant::now().duration_since(self.real_time_start);
    }
}
