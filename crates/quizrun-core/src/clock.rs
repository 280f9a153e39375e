//! Countdown clock bound to a quiz session.
//!
//! `Running` ticks down once per call; reaching zero yields exactly one
//! [`Tick::Expired`] and leaves the clock `Expired` until the next tick or
//! [`Countdown::stop`] settles it in `Stopped`. Every further tick is [`Tick::Idle`].

use serde::{Deserialize, Serialize};

/// Remaining time below which the clock is shown as a warning.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockPhase {
    Running,
    Expired,
    Stopped,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running with this many seconds left.
    Running(u32),
    /// Time just ran out. Emitted once.
    Expired,
    /// The clock is no longer running.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    phase: ClockPhase,
}

impl Countdown {
    pub fn new(remaining: u32) -> Self {
        Self {
            remaining,
            phase: ClockPhase::Running,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    pub fn is_running_low(&self) -> bool {
        self.is_running() && self.remaining < LOW_TIME_THRESHOLD_SECS
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Tick {
        match self.phase {
            ClockPhase::Running => {}
            ClockPhase::Expired => {
                self.phase = ClockPhase::Stopped;
                return Tick::Idle;
            }
            ClockPhase::Stopped => return Tick::Idle,
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.phase = ClockPhase::Expired;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    /// Cancel the clock.
    pub fn stop(&mut self) {
        self.phase = ClockPhase::Stopped;
    }
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_expires_once() {
        let mut clock = Countdown::new(3);
        assert_eq!(clock.tick(), Tick::Running(2));
        assert_eq!(clock.tick(), Tick::Running(1));
        assert_eq!(clock.tick(), Tick::Expired);
        assert_eq!(clock.phase(), ClockPhase::Expired);

        for _ in 0..5 {
            assert_eq!(clock.tick(), Tick::Idle);
        }
        assert_eq!(clock.phase(), ClockPhase::Stopped);
        assert_eq!(clock.remaining(), 0);
    }

    #[test]
    fn zero_budget_expires_on_first_tick() {
        let mut clock = Countdown::new(0);
        assert_eq!(clock.tick(), Tick::Expired);
        assert_eq!(clock.tick(), Tick::Idle);
    }

    #[test]
    fn stopped_clock_never_expires() {
        let mut clock = Countdown::new(2);
        assert_eq!(clock.tick(), Tick::Running(1));
        clock.stop();
        assert_eq!(clock.phase(), ClockPhase::Stopped);
        assert_eq!(clock.tick(), Tick::Idle);
        assert_eq!(clock.remaining(), 1);
    }

    #[test]
    fn expiry_settles_in_stopped() {
        let mut clock = Countdown::new(1);
        assert_eq!(clock.tick(), Tick::Expired);
        clock.stop();
        assert_eq!(clock.phase(), ClockPhase::Stopped);
        assert_eq!(clock.tick(), Tick::Idle);
        assert_eq!(clock.remaining(), 0);
    }

    #[test]
    fn low_time_warning() {
        assert!(!Countdown::new(60).is_running_low());
        assert!(Countdown::new(59).is_running_low());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(1200), "20:00");
    }
}
