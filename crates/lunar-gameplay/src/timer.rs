//! Frame- and time-based countdowns.
//!
//! Timed behaviors are modeled as counters advanced once per update call
//! rather than as suspended routines. [`FrameCountdown`] counts update calls,
//! [`Countdown`] counts scaled seconds.

use serde::{Deserialize, Serialize};

/// Progress of a countdown after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Still counting
    Running,
    /// Reached zero on this tick
    Finished,
    /// Already finished before this tick
    Idle,
}

/// Counts down a fixed number of update calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameCountdown {
    /// Ticks left
    remaining: u32,
}

impl FrameCountdown {
    /// A countdown over `ticks` update calls.
    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// Ticks left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the countdown has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Advances by one update call.
    pub fn tick(&mut self) -> TimerStatus {
        match self.remaining {
            0 => TimerStatus::Idle,
            1 => {
                self.remaining = 0;
                TimerStatus::Finished
            },
            _ => {
                self.remaining -= 1;
                TimerStatus::Running
            },
        }
    }
}

/// Counts down a duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Countdown {
    /// Seconds left
    remaining: f32,
}

impl Countdown {
    /// A countdown over `seconds`.
    #[must_use]
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Whether the countdown has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Advances by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TimerStatus {
        if self.is_finished() {
            return TimerStatus::Idle;
        }
        self.remaining -= dt;
        if self.is_finished() {
            self.remaining = 0.0;
            TimerStatus::Finished
        } else {
            TimerStatus::Running
        }
    }
}
