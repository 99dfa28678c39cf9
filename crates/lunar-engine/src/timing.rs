//! Step clock.
//!
//! Turns elapsed time into a number of fixed simulation steps. Headless runs
//! owe exactly one step per tick; realtime runs measure the wall clock and
//! sleep off whatever is left of the tick.

use std::thread;
use std::time::{Duration, Instant};

/// Most steps owed on a single tick before the backlog is dropped.
const MAX_CATCH_UP: u32 = 10;

/// Longest wall-clock gap counted in one tick, in seconds.
const MAX_TICK_GAP: f32 = 0.25;

/// How ticks relate to the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Every tick is one step; never sleeps
    Headless,
    /// Ticks measure the wall clock and are paced to the step rate
    Realtime,
}

impl Pacing {
    /// Realtime when `realtime` is set.
    #[must_use]
    pub fn from_flag(realtime: bool) -> Self {
        if realtime {
            Self::Realtime
        } else {
            Self::Headless
        }
    }
}

/// Fixed-step clock for the runner loop.
#[derive(Debug)]
pub struct StepClock {
    /// Steps per second
    rate: u32,
    /// Length of one step
    step: f32,
    /// Wall-clock length of one tick
    tick_budget: Duration,
    /// Start of the current tick
    tick_start: Instant,
    /// Time owed but not yet stepped
    owed: f32,
    /// Wall clock or not
    pacing: Pacing,
}

impl StepClock {
    /// A clock stepping `rate` times per second.
    #[must_use]
    pub fn new(rate: u32, pacing: Pacing) -> Self {
        let rate = rate.max(1);
        Self {
            rate,
            step: 1.0 / rate as f32,
            tick_budget: Duration::from_secs_f64(1.0 / f64::from(rate)),
            tick_start: Instant::now(),
            owed: 0.0,
            pacing,
        }
    }

    /// Steps per second.
    #[must_use]
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Length of one step in seconds.
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Starts a tick and returns how many steps it owes.
    pub fn tick(&mut self) -> u32 {
        let elapsed = match self.pacing {
            Pacing::Headless => self.step,
            Pacing::Realtime => {
                let now = Instant::now();
                let gap = now.duration_since(self.tick_start).as_secs_f32();
                self.tick_start = now;
                gap.min(MAX_TICK_GAP)
            },
        };
        self.owe(elapsed)
    }

    /// Adds `elapsed` seconds to the debt and pays off whole steps.
    pub fn owe(&mut self, elapsed: f32) -> u32 {
        self.owed += elapsed;

        let mut steps = 0;
        while self.owed >= self.step && steps < MAX_CATCH_UP {
            self.owed -= self.step;
            steps += 1;
        }
        // Too far behind: forget the rest
        if self.owed > self.step * 2.0 {
            self.owed = 0.0;
        }
        steps
    }

    /// Sleeps off the rest of the tick. No-op when headless.
    pub fn finish_tick(&self) {
        if self.pacing == Pacing::Headless {
            return;
        }
        let spent = self.tick_start.elapsed();
        if let Some(rest) = self.tick_budget.checked_sub(spent) {
            thread::sleep(rest);
        }
    }

    /// Forgets any debt and restarts the wall clock.
    pub fn restart(&mut self) {
        self.tick_start = Instant::now();
        self.owed = 0.0;
    }
}
