//! Timed sub-behaviors of the player: invincibility flicker, death
//! sequence, and the pounce landing.
//!
//! Each is a small state value advanced once per controller update.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timer::{Countdown, FrameCountdown, TimerStatus};

/// Errors from starting a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// An invincibility window is already running
    #[error("invincibility window already active ({remaining} ticks left)")]
    AlreadyInvincible {
        /// Ticks left in the running window
        remaining: u32,
    },
}

/// Running flicker window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Flicker {
    /// Ticks left
    countdown: FrameCountdown,
    /// Window length
    total: u32,
}

/// Damage immunity with alternating visibility, one toggle per tick.
///
/// The first tick (applied on start) hides the sprite; the window ends by
/// forcing the sprite visible. Length is counted in update calls only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invincibility {
    /// Active window, if any
    flicker: Option<Flicker>,
}

impl Invincibility {
    /// An inactive window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a window is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flicker.is_some()
    }

    /// Ticks left in the running window.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.flicker.map_or(0, |f| f.countdown.remaining())
    }

    /// Opens a window of `ticks` and applies its first tick.
    ///
    /// Returns the visibility to show now.
    pub fn start(&mut self, ticks: u32) -> Result<bool, SequenceError> {
        if let Some(flicker) = self.flicker {
            return Err(SequenceError::AlreadyInvincible {
                remaining: flicker.countdown.remaining(),
            });
        }
        if ticks == 0 {
            return Ok(true);
        }
        let mut countdown = FrameCountdown::new(ticks);
        countdown.tick();
        self.flicker = Some(Flicker {
            countdown,
            total: ticks,
        });
        Ok(false)
    }

    /// Advances one tick. Returns the visibility to show, or `None` when
    /// no window is running.
    pub fn tick(&mut self) -> Option<bool> {
        let flicker = self.flicker.as_mut()?;
        if flicker.countdown.is_finished() {
            self.flicker = None;
            return Some(true);
        }
        let index = flicker.total - flicker.countdown.remaining();
        flicker.countdown.tick();
        Some(index % 2 == 1)
    }
}

/// Phase of the death sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeathPhase {
    /// Movement disabled
    Frozen(Countdown),
    /// Bounced, falling out of the level
    Bouncing(Countdown),
    /// Removal reported
    Finished,
}

/// Result of advancing the death sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathStep {
    /// Still frozen
    Holding,
    /// Freeze ended: re-enable movement and apply the bounce
    Bounce,
    /// Falling after the bounce
    Falling,
    /// Removal delay elapsed: remove the entity
    Remove,
    /// Already finished
    Done,
}

/// Freeze, bounce, then removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathSequence {
    /// Current phase
    phase: DeathPhase,
    /// Delay between bounce and removal
    removal_delay: f32,
}

impl DeathSequence {
    /// A sequence frozen for `freeze_delay` seconds, removed `removal_delay`
    /// seconds after the bounce.
    #[must_use]
    pub fn new(freeze_delay: f32, removal_delay: f32) -> Self {
        Self {
            phase: DeathPhase::Frozen(Countdown::new(freeze_delay)),
            removal_delay,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DeathPhase {
        self.phase
    }

    /// Advances by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> DeathStep {
        match self.phase {
            DeathPhase::Frozen(mut countdown) => {
                if countdown.tick(dt) == TimerStatus::Running {
                    self.phase = DeathPhase::Frozen(countdown);
                    DeathStep::Holding
                } else {
                    self.phase = DeathPhase::Bouncing(Countdown::new(self.removal_delay));
                    DeathStep::Bounce
                }
            },
            DeathPhase::Bouncing(mut countdown) => {
                if countdown.tick(dt) == TimerStatus::Running {
                    self.phase = DeathPhase::Bouncing(countdown);
                    DeathStep::Falling
                } else {
                    self.phase = DeathPhase::Finished;
                    DeathStep::Remove
                }
            },
            DeathPhase::Finished => DeathStep::Done,
        }
    }
}

/// Pending pounce: wait for the bottom edge to reach the target, then snap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pounce {
    /// Height the bottom edge settles on
    target_bottom: f32,
}

impl Pounce {
    /// A pounce onto `target_bottom`.
    #[must_use]
    pub const fn new(target_bottom: f32) -> Self {
        Self { target_bottom }
    }

    /// Target height.
    #[must_use]
    pub const fn target_bottom(&self) -> f32 {
        self.target_bottom
    }

    /// Whether the bottom edge has reached the target.
    #[must_use]
    pub fn reached(&self, bottom: f32) -> bool {
        bottom <= self.target_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flicker_alternates_starting_hidden() {
        let mut inv = Invincibility::new();
        assert_eq!(inv.start(5), Ok(false));
        assert_eq!(inv.tick(), Some(true));
        assert_eq!(inv.tick(), Some(false));
        assert_eq!(inv.tick(), Some(true));
        assert_eq!(inv.tick(), Some(false));
        assert!(inv.is_active());

        // Window over: forced visible.
        assert_eq!(inv.tick(), Some(true));
        assert!(!inv.is_active());
        assert_eq!(inv.tick(), None);
    }

    #[test]
    fn test_flicker_lasts_exactly_n_ticks() {
        let mut inv = Invincibility::new();
        inv.start(203).expect("inactive window starts");
        for _ in 0..202 {
            inv.tick();
            assert!(inv.is_active());
        }
        inv.tick();
        assert!(!inv.is_active());
    }

    #[test]
    fn test_cannot_restart_active_window() {
        let mut inv = Invincibility::new();
        inv.start(10).expect("first start");
        inv.tick();
        assert_eq!(
            inv.start(10),
            Err(SequenceError::AlreadyInvincible { remaining: 8 })
        );
        assert_eq!(inv.remaining(), 8);
    }

    #[test]
    fn test_restart_after_window_ends() {
        let mut inv = Invincibility::new();
        inv.start(2).expect("first start");
        inv.tick();
        inv.tick();
        assert!(!inv.is_active());
        assert!(inv.start(2).is_ok());
    }

    #[test]
    fn test_zero_tick_window() {
        let mut inv = Invincibility::new();
        assert_eq!(inv.start(0), Ok(true));
        assert!(!inv.is_active());
    }

    #[test]
    fn test_death_sequence_phases() {
        let mut death = DeathSequence::new(0.25, 1.0);
        assert_eq!(death.tick(0.1), DeathStep::Holding);
        assert_eq!(death.tick(0.1), DeathStep::Holding);
        assert_eq!(death.tick(0.1), DeathStep::Bounce);
        assert!(matches!(death.phase(), DeathPhase::Bouncing(_)));

        assert_eq!(death.tick(0.5), DeathStep::Falling);
        assert_eq!(death.tick(0.5), DeathStep::Remove);
        assert_eq!(death.tick(0.5), DeathStep::Done);
        assert_eq!(death.phase(), DeathPhase::Finished);
    }

    #[test]
    fn test_pounce_reached() {
        let pounce = Pounce::new(10.0);
        assert!(!pounce.reached(10.5));
        assert!(pounce.reached(10.0));
        assert!(pounce.reached(9.0));
        assert_eq!(pounce.target_bottom(), 10.0);
    }
}
