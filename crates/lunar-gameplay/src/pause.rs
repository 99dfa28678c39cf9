//! World pause / time scale lock.
//!
//! A power-state change freezes every frame-driven system, input included,
//! while its transition animation plays. The lock is single-writer: only the
//! player controller's transition hooks take and release it, and the outer
//! loop checks [`PauseManager::should_update_world`] before advancing
//! anything. Nesting is a programming error and is reported as
//! [`PauseError::AlreadyPaused`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from the pause lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PauseError {
    /// A pause was requested while one is already held
    #[error("world already paused by {0:?}")]
    AlreadyPaused(PauseReason),

    /// A resume was requested for a pause that is not held
    #[error("resume for {requested:?} but current pause is {current:?}")]
    NotHeld {
        /// Reason passed to resume
        requested: PauseReason,
        /// Reason currently held
        current: PauseReason,
    },
}

/// Why the world is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PauseReason {
    /// Not paused.
    #[default]
    NotPaused,
    /// A power-state transition animation is playing.
    StateTransition,
}

impl PauseReason {
    /// Check if actually paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        !matches!(self, Self::NotPaused)
    }
}

/// Holds the pause lock and counts frames spent paused.
#[derive(Debug, Default)]
pub struct PauseManager {
    /// Current pause reason.
    reason: PauseReason,
    /// Frames that elapsed while paused.
    paused_frames: u64,
}

impl PauseManager {
    /// Create a new, unpaused manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current pause reason.
    #[must_use]
    pub fn reason(&self) -> PauseReason {
        self.reason
    }

    /// Check if the world is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.reason.is_paused()
    }

    /// Check if frame-driven systems should advance.
    #[must_use]
    pub fn should_update_world(&self) -> bool {
        !self.is_paused()
    }

    /// 0.0 while paused, 1.0 otherwise.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        if self.is_paused() {
            0.0
        } else {
            1.0
        }
    }

    /// Frames counted while paused.
    #[must_use]
    pub fn paused_frames(&self) -> u64 {
        self.paused_frames
    }

    /// Take the lock.
    pub fn pause(&mut self, reason: PauseReason) -> Result<(), PauseError> {
        if !reason.is_paused() {
            return Ok(());
        }
        if self.is_paused() {
            return Err(PauseError::AlreadyPaused(self.reason));
        }
        debug!("World paused: {:?}", reason);
        self.reason = reason;
        Ok(())
    }

    /// Release the lock taken with `reason`.
    pub fn resume(&mut self, reason: PauseReason) -> Result<(), PauseError> {
        if self.reason != reason || !reason.is_paused() {
            return Err(PauseError::NotHeld {
                requested: reason,
                current: self.reason,
            });
        }
        debug!("World resumed after {:?}", reason);
        self.reason = PauseReason::NotPaused;
        Ok(())
    }

    /// Called by the outer loop once per frame; counts paused frames.
    pub fn record_frame(&mut self) {
        if self.is_paused() {
            self.paused_frames += 1;
        }
    }
}
