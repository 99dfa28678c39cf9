//! Power-state machine: Small, Big, Super.
//!
//! States are strictly ordered and advance one step at a time. Dropping back
//! to Small happens only through damage. Each state carries a collision
//! footprint and an animation profile; the machine swaps both on every
//! transition and reports what changed as a [`PowerTransition`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::physics::AABB;

/// Power level of the player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum PowerState {
    /// Initial state
    #[default]
    Small,
    /// After the first power-up
    Big,
    /// Ceiling
    Super,
}

impl PowerState {
    /// The next state up, or `None` at the ceiling.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Small => Some(Self::Big),
            Self::Big => Some(Self::Super),
            Self::Super => None,
        }
    }

    /// Whether this state uses the initial footprint and profile.
    #[must_use]
    pub const fn is_small(self) -> bool {
        matches!(self, Self::Small)
    }
}

/// Handle to an animation profile owned by the visual layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AnimationProfile(pub String);

impl AnimationProfile {
    /// Creates a profile handle.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Whether a profile name was actually assigned.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for AnimationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a state change swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTransition {
    /// Previous state
    pub from: PowerState,
    /// New state
    pub to: PowerState,
    /// Footprint now active
    pub footprint: AABB,
    /// Profile now active
    pub profile: AnimationProfile,
    /// Entering Small opens an invincibility window
    pub starts_invincibility: bool,
}

/// Current power state with its per-state footprint and profile.
#[derive(Debug, Clone)]
pub struct PowerStateMachine {
    /// Current state
    state: PowerState,
    /// Footprint captured at spawn
    small_footprint: AABB,
    /// Enlarged footprint for Big and Super
    big_footprint: AABB,
    /// Profile captured at spawn
    small_profile: AnimationProfile,
    /// Profile for Big and Super
    big_profile: AnimationProfile,
}

impl PowerStateMachine {
    /// A machine in Small with the given per-state data.
    #[must_use]
    pub fn new(
        small_footprint: AABB,
        big_footprint: AABB,
        small_profile: AnimationProfile,
        big_profile: AnimationProfile,
    ) -> Self {
        Self {
            state: PowerState::Small,
            small_footprint,
            big_footprint,
            small_profile,
            big_profile,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Active collision footprint (body-local).
    #[must_use]
    pub fn footprint(&self) -> AABB {
        if self.state.is_small() {
            self.small_footprint
        } else {
            self.big_footprint
        }
    }

    /// Active animation profile.
    #[must_use]
    pub fn profile(&self) -> &AnimationProfile {
        if self.state.is_small() {
            &self.small_profile
        } else {
            &self.big_profile
        }
    }

    /// Moves one step up. Returns `None` at the ceiling.
    pub fn advance(&mut self) -> Option<PowerTransition> {
        let next = self.state.next()?;
        Some(self.enter(next))
    }

    /// Drops back to Small. Returns `None` if already Small.
    pub fn reset_to_small(&mut self) -> Option<PowerTransition> {
        if self.state.is_small() {
            return None;
        }
        Some(self.enter(PowerState::Small))
    }

    fn enter(&mut self, to: PowerState) -> PowerTransition {
        let from = self.state;
        self.state = to;
        info!("Power state {:?} -> {:?}", from, to);

        PowerTransition {
            from,
            to,
            footprint: self.footprint(),
            profile: self.profile().clone(),
            starts_invincibility: to.is_small(),
        }
    }
}
