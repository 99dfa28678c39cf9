//! # Lunar Gameplay
//!
//! Player controller core for Project Lunar.
//!
//! This crate turns per-frame input into platformer movement and keeps the
//! player's discrete states consistent:
//! - Kinematic body with walk, gravity and world resolution
//! - Jump / fall sequencing
//! - Small / Big / Super power states with per-state footprints
//! - Invincibility flicker, death sequence, pounce landing
//! - Collision arbitration against enemies and pickups
//! - Shot emitter
//! - Event bus carrying everything the visual layer needs
//! - Level loop with the state-change pause lock

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actors;
pub mod collision;
pub mod config;
pub mod events;
pub mod input;
pub mod jump;
pub mod level;
pub mod pause;
pub mod physics;
pub mod player;
pub mod power;
pub mod sequencer;
pub mod shot;
pub mod timer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actors::*;
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::jump::*;
    pub use crate::level::*;
    pub use crate::pause::*;
    pub use crate::physics::*;
    pub use crate::player::*;
    pub use crate::power::*;
    pub use crate::sequencer::*;
    pub use crate::shot::*;
    pub use crate::timer::*;
}

pub use prelude::*;
