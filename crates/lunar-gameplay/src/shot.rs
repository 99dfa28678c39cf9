//! Shot emitter.
//!
//! Spawns a projectile description at a fixed body-local origin, mirrored to
//! the facing side. Projectile behavior itself belongs to the level.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use lunar_common::EntityId;

use crate::input::Vec2;
use crate::physics::{Facing, KinematicBody};
use crate::power::PowerState;
use crate::timer::Countdown;

/// Reasons a shot was not fired.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ShotError {
    /// Cooldown still running
    #[error("shot cooling down ({remaining:.3}s left)")]
    CoolingDown {
        /// Seconds left
        remaining: f32,
    },

    /// Current power state does not unlock shooting
    #[error("shooting requires {required:?}, player is {current:?}")]
    Locked {
        /// Minimum state
        required: PowerState,
        /// Current state
        current: PowerState,
    },
}

/// A projectile the level should spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotSpawn {
    /// Entity that fired
    pub owner: EntityId,
    /// Parent the projectile is attached to (same as the owner's)
    pub parent: Option<EntityId>,
    /// World-space spawn position
    pub position: Vec2,
    /// Launch direction
    pub direction: Facing,
}

/// Fires shots from a fixed origin with an optional cooldown and power gate.
#[derive(Debug, Clone)]
pub struct ShotEmitter {
    /// Body-local origin for a right-facing body
    origin: Vec2,
    /// Seconds between shots (0 = unlimited)
    cooldown: f32,
    /// Time until the next shot is allowed
    ready_in: Countdown,
    /// Minimum power state to shoot
    min_power: Option<PowerState>,
}

impl ShotEmitter {
    /// Creates an emitter.
    #[must_use]
    pub fn new(origin: Vec2, cooldown: f32, min_power: Option<PowerState>) -> Self {
        Self {
            origin,
            cooldown: cooldown.max(0.0),
            ready_in: Countdown::default(),
            min_power,
        }
    }

    /// Advances the cooldown.
    pub fn tick(&mut self, dt: f32) {
        self.ready_in.tick(dt);
    }

    /// World-space origin for the body's current facing.
    #[must_use]
    pub fn origin_for(&self, body: &KinematicBody) -> Vec2 {
        let facing = body.facing();
        body.position() + Vec2::new(self.origin.x * facing.sign(), self.origin.y)
    }

    /// Fires a shot in the body's facing direction.
    pub fn fire(
        &mut self,
        body: &KinematicBody,
        power: PowerState,
        owner: EntityId,
        parent: Option<EntityId>,
    ) -> Result<ShotSpawn, ShotError> {
        if let Some(required) = self.min_power {
            if power < required {
                return Err(ShotError::Locked {
                    required,
                    current: power,
                });
            }
        }
        if !self.ready_in.is_finished() {
            return Err(ShotError::CoolingDown {
                remaining: self.ready_in.remaining(),
            });
        }

        self.ready_in = Countdown::new(self.cooldown);
        let spawn = ShotSpawn {
            owner,
            parent,
            position: self.origin_for(body),
            direction: body.facing(),
        };
        debug!("Shot fired {:?} from {:?}", spawn.direction, spawn.position);
        Ok(spawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_from_mirrored_origin() {
        let mut emitter = ShotEmitter::new(Vec2::new(8.0, 10.0), 0.0, None);
        let mut body = KinematicBody::new(Vec2::new(100.0, 0.0));
        let owner = EntityId::new();

        let shot = emitter
            .fire(&body, PowerState::Small, owner, None)
            .expect("unlimited emitter fires");
        assert_eq!(shot.position, Vec2::new(108.0, 10.0));
        assert_eq!(shot.direction, Facing::Right);
        assert_eq!(shot.owner, owner);

        body.flip();
        let shot = emitter
            .fire(&body, PowerState::Small, owner, None)
            .expect("no cooldown");
        assert_eq!(shot.position, Vec2::new(92.0, 10.0));
        assert_eq!(shot.direction, Facing::Left);
    }

    #[test]
    fn test_cooldown() {
        let mut emitter = ShotEmitter::new(Vec2::ZERO, 0.5, None);
        let body = KinematicBody::new(Vec2::ZERO);
        let owner = EntityId::new();

        assert!(emitter.fire(&body, PowerState::Big, owner, None).is_ok());
        assert!(matches!(
            emitter.fire(&body, PowerState::Big, owner, None),
            Err(ShotError::CoolingDown { .. })
        ));

        emitter.tick(0.5);
        assert!(emitter.fire(&body, PowerState::Big, owner, None).is_ok());
    }

    #[test]
    fn test_power_gate() {
        let mut emitter = ShotEmitter::new(Vec2::ZERO, 0.0, Some(PowerState::Big));
        let body = KinematicBody::new(Vec2::ZERO);
        let owner = EntityId::new();
        let parent = Some(EntityId::new());

        assert_eq!(
            emitter.fire(&body, PowerState::Small, owner, parent),
            Err(ShotError::Locked {
                required: PowerState::Big,
                current: PowerState::Small,
            })
        );
        let shot = emitter
            .fire(&body, PowerState::Super, owner, parent)
            .expect("super unlocks");
        assert_eq!(shot.parent, parent);
    }
}
