//! Collision arbitration between the player and other level objects.
//!
//! Overlaps are classified by relative height: if the player's bottom edge
//! is above the other object's bottom edge it is a stomp, otherwise a side
//! hit. Dispatch goes through capability queries rather than downcasts.

use tracing::debug;

use lunar_common::EntityId;

use crate::events::ControllerEvent;
use crate::input::Vec2;
use crate::physics::AABB;
use crate::player::PlayerController;

/// Anything in the level the player can overlap.
pub trait LevelObject {
    /// Stable identifier.
    fn id(&self) -> EntityId;

    /// World-space bounds.
    fn bounds(&self) -> AABB;

    /// Anchor position. Enemies use its height as the pounce target.
    fn position(&self) -> Vec2;

    /// Dead objects take no part in collisions.
    fn is_dead(&self) -> bool;

    /// Per-frame behavior.
    fn update(&mut self, _dt: f32) {}

    /// Enemy capability.
    fn as_enemy(&mut self) -> Option<&mut dyn Enemy> {
        None
    }

    /// Pickup capability.
    fn as_pickup(&mut self) -> Option<&mut dyn Pickup> {
        None
    }
}

/// Objects that react to the player landing on them or running into them.
pub trait Enemy {
    /// The player landed on top.
    fn on_player_stomp(&mut self, player: &mut PlayerController);

    /// The player touched from the side or below.
    fn on_player_collision(&mut self, player: &mut PlayerController);
}

/// Objects consumed on contact.
pub trait Pickup {
    /// Applies the pickup's effect.
    fn apply(&mut self, player: &mut PlayerController);
}

/// What an overlap resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Nothing happened (either side dead, or unknown kind)
    Ignored,
    /// Enemy stomp handler ran
    Stomped,
    /// Enemy side handler ran
    SideHit,
    /// Pickup applied; the level should remove it
    Consumed,
}

/// Stomp test: the player's bottom edge is above the other's.
#[must_use]
pub fn is_stomp(player: &AABB, other: &AABB) -> bool {
    player.bottom() > other.bottom()
}

impl PlayerController {
    /// Resolves an overlap with another level object.
    pub fn resolve_collision(&mut self, other: &mut dyn LevelObject) -> CollisionOutcome {
        if self.is_dead() || other.is_dead() {
            return CollisionOutcome::Ignored;
        }

        let id = other.id();
        let stomp = is_stomp(&self.bounds(), &other.bounds());

        if let Some(enemy) = other.as_enemy() {
            return if stomp {
                debug!("Player stomped {}", id);
                enemy.on_player_stomp(self);
                CollisionOutcome::Stomped
            } else {
                debug!("Player ran into {}", id);
                enemy.on_player_collision(self);
                CollisionOutcome::SideHit
            };
        }

        if let Some(pickup) = other.as_pickup() {
            pickup.apply(self);
            self.publish(ControllerEvent::PickupConsumed(id));
            debug!("Pickup {} consumed", id);
            return CollisionOutcome::Consumed;
        }

        CollisionOutcome::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::power::PowerState;

    /// Records which handler ran.
    struct Dummy {
        id: EntityId,
        bounds: AABB,
        dead: bool,
        stomps: u32,
        side_hits: u32,
    }

    impl Dummy {
        fn at(bottom: f32) -> Self {
            Self {
                id: EntityId::new(),
                bounds: AABB::new(-8.0, bottom, 8.0, bottom + 16.0),
                dead: false,
                stomps: 0,
                side_hits: 0,
            }
        }
    }

    impl LevelObject for Dummy {
        fn id(&self) -> EntityId {
            self.id
        }
        fn bounds(&self) -> AABB {
            self.bounds
        }
        fn position(&self) -> Vec2 {
            self.bounds.center()
        }
        fn is_dead(&self) -> bool {
            self.dead
        }
        fn as_enemy(&mut self) -> Option<&mut dyn Enemy> {
            Some(self)
        }
    }

    impl Enemy for Dummy {
        fn on_player_stomp(&mut self, _player: &mut PlayerController) {
            self.stomps += 1;
        }
        fn on_player_collision(&mut self, _player: &mut PlayerController) {
            self.side_hits += 1;
        }
    }

    /// Upgrades the player.
    struct Mushroom {
        id: EntityId,
    }

    impl LevelObject for Mushroom {
        fn id(&self) -> EntityId {
            self.id
        }
        fn bounds(&self) -> AABB {
            AABB::default()
        }
        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
        fn is_dead(&self) -> bool {
            false
        }
        fn as_pickup(&mut self) -> Option<&mut dyn Pickup> {
            Some(self)
        }
    }

    impl Pickup for Mushroom {
        fn apply(&mut self, player: &mut PlayerController) {
            player.advance_state();
        }
    }

    /// Neither enemy nor pickup.
    struct Scenery;

    impl LevelObject for Scenery {
        fn id(&self) -> EntityId {
            EntityId::NULL
        }
        fn bounds(&self) -> AABB {
            AABB::default()
        }
        fn position(&self) -> Vec2 {
            Vec2::ZERO
        }
        fn is_dead(&self) -> bool {
            false
        }
    }

    fn player_at(y: f32) -> PlayerController {
        PlayerController::new(ControllerConfig::default())
            .expect("default config is valid")
            .at(Vec2::new(0.0, y))
    }

    #[test]
    fn test_stomp_classification() {
        let a = AABB::new(0.0, 5.0, 10.0, 20.0);
        let b = AABB::new(0.0, 0.0, 10.0, 16.0);
        assert!(is_stomp(&a, &b));
        assert!(!is_stomp(&b, &a));
        assert!(!is_stomp(&b, &b));
    }

    #[test]
    fn test_bottom_above_enemy_is_stomp() {
        let mut player = player_at(10.0);
        let mut enemy = Dummy::at(0.0);

        assert_eq!(
            player.resolve_collision(&mut enemy),
            CollisionOutcome::Stomped
        );
        assert_eq!(enemy.stomps, 1);
        assert_eq!(enemy.side_hits, 0);
    }

    #[test]
    fn test_level_bottom_is_side_hit() {
        let mut player = player_at(0.0);
        let mut enemy = Dummy::at(0.0);

        assert_eq!(
            player.resolve_collision(&mut enemy),
            CollisionOutcome::SideHit
        );
        assert_eq!(enemy.side_hits, 1);
    }

    #[test]
    fn test_dead_object_ignored() {
        let mut player = player_at(10.0);
        let mut enemy = Dummy::at(0.0);
        enemy.dead = true;

        assert_eq!(
            player.resolve_collision(&mut enemy),
            CollisionOutcome::Ignored
        );
        assert_eq!(enemy.stomps, 0);
    }

    #[test]
    fn test_pickup_consumed_from_any_side() {
        let mut player = player_at(0.0);
        let mut mushroom = Mushroom { id: EntityId::new() };

        assert_eq!(
            player.resolve_collision(&mut mushroom),
            CollisionOutcome::Consumed
        );
        assert_eq!(player.power_state(), PowerState::Big);
        assert!(player
            .flush_events()
            .contains(&ControllerEvent::PickupConsumed(mushroom.id)));

        let mut player = player_at(50.0);
        assert_eq!(
            player.resolve_collision(&mut mushroom),
            CollisionOutcome::Consumed
        );
    }

    #[test]
    fn test_unknown_kind_ignored() {
        let mut player = player_at(0.0);
        assert_eq!(
            player.resolve_collision(&mut Scenery),
            CollisionOutcome::Ignored
        );
    }
}
