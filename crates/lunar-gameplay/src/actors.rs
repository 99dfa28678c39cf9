//! Reference level actors: a patrolling enemy and a power-up.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lunar_common::EntityId;

use crate::collision::{Enemy, LevelObject, Pickup};
use crate::input::Vec2;
use crate::physics::{Facing, AABB};
use crate::player::PlayerController;

/// Half extent of actor bounds.
const ACTOR_HALF_SIZE: f32 = 8.0;

/// Horizontal range a walker patrols.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    /// Left turnaround
    pub min_x: f32,
    /// Right turnaround
    pub max_x: f32,
}

impl Patrol {
    /// Creates a patrol range.
    #[must_use]
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min_x: a.min(b),
            max_x: a.max(b),
        }
    }
}

/// Enemy that walks back and forth. Dies when stomped, hurts on contact.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Entity id
    id: EntityId,
    /// Center position
    position: Vec2,
    /// Walk speed
    speed: f32,
    /// Current walk direction
    direction: Facing,
    /// Patrol range for the center
    patrol: Patrol,
    /// Stomped
    dead: bool,
}

impl Walker {
    /// A walker centered at `position` heading left.
    #[must_use]
    pub fn new(position: Vec2, speed: f32, patrol: Patrol) -> Self {
        Self {
            id: EntityId::new(),
            position,
            speed,
            direction: Facing::Left,
            patrol,
            dead: false,
        }
    }

    /// A walker standing on a floor at `floor_y`.
    #[must_use]
    pub fn on_floor(x: f32, floor_y: f32, speed: f32, patrol: Patrol) -> Self {
        Self::new(Vec2::new(x, floor_y + ACTOR_HALF_SIZE), speed, patrol)
    }

    /// Current walk direction.
    #[must_use]
    pub fn direction(&self) -> Facing {
        self.direction
    }
}

impl LevelObject for Walker {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> AABB {
        AABB::from_center(self.position, ACTOR_HALF_SIZE, ACTOR_HALF_SIZE)
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn update(&mut self, dt: f32) {
        if self.dead {
            return;
        }
        self.position.x += self.direction.sign() * self.speed * dt;

        if self.position.x <= self.patrol.min_x {
            self.position.x = self.patrol.min_x;
            self.direction = Facing::Right;
        } else if self.position.x >= self.patrol.max_x {
            self.position.x = self.patrol.max_x;
            self.direction = Facing::Left;
        }
    }

    fn as_enemy(&mut self) -> Option<&mut dyn Enemy> {
        Some(self)
    }
}

impl Enemy for Walker {
    fn on_player_stomp(&mut self, player: &mut PlayerController) {
        self.dead = true;
        info!("Walker {} stomped", self.id);
        player.jump_on_enemy(&*self);
    }

    fn on_player_collision(&mut self, player: &mut PlayerController) {
        if player.is_invincible() {
            return;
        }
        debug!("Walker {} hit player", self.id);
        player.take_damage(Some(self.id));
    }
}

/// Power-up that advances the player's power state.
#[derive(Debug, Clone)]
pub struct Powerup {
    /// Entity id
    id: EntityId,
    /// Center position
    position: Vec2,
    /// Already applied
    consumed: bool,
}

impl Powerup {
    /// A power-up centered at `position`.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            position,
            consumed: false,
        }
    }

    /// Whether it has been picked up.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

impl LevelObject for Powerup {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> AABB {
        AABB::from_center(self.position, ACTOR_HALF_SIZE, ACTOR_HALF_SIZE)
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.consumed
    }

    fn as_pickup(&mut self) -> Option<&mut dyn Pickup> {
        Some(self)
    }
}

impl Pickup for Powerup {
    fn apply(&mut self, player: &mut PlayerController) {
        self.consumed = true;
        player.advance_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionOutcome;
    use crate::config::ControllerConfig;
    use crate::player::DamageOutcome;
    use crate::power::PowerState;

    fn player_at(x: f32, y: f32) -> PlayerController {
        PlayerController::new(ControllerConfig::default())
            .expect("default config is valid")
            .at(Vec2::new(x, y))
    }

    #[test]
    fn test_walker_patrols() {
        let mut walker = Walker::on_floor(10.0, 0.0, 20.0, Patrol::new(0.0, 20.0));
        assert_eq!(walker.position().y, 8.0);

        walker.update(1.0);
        assert_eq!(walker.position().x, 0.0);
        assert_eq!(walker.direction(), Facing::Right);

        walker.update(0.5);
        assert_eq!(walker.position().x, 10.0);
        walker.update(1.0);
        assert_eq!(walker.position().x, 20.0);
        assert_eq!(walker.direction(), Facing::Left);
    }

    #[test]
    fn test_stomp_kills_walker_and_pounces() {
        let mut walker = Walker::on_floor(0.0, 0.0, 20.0, Patrol::new(-50.0, 50.0));
        let mut player = player_at(0.0, 12.0);

        assert_eq!(
            player.resolve_collision(&mut walker),
            CollisionOutcome::Stomped
        );
        assert!(walker.is_dead());
        assert!(player.pounce().is_some());
        assert!(!player.is_dead());

        // Dead walkers stop moving and ignore further contact.
        let before = walker.position();
        walker.update(1.0);
        assert_eq!(walker.position(), before);
        assert_eq!(
            player.resolve_collision(&mut walker),
            CollisionOutcome::Ignored
        );
    }

    #[test]
    fn test_side_contact_damages() {
        let mut walker = Walker::on_floor(10.0, 0.0, 20.0, Patrol::new(-50.0, 50.0));
        let mut player = player_at(0.0, 0.0);

        assert_eq!(
            player.resolve_collision(&mut walker),
            CollisionOutcome::SideHit
        );
        assert!(player.is_dead());
    }

    #[test]
    fn test_invincible_player_passes_through() {
        let mut walker = Walker::on_floor(10.0, 0.0, 20.0, Patrol::new(-50.0, 50.0));
        let mut player = player_at(0.0, 0.0);
        player.advance_state();
        assert_eq!(player.take_damage(None), DamageOutcome::Downgraded);
        assert!(player.is_invincible());

        player.resolve_collision(&mut walker);
        assert!(!player.is_dead());
        assert!(!walker.is_dead());
    }

    #[test]
    fn test_powerup_advances_once() {
        let mut powerup = Powerup::new(Vec2::new(0.0, 8.0));
        let mut player = player_at(0.0, 0.0);

        assert_eq!(
            player.resolve_collision(&mut powerup),
            CollisionOutcome::Consumed
        );
        assert!(powerup.is_consumed());
        assert_eq!(player.power_state(), PowerState::Big);

        assert_eq!(
            player.resolve_collision(&mut powerup),
            CollisionOutcome::Ignored
        );
        assert_eq!(player.power_state(), PowerState::Big);
    }
}
