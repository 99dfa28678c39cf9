//! Level loop: the outer scheduler around the player controller.
//!
//! Owns the world geometry, the player, the other level objects and the
//! pause lock. Each step advances the state-change animation, then (unless
//! paused) updates everything and arbitrates overlaps.

use tracing::{debug, error, info, warn};

use lunar_common::EntityId;

use crate::collision::{CollisionOutcome, LevelObject};
use crate::events::ControllerEvent;
use crate::input::Input;
use crate::pause::PauseManager;
use crate::physics::WorldQuery;
use crate::player::PlayerController;
use crate::shot::ShotSpawn;
use crate::timer::FrameCountdown;

/// Progress of the power-change animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateChangeAnimation {
    /// Nothing playing
    #[default]
    Idle,
    /// Triggered; starts on the next step
    Pending,
    /// Playing, world paused
    Playing(FrameCountdown),
}

/// What happened during one [`Level::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Step number, starting at 1
    pub frame: u64,
    /// The world was paused for this step
    pub paused: bool,
    /// Controller events, in publish order
    pub events: Vec<ControllerEvent>,
    /// Shots to spawn
    pub shots: Vec<ShotSpawn>,
    /// Overlaps that did something
    pub collisions: Vec<(EntityId, CollisionOutcome)>,
    /// Objects removed from the level
    pub removed: Vec<EntityId>,
    /// The player reported its own removal
    pub player_removed: bool,
}

/// A running level.
pub struct Level<W: WorldQuery> {
    /// Geometry
    world: W,
    /// The player
    player: PlayerController,
    /// Everything else
    objects: Vec<Box<dyn LevelObject>>,
    /// World time lock
    pause: PauseManager,
    /// Power-change animation
    animation: StateChangeAnimation,
    /// Length of the power-change animation in steps
    state_change_frames: u32,
    /// Steps run so far
    frame: u64,
}

impl<W: WorldQuery> Level<W> {
    /// Starts a level and activates the player.
    pub fn new(world: W, mut player: PlayerController, state_change_frames: u32) -> Self {
        player.activate();
        info!(
            "Level started, player {} at {:?}",
            player.id(),
            player.position()
        );
        Self {
            world,
            player,
            objects: Vec::new(),
            pause: PauseManager::new(),
            animation: StateChangeAnimation::Idle,
            state_change_frames,
            frame: 0,
        }
    }

    /// Adds an object. Returns its id.
    pub fn spawn(&mut self, object: Box<dyn LevelObject>) -> EntityId {
        let id = object.id();
        debug!("Spawned {}", id);
        self.objects.push(object);
        id
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// The player, mutably.
    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    /// Level geometry.
    #[must_use]
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Level geometry, mutably.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Number of objects besides the player.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Looks up an object by id.
    #[must_use]
    pub fn object(&self, id: EntityId) -> Option<&dyn LevelObject> {
        self.objects
            .iter()
            .find(|o| o.id() == id)
            .map(Box::as_ref)
    }

    /// The world time lock.
    #[must_use]
    pub fn pause(&self) -> &PauseManager {
        &self.pause
    }

    /// Power-change animation state.
    #[must_use]
    pub fn animation(&self) -> StateChangeAnimation {
        self.animation
    }

    /// Steps run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one step.
    pub fn step(&mut self, dt: f32, input: &Input) -> StepReport {
        self.frame += 1;
        let mut report = StepReport {
            frame: self.frame,
            ..StepReport::default()
        };

        self.advance_animation();
        if !self.pause.should_update_world() {
            self.pause.record_frame();
            report.paused = true;
            report.events.extend(self.player.flush_events());
            return report;
        }

        let effects = self.player.update(dt, input, &mut self.world);
        report.events.extend(effects.events);
        report.shots.extend(effects.shots);
        report.player_removed = effects.despawn;

        for object in &mut self.objects {
            object.update(dt);
        }

        self.arbitrate(&mut report);

        self.objects.retain(|object| {
            if object.is_dead() {
                report.removed.push(object.id());
                false
            } else {
                true
            }
        });

        report.events.extend(self.player.flush_events());
        if report.events.contains(&ControllerEvent::ChangeState) {
            self.animation = StateChangeAnimation::Pending;
        }

        report
    }

    fn arbitrate(&mut self, report: &mut StepReport) {
        if self.player.is_dead() {
            return;
        }
        for object in &mut self.objects {
            if !self.player.bounds().overlaps(&object.bounds()) {
                continue;
            }
            let id = object.id();
            let outcome = self.player.resolve_collision(&mut **object);
            if outcome != CollisionOutcome::Ignored {
                report.collisions.push((id, outcome));
            }
        }
    }

    fn advance_animation(&mut self) {
        match self.animation {
            StateChangeAnimation::Idle => {},
            StateChangeAnimation::Pending => {
                if let Err(e) = self.player.begin_state_change(&mut self.pause) {
                    warn!("State change animation skipped: {e}");
                    self.animation = StateChangeAnimation::Idle;
                    return;
                }
                let countdown = FrameCountdown::new(self.state_change_frames);
                if countdown.is_finished() {
                    self.finish_animation();
                } else {
                    self.animation = StateChangeAnimation::Playing(countdown);
                }
            },
            StateChangeAnimation::Playing(mut countdown) => {
                countdown.tick();
                if countdown.is_finished() {
                    self.finish_animation();
                } else {
                    self.animation = StateChangeAnimation::Playing(countdown);
                }
            },
        }
    }

    fn finish_animation(&mut self) {
        self.animation = StateChangeAnimation::Idle;
        if let Err(e) = self.player.end_state_change(&mut self.pause) {
            error!("State change animation ended without the pause lock: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::{Patrol, Powerup, Walker};
    use crate::config::ControllerConfig;
    use crate::input::Vec2;
    use crate::physics::BlockWorld;
    use crate::power::PowerState;

    const DT: f32 = 1.0 / 60.0;

    fn level_with_player_at(x: f32, y: f32, frames: u32) -> Level<BlockWorld> {
        let player = PlayerController::new(ControllerConfig::default())
            .expect("default config is valid")
            .at(Vec2::new(x, y));
        Level::new(BlockWorld::with_floor(0.0), player, frames)
    }

    #[test]
    fn test_powerup_pauses_for_animation() {
        let mut level = level_with_player_at(0.0, 0.0, 3);
        let walker = level.spawn(Box::new(Walker::on_floor(
            100.0,
            0.0,
            20.0,
            Patrol::new(50.0, 150.0),
        )));
        let powerup = level.spawn(Box::new(Powerup::new(Vec2::new(0.0, 8.0))));

        let report = level.step(DT, &Input::new());
        assert!(!report.paused);
        assert_eq!(report.collisions, vec![(powerup, CollisionOutcome::Consumed)]);
        assert_eq!(report.removed, vec![powerup]);
        assert!(report.events.contains(&ControllerEvent::ChangeState));
        assert_eq!(level.player().power_state(), PowerState::Big);
        assert_eq!(level.animation(), StateChangeAnimation::Pending);

        let walker_x = level.object(walker).map(|w| w.position().x);
        for _ in 0..3 {
            let report = level.step(DT, &Input::horizontal(1.0));
            assert!(report.paused);
            assert!(level.player().is_transitioning());
        }
        assert_eq!(level.object(walker).map(|w| w.position().x), walker_x);
        assert_eq!(level.player().position().x, 0.0);
        assert_eq!(level.pause().paused_frames(), 3);

        let report = level.step(DT, &Input::new());
        assert!(!report.paused);
        assert!(!level.player().is_transitioning());
        assert_eq!(level.pause().time_scale(), 1.0);
    }

    #[test]
    fn test_zero_frame_animation_never_pauses() {
        let mut level = level_with_player_at(0.0, 0.0, 0);
        level.spawn(Box::new(Powerup::new(Vec2::new(0.0, 8.0))));

        level.step(DT, &Input::new());
        let report = level.step(DT, &Input::new());
        assert!(!report.paused);
        assert_eq!(level.animation(), StateChangeAnimation::Idle);
    }

    #[test]
    fn test_stomp_removes_walker_and_rebounds() {
        let mut level = level_with_player_at(0.0, 24.0, 3);
        let walker = level.spawn(Box::new(Walker::on_floor(
            0.0,
            0.0,
            0.0,
            Patrol::new(-50.0, 50.0),
        )));

        let mut stomped = false;
        let mut landed = false;
        for _ in 0..120 {
            let report = level.step(DT, &Input::new());
            if report.collisions.contains(&(walker, CollisionOutcome::Stomped)) {
                stomped = true;
                assert_eq!(report.removed, vec![walker]);
            }
            if stomped && level.player().pounce().is_none() {
                landed = true;
                break;
            }
        }
        assert!(stomped);
        assert!(landed);
        assert_eq!(level.player().bounds().bottom(), 8.0);
        assert_eq!(level.player().velocity().y, 70.0);
        assert!(!level.player().is_dead());
        assert_eq!(level.object_count(), 0);
    }

    #[test]
    fn test_walker_contact_kills_small_player() {
        let mut level = level_with_player_at(0.0, 0.0, 3);
        level.spawn(Box::new(Walker::on_floor(
            30.0,
            0.0,
            40.0,
            Patrol::new(-100.0, 100.0),
        )));

        let mut died = false;
        let mut removed = false;
        for _ in 0..600 {
            let report = level.step(DT, &Input::new());
            if report.events.contains(&ControllerEvent::Dead(true)) {
                died = true;
            }
            if report.player_removed {
                removed = true;
                break;
            }
        }
        assert!(died);
        assert!(removed);
        assert!(level.player().is_removed());
    }

    #[test]
    fn test_walker_contact_downgrades_big_player() {
        let mut level = level_with_player_at(0.0, 0.0, 2);
        level.player_mut().advance_state();
        level.player_mut().flush_events();
        let walker = level.spawn(Box::new(Walker::on_floor(
            20.0,
            0.0,
            40.0,
            Patrol::new(-100.0, 100.0),
        )));

        let mut hit = false;
        for _ in 0..60 {
            let report = level.step(DT, &Input::new());
            if report.collisions.contains(&(walker, CollisionOutcome::SideHit)) {
                hit = true;
                break;
            }
        }
        assert!(hit);
        assert!(level.player().is_small());
        assert!(level.player().is_invincible());
        assert_eq!(level.animation(), StateChangeAnimation::Pending);

        // Walking through the walker while invincible does nothing.
        for _ in 0..30 {
            level.step(DT, &Input::new());
        }
        assert!(!level.player().is_dead());
    }
}
