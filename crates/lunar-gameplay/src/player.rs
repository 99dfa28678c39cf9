//! Player controller.
//!
//! Owns the kinematic body and the power-state machine, and drives the jump,
//! invincibility, death and pounce sub-states from a single per-frame
//! [`PlayerController::update`]. Everything visible to the outside is
//! returned as [`FrameEffects`].
//!
//! Frame order: timers, input, velocity, position and world resolution,
//! pounce settle. Collision arbitration runs after `update`, driven by the
//! level; its state changes are seen by the next frame's velocity phase.

use std::mem;

use tracing::{debug, info, warn};

use lunar_common::EntityId;

use crate::collision::LevelObject;
use crate::config::{ConfigError, ControllerConfig};
use crate::events::{ControllerEvent, EventBus};
use crate::input::{Input, Vec2};
use crate::jump::{AirState, JumpController};
use crate::pause::{PauseError, PauseManager, PauseReason};
use crate::physics::{Facing, KinematicBody, WalkParams, WorldQuery, AABB};
use crate::power::{PowerState, PowerStateMachine, PowerTransition};
use crate::sequencer::{DeathSequence, DeathStep, Invincibility, Pounce};
use crate::shot::{ShotEmitter, ShotSpawn};

/// Output of one controller update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameEffects {
    /// Events published this frame, in order
    pub events: Vec<ControllerEvent>,
    /// Projectiles to spawn
    pub shots: Vec<ShotSpawn>,
    /// The controller's entity should be removed
    pub despawn: bool,
}

impl FrameEffects {
    /// Whether an event was published this frame.
    #[must_use]
    pub fn contains(&self, event: &ControllerEvent) -> bool {
        self.events.contains(event)
    }

    /// Last visibility published this frame, if any.
    #[must_use]
    pub fn visibility(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            ControllerEvent::Visible(visible) => Some(*visible),
            _ => None,
        })
    }
}

/// Result of [`PlayerController::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead, invincible or mid-transition
    Ignored,
    /// Dropped back to Small
    Downgraded,
    /// Was Small: death sequence started
    Died,
}

/// The player character.
#[derive(Debug)]
pub struct PlayerController {
    /// Entity id
    id: EntityId,
    /// Parent shots are attached to
    parent: Option<EntityId>,
    /// Tuning
    config: ControllerConfig,
    /// Cached walk parameters
    walk: WalkParams,
    /// Position, velocity, facing, ground contact
    body: KinematicBody,
    /// Small / Big / Super
    power: PowerStateMachine,
    /// Jump and fall sequencing
    jump: JumpController,
    /// Damage immunity window
    invincibility: Invincibility,
    /// Running death sequence
    death: Option<DeathSequence>,
    /// Pending landing on an enemy
    pounce: Option<Pounce>,
    /// Projectile spawner
    shots: ShotEmitter,
    /// Outgoing events
    bus: EventBus,
    /// Horizontal axis from the last input
    move_x: f32,
    /// A state-change animation holds the pause lock
    transitioning: bool,
    /// Removal has been reported
    removed: bool,
    /// Shots fired since the last drain
    pending_shots: Vec<ShotSpawn>,
}

impl PlayerController {
    /// Creates a Small player at the origin.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let power = PowerStateMachine::new(
            config.small_footprint,
            config.big_footprint,
            config.small_profile.clone(),
            config.big_profile.clone(),
        );
        let shots = ShotEmitter::new(
            config.shot_origin,
            config.shot_cooldown,
            config.shot_min_power,
        );
        let id = EntityId::new();
        info!("Player {} created", id);

        Ok(Self {
            id,
            parent: None,
            walk: config.walk_params(),
            config,
            body: KinematicBody::new(Vec2::ZERO),
            power,
            jump: JumpController::new(),
            invincibility: Invincibility::new(),
            death: None,
            pounce: None,
            shots,
            bus: EventBus::default(),
            move_x: 0.0,
            transitioning: false,
            removed: false,
            pending_shots: Vec::new(),
        })
    }

    /// Places the body.
    #[must_use]
    pub fn at(mut self, position: Vec2) -> Self {
        self.body.set_position(position);
        self
    }

    /// Sets the parent that fired shots are attached to.
    #[must_use]
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Resets facing and input. Called when the player enters play.
    pub fn activate(&mut self) {
        if self.body.facing() == Facing::Left {
            self.body.flip();
        }
        self.move_x = 0.0;
        debug!("Player {} activated", self.id);
    }

    // === Queries ===

    /// Entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Body origin.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.body.velocity()
    }

    /// Current facing.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.body.facing()
    }

    /// Ground contact from the last update.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.body.is_grounded()
    }

    /// Active body-local footprint.
    #[must_use]
    pub fn footprint(&self) -> AABB {
        self.power.footprint()
    }

    /// Active world-space footprint.
    #[must_use]
    pub fn bounds(&self) -> AABB {
        self.body.world_footprint(self.power.footprint())
    }

    /// Current power state.
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// Whether the player is Small.
    #[must_use]
    pub fn is_small(&self) -> bool {
        self.power.state().is_small()
    }

    /// Whether an invincibility window is running.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_active()
    }

    /// Whether the player is dead. Terminal.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.death.is_some()
    }

    /// Whether removal has been reported.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Whether a button-initiated jump is in progress.
    #[must_use]
    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    /// Airborne state.
    #[must_use]
    pub fn air_state(&self) -> AirState {
        self.jump.state()
    }

    /// Whether a state-change animation is playing.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Pending pounce, if any.
    #[must_use]
    pub fn pounce(&self) -> Option<Pounce> {
        self.pounce
    }

    // === Frame ===

    /// Runs one frame.
    pub fn update<W: WorldQuery + ?Sized>(
        &mut self,
        dt: f32,
        input: &Input,
        world: &mut W,
    ) -> FrameEffects {
        if self.removed {
            return FrameEffects::default();
        }

        self.shots.tick(dt);
        if let Some(visible) = self.invincibility.tick() {
            self.bus.publish(ControllerEvent::Visible(visible));
            if visible && !self.invincibility.is_active() {
                debug!("Invincibility ended");
            }
        }

        if self.is_dead() {
            self.update_death(dt);
        } else {
            self.handle_input(input);
            self.update_velocity(dt);
            self.update_position(dt, world);
            self.settle_pounce();
        }

        self.drain_effects()
    }

    /// Events published outside `update` (collision handlers, transition
    /// hooks) since the last drain.
    pub fn flush_events(&mut self) -> Vec<ControllerEvent> {
        self.bus.drain()
    }

    pub(crate) fn publish(&self, event: ControllerEvent) {
        self.bus.publish(event);
    }

    fn drain_effects(&mut self) -> FrameEffects {
        let events = self.bus.drain();
        let despawn = events.contains(&ControllerEvent::Removed);
        FrameEffects {
            events,
            shots: mem::take(&mut self.pending_shots),
            despawn,
        }
    }

    fn handle_input(&mut self, input: &Input) {
        self.move_x = input.movement.x.clamp(-1.0, 1.0);

        self.jump.try_jump(
            input.jump_just_pressed,
            &mut self.body,
            self.config.jump_high_speed,
            &self.bus,
        );

        if input.shoot_just_pressed {
            self.shoot();
        }
    }

    fn shoot(&mut self) {
        match self
            .shots
            .fire(&self.body, self.power.state(), self.id, self.parent)
        {
            Ok(shot) => {
                self.bus.publish(ControllerEvent::ShotFired(shot.direction));
                self.pending_shots.push(shot);
            },
            Err(e) => debug!("Shot suppressed: {e}"),
        }
    }

    fn update_velocity(&mut self, dt: f32) {
        if !self.body.movement_enabled() {
            return;
        }

        self.body
            .apply_gravity(self.config.gravity, self.config.max_fall_speed, dt);
        self.body.apply_walk(self.move_x, &self.walk, dt);

        if self.body.is_grounded() {
            let vx = self.body.velocity().x;
            let deadzone = self.walk.deadzone;
            let skidding =
                (self.move_x > deadzone && vx < 0.0) || (self.move_x < -deadzone && vx > 0.0);
            self.bus.publish(ControllerEvent::Speed(vx.abs()));
            self.bus.publish(ControllerEvent::Stop(skidding));
        }
    }

    fn update_position<W: WorldQuery + ?Sized>(&mut self, dt: f32, world: &mut W) {
        if !self.body.movement_enabled() {
            return;
        }

        let footprint = self.power.footprint();
        self.body.integrate(dt);
        self.body.clamp_to_camera(footprint, world.camera_bounds());

        let events = self.body.resolve(footprint, world);

        if events.obstacle.is_some() {
            self.body.stop_horizontal();
        }
        if let Some(cell) = events.overhead {
            if !cell.bumping {
                world.hit_cell(cell.coord, self.id);
                self.bus.publish(ControllerEvent::CellHit(cell.coord));
                debug!("Hit cell {:?} from below", cell.coord);
            }
        }
        if events.started_falling {
            self.jump
                .on_started_falling(self.body.is_grounded(), &self.bus);
        }
        if events.stopped_falling {
            self.jump.on_stopped_falling(&self.bus);
        }
    }

    // === Power ===

    /// Moves one power state up. Returns false at the ceiling or when dead.
    pub fn advance_state(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        match self.power.advance() {
            Some(transition) => {
                self.apply_transition(transition);
                true
            },
            None => {
                debug!("Power state already at ceiling");
                false
            },
        }
    }

    fn apply_transition(&mut self, transition: PowerTransition) {
        self.bus.publish(ControllerEvent::Profile(transition.profile));
        self.bus.publish(ControllerEvent::Jump(false));
        self.bus.publish(ControllerEvent::ChangeState);
        self.bus.publish(ControllerEvent::PowerChanged {
            from: transition.from,
            to: transition.to,
        });
        if transition.starts_invincibility {
            self.start_invincibility();
        }
    }

    fn start_invincibility(&mut self) {
        match self.invincibility.start(self.config.invincibility_ticks) {
            Ok(visible) => {
                self.bus.publish(ControllerEvent::Visible(visible));
                debug!(
                    "Invincibility started for {} ticks",
                    self.config.invincibility_ticks
                );
            },
            // A window opened before a power-up keeps running unchanged
            Err(e) => warn!("Invincibility not restarted: {e}"),
        }
    }

    /// State-change animation started: freeze world time.
    pub fn begin_state_change(&mut self, pause: &mut PauseManager) -> Result<(), PauseError> {
        pause.pause(PauseReason::StateTransition)?;
        self.transitioning = true;
        debug!("State change animation started");
        Ok(())
    }

    /// State-change animation finished: resume world time.
    pub fn end_state_change(&mut self, pause: &mut PauseManager) -> Result<(), PauseError> {
        pause.resume(PauseReason::StateTransition)?;
        self.transitioning = false;
        if self.jump.is_jumping() {
            self.bus.publish(ControllerEvent::Jump(true));
        }
        debug!("State change animation finished");
        Ok(())
    }

    // === Damage ===

    /// Applies a hit. Small dies, Big and Super drop to Small.
    ///
    /// Damage sources decide whether an invincible player can be hurt; this
    /// only refuses hits while dead or mid state change.
    pub fn take_damage(&mut self, attacker: Option<EntityId>) -> DamageOutcome {
        if self.is_dead() || self.transitioning {
            debug!("Damage from {:?} ignored", attacker);
            return DamageOutcome::Ignored;
        }

        match self.power.reset_to_small() {
            Some(transition) => {
                info!("Player {} hit by {:?}, downgraded", self.id, attacker);
                self.apply_transition(transition);
                DamageOutcome::Downgraded
            },
            None => {
                info!("Player {} killed by {:?}", self.id, attacker);
                self.die();
                DamageOutcome::Died
            },
        }
    }

    fn die(&mut self) {
        if self.is_dead() {
            return;
        }
        self.move_x = 0.0;
        self.pounce = None;
        self.body.stop_horizontal();
        self.body.set_velocity_y(0.0);
        self.body.set_grounded(false);
        self.body.set_movement_enabled(false);

        self.bus.publish(ControllerEvent::Stop(false));
        self.bus.publish(ControllerEvent::Jump(false));
        self.bus.publish(ControllerEvent::Dead(true));

        self.death = Some(DeathSequence::new(
            self.config.death_freeze_delay,
            self.config.death_removal_delay,
        ));
    }

    fn update_death(&mut self, dt: f32) {
        let Some(death) = self.death.as_mut() else {
            return;
        };

        match death.tick(dt) {
            DeathStep::Holding | DeathStep::Done => {},
            DeathStep::Bounce => {
                self.body.set_movement_enabled(true);
                self.body.set_velocity_y(self.config.death_bounce_speed);
                self.body.integrate(dt);
            },
            DeathStep::Falling => {
                self.body
                    .apply_gravity(self.config.gravity, self.config.max_fall_speed, dt);
                self.body.integrate(dt);
            },
            DeathStep::Remove => {
                self.removed = true;
                self.bus.publish(ControllerEvent::Removed);
                info!("Player {} removed", self.id);
            },
        }
    }

    // === Enemies ===

    /// Lands on `enemy`: wait until the bottom edge reaches the enemy's
    /// anchor height, then snap to it and rebound.
    pub fn jump_on_enemy(&mut self, enemy: &dyn LevelObject) {
        if self.is_dead() {
            return;
        }
        let pounce = Pounce::new(enemy.position().y);
        if pounce.reached(self.bounds().bottom()) {
            self.land_pounce(pounce);
        } else {
            self.pounce = Some(pounce);
        }
    }

    fn settle_pounce(&mut self) {
        if let Some(pounce) = self.pounce {
            if pounce.reached(self.bounds().bottom()) {
                self.land_pounce(pounce);
            }
        }
    }

    fn land_pounce(&mut self, pounce: Pounce) {
        self.pounce = None;
        self.body
            .set_bottom(self.power.footprint(), pounce.target_bottom());
        self.body.set_velocity_y(self.config.jump_squash_speed);
        debug!("Pounce landed at {}", pounce.target_bottom());
    }
}
