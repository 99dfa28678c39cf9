//! Jump and fall sequencing.
//!
//! A jump is button-initiated and stays flagged until landing, whether the
//! body is rising or already descending. Walking off a ledge is a fall: the
//! animator is suspended until the body lands again. There is no air jump.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{ControllerEvent, EventBus};
use crate::physics::KinematicBody;

/// Airborne state of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AirState {
    /// On the ground
    #[default]
    Grounded,
    /// In a button-initiated jump
    Jumping,
    /// Airborne without a jump (walked off an edge)
    Falling,
}

/// Tracks the jump flag and reacts to the body's ground edges.
#[derive(Debug, Clone, Default)]
pub struct JumpController {
    /// Current airborne state
    state: AirState,
}

impl JumpController {
    /// A controller in the grounded state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current airborne state.
    #[must_use]
    pub fn state(&self) -> AirState {
        self.state
    }

    /// True strictly between a jump start and its landing.
    #[must_use]
    pub fn is_jumping(&self) -> bool {
        self.state == AirState::Jumping
    }

    /// Starts a jump if the button was pressed while grounded and not jumping.
    ///
    /// Returns true when a jump started.
    pub fn try_jump(
        &mut self,
        pressed: bool,
        body: &mut KinematicBody,
        speed: f32,
        bus: &EventBus,
    ) -> bool {
        if !pressed || !body.is_grounded() || self.is_jumping() {
            return false;
        }
        self.start_jump(body, speed, bus);
        true
    }

    fn start_jump(&mut self, body: &mut KinematicBody, speed: f32, bus: &EventBus) {
        self.state = AirState::Jumping;
        body.set_velocity_y(speed);
        bus.publish(ControllerEvent::Jump(true));
        debug!("Jump started at vy={}", speed);
    }

    /// Ground contact was lost.
    pub fn on_started_falling(&mut self, grounded: bool, bus: &EventBus) {
        if !self.is_jumping() {
            self.start_fall(grounded, bus);
        }
    }

    /// Ground contact was regained.
    pub fn on_stopped_falling(&mut self, bus: &EventBus) {
        if self.is_jumping() {
            self.end_jump(bus);
        } else {
            self.end_fall(bus);
        }
    }

    fn end_jump(&mut self, bus: &EventBus) {
        debug_assert!(self.is_jumping());
        self.state = AirState::Grounded;
        bus.publish(ControllerEvent::Jump(false));
        debug!("Jump ended");
    }

    fn start_fall(&mut self, grounded: bool, bus: &EventBus) {
        debug_assert!(!grounded, "fall started while grounded");
        debug_assert!(!self.is_jumping(), "fall started during a jump");
        self.state = AirState::Falling;
        bus.publish(ControllerEvent::AnimatorEnabled(false));
        debug!("Fall started");
    }

    fn end_fall(&mut self, bus: &EventBus) {
        debug_assert!(!self.is_jumping(), "fall ended during a jump");
        self.state = AirState::Grounded;
        bus.publish(ControllerEvent::AnimatorEnabled(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Vec2;

    fn grounded_body() -> KinematicBody {
        let mut body = KinematicBody::new(Vec2::ZERO);
        body.set_grounded(true);
        body
    }

    #[test]
    fn test_jump_from_ground() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();
        let mut body = grounded_body();

        assert!(jump.try_jump(true, &mut body, 120.0, &bus));
        assert!(jump.is_jumping());
        assert_eq!(body.velocity().y, 120.0);
        assert_eq!(bus.drain(), vec![ControllerEvent::Jump(true)]);
    }

    #[test]
    fn test_no_jump_without_press() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();
        let mut body = grounded_body();
        assert!(!jump.try_jump(false, &mut body, 120.0, &bus));
        assert_eq!(body.velocity().y, 0.0);
    }

    #[test]
    fn test_no_air_jump() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();
        let mut body = KinematicBody::new(Vec2::ZERO);
        body.set_velocity_y(-30.0);

        assert!(!jump.try_jump(true, &mut body, 120.0, &bus));
        assert_eq!(body.velocity().y, -30.0);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_jump_press_while_falling_keeps_fall() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();
        let mut body = KinematicBody::new(Vec2::ZERO);
        jump.on_started_falling(false, &bus);
        bus.drain();

        assert!(!jump.try_jump(true, &mut body, 120.0, &bus));
        assert_eq!(jump.state(), AirState::Falling);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_no_jump_while_jumping() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();
        let mut body = grounded_body();
        jump.try_jump(true, &mut body, 120.0, &bus);
        body.set_velocity_y(40.0);

        assert!(!jump.try_jump(true, &mut body, 120.0, &bus));
        assert_eq!(body.velocity().y, 40.0);
    }

    #[test]
    fn test_walk_off_edge_then_land() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();

        jump.on_started_falling(false, &bus);
        assert_eq!(jump.state(), AirState::Falling);
        assert_eq!(bus.drain(), vec![ControllerEvent::AnimatorEnabled(false)]);

        jump.on_stopped_falling(&bus);
        assert_eq!(jump.state(), AirState::Grounded);
        assert_eq!(bus.drain(), vec![ControllerEvent::AnimatorEnabled(true)]);
    }

    #[test]
    fn test_leaving_ground_during_jump_is_not_a_fall() {
        let bus = EventBus::default();
        let mut jump = JumpController::new();
        let mut body = grounded_body();
        jump.try_jump(true, &mut body, 120.0, &bus);
        bus.drain();

        jump.on_started_falling(false, &bus);
        assert!(jump.is_jumping());
        assert!(bus.drain().is_empty());

        jump.on_stopped_falling(&bus);
        assert!(!jump.is_jumping());
        assert_eq!(bus.drain(), vec![ControllerEvent::Jump(false)]);
    }
}
