//! Input abstraction for the player controller.
//!
//! Device polling lives outside this crate. The host feeds raw samples
//! (axis values and held buttons) into an [`InputManager`], which turns them
//! into the per-frame [`Input`] the controller consumes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 2D vector for positions, velocities and directions (y-up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Origin, or no motion.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Leftward unit step.
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };

    /// Rightward unit step.
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Creates a new Vec2.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Held state of one button plus its press edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Held this frame
    pub pressed: bool,
    /// Went down this frame
    pub just_pressed: bool,
}

impl ButtonState {
    /// A released button.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: false,
            just_pressed: false,
        }
    }

    /// Records this frame's sample. The edge is raised only on release-to-held.
    pub fn update(&mut self, held: bool) {
        self.just_pressed = held && !self.pressed;
        self.pressed = held;
    }

    /// Lowers the edge once the frame has consumed it.
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
    }
}

/// Discrete actions the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Jump
    Jump,
    /// Fire a shot
    Shoot,
}

/// Processed input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Input {
    /// Movement axes, each in [-1, 1]
    pub movement: Vec2,
    /// Whether jump was just pressed this frame
    pub jump_just_pressed: bool,
    /// Whether shoot was just pressed this frame
    pub shoot_just_pressed: bool,
}

impl Input {
    /// Create a neutral input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Neutral input with the given horizontal axis value.
    #[must_use]
    pub fn horizontal(x: f32) -> Self {
        Self {
            movement: Vec2::new(x.clamp(-1.0, 1.0), 0.0),
            ..Self::default()
        }
    }

    /// Input with only a jump press.
    #[must_use]
    pub fn jump() -> Self {
        Self {
            jump_just_pressed: true,
            ..Self::default()
        }
    }

    /// Input with only a shoot press.
    #[must_use]
    pub fn shoot() -> Self {
        Self {
            shoot_just_pressed: true,
            ..Self::default()
        }
    }
}

/// Turns raw per-frame samples into [`Input`].
#[derive(Debug, Default)]
pub struct InputManager {
    /// Last sampled axes
    axis: Vec2,
    /// Button states per action
    buttons: HashMap<Action, ButtonState>,
}

impl InputManager {
    /// Create a new input manager with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current axis sample. Values are clamped to [-1, 1].
    pub fn update_axis(&mut self, x: f32, y: f32) {
        self.axis = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }

    /// Record whether the button bound to `action` is held this frame.
    pub fn update_button(&mut self, action: Action, is_pressed: bool) {
        self.buttons.entry(action).or_default().update(is_pressed);
    }

    /// Check if an action was just pressed this frame.
    #[must_use]
    pub fn is_action_just_pressed(&self, action: Action) -> bool {
        self.buttons.get(&action).is_some_and(|s| s.just_pressed)
    }

    /// Process the samples into game-ready input.
    #[must_use]
    pub fn process(&self) -> Input {
        Input {
            movement: self.axis,
            jump_just_pressed: self.is_action_just_pressed(Action::Jump),
            shoot_just_pressed: self.is_action_just_pressed(Action::Shoot),
        }
    }

    /// Clear edge state at the end of a frame.
    pub fn end_frame(&mut self) {
        for state in self.buttons.values_mut() {
            state.clear_frame();
        }
    }
}
