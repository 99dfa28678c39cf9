//! Controller tuning.
//!
//! All speeds are world units per second, accelerations units per second
//! squared. Delays are in seconds except the invincibility window, which is
//! counted in update calls.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use lunar_common::{LunarError, LunarResult};

use crate::input::Vec2;
use crate::physics::{WalkParams, AABB};
use crate::power::{AnimationProfile, PowerState};

/// Invalid or missing controller configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An animation profile was left unassigned
    #[error("animation profile `{0}` is not assigned")]
    MissingProfile(&'static str),

    /// A value that must be positive is not
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f32,
    },

    /// A value that must not be negative is
    #[error("`{field}` must not be negative, got {value}")]
    Negative {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f32,
    },

    /// A footprint has no area
    #[error("footprint `{0}` is empty")]
    EmptyFootprint(&'static str),
}

impl From<ConfigError> for LunarError {
    fn from(err: ConfigError) -> Self {
        LunarError::Config(err.to_string())
    }
}

/// Tuning for the player controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // === Jumping ===
    /// Upward speed at jump start
    pub jump_high_speed: f32,
    /// Rebound speed after landing on an enemy
    pub jump_squash_speed: f32,

    // === Walking ===
    /// Acceleration while input is held
    pub walk_acc: f32,
    /// Braking deceleration without input
    pub walk_brake_acc: f32,
    /// Maximum horizontal speed
    pub walk_speed: f32,
    /// Axis magnitude below which input is ignored
    pub deadzone: f32,

    // === Falling ===
    /// Downward acceleration while airborne
    pub gravity: f32,
    /// Terminal fall speed
    pub max_fall_speed: f32,

    // === Damage ===
    /// Invincibility window length in update calls
    pub invincibility_ticks: u32,
    /// Seconds frozen before the death bounce
    pub death_freeze_delay: f32,
    /// Seconds between the death bounce and removal
    pub death_removal_delay: f32,
    /// Upward speed of the death bounce
    pub death_bounce_speed: f32,

    // === Power states ===
    /// Body-local footprint while Small
    pub small_footprint: AABB,
    /// Body-local footprint while Big or Super
    pub big_footprint: AABB,
    /// Animation profile while Small
    pub small_profile: AnimationProfile,
    /// Animation profile while Big or Super
    pub big_profile: AnimationProfile,

    // === Shooting ===
    /// Body-local shot origin for a right-facing body
    pub shot_origin: Vec2,
    /// Seconds between shots (0 = unlimited)
    pub shot_cooldown: f32,
    /// Minimum power state that may shoot (None = any)
    pub shot_min_power: Option<PowerState>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Jumping
            jump_high_speed: 120.0,
            jump_squash_speed: 70.0,

            // Walking
            walk_acc: 112.0,
            walk_brake_acc: 57.0,
            walk_speed: 60.0,
            deadzone: 0.01,

            // Falling
            gravity: 340.0,
            max_fall_speed: 240.0,

            // Damage
            invincibility_ticks: 203,
            death_freeze_delay: 0.25,
            death_removal_delay: 5.0,
            death_bounce_speed: 120.0,

            // Power states
            small_footprint: AABB::new(-6.0, 0.0, 6.0, 14.0),
            big_footprint: AABB::new(-6.0, 0.0, 6.0, 28.0),
            small_profile: AnimationProfile::new("player_small"),
            big_profile: AnimationProfile::new("player_big"),

            // Shooting
            shot_origin: Vec2::new(8.0, 14.0),
            shot_cooldown: 0.0,
            shot_min_power: None,
        }
    }
}

impl ControllerConfig {
    /// Parses a RON document. Missing fields take their defaults.
    pub fn from_ron_str(source: &str) -> LunarResult<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Loads and validates a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> LunarResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&contents)?;
        config.validate()?;
        info!("Loaded controller config from {}", path.display());
        Ok(config)
    }

    /// Serializes to pretty RON.
    pub fn to_ron_string(&self) -> LunarResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LunarError::Config(e.to_string()))
    }

    /// Checks that every required value is present and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.small_profile.is_assigned() {
            return Err(ConfigError::MissingProfile("small_profile"));
        }
        if !self.big_profile.is_assigned() {
            return Err(ConfigError::MissingProfile("big_profile"));
        }

        for (field, value) in [
            ("jump_high_speed", self.jump_high_speed),
            ("jump_squash_speed", self.jump_squash_speed),
            ("walk_acc", self.walk_acc),
            ("walk_brake_acc", self.walk_brake_acc),
            ("walk_speed", self.walk_speed),
            ("gravity", self.gravity),
            ("max_fall_speed", self.max_fall_speed),
            ("death_bounce_speed", self.death_bounce_speed),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        for (field, value) in [
            ("deadzone", self.deadzone),
            ("death_freeze_delay", self.death_freeze_delay),
            ("death_removal_delay", self.death_removal_delay),
            ("shot_cooldown", self.shot_cooldown),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        for (field, footprint) in [
            ("small_footprint", self.small_footprint),
            ("big_footprint", self.big_footprint),
        ] {
            if footprint.width() <= 0.0 || footprint.height() <= 0.0 {
                return Err(ConfigError::EmptyFootprint(field));
            }
        }

        Ok(())
    }

    /// Horizontal walking parameters.
    #[must_use]
    pub fn walk_params(&self) -> WalkParams {
        WalkParams {
            walk_speed: self.walk_speed,
            walk_acc: self.walk_acc,
            brake_acc: self.walk_brake_acc,
            deadzone: self.deadzone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jump_high_speed, 120.0);
        assert_eq!(config.jump_squash_speed, 70.0);
        assert_eq!(config.invincibility_ticks, 203);
        assert_eq!(config.death_bounce_speed, 120.0);
    }

    #[test]
    fn test_missing_profile_rejected() {
        let config = ControllerConfig {
            big_profile: AnimationProfile::default(),
            ..ControllerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingProfile("big_profile"))
        );
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let config = ControllerConfig {
            walk_speed: 0.0,
            ..ControllerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "walk_speed",
                value: 0.0
            })
        );

        let config = ControllerConfig {
            shot_cooldown: -1.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "shot_cooldown", .. })
        ));
    }

    #[test]
    fn test_empty_footprint_rejected() {
        let config = ControllerConfig {
            small_footprint: AABB::new(0.0, 0.0, 0.0, 10.0),
            ..ControllerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyFootprint("small_footprint"))
        );
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = ControllerConfig::from_ron_str(
            "(walk_speed: 80.0, shot_min_power: Some(Big), big_profile: (\"hero_big\"))",
        )
        .expect("valid ron");
        assert_eq!(config.walk_speed, 80.0);
        assert_eq!(config.shot_min_power, Some(PowerState::Big));
        assert_eq!(config.big_profile, AnimationProfile::new("hero_big"));
        assert_eq!(config.jump_high_speed, 120.0);
    }

    #[test]
    fn test_ron_roundtrip_preserves_tuning() {
        let mut config = ControllerConfig::default();
        config.gravity = 500.0;
        let text = config.to_ron_string().expect("serializes");
        let back = ControllerConfig::from_ron_str(&text).expect("parses");
        assert_eq!(back, config);
    }

    #[test]
    fn test_walk_params() {
        let params = ControllerConfig::default().walk_params();
        assert_eq!(params.walk_acc, 112.0);
        assert_eq!(params.brake_acc, 57.0);
    }

    #[test]
    fn test_config_error_into_lunar_error() {
        let err: LunarError = ConfigError::MissingProfile("small_profile").into();
        assert!(err.to_string().contains("small_profile"));
    }
}
