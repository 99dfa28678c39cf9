//! Runner configuration.
//!
//! Frame rate, run length, the demo level's camera, and the controller
//! tuning, loaded from a TOML file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lunar_common::LunarResult;
use lunar_gameplay::{CameraBounds, ControllerConfig};

/// Configuration file name.
pub const CONFIG_FILE: &str = "lunar.toml";

/// Runner configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Timing ===
    /// Simulation steps per second
    pub target_fps: u32,
    /// Steps to simulate before exiting
    pub frames: u64,
    /// Pace steps against the wall clock instead of running flat out
    pub realtime: bool,

    // === Level ===
    /// Length of the power-change animation in steps
    pub state_change_frames: u32,
    /// Left visible edge of the demo level
    pub camera_left: f32,
    /// Right visible edge of the demo level
    pub camera_right: f32,

    // === Player ===
    /// Controller tuning
    pub controller: ControllerConfig,
    /// RON file replacing `controller`, relative to the config file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Timing
            target_fps: 60,
            frames: 900,
            realtime: false,

            // Level
            state_change_frames: 30,
            camera_left: 0.0,
            camera_right: 1600.0,

            // Player
            controller: ControllerConfig::default(),
            controller_file: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::parse(path) {
            Ok(mut config) => {
                info!("Loaded config from {}", path.display());
                config.load_controller_file(path.parent().unwrap_or_else(|| Path::new(".")));
                config
            },
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Reads and parses a config file.
    pub fn parse(path: &Path) -> LunarResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Replaces the inline controller table with `controller_file`, if set.
    /// A file that fails to load leaves the inline table in place.
    fn load_controller_file(&mut self, base: &Path) {
        let Some(file) = &self.controller_file else {
            return;
        };
        let path = base.join(file);
        match ControllerConfig::load(&path) {
            Ok(controller) => self.controller = controller,
            Err(e) => warn!(
                "Failed to load controller file {}: {e}, keeping inline tuning",
                path.display()
            ),
        }
    }

    /// Save configuration to a specific path.
    #[allow(dead_code)]
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration file path (working directory).
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Validate and clamp configuration values to sensible ranges.
    ///
    /// Controller tuning that fails validation is replaced by the defaults.
    pub fn validate(&mut self) {
        self.target_fps = self.target_fps.clamp(10, 240);
        self.state_change_frames = self.state_change_frames.min(600);
        if self.camera_right < self.camera_left {
            std::mem::swap(&mut self.camera_left, &mut self.camera_right);
        }

        if let Err(e) = self.controller.validate() {
            warn!("Invalid controller config ({e}), using defaults");
            self.controller = ControllerConfig::default();
        }
    }

    /// Camera bounds of the demo level.
    #[must_use]
    pub fn camera(&self) -> CameraBounds {
        CameraBounds::new(self.camera_left, self.camera_right)
    }
}
