//! Scripted demo level.
//!
//! Builds a small block-world level, drives the player with a held-button
//! script through the input manager, and tallies what happened.

use std::fmt;
use std::ops::Range;

use anyhow::Result;
use tracing::{debug, info};

use lunar_common::CellCoord;
use lunar_gameplay::{
    Action, BlockWorld, CollisionOutcome, ControllerEvent, InputManager, Level, Patrol,
    PlayerController, PowerState, Powerup, StepReport, Vec2, Walker,
};

use crate::config::EngineConfig;
use crate::timing::{Pacing, StepClock};

/// Grid size of the demo level's blocks.
const CELL_SIZE: f32 = 16.0;

/// Where the player spawns in the demo level.
pub const SPAWN: Vec2 = Vec2::new(32.0, 0.0);

/// What a script holds during a frame range.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Hold {
    /// Horizontal axis value
    Axis(f32),
    /// A button
    Button(Action),
}

/// Held inputs over frame ranges.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Holds in insertion order
    holds: Vec<(Range<u64>, Hold)>,
}

/// Inputs held on one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    /// Horizontal axis
    pub axis: f32,
    /// Jump held
    pub jump: bool,
    /// Shoot held
    pub shoot: bool,
}

impl Script {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the horizontal axis at `axis` for `frames`.
    #[must_use]
    pub fn walk(mut self, frames: Range<u64>, axis: f32) -> Self {
        self.holds.push((frames, Hold::Axis(axis)));
        self
    }

    /// Hold jump for `frames`.
    #[must_use]
    pub fn hold_jump(mut self, frames: Range<u64>) -> Self {
        self.holds.push((frames, Hold::Button(Action::Jump)));
        self
    }

    /// Hold shoot for `frames`.
    #[must_use]
    pub fn hold_shoot(mut self, frames: Range<u64>) -> Self {
        self.holds.push((frames, Hold::Button(Action::Shoot)));
        self
    }

    /// Inputs held on `frame`. Later axis holds override earlier ones.
    #[must_use]
    pub fn sample(&self, frame: u64) -> Sample {
        let mut sample = Sample::default();
        for (range, hold) in &self.holds {
            if !range.contains(&frame) {
                continue;
            }
            match *hold {
                Hold::Axis(axis) => sample.axis = axis,
                Hold::Button(Action::Jump) => sample.jump = true,
                Hold::Button(Action::Shoot) => sample.shoot = true,
            }
        }
        sample
    }

    /// The demo script: run right, hop periodically, fire now and then.
    #[must_use]
    pub fn demo() -> Self {
        let mut script = Self::new().walk(0..u64::MAX, 1.0);
        for start in (40..2000).step_by(75) {
            script = script.hold_jump(start..start + 12);
        }
        for start in (20..2000).step_by(90) {
            script = script.hold_shoot(start..start + 2);
        }
        script
    }
}

/// Tally of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoSummary {
    /// Steps run
    pub frames: u64,
    /// Steps the world spent paused
    pub paused_frames: u64,
    /// Jumps started
    pub jumps: u32,
    /// Shots fired
    pub shots: u32,
    /// Pickups consumed
    pub pickups: u32,
    /// Enemies stomped
    pub stomps: u32,
    /// Side hits taken or dealt
    pub side_hits: u32,
    /// Cells bumped from below
    pub cell_hits: u32,
    /// Final power state
    pub power: PowerState,
    /// Player died
    pub died: bool,
    /// Player was removed
    pub removed: bool,
    /// Final player position
    pub position: Vec2,
}

impl DemoSummary {
    /// Folds one step into the tally.
    pub fn record(&mut self, report: &StepReport) {
        self.frames += 1;
        if report.paused {
            self.paused_frames += 1;
        }
        self.shots += report.shots.len() as u32;

        for event in &report.events {
            match event {
                ControllerEvent::PickupConsumed(_) => self.pickups += 1,
                ControllerEvent::CellHit(_) => self.cell_hits += 1,
                ControllerEvent::Dead(true) => self.died = true,
                _ => {},
            }
        }
        for (_, outcome) in &report.collisions {
            match outcome {
                CollisionOutcome::Stomped => self.stomps += 1,
                CollisionOutcome::SideHit => self.side_hits += 1,
                CollisionOutcome::Consumed | CollisionOutcome::Ignored => {},
            }
        }
        if report.player_removed {
            self.removed = true;
        }
    }
}

impl fmt::Display for DemoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames ({} paused), {} jumps, {} shots, {} pickups, {} stomps, {} side hits, \
             {} cell hits, power {:?}, died: {}, removed: {}, at ({:.1}, {:.1})",
            self.frames,
            self.paused_frames,
            self.jumps,
            self.shots,
            self.pickups,
            self.stomps,
            self.side_hits,
            self.cell_hits,
            self.power,
            self.died,
            self.removed,
            self.position.x,
            self.position.y,
        )
    }
}

/// Drives a level with a script.
pub struct Runner {
    /// The level
    level: Level<BlockWorld>,
    /// Input script
    script: Script,
    /// Button edge tracking
    input: InputManager,
    /// Tally so far
    summary: DemoSummary,
}

impl Runner {
    /// Wraps a level.
    #[must_use]
    pub fn new(level: Level<BlockWorld>, script: Script) -> Self {
        Self {
            level,
            script,
            input: InputManager::new(),
            summary: DemoSummary::default(),
        }
    }

    /// The level being driven.
    #[allow(dead_code)]
    #[must_use]
    pub fn level(&self) -> &Level<BlockWorld> {
        &self.level
    }

    /// Tally so far.
    #[must_use]
    pub fn summary(&self) -> &DemoSummary {
        &self.summary
    }

    /// Runs one step. Returns false once the player has been removed.
    pub fn step(&mut self, dt: f32) -> bool {
        let sample = self.script.sample(self.summary.frames);
        self.input.update_axis(sample.axis, 0.0);
        self.input.update_button(Action::Jump, sample.jump);
        self.input.update_button(Action::Shoot, sample.shoot);

        let was_jumping = self.level.player().is_jumping();
        let report = self.level.step(dt, &self.input.process());
        self.input.end_frame();

        if !was_jumping && self.level.player().is_jumping() {
            self.summary.jumps += 1;
        }

        for shot in &report.shots {
            debug!("Shot {:?} at {:?}", shot.direction, shot.position);
        }
        self.summary.record(&report);
        self.summary.power = self.level.player().power_state();
        self.summary.position = self.level.player().position();

        !report.player_removed
    }

    /// Runs up to `frames` steps of `dt`.
    #[allow(dead_code)]
    pub fn run_frames(&mut self, frames: u64, dt: f32) -> &DemoSummary {
        for _ in 0..frames {
            if !self.step(dt) {
                break;
            }
        }
        &self.summary
    }

    /// Consumes the runner.
    #[must_use]
    pub fn into_summary(self) -> DemoSummary {
        self.summary
    }
}

/// Builds the demo level: a floor with a gap, a bump block, a power-up and
/// two walkers.
pub fn build_level(config: &EngineConfig) -> Result<Level<BlockWorld>> {
    let mut world = BlockWorld::with_floor(0.0);
    world.set_camera(config.camera());
    world.add_gap(400.0, 440.0);
    world.add_cell(CellCoord::new(10, 3), CELL_SIZE);

    let player = PlayerController::new(config.controller.clone())?.at(SPAWN);
    let mut level = Level::new(world, player, config.state_change_frames);

    level.spawn(Box::new(Powerup::new(Vec2::new(240.0, 8.0))));
    level.spawn(Box::new(Walker::on_floor(
        620.0,
        0.0,
        20.0,
        Patrol::new(520.0, 700.0),
    )));
    level.spawn(Box::new(Walker::on_floor(
        1000.0,
        0.0,
        20.0,
        Patrol::new(900.0, 1100.0),
    )));

    Ok(level)
}

/// Runs the demo for the configured number of frames.
pub fn run(config: &EngineConfig) -> Result<DemoSummary> {
    let level = build_level(config)?;
    let mut runner = Runner::new(level, Script::demo());
    let mut clock = StepClock::new(config.target_fps, Pacing::from_flag(config.realtime));
    info!(
        "Running demo: {} frames at {} fps",
        config.frames,
        clock.rate()
    );

    clock.restart();
    'frames: while runner.summary().frames < config.frames {
        for _ in 0..clock.tick() {
            if !runner.step(clock.step()) {
                info!("Player removed, stopping");
                break 'frames;
            }
            if runner.summary().frames >= config.frames {
                break 'frames;
            }
        }
        clock.finish_tick();
    }

    Ok(runner.into_summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunar_gameplay::WorldQuery;

    #[test]
    fn test_script_sample() {
        let script = Script::new()
            .walk(0..10, 1.0)
            .walk(5..8, -0.5)
            .hold_jump(3..4)
            .hold_shoot(9..20);

        assert_eq!(
            script.sample(0),
            Sample {
                axis: 1.0,
                jump: false,
                shoot: false
            }
        );
        assert!(script.sample(3).jump);
        assert_eq!(script.sample(6).axis, -0.5);
        assert_eq!(script.sample(8).axis, 1.0);
        assert!(script.sample(9).shoot);
        assert_eq!(script.sample(15).axis, 0.0);
    }

    #[test]
    fn test_build_level() {
        let level = build_level(&EngineConfig::default()).expect("default level builds");
        assert_eq!(level.object_count(), 3);
        assert_eq!(level.player().position(), SPAWN);
        assert_eq!(
            level.world().camera_bounds(),
            EngineConfig::default().camera()
        );
    }

    #[test]
    fn test_summary_record() {
        let mut summary = DemoSummary::default();
        summary.record(&StepReport {
            frame: 1,
            paused: true,
            ..StepReport::default()
        });
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.paused_frames, 1);

        summary.record(&StepReport {
            frame: 2,
            events: vec![
                ControllerEvent::CellHit(CellCoord::new(1, 2)),
                ControllerEvent::Dead(true),
            ],
            player_removed: true,
            ..StepReport::default()
        });
        assert_eq!(summary.cell_hits, 1);
        assert!(summary.died);
        assert!(summary.removed);
    }
}
