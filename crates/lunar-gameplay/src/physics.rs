//! Kinematic body and the world query surface.
//!
//! The body owns position, velocity, facing and the grounded flag. Level
//! geometry is resolved by a [`WorldQuery`] implementation; the body only
//! applies the correction it gets back and turns grounded changes into
//! [`BodyEvents`] edges.

use std::collections::HashSet;

use lunar_common::{CellCoord, EntityId};
use serde::{Deserialize, Serialize};

use crate::input::Vec2;

/// Tolerance used for contact tests.
const CONTACT_EPSILON: f32 = 1e-3;

/// Axis-aligned bounding box (y-up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum X coordinate
    pub min_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl AABB {
    /// Creates a new AABB.
    #[must_use]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates an AABB from center and half-extents.
    #[must_use]
    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.min_x
    }

    /// Right edge.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.max_x
    }

    /// Bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.min_y
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.max_y
    }

    /// Returns the center of the AABB.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the AABB.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the AABB.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Checks if this AABB overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Returns the AABB translated by a vector.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::new(-8.0, 0.0, 8.0, 16.0)
    }
}

/// Horizontal facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left
    Left,
    /// Facing right (default)
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// The opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Unit vector in the facing direction.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        match self {
            Facing::Left => Vec2::LEFT,
            Facing::Right => Vec2::RIGHT,
        }
    }
}

/// Horizontal extents of the visible world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBounds {
    /// Left visible edge
    pub left: f32,
    /// Right visible edge
    pub right: f32,
}

impl CameraBounds {
    /// Creates camera bounds.
    #[must_use]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Bounds that never clamp.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(f32::MIN, f32::MAX)
    }
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A level cell touched by the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Cell coordinate
    pub coord: CellCoord,
    /// Whether the cell is already playing its bump reaction
    pub bumping: bool,
}

/// Result of resolving a footprint against level geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contacts {
    /// Correction to apply to the body position
    pub push_out: Vec2,
    /// Whether the footprint rests on ground after correction
    pub grounded: bool,
    /// Cell blocking horizontal movement
    pub obstacle: Option<CellRef>,
    /// Cell hit from below
    pub overhead: Option<CellRef>,
}

/// Level geometry as seen by the controller.
pub trait WorldQuery {
    /// Resolves a world-space footprint that moved with `velocity`.
    fn resolve(&mut self, footprint: AABB, velocity: Vec2) -> Contacts;

    /// Triggers the hit reaction of a cell (bumping a block from below).
    fn hit_cell(&mut self, cell: CellCoord, by: EntityId);

    /// Current camera-visible horizontal extents.
    fn camera_bounds(&self) -> CameraBounds;
}

/// Edges reported by the body for one frame.
///
/// Each kind appears at most once; `started_falling` and `stopped_falling`
/// are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyEvents {
    /// Ground contact was lost this frame
    pub started_falling: bool,
    /// Ground contact was regained this frame
    pub stopped_falling: bool,
    /// A cell blocked horizontal movement
    pub obstacle: Option<CellRef>,
    /// A cell was hit from below
    pub overhead: Option<CellRef>,
}

/// Horizontal walking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkParams {
    /// Maximum walk speed
    pub walk_speed: f32,
    /// Acceleration while input is held
    pub walk_acc: f32,
    /// Braking deceleration without input
    pub brake_acc: f32,
    /// Axis values at or below this magnitude count as no input
    pub deadzone: f32,
}

/// Position, velocity and ground state of a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Body origin in world space
    position: Vec2,
    /// Current velocity
    velocity: Vec2,
    /// Facing direction
    facing: Facing,
    /// Ground contact from the last resolve
    grounded: bool,
    /// When false, velocity and position are frozen
    movement_enabled: bool,
}

impl KinematicBody {
    /// Creates a body at rest, airborne until the first resolve says otherwise.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            grounded: false,
            movement_enabled: true,
        }
    }

    /// Body origin.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the body origin directly.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Overwrites the vertical velocity.
    pub fn set_velocity_y(&mut self, vy: f32) {
        self.velocity.y = vy;
    }

    /// Zeroes the horizontal velocity.
    pub fn stop_horizontal(&mut self) {
        self.velocity.x = 0.0;
    }

    /// Current facing.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Turns the body around.
    pub fn flip(&mut self) {
        self.facing = self.facing.flipped();
    }

    /// Ground contact from the last resolve.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Force the ground flag (spawning on a floor, or dropping collision).
    pub fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    /// Whether velocity/position updates run.
    #[must_use]
    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    /// Enable or disable movement processing.
    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    /// World-space footprint for a body-local rect.
    #[must_use]
    pub fn world_footprint(&self, local: AABB) -> AABB {
        local.translated(self.position)
    }

    /// Moves the body vertically so the footprint's bottom edge sits at `y`.
    pub fn set_bottom(&mut self, local: AABB, y: f32) {
        self.position.y = y - local.min_y;
    }

    /// Horizontal velocity update from the move axis.
    ///
    /// Without input the body brakes toward zero without crossing it. With
    /// input it accelerates along the axis, clamped to the walk speed. The
    /// body flips when input opposes its facing. Returns true on a flip.
    pub fn apply_walk(&mut self, move_x: f32, walk: &WalkParams, dt: f32) -> bool {
        let mut vx = self.velocity.x;

        if move_x.abs() <= walk.deadzone {
            let brake = walk.brake_acc * dt;
            vx = if vx > 0.0 {
                (vx - brake).max(0.0)
            } else {
                (vx + brake).min(0.0)
            };
        } else {
            vx += move_x * walk.walk_acc * dt;
        }
        self.velocity.x = vx.clamp(-walk.walk_speed, walk.walk_speed);

        let opposes = (move_x > walk.deadzone && self.facing == Facing::Left)
            || (move_x < -walk.deadzone && self.facing == Facing::Right);
        if opposes {
            self.flip();
        }
        opposes
    }

    /// Vertical velocity update: gravity while airborne, no sinking while grounded.
    pub fn apply_gravity(&mut self, gravity: f32, max_fall_speed: f32, dt: f32) {
        if self.grounded {
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        } else {
            self.velocity.y = (self.velocity.y - gravity * dt).max(-max_fall_speed);
        }
    }

    /// Integrates velocity into position.
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Keeps the footprint inside the camera's horizontal bounds.
    ///
    /// Returns true when a bound was hit; `vx` is zeroed in that case.
    pub fn clamp_to_camera(&mut self, local: AABB, camera: CameraBounds) -> bool {
        let bounds = self.world_footprint(local);
        if bounds.left() < camera.left {
            self.position.x += camera.left - bounds.left();
            self.velocity.x = 0.0;
            true
        } else if bounds.right() > camera.right {
            self.position.x -= bounds.right() - camera.right;
            self.velocity.x = 0.0;
            true
        } else {
            false
        }
    }

    /// Resolves the footprint against the world and reports edges.
    pub fn resolve<W: WorldQuery + ?Sized>(&mut self, local: AABB, world: &mut W) -> BodyEvents {
        let contacts = world.resolve(self.world_footprint(local), self.velocity);
        self.position += contacts.push_out;

        if contacts.overhead.is_some() && self.velocity.y > 0.0 {
            self.velocity.y = 0.0;
        }
        if contacts.grounded && self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }

        let was_grounded = self.grounded;
        self.grounded = contacts.grounded;

        BodyEvents {
            started_falling: was_grounded && !contacts.grounded,
            stopped_falling: !was_grounded && contacts.grounded,
            obstacle: contacts.obstacle,
            overhead: contacts.overhead,
        }
    }
}

/// Rectangle-based level geometry: a floor line with gaps, plus solid blocks.
///
/// Good enough for tests and the headless runner; real levels plug their own
/// tilemap in through [`WorldQuery`].
#[derive(Debug, Default)]
pub struct BlockWorld {
    /// Height of the floor, if any
    floor_y: Option<f32>,
    /// Horizontal ranges with no floor
    gaps: Vec<(f32, f32)>,
    /// Solid blocks
    blocks: Vec<(CellCoord, AABB)>,
    /// Blocks currently playing their bump reaction
    bumping: HashSet<CellCoord>,
    /// Camera extents
    camera: CameraBounds,
    /// Cell hits received, in order
    hits: Vec<(CellCoord, EntityId)>,
}

impl BlockWorld {
    /// An empty world with no floor and an unbounded camera.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A world with a floor at `y`.
    #[must_use]
    pub fn with_floor(y: f32) -> Self {
        Self {
            floor_y: Some(y),
            ..Self::default()
        }
    }

    /// Removes the floor between `from` and `to`.
    pub fn add_gap(&mut self, from: f32, to: f32) {
        self.gaps.push((from.min(to), from.max(to)));
    }

    /// Adds a solid block.
    pub fn add_block(&mut self, coord: CellCoord, bounds: AABB) {
        self.blocks.push((coord, bounds));
    }

    /// Adds a solid block filling the grid cell `coord` of a `cell_size` grid.
    pub fn add_cell(&mut self, coord: CellCoord, cell_size: f32) {
        let (x, y) = coord.to_world(cell_size);
        self.add_block(coord, AABB::new(x, y, x + cell_size, y + cell_size));
    }

    /// Marks a block as bumping (or not).
    pub fn set_bumping(&mut self, coord: CellCoord, bumping: bool) {
        if bumping {
            self.bumping.insert(coord);
        } else {
            self.bumping.remove(&coord);
        }
    }

    /// Sets the camera extents.
    pub fn set_camera(&mut self, camera: CameraBounds) {
        self.camera = camera;
    }

    /// Cell hits received so far.
    #[must_use]
    pub fn hits(&self) -> &[(CellCoord, EntityId)] {
        &self.hits
    }

    fn floor_under(&self, footprint: &AABB) -> Option<f32> {
        let floor = self.floor_y?;
        let center = footprint.center().x;
        let over_gap = self
            .gaps
            .iter()
            .any(|&(from, to)| center > from && center < to);
        (!over_gap).then_some(floor)
    }

    fn cell_ref(&self, coord: CellCoord) -> CellRef {
        CellRef {
            coord,
            bumping: self.bumping.contains(&coord),
        }
    }
}

impl WorldQuery for BlockWorld {
    fn resolve(&mut self, footprint: AABB, velocity: Vec2) -> Contacts {
        let mut contacts = Contacts::default();
        let mut rect = footprint;

        for &(coord, block) in &self.blocks {
            if !rect.overlaps(&block) {
                continue;
            }
            let dx = rect.max_x.min(block.max_x) - rect.min_x.max(block.min_x);
            let dy = rect.max_y.min(block.max_y) - rect.min_y.max(block.min_y);

            if dy < dx {
                if rect.center().y < block.center().y {
                    contacts.push_out.y -= dy;
                    rect = rect.translated(Vec2::new(0.0, -dy));
                    if velocity.y > 0.0 {
                        contacts.overhead = Some(self.cell_ref(coord));
                    }
                } else {
                    contacts.push_out.y += dy;
                    rect = rect.translated(Vec2::new(0.0, dy));
                }
            } else {
                let push = if rect.center().x < block.center().x { -dx } else { dx };
                contacts.push_out.x += push;
                rect = rect.translated(Vec2::new(push, 0.0));
                contacts.obstacle = Some(self.cell_ref(coord));
            }
        }

        if let Some(floor) = self.floor_under(&rect) {
            if rect.bottom() < floor {
                contacts.push_out.y += floor - rect.bottom();
                rect = rect.translated(Vec2::new(0.0, floor - rect.bottom()));
            }
        }

        let on_floor = self
            .floor_under(&rect)
            .is_some_and(|floor| (rect.bottom() - floor).abs() <= CONTACT_EPSILON);
        let on_block = self.blocks.iter().any(|(_, block)| {
            (rect.bottom() - block.top()).abs() <= CONTACT_EPSILON
                && rect.min_x < block.max_x
                && rect.max_x > block.min_x
        });
        contacts.grounded = on_floor || on_block;
        contacts
    }

    fn hit_cell(&mut self, cell: CellCoord, by: EntityId) {
        self.hits.push((cell, by));
        self.bumping.insert(cell);
    }

    fn camera_bounds(&self) -> CameraBounds {
        self.camera
    }
}
