//! Cell coordinates for level geometry.

use serde::{Deserialize, Serialize};

/// Coordinate of a level cell (tile) in cell space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    /// Column
    pub x: i32,
    /// Row (grows upward)
    pub y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space position of the cell's bottom-left corner.
    #[must_use]
    pub fn to_world(self, cell_size: f32) -> (f32, f32) {
        (self.x as f32 * cell_size, self.y as f32 * cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_world_negative() {
        assert_eq!(CellCoord::new(-1, -2).to_world(16.0), (-16.0, -32.0));
    }

    proptest! {
        #[test]
        fn test_neighbors_are_one_cell_apart(x in -10_000i32..10_000, y in -10_000i32..10_000) {
            let (wx, wy) = CellCoord::new(x, y).to_world(16.0);
            let (nx, ny) = CellCoord::new(x + 1, y + 1).to_world(16.0);
            prop_assert_eq!(nx - wx, 16.0);
            prop_assert_eq!(ny - wy, 16.0);
        }
    }
}
