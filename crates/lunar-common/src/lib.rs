//! # Lunar Common
//!
//! Common types, utilities, and shared abstractions for Project Lunar.
//!
//! This crate provides foundational types used across all Lunar subsystems:
//! - Cell coordinates for level geometry
//! - Entity IDs
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coord_to_world() {
        assert_eq!(CellCoord::new(2, 1).to_world(16.0), (32.0, 16.0));
    }

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }
}
