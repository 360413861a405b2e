//! # Utilities Module
//!
//! Grid geometry: Bresenham lines, step distances and the cost-weighted A*
//! search monsters use to chase the player.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
