//! # Game Module
//!
//! Core simulation: grid, entities, actions, AI, visibility and the turn loop.
//!
//! This module contains the fundamental building blocks of the dungeon crawler:
//! - Tile templates and the per-floor [`GameMap`]
//! - The entity arena and the actor/item component model
//! - The action system and consumable effects
//! - Monster AI and field-of-view computation
//! - The [`GameState`] turn loop and save snapshots

pub mod actions;
pub mod ai;
pub mod components;
pub mod consumables;
pub mod entities;
pub mod fov;
pub mod map;
pub mod messages;
pub mod prototypes;
pub mod save;
pub mod state;
pub mod tiles;

pub use actions::*;
pub use ai::*;
pub use components::*;
pub use consumables::*;
pub use entities::*;
pub use map::*;
pub use messages::*;
pub use prototypes::*;
pub use state::*;
pub use tiles::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid cell. `x` grows to the right and `y` grows downwards.
///
/// # Examples
///
/// ```
/// use tombs::{Direction, Position};
///
/// let cell = Position::new(10, 5);
/// assert_eq!(cell.step(Direction::Northeast), Position::new(11, 4));
/// assert_eq!(cell.neighbours().len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// The neighbouring cell in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        self + direction.delta()
    }

    /// King-move distance: the number of 8-directional steps between two cells.
    ///
    /// ```
    /// use tombs::Position;
    ///
    /// assert_eq!(Position::new(0, 0).chebyshev_distance(Position::new(3, -4)), 4);
    /// ```
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }

    /// Straight-line distance, used for spell ranges and blast radii.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// The eight surrounding cells in compass order, starting north.
    pub fn neighbours(self) -> Vec<Position> {
        Direction::ALL.iter().map(|&direction| self.step(direction)).collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// One of the eight compass directions a bump, move or attack can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    /// Every direction, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];

    /// Unit offset of one step in this direction.
    ///
    /// ```
    /// use tombs::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.delta(), Position::new(0, -1));
    /// assert_eq!(Direction::Southwest.delta(), Position::new(-1, 1));
    /// ```
    pub fn delta(self) -> Position {
        let (dx, dy) = match self {
            Direction::North => (0, -1),
            Direction::Northeast => (1, -1),
            Direction::East => (1, 0),
            Direction::Southeast => (1, 1),
            Direction::South => (0, 1),
            Direction::Southwest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::Northwest => (-1, -1),
        };
        Position::new(dx, dy)
    }

    /// The direction whose unit step is `delta`, if any.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        Direction::ALL.into_iter().find(|direction| direction.delta() == delta)
    }
}

/// Stable identifier for an entity.
///
/// Ids are handed out in increasing order by the owning [`GameMap`], so iterating
/// entities by id is iterating them in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
