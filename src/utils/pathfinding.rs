//! # Pathfinding
//!
//! Cost-weighted 8-directional A* over a floor snapshot.
//!
//! Cardinal steps cost twice the entered cell's cost and diagonal steps three
//! times, so diagonals are always strictly more expensive. Cells holding a
//! blocking entity are discouraged rather than forbidden.

use crate::utils::math::octile_distance;
use crate::{GameMap, Position};
use ::pathfinding::prelude::astar;

/// Multiplier applied to a cell's cost when entered orthogonally.
pub const CARDINAL_STEP: u32 = 2;
/// Multiplier applied to a cell's cost when entered diagonally.
pub const DIAGONAL_STEP: u32 = 3;
/// Extra cost of a cell occupied by a blocking entity.
pub const BLOCKING_ENTITY_COST: u32 = 10;

/// Per-cell movement costs. Zero marks an impassable cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGrid {
    width: i32,
    height: i32,
    costs: Vec<u32>,
}

impl CostGrid {
    /// Creates a grid where every cell has the same cost.
    pub fn uniform(width: i32, height: i32, cost: u32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            costs: vec![cost; (width * height) as usize],
        }
    }

    /// Walkable cells cost 1; blocking entities add [`BLOCKING_ENTITY_COST`].
    pub fn from_map(map: &GameMap) -> Self {
        let mut grid = Self::uniform(map.width(), map.height(), 0);
        for y in 0..map.height() {
            for x in 0..map.width() {
                let position = Position::new(x, y);
                if map.is_walkable(position) {
                    grid.set(position, 1);
                }
            }
        }
        for entity in map.entities().filter(|entity| entity.blocks_movement) {
            let position = entity.position();
            let cost = grid.cost(position);
            if cost > 0 {
                grid.set(position, cost + BLOCKING_ENTITY_COST);
            }
        }
        grid
    }

    fn index(&self, position: Position) -> Option<usize> {
        ((0..self.width).contains(&position.x) && (0..self.height).contains(&position.y))
            .then(|| (position.y * self.width + position.x) as usize)
    }

    /// Cost of entering `position`; 0 when impassable or out of bounds.
    pub fn cost(&self, position: Position) -> u32 {
        self.index(position).map_or(0, |index| self.costs[index])
    }

    pub fn set(&mut self, position: Position, cost: u32) {
        if let Some(index) = self.index(position) {
            self.costs[index] = cost;
        }
    }

    fn successors(&self, from: Position) -> Vec<(Position, u32)> {
        from.neighbours()
            .into_iter()
            .filter_map(|to| {
                let cost = self.cost(to);
                if cost == 0 {
                    return None;
                }
                let diagonal = to.x != from.x && to.y != from.y;
                let step = if diagonal { DIAGONAL_STEP } else { CARDINAL_STEP };
                Some((to, cost * step))
            })
            .collect()
    }

    /// Cheapest path from `start` to `goal`, excluding `start`.
    ///
    /// Empty when `start == goal` or the goal cannot be reached.
    pub fn path(&self, start: Position, goal: Position) -> Vec<Position> {
        if start == goal || self.cost(goal) == 0 {
            return Vec::new();
        }

        astar(
            &start,
            |position| self.successors(*position),
            |position| octile_distance(*position, goal, CARDINAL_STEP, DIAGONAL_STEP),
            |position| *position == goal,
        )
        .map(|(mut path, _)| {
            path.remove(0);
            path
        })
        .unwrap_or_default()
    }
}
