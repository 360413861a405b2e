//! # Generation Module
//!
//! Procedural content generation: floor layouts, monster encounters and item
//! drops.
//!
//! A [`GameWorld`] owns the generation parameters and the floor counter. Each
//! call to [`GameWorld::generate_floor`] produces a complete new [`GameMap`]
//! with the player already placed; the previous floor is simply dropped by
//! the caller.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::config;
use crate::game::{Entity, GameMap, Position, Prototype};
use crate::{TombsError, TombsResult};
use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Configuration for procedural generation.
///
/// Every field has a default, so a JSON config file only needs the fields it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub map_width: i32,
    /// Map height in tiles
    pub map_height: i32,
    /// Room placement attempts per floor
    pub max_rooms: u32,
    /// Smallest room edge, walls included
    pub room_min_size: i32,
    /// Largest room edge, walls included
    pub room_max_size: i32,
    /// Player sight radius
    pub fov_radius: i32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.map_width, 80);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: config::DEFAULT_MAP_WIDTH,
            map_height: config::DEFAULT_MAP_HEIGHT,
            max_rooms: config::DEFAULT_MAX_ROOMS,
            room_min_size: config::DEFAULT_ROOM_MIN_SIZE,
            room_max_size: config::DEFAULT_ROOM_MAX_SIZE,
            fov_radius: config::FOV_RADIUS,
        }
    }

    /// Creates a configuration for testing with smaller, simpler floors.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 40,
            map_height: 24,
            max_rooms: 12,
            room_min_size: 5,
            room_max_size: 8,
            fov_radius: config::FOV_RADIUS,
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> TombsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects parameters the generator cannot work with.
    pub fn validate(&self) -> TombsResult<()> {
        if self.room_min_size < 3 || self.room_max_size < self.room_min_size {
            return Err(TombsError::InvalidState(format!(
                "Room sizes must satisfy 3 <= min <= max, got {}..={}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.map_width > config::MAX_MAP_DIMENSION || self.map_height > config::MAX_MAP_DIMENSION {
            return Err(TombsError::InvalidState(format!(
                "A {}x{} map exceeds the {} cell limit per edge",
                self.map_width,
                self.map_height,
                config::MAX_MAP_DIMENSION
            )));
        }
        if self.map_width <= self.room_min_size || self.map_height <= self.room_min_size {
            return Err(TombsError::InvalidState(format!(
                "A {}x{} map cannot hold a room of size {}",
                self.map_width, self.map_height, self.room_min_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A rectangular room, walls included. Only exists during generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectangularRoom {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RectangularRoom {
    /// Creates a room from its top-left corner and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::{Position, RectangularRoom};
    ///
    /// let room = RectangularRoom::new(2, 3, 6, 4);
    /// assert_eq!(room.center(), Position::new(5, 5));
    /// assert!(room.inner_contains(Position::new(3, 4)));
    /// assert!(!room.inner_contains(Position::new(2, 4)));
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Interior column and row ranges, excluding the wall border.
    pub fn inner(&self) -> (Range<i32>, Range<i32>) {
        (self.x1 + 1..self.x2, self.y1 + 1..self.y2)
    }

    /// Every interior cell, row by row.
    pub fn inner_cells(&self) -> impl Iterator<Item = Position> {
        let (xs, ys) = self.inner();
        ys.flat_map(move |y| xs.clone().map(move |x| Position::new(x, y)))
    }

    pub fn inner_contains(&self, position: Position) -> bool {
        let (xs, ys) = self.inner();
        xs.contains(&position.x) && ys.contains(&position.y)
    }

    /// Bounding-box overlap, edges included, so touching rooms intersect.
    pub fn intersects(&self, other: &RectangularRoom) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content for floor number `floor`.
    fn generate(&self, config: &GenerationConfig, floor: u32, rng: &mut StdRng) -> TombsResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> TombsResult<()> {
        let _ = (content, config);
        Ok(())
    }

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Generation parameters plus the floor counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameWorld {
    pub config: GenerationConfig,
    /// Number of the floor currently in play; 0 before the first floor exists
    pub current_floor: u32,
}

impl GameWorld {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            current_floor: 0,
        }
    }

    /// Builds the next floor with a copy of `player` at its starting cell.
    ///
    /// Spawned entities receive ids starting at `next_id` (and above the
    /// player's), so ids stay unique across floors. The floor counter only
    /// advances when generation succeeds.
    pub fn generate_floor(
        &mut self,
        player: &Entity,
        next_id: u32,
        rng: &mut StdRng,
    ) -> TombsResult<GameMap> {
        let floor = self.current_floor + 1;
        let generator = RoomCorridorGenerator::new(next_id.max(player.id().0 + 1));
        let plan = generator.generate(&self.config, floor, rng)?;
        generator.validate(&plan, &self.config)?;

        let FloorPlan {
            mut map,
            rooms,
            player_start,
        } = plan;
        map.place(player.clone(), player_start);

        info!(
            "Generated floor {floor}: {} rooms, {} entities, downstairs at {}",
            rooms.len(),
            map.entity_count(),
            map.downstairs
        );
        self.current_floor = floor;
        Ok(map)
    }
}

/// Largest value in a floor-indexed breakpoint table that applies to `floor`.
pub fn max_value_for_floor(table: &[(u32, u32)], floor: u32) -> u32 {
    table
        .iter()
        .take_while(|(floor_min, _)| *floor_min <= floor)
        .last()
        .map_or(0, |(_, value)| *value)
}

/// Merged weights of every breakpoint at or below `floor`.
///
/// Later breakpoints replace the weight of a prototype already listed, in place.
pub fn weights_for_floor(
    table: &[(u32, &[(Prototype, u32)])],
    floor: u32,
) -> Vec<(Prototype, u32)> {
    let mut weights: Vec<(Prototype, u32)> = Vec::new();
    for (_, entries) in table.iter().take_while(|(floor_min, _)| *floor_min <= floor) {
        for &(prototype, weight) in entries.iter() {
            match weights.iter_mut().find(|(existing, _)| *existing == prototype) {
                Some(entry) => entry.1 = weight,
                None => weights.push((prototype, weight)),
            }
        }
    }
    weights
}

/// Picks `count` prototypes with replacement according to `weights`.
pub fn choose_weighted(weights: &[(Prototype, u32)], count: u32, rng: &mut StdRng) -> Vec<Prototype> {
    use rand::distributions::{Distribution, WeightedIndex};

    let Ok(distribution) = WeightedIndex::new(weights.iter().map(|(_, weight)| *weight)) else {
        return Vec::new();
    };
    (0..count)
        .map(|_| weights[distribution.sample(rng)].0)
        .collect()
}

/// Inclusive random integer.
pub(crate) fn randint(rng: &mut StdRng, low: i32, high: i32) -> i32 {
    if high <= low {
        low
    } else {
        rng.gen_range(low..=high)
    }
}
