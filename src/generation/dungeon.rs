//! # Dungeon Generation
//!
//! Room-and-corridor floor layouts.
//!
//! The generator:
//! 1. Samples up to `max_rooms` rectangles and rejects any that touch an
//!    accepted room
//! 2. Carves each accepted room and joins it to the previous one with an
//!    L-shaped tunnel
//! 3. Populates every accepted room from the floor's spawn tables
//! 4. Marks the last accepted room's centre as the single downstairs

use crate::game::{GameMap, Position, Tile};
use crate::generation::{randint, EncounterGenerator, ItemGenerator, RectangularRoom};
use crate::utils::bresenham_line;
use crate::{GenerationConfig, Generator, TombsError, TombsResult};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Output of the room-and-corridor generator.
#[derive(Debug, Clone)]
pub struct FloorPlan {
    /// Carved and populated floor, without the player
    pub map: GameMap,
    /// Accepted rooms in acceptance order
    pub rooms: Vec<RectangularRoom>,
    /// Centre of the first accepted room
    pub player_start: Position,
}

/// Primary dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone)]
pub struct RoomCorridorGenerator {
    /// Id given to the first spawned entity
    pub first_entity_id: u32,
}

impl RoomCorridorGenerator {
    /// Creates a generator whose spawned entities get ids from `first_entity_id` up.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::{GenerationConfig, Generator, RoomCorridorGenerator};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let config = GenerationConfig::for_testing(3);
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let plan = RoomCorridorGenerator::new(1).generate(&config, 1, &mut rng).unwrap();
    /// assert!(!plan.rooms.is_empty());
    /// ```
    pub fn new(first_entity_id: u32) -> Self {
        Self { first_entity_id }
    }

    /// Samples one candidate room, or `None` if it cannot fit on the map.
    fn sample_room(&self, config: &GenerationConfig, rng: &mut StdRng) -> Option<RectangularRoom> {
        let width = randint(rng, config.room_min_size, config.room_max_size);
        let height = randint(rng, config.room_min_size, config.room_max_size);
        let max_x = config.map_width - width - 1;
        let max_y = config.map_height - height - 1;
        if max_x < 0 || max_y < 0 {
            return None;
        }

        let x = randint(rng, 0, max_x);
        let y = randint(rng, 0, max_y);
        Some(RectangularRoom::new(x, y, width, height))
    }

    fn carve_room(&self, map: &mut GameMap, room: &RectangularRoom) {
        for cell in room.inner_cells() {
            map.set_tile(cell, Tile::FLOOR);
        }
    }

    /// Carves two Bresenham segments via a randomly chosen corner.
    fn carve_tunnel(&self, map: &mut GameMap, start: Position, end: Position, rng: &mut StdRng) {
        let corner = if rng.gen_bool(0.5) {
            Position::new(end.x, start.y)
        } else {
            Position::new(start.x, end.y)
        };

        for cell in tunnel_cells(start, corner, end) {
            map.set_tile(cell, Tile::FLOOR);
        }
    }

    /// Spawns the room's monsters then its items on random free interior cells.
    ///
    /// A sampled cell that is already occupied drops that spawn.
    fn populate_room(
        &self,
        map: &mut GameMap,
        room: &RectangularRoom,
        reserved: Position,
        config: &GenerationConfig,
        floor: u32,
        rng: &mut StdRng,
    ) -> TombsResult<()> {
        let mut spawns = EncounterGenerator.generate(config, floor, rng)?;
        spawns.extend(ItemGenerator.generate(config, floor, rng)?);

        for prototype in spawns {
            let cell = Position::new(
                randint(rng, room.x1 + 1, room.x2 - 1),
                randint(rng, room.y1 + 1, room.y2 - 1),
            );
            if cell == reserved || map.entities_at(cell).next().is_some() {
                debug!("Dropped {prototype:?} spawn at occupied {cell}");
                continue;
            }
            map.spawn(prototype.template(), cell);
        }
        Ok(())
    }
}

/// Cells of an L-shaped tunnel from `start` through `corner` to `end`.
pub fn tunnel_cells(start: Position, corner: Position, end: Position) -> Vec<Position> {
    let mut cells = bresenham_line(start, corner);
    cells.extend(bresenham_line(corner, end));
    cells
}

impl Generator<FloorPlan> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, floor: u32, rng: &mut StdRng) -> TombsResult<FloorPlan> {
        config.validate()?;

        let mut map = GameMap::new(config.map_width, config.map_height, Tile::WALL);
        map.reserve_ids_from(self.first_entity_id);
        let mut rooms: Vec<RectangularRoom> = Vec::new();

        for _ in 0..config.max_rooms {
            let Some(room) = self.sample_room(config, rng) else {
                continue;
            };
            if rooms.iter().any(|other| room.intersects(other)) {
                continue;
            }

            self.carve_room(&mut map, &room);
            if let Some(previous) = rooms.last() {
                self.carve_tunnel(&mut map, previous.center(), room.center(), rng);
            }

            let player_start = rooms.first().unwrap_or(&room).center();
            self.populate_room(&mut map, &room, player_start, config, floor, rng)?;
            rooms.push(room);
        }

        let (Some(first), Some(last)) = (rooms.first(), rooms.last()) else {
            return Err(TombsError::GenerationFailed(format!(
                "No room fit on a {}x{} map",
                config.map_width, config.map_height
            )));
        };

        map.downstairs = last.center();
        map.set_tile(map.downstairs, Tile::DOWN_STAIRS);

        Ok(FloorPlan {
            player_start: first.center(),
            map,
            rooms,
        })
    }

    fn validate(&self, plan: &FloorPlan, _config: &GenerationConfig) -> TombsResult<()> {
        let stairs = plan.map.cells_with_tile(Tile::DOWN_STAIRS);
        if stairs != [plan.map.downstairs] {
            return Err(TombsError::GenerationFailed(format!(
                "Expected exactly one downstairs at {}, found {}",
                plan.map.downstairs,
                stairs.len()
            )));
        }
        if !plan.map.is_walkable(plan.player_start) {
            return Err(TombsError::GenerationFailed(
                "Player start is not walkable".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}
