//! # Game Map
//!
//! One floor of the dungeon: the tile grid, the `visible`/`explored` masks and
//! the arena of entities standing on it.
//!
//! Entities are keyed by [`EntityId`] in a `BTreeMap`, so iteration follows
//! spawn order. A position index answers per-cell queries; it is derived data,
//! skipped by serde and rebuilt after loading.

use crate::config;
use crate::game::{Entity, EntityId, EntityTemplate, Position, Tile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single dungeon floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    width: i32,
    height: i32,
    /// Row-major tiles, `y * width + x`
    tiles: Vec<Tile>,
    visible: Vec<bool>,
    explored: Vec<bool>,
    /// The floor's single descent cell
    pub downstairs: Position,
    entities: BTreeMap<EntityId, Entity>,
    next_id: u32,
    #[serde(skip)]
    position_index: HashMap<Position, Vec<EntityId>>,
}

impl GameMap {
    /// Creates a floor filled with `fill` and no entities.
    pub fn new(width: i32, height: i32, fill: Tile) -> Self {
        let width = width.clamp(1, config::MAX_MAP_DIMENSION);
        let height = height.clamp(1, config::MAX_MAP_DIMENSION);
        let cells = (width * height) as usize;
        Self {
            width,
            height,
            tiles: vec![fill; cells],
            visible: vec![false; cells],
            explored: vec![false; cells],
            downstairs: Position::origin(),
            entities: BTreeMap::new(),
            next_id: 1,
            position_index: HashMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `position` lies inside the grid.
    pub fn in_bounds(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.in_bounds(position)
            .then(|| (position.y * self.width + position.x) as usize)
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.index(position).map(|index| &self.tiles[index])
    }

    /// Replaces the tile at `position`. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, position: Position, tile: Tile) {
        if let Some(index) = self.index(position) {
            self.tiles[index] = tile;
        }
    }

    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(|tile| tile.walkable)
    }

    /// Out-of-bounds cells are opaque.
    pub fn is_transparent(&self, position: Position) -> bool {
        self.tile(position).is_some_and(|tile| tile.transparent)
    }

    pub fn is_visible(&self, position: Position) -> bool {
        self.index(position).is_some_and(|index| self.visible[index])
    }

    pub fn is_explored(&self, position: Position) -> bool {
        self.index(position).is_some_and(|index| self.explored[index])
    }

    /// Replaces the visible mask with `cells` and folds it into `explored`.
    ///
    /// Nothing is ever removed from `explored`.
    pub fn set_visible_cells(&mut self, cells: impl IntoIterator<Item = Position>) {
        self.visible.iter_mut().for_each(|cell| *cell = false);
        for position in cells {
            if let Some(index) = self.index(position) {
                self.visible[index] = true;
                self.explored[index] = true;
            }
        }
    }

    /// Number of cells currently marked explored.
    pub fn explored_count(&self) -> usize {
        self.explored.iter().filter(|&&cell| cell).count()
    }

    /// Every cell whose tile equals `tile`.
    pub fn cells_with_tile(&self, tile: Tile) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, candidate)| **candidate == tile)
            .map(|(index, _)| {
                let index = index as i32;
                Position::new(index % self.width, index / self.width)
            })
            .collect()
    }

    /// The id the next spawned entity will receive.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Makes sure ids handed out from now on are at least `next`.
    pub fn reserve_ids_from(&mut self, next: u32) {
        self.next_id = self.next_id.max(next);
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Constructs a fresh entity from `template` at `position`.
    pub fn spawn(&mut self, template: EntityTemplate, position: Position) -> EntityId {
        let id = self.allocate_id();
        self.insert(Entity::from_template(id, template, position));
        id
    }

    /// Takes ownership of an existing entity at its current position.
    pub fn insert(&mut self, entity: Entity) {
        let id = entity.id();
        self.reserve_ids_from(id.0 + 1);
        if let Some(previous) = self.entities.remove(&id) {
            self.index_remove(id, previous.position());
        }
        self.index_add(id, entity.position());
        self.entities.insert(id, entity);
    }

    /// Takes ownership of an existing entity and puts it at `position`.
    pub fn place(&mut self, mut entity: Entity, position: Position) {
        entity.set_position(position);
        self.insert(entity);
    }

    /// Removes an entity from this floor, handing it back to the caller.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.index_remove(id, entity.position());
        Some(entity)
    }

    /// Moves an entity on this floor, keeping the position index current.
    pub fn move_entity(&mut self, id: EntityId, to: Position) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let from = entity.position();
        entity.set_position(to);
        self.index_remove(id, from);
        self.index_add(id, to);
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// All entities in spawn order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities standing on `position`, in spawn order.
    pub fn entities_at(&self, position: Position) -> impl Iterator<Item = &Entity> {
        self.position_index
            .get(&position)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entities.get(id))
    }

    /// The first movement-blocking entity on `position`.
    pub fn blocking_entity_at(&self, position: Position) -> Option<&Entity> {
        self.entities_at(position).find(|entity| entity.blocks_movement)
    }

    /// The first live actor on `position`.
    pub fn actor_at(&self, position: Position) -> Option<&Entity> {
        self.entities_at(position).find(|entity| entity.is_alive())
    }

    /// Items lying on `position`.
    pub fn items_at(&self, position: Position) -> impl Iterator<Item = &Entity> {
        self.entities_at(position)
            .filter(|entity| entity.item().is_some())
    }

    /// Live actors in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|entity| entity.is_alive())
    }

    /// Ids of live actors in spawn order.
    pub fn actor_ids(&self) -> Vec<EntityId> {
        self.actors().map(Entity::id).collect()
    }

    /// Items lying anywhere on this floor.
    pub fn items(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|entity| entity.item().is_some())
    }

    /// Rebuilds the position index from the arena.
    pub fn rebuild_index(&mut self) {
        let mut index: HashMap<Position, Vec<EntityId>> = HashMap::new();
        for (id, entity) in &self.entities {
            index.entry(entity.position()).or_default().push(*id);
        }
        self.position_index = index;
    }

    fn index_add(&mut self, id: EntityId, position: Position) {
        let ids = self.position_index.entry(position).or_default();
        // Keep per-cell lists in spawn order
        let at = ids.partition_point(|existing| *existing < id);
        ids.insert(at, id);
    }

    fn index_remove(&mut self, id: EntityId, position: Position) {
        if let Some(ids) = self.position_index.get_mut(&position) {
            ids.retain(|existing| *existing != id);
            if ids.is_empty() {
                self.position_index.remove(&position);
            }
        }
    }
}

impl PartialEq for GameMap {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.tiles == other.tiles
            && self.visible == other.visible
            && self.explored == other.explored
            && self.downstairs == other.downstairs
            && self.entities == other.entities
            && self.next_id == other.next_id
    }
}
