//! # Item Generation
//!
//! Floor-indexed item spawn tables.

use crate::game::Prototype;
use crate::generation::{choose_weighted, max_value_for_floor, randint, weights_for_floor};
use crate::{GenerationConfig, Generator, TombsResult};
use rand::rngs::StdRng;

/// Most items a single room may hold, by minimum floor.
pub const MAX_ITEMS_BY_FLOOR: &[(u32, u32)] = &[(1, 1), (4, 2)];

/// Item weights, by minimum floor.
pub const ITEM_CHANCES: &[(u32, &[(Prototype, u32)])] = &[
    (0, &[(Prototype::HealthPotion, 35)]),
    (2, &[(Prototype::ConfusionScroll, 10)]),
    (4, &[(Prototype::LightningScroll, 25), (Prototype::Sword, 5)]),
    (6, &[(Prototype::FireballScroll, 25), (Prototype::ChainMail, 15)]),
];

/// Picks the items for one room.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemGenerator;

impl Generator<Vec<Prototype>> for ItemGenerator {
    fn generate(
        &self,
        _config: &GenerationConfig,
        floor: u32,
        rng: &mut StdRng,
    ) -> TombsResult<Vec<Prototype>> {
        let cap = max_value_for_floor(MAX_ITEMS_BY_FLOOR, floor);
        let count = randint(rng, 0, cap as i32) as u32;
        Ok(choose_weighted(&weights_for_floor(ITEM_CHANCES, floor), count, rng))
    }

    fn generator_type(&self) -> &'static str {
        "ItemGenerator"
    }
}
