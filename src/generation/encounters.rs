//! # Encounter Generation
//!
//! Floor-indexed monster spawn tables.

use crate::game::Prototype;
use crate::generation::{choose_weighted, max_value_for_floor, randint, weights_for_floor};
use crate::{GenerationConfig, Generator, TombsResult};
use rand::rngs::StdRng;

/// Most monsters a single room may hold, by minimum floor.
pub const MAX_MONSTERS_BY_FLOOR: &[(u32, u32)] = &[(1, 2), (4, 3), (6, 5)];

/// Monster weights, by minimum floor.
pub const ENEMY_CHANCES: &[(u32, &[(Prototype, u32)])] = &[
    (0, &[(Prototype::Orc, 80)]),
    (3, &[(Prototype::Troll, 15)]),
    (5, &[(Prototype::Troll, 30)]),
    (7, &[(Prototype::Troll, 60)]),
];

/// Picks the monsters for one room.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncounterGenerator;

impl Generator<Vec<Prototype>> for EncounterGenerator {
    fn generate(
        &self,
        _config: &GenerationConfig,
        floor: u32,
        rng: &mut StdRng,
    ) -> TombsResult<Vec<Prototype>> {
        let cap = max_value_for_floor(MAX_MONSTERS_BY_FLOOR, floor);
        let count = randint(rng, 0, cap as i32) as u32;
        Ok(choose_weighted(&weights_for_floor(ENEMY_CHANCES, floor), count, rng))
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_encounter_sizes_follow_floor_cap() {
        let config = GenerationConfig::for_testing(1);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let shallow = EncounterGenerator.generate(&config, 1, &mut rng).expect("encounter");
            assert!(shallow.len() <= 2);
            assert!(shallow.iter().all(|monster| *monster == Prototype::Orc));

            let deep = EncounterGenerator.generate(&config, 8, &mut rng).expect("encounter");
            assert!(deep.len() <= 5);
        }
    }

    #[test]
    fn test_trolls_appear_deeper_down() {
        let config = GenerationConfig::for_testing(2);
        let mut rng = StdRng::seed_from_u64(2);
        let trolls = (0..200)
            .flat_map(|_| EncounterGenerator.generate(&config, 7, &mut rng).unwrap_or_default())
            .filter(|monster| *monster == Prototype::Troll)
            .count();
        assert!(trolls > 0);
    }
}
