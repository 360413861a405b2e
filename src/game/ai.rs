//! # Monster AI
//!
//! Each live actor owns one [`Ai`] value. Once per turn the turn loop calls
//! [`take_turn`], which decides on at most one action and performs it.

use crate::game::{
    colour, Action, ActionError, ConcreteAction, Direction, Entity, EntityId, Position,
    WorldContext,
};
use crate::utils::CostGrid;
use crate::TombsResult;
use log::debug;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Behaviour driving an actor's turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ai {
    /// Controlled from outside the turn loop
    Player,
    /// Chases and attacks the player, following a cached path
    Hostile { path: Vec<Position> },
    /// Stumbles randomly, then restores `previous`
    Confused {
        previous: Box<Ai>,
        turns_remaining: u32,
    },
}

impl Ai {
    pub fn hostile() -> Self {
        Ai::Hostile { path: Vec::new() }
    }

    pub fn confused(previous: Ai, turns_remaining: u32) -> Self {
        Ai::Confused {
            previous: Box::new(previous),
            turns_remaining,
        }
    }
}

/// Lets `actor` act once. Impossible outcomes are swallowed.
pub fn take_turn(ctx: &mut WorldContext<'_>, actor: EntityId) -> TombsResult<()> {
    let Some(entity) = ctx.map.get(actor) else {
        return Ok(());
    };
    let Some(ai) = entity.actor().and_then(|component| component.ai.clone()) else {
        return Ok(());
    };

    let (next, action) = match ai {
        Ai::Player => return Ok(()),
        Ai::Hostile { path } => hostile(ctx, entity, path),
        Ai::Confused {
            previous,
            turns_remaining,
        } => confused(ctx, actor, *previous, turns_remaining),
    };

    if let Some(component) = ctx.map.get_mut(actor).and_then(Entity::actor_mut) {
        component.ai = Some(next);
    }

    match action.perform(ctx) {
        Ok(()) => Ok(()),
        Err(ActionError::Impossible(reason)) => {
            debug!("{actor} wasted its turn: {reason}");
            Ok(())
        }
        Err(ActionError::Fatal(error)) => Err(error),
    }
}

fn hostile(ctx: &WorldContext<'_>, entity: &Entity, mut path: Vec<Position>) -> (Ai, ConcreteAction) {
    let id = entity.id();
    let position = entity.position();
    let Some(target) = ctx.map.get(ctx.player).map(Entity::position) else {
        return (Ai::Hostile { path }, ConcreteAction::wait(id));
    };

    if ctx.map.is_visible(position) {
        if position.chebyshev_distance(target) <= 1 {
            let action = Direction::from_delta(target - position)
                .map_or(ConcreteAction::wait(id), |direction| {
                    ConcreteAction::melee(id, direction)
                });
            return (Ai::Hostile { path }, action);
        }
        path = CostGrid::from_map(ctx.map).path(position, target);
    }

    if path.is_empty() {
        return (Ai::Hostile { path }, ConcreteAction::wait(id));
    }

    let step = path.remove(0);
    match Direction::from_delta(step - position) {
        Some(direction) => (Ai::Hostile { path }, ConcreteAction::move_to(id, direction)),
        // Stale path after a failed move
        None => (Ai::hostile(), ConcreteAction::wait(id)),
    }
}

fn confused(
    ctx: &mut WorldContext<'_>,
    actor: EntityId,
    previous: Ai,
    turns_remaining: u32,
) -> (Ai, ConcreteAction) {
    if turns_remaining == 0 {
        let name = ctx.map.get(actor).map(|entity| entity.name.clone()).unwrap_or_default();
        ctx.log.log_coloured(
            format!("The {name} is no longer confused."),
            colour::STATUS_EFFECT_APPLIED,
        );
        return (previous, ConcreteAction::wait(actor));
    }

    let direction = Direction::ALL
        .choose(&mut *ctx.rng)
        .copied()
        .unwrap_or(Direction::North);
    (
        Ai::confused(previous, turns_remaining - 1),
        ConcreteAction::bump(actor, direction),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameMap, MessageLog, Prototype, Tile};
    use crate::generation::{GameWorld, GenerationConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        map: GameMap,
        world: GameWorld,
        log: MessageLog,
        rng: StdRng,
        player: EntityId,
    }

    impl Fixture {
        fn new(player_at: Position) -> Self {
            let mut map = GameMap::new(20, 10, Tile::WALL);
            for y in 1..9 {
                for x in 1..19 {
                    map.set_tile(Position::new(x, y), Tile::FLOOR);
                }
            }
            let player = map.spawn(Prototype::Player.template(), player_at);
            let cells: Vec<Position> = (0..20)
                .flat_map(|x| (0..10).map(move |y| Position::new(x, y)))
                .collect();
            map.set_visible_cells(cells);
            Self {
                map,
                world: GameWorld::new(GenerationConfig::for_testing(7)),
                log: MessageLog::new(),
                rng: StdRng::seed_from_u64(7),
                player,
            }
        }

        fn turn(&mut self, actor: EntityId) {
            let mut ctx = WorldContext {
                map: &mut self.map,
                world: &mut self.world,
                log: &mut self.log,
                rng: &mut self.rng,
                player: self.player,
            };
            take_turn(&mut ctx, actor).expect("AI turns never fail fatally here");
        }

        fn hp(&self, id: EntityId) -> i32 {
            self.map
                .get(id)
                .and_then(Entity::actor)
                .map_or(0, |actor| actor.fighter.hp())
        }
    }

    #[test]
    fn test_hostile_attacks_when_adjacent() {
        let mut fixture = Fixture::new(Position::new(5, 5));
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(6, 5));
        fixture.turn(orc);
        // Orc power 3 against player defense 2
        assert_eq!(fixture.hp(fixture.player), 29);
        assert_eq!(fixture.map.get(orc).map(Entity::position), Some(Position::new(6, 5)));
    }

    #[test]
    fn test_hostile_closes_distance() {
        let mut fixture = Fixture::new(Position::new(2, 5));
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(10, 5));
        fixture.turn(orc);
        let position = fixture.map.get(orc).map(Entity::position).expect("orc exists");
        assert_eq!(position.chebyshev_distance(Position::new(2, 5)), 7);

        let Some(Ai::Hostile { path }) = fixture.map.get(orc).and_then(Entity::actor).and_then(|a| a.ai.clone()) else {
            panic!("orc stays hostile");
        };
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn test_hostile_waits_without_sight_or_path() {
        let mut fixture = Fixture::new(Position::new(2, 5));
        fixture.map.set_visible_cells(Vec::new());
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(10, 5));
        fixture.turn(orc);
        assert_eq!(fixture.map.get(orc).map(Entity::position), Some(Position::new(10, 5)));
    }

    #[test]
    fn test_hostile_follows_stale_path_out_of_sight() {
        let mut fixture = Fixture::new(Position::new(2, 5));
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(10, 5));
        fixture.turn(orc);
        fixture.map.set_visible_cells(Vec::new());
        fixture.turn(orc);
        let position = fixture.map.get(orc).map(Entity::position).expect("orc exists");
        assert_eq!(position.chebyshev_distance(Position::new(2, 5)), 6);
    }

    #[test]
    fn test_confusion_wears_off() {
        let mut fixture = Fixture::new(Position::new(2, 2));
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(10, 5));
        if let Some(actor) = fixture.map.get_mut(orc).and_then(Entity::actor_mut) {
            actor.ai = Some(Ai::confused(Ai::hostile(), 2));
        }

        fixture.turn(orc);
        fixture.turn(orc);
        assert!(matches!(
            fixture.map.get(orc).and_then(Entity::actor).and_then(|a| a.ai.clone()),
            Some(Ai::Confused { turns_remaining: 0, .. })
        ));

        fixture.turn(orc);
        assert_eq!(
            fixture.map.get(orc).and_then(Entity::actor).and_then(|a| a.ai.clone()),
            Some(Ai::hostile())
        );
        assert_eq!(
            fixture.log.last().map(|m| m.plain_text.as_str()),
            Some("The Orc is no longer confused.")
        );
    }

    #[test]
    fn test_confused_actor_moves_at_most_one_cell() {
        let mut fixture = Fixture::new(Position::new(2, 2));
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(10, 5));
        if let Some(actor) = fixture.map.get_mut(orc).and_then(Entity::actor_mut) {
            actor.ai = Some(Ai::confused(Ai::hostile(), 5));
        }
        let before = Position::new(10, 5);
        fixture.turn(orc);
        let after = fixture.map.get(orc).map(Entity::position).expect("orc exists");
        assert!(before.chebyshev_distance(after) <= 1);
    }

    #[test]
    fn test_dead_actor_does_nothing() {
        let mut fixture = Fixture::new(Position::new(5, 5));
        let orc = fixture.map.spawn(Prototype::Orc.template(), Position::new(6, 5));
        fixture.map.get_mut(orc).and_then(|orc| orc.set_hp(0));
        fixture.turn(orc);
        assert_eq!(fixture.hp(fixture.player), 30);
    }
}
