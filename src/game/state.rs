//! # Game State Module
//!
//! Central game state and the turn loop.
//!
//! [`GameState`] owns the active floor, the floor counter, the message log
//! and the random number generator. A turn is one accepted player action,
//! followed by one action from every other live actor, followed by a
//! field-of-view refresh.

use crate::game::fov::update_fov;
use crate::game::{
    colour, Action, ActionError, ActionResult, Actor, ConcreteAction, Entity, EntityId, GameMap,
    LevelUpChoice, MessageLog, Position, Prototype, WorldContext,
};
use crate::generation::{GameWorld, GenerationConfig};
use crate::{TombsError, TombsResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Id of the player entity in every new game.
pub const PLAYER_ID: EntityId = EntityId(1);

/// Equipment the player starts with, worn from the first turn.
pub const STARTING_KIT: [Prototype; 2] = [Prototype::Dagger, Prototype::LeatherArmour];

/// How a submitted player action played out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action was impossible; no time passed
    Rejected,
    /// A normal turn passed
    Completed,
    /// A turn passed and the player is now on a new floor
    Descended,
    /// A turn passed and the player has a level-up to spend
    LevelUpPending,
    /// The player died during the turn
    PlayerDied,
}

/// Central game state containing all game data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The floor currently in play
    pub map: GameMap,
    /// Generation parameters and floor counter
    pub world: GameWorld,
    /// The player entity ID
    pub player_id: EntityId,
    /// In-game message log
    pub message_log: MessageLog,
    /// Number of completed turns
    pub turn_number: u64,
    /// Seed the game was started with
    pub rng_seed: u64,
    #[serde(skip, default = "unseeded_rng")]
    rng: StdRng,
}

fn unseeded_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

impl GameState {
    /// Starts a new game on floor 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::{GameState, GenerationConfig};
    ///
    /// let state = GameState::new_game(GenerationConfig::for_testing(12345)).unwrap();
    /// assert_eq!(state.turn_number, 0);
    /// assert_eq!(state.world.current_floor, 1);
    /// ```
    pub fn new_game(config: GenerationConfig) -> TombsResult<Self> {
        let seed = config.seed;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut player = Entity::from_template(PLAYER_ID, Prototype::Player.template(), Position::origin());
        let next_id = outfit(&mut player, PLAYER_ID.0 + 1)?;

        let mut world = GameWorld::new(config);
        let mut map = world.generate_floor(&player, next_id, &mut rng)?;
        let start = map
            .get(PLAYER_ID)
            .map(Entity::position)
            .ok_or_else(|| TombsError::InvalidState("Player was not placed".to_string()))?;
        update_fov(&mut map, start, world.config.fov_radius);

        let mut message_log = MessageLog::new();
        message_log.log_coloured("Hello and welcome, adventurer", colour::WELCOME_TEXT);
        info!("Started new game with seed {seed}");

        Ok(Self {
            map,
            world,
            player_id: PLAYER_ID,
            message_log,
            turn_number: 0,
            rng_seed: seed,
            rng,
        })
    }

    /// Borrows the pieces of the state actions work on.
    pub fn context(&mut self) -> WorldContext<'_> {
        WorldContext {
            map: &mut self.map,
            world: &mut self.world,
            log: &mut self.message_log,
            rng: &mut self.rng,
            player: self.player_id,
        }
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.map.get(self.player_id)
    }

    pub fn player_actor(&self) -> Option<&Actor> {
        self.player_entity().and_then(Entity::actor)
    }

    pub fn is_player_alive(&self) -> bool {
        self.player_entity().is_some_and(Entity::is_alive)
    }

    pub fn has_pending_level_up(&self) -> bool {
        self.player_actor()
            .is_some_and(|actor| actor.level.pending_upgrades > 0)
    }

    /// Resolves one player action and, if it happened, the rest of the turn.
    ///
    /// Impossible actions are logged and rejected without passing time.
    pub fn handle_player_action(&mut self, action: ConcreteAction) -> TombsResult<TurnOutcome> {
        if !self.is_player_alive() {
            self.message_log
                .log_coloured("You are dead.", colour::IMPOSSIBLE);
            return Ok(TurnOutcome::Rejected);
        }

        let floor_before = self.world.current_floor;
        match action.perform(&mut self.context()) {
            Ok(()) => {}
            Err(ActionError::Impossible(reason)) => {
                self.message_log.log_coloured(reason, colour::IMPOSSIBLE);
                return Ok(TurnOutcome::Rejected);
            }
            Err(ActionError::Fatal(error)) => return Err(error),
        }

        self.handle_enemy_turns()?;
        self.update_fov();
        self.turn_number += 1;

        let outcome = if !self.is_player_alive() {
            TurnOutcome::PlayerDied
        } else if self.has_pending_level_up() {
            TurnOutcome::LevelUpPending
        } else if self.world.current_floor != floor_before {
            TurnOutcome::Descended
        } else {
            TurnOutcome::Completed
        };
        debug!("Turn {} finished: {outcome:?}", self.turn_number);
        Ok(outcome)
    }

    /// Lets every live non-player actor act once, in spawn order.
    fn handle_enemy_turns(&mut self) -> TombsResult<()> {
        let player = self.player_id;
        for id in self.map.actor_ids() {
            if id == player {
                continue;
            }
            crate::game::ai::take_turn(&mut self.context(), id)?;
        }
        Ok(())
    }

    /// Recomputes the player's field of view.
    pub fn update_fov(&mut self) {
        if let Some(origin) = self.player_entity().map(Entity::position) {
            update_fov(&mut self.map, origin, self.world.config.fov_radius);
        }
    }

    /// Spends one pending level-up on `choice`.
    pub fn apply_level_up(&mut self, choice: LevelUpChoice) -> ActionResult {
        let actor = self
            .map
            .get_mut(self.player_id)
            .and_then(Entity::actor_mut)
            .ok_or_else(|| TombsError::InvalidState("No player on this floor".to_string()))?;
        if !actor.apply_level_up(choice) {
            return Err(ActionError::impossible("You have no level-up to spend."));
        }

        let message = match choice {
            LevelUpChoice::Constitution => "Your health improves!",
            LevelUpChoice::Strength => "You feel stronger!",
            LevelUpChoice::Agility => "Your movements are getting swifter!",
        };
        self.message_log.log(message);
        info!("Player spent a level-up on {choice:?}");
        Ok(())
    }

    /// Restores the parts of the state a snapshot does not carry.
    pub fn after_load(&mut self) {
        self.map.rebuild_index();
        self.rng = StdRng::seed_from_u64(self.rng_seed ^ self.turn_number);
    }
}

/// Puts the starting kit into the player's inventory and equips it.
///
/// Item ids are taken from `next_id` upwards; returns the first unused id.
fn outfit(player: &mut Entity, mut next_id: u32) -> TombsResult<u32> {
    let actor = player
        .actor_mut()
        .ok_or_else(|| TombsError::InvalidState("Player has no actor component".to_string()))?;
    for prototype in STARTING_KIT {
        let id = EntityId(next_id);
        next_id += 1;
        actor
            .inventory
            .items
            .push(Entity::from_template(id, prototype.template(), Position::origin()));
        if let Some(equippable) = actor.equippable(id) {
            actor.equipment.set(equippable.slot, Some(id));
        }
    }
    Ok(next_id)
}
