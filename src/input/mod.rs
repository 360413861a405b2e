//! # Input Module
//!
//! Input handling for player interactions.
//!
//! The front end owns the current [`UiMode`] and feeds every [`Command`] to
//! [`InputHandler::dispatch`]. [`InputHandler::handle`] decodes the command
//! into an [`InputOutcome`]; `dispatch` then resolves that outcome against the
//! game state and picks the next mode.

pub mod commands;

pub use commands::*;

use crossterm::event::KeyCode;

use crate::game::{
    colour, get_action, ActionError, ConcreteAction, Direction, Entity, GameState, ItemActivation,
    LevelUpChoice, Position, TargetRequest, TurnOutcome,
};
use log::error;

/// Which screen is reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Normal play
    Main,
    /// Picking an inventory item by letter
    Inventory(InventoryPurpose),
    /// Choosing a target cell for an item
    Targeting {
        request: TargetRequest,
        cursor: Position,
    },
    /// Scrolling the message history
    History { cursor: usize },
    CharacterScreen,
    /// Choosing a stat to raise
    LevelUp,
    /// The player is dead
    GameOver,
}

impl UiMode {
    /// Mode to open a game in.
    pub fn initial(state: &GameState) -> Self {
        if state.is_player_alive() {
            UiMode::Main
        } else {
            UiMode::GameOver
        }
    }

    /// Mode to show after a resolved player turn.
    pub fn after_turn(self, outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::PlayerDied => UiMode::GameOver,
            TurnOutcome::LevelUpPending => UiMode::LevelUp,
            TurnOutcome::Rejected => match self {
                UiMode::Inventory(_) | UiMode::Targeting { .. } => UiMode::Main,
                other => other,
            },
            TurnOutcome::Completed | TurnOutcome::Descended => UiMode::Main,
        }
    }
}

/// What picking an inventory item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryPurpose {
    Use,
    Drop,
}

/// Result of handling one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Resolve this action as the player's turn
    Action(ConcreteAction),
    /// Switch to another screen
    SwitchMode(UiMode),
    /// Spend a pending level-up
    LevelUp(LevelUpChoice),
    /// Leave the game
    Quit,
    /// The command did nothing
    Nothing,
}

/// Player intents in normal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Step or attack in a direction
    Move(Direction),
    /// Wait/rest for one turn
    Wait,
    /// Pick up the item underfoot
    PickUp,
    /// Open the inventory to use an item
    ShowInventory,
    /// Open the inventory to drop an item
    DropItem,
    /// Take the stairs down
    Descend,
    /// Browse the message history
    History,
    /// Show the character screen
    CharacterScreen,
    /// Quit the game
    Quit,
}

/// Key decoding for every screen.
pub struct InputHandler {
    /// Whether Vi-style movement keys (hjklyubn) are active
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor step for page keys in the history screen.
const HISTORY_PAGE_STEP: isize = 10;

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossterm::event::KeyCode;
    /// use tombs::{Direction, InputHandler, PlayerInput};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(
    ///     input_handler.key_to_input(KeyCode::Char('k')),
    ///     Some(PlayerInput::Move(Direction::North))
    /// );
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Direction bound to a key, if any.
    pub fn movement(&self, key: KeyCode) -> Option<Direction> {
        let direction = match key {
            KeyCode::Up | KeyCode::Char('8') => Direction::North,
            KeyCode::Down | KeyCode::Char('2') => Direction::South,
            KeyCode::Left | KeyCode::Char('4') => Direction::West,
            KeyCode::Right | KeyCode::Char('6') => Direction::East,
            KeyCode::Home | KeyCode::Char('7') => Direction::Northwest,
            KeyCode::End | KeyCode::Char('1') => Direction::Southwest,
            KeyCode::PageUp | KeyCode::Char('9') => Direction::Northeast,
            KeyCode::PageDown | KeyCode::Char('3') => Direction::Southeast,
            KeyCode::Char(ch) if self.vi_keys_enabled => match ch {
                'k' => Direction::North,
                'j' => Direction::South,
                'h' => Direction::West,
                'l' => Direction::East,
                'y' => Direction::Northwest,
                'u' => Direction::Northeast,
                'b' => Direction::Southwest,
                'n' => Direction::Southeast,
                _ => return None,
            },
            _ => return None,
        };
        Some(direction)
    }

    /// Decodes a key pressed during normal play.
    pub fn key_to_input(&self, key: KeyCode) -> Option<PlayerInput> {
        if let Some(direction) = self.movement(key) {
            return Some(PlayerInput::Move(direction));
        }

        match key {
            KeyCode::Char('.') | KeyCode::Char('5') => Some(PlayerInput::Wait),
            KeyCode::Char('g') | KeyCode::Char(',') => Some(PlayerInput::PickUp),
            KeyCode::Char('i') => Some(PlayerInput::ShowInventory),
            KeyCode::Char('d') => Some(PlayerInput::DropItem),
            KeyCode::Char('>') => Some(PlayerInput::Descend),
            KeyCode::Char('v') => Some(PlayerInput::History),
            KeyCode::Char('c') => Some(PlayerInput::CharacterScreen),
            KeyCode::Char('q') | KeyCode::Esc => Some(PlayerInput::Quit),
            _ => None,
        }
    }

    /// Handles one command and applies the outcome to `state`.
    ///
    /// Returns the mode to show next, or `None` once the player quits.
    /// Fatal errors from a turn are logged to the message log and play goes
    /// on in the main mode.
    pub fn dispatch(&self, mode: UiMode, command: Command, state: &mut GameState) -> Option<UiMode> {
        let next = match self.handle(mode, command, state) {
            InputOutcome::Action(action) => match state.handle_player_action(action) {
                Ok(outcome) => mode.after_turn(outcome),
                Err(err) => {
                    error!("Turn failed: {err}");
                    state.message_log.log_coloured(err.to_string(), colour::ERROR);
                    UiMode::Main
                }
            },
            InputOutcome::SwitchMode(next) => next,
            InputOutcome::LevelUp(choice) => match state.apply_level_up(choice) {
                Ok(()) if state.has_pending_level_up() => mode,
                Ok(()) => UiMode::Main,
                Err(ActionError::Impossible(reason)) => {
                    state.message_log.log_coloured(reason, colour::IMPOSSIBLE);
                    UiMode::Main
                }
                Err(ActionError::Fatal(err)) => {
                    error!("Level-up failed: {err}");
                    state.message_log.log_coloured(err.to_string(), colour::ERROR);
                    mode
                }
            },
            InputOutcome::Quit => return None,
            InputOutcome::Nothing => mode,
        };
        Some(next)
    }

    /// Handles one command in `mode`.
    ///
    /// Needs the state mutably because some screens write to the message log.
    pub fn handle(&self, mode: UiMode, command: Command, state: &mut GameState) -> InputOutcome {
        let key = match command {
            Command::Key(key) => key,
            Command::Target(cell) => {
                return match mode {
                    UiMode::Targeting { request, .. } => InputOutcome::Action(request.to_action(cell)),
                    _ => InputOutcome::Nothing,
                };
            }
            Command::Hover(cell) => {
                return match mode {
                    UiMode::Targeting { request, cursor } if cell != cursor && state.map.in_bounds(cell) => {
                        InputOutcome::SwitchMode(UiMode::Targeting { request, cursor: cell })
                    }
                    _ => InputOutcome::Nothing,
                };
            }
        };

        match mode {
            UiMode::Main => self.handle_main(key, state),
            UiMode::Inventory(purpose) => self.handle_inventory(purpose, key, state),
            UiMode::Targeting { request, cursor } => self.handle_targeting(request, cursor, key, state),
            UiMode::History { cursor } => self.handle_history(cursor, key, state),
            UiMode::CharacterScreen => InputOutcome::SwitchMode(UiMode::Main),
            UiMode::LevelUp => handle_level_up(key, state),
            UiMode::GameOver => match key {
                KeyCode::Char('v') => history_from_end(state),
                KeyCode::Char('q') | KeyCode::Esc => InputOutcome::Quit,
                _ => InputOutcome::Nothing,
            },
        }
    }

    fn handle_main(&self, key: KeyCode, state: &GameState) -> InputOutcome {
        let player = state.player_id;
        match self.key_to_input(key) {
            Some(PlayerInput::Move(direction)) => InputOutcome::Action(ConcreteAction::bump(player, direction)),
            Some(PlayerInput::Wait) => InputOutcome::Action(ConcreteAction::wait(player)),
            Some(PlayerInput::PickUp) => InputOutcome::Action(ConcreteAction::pick_up(player)),
            Some(PlayerInput::Descend) => InputOutcome::Action(ConcreteAction::take_stairs(player)),
            Some(PlayerInput::ShowInventory) => {
                InputOutcome::SwitchMode(UiMode::Inventory(InventoryPurpose::Use))
            }
            Some(PlayerInput::DropItem) => {
                InputOutcome::SwitchMode(UiMode::Inventory(InventoryPurpose::Drop))
            }
            Some(PlayerInput::History) => history_from_end(state),
            Some(PlayerInput::CharacterScreen) => InputOutcome::SwitchMode(UiMode::CharacterScreen),
            Some(PlayerInput::Quit) => InputOutcome::Quit,
            None => InputOutcome::Nothing,
        }
    }

    fn handle_inventory(&self, purpose: InventoryPurpose, key: KeyCode, state: &mut GameState) -> InputOutcome {
        let letter = match key {
            KeyCode::Esc => return InputOutcome::SwitchMode(UiMode::Main),
            KeyCode::Char(ch @ 'a'..='z') => ch,
            _ => return InputOutcome::Nothing,
        };

        let index = (letter as u8 - b'a') as usize;
        let Some(player) = state.map.get(state.player_id) else {
            return InputOutcome::SwitchMode(UiMode::Main);
        };
        let Some(item) = player
            .actor()
            .and_then(|actor| actor.inventory.items.get(index))
            .map(Entity::id)
        else {
            state.message_log.log_coloured("Invalid entry.", colour::INVALID);
            return InputOutcome::Nothing;
        };

        match purpose {
            InventoryPurpose::Drop => InputOutcome::Action(ConcreteAction::drop_item(player.id(), item)),
            InventoryPurpose::Use => match get_action(player, item, &mut state.message_log) {
                Some(ItemActivation::Immediate(action)) => InputOutcome::Action(action),
                Some(ItemActivation::Target(request)) => InputOutcome::SwitchMode(UiMode::Targeting {
                    request,
                    cursor: player.position(),
                }),
                None => InputOutcome::SwitchMode(UiMode::Main),
            },
        }
    }

    fn handle_targeting(
        &self,
        request: TargetRequest,
        cursor: Position,
        key: KeyCode,
        state: &GameState,
    ) -> InputOutcome {
        if let Some(direction) = self.movement(key) {
            let moved = cursor + direction.delta();
            let cursor = Position::new(
                moved.x.clamp(0, state.map.width() - 1),
                moved.y.clamp(0, state.map.height() - 1),
            );
            return InputOutcome::SwitchMode(UiMode::Targeting { request, cursor });
        }

        match key {
            KeyCode::Enter | KeyCode::Char('.') => InputOutcome::Action(request.to_action(cursor)),
            KeyCode::Esc => InputOutcome::SwitchMode(UiMode::Main),
            _ => InputOutcome::Nothing,
        }
    }

    fn handle_history(&self, cursor: usize, key: KeyCode, state: &GameState) -> InputOutcome {
        let len = state.message_log.len();
        if len == 0 {
            return InputOutcome::SwitchMode(UiMode::Main);
        }
        let last = len - 1;

        let adjust = match key {
            KeyCode::Up | KeyCode::Char('k') => -1,
            KeyCode::Down | KeyCode::Char('j') => 1,
            KeyCode::PageUp => -HISTORY_PAGE_STEP,
            KeyCode::PageDown => HISTORY_PAGE_STEP,
            KeyCode::Home => return InputOutcome::SwitchMode(UiMode::History { cursor: 0 }),
            KeyCode::End => return InputOutcome::SwitchMode(UiMode::History { cursor: last }),
            _ => return InputOutcome::SwitchMode(UiMode::Main),
        };

        // Single steps past either end wrap around; pages stop at the ends.
        let cursor = if adjust < 0 && cursor == 0 {
            last
        } else if adjust > 0 && cursor == last {
            0
        } else {
            cursor.saturating_add_signed(adjust).min(last)
        };
        InputOutcome::SwitchMode(UiMode::History { cursor })
    }
}

fn history_from_end(state: &GameState) -> InputOutcome {
    InputOutcome::SwitchMode(UiMode::History {
        cursor: state.message_log.len().saturating_sub(1),
    })
}

fn handle_level_up(key: KeyCode, state: &mut GameState) -> InputOutcome {
    match key {
        KeyCode::Char('a') => InputOutcome::LevelUp(LevelUpChoice::Constitution),
        KeyCode::Char('b') => InputOutcome::LevelUp(LevelUpChoice::Strength),
        KeyCode::Char('c') => InputOutcome::LevelUp(LevelUpChoice::Agility),
        _ => {
            state.message_log.log_coloured("Invalid entry.", colour::INVALID);
            InputOutcome::Nothing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Prototype, PLAYER_ID};
    use crate::generation::GenerationConfig;

    fn state() -> GameState {
        GameState::new_game(GenerationConfig::for_testing(3)).expect("new game")
    }

    fn give(state: &mut GameState, prototype: Prototype) {
        let id = state.map.next_id();
        state.map.reserve_ids_from(id + 1);
        let item = Entity::from_template(crate::game::EntityId(id), prototype.template(), Position::origin());
        if let Some(actor) = state.map.get_mut(PLAYER_ID).and_then(Entity::actor_mut) {
            actor.inventory.items.push(item);
        }
    }

    fn key(ch: char) -> Command {
        Command::char(ch)
    }

    #[test]
    fn test_main_mode_keys() {
        let handler = InputHandler::new();
        let mut state = state();
        assert_eq!(
            handler.handle(UiMode::Main, key('l'), &mut state),
            InputOutcome::Action(ConcreteAction::bump(PLAYER_ID, Direction::East))
        );
        assert_eq!(
            handler.handle(UiMode::Main, key('5'), &mut state),
            InputOutcome::Action(ConcreteAction::wait(PLAYER_ID))
        );
        assert_eq!(
            handler.handle(UiMode::Main, key('>'), &mut state),
            InputOutcome::Action(ConcreteAction::take_stairs(PLAYER_ID))
        );
        assert_eq!(
            handler.handle(UiMode::Main, key('d'), &mut state),
            InputOutcome::SwitchMode(UiMode::Inventory(InventoryPurpose::Drop))
        );
        assert_eq!(handler.handle(UiMode::Main, key('q'), &mut state), InputOutcome::Quit);
        assert_eq!(handler.handle(UiMode::Main, key('z'), &mut state), InputOutcome::Nothing);
    }

    #[test]
    fn test_vi_keys_can_be_disabled() {
        let handler = InputHandler {
            vi_keys_enabled: false,
        };
        assert_eq!(handler.key_to_input(KeyCode::Char('h')), None);
        assert_eq!(handler.key_to_input(KeyCode::Left), Some(PlayerInput::Move(Direction::West)));
    }

    #[test]
    fn test_inventory_selection() {
        let handler = InputHandler::new();
        let mut state = state();
        give(&mut state, Prototype::HealthPotion);
        give(&mut state, Prototype::FireballScroll);
        let (dagger, potion) = state
            .player_actor()
            .map(|a| (a.inventory.items[0].id(), a.inventory.items[2].id()))
            .expect("starting kit and potion");
        let use_mode = UiMode::Inventory(InventoryPurpose::Use);

        assert_eq!(
            handler.handle(use_mode, key('a'), &mut state),
            InputOutcome::Action(ConcreteAction::equip(PLAYER_ID, dagger))
        );
        assert_eq!(
            handler.handle(use_mode, key('c'), &mut state),
            InputOutcome::Action(ConcreteAction::use_item(PLAYER_ID, potion, None))
        );
        assert_eq!(
            handler.handle(UiMode::Inventory(InventoryPurpose::Drop), key('c'), &mut state),
            InputOutcome::Action(ConcreteAction::drop_item(PLAYER_ID, potion))
        );

        let InputOutcome::SwitchMode(UiMode::Targeting { request, cursor }) =
            handler.handle(use_mode, key('d'), &mut state)
        else {
            panic!("fireball needs a target");
        };
        assert_eq!(request.radius, Some(3));
        assert_eq!(Some(cursor), state.player_entity().map(Entity::position));

        let before = state.message_log.len();
        assert_eq!(handler.handle(use_mode, key('e'), &mut state), InputOutcome::Nothing);
        assert_eq!(state.message_log.len(), before + 1);
        assert_eq!(
            handler.handle(use_mode, Command::Key(KeyCode::Esc), &mut state),
            InputOutcome::SwitchMode(UiMode::Main)
        );
    }

    #[test]
    fn test_targeting_cursor_and_confirm() {
        let handler = InputHandler::new();
        let mut state = state();
        let request = TargetRequest {
            user: PLAYER_ID,
            item: crate::game::EntityId(99),
            radius: None,
        };
        let mode = UiMode::Targeting {
            request,
            cursor: Position::new(0, 0),
        };

        assert_eq!(
            handler.handle(mode, key('y'), &mut state),
            InputOutcome::SwitchMode(mode)
        );
        assert_eq!(
            handler.handle(mode, key('n'), &mut state),
            InputOutcome::SwitchMode(UiMode::Targeting {
                request,
                cursor: Position::new(1, 1),
            })
        );
        assert_eq!(
            handler.handle(mode, Command::Key(KeyCode::Enter), &mut state),
            InputOutcome::Action(request.to_action(Position::new(0, 0)))
        );
        assert_eq!(
            handler.handle(mode, Command::Target(Position::new(6, 2)), &mut state),
            InputOutcome::Action(request.to_action(Position::new(6, 2)))
        );
        assert_eq!(
            handler.handle(UiMode::Main, Command::Target(Position::new(6, 2)), &mut state),
            InputOutcome::Nothing
        );
    }

    #[test]
    fn test_hover_moves_targeting_cursor() {
        let handler = InputHandler::new();
        let mut state = state();
        let request = TargetRequest {
            user: PLAYER_ID,
            item: crate::game::EntityId(99),
            radius: Some(3),
        };
        let mode = UiMode::Targeting {
            request,
            cursor: Position::new(1, 1),
        };

        assert_eq!(
            handler.handle(mode, Command::Hover(Position::new(4, 2)), &mut state),
            InputOutcome::SwitchMode(UiMode::Targeting {
                request,
                cursor: Position::new(4, 2),
            })
        );
        assert_eq!(
            handler.handle(mode, Command::Hover(Position::new(1, 1)), &mut state),
            InputOutcome::Nothing
        );
        assert_eq!(
            handler.handle(mode, Command::Hover(Position::new(500, 2)), &mut state),
            InputOutcome::Nothing
        );
        assert_eq!(
            handler.handle(UiMode::Main, Command::Hover(Position::new(4, 2)), &mut state),
            InputOutcome::Nothing
        );
    }

    #[test]
    fn test_history_cursor_wraps() {
        let handler = InputHandler::new();
        let mut state = state();
        state.message_log.log("second");
        state.message_log.log("third");
        let last = state.message_log.len() - 1;

        assert_eq!(
            handler.handle(UiMode::Main, key('v'), &mut state),
            InputOutcome::SwitchMode(UiMode::History { cursor: last })
        );
        assert_eq!(
            handler.handle(UiMode::History { cursor: last }, Command::Key(KeyCode::Down), &mut state),
            InputOutcome::SwitchMode(UiMode::History { cursor: 0 })
        );
        assert_eq!(
            handler.handle(UiMode::History { cursor: 0 }, Command::Key(KeyCode::Up), &mut state),
            InputOutcome::SwitchMode(UiMode::History { cursor: last })
        );
        assert_eq!(
            handler.handle(UiMode::History { cursor: 1 }, Command::Key(KeyCode::PageDown), &mut state),
            InputOutcome::SwitchMode(UiMode::History { cursor: last })
        );
        assert_eq!(
            handler.handle(UiMode::History { cursor: 1 }, Command::Key(KeyCode::Esc), &mut state),
            InputOutcome::SwitchMode(UiMode::Main)
        );
    }

    #[test]
    fn test_dispatch_applies_outcomes() {
        let handler = InputHandler::new();
        let mut state = state();
        assert_eq!(UiMode::initial(&state), UiMode::Main);

        assert_eq!(handler.dispatch(UiMode::Main, key('.'), &mut state), Some(UiMode::Main));
        assert_eq!(state.turn_number, 1);

        let inventory = UiMode::Inventory(InventoryPurpose::Use);
        assert_eq!(handler.dispatch(UiMode::Main, key('i'), &mut state), Some(inventory));
        assert_eq!(handler.dispatch(inventory, key('z'), &mut state), Some(inventory));
        assert_eq!(handler.dispatch(UiMode::Main, key('q'), &mut state), None);
    }

    #[test]
    fn test_dispatch_spends_level_ups() {
        let handler = InputHandler::new();
        let mut state = state();
        if let Some(actor) = state.map.get_mut(PLAYER_ID).and_then(Entity::actor_mut) {
            actor.level.pending_upgrades = 2;
        }

        assert_eq!(handler.dispatch(UiMode::LevelUp, key('a'), &mut state), Some(UiMode::LevelUp));
        assert_eq!(handler.dispatch(UiMode::LevelUp, key('c'), &mut state), Some(UiMode::Main));
        let actor = state.player_actor().expect("player");
        assert_eq!(actor.fighter.max_hp, 50);
        assert_eq!(actor.defense(), 4);

        assert_eq!(
            handler.dispatch(UiMode::LevelUp, key('b'), &mut state),
            Some(UiMode::Main)
        );
        assert_eq!(
            state.message_log.last().map(|m| m.fg),
            Some(colour::IMPOSSIBLE)
        );
    }

    #[test]
    fn test_rejected_turn_closes_menus() {
        assert_eq!(
            UiMode::Inventory(InventoryPurpose::Drop).after_turn(TurnOutcome::Rejected),
            UiMode::Main
        );
        assert_eq!(UiMode::Main.after_turn(TurnOutcome::Rejected), UiMode::Main);
        assert_eq!(UiMode::Main.after_turn(TurnOutcome::PlayerDied), UiMode::GameOver);
        assert_eq!(UiMode::Main.after_turn(TurnOutcome::LevelUpPending), UiMode::LevelUp);
    }

    #[test]
    fn test_level_up_and_game_over() {
        let handler = InputHandler::new();
        let mut state = state();
        assert_eq!(
            handler.handle(UiMode::LevelUp, key('b'), &mut state),
            InputOutcome::LevelUp(LevelUpChoice::Strength)
        );
        assert_eq!(handler.handle(UiMode::LevelUp, key('x'), &mut state), InputOutcome::Nothing);
        assert_eq!(
            state.message_log.last().map(|m| m.plain_text.as_str()),
            Some("Invalid entry.")
        );
        assert_eq!(handler.handle(UiMode::GameOver, key('l'), &mut state), InputOutcome::Nothing);
        assert_eq!(handler.handle(UiMode::GameOver, key('q'), &mut state), InputOutcome::Quit);
    }
}
