//! Integration tests for saving, loading and deleting games.

use tombs::game::save;
use tombs::{
    ConcreteAction, Direction, Entity, GameState, GenerationConfig, TombsError, TombsResult,
    PLAYER_ID,
};

/// Plays a handful of turns so the save has some history in it.
fn played_state(seed: u64) -> GameState {
    let mut state = GameState::new_game(GenerationConfig::for_testing(seed)).expect("new game");
    for direction in [Direction::East, Direction::West, Direction::North, Direction::South] {
        state
            .handle_player_action(ConcreteAction::bump(PLAYER_ID, direction))
            .expect("turn resolves");
    }
    state
        .handle_player_action(ConcreteAction::wait(PLAYER_ID))
        .expect("turn resolves");
    state
}

#[test]
fn test_save_and_continue() -> TombsResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("savegame.sav");
    let state = played_state(2024);

    save::save_to_file(&state, &path)?;
    let mut loaded = save::load_from_file(&path)?;

    assert_eq!(serde_json::to_value(&loaded)?, serde_json::to_value(&state)?);
    assert_eq!(loaded.turn_number, state.turn_number);
    assert_eq!(
        loaded.player_entity().map(Entity::position),
        state.player_entity().map(Entity::position)
    );
    for entity in state.map.entities() {
        let position = entity.position();
        assert!(loaded.map.entities_at(position).any(|e| e.id() == entity.id()));
    }

    let turns = loaded.turn_number;
    loaded.handle_player_action(ConcreteAction::wait(PLAYER_ID))?;
    assert_eq!(loaded.turn_number, turns + 1);
    Ok(())
}

#[test]
fn test_missing_save() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = save::load_from_file(dir.path().join("nothing.sav"));
    assert!(matches!(result, Err(TombsError::NoSave)));
}

#[test]
fn test_truncated_save_is_corrupt() -> TombsResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("savegame.sav");
    let bytes = save::to_bytes(&played_state(5))?;
    std::fs::write(&path, &bytes[..bytes.len() / 2])?;

    assert!(matches!(save::load_from_file(&path), Err(TombsError::CorruptSave(_))));
    Ok(())
}

#[test]
fn test_delete_save_is_idempotent() -> TombsResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("savegame.sav");
    save::save_to_file(&played_state(8), &path)?;
    assert!(path.exists());

    save::delete_save(&path)?;
    assert!(!path.exists());
    save::delete_save(&path)?;
    assert!(matches!(save::load_from_file(&path), Err(TombsError::NoSave)));
    Ok(())
}
