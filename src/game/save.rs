//! # Save Files
//!
//! A save is the whole [`GameState`] as JSON, gzip-compressed. There is one
//! slot per path and no partial saves.

use crate::game::GameState;
use crate::{TombsError, TombsResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{info, warn};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

/// Encodes the state as a compressed snapshot.
pub fn to_bytes(state: &GameState) -> TombsResult<Vec<u8>> {
    let json = serde_json::to_vec(state)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Decodes a snapshot produced by [`to_bytes`].
///
/// Anything that is not a valid snapshot is [`TombsError::CorruptSave`].
pub fn from_bytes(bytes: &[u8]) -> TombsResult<GameState> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|error| TombsError::CorruptSave(error.to_string()))?;

    let mut state: GameState =
        serde_json::from_slice(&json).map_err(|error| TombsError::CorruptSave(error.to_string()))?;
    state.after_load();
    Ok(state)
}

pub fn save_to_file(state: &GameState, path: impl AsRef<Path>) -> TombsResult<()> {
    let path = path.as_ref();
    let bytes = to_bytes(state)?;
    std::fs::write(path, &bytes)?;
    info!("Saved turn {} to {} ({} bytes)", state.turn_number, path.display(), bytes.len());
    Ok(())
}

/// Loads a save file. A missing file is [`TombsError::NoSave`].
pub fn load_from_file(path: impl AsRef<Path>) -> TombsResult<GameState> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => return Err(TombsError::NoSave),
        Err(error) => return Err(error.into()),
    };

    let state = from_bytes(&bytes).map_err(|error| {
        warn!("Could not load {}: {error}", path.display());
        error
    })?;
    info!("Loaded turn {} from {}", state.turn_number, path.display());
    Ok(state)
}

/// Removes a save file if there is one.
pub fn delete_save(path: impl AsRef<Path>) -> TombsResult<()> {
    match std::fs::remove_file(path.as_ref()) {
        Ok(()) => {
            info!("Deleted save {}", path.as_ref().display());
            Ok(())
        }
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error.into()),
    }
}
