//! # Tombs of the Ancient Kings
//!
//! A turn-based dungeon crawler engine: procedural floors, bump-to-attack combat,
//! consumable scrolls and potions, equipment, experience levels and monsters that
//! hunt the player with cost-weighted pathfinding.
//!
//! ## Architecture Overview
//!
//! The simulation core is single-threaded and strictly turn-synchronous:
//!
//! - **Grid & Tiles**: static per-cell properties plus the `visible`/`explored` masks
//! - **Entity Model**: an id-keyed arena of entities with a spatial index; actors carry
//!   fighter, inventory, equipment, level and AI components
//! - **Action System**: every game action is a tagged variant with a `perform` step that
//!   either mutates the world or fails with a recoverable `Impossible` reason
//! - **AI**: hostile monsters chase the player along A* paths; confusion temporarily
//!   overrides an actor's behaviour
//! - **Generation System**: room-and-corridor floors populated from floor-indexed
//!   weighted spawn tables
//! - **Turn Loop**: one player action, then every live monster, then a FOV refresh
//!
//! Rendering, input decoding and save framing are thin collaborators living in
//! [`rendering`], [`input`] and [`game::save`].

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the Tombs engine.
///
/// These are the fatal or unexpected failures. Expected, user-facing failures of
/// individual actions are [`ActionError::Impossible`] instead.
#[derive(thiserror::Error, Debug)]
pub enum TombsError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// There is no saved game to load
    #[error("No saved game to load")]
    NoSave,

    /// A saved game exists but could not be decoded
    #[error("Failed to load save: {0}")]
    CorruptSave(String),
}

/// Result type used throughout the Tombs codebase.
pub type TombsResult<T> = Result<T, TombsError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 43;

    /// Maximum number of room placement attempts per floor
    pub const DEFAULT_MAX_ROOMS: u32 = 30;

    /// Smallest room edge, walls included
    pub const DEFAULT_ROOM_MIN_SIZE: i32 = 6;

    /// Largest room edge, walls included
    pub const DEFAULT_ROOM_MAX_SIZE: i32 = 10;

    /// Largest accepted map edge
    pub const MAX_MAP_DIMENSION: i32 = 1000;

    /// Player sight radius
    pub const FOV_RADIUS: i32 = 8;

    /// Player inventory capacity (one slot per letter)
    pub const PLAYER_INVENTORY_CAPACITY: usize = 26;

    /// Default save file name
    pub const SAVE_FILE_NAME: &str = "savegame.sav";
}
