//! # Tiles and Colours
//!
//! Immutable tile templates and the colour palette shared by the simulation and
//! the rendering collaborators.

use serde::{Deserialize, Serialize};

/// An RGB colour triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Named colours used by tiles, entities and log messages.
pub mod colour {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

    pub const PLAYER_ATK: Rgb = Rgb(0xE0, 0xE0, 0xE0);
    pub const ENEMY_ATK: Rgb = Rgb(0xFF, 0xC0, 0xC0);
    pub const NEEDS_TARGET: Rgb = Rgb(0x3F, 0xFF, 0xFF);
    pub const STATUS_EFFECT_APPLIED: Rgb = Rgb(0x3F, 0xFF, 0x3F);
    pub const DESCEND: Rgb = Rgb(0x9F, 0x3F, 0xFF);

    pub const PLAYER_DIE: Rgb = Rgb(0xFF, 0x30, 0x30);
    pub const ENEMY_DIE: Rgb = Rgb(0xFF, 0xA0, 0x30);
    pub const CORPSE: Rgb = Rgb(0xBF, 0x00, 0x00);

    pub const WELCOME_TEXT: Rgb = Rgb(0x20, 0xA0, 0xFF);
    pub const LEVEL_UP: Rgb = Rgb(0xFF, 0xFF, 0x00);

    pub const BAR_TEXT: Rgb = WHITE;
    pub const BAR_FILLED: Rgb = Rgb(0x00, 0x60, 0x00);
    pub const BAR_EMPTY: Rgb = Rgb(0x40, 0x10, 0x10);

    pub const INVALID: Rgb = Rgb(0xFF, 0xFF, 0x00);
    pub const IMPOSSIBLE: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const ERROR: Rgb = Rgb(0xFF, 0x40, 0x40);
    pub const HEALTH_RECOVERED: Rgb = Rgb(0x00, 0xFF, 0x00);
}

/// One drawable cell: a codepoint with foreground and background colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graphic {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Graphic {
    pub const fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self { ch, fg, bg }
    }
}

/// Drawn for cells that are neither visible nor explored.
pub const SHROUD: Graphic = Graphic::new(' ', colour::WHITE, colour::BLACK);

/// Static per-cell properties.
///
/// Tiles are plain values; the map stores one per cell and a new floor replaces
/// them wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Whether actors can stand on this tile
    pub walkable: bool,
    /// Whether this tile lets light through
    pub transparent: bool,
    /// Graphic used when the tile is explored but not in view
    pub dark: Graphic,
    /// Graphic used when the tile is in view
    pub light: Graphic,
}

impl Tile {
    pub const FLOOR: Tile = Tile {
        walkable: true,
        transparent: true,
        dark: Graphic::new('.', Rgb(100, 100, 100), Rgb(50, 50, 150)),
        light: Graphic::new('.', colour::WHITE, Rgb(200, 180, 50)),
    };

    pub const WALL: Tile = Tile {
        walkable: false,
        transparent: false,
        dark: Graphic::new('#', Rgb(100, 100, 100), Rgb(0, 0, 100)),
        light: Graphic::new('#', colour::WHITE, Rgb(130, 110, 50)),
    };

    pub const DOWN_STAIRS: Tile = Tile {
        walkable: true,
        transparent: true,
        dark: Graphic::new('>', Rgb(0, 0, 100), Rgb(50, 50, 150)),
        light: Graphic::new('>', colour::WHITE, Rgb(200, 180, 50)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_properties() {
        assert!(Tile::FLOOR.walkable && Tile::FLOOR.transparent);
        assert!(!Tile::WALL.walkable && !Tile::WALL.transparent);
        assert!(Tile::DOWN_STAIRS.walkable);
        assert_ne!(Tile::FLOOR, Tile::DOWN_STAIRS);
    }
}
