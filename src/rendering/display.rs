//! # Display Management
//!
//! The map and entity layers as a ratatui widget, plus helpers for reading a
//! drawn [`Buffer`] back as text.

use crate::game::{Entity, GameMap, Graphic, Position, Rgb, SHROUD};
use ratatui::buffer::{Buffer, Cell};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

impl From<Rgb> for Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color::Rgb(r, g, b)
    }
}

/// Foreground and background of a graphic.
pub fn graphic_style(graphic: Graphic) -> Style {
    Style::default().fg(Color::from(graphic.fg)).bg(Color::from(graphic.bg))
}

/// Screen cell showing map cell `position` when the map is drawn into `area`.
pub fn screen_cell(area: Rect, position: Position) -> Option<(u16, u16)> {
    let x = u16::try_from(position.x).ok()?;
    let y = u16::try_from(position.y).ok()?;
    (x < area.width && y < area.height).then(|| (area.x + x, area.y + y))
}

/// The buffer cell showing map cell `position`, if it is inside `area`.
pub fn map_cell_mut(buf: &mut Buffer, area: Rect, position: Position) -> Option<&mut Cell> {
    screen_cell(area, position).and_then(|cell| buf.cell_mut(cell))
}

/// The graphic a map cell shows: lit when visible, dark when only explored.
pub fn cell_graphic(map: &GameMap, position: Position) -> Graphic {
    match map.tile(position) {
        Some(tile) if map.is_visible(position) => tile.light,
        Some(tile) if map.is_explored(position) => tile.dark,
        _ => SHROUD,
    }
}

/// Visible entities in draw order: corpses, then items, then actors.
pub fn entity_draw_list(map: &GameMap) -> Vec<(Position, char, Rgb)> {
    let mut visible: Vec<&Entity> = map
        .entities()
        .filter(|entity| map.is_visible(entity.position()))
        .collect();
    visible.sort_by_key(|entity| entity.render_order);
    visible
        .into_iter()
        .map(|entity| (entity.position(), entity.glyph, entity.colour))
        .collect()
}

/// Tiles and then entities, map cell (0,0) at the top-left of the area.
pub struct MapWidget<'a> {
    map: &'a GameMap,
}

impl<'a> MapWidget<'a> {
    pub fn new(map: &'a GameMap) -> Self {
        Self { map }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in 0..self.map.height() {
            for x in 0..self.map.width() {
                let position = Position::new(x, y);
                if let Some(cell) = map_cell_mut(buf, area, position) {
                    let graphic = cell_graphic(self.map, position);
                    cell.set_char(graphic.ch).set_style(graphic_style(graphic));
                }
            }
        }

        // Entities keep the tile's background
        for (position, glyph, fg) in entity_draw_list(self.map) {
            if let Some(cell) = map_cell_mut(buf, area, position) {
                cell.set_char(glyph).set_fg(Color::from(fg));
            }
        }
    }
}

/// One row of a buffer with trailing blanks removed.
pub fn row_text(buf: &Buffer, y: u16) -> String {
    let area = buf.area;
    let text: String = (area.left()..area.right())
        .filter_map(|x| buf.cell((x, y)))
        .map(Cell::symbol)
        .collect();
    text.trim_end().to_string()
}

/// A whole buffer as plain text, one line per row.
pub fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| row_text(buf, y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{colour, Prototype, Tile};

    fn lit_map() -> GameMap {
        let mut map = GameMap::new(6, 4, Tile::FLOOR);
        map.set_tile(Position::new(0, 0), Tile::WALL);
        map.set_visible_cells(vec![Position::new(0, 0), Position::new(1, 1), Position::new(2, 1)]);
        map
    }

    #[test]
    fn test_cell_graphic_by_visibility() {
        let mut map = lit_map();
        assert_eq!(cell_graphic(&map, Position::new(0, 0)), Tile::WALL.light);
        assert_eq!(cell_graphic(&map, Position::new(3, 3)), SHROUD);

        map.set_visible_cells(Vec::new());
        assert_eq!(cell_graphic(&map, Position::new(0, 0)), Tile::WALL.dark);
        assert_eq!(cell_graphic(&map, Position::new(-1, 0)), SHROUD);
    }

    #[test]
    fn test_entity_draw_order() {
        let mut map = lit_map();
        let orc = map.spawn(Prototype::Orc.template(), Position::new(1, 1));
        map.spawn(Prototype::HealthPotion.template(), Position::new(1, 1));
        map.spawn(Prototype::Troll.template(), Position::new(2, 1));
        map.spawn(Prototype::Troll.template(), Position::new(4, 3));
        map.get_mut(orc).and_then(|orc| orc.set_hp(0));

        let glyphs: Vec<char> = entity_draw_list(&map).into_iter().map(|(_, ch, _)| ch).collect();
        assert_eq!(glyphs, vec!['%', '!', 't']);
    }

    #[test]
    fn test_map_widget_draws_tiles_and_entities() {
        let mut map = lit_map();
        map.spawn(Prototype::Orc.template(), Position::new(2, 1));
        let area = Rect::new(0, 0, 6, 4);
        let mut buf = Buffer::empty(area);
        MapWidget::new(&map).render(area, &mut buf);

        assert_eq!(buffer_text(&buf), "#\n .o\n\n");
        let orc = buf.cell((2, 1)).expect("inside the buffer");
        assert_eq!(orc.fg, Color::from(Rgb(63, 127, 63)));
        assert_eq!(orc.bg, Color::from(Tile::FLOOR.light.bg));
    }

    #[test]
    fn test_map_widget_clips_to_area() {
        let map = lit_map();
        let area = Rect::new(2, 1, 3, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 4));
        MapWidget::new(&map).render(area, &mut buf);

        assert_eq!(screen_cell(area, Position::new(1, 1)), Some((3, 2)));
        assert_eq!(screen_cell(area, Position::new(3, 0)), None);
        assert_eq!(buf.cell((2, 1)).map(|cell| cell.fg), Some(Color::from(Tile::WALL.light.fg)));
        assert_eq!(buf.cell((5, 3)).map(|cell| cell.fg), Some(Color::Reset));
        assert_eq!(Color::from(colour::WHITE), Color::Rgb(255, 255, 255));
    }
}
