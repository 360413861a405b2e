//! # Rendering Module
//!
//! Draws the whole screen from the game state and the active [`UiMode`] as
//! ratatui widgets. [`Renderer::draw`] fills a terminal frame;
//! [`Renderer::render`] fills a standalone [`Buffer`] sized to the map.
//!
//! Layout, top to bottom: the map, a blank row, the tooltip row, then the
//! status panel with the HP bar, floor label and the latest messages.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;

use crate::game::{colour, GameMap, GameState, Position};
use crate::input::{InventoryPurpose, UiMode};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Widget};

/// Rows below the map.
pub const PANEL_HEIGHT: u16 = 7;
/// Width of the HP bar.
pub const BAR_WIDTH: u16 = 20;

/// Draws complete screens.
pub struct Renderer {
    /// Cell whose contents are named in the tooltip row
    pub mouse_location: Option<Position>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_u16(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

/// A rectangle at an offset inside `area`, cut to fit it.
fn rect_within(area: Rect, x: u16, y: u16, width: u16, height: u16) -> Rect {
    Rect::new(area.x.saturating_add(x), area.y.saturating_add(y), width, height).intersection(area)
}

impl Renderer {
    /// Creates a new renderer instance.
    pub fn new() -> Self {
        Self {
            mouse_location: None,
        }
    }

    /// Screen size that shows all of `map` and the panel.
    pub fn screen_size(map: &GameMap) -> (u16, u16) {
        (to_u16(map.width()), to_u16(map.height()).saturating_add(PANEL_HEIGHT))
    }

    /// Renders one screen into a new buffer of [`Renderer::screen_size`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tombs::{buffer_text, GameState, GenerationConfig, Renderer, UiMode};
    ///
    /// let state = GameState::new_game(GenerationConfig::for_testing(1)).unwrap();
    /// let screen = Renderer::new().render(&state, UiMode::Main);
    /// assert!(buffer_text(&screen).contains("Dungeon level: 1"));
    /// ```
    pub fn render(&self, state: &GameState, mode: UiMode) -> Buffer {
        let (width, height) = Self::screen_size(&state.map);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        self.render_to(area, &mut buf, state, mode);
        buf
    }

    /// Renders one screen into a terminal frame.
    pub fn draw(&self, frame: &mut ratatui::Frame, state: &GameState, mode: UiMode) {
        let area = frame.area();
        self.render_to(area, frame.buffer_mut(), state, mode);
    }

    /// Renders one screen into `area` of `buf`. Anything outside `area` is cut.
    pub fn render_to(&self, area: Rect, buf: &mut Buffer, state: &GameState, mode: UiMode) {
        let map = &state.map;
        let map_height = to_u16(map.height());
        let map_area = rect_within(area, 0, 0, to_u16(map.width()), map_height);
        MapWidget::new(map).render(map_area, buf);

        let (current, maximum) = state
            .player_actor()
            .map_or((0, 0), |actor| (actor.fighter.hp(), actor.fighter.max_hp));
        let panel_top = map_height.saturating_add(1);
        HealthBar { current, maximum }.render(
            rect_within(area, 0, panel_top.saturating_add(1), BAR_WIDTH, 1),
            buf,
        );
        render_dungeon_level(
            buf,
            rect_within(area, 0, panel_top.saturating_add(3), BAR_WIDTH, 1),
            state.world.current_floor,
        );

        let side_width = area.width.saturating_sub(BAR_WIDTH + 1);
        MessagePanel::new(&state.message_log).render(
            rect_within(area, BAR_WIDTH + 1, panel_top.saturating_add(1), side_width, PANEL_HEIGHT - 2),
            buf,
        );

        let pointer = match mode {
            UiMode::Targeting { cursor, .. } => Some(cursor),
            _ => self.mouse_location,
        };
        let tooltip = rect_within(area, BAR_WIDTH + 1, panel_top, side_width, 1);
        if let Some(cell) = pointer.filter(|_| !tooltip.is_empty()) {
            buf.set_stringn(
                tooltip.x,
                tooltip.y,
                names_at(map, cell),
                usize::from(tooltip.width),
                Style::default().fg(Color::from(colour::WHITE)),
            );
        }

        self.render_overlay(area, map_area, buf, state, mode);
    }

    fn render_overlay(&self, area: Rect, map_area: Rect, buf: &mut Buffer, state: &GameState, mode: UiMode) {
        let actor = state.player_actor();
        match mode {
            UiMode::Main | UiMode::GameOver => {}
            UiMode::Inventory(purpose) => {
                let title = match purpose {
                    InventoryPurpose::Use => "Select an item to use",
                    InventoryPurpose::Drop => "Select an item to drop",
                };
                let mut lines = actor.map(inventory_lines).unwrap_or_default();
                if lines.is_empty() {
                    lines.push("(Empty)".to_string());
                }
                popup(area, buf, state, title, &lines);
            }
            UiMode::Targeting { request, cursor } => {
                if let Some(radius) = request.radius {
                    for y in cursor.y - radius..=cursor.y + radius {
                        for x in cursor.x - radius..=cursor.x + radius {
                            let cell = Position::new(x, y);
                            if cell.euclidean_distance(cursor) <= radius as f64 {
                                if let Some(screen) = map_cell_mut(buf, map_area, cell) {
                                    screen.set_bg(Color::from(colour::NEEDS_TARGET));
                                }
                            }
                        }
                    }
                }
                if let Some(screen) = map_cell_mut(buf, map_area, cursor) {
                    let (fg, bg) = (screen.fg, screen.bg);
                    screen.set_fg(bg).set_bg(fg);
                }
            }
            UiMode::History { cursor } => {
                let frame = rect_within(
                    area,
                    3,
                    3,
                    area.width.saturating_sub(6),
                    area.height.saturating_sub(6),
                );
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(" Message history ")
                    .title_alignment(Alignment::Center);
                let inner = block.inner(frame);
                Clear.render(frame, buf);
                block.render(frame, buf);
                let messages = state.message_log.messages();
                let shown = &messages[..(cursor + 1).min(messages.len())];
                MessagePanel::from_slice(shown).render(inner, buf);
            }
            UiMode::CharacterScreen => {
                let lines = actor.map(character_lines).unwrap_or_default();
                popup(area, buf, state, "Character Information", &lines);
            }
            UiMode::LevelUp => {
                let lines = actor.map(level_up_lines).unwrap_or_default();
                popup(area, buf, state, "Level Up", &lines);
            }
        }
    }
}

/// Draws a [`Popup`] on the side of the screen away from the player.
fn popup(area: Rect, buf: &mut Buffer, state: &GameState, title: &str, lines: &[String]) {
    let popup = Popup::new(title, lines);
    let (width, height) = popup.size();
    let player_x = state.player_entity().map_or(0, |player| player.position().x);
    let x = if player_x <= 30 {
        area.right().saturating_sub(width).max(area.x)
    } else {
        area.x
    };
    popup.render(Rect::new(x, area.y, width, height).intersection(area), buf);
}
