//! # User Interface Elements
//!
//! Health bar, floor label, message panel and popup widgets, plus the name
//! tooltip and the text of the menu screens.

use crate::game::actions::capitalize;
use crate::game::{colour, wrap, Actor, EquipmentSlot, GameMap, Message, MessageLog, Position};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Width of the filled part of a bar.
pub fn bar_fill(current: i32, maximum: i32, total_width: i32) -> i32 {
    if maximum <= 0 {
        return 0;
    }
    (current.clamp(0, maximum) as i64 * total_width as i64 / maximum as i64) as i32
}

/// An `HP: current/max` bar filled in proportion to the current value.
pub struct HealthBar {
    pub current: i32,
    pub maximum: i32,
}

impl Widget for HealthBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let bar = Rect { height: 1, ..area };
        buf.set_style(bar, Style::default().bg(Color::from(colour::BAR_EMPTY)));
        let filled = bar_fill(self.current, self.maximum, i32::from(bar.width));
        if filled > 0 {
            let width = u16::try_from(filled).unwrap_or(bar.width);
            buf.set_style(Rect { width, ..bar }, Style::default().bg(Color::from(colour::BAR_FILLED)));
        }
        buf.set_stringn(
            bar.x + 1,
            bar.y,
            format!("HP: {}/{}", self.current, self.maximum),
            usize::from(bar.width.saturating_sub(1)),
            Style::default().fg(Color::from(colour::BAR_TEXT)),
        );
    }
}

pub fn render_dungeon_level(buf: &mut Buffer, area: Rect, floor: u32) {
    if area.is_empty() {
        return;
    }
    buf.set_stringn(
        area.x,
        area.y,
        format!("Dungeon level: {floor}"),
        usize::from(area.width),
        Style::default().fg(Color::from(colour::WHITE)),
    );
}

/// Names of everything on a visible cell, comma separated, first letter capitalised.
pub fn names_at(map: &GameMap, position: Position) -> String {
    if !map.in_bounds(position) || !map.is_visible(position) {
        return String::new();
    }
    let names = map
        .entities_at(position)
        .map(|entity| entity.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    capitalize(&names)
}

/// The newest messages that fit, oldest at the top.
///
/// Long messages wrap; when space runs out the oldest lines are cut.
pub struct MessagePanel<'a> {
    messages: &'a [Message],
}

impl<'a> MessagePanel<'a> {
    pub fn new(log: &'a MessageLog) -> Self {
        Self::from_slice(log.messages())
    }

    pub fn from_slice(messages: &'a [Message]) -> Self {
        Self { messages }
    }
}

impl Widget for MessagePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let width = usize::from(area.width);
        let mut rows = (area.top()..area.bottom()).rev();
        for message in self.messages.iter().rev() {
            let style = Style::default().fg(Color::from(message.fg));
            for line in wrap(&message.full_text(), width).iter().rev() {
                let Some(y) = rows.next() else {
                    return;
                };
                buf.set_stringn(area.x, y, line, width, style);
            }
        }
    }
}

/// A titled box of text lines. Clears what lies underneath.
pub struct Popup<'a> {
    title: &'a str,
    lines: &'a [String],
}

impl<'a> Popup<'a> {
    pub fn new(title: &'a str, lines: &'a [String]) -> Self {
        Self { title, lines }
    }

    /// Outer size: the longest line or title plus borders and padding.
    pub fn size(&self) -> (u16, u16) {
        let longest = self
            .lines
            .iter()
            .map(|line| line.chars().count())
            .chain(std::iter::once(self.title.chars().count() + 2))
            .max()
            .unwrap_or(0);
        let width = u16::try_from(longest + 4).unwrap_or(u16::MAX);
        let height = u16::try_from(self.lines.len() + 2).unwrap_or(u16::MAX);
        (width, height)
    }
}

impl Widget for Popup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        let text: Vec<Line> = self.lines.iter().map(|line| Line::from(line.as_str())).collect();

        Clear.render(area, buf);
        block.render(area, buf);
        Paragraph::new(text)
            .style(Style::default().fg(Color::from(colour::WHITE)))
            .render(inner.inner(Margin::new(1, 0)), buf);
    }
}

/// One line per carried item, lettered from `a`; equipped items are marked.
pub fn inventory_lines(actor: &Actor) -> Vec<String> {
    actor
        .inventory
        .items
        .iter()
        .zip('a'..='z')
        .map(|(item, letter)| {
            if actor.equipment.is_equipped(item.id()) {
                format!("({letter}) {} (E)", item.name)
            } else {
                format!("({letter}) {}", item.name)
            }
        })
        .collect()
}

pub fn character_lines(actor: &Actor) -> Vec<String> {
    let slot_name = |slot: EquipmentSlot| {
        actor
            .equipped_in(slot)
            .map_or_else(|| "nothing".to_string(), |item| item.name.clone())
    };
    vec![
        format!("Level: {}", actor.level.current_level),
        format!("XP: {}", actor.level.current_xp),
        format!("XP for next Level: {}", actor.level.experience_to_next_level()),
        format!("Attack: {}", actor.power()),
        format!("Defense: {}", actor.defense()),
        format!("Weapon: {}", slot_name(EquipmentSlot::Weapon)),
        format!("Armour: {}", slot_name(EquipmentSlot::Armour)),
    ]
}

pub fn level_up_lines(actor: &Actor) -> Vec<String> {
    vec![
        "Congratulations! You level up!".to_string(),
        "Select an attribute to increase.".to_string(),
        format!("a) Constitution (+20 HP, from {})", actor.fighter.max_hp),
        format!("b) Strength (+1 attack, from {})", actor.power()),
        format!("c) Agility (+1 defense, from {})", actor.defense()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Entity, EntityId, Prototype, Tile};
    use crate::rendering::{buffer_text, row_text};

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar_fill(30, 30, 20), 20);
        assert_eq!(bar_fill(15, 30, 20), 10);
        assert_eq!(bar_fill(1, 30, 20), 0);
        assert_eq!(bar_fill(0, 30, 20), 0);
        assert_eq!(bar_fill(5, 0, 20), 0);
    }

    #[test]
    fn test_health_bar() {
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        HealthBar {
            current: 12,
            maximum: 30,
        }
        .render(area, &mut buf);
        assert_eq!(row_text(&buf, 0), " HP: 12/30");
        assert_eq!(buf.cell((0, 0)).map(|c| c.bg), Some(Color::from(colour::BAR_FILLED)));
        assert_eq!(buf.cell((7, 0)).map(|c| c.bg), Some(Color::from(colour::BAR_FILLED)));
        assert_eq!(buf.cell((8, 0)).map(|c| c.bg), Some(Color::from(colour::BAR_EMPTY)));
        assert_eq!(buf.cell((3, 0)).map(|c| c.fg), Some(Color::from(colour::BAR_TEXT)));
    }

    #[test]
    fn test_names_at_visible_cells_only() {
        let mut map = GameMap::new(5, 5, Tile::FLOOR);
        let cell = Position::new(2, 2);
        map.spawn(Prototype::Orc.template(), cell);
        map.spawn(Prototype::HealthPotion.template(), cell);
        assert_eq!(names_at(&map, cell), "");

        map.set_visible_cells(vec![cell]);
        assert_eq!(names_at(&map, cell), "Orc, health potion");
        assert_eq!(names_at(&map, Position::new(9, 9)), "");
    }

    #[test]
    fn test_messages_fill_from_bottom() {
        let mut log = MessageLog::new();
        log.log("one");
        log.log("two");
        log.log("two");
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        MessagePanel::new(&log).render(area, &mut buf);
        assert_eq!(buffer_text(&buf), "\none\ntwo (x2)");
    }

    #[test]
    fn test_long_messages_wrap_and_drop_oldest_lines() {
        let mut log = MessageLog::new();
        log.log("old news");
        log.log_coloured("the orc attacks you", colour::ENEMY_ATK);
        let area = Rect::new(0, 0, 8, 2);
        let mut buf = Buffer::empty(area);
        MessagePanel::new(&log).render(area, &mut buf);
        assert_eq!(buffer_text(&buf), "attacks\nyou");
        assert_eq!(buf.cell((0, 1)).map(|c| c.fg), Some(Color::from(colour::ENEMY_ATK)));
    }

    #[test]
    fn test_popup_box() {
        let lines = vec!["(a) Dagger".to_string()];
        let popup = Popup::new("Pick", &lines);
        assert_eq!(popup.size(), (14, 3));

        let area = Rect::new(0, 0, 14, 3);
        let mut buf = Buffer::empty(area);
        buf.set_string(0, 1, "xxxxxxxxxxxxxx", Style::default());
        popup.render(area, &mut buf);
        assert!(row_text(&buf, 0).contains(" Pick "));
        assert_eq!(row_text(&buf, 1), "│ (a) Dagger │");
    }

    #[test]
    fn test_inventory_lines_mark_equipment() {
        let mut player = Entity::from_template(EntityId(1), Prototype::Player.template(), Position::origin());
        let dagger = Entity::from_template(EntityId(2), Prototype::Dagger.template(), Position::origin());
        let potion = Entity::from_template(EntityId(3), Prototype::HealthPotion.template(), Position::origin());
        let actor = player.actor_mut().expect("player is an actor");
        actor.inventory.items.push(dagger);
        actor.inventory.items.push(potion);
        actor.equipment.set(EquipmentSlot::Weapon, Some(EntityId(2)));

        assert_eq!(
            inventory_lines(actor),
            vec!["(a) Dagger (E)".to_string(), "(b) Health Potion".to_string()]
        );
        assert!(character_lines(actor).contains(&"Weapon: Dagger".to_string()));
        assert!(character_lines(actor).contains(&"Attack: 7".to_string()));
    }
}
