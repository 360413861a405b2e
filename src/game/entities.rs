//! # Entity Model
//!
//! Entities are positioned, renderable things. Actors additionally carry the
//! component bundle from [`crate::game::components`]; items carry exactly one
//! capability, either consumable or equippable.
//!
//! An entity is owned by exactly one container at a time: a [`crate::GameMap`]
//! arena or an actor's [`Inventory`]. Moving between containers is always an
//! explicit take-then-insert.

use crate::game::{
    colour, Ai, Consumable, EntityId, Equipment, EquipmentSlot, Equippable, Fighter, Inventory,
    Level, LevelUpChoice, Position, Rgb,
};
use serde::{Deserialize, Serialize};

/// Draw order, also used to find the topmost entity on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

/// A positioned, renderable thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    position: Position,
    /// Glyph drawn for this entity
    pub glyph: char,
    /// Foreground colour of the glyph
    pub colour: Rgb,
    /// Display name
    pub name: String,
    /// Whether this entity prevents others from entering its cell
    pub blocks_movement: bool,
    /// Draw ordering
    pub render_order: RenderOrder,
    /// Actor or item capabilities
    pub kind: EntityKind,
}

/// What an entity is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Actor(Actor),
    Item(Item),
}

/// A living or dead character.
///
/// An actor is alive exactly while its `ai` slot is occupied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub fighter: Fighter,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub level: Level,
    pub ai: Option<Ai>,
}

/// Something that can be picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub usage: ItemUsage,
}

/// The single capability an item provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemUsage {
    Consumable(Consumable),
    Equippable(Equippable),
}

/// Immutable prototype data an entity is constructed from.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTemplate {
    pub glyph: char,
    pub colour: Rgb,
    pub name: &'static str,
    pub kind: EntityKind,
}

/// What was lost when an actor died.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Death {
    /// The actor's name before it became a corpse
    pub name: String,
    /// Experience owed to the killer
    pub xp_given: u32,
}

impl Entity {
    /// Builds an entity from a template. Blocking and draw order follow the kind.
    pub fn from_template(id: EntityId, template: EntityTemplate, position: Position) -> Self {
        let (blocks_movement, render_order) = match template.kind {
            EntityKind::Actor(_) => (true, RenderOrder::Actor),
            EntityKind::Item(_) => (false, RenderOrder::Item),
        };
        Self {
            id,
            position,
            glyph: template.glyph,
            colour: template.colour,
            name: template.name.to_string(),
            blocks_movement,
            render_order,
            kind: template.kind,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Moves the entity without touching any container index.
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn actor(&self) -> Option<&Actor> {
        match &self.kind {
            EntityKind::Actor(actor) => Some(actor),
            EntityKind::Item(_) => None,
        }
    }

    pub fn actor_mut(&mut self) -> Option<&mut Actor> {
        match &mut self.kind {
            EntityKind::Actor(actor) => Some(actor),
            EntityKind::Item(_) => None,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match &self.kind {
            EntityKind::Item(item) => Some(item),
            EntityKind::Actor(_) => None,
        }
    }

    /// Whether this is an actor that has not died.
    pub fn is_alive(&self) -> bool {
        self.actor().is_some_and(Actor::is_alive)
    }

    /// Distance from this entity to a cell.
    pub fn distance(&self, position: Position) -> f64 {
        self.position.euclidean_distance(position)
    }

    /// Writes the actor's hit points, clamped to `[0, max_hp]`.
    ///
    /// If the write lands on zero while the actor is still alive, the actor dies
    /// and the returned [`Death`] says what the killer is owed. Later writes of
    /// zero return `None` because the AI slot is already empty.
    pub fn set_hp(&mut self, value: i32) -> Option<Death> {
        let actor = self.actor_mut()?;
        let hp = actor.fighter.store_hp(value);
        if hp == 0 && actor.ai.is_some() {
            Some(self.die())
        } else {
            None
        }
    }

    /// Subtracts hit points. See [`Entity::set_hp`].
    pub fn take_damage(&mut self, amount: i32) -> Option<Death> {
        let hp = self.actor()?.fighter.hp();
        self.set_hp(hp - amount)
    }

    /// Restores up to `amount` hit points and returns how many were recovered.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let Some(actor) = self.actor_mut() else {
            return 0;
        };
        let recovered = actor.fighter.recoverable(amount);
        if recovered > 0 {
            let hp = actor.fighter.hp();
            actor.fighter.store_hp(hp + recovered);
        }
        recovered
    }

    /// Turns a live actor into an inert corpse.
    fn die(&mut self) -> Death {
        let xp_given = self.actor().map_or(0, |actor| actor.level.xp_given);
        let death = Death {
            name: self.name.clone(),
            xp_given,
        };

        self.glyph = '%';
        self.colour = colour::CORPSE;
        self.blocks_movement = false;
        self.name = format!("remains of {}", self.name);
        self.render_order = RenderOrder::Corpse;
        if let Some(actor) = self.actor_mut() {
            actor.ai = None;
        }

        death
    }
}

impl Actor {
    /// Creates a live actor with empty equipment.
    pub fn new(fighter: Fighter, inventory: Inventory, level: Level, ai: Ai) -> Self {
        Self {
            fighter,
            inventory,
            equipment: Equipment::default(),
            level,
            ai: Some(ai),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.ai.is_some()
    }

    /// Power including equipment bonuses.
    pub fn power(&self) -> i32 {
        self.fighter.base_power + self.equipment_bonus(|bonus| bonus.power_bonus)
    }

    /// Defense including equipment bonuses.
    pub fn defense(&self) -> i32 {
        self.fighter.base_defense + self.equipment_bonus(|bonus| bonus.defense_bonus)
    }

    fn equipment_bonus(&self, pick: impl Fn(&Equippable) -> i32) -> i32 {
        self.equipment
            .equipped()
            .filter_map(|id| self.equippable(id))
            .map(|bonus| pick(&bonus))
            .sum()
    }

    /// The equippable capability of a carried item.
    pub fn equippable(&self, item: EntityId) -> Option<Equippable> {
        match self.inventory.get(item)?.item()?.usage {
            ItemUsage::Equippable(equippable) => Some(equippable),
            ItemUsage::Consumable(_) => None,
        }
    }

    /// The item worn in `slot`.
    pub fn equipped_in(&self, slot: EquipmentSlot) -> Option<&Entity> {
        self.inventory.get(self.equipment.item_in(slot)?)
    }

    /// Spends one pending level-up. Returns false when none is pending.
    pub fn apply_level_up(&mut self, choice: LevelUpChoice) -> bool {
        if self.level.pending_upgrades == 0 {
            return false;
        }
        self.level.pending_upgrades -= 1;

        match choice {
            LevelUpChoice::Constitution => {
                self.fighter.max_hp += 20;
                let hp = self.fighter.hp();
                self.fighter.store_hp(hp + 20);
            }
            LevelUpChoice::Strength => self.fighter.base_power += 1,
            LevelUpChoice::Agility => self.fighter.base_defense += 1,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Prototype;

    fn orc_at(position: Position) -> Entity {
        Entity::from_template(EntityId(1), Prototype::Orc.template(), position)
    }

    #[test]
    fn test_actor_from_template_blocks() {
        let orc = orc_at(Position::new(2, 3));
        assert!(orc.blocks_movement);
        assert_eq!(orc.render_order, RenderOrder::Actor);
        assert!(orc.is_alive());
        assert_eq!(orc.position(), Position::new(2, 3));
    }

    #[test]
    fn test_item_from_template_does_not_block() {
        let potion =
            Entity::from_template(EntityId(2), Prototype::HealthPotion.template(), Position::origin());
        assert!(!potion.blocks_movement);
        assert_eq!(potion.render_order, RenderOrder::Item);
        assert!(!potion.is_alive());
        assert!(potion.item().is_some());
    }

    #[test]
    fn test_death_happens_exactly_once() {
        let mut orc = orc_at(Position::origin());
        let death = orc.set_hp(0).expect("first write of zero kills");
        assert_eq!(death.name, "Orc");
        assert_eq!(death.xp_given, 35);

        assert!(!orc.is_alive());
        assert_eq!(orc.glyph, '%');
        assert_eq!(orc.name, "remains of Orc");
        assert!(!orc.blocks_movement);
        assert_eq!(orc.render_order, RenderOrder::Corpse);

        assert!(orc.set_hp(0).is_none());
        assert!(orc.take_damage(5).is_none());
        assert_eq!(orc.name, "remains of Orc");
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut orc = orc_at(Position::origin());
        assert!(orc.take_damage(3).is_none());
        assert_eq!(orc.actor().map(|a| a.fighter.hp()), Some(7));
        assert!(orc.take_damage(50).is_some());
        assert_eq!(orc.actor().map(|a| a.fighter.hp()), Some(0));
    }

    #[test]
    fn test_heal_reports_recovered_amount() {
        let mut orc = orc_at(Position::origin());
        assert_eq!(orc.heal(4), 0);
        orc.take_damage(2);
        assert_eq!(orc.heal(4), 2);
        assert_eq!(orc.actor().map(|a| a.fighter.hp()), Some(10));
    }

    #[test]
    fn test_equipment_bonuses_apply() {
        let mut player = Entity::from_template(EntityId(1), Prototype::Player.template(), Position::origin());
        let sword = Entity::from_template(EntityId(2), Prototype::Sword.template(), Position::origin());
        let mail = Entity::from_template(EntityId(3), Prototype::ChainMail.template(), Position::origin());

        let actor = player.actor_mut().expect("player is an actor");
        let base_power = actor.power();
        let base_defense = actor.defense();
        actor.inventory.items.push(sword);
        actor.inventory.items.push(mail);
        assert_eq!(actor.power(), base_power, "carried but unequipped");

        actor.equipment.set(EquipmentSlot::Weapon, Some(EntityId(2)));
        actor.equipment.set(EquipmentSlot::Armour, Some(EntityId(3)));
        assert_eq!(actor.power(), base_power + 4);
        assert_eq!(actor.defense(), base_defense + 3);
    }

    #[test]
    fn test_apply_level_up() {
        let mut player = Entity::from_template(EntityId(1), Prototype::Player.template(), Position::origin());
        let actor = player.actor_mut().expect("player is an actor");
        assert!(!actor.apply_level_up(LevelUpChoice::Strength));

        actor.level.pending_upgrades = 2;
        let power = actor.power();
        let max_hp = actor.fighter.max_hp;
        assert!(actor.apply_level_up(LevelUpChoice::Strength));
        assert!(actor.apply_level_up(LevelUpChoice::Constitution));
        assert_eq!(actor.power(), power + 1);
        assert_eq!(actor.fighter.max_hp, max_hp + 20);
        assert_eq!(actor.fighter.hp(), max_hp + 20);
        assert_eq!(actor.level.pending_upgrades, 0);
    }
}
