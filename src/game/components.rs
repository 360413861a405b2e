//! # Actor Components
//!
//! The capability bundle carried by every actor: combat stats, a bounded
//! inventory, equipment slots and experience progression.

use crate::game::{Entity, EntityId};
use serde::{Deserialize, Serialize};

/// Combat statistics.
///
/// `hp` is only writable through [`Entity::set_hp`] so that the death
/// transition cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    /// Maximum hit points
    pub max_hp: i32,
    /// Current hit points, always within `[0, max_hp]`
    hp: i32,
    /// Power before equipment bonuses
    pub base_power: i32,
    /// Defense before equipment bonuses
    pub base_defense: i32,
}

impl Fighter {
    /// Creates a fighter at full health.
    pub fn new(hp: i32, defense: i32, power: i32) -> Self {
        let max_hp = hp.max(1);
        Self {
            max_hp,
            hp: max_hp,
            base_power: power,
            base_defense: defense,
        }
    }

    /// Current hit points.
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Clamps and stores `value`, returning the stored hit points.
    pub(crate) fn store_hp(&mut self, value: i32) -> i32 {
        self.hp = value.clamp(0, self.max_hp);
        self.hp
    }

    /// Hit points a heal of `amount` would actually restore.
    pub fn recoverable(&self, amount: i32) -> i32 {
        (self.hp + amount.max(0)).min(self.max_hp) - self.hp
    }
}

/// A bounded, ordered list of carried items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// Maximum number of carried items
    pub capacity: usize,
    /// Carried items in pickup order
    pub items: Vec<Entity>,
}

impl Inventory {
    /// Creates an empty inventory.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    /// Whether another item would exceed the capacity.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Looks up a carried item.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Removes and returns a carried item.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Whether the item is carried.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }
}

/// The body slot an equippable item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armour,
}

/// Stat bonuses granted by an item while equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equippable {
    pub slot: EquipmentSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
}

/// Which inventory items are currently worn or wielded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<EntityId>,
    pub armour: Option<EntityId>,
}

impl Equipment {
    /// The item in `slot`, if any.
    pub fn item_in(&self, slot: EquipmentSlot) -> Option<EntityId> {
        match slot {
            EquipmentSlot::Weapon => self.weapon,
            EquipmentSlot::Armour => self.armour,
        }
    }

    /// Puts `item` into `slot`, returning whatever was there before.
    pub fn set(&mut self, slot: EquipmentSlot, item: Option<EntityId>) -> Option<EntityId> {
        let target = match slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armour => &mut self.armour,
        };
        std::mem::replace(target, item)
    }

    /// Whether `item` occupies any slot.
    pub fn is_equipped(&self, item: EntityId) -> bool {
        self.weapon == Some(item) || self.armour == Some(item)
    }

    /// Clears `item` from whichever slot holds it.
    pub fn unequip(&mut self, item: EntityId) -> Option<EquipmentSlot> {
        if self.weapon == Some(item) {
            self.weapon = None;
            Some(EquipmentSlot::Weapon)
        } else if self.armour == Some(item) {
            self.armour = None;
            Some(EquipmentSlot::Armour)
        } else {
            None
        }
    }

    /// Ids of all equipped items.
    pub fn equipped(&self) -> impl Iterator<Item = EntityId> {
        self.weapon.into_iter().chain(self.armour)
    }
}

/// Experience and progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Current character level, starting at 1
    pub current_level: u32,
    /// Experience accumulated towards the next level
    pub current_xp: u32,
    /// Base of the next-level threshold; 0 means this actor never gains experience
    pub level_up_base: u32,
    /// Threshold increase per level
    pub level_up_factor: u32,
    /// Experience awarded to whoever kills this actor
    pub xp_given: u32,
    /// Level-ups not yet spent on a stat increase
    pub pending_upgrades: u32,
}

/// Default threshold increase per level.
pub const LEVEL_UP_FACTOR: u32 = 150;

impl Level {
    /// Creates a level-1 progression.
    pub fn new(level_up_base: u32, xp_given: u32) -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            level_up_base,
            level_up_factor: LEVEL_UP_FACTOR,
            xp_given,
            pending_upgrades: 0,
        }
    }

    /// Experience required to leave the current level.
    pub fn experience_to_next_level(&self) -> u32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }

    /// Adds experience and returns how many levels were gained.
    ///
    /// Large gains may cross several thresholds; the remainder carries over.
    pub fn add_xp(&mut self, xp: u32) -> u32 {
        if xp == 0 || self.level_up_base == 0 {
            return 0;
        }

        self.current_xp = self.current_xp.saturating_add(xp);
        let mut gained = 0;
        while self.current_xp >= self.experience_to_next_level() {
            self.current_xp -= self.experience_to_next_level();
            self.current_level += 1;
            gained += 1;
        }
        self.pending_upgrades += gained;
        gained
    }
}

/// The stat a pending level-up is spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    /// +20 max HP
    Constitution,
    /// +1 power
    Strength,
    /// +1 defense
    Agility,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fighter_clamps_hp() {
        let mut fighter = Fighter::new(10, 1, 3);
        assert_eq!(fighter.store_hp(25), 10);
        assert_eq!(fighter.store_hp(-4), 0);
        assert_eq!(fighter.hp(), 0);
    }

    #[test]
    fn test_fighter_recoverable() {
        let mut fighter = Fighter::new(10, 0, 0);
        assert_eq!(fighter.recoverable(4), 0);
        fighter.store_hp(8);
        assert_eq!(fighter.recoverable(4), 2);
        fighter.store_hp(3);
        assert_eq!(fighter.recoverable(4), 4);
    }

    #[test]
    fn test_equipment_slots() {
        let mut equipment = Equipment::default();
        assert_eq!(equipment.set(EquipmentSlot::Weapon, Some(EntityId(3))), None);
        assert_eq!(
            equipment.set(EquipmentSlot::Weapon, Some(EntityId(4))),
            Some(EntityId(3))
        );
        assert!(equipment.is_equipped(EntityId(4)));
        assert!(!equipment.is_equipped(EntityId(3)));
        assert_eq!(equipment.unequip(EntityId(4)), Some(EquipmentSlot::Weapon));
        assert_eq!(equipment.equipped().count(), 0);
    }

    #[test]
    fn test_level_threshold_is_monotonic() {
        let mut level = Level::new(200, 0);
        let first = level.experience_to_next_level();
        level.current_level += 1;
        assert!(level.experience_to_next_level() > first);
    }

    #[test]
    fn test_add_xp_single_level() {
        let mut level = Level::new(200, 0);
        assert_eq!(level.add_xp(349), 0);
        assert_eq!(level.add_xp(1), 1);
        assert_eq!(level.current_level, 2);
        assert_eq!(level.current_xp, 0);
        assert_eq!(level.pending_upgrades, 1);
    }

    #[test]
    fn test_add_xp_crosses_multiple_thresholds() {
        let mut level = Level::new(200, 0);
        // 350 to reach level 2, 500 more to reach level 3, 25 left over
        assert_eq!(level.add_xp(875), 2);
        assert_eq!(level.current_level, 3);
        assert_eq!(level.current_xp, 25);
        assert_eq!(level.pending_upgrades, 2);
    }

    #[test]
    fn test_add_xp_saturates() {
        let mut level = Level::new(200, 0);
        level.current_xp = u32::MAX - 1;
        assert!(level.add_xp(u32::MAX) > 0);
        assert!(level.current_xp < level.experience_to_next_level());
    }

    #[test]
    fn test_monsters_do_not_gain_xp() {
        let mut level = Level::new(0, 35);
        assert_eq!(level.add_xp(10_000), 0);
        assert_eq!(level.current_level, 1);
    }

    proptest! {
        #[test]
        fn prop_melee_damage_keeps_hp_in_range(
            max_hp in 1i32..100,
            power in -5i32..40,
            defense in -5i32..40,
            hits in 1usize..10,
        ) {
            let mut fighter = Fighter::new(max_hp, defense, 0);
            for _ in 0..hits {
                let before = fighter.hp();
                let damage = (power - fighter.base_defense).max(0);
                let after = fighter.store_hp(before - damage);
                prop_assert!((0..=fighter.max_hp).contains(&after));
                prop_assert_eq!(after, (before - damage).clamp(0, max_hp));
            }
        }
    }
}
