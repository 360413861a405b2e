//! Immutable entity prototypes.
//!
//! Every call to [`Prototype::template`] builds fresh component values, so two
//! spawned entities never share inventories or AI state.

use crate::config::PLAYER_INVENTORY_CAPACITY;
use crate::game::{
    colour, Actor, Ai, Consumable, EntityKind, EntityTemplate, EquipmentSlot, Equippable,
    Fighter, Inventory, Item, ItemUsage, Level, Rgb,
};
use serde::{Deserialize, Serialize};

/// Everything the generator and the game setup know how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prototype {
    Player,
    Orc,
    Troll,
    HealthPotion,
    LightningScroll,
    ConfusionScroll,
    FireballScroll,
    Dagger,
    Sword,
    LeatherArmour,
    ChainMail,
}

impl Prototype {
    /// Builds the template record for this prototype.
    pub fn template(self) -> EntityTemplate {
        match self {
            Prototype::Player => EntityTemplate {
                glyph: '@',
                colour: colour::WHITE,
                name: "Player",
                kind: EntityKind::Actor(Actor::new(
                    Fighter::new(30, 2, 5),
                    Inventory::new(PLAYER_INVENTORY_CAPACITY),
                    Level::new(200, 0),
                    Ai::Player,
                )),
            },
            Prototype::Orc => monster('o', Rgb(63, 127, 63), "Orc", Fighter::new(10, 0, 3), 35),
            Prototype::Troll => monster('t', Rgb(0, 127, 0), "Troll", Fighter::new(16, 1, 4), 100),
            Prototype::HealthPotion => consumable(
                '!',
                Rgb(127, 0, 255),
                "Health Potion",
                Consumable::Healing { amount: 4 },
            ),
            Prototype::LightningScroll => consumable(
                '~',
                Rgb(255, 255, 0),
                "Lightning Scroll",
                Consumable::LightningBolt {
                    damage: 20,
                    max_range: 5,
                },
            ),
            Prototype::ConfusionScroll => consumable(
                '~',
                Rgb(207, 63, 255),
                "Confusion Scroll",
                Consumable::Confusion { turns: 10 },
            ),
            Prototype::FireballScroll => consumable(
                '~',
                Rgb(255, 0, 0),
                "Fireball Scroll",
                Consumable::Fireball {
                    damage: 12,
                    radius: 3,
                },
            ),
            Prototype::Dagger => equipment('/', Rgb(0, 191, 255), "Dagger", EquipmentSlot::Weapon, 2, 0),
            Prototype::Sword => equipment('/', Rgb(0, 191, 255), "Sword", EquipmentSlot::Weapon, 4, 0),
            Prototype::LeatherArmour => equipment(
                '[',
                Rgb(139, 69, 19),
                "Leather Armour",
                EquipmentSlot::Armour,
                0,
                1,
            ),
            Prototype::ChainMail => equipment('[', Rgb(139, 69, 19), "Chain Mail", EquipmentSlot::Armour, 0, 3),
        }
    }
}

fn monster(glyph: char, colour: Rgb, name: &'static str, fighter: Fighter, xp_given: u32) -> EntityTemplate {
    EntityTemplate {
        glyph,
        colour,
        name,
        kind: EntityKind::Actor(Actor::new(
            fighter,
            Inventory::new(0),
            Level::new(0, xp_given),
            Ai::hostile(),
        )),
    }
}

fn consumable(glyph: char, colour: Rgb, name: &'static str, effect: Consumable) -> EntityTemplate {
    EntityTemplate {
        glyph,
        colour,
        name,
        kind: EntityKind::Item(Item {
            usage: ItemUsage::Consumable(effect),
        }),
    }
}

fn equipment(
    glyph: char,
    colour: Rgb,
    name: &'static str,
    slot: EquipmentSlot,
    power_bonus: i32,
    defense_bonus: i32,
) -> EntityTemplate {
    EntityTemplate {
        glyph,
        colour,
        name,
        kind: EntityKind::Item(Item {
            usage: ItemUsage::Equippable(Equippable {
                slot,
                power_bonus,
                defense_bonus,
            }),
        }),
    }
}
