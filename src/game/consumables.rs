//! # Consumables
//!
//! Single-use item effects and how each one picks its target.
//!
//! An effect that succeeds removes its item from the user's inventory. An
//! effect that fails with [`ActionError::Impossible`] changes nothing.

use crate::game::actions::inflict_damage;
use crate::game::{
    colour, ActionError, ActionResult, Ai, ConcreteAction, Entity, EntityId, ItemUsage,
    MessageLog, Position, WorldContext,
};
use serde::{Deserialize, Serialize};

/// The effect a consumable item has when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    /// Restores a flat amount of HP to the user
    Healing { amount: i32 },
    /// Strikes the closest visible actor within range
    LightningBolt { damage: i32, max_range: i32 },
    /// Confuses the actor on a chosen cell for a number of turns
    Confusion { turns: u32 },
    /// Damages every actor within a radius of a chosen cell
    Fireball { damage: i32, radius: i32 },
}

/// How a consumable resolves its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Targeting {
    /// The user or an automatically chosen actor
    Automatic,
    /// A single cell chosen by the caller
    Cell,
    /// A cell chosen by the caller, affecting a radius around it
    Area { radius: i32 },
}

/// A pending request for the caller to pick a target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRequest {
    pub user: EntityId,
    pub item: EntityId,
    /// Preview radius for area effects
    pub radius: Option<i32>,
}

impl TargetRequest {
    /// Builds the action that uses the item on `cell`.
    pub fn to_action(&self, cell: Position) -> ConcreteAction {
        ConcreteAction::use_item(self.user, self.item, Some(cell))
    }
}

/// What selecting an item from the inventory leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemActivation {
    /// An action that can be performed right away
    Immediate(ConcreteAction),
    /// A target cell must be chosen first
    Target(TargetRequest),
}

/// Decides what using `item` from `user`'s inventory means.
///
/// Returns `None` if the item is not carried.
pub fn get_action(user: &Entity, item: EntityId, log: &mut MessageLog) -> Option<ItemActivation> {
    let usage = &user.actor()?.inventory.get(item)?.item()?.usage;
    let activation = match usage {
        ItemUsage::Equippable(_) => ItemActivation::Immediate(ConcreteAction::equip(user.id(), item)),
        ItemUsage::Consumable(effect) => match effect.targeting() {
            Targeting::Automatic => {
                ItemActivation::Immediate(ConcreteAction::use_item(user.id(), item, None))
            }
            Targeting::Cell | Targeting::Area { .. } => {
                log.log_coloured("Select a target location.", colour::NEEDS_TARGET);
                let radius = match effect.targeting() {
                    Targeting::Area { radius } => Some(radius),
                    _ => None,
                };
                ItemActivation::Target(TargetRequest {
                    user: user.id(),
                    item,
                    radius,
                })
            }
        },
    };
    Some(activation)
}

impl Consumable {
    pub fn targeting(&self) -> Targeting {
        match self {
            Consumable::Healing { .. } | Consumable::LightningBolt { .. } => Targeting::Automatic,
            Consumable::Confusion { .. } => Targeting::Cell,
            Consumable::Fireball { radius, .. } => Targeting::Area { radius: *radius },
        }
    }

    /// Applies the effect of `item`, used by `user` at `target`.
    pub fn activate(
        self,
        ctx: &mut WorldContext<'_>,
        user: EntityId,
        item: EntityId,
        target: Position,
    ) -> ActionResult {
        match self {
            Consumable::Healing { amount } => heal(ctx, user, item, amount)?,
            Consumable::LightningBolt { damage, max_range } => {
                lightning(ctx, user, damage, max_range)?
            }
            Consumable::Confusion { turns } => confuse(ctx, user, target, turns)?,
            Consumable::Fireball { damage, radius } => fireball(ctx, user, target, damage, radius)?,
        }
        consume(ctx, user, item)
    }
}

fn heal(ctx: &mut WorldContext<'_>, user: EntityId, item: EntityId, amount: i32) -> ActionResult {
    let entity = ctx
        .map
        .get_mut(user)
        .ok_or_else(|| ActionError::impossible("You cannot use items right now."))?;
    let name = entity
        .actor()
        .and_then(|actor| actor.inventory.get(item))
        .map(|item| item.name.clone())
        .unwrap_or_default();

    let recovered = entity.heal(amount);
    if recovered <= 0 {
        return Err(ActionError::impossible("Your health is already full."));
    }
    ctx.log.log_coloured(
        format!("You consume the {name}, and recover {recovered} HP!"),
        colour::HEALTH_RECOVERED,
    );
    Ok(())
}

fn lightning(ctx: &mut WorldContext<'_>, user: EntityId, damage: i32, max_range: i32) -> ActionResult {
    let origin = ctx.entity(user)?.position();

    let mut closest: Option<(&Entity, f64)> = None;
    for actor in ctx.map.actors() {
        if actor.id() == user || !ctx.map.is_visible(actor.position()) {
            continue;
        }
        let distance = origin.euclidean_distance(actor.position());
        if distance > max_range as f64 {
            continue;
        }
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((actor, distance));
        }
    }

    let (target, _) = closest.ok_or_else(|| ActionError::impossible("No enemy close enough to strike"))?;
    let (target, name) = (target.id(), target.name.clone());
    ctx.log
        .log(format!("A lightning bolt strikes the {name} for {damage} damage"));
    inflict_damage(ctx, target, damage, user);
    Ok(())
}

fn confuse(ctx: &mut WorldContext<'_>, user: EntityId, target: Position, turns: u32) -> ActionResult {
    if !ctx.map.is_visible(target) {
        return Err(ActionError::impossible("You cannot target an area you cannot see."));
    }
    let victim = ctx
        .map
        .actor_at(target)
        .ok_or_else(|| ActionError::impossible("You must select an enemy to target."))?;
    if victim.id() == user {
        return Err(ActionError::impossible("You cannot confuse yourself."));
    }

    let (victim, name) = (victim.id(), victim.name.clone());
    let actor = ctx.actor_mut(victim)?;
    if let Some(previous) = actor.ai.take() {
        actor.ai = Some(Ai::confused(previous, turns));
    }
    ctx.log.log_coloured(
        format!("The eyes of the {name} look vacant as it stumbles around"),
        colour::STATUS_EFFECT_APPLIED,
    );
    Ok(())
}

fn fireball(
    ctx: &mut WorldContext<'_>,
    user: EntityId,
    target: Position,
    damage: i32,
    radius: i32,
) -> ActionResult {
    if !ctx.map.is_visible(target) {
        return Err(ActionError::impossible("You cannot target an area you cannot see."));
    }

    let victims: Vec<(EntityId, String)> = ctx
        .map
        .actors()
        .filter(|actor| actor.distance(target) <= radius as f64)
        .map(|actor| (actor.id(), actor.name.clone()))
        .collect();
    if victims.is_empty() {
        return Err(ActionError::impossible("There are no targets in the radius."));
    }

    for (victim, name) in victims {
        ctx.log.log(format!(
            "The {name} is engulfed in a fiery explosion, taking {damage} damage"
        ));
        inflict_damage(ctx, victim, damage, user);
    }
    Ok(())
}

/// Removes a spent item from its user's inventory.
fn consume(ctx: &mut WorldContext<'_>, user: EntityId, item: EntityId) -> ActionResult {
    let actor = ctx.actor_mut(user)?;
    actor.equipment.unequip(item);
    actor.inventory.take(item);
    Ok(())
}
