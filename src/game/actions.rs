//! # Action System
//!
//! Every discrete thing an actor can do in a turn. Each action validates
//! against the current world and then either mutates it or fails with
//! [`ActionError::Impossible`], leaving the world untouched.
//!
//! Actions never hold references into the world. They name their actor and
//! targets by [`EntityId`] and receive a [`WorldContext`] when performed.

use crate::game::fov::update_fov;
use crate::game::{
    colour, Actor, Direction, Entity, EntityId, GameMap, MessageLog, Position,
};
use crate::generation::GameWorld;
use crate::TombsError;
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Why an action did not happen.
#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    /// Expected, user-facing refusal. The turn is not spent.
    #[error("{0}")]
    Impossible(String),

    /// Anything else.
    #[error(transparent)]
    Fatal(#[from] TombsError),
}

impl ActionError {
    pub fn impossible(reason: impl Into<String>) -> Self {
        ActionError::Impossible(reason.into())
    }
}

/// Result of performing an action.
pub type ActionResult = Result<(), ActionError>;

/// Everything an action, AI or consumable may read or change.
pub struct WorldContext<'a> {
    pub map: &'a mut GameMap,
    pub world: &'a mut GameWorld,
    pub log: &'a mut MessageLog,
    pub rng: &'a mut StdRng,
    pub player: EntityId,
}

impl WorldContext<'_> {
    /// Looks up an entity that must exist on the current floor.
    pub fn entity(&self, id: EntityId) -> Result<&Entity, ActionError> {
        self.map.get(id).ok_or_else(|| missing(id))
    }

    /// Looks up the actor component of an entity that must exist.
    pub fn actor_mut(&mut self, id: EntityId) -> Result<&mut Actor, ActionError> {
        self.map
            .get_mut(id)
            .and_then(Entity::actor_mut)
            .ok_or_else(|| missing(id))
    }

    pub fn is_player(&self, id: EntityId) -> bool {
        id == self.player
    }
}

fn missing(id: EntityId) -> ActionError {
    TombsError::InvalidState(format!("Actor {id} is not on the current floor")).into()
}

/// A command bound to one acting entity.
pub trait Action {
    /// The entity performing the action.
    fn actor(&self) -> EntityId;

    /// Validates and executes the action.
    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult;
}

/// Step one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAction {
    pub actor: EntityId,
    pub direction: Direction,
}

/// Attack whatever stands in an adjacent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeleeAction {
    pub actor: EntityId,
    pub direction: Direction,
}

/// Attack if a live actor is there, otherwise move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpAction {
    pub actor: EntityId,
    pub direction: Direction,
}

/// Do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitAction {
    pub actor: EntityId,
}

/// Pick up the first item on the actor's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickUpAction {
    pub actor: EntityId,
}

/// Put a carried item down on the actor's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropAction {
    pub actor: EntityId,
    pub item: EntityId,
}

/// Activate a carried item, optionally at a chosen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseItemAction {
    pub actor: EntityId,
    pub item: EntityId,
    /// Defaults to the actor's own cell
    pub target: Option<Position>,
}

/// Toggle a carried equippable in its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipAction {
    pub actor: EntityId,
    pub item: EntityId,
}

/// Descend from the floor's downstairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeStairsAction {
    pub actor: EntityId,
}

/// All actions, dispatched by match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteAction {
    Move(MoveAction),
    Melee(MeleeAction),
    Bump(BumpAction),
    Wait(WaitAction),
    PickUp(PickUpAction),
    Drop(DropAction),
    UseItem(UseItemAction),
    Equip(EquipAction),
    TakeStairs(TakeStairsAction),
}

impl ConcreteAction {
    pub fn move_to(actor: EntityId, direction: Direction) -> Self {
        ConcreteAction::Move(MoveAction { actor, direction })
    }

    pub fn melee(actor: EntityId, direction: Direction) -> Self {
        ConcreteAction::Melee(MeleeAction { actor, direction })
    }

    pub fn bump(actor: EntityId, direction: Direction) -> Self {
        ConcreteAction::Bump(BumpAction { actor, direction })
    }

    pub fn wait(actor: EntityId) -> Self {
        ConcreteAction::Wait(WaitAction { actor })
    }

    pub fn pick_up(actor: EntityId) -> Self {
        ConcreteAction::PickUp(PickUpAction { actor })
    }

    pub fn drop_item(actor: EntityId, item: EntityId) -> Self {
        ConcreteAction::Drop(DropAction { actor, item })
    }

    pub fn use_item(actor: EntityId, item: EntityId, target: Option<Position>) -> Self {
        ConcreteAction::UseItem(UseItemAction {
            actor,
            item,
            target,
        })
    }

    pub fn equip(actor: EntityId, item: EntityId) -> Self {
        ConcreteAction::Equip(EquipAction { actor, item })
    }

    pub fn take_stairs(actor: EntityId) -> Self {
        ConcreteAction::TakeStairs(TakeStairsAction { actor })
    }
}

impl Action for ConcreteAction {
    fn actor(&self) -> EntityId {
        match self {
            ConcreteAction::Move(action) => action.actor(),
            ConcreteAction::Melee(action) => action.actor(),
            ConcreteAction::Bump(action) => action.actor(),
            ConcreteAction::Wait(action) => action.actor(),
            ConcreteAction::PickUp(action) => action.actor(),
            ConcreteAction::Drop(action) => action.actor(),
            ConcreteAction::UseItem(action) => action.actor(),
            ConcreteAction::Equip(action) => action.actor(),
            ConcreteAction::TakeStairs(action) => action.actor(),
        }
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        match self {
            ConcreteAction::Move(action) => action.perform(ctx),
            ConcreteAction::Melee(action) => action.perform(ctx),
            ConcreteAction::Bump(action) => action.perform(ctx),
            ConcreteAction::Wait(action) => action.perform(ctx),
            ConcreteAction::PickUp(action) => action.perform(ctx),
            ConcreteAction::Drop(action) => action.perform(ctx),
            ConcreteAction::UseItem(action) => action.perform(ctx),
            ConcreteAction::Equip(action) => action.perform(ctx),
            ConcreteAction::TakeStairs(action) => action.perform(ctx),
        }
    }
}

impl Action for MoveAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let destination = ctx.entity(self.actor)?.position() + self.direction.delta();

        if !ctx.map.in_bounds(destination)
            || !ctx.map.is_walkable(destination)
            || ctx.map.blocking_entity_at(destination).is_some()
        {
            return Err(ActionError::impossible("That way is blocked."));
        }

        ctx.map.move_entity(self.actor, destination);
        Ok(())
    }
}

impl Action for MeleeAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let attacker = ctx.entity(self.actor)?;
        let destination = attacker.position() + self.direction.delta();
        let target = ctx
            .map
            .actor_at(destination)
            .ok_or_else(|| ActionError::impossible("Nothing to attack."))?;

        let power = attacker.actor().map_or(0, Actor::power);
        let defense = target.actor().map_or(0, Actor::defense);
        let damage = power - defense;
        let description = format!("{} attacks {}", capitalize(&attacker.name), target.name);
        let target = target.id();

        let fg = if ctx.is_player(self.actor) {
            colour::PLAYER_ATK
        } else {
            colour::ENEMY_ATK
        };

        if damage > 0 {
            ctx.log
                .log_coloured(format!("{description} for {damage} hit points"), fg);
            inflict_damage(ctx, target, damage, self.actor);
        } else {
            ctx.log
                .log_coloured(format!("{description} but does no damage"), fg);
        }
        Ok(())
    }
}

impl Action for BumpAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let destination = ctx.entity(self.actor)?.position() + self.direction.delta();
        if ctx.map.actor_at(destination).is_some() {
            MeleeAction {
                actor: self.actor,
                direction: self.direction,
            }
            .perform(ctx)
        } else {
            MoveAction {
                actor: self.actor,
                direction: self.direction,
            }
            .perform(ctx)
        }
    }
}

impl Action for WaitAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, _ctx: &mut WorldContext<'_>) -> ActionResult {
        Ok(())
    }
}

impl Action for PickUpAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let entity = ctx.entity(self.actor)?;
        let position = entity.position();
        let full = entity.actor().map_or(true, |actor| actor.inventory.is_full());

        let item = ctx
            .map
            .items_at(position)
            .next()
            .map(Entity::id)
            .ok_or_else(|| ActionError::impossible("There is nothing here to pick up."))?;
        if full {
            return Err(ActionError::impossible("Your inventory is full."));
        }

        let item = ctx.map.remove(item).ok_or_else(|| missing(item))?;
        let name = item.name.clone();
        ctx.actor_mut(self.actor)?.inventory.items.push(item);
        ctx.log.log(format!("You picked up the {name}."));
        Ok(())
    }
}

impl Action for DropAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let position = ctx.entity(self.actor)?.position();
        let actor = ctx.actor_mut(self.actor)?;
        if !actor.inventory.contains(self.item) {
            return Err(ActionError::impossible("You do not carry that item."));
        }

        let unequipped = actor.equipment.unequip(self.item).is_some();
        let item = actor
            .inventory
            .take(self.item)
            .ok_or_else(|| missing(self.item))?;
        let name = item.name.clone();

        if unequipped {
            ctx.log.log(format!("You remove the {name}."));
        }
        ctx.map.place(item, position);
        ctx.log.log(format!("You dropped the {name}."));
        Ok(())
    }
}

impl Action for UseItemAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        use crate::game::ItemUsage;

        let user = ctx.entity(self.actor)?;
        let target = self.target.unwrap_or_else(|| user.position());
        let usage = user
            .actor()
            .and_then(|actor| actor.inventory.get(self.item))
            .and_then(Entity::item)
            .map(|item| item.usage.clone())
            .ok_or_else(|| ActionError::impossible("You do not carry that item."))?;

        match usage {
            ItemUsage::Consumable(effect) => effect.activate(ctx, self.actor, self.item, target),
            ItemUsage::Equippable(_) => EquipAction {
                actor: self.actor,
                item: self.item,
            }
            .perform(ctx),
        }
    }
}

impl Action for EquipAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let actor = ctx.actor_mut(self.actor)?;
        let equippable = actor
            .equippable(self.item)
            .ok_or_else(|| ActionError::impossible("You cannot equip that."))?;
        let name_of = |actor: &Actor, id: EntityId| {
            actor
                .inventory
                .get(id)
                .map(|item| item.name.clone())
                .unwrap_or_default()
        };
        let name = name_of(actor, self.item);

        let mut messages = Vec::new();
        if actor.equipment.item_in(equippable.slot) == Some(self.item) {
            actor.equipment.set(equippable.slot, None);
            messages.push(format!("You remove the {name}."));
        } else {
            if let Some(previous) = actor.equipment.set(equippable.slot, Some(self.item)) {
                messages.push(format!("You remove the {}.", name_of(actor, previous)));
            }
            messages.push(format!("You equip the {name}."));
        }

        for message in messages {
            ctx.log.log(message);
        }
        Ok(())
    }
}

impl Action for TakeStairsAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn perform(&self, ctx: &mut WorldContext<'_>) -> ActionResult {
        let entity = ctx.map.get(self.actor).ok_or_else(|| missing(self.actor))?;
        if entity.position() != ctx.map.downstairs {
            return Err(ActionError::impossible("There are no stairs here."));
        }
        if self.actor != ctx.player {
            return Err(ActionError::impossible("Only the player can descend."));
        }

        let next_floor = ctx.world.generate_floor(entity, ctx.map.next_id(), ctx.rng)?;
        *ctx.map = next_floor;

        let origin = ctx.entity(self.actor)?.position();
        update_fov(ctx.map, origin, ctx.world.config.fov_radius);
        ctx.log
            .log_coloured("You descend the staircase.", colour::DESCEND);
        info!("Descended to floor {}", ctx.world.current_floor);
        Ok(())
    }
}

/// Applies damage to an actor and resolves a resulting death.
pub(crate) fn inflict_damage(
    ctx: &mut WorldContext<'_>,
    target: EntityId,
    amount: i32,
    source: EntityId,
) {
    let death = ctx
        .map
        .get_mut(target)
        .and_then(|entity| entity.take_damage(amount));
    if let Some(death) = death {
        resolve_death(ctx, target, death, Some(source));
    }
}

/// Logs a death and awards experience to a living killer.
pub(crate) fn resolve_death(
    ctx: &mut WorldContext<'_>,
    victim: EntityId,
    death: crate::game::Death,
    killer: Option<EntityId>,
) {
    if ctx.is_player(victim) {
        info!("The player was killed");
        ctx.log.log_coloured("You died!", colour::PLAYER_DIE);
    } else {
        debug!("{} ({victim}) died", death.name);
        ctx.log
            .log_coloured(format!("{} is dead!", death.name), colour::ENEMY_DIE);
    }

    let Some(killer) = killer.filter(|killer| *killer != victim) else {
        return;
    };
    award_xp(ctx, killer, death.xp_given);
}

fn award_xp(ctx: &mut WorldContext<'_>, killer: EntityId, xp: u32) {
    let is_player = ctx.is_player(killer);
    let Some(actor) = ctx
        .map
        .get_mut(killer)
        .and_then(Entity::actor_mut)
        .filter(|actor| actor.is_alive())
    else {
        return;
    };

    let gained = actor.level.add_xp(xp);
    let level = actor.level.current_level;
    if !is_player || xp == 0 {
        return;
    }

    ctx.log.log(format!("You gain {xp} experience points."));
    for reached in (level + 1 - gained)..=level {
        info!("Player reached level {reached}");
        ctx.log
            .log_coloured(format!("You advance to level {reached}!"), colour::LEVEL_UP);
    }
}

/// Uppercases the first letter and lowercases the rest.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
