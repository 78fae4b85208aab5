//! Authoritative game state representation.
//!
//! This module owns the actor roster, the per-turn noise grid, and the cloud
//! overlay. The attack resolver and the noise pass mutate it directly through
//! an explicit `&mut GameState`; nothing here is global.
pub mod error;
pub mod types;

use std::collections::BTreeMap;

pub use error::StateError;
pub use types::{
    ActorKind, ActorState, Attitude, Behaviour, Cloud, CloudKind, Element, EntityId, Form,
    GearFlags, Harm, MonsterTraits, MutationKind, PlayerTraits, Position, Resistances, Skill,
    StatusEffect, StatusEffects, StatusKind, Step, Tick, Weapon,
};

use crate::env::{MapDimensions, MapOracle};
use crate::noise::NoiseGrid;

/// Canonical snapshot of the deterministic game state.
#[derive(Clone, Debug)]
pub struct GameState {
    /// RNG seed for deterministic random generation.
    ///
    /// Set once at game initialization and never modified.
    /// Combined with `nonce` to generate unique seeds for each random event.
    pub game_seed: u64,

    /// Monotonic counter advanced once per resolved command.
    pub nonce: u64,

    pub turn: Tick,
    pub actors: Roster,
    pub noise: NoiseGrid,
    pub clouds: BTreeMap<Position, Cloud>,

    next_entity_id: u32,
}

impl GameState {
    pub fn new(dimensions: MapDimensions, game_seed: u64) -> Self {
        Self {
            game_seed,
            nonce: 0,
            turn: Tick::ZERO,
            actors: Roster::default(),
            noise: NoiseGrid::new(dimensions),
            clouds: BTreeMap::new(),
            next_entity_id: 1,
        }
    }

    /// Allocates a fresh monster id. Id 0 is reserved for the player.
    pub fn allocate_entity_id(&mut self) -> Result<EntityId, StateError> {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self
            .next_entity_id
            .checked_add(1)
            .ok_or(StateError::EntityIdExhausted)?;
        Ok(id)
    }

    /// Adds an actor, rejecting duplicates and occupied cells.
    pub fn spawn(&mut self, actor: ActorState) -> Result<EntityId, StateError> {
        if self.actors.get(actor.id).is_some() {
            return Err(StateError::DuplicateActor(actor.id));
        }
        if let Some(occupant) = self.actors.at(actor.position) {
            return Err(StateError::CellOccupied {
                position: actor.position,
                occupant,
            });
        }
        if actor.id.0 >= self.next_entity_id {
            self.next_entity_id = actor.id.0.saturating_add(1);
        }
        let id = actor.id;
        self.actors.insert(actor);
        Ok(id)
    }

    /// True when `position` is on the map, habitable, and holds no living actor.
    pub fn is_vacant<M>(&self, map: &M, position: Position) -> bool
    where
        M: MapOracle + ?Sized,
    {
        map.tile(position).is_some_and(|tile| tile.is_passable()) && self.actors.at(position).is_none()
    }

    /// Places a cloud, replacing any existing cloud on the cell.
    pub fn place_cloud(&mut self, position: Position, cloud: Cloud) {
        self.clouds.insert(position, cloud);
    }

    pub fn cloud_at(&self, position: Position) -> Option<&Cloud> {
        self.clouds.get(&position)
    }

    /// Decays clouds by one turn and drops the ones that dissipated.
    pub fn tick_clouds(&mut self) {
        self.clouds.retain(|_, cloud| {
            cloud.duration = cloud.duration.saturating_sub(1);
            cloud.duration > 0
        });
    }
}

/// Ordered collection of all actors, living or dead.
///
/// Dead actors stay in the roster until the turn driver sweeps them so that
/// reports can still name them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    actors: Vec<ActorState>,
}

impl Roster {
    /// Inserts or replaces an actor by id.
    pub fn insert(&mut self, actor: ActorState) {
        match self.index_of(actor.id) {
            Some(index) => self.actors[index] = actor,
            None => self.actors.push(actor),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&ActorState> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut ActorState> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    /// Borrows two distinct actors mutably at once.
    pub fn pair_mut(
        &mut self,
        first: EntityId,
        second: EntityId,
    ) -> Option<(&mut ActorState, &mut ActorState)> {
        let a = self.index_of(first)?;
        let b = self.index_of(second)?;
        if a == b {
            return None;
        }
        if a < b {
            let (left, right) = self.actors.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.actors.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    /// Living actor standing on `position`.
    pub fn at(&self, position: Position) -> Option<EntityId> {
        self.actors
            .iter()
            .find(|a| a.is_alive() && a.position == position)
            .map(|a| a.id)
    }

    pub fn player(&self) -> Option<&ActorState> {
        self.get(EntityId::PLAYER)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActorState> {
        self.actors.iter_mut()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.actors.iter().map(|a| a.id).collect()
    }

    /// Removes dead monsters and returns their ids. The player is never removed.
    pub fn sweep_dead(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .actors
            .iter()
            .filter(|a| !a.is_alive() && !a.is_player())
            .map(|a| a.id)
            .collect();
        self.actors.retain(|a| a.is_alive() || a.is_player());
        dead
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.actors.iter().position(|a| a.id == id)
    }
}
