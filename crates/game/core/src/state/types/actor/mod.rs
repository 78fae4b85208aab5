//! Actor-related state types.
//!
//! This module contains all types specific to actors:
//! - ActorState: Main actor structure shared by the player and monsters
//! - Equipment: Weapons and worn gear flags
//! - Player: Stats, skills, mutations and forms
//! - Status: Status effects and conditions

pub mod equipment;
pub mod player;
pub mod status;

use strum::EnumCount;

pub use equipment::{GearFlags, Skill, Weapon};
pub use player::{Form, MutationKind, PlayerTraits};
pub use status::{StatusEffect, StatusEffects, StatusKind};

use super::{EntityId, Position};
use crate::env::{Holiness, Intelligence, SizeClass, SpeciesDef, SpeciesFlags, SpeciesId};

/// Complete actor state for a combatant on the grid.
///
/// Players and monsters share one structure so the attack resolver can treat
/// either side of a fight uniformly. Role-specific data lives in [`ActorKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: EntityId,
    pub name: String,
    pub position: Position,

    // === Health ===
    pub hp: i32,
    pub max_hp: i32,

    // === Defences ===
    pub ac: i32,
    pub ev: i32,
    /// Shield bonus; zero without a shield.
    pub shield: i32,
    /// Guaranteed damage reduction, percent of the maximum roll.
    pub gdr: i32,
    pub willpower: i32,
    pub resists: Resistances,
    pub holiness: Holiness,
    pub size: SizeClass,

    // === Conditions ===
    pub statuses: StatusEffects,
    pub behaviour: Behaviour,
    pub attitude: Attitude,
    /// Actor this one is currently hunting.
    pub foe: Option<EntityId>,

    // === Gear ===
    pub weapon: Option<Weapon>,
    pub offhand: Option<Weapon>,
    pub gear: GearFlags,

    // === Action economy ===
    pub energy: i32,
    pub speed: i32,

    /// Number of heads; only hydras have more than one.
    pub heads: u8,

    pub kind: ActorKind,
}

/// Role-specific actor data.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorKind {
    Player(PlayerTraits),
    Monster(MonsterTraits),
}

/// Per-instance copy of the species data a monster needs at combat time.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterTraits {
    pub species: SpeciesId,
    pub hd: i32,
    pub intelligence: Intelligence,
    pub flags: SpeciesFlags,
    /// Remaining attacks for clockwork monsters.
    pub charge: u8,
    pub spines: i32,
}

/// High-level behaviour state of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behaviour {
    Sleeping,
    #[default]
    Wandering,
    /// Moving toward a remembered location (e.g. the perceived origin of a noise).
    Seeking(Position),
    Fighting,
}

/// Which side an actor is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attitude {
    #[default]
    Hostile,
    Neutral,
    Friendly,
}

/// Damage element for resistance lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Fire,
    Cold,
    Elec,
    Poison,
    Negative,
    Acid,
    Corrosion,
}

/// Resistance levels per element. Positive resists, negative is vulnerable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resistances([i8; Element::COUNT]);

impl Resistances {
    pub fn get(&self, element: Element) -> i32 {
        i32::from(self.0[element as usize])
    }

    pub fn set(&mut self, element: Element, level: i8) {
        self.0[element as usize] = level;
    }

    pub fn with(mut self, element: Element, level: i8) -> Self {
        self.set(element, level);
        self
    }
}

/// Amount of harm inflicted by [`ActorState::hurt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Harm {
    Points(i32),
    InstantDeath,
}

impl ActorState {
    /// Creates a player character with sensible defaults.
    pub fn player(name: impl Into<String>, position: Position, traits: PlayerTraits) -> Self {
        Self {
            id: EntityId::PLAYER,
            name: name.into(),
            position,
            hp: 30,
            max_hp: 30,
            ac: 0,
            ev: 0,
            shield: 0,
            gdr: 0,
            willpower: 20,
            resists: Resistances::default(),
            holiness: Holiness::NATURAL,
            size: SizeClass::Medium,
            statuses: StatusEffects::empty(),
            behaviour: Behaviour::Fighting,
            attitude: Attitude::Friendly,
            foe: None,
            weapon: None,
            offhand: None,
            gear: GearFlags::empty(),
            energy: 0,
            speed: 10,
            heads: 1,
            kind: ActorKind::Player(traits),
        }
    }

    /// Creates a hostile monster from its species entry.
    pub fn monster(id: EntityId, species: &SpeciesDef, position: Position) -> Self {
        Self {
            id,
            name: species.name.clone(),
            position,
            hp: species.max_hp,
            max_hp: species.max_hp,
            ac: species.ac,
            ev: species.ev,
            shield: 0,
            gdr: 0,
            willpower: species.hd * 3,
            resists: Resistances::default(),
            holiness: species.holiness,
            size: species.size,
            statuses: StatusEffects::empty(),
            behaviour: Behaviour::Wandering,
            attitude: Attitude::Hostile,
            foe: None,
            weapon: None,
            offhand: None,
            gear: GearFlags::empty(),
            energy: 0,
            speed: 10,
            heads: species.heads.max(1),
            kind: ActorKind::Monster(MonsterTraits {
                species: species.id,
                hd: species.hd,
                intelligence: species.intelligence,
                flags: species.flags,
                charge: if species.flags.contains(SpeciesFlags::CLOCKWORK) {
                    3
                } else {
                    0
                },
                spines: species.spines,
            }),
        }
    }

    // === Builders ===

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self.max_hp = self.max_hp.max(hp);
        self
    }

    pub fn with_defences(mut self, ac: i32, ev: i32) -> Self {
        self.ac = ac;
        self.ev = ev;
        self
    }

    pub fn with_shield(mut self, shield: i32) -> Self {
        self.shield = shield;
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_offhand(mut self, weapon: Weapon) -> Self {
        self.offhand = Some(weapon);
        self
    }

    pub fn with_gear(mut self, gear: GearFlags) -> Self {
        self.gear |= gear;
        self
    }

    pub fn with_attitude(mut self, attitude: Attitude) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn with_behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    pub fn with_status(mut self, effect: StatusEffect) -> Self {
        self.statuses.add(effect);
        self
    }

    pub fn with_resist(mut self, element: Element, level: i8) -> Self {
        self.resists.set(element, level);
        self
    }

    // === Identity ===

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player(_))
    }

    pub fn is_monster(&self) -> bool {
        !self.is_player()
    }

    pub fn player_traits(&self) -> Option<&PlayerTraits> {
        match &self.kind {
            ActorKind::Player(traits) => Some(traits),
            ActorKind::Monster(_) => None,
        }
    }

    pub fn player_traits_mut(&mut self) -> Option<&mut PlayerTraits> {
        match &mut self.kind {
            ActorKind::Player(traits) => Some(traits),
            ActorKind::Monster(_) => None,
        }
    }

    pub fn monster_traits(&self) -> Option<&MonsterTraits> {
        match &self.kind {
            ActorKind::Monster(traits) => Some(traits),
            ActorKind::Player(_) => None,
        }
    }

    pub fn monster_traits_mut(&mut self) -> Option<&mut MonsterTraits> {
        match &mut self.kind {
            ActorKind::Monster(traits) => Some(traits),
            ActorKind::Player(_) => None,
        }
    }

    /// Experience level for players, hit dice for monsters.
    pub fn hit_dice(&self) -> i32 {
        match &self.kind {
            ActorKind::Player(traits) => traits.xl,
            ActorKind::Monster(traits) => traits.hd,
        }
    }

    /// Mutation level; always zero for monsters.
    pub fn mutation(&self, kind: MutationKind) -> u8 {
        self.player_traits().map_or(0, |p| p.mutation(kind))
    }

    /// Species flags; always empty for the player.
    pub fn species_flags(&self) -> SpeciesFlags {
        self.monster_traits()
            .map_or(SpeciesFlags::empty(), |m| m.flags)
    }

    pub fn has_flag(&self, flag: SpeciesFlags) -> bool {
        self.species_flags().contains(flag)
    }

    pub fn form(&self) -> Form {
        self.player_traits().map_or(Form::Normal, |p| p.form)
    }

    // === Health ===

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies harm and returns the hit points actually removed.
    pub fn hurt(&mut self, harm: Harm) -> i32 {
        let before = self.hp;
        match harm {
            Harm::Points(amount) => self.hp -= amount.max(0),
            Harm::InstantDeath => self.hp = self.hp.min(0) - 1,
        }
        (before - self.hp).min(before.max(0))
    }

    /// Restores hit points up to the maximum and returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    // === Resistances ===

    pub fn res(&self, element: Element) -> i32 {
        self.resists.get(element)
    }

    // === Status ===

    pub fn has(&self, kind: StatusKind) -> bool {
        self.statuses.has(kind)
    }

    pub fn add_status(&mut self, kind: StatusKind, duration: u16) {
        self.statuses.add(StatusEffect::new(kind, duration));
    }

    pub fn remove_status(&mut self, kind: StatusKind) -> bool {
        self.statuses.remove(kind)
    }

    pub fn is_confused(&self) -> bool {
        self.has(StatusKind::Confused)
    }

    pub fn is_asleep(&self) -> bool {
        matches!(self.behaviour, Behaviour::Sleeping)
    }

    pub fn is_paralysed(&self) -> bool {
        self.has(StatusKind::Paralysed) || self.has(StatusKind::Petrified)
    }

    /// Unable to react: asleep, paralysed or petrified.
    pub fn incapacitated(&self) -> bool {
        self.is_asleep() || self.is_paralysed()
    }

    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.incapacitated() && !self.has(StatusKind::Dormant)
    }

    /// Afraid of `other` specifically.
    pub fn is_afraid_of(&self, other: EntityId) -> bool {
        self.statuses
            .get(StatusKind::Afraid)
            .is_some_and(|s| s.source.is_none_or(|src| src == other))
    }

    pub fn can_fly(&self) -> bool {
        self.has(StatusKind::Flight)
    }

    // === Allegiance ===

    /// Both actors fight for the same side.
    pub fn aligned_with(&self, other: &ActorState) -> bool {
        self.attitude == other.attitude
    }

    pub fn is_hostile(&self) -> bool {
        matches!(self.attitude, Attitude::Hostile)
    }

    /// Friendly to the player.
    pub fn wont_attack(&self) -> bool {
        matches!(self.attitude, Attitude::Friendly)
    }

    // === Combat stats ===

    /// Attack delay in tenths of a turn.
    pub fn attack_delay(&self) -> i32 {
        self.weapon.as_ref().map_or(10, |w| w.delay)
    }

    /// Maximum melee reach in cells.
    pub fn reach(&self) -> u32 {
        self.weapon.as_ref().map_or(1, |w| w.reach.max(1))
    }

    pub fn has_usable_offhand(&self) -> bool {
        self.offhand.is_none() && self.shield == 0
    }

    // === Messaging ===

    /// Capitalised subject form: "You" or "The goblin".
    pub fn subject(&self) -> String {
        if self.is_player() {
            "You".to_string()
        } else {
            format!("The {}", self.name)
        }
    }

    /// Object form: "you" or "the goblin".
    pub fn object(&self) -> String {
        if self.is_player() {
            "you".to_string()
        } else {
            format!("the {}", self.name)
        }
    }

    /// Possessive form: "your" or "the goblin's".
    pub fn possessive(&self) -> String {
        if self.is_player() {
            "your".to_string()
        } else {
            format!("the {}'s", self.name)
        }
    }

    /// Sentence-initial possessive: "Your" or "The hydra's".
    pub fn possessive_capitalised(&self) -> String {
        if self.is_player() {
            "Your".to_string()
        } else {
            format!("The {}'s", self.name)
        }
    }

    /// Conjugates a verb for this actor as subject ("hit" / "hits").
    pub fn conj(&self, verb: &str) -> String {
        if self.is_player() {
            verb.to_string()
        } else if verb.ends_with("sh") || verb.ends_with("ch") || verb.ends_with('s') {
            format!("{verb}es")
        } else {
            format!("{verb}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(1), "goblin", 2).with_defences(10, 1, 3);
        ActorState::monster(EntityId(7), &def, Position::new(1, 1))
    }

    #[test]
    fn hurt_reports_removed_points() {
        let mut target = goblin();
        assert_eq!(target.hurt(Harm::Points(4)), 4);
        assert_eq!(target.hp, 6);
        assert_eq!(target.hurt(Harm::Points(-3)), 0);
        assert_eq!(target.hurt(Harm::InstantDeath), 6);
        assert!(!target.is_alive());
    }

    #[test]
    fn heal_is_capped_at_maximum() {
        let mut target = goblin();
        target.hp = 8;
        assert_eq!(target.heal(5), 2);
        assert_eq!(target.hp, 10);
    }

    #[test]
    fn messaging_forms() {
        let player = ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(1, 10, 10));
        let monster = goblin();
        assert_eq!(player.conj("hit"), "hit");
        assert_eq!(monster.conj("hit"), "hits");
        assert_eq!(monster.conj("miss"), "misses");
        assert_eq!(monster.possessive(), "the goblin's");
        assert_eq!(player.subject(), "You");
    }

    #[test]
    fn fear_can_target_one_actor() {
        let mut player = ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(1, 10, 10));
        player
            .statuses
            .add(StatusEffect::new(StatusKind::Afraid, 5).with_source(EntityId(3)));
        assert!(player.is_afraid_of(EntityId(3)));
        assert!(!player.is_afraid_of(EntityId(4)));
    }
}
