//! Status effect system for actors.
//!
//! Status effects are temporary conditions that modify combat rolls, restrict
//! actions, or mark an actor for follow-up effects. Durations count whole
//! turns and are decayed by the turn driver; a duration of zero means the
//! effect lasts until explicitly removed.

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::state::EntityId;

/// Active status effects on an actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { GameConfig::MAX_STATUS_EFFECTS }>,
}

/// A single status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Remaining turns. Zero means permanent until removed.
    pub duration: u16,
    /// Strength of the effect (poison potency, drain amount, ...).
    pub potency: u16,
    /// Actor responsible for the effect, when it matters (fear, grapnel).
    pub source: Option<EntityId>,
}

/// Types of status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    // ========================================================================
    // Crowd Control
    // ========================================================================
    Confused,
    Paralysed,
    Petrified,
    Afraid,
    Blind,
    Constricted,
    WaterHeld,

    // ========================================================================
    // Buffs
    // ========================================================================
    Might,
    Berserk,
    Tempered,
    Idealised,
    Invisible,
    Flight,
    ConcentrateVenom,
    FieryArmour,
    DivineShield,
    Execution,
    /// Melee hits confuse instead of wounding.
    ConfusingTouch,

    // ========================================================================
    // Debuffs
    // ========================================================================
    Weak,
    Slow,
    Drained,
    Poisoned,
    Corroded,
    Backlit,
    Antimagic,
    DivinePenance,
    /// Cursed: the next damaging hit drains and afflicts the bearer.
    SignOfRuin,

    // ========================================================================
    // Bookkeeping
    // ========================================================================
    /// Put to sleep this turn; ignores noise until the next turn.
    Sleepy,
    /// Recently disturbed while asleep; harder to wake again.
    SleepWary,
    /// Shield already used to block this turn.
    ShieldExhausted,
    /// Slime shroud is regrowing.
    ShroudTimeout,
    /// Marked by a grapnel; the source's next melee attack auto-hits.
    Grappled,
    /// Momentum from a rolling attack; dropped after the swing.
    Rolling,
    /// Clockwork monster has wound down.
    Dormant,
}

impl StatusEffects {
    /// Creates an empty status effect set.
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Checks if a specific status effect is active.
    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Potency of the effect, or zero when absent.
    pub fn potency(&self, kind: StatusKind) -> u16 {
        self.get(kind).map_or(0, |e| e.potency)
    }

    /// Adds a status effect.
    ///
    /// If the effect already exists, the longer duration wins and potencies
    /// stack (saturating). When the set is full the new effect is dropped.
    pub fn add(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.duration = if existing.duration == 0 || effect.duration == 0 {
                0
            } else {
                existing.duration.max(effect.duration)
            };
            existing.potency = existing.potency.saturating_add(effect.potency);
            if effect.source.is_some() {
                existing.source = effect.source;
            }
            return;
        }

        if !self.effects.is_full() {
            self.effects.push(effect);
        }
    }

    /// Removes a status effect immediately. Returns true if it was present.
    pub fn remove(&mut self, kind: StatusKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        before != self.effects.len()
    }

    /// Overwrites the potency of an existing effect.
    pub fn set_potency(&mut self, kind: StatusKind, potency: u16) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.potency = potency;
        }
    }

    /// Advances all timed effects by one turn and returns the kinds that expired.
    pub fn tick(&mut self) -> Vec<StatusKind> {
        let mut expired = Vec::new();
        for effect in self.effects.iter_mut() {
            if effect.duration == 0 {
                continue;
            }
            effect.duration -= 1;
            if effect.duration == 0 {
                expired.push(effect.kind);
            }
        }
        self.effects
            .retain(|e| e.duration != 0 || !expired.contains(&e.kind));
        expired
    }

    /// Returns an iterator over all effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl StatusEffect {
    pub const fn new(kind: StatusKind, duration: u16) -> Self {
        Self {
            kind,
            duration,
            potency: 0,
            source: None,
        }
    }

    pub const fn with_potency(mut self, potency: u16) -> Self {
        self.potency = potency;
        self
    }

    pub const fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_longest_duration_and_stacks_potency() {
        let mut statuses = StatusEffects::empty();
        statuses.add(StatusEffect::new(StatusKind::Poisoned, 3).with_potency(4));
        statuses.add(StatusEffect::new(StatusKind::Poisoned, 5).with_potency(6));

        let poison = statuses.get(StatusKind::Poisoned).copied();
        assert_eq!(poison.map(|p| (p.duration, p.potency)), Some((5, 10)));
    }

    #[test]
    fn tick_expires_timed_effects_only() {
        let mut statuses = StatusEffects::empty();
        statuses.add(StatusEffect::new(StatusKind::Confused, 1));
        statuses.add(StatusEffect::new(StatusKind::Execution, 0));

        let expired = statuses.tick();

        assert_eq!(expired, vec![StatusKind::Confused]);
        assert!(!statuses.has(StatusKind::Confused));
        assert!(statuses.has(StatusKind::Execution));
    }
}
