//! Per-swing state threaded through the resolver phases.

use bitflags::bitflags;

use super::report::SwingKind;
use super::types::{AttackType, Brand, DamageType, Flavour, Manoeuvre};
use crate::state::{EntityId, Position, Weapon};

bitflags! {
    /// Boolean facts about one swing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttemptFlags: u16 {
        /// Counter-attack; never triggers another riposte.
        const RIPOSTE         = 1 << 0;
        /// Secondary target of a cleaving swing.
        const CLEAVING        = 1 << 1;
        /// Extra swing of a multi-hit weapon.
        const MULTIHIT        = 1 << 2;
        const PROJECTED       = 1 << 3;
        const NEVER_CLEAVE    = 1 << 4;
        const AUTO_HIT        = 1 << 5;
        const STAB            = 1 << 6;
        const CANCELLED       = 1 << 7;
        const ATTACK_OCCURRED = 1 << 8;
        /// Swung with the off-hand weapon.
        const OFFHAND         = 1 << 9;
    }
}

impl AttemptFlags {
    /// Flags a follow-up swing inherits from the swing that spawned it.
    pub fn inherited(self) -> Self {
        self & (Self::PROJECTED | Self::NEVER_CLEAVE | Self::OFFHAND)
    }
}

/// One queued swing, before setup binds its weapon and flavour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubAttack {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub attack_number: usize,
    pub effective_attack_number: i32,
    pub flags: AttemptFlags,
    pub kind: SwingKind,
    /// Electric charge carried by the swing; 0 when uncharged.
    pub charge_pow: i32,
    /// Extra damage percentage.
    pub damage_multiplier: i32,
}

impl SubAttack {
    pub fn new(attacker: EntityId, defender: EntityId, attack_number: usize) -> Self {
        Self {
            attacker,
            defender,
            attack_number,
            effective_attack_number: attack_number as i32,
            flags: AttemptFlags::empty(),
            kind: SwingKind::Primary,
            charge_pow: 0,
            damage_multiplier: 0,
        }
    }

    pub fn with_effective(mut self, effective: i32) -> Self {
        self.effective_attack_number = effective;
        self
    }

    pub fn with_flags(mut self, flags: AttemptFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_kind(mut self, kind: SwingKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_charge(mut self, charge_pow: i32) -> Self {
        self.charge_pow = charge_pow;
        self
    }

    pub fn with_damage_multiplier(mut self, percent: i32) -> Self {
        self.damage_multiplier = percent;
        self
    }

    /// True for the swing that may compute cleave targets and spawn multi-hits.
    pub fn is_root(&self) -> bool {
        !self
            .flags
            .intersects(AttemptFlags::CLEAVING | AttemptFlags::MULTIHIT | AttemptFlags::NEVER_CLEAVE)
    }
}

/// Transient record of one swing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackAttempt {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub kind: SwingKind,
    pub attack_number: usize,
    pub effective_attack_number: i32,

    // === Bound at setup ===
    pub weapon: Option<Weapon>,
    pub attack_type: AttackType,
    pub flavour: Flavour,
    pub damage_type: DamageType,
    pub brand: Brand,
    /// Weapon damage, unarmed damage, or the species attack's damage.
    pub base_damage: i32,
    pub flags: AttemptFlags,
    pub manoeuvre: Manoeuvre,
    /// Attacker's cell when the swing started.
    pub attack_position: Position,
    /// Extra damage percentage.
    pub damage_multiplier: i32,
    pub flat_damage_bonus: i32,
    pub charge_pow: i32,

    // === Computed by later phases ===
    pub to_hit: i32,
    pub ev_margin: i32,
    pub damage_done: i32,
    pub special_damage: i32,
    /// Stab divisor: 0 for no stab, 1 for a helpless target, higher for
    /// merely distracted ones.
    pub stab_bonus: i32,
}

impl AttackAttempt {
    pub fn new(sub: &SubAttack, attack_position: Position) -> Self {
        Self {
            attacker: sub.attacker,
            defender: sub.defender,
            kind: sub.kind,
            attack_number: sub.attack_number,
            effective_attack_number: sub.effective_attack_number,
            weapon: None,
            attack_type: AttackType::Hit,
            flavour: Flavour::Plain,
            damage_type: DamageType::CRUSHING,
            brand: Brand::None,
            base_damage: 0,
            flags: sub.flags,
            manoeuvre: Manoeuvre::None,
            attack_position,
            damage_multiplier: sub.damage_multiplier,
            flat_damage_bonus: 0,
            charge_pow: sub.charge_pow,
            to_hit: 0,
            ev_margin: 0,
            damage_done: 0,
            special_damage: 0,
            stab_bonus: 0,
        }
    }

    pub fn is_riposte(&self) -> bool {
        self.flags.contains(AttemptFlags::RIPOSTE)
    }

    pub fn is_root(&self) -> bool {
        !self
            .flags
            .intersects(AttemptFlags::CLEAVING | AttemptFlags::MULTIHIT | AttemptFlags::NEVER_CLEAVE)
    }

    pub fn is_cleaving(&self) -> bool {
        self.flags.contains(AttemptFlags::CLEAVING)
    }

    pub fn is_projected(&self) -> bool {
        self.flags.contains(AttemptFlags::PROJECTED)
    }

    pub fn auto_hits(&self) -> bool {
        self.flags.contains(AttemptFlags::AUTO_HIT)
    }

    pub fn occurred(&self) -> bool {
        self.flags.contains(AttemptFlags::ATTACK_OCCURRED)
    }

    pub fn cancelled(&self) -> bool {
        self.flags.contains(AttemptFlags::CANCELLED)
    }

    pub fn stabbed(&self) -> bool {
        self.flags.contains(AttemptFlags::STAB)
    }

    /// Follow-up swing against another defender that keeps this swing's
    /// attack slot.
    pub fn follow_up(&self, defender: EntityId, flags: AttemptFlags, kind: SwingKind) -> SubAttack {
        SubAttack {
            attacker: self.attacker,
            defender,
            attack_number: self.attack_number,
            effective_attack_number: self.effective_attack_number,
            flags: self.flags.inherited() | flags,
            kind,
            charge_pow: 0,
            damage_multiplier: 0,
        }
    }
}

/// Why a swing stopped before the end phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Never got going: unreachable, fumbled, flinched, or no attack in the slot.
    Declined,
    /// The confirmation prompt was refused.
    Cancelled,
    DefenderKilled,
    AttackerKilled,
    /// Blocked by divine intervention.
    Vetoed,
    /// Damage was soaked up entirely (slime shroud).
    Absorbed,
}

/// Result of a phase: the state to hand on, or the reason to stop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhaseOutcome<T> {
    Continue(T),
    End(Termination),
}

impl<T> PhaseOutcome<T> {
    pub fn is_end(&self) -> bool {
        matches!(self, PhaseOutcome::End(_))
    }
}
