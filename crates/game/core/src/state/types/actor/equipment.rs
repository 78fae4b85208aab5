//! Wielded weapons and worn gear that change how an actor fights.

use bitflags::bitflags;

use crate::combat::{Brand, DamageType};

/// Skill trained by a weapon family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Skill {
    Fighting,
    ShortBlades,
    LongBlades,
    Axes,
    MacesFlails,
    Polearms,
    Staves,
    UnarmedCombat,
    Stealth,
}

/// A wielded weapon.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub name: String,
    pub damage: i32,
    /// Enchantment; adds to both accuracy and damage.
    pub plus: i32,
    /// Intrinsic accuracy of the weapon type.
    pub accuracy: i32,
    pub skill: Skill,
    pub damage_type: DamageType,
    pub brand: Brand,
    /// Maximum reach in cells; 1 for ordinary melee weapons.
    pub reach: u32,
    /// Attack delay in tenths of a normal turn.
    pub delay: i32,
    pub hits_per_swing: u8,
    /// Re-applies a random brand on every hit.
    pub chaotic: bool,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage: i32, skill: Skill, damage_type: DamageType) -> Self {
        Self {
            name: name.into(),
            damage,
            plus: 0,
            accuracy: 0,
            skill,
            damage_type,
            brand: Brand::None,
            reach: 1,
            delay: 10,
            hits_per_swing: 1,
            chaotic: false,
        }
    }

    pub fn with_plus(mut self, plus: i32) -> Self {
        self.plus = plus;
        self
    }

    pub fn with_brand(mut self, brand: Brand) -> Self {
        self.brand = brand;
        self
    }

    pub fn with_reach(mut self, reach: u32) -> Self {
        self.reach = reach;
        self
    }

    pub fn with_hits_per_swing(mut self, hits: u8) -> Self {
        self.hits_per_swing = hits.max(1);
        self
    }

    pub fn chaotic(mut self) -> Self {
        self.chaotic = true;
        self
    }

    /// Axes hit every enemy adjacent to the wielder.
    pub fn cleaves(&self) -> bool {
        self.skill == Skill::Axes
    }
}

bitflags! {
    /// Worn gear that grants combat reactions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct GearFlags: u16 {
        /// Counter-attack a missed or blocked melee attack.
        const RIPOSTE      = 1 << 0;
        /// Regain magic from damage dealt.
        const POWER_GLOVES = 1 << 1;
    }
}
