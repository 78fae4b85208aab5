//! Read-only monster species database.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::combat::{AttackType, Flavour};

/// Identifier of a species entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesId(pub u16);

/// Species lookup used by the attack resolver and content loaders.
pub trait SpeciesOracle: Send + Sync {
    fn species(&self, id: SpeciesId) -> Option<&SpeciesDef>;
}

/// Maximum number of natural attacks a species can have.
pub const MAX_SPECIES_ATTACKS: usize = 4;

/// Immutable description of a monster species.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesDef {
    pub id: SpeciesId,
    pub name: String,
    pub hd: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub ev: i32,
    pub intelligence: Intelligence,
    pub holiness: Holiness,
    pub size: SizeClass,
    pub attacks: ArrayVec<MonsterAttack, MAX_SPECIES_ATTACKS>,
    pub flags: SpeciesFlags,
    /// Base damage of retaliatory spines, if the species has them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spines: i32,
    /// Starting head count; hydras have more than one.
    #[cfg_attr(feature = "serde", serde(default = "default_heads"))]
    pub heads: u8,
}

#[cfg(feature = "serde")]
fn default_heads() -> u8 {
    1
}

impl SpeciesDef {
    pub fn new(id: SpeciesId, name: impl Into<String>, hd: i32) -> Self {
        Self {
            id,
            name: name.into(),
            hd,
            max_hp: hd * 5,
            ac: 0,
            ev: 0,
            intelligence: Intelligence::Animal,
            holiness: Holiness::NATURAL,
            size: SizeClass::Medium,
            attacks: ArrayVec::new(),
            flags: SpeciesFlags::empty(),
            spines: 0,
            heads: 1,
        }
    }

    /// Appends an attack; extra attacks beyond the table capacity are ignored.
    pub fn with_attack(mut self, kind: AttackType, flavour: Flavour, damage: i32) -> Self {
        let _ = self.attacks.try_push(MonsterAttack {
            kind,
            flavour,
            damage,
        });
        self
    }

    pub fn with_flags(mut self, flags: SpeciesFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_defences(mut self, max_hp: i32, ac: i32, ev: i32) -> Self {
        self.max_hp = max_hp;
        self.ac = ac;
        self.ev = ev;
        self
    }

    pub fn with_holiness(mut self, holiness: Holiness) -> Self {
        self.holiness = holiness;
        self
    }

    pub fn with_size(mut self, size: SizeClass) -> Self {
        self.size = size;
        self
    }

    pub fn with_intelligence(mut self, intelligence: Intelligence) -> Self {
        self.intelligence = intelligence;
        self
    }

    pub fn with_heads(mut self, heads: u8) -> Self {
        self.heads = heads;
        self
    }

    pub fn with_spines(mut self, spines: i32) -> Self {
        self.spines = spines;
        self
    }

    /// Attack at `index`, or `None` past the end of the table.
    pub fn attack(&self, index: usize) -> Option<MonsterAttack> {
        self.attacks.get(index).copied()
    }
}

/// One natural attack of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterAttack {
    pub kind: AttackType,
    pub flavour: Flavour,
    pub damage: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Intelligence {
    Brainless,
    #[default]
    Animal,
    Human,
}

impl Intelligence {
    pub fn rank(self) -> i32 {
        match self {
            Intelligence::Brainless => 0,
            Intelligence::Animal => 1,
            Intelligence::Human => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeClass {
    Tiny,
    Little,
    Small,
    #[default]
    Medium,
    Large,
    Big,
    Giant,
}

impl SizeClass {
    pub fn rank(self) -> i32 {
        self as i32
    }
}

bitflags! {
    /// Biological category of a creature.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Holiness: u8 {
        const NATURAL   = 1 << 0;
        const UNDEAD    = 1 << 1;
        const DEMONIC   = 1 << 2;
        const NONLIVING = 1 << 3;
        const HOLY      = 1 << 4;
        const PLANT     = 1 << 5;
    }
}

impl Default for Holiness {
    fn default() -> Self {
        Self::NATURAL
    }
}

impl Holiness {
    pub fn is_natural(self) -> bool {
        self.contains(Self::NATURAL)
    }

    /// Susceptible to blood drain and weakening.
    pub fn is_living(self) -> bool {
        !self.intersects(Self::UNDEAD | Self::NONLIVING)
    }

    pub fn is_unholy(self) -> bool {
        self.intersects(Self::UNDEAD | Self::DEMONIC)
    }
}

bitflags! {
    /// Species traits that switch on special combat rules.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpeciesFlags: u32 {
        /// Multi-headed; loses heads to slicing blows and may regrow them.
        const HYDRA          = 1 << 0;
        /// Hydra with the higher head cap.
        const LERNAEAN       = 1 << 1;
        /// Hurts melee attackers with spines.
        const SPINY          = 1 << 2;
        /// Spines always trigger.
        const CACTUS         = 1 << 3;
        /// Headbutts attackers that miss it.
        const MINOTAUR       = 1 << 4;
        /// Splashes acid on anything that hits it.
        const ACID_SPLASH    = 1 << 5;
        /// Trained fighter; better to-hit.
        const FIGHTER        = 1 << 6;
        /// Explodes instead of attacking.
        const SELF_DESTRUCT  = 1 << 7;
        /// Never misses.
        const AUTO_HIT       = 1 << 8;
        const SEE_INVISIBLE  = 1 << 9;
        const AMPHIBIOUS     = 1 << 10;
        /// Shadow of the player; silent stabber.
        const PLAYER_SHADOW  = 1 << 11;
        /// Damaged by its own attacks.
        const BLAZEHEART     = 1 << 12;
        /// Winds down after a number of attacks.
        const CLOCKWORK      = 1 << 13;
        /// Immune to constriction.
        const UNCONSTRICTABLE = 1 << 14;
    }
}
