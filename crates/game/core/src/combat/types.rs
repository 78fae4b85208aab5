//! Tags shared by weapons, species attacks and the effect registry.

use bitflags::bitflags;

bitflags! {
    /// How a weapon or natural attack delivers its damage.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DamageType: u8 {
        const CRUSHING = 1 << 0;
        const SLICING  = 1 << 1;
        const PIERCING = 1 << 2;
        const CHOPPING = 1 << 3;
        const CLAWING  = 1 << 4;
    }
}

impl DamageType {
    /// Damage types able to sever a head.
    pub fn can_decapitate(self) -> bool {
        self.intersects(Self::SLICING | Self::CHOPPING | Self::CLAWING)
    }
}

/// Weapon brand applied after a damaging hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Brand {
    #[default]
    None,
    Flaming,
    Freezing,
    HolyWrath,
    Electrocution,
    Venom,
    Draining,
    Vampirism,
    Confuse,
    Antimagic,
    Acid,
    Chaos,
    Spectral,
}

impl Brand {
    /// Brands a chaos re-roll may pick.
    pub const CHAOS_CHOICES: [Brand; 7] = [
        Brand::Flaming,
        Brand::Freezing,
        Brand::Electrocution,
        Brand::Venom,
        Brand::Draining,
        Brand::Confuse,
        Brand::Vampirism,
    ];
}

/// Secondary effect carried by a species attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Flavour {
    #[default]
    Plain,
    Poison,
    StrongPoison,
    ReachSting,
    Fire,
    Cold,
    Elec,
    Drain,
    Vampiric,
    Confuse,
    Weakness,
    Antimagic,
    Acid,
    Paralyse,
    Storm,
    Chaos,
    Trample,
    Drag,
    Crush,
    Reach,
    ShadowStab,
}

impl Flavour {
    /// Flavours that extend melee reach to two cells.
    pub fn reaches(self) -> bool {
        matches!(self, Flavour::Reach | Flavour::ReachSting)
    }

    /// Flavours re-rolled by a chaotic attack.
    pub const CHAOS_CHOICES: [Flavour; 7] = [
        Flavour::Poison,
        Flavour::Fire,
        Flavour::Cold,
        Flavour::Elec,
        Flavour::Drain,
        Flavour::Confuse,
        Flavour::Vampiric,
    ];
}

/// Shape of a natural (or weapon) attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackType {
    None,
    #[default]
    Hit,
    Bite,
    Claw,
    Sting,
    Gore,
    Kick,
    Touch,
    Trample,
    Constrict,
    Headbutt,
    Peck,
    TailSlap,
}

impl AttackType {
    /// Third-person verb used in hit messages.
    pub fn verb(self) -> &'static str {
        match self {
            AttackType::None | AttackType::Hit => "hit",
            AttackType::Bite => "bite",
            AttackType::Claw => "claw",
            AttackType::Sting => "sting",
            AttackType::Gore => "gore",
            AttackType::Kick => "kick",
            AttackType::Touch => "touch",
            AttackType::Trample => "trample",
            AttackType::Constrict => "constrict",
            AttackType::Headbutt => "headbutt",
            AttackType::Peck => "peck",
            AttackType::TailSlap => "tail-slap",
        }
    }

    /// Damage type implied by the attack shape when no weapon is used.
    pub fn damage_type(self) -> DamageType {
        match self {
            AttackType::Claw => DamageType::CLAWING,
            AttackType::Bite | AttackType::Sting | AttackType::Gore | AttackType::Peck => {
                DamageType::PIERCING
            }
            _ => DamageType::CRUSHING,
        }
    }
}

/// Martial manoeuvre attached to a player swing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Manoeuvre {
    #[default]
    None,
    Momentum,
    Lunge,
    Whirlwind,
    WallJump,
    TriggeredAux,
}

impl Manoeuvre {
    pub fn is_martial(self) -> bool {
        !matches!(self, Manoeuvre::None)
    }

    /// Manoeuvres that suppress follow-up cleave swings.
    pub fn blocks_cleave(self) -> bool {
        matches!(
            self,
            Manoeuvre::Whirlwind | Manoeuvre::WallJump | Manoeuvre::TriggeredAux
        )
    }
}
