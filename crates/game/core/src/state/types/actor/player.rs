//! Player-only attributes: stats, skills, mutations and shapeshifted forms.

use strum::EnumCount;

use super::equipment::Skill;

/// Mutations that change how the player fights or reacts to being hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumCount)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationKind {
    // ========================================================================
    // Natural weapons (aux attacks)
    // ========================================================================
    Hooves,
    Talons,
    LegSpikes,
    Horns,
    Beak,
    Fangs,
    Tail,
    ConstrictingTail,
    Stinger,
    WeakStinger,
    ArmouredTail,
    DemonicTouch,
    Claws,
    BladeHands,
    Pseudopods,
    Tentacles,
    TentacleArms,
    AntimagicBite,
    AcidicBite,

    // ========================================================================
    // Reactive
    // ========================================================================
    Spiny,
    ReflexiveHeadbutt,
    PassiveFreeze,
    FoulStench,
    SlimeShroud,
    Eyeballs,
    Tendrils,

    // ========================================================================
    // On-hit
    // ========================================================================
    BlackMark,
    EngulfingOoze,
    MarkOfExecution,
    Warmup,
}

/// Shapeshifted form of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Form {
    #[default]
    Normal,
    Vampire,
    Maw,
    Statue,
    Death,
    Flux,
    Serpent,
}

/// Player statistics consumed by the combat formulas.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerTraits {
    pub xl: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub skills: [i32; Skill::COUNT],
    /// Stealth score; higher is quieter.
    pub stealth: i32,
    /// Slaying bonus from rings and auras.
    pub slaying: i32,
    /// Encumbrance of body armour, used by stealth training.
    pub armour_mass: i32,
    pub mutations: [u8; MutationKind::COUNT],
    pub form: Form,
    pub form_level: i32,
    pub mp: i32,
    pub max_mp: i32,
    /// Warm-up meter for the warmup mutation, 0..=100.
    pub rev: i32,
    /// Felids cannot tail-slap.
    pub felid: bool,
    /// Accumulated stealth practice from sneaking past monsters.
    pub stealth_practice: u32,
}

impl PlayerTraits {
    pub const MAX_REV: i32 = 100;

    pub fn new(xl: i32, strength: i32, dexterity: i32) -> Self {
        Self {
            xl,
            strength,
            dexterity,
            skills: [0; Skill::COUNT],
            stealth: 100,
            slaying: 0,
            armour_mass: 0,
            mutations: [0; MutationKind::COUNT],
            form: Form::Normal,
            form_level: 0,
            mp: 0,
            max_mp: 0,
            rev: 0,
            felid: false,
            stealth_practice: 0,
        }
    }

    pub fn skill(&self, skill: Skill) -> i32 {
        self.skills[skill as usize]
    }

    pub fn set_skill(&mut self, skill: Skill, level: i32) {
        self.skills[skill as usize] = level;
    }

    pub fn with_skill(mut self, skill: Skill, level: i32) -> Self {
        self.set_skill(skill, level);
        self
    }

    pub fn mutation(&self, kind: MutationKind) -> u8 {
        self.mutations[kind as usize]
    }

    pub fn with_mutation(mut self, kind: MutationKind, level: u8) -> Self {
        self.mutations[kind as usize] = level;
        self
    }

    pub fn with_stealth(mut self, stealth: i32) -> Self {
        self.stealth = stealth;
        self
    }

    pub fn with_form(mut self, form: Form, level: i32) -> Self {
        self.form = form;
        self.form_level = level;
        self
    }

    /// Base unarmed damage before any rolls.
    pub fn unarmed_damage(&self) -> i32 {
        let mut damage = 3 + self.skill(Skill::UnarmedCombat);
        if self.mutation(MutationKind::Claws) > 0 {
            damage += i32::from(self.mutation(MutationKind::Claws)) * 2;
        }
        damage
    }
}
