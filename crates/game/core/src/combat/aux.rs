//! Catalogue of player auxiliary unarmed attacks.
//!
//! Entries are plain data plus `fn` pointers, walked in catalogue order after
//! the player's main swing. Nothing here mutates; the resolver rolls and
//! applies the results.

use super::error::CombatError;
use crate::env::{Dice, Holiness};
use crate::state::{ActorState, Element, EntityId, Form, MutationKind, PlayerTraits, Skill, StatusKind};

use super::effects::{afflict, inflict_corrosion, inflict_poison, inflict_weakness};

/// Secondary effect of an aux attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuxBrand {
    None,
    Acid,
    Venom,
    Weakness,
    Vulnerability,
    Antimagic,
}

/// One catalogue entry.
#[derive(Clone, Copy)]
pub struct AuxAttack {
    pub name: &'static str,
    pub base_damage: i32,
    /// Percent chance to trigger when the entry is usable.
    pub chance: i32,
    /// Damage scales with experience level.
    pub xl_scaled: bool,
    /// Bypasses armour (constriction).
    pub ignores_ac: bool,
    /// Skips the damage pipeline (demonic touch).
    pub raw_damage: bool,
    pub usable: fn(&ActorState, &PlayerTraits) -> bool,
    pub damage: fn(&mut Dice<'_>, &PlayerTraits) -> i32,
    pub trigger: fn(&PlayerTraits) -> i32,
    pub verb: fn(&PlayerTraits) -> &'static str,
    pub brand: fn(&PlayerTraits) -> AuxBrand,
}

impl std::fmt::Debug for AuxAttack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuxAttack")
            .field("name", &self.name)
            .field("base_damage", &self.base_damage)
            .field("chance", &self.chance)
            .finish_non_exhaustive()
    }
}

impl AuxAttack {
    pub fn is_usable(&self, attacker: &ActorState) -> bool {
        attacker
            .player_traits()
            .is_some_and(|traits| (self.usable)(attacker, traits))
    }

    /// Trigger chance in percent.
    pub fn trigger_chance(&self, traits: &PlayerTraits) -> i32 {
        (self.trigger)(traits)
    }

    /// Pre-pipeline damage, scaled by experience level where the entry asks.
    ///
    /// # Formula
    ///
    /// ```text
    /// xl_scaled: dmg * (30 + xl) / 59
    /// ```
    pub fn roll_base(&self, dice: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
        let damage = (self.damage)(dice, traits);
        if self.xl_scaled {
            damage * (30 + traits.xl) / 59
        } else {
            damage
        }
    }

    pub fn verb_for(&self, traits: &PlayerTraits) -> &'static str {
        (self.verb)(traits)
    }

    pub fn brand_for(&self, traits: &PlayerTraits) -> AuxBrand {
        (self.brand)(traits)
    }

    pub fn is_constriction(&self) -> bool {
        self.ignores_ac
    }
}

/// Looks up an entry by position in [`AUX_ATTACKS`].
pub fn aux_attack(index: usize) -> Result<&'static AuxAttack, CombatError> {
    AUX_ATTACKS.get(index).ok_or(CombatError::AuxIndex(index))
}

fn mutation(traits: &PlayerTraits, kind: MutationKind) -> i32 {
    i32::from(traits.mutation(kind))
}

// ============================================================================
// Shared entry pieces
// ============================================================================

fn always(_: &PlayerTraits) -> i32 {
    100
}

fn never(_: &ActorState, _: &PlayerTraits) -> bool {
    false
}

fn no_brand(_: &PlayerTraits) -> AuxBrand {
    AuxBrand::None
}

fn fixed_damage<const N: i32>(_: &mut Dice<'_>, _: &PlayerTraits) -> i32 {
    N
}

fn fixed_chance<const N: i32>(_: &PlayerTraits) -> i32 {
    N
}

// ============================================================================
// Entries
// ============================================================================

fn constrict_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::ConstrictingTail) >= 2
        || mutation(traits, MutationKind::TentacleArms) > 0
        || traits.form == Form::Serpent
}

fn kick_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::Hooves) > 0
        || mutation(traits, MutationKind::Talons) > 0
        || mutation(traits, MutationKind::LegSpikes) > 0
}

fn kick_damage(_: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    let hooves = mutation(traits, MutationKind::Hooves);
    let talons = mutation(traits, MutationKind::Talons);
    if hooves > 0 {
        5 + hooves * 5 / 3
    } else if talons > 0 {
        5 + 1 + talons
    } else {
        5 + mutation(traits, MutationKind::LegSpikes)
    }
}

fn kick_verb(traits: &PlayerTraits) -> &'static str {
    if mutation(traits, MutationKind::Talons) > 0 {
        "claw"
    } else if mutation(traits, MutationKind::LegSpikes) > 0 {
        "pierce"
    } else {
        "kick"
    }
}

fn headbutt_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::Horns) > 0
}

fn headbutt_damage(_: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    5 + mutation(traits, MutationKind::Horns) * 3
}

fn peck_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::Beak) > 0
}

fn tailslap_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    let has_tail = mutation(traits, MutationKind::Tail) > 0
        || mutation(traits, MutationKind::Stinger) > 0
        || mutation(traits, MutationKind::WeakStinger) > 0
        || mutation(traits, MutationKind::ArmouredTail) > 0;
    has_tail
        && !traits.felid
        && mutation(traits, MutationKind::ConstrictingTail) == 0
        && traits.form != Form::Serpent
}

fn tailslap_damage(_: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    6 + (mutation(traits, MutationKind::Stinger) * 2 - 1).max(0)
        + mutation(traits, MutationKind::ArmouredTail) * 4
        + mutation(traits, MutationKind::WeakStinger)
}

fn tailslap_brand(traits: &PlayerTraits) -> AuxBrand {
    if mutation(traits, MutationKind::WeakStinger) == 3 {
        AuxBrand::Weakness
    } else if mutation(traits, MutationKind::Stinger) > 0 {
        AuxBrand::Venom
    } else {
        AuxBrand::None
    }
}

fn touch_usable(attacker: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::DemonicTouch) > 0 && attacker.has_usable_offhand()
}

fn touch_damage(dice: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    6 + dice.random2(mutation(traits, MutationKind::DemonicTouch) * 4 + 1)
}

fn touch_brand(traits: &PlayerTraits) -> AuxBrand {
    if mutation(traits, MutationKind::DemonicTouch) == 3 {
        AuxBrand::Vulnerability
    } else {
        AuxBrand::None
    }
}

fn punch_usable(attacker: &ActorState, traits: &PlayerTraits) -> bool {
    attacker.weapon.is_none()
        && attacker.has_usable_offhand()
        && mutation(traits, MutationKind::TentacleArms) == 0
}

fn punch_chance(traits: &PlayerTraits) -> i32 {
    5 + traits.skill(Skill::UnarmedCombat) * 5 / 3
}

fn punch_damage(dice: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    let mut damage = 5 + dice.div_rand_round(traits.skill(Skill::UnarmedCombat), 2);
    if mutation(traits, MutationKind::BladeHands) > 0 {
        damage += 6;
    }
    let claws = mutation(traits, MutationKind::Claws);
    if claws > 0 {
        damage += dice.roll_dice(claws, 3);
    }
    damage
}

fn punch_verb(traits: &PlayerTraits) -> &'static str {
    if mutation(traits, MutationKind::BladeHands) > 0 {
        "slash"
    } else if mutation(traits, MutationKind::Claws) > 0 {
        "claw"
    } else {
        "punch"
    }
}

fn bite_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::Fangs) > 0
        || mutation(traits, MutationKind::AntimagicBite) > 0
        || mutation(traits, MutationKind::AcidicBite) > 0
}

fn bite_chance(traits: &PlayerTraits) -> i32 {
    if mutation(traits, MutationKind::AntimagicBite) > 0 {
        100
    } else {
        40
    }
}

fn bite_damage(dice: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    let mut damage = 1 + mutation(traits, MutationKind::Fangs) * 2;
    if mutation(traits, MutationKind::AntimagicBite) > 0 {
        damage += dice.div_rand_round(traits.xl, 3);
    } else if mutation(traits, MutationKind::AcidicBite) > 0 {
        damage += dice.roll_dice(2, 4);
    }
    damage
}

fn bite_brand(traits: &PlayerTraits) -> AuxBrand {
    if mutation(traits, MutationKind::AntimagicBite) > 0 {
        AuxBrand::Antimagic
    } else if mutation(traits, MutationKind::AcidicBite) > 0 {
        AuxBrand::Acid
    } else {
        AuxBrand::None
    }
}

fn pseudopods_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::Pseudopods) > 0
}

fn pseudopods_damage(_: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    4 * mutation(traits, MutationKind::Pseudopods)
}

fn tentacles_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    mutation(traits, MutationKind::Tentacles) > 0
}

fn maw_usable(_: &ActorState, traits: &PlayerTraits) -> bool {
    traits.form == Form::Maw
}

fn maw_damage(_: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    6 + traits.form_level
}

fn blade_usable(attacker: &ActorState, _: &PlayerTraits) -> bool {
    attacker.has(StatusKind::Execution)
}

fn blade_damage(dice: &mut Dice<'_>, traits: &PlayerTraits) -> i32 {
    7 + dice.div_rand_round(traits.xl, 3)
}

macro_rules! verb {
    ($name:ident, $verb:literal) => {
        fn $name(_: &PlayerTraits) -> &'static str {
            $verb
        }
    };
}

verb!(grab, "grab");
verb!(headbutt, "headbutt");
verb!(peck, "peck");
verb!(tail_slap, "tail-slap");
verb!(touch, "touch");
verb!(bite, "bite");
verb!(bludgeon, "bludgeon");
verb!(squeeze, "squeeze");
verb!(shred, "shred");
verb!(shroompunch, "shroompunch");

/// Aux attacks in resolution order.
pub static AUX_ATTACKS: [AuxAttack; 13] = [
    AuxAttack {
        name: "grab",
        base_damage: 0,
        chance: 100,
        xl_scaled: false,
        ignores_ac: true,
        raw_damage: false,
        usable: constrict_usable,
        damage: fixed_damage::<0>,
        trigger: always,
        verb: grab,
        brand: no_brand,
    },
    AuxAttack {
        name: "kick",
        base_damage: 5,
        chance: 100,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: kick_usable,
        damage: kick_damage,
        trigger: always,
        verb: kick_verb,
        brand: no_brand,
    },
    AuxAttack {
        name: "headbutt",
        base_damage: 5,
        chance: 67,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: headbutt_usable,
        damage: headbutt_damage,
        trigger: fixed_chance::<67>,
        verb: headbutt,
        brand: no_brand,
    },
    AuxAttack {
        name: "peck",
        base_damage: 6,
        chance: 67,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: peck_usable,
        damage: fixed_damage::<6>,
        trigger: fixed_chance::<67>,
        verb: peck,
        brand: no_brand,
    },
    AuxAttack {
        name: "tail-slap",
        base_damage: 6,
        chance: 50,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: tailslap_usable,
        damage: tailslap_damage,
        trigger: fixed_chance::<50>,
        verb: tail_slap,
        brand: tailslap_brand,
    },
    AuxAttack {
        name: "touch",
        base_damage: 6,
        chance: 40,
        xl_scaled: false,
        ignores_ac: false,
        raw_damage: true,
        usable: touch_usable,
        damage: touch_damage,
        trigger: fixed_chance::<40>,
        verb: touch,
        brand: touch_brand,
    },
    AuxAttack {
        name: "punch",
        base_damage: 5,
        chance: 0,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: punch_usable,
        damage: punch_damage,
        trigger: punch_chance,
        verb: punch_verb,
        brand: no_brand,
    },
    AuxAttack {
        name: "bite",
        base_damage: 1,
        chance: 40,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: bite_usable,
        damage: bite_damage,
        trigger: bite_chance,
        verb: bite,
        brand: bite_brand,
    },
    AuxAttack {
        name: "pseudopods",
        base_damage: 4,
        chance: 67,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: pseudopods_usable,
        damage: pseudopods_damage,
        trigger: fixed_chance::<67>,
        verb: bludgeon,
        brand: no_brand,
    },
    AuxAttack {
        name: "squeeze",
        base_damage: 12,
        chance: 67,
        xl_scaled: true,
        ignores_ac: false,
        raw_damage: false,
        usable: tentacles_usable,
        damage: fixed_damage::<12>,
        trigger: fixed_chance::<67>,
        verb: squeeze,
        brand: no_brand,
    },
    AuxAttack {
        name: "bite",
        base_damage: 0,
        chance: 75,
        xl_scaled: false,
        ignores_ac: false,
        raw_damage: false,
        usable: maw_usable,
        damage: maw_damage,
        trigger: fixed_chance::<75>,
        verb: bite,
        brand: no_brand,
    },
    AuxAttack {
        name: "whirl of blades",
        base_damage: 1,
        chance: 100,
        xl_scaled: false,
        ignores_ac: false,
        raw_damage: false,
        usable: blade_usable,
        damage: blade_damage,
        trigger: always,
        verb: shred,
        brand: no_brand,
    },
    AuxAttack {
        name: "shroompunch",
        base_damage: 9,
        chance: 100,
        xl_scaled: false,
        ignores_ac: false,
        raw_damage: false,
        usable: never,
        damage: fixed_damage::<9>,
        trigger: always,
        verb: shroompunch,
        brand: no_brand,
    },
];

/// Applies an aux brand to the defender and returns the message, if any.
///
/// Acid corrodes unless a 1-in-3 roll saves; venom poisons on a coinflip;
/// weakness skips the undead and nonliving; vulnerability lowers willpower.
pub fn apply_aux_brand(
    dice: &mut Dice<'_>,
    brand: AuxBrand,
    attacker: EntityId,
    defender: &mut ActorState,
) -> Option<String> {
    match brand {
        AuxBrand::None => None,
        AuxBrand::Acid => {
            if dice.one_chance_in(3) || defender.res(Element::Corrosion) >= 3 {
                return None;
            }
            inflict_corrosion(defender, attacker);
            Some(format!("{} is corroded.", defender.subject()))
        }
        AuxBrand::Venom => {
            if !dice.coinflip() {
                return None;
            }
            let amount = 2 + dice.random2(4);
            inflict_poison(defender, amount, attacker)
                .then(|| format!("{} is poisoned.", defender.subject()))
        }
        AuxBrand::Weakness => {
            if defender
                .holiness
                .intersects(Holiness::UNDEAD | Holiness::NONLIVING)
            {
                return None;
            }
            inflict_weakness(defender, 6, attacker);
            Some(format!("{} looks weaker.", defender.subject()))
        }
        AuxBrand::Vulnerability => {
            let loss = dice.random_range(4, 8);
            defender.willpower = (defender.willpower - loss).max(0);
            Some(format!("{} willpower is stripped away.", defender.possessive_capitalised()))
        }
        AuxBrand::Antimagic => {
            let duration = 2 + dice.random2(4);
            afflict(defender, StatusKind::Antimagic, duration, attacker);
            None
        }
    }
}
