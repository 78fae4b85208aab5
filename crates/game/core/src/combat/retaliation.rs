//! Damage and conditions a defender inflicts back on its attacker.
//!
//! These functions only roll and describe; the resolver applies the harm and
//! records it so kills are attributed to the defender.

use super::aux::AUX_ATTACKS;
use super::damage::{FinalModifiers, apply_ac, aux_damage, effective_ac};
use super::effects::{be, inflict_confusion, inflict_corrosion, resist_adjust};
use crate::config::CombatPolicy;
use crate::env::{Dice, SpeciesFlags};
use crate::state::{ActorState, Cloud, CloudKind, Element, MutationKind, StatusKind};

/// Harm a defender deals to its attacker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reaction {
    pub name: &'static str,
    pub damage: i32,
    pub message: String,
}

impl Reaction {
    fn new(name: &'static str, damage: i32, message: String) -> Self {
        Self {
            name,
            damage,
            message,
        }
    }
}

/// Spines on the defender prick an adjacent attacker.
///
/// # Formula
///
/// ```text
/// player:  coinflip, random_range(mut, div_rand_round(xl*2, 3) + mut*3), AC
/// monster: cactus always, otherwise 1 in 3, roll_dice(1, spines), AC
/// ```
pub fn spines(dice: &mut Dice<'_>, attacker: &ActorState, defender: &ActorState) -> Option<Reaction> {
    let raw = if let Some(traits) = defender.player_traits() {
        let level = i32::from(traits.mutation(MutationKind::Spiny));
        if level == 0 || !dice.coinflip() {
            return None;
        }
        let high = dice.div_rand_round(traits.xl * 2, 3) + level * 3;
        dice.random_range(level, high)
    } else {
        let spines = defender.monster_traits().map_or(0, |m| m.spines);
        if !defender.has_flag(SpeciesFlags::SPINY) || spines <= 0 {
            return None;
        }
        if !defender.has_flag(SpeciesFlags::CACTUS) && !dice.one_chance_in(3) {
            return None;
        }
        dice.roll_dice(1, spines)
    };

    let damage = apply_ac(dice, raw, raw, effective_ac(attacker), attacker.gdr);
    if damage <= 0 {
        return None;
    }
    Some(Reaction::new(
        "spines",
        damage,
        format!("{} {} struck by {} spines.", attacker.subject(), be(attacker), defender.possessive()),
    ))
}

/// Minotaurs headbutt attackers that miss them, 2 in 5.
pub fn minotaur_headbutt(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
) -> Option<Reaction> {
    if !defender.has_flag(SpeciesFlags::MINOTAUR)
        || !defender.position.is_adjacent(attacker.position)
        || !dice.x_chance_in_y(2, 5)
    {
        return None;
    }
    let raw = dice.random2(21);
    let damage = apply_ac(dice, raw, 20, effective_ac(attacker), attacker.gdr);
    Some(Reaction::new(
        "headbutt",
        damage,
        format!("{} {} {}!", defender.subject(), defender.conj("headbutt"), attacker.object()),
    ))
}

/// A player with horns reflexively headbutts a missing attacker,
/// `(23 + xl)%` of the time, through the aux damage chain.
pub fn reflexive_headbutt(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
    policy: &CombatPolicy,
) -> Option<Reaction> {
    let traits = defender.player_traits()?;
    if traits.mutation(MutationKind::ReflexiveHeadbutt) == 0
        || !defender.position.is_adjacent(attacker.position)
        || !dice.x_chance_in_y(23 + traits.xl, 100)
    {
        return None;
    }
    let headbutt = AUX_ATTACKS.iter().find(|a| a.name == "headbutt")?;
    let base = headbutt.roll_base(dice, traits);
    let neutral = FinalModifiers::default();
    let damage = aux_damage(dice, defender, attacker, base, false, neutral, policy);
    Some(Reaction::new(
        "headbutt",
        damage,
        format!("You reflexively headbutt {}.", attacker.object()),
    ))
}

/// Cold aura of the passive-freeze mutation: `random2(11)`, resisted.
pub fn passive_freeze(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
) -> Option<Reaction> {
    if defender.mutation(MutationKind::PassiveFreeze) == 0
        || !defender.position.is_adjacent(attacker.position)
    {
        return None;
    }
    let raw = dice.random2(11);
    let damage = resist_adjust(raw, attacker.res(Element::Cold));
    (damage > 0).then(|| {
        Reaction::new(
            "freeze",
            damage,
            format!("{} {} very cold.", attacker.subject(), be(attacker)),
        )
    })
}

/// Fiery armour scorches adjacent attackers: `random_range(3, 10)` per level,
/// resisted.
pub fn fiery_armour(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
) -> Option<Reaction> {
    let status = defender.statuses.get(StatusKind::FieryArmour)?;
    if !defender.position.is_adjacent(attacker.position) {
        return None;
    }
    let level = i32::from(status.potency).max(1);
    let raw = dice.random_range(3, 10) * level;
    let damage = resist_adjust(raw, attacker.res(Element::Fire));
    (damage > 0).then(|| {
        Reaction::new(
            "fiery armour",
            damage,
            format!("{} {} burned by {} armour.", attacker.subject(), be(attacker), defender.possessive()),
        )
    })
}

/// Foul stench: a miasma cloud on the attacker's cell, `level in 3`.
pub fn foul_stench(dice: &mut Dice<'_>, attacker: &ActorState, defender: &ActorState) -> Option<Cloud> {
    let level = i32::from(defender.mutation(MutationKind::FoulStench));
    if level == 0 || !dice.x_chance_in_y(level, 3) {
        return None;
    }
    let duration = 3 + dice.random2(3);
    Some(Cloud {
        kind: CloudKind::Miasma,
        duration: duration as u16,
        source: Some(defender.id),
    })
    .filter(|_| attacker.is_alive())
}

/// Acid splashes an adjacent attacker that just hit: `1d5` resisted, and a
/// 1 in 5 chance to corrode.
pub fn acid_splash(
    dice: &mut Dice<'_>,
    attacker: &mut ActorState,
    defender: &ActorState,
    riposte: bool,
) -> Option<Reaction> {
    if !defender.has_flag(SpeciesFlags::ACID_SPLASH)
        || riposte
        || !defender.position.is_adjacent(attacker.position)
        || attacker.res(Element::Corrosion) >= 3
    {
        return None;
    }
    let raw = dice.roll_dice(1, 5);
    let damage = resist_adjust(raw, attacker.res(Element::Acid));
    if dice.one_chance_in(5) {
        inflict_corrosion(attacker, defender.id);
    }
    Some(Reaction::new(
        "acid",
        damage,
        format!("{} {} splashed by {} acid.", attacker.subject(), be(attacker), defender.possessive()),
    ))
}

/// Eyeballs on a struck player confuse the attacker, `level in 10`.
pub fn eyeballs(dice: &mut Dice<'_>, attacker: &mut ActorState, defender: &ActorState) -> Option<String> {
    let level = i32::from(defender.mutation(MutationKind::Eyeballs));
    if level == 0 || !dice.x_chance_in_y(level, 10) {
        return None;
    }
    let duration = 1 + dice.random2(3);
    inflict_confusion(attacker, duration, defender.id);
    Some(format!("The eyeballs on your body gaze at {}.", attacker.object()))
}

/// Tendrils on a struck player pull the weapon out of the attacker's hands,
/// 1 in 12.
pub fn tendrils(dice: &mut Dice<'_>, attacker: &mut ActorState, defender: &ActorState) -> Option<String> {
    if defender.mutation(MutationKind::Tendrils) == 0 || attacker.weapon.is_none() {
        return None;
    }
    if !dice.one_chance_in(12) {
        return None;
    }
    let weapon = attacker.weapon.take()?;
    Some(format!("Your tendrils lash around {} {} and pull it to the ground!", attacker.possessive(), weapon.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{RngOracle, SpeciesDef, SpeciesId, stream};
    use crate::state::{EntityId, PlayerTraits, Position, Skill, Weapon};
    use crate::combat::DamageType;

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn orc() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(5), "orc", 3);
        ActorState::monster(EntityId(1), &def, Position::new(1, 0))
    }

    fn cactus() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(30), "cactus giant", 8)
            .with_flags(SpeciesFlags::SPINY | SpeciesFlags::CACTUS)
            .with_spines(10);
        ActorState::monster(EntityId(2), &def, Position::new(1, 0))
    }

    fn player() -> ActorState {
        mutant(MutationKind::Spiny, 0)
    }

    fn mutant(kind: MutationKind, level: u8) -> ActorState {
        let traits = PlayerTraits::new(9, 10, 10).with_mutation(kind, level);
        ActorState::player("Ada", Position::ORIGIN, traits)
    }

    #[test]
    fn cactus_spines_always_fire() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let reaction = spines(&mut dice, &player(), &cactus());
        assert_eq!(reaction.map(|r| r.damage), Some(10));
    }

    #[test]
    fn ordinary_monsters_have_no_spines() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert!(spines(&mut dice, &player(), &orc()).is_none());
    }

    #[test]
    fn player_spines_need_a_coinflip() {
        let spiky = mutant(MutationKind::Spiny, 2);

        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert!(spines(&mut dice, &orc(), &spiky).is_none());

        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        // random_range(2, 6 + 6) at minimum roll
        assert_eq!(spines(&mut dice, &orc(), &spiky).map(|r| r.damage), Some(2));
    }

    #[test]
    fn passive_freeze_is_resisted() {
        let cold = mutant(MutationKind::PassiveFreeze, 1);
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(passive_freeze(&mut dice, &orc(), &cold).map(|r| r.damage), Some(10));
        let resistant = orc().with_resist(Element::Cold, 3);
        assert!(passive_freeze(&mut dice, &resistant, &cold).is_none());
    }

    #[test]
    fn tendrils_disarm() {
        let grabby = mutant(MutationKind::Tendrils, 1);
        let mut armed = orc().with_weapon(Weapon::new("club", 5, Skill::MacesFlails, DamageType::CRUSHING));
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert!(tendrils(&mut dice, &mut armed, &grabby).is_some());
        assert!(armed.weapon.is_none());
    }
}
