//! Damage calculation for melee swings.
//!
//! Player and monster blows run through separate pipelines. Every step is a
//! small function so the aux attacks and retaliations can reuse the pieces
//! they share with ordinary swings.

use super::attempt::AttackAttempt;
use super::types::{Flavour, Manoeuvre};
use crate::config::CombatPolicy;
use crate::env::{Dice, SpeciesFlags};
use crate::state::{ActorState, Element, Form, MutationKind, PlayerTraits, Skill, StatusKind};

/// Base of the strength modifier.
const STAT_BASE: i32 = 39;
const WEAPON_SKILL_BASE: i32 = 2500;
const FIGHTING_BASE: i32 = 3000;
const AUX_FIGHTING_BASE: i32 = 4000;

// ============================================================================
// Shared steps
// ============================================================================

/// Scales damage by strength.
///
/// # Formula
///
/// ```text
/// dammod = 39
/// str > 10: dammod += random2(str - 9) * 2
/// str < 10: dammod -= random2(11 - str) * 2
/// dmg = dmg * dammod / 39
/// ```
pub fn stat_modify(dice: &mut Dice<'_>, damage: i32, strength: i32) -> i32 {
    let mut dammod = STAT_BASE;
    if strength > 10 {
        dammod += dice.random2(strength - 9) * 2;
    } else if strength < 10 {
        dammod -= dice.random2(11 - strength) * 2;
    }
    damage * dammod / STAT_BASE
}

/// `dmg * (2500 + random2(skill*100 + 1)) / 2500`
pub fn apply_weapon_skill(dice: &mut Dice<'_>, damage: i32, skill: i32) -> i32 {
    damage * (WEAPON_SKILL_BASE + dice.random2(skill * 100 + 1)) / WEAPON_SKILL_BASE
}

/// `dmg * (base + random2(fighting*100 + 1)) / base`, with a larger base for
/// aux attacks.
pub fn apply_fighting(dice: &mut Dice<'_>, damage: i32, fighting: i32, aux: bool) -> i32 {
    let base = if aux { AUX_FIGHTING_BASE } else { FIGHTING_BASE };
    damage * (base + dice.random2(fighting * 100 + 1)) / base
}

/// Might or berserk adds `1 + random2(10)`.
pub fn apply_misc(dice: &mut Dice<'_>, damage: i32, attacker: &ActorState) -> i32 {
    if attacker.has(StatusKind::Might) || attacker.has(StatusKind::Berserk) {
        damage + 1 + dice.random2(10)
    } else {
        damage
    }
}

/// Adds or removes a random share of an enchantment-like bonus.
///
/// # Formula
///
/// ```text
/// plus >= 0: dmg + random2(1 + plus)
/// plus <  0: dmg - random2(1 - plus)
/// ```
pub fn apply_slaying(dice: &mut Dice<'_>, damage: i32, plus: i32) -> i32 {
    if plus >= 0 {
        damage + dice.random2(1 + plus)
    } else {
        damage - dice.random2(1 - plus)
    }
}

/// Soft cap used by the stab bonus: linear to 10, half slope to 30.
pub fn stepdown(value: i32) -> i32 {
    if value <= 10 {
        value
    } else {
        (10 + (value - 10) / 2).min(30)
    }
}

/// Armour after corrosion.
pub fn effective_ac(actor: &ActorState) -> i32 {
    (actor.ac - i32::from(actor.statuses.potency(StatusKind::Corroded))).max(0)
}

/// Reduces damage by armour.
///
/// # Formula
///
/// ```text
/// saved = random2(1 + ac)
/// gdr   = min(max_damage * gdr% / 100, ac / 2)
/// dmg   = max(dmg - max(saved, gdr), 0)
/// ```
pub fn apply_ac(dice: &mut Dice<'_>, damage: i32, max_damage: i32, ac: i32, gdr: i32) -> i32 {
    if ac <= 0 {
        return damage.max(0);
    }
    let saved = dice.random2(1 + ac);
    let guaranteed = (max_damage * gdr / 100).min(ac / 2);
    (damage - saved.max(guaranteed)).max(0)
}

/// Punctuation appended to a hit message by damage dealt.
pub fn attack_strength_punctuation(damage: i32) -> &'static str {
    match damage {
        d if d >= 20 => "!!!",
        d if d >= 10 => "!!",
        d if d >= 5 => "!",
        _ => ".",
    }
}

// ============================================================================
// Player pipeline
// ============================================================================

fn training(attempt: &AttackAttempt) -> Skill {
    attempt
        .weapon
        .as_ref()
        .map_or(Skill::UnarmedCombat, |w| w.skill)
}

/// Extra damage of a stab, scaled by weapon and stealth skill.
///
/// # Formula
///
/// ```text
/// stab_skill = weapon_skill*50 + stealth*50
/// good stab (bonus 1):
///     dmg += stepdown(dex * (stab_skill + 100) / (short blade ? 500 : 1000))
///     dmg  = dmg * (10 + div_rand_round(stab_skill, 100*bonus)) / 10
/// dmg = dmg * (12 + div_rand_round(stab_skill, 100*bonus)) / 12
/// dmg += random2(div_rand_round(stab_skill, 200*bonus))
/// ```
pub fn stab_weapon_bonus(
    dice: &mut Dice<'_>,
    damage: i32,
    traits: &PlayerTraits,
    skill: Skill,
    stab_bonus: i32,
) -> i32 {
    let bonus = stab_bonus.max(1);
    let stab_skill = traits.skill(skill) * 50 + traits.skill(Skill::Stealth) * 50;
    let mut damage = damage;

    if bonus == 1 {
        let divisor = if skill == Skill::ShortBlades { 500 } else { 1000 };
        damage += stepdown(traits.dexterity * (stab_skill + 100) / divisor);
        damage = damage * (10 + dice.div_rand_round(stab_skill, 100 * bonus)) / 10;
    }

    damage = damage * (12 + dice.div_rand_round(stab_skill, 100 * bonus)) / 12;
    let extra = dice.div_rand_round(stab_skill, 200 * bonus);
    damage + dice.random2(extra)
}

/// Swing-wide modifiers shared by a blow and the aux attacks it triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FinalModifiers {
    pub cleaving: bool,
    pub manoeuvre: Manoeuvre,
    /// Electric charge power; 0 when uncharged.
    pub charge_pow: i32,
    /// Extra damage percentage.
    pub damage_multiplier: i32,
}

impl FinalModifiers {
    pub fn of(attempt: &AttackAttempt) -> Self {
        Self {
            cleaving: attempt.is_cleaving(),
            manoeuvre: attempt.manoeuvre,
            charge_pow: attempt.charge_pow,
            damage_multiplier: attempt.damage_multiplier,
        }
    }
}

/// Multipliers on the pre-AC damage of player blows and aux attacks.
///
/// # Formula
///
/// ```text
/// cleave x70% -> martial -> charge +dmg*pow/150 (rElec <= 0)
///   -> weak x3/4 -> rev penalty -> dmg_mult% -> confusing touch (not aux)
/// ```
fn player_final_multipliers(
    dice: &mut Dice<'_>,
    damage: i32,
    attacker: &ActorState,
    defender: &ActorState,
    modifiers: FinalModifiers,
    policy: &CombatPolicy,
    aux: bool,
) -> i32 {
    let mut damage = damage;

    if modifiers.cleaving {
        damage = dice.div_rand_round(damage * policy.cleave_percent, 100);
    }

    let martial = match modifiers.manoeuvre {
        Manoeuvre::Momentum => Some(policy.momentum_percent),
        Manoeuvre::Lunge => Some(policy.lunge_percent),
        Manoeuvre::Whirlwind => Some(policy.whirlwind_percent),
        Manoeuvre::None | Manoeuvre::WallJump | Manoeuvre::TriggeredAux => None,
    };
    if let Some(percent) = martial {
        damage = dice.div_rand_round(damage * percent, 100);
    }

    if modifiers.charge_pow > 0 && defender.res(Element::Elec) <= 0 {
        damage += dice.div_rand_round(damage * modifiers.charge_pow, 150);
    }

    if attacker.has(StatusKind::Weak) {
        damage = dice.div_rand_round(damage * 3, 4);
    }

    let warming = attacker
        .player_traits()
        .filter(|traits| traits.mutation(MutationKind::Warmup) > 0);
    if let Some(traits) = warming {
        let rev = traits.rev.clamp(0, PlayerTraits::MAX_REV);
        damage = damage * (2 * PlayerTraits::MAX_REV + rev) / (3 * PlayerTraits::MAX_REV);
    }

    if modifiers.damage_multiplier != 0 {
        damage = damage * (100 + modifiers.damage_multiplier) / 100;
    }

    if !aux && attacker.has(StatusKind::ConfusingTouch) {
        return 0;
    }
    damage
}

fn post_ac(damage: i32, form: Form) -> i32 {
    match form {
        Form::Statue => damage * 3 / 2,
        Form::Flux => damage * 2 / 3,
        _ => damage,
    }
}

/// Slaying bonus net of the attacker's own corrosion.
fn player_slaying(attacker: &ActorState, traits: &PlayerTraits, weapon_plus: i32) -> i32 {
    weapon_plus + traits.slaying - i32::from(attacker.statuses.potency(StatusKind::Corroded))
}

/// Full player damage for a weapon or unarmed swing.
///
/// # Formula
///
/// ```text
/// potential -> stat_modify -> random2(+1) -> weapon skill -> fighting
///   -> misc -> slaying -> stab -> final multipliers -> AC -> post-AC
/// ```
pub fn player_melee_damage(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
    attempt: &AttackAttempt,
    policy: &CombatPolicy,
) -> i32 {
    let Some(traits) = attacker.player_traits() else {
        return 0;
    };

    let potential = attempt.base_damage;
    let mut damage = stat_modify(dice, potential, traits.strength);
    damage = dice.random2(damage + 1);

    let skill = training(attempt);
    damage = apply_weapon_skill(dice, damage, traits.skill(skill));
    damage = apply_fighting(dice, damage, traits.skill(Skill::Fighting), false);
    damage = apply_misc(dice, damage, attacker);

    let plus = attempt.weapon.as_ref().map_or(0, |w| w.plus);
    damage = apply_slaying(dice, damage, player_slaying(attacker, traits, plus));

    if attempt.stab_bonus > 0 {
        damage = stab_weapon_bonus(dice, damage.max(1), traits, skill, attempt.stab_bonus);
    }

    damage = player_final_multipliers(
        dice,
        damage,
        attacker,
        defender,
        FinalModifiers::of(attempt),
        policy,
        false,
    );
    damage = apply_ac(dice, damage, potential, effective_ac(defender), defender.gdr);
    post_ac(damage, traits.form).max(0)
}

/// Damage of a player aux attack. `ignores_ac` is set for constriction.
///
/// The aux attack shares the final multipliers of the swing that triggered
/// it, except that confusing touch leaves it intact.
pub fn aux_damage(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
    base: i32,
    ignores_ac: bool,
    modifiers: FinalModifiers,
    policy: &CombatPolicy,
) -> i32 {
    let Some(traits) = attacker.player_traits() else {
        return 0;
    };

    let mut damage = stat_modify(dice, base, traits.strength);
    damage = dice.random2(damage + 1);
    damage = apply_fighting(dice, damage, traits.skill(Skill::Fighting), true);
    damage = apply_misc(dice, damage, attacker);
    damage = apply_slaying(dice, damage, player_slaying(attacker, traits, 0));
    damage = player_final_multipliers(dice, damage, attacker, defender, modifiers, policy, true);
    if !ignores_ac {
        damage = apply_ac(dice, damage, base, effective_ac(defender), defender.gdr);
    }
    post_ac(damage, traits.form).max(0)
}

// ============================================================================
// Monster pipeline
// ============================================================================

/// Whether a monster's blow counts as a stab.
pub fn monster_stabs(defender: &ActorState, attempt: &AttackAttempt, defender_unseen: bool) -> bool {
    defender.is_asleep()
        || (defender_unseen && attempt.flavour == Flavour::ShadowStab)
}

/// Full monster damage for one natural attack.
///
/// # Formula
///
/// ```text
/// dmg  = weapon ? random2(weapon) + slaying : 0
/// dmg += 1 + random2(attack damage)
/// might/berserk x3/2, tempered x5/4, weak x2/3
/// stab x250%   (shadow good stab adds xl*2/3 first)
/// cleave x70%, dmg_mult%, flat bonus, AC
/// ```
pub fn monster_melee_damage(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
    attempt: &AttackAttempt,
    policy: &CombatPolicy,
    defender_unseen: bool,
) -> i32 {
    let mut damage = 0;
    if let Some(weapon) = &attempt.weapon {
        let roll = dice.random2(weapon.damage);
        damage = apply_slaying(dice, roll, weapon.plus);
    }
    let potential = damage + attempt.base_damage;
    damage += 1 + dice.random2(attempt.base_damage);

    if attacker.has(StatusKind::Might) || attacker.has(StatusKind::Berserk) {
        damage = damage * 3 / 2;
    }
    if attacker.has(StatusKind::Tempered) {
        damage = damage * 5 / 4;
    }
    if attacker.has(StatusKind::Weak) {
        damage = damage * 2 / 3;
    }

    if monster_stabs(defender, attempt, defender_unseen) {
        if attacker.has_flag(SpeciesFlags::PLAYER_SHADOW) && attempt.stabbed() {
            damage += attacker.hit_dice() * 2 / 3;
        }
        damage = damage * policy.monster_stab_percent / 100;
    }

    if attempt.is_cleaving() {
        damage = dice.div_rand_round(damage * policy.cleave_percent, 100);
    }
    if attempt.damage_multiplier != 0 {
        damage += damage * attempt.damage_multiplier / 100;
    }
    damage += attempt.flat_damage_bonus;

    apply_ac(dice, damage, potential, effective_ac(defender), defender.gdr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::attempt::SubAttack;
    use crate::combat::{AttackType, DamageType};
    use crate::env::{RngOracle, SpeciesDef, SpeciesId, stream};
    use crate::state::{EntityId, Position, StatusEffect, Weapon};

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn player(strength: i32) -> ActorState {
        ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(1, strength, 10))
    }

    fn dummy() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(2), "training dummy", 5);
        ActorState::monster(EntityId(1), &def, Position::new(1, 0))
    }

    fn attempt(base: i32) -> AttackAttempt {
        let sub = SubAttack::new(EntityId::PLAYER, EntityId(1), 0);
        let mut attempt = AttackAttempt::new(&sub, Position::ORIGIN);
        attempt.base_damage = base;
        attempt
    }

    #[test]
    fn strength_ten_is_neutral() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(stat_modify(&mut dice, 20, 10), 20);
        assert_eq!(dice.rolls(), 0);
        // str 15 at max roll: dammod = 39 + 5*2
        assert_eq!(stat_modify(&mut dice, 39, 15), 49);
    }

    #[test]
    fn armour_saves_at_least_the_guaranteed_share() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        // saved rolls 0, gdr = min(20*30/100, 10/2) = 5
        assert_eq!(apply_ac(&mut dice, 12, 20, 10, 30), 7);
        assert_eq!(apply_ac(&mut dice, 3, 20, 0, 30), 3);
    }

    #[test]
    fn corrosion_lowers_armour() {
        let mut target = dummy().with_defences(6, 0);
        target.statuses.add(StatusEffect::new(StatusKind::Corroded, 8).with_potency(4));
        assert_eq!(effective_ac(&target), 2);
        target.statuses.set_potency(StatusKind::Corroded, 9);
        assert_eq!(effective_ac(&target), 0);
    }

    #[test]
    fn unarmed_max_roll_against_bare_target() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let attacker = player(10);
        let base = attacker.player_traits().map_or(0, |p| p.unarmed_damage());
        let damage = player_melee_damage(
            &mut dice,
            &attacker,
            &dummy(),
            &attempt(base),
            &CombatPolicy::default(),
        );
        assert_eq!(damage, 3);
    }

    #[test]
    fn confusing_touch_zeroes_the_blow() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let attacker = player(10).with_status(StatusEffect::new(StatusKind::ConfusingTouch, 3));
        let mut swing = attempt(11);
        swing.weapon = Some(Weapon::new("axe", 11, Skill::Axes, DamageType::CHOPPING));
        let damage =
            player_melee_damage(&mut dice, &attacker, &dummy(), &swing, &CombatPolicy::default());
        assert_eq!(damage, 0);
    }

    #[test]
    fn confusing_touch_spares_aux_attacks() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let attacker = player(10).with_status(StatusEffect::new(StatusKind::ConfusingTouch, 3));
        let policy = CombatPolicy::default();
        let damage =
            aux_damage(&mut dice, &attacker, &dummy(), 3, false, FinalModifiers::default(), &policy);
        assert_eq!(damage, 3);
    }

    #[test]
    fn electric_charge_needs_an_unresisting_target() {
        let rng = FixedRng(u32::MAX);
        let policy = CombatPolicy::default();
        let attacker = player(10);
        let mut swing = attempt(3);
        swing.charge_pow = 100;

        // 3 + div_rand_round(3 * 100, 150)
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(player_melee_damage(&mut dice, &attacker, &dummy(), &swing, &policy), 5);

        let insulated = dummy().with_resist(Element::Elec, 1);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        assert_eq!(player_melee_damage(&mut dice, &attacker, &insulated, &swing, &policy), 3);
    }

    #[test]
    fn damage_multiplier_comes_after_weakness() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let attacker = player(10).with_status(StatusEffect::new(StatusKind::Weak, 3));
        let modifiers = FinalModifiers {
            damage_multiplier: 50,
            ..FinalModifiers::default()
        };
        // weak: 8 * 3 / 4 = 6, then 6 * 150 / 100
        let damage = player_final_multipliers(
            &mut dice,
            8,
            &attacker,
            &dummy(),
            modifiers,
            &CombatPolicy::default(),
            false,
        );
        assert_eq!(damage, 9);
    }

    #[test]
    fn martial_and_weak_steps_round_randomly() {
        // Low rolls round every remainder up.
        let rng = FixedRng(0);
        let policy = CombatPolicy::default();
        let momentum = FinalModifiers {
            manoeuvre: Manoeuvre::Momentum,
            ..FinalModifiers::default()
        };
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        // 3 * 140 / 100 = 4.2
        let damage =
            player_final_multipliers(&mut dice, 3, &player(10), &dummy(), momentum, &policy, false);
        assert_eq!(damage, 5);

        let weak = player(10).with_status(StatusEffect::new(StatusKind::Weak, 3));
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        // 5 * 3 / 4 = 3.75
        let damage = player_final_multipliers(
            &mut dice,
            5,
            &weak,
            &dummy(),
            FinalModifiers::default(),
            &policy,
            false,
        );
        assert_eq!(damage, 4);
    }

    #[test]
    fn monster_stab_on_sleeper() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let def = SpeciesDef::new(SpeciesId(5), "orc", 3).with_attack(
            AttackType::Hit,
            crate::combat::Flavour::Plain,
            8,
        );
        let orc = ActorState::monster(EntityId(2), &def, Position::new(1, 0));
        let mut sleeper = player(10);
        sleeper.behaviour = crate::state::Behaviour::Sleeping;
        let mut swing = attempt(8);
        swing.attacker = EntityId(2);
        // 1 + random2(8) = 8, x250% = 20
        let damage = monster_melee_damage(
            &mut dice,
            &orc,
            &sleeper,
            &swing,
            &CombatPolicy::default(),
            false,
        );
        assert_eq!(damage, 20);
    }

    #[test]
    fn punctuation_thresholds() {
        assert_eq!(attack_strength_punctuation(4), ".");
        assert_eq!(attack_strength_punctuation(5), "!");
        assert_eq!(attack_strength_punctuation(10), "!!");
        assert_eq!(attack_strength_punctuation(20), "!!!");
    }

    #[test]
    fn stepdown_softens_large_bonuses() {
        assert_eq!(stepdown(8), 8);
        assert_eq!(stepdown(20), 15);
        assert_eq!(stepdown(200), 30);
    }
}
