//! Default weapon brand handlers.
//!
//! Each handler receives the damage the blow dealt and returns the extra
//! damage the brand adds. Statuses are applied in place.

use super::effects::{
    EffectContext, FlavourOutcome, afflict, be, inflict_confusion, inflict_corrosion,
    inflict_drain, inflict_poison, look, resist_adjust,
};
use crate::state::{Element, StatusKind};

fn elemental(
    ctx: &mut EffectContext<'_, '_>,
    element: Element,
    verb: &str,
) -> FlavourOutcome {
    let raw = ctx.dice.random2(ctx.damage) / 2 + 1;
    let damage = resist_adjust(raw, ctx.defender.res(element));
    if damage <= 0 {
        return FlavourOutcome::nothing();
    }
    FlavourOutcome::damage(
        damage,
        format!("{} {} {verb}.", ctx.defender.subject(), be(ctx.defender)),
    )
}

pub(super) fn flaming(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    elemental(ctx, Element::Fire, "burned")
}

pub(super) fn freezing(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    elemental(ctx, Element::Cold, "frozen")
}

pub(super) fn holy_wrath(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.defender.holiness.is_unholy() {
        return FlavourOutcome::nothing();
    }
    let damage = 1 + ctx.dice.random2(ctx.damage * 15 / 10);
    FlavourOutcome::damage(
        damage,
        format!("{} {} seared.", ctx.defender.subject(), be(ctx.defender)),
    )
}

pub(super) fn electrocution(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.one_chance_in(4) {
        return FlavourOutcome::nothing();
    }
    let raw = 8 + ctx.dice.random2(13);
    let damage = resist_adjust(raw, ctx.defender.res(Element::Elec));
    if damage <= 0 {
        return FlavourOutcome::nothing();
    }
    FlavourOutcome::damage(damage, "There is a sudden explosion of sparks!")
}

pub(super) fn venom(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.x_chance_in_y(3, 4) {
        return FlavourOutcome::nothing();
    }
    let amount = 6 + ctx.dice.random2(8) + ctx.dice.random2(ctx.damage * 3 / 2);
    if inflict_poison(ctx.defender, amount, ctx.attacker.id) {
        FlavourOutcome::message(format!(
            "{} {} poisoned.",
            ctx.defender.subject(),
            be(ctx.defender)
        ))
    } else {
        FlavourOutcome::nothing()
    }
}

pub(super) fn draining(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if ctx.defender.res(Element::Negative) >= 3 || !ctx.dice.x_chance_in_y(2, 3) {
        return FlavourOutcome::nothing();
    }
    let damage = ctx.dice.random2(ctx.damage) / 2 + 1;
    if !inflict_drain(ctx.defender, damage, ctx.attacker.id) {
        return FlavourOutcome::nothing();
    }
    FlavourOutcome::damage(
        damage,
        format!("{} {} drained.", ctx.defender.subject(), be(ctx.defender)),
    )
}

pub(super) fn vampirism(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.defender.holiness.is_natural() || ctx.dice.x_chance_in_y(2, 5) {
        return FlavourOutcome::nothing();
    }
    let amount = 1 + ctx.dice.random2(ctx.damage);
    if ctx.attacker.heal(amount) <= 0 {
        return FlavourOutcome::nothing();
    }
    FlavourOutcome::message(format!(
        "{} {} better.",
        ctx.attacker.subject(),
        look(ctx.attacker)
    ))
}

pub(super) fn confuse(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.one_chance_in(3) {
        return FlavourOutcome::nothing();
    }
    let hd = ctx.hit_dice();
    let duration = 1 + ctx.dice.random2(3 + hd);
    inflict_confusion(ctx.defender, duration, ctx.attacker.id);
    FlavourOutcome::message(format!(
        "{} {} confused.",
        ctx.defender.subject(),
        look(ctx.defender)
    ))
}

pub(super) fn antimagic(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    let turns = ctx.damage * 8 / 10;
    if turns > 0 {
        afflict(ctx.defender, StatusKind::Antimagic, turns, ctx.attacker.id);
    }
    FlavourOutcome::nothing()
}

pub(super) fn acid(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.x_chance_in_y(2, 3) {
        return FlavourOutcome::nothing();
    }
    inflict_corrosion(ctx.defender, ctx.attacker.id);
    FlavourOutcome::message(format!(
        "{} {} corroded.",
        ctx.defender.subject(),
        be(ctx.defender)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Brand, EffectRegistry};
    use crate::env::{Dice, Holiness, RngOracle, SpeciesDef, SpeciesId, stream};
    use crate::state::{ActorState, EntityId, PlayerTraits, Position};

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn player() -> ActorState {
        ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(6, 12, 12))
    }

    fn zombie() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(4), "zombie", 4).with_holiness(Holiness::UNDEAD);
        ActorState::monster(EntityId(3), &def, Position::new(1, 0))
    }

    #[test]
    fn flaming_halves_the_roll_and_respects_resistance() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let registry = EffectRegistry::default();
        let mut attacker = player();
        let mut defender = zombie();
        let mut ctx = EffectContext {
            attacker: &mut attacker,
            defender: &mut defender,
            damage: 10,
            dice: &mut dice,
        };
        assert_eq!(registry.apply_brand(Brand::Flaming, &mut ctx).special_damage, 5);

        ctx.defender.resists.set(Element::Fire, 1);
        assert_eq!(registry.apply_brand(Brand::Flaming, &mut ctx).special_damage, 2);
    }

    #[test]
    fn holy_wrath_only_burns_the_unholy() {
        let rng = FixedRng(0);
        let registry = EffectRegistry::default();
        let mut attacker = player();

        let mut undead = zombie();
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let mut ctx = EffectContext {
            attacker: &mut attacker,
            defender: &mut undead,
            damage: 8,
            dice: &mut dice,
        };
        assert_eq!(registry.apply_brand(Brand::HolyWrath, &mut ctx).special_damage, 1);

        let mut living = zombie();
        living.holiness = Holiness::NATURAL;
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let mut ctx = EffectContext {
            attacker: &mut attacker,
            defender: &mut living,
            damage: 8,
            dice: &mut dice,
        };
        assert_eq!(registry.apply_brand(Brand::HolyWrath, &mut ctx).special_damage, 0);
    }

    #[test]
    fn venom_poisons_on_success() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let registry = EffectRegistry::default();
        let mut attacker = player();
        let mut defender = zombie();
        let mut ctx = EffectContext {
            attacker: &mut attacker,
            defender: &mut defender,
            damage: 4,
            dice: &mut dice,
        };
        registry.apply_brand(Brand::Venom, &mut ctx);
        assert_eq!(defender.statuses.potency(StatusKind::Poisoned), 6);
    }

    #[test]
    fn chaos_rerolls_into_a_concrete_brand() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let registry = EffectRegistry::default();
        let mut attacker = player();
        let mut defender = zombie();
        let mut ctx = EffectContext {
            attacker: &mut attacker,
            defender: &mut defender,
            damage: 10,
            dice: &mut dice,
        };
        // First choice is flaming; min rolls give 0 / 2 + 1.
        let outcome = registry.apply_brand(Brand::Chaos, &mut ctx);
        assert_eq!(outcome.special_damage, 1);
        assert_eq!(outcome.message.as_deref(), Some("The zombie is burned."));
    }
}
