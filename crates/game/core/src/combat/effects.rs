//! Flavour and brand dispatch.
//!
//! Secondary effects of a hit are looked up by tag in an [`EffectRegistry`]
//! instead of being hard-wired into the resolver. The default registry knows
//! every flavour and brand the game ships with; callers may replace any entry
//! or add handlers for tags the default leaves empty.

use std::collections::HashMap;

use super::brand;
use super::types::{Brand, Flavour};
use crate::env::Dice;
use crate::state::{ActorState, Element, EntityId, StatusEffect, StatusKind};

/// What a secondary effect did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlavourOutcome {
    /// Extra damage the resolver inflicts on the defender.
    pub special_damage: i32,
    pub message: Option<String>,
}

impl FlavourOutcome {
    pub fn nothing() -> Self {
        Self::default()
    }

    pub fn damage(special_damage: i32, message: impl Into<String>) -> Self {
        Self {
            special_damage,
            message: Some(message.into()),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            special_damage: 0,
            message: Some(message.into()),
        }
    }
}

/// Inputs handed to an effect handler.
pub struct EffectContext<'a, 'r> {
    pub attacker: &'a mut ActorState,
    pub defender: &'a mut ActorState,
    /// Damage the triggering blow dealt.
    pub damage: i32,
    pub dice: &'a mut Dice<'r>,
}

impl EffectContext<'_, '_> {
    pub fn hit_dice(&self) -> i32 {
        self.attacker.hit_dice().max(1)
    }
}

pub type EffectHandler = fn(&mut EffectContext<'_, '_>) -> FlavourOutcome;

/// Tag → handler tables for monster attack flavours and weapon brands.
#[derive(Clone)]
pub struct EffectRegistry {
    flavours: HashMap<Flavour, EffectHandler>,
    brands: HashMap<Brand, EffectHandler>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("flavours", &self.flavours.keys().collect::<Vec<_>>())
            .field("brands", &self.brands.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EffectRegistry {
    /// Registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            flavours: HashMap::new(),
            brands: HashMap::new(),
        }
    }

    /// Installs a flavour handler, returning the one it replaced.
    pub fn register_flavour(
        &mut self,
        flavour: Flavour,
        handler: EffectHandler,
    ) -> Option<EffectHandler> {
        self.flavours.insert(flavour, handler)
    }

    /// Installs a brand handler, returning the one it replaced.
    pub fn register_brand(&mut self, brand: Brand, handler: EffectHandler) -> Option<EffectHandler> {
        self.brands.insert(brand, handler)
    }

    pub fn has_flavour(&self, flavour: Flavour) -> bool {
        self.flavours.contains_key(&flavour)
    }

    /// Runs the handler for a monster attack flavour.
    ///
    /// Without a dedicated handler, `Chaos` re-rolls one of
    /// [`Flavour::CHAOS_CHOICES`]. Unknown tags do nothing.
    pub fn apply_flavour(&self, flavour: Flavour, ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
        if let Some(handler) = self.flavours.get(&flavour) {
            return handler(ctx);
        }
        if flavour == Flavour::Chaos {
            if let Some(rolled) = ctx.dice.choose(&Flavour::CHAOS_CHOICES) {
                return self.apply_flavour(rolled, ctx);
            }
        }
        FlavourOutcome::nothing()
    }

    /// Runs the handler for a weapon brand. `Chaos` falls back to a re-roll
    /// like [`EffectRegistry::apply_flavour`].
    pub fn apply_brand(&self, brand: Brand, ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
        if let Some(handler) = self.brands.get(&brand) {
            return handler(ctx);
        }
        if brand == Brand::Chaos {
            if let Some(rolled) = ctx.dice.choose(&Brand::CHAOS_CHOICES) {
                return self.apply_brand(rolled, ctx);
            }
        }
        FlavourOutcome::nothing()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register_flavour(Flavour::Poison, poison);
        registry.register_flavour(Flavour::StrongPoison, strong_poison);
        registry.register_flavour(Flavour::ReachSting, poison);
        registry.register_flavour(Flavour::Fire, fire);
        registry.register_flavour(Flavour::Cold, cold);
        registry.register_flavour(Flavour::Elec, elec);
        registry.register_flavour(Flavour::Drain, drain);
        registry.register_flavour(Flavour::Vampiric, vampiric);
        registry.register_flavour(Flavour::Confuse, confuse);
        registry.register_flavour(Flavour::Weakness, weakness);
        registry.register_flavour(Flavour::Antimagic, antimagic);
        registry.register_flavour(Flavour::Acid, acid);
        registry.register_flavour(Flavour::Paralyse, paralyse);
        registry.register_flavour(Flavour::Storm, storm);

        registry.register_brand(Brand::Flaming, brand::flaming);
        registry.register_brand(Brand::Freezing, brand::freezing);
        registry.register_brand(Brand::HolyWrath, brand::holy_wrath);
        registry.register_brand(Brand::Electrocution, brand::electrocution);
        registry.register_brand(Brand::Venom, brand::venom);
        registry.register_brand(Brand::Draining, brand::draining);
        registry.register_brand(Brand::Vampirism, brand::vampirism);
        registry.register_brand(Brand::Confuse, brand::confuse);
        registry.register_brand(Brand::Antimagic, brand::antimagic);
        registry.register_brand(Brand::Acid, brand::acid);

        registry
    }
}

// ============================================================================
// Shared afflictions
// ============================================================================

/// Scales elemental damage by resistance level.
///
/// ```text
/// r >= 3  -> 0
/// r >  0  -> dmg / (r + 1)
/// r <  0  -> dmg * 3 / 2
/// ```
pub fn resist_adjust(damage: i32, resistance: i32) -> i32 {
    match resistance {
        r if r >= 3 => 0,
        r if r > 0 => damage / (r + 1),
        r if r < 0 => damage * 3 / 2,
        _ => damage,
    }
}

fn potency(amount: i32) -> u16 {
    amount.clamp(0, i32::from(u16::MAX)) as u16
}

fn turns(amount: i32) -> u16 {
    amount.clamp(1, i32::from(u16::MAX)) as u16
}

/// Adds poison unless the target resists it. Returns whether it took hold.
pub fn inflict_poison(target: &mut ActorState, amount: i32, source: EntityId) -> bool {
    if amount <= 0 || target.res(Element::Poison) > 0 {
        return false;
    }
    target.statuses.add(
        StatusEffect::new(StatusKind::Poisoned, 0)
            .with_potency(potency(amount))
            .with_source(source),
    );
    true
}

pub fn inflict_corrosion(target: &mut ActorState, source: EntityId) {
    target.statuses.add(
        StatusEffect::new(StatusKind::Corroded, 8)
            .with_potency(4)
            .with_source(source),
    );
}

/// Drains unless the target is fully negative-energy resistant.
pub fn inflict_drain(target: &mut ActorState, amount: i32, source: EntityId) -> bool {
    if target.res(Element::Negative) >= 3 || !target.holiness.is_living() {
        return false;
    }
    target.statuses.add(
        StatusEffect::new(StatusKind::Drained, 20)
            .with_potency(potency(amount.max(1)))
            .with_source(source),
    );
    true
}

pub fn inflict_confusion(target: &mut ActorState, duration: i32, source: EntityId) {
    target
        .statuses
        .add(StatusEffect::new(StatusKind::Confused, turns(duration)).with_source(source));
}

pub fn inflict_weakness(target: &mut ActorState, duration: i32, source: EntityId) {
    target
        .statuses
        .add(StatusEffect::new(StatusKind::Weak, turns(duration)).with_source(source));
}

pub fn afflict(target: &mut ActorState, kind: StatusKind, duration: i32, source: EntityId) {
    target
        .statuses
        .add(StatusEffect::new(kind, turns(duration)).with_source(source));
}

// ============================================================================
// Monster attack flavours
// ============================================================================

fn venom_roll(ctx: &mut EffectContext<'_, '_>, dice_count: i32) -> FlavourOutcome {
    let odds = if ctx.attacker.has(StatusKind::ConcentrateVenom) {
        2
    } else {
        3
    };
    if !ctx.dice.one_chance_in(odds) {
        return FlavourOutcome::nothing();
    }
    let hd = ctx.hit_dice();
    let amount = ctx.dice.roll_dice(dice_count, hd);
    if inflict_poison(ctx.defender, amount, ctx.attacker.id) {
        FlavourOutcome::message(format!("{} {} poisoned.", ctx.defender.subject(), be(ctx.defender)))
    } else {
        FlavourOutcome::nothing()
    }
}

fn poison(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    venom_roll(ctx, 2)
}

fn strong_poison(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    venom_roll(ctx, 4)
}

fn elemental(
    ctx: &mut EffectContext<'_, '_>,
    raw: i32,
    element: Element,
    verb: &str,
) -> FlavourOutcome {
    let damage = resist_adjust(raw, ctx.defender.res(element));
    if damage <= 0 {
        return FlavourOutcome::nothing();
    }
    FlavourOutcome::damage(
        damage,
        format!("{} {} {verb}.", ctx.defender.subject(), be(ctx.defender)),
    )
}

fn fire(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    let hd = ctx.hit_dice();
    let raw = hd + ctx.dice.random2(hd);
    elemental(ctx, raw, Element::Fire, "burned")
}

fn cold(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    let hd = ctx.hit_dice();
    let raw = hd + ctx.dice.random2(hd * 2);
    elemental(ctx, raw, Element::Cold, "frozen")
}

fn elec(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    let hd = ctx.hit_dice();
    let raw = hd + ctx.dice.random2(hd / 2);
    elemental(ctx, raw, Element::Elec, "electrocuted")
}

fn drain(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.coinflip() {
        return FlavourOutcome::nothing();
    }
    if drain_target(ctx) {
        FlavourOutcome::message(format!("{} {} drained.", ctx.defender.subject(), be(ctx.defender)))
    } else {
        FlavourOutcome::nothing()
    }
}

fn drain_target(ctx: &mut EffectContext<'_, '_>) -> bool {
    inflict_drain(ctx.defender, ctx.damage, ctx.attacker.id)
}

fn vampiric(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.defender.holiness.is_natural() || ctx.defender.hp >= ctx.defender.max_hp {
        return FlavourOutcome::nothing();
    }
    let healed = ctx.attacker.heal(1 + ctx.dice.random2(ctx.damage));
    if healed > 0 {
        FlavourOutcome::message(format!(
            "{} {} strength from {}.",
            ctx.attacker.subject(),
            ctx.attacker.conj("draw"),
            ctx.defender.object()
        ))
    } else {
        FlavourOutcome::nothing()
    }
}

fn confuse(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.one_chance_in(3) {
        return FlavourOutcome::nothing();
    }
    let hd = ctx.hit_dice();
    let duration = 1 + ctx.dice.random2(3 + hd);
    inflict_confusion(ctx.defender, duration, ctx.attacker.id);
    FlavourOutcome::message(format!("{} {} confused.", ctx.defender.subject(), look(ctx.defender)))
}

fn weakness(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.one_chance_in(3) {
        return FlavourOutcome::nothing();
    }
    inflict_weakness(ctx.defender, 6, ctx.attacker.id);
    FlavourOutcome::message(format!("{} {} weaker.", ctx.defender.subject(), look(ctx.defender)))
}

fn antimagic(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    let duration = ctx.hit_dice();
    afflict(ctx.defender, StatusKind::Antimagic, duration, ctx.attacker.id);
    FlavourOutcome::nothing()
}

fn acid(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if !ctx.dice.x_chance_in_y(2, 3) {
        return FlavourOutcome::nothing();
    }
    inflict_corrosion(ctx.defender, ctx.attacker.id);
    FlavourOutcome::message(format!("{} {} corroded.", ctx.defender.subject(), be(ctx.defender)))
}

fn paralyse(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if ctx.defender.res(Element::Poison) > 0 || !ctx.dice.one_chance_in(3) {
        return FlavourOutcome::nothing();
    }
    let duration = ctx.dice.roll_dice(1, 3);
    afflict(ctx.defender, StatusKind::Paralysed, duration, ctx.attacker.id);
    FlavourOutcome::message(format!("{} suddenly {} still.", ctx.defender.subject(), ctx.defender.conj("go")))
}

fn storm(ctx: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    if ctx.dice.coinflip() {
        let raw = 1 + ctx.dice.random2(ctx.damage);
        return elemental(ctx, raw, Element::Elec, "struck by lightning");
    }
    let fizzle = match ctx.dice.random2(3) {
        0 => format!("The air around {} crackles harmlessly.", ctx.defender.object()),
        1 => format!("Static sparks dance over {} and fade.", ctx.defender.object()),
        _ => "Nothing seems to happen.".to_string(),
    };
    FlavourOutcome::message(fizzle)
}

/// "is" / "are" for the actor as subject.
pub(crate) fn be(actor: &ActorState) -> &'static str {
    if actor.is_player() { "are" } else { "is" }
}

/// "looks" / "feel" for the actor as subject.
pub(crate) fn look(actor: &ActorState) -> &'static str {
    if actor.is_player() { "feel" } else { "looks" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{RngOracle, SpeciesDef, SpeciesId, stream};
    use crate::state::{PlayerTraits, Position};

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    fn pair() -> (ActorState, ActorState) {
        let def = SpeciesDef::new(SpeciesId(9), "fire imp", 4);
        let imp = ActorState::monster(EntityId(1), &def, Position::new(1, 0));
        let player = ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(3, 10, 10));
        (imp, player)
    }

    #[test]
    fn resistance_scaling() {
        assert_eq!(resist_adjust(12, 0), 12);
        assert_eq!(resist_adjust(12, 1), 6);
        assert_eq!(resist_adjust(12, 2), 4);
        assert_eq!(resist_adjust(12, 3), 0);
        assert_eq!(resist_adjust(12, -1), 18);
    }

    #[test]
    fn fire_flavour_scales_with_hit_dice() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let registry = EffectRegistry::default();
        let (mut imp, mut player) = pair();
        let mut ctx = EffectContext {
            attacker: &mut imp,
            defender: &mut player,
            damage: 5,
            dice: &mut dice,
        };
        let outcome = registry.apply_flavour(Flavour::Fire, &mut ctx);
        assert_eq!(outcome.special_damage, 4 + 3);
        assert_eq!(outcome.message.as_deref(), Some("You are burned."));
    }

    #[test]
    fn registering_replaces_existing_handler() {
        fn quiet(_: &mut EffectContext<'_, '_>) -> FlavourOutcome {
            FlavourOutcome::damage(99, "replaced")
        }
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let mut registry = EffectRegistry::default();
        assert!(registry.register_flavour(Flavour::Fire, quiet).is_some());
        let (mut imp, mut player) = pair();
        let mut ctx = EffectContext {
            attacker: &mut imp,
            defender: &mut player,
            damage: 1,
            dice: &mut dice,
        };
        assert_eq!(registry.apply_flavour(Flavour::Fire, &mut ctx).special_damage, 99);
        assert_eq!(registry.apply_flavour(Flavour::Trample, &mut ctx), FlavourOutcome::nothing());
    }

    #[test]
    fn poison_respects_resistance() {
        let (_, mut player) = pair();
        assert!(inflict_poison(&mut player, 5, EntityId(1)));
        assert_eq!(player.statuses.potency(StatusKind::Poisoned), 5);
        player.resists.set(Element::Poison, 1);
        assert!(!inflict_poison(&mut player, 5, EntityId(1)));
    }

    #[test]
    fn storm_fizzles_on_failed_coinflip() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let registry = EffectRegistry::default();
        let (mut imp, mut player) = pair();
        let mut ctx = EffectContext {
            attacker: &mut imp,
            defender: &mut player,
            damage: 6,
            dice: &mut dice,
        };
        let outcome = registry.apply_flavour(Flavour::Storm, &mut ctx);
        assert_eq!(outcome.special_damage, 0);
        assert_eq!(outcome.message.as_deref(), Some("Nothing seems to happen."));
    }
}
