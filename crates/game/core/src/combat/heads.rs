//! Hydra decapitation and head regrowth.

use super::attempt::AttackAttempt;
use super::types::{Brand, DamageType};
use crate::config::CombatPolicy;
use crate::env::{Dice, SpeciesFlags};
use crate::message::{MessageChannel, MessageSink};
use crate::state::{ActorState, Harm, MutationKind};

/// What a decapitation attempt did to the defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decapitation {
    /// No head came off.
    Spared,
    /// The last head came off.
    Killed,
    Severed { regrew: bool },
}

/// Maximum number of heads the defender may grow.
pub fn head_cap(defender: &ActorState, policy: &CombatPolicy) -> u8 {
    if defender.has_flag(SpeciesFlags::LERNAEAN) {
        policy.lernaean_head_cap
    } else {
        policy.hydra_head_cap
    }
}

fn sever_verb(damage_type: DamageType) -> &'static str {
    if damage_type.contains(DamageType::CLAWING) {
        "ripped"
    } else if damage_type.contains(DamageType::CHOPPING) {
        "chopped"
    } else {
        "sliced"
    }
}

/// Rolls whether this blow can take a head off at all.
pub fn can_decapitate(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &ActorState,
    attempt: &AttackAttempt,
    damage: i32,
    policy: &CombatPolicy,
) -> bool {
    if defender.heads == 0 || !defender.has_flag(SpeciesFlags::HYDRA) || attempt.is_riposte() {
        return false;
    }
    if attacker.is_monster()
        && defender.is_monster()
        && !dice.x_chance_in_y(policy.mvm_decapitation_percent, 100)
    {
        return false;
    }
    if !attempt.damage_type.can_decapitate() {
        return false;
    }
    if attempt.damage_type == DamageType::CLAWING && attacker.mutation(MutationKind::Claws) < 3 {
        return false;
    }
    damage > 0 && !(damage < 4 && dice.coinflip())
}

/// Attempts to sever a head, regrowing two when the wound is not cauterised.
///
/// # Formula
///
/// ```text
/// heads == 1            -> instant death
/// otherwise heads -= 1, then for natural defenders without a flaming brand:
///   heads < cap - 1     -> heads += 2, heal 8 + random2(8)
/// ```
pub fn decapitate(
    dice: &mut Dice<'_>,
    attacker: &ActorState,
    defender: &mut ActorState,
    attempt: &AttackAttempt,
    damage: i32,
    policy: &CombatPolicy,
    messages: &mut dyn MessageSink,
) -> Decapitation {
    if !can_decapitate(dice, attacker, defender, attempt, damage, policy) {
        return Decapitation::Spared;
    }

    let verb = sever_verb(attempt.damage_type);
    if defender.heads <= 1 {
        messages.push(
            MessageChannel::Combat,
            format!("{} last head is {verb} off!", defender.possessive_capitalised()),
        );
        defender.heads = 0;
        defender.hurt(Harm::InstantDeath);
        return Decapitation::Killed;
    }

    defender.heads -= 1;
    messages.push(
        MessageChannel::Combat,
        format!("One of {} heads is {verb} off!", defender.possessive()),
    );

    if !defender.holiness.is_natural() {
        return Decapitation::Severed { regrew: false };
    }
    if attempt.brand == Brand::Flaming {
        messages.push(MessageChannel::Combat, "The flame cauterises the wound!".to_string());
        return Decapitation::Severed { regrew: false };
    }

    let cap = head_cap(defender, policy);
    if defender.heads < cap.saturating_sub(1) {
        defender.heads += 2;
        let healing = 8 + dice.random2(8);
        defender.heal(healing);
        messages.push(
            MessageChannel::Combat,
            format!("{} {} two more!", defender.subject(), defender.conj("grow")),
        );
        return Decapitation::Severed { regrew: true };
    }
    Decapitation::Severed { regrew: false }
}
