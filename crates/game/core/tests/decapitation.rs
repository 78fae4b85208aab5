mod common;

use common::FixedRng;
use crawl_core::combat::heads::{Decapitation, decapitate};
use crawl_core::combat::{AttackAttempt, Brand, SubAttack};
use crawl_core::config::CombatPolicy;
use crawl_core::env::{Dice, SpeciesDef, SpeciesFlags, SpeciesId, stream};
use crawl_core::message::MessageLog;
use crawl_core::state::{ActorState, EntityId, PlayerTraits, Position, Skill, Weapon};
use crawl_core::DamageType;
use proptest::prelude::*;

fn hydra(heads: u8, lernaean: bool) -> ActorState {
    let mut flags = SpeciesFlags::HYDRA;
    if lernaean {
        flags |= SpeciesFlags::LERNAEAN;
    }
    let def = SpeciesDef::new(SpeciesId(20), "hydra", 10)
        .with_defences(200, 0, 0)
        .with_flags(flags)
        .with_heads(heads);
    ActorState::monster(EntityId(1), &def, Position::new(1, 0))
}

fn chop(damage_type: DamageType) -> AttackAttempt {
    let sub = SubAttack::new(EntityId::PLAYER, EntityId(1), 0);
    let mut attempt = AttackAttempt::new(&sub, Position::ORIGIN);
    attempt.damage_type = damage_type;
    attempt.brand = Brand::None;
    attempt
}

fn axeman() -> ActorState {
    ActorState::player("Ada", Position::ORIGIN, PlayerTraits::new(12, 14, 12))
        .with_weapon(Weapon::new("war axe", 15, Skill::Axes, DamageType::CHOPPING))
}

proptest! {
    #[test]
    fn heads_stay_within_the_cap(
        heads in 1u8..=27,
        damage in 1..60i32,
        raw in any::<u32>(),
        lernaean in any::<bool>(),
        slicing in any::<bool>(),
    ) {
        let policy = CombatPolicy::default();
        let cap = if lernaean { policy.lernaean_head_cap } else { policy.hydra_head_cap };
        let heads = heads.min(cap);
        let mut target = hydra(heads, lernaean);
        let rng = FixedRng(raw);
        let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
        let mut log = MessageLog::new();
        let kind = if slicing { DamageType::SLICING } else { DamageType::CHOPPING };

        let outcome = decapitate(&mut dice, &axeman(), &mut target, &chop(kind), damage, &policy, &mut log);

        prop_assert!(target.heads <= cap);
        match outcome {
            Decapitation::Killed => {
                prop_assert_eq!(target.heads, 0);
                prop_assert!(!target.is_alive());
            }
            Decapitation::Severed { regrew: true } => prop_assert_eq!(target.heads, heads + 1),
            Decapitation::Severed { regrew: false } => prop_assert_eq!(target.heads, heads - 1),
            Decapitation::Spared => prop_assert_eq!(target.heads, heads),
        }
    }
}

#[test]
fn repeated_chops_on_a_single_head_kill() {
    let rng = FixedRng(u32::MAX);
    let mut dice = Dice::new(&rng, 0, 0, stream::COMBAT);
    let mut log = MessageLog::new();
    let mut target = hydra(1, false);
    let outcome = decapitate(
        &mut dice,
        &axeman(),
        &mut target,
        &chop(DamageType::CHOPPING),
        20,
        &CombatPolicy::default(),
        &mut log,
    );
    assert_eq!(outcome, Decapitation::Killed);
    assert!(log.contains("last head is chopped off"));
}
