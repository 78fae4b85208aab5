mod common;

use common::{FixedRng, Table, arena, goblin, monster, player_at};
use crawl_core::combat::{
    EffectContext, EffectRegistry, Flavour, FlavourOutcome, SwingKind, SwingOutcome,
};
use crawl_core::env::{OracleError, PcgRng, SpeciesDef, SpeciesId};
use crawl_core::state::{
    ActorState, Attitude, EntityId, GearFlags, PlayerTraits, Position, Skill, Weapon,
};
use crawl_core::{CombatError, DamageType};

fn axe() -> Weapon {
    Weapon::new("axe", 11, Skill::Axes, DamageType::CHOPPING)
}

fn hp(state: &crawl_core::GameState, id: u32) -> Option<i32> {
    state.actors.get(EntityId(id)).map(|actor| actor.hp)
}

#[test]
fn unarmed_punch_at_maximum_rolls() {
    let rng = FixedRng(u32::MAX);
    let mut table = Table::default();
    let mut state = arena(vec![
        player_at(Position::new(4, 4)),
        monster(1, &goblin(), Position::new(5, 4)),
    ]);

    let report = table.fight(&mut state, &rng, |resolver| {
        let occurred = resolver.launch_attack_set(EntityId::PLAYER, EntityId(1), true);
        assert_eq!(occurred, Ok(true));
    });

    assert_eq!(report.damage_to(EntityId(1)), 3);
    assert_eq!(report.hits(), 1);
    assert_eq!(hp(&state, 1), Some(37));
    assert!(table.log.contains("You hit the goblin."));
}

#[test]
fn axe_cleaves_hostile_neighbours_at_seventy_percent() {
    let rng = FixedRng(u32::MAX);
    let mut table = Table::default();
    let fighter = player_at(Position::new(4, 4)).with_weapon(axe());
    let ally = monster(4, &goblin(), Position::new(3, 4)).with_attitude(Attitude::Friendly);
    let mut state = arena(vec![
        fighter,
        monster(1, &goblin(), Position::new(5, 4)),
        monster(2, &goblin(), Position::new(5, 5)),
        monster(3, &goblin(), Position::new(4, 3)),
        ally,
    ]);

    let report = table.fight(&mut state, &rng, |resolver| {
        assert_eq!(resolver.resolve_attack(EntityId::PLAYER, EntityId(1), 0, 0), Ok(true));
    });

    assert_eq!(report.damage_to(EntityId(1)), 11);
    assert_eq!(report.damage_to(EntityId(2)), 7);
    assert_eq!(report.damage_to(EntityId(3)), 7);
    assert_eq!(hp(&state, 4), Some(40));

    // Clockwise from the primary target: south-east before north.
    let order: Vec<EntityId> = report.swings_of(SwingKind::Cleave).map(|s| s.defender).collect();
    assert_eq!(order, vec![EntityId(2), EntityId(3)]);
}

#[test]
fn second_weapon_cleaves_after_the_target_falls() {
    let rng = FixedRng(u32::MAX);
    let mut table = Table::default();
    let traits = PlayerTraits::new(1, 10, 10);
    let duelist = ActorState::player("Ada", Position::new(4, 4), traits)
        .with_weapon(axe())
        .with_offhand(axe());
    let frail = monster(1, &goblin(), Position::new(5, 4)).with_hp(1);
    let mut state = arena(vec![duelist, frail, monster(2, &goblin(), Position::new(5, 5))]);

    let report = table.fight(&mut state, &rng, |resolver| {
        assert_eq!(resolver.launch_attack_set(EntityId::PLAYER, EntityId(1), true), Ok(true));
    });

    assert!(report.kills.contains(&EntityId(1)));
    assert_eq!(report.swings_of(SwingKind::Cleave).count(), 2);
    assert_eq!(report.damage_to(EntityId(2)), 14);
}

#[test]
fn ripostes_never_chain() {
    let fencer = SpeciesDef::new(SpeciesId(1), "fencer", 6)
        .with_defences(500, 0, 15)
        .with_attack(crawl_core::AttackType::Hit, Flavour::Plain, 3);

    for seed in 0..40 {
        let rng = PcgRng;
        let mut table = Table {
            species: common::Bestiary(vec![fencer.clone()]),
            ..Table::default()
        };
        let a = monster(1, &fencer, Position::new(4, 4)).with_gear(GearFlags::RIPOSTE);
        let b = monster(2, &fencer, Position::new(5, 4))
            .with_gear(GearFlags::RIPOSTE)
            .with_attitude(Attitude::Friendly);
        let mut state = arena(vec![a, b]);
        state.game_seed = seed;

        let report = table.fight(&mut state, &rng, |resolver| {
            resolver.resolve_attack(EntityId(1), EntityId(2), 0, 0).expect("known actors");
        });
        assert!(report.swings_of(SwingKind::Riposte).count() <= 1, "seed {seed}");
        assert!(report.swings.len() <= 2, "seed {seed}");
    }
}

#[test]
fn missing_species_is_reported() {
    let rng = FixedRng(0);
    let mut table = Table::default();
    let ghost = SpeciesDef::new(SpeciesId(99), "ghost", 3);
    let mut state = arena(vec![
        player_at(Position::new(4, 4)),
        monster(1, &ghost, Position::new(5, 4)),
    ]);

    table.fight(&mut state, &rng, |resolver| {
        let err = resolver.monster_attack_round(EntityId(1), EntityId::PLAYER);
        assert_eq!(err, Err(CombatError::Oracle(OracleError::SpeciesNotFound(SpeciesId(99)))));
    });
}

fn scalding(_: &mut EffectContext<'_, '_>) -> FlavourOutcome {
    FlavourOutcome::damage(5, "The venom scalds!")
}

#[test]
fn replaced_flavour_handler_is_used() {
    let rng = FixedRng(u32::MAX);
    let mut effects = EffectRegistry::default();
    assert!(effects.register_flavour(Flavour::Poison, scalding).is_some());
    let mut table = Table {
        effects,
        ..Table::default()
    };
    let mut state = arena(vec![
        player_at(Position::new(4, 4)).with_hp(100),
        monster(1, &common::spider(), Position::new(5, 4)),
    ]);

    let report = table.fight(&mut state, &rng, |resolver| {
        assert_eq!(resolver.monster_attack_round(EntityId(1), EntityId::PLAYER), Ok(true));
    });

    assert_eq!(report.swings[0].outcome, SwingOutcome::Hit);
    assert_eq!(report.swings[0].special, 5);
    assert!(table.log.contains("The venom scalds!"));
}

#[test]
fn same_seed_same_report() {
    let run = |seed: u64| {
        let rng = PcgRng;
        let mut table = Table::default();
        let mut state = arena(vec![
            player_at(Position::new(4, 4)).with_weapon(axe()),
            monster(1, &goblin(), Position::new(5, 4)),
            monster(2, &goblin(), Position::new(4, 5)),
        ]);
        state.game_seed = seed;
        table.fight(&mut state, &rng, |resolver| {
            resolver
                .launch_attack_set(EntityId::PLAYER, EntityId(1), true)
                .expect("known actors");
        })
    };
    assert_eq!(run(42), run(42));
}
