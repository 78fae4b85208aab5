use std::sync::Arc;

use crawl_core::combat::{AttackType, Flavour};
use crawl_core::state::{Behaviour, PlayerTraits, StatusEffect};
use crawl_core::{
    ActorState, EntityId, GameError, OracleError, Position, RngOracle, SpeciesDef, SpeciesId,
    StatusKind,
};
use crawl_runtime::{
    CombatEvent, GameEvent, HookContext, HookCriticality, HookError, MapOracleImpl, NoiseEvent,
    Runtime, RuntimeConfig, RuntimeError, Topic, TurnEvent, TurnHook, drain,
};

struct FixedRng(u32);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

fn goblin() -> SpeciesDef {
    SpeciesDef::new(SpeciesId(1), "goblin", 2)
        .with_defences(40, 0, 0)
        .with_attack(AttackType::Hit, Flavour::Plain, 4)
}

fn player_at(position: Position) -> ActorState {
    ActorState::player("Ada", position, PlayerTraits::new(1, 10, 10))
}

fn goblin_at(id: u32, position: Position) -> ActorState {
    ActorState::monster(EntityId(id), &goblin(), position)
}

fn runtime(raw: u32) -> Runtime {
    Runtime::builder()
        .map(MapOracleImpl::test_map(9, 9))
        .species([goblin()])
        .rng(Arc::new(FixedRng(raw)))
        .seed(7)
        .build()
        .expect("runtime")
}

#[test]
fn build_requires_a_map() {
    let result = Runtime::builder().species([goblin()]).build();
    assert!(matches!(result, Err(RuntimeError::MissingMap)));
}

#[test]
fn spawn_rejects_cells_off_the_map() {
    let mut rt = runtime(0);
    let err = rt.spawn(player_at(Position::new(9, 0))).expect_err("off map");
    assert!(matches!(err, RuntimeError::OffMap(p) if p == Position::new(9, 0)));

    let err = rt
        .spawn_monster(SpeciesId(42), Position::new(2, 2))
        .expect_err("unknown species");
    assert!(matches!(
        err,
        RuntimeError::Oracle(OracleError::SpeciesNotFound(SpeciesId(42)))
    ));
}

#[test]
fn melee_publishes_the_exchange() {
    let mut rt = runtime(u32::MAX);
    rt.spawn(player_at(Position::new(4, 4))).expect("player");
    rt.spawn(goblin_at(1, Position::new(5, 4))).expect("goblin");
    let mut combat = rt.subscribe(Topic::Combat);

    let report = rt.melee(EntityId::PLAYER, EntityId(1)).expect("melee");

    assert_eq!(report.damage_to(EntityId(1)), 3);
    assert_eq!(rt.state().actors.get(EntityId(1)).map(|g| g.hp), Some(37));
    assert_eq!(rt.state().nonce, 1);
    assert_eq!(rt.state().noise.pending().len(), 1);
    let events = drain(&mut combat);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        GameEvent::Combat(CombatEvent::AttackResolved { hits: 1, damage: 3, .. })
    ));
    assert!(rt.messages().contains("You hit the goblin."));
}

#[test]
fn killing_blow_is_swept_at_end_of_turn() {
    let mut rt = runtime(u32::MAX);
    rt.spawn(player_at(Position::new(4, 4))).expect("player");
    rt.spawn(goblin_at(1, Position::new(5, 4)).with_hp(1)).expect("goblin");
    let mut combat = rt.subscribe(Topic::Combat);

    let report = rt.melee(EntityId::PLAYER, EntityId(1)).expect("melee");
    assert_eq!(report.kills, vec![EntityId(1)]);
    assert!(drain(&mut combat).contains(&GameEvent::Combat(CombatEvent::ActorKilled {
        victim: EntityId(1),
        killer: Some(EntityId::PLAYER),
    })));

    let summary = rt.end_turn().expect("turn");
    assert_eq!(summary.removed, vec![EntityId(1)]);
    assert!(rt.state().actors.get(EntityId(1)).is_none());
}

#[test]
fn loud_noise_wakes_a_sleeper() {
    let mut rt = runtime(0);
    rt.spawn(player_at(Position::new(1, 1))).expect("player");
    rt.spawn(goblin_at(1, Position::new(5, 1)).with_behaviour(Behaviour::Sleeping))
        .expect("goblin");
    let mut noise = rt.subscribe(Topic::Noise);

    let id = rt
        .make_noise(Position::new(1, 1), 10, Some(EntityId::PLAYER), "a crash")
        .expect("on the map");
    assert!(id.is_some());

    let summary = rt.end_turn().expect("turn");

    assert_eq!(summary.woken, vec![EntityId(1)]);
    assert_eq!(summary.noise.heard.len(), 1);
    let goblin = rt.state().actors.get(EntityId(1)).expect("goblin");
    assert_eq!(goblin.behaviour, Behaviour::Seeking(Position::new(1, 1)));

    let events = drain(&mut noise);
    assert!(matches!(
        events.first(),
        Some(GameEvent::Noise(NoiseEvent::NoiseHeard { listener, perceived, .. }))
            if *listener == EntityId(1) && *perceived == Position::new(1, 1)
    ));
    assert_eq!(
        events.last(),
        Some(&GameEvent::Noise(NoiseEvent::ActorWoke { actor: EntityId(1) }))
    );
}

#[test]
fn noise_off_the_map_is_an_error() {
    let mut rt = runtime(0);
    let err = rt
        .make_noise(Position::new(-1, 3), 5, Some(EntityId(4)), "")
        .expect_err("off map");
    assert!(matches!(err, RuntimeError::Noise(_)));
    assert_eq!(err.error_code(), "NOISE_OUT_OF_BOUNDS");
    let context = err.context().expect("context");
    assert_eq!(context.position, Some(Position::new(-1, 3)));
    assert_eq!(context.actor, Some(EntityId(4)));
    assert_eq!(context.nonce, rt.state().nonce);
}

#[test]
fn poison_ticks_and_turn_advances() {
    let mut rt = runtime(u32::MAX);
    let poisoned = goblin_at(1, Position::new(2, 2))
        .with_status(StatusEffect::new(StatusKind::Poisoned, 0).with_potency(8));
    rt.spawn(poisoned).expect("goblin");
    let mut turn = rt.subscribe(Topic::Turn);

    let summary = rt.end_turn().expect("turn");

    assert_eq!(summary.hooks.poisoned, vec![(EntityId(1), 2)]);
    let goblin = rt.state().actors.get(EntityId(1)).expect("goblin");
    assert_eq!(goblin.hp, 38);
    assert_eq!(goblin.statuses.potency(StatusKind::Poisoned), 6);
    assert_eq!(rt.state().turn.0, 1);
    assert_eq!(
        drain(&mut turn),
        vec![GameEvent::Turn(TurnEvent::TurnEnded {
            turn: summary.turn,
            nonce: 1,
        })]
    );
}

#[test]
fn turn_events_serialize_for_clients() {
    let mut rt = runtime(u32::MAX);
    let mut turn = rt.subscribe(Topic::Turn);
    rt.end_turn().expect("turn");

    let events = drain(&mut turn);
    let json = serde_json::to_value(&events).expect("json");
    assert_eq!(
        json,
        serde_json::json!([{ "Turn": { "TurnEnded": { "turn": 0, "nonce": 1 } } }])
    );
}

#[test]
fn attack_energy_is_regained() {
    let mut rt = runtime(u32::MAX);
    rt.spawn(player_at(Position::new(4, 4)).with_hp(200)).expect("player");
    rt.spawn(goblin_at(1, Position::new(5, 4))).expect("goblin");

    rt.melee(EntityId(1), EntityId::PLAYER).expect("melee");
    assert_eq!(rt.state().actors.get(EntityId(1)).map(|g| g.energy), Some(-10));

    rt.end_turn().expect("turn");
    assert_eq!(rt.state().actors.get(EntityId(1)).map(|g| g.energy), Some(0));
}

#[test]
fn disabled_default_hooks_do_nothing() {
    let mut rt = Runtime::builder()
        .map(MapOracleImpl::test_map(5, 5))
        .runtime_config(RuntimeConfig {
            poison: false,
            energy: false,
            ..RuntimeConfig::default()
        })
        .build()
        .expect("runtime");
    assert_eq!(rt.hooks().len(), 1);

    let mut sick = goblin_at(1, Position::new(2, 2))
        .with_status(StatusEffect::new(StatusKind::Poisoned, 0).with_potency(8));
    sick.energy = -10;
    rt.spawn(sick).expect("goblin");

    rt.end_turn().expect("turn");
    let goblin = rt.state().actors.get(EntityId(1)).expect("goblin");
    assert_eq!(goblin.hp, 40);
    assert_eq!(goblin.energy, -10);
}

struct Doom;

impl TurnHook for Doom {
    fn name(&self) -> &'static str {
        "doom"
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Critical
    }

    fn execute(&self, _ctx: &mut HookContext<'_, '_>) -> Result<(), HookError> {
        Err(HookError::Custom("the sky falls".into()))
    }
}

struct Grumble;

impl TurnHook for Grumble {
    fn name(&self) -> &'static str {
        "grumble"
    }

    fn execute(&self, _ctx: &mut HookContext<'_, '_>) -> Result<(), HookError> {
        Err(HookError::Custom("mild".into()))
    }
}

#[test]
fn only_critical_hook_failures_abort_the_turn() {
    let mut rt = Runtime::builder()
        .map(MapOracleImpl::test_map(5, 5))
        .hook(Arc::new(Grumble))
        .build()
        .expect("runtime");
    assert!(rt.end_turn().is_ok());

    let mut rt = Runtime::builder()
        .map(MapOracleImpl::test_map(5, 5))
        .hook(Arc::new(Doom))
        .build()
        .expect("runtime");
    let err = rt.end_turn().expect_err("critical failure");
    assert!(matches!(err, RuntimeError::Hook { hook: "doom", .. }));
    assert_eq!(rt.state().turn.0, 0);
}
