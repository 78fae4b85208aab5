#![allow(dead_code)]

use crawl_core::combat::{AttackResolver, AttackType, CombatContext, EffectRegistry, Flavour};
use crawl_core::env::{
    Env, MapDimensions, MapOracle, RngOracle, SpeciesDef, SpeciesId, SpeciesOracle, StaticTile,
    TerrainKind,
};
use crawl_core::message::MessageLog;
use crawl_core::state::{ActorState, EntityId, GameState, PlayerTraits, Position};
use crawl_core::{AttackReport, GameConfig};

/// Returns the same raw value for every roll.
pub struct FixedRng(pub u32);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

/// Open floor with an optional wall column.
pub struct Room {
    pub size: u32,
    pub wall_x: Option<i32>,
}

impl Room {
    pub fn open(size: u32) -> Self {
        Self { size, wall_x: None }
    }
}

impl MapOracle for Room {
    fn dimensions(&self) -> MapDimensions {
        MapDimensions::new(self.size, self.size)
    }

    fn tile(&self, position: Position) -> Option<StaticTile> {
        if !self.contains(position) {
            return None;
        }
        let terrain = match self.wall_x {
            Some(x) if position.x == x => TerrainKind::Wall,
            _ => TerrainKind::Floor,
        };
        Some(StaticTile::new(terrain))
    }
}

pub struct Bestiary(pub Vec<SpeciesDef>);

impl SpeciesOracle for Bestiary {
    fn species(&self, id: SpeciesId) -> Option<&SpeciesDef> {
        self.0.iter().find(|species| species.id == id)
    }
}

pub fn goblin() -> SpeciesDef {
    SpeciesDef::new(SpeciesId(1), "goblin", 2)
        .with_defences(40, 0, 0)
        .with_attack(AttackType::Hit, Flavour::Plain, 4)
}

pub fn spider() -> SpeciesDef {
    SpeciesDef::new(SpeciesId(2), "spider", 4)
        .with_defences(60, 0, 0)
        .with_attack(AttackType::Bite, Flavour::Poison, 5)
}

pub fn bestiary() -> Bestiary {
    Bestiary(vec![goblin(), spider()])
}

pub fn player_at(position: Position) -> ActorState {
    ActorState::player("Ada", position, PlayerTraits::new(1, 10, 10))
}

pub fn monster(id: u32, species: &SpeciesDef, position: Position) -> ActorState {
    ActorState::monster(EntityId(id), species, position)
}

pub fn arena(actors: Vec<ActorState>) -> GameState {
    let mut state = GameState::new(MapDimensions::new(9, 9), 11);
    for actor in actors {
        state.spawn(actor).expect("spawn");
    }
    state
}

/// Everything a resolver borrows, owned in one place.
pub struct Table {
    pub map: Room,
    pub species: Bestiary,
    pub effects: EffectRegistry,
    pub config: GameConfig,
    pub log: MessageLog,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            map: Room::open(9),
            species: bestiary(),
            effects: EffectRegistry::default(),
            config: GameConfig::default(),
            log: MessageLog::new(),
        }
    }
}

impl Table {
    /// Runs `body` against a resolver and returns its report.
    pub fn fight<R, F>(&mut self, state: &mut GameState, rng: &R, body: F) -> AttackReport
    where
        R: RngOracle,
        F: FnOnce(&mut AttackResolver<'_>),
    {
        let env = Env::with_all(&self.map, &self.species, rng).into_game_env();
        let ctx = CombatContext::new(state, env, &self.effects, &self.config, &mut self.log);
        let mut resolver = AttackResolver::new(ctx).expect("oracles present");
        body(&mut resolver);
        resolver.finish()
    }
}
