//! High-level runtime orchestrator.
//!
//! The runtime owns the game state, the oracles and the event bus, and
//! exposes a builder-based API for clients to drive the simulation one call
//! at a time. Everything runs synchronously on the caller's thread.

use std::sync::Arc;

use tokio::sync::broadcast;

use crawl_core::combat::{AlwaysProceed, AttackConfirmation, AttackResolver, CombatContext};
use crawl_core::env::{Dice, stream};
use crawl_core::noise::{Heard, NoiseListener, PropagationReport, StealthCheck};
use crawl_core::state::Tick;
use crawl_core::{
    ActorState, AttackReport, EffectRegistry, EntityId, GameConfig, GameState, Manoeuvre,
    MapOracle, Message, MessageLog, NoiseEvent as Sound, NoiseId, Position, RngOracle, SpeciesDef,
    SpeciesId,
};

use crate::api::{Result, RuntimeError};
use crate::events::{CombatEvent, EventBus, GameEvent, NoiseEvent, Topic, TurnEvent};
use crate::hooks::{
    EnergyHook, HookContext, HookOutcome, HookRegistry, PoisonHook, StatusDecayHook, TurnHook,
};
use crate::oracle::{MapOracleImpl, OracleManager, SpeciesOracleImpl};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub game_seed: u64,
    pub event_buffer_size: usize,
    /// Default hooks to install; custom hooks are added on top.
    pub status_decay: bool,
    pub poison: bool,
    pub energy: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            game_seed: 0,
            event_buffer_size: 100,
            status_decay: true,
            poison: true,
            energy: true,
        }
    }
}

/// What happened at the end of a turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// The turn that just ended.
    pub turn: Tick,
    pub noise: PropagationReport,
    /// Monsters that noticed a noise, in the order they heard it.
    pub alerted: Vec<EntityId>,
    /// Subset of `alerted` that was asleep.
    pub woken: Vec<EntityId>,
    pub hooks: HookOutcome,
    /// Dead monsters swept from the roster.
    pub removed: Vec<EntityId>,
}

/// Main runtime that drives combat and the turn cycle.
pub struct Runtime {
    config: RuntimeConfig,
    state: GameState,
    oracles: OracleManager,
    effects: EffectRegistry,
    hooks: HookRegistry,
    events: EventBus,
    messages: MessageLog,
    confirm: Box<dyn AttackConfirmation>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to one event topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe(topic)
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Removes and returns every buffered narrative message.
    pub fn drain_messages(&mut self) -> Vec<Message> {
        self.messages.drain()
    }

    /// Adds an actor to the level.
    ///
    /// # Errors
    ///
    /// Fails for cells off the map, occupied cells and duplicate ids.
    pub fn spawn(&mut self, actor: ActorState) -> Result<EntityId> {
        if !self.oracles.map.dimensions().contains(actor.position) {
            return Err(RuntimeError::OffMap(actor.position));
        }
        let id = self.state.spawn(actor)?;
        tracing::debug!(target: "crawl_runtime", actor = %id, "spawned");
        Ok(id)
    }

    /// Spawns a fresh monster of a known species.
    ///
    /// # Errors
    ///
    /// Fails for an unknown species, plus everything [`Runtime::spawn`] rejects.
    pub fn spawn_monster(&mut self, species: SpeciesId, position: Position) -> Result<EntityId> {
        let def: &SpeciesDef = self.oracles.as_game_env().species_def(species)?;
        let id = self.state.allocate_entity_id()?;
        let actor = ActorState::monster(id, def, position);
        self.spawn(actor)
    }

    /// One melee exchange: a player launches a full attack set, a monster
    /// runs its natural attacks in order.
    ///
    /// # Errors
    ///
    /// Fails when either actor is unknown or the attacker is dead, or when
    /// the resolver reports a programmer error.
    pub fn melee(&mut self, attacker: EntityId, defender: EntityId) -> Result<AttackReport> {
        self.melee_with(attacker, defender, Manoeuvre::None, 1)
    }

    /// [`Runtime::melee`] with a martial manoeuvre attached.
    pub fn melee_with(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        manoeuvre: Manoeuvre,
        manoeuvre_targets: i32,
    ) -> Result<AttackReport> {
        let actor = self
            .state
            .actors
            .get(attacker)
            .ok_or(RuntimeError::UnknownActor(attacker))?;
        if !actor.is_alive() {
            return Err(RuntimeError::DeadActor(attacker));
        }
        let is_player = actor.is_player();
        if self.state.actors.get(defender).is_none() {
            return Err(RuntimeError::UnknownActor(defender));
        }

        let env = self.oracles.as_game_env();
        let ctx = CombatContext::new(
            &mut self.state,
            env,
            &self.effects,
            &self.config.game_config,
            &mut self.messages,
        )
        .with_confirmation(self.confirm.as_ref());
        let mut resolver = AttackResolver::new(ctx)?.with_manoeuvre(manoeuvre, manoeuvre_targets);
        if is_player {
            resolver.launch_attack_set(attacker, defender, true)?;
        } else {
            resolver.monster_attack_round(attacker, defender)?;
        }
        let report = resolver.finish();
        self.state.nonce += 1;

        tracing::info!(
            target: "crawl_runtime",
            %attacker,
            %defender,
            swings = report.swings.len(),
            damage = report.total_damage,
            kills = report.kills.len(),
            "melee resolved"
        );
        self.events.publish(CombatEvent::AttackResolved {
            attacker,
            defender,
            swings: report.swings.len(),
            hits: report.hits(),
            damage: report.total_damage,
        });
        for &victim in &report.kills {
            let killer = if victim == attacker { defender } else { attacker };
            self.events.publish(CombatEvent::ActorKilled {
                victim,
                killer: Some(killer),
            });
        }
        Ok(report)
    }

    /// Queues a noise for the end-of-turn pass. Quiet noises yield `None`.
    ///
    /// # Errors
    ///
    /// Fails when `source` is off the map.
    pub fn make_noise(
        &mut self,
        source: Position,
        loudness: i32,
        producer: Option<EntityId>,
        description: &str,
    ) -> Result<Option<NoiseId>> {
        let event = Sound::from_loudness(source, loudness, producer).with_description(description);
        let nonce = self.state.nonce;
        let id = self
            .state
            .noise
            .register_noise(event, &self.config.game_config.noise)
            .map_err(|err| err.at_nonce(nonce))?;
        Ok(id)
    }

    /// Closes the turn: propagates noise, runs the turn hooks in priority
    /// order, sweeps the dead and advances the clock and nonce.
    ///
    /// # Errors
    ///
    /// Fails when the rng oracle is missing or a critical hook fails. The
    /// clock does not advance in that case.
    pub fn end_turn(&mut self) -> Result<TurnSummary> {
        let mut summary = TurnSummary {
            turn: self.state.turn,
            ..TurnSummary::default()
        };

        self.propagate(&mut summary);

        let rng: &dyn RngOracle = self.oracles.rng();
        let mut dice = Dice::new(rng, self.state.game_seed, self.state.nonce, stream::TURN);
        let mut ctx = HookContext {
            state: &mut self.state,
            config: &self.config.game_config,
            dice: &mut dice,
            messages: &mut self.messages,
            outcome: &mut summary.hooks,
        };
        self.hooks.execute_hooks(&mut ctx)?;

        for &(actor, status) in &summary.hooks.expired {
            self.events.publish(TurnEvent::StatusExpired { actor, status });
        }
        for &victim in &summary.hooks.deaths {
            self.events.publish(CombatEvent::ActorKilled {
                victim,
                killer: None,
            });
        }

        summary.removed = self.state.actors.sweep_dead();
        self.state.turn = self.state.turn.next();
        self.state.nonce += 1;

        tracing::info!(
            target: "crawl_runtime",
            turn = %summary.turn,
            noises = summary.noise.events,
            heard = summary.noise.heard.len(),
            woken = summary.woken.len(),
            removed = summary.removed.len(),
            "turn ended"
        );
        self.events.publish(TurnEvent::TurnEnded {
            turn: summary.turn,
            nonce: self.state.nonce,
        });
        Ok(summary)
    }

    fn propagate(&mut self, summary: &mut TurnSummary) {
        let map: &MapOracleImpl = &self.oracles.map;
        let policy = &self.config.game_config.noise;
        let mut dice = Dice::new(
            self.oracles.rng.as_ref(),
            self.state.game_seed,
            self.state.nonce,
            stream::NOISE,
        );

        let mut heard = Vec::new();
        let mut check = StealthCheck::new(map, policy, &mut self.messages);
        let mut listener = |h: Heard<'_, '_>| {
            heard.push(NoiseEvent::NoiseHeard {
                listener: h.listener.id,
                noise: h.noise_id,
                intensity: h.intensity,
                perceived: h.perceived,
            });
            check.hear(h);
        };
        summary.noise = self.state.noise.propagate_noise(
            map,
            policy,
            &mut self.state.actors,
            &mut dice,
            &mut listener,
        );
        summary.alerted = check.alerted().to_vec();
        summary.woken = check.woken().to_vec();

        for event in heard {
            self.events.publish(event);
        }
        for &actor in &summary.woken {
            self.events.publish(NoiseEvent::ActorWoke { actor });
        }
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    map: Option<MapOracleImpl>,
    species: Vec<SpeciesDef>,
    rng: Option<Arc<dyn RngOracle>>,
    effects: EffectRegistry,
    hooks: Vec<Arc<dyn TurnHook>>,
    confirm: Option<Box<dyn AttackConfirmation>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            map: None,
            species: Vec::new(),
            rng: None,
            effects: EffectRegistry::default(),
            hooks: Vec::new(),
            confirm: None,
        }
    }

    /// Override the whole runtime configuration.
    pub fn runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the rule policies.
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config.game_config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.game_seed = seed;
        self
    }

    /// Set the required level layout.
    pub fn map(mut self, map: impl Into<MapOracleImpl>) -> Self {
        self.map = Some(map.into());
        self
    }

    /// Adds species definitions; later ids replace earlier ones.
    pub fn species(mut self, table: impl IntoIterator<Item = SpeciesDef>) -> Self {
        self.species.extend(table);
        self
    }

    /// Roll with a custom generator instead of PCG.
    pub fn rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Replace the brand and flavour handlers.
    pub fn effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = effects;
        self
    }

    /// Adds a turn hook next to the enabled defaults.
    pub fn hook(mut self, hook: Arc<dyn TurnHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Ask before risky attacks. Defaults to always proceeding.
    pub fn confirmation(mut self, confirm: impl AttackConfirmation + 'static) -> Self {
        self.confirm = Some(Box::new(confirm));
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Fails when no map was provided.
    pub fn build(self) -> Result<Runtime> {
        let map = self.map.ok_or(RuntimeError::MissingMap)?;
        let dimensions = map.dimensions();
        let species = SpeciesOracleImpl::new(self.species);
        let oracles = match self.rng {
            Some(rng) => OracleManager::with_rng(Arc::new(map), Arc::new(species), rng),
            None => OracleManager::new(Arc::new(map), Arc::new(species)),
        };

        let mut defaults: Vec<Arc<dyn TurnHook>> = Vec::new();
        if self.config.poison {
            defaults.push(Arc::new(PoisonHook));
        }
        if self.config.status_decay {
            defaults.push(Arc::new(StatusDecayHook));
        }
        if self.config.energy {
            defaults.push(Arc::new(EnergyHook));
        }
        defaults.extend(self.hooks);
        let hooks = HookRegistry::new(defaults);

        tracing::info!(
            target: "crawl_runtime",
            width = dimensions.width,
            height = dimensions.height,
            species = oracles.species().len(),
            hooks = hooks.len(),
            seed = self.config.game_seed,
            "runtime built"
        );

        Ok(Runtime {
            state: GameState::new(dimensions, self.config.game_seed),
            events: EventBus::with_capacity(self.config.event_buffer_size),
            config: self.config,
            oracles,
            effects: self.effects,
            hooks,
            messages: MessageLog::new(),
            confirm: self.confirm.unwrap_or_else(|| Box::new(AlwaysProceed)),
        })
    }
}
