//! The melee attack resolver.
//!
//! An [`AttackResolver`] owns the dice for one command. Every swing runs
//! through the same ordered phases:
//!
//! ```text
//! setup -> attempted -> to-hit -> blocked | dodged | hit (-> damaged)
//!       -> noise -> killed -> aux -> end
//! ```
//!
//! Each phase either hands control to the next one or stops the swing with a
//! [`Termination`]. Follow-up swings (cleaves, multi-hits, ripostes) are not
//! run recursively: they go onto a FIFO queue that the resolver drains after
//! the swing that spawned them, bounded by [`GameConfig::MAX_QUEUED_ATTACKS`].

use std::collections::VecDeque;

use super::attempt::{AttackAttempt, AttemptFlags, PhaseOutcome, SubAttack, Termination};
use super::aux::{AUX_ATTACKS, AuxAttack, apply_aux_brand};
use super::context::{AttackConfirmation, CombatContext};
use super::damage::{
    FinalModifiers, attack_strength_punctuation, aux_damage, monster_melee_damage, player_melee_damage,
};
use super::effects::{
    EffectContext, EffectRegistry, FlavourOutcome, afflict, be, inflict_drain, inflict_weakness,
};
use super::error::CombatError;
use super::heads::{Decapitation, decapitate};
use super::hit::{
    HitConditions, HitRoll, aux_to_hit, evasion_adverb, monster_to_hit, player_to_hit,
    post_roll_modifiers, shield_blocks, stab_check, test_hit,
};
use super::report::{AttackReport, SwingKind, SwingOutcome, SwingRecord};
use super::retaliation::{self, Reaction};
use super::types::{AttackType, Brand, DamageType, Flavour, Manoeuvre};
use crate::config::GameConfig;
use crate::env::{Dice, GameEnv, MapOracle, SightPolicy, SpeciesFlags, TerrainKind, stream};
use crate::message::{MessageChannel, MessageSink};
use crate::noise::NoiseEvent;
use crate::sight;
use crate::state::{
    ActorState, Behaviour, Cloud, EntityId, Form, GearFlags, Harm, MutationKind, PlayerTraits,
    Position, StatusKind, Step, Weapon,
};

/// Board changes that need the whole state, applied once the swing's actors
/// are released.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Deferred {
    Knockback { target: EntityId, to: Position },
    Drag { attacker: EntityId, defender: EntityId },
    Cloud { at: Position, cloud: Cloud },
}

/// Where the to-hit phase sends the swing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Branch {
    Blocked,
    Dodged,
    Hit,
}

impl Branch {
    fn outcome(self) -> SwingOutcome {
        match self {
            Branch::Blocked => SwingOutcome::Blocked,
            Branch::Dodged => SwingOutcome::Missed,
            Branch::Hit => SwingOutcome::Hit,
        }
    }
}

/// What a swing left behind for the caller that launched it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SwingSummary {
    occurred: bool,
    cancelled: bool,
    effective: i32,
}

/// Result of the phases that run before the noise step.
struct Opening {
    attempt: AttackAttempt,
    branch: Option<Branch>,
    stop: Option<Termination>,
    cleave_targets: Vec<EntityId>,
}

/// Resolves melee attacks against a [`CombatContext`].
pub struct AttackResolver<'a> {
    ctx: CombatContext<'a>,
    map: &'a dyn MapOracle,
    dice: Dice<'a>,
    queue: VecDeque<SubAttack>,
    spawned: usize,
    follow_ups: Vec<SubAttack>,
    deferred: Vec<Deferred>,
    manoeuvre: Manoeuvre,
    manoeuvre_targets: i32,
    report: AttackReport,
}

impl<'a> AttackResolver<'a> {
    /// Binds the resolver to a context.
    ///
    /// # Errors
    ///
    /// Fails when the environment lacks the map or RNG oracle.
    pub fn new(ctx: CombatContext<'a>) -> Result<Self, CombatError> {
        let map = ctx.env.map()?;
        let rng = ctx.env.rng()?;
        let dice = Dice::new(rng, ctx.state.game_seed, ctx.state.nonce, stream::COMBAT);
        Ok(Self {
            ctx,
            map,
            dice,
            queue: VecDeque::new(),
            spawned: 0,
            follow_ups: Vec::new(),
            deferred: Vec::new(),
            manoeuvre: Manoeuvre::None,
            manoeuvre_targets: 1,
            report: AttackReport::default(),
        })
    }

    /// Attaches a martial manoeuvre to every player swing, and the number of
    /// targets it sweeps.
    pub fn with_manoeuvre(mut self, manoeuvre: Manoeuvre, targets: i32) -> Self {
        self.manoeuvre = manoeuvre;
        self.manoeuvre_targets = targets.max(1);
        self
    }

    pub fn report(&self) -> &AttackReport {
        &self.report
    }

    pub fn finish(self) -> AttackReport {
        self.report
    }

    /// Resolves one attack and every follow-up it spawns.
    ///
    /// Returns whether the attack occurred. Refused, unreachable or fumbled
    /// swings return `false` without damage.
    ///
    /// # Errors
    ///
    /// [`CombatError::UnknownActor`] when either id is missing from the
    /// roster; oracle and noise failures propagate.
    pub fn resolve_attack(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        attack_number: usize,
        effective_attack_number: i32,
    ) -> Result<bool, CombatError> {
        let root = SubAttack::new(attacker, defender, attack_number)
            .with_effective(effective_attack_number);
        Ok(self.run(root)?.occurred)
    }

    /// Resolves a swing built by the caller, such as an electrically charged
    /// lunge or one with a damage multiplier.
    ///
    /// # Errors
    ///
    /// Same as [`AttackResolver::resolve_attack`].
    pub fn resolve_swing(&mut self, swing: SubAttack) -> Result<bool, CombatError> {
        Ok(self.run(swing)?.occurred)
    }

    /// Launches a full attack set: one swing for monsters, one or two weapon
    /// swings for the player.
    ///
    /// # Errors
    ///
    /// Same as [`AttackResolver::resolve_attack`].
    pub fn launch_attack_set(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        allow_rev: bool,
    ) -> Result<bool, CombatError> {
        let actor = self.actor(attacker)?;
        if !actor.is_player() {
            return self.resolve_attack(attacker, defender, 0, 0);
        }
        let warmup = actor.mutation(MutationKind::Warmup) > 0;
        let delay = actor.attack_delay();
        let dual = actor.weapon.is_some() && actor.offhand.is_some();

        let target = self.actor(defender)?;
        let target_position = target.position;
        let rev_eligible = warmup && allow_rev && target.is_monster() && !target.wont_attack();
        let should_rev = rev_eligible && self.dice.one_chance_in(self.manoeuvre_targets);

        let success = if dual {
            self.dual_wield(attacker, defender, target_position)?
        } else {
            self.resolve_attack(attacker, defender, 0, 0)?
        };

        if should_rev {
            if let Some(traits) = self
                .ctx
                .state
                .actors
                .get_mut(attacker)
                .and_then(ActorState::player_traits_mut)
            {
                traits.rev = (traits.rev + delay).min(PlayerTraits::MAX_REV);
            }
        }
        Ok(success)
    }

    /// Runs every natural attack of a monster in order, carrying the
    /// effective attack index from one to the next. Players launch a normal
    /// attack set instead.
    ///
    /// # Errors
    ///
    /// Same as [`AttackResolver::resolve_attack`], plus a missing species.
    pub fn monster_attack_round(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
    ) -> Result<bool, CombatError> {
        let actor = self.actor(attacker)?;
        let Some(species) = actor.monster_traits().map(|m| m.species) else {
            return self.launch_attack_set(attacker, defender, true);
        };
        let count = self.ctx.env.species_def(species)?.attacks.len();

        let mut any = false;
        let mut effective = 0;
        for index in 0..count {
            let both_alive = self.actor(attacker)?.is_alive() && self.actor(defender)?.is_alive();
            if !both_alive {
                break;
            }
            let root = SubAttack::new(attacker, defender, index).with_effective(effective);
            let summary = self.run(root)?;
            any |= summary.occurred;
            effective = summary.effective + 1;
        }
        Ok(any)
    }

    // ========================================================================
    // Driver
    // ========================================================================

    fn dual_wield(
        &mut self,
        attacker: EntityId,
        defender: EntityId,
        target: Position,
    ) -> Result<bool, CombatError> {
        let offhand_first = self.dice.coinflip();
        let first = self.run(weapon_swing(attacker, defender, 0, 0, offhand_first))?;
        if first.cancelled {
            return Ok(first.occurred);
        }

        let second_is_offhand = !offhand_first;
        let effective = first.effective + 1;
        let (attacker_alive, defender_gone, second_cleaves) = {
            let a = self.actor(attacker)?;
            let d = self.actor(defender)?;
            let second = if second_is_offhand { a.offhand.as_ref() } else { a.weapon.as_ref() };
            (
                a.is_alive(),
                !d.is_alive() || a.aligned_with(d),
                second.is_some_and(Weapon::cleaves),
            )
        };

        if !attacker_alive || defender_gone {
            if attacker_alive && second_cleaves && !self.manoeuvre.blocks_cleave() {
                self.force_cleave(attacker, target, second_is_offhand, effective)?;
            }
            return Ok(true);
        }

        let second = self.run(weapon_swing(attacker, defender, 1, effective, second_is_offhand))?;
        Ok(first.occurred || second.occurred)
    }

    /// Cleaves around `target` after the original defender is gone.
    fn force_cleave(
        &mut self,
        attacker: EntityId,
        target: Position,
        offhand: bool,
        effective: i32,
    ) -> Result<(), CombatError> {
        self.spawned = 0;
        let mut flags = AttemptFlags::CLEAVING;
        if offhand {
            flags |= AttemptFlags::OFFHAND;
        }
        for victim in self.cleave_scan(attacker, target) {
            let swing = SubAttack::new(attacker, victim, 1)
                .with_effective(effective)
                .with_flags(flags)
                .with_kind(SwingKind::Cleave);
            self.enqueue(swing);
        }
        self.drain()
    }

    fn run(&mut self, root: SubAttack) -> Result<SwingSummary, CombatError> {
        self.spawned = 0;
        let summary = self.fight(root)?;
        self.drain()?;
        Ok(summary)
    }

    fn drain(&mut self) -> Result<(), CombatError> {
        while let Some(next) = self.queue.pop_front() {
            self.fight(next)?;
        }
        Ok(())
    }

    fn enqueue(&mut self, sub: SubAttack) {
        if self.spawned >= GameConfig::MAX_QUEUED_ATTACKS {
            tracing::warn!(
                target: "crawl_core::combat",
                attacker = %sub.attacker,
                defender = %sub.defender,
                kind = ?sub.kind,
                "sub-attack budget exhausted, dropping follow-up"
            );
            return;
        }
        self.spawned += 1;
        self.queue.push_back(sub);
    }

    fn actor(&self, id: EntityId) -> Result<&ActorState, CombatError> {
        self.ctx
            .state
            .actors
            .get(id)
            .ok_or_else(|| CombatError::unknown_actor(id, self.ctx.state.nonce))
    }

    /// Living actors adjacent to the attacker, clockwise from the direction
    /// of `target`, that are not on the attacker's side.
    fn cleave_scan(&self, attacker: EntityId, target: Position) -> Vec<EntityId> {
        let roster = &self.ctx.state.actors;
        let Some(actor) = roster.get(attacker) else {
            return Vec::new();
        };
        let origin = actor.position;
        let start = origin.step_toward(target).compass_index().unwrap_or(0);
        (0..Step::NEIGHBOURS.len())
            .map(|k| Step::NEIGHBOURS[(start + k) % Step::NEIGHBOURS.len()])
            .filter_map(|step| roster.at(origin.offset(step)))
            .filter(|&id| id != attacker)
            .filter(|&id| roster.get(id).is_some_and(|other| !other.aligned_with(actor)))
            .collect()
    }

    fn cleave_targets_for(&self, sub: &SubAttack) -> Result<Vec<EntityId>, CombatError> {
        if !sub.is_root() || sub.flags.contains(AttemptFlags::PROJECTED) {
            return Ok(Vec::new());
        }
        let attacker = self.actor(sub.attacker)?;
        let defender = self.actor(sub.defender)?;
        let cleaves = swing_weapon(attacker, sub).is_some_and(Weapon::cleaves);
        if !cleaves || attacker.position == defender.position {
            return Ok(Vec::new());
        }
        let mut targets = self.cleave_scan(sub.attacker, defender.position);
        targets.retain(|&id| id != sub.defender);
        Ok(targets)
    }

    fn bout(&mut self, attacker: EntityId, defender: EntityId) -> Result<Bout<'_, 'a>, CombatError> {
        let Self {
            ctx,
            map,
            dice,
            follow_ups,
            deferred,
            manoeuvre,
            manoeuvre_targets,
            report,
            ..
        } = self;
        let nonce = ctx.state.nonce;
        let (attacker, defender) = ctx
            .state
            .actors
            .pair_mut(attacker, defender)
            .ok_or_else(|| CombatError::unknown_actor(defender, nonce))?;
        Ok(Bout {
            attacker,
            defender,
            dice,
            messages: &mut *ctx.messages,
            report,
            follow_ups,
            deferred,
            map: *map,
            env: ctx.env,
            effects: ctx.effects,
            config: ctx.config,
            confirm: ctx.confirm,
            manoeuvre: *manoeuvre,
            manoeuvre_targets: *manoeuvre_targets,
        })
    }

    /// Runs one swing through every phase.
    fn fight(&mut self, sub: SubAttack) -> Result<SwingSummary, CombatError> {
        self.actor(sub.attacker)?;
        self.actor(sub.defender)?;

        let mut summary = SwingSummary {
            occurred: false,
            cancelled: false,
            effective: sub.effective_attack_number,
        };
        if sub.attacker == sub.defender {
            tracing::trace!(target: "crawl_core::combat", actor = %sub.attacker, "self-attack declined");
            return Ok(summary);
        }

        let cleave_targets = self.cleave_targets_for(&sub)?;
        let opening = self.bout(sub.attacker, sub.defender)?.open(&sub, cleave_targets)?;
        let Opening {
            mut attempt,
            branch,
            stop,
            cleave_targets,
        } = opening;

        summary.effective = attempt.effective_attack_number;
        summary.cancelled = attempt.cancelled();
        summary.occurred = attempt.occurred();

        if let Some(reason) = stop {
            let outcome = match reason {
                Termination::Declined => SwingOutcome::Declined,
                Termination::Cancelled => SwingOutcome::Cancelled,
                Termination::Vetoed => SwingOutcome::Vetoed,
                Termination::Absorbed => SwingOutcome::Absorbed,
                Termination::DefenderKilled | Termination::AttackerKilled => {
                    branch.map_or(SwingOutcome::Hit, Branch::outcome)
                }
            };
            let exploded = reason == Termination::AttackerKilled && branch.is_none() && attempt.occurred();
            if !matches!(reason, Termination::Declined | Termination::Cancelled) {
                let mut bout = self.bout(sub.attacker, sub.defender)?;
                if reason == Termination::DefenderKilled {
                    bout.killed(&attempt);
                }
                bout.end(&attempt, branch == Some(Branch::Hit), &cleave_targets);
            }
            self.conclude(&attempt, outcome, reason);
            summary.occurred = exploded;
            return Ok(summary);
        }

        let branch = branch.unwrap_or(Branch::Dodged);
        self.apply_deferred();
        self.make_noise(&attempt)?;

        {
            let mut bout = self.bout(sub.attacker, sub.defender)?;
            bout.alert_defender();
            if !bout.defender.is_alive() {
                bout.killed(&attempt);
            }
            bout.aux(&mut attempt);
            bout.end(&attempt, branch == Branch::Hit, &cleave_targets);
        }
        self.conclude(&attempt, branch.outcome(), Termination::Declined);
        Ok(summary)
    }

    /// Records the swing, applies board changes and queues follow-ups.
    fn conclude(&mut self, attempt: &AttackAttempt, outcome: SwingOutcome, reason: Termination) {
        let landed = matches!(outcome, SwingOutcome::Hit);
        self.report.record(SwingRecord {
            attacker: attempt.attacker,
            defender: attempt.defender,
            kind: attempt.kind,
            outcome,
            damage: if landed { attempt.damage_done } else { 0 },
            special: attempt.special_damage,
        });
        tracing::debug!(
            target: "crawl_core::combat",
            attacker = %attempt.attacker,
            defender = %attempt.defender,
            kind = ?attempt.kind,
            outcome = ?outcome,
            reason = ?reason,
            damage = attempt.damage_done,
            special = attempt.special_damage,
            "swing resolved"
        );

        self.apply_deferred();
        for follow_up in std::mem::take(&mut self.follow_ups) {
            self.enqueue(follow_up);
        }
    }

    fn apply_deferred(&mut self) {
        for change in std::mem::take(&mut self.deferred) {
            match change {
                Deferred::Knockback { target, to } => {
                    if !self.ctx.state.is_vacant(self.map, to) {
                        continue;
                    }
                    if let Some(actor) = self.ctx.state.actors.get_mut(target) {
                        actor.position = to;
                        self.ctx.messages.push(
                            MessageChannel::Combat,
                            format!("{} {} knocked back.", actor.subject(), be(actor)),
                        );
                    }
                }
                Deferred::Drag { attacker, defender } => {
                    let Some((from, held)) = self
                        .ctx
                        .state
                        .actors
                        .get(attacker)
                        .zip(self.ctx.state.actors.get(defender))
                        .map(|(a, d)| (a.position, d.position))
                    else {
                        continue;
                    };
                    if !from.is_adjacent(held) {
                        continue;
                    }
                    let back = from.offset(held.step_toward(from));
                    if !self.ctx.state.is_vacant(self.map, back) {
                        continue;
                    }
                    if let Some((a, d)) = self.ctx.state.actors.pair_mut(attacker, defender) {
                        a.position = back;
                        d.position = from;
                        self.ctx.messages.push(
                            MessageChannel::Combat,
                            format!("{} {} {} backwards!", a.subject(), a.conj("drag"), d.object()),
                        );
                    }
                }
                Deferred::Cloud { at, cloud } => self.ctx.state.place_cloud(at, cloud),
            }
        }
    }

    /// Emits the swing's noise at the defender's cell.
    ///
    /// # Formula
    ///
    /// ```text
    /// loudness = clamp(damage_done / 4, 1, 12)
    /// ```
    fn make_noise(&mut self, attempt: &AttackAttempt) -> Result<(), CombatError> {
        let attacker = self.actor(attempt.attacker)?;
        let defender = self.actor(attempt.defender)?;
        if attempt.stabbed() || attacker.has_flag(SpeciesFlags::PLAYER_SHADOW) {
            return Ok(());
        }
        let loudness = (attempt.damage_done / 4).clamp(1, 12);
        let event = NoiseEvent::from_loudness(defender.position, loudness, Some(attempt.attacker))
            .with_description("the sound of combat");
        let nonce = self.ctx.state.nonce;
        self.ctx
            .state
            .noise
            .register_noise(event, &self.ctx.config.noise)
            .map_err(|err| err.at_nonce(nonce))?;
        Ok(())
    }
}

fn weapon_swing(
    attacker: EntityId,
    defender: EntityId,
    attack_number: usize,
    effective: i32,
    offhand: bool,
) -> SubAttack {
    let swing = SubAttack::new(attacker, defender, attack_number).with_effective(effective);
    if offhand {
        swing
            .with_flags(AttemptFlags::OFFHAND)
            .with_kind(SwingKind::Offhand)
    } else {
        swing
    }
}

/// Weapon a swing would use. Monsters only wield for their first attack.
fn swing_weapon<'w>(attacker: &'w ActorState, sub: &SubAttack) -> Option<&'w Weapon> {
    if attacker.is_monster() {
        return if sub.attack_number == 0 { attacker.weapon.as_ref() } else { None };
    }
    if sub.flags.contains(AttemptFlags::OFFHAND) {
        attacker.offhand.as_ref()
    } else {
        attacker.weapon.as_ref().or(attacker.offhand.as_ref())
    }
}

fn player_verb(damage_type: DamageType, armed: bool) -> &'static str {
    if damage_type.contains(DamageType::CHOPPING) {
        "chop"
    } else if damage_type.contains(DamageType::SLICING) {
        "slice"
    } else if damage_type.contains(DamageType::PIERCING) {
        "pierce"
    } else if damage_type.contains(DamageType::CLAWING) {
        "claw"
    } else if armed {
        "bludgeon"
    } else {
        "hit"
    }
}

// ============================================================================
// Phases
// ============================================================================

/// The two actors of a swing plus everything the phases touch, borrowed
/// field by field from the resolver.
struct Bout<'s, 'a> {
    attacker: &'s mut ActorState,
    defender: &'s mut ActorState,
    dice: &'s mut Dice<'a>,
    messages: &'s mut (dyn MessageSink + 'a),
    report: &'s mut AttackReport,
    follow_ups: &'s mut Vec<SubAttack>,
    deferred: &'s mut Vec<Deferred>,
    map: &'a dyn MapOracle,
    env: GameEnv<'a>,
    effects: &'a EffectRegistry,
    config: &'a GameConfig,
    confirm: &'a dyn AttackConfirmation,
    manoeuvre: Manoeuvre,
    manoeuvre_targets: i32,
}

impl Bout<'_, '_> {
    fn say(&mut self, text: String) {
        self.messages.push(MessageChannel::Combat, text);
    }

    /// Setup, attempted, to-hit and the blocked/dodged/hit branch.
    fn open(
        mut self,
        sub: &SubAttack,
        cleave_targets: Vec<EntityId>,
    ) -> Result<Opening, CombatError> {
        let mut attempt = match self.setup(sub)? {
            PhaseOutcome::Continue(attempt) => attempt,
            PhaseOutcome::End(reason) => {
                return Ok(Opening {
                    attempt: AttackAttempt::new(sub, self.attacker.position),
                    branch: None,
                    stop: Some(reason),
                    cleave_targets,
                });
            }
        };
        let stopped = |attempt, branch, reason| Opening {
            attempt,
            branch,
            stop: Some(reason),
            cleave_targets: Vec::new(),
        };

        if attempt.is_root() {
            if let PhaseOutcome::End(reason) = self.attempted(&mut attempt) {
                return Ok(stopped(attempt, None, reason));
            }
        } else {
            attempt.flags |= AttemptFlags::ATTACK_OCCURRED;
        }

        if self.attacker.has_flag(SpeciesFlags::SELF_DESTRUCT) {
            self.say(format!("{} explodes!", self.attacker.subject()));
            self.attacker.hurt(Harm::InstantDeath);
            self.report.record_kill(self.attacker.id);
            return Ok(stopped(attempt, None, Termination::AttackerKilled));
        }

        let branch = match self.to_hit(&mut attempt) {
            PhaseOutcome::Continue(branch) => branch,
            PhaseOutcome::End(reason) => return Ok(stopped(attempt, None, reason)),
        };

        let outcome = match branch {
            Branch::Blocked => self.blocked(&attempt),
            Branch::Dodged | Branch::Hit => match self.spines(&attempt) {
                PhaseOutcome::End(reason) => PhaseOutcome::End(reason),
                PhaseOutcome::Continue(()) if branch == Branch::Hit => self.hit(&mut attempt),
                PhaseOutcome::Continue(()) => self.dodged(&attempt),
            },
        };

        let stop = match outcome {
            PhaseOutcome::Continue(()) => None,
            PhaseOutcome::End(reason) => Some(reason),
        };
        let cleave_targets = if stop == Some(Termination::AttackerKilled) && branch != Branch::Hit {
            Vec::new()
        } else {
            cleave_targets
        };
        Ok(Opening {
            attempt,
            branch: Some(branch),
            stop,
            cleave_targets,
        })
    }

    fn setup(&mut self, sub: &SubAttack) -> Result<PhaseOutcome<AttackAttempt>, CombatError> {
        if !self.attacker.is_alive() || !self.defender.is_alive() {
            return Ok(PhaseOutcome::End(Termination::Declined));
        }

        let mut attempt = AttackAttempt::new(sub, self.attacker.position);
        if self.attacker.is_player() {
            attempt.manoeuvre = self.manoeuvre;
        }
        let weapon = swing_weapon(self.attacker, sub).cloned();

        if let Some(traits) = self.attacker.player_traits() {
            match &weapon {
                Some(w) => {
                    attempt.base_damage = w.damage;
                    attempt.damage_type = w.damage_type;
                    attempt.brand = w.brand;
                }
                None => {
                    attempt.base_damage = traits.unarmed_damage();
                    attempt.damage_type = if traits.mutation(MutationKind::Claws) > 0 {
                        DamageType::CLAWING
                    } else {
                        DamageType::CRUSHING
                    };
                }
            }
            attempt.weapon = weapon;
        } else {
            let species = self
                .attacker
                .monster_traits()
                .map(|m| m.species)
                .ok_or_else(|| CombatError::unknown_actor(self.attacker.id, self.dice.nonce()))?;
            match self.env.species_def(species)?.attack(sub.attack_number) {
                Some(natural) => {
                    attempt.attack_type = natural.kind;
                    attempt.flavour = natural.flavour;
                    attempt.base_damage = natural.damage;
                    attempt.damage_type = natural.kind.damage_type();
                }
                None => attempt.attack_type = AttackType::None,
            }
            if attempt.attack_type == AttackType::Hit {
                if let Some(w) = weapon {
                    attempt.damage_type = w.damage_type;
                    attempt.brand = w.brand;
                    attempt.weapon = Some(w);
                }
            }
        }

        if attempt.weapon.as_ref().is_some_and(|w| w.chaotic) {
            attempt.brand = Brand::Chaos;
        }
        Ok(PhaseOutcome::Continue(attempt))
    }

    fn attempted(&mut self, attempt: &mut AttackAttempt) -> PhaseOutcome<()> {
        let distance = self.attacker.position.distance(self.defender.position);
        let reach = attempt.weapon.as_ref().map_or(1, |w| w.reach.max(1));
        let reachable = distance <= 1
            || (reach >= distance
                && self.map.line_of_sight(
                    self.attacker.position,
                    self.defender.position,
                    SightPolicy::AllBlocks,
                ))
            || (attempt.flavour.reaches() && distance <= 2)
            || attempt.is_projected();
        let skipped = attempt.attack_type == AttackType::Constrict
            && self.defender.has_flag(SpeciesFlags::UNCONSTRICTABLE);
        if !reachable || skipped {
            attempt.effective_attack_number -= 1;
            return PhaseOutcome::End(Termination::Declined);
        }

        if self.attacker.is_player()
            && attempt.attack_number == 0
            && !attempt.is_riposte()
            && !self.confirm.confirm(self.attacker, self.defender)
        {
            attempt.flags |= AttemptFlags::CANCELLED;
            return PhaseOutcome::End(Termination::Cancelled);
        }

        if self.attacker.is_monster()
            && attempt.attack_number == 0
            && !attempt.is_projected()
            && !attempt.is_riposte()
        {
            let cost = self
                .dice
                .div_rand_round(self.config.combat.attack_energy * self.attacker.attack_delay(), 10);
            self.attacker.energy -= cost;
        }

        if attempt.attack_type == AttackType::None {
            return PhaseOutcome::End(Termination::Declined);
        }

        let in_deep_water = self
            .map
            .tile(self.attacker.position)
            .is_some_and(|tile| tile.terrain() == TerrainKind::DeepWater);
        if in_deep_water
            && !self.attacker.can_fly()
            && !self.attacker.has_flag(SpeciesFlags::AMPHIBIOUS)
            && self.dice.one_chance_in(3)
        {
            let text = format!("{} {} in the water.", self.attacker.subject(), self.attacker.conj("stumble"));
            self.say(text);
            return PhaseOutcome::End(Termination::Declined);
        }

        if self.attacker.is_player()
            && self.attacker.is_afraid_of(self.defender.id)
            && self.dice.one_chance_in(3)
        {
            let text = format!("You flinch away from {}.", self.defender.object());
            self.say(text);
            return PhaseOutcome::End(Termination::Declined);
        }

        let defender_sees = sight::can_see(self.map, self.defender, self.attacker);
        if (attempt.flavour == Flavour::ShadowStab && !defender_sees)
            || attempt.is_projected()
            || self.attacker.has_flag(SpeciesFlags::AUTO_HIT)
        {
            attempt.flags |= AttemptFlags::AUTO_HIT;
        }
        let grappled = self
            .defender
            .statuses
            .get(StatusKind::Grappled)
            .is_some_and(|s| s.source == Some(self.attacker.id));
        if grappled {
            attempt.flags |= AttemptFlags::AUTO_HIT;
            attempt.flat_damage_bonus = self.dice.random_range(0, 3);
            self.defender.remove_status(StatusKind::Grappled);
        }

        attempt.flags |= AttemptFlags::ATTACK_OCCURRED;
        PhaseOutcome::Continue(())
    }

    fn to_hit(&mut self, attempt: &mut AttackAttempt) -> PhaseOutcome<Branch> {
        let attacker_sees = sight::can_see(self.map, self.attacker, self.defender);
        let defender_sees = sight::can_see(self.map, self.defender, self.attacker);
        let conditions = HitConditions::between(self.attacker, self.defender, attacker_sees);
        let config = self.config;
        let policy = &config.combat;

        attempt.to_hit = match self.attacker.player_traits() {
            Some(traits) => player_to_hit(self.dice, traits, attempt.weapon.as_ref(), conditions),
            None => monster_to_hit(self.dice, self.attacker, attempt.weapon.as_ref(), conditions),
        };
        if attempt.charge_pow > 0 {
            attempt.to_hit += 5;
        }

        let roll = if attempt.auto_hits() {
            HitRoll::Automatic
        } else {
            test_hit(
                self.dice,
                attempt.to_hit,
                self.defender.ev,
                self.attacker.is_monster(),
                policy,
            )
        };
        attempt.ev_margin = roll.margin();
        let mut hits = roll.hits();
        let mut blocked = !attempt.auto_hits()
            && shield_blocks(self.dice, self.defender, attempt.to_hit, !defender_sees);

        if self.attacker.is_player() {
            if hits && self.attacker.has(StatusKind::DivinePenance) && self.dice.one_chance_in(20) {
                self.say("Your former god blocks your attack.".to_string());
                return PhaseOutcome::End(Termination::Vetoed);
            }
            let bonus = stab_check(
                self.dice,
                self.attacker,
                self.defender,
                defender_sees,
                attempt.weapon.as_ref(),
            );
            if bonus > 0 {
                attempt.stab_bonus = bonus;
                attempt.flags |= AttemptFlags::STAB | AttemptFlags::AUTO_HIT;
                attempt.ev_margin = attempt.ev_margin.max(0);
                hits = true;
                blocked = false;
            }
            if attempt.manoeuvre == Manoeuvre::Momentum {
                attempt.flags |= AttemptFlags::AUTO_HIT;
                attempt.ev_margin = attempt.ev_margin.max(0);
                hits = true;
            }
        }

        let branch = if blocked {
            Branch::Blocked
        } else if hits {
            Branch::Hit
        } else {
            Branch::Dodged
        };
        tracing::trace!(
            target: "crawl_core::combat",
            to_hit = attempt.to_hit,
            margin = attempt.ev_margin,
            branch = ?branch,
            "to-hit rolled"
        );
        PhaseOutcome::Continue(branch)
    }

    fn blocked(&mut self, attempt: &AttackAttempt) -> PhaseOutcome<()> {
        self.defender.add_status(StatusKind::ShieldExhausted, 1);
        let text = format!(
            "{} {} {} attack.",
            self.defender.subject(),
            self.defender.conj("block"),
            self.attacker.possessive()
        );
        self.say(text);

        if self.defender.is_player()
            && self.defender.has(StatusKind::DivineShield)
            && self.dice.coinflip()
        {
            let turns = self.dice.random_range(3, 5);
            afflict(self.attacker, StatusKind::Blind, turns, self.defender.id);
            let text = format!("{} {} blinded by the divine light.", self.attacker.subject(), be(self.attacker));
            self.say(text);
        }

        self.maybe_riposte(attempt);
        self.attacker_survives()
    }

    fn spines(&mut self, attempt: &AttackAttempt) -> PhaseOutcome<()> {
        if attempt.is_riposte() || !self.defender.position.is_adjacent(attempt.attack_position) {
            return PhaseOutcome::Continue(());
        }
        if self.attacker.is_monster() && attempt.effective_attack_number > 0 {
            return PhaseOutcome::Continue(());
        }
        if let Some(reaction) = retaliation::spines(self.dice, self.attacker, self.defender) {
            self.retaliate(reaction);
        }
        self.attacker_survives()
    }

    fn dodged(&mut self, attempt: &AttackAttempt) -> PhaseOutcome<()> {
        let text = format!(
            "{}{} {} {}.",
            self.attacker.subject(),
            evasion_adverb(attempt.ev_margin),
            self.attacker.conj("miss"),
            self.defender.object()
        );
        self.say(text);

        if self.attacker.is_player() && self.defender.is_monster() && !self.defender.is_asleep() {
            self.defender.behaviour = Behaviour::Fighting;
            self.defender.foe = Some(self.attacker.id);
        }

        let can_retaliate = sight::can_see(self.map, self.defender, self.attacker)
            && self.defender.can_act()
            && !self.defender.is_confused()
            && !self.defender.aligned_with(self.attacker)
            && attempt.effective_attack_number <= 0;
        if can_retaliate {
            if let Some(reaction) = retaliation::minotaur_headbutt(self.dice, self.attacker, self.defender) {
                self.retaliate(reaction);
            }
            if self.attacker.is_alive() {
                let policy = &self.config.combat;
                if let Some(reaction) =
                    retaliation::reflexive_headbutt(self.dice, self.attacker, self.defender, policy)
                {
                    self.retaliate(reaction);
                }
            }
        }

        self.maybe_riposte(attempt);
        self.attacker_survives()
    }

    fn maybe_riposte(&mut self, attempt: &AttackAttempt) {
        if !self.defender.gear.contains(GearFlags::RIPOSTE)
            || attempt.is_riposte()
            || !self.defender.can_act()
            || !self.attacker.is_alive()
        {
            return;
        }
        if self.defender.position.distance(self.attacker.position) > self.defender.reach() {
            return;
        }
        if !self.dice.one_chance_in(self.config.combat.riposte_one_in) {
            return;
        }
        let text = format!("{} {}!", self.defender.subject(), self.defender.conj("riposte"));
        self.say(text);
        self.follow_ups.push(
            SubAttack::new(self.defender.id, self.attacker.id, 0)
                .with_effective(attempt.effective_attack_number + 1)
                .with_flags(AttemptFlags::RIPOSTE)
                .with_kind(SwingKind::Riposte),
        );
    }

    fn hit(&mut self, attempt: &mut AttackAttempt) -> PhaseOutcome<()> {
        let config = self.config;
        let policy = &config.combat;
        let defender_sees = sight::can_see(self.map, self.defender, self.attacker);
        attempt.damage_done = if self.attacker.is_player() {
            player_melee_damage(self.dice, self.attacker, self.defender, attempt, policy)
        } else {
            monster_melee_damage(self.dice, self.attacker, self.defender, attempt, policy, !defender_sees)
        };

        if self.attacker.is_player() {
            let severed = decapitate(
                self.dice,
                self.attacker,
                self.defender,
                attempt,
                attempt.damage_done,
                policy,
                self.messages,
            );
            if severed == Decapitation::Killed {
                return PhaseOutcome::End(Termination::DefenderKilled);
            }
        }

        if attempt.damage_done > 0 {
            if let PhaseOutcome::End(reason) = self.damaged(attempt) {
                return PhaseOutcome::End(reason);
            }
        } else {
            let verb = self.verb(attempt);
            let text = format!(
                "{} {} {} but {} no damage.",
                self.attacker.subject(),
                verb,
                self.defender.object(),
                if self.attacker.is_player() { "do" } else { "does" }
            );
            self.say(text);
        }

        if attempt.brand != Brand::None && attempt.damage_done > 0 && self.defender.is_alive() {
            let outcome = {
                let mut ctx = EffectContext {
                    attacker: &mut *self.attacker,
                    defender: &mut *self.defender,
                    damage: attempt.damage_done,
                    dice: &mut *self.dice,
                };
                self.effects.apply_brand(attempt.brand, &mut ctx)
            };
            self.inflict_special(attempt, outcome);
            if !self.defender.is_alive() {
                return PhaseOutcome::End(Termination::DefenderKilled);
            }
        }

        self.player_hit_effects(attempt);
        if !self.defender.is_alive() {
            return PhaseOutcome::End(Termination::DefenderKilled);
        }

        if self.attacker.is_monster() && self.defender.is_player() {
            self.passive_reactions();
        }
        if let Some(reaction) =
            retaliation::acid_splash(self.dice, self.attacker, self.defender, attempt.is_riposte())
        {
            self.retaliate(reaction);
        }
        self.attacker_survives()
    }

    /// Lifesteal, the sign of ruin and the player's on-hit mutations.
    fn player_hit_effects(&mut self, attempt: &AttackAttempt) {
        let attacker_id = self.attacker.id;

        let lifesteal = self.attacker.form() == Form::Vampire
            && attempt.damage_done > 0
            && self.defender.holiness.is_natural()
            && (attempt.stabbed() || self.attacker.hp * 2 <= self.attacker.max_hp);
        if lifesteal {
            let healed = self.dice.random2(attempt.damage_done);
            if self.attacker.heal(healed) > 0 {
                self.say("You feel better.".to_string());
            }
        }

        if self.defender.has(StatusKind::SignOfRuin)
            && attempt.damage_done + attempt.special_damage > 0
        {
            let drain = self.dice.random_range(30, 50);
            inflict_drain(self.defender, drain, attacker_id);
            match self.dice.random2(3) {
                0 => {
                    let turns = self.dice.random_range(5, 8);
                    afflict(self.defender, StatusKind::Slow, turns, attacker_id);
                }
                1 => inflict_weakness(self.defender, 6, attacker_id),
                _ => {
                    let turns = self.dice.random_range(5, 8);
                    afflict(self.defender, StatusKind::Blind, turns, attacker_id);
                }
            }
            let text = format!("The sign of ruin flares on {}!", self.defender.object());
            self.say(text);
        }

        if !self.attacker.is_player() || !self.defender.is_alive() {
            return;
        }

        if self.attacker.mutation(MutationKind::BlackMark) > 0
            && attempt.damage_done > 0
            && self.dice.one_chance_in(5)
        {
            let choices: Vec<StatusKind> = [StatusKind::Antimagic, StatusKind::Weak, StatusKind::Drained]
                .into_iter()
                .filter(|kind| match kind {
                    StatusKind::Weak => !self.defender.has(StatusKind::Weak),
                    StatusKind::Drained => self.defender.holiness.is_living(),
                    _ => true,
                })
                .collect();
            match self.dice.choose(&choices) {
                Some(StatusKind::Antimagic) => {
                    let turns = 4 + self.dice.random2(4);
                    afflict(self.defender, StatusKind::Antimagic, turns, attacker_id);
                }
                Some(StatusKind::Weak) => inflict_weakness(self.defender, 6, attacker_id),
                Some(_) => {
                    let amount = 10 + self.dice.random2(10);
                    inflict_drain(self.defender, amount, attacker_id);
                }
                None => {}
            }
        }

        if self.attacker.mutation(MutationKind::EngulfingOoze) > 0 && self.dice.coinflip() {
            afflict(self.defender, StatusKind::WaterHeld, 3, attacker_id);
            let text = format!("Your ooze engulfs {}.", self.defender.object());
            self.say(text);
        }
    }

    /// Reactions of a player defender to a monster's blow.
    fn passive_reactions(&mut self) {
        if let Some(reaction) = retaliation::passive_freeze(self.dice, self.attacker, self.defender) {
            self.retaliate(reaction);
        }
        if self.attacker.is_alive() {
            if let Some(reaction) = retaliation::fiery_armour(self.dice, self.attacker, self.defender) {
                self.retaliate(reaction);
            }
        }
        if let Some(cloud) = retaliation::foul_stench(self.dice, self.attacker, self.defender) {
            self.deferred.push(Deferred::Cloud {
                at: self.attacker.position,
                cloud,
            });
        }
    }

    fn damaged(&mut self, attempt: &mut AttackAttempt) -> PhaseOutcome<()> {
        let punctuation = attack_strength_punctuation(attempt.damage_done);

        if self.defender.is_player()
            && self.defender.mutation(MutationKind::SlimeShroud) > 0
            && !self.defender.has(StatusKind::ShroudTimeout)
            && self.dice.one_chance_in(4)
        {
            let timeout = 10 + self.dice.random2(attempt.damage_done);
            afflict(self.defender, StatusKind::ShroudTimeout, timeout, self.defender.id);
            let text = format!(
                "Your slimy shroud bends {} attack away{punctuation}",
                self.attacker.possessive()
            );
            self.say(text);
            attempt.damage_done = 0;
            return PhaseOutcome::End(Termination::Absorbed);
        }

        let verb = self.verb(attempt);
        let text = format!(
            "{} {} {}{punctuation}",
            self.attacker.subject(),
            verb,
            self.defender.object()
        );
        self.say(text);
        self.defender.hurt(Harm::Points(attempt.damage_done));

        if self.attacker.is_monster() {
            self.monster_damage_effects(attempt);
        } else {
            self.player_damage_effects(attempt);
        }

        if self.defender.is_alive() {
            PhaseOutcome::Continue(())
        } else {
            PhaseOutcome::End(Termination::DefenderKilled)
        }
    }

    fn monster_damage_effects(&mut self, attempt: &mut AttackAttempt) {
        if attempt.flavour != Flavour::Plain && self.defender.is_alive() {
            let outcome = {
                let mut ctx = EffectContext {
                    attacker: &mut *self.attacker,
                    defender: &mut *self.defender,
                    damage: attempt.damage_done,
                    dice: &mut *self.dice,
                };
                self.effects.apply_flavour(attempt.flavour, &mut ctx)
            };
            self.inflict_special(attempt, outcome);
        }
        if !self.defender.is_alive() {
            return;
        }

        let severed = decapitate(
            self.dice,
            self.attacker,
            self.defender,
            attempt,
            attempt.damage_done,
            &self.config.combat,
            self.messages,
        );
        if severed == Decapitation::Killed {
            return;
        }

        let adjacent = self.defender.position.is_adjacent(attempt.attack_position);
        match attempt.flavour {
            Flavour::Trample if adjacent => {
                let size_diff = self.attacker.size.rank() - self.defender.size.rank();
                if self.dice.x_chance_in_y(size_diff + 3, 6) {
                    let away = attempt.attack_position.step_toward(self.defender.position);
                    self.deferred.push(Deferred::Knockback {
                        target: self.defender.id,
                        to: self.defender.position.offset(away),
                    });
                }
            }
            Flavour::Drag if adjacent => self.deferred.push(Deferred::Drag {
                attacker: self.attacker.id,
                defender: self.defender.id,
            }),
            _ => {}
        }
    }

    fn player_damage_effects(&mut self, attempt: &AttackAttempt) {
        let gloves = self.attacker.gear.contains(GearFlags::POWER_GLOVES);
        if gloves {
            let gain = self.dice.div_rand_round(attempt.damage_done, 8);
            if let Some(traits) = self.attacker.player_traits_mut() {
                traits.mp = (traits.mp + gain).min(traits.max_mp);
            }
        }

        if self.attacker.form() == Form::Death
            && self.defender.is_alive()
            && self.defender.is_monster()
        {
            let source = self.attacker.id;
            afflict(self.defender, StatusKind::Slow, 5, source);
            inflict_weakness(self.defender, 5, source);
            if self.defender.holiness.is_natural() {
                inflict_drain(self.defender, 10, source);
            }
            let text = format!("{} {} blighted.", self.defender.subject(), be(self.defender));
            self.say(text);
        }
    }

    fn inflict_special(&mut self, attempt: &mut AttackAttempt, outcome: FlavourOutcome) {
        if let Some(text) = outcome.message {
            self.say(text);
        }
        if outcome.special_damage > 0 {
            self.defender.hurt(Harm::Points(outcome.special_damage));
            attempt.special_damage += outcome.special_damage;
        }
    }

    fn verb(&self, attempt: &AttackAttempt) -> String {
        if self.attacker.is_player() {
            player_verb(attempt.damage_type, attempt.weapon.is_some()).to_string()
        } else {
            self.attacker.conj(attempt.attack_type.verb())
        }
    }

    fn retaliate(&mut self, reaction: Reaction) {
        self.messages.push(MessageChannel::Combat, reaction.message);
        let dealt = self.attacker.hurt(Harm::Points(reaction.damage));
        self.report.record(SwingRecord {
            attacker: self.defender.id,
            defender: self.attacker.id,
            kind: SwingKind::Retaliation(reaction.name),
            outcome: SwingOutcome::Hit,
            damage: dealt,
            special: 0,
        });
        if !self.attacker.is_alive() {
            self.report.record_kill(self.attacker.id);
        }
    }

    fn attacker_survives(&self) -> PhaseOutcome<()> {
        if self.attacker.is_alive() {
            PhaseOutcome::Continue(())
        } else {
            PhaseOutcome::End(Termination::AttackerKilled)
        }
    }

    fn alert_defender(&mut self) {
        if self.defender.is_monster() && self.defender.is_alive() {
            self.defender.behaviour = Behaviour::Fighting;
            self.defender.foe = Some(self.attacker.id);
        }
    }

    fn killed(&mut self, attempt: &AttackAttempt) {
        self.report.record_kill(self.defender.id);

        let Some(traits) = self.attacker.player_traits() else {
            return;
        };
        let (xl, form, form_level) = (traits.xl, traits.form, traits.form_level);

        if form == Form::Maw
            && self.defender.is_monster()
            && self.defender.position.is_adjacent(attempt.attack_position)
            && !self.dice.one_chance_in(3)
        {
            let roll_xl = xl + self.dice.random2(xl);
            let roll_form = form_level + self.dice.random2(20);
            let healing = 1 + roll_xl.min(roll_form);
            let text = format!("You devour {}!", self.defender.object());
            self.say(text);
            self.attacker.heal(healing);
        }

        if self.attacker.mutation(MutationKind::MarkOfExecution) > 0
            && !self.attacker.has(StatusKind::Execution)
            && self.defender.is_monster()
            && !self.defender.wont_attack()
            && self.dice.one_chance_in(7)
        {
            afflict(self.attacker, StatusKind::Execution, 10, self.attacker.id);
            self.say("The mark of execution blazes!".to_string());
        }
    }

    fn aux(&mut self, attempt: &mut AttackAttempt) {
        if !self.attacker.is_player()
            || attempt.is_cleaving()
            || attempt.attack_number != 0
            || attempt.manoeuvre == Manoeuvre::TriggeredAux
            || attempt.is_projected()
        {
            return;
        }
        if self.defender.wont_attack()
            || !self.defender.position.is_adjacent(attempt.attack_position)
        {
            return;
        }

        for entry in AUX_ATTACKS.iter() {
            if !self.defender.is_alive() || !self.attacker.is_alive() {
                break;
            }
            if !entry.is_usable(self.attacker) {
                continue;
            }
            let chance = self.attacker.player_traits().map_or(0, |t| entry.trigger_chance(t));
            if !self.dice.x_chance_in_y(chance, 100) {
                continue;
            }
            if attempt.manoeuvre.is_martial() && !self.dice.one_chance_in(self.manoeuvre_targets) {
                continue;
            }
            self.aux_swing(entry, FinalModifiers::of(attempt));
        }
    }

    fn aux_swing(&mut self, entry: &'static AuxAttack, modifiers: FinalModifiers) {
        let Some(traits) = self.attacker.player_traits() else {
            return;
        };
        let kind = SwingKind::Aux(entry.name);
        let attacker_sees = sight::can_see(self.map, self.attacker, self.defender);
        let defender_sees = sight::can_see(self.map, self.defender, self.attacker);
        let conditions = HitConditions::between(self.attacker, self.defender, attacker_sees);

        let rolled = self.dice.random2(aux_to_hit(traits));
        let to_hit = post_roll_modifiers(rolled, true, conditions);
        let automatic = self.dice.one_chance_in(30);
        let mut record = SwingRecord {
            attacker: self.attacker.id,
            defender: self.defender.id,
            kind,
            outcome: SwingOutcome::Missed,
            damage: 0,
            special: 0,
        };

        if !automatic && to_hit < self.defender.ev {
            let text = format!("Your {} misses {}.", entry.name, self.defender.object());
            self.say(text);
            self.report.record(record);
            return;
        }
        if !automatic && shield_blocks(self.dice, self.defender, to_hit, !defender_sees) {
            self.defender.add_status(StatusKind::ShieldExhausted, 1);
            let text = format!(
                "{} {} your {}.",
                self.defender.subject(),
                self.defender.conj("block"),
                entry.name
            );
            self.say(text);
            record.outcome = SwingOutcome::Blocked;
            self.report.record(record);
            return;
        }

        let base = entry.roll_base(self.dice, traits);
        let verb = entry.verb_for(traits);
        let brand = entry.brand_for(traits);
        let damage = if entry.raw_damage {
            base
        } else {
            aux_damage(
                self.dice,
                self.attacker,
                self.defender,
                base,
                entry.ignores_ac,
                modifiers,
                &self.config.combat,
            )
        };

        let text = format!(
            "You {verb} {}{}",
            self.defender.object(),
            attack_strength_punctuation(damage)
        );
        self.say(text);
        self.defender.hurt(Harm::Points(damage));

        if damage > 0 || entry.is_constriction() {
            if entry.is_constriction() {
                afflict(self.defender, StatusKind::Constricted, 3, self.attacker.id);
            }
            if let Some(text) = apply_aux_brand(self.dice, brand, self.attacker.id, self.defender) {
                self.say(text);
            }
        }

        record.outcome = SwingOutcome::Hit;
        record.damage = damage;
        self.report.record(record);
        if !self.defender.is_alive() {
            self.report.record_kill(self.defender.id);
        }
    }

    fn end(&mut self, attempt: &AttackAttempt, hit: bool, cleave_targets: &[EntityId]) {
        let multihit = attempt.flags.contains(AttemptFlags::MULTIHIT);
        if !multihit {
            let extra = attempt.weapon.as_ref().map_or(0, |w| w.hits_per_swing.saturating_sub(1));
            for _ in 0..extra {
                self.follow_ups.push(attempt.follow_up(
                    self.defender.id,
                    AttemptFlags::MULTIHIT,
                    SwingKind::MultiHit,
                ));
            }
        }

        if !attempt.manoeuvre.blocks_cleave() && self.attacker.is_alive() {
            for &victim in cleave_targets {
                self.follow_ups
                    .push(attempt.follow_up(victim, AttemptFlags::CLEAVING, SwingKind::Cleave));
            }
        }

        if self.defender.is_player()
            && self.defender.is_alive()
            && self.attacker.id != self.defender.id
        {
            if let Some(text) = retaliation::eyeballs(self.dice, self.attacker, self.defender) {
                self.say(text);
            }
            if let Some(text) = retaliation::tendrils(self.dice, self.attacker, self.defender) {
                self.say(text);
            }
        }

        if self.attacker.is_alive() && self.attacker.is_monster() {
            self.attacker.remove_status(StatusKind::Rolling);
            if hit && self.attacker.has_flag(SpeciesFlags::BLAZEHEART) {
                let burn = self.attacker.max_hp / 3 + 1;
                self.attacker.hurt(Harm::Points(burn));
                let text = format!("{} core flares.", self.attacker.possessive_capitalised());
                self.say(text);
            } else if hit && self.attacker.has_flag(SpeciesFlags::CLOCKWORK) {
                let spent = self.attacker.monster_traits_mut().is_some_and(|m| {
                    m.charge = m.charge.saturating_sub(1);
                    m.charge == 0
                });
                if spent {
                    self.attacker.add_status(StatusKind::Dormant, u16::MAX);
                    let text = format!("{} winds down.", self.attacker.subject());
                    self.say(text);
                }
            }
        }

        if !multihit && attempt.brand == Brand::Spectral && self.defender.is_alive() {
            self.report.spectral_followups += 1;
        }

        if self.attacker.is_monster() && self.attacker.hp < 1 {
            self.report.record_kill(self.attacker.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{AlwaysProceed, RefuseAllies};
    use crate::env::{
        Env, MapDimensions, OracleError, RngOracle, SpeciesDef, SpeciesId, SpeciesOracle,
        StaticTile,
    };
    use crate::error::{ErrorSeverity, GameError};
    use crate::message::MessageLog;
    use crate::state::{GameState, StatusEffect};

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    struct Arena;

    impl MapOracle for Arena {
        fn dimensions(&self) -> MapDimensions {
            MapDimensions::new(9, 9)
        }

        fn tile(&self, position: Position) -> Option<StaticTile> {
            self.dimensions()
                .contains(position)
                .then(|| StaticTile::new(TerrainKind::Floor))
        }
    }

    struct Bestiary(Vec<SpeciesDef>);

    impl SpeciesOracle for Bestiary {
        fn species(&self, id: SpeciesId) -> Option<&SpeciesDef> {
            self.0.iter().find(|s| s.id == id)
        }
    }

    fn goblin() -> SpeciesDef {
        SpeciesDef::new(SpeciesId(1), "goblin", 2)
            .with_defences(40, 0, 0)
            .with_attack(AttackType::Hit, Flavour::Plain, 4)
    }

    fn duelist() -> SpeciesDef {
        SpeciesDef::new(SpeciesId(2), "duelist", 6)
            .with_defences(60, 0, 40)
            .with_attack(AttackType::Hit, Flavour::Plain, 6)
    }

    fn player() -> ActorState {
        ActorState::player("Ada", Position::new(4, 4), PlayerTraits::new(1, 10, 10))
    }

    fn state_with(actors: Vec<ActorState>) -> GameState {
        let mut state = GameState::new(MapDimensions::new(9, 9), 7);
        for actor in actors {
            state.actors.insert(actor);
        }
        state
    }

    fn run<F>(state: &mut GameState, rng: &FixedRng, log: &mut MessageLog, body: F) -> AttackReport
    where
        F: FnOnce(&mut AttackResolver<'_>),
    {
        run_with(&GameConfig::default(), state, rng, log, body)
    }

    fn run_with<F>(
        config: &GameConfig,
        state: &mut GameState,
        rng: &FixedRng,
        log: &mut MessageLog,
        body: F,
    ) -> AttackReport
    where
        F: FnOnce(&mut AttackResolver<'_>),
    {
        let bestiary = Bestiary(vec![goblin(), duelist()]);
        let registry = EffectRegistry::default();
        let env = Env::with_all(&Arena, &bestiary, rng).into_game_env();
        let ctx = CombatContext::new(state, env, &registry, config, log);
        let mut resolver = match AttackResolver::new(ctx) {
            Ok(resolver) => resolver,
            Err(err) => panic!("resolver: {err}"),
        };
        body(&mut resolver);
        resolver.finish()
    }

    #[test]
    fn unarmed_max_roll_lands_three() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let target = ActorState::monster(EntityId(1), &goblin(), Position::new(5, 4));
        let mut state = state_with(vec![player(), target]);

        let report = run(&mut state, &rng, &mut log, |r| {
            assert_eq!(r.resolve_attack(EntityId::PLAYER, EntityId(1), 0, 0), Ok(true));
        });

        assert_eq!(report.damage_to(EntityId(1)), 3);
        assert_eq!(state.actors.get(EntityId(1)).map(|g| g.hp), Some(37));
        assert!(log.contains("You hit the goblin."));
        assert_eq!(state.noise.pending().len(), 1);
    }

    #[test]
    fn charged_swing_electrocutes() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let target = ActorState::monster(EntityId(1), &goblin(), Position::new(5, 4));
        let mut state = state_with(vec![player(), target]);

        let report = run(&mut state, &rng, &mut log, |r| {
            let swing = SubAttack::new(EntityId::PLAYER, EntityId(1), 0).with_charge(150);
            assert_eq!(r.resolve_swing(swing), Ok(true));
        });

        // 3 + 3 * 150 / 150
        assert_eq!(report.damage_to(EntityId(1)), 6);
    }

    #[test]
    fn unknown_actor_is_an_error() {
        let rng = FixedRng(0);
        let mut log = MessageLog::new();
        let mut state = state_with(vec![player()]);
        state.nonce = 7;
        run(&mut state, &rng, &mut log, |r| {
            let err = r
                .resolve_attack(EntityId::PLAYER, EntityId(9), 0, 0)
                .expect_err("missing defender");
            assert_eq!(err, CombatError::unknown_actor(EntityId(9), 7));
            let context = err.context().expect("context");
            assert_eq!(context.actor, Some(EntityId(9)));
            assert_eq!(context.nonce, 7);
            assert_eq!(err.severity(), ErrorSeverity::Internal);
        });
    }

    #[test]
    fn refused_confirmation_cancels_without_damage() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let ally = ActorState::monster(EntityId(1), &goblin(), Position::new(5, 4))
            .with_attitude(crate::state::Attitude::Friendly);
        let mut state = state_with(vec![player(), ally]);

        let bestiary = Bestiary(vec![goblin()]);
        let registry = EffectRegistry::default();
        let config = GameConfig::default();
        let env = Env::with_all(&Arena, &bestiary, &rng).into_game_env();
        let ctx = CombatContext::new(&mut state, env, &registry, &config, &mut log)
            .with_confirmation(&RefuseAllies);
        let mut resolver = match AttackResolver::new(ctx) {
            Ok(resolver) => resolver,
            Err(err) => panic!("resolver: {err}"),
        };
        assert_eq!(resolver.launch_attack_set(EntityId::PLAYER, EntityId(1), true), Ok(false));
        let report = resolver.finish();
        assert_eq!(report.total_damage, 0);
        assert_eq!(report.swings[0].outcome, SwingOutcome::Cancelled);
    }

    #[test]
    fn unreachable_target_declines_and_lowers_the_index() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let far = ActorState::monster(EntityId(1), &goblin(), Position::new(8, 8));
        let mut state = state_with(vec![player(), far]);
        let report = run(&mut state, &rng, &mut log, |r| {
            assert_eq!(r.resolve_attack(EntityId::PLAYER, EntityId(1), 0, 0), Ok(false));
        });
        assert_eq!(report.swings[0].outcome, SwingOutcome::Declined);
        assert_eq!(state.actors.get(EntityId(1)).map(|g| g.hp), Some(40));
    }

    #[test]
    fn riposte_never_answers_a_riposte() {
        // Every dodge triggers a riposte and max rolls make both swings miss,
        // so each side would counter the other if ripostes could chain.
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let mut config = GameConfig::default();
        config.combat.riposte_one_in = 1;
        config.combat.auto_hit_miss_percent = 0;
        let fencer = player()
            .with_gear(GearFlags::RIPOSTE)
            .with_defences(0, 40);
        let foe = ActorState::monster(EntityId(1), &duelist(), Position::new(5, 4))
            .with_gear(GearFlags::RIPOSTE);
        let mut state = state_with(vec![fencer, foe]);

        let report = run_with(&config, &mut state, &rng, &mut log, |r| {
            let _ = r.resolve_attack(EntityId(1), EntityId::PLAYER, 0, 0);
        });

        assert_eq!(report.swings[0].outcome, SwingOutcome::Missed);
        let ripostes: Vec<_> = report.swings_of(SwingKind::Riposte).collect();
        assert_eq!(ripostes.len(), 1);
        assert_eq!(ripostes[0].attacker, EntityId::PLAYER);
        assert_eq!(ripostes[0].outcome, SwingOutcome::Missed);
    }

    #[test]
    fn eyeballs_gaze_back_at_a_missed_swing() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let mut config = GameConfig::default();
        config.combat.auto_hit_miss_percent = 0;
        let traits = PlayerTraits::new(1, 10, 10).with_mutation(MutationKind::Eyeballs, 10);
        let watcher = ActorState::player("Ada", Position::new(4, 4), traits).with_defences(0, 40);
        let foe = ActorState::monster(EntityId(1), &duelist(), Position::new(5, 4));
        let mut state = state_with(vec![watcher, foe]);

        let report = run_with(&config, &mut state, &rng, &mut log, |r| {
            assert_eq!(r.resolve_attack(EntityId(1), EntityId::PLAYER, 0, 0), Ok(true));
        });

        assert_eq!(report.swings[0].outcome, SwingOutcome::Missed);
        assert!(state.actors.get(EntityId(1)).is_some_and(|d| d.is_confused()));
        assert!(log.contains("The eyeballs on your body gaze at the duelist."));
    }

    #[test]
    fn monster_round_spends_energy_once() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let brute = ActorState::monster(EntityId(1), &goblin(), Position::new(5, 4));
        let mut state = state_with(vec![player().with_hp(100), brute]);
        run(&mut state, &rng, &mut log, |r| {
            assert_eq!(r.monster_attack_round(EntityId(1), EntityId::PLAYER), Ok(true));
        });
        assert_eq!(state.actors.get(EntityId(1)).map(|g| g.energy), Some(-10));
    }

    #[test]
    fn always_proceed_allows_everything() {
        let attacker = player();
        let defender = ActorState::monster(EntityId(1), &goblin(), Position::new(5, 4));
        assert!(AlwaysProceed.confirm(&attacker, &defender));
    }

    #[test]
    fn missing_rng_oracle_fails_construction() {
        let mut state = state_with(vec![player()]);
        let mut log = MessageLog::new();
        let registry = EffectRegistry::default();
        let config = GameConfig::default();
        let bestiary = Bestiary(Vec::new());
        let map: &dyn MapOracle = &Arena;
        let species: &dyn SpeciesOracle = &bestiary;
        let env = GameEnv::new(Some(map), Some(species), None);
        let ctx = CombatContext::new(&mut state, env, &registry, &config, &mut log);
        assert!(matches!(
            AttackResolver::new(ctx),
            Err(CombatError::Oracle(OracleError::RngNotAvailable))
        ));
    }

    #[test]
    fn stab_on_sleeper_is_silent() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let mut sleeper = ActorState::monster(EntityId(1), &goblin(), Position::new(5, 4));
        sleeper.behaviour = Behaviour::Sleeping;
        let mut state = state_with(vec![player(), sleeper]);
        run(&mut state, &rng, &mut log, |r| {
            assert_eq!(r.resolve_attack(EntityId::PLAYER, EntityId(1), 0, 0), Ok(true));
        });
        assert!(state.noise.pending().is_empty());
        let woken = state.actors.get(EntityId(1)).map(|g| g.behaviour);
        assert_eq!(woken, Some(Behaviour::Fighting));
    }

    #[test]
    fn grappled_defender_is_hit_automatically() {
        let rng = FixedRng(u32::MAX);
        let mut log = MessageLog::new();
        let slippery = ActorState::monster(EntityId(1), &duelist(), Position::new(5, 4))
            .with_status(StatusEffect::new(StatusKind::Grappled, 3).with_source(EntityId::PLAYER));
        let mut state = state_with(vec![player(), slippery]);
        let report = run(&mut state, &rng, &mut log, |r| {
            assert_eq!(r.resolve_attack(EntityId::PLAYER, EntityId(1), 0, 0), Ok(true));
        });
        assert_eq!(report.swings[0].outcome, SwingOutcome::Hit);
        let still_grappled = state.actors.get(EntityId(1)).map(|g| g.has(StatusKind::Grappled));
        assert_eq!(still_grappled, Some(false));
    }
}
