//! Scripted melee between the player and one monster.
//!
//! Both sides trade blows on the built-in arena (or a supplied map) until
//! one falls or the round limit runs out. Each round is one player attack
//! set, one monster attack round and an end-of-turn pass, so poison, status
//! decay and noise all run exactly as they would in play.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use console::style;
use crawl_core::state::{PlayerTraits, Skill};
use crawl_core::{
    ActorState, DamageType, EntityId, Message, MessageChannel, Position, Weapon,
};
use crawl_runtime::{GameEvent, Runtime, Topic, drain};

use crate::content::ContentArgs;

/// Fight a scripted melee
#[derive(Parser, Debug)]
pub struct Duel {
    /// Species name of the opponent
    #[arg(short, long, default_value = "goblin")]
    species: String,

    /// Maximum number of rounds
    #[arg(short, long, default_value_t = 10)]
    rounds: u32,

    /// Game seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Player weapon
    #[arg(short, long, value_enum, default_value = "axe")]
    weapon: WeaponChoice,

    /// Player experience level
    #[arg(long, default_value_t = 10)]
    level: i32,

    /// Print one JSON document instead of the narrative
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    content: ContentArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WeaponChoice {
    Unarmed,
    Axe,
    Sword,
    Mace,
    Spear,
}

impl WeaponChoice {
    fn weapon(self) -> Option<Weapon> {
        let weapon = match self {
            Self::Unarmed => return None,
            Self::Axe => Weapon::new("war axe", 11, Skill::Axes, DamageType::CHOPPING),
            Self::Sword => Weapon::new("long sword", 10, Skill::LongBlades, DamageType::SLICING),
            Self::Mace => Weapon::new("mace", 8, Skill::MacesFlails, DamageType::CRUSHING),
            Self::Spear => {
                Weapon::new("spear", 6, Skill::Polearms, DamageType::PIERCING).with_reach(2)
            }
        };
        Some(weapon)
    }

    fn skill(self) -> Skill {
        match self {
            Self::Unarmed => Skill::UnarmedCombat,
            Self::Axe => Skill::Axes,
            Self::Sword => Skill::LongBlades,
            Self::Mace => Skill::MacesFlails,
            Self::Spear => Skill::Polearms,
        }
    }
}

const PLAYER_START: Position = Position::new(3, 4);
const MONSTER_START: Position = Position::new(4, 4);

impl Duel {
    pub fn execute(self) -> Result<()> {
        let species = self.content.species()?;
        let opponent = species
            .iter()
            .find(|def| def.name == self.species)
            .map(|def| def.id)
            .with_context(|| {
                let known: Vec<&str> = species.iter().map(|def| def.name.as_str()).collect();
                format!(
                    "Unknown species '{}'. Known: {}",
                    self.species,
                    known.join(", ")
                )
            })?;

        let mut runtime = Runtime::builder()
            .seed(self.seed)
            .config(self.content.config()?)
            .map(self.content.map()?)
            .species(species)
            .build()?;
        let mut combat = runtime.subscribe(Topic::Combat);

        let traits = PlayerTraits::new(self.level, 14, 12)
            .with_skill(Skill::Fighting, self.level)
            .with_skill(self.weapon.skill(), self.level);
        let mut player = ActorState::player("Ada", PLAYER_START, traits);
        if let Some(weapon) = self.weapon.weapon() {
            player = player.with_weapon(weapon);
        }
        let player = runtime.spawn(player)?;
        let monster = runtime.spawn_monster(opponent, MONSTER_START)?;
        tracing::info!(species = %self.species, seed = self.seed, "duel started");

        let mut transcript: Vec<Message> = Vec::new();
        let mut rounds_fought = 0;
        for round in 1..=self.rounds {
            rounds_fought = round;
            if !self.json {
                println!("{}", style(format!("--- Round {round} ---")).bold().cyan());
            }

            runtime.melee(player, monster)?;
            if alive(&runtime, monster) {
                runtime.melee(monster, player)?;
            }
            runtime.end_turn()?;

            let messages = runtime.drain_messages();
            if !self.json {
                messages.iter().for_each(print_message);
            }
            transcript.extend(messages);

            if !alive(&runtime, player) || !alive(&runtime, monster) {
                break;
            }
        }

        let events: Vec<GameEvent> = drain(&mut combat);
        let player_hp = runtime.state().actors.get(player).map(|a| a.hp);
        let monster_hp = runtime.state().actors.get(monster).map(|a| a.hp);
        let winner = match (alive(&runtime, player), alive(&runtime, monster)) {
            (true, false) => Some("player"),
            (false, true) => Some("monster"),
            _ => None,
        };

        if self.json {
            let doc = serde_json::json!({
                "species": self.species,
                "seed": self.seed,
                "rounds": rounds_fought,
                "winner": winner,
                "player_hp": player_hp,
                "monster_hp": monster_hp,
                "messages": transcript,
                "events": events,
            });
            let json = serde_json::to_string_pretty(&doc).context("Failed to serialize duel")?;
            println!("{json}");
            return Ok(());
        }

        println!();
        println!("{}", style("=== Result ===").bold().green());
        println!("  Rounds: {rounds_fought}");
        println!("  Player HP: {}", hp_label(player_hp));
        println!("  {} HP: {}", self.species, hp_label(monster_hp));
        match winner {
            Some(side) => println!("  Winner: {}", style(side).bold()),
            None => println!("  Winner: {}", style("none").dim()),
        }
        Ok(())
    }
}

fn alive(runtime: &Runtime, id: EntityId) -> bool {
    runtime
        .state()
        .actors
        .get(id)
        .is_some_and(|actor| actor.is_alive())
}

fn hp_label(hp: Option<i32>) -> String {
    match hp {
        Some(hp) if hp > 0 => hp.to_string(),
        _ => "dead".to_string(),
    }
}

fn print_message(message: &Message) {
    let text = &message.text;
    match message.channel {
        MessageChannel::Combat => println!("  {text}"),
        MessageChannel::Danger => println!("  {}", style(text).red().bold()),
        MessageChannel::Sound => println!("  {}", style(text).yellow()),
        MessageChannel::Diagnostic => println!("  {}", style(text).dim()),
        MessageChannel::Plain => println!("  {}", style(text).italic()),
    }
}
