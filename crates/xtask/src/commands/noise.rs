//! Render how far a noise carries.
//!
//! Registers one noise, closes the turn so it propagates, then draws the
//! map with each reached cell showing its intensity in whole loudness
//! units (capped at 9). Sleeping monsters can be scattered around to see
//! who wakes and where they think the sound came from.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use crawl_core::{Behaviour, MapOracle, Message, Position, TerrainKind};
use crawl_runtime::{Runtime, TurnSummary};

use crate::content::ContentArgs;

/// Make a noise and render its spread
#[derive(Parser, Debug)]
pub struct NoiseMap {
    /// Source column
    #[arg(long, default_value_t = 2)]
    x: i32,

    /// Source row
    #[arg(long, default_value_t = 4)]
    y: i32,

    /// Loudness in whole units
    #[arg(short, long, default_value_t = 12)]
    loudness: i32,

    /// Sleeping listener as `X,Y`; may be repeated
    #[arg(long, value_name = "X,Y", value_parser = parse_position)]
    sleeper: Vec<Position>,

    /// Species of the sleepers
    #[arg(long, default_value = "goblin")]
    species: String,

    /// Game seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print one JSON document instead of the map
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    content: ContentArgs,
}

fn parse_position(raw: &str) -> Result<Position, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{raw}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad column: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad row: {e}"))?;
    Ok(Position::new(x, y))
}

impl NoiseMap {
    pub fn execute(self) -> Result<()> {
        let species = self.content.species()?;
        let sleeper_species = species
            .iter()
            .find(|def| def.name == self.species)
            .map(|def| def.id)
            .with_context(|| format!("Unknown species '{}'", self.species))?;

        let mut runtime = Runtime::builder()
            .seed(self.seed)
            .config(self.content.config()?)
            .map(self.content.map()?)
            .species(species)
            .build()?;

        for &cell in &self.sleeper {
            let id = runtime.spawn_monster(sleeper_species, cell)?;
            if let Some(actor) = runtime.state_mut().actors.get_mut(id) {
                actor.behaviour = Behaviour::Sleeping;
            }
        }

        let source = Position::new(self.x, self.y);
        let noise = runtime.make_noise(source, self.loudness, None, "a loud bang")?;
        if noise.is_none() {
            tracing::warn!(loudness = self.loudness, "noise too quiet to register");
        }
        let summary = runtime.end_turn()?;
        let messages = runtime.drain_messages();

        if self.json {
            return self.print_json(&runtime, &summary, &messages);
        }

        println!(
            "{} loudness {} at {}",
            style("Noise:").bold().cyan(),
            self.loudness,
            source
        );
        println!("{}", render(&runtime, source));
        println!(
            "{} {} cells reached, {} heard, {} woken",
            style("Spread:").bold().cyan(),
            summary.noise.cells_reached,
            summary.noise.heard.len(),
            summary.woken.len()
        );
        for actor in runtime.state().actors.iter() {
            if let Behaviour::Seeking(guess) = actor.behaviour {
                println!("  {} at {} heads for {}", actor.name, actor.position, guess);
            }
        }
        for message in &messages {
            println!("  {}", style(&message.text).yellow());
        }
        Ok(())
    }

    fn print_json(
        &self,
        runtime: &Runtime,
        summary: &TurnSummary,
        messages: &[Message],
    ) -> Result<()> {
        let dims = runtime.oracles().map().dimensions();
        let grid: Vec<Vec<i32>> = (0..dims.height as i32)
            .map(|y| {
                (0..dims.width as i32)
                    .map(|x| intensity_at(runtime, Position::new(x, y)))
                    .collect()
            })
            .collect();
        let listeners: Vec<_> = runtime
            .state()
            .actors
            .iter()
            .map(|actor| {
                serde_json::json!({
                    "id": actor.id,
                    "position": actor.position,
                    "behaviour": format!("{:?}", actor.behaviour),
                })
            })
            .collect();
        let doc = serde_json::json!({
            "source": { "x": self.x, "y": self.y },
            "loudness": self.loudness,
            "cells_reached": summary.noise.cells_reached,
            "woken": summary.woken,
            "intensity": grid,
            "listeners": listeners,
            "messages": messages,
        });
        let json = serde_json::to_string_pretty(&doc).context("Failed to serialize noise map")?;
        println!("{json}");
        Ok(())
    }
}

fn intensity_at(runtime: &Runtime, position: Position) -> i32 {
    runtime
        .state()
        .noise
        .cell(position)
        .map_or(0, |cell| cell.intensity.max(0))
}

fn render(runtime: &Runtime, source: Position) -> String {
    let map = runtime.oracles().map();
    let dims = map.dimensions();
    let actors = &runtime.state().actors;
    let mut out = String::new();
    for y in 0..dims.height as i32 {
        for x in 0..dims.width as i32 {
            let pos = Position::new(x, y);
            let occupant = actors.at(pos).and_then(|id| actors.get(id));
            let glyph = if pos == source {
                style('*').red().bold().to_string()
            } else if let Some(actor) = occupant {
                let glyph = actor.name.chars().next().unwrap_or('m');
                style(glyph).magenta().bold().to_string()
            } else {
                let units = intensity_at(runtime, pos) / 1000;
                if units > 0 {
                    style(units.min(9)).green().to_string()
                } else {
                    let terrain = map
                        .tile(pos)
                        .map_or(TerrainKind::PermaRock, |tile| tile.terrain());
                    style(terrain_char(terrain, map.is_silenced(pos))).dim().to_string()
                }
            };
            out.push_str(&glyph);
        }
        out.push('\n');
    }
    out
}

fn terrain_char(terrain: TerrainKind, silenced: bool) -> char {
    if silenced {
        return '_';
    }
    match terrain {
        TerrainKind::Floor => '.',
        TerrainKind::Wall => '#',
        TerrainKind::PermaRock => 'X',
        TerrainKind::Door => '+',
        TerrainKind::Statue => 'S',
        TerrainKind::Tree => 'T',
        TerrainKind::ShallowWater => 'w',
        TerrainKind::DeepWater => '~',
    }
}
