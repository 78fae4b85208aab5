//! Development tasks for the crawl workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod content;
mod dirs;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Duel, NoiseMap};

/// Development tasks for the crawl workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the combat and noise rules", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to the platform log directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Fight a scripted melee between the player and one monster
    Duel(Duel),

    /// Make a noise and render how far it carries
    Noise(NoiseMap),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for RUST_LOG, CRAWL_LOG_DIR, CRAWL_DATA_DIR)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.log_file)?;

    match cli.command {
        Command::Duel(cmd) => cmd.execute(),
        Command::Noise(cmd) => cmd.execute(),
    }
}
