#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Flying Robots session.
//!
//! The binary loads an optional TOML configuration, applies command-line
//! overrides, and lets a simple autopilot play until the session ends or the
//! turn budget runs out. The final standing is printed as TOML.

mod autopilot;
mod view;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use flying_robots_core::{GameConfig, GridSize};
use flying_robots_system_session::Game;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "flying_robots=info";

/// Command-line arguments accepted by the binary.
#[derive(Debug, Parser)]
#[command(name = "flying-robots")]
#[command(about = "Dodge robots in a three-dimensional grid until they wreck each other")]
struct Args {
    /// TOML file with `[player]`, `[game]` and `[grid]` sections.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every random placement; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Grid width.
    #[arg(long)]
    x: Option<u32>,
    /// Grid depth.
    #[arg(long)]
    y: Option<u32>,
    /// Grid height.
    #[arg(long)]
    z: Option<u32>,
    /// Level the session starts on.
    #[arg(long)]
    start_level: Option<u32>,
    /// Last level; clearing it wins the game.
    #[arg(long)]
    max_level: Option<u32>,
    /// Player name recorded in the summary.
    #[arg(long)]
    name: Option<String>,
    /// Upper bound on turns the autopilot plays.
    #[arg(long, default_value_t = 10_000)]
    max_turns: u32,
    /// Print the player's elevation after every level.
    #[arg(long)]
    show_planes: bool,
}

impl Args {
    fn load_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => GameConfig::default(),
        };

        let grid = config.grid;
        config.grid = GridSize::new(
            self.x.unwrap_or(grid.x()),
            self.y.unwrap_or(grid.y()),
            self.z.unwrap_or(grid.z()),
        );
        if let Some(level) = self.start_level {
            config.game.start_level = level;
        }
        if let Some(level) = self.max_level {
            config.game.max_level = level;
        }
        if let Some(name) = &self.name {
            config.player.name = name.clone();
        }
        Ok(config)
    }
}

/// Entry point for the Flying Robots command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "starting session");

    let mut game = Game::new(config, seed).context("invalid game configuration")?;
    let report = autopilot::play(&mut game, args.max_turns, |game| {
        if args.show_planes {
            print!("{}", view::render_player_plane(game));
        }
    });
    info!(
        turns = report.turns,
        teleports = report.teleports,
        finished = report.finished,
        "autopilot stopped"
    );

    let summary = toml::to_string(&game.summary()).context("failed to encode summary")?;
    print!("{summary}");
    Ok(())
}
