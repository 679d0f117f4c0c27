#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a map and runs the combat simulation.

mod config;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::{AttackPowers, CombatOutcome, Faction};
use skirmish_rendering::Frame;
use skirmish_system_rounds::{minimum_boost, Simulation};
use skirmish_world::Battlefield;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::SkirmishConfig;

/// Simulates a skirmish between elves and goblins on a text map.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version)]
struct Cli {
    /// Map file made of `#`, `.`, `E` and `G`.
    map: PathBuf,

    /// Attack power of every elf.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    elf_attack: Option<u32>,

    /// Attack power of every goblin.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    goblin_attack: Option<u32>,

    /// TOML file providing defaults for the other options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search for the smallest elf attack power that wins without losing an elf.
    #[arg(long, conflicts_with_all = ["elf_attack", "goblin_attack"])]
    boost: bool,

    /// Print the battlefield after every round.
    #[arg(long)]
    show_rounds: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SkirmishConfig::load(path)?,
        None => SkirmishConfig::default(),
    };
    let show_rounds = cli.show_rounds || config.show_rounds;

    let text = fs::read_to_string(&cli.map)
        .with_context(|| format!("failed to read map {}", cli.map.display()))?;

    let outcome = if cli.boost {
        config.ensure_boostable()?;
        let (battlefield, seeds) = Battlefield::parse(&text)
            .with_context(|| format!("failed to parse map {}", cli.map.display()))?;
        let boost = minimum_boost(&battlefield, &seeds, Faction::Elf)
            .context("attack power search failed")?;
        println!(
            "Elves need attack power {} to win without losses",
            boost.attack_power
        );
        if show_rounds {
            let powers = AttackPowers::default().with_override(Faction::Elf, boost.attack_power);
            fight(&text, powers, true)
                .with_context(|| format!("replay of {} failed", cli.map.display()))?
        } else {
            boost.outcome
        }
    } else {
        let powers = config.attack_powers(cli.elf_attack, cli.goblin_attack);
        fight(&text, powers, show_rounds)
            .with_context(|| format!("simulation of {} failed", cli.map.display()))?
    };
    report(&outcome);
    Ok(())
}

fn fight(text: &str, powers: AttackPowers, show_rounds: bool) -> Result<CombatOutcome> {
    let mut simulation = Simulation::from_map(text, powers)?;
    if show_rounds {
        println!("Initially:\n{}", Frame::capture(simulation.world()));
    }

    let outcome = simulation.run_with(|report| {
        if show_rounds {
            println!("After {} rounds:\n{}", report.round, Frame::capture(report.world));
        }
    })?;
    Ok(outcome)
}

fn report(outcome: &CombatOutcome) {
    println!("Combat ends after {} full rounds", outcome.rounds);
    println!(
        "{} win with {} total hit points left",
        capitalized(outcome.winner),
        outcome.remaining_hit_points
    );
    println!(
        "Losses: {} elves, {} goblins",
        outcome.casualties.of(Faction::Elf),
        outcome.casualties.of(Faction::Goblin)
    );
    println!(
        "Outcome: {} * {} = {}",
        outcome.rounds,
        outcome.remaining_hit_points,
        outcome.score()
    );
}

fn capitalized(faction: Faction) -> &'static str {
    match faction {
        Faction::Elf => "Elves",
        Faction::Goblin => "Goblins",
    }
}
