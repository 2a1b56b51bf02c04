#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Waylock profile.

mod area_transfer;
mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;
use waylock_core::{AreaStatus, CompletionMode, ProgressionConfig, TierTable};
use waylock_persistence::FileStore;
use waylock_rendering::{capture, Camera, TileStatePalette};
use waylock_system_bootstrap::Bootstrap;
use waylock_world::{apply, query, World};

/// Command-line interface for the Waylock progression engine.
#[derive(Debug, Parser)]
#[command(name = "waylock", about = "Area-unlock progression engine")]
struct Cli {
    /// Profile file backing the persisted namespace.
    #[arg(long, default_value = "waylock-profile.json")]
    profile: PathBuf,

    /// Area-completion policy.
    #[arg(long, value_enum, default_value = "threshold")]
    mode: ModeArg,

    /// Starting balance granted to a fresh profile.
    #[arg(long, default_value_t = 100)]
    starting_points: i64,

    #[command(subcommand)]
    command: CliCommand,
}

/// Selectable completion policy names.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Complete an area once its earned points reach the threshold.
    Threshold,
    /// Complete an area only when its whole task grid is claimed.
    FullClaim,
}

impl From<ModeArg> for CompletionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Threshold => Self::Threshold,
            ModeArg::FullClaim => Self::FullClaim,
        }
    }
}

/// Profile operations.
#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print balances, area statuses, and the unlock shop.
    Status,
    /// Run the deterministic scripted demo against the profile.
    Demo {
        /// Number of simulated rounds.
        #[arg(long, default_value_t = 12)]
        rounds: u32,
    },
    /// Print the active area set as a single-line transfer string.
    Export,
    /// Replace the custom area layer from a transfer string.
    Import {
        /// Transfer string produced by `export`.
        transfer: String,
    },
    /// Reset the profile to a fresh state.
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ProgressionConfig {
        mode: cli.mode.into(),
        starting_points: cli.starting_points,
        tiers: TierTable::default(),
    };

    let mut store = FileStore::open(&cli.profile);
    let mut world = World::restore(config.clone(), waylock_persistence::load(&store));
    bootstrap(&mut world, &config);

    match cli.command {
        CliCommand::Status => print_status(&world)?,
        CliCommand::Demo { rounds } => {
            let seed = demo::derive_seed(&cli.profile.display().to_string(), "demo");
            let report = demo::run(&mut world, rounds, seed);
            println!(
                "demo: {} rounds, {} tasks completed, {} tiles claimed",
                report.rounds, report.tasks_completed, report.tiles_claimed,
            );
            for area in &report.areas_unlocked {
                println!("  unlocked {area}");
            }
            println!(
                "gate permitted {}/{} wander probes",
                report.gate_checks_permitted, report.gate_checks_total,
            );
        }
        CliCommand::Export => {
            println!("{}", area_transfer::encode(&world.export_areas()));
        }
        CliCommand::Import { transfer } => {
            let records = area_transfer::decode(&transfer).with_context(|| {
                format!(
                    "expected a '{}' transfer string",
                    area_transfer::TRANSFER_HEADER,
                )
            })?;
            world
                .import_custom_areas(&records)
                .context("custom area import failed")?;
            println!("imported {} custom areas", records.len());
        }
        CliCommand::Reset => {
            world = World::new(config.clone());
            bootstrap(&mut world, &config);
            println!(
                "profile reset: {} starting points, {} areas unlocked",
                query::spendable(&world),
                query::unlocked_ids(&world).len(),
            );
        }
    }

    waylock_persistence::save(&mut store, &world.snapshot());
    store.persist()?;
    Ok(())
}

/// Applies first-run preparation; a no-op for existing profiles.
fn bootstrap(world: &mut World, config: &ProgressionConfig) {
    let commands = Bootstrap::default().initial_commands(world, config);
    if commands.is_empty() {
        return;
    }
    info!("preparing a fresh profile");
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
}

fn print_status(world: &World) -> Result<()> {
    println!("mode: {:?}", query::completion_mode(world));
    println!(
        "points: {} spendable ({} earned, {} spent)",
        query::spendable(world),
        query::earned_total(world),
        query::spent_total(world),
    );

    println!("areas:");
    for snapshot in query::areas(world) {
        let status = query::area_status(world, &snapshot.id).unwrap_or(AreaStatus::Locked);
        let label = match status {
            AreaStatus::Locked => "locked",
            AreaStatus::Unlocked => "open",
            AreaStatus::Complete => "done",
        };
        println!(
            "  [{label:>6}] {:<14} cost {:>4}  threshold {:>4}",
            snapshot.display_name, snapshot.unlock_cost, snapshot.points_to_complete,
        );
    }

    let shop = query::unlock_candidates(world);
    if !shop.is_empty() {
        println!("unlockable:");
        for row in shop {
            let note = if !row.eligible {
                " (complete a neighboring area first)"
            } else if !row.affordable {
                " (insufficient points)"
            } else {
                ""
            };
            println!("  {} for {} points{note}", row.display_name, row.cost);
        }
    }

    let camera = Camera::new(Vec2::new(3100.0, 3100.0), 4.0)?;
    let presentation = capture(world, 0, &camera, &TileStatePalette::default());
    println!(
        "locked overlay tiles on plane 0: {}",
        presentation.overlay.quads.len(),
    );
    Ok(())
}
