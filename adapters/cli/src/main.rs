#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Pathguard level headlessly.
//!
//! The adapter loads a level, seeds the world with the best wave from the
//! save file, executes a fixed build plan and prints a summary once every
//! wave is cleared, the base falls or the time budget runs out.

mod build_order;
mod level_file;
mod runner;
mod save;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pathguard_world::World;

use crate::{
    build_order::BuildOrder,
    runner::RunPlan,
    save::SaveStore,
};

#[derive(Debug, Parser)]
#[command(
    name = "pathguard",
    about = "Plays a Pathguard level headlessly and reports the outcome"
)]
struct Args {
    /// Level definition in TOML. The built-in demo level is used when omitted.
    #[arg(long, value_name = "FILE")]
    level: Option<PathBuf>,

    /// Simulated seconds before the run is stopped.
    #[arg(long, default_value_t = 300)]
    seconds: u64,

    /// Simulation steps per simulated second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    tick_hz: u32,

    /// Tower to build before the first wave, as PAD:KIND. Repeatable.
    #[arg(long = "build", value_name = "PAD:KIND")]
    builds: Vec<BuildOrder>,

    /// Upgrade the planned towers whenever gold allows.
    #[arg(long)]
    upgrade: bool,

    /// JSON file holding the best wave per level.
    #[arg(long, value_name = "FILE", default_value = "pathguard-save.json")]
    save: PathBuf,
}

/// Entry point for the Pathguard command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let level = level_file::load(args.level.as_deref())?;
    let save_key = level.save_key.clone();

    let store = SaveStore::new(&args.save);
    let best_wave = store.load_best_wave(&save_key);
    let mut world = World::new(level, best_wave).context("level rejected by the world")?;

    let plan = RunPlan {
        builds: args.builds,
        upgrade: args.upgrade,
        seconds: args.seconds,
        tick_hz: args.tick_hz,
    };
    let summary = runner::run(&mut world, &plan);
    println!("{summary}");

    if store.store_best_wave(&save_key, summary.best_wave)? {
        println!("saved to {}", store.path().display());
    }
    Ok(())
}
