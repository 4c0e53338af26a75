//! Headless game loop that plays a level with a fixed build plan.

use std::{fmt, time::Duration};

use pathguard_core::{Command, Event};
use pathguard_world::{self as world, query, World};

use crate::build_order::BuildOrder;

/// What the headless player does and how long the game runs.
#[derive(Clone, Debug)]
pub(crate) struct RunPlan {
    pub(crate) builds: Vec<BuildOrder>,
    pub(crate) upgrade: bool,
    pub(crate) seconds: u64,
    pub(crate) tick_hz: u32,
}

/// How a headless game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Victory,
    Defeat,
    TimeUp,
}

/// Tallies gathered from the event stream of one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) waves_cleared: u32,
    pub(crate) total_waves: u32,
    pub(crate) gold: u32,
    pub(crate) lives: u32,
    pub(crate) kills: u32,
    pub(crate) leaks: u32,
    pub(crate) best_wave: u32,
    pub(crate) best_wave_improved: bool,
}

/// Applies the build plan, starts the waves and ticks until the game ends or
/// the time budget runs out.
pub(crate) fn run(world: &mut World, plan: &RunPlan) -> Summary {
    let mut events = Vec::new();

    for order in &plan.builds {
        world::apply(
            world,
            Command::BuildTower {
                pad: order.pad,
                kind: order.kind,
            },
            &mut events,
        );
        if events
            .iter()
            .any(|event| matches!(event, Event::TowerBuilt { .. }))
        {
            tracing::info!(%order, "tower built");
        } else {
            tracing::warn!(%order, "build order refused");
        }
        events.clear();
    }

    world::apply(world, Command::StartWaves, &mut events);
    events.clear();

    let dt = Duration::from_secs_f64(1.0 / f64::from(plan.tick_hz.max(1)));
    let ticks = plan.seconds.saturating_mul(u64::from(plan.tick_hz));
    let mut tally = Tally::default();
    let mut outcome = Outcome::TimeUp;

    for _ in 0..ticks {
        world::apply(world, Command::Tick { dt }, &mut events);
        if plan.upgrade {
            upgrade_all(world, &plan.builds, &mut events);
        }

        if let Some(ended) = tally.observe(events.drain(..)) {
            outcome = ended;
            break;
        }
    }

    let economy = query::economy(world);
    let summary = Summary {
        outcome,
        waves_cleared: tally.waves_cleared,
        total_waves: query::wave_number(world).total,
        gold: economy.gold,
        lives: economy.lives,
        kills: tally.kills,
        leaks: tally.leaks,
        best_wave: economy.best_wave,
        best_wave_improved: tally.best_wave_improved,
    };
    tracing::info!(
        outcome = %summary.outcome,
        kills = summary.kills,
        leaks = summary.leaks,
        "game finished"
    );
    summary
}

fn upgrade_all(world: &mut World, builds: &[BuildOrder], events: &mut Vec<Event>) {
    for order in builds {
        let affordable = query::tower(world, order.pad)
            .and_then(|tower| {
                query::level(world)
                    .tower(tower.kind())
                    .and_then(|archetype| tower.upgrade_cost(archetype))
            })
            .is_some_and(|cost| cost <= query::economy(world).gold);
        if affordable {
            world::apply(world, Command::UpgradeTower { pad: order.pad }, events);
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    waves_cleared: u32,
    kills: u32,
    leaks: u32,
    best_wave_improved: bool,
}

impl Tally {
    fn observe(&mut self, events: impl Iterator<Item = Event>) -> Option<Outcome> {
        let mut outcome = None;
        for event in events {
            match event {
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyReachedBase { .. } => self.leaks += 1,
                Event::WaveEnded { wave } => {
                    self.waves_cleared += 1;
                    tracing::info!(wave, "wave cleared");
                }
                Event::TowerUpgraded { pad, level } => {
                    tracing::info!(pad = pad.get(), level, "tower upgraded");
                }
                Event::BestWaveImproved { .. } => self.best_wave_improved = true,
                Event::AllWavesCleared => outcome = Some(Outcome::Victory),
                Event::GameOver => outcome = Some(Outcome::Defeat),
                _ => {}
            }
        }
        outcome
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::TimeUp => "time up",
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "outcome:       {}", self.outcome)?;
        writeln!(
            f,
            "waves cleared: {}/{}",
            self.waves_cleared, self.total_waves
        )?;
        writeln!(f, "gold:          {}", self.gold)?;
        writeln!(f, "lives:         {}", self.lives)?;
        writeln!(f, "kills:         {}", self.kills)?;
        writeln!(f, "leaks:         {}", self.leaks)?;
        write!(f, "best wave:     {}", self.best_wave)?;
        if self.best_wave_improved {
            f.write_str(" (new record)")?;
        }
        Ok(())
    }
}
