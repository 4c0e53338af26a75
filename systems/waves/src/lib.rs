#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave pacing system that decides when enemies enter the path.
//!
//! The manager never touches enemy storage. Each update it pushes the kinds
//! that should spawn into an output buffer; the world tries to place them and
//! reports back through [`WaveManager::on_enemy_spawned`] and
//! [`WaveManager::on_enemy_removed`]. A wave ends once every entry spawned
//! and no enemy attributed to it is still alive.

use pathguard_core::{EnemyKind, WaveDefinition, WaveEntry};

/// Delay before the first enemy of a wave spawns.
pub const FIRST_SPAWN_DELAY: f32 = 0.01;

/// Delay before the first enemy of every later entry spawns.
pub const ENTRY_SETTLE_DELAY: f32 = 0.15;

/// Lowest value the spawn timer is re-armed to after a spawn.
pub const MIN_SPAWN_TIMER: f32 = 0.02;

/// Outcome of a single [`WaveManager::handle`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveProgress {
    /// One-based number of the wave that began during the update.
    pub wave_started: Option<u32>,
    /// One-based number of the wave that ended during the update.
    pub wave_ended: Option<u32>,
    /// Number of spawn requests pushed into the output buffer.
    pub spawned: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Spawning {
        entry: usize,
        remaining: u32,
        interval: f32,
        timer: f32,
    },
    Draining,
}

/// Drives timed spawning across an ordered list of waves.
#[derive(Clone, Debug)]
pub struct WaveManager {
    waves: Vec<WaveDefinition>,
    running: bool,
    wave_index: usize,
    phase: Phase,
    alive: u32,
}

impl WaveManager {
    /// Creates an idle manager for the provided waves.
    #[must_use]
    pub fn new(waves: Vec<WaveDefinition>) -> Self {
        Self {
            waves,
            running: false,
            wave_index: 0,
            phase: Phase::Idle,
            alive: 0,
        }
    }

    /// Lets subsequent updates drive spawning. Calling it again has no effect.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Reports whether [`WaveManager::start`] has been called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Total number of waves.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// One-based number of the current wave, capped at the wave count.
    #[must_use]
    pub fn current_wave_number(&self) -> u32 {
        let number = (self.wave_index + 1).min(self.waves.len());
        u32::try_from(number).unwrap_or(u32::MAX)
    }

    /// Reports whether every wave has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.wave_index >= self.waves.len()
    }

    /// Number of spawned enemies of the current wave that are still alive.
    #[must_use]
    pub fn alive(&self) -> u32 {
        self.alive
    }

    /// Attributes a successfully placed enemy to the current wave.
    pub fn on_enemy_spawned(&mut self) {
        self.alive += 1;
    }

    /// Removes an enemy from the current wave's alive count.
    pub fn on_enemy_removed(&mut self) {
        self.alive = self.alive.saturating_sub(1);
    }

    /// Advances the wave clock by `dt` seconds.
    ///
    /// Enemy kinds that should spawn are appended to `out`; the buffer is not
    /// cleared. At most one spawn is requested per update.
    pub fn handle(&mut self, dt: f32, out: &mut Vec<EnemyKind>) -> WaveProgress {
        let mut progress = WaveProgress::default();
        if !self.running || self.is_finished() {
            return progress;
        }

        if self.phase == Phase::Idle {
            self.begin_wave(&mut progress);
        }

        match self.phase {
            Phase::Idle => {}
            Phase::Spawning {
                entry,
                remaining,
                interval,
                timer,
            } if remaining > 0 => {
                let mut timer = timer - dt;
                let mut remaining = remaining;
                if timer <= 0.0 {
                    if let Some(batch) = self.entry(entry) {
                        out.push(batch.enemy);
                        progress.spawned += 1;
                    }
                    remaining -= 1;
                    timer = (timer + interval).max(MIN_SPAWN_TIMER);
                }
                self.phase = Phase::Spawning {
                    entry,
                    remaining,
                    interval,
                    timer,
                };
            }
            Phase::Spawning { entry, .. } => {
                let next = entry + 1;
                if let Some(batch) = self.entry(next) {
                    self.phase = Phase::Spawning {
                        entry: next,
                        remaining: batch.count,
                        interval: batch.interval,
                        timer: ENTRY_SETTLE_DELAY,
                    };
                } else {
                    self.phase = Phase::Draining;
                    self.try_end_wave(&mut progress);
                }
            }
            Phase::Draining => self.try_end_wave(&mut progress),
        }

        progress
    }

    fn entry(&self, index: usize) -> Option<WaveEntry> {
        self.waves
            .get(self.wave_index)
            .and_then(|wave| wave.entries.get(index))
            .copied()
    }

    fn begin_wave(&mut self, progress: &mut WaveProgress) {
        let Some(wave) = self.waves.get(self.wave_index) else {
            return;
        };

        self.phase = match wave.entries.first() {
            Some(batch) => Phase::Spawning {
                entry: 0,
                remaining: batch.count,
                interval: batch.interval,
                timer: FIRST_SPAWN_DELAY,
            },
            None => Phase::Draining,
        };

        let number = self.current_wave_number();
        tracing::info!(wave = number, name = %wave.name, "wave started");
        progress.wave_started = Some(number);
    }

    fn try_end_wave(&mut self, progress: &mut WaveProgress) {
        if self.alive > 0 {
            return;
        }

        let number = self.current_wave_number();
        tracing::info!(wave = number, "wave ended");
        progress.wave_ended = Some(number);
        self.wave_index += 1;
        self.phase = Phase::Idle;
    }
}
