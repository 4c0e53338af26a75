#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pathguard simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intent and elapsed time, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what changed. Immutable level data lives in [`level`] and the
//! small vector helpers every entity relies on live in [`geometry`].

pub mod geometry;
pub mod level;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use level::{
    Circle, EnemyArchetype, GarrisonStats, LevelConfig, LevelError, RangedStats, TowerArchetype,
    TowerProfile, WaveDefinition, WaveEntry,
};

/// Largest simulated step accepted by a single tick.
///
/// Longer frames (for example after the host stalled) are clamped so that
/// entities never tunnel past waypoints or targets.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(50);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Real time elapsed since the previous tick, clamped to [`MAX_FRAME_DT`].
        dt: Duration,
    },
    /// Requests construction of a tower on an empty build pad.
    BuildTower {
        /// Pad receiving the tower.
        pad: PadIndex,
        /// Archetype of the tower to construct.
        kind: TowerKind,
    },
    /// Requests that the tower standing on the pad gains a level.
    UpgradeTower {
        /// Pad hosting the tower.
        pad: PadIndex,
    },
    /// Requests that the tower standing on the pad is sold and the pad freed.
    SellTower {
        /// Pad hosting the tower.
        pad: PadIndex,
    },
    /// Changes how the tower standing on the pad picks its targets.
    SetTargetingMode {
        /// Pad hosting the tower.
        pad: PadIndex,
        /// Selection policy to apply.
        mode: TargetingMode,
    },
    /// Starts wave progression. Repeated requests are ignored.
    StartWaves,
    /// Flips the paused flag unless the game is over.
    TogglePause,
    /// Reports the latest pointer position in world units.
    MovePointer {
        /// Pointer location, clamped by the world to the playfield.
        position: Vec2,
    },
    /// Latches a primary click that the next simulation step consumes.
    Click,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick after clamping.
        dt: Duration,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Archetype of the new enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy ran out of hit points and paid its bounty.
    EnemyKilled {
        /// Archetype of the defeated enemy.
        kind: EnemyKind,
        /// Gold credited to the player.
        reward: u32,
    },
    /// Reports that an enemy walked past the final waypoint.
    EnemyReachedBase {
        /// Archetype of the leaking enemy.
        kind: EnemyKind,
    },
    /// Announces that every entry of a wave spawned and all its enemies are gone.
    WaveEnded {
        /// One-based number of the wave that finished.
        wave: u32,
    },
    /// Announces that the final wave ended.
    AllWavesCleared,
    /// Reports a new best wave that persistence adapters should store.
    BestWaveImproved {
        /// Highest one-based wave number reached so far.
        wave: u32,
    },
    /// Confirms that a tower was constructed.
    TowerBuilt {
        /// Pad hosting the new tower.
        pad: PadIndex,
        /// Archetype of the tower.
        kind: TowerKind,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Pad hosting the tower.
        pad: PadIndex,
        /// Zero-based level after the upgrade.
        level: u8,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Pad that became empty.
        pad: PadIndex,
        /// Gold refunded to the player.
        refund: u32,
    },
    /// Confirms that a tower switched targeting policy.
    TargetingModeChanged {
        /// Pad hosting the tower.
        pad: PadIndex,
        /// Policy now in effect.
        mode: TargetingMode,
    },
    /// Reports that the player's selection changed.
    SelectionChanged {
        /// Selection after the change.
        selection: Selection,
    },
    /// Reports that the paused flag flipped.
    PauseToggled {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Reports that the last life was lost. The simulation stays paused.
    GameOver,
}

/// Index of a buildable pad within the level's pad list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PadIndex(u32);

impl PadIndex {
    /// Creates a pad index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index usable against slices of per-pad data.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.0 as usize
    }
}

/// Tower archetypes that can stand on a build pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Fast physical single-target shooter.
    Archer,
    /// Slow magic single-target shooter.
    Mage,
    /// Slow physical shooter with splash damage.
    Artillery,
    /// Garrison that fields three melee soldiers.
    Barracks,
}

impl TowerKind {
    /// Every tower kind in presentation order.
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Archer,
        TowerKind::Mage,
        TowerKind::Artillery,
        TowerKind::Barracks,
    ];
}

/// Enemy archetypes spawned by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline infantry.
    Grunt,
    /// Slow, armoured heavy.
    Brute,
    /// Magic-resistant caster.
    Shaman,
}

/// Policy a tower uses to pick among enemies in range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetingMode {
    /// Enemy furthest along the path.
    #[default]
    First,
    /// Enemy nearest to the tower.
    Closest,
    /// Enemy with the most remaining hit points.
    Strongest,
}

/// Mitigation channel used when damage lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    /// Reduced by armor.
    Physical,
    /// Reduced by magic resist.
    Magic,
}

/// Hit points and resistances of a damageable unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vitals {
    /// Remaining hit points. May drop below zero until death is observed.
    pub hp: f32,
    /// Hit points restored on spawn.
    pub max_hp: f32,
    /// Fraction of physical damage absorbed, nominally in `0..=1`.
    pub armor: f32,
    /// Fraction of magic damage absorbed, nominally in `0..=1`.
    pub magic_resist: f32,
}

impl Vitals {
    /// Creates vitals at full health.
    #[must_use]
    pub const fn new(max_hp: f32, armor: f32, magic_resist: f32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            armor,
            magic_resist,
        }
    }

    /// Reports whether the unit has no hit points left.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }
}

/// What the player currently has selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// An empty build pad is selected.
    Pad(PadIndex),
    /// The tower standing on the pad is selected.
    Tower(PadIndex),
}

impl Selection {
    /// Pad referenced by the selection, if any.
    #[must_use]
    pub const fn pad(&self) -> Option<PadIndex> {
        match self {
            Self::None => None,
            Self::Pad(pad) | Self::Tower(pad) => Some(*pad),
        }
    }
}

/// Read-only snapshot of the player's ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EconomySnapshot {
    /// Gold available for building and upgrading.
    pub gold: u32,
    /// Lives left before the game ends.
    pub lives: u32,
    /// Highest one-based wave number ever completed.
    pub best_wave: u32,
}
