//! Immutable level data: path, build pads, archetype tables and waves.
//!
//! A [`LevelConfig`] is handed to the world once at construction and never
//! mutated afterwards. Towers and enemies look their numbers up by kind and
//! level instead of sharing global tables.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DamageType, EnemyKind, TowerKind};

/// Save identifier used when a level does not name its own.
pub const DEFAULT_SAVE_KEY: &str = "td_save_v1";

const DEFAULT_ENEMY_RADIUS: f32 = 12.0;

/// Circle placed in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the circle.
    pub position: Vec2,
    /// Radius in world units.
    pub radius: f32,
}

impl Circle {
    /// Creates a circle from its center coordinates and radius.
    #[must_use]
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            radius,
        }
    }
}

/// Complete description of a playable level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Width of the playfield in world units.
    pub width: f32,
    /// Height of the playfield in world units.
    pub height: f32,
    /// Gold available before the first purchase.
    pub start_gold: u32,
    /// Lives available before the first leak.
    pub start_lives: u32,
    /// Identifier persistence adapters store the best wave under.
    #[serde(default = "default_save_key")]
    pub save_key: String,
    /// Ordered polyline enemies walk along. The first point is the spawn.
    pub waypoints: Vec<Vec2>,
    /// Circles where towers may be built, addressed by `PadIndex`.
    pub pads: Vec<Circle>,
    /// Goal area drawn at the end of the path.
    pub base: Circle,
    /// Tower archetype table.
    pub towers: Vec<TowerArchetype>,
    /// Enemy archetype table.
    pub enemies: Vec<EnemyArchetype>,
    /// Waves in play order.
    pub waves: Vec<WaveDefinition>,
}

/// Cost table and per-level behaviour of a tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerArchetype {
    /// Kind this entry describes.
    pub kind: TowerKind,
    /// Display name.
    pub name: String,
    /// Gold paid to build the tower.
    pub cost: u32,
    /// Percentage of the total spend refunded on sale.
    pub sell_percent: u32,
    /// Gold paid to go from level `i` to level `i + 1`.
    pub upgrade_costs: Vec<u32>,
    /// Per-level behaviour.
    pub profile: TowerProfile,
}

impl TowerArchetype {
    /// Number of levels described by the profile.
    #[must_use]
    pub fn level_count(&self) -> usize {
        match &self.profile {
            TowerProfile::Ranged { levels } => levels.len(),
            TowerProfile::Garrison { levels } => levels.len(),
        }
    }

    /// Highest reachable zero-based level, limited by both stats and upgrade costs.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        let by_levels = self.level_count().saturating_sub(1);
        let reachable = by_levels.min(self.upgrade_costs.len());
        u8::try_from(reachable).unwrap_or(u8::MAX)
    }

    /// Cost of upgrading away from `level`, if such an upgrade exists.
    #[must_use]
    pub fn upgrade_cost(&self, level: u8) -> Option<u32> {
        if level >= self.max_level() {
            return None;
        }
        self.upgrade_costs.get(usize::from(level)).copied()
    }

    /// Gold spent on a tower that reached `level`: base cost plus every upgrade paid.
    #[must_use]
    pub fn total_spent(&self, level: u8) -> u32 {
        let paid_upgrades = usize::from(level).min(self.upgrade_costs.len());
        self.upgrade_costs[..paid_upgrades]
            .iter()
            .fold(self.cost, |total, cost| total.saturating_add(*cost))
    }

    /// Refund for a tower that reached `level`, rounded down.
    #[must_use]
    pub fn sell_value(&self, level: u8) -> u32 {
        let spent = u64::from(self.total_spent(level));
        let refund = spent * u64::from(self.sell_percent) / 100;
        u32::try_from(refund).unwrap_or(u32::MAX)
    }

    /// Ranged stats for `level`, if this is a ranged tower.
    #[must_use]
    pub fn ranged(&self, level: u8) -> Option<&RangedStats> {
        match &self.profile {
            TowerProfile::Ranged { levels } => levels.get(usize::from(level)),
            TowerProfile::Garrison { .. } => None,
        }
    }

    /// Garrison stats for `level`, if this is a soldier-fielding tower.
    #[must_use]
    pub fn garrison(&self, level: u8) -> Option<&GarrisonStats> {
        match &self.profile {
            TowerProfile::Garrison { levels } => levels.get(usize::from(level)),
            TowerProfile::Ranged { .. } => None,
        }
    }
}

/// Behaviour family of a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum TowerProfile {
    /// Fires projectiles at enemies in range.
    Ranged {
        /// Stats indexed by zero-based level.
        levels: Vec<RangedStats>,
    },
    /// Maintains melee soldiers around the tower.
    Garrison {
        /// Stats indexed by zero-based level.
        levels: Vec<GarrisonStats>,
    },
}

/// Per-level numbers of a projectile tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangedStats {
    /// Damage carried by each projectile before mitigation.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Targeting radius.
    pub range: f32,
    /// Projectile speed in world units per second.
    pub projectile_speed: f32,
    /// Area-of-effect radius on impact. Zero hits a single enemy.
    #[serde(default)]
    pub splash: f32,
    /// Mitigation channel of the damage.
    pub damage_type: DamageType,
}

/// Per-level numbers of a garrison tower's soldiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GarrisonStats {
    /// Soldier hit point cap.
    pub soldier_hp: f32,
    /// Soldier melee damage per second.
    pub soldier_dps: f32,
    /// Soldier reach beyond the two bodies touching.
    pub soldier_range: f32,
    /// Maximum distance from home at which soldiers engage.
    pub leash: f32,
    /// Seconds a fallen soldier waits before standing up again.
    pub respawn_seconds: f32,
}

/// Base stats of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    /// Kind this entry describes.
    pub kind: EnemyKind,
    /// Hit points on spawn.
    pub max_hp: f32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Physical mitigation in `0..=1`.
    pub armor: f32,
    /// Magic mitigation in `0..=1`.
    pub magic_resist: f32,
    /// Gold paid when the enemy dies.
    pub gold_reward: u32,
    /// Body radius used for collisions and blocking.
    #[serde(default = "default_enemy_radius")]
    pub radius: f32,
    /// Damage per second dealt to the soldier blocking this enemy.
    #[serde(default)]
    pub attack_dps: f32,
}

/// Ordered list of spawn batches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Display name.
    pub name: String,
    /// Batches spawned one after another.
    pub entries: Vec<WaveEntry>,
}

/// Homogeneous spawn batch within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Archetype spawned by the batch.
    pub enemy: EnemyKind,
    /// Number of enemies in the batch.
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub interval: f32,
}

/// Reasons a level description cannot be played.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LevelError {
    /// Enemies need a start and an end point.
    #[error("path needs at least two waypoints, found {found}")]
    TooFewWaypoints {
        /// Number of waypoints provided.
        found: usize,
    },
    /// The playfield has no usable extent.
    #[error("playfield must have finite positive size, got {width} x {height}")]
    InvalidBounds {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// Nothing can be built without pads.
    #[error("level defines no build pads")]
    NoPads,
    /// The game would be over before it started.
    #[error("level must start with at least one life")]
    NoLives,
    /// Two table entries describe the same tower kind.
    #[error("tower kind {0:?} is defined more than once")]
    DuplicateTower(TowerKind),
    /// Two table entries describe the same enemy kind.
    #[error("enemy kind {0:?} is defined more than once")]
    DuplicateEnemy(EnemyKind),
    /// A tower profile lists no levels.
    #[error("tower kind {0:?} defines no levels")]
    NoLevels(TowerKind),
    /// A refund would exceed the spend.
    #[error("tower kind {kind:?} refunds {percent}% which exceeds 100%")]
    InvalidSellPercent {
        /// Offending tower kind.
        kind: TowerKind,
        /// Configured percentage.
        percent: u32,
    },
    /// A ranged tower level would never fire, or would fire without pause.
    #[error("tower kind {kind:?} level {level} needs a finite positive fire rate")]
    InvalidFireRate {
        /// Offending tower kind.
        kind: TowerKind,
        /// Zero-based level.
        level: usize,
    },
    /// A wave entry names an enemy missing from the table.
    #[error("wave {wave} spawns unknown enemy kind {enemy:?}")]
    UnknownEnemy {
        /// One-based wave number.
        wave: usize,
        /// Kind missing from the enemy table.
        enemy: EnemyKind,
    },
    /// A wave has nothing to spawn.
    #[error("wave {0} has no entries")]
    EmptyWave(usize),
}

impl LevelConfig {
    /// Looks up the archetype of a tower kind.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> Option<&TowerArchetype> {
        self.towers.iter().find(|archetype| archetype.kind == kind)
    }

    /// Looks up the archetype of an enemy kind.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemyArchetype> {
        self.enemies.iter().find(|archetype| archetype.kind == kind)
    }

    /// Checks the structural invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), LevelError> {
        let finite_positive = |value: f32| value.is_finite() && value > 0.0;
        if !finite_positive(self.width) || !finite_positive(self.height) {
            return Err(LevelError::InvalidBounds {
                width: self.width,
                height: self.height,
            });
        }
        if self.waypoints.len() < 2 {
            return Err(LevelError::TooFewWaypoints {
                found: self.waypoints.len(),
            });
        }
        if self.pads.is_empty() {
            return Err(LevelError::NoPads);
        }
        if self.start_lives == 0 {
            return Err(LevelError::NoLives);
        }

        for (index, archetype) in self.towers.iter().enumerate() {
            if self.towers[..index]
                .iter()
                .any(|other| other.kind == archetype.kind)
            {
                return Err(LevelError::DuplicateTower(archetype.kind));
            }
            if archetype.level_count() == 0 {
                return Err(LevelError::NoLevels(archetype.kind));
            }
            if archetype.sell_percent > 100 {
                return Err(LevelError::InvalidSellPercent {
                    kind: archetype.kind,
                    percent: archetype.sell_percent,
                });
            }
            if let TowerProfile::Ranged { levels } = &archetype.profile {
                let stalled = levels
                    .iter()
                    .position(|stats| !finite_positive(stats.fire_rate));
                if let Some(level) = stalled {
                    return Err(LevelError::InvalidFireRate {
                        kind: archetype.kind,
                        level,
                    });
                }
            }
        }

        for (index, archetype) in self.enemies.iter().enumerate() {
            if self.enemies[..index]
                .iter()
                .any(|other| other.kind == archetype.kind)
            {
                return Err(LevelError::DuplicateEnemy(archetype.kind));
            }
        }

        for (index, wave) in self.waves.iter().enumerate() {
            if wave.entries.is_empty() {
                return Err(LevelError::EmptyWave(index + 1));
            }
            if let Some(entry) = wave
                .entries
                .iter()
                .find(|entry| self.enemy(entry.enemy).is_none())
            {
                return Err(LevelError::UnknownEnemy {
                    wave: index + 1,
                    enemy: entry.enemy,
                });
            }
        }

        Ok(())
    }

    /// The built-in demo level: an S-shaped road across a 960×540 field.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            start_gold: 220,
            start_lives: 20,
            save_key: default_save_key(),
            waypoints: vec![
                Vec2::new(-30.0, 280.0),
                Vec2::new(140.0, 280.0),
                Vec2::new(210.0, 170.0),
                Vec2::new(360.0, 170.0),
                Vec2::new(440.0, 350.0),
                Vec2::new(610.0, 350.0),
                Vec2::new(720.0, 220.0),
                Vec2::new(840.0, 220.0),
                Vec2::new(990.0, 220.0),
            ],
            pads: vec![
                Circle::new(170.0, 360.0, 18.0),
                Circle::new(260.0, 250.0, 18.0),
                Circle::new(320.0, 95.0, 18.0),
                Circle::new(455.0, 120.0, 18.0),
                Circle::new(520.0, 420.0, 18.0),
                Circle::new(630.0, 290.0, 18.0),
                Circle::new(760.0, 320.0, 18.0),
                Circle::new(800.0, 140.0, 18.0),
            ],
            base: Circle::new(930.0, 220.0, 22.0),
            towers: demo_towers(),
            enemies: vec![
                enemy(EnemyKind::Grunt, 120.0, 58.0, 0.10, 0.00, 6, 6.0),
                enemy(EnemyKind::Brute, 260.0, 42.0, 0.25, 0.10, 10, 12.0),
                enemy(EnemyKind::Shaman, 160.0, 50.0, 0.05, 0.35, 8, 4.0),
            ],
            waves: vec![
                wave(
                    "Wave 1",
                    &[(EnemyKind::Grunt, 10, 0.65), (EnemyKind::Grunt, 6, 0.55)],
                ),
                wave(
                    "Wave 2",
                    &[
                        (EnemyKind::Grunt, 8, 0.55),
                        (EnemyKind::Shaman, 6, 0.80),
                        (EnemyKind::Brute, 3, 1.20),
                    ],
                ),
                wave(
                    "Wave 3",
                    &[
                        (EnemyKind::Grunt, 10, 0.50),
                        (EnemyKind::Shaman, 8, 0.70),
                        (EnemyKind::Brute, 6, 1.00),
                    ],
                ),
            ],
        }
    }
}

fn demo_towers() -> Vec<TowerArchetype> {
    vec![
        TowerArchetype {
            kind: TowerKind::Archer,
            name: "Archer".to_owned(),
            cost: 70,
            sell_percent: 70,
            upgrade_costs: vec![60, 90],
            profile: TowerProfile::Ranged {
                levels: vec![
                    ranged(9.0, 2.2, 135.0, 520.0, 0.0, DamageType::Physical),
                    ranged(14.0, 2.4, 145.0, 540.0, 0.0, DamageType::Physical),
                    ranged(20.0, 2.6, 155.0, 560.0, 0.0, DamageType::Physical),
                ],
            },
        },
        TowerArchetype {
            kind: TowerKind::Mage,
            name: "Mage".to_owned(),
            cost: 90,
            sell_percent: 70,
            upgrade_costs: vec![85, 120],
            profile: TowerProfile::Ranged {
                levels: vec![
                    ranged(26.0, 0.85, 150.0, 430.0, 0.0, DamageType::Magic),
                    ranged(38.0, 0.90, 160.0, 450.0, 0.0, DamageType::Magic),
                    ranged(52.0, 0.95, 170.0, 470.0, 0.0, DamageType::Magic),
                ],
            },
        },
        TowerArchetype {
            kind: TowerKind::Artillery,
            name: "Artillery".to_owned(),
            cost: 110,
            sell_percent: 70,
            upgrade_costs: vec![95, 140],
            profile: TowerProfile::Ranged {
                levels: vec![
                    ranged(32.0, 0.55, 165.0, 380.0, 55.0, DamageType::Physical),
                    ranged(45.0, 0.60, 175.0, 390.0, 60.0, DamageType::Physical),
                    ranged(62.0, 0.65, 185.0, 410.0, 65.0, DamageType::Physical),
                ],
            },
        },
        TowerArchetype {
            kind: TowerKind::Barracks,
            name: "Barracks".to_owned(),
            cost: 100,
            sell_percent: 70,
            upgrade_costs: vec![90, 140],
            profile: TowerProfile::Garrison {
                levels: vec![
                    GarrisonStats {
                        soldier_hp: 65.0,
                        soldier_dps: 10.0,
                        soldier_range: 18.0,
                        leash: 75.0,
                        respawn_seconds: 4.5,
                    },
                    GarrisonStats {
                        soldier_hp: 90.0,
                        soldier_dps: 14.0,
                        soldier_range: 18.0,
                        leash: 80.0,
                        respawn_seconds: 4.2,
                    },
                    GarrisonStats {
                        soldier_hp: 125.0,
                        soldier_dps: 19.0,
                        soldier_range: 20.0,
                        leash: 85.0,
                        respawn_seconds: 4.0,
                    },
                ],
            },
        },
    ]
}

const fn ranged(
    damage: f32,
    fire_rate: f32,
    range: f32,
    projectile_speed: f32,
    splash: f32,
    damage_type: DamageType,
) -> RangedStats {
    RangedStats {
        damage,
        fire_rate,
        range,
        projectile_speed,
        splash,
        damage_type,
    }
}

const fn enemy(
    kind: EnemyKind,
    max_hp: f32,
    speed: f32,
    armor: f32,
    magic_resist: f32,
    gold_reward: u32,
    attack_dps: f32,
) -> EnemyArchetype {
    EnemyArchetype {
        kind,
        max_hp,
        speed,
        armor,
        magic_resist,
        gold_reward,
        radius: DEFAULT_ENEMY_RADIUS,
        attack_dps,
    }
}

fn wave(name: &str, entries: &[(EnemyKind, u32, f32)]) -> WaveDefinition {
    WaveDefinition {
        name: name.to_owned(),
        entries: entries
            .iter()
            .map(|&(enemy, count, interval)| WaveEntry {
                enemy,
                count,
                interval,
            })
            .collect(),
    }
}

fn default_save_key() -> String {
    DEFAULT_SAVE_KEY.to_owned()
}

fn default_enemy_radius() -> f32 {
    DEFAULT_ENEMY_RADIUS
}
