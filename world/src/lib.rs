#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pathguard.
//!
//! The [`World`] owns every pool, the tower-per-pad table, the wave manager
//! and the economy. Adapters mutate it exclusively through [`apply`] and read
//! it through [`query`]. A tick runs the whole frame in a fixed order: waves
//! spawn, enemies move and settle, soldiers fight, towers fire, projectiles
//! resolve, and finally the pointer updates the selection.

pub mod economy;
pub mod enemy;
pub mod input;
pub mod pool;
pub mod projectile;
pub mod soldier;
pub mod tower;

use glam::Vec2;
use pathguard_core::{
    Command, EnemyKind, Event, LevelConfig, LevelError, PadIndex,
    Selection, TargetingMode, TowerKind, MAX_FRAME_DT,
};
use pathguard_system_damage::{apply_damage, apply_splash};
use pathguard_system_waves::WaveManager;

use crate::{
    economy::Economy,
    enemy::{Enemy, EnemyState},
    input::{hovered_pad, Pointer},
    pool::{Pool, Retain},
    projectile::{Impact, Projectile, ProjectileOutcome},
    soldier::{Arena, Soldier},
    tower::{Tower, TowerContext},
};

/// Slot counts of the entity pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolCapacities {
    /// Enemies alive at once.
    pub enemies: usize,
    /// Projectiles in flight at once.
    pub projectiles: usize,
    /// Soldiers fielded at once, across all garrison towers.
    pub soldiers: usize,
}

impl Default for PoolCapacities {
    fn default() -> Self {
        Self {
            enemies: 128,
            projectiles: 256,
            soldiers: 64,
        }
    }
}

/// Occupancy of a pool, for overlays and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolUsage {
    /// Number of slots.
    pub capacity: usize,
    /// Slots in use.
    pub active: usize,
    /// Slots available.
    pub free: usize,
}

impl PoolUsage {
    fn of<T>(pool: &Pool<T>) -> Self {
        Self {
            capacity: pool.capacity(),
            active: pool.active_count(),
            free: pool.free_count(),
        }
    }
}

/// Represents the authoritative Pathguard world state.
#[derive(Debug)]
pub struct World {
    level: LevelConfig,
    arena: Arena,
    economy: Economy,
    enemies: Pool<Enemy>,
    projectiles: Pool<Projectile>,
    soldiers: Pool<Soldier>,
    towers: Vec<Option<Tower>>,
    waves: WaveManager,
    spawn_requests: Vec<EnemyKind>,
    pointer: Pointer,
    hovered_pad: Option<PadIndex>,
    selection: Selection,
    paused: bool,
    game_over: bool,
}

impl World {
    /// Creates a world for `level` with default pool capacities.
    ///
    /// `best_wave` is the persisted high score the economy starts from.
    pub fn new(level: LevelConfig, best_wave: u32) -> Result<Self, LevelError> {
        Self::with_capacities(level, best_wave, PoolCapacities::default())
    }

    /// Creates a world with explicit pool capacities.
    pub fn with_capacities(
        level: LevelConfig,
        best_wave: u32,
        capacities: PoolCapacities,
    ) -> Result<Self, LevelError> {
        level.validate()?;

        Ok(Self {
            arena: Arena::around(level.width, level.height),
            economy: Economy::new(level.start_gold, level.start_lives, best_wave),
            enemies: Pool::new(capacities.enemies, Enemy::default),
            projectiles: Pool::new(capacities.projectiles, Projectile::default),
            soldiers: Pool::new(capacities.soldiers, Soldier::default),
            towers: vec![None; level.pads.len()],
            waves: WaveManager::new(level.waves.clone()),
            spawn_requests: Vec::new(),
            pointer: Pointer::default(),
            hovered_pad: None,
            selection: Selection::None,
            paused: false,
            game_over: false,
            level,
        })
    }

    fn step(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        if self.paused {
            self.handle_pointer(out_events);
            return;
        }

        if self.waves.is_running() {
            self.advance_waves(dt, out_events);
        }

        self.settle_enemies(dt, out_events);

        if self.economy.is_bankrupt() {
            self.game_over = true;
            self.paused = true;
            tracing::info!(best_wave = self.economy.best_wave(), "game over");
            out_events.push(Event::GameOver);
            self.handle_pointer(out_events);
            return;
        }

        self.update_soldiers(dt);
        self.update_towers(dt);
        self.update_projectiles(dt);
        self.handle_pointer(out_events);
    }

    fn advance_waves(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let Self {
            level,
            economy,
            enemies,
            waves,
            spawn_requests,
            ..
        } = self;

        spawn_requests.clear();
        let progress = waves.handle(dt, spawn_requests);
        if let Some(wave) = progress.wave_started {
            out_events.push(Event::WaveStarted { wave });
        }

        for kind in spawn_requests.drain(..) {
            let Some(archetype) = level.enemy(kind) else {
                tracing::debug!(?kind, "no archetype for requested enemy");
                continue;
            };
            let Some((_, enemy)) = enemies.acquire() else {
                tracing::debug!(?kind, "enemy pool exhausted, spawn skipped");
                continue;
            };
            enemy.spawn(archetype, &level.waypoints);
            waves.on_enemy_spawned();
            out_events.push(Event::EnemySpawned { kind });
        }

        if let Some(wave) = progress.wave_ended {
            out_events.push(Event::WaveEnded { wave });
            if economy.record_wave(wave) {
                out_events.push(Event::BestWaveImproved { wave });
            }
            if waves.is_finished() {
                tracing::info!(waves = waves.wave_count(), "all waves cleared");
                out_events.push(Event::AllWavesCleared);
            }
        }
    }

    fn settle_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let Self {
            level,
            economy,
            enemies,
            soldiers,
            waves,
            ..
        } = self;

        let _ = enemies.retain_active(|_, enemy| {
            enemy.update(dt, &level.waypoints, soldiers);
            match enemy.state() {
                EnemyState::Advancing => Retain::Keep,
                EnemyState::Reached => {
                    economy.lose_life();
                    waves.on_enemy_removed();
                    out_events.push(Event::EnemyReachedBase { kind: enemy.kind() });
                    Retain::Release
                }
                EnemyState::Dead => {
                    let reward = enemy.gold_reward();
                    economy.earn(reward);
                    waves.on_enemy_removed();
                    out_events.push(Event::EnemyKilled {
                        kind: enemy.kind(),
                        reward,
                    });
                    Retain::Release
                }
            }
        });
    }

    fn update_soldiers(&mut self, dt: f32) {
        let Self {
            arena,
            enemies,
            soldiers,
            ..
        } = self;

        for (handle, soldier) in soldiers.iter_active_mut() {
            soldier.update(handle, dt, enemies, *arena);
        }
    }

    fn update_towers(&mut self, dt: f32) {
        let Self {
            level,
            enemies,
            projectiles,
            soldiers,
            towers,
            ..
        } = self;

        let mut context = TowerContext {
            enemies,
            projectiles,
            soldiers,
        };
        for tower in towers.iter_mut().flatten() {
            let Some(archetype) = level.tower(tower.kind()) else {
                continue;
            };
            let activity = tower.update(dt, archetype, &mut context);
            if activity.projectile_starved {
                tracing::debug!(
                    pad = tower.pad().get(),
                    "projectile pool exhausted, shot skipped"
                );
            }
            if activity.soldiers_starved > 0 {
                tracing::debug!(
                    pad = tower.pad().get(),
                    missing = activity.soldiers_starved,
                    "soldier pool exhausted"
                );
            }
        }
    }

    fn update_projectiles(&mut self, dt: f32) {
        let Self {
            enemies,
            projectiles,
            ..
        } = self;

        let _ = projectiles.retain_active(|_, projectile| {
            match projectile.update(dt, enemies) {
                ProjectileOutcome::InFlight => Retain::Keep,
                ProjectileOutcome::Expired => Retain::Release,
                ProjectileOutcome::Hit(impact) => {
                    resolve_impact(enemies, impact);
                    Retain::Release
                }
            }
        });
    }

    fn handle_pointer(&mut self, out_events: &mut Vec<Event>) {
        self.hovered_pad = hovered_pad(&self.level.pads, self.pointer.position());
        if !self.pointer.consume_click() {
            return;
        }

        let selection = match self.hovered_pad {
            Some(pad) if self.tower_at(pad).is_some() => Selection::Tower(pad),
            Some(pad) => Selection::Pad(pad),
            None => Selection::None,
        };
        self.select(selection, out_events);
    }

    fn select(&mut self, selection: Selection, out_events: &mut Vec<Event>) {
        if self.selection == selection {
            return;
        }
        self.selection = selection;
        out_events.push(Event::SelectionChanged { selection });
    }

    fn tower_at(&self, pad: PadIndex) -> Option<&Tower> {
        self.towers.get(pad.slot()).and_then(Option::as_ref)
    }

    fn build_tower(&mut self, pad: PadIndex, kind: TowerKind, out_events: &mut Vec<Event>) {
        if self.game_over {
            tracing::debug!(pad = pad.get(), ?kind, "build refused after game over");
            return;
        }
        let (Some(site), Some(slot)) = (
            self.level.pads.get(pad.slot()),
            self.towers.get_mut(pad.slot()),
        ) else {
            tracing::debug!(pad = pad.get(), "build refused: no such pad");
            return;
        };
        if slot.is_some() {
            tracing::debug!(pad = pad.get(), "build refused: pad occupied");
            return;
        }
        let Some(archetype) = self.level.tower(kind) else {
            tracing::debug!(?kind, "build refused: tower kind not offered by level");
            return;
        };
        if !self.economy.can_afford(archetype.cost) {
            tracing::debug!(
                pad = pad.get(),
                cost = archetype.cost,
                gold = self.economy.gold(),
                "build refused: not enough gold"
            );
            return;
        }

        self.economy.spend(archetype.cost);
        *slot = Some(Tower::build(pad, site.position, kind));
        out_events.push(Event::TowerBuilt { pad, kind });
        self.select(Selection::Tower(pad), out_events);
    }

    fn upgrade_tower(&mut self, pad: PadIndex, out_events: &mut Vec<Event>) {
        if self.game_over {
            tracing::debug!(pad = pad.get(), "upgrade refused after game over");
            return;
        }
        let Some(tower) = self.towers.get_mut(pad.slot()).and_then(Option::as_mut) else {
            tracing::debug!(pad = pad.get(), "upgrade refused: no tower on pad");
            return;
        };
        let Some(archetype) = self.level.tower(tower.kind()) else {
            return;
        };
        let Some(cost) = tower.upgrade_cost(archetype) else {
            tracing::debug!(pad = pad.get(), "upgrade refused: maximum level");
            return;
        };
        if !self.economy.can_afford(cost) {
            tracing::debug!(
                pad = pad.get(),
                cost,
                gold = self.economy.gold(),
                "upgrade refused: not enough gold"
            );
            return;
        }

        self.economy.spend(cost);
        if tower.upgrade(archetype) {
            out_events.push(Event::TowerUpgraded {
                pad,
                level: tower.level(),
            });
        }
    }

    fn sell_tower(&mut self, pad: PadIndex, out_events: &mut Vec<Event>) {
        if self.game_over {
            tracing::debug!(pad = pad.get(), "sell refused after game over");
            return;
        }
        let Some(mut tower) = self.towers.get_mut(pad.slot()).and_then(Option::take) else {
            tracing::debug!(pad = pad.get(), "sell refused: no tower on pad");
            return;
        };

        let refund = self
            .level
            .tower(tower.kind())
            .map_or(0, |archetype| tower.sell_value(archetype));
        let released = tower.release_soldiers(&mut self.soldiers);
        self.economy.earn(refund);
        tracing::debug!(pad = pad.get(), refund, released, "tower sold");
        out_events.push(Event::TowerSold { pad, refund });
        self.select(Selection::Pad(pad), out_events);
    }

    fn set_targeting_mode(
        &mut self,
        pad: PadIndex,
        mode: TargetingMode,
        out_events: &mut Vec<Event>,
    ) {
        if self.game_over {
            tracing::debug!(pad = pad.get(), ?mode, "targeting change refused after game over");
            return;
        }
        let Some(tower) = self.towers.get_mut(pad.slot()).and_then(Option::as_mut) else {
            tracing::debug!(pad = pad.get(), "targeting change refused: no tower on pad");
            return;
        };
        tower.set_mode(mode);
        out_events.push(Event::TargetingModeChanged { pad, mode });
    }

    fn start_waves(&mut self) {
        if self.waves.is_running() {
            return;
        }
        self.waves.start();
        tracing::info!(waves = self.waves.wave_count(), "waves started");
    }

    fn toggle_pause(&mut self, out_events: &mut Vec<Event>) {
        if self.game_over {
            tracing::debug!("pause toggle refused after game over");
            return;
        }
        self.paused = !self.paused;
        out_events.push(Event::PauseToggled {
            paused: self.paused,
        });
    }

    fn move_pointer(&mut self, position: Vec2) {
        let max = Vec2::new(self.level.width, self.level.height);
        self.pointer.move_to(position.clamp(Vec2::ZERO, max));
    }
}

fn resolve_impact(enemies: &mut Pool<Enemy>, impact: Impact) {
    match impact {
        Impact::Single {
            enemy,
            amount,
            damage_type,
        } => {
            if let Some(enemy) = enemies.get_mut(enemy).filter(|enemy| enemy.is_targetable()) {
                let _ = apply_damage(enemy.vitals_mut(), amount, damage_type);
            }
        }
        Impact::Splash {
            center,
            radius,
            amount,
            damage_type,
        } => {
            let targets = enemies
                .iter_active_mut()
                .filter(|(_, enemy)| enemy.is_targetable())
                .map(|(_, enemy)| (enemy.position(), enemy.vitals_mut()));
            let _ = apply_splash(center, radius, amount, damage_type, targets);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            let dt = dt.min(MAX_FRAME_DT);
            out_events.push(Event::TimeAdvanced { dt });
            world.step(dt.as_secs_f32(), out_events);
        }
        Command::BuildTower { pad, kind } => world.build_tower(pad, kind, out_events),
        Command::UpgradeTower { pad } => world.upgrade_tower(pad, out_events),
        Command::SellTower { pad } => world.sell_tower(pad, out_events),
        Command::SetTargetingMode { pad, mode } => world.set_targeting_mode(pad, mode, out_events),
        Command::StartWaves => world.start_waves(),
        Command::TogglePause => world.toggle_pause(out_events),
        Command::MovePointer { position } => world.move_pointer(position),
        Command::Click => world.pointer.press(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use pathguard_core::{EconomySnapshot, LevelConfig, PadIndex, Selection};

    use super::{PoolUsage, World};
    use crate::{
        enemy::Enemy,
        pool::Handle,
        projectile::Projectile,
        soldier::Soldier,
        tower::Tower,
    };

    /// Current and total wave numbers, both one-based.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WaveNumber {
        /// Wave currently running or next to run, capped at `total`.
        pub current: u32,
        /// Number of waves in the level.
        pub total: u32,
    }

    /// Level the world was created from.
    #[must_use]
    pub fn level(world: &World) -> &LevelConfig {
        &world.level
    }

    /// Gold, lives and best wave.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Current player selection.
    #[must_use]
    pub fn selection(world: &World) -> Selection {
        world.selection
    }

    /// Pad under the pointer as of the last processed step.
    #[must_use]
    pub fn hovered_pad(world: &World) -> Option<PadIndex> {
        world.hovered_pad
    }

    /// Tower standing on `pad`, if any.
    #[must_use]
    pub fn tower(world: &World, pad: PadIndex) -> Option<&Tower> {
        world.tower_at(pad)
    }

    /// Built towers in pad order.
    pub fn towers(world: &World) -> impl Iterator<Item = &Tower> + '_ {
        world.towers.iter().flatten()
    }

    /// Active enemies in pool order.
    pub fn enemies(world: &World) -> impl Iterator<Item = (Handle<Enemy>, &Enemy)> + '_ {
        world.enemies.iter_active()
    }

    /// Active projectiles in pool order.
    pub fn projectiles(
        world: &World,
    ) -> impl Iterator<Item = (Handle<Projectile>, &Projectile)> + '_ {
        world.projectiles.iter_active()
    }

    /// Active soldiers in pool order, including those waiting to respawn.
    pub fn soldiers(world: &World) -> impl Iterator<Item = (Handle<Soldier>, &Soldier)> + '_ {
        world.soldiers.iter_active()
    }

    /// Resolves an enemy handle if it still names a live slot.
    #[must_use]
    pub fn enemy(world: &World, handle: Handle<Enemy>) -> Option<&Enemy> {
        world.enemies.get(handle)
    }

    /// Resolves a soldier handle if it still names a live slot.
    #[must_use]
    pub fn soldier(world: &World, handle: Handle<Soldier>) -> Option<&Soldier> {
        world.soldiers.get(handle)
    }

    /// Occupancy of the enemy pool.
    #[must_use]
    pub fn enemy_pool(world: &World) -> PoolUsage {
        PoolUsage::of(&world.enemies)
    }

    /// Occupancy of the projectile pool.
    #[must_use]
    pub fn projectile_pool(world: &World) -> PoolUsage {
        PoolUsage::of(&world.projectiles)
    }

    /// Occupancy of the soldier pool.
    #[must_use]
    pub fn soldier_pool(world: &World) -> PoolUsage {
        PoolUsage::of(&world.soldiers)
    }

    /// Wave progress for the HUD.
    #[must_use]
    pub fn wave_number(world: &World) -> WaveNumber {
        WaveNumber {
            current: world.waves.current_wave_number(),
            total: u32::try_from(world.waves.wave_count()).unwrap_or(u32::MAX),
        }
    }

    /// Reports whether every wave has ended.
    #[must_use]
    pub fn all_waves_cleared(world: &World) -> bool {
        world.waves.is_finished()
    }

    /// Reports whether waves were started.
    #[must_use]
    pub fn has_started(world: &World) -> bool {
        world.waves.is_running()
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether the last life was lost.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Pointer position after clamping to the playfield.
    #[must_use]
    pub fn pointer(world: &World) -> Vec2 {
        world.pointer.position()
    }
}
