//! Towers standing on build pads.

use std::f32::consts::TAU;

use glam::Vec2;
use pathguard_core::{
    GarrisonStats, PadIndex, RangedStats, TargetingMode, TowerArchetype, TowerKind,
};
use pathguard_system_targeting::{select_target, Candidate};

use crate::{
    enemy::Enemy,
    pool::{Handle, Pool},
    projectile::{Projectile, Shot},
    soldier::Soldier,
};

/// Number of soldiers a garrison tower keeps in the field.
pub const GARRISON_SIZE: usize = 3;

/// Distance from the tower at which soldiers are posted.
pub const GARRISON_OFFSET: f32 = 16.0;

/// Pools a tower draws from while updating.
#[derive(Debug)]
pub struct TowerContext<'a> {
    /// Enemies that may be targeted.
    pub enemies: &'a Pool<Enemy>,
    /// Projectiles fired by ranged towers.
    pub projectiles: &'a mut Pool<Projectile>,
    /// Soldiers fielded by garrison towers.
    pub soldiers: &'a mut Pool<Soldier>,
}

/// What a tower did during an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TowerActivity {
    /// A projectile was launched.
    pub fired: bool,
    /// A target was found but no projectile slot was free.
    pub projectile_starved: bool,
    /// Soldiers newly stood up in empty slots.
    pub soldiers_posted: u8,
    /// Empty soldier slots left unfilled because the pool was full.
    pub soldiers_starved: u8,
}

/// Tower occupying a build pad.
#[derive(Clone, Debug)]
pub struct Tower {
    pad: PadIndex,
    position: Vec2,
    kind: TowerKind,
    level: u8,
    mode: TargetingMode,
    cooldown: f32,
    soldiers: [Option<Handle<Soldier>>; GARRISON_SIZE],
}

impl Tower {
    /// Creates a level-zero tower on `pad`.
    #[must_use]
    pub fn build(pad: PadIndex, position: Vec2, kind: TowerKind) -> Self {
        Self {
            pad,
            position,
            kind,
            level: 0,
            mode: TargetingMode::default(),
            cooldown: 0.0,
            soldiers: [None; GARRISON_SIZE],
        }
    }

    /// Reports whether the archetype defines a level above the current one.
    #[must_use]
    pub fn can_upgrade(&self, archetype: &TowerArchetype) -> bool {
        self.level < archetype.max_level()
    }

    /// Gold needed for the next level, if there is one.
    #[must_use]
    pub fn upgrade_cost(&self, archetype: &TowerArchetype) -> Option<u32> {
        archetype.upgrade_cost(self.level)
    }

    /// Raises the level by one and clears the cooldown.
    ///
    /// Returns `false` and leaves the tower untouched at the maximum level.
    pub fn upgrade(&mut self, archetype: &TowerArchetype) -> bool {
        if !self.can_upgrade(archetype) {
            return false;
        }
        self.level += 1;
        self.cooldown = 0.0;
        true
    }

    /// Gold refunded if the tower were sold now.
    #[must_use]
    pub fn sell_value(&self, archetype: &TowerArchetype) -> u32 {
        archetype.sell_value(self.level)
    }

    /// Changes the targeting policy.
    pub fn set_mode(&mut self, mode: TargetingMode) {
        self.mode = mode;
    }

    /// Returns every soldier this tower owns to the pool.
    ///
    /// Reports how many live soldiers were released.
    pub fn release_soldiers(&mut self, soldiers: &mut Pool<Soldier>) -> usize {
        self.soldiers
            .iter_mut()
            .filter_map(Option::take)
            .filter(|handle| soldiers.release(*handle))
            .count()
    }

    /// Runs one step of the tower.
    pub fn update(
        &mut self,
        dt: f32,
        archetype: &TowerArchetype,
        context: &mut TowerContext<'_>,
    ) -> TowerActivity {
        self.cooldown = (self.cooldown - dt).max(0.0);

        if let Some(stats) = archetype.garrison(self.level) {
            return self.maintain_garrison(stats, context.soldiers);
        }

        match archetype.ranged(self.level) {
            Some(stats) => self.fire_at_will(stats, context),
            None => TowerActivity::default(),
        }
    }

    fn maintain_garrison(
        &mut self,
        stats: &GarrisonStats,
        soldiers: &mut Pool<Soldier>,
    ) -> TowerActivity {
        let mut activity = TowerActivity::default();
        for (slot, posted) in self.soldiers.iter_mut().enumerate() {
            if let Some(soldier) = posted.and_then(|handle| soldiers.get_mut(handle)) {
                soldier.sync_stats(stats);
                continue;
            }

            let Some((handle, soldier)) = soldiers.acquire() else {
                *posted = None;
                activity.soldiers_starved += 1;
                continue;
            };
            let angle = slot as f32 / GARRISON_SIZE as f32 * TAU;
            let home = self.position + Vec2::from_angle(angle) * GARRISON_OFFSET;
            soldier.spawn(home, stats);
            *posted = Some(handle);
            activity.soldiers_posted += 1;
        }
        activity
    }

    fn fire_at_will(
        &mut self,
        stats: &RangedStats,
        context: &mut TowerContext<'_>,
    ) -> TowerActivity {
        let mut activity = TowerActivity::default();
        if self.cooldown > 0.0 {
            return activity;
        }

        let candidates = context
            .enemies
            .iter_active()
            .filter(|(_, enemy)| enemy.is_targetable())
            .map(|(handle, enemy)| Candidate {
                handle,
                position: enemy.position(),
                progress: enemy.progress(),
                hp: enemy.vitals().hp,
            });
        let Some(target) = select_target(self.mode, self.position, stats.range, candidates) else {
            return activity;
        };
        let Some(target_position) = context.enemies.get(target).map(Enemy::position) else {
            return activity;
        };

        let Some((_, projectile)) = context.projectiles.acquire() else {
            activity.projectile_starved = true;
            return activity;
        };
        projectile.fire(
            self.position,
            target,
            target_position,
            Shot {
                speed: stats.projectile_speed,
                damage: stats.damage,
                damage_type: stats.damage_type,
                splash: stats.splash,
            },
        );
        self.cooldown = 1.0 / stats.fire_rate;
        activity.fired = true;
        activity
    }

    /// Pad the tower stands on.
    #[must_use]
    pub fn pad(&self) -> PadIndex {
        self.pad
    }

    /// Position in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Archetype of the tower.
    #[must_use]
    pub fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Zero-based level.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Targeting policy.
    #[must_use]
    pub fn mode(&self) -> TargetingMode {
        self.mode
    }

    /// Seconds until the next shot is allowed.
    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Soldier slots; empty for ranged towers.
    #[must_use]
    pub fn soldiers(&self) -> &[Option<Handle<Soldier>>; GARRISON_SIZE] {
        &self.soldiers
    }
}
