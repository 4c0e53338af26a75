//! Melee soldiers fielded by garrison towers.

use glam::Vec2;
use pathguard_core::{
    geometry::within_radius,
    DamageType, GarrisonStats, Vitals,
};
use pathguard_system_damage::apply_damage;

use crate::{
    enemy::Enemy,
    pool::{Handle, Pool},
};

/// Body radius of every soldier.
pub const SOLDIER_RADIUS: f32 = 10.0;

/// Walking speed in world units per second.
pub const SOLDIER_SPEED: f32 = 85.0;

/// Extra reach beyond touching radii at which melee connects.
pub const MELEE_SLACK: f32 = 1.0;

/// Rectangle soldiers are clamped into while walking home.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    /// Smallest allowed coordinates.
    pub min: Vec2,
    /// Largest allowed coordinates.
    pub max: Vec2,
}

impl Arena {
    /// Generous region around a playfield of the provided size.
    #[must_use]
    pub fn around(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(-50.0, -50.0),
            max: Vec2::new(width + 50.0, height + 60.0),
        }
    }
}

/// What a soldier is doing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SoldierState {
    /// At home or walking back to it.
    #[default]
    Idle,
    /// Chasing or fighting the referenced enemy.
    Engaging(Handle<Enemy>),
    /// Fallen; stands up at home once the timer runs out.
    Respawning {
        /// Seconds left before the soldier stands up.
        remaining: f32,
    },
}

/// Pooled soldier record.
#[derive(Clone, Debug)]
pub struct Soldier {
    position: Vec2,
    home: Vec2,
    vitals: Vitals,
    dps: f32,
    melee_range: f32,
    leash: f32,
    respawn_seconds: f32,
    state: SoldierState,
}

impl Default for Soldier {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            home: Vec2::ZERO,
            vitals: Vitals::new(60.0, 0.0, 0.0),
            dps: 10.0,
            melee_range: 18.0,
            leash: 75.0,
            respawn_seconds: 4.5,
            state: SoldierState::Idle,
        }
    }
}

impl Soldier {
    /// Stands the soldier up at `home` with full health.
    pub fn spawn(&mut self, home: Vec2, stats: &GarrisonStats) {
        *self = Self {
            position: home,
            home,
            vitals: Vitals::new(stats.soldier_hp, 0.0, 0.0),
            dps: stats.soldier_dps,
            melee_range: stats.soldier_range,
            leash: stats.leash,
            respawn_seconds: stats.respawn_seconds,
            state: SoldierState::Idle,
        };
    }

    /// Applies the owning tower's current level without respawning.
    ///
    /// Current hit points are left alone; the new cap applies on respawn.
    pub fn sync_stats(&mut self, stats: &GarrisonStats) {
        self.vitals.max_hp = stats.soldier_hp;
        self.dps = stats.soldier_dps;
        self.melee_range = stats.soldier_range;
        self.leash = stats.leash;
        self.respawn_seconds = stats.respawn_seconds;
    }

    /// Runs one step of the soldier state machine.
    ///
    /// `me` is the soldier's own handle, recorded on the enemy it blocks.
    pub fn update(&mut self, me: Handle<Self>, dt: f32, enemies: &mut Pool<Enemy>, arena: Arena) {
        if let SoldierState::Respawning { remaining } = self.state {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.vitals.hp = self.vitals.max_hp;
                self.position = self.home;
                self.state = SoldierState::Idle;
            } else {
                self.state = SoldierState::Respawning { remaining };
            }
            return;
        }

        let current = match self.state {
            SoldierState::Engaging(target)
                if enemies.get(target).is_some_and(Enemy::is_targetable) =>
            {
                Some(target)
            }
            _ => None,
        };
        let target = current.or_else(|| self.acquire(me, enemies));

        if let Some(handle) = target {
            self.state = SoldierState::Engaging(handle);
            if let Some(enemy) = enemies.get_mut(handle) {
                self.engage(me, dt, enemy);
                return;
            }
        }

        self.state = SoldierState::Idle;
        self.walk_home(dt, arena);
    }

    fn acquire(&self, me: Handle<Self>, enemies: &mut Pool<Enemy>) -> Option<Handle<Enemy>> {
        let mut best: Option<(Handle<Enemy>, f32)> = None;
        for (handle, enemy) in enemies.iter_active() {
            if !enemy.is_targetable() || !within_radius(self.home, self.leash, enemy.position()) {
                continue;
            }
            let distance_sq = self.position.distance_squared(enemy.position());
            if best.map_or(true, |(_, closest)| distance_sq < closest) {
                best = Some((handle, distance_sq));
            }
        }

        let (handle, _) = best?;
        if let Some(enemy) = enemies.get_mut(handle) {
            enemy.block(me);
        }
        Some(handle)
    }

    fn engage(&mut self, me: Handle<Self>, dt: f32, enemy: &mut Enemy) {
        let towards = enemy.position() - self.position;
        if towards.length() <= self.melee_range + enemy.radius() + MELEE_SLACK {
            enemy.block(me);
            let _ = apply_damage(enemy.vitals_mut(), self.dps * dt, DamageType::Physical);
            let _ = apply_damage(
                &mut self.vitals,
                enemy.attack_dps() * dt,
                DamageType::Physical,
            );
            if self.vitals.is_depleted() {
                self.fall();
            }
            return;
        }

        self.position += towards.normalize_or_zero() * (SOLDIER_SPEED * dt);
        if !within_radius(self.home, self.leash, self.position) {
            self.state = SoldierState::Idle;
        }
    }

    fn fall(&mut self) {
        self.vitals.hp = 0.0;
        self.state = SoldierState::Respawning {
            remaining: self.respawn_seconds,
        };
    }

    fn walk_home(&mut self, dt: f32, arena: Arena) {
        let step = SOLDIER_SPEED * dt;
        let towards = self.home - self.position;
        if towards.length() <= step {
            self.position = self.home;
        } else {
            self.position += towards.normalize_or_zero() * step;
        }
        self.position = self.position.clamp(arena.min, arena.max);
    }

    /// Reports whether the soldier is up and able to hold an enemy.
    #[must_use]
    pub fn is_standing(&self) -> bool {
        !matches!(self.state, SoldierState::Respawning { .. })
    }

    /// Current position in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Anchor the soldier returns to and measures its leash from.
    #[must_use]
    pub fn home(&self) -> Vec2 {
        self.home
    }

    /// Body radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        SOLDIER_RADIUS
    }

    /// Hit points.
    #[must_use]
    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Melee damage per second.
    #[must_use]
    pub fn dps(&self) -> f32 {
        self.dps
    }

    /// Maximum engagement distance from home.
    #[must_use]
    pub fn leash(&self) -> f32 {
        self.leash
    }

    /// State machine position.
    #[must_use]
    pub fn state(&self) -> SoldierState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathguard_core::{EnemyArchetype, EnemyKind};

    fn stats() -> GarrisonStats {
        GarrisonStats {
            soldier_hp: 50.0,
            soldier_dps: 10.0,
            soldier_range: 18.0,
            leash: 75.0,
            respawn_seconds: 2.0,
        }
    }

    fn brute(attack_dps: f32) -> EnemyArchetype {
        EnemyArchetype {
            kind: EnemyKind::Brute,
            max_hp: 200.0,
            speed: 0.0,
            armor: 0.0,
            magic_resist: 0.0,
            gold_reward: 10,
            radius: 12.0,
            attack_dps,
        }
    }

    fn arena() -> Arena {
        Arena::around(960.0, 540.0)
    }

    fn field(at: Vec2, attack_dps: f32) -> (Pool<Enemy>, Handle<Enemy>) {
        let mut enemies = Pool::new(4, Enemy::default);
        let (handle, enemy) = enemies.acquire().expect("slot available");
        enemy.spawn(&brute(attack_dps), &[at, at + Vec2::new(100.0, 0.0)]);
        (enemies, handle)
    }

    fn soldier_at(home: Vec2) -> (Pool<Soldier>, Handle<Soldier>) {
        let mut soldiers = Pool::new(1, Soldier::default);
        let (handle, soldier) = soldiers.acquire().expect("slot available");
        soldier.spawn(home, &stats());
        (soldiers, handle)
    }

    #[test]
    fn engaging_soldier_blocks_and_damages_in_melee() {
        let (mut enemies, target) = field(Vec2::new(20.0, 0.0), 0.0);
        let (mut soldiers, me) = soldier_at(Vec2::ZERO);
        let soldier = soldiers.get_mut(me).expect("soldier live");

        soldier.update(me, 0.5, &mut enemies, arena());

        assert_eq!(soldier.state(), SoldierState::Engaging(target));
        let enemy = enemies.get(target).expect("enemy live");
        assert_eq!(enemy.blocked_by(), Some(me));
        assert_eq!(enemy.vitals().hp, 195.0);
        assert_eq!(soldier.position(), Vec2::ZERO, "melee holds position");
    }

    #[test]
    fn enemies_outside_the_leash_are_ignored() {
        let (mut enemies, _) = field(Vec2::new(90.0, 0.0), 0.0);
        let (mut soldiers, me) = soldier_at(Vec2::ZERO);
        let soldier = soldiers.get_mut(me).expect("soldier live");

        soldier.update(me, 0.1, &mut enemies, arena());

        assert_eq!(soldier.state(), SoldierState::Idle);
    }

    #[test]
    fn soldier_chases_towards_distant_target() {
        let (mut enemies, target) = field(Vec2::new(70.0, 0.0), 0.0);
        let (mut soldiers, me) = soldier_at(Vec2::ZERO);
        let soldier = soldiers.get_mut(me).expect("soldier live");

        soldier.update(me, 0.1, &mut enemies, arena());

        assert_eq!(soldier.state(), SoldierState::Engaging(target));
        assert!((soldier.position().x - 8.5).abs() < 1e-4);
    }

    #[test]
    fn fallen_soldier_respawns_at_home_with_full_health() {
        let (mut enemies, _) = field(Vec2::new(20.0, 0.0), 200.0);
        let (mut soldiers, me) = soldier_at(Vec2::ZERO);
        let soldier = soldiers.get_mut(me).expect("soldier live");

        soldier.update(me, 0.5, &mut enemies, arena());
        assert_eq!(soldier.state(), SoldierState::Respawning { remaining: 2.0 });
        assert!(!soldier.is_standing());
        assert_eq!(soldier.vitals().hp, 0.0);

        soldier.update(me, 1.0, &mut enemies, arena());
        assert!(!soldier.is_standing());

        soldier.update(me, 1.0, &mut enemies, arena());
        assert_eq!(soldier.state(), SoldierState::Idle);
        assert_eq!(soldier.vitals().hp, 50.0);
        assert_eq!(soldier.position(), Vec2::ZERO);
    }

    #[test]
    fn idle_soldier_walks_home_and_snaps() {
        let mut enemies = Pool::new(1, Enemy::default);
        let (mut soldiers, me) = soldier_at(Vec2::new(100.0, 100.0));
        let soldier = soldiers.get_mut(me).expect("soldier live");
        soldier.position = Vec2::new(100.0, 0.0);

        soldier.update(me, 1.0, &mut enemies, arena());
        assert_eq!(soldier.position(), Vec2::new(100.0, 85.0));

        soldier.update(me, 1.0, &mut enemies, arena());
        assert_eq!(soldier.position(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn upgrades_sync_without_restoring_health() {
        let mut soldier = Soldier::default();
        soldier.spawn(Vec2::ZERO, &stats());
        soldier.vitals.hp = 20.0;

        let stronger = GarrisonStats {
            soldier_hp: 90.0,
            soldier_dps: 14.0,
            soldier_range: 18.0,
            leash: 80.0,
            respawn_seconds: 4.2,
        };
        soldier.sync_stats(&stronger);

        assert_eq!(soldier.vitals().max_hp, 90.0);
        assert_eq!(soldier.vitals().hp, 20.0);
        assert_eq!(soldier.dps(), 14.0);
        assert_eq!(soldier.leash(), 80.0);
    }

    #[test]
    fn leash_is_measured_from_home_but_nearest_from_the_soldier() {
        let mut enemies = Pool::new(4, Enemy::default);
        let mut place = |at: Vec2| {
            let (handle, enemy) = enemies.acquire().expect("slot available");
            enemy.spawn(&brute(0.0), &[at, at + Vec2::new(100.0, 0.0)]);
            handle
        };
        // 30 from home but 100 from the soldier.
        let near_home = place(Vec2::new(-30.0, 0.0));
        // 60 from home and 10 from the soldier.
        let near_soldier = place(Vec2::new(60.0, 0.0));
        // Closest of all to the soldier, but 77 from home.
        let beyond_leash = place(Vec2::new(77.0, 0.0));

        let (mut soldiers, me) = soldier_at(Vec2::ZERO);
        let soldier = soldiers.get_mut(me).expect("soldier live");
        soldier.position = Vec2::new(70.0, 0.0);

        soldier.update(me, 0.1, &mut enemies, arena());

        assert_eq!(soldier.state(), SoldierState::Engaging(near_soldier));
        let blocked = |handle| enemies.get(handle).and_then(Enemy::blocked_by);
        assert_eq!(blocked(near_soldier), Some(me));
        assert_eq!(blocked(near_home), None);
        assert_eq!(blocked(beyond_leash), None);
    }

    #[test]
    fn chase_past_the_leash_drops_the_target() {
        let (mut enemies, target) = field(Vec2::new(150.0, 0.0), 0.0);
        let (mut soldiers, me) = soldier_at(Vec2::ZERO);
        let soldier = soldiers.get_mut(me).expect("soldier live");
        soldier.position = Vec2::new(70.0, 0.0);
        soldier.state = SoldierState::Engaging(target);

        soldier.update(me, 0.1, &mut enemies, arena());
        assert_eq!(soldier.state(), SoldierState::Idle);
        assert!(soldier.position().x > 75.0, "stepped past the leash");

        soldier.update(me, 0.1, &mut enemies, arena());
        assert_eq!(soldier.state(), SoldierState::Idle, "target is not re-acquired");
        assert!(soldier.position().x < 75.0, "walking back home");
        assert_eq!(enemies.get(target).and_then(Enemy::blocked_by), None);
    }
}
