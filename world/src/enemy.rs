//! Enemies walking the level path.

use glam::Vec2;
use pathguard_core::{EnemyArchetype, EnemyKind, Vitals};

use crate::{
    pool::{Handle, Pool},
    soldier::Soldier,
};

/// Extra distance beyond touching radii at which a soldier keeps an enemy blocked.
pub const BLOCK_SLACK: f32 = 2.0;

/// Path progress gained per world unit walked between waypoints.
pub const PROGRESS_PER_UNIT: f32 = 0.002;

/// Lifecycle of an enemy occupying a pool slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnemyState {
    /// Walking or blocked on the path.
    #[default]
    Advancing,
    /// Ran out of hit points; waiting to be settled.
    Dead,
    /// Walked past the final waypoint; waiting to be settled.
    Reached,
}

/// Pooled enemy record.
#[derive(Clone, Debug)]
pub struct Enemy {
    kind: EnemyKind,
    position: Vec2,
    radius: f32,
    vitals: Vitals,
    speed: f32,
    gold_reward: u32,
    attack_dps: f32,
    state: EnemyState,
    waypoint: usize,
    progress: f32,
    blocked_by: Option<Handle<Soldier>>,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            kind: EnemyKind::Grunt,
            position: Vec2::ZERO,
            radius: 12.0,
            vitals: Vitals::new(100.0, 0.0, 0.0),
            speed: 50.0,
            gold_reward: 5,
            attack_dps: 0.0,
            state: EnemyState::Advancing,
            waypoint: 0,
            progress: 0.0,
            blocked_by: None,
        }
    }
}

impl Enemy {
    /// Reinitialises the record from an archetype at the start of the path.
    pub fn spawn(&mut self, archetype: &EnemyArchetype, waypoints: &[Vec2]) {
        *self = Self {
            kind: archetype.kind,
            position: waypoints.first().copied().unwrap_or(Vec2::ZERO),
            radius: archetype.radius,
            vitals: Vitals::new(archetype.max_hp, archetype.armor, archetype.magic_resist),
            speed: archetype.speed,
            gold_reward: archetype.gold_reward,
            attack_dps: archetype.attack_dps,
            state: EnemyState::Advancing,
            waypoint: 0,
            progress: 0.0,
            blocked_by: None,
        };
    }

    /// Advances the enemy along `waypoints` by `dt` seconds.
    ///
    /// Settled enemies never move again. A blocked enemy holds its position
    /// while the blocking soldier is standing and close enough.
    pub fn update(&mut self, dt: f32, waypoints: &[Vec2], soldiers: &Pool<Soldier>) {
        if self.state != EnemyState::Advancing {
            return;
        }

        if self.vitals.is_depleted() {
            self.state = EnemyState::Dead;
            return;
        }

        if let Some(blocker) = self.blocked_by {
            let holding = soldiers.get(blocker).is_some_and(|soldier| {
                let stop = self.radius + soldier.radius() + BLOCK_SLACK;
                soldier.is_standing()
                    && self.position.distance_squared(soldier.position()) <= stop * stop
            });
            if holding {
                return;
            }
            self.blocked_by = None;
        }

        let next = self.waypoint + 1;
        let Some(&target) = waypoints.get(next) else {
            self.state = EnemyState::Reached;
            return;
        };

        let step = self.speed * dt;
        let towards = target - self.position;
        if towards.length() <= step {
            self.position = target;
            self.waypoint = next;
            self.progress += 1.0;
        } else {
            self.position += towards.normalize_or_zero() * step;
            self.progress += step * PROGRESS_PER_UNIT;
        }
    }

    /// Reports whether towers and soldiers may engage the enemy.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.state == EnemyState::Advancing
    }

    /// Marks `soldier` as the unit holding this enemy in place.
    pub fn block(&mut self, soldier: Handle<Soldier>) {
        self.blocked_by = Some(soldier);
    }

    /// Soldier last recorded as blocking the enemy, if any.
    #[must_use]
    pub fn blocked_by(&self) -> Option<Handle<Soldier>> {
        self.blocked_by
    }

    /// Archetype the enemy was spawned from.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current position in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Body radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Hit points and resistances.
    #[must_use]
    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    /// Mutable hit points and resistances, for the damage system.
    pub fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    /// Gold paid when the enemy dies.
    #[must_use]
    pub fn gold_reward(&self) -> u32 {
        self.gold_reward
    }

    /// Damage per second dealt to a soldier in melee.
    #[must_use]
    pub fn attack_dps(&self) -> f32 {
        self.attack_dps
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Index of the last waypoint reached.
    #[must_use]
    pub fn waypoint(&self) -> usize {
        self.waypoint
    }

    /// Monotonic ordering key for "furthest along the path".
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archetype() -> EnemyArchetype {
        EnemyArchetype {
            kind: EnemyKind::Grunt,
            max_hp: 100.0,
            speed: 10.0,
            armor: 0.0,
            magic_resist: 0.0,
            gold_reward: 5,
            radius: 12.0,
            attack_dps: 0.0,
        }
    }

    fn straight_path() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)]
    }

    fn spawned() -> Enemy {
        let mut enemy = Enemy::default();
        enemy.spawn(&archetype(), &straight_path());
        enemy
    }

    #[test]
    fn spawn_places_enemy_on_first_waypoint() {
        let enemy = spawned();
        assert_eq!(enemy.position(), Vec2::ZERO);
        assert_eq!(enemy.vitals().hp, 100.0);
        assert_eq!(enemy.progress(), 0.0);
        assert!(enemy.is_targetable());
    }

    #[test]
    fn moving_accumulates_proportional_progress() {
        let soldiers = Pool::new(0, Soldier::default);
        let mut enemy = spawned();

        enemy.update(1.0, &straight_path(), &soldiers);

        assert_eq!(enemy.position(), Vec2::new(10.0, 0.0));
        assert!((enemy.progress() - 10.0 * PROGRESS_PER_UNIT).abs() < 1e-6);
    }

    #[test]
    fn snapping_to_a_waypoint_adds_a_whole_step() {
        let soldiers = Pool::new(0, Soldier::default);
        let mut enemy = spawned();

        enemy.update(20.0, &straight_path(), &soldiers);

        assert_eq!(enemy.position(), Vec2::new(100.0, 0.0));
        assert_eq!(enemy.waypoint(), 1);
        assert_eq!(enemy.progress(), 1.0);
        assert_eq!(enemy.state(), EnemyState::Advancing);

        enemy.update(0.1, &straight_path(), &soldiers);
        assert_eq!(enemy.state(), EnemyState::Reached);
        assert!(!enemy.is_targetable());

        let progress = enemy.progress();
        enemy.update(5.0, &straight_path(), &soldiers);
        assert_eq!(enemy.position(), Vec2::new(100.0, 0.0));
        assert_eq!(enemy.progress(), progress);
        assert_eq!(enemy.state(), EnemyState::Reached);
    }

    #[test]
    fn settled_enemies_never_move() {
        let soldiers = Pool::new(0, Soldier::default);
        let mut enemy = spawned();
        enemy.vitals_mut().hp = 0.0;

        enemy.update(1.0, &straight_path(), &soldiers);
        assert_eq!(enemy.state(), EnemyState::Dead);

        enemy.vitals_mut().hp = 50.0;
        enemy.update(1.0, &straight_path(), &soldiers);
        assert_eq!(enemy.position(), Vec2::ZERO);
        assert_eq!(enemy.state(), EnemyState::Dead);
    }

    #[test]
    fn stale_blocker_releases_the_enemy() {
        let mut soldiers = Pool::new(1, Soldier::default);
        let (handle, _) = soldiers.acquire().expect("slot available");
        assert!(soldiers.release(handle));

        let mut enemy = spawned();
        enemy.block(handle);
        enemy.update(1.0, &straight_path(), &soldiers);

        assert_eq!(enemy.blocked_by(), None);
        assert_eq!(enemy.position(), Vec2::new(10.0, 0.0));
    }
}
