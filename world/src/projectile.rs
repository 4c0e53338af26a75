//! Homing projectiles fired by ranged towers.

use glam::Vec2;
use pathguard_core::{geometry::circles_overlap, DamageType};

use crate::{
    enemy::Enemy,
    pool::{Handle, Pool},
};

/// Collision radius of every projectile.
pub const PROJECTILE_RADIUS: f32 = 4.0;

/// Seconds a projectile may fly before it fizzles.
pub const PROJECTILE_MAX_LIFE: f32 = 2.2;

/// Payload a tower loads into a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Flight speed in world units per second.
    pub speed: f32,
    /// Damage before mitigation.
    pub damage: f32,
    /// Mitigation channel.
    pub damage_type: DamageType,
    /// Area-of-effect radius. Zero hits only the struck enemy.
    pub splash: f32,
}

/// Damage the world must apply after a projectile connects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Impact {
    /// Damage lands on the struck enemy only.
    Single {
        /// Enemy that was struck.
        enemy: Handle<Enemy>,
        /// Damage before mitigation.
        amount: f32,
        /// Mitigation channel.
        damage_type: DamageType,
    },
    /// Damage lands on every valid enemy within `radius` of `center`.
    Splash {
        /// Impact point.
        center: Vec2,
        /// Area-of-effect radius.
        radius: f32,
        /// Damage before mitigation, applied per enemy.
        amount: f32,
        /// Mitigation channel.
        damage_type: DamageType,
    },
}

/// Result of advancing a projectile by one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileOutcome {
    /// Still travelling.
    InFlight,
    /// Lifetime ran out without a hit.
    Expired,
    /// Struck an enemy; the projectile is spent.
    Hit(Impact),
}

/// Pooled projectile record.
#[derive(Clone, Debug, Default)]
pub struct Projectile {
    position: Vec2,
    velocity: Vec2,
    shot: Option<Shot>,
    target: Option<Handle<Enemy>>,
    life: f32,
}

impl Projectile {
    /// Launches the projectile from `origin` straight at `target_position`.
    pub fn fire(&mut self, origin: Vec2, target: Handle<Enemy>, target_position: Vec2, shot: Shot) {
        *self = Self {
            position: origin,
            velocity: (target_position - origin).normalize_or_zero() * shot.speed,
            shot: Some(shot),
            target: Some(target),
            life: 0.0,
        };
    }

    /// Advances the projectile by `dt` seconds and reports what happened.
    ///
    /// While the target is still valid the projectile re-aims at it each step
    /// and only tests collision against it. Once the target is gone it flies
    /// straight and hits the first valid enemy it overlaps.
    pub fn update(&mut self, dt: f32, enemies: &Pool<Enemy>) -> ProjectileOutcome {
        let Some(shot) = self.shot else {
            return ProjectileOutcome::Expired;
        };

        self.life += dt;
        if self.life > PROJECTILE_MAX_LIFE {
            return ProjectileOutcome::Expired;
        }

        let target = self
            .target
            .and_then(|handle| enemies.get(handle).map(|enemy| (handle, enemy)))
            .filter(|(_, enemy)| enemy.is_targetable());
        if target.is_none() {
            self.target = None;
        }

        if let Some((_, enemy)) = target {
            let speed = match self.velocity.length() {
                speed if speed > 0.0 => speed,
                _ => 1.0,
            };
            self.velocity = (enemy.position() - self.position).normalize_or_zero() * speed;
        }

        self.position += self.velocity * dt;

        let struck = match target {
            Some((handle, enemy)) => self.touches(enemy).then_some(handle),
            None => enemies
                .iter_active()
                .find(|(_, enemy)| enemy.is_targetable() && self.touches(enemy))
                .map(|(handle, _)| handle),
        };

        match struck {
            Some(enemy) => ProjectileOutcome::Hit(self.impact(enemy, shot)),
            None => ProjectileOutcome::InFlight,
        }
    }

    fn touches(&self, enemy: &Enemy) -> bool {
        circles_overlap(
            self.position,
            PROJECTILE_RADIUS,
            enemy.position(),
            enemy.radius(),
        )
    }

    fn impact(&self, enemy: Handle<Enemy>, shot: Shot) -> Impact {
        if shot.splash > 0.0 {
            Impact::Splash {
                center: self.position,
                radius: shot.splash,
                amount: shot.damage,
                damage_type: shot.damage_type,
            }
        } else {
            Impact::Single {
                enemy,
                amount: shot.damage,
                damage_type: shot.damage_type,
            }
        }
    }

    /// Current position in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity in world units per second.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Enemy the projectile is still homing on, if any.
    #[must_use]
    pub fn target(&self) -> Option<Handle<Enemy>> {
        self.target
    }

    /// Payload loaded at fire time.
    #[must_use]
    pub fn shot(&self) -> Option<Shot> {
        self.shot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathguard_core::{EnemyArchetype, EnemyKind};

    fn archetype() -> EnemyArchetype {
        EnemyArchetype {
            kind: EnemyKind::Grunt,
            max_hp: 100.0,
            speed: 0.0,
            armor: 0.0,
            magic_resist: 0.0,
            gold_reward: 5,
            radius: 12.0,
            attack_dps: 0.0,
        }
    }

    fn enemy_at(pool: &mut Pool<Enemy>, at: Vec2) -> Handle<Enemy> {
        let (handle, enemy) = pool.acquire().expect("slot available");
        enemy.spawn(&archetype(), &[at, at + Vec2::X]);
        handle
    }

    fn arrow(speed: f32) -> Shot {
        Shot {
            speed,
            damage: 10.0,
            damage_type: DamageType::Physical,
            splash: 0.0,
        }
    }

    #[test]
    fn projectile_hits_its_target() {
        let mut enemies = Pool::new(2, Enemy::default);
        let target = enemy_at(&mut enemies, Vec2::new(100.0, 0.0));

        let mut projectile = Projectile::default();
        projectile.fire(Vec2::ZERO, target, Vec2::new(100.0, 0.0), arrow(100.0));

        assert_eq!(projectile.update(0.5, &enemies), ProjectileOutcome::InFlight);
        assert_eq!(
            projectile.update(0.4, &enemies),
            ProjectileOutcome::Hit(Impact::Single {
                enemy: target,
                amount: 10.0,
                damage_type: DamageType::Physical,
            })
        );
    }

    #[test]
    fn projectile_expires_after_its_lifetime() {
        let enemies = Pool::new(1, Enemy::default);
        let mut projectile = Projectile::default();
        let mut scratch = Pool::new(1, Enemy::default);
        let ghost = enemy_at(&mut scratch, Vec2::new(1000.0, 0.0));
        projectile.fire(Vec2::ZERO, ghost, Vec2::new(1000.0, 0.0), arrow(10.0));

        assert_eq!(projectile.update(2.0, &enemies), ProjectileOutcome::InFlight);
        assert_eq!(projectile.update(0.3, &enemies), ProjectileOutcome::Expired);
    }

    #[test]
    fn lost_target_flies_straight_and_hits_bystanders() {
        let mut enemies = Pool::new(2, Enemy::default);
        let target = enemy_at(&mut enemies, Vec2::new(0.0, 100.0));
        let bystander = enemy_at(&mut enemies, Vec2::new(50.0, 0.0));

        let mut projectile = Projectile::default();
        projectile.fire(Vec2::ZERO, target, Vec2::new(100.0, 0.0), arrow(100.0));
        assert!(enemies.release(target));

        assert_eq!(projectile.update(0.1, &enemies), ProjectileOutcome::InFlight);
        assert_eq!(projectile.target(), None);
        assert_eq!(projectile.position(), Vec2::new(10.0, 0.0));

        match projectile.update(0.3, &enemies) {
            ProjectileOutcome::Hit(Impact::Single { enemy, .. }) => assert_eq!(enemy, bystander),
            other => panic!("expected a hit on the bystander, got {other:?}"),
        }
    }

    #[test]
    fn homing_keeps_speed_while_turning() {
        let mut enemies = Pool::new(1, Enemy::default);
        let target = enemy_at(&mut enemies, Vec2::new(0.0, 200.0));

        let mut projectile = Projectile::default();
        projectile.fire(Vec2::ZERO, target, Vec2::new(200.0, 0.0), arrow(50.0));

        assert_eq!(projectile.update(0.1, &enemies), ProjectileOutcome::InFlight);
        assert!((projectile.velocity() - Vec2::new(0.0, 50.0)).length() < 1e-4);
    }

    #[test]
    fn splash_shots_report_the_impact_point() {
        let mut enemies = Pool::new(1, Enemy::default);
        let target = enemy_at(&mut enemies, Vec2::new(10.0, 0.0));

        let mut projectile = Projectile::default();
        let shell = Shot {
            splash: 55.0,
            ..arrow(100.0)
        };
        projectile.fire(Vec2::ZERO, target, Vec2::new(10.0, 0.0), shell);

        match projectile.update(0.01, &enemies) {
            ProjectileOutcome::Hit(Impact::Splash { center, radius, .. }) => {
                assert!((center - Vec2::new(1.0, 0.0)).length() < 1e-4);
                assert_eq!(radius, 55.0);
            }
            other => panic!("expected a splash impact, got {other:?}"),
        }
    }
}
