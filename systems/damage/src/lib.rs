#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that applies mitigated damage to unit vitals.
//!
//! Physical damage is reduced by armor and magic damage by magic resist. The
//! multiplier never goes negative, so a resistance of one or more grants
//! immunity rather than healing. Hit points may drop below zero; entities
//! notice their death on their own next update.

use glam::Vec2;
use pathguard_core::{geometry::within_radius, DamageType, Vitals};

/// Fraction of incoming damage of `damage_type` that `vitals` actually take.
#[must_use]
pub fn mitigation(vitals: &Vitals, damage_type: DamageType) -> f32 {
    let resistance = match damage_type {
        DamageType::Physical => vitals.armor,
        DamageType::Magic => vitals.magic_resist,
    };
    (1.0 - resistance).max(0.0)
}

/// Applies `amount` of `damage_type` damage and returns the hit points removed.
pub fn apply_damage(vitals: &mut Vitals, amount: f32, damage_type: DamageType) -> f32 {
    let dealt = amount * mitigation(vitals, damage_type);
    vitals.hp -= dealt;
    dealt
}

/// Applies `amount` to every target whose position lies within `radius` of
/// `center`, boundary included.
///
/// Each target mitigates the full `amount` on its own. Returns how many
/// targets were hit.
pub fn apply_splash<'a, I>(
    center: Vec2,
    radius: f32,
    amount: f32,
    damage_type: DamageType,
    targets: I,
) -> usize
where
    I: IntoIterator<Item = (Vec2, &'a mut Vitals)>,
{
    let mut hits = 0;
    for (position, vitals) in targets {
        if within_radius(center, radius, position) {
            let _ = apply_damage(vitals, amount, damage_type);
            hits += 1;
        }
    }
    hits
}
