#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks the enemy a tower should shoot at.
//!
//! The world feeds candidates in pool order and the system returns the handle
//! of the best one for the tower's [`TargetingMode`]. Candidates that are not
//! targetable (dead, leaked, or inactive) must be filtered out by the caller.
//! Ties keep the candidate that was seen first, so the result is a pure
//! function of the enumeration order.

use glam::Vec2;
use pathguard_core::TargetingMode;

/// Snapshot of an enemy considered for targeting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<H> {
    /// Handle the world uses to find the enemy again.
    pub handle: H,
    /// Enemy position in world units.
    pub position: Vec2,
    /// Monotonic path progress; larger values are further along the path.
    pub progress: f32,
    /// Remaining hit points.
    pub hp: f32,
}

/// Selects the best candidate within `range` of `origin` for `mode`.
///
/// Candidates exactly `range` away are in range. Returns `None` when nothing
/// is in range.
pub fn select_target<H, I>(
    mode: TargetingMode,
    origin: Vec2,
    range: f32,
    candidates: I,
) -> Option<H>
where
    H: Copy,
    I: IntoIterator<Item = Candidate<H>>,
{
    let max_distance_sq = range * range;
    let mut best: Option<Scored<H>> = None;

    for candidate in candidates {
        let distance_sq = origin.distance_squared(candidate.position);
        if distance_sq > max_distance_sq {
            continue;
        }

        let current = Scored {
            handle: candidate.handle,
            distance_sq,
            progress: candidate.progress,
            hp: candidate.hp,
        };

        match &mut best {
            Some(existing) => {
                if current.beats(existing, mode) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|scored| scored.handle)
}

#[derive(Clone, Copy, Debug)]
struct Scored<H> {
    handle: H,
    distance_sq: f32,
    progress: f32,
    hp: f32,
}

impl<H> Scored<H> {
    fn beats(&self, other: &Self, mode: TargetingMode) -> bool {
        match mode {
            TargetingMode::First => self.progress > other.progress,
            TargetingMode::Closest => self.distance_sq < other.distance_sq,
            TargetingMode::Strongest => self.hp > other.hp,
        }
    }
}
