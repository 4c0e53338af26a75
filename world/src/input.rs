//! Pointer state fed in by the host and hover detection over build pads.

use glam::Vec2;
use pathguard_core::{geometry::within_radius, Circle, PadIndex};

/// Extra radius around a pad that still counts as hovering it.
pub const HOVER_SLACK: f32 = 8.0;

/// Last known pointer position and the pending click latch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    position: Vec2,
    clicked: bool,
}

impl Pointer {
    /// Records the pointer position.
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Latches a click until [`Pointer::consume_click`] observes it.
    pub fn press(&mut self) {
        self.clicked = true;
    }

    /// Returns the latched click, clearing it.
    pub fn consume_click(&mut self) -> bool {
        std::mem::take(&mut self.clicked)
    }

    /// Current position in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Reports whether a click is waiting to be consumed.
    #[must_use]
    pub fn has_pending_click(&self) -> bool {
        self.clicked
    }
}

/// First pad whose enlarged circle contains `point`.
#[must_use]
pub fn hovered_pad(pads: &[Circle], point: Vec2) -> Option<PadIndex> {
    pads.iter()
        .position(|pad| within_radius(pad.position, pad.radius + HOVER_SLACK, point))
        .and_then(|index| u32::try_from(index).ok())
        .map(PadIndex::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_latch_is_consumed_exactly_once() {
        let mut pointer = Pointer::default();
        assert!(!pointer.consume_click());

        pointer.press();
        pointer.press();
        assert!(pointer.has_pending_click());
        assert!(pointer.consume_click());
        assert!(!pointer.consume_click());
    }

    #[test]
    fn hover_uses_enlarged_radius_and_first_match() {
        let pads = [
            Circle::new(0.0, 0.0, 18.0),
            Circle::new(30.0, 0.0, 18.0),
        ];

        assert_eq!(hovered_pad(&pads, Vec2::new(26.0, 0.0)), Some(PadIndex::new(0)));
        assert_eq!(hovered_pad(&pads, Vec2::new(40.0, 0.0)), Some(PadIndex::new(1)));
        assert_eq!(hovered_pad(&pads, Vec2::new(0.0, 26.5)), None);
    }
}
