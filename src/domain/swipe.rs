//! Swipe gesture classification for the trading deck
//!
//! A drag is resolved on its dominant axis. A direction commits when the
//! offset toward it exceeds [`DISTANCE_THRESHOLD`] or the release velocity
//! toward it exceeds [`VELOCITY_THRESHOLD`]; otherwise the card snaps back.
//!
//! | direction | intent |
//! |-----------|--------|
//! | right     | invest |
//! | left      | pass   |
//! | up        | watch  |
//!
//! Downward drags never commit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Drag distance in px that commits a swipe
pub const DISTANCE_THRESHOLD: f64 = 100.0;

/// Release speed in px/s that commits a swipe
pub const VELOCITY_THRESHOLD: f64 = 500.0;

/// Screen-space vector. `y` grows downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeIntent {
    Pass,
    Watch,
    Invest,
}

impl SwipeDirection {
    pub fn intent(self) -> SwipeIntent {
        match self {
            SwipeDirection::Left => SwipeIntent::Pass,
            SwipeDirection::Right => SwipeIntent::Invest,
            SwipeDirection::Up => SwipeIntent::Watch,
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwipeDirection::Left => f.pad("left"),
            SwipeDirection::Right => f.pad("right"),
            SwipeDirection::Up => f.pad("up"),
        }
    }
}

impl fmt::Display for SwipeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwipeIntent::Pass => f.pad("pass"),
            SwipeIntent::Watch => f.pad("watch"),
            SwipeIntent::Invest => f.pad("invest"),
        }
    }
}

/// Resolve a released drag into a swipe direction, or `None` to snap back.
///
/// The axis comes from the offset, or from the velocity when the card was
/// released from rest. Each direction is then checked on its own sign, so a
/// flick against a short drift exits the way it was flicked.
pub fn classify(offset: Vector2, velocity: Vector2) -> Option<SwipeDirection> {
    let horizontal = if offset == Vector2::ZERO {
        velocity.x.abs() >= velocity.y.abs()
    } else {
        offset.x.abs() >= offset.y.abs()
    };

    if horizontal {
        if offset.x > DISTANCE_THRESHOLD || velocity.x > VELOCITY_THRESHOLD {
            Some(SwipeDirection::Right)
        } else if offset.x < -DISTANCE_THRESHOLD || velocity.x < -VELOCITY_THRESHOLD {
            Some(SwipeDirection::Left)
        } else {
            None
        }
    } else if offset.y < -DISTANCE_THRESHOLD || velocity.y < -VELOCITY_THRESHOLD {
        Some(SwipeDirection::Up)
    } else {
        None
    }
}

/// Transient card state while the user interacts with it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        offset: Vector2,
        preview: Option<SwipeIntent>,
    },
}

/// A committed swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeResolution {
    pub direction: SwipeDirection,
    pub intent: SwipeIntent,
    /// Index of the card that left the deck
    pub card_index: usize,
    /// Index of the card now on top
    pub next_index: usize,
}

/// Cyclic deck of cards driven by drag gestures
#[derive(Debug, Clone)]
pub struct SwipeDeck<T> {
    cards: Vec<T>,
    index: usize,
    drag: DragState,
}

impl<T> SwipeDeck<T> {
    pub fn new(cards: Vec<T>) -> Self {
        Self {
            cards,
            index: 0,
            drag: DragState::Idle,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&T> {
        self.cards.get(self.index)
    }

    pub fn card(&self, index: usize) -> Option<&T> {
        self.cards.get(index)
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Track the card under the finger. Returns the intent the card would
    /// commit to if released now without velocity.
    pub fn drag_to(&mut self, offset: Vector2) -> Option<SwipeIntent> {
        let preview = classify(offset, Vector2::ZERO).map(SwipeDirection::intent);
        self.drag = DragState::Dragging { offset, preview };
        preview
    }

    /// Release the card with the given velocity
    pub fn release(&mut self, velocity: Vector2) -> Option<SwipeResolution> {
        let offset = match self.drag {
            DragState::Dragging { offset, .. } => offset,
            DragState::Idle => Vector2::ZERO,
        };
        match classify(offset, velocity) {
            Some(direction) => self.commit(direction),
            None => {
                self.drag = DragState::Idle;
                None
            }
        }
    }

    /// Commit a swipe without a gesture, as the action buttons do
    pub fn commit(&mut self, direction: SwipeDirection) -> Option<SwipeResolution> {
        self.drag = DragState::Idle;
        if self.cards.is_empty() {
            return None;
        }
        let card_index = self.index;
        self.index = (self.index + 1) % self.cards.len();
        Some(SwipeResolution {
            direction,
            intent: direction.intent(),
            card_index,
            next_index: self.index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_right_is_invest() {
        let dir = classify(Vector2::new(120.0, 0.0), Vector2::ZERO);
        assert_eq!(dir, Some(SwipeDirection::Right));
        assert_eq!(dir.unwrap().intent(), SwipeIntent::Invest);
    }

    #[test]
    fn test_classify_up_is_watch() {
        let dir = classify(Vector2::new(0.0, -150.0), Vector2::ZERO);
        assert_eq!(dir, Some(SwipeDirection::Up));
        assert_eq!(dir.unwrap().intent(), SwipeIntent::Watch);
    }

    #[test]
    fn test_classify_left_is_pass() {
        assert_eq!(
            classify(Vector2::new(-101.0, 40.0), Vector2::ZERO),
            Some(SwipeDirection::Left)
        );
    }

    #[test]
    fn test_below_threshold_snaps_back() {
        assert_eq!(classify(Vector2::new(30.0, 20.0), Vector2::ZERO), None);
        assert_eq!(classify(Vector2::new(100.0, 0.0), Vector2::ZERO), None);
    }

    #[test]
    fn test_velocity_commits_short_drag() {
        assert_eq!(
            classify(Vector2::new(20.0, 5.0), Vector2::new(650.0, 0.0)),
            Some(SwipeDirection::Right)
        );
        assert_eq!(
            classify(Vector2::new(0.0, -10.0), Vector2::new(0.0, -800.0)),
            Some(SwipeDirection::Up)
        );
    }

    #[test]
    fn test_dominant_axis_wins() {
        // Large vertical velocity is ignored when the drag is mostly horizontal
        assert_eq!(
            classify(Vector2::new(50.0, 10.0), Vector2::new(0.0, -900.0)),
            None
        );
    }

    #[test]
    fn test_down_never_commits() {
        assert_eq!(classify(Vector2::new(0.0, 300.0), Vector2::new(0.0, 900.0)), None);
    }

    #[test]
    fn test_flick_against_drift_follows_flick() {
        assert_eq!(
            classify(Vector2::new(50.0, 0.0), Vector2::new(-900.0, 0.0)),
            Some(SwipeDirection::Left)
        );
        assert_eq!(
            classify(Vector2::new(-10.0, 0.0), Vector2::new(600.0, 0.0)),
            Some(SwipeDirection::Right)
        );
    }

    #[test]
    fn test_downward_flick_after_upward_drift_snaps_back() {
        assert_eq!(classify(Vector2::new(0.0, -50.0), Vector2::new(0.0, 900.0)), None);
    }

    #[test]
    fn test_release_from_rest_uses_velocity_axis() {
        assert_eq!(
            classify(Vector2::ZERO, Vector2::new(0.0, -700.0)),
            Some(SwipeDirection::Up)
        );
        assert_eq!(classify(Vector2::ZERO, Vector2::new(0.0, 700.0)), None);

        let mut deck = SwipeDeck::new(vec!["A", "B"]);
        let res = deck.release(Vector2::new(40.0, -650.0)).unwrap();
        assert_eq!(res.direction, SwipeDirection::Up);
        assert_eq!(res.intent, SwipeIntent::Watch);
    }

    #[test]
    fn test_deck_cycles_and_resets() {
        let mut deck = SwipeDeck::new(vec!["A", "B", "C"]);

        assert_eq!(deck.drag_to(Vector2::new(130.0, 0.0)), Some(SwipeIntent::Invest));
        let res = deck.release(Vector2::ZERO).unwrap();
        assert_eq!(res.card_index, 0);
        assert_eq!(res.next_index, 1);
        assert_eq!(deck.drag_state(), DragState::Idle);

        deck.commit(SwipeDirection::Left);
        let res = deck.commit(SwipeDirection::Up).unwrap();
        assert_eq!(res.card_index, 2);
        assert_eq!(deck.current(), Some(&"A"));
    }

    #[test]
    fn test_deck_snap_back_keeps_card() {
        let mut deck = SwipeDeck::new(vec![1, 2]);
        assert_eq!(deck.drag_to(Vector2::new(30.0, 20.0)), None);
        assert!(deck.release(Vector2::ZERO).is_none());
        assert_eq!(deck.index(), 0);
        assert_eq!(deck.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_empty_deck_never_advances() {
        let mut deck: SwipeDeck<u8> = SwipeDeck::new(Vec::new());
        deck.drag_to(Vector2::new(500.0, 0.0));
        assert!(deck.release(Vector2::ZERO).is_none());
        assert!(deck.current().is_none());
    }
}
