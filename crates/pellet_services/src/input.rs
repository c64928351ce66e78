//! Pointer input abstraction
//!
//! Hosts feed one `PointerSample` per frame; the tracker turns button edges
//! and drags into `InputEvent`s on the simulation's queue.

use pellet_core::glam::Vec2;
use pellet_core::{InputEvent, InputQueue, PointerAction, PointerPhase};

/// Distance the cursor must travel from the press point before a held
/// button counts as dragging.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 6.0;

/// Raw pointer state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    /// Cursor position in screen space.
    pub position: Vec2,
    /// Button bound to spawning (primary) is held.
    pub spawn_down: bool,
    /// Button bound to deleting (secondary) is held.
    pub delete_down: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonState {
    down: bool,
    press_origin: Vec2,
    max_drag_sq: f32,
}

impl ButtonState {
    fn update(&mut self, down: bool, position: Vec2, threshold: f32) -> Option<PointerPhase> {
        let was_down = self.down;
        self.down = down;
        match (was_down, down) {
            (false, true) => {
                self.press_origin = position;
                self.max_drag_sq = 0.0;
                Some(PointerPhase::Pressed)
            }
            (true, true) => {
                self.max_drag_sq = self.max_drag_sq.max(position.distance_squared(self.press_origin));
                (self.max_drag_sq >= threshold * threshold).then_some(PointerPhase::Dragged)
            }
            _ => None,
        }
    }
}

/// Edge and drag detector for the spawn and delete buttons.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    spawn: ButtonState,
    delete: ButtonState,
    drag_threshold: f32,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::with_drag_threshold(DEFAULT_DRAG_THRESHOLD)
    }

    pub fn with_drag_threshold(drag_threshold: f32) -> Self {
        Self {
            spawn: ButtonState::default(),
            delete: ButtonState::default(),
            drag_threshold: drag_threshold.max(0.0),
        }
    }

    /// Record a sample and push the resulting events. Returns how many were pushed.
    ///
    /// Once a held button has been dragged past the threshold it reports
    /// `Dragged` on every sample until released, moving or not.
    pub fn sample(&mut self, sample: PointerSample, queue: &mut InputQueue) -> usize {
        let mut pushed = 0;
        let buttons = [
            (PointerAction::Spawn, sample.spawn_down),
            (PointerAction::Delete, sample.delete_down),
        ];
        for (action, down) in buttons {
            let state = match action {
                PointerAction::Spawn => &mut self.spawn,
                PointerAction::Delete => &mut self.delete,
            };
            if let Some(phase) = state.update(down, sample.position, self.drag_threshold) {
                queue.push(InputEvent::new(action, phase, sample.position));
                pushed += 1;
            }
        }
        pushed
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, spawn_down: bool) -> PointerSample {
        PointerSample {
            position: Vec2::new(x, 0.0),
            spawn_down,
            delete_down: false,
        }
    }

    #[test]
    fn press_drag_release() {
        let mut tracker = PointerTracker::new();
        let mut queue = InputQueue::new();

        assert_eq!(tracker.sample(at(0.0, false), &mut queue), 0);
        assert_eq!(tracker.sample(at(0.0, true), &mut queue), 1);
        // Held but still under the threshold.
        assert_eq!(tracker.sample(at(3.0, true), &mut queue), 0);
        assert_eq!(tracker.sample(at(7.0, true), &mut queue), 1);
        // Past the threshold it keeps firing even when back near the origin.
        assert_eq!(tracker.sample(at(1.0, true), &mut queue), 1);
        assert_eq!(tracker.sample(at(1.0, false), &mut queue), 0);

        let phases: Vec<_> = queue.drain().map(|e| (e.action, e.phase)).collect();
        assert_eq!(
            phases,
            vec![
                (PointerAction::Spawn, PointerPhase::Pressed),
                (PointerAction::Spawn, PointerPhase::Dragged),
                (PointerAction::Spawn, PointerPhase::Dragged),
            ]
        );
    }

    #[test]
    fn buttons_are_independent() {
        let mut tracker = PointerTracker::with_drag_threshold(0.0);
        let mut queue = InputQueue::new();
        let both = PointerSample {
            position: Vec2::new(5.0, 5.0),
            spawn_down: true,
            delete_down: true,
        };

        assert_eq!(tracker.sample(both, &mut queue), 2);
        assert_eq!(tracker.sample(PointerSample { spawn_down: false, ..both }, &mut queue), 1);

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events[2].action, PointerAction::Delete);
        assert_eq!(events[2].phase, PointerPhase::Dragged);
        assert_eq!(events[2].screen_pos, Vec2::new(5.0, 5.0));
    }
}
