//! Scripted pointer session standing in for a real window.
//!
//! The first 40% of frames hold the spawn button while the cursor sweeps
//! back and forth across the upper part of the simulation area. The last
//! 20% hold the delete button while sweeping the lower half. Frames in
//! between leave the pointer idle so the pile can settle.

use pellet_core::glam::Vec2;
use pellet_core::Viewport;
use pellet_services::PointerSample;

/// Frames per left-to-right sweep.
const SWEEP_FRAMES: u64 = 90;

pub struct PointerScript {
    frames: u64,
    viewport: Viewport,
}

impl PointerScript {
    pub fn new(frames: u64, viewport: Viewport) -> Self {
        Self { frames, viewport }
    }

    fn spawn_until(&self) -> u64 {
        self.frames * 2 / 5
    }

    fn delete_from(&self) -> u64 {
        self.frames - self.frames / 5
    }

    /// Screen-space x at `frame`, bouncing between the panel and the right edge.
    fn sweep_x(&self, frame: u64) -> f32 {
        let left = self.viewport.panel_width + 20.0;
        let right = (self.viewport.width - 20.0).max(left);
        let phase = (frame % (2 * SWEEP_FRAMES)) as f32 / SWEEP_FRAMES as f32;
        let t = if phase <= 1.0 { phase } else { 2.0 - phase };
        left + (right - left) * t
    }

    pub fn sample(&self, frame: u64) -> PointerSample {
        let x = self.sweep_x(frame);
        if frame < self.spawn_until() {
            PointerSample {
                position: Vec2::new(x, self.viewport.height * 0.2),
                spawn_down: true,
                delete_down: false,
            }
        } else if frame >= self.delete_from() {
            let rows = 4.0;
            let row = (frame / (2 * SWEEP_FRAMES)) as f32 % rows;
            let y = self.viewport.height * (0.5 + 0.45 * (row + 0.5) / rows);
            PointerSample {
                position: Vec2::new(x, y),
                spawn_down: false,
                delete_down: true,
            }
        } else {
            PointerSample {
                position: Vec2::new(x, self.viewport.height * 0.5),
                ..PointerSample::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> PointerScript {
        PointerScript::new(100, Viewport::new(800.0, 600.0, 200.0))
    }

    #[test]
    fn phases_follow_frame_count() {
        let s = script();
        assert!(s.sample(0).spawn_down);
        assert!(s.sample(39).spawn_down);
        assert!(!s.sample(40).spawn_down && !s.sample(40).delete_down);
        assert!(s.sample(80).delete_down);
        assert!(s.sample(99).delete_down);
    }

    #[test]
    fn cursor_stays_right_of_panel() {
        let s = script();
        for frame in 0..400 {
            let p = s.sample(frame).position;
            assert!(p.x >= 220.0 - 1e-3 && p.x <= 780.0 + 1e-3, "x = {}", p.x);
            assert!(p.y >= 0.0 && p.y <= 600.0);
        }
    }
}
