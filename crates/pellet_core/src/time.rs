//! Frame pacing
//!
//! Caps the visual frame rate and counts frames per wall-clock second

use std::time::{Duration, Instant};

/// Default frame-rate cap.
pub const DEFAULT_TARGET_FPS: f32 = 60.0;

/// Wall-clock frame tracker with an optional sleep to hold a target rate.
pub struct FrameClock {
    target_fps: f32,
    frame_start: Instant,
    delta: Duration,
    second_timer: Duration,
    frames_this_second: u32,
    fps: u32,
    frame_count: u64,
}

impl FrameClock {
    pub fn new(target_fps: f32) -> Self {
        Self {
            target_fps: Self::checked(target_fps),
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            second_timer: Duration::ZERO,
            frames_this_second: 0,
            fps: 0,
            frame_count: 0,
        }
    }

    // The pacing budget is 1 / (target - 1); keep it finite and positive.
    fn checked(target_fps: f32) -> f32 {
        if target_fps.is_finite() {
            target_fps.max(2.0)
        } else {
            DEFAULT_TARGET_FPS
        }
    }

    pub fn set_target(&mut self, target_fps: f32) {
        self.target_fps = Self::checked(target_fps);
    }

    pub fn target(&self) -> f32 {
        self.target_fps
    }

    /// Frame budget. Aims one frame per second above the target so the
    /// measured rate lands on it rather than just below.
    pub fn budget(&self) -> Duration {
        Duration::from_secs_f32(1.0 / (self.target_fps - 1.0))
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Close the frame without sleeping.
    pub fn end_frame_unpaced(&mut self) {
        self.delta = self.frame_start.elapsed();
        self.count_frame();
    }

    /// Close the frame, sleeping out whatever is left of the budget.
    pub fn end_frame(&mut self) {
        let budget = self.budget();
        let elapsed = self.frame_start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
        self.delta = self.frame_start.elapsed();
        self.count_frame();
    }

    fn count_frame(&mut self) {
        self.frame_count += 1;
        self.frames_this_second += 1;
        self.second_timer += self.delta;
        if self.second_timer >= Duration::from_secs(1) {
            self.fps = self.frames_this_second;
            self.frames_this_second = 0;
            self.second_timer = Duration::ZERO;
            tracing::trace!(fps = self.fps, "frame rate");
        }
    }

    /// Duration of the last completed frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Frames completed during the last full second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Rate implied by the last frame alone.
    pub fn instant_fps(&self) -> f32 {
        let secs = self.delta.as_secs_f32();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_kept_sane() {
        assert_eq!(FrameClock::new(0.0).target(), 2.0);
        assert_eq!(FrameClock::new(f32::NAN).target(), DEFAULT_TARGET_FPS);
        let clock = FrameClock::new(11.0);
        assert!((clock.budget().as_secs_f32() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn paced_frame_lasts_at_least_the_budget() {
        let mut clock = FrameClock::new(201.0);
        clock.begin_frame();
        clock.end_frame();
        assert!(clock.delta() >= clock.budget());
        assert_eq!(clock.frame_count(), 1);
        assert!(clock.instant_fps() > 0.0);
    }

    #[test]
    fn fps_counted_per_second() {
        let mut clock = FrameClock::default();
        for _ in 0..3 {
            clock.delta = Duration::from_millis(400);
            clock.count_frame();
        }
        assert_eq!(clock.fps(), 3);
        assert_eq!(clock.frame_count(), 3);
    }
}
