//! Pellet Metrics - frame and phase timing for the simulation
//!
//! Instrumentation that vanishes from builds without the `metrics` feature:
//! the same types exist either way, but the stubs record nothing.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use pellet_metrics::{FrameTimer, SystemProfiler};
//!
//! let mut timer = FrameTimer::new(60); // Track last 60 frames
//! let mut profiler = SystemProfiler::new();
//! timer.begin();
//! profiler.time_system("collide", || solve_pairs());
//! timer.end();
//! tracing::info!(fps = timer.fps(), "frame");
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod system_profiler;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use system_profiler::{PhaseTiming, SystemProfiler};

/// True when this build records metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// Macros for conditional compilation
// ============================================================================

/// Execute code only when metrics are enabled
#[macro_export]
macro_rules! metrics {
    ($($tt:tt)*) => {
        #[cfg(feature = "metrics")]
        {
            $($tt)*
        }
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTiming {
    pub total: std::time::Duration,
    pub calls: u64,
}

#[cfg(not(feature = "metrics"))]
impl PhaseTiming {
    pub fn average(&self) -> std::time::Duration { std::time::Duration::ZERO }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn frames(&self) -> u64 { 0 }
    pub fn fps(&self) -> f64 { 0.0 }
    pub fn frame_time_ms(&self) -> f64 { 0.0 }
    pub fn frame_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: usize) {}
    pub fn set(&mut self, _name: &'static str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
    pub fn reset_all(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct SystemProfiler;

#[cfg(not(feature = "metrics"))]
impl SystemProfiler {
    pub fn new() -> Self { Self }
    pub fn time_system<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn get_timing(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn phase(&self, _name: &str) -> PhaseTiming { PhaseTiming::default() }
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, PhaseTiming)> { std::iter::empty() }
}
