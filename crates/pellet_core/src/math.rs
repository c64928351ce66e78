//! Math utilities
//!
//! Re-exports glam with the few scalar helpers the solver needs

pub use glam::*;

/// Reciprocal square root.
#[inline]
pub fn inverse_sqrt(x: f32) -> f32 {
    x.sqrt().recip()
}

/// Move `value` up to `lo`, then down to `hi`. Unlike `f32::clamp` this
/// never panics when `lo > hi`; `hi` wins.
#[inline]
pub fn clamp_ordered(value: f32, lo: f32, hi: f32) -> f32 {
    let mut v = value;
    if v < lo {
        v = lo;
    }
    if v > hi {
        v = hi;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_sqrt_of_four() {
        assert!((inverse_sqrt(4.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn clamp_ordered_inverted_range() {
        assert_eq!(clamp_ordered(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_ordered(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_ordered(11.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp_ordered(5.0, 8.0, 2.0), 2.0);
    }
}
