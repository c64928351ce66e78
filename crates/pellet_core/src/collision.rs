//! Circle narrow phase and relaxation response.

use crate::instance::InstanceData;
use crate::math::inverse_sqrt;
use crate::verlet::VerletBody;
use glam::Vec2;

/// Squared centre distance under which two circles count as coincident.
pub const DEGENERATE_DIST_SQ: f32 = 1e-3;

/// Result of a pairwise test. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub hit: bool,
    /// Unit vector from A towards B.
    pub normal: Vec2,
    /// Penetration distance.
    pub depth: f32,
}

impl Collision {
    pub const MISS: Collision = Collision {
        hit: false,
        normal: Vec2::ZERO,
        depth: 0.0,
    };
}

/// Overlap test between two circles.
///
/// Coincident centres report a miss since no normal can be derived.
pub fn circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Collision {
    let d = b_pos - a_pos;
    let summed = a_radius + b_radius;
    let dist2 = d.dot(d);
    if dist2 >= summed * summed {
        return Collision::MISS;
    }
    if dist2 <= DEGENERATE_DIST_SQ {
        return Collision::MISS;
    }

    let inv_dist = inverse_sqrt(dist2);
    Collision {
        hit: true,
        normal: d * inv_dist,
        depth: summed - dist2 * inv_dist,
    }
}

/// Overlap test between two instance records; anything but a circle pair misses.
pub fn circle_collision_instances(a: &InstanceData, b: &InstanceData) -> Collision {
    if !a.is_circle() || !b.is_circle() {
        return Collision::MISS;
    }
    circle_collision(a.position, a.radius(), b.position, b.radius())
}

/// Push both bodies apart along the normal, half of `depth * stiffness` each.
#[inline]
pub fn resolve_pair(a: &mut VerletBody, b: &mut VerletBody, collision: &Collision, stiffness: f32) {
    let push = collision.normal * (collision.depth * stiffness * 0.5);
    a.current_pos -= push;
    b.current_pos += push;
}
