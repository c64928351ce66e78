//! Verlet body store
//!
//! Integration state lives in a parallel array indexed exactly like the
//! circle table of the `InstanceStore`. Bodies carry no liveness flag; a body
//! at a dead index is stale until the slot is reused.

use glam::Vec2;

/// Linear drag applied against the implicit velocity each integration step.
pub const RESISTANCE: f32 = 0.3;

/// Position-history integration state of one circle.
///
/// Velocity is never stored; it is always `current_pos - old_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerletBody {
    pub current_pos: Vec2,
    pub old_pos: Vec2,
    pub acceleration: Vec2,
}

impl VerletBody {
    /// Body with zero initial velocity.
    pub fn at_rest(pos: Vec2) -> Self {
        Self {
            current_pos: pos,
            old_pos: pos,
            acceleration: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.current_pos - self.old_pos
    }

    #[inline]
    pub fn accelerate(&mut self, a: Vec2) {
        self.acceleration += a;
    }

    /// Damped Verlet step. Clears the accumulated acceleration.
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        let velocity = self.velocity();
        self.old_pos = self.current_pos;
        self.current_pos += velocity + (self.acceleration - velocity * RESISTANCE) * dt * dt;
        self.acceleration = Vec2::ZERO;
    }
}

/// Integration state for every circle slot.
#[derive(Debug, Default)]
pub struct VerletStore {
    bodies: Vec<VerletBody>,
}

impl VerletStore {
    pub fn new() -> Self {
        Self { bodies: Vec::new() }
    }

    /// Seed a resting body at `index`, growing the array to reach it.
    pub fn place(&mut self, index: u32, pos: Vec2) {
        let idx = index as usize;
        if idx >= self.bodies.len() {
            self.bodies.resize(idx + 1, VerletBody::default());
        }
        self.bodies[idx] = VerletBody::at_rest(pos);
    }

    pub fn get(&self, index: u32) -> Option<&VerletBody> {
        self.bodies.get(index as usize)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut VerletBody> {
        self.bodies.get_mut(index as usize)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn as_slice(&self) -> &[VerletBody] {
        &self.bodies
    }

    pub fn as_mut_slice(&mut self) -> &mut [VerletBody] {
        &mut self.bodies
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}
