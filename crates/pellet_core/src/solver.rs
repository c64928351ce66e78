//! Sub-stepped Verlet integrator with grid-driven collision relaxation.
//!
//! Each frame runs `steps` sub-steps. A sub-step is strictly phased:
//! grid rebuild, gravity on every body, integration of every body, all pair
//! tests, then boundary clamping. Phases never interleave across bodies.
//!
//! The pair pass is Jacobi-style: every test in a sub-step sees the
//! positions as they were right after integration.

use crate::collision::{circle_collision, resolve_pair};
use crate::entity::InstanceKind;
use crate::instance::InstanceStore;
use crate::interaction::Viewport;
use crate::math::clamp_ordered;
use crate::spatial_hash::SpatialGrid;
use crate::verlet::VerletBody;
use crate::verlet::VerletStore;
use glam::Vec2;
use pellet_metrics::SystemProfiler;

/// Gravity components smaller than this are snapped to zero by `sanitized`.
pub const GRAVITY_DEAD_ZONE: f32 = 0.2;

/// Per-call tunables for `Solver::step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub gravity: Vec2,
    /// Under-relaxation factor applied to every penetration correction.
    pub stiffness: f32,
    /// Sub-steps per frame.
    pub steps: u32,
    /// Simulated time per frame; split evenly across sub-steps.
    pub sim_speed: f32,
}

impl SolverConfig {
    #[inline]
    pub fn sub_dt(&self) -> f32 {
        self.sim_speed / self.steps.max(1) as f32
    }

    /// Copy with stiffness in `[0, 1]`, at least one sub-step and the
    /// gravity dead-zone applied.
    pub fn sanitized(&self) -> Self {
        let snap = |g: f32| if g.abs() < GRAVITY_DEAD_ZONE { 0.0 } else { g };
        let stiffness = if self.stiffness.is_nan() {
            Self::default().stiffness
        } else {
            self.stiffness.clamp(0.0, 1.0)
        };
        Self {
            gravity: Vec2::new(snap(self.gravity.x), snap(self.gravity.y)),
            stiffness,
            steps: self.steps.max(1),
            sim_speed: self.sim_speed,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.0),
            stiffness: 0.2,
            steps: 4,
            sim_speed: 1.0,
        }
    }
}

/// World box that body centres are held inside (inset by their radius).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Viewport box minus the UI panel on the leading (left) edge.
    pub fn from_viewport(half_extent: Vec2, panel_width: f32) -> Self {
        Self {
            min: Vec2::new(-half_extent.x + panel_width, -half_extent.y),
            max: half_extent,
        }
    }

    /// Hold a circle of `radius` inside the box, per axis. Positions already
    /// inside are returned unchanged.
    #[inline]
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            clamp_ordered(pos.x, self.min.x + radius, self.max.x - radius),
            clamp_ordered(pos.y, self.min.y + radius, self.max.y - radius),
        )
    }
}

/// Counters from one `Solver::step` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub substeps: u32,
    /// Narrow-phase tests over all sub-steps.
    pub pair_tests: usize,
    /// Hits in the final sub-step.
    pub collisions: usize,
    /// Hits over all sub-steps.
    pub total_collisions: usize,
}

/// Owns the broad-phase grid and scratch buffers between frames.
pub struct Solver {
    grid: SpatialGrid,
    alive: Vec<u32>,
    profiler: SystemProfiler,
}

impl Solver {
    pub fn new() -> Self {
        Self {
            grid: SpatialGrid::new(),
            alive: Vec::new(),
            profiler: SystemProfiler::new(),
        }
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Accumulated per-phase timings (empty without the `metrics` feature).
    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    pub fn profiler_mut(&mut self) -> &mut SystemProfiler {
        &mut self.profiler
    }

    /// Advance every live circle by one frame.
    pub fn step(
        &mut self,
        instances: &mut InstanceStore,
        bodies: &mut VerletStore,
        viewport: &Viewport,
        config: &SolverConfig,
    ) -> StepStats {
        let mut stats = StepStats::default();
        let half = viewport.half_extent();
        let bounds = Bounds::from_viewport(half, viewport.panel_width);
        let dt = config.sub_dt();

        for _ in 0..config.steps {
            self.collect_alive(instances, bodies);
            let (tests, hits) = self.substep(instances, bodies, half, &bounds, config, dt);
            stats.substeps += 1;
            stats.pair_tests += tests;
            stats.total_collisions += hits;
            stats.collisions = hits;
        }

        tracing::trace!(
            substeps = stats.substeps,
            pair_tests = stats.pair_tests,
            collisions = stats.collisions,
            "solver step"
        );
        stats
    }

    fn collect_alive(&mut self, instances: &InstanceStore, bodies: &VerletStore) {
        self.alive.clear();
        let slots = instances.slots(InstanceKind::Circle);
        let limit = slots.len().min(bodies.len());
        self.alive.extend(
            slots[..limit]
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_alive())
                .map(|(i, _)| i as u32),
        );
    }

    fn substep(
        &mut self,
        instances: &mut InstanceStore,
        bodies: &mut VerletStore,
        half: Vec2,
        bounds: &Bounds,
        config: &SolverConfig,
        dt: f32,
    ) -> (usize, usize) {
        let Self {
            grid,
            alive,
            profiler,
        } = self;
        let slots = instances.slots_mut(InstanceKind::Circle);
        let bodies = bodies.as_mut_slice();

        profiler.time_system("grid", || {
            grid.rebuild(half, alive.iter().map(|&i| (i, bodies[i as usize].current_pos)));
        });

        profiler.time_system("integrate", || {
            for &i in alive.iter() {
                bodies[i as usize].accelerate(config.gravity);
            }
            for &i in alive.iter() {
                let body = &mut bodies[i as usize];
                body.integrate(dt);
                slots[i as usize].position = body.current_pos;
            }
        });

        // Pairs are tested against the post-integration positions held in
        // the instance records; corrections only accumulate on the bodies.
        let mut hits = 0;
        let tests = profiler.time_system("collide", || {
            grid.for_each_candidate_pair(|a, b| {
                let (sa, sb) = (&slots[a as usize], &slots[b as usize]);
                let collision = circle_collision(sa.position, sa.radius(), sb.position, sb.radius());
                if collision.hit {
                    let (body_a, body_b) = pair_mut(&mut *bodies, a as usize, b as usize);
                    hits += 1;
                    resolve_pair(body_a, body_b, &collision, config.stiffness);
                }
            })
        });

        profiler.time_system("clamp", || {
            for &i in alive.iter() {
                let (slot, body) = (&mut slots[i as usize], &mut bodies[i as usize]);
                body.current_pos = bounds.clamp(body.current_pos, slot.radius());
                slot.position = body.current_pos;
            }
        });

        (tests, hits)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

/// Two distinct mutable bodies out of one slice.
fn pair_mut(bodies: &mut [VerletBody], a: usize, b: usize) -> (&mut VerletBody, &mut VerletBody) {
    debug_assert!(a != b);
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}
