// world.rs - Simulation facade tying stores, input and solver together

use crate::entity::{Handle, InstanceKind};
use crate::error::StoreError;
use crate::instance::{InstanceData, InstanceStore};
use crate::interaction::{InputEvent, InputQueue, Interaction, SpawnStyle, Viewport};
use crate::solver::{Solver, SolverConfig, StepStats};
use crate::spatial_hash::fit_radius;
use crate::verlet::{VerletBody, VerletStore};
use glam::{Vec2, Vec4};

/// Per-frame input that is not a discrete pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    pub viewport: Viewport,
    /// The UI is hovering or dragging; pointer events must not reach the world.
    pub ui_captures_pointer: bool,
}

impl FrameInput {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ui_captures_pointer: false,
        }
    }
}

/// What one call to `Simulation::frame` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub spawned: usize,
    pub deleted: usize,
    /// Live circles after the frame.
    pub alive: usize,
    pub step: StepStats,
}

/// The whole circle simulation, driven one visual frame at a time.
///
/// Owns the instance store and the parallel Verlet store; both are only
/// mutated through spawn/delete and by the solver.
pub struct Simulation {
    instances: InstanceStore,
    bodies: VerletStore,
    solver: Solver,
    interaction: Interaction,
    queue: InputQueue,
    frame_count: u64,
}

impl Simulation {
    /// Create an empty simulation. `seed` drives spawn radius and colour.
    pub fn new(seed: u64) -> Self {
        Self::with_style(seed, SpawnStyle::default())
    }

    pub fn with_style(seed: u64, style: SpawnStyle) -> Self {
        Self {
            instances: InstanceStore::new(),
            bodies: VerletStore::new(),
            solver: Solver::new(),
            interaction: Interaction::with_style(seed, style),
            queue: InputQueue::new(),
            frame_count: 0,
        }
    }

    /// Add a circle and a body at rest in the same slot.
    ///
    /// The radius is clamped into `[0, BIGGER_RADIUS]`; larger circles could
    /// overlap without ever sharing a grid neighbourhood.
    pub fn spawn_circle(&mut self, position: Vec2, radius: f32, color: Vec4) -> Result<Handle, StoreError> {
        let handle = self.instances.add_circle(position, fit_radius(radius), color)?;
        self.bodies.place(handle.index(), position);
        Ok(handle)
    }

    /// Remove a body. The Verlet entry stays stale until the slot is reused.
    pub fn delete(&mut self, handle: Handle) -> bool {
        self.instances.delete(handle)
    }

    pub fn exists(&self, handle: Handle) -> bool {
        self.instances.exists(handle)
    }

    pub fn body(&self, handle: Handle) -> Option<&VerletBody> {
        if handle.kind() != InstanceKind::Circle || !self.exists(handle) {
            return None;
        }
        self.bodies.get(handle.index())
    }

    /// Queue a pointer event for the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    pub fn queue_mut(&mut self) -> &mut InputQueue {
        &mut self.queue
    }

    pub fn interaction_mut(&mut self) -> &mut Interaction {
        &mut self.interaction
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut Solver {
        &mut self.solver
    }

    /// Read-only view for the renderer.
    pub fn instances(&self) -> &InstanceStore {
        &self.instances
    }

    /// Live circle records in storage order.
    pub fn circles(&self) -> impl Iterator<Item = &InstanceData> + '_ {
        self.instances
            .slots(InstanceKind::Circle)
            .iter()
            .filter(|c| c.is_alive())
    }

    pub fn alive(&self) -> usize {
        self.instances.live_count(InstanceKind::Circle)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Drain queued input, then run every sub-step of one frame.
    pub fn frame(&mut self, input: &FrameInput, config: &SolverConfig) -> FrameStats {
        let config = config.sanitized();

        let report = self.interaction.apply(
            self.queue.drain(),
            &mut self.instances,
            &mut self.bodies,
            &input.viewport,
            input.ui_captures_pointer,
        );
        let step = self
            .solver
            .step(&mut self.instances, &mut self.bodies, &input.viewport, &config);
        self.frame_count += 1;

        let stats = FrameStats {
            spawned: report.spawned.len(),
            deleted: report.deleted.len(),
            alive: self.alive(),
            step,
        };
        tracing::debug!(
            frame = self.frame_count,
            spawned = stats.spawned,
            deleted = stats.deleted,
            alive = stats.alive,
            collisions = stats.step.collisions,
            "frame"
        );
        stats
    }

    /// Remove every body. Handles taken before the clear stay dead.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.bodies.clear();
        self.queue.clear();
    }
}
