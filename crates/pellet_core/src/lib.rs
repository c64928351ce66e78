//! Pellet Core
//!
//! Contains the circle simulation:
//! - Typed instance store with slot recycling
//! - Verlet body store and sub-stepped integrator
//! - Uniform spatial grid broad phase and circle narrow phase
//! - Pointer-driven interaction layer
//! - Frame clock

pub mod collision;
pub mod entity;
pub mod error;
pub mod instance;
pub mod interaction;
pub mod math;
pub mod solver;
pub mod spatial_hash;
pub mod time;
pub mod verlet;
pub mod world;

pub use glam;

pub use collision::Collision;
pub use entity::{Handle, InstanceKind};
pub use error::StoreError;
pub use instance::{InstanceData, InstanceStore};
pub use interaction::{InputEvent, InputQueue, Interaction, PointerAction, PointerPhase, SpawnStyle, Viewport};
pub use solver::{Bounds, Solver, SolverConfig, StepStats};
pub use verlet::{VerletBody, VerletStore};
pub use world::{FrameInput, FrameStats, Simulation};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
