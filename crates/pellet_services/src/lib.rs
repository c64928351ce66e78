//! Pellet Services Layer
//!
//! Glue between the simulation core and the host: settings on disk and the
//! translation of raw pointer samples into interaction events.

pub mod input;
pub mod settings;

pub use input::{PointerSample, PointerTracker};
pub use settings::{Settings, SettingsError};
