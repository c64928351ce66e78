//! Settings management

use pellet_core::glam::{Vec2, Vec4};
use pellet_core::{SolverConfig, SpawnStyle, Viewport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings are not valid JSON")]
    Parse(#[from] serde_json::Error),
}

/// Simulation settings. Every section falls back to its defaults, so a file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub simulation: SimulationSettings,
    pub spawn: SpawnSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    /// Width of the UI panel docked on the left edge.
    pub panel_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub gravity: [f32; 2],
    pub stiffness: f32,
    pub steps: u32,
    pub sim_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    pub min_radius: f32,
    pub max_radius: f32,
    pub color: [f32; 4],
    pub random_color: bool,
    pub outline_size: f32,
    pub outline_color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Frames to run before exiting.
    pub frames: u64,
    pub target_fps: f32,
    /// Sleep to hold `target_fps`; off runs as fast as possible.
    pub paced: bool,
    pub seed: u64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            width: viewport.width as u32,
            height: viewport.height as u32,
            panel_width: 300.0,
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let config = SolverConfig::default();
        Self {
            gravity: config.gravity.to_array(),
            stiffness: config.stiffness,
            steps: config.steps,
            sim_speed: config.sim_speed,
        }
    }
}

impl Default for SpawnSettings {
    fn default() -> Self {
        let style = SpawnStyle::default();
        Self {
            min_radius: style.min_radius,
            max_radius: style.max_radius,
            color: style.color.to_array(),
            random_color: style.random_color,
            outline_size: style.outline_size,
            outline_color: style.outline_color.to_array(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            target_fps: pellet_core::time::DEFAULT_TARGET_FPS,
            paced: false,
            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::from_json(&text)?;
                tracing::info!(path = %path.display(), "settings loaded");
                Ok(settings)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "settings file not found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn solver_config(&self) -> SolverConfig {
        let sim = &self.simulation;
        SolverConfig {
            gravity: Vec2::from_array(sim.gravity),
            stiffness: sim.stiffness,
            steps: sim.steps,
            sim_speed: sim.sim_speed,
        }
        .sanitized()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.window.width as f32,
            self.window.height as f32,
            self.window.panel_width,
        )
    }

    pub fn spawn_style(&self) -> SpawnStyle {
        let spawn = &self.spawn;
        SpawnStyle {
            min_radius: spawn.min_radius,
            max_radius: spawn.max_radius,
            color: Vec4::from_array(spawn.color),
            random_color: spawn.random_color,
            outline_size: spawn.outline_size,
            outline_color: Vec4::from_array(spawn.outline_color),
        }
    }
}
