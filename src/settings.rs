//! Engine settings
//!
//! Loaded from an optional JSON file; every field falls back to its default
//! so a settings file only needs the keys it wants to change.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Seed for the gameplay and decorative random streams
    pub seed: u64,
    /// Mean ticks between incoming ships (0 disables spawning)
    pub spawn_period: u32,
    /// Ticks a ship may stay outside the player's system before it is dropped
    pub forget_after: u32,
    /// Visible area around the player, used for asteroid tiling
    pub viewport: (f64, f64),

    // === Pacing ===
    /// Ticks per second
    pub target_fps: u32,
    /// How late a frame may run before the pacer gives up catching up
    pub max_lag_ms: u64,

    // === HUD ===
    /// Ticks over which CPU load is averaged
    pub load_window: u32,
    /// Ticks a message stays on screen
    pub message_lifetime: u64,
    /// Show the CPU load figure
    pub show_load: bool,

    // === Headless runner ===
    /// Frames the binary runs before exiting
    pub demo_frames: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            spawn_period: 100,
            forget_after: 1000,
            viewport: (1024.0, 768.0),

            target_fps: 60,
            max_lag_ms: 100,

            load_window: 60,
            message_lifetime: 600,
            show_load: false,

            demo_frames: 600,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path).map_err(EngineError::SettingsRead)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::SettingsParse)
    }

    /// Duration of one tick
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    pub fn max_lag(&self) -> Duration {
        Duration::from_millis(self.max_lag_ms)
    }
}
