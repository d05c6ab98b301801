//! Starlane - real-time simulation core for a 2D space trading and combat game
//!
//! Core modules:
//! - `sim`: World state and the fixed-order tick (AI, physics, weapons, collisions)
//! - `scene`: Per-tick snapshot handed to the renderer (draw list, radar, HUD)
//! - `pipeline`: Worker thread and double-buffered snapshot swap
//! - `pacer`: Fixed-cadence frame pacing
//! - `settings`: Data-driven engine configuration

pub mod demo;
pub mod error;
pub mod pacer;
pub mod pipeline;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::EngineError;
pub use pacer::FramePacer;
pub use pipeline::{Engine, Simulation};
pub use scene::{PanelHandle, SceneSnapshot, SceneTransition};
pub use settings::Settings;
