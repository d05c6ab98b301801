//! Error types surfaced by the engine

/// Errors that escape the simulation core
///
/// Data-shape problems inside a tick (dangling sprite or weapon ids) never
/// show up here; the tick skips them locally.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read settings: {0}")]
    SettingsRead(#[source] std::io::Error),

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[source] serde_json::Error),

    #[error("failed to parse game data: {0}")]
    Catalog(#[source] serde_json::Error),

    #[error("failed to spawn simulation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("simulation worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("simulation world is dead after an earlier worker failure")]
    WorldDead,

    #[error("no flagship could be placed: {0}")]
    NoFlagship(String),
}
