//! Immutable per-tick output consumed by the renderer
//!
//! The simulation writes one [`SceneSnapshot`] per tick; the pipeline hands
//! the committed one to the renderer thread. Nothing in here refers back to
//! live world state.

pub mod draw;
pub mod hud;
pub mod radar;

use serde::{Deserialize, Serialize};

pub use draw::{DrawItem, DrawList, DrawSource};
pub use hud::HudInfo;
pub use radar::{Pointer, RadarBlip, RadarColor, RadarList};

use crate::sim::data::{PlanetId, SystemId};
use crate::sim::messages::FadedMessage;
use crate::sim::ship::ShipId;
use crate::sim::state::ShipEvent;

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Tick that produced this snapshot
    pub step: u64,
    pub draw: DrawList,
    pub radar: RadarList,
    pub hud: HudInfo,
    /// Messages young enough to show, with their fade
    pub messages: Vec<FadedMessage>,
    /// Ship events raised during the tick
    pub events: Vec<ShipEvent>,
    /// Ships in the player's system at the end of the tick
    pub ships_in_view: Vec<ShipId>,
}

impl SceneSnapshot {
    /// Reset for a new tick, keeping allocations
    pub fn clear(&mut self, step: u64) {
        self.step = step;
        self.messages.clear();
        self.events.clear();
        self.ships_in_view.clear();
    }
}

/// Names the planet whose panel the renderer should open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelHandle {
    pub planet: PlanetId,
    pub name: String,
}

/// Scene-level changes the renderer reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneTransition {
    /// The player arrived in a new system
    EnteredSystem { system: SystemId, name: String },
    /// The flagship finished landing
    Landed(PanelHandle),
    /// The flagship was destroyed
    FlagshipDestroyed,
}
