//! Simulation core
//!
//! Everything that advances the world lives here. The core is pure data in,
//! pure data out: it reads a [`Command`] each tick and writes a
//! [`SceneSnapshot`](crate::scene::SceneSnapshot), with no rendering or
//! platform dependencies.
//! - Fixed timestep; speeds are per tick, angles in degrees
//! - Seeded RNG owned by the world, with a separate stream for effects
//! - Stable iteration order (insertion order of ships and projectiles)

pub mod ai;
pub mod angle;
pub mod armament;
pub mod asteroids;
pub mod collision;
pub mod command;
pub mod data;
pub mod date;
pub mod effect;
pub mod messages;
pub mod politics;
pub mod projectile;
pub mod ship;
pub mod spawn;
pub mod state;
pub mod tick;

#[cfg(test)]
pub(crate) mod fixtures;

pub use angle::Angle;
pub use command::Command;
pub use data::GameData;
pub use ship::{FlightState, Ship, ShipId};
pub use state::{Autopilot, ShipEvent, ShipEventKind, World};
