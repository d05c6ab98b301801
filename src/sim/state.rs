//! Authoritative world state
//!
//! Owned by the simulation worker. The renderer never sees a `World`, only
//! the snapshots the tick writes out of it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::angle::Angle;
use super::asteroids::AsteroidField;
use super::data::{GameData, GovernmentId, ModelId, SystemId};
use super::date::Date;
use super::effect::Effect;
use super::messages::Messages;
use super::politics::Politics;
use super::projectile::{Projectile, TargetView};
use super::ship::{FlightState, Ship, ShipId};
use super::spawn::Spawner;
use crate::error::EngineError;
use crate::scene::{PanelHandle, SceneTransition};
use crate::settings::Settings;

/// Something that happened to a ship this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipEventKind {
    /// Hit directly by a hostile government
    Provoked,
    Disabled,
    Destroyed,
    Boarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipEvent {
    pub kind: ShipEventKind,
    /// Government responsible
    pub actor: GovernmentId,
    pub target: ShipId,
}

/// A ship in `system` that can be aimed at, resolved by id
pub(crate) fn target_view(ships: &[Ship], system: Option<SystemId>, id: ShipId) -> Option<TargetView> {
    ships
        .iter()
        .find(|s| s.id == id)
        .filter(|s| s.system.is_some() && s.system == system && s.is_targetable())
        .map(|s| TargetView {
            position: s.position,
            velocity: s.velocity,
        })
}

/// What the player's autopilot is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Autopilot {
    #[default]
    Off,
    Land,
    Jump,
    Board,
}

/// Moving average of the time spent per tick
#[derive(Debug, Clone)]
pub struct LoadMeter {
    window: u32,
    count: u32,
    sum: Duration,
    load: f64,
}

impl LoadMeter {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            count: 0,
            sum: Duration::ZERO,
            load: 0.0,
        }
    }

    /// Record one tick; publishes a new figure once per window
    pub fn record(&mut self, elapsed: Duration, period: Duration) {
        self.sum += elapsed;
        self.count += 1;
        if self.count >= self.window {
            let budget = period.as_secs_f64() * f64::from(self.window);
            self.load = if budget > 0.0 { self.sum.as_secs_f64() / budget } else { 0.0 };
            self.sum = Duration::ZERO;
            self.count = 0;
        }
    }

    /// Fraction of the frame budget used, averaged over the last window
    pub fn load(&self) -> f64 {
        self.load
    }
}

pub struct World {
    pub data: Arc<GameData>,
    pub politics: Politics,
    /// Active ships in insertion order
    pub ships: Vec<Ship>,
    pub projectiles: Vec<Projectile>,
    pub effects: Vec<Effect>,
    pub asteroids: AsteroidField,
    /// Player ships parked on the planet the flagship landed on
    pub roster: Vec<Ship>,
    pub flagship: Option<ShipId>,
    pub current_system: Option<SystemId>,
    pub visited: BTreeSet<SystemId>,
    pub date: Date,
    pub messages: Messages,
    pub credits: i64,
    pub step: u64,
    pub autopilot: Autopilot,
    /// Gameplay randomness
    pub rng: Pcg32,
    /// Decorative randomness; never read by gameplay code
    pub fx_rng: Pcg32,
    pub spawner: Spawner,
    pub events: Vec<ShipEvent>,
    pub load: LoadMeter,
    /// Arrival flash, decays to zero
    pub flash: f64,

    pub(crate) transition: Option<SceneTransition>,
    /// Set while the flagship sits on a planet; the world is frozen
    landed_on: Option<PanelHandle>,
    pub(crate) was_overheated: bool,
    pub(crate) last_center: DVec2,
    pub(crate) last_center_velocity: DVec2,

    pub(crate) forget_after: u32,
    pub(crate) message_lifetime: u64,
    pub(crate) viewport: DVec2,
    pub(crate) show_load: bool,
    pub(crate) frame_period: Duration,

    next_ship: u32,
    pub(crate) next_projectile: u32,
}

impl World {
    pub fn new(data: Arc<GameData>, settings: &Settings) -> Self {
        Self {
            politics: Politics::new(&data),
            data,
            ships: Vec::new(),
            projectiles: Vec::new(),
            effects: Vec::new(),
            asteroids: AsteroidField::default(),
            roster: Vec::new(),
            flagship: None,
            current_system: None,
            visited: BTreeSet::new(),
            date: Date::default(),
            messages: Messages::new(),
            credits: 0,
            step: 0,
            autopilot: Autopilot::Off,
            rng: Pcg32::seed_from_u64(settings.seed),
            fx_rng: Pcg32::seed_from_u64(settings.seed.wrapping_add(1)),
            spawner: Spawner::new(settings.spawn_period),
            events: Vec::new(),
            load: LoadMeter::new(settings.load_window),
            flash: 0.0,
            transition: None,
            landed_on: None,
            was_overheated: false,
            last_center: DVec2::ZERO,
            last_center_velocity: DVec2::ZERO,
            forget_after: settings.forget_after,
            message_lifetime: settings.message_lifetime,
            viewport: DVec2::new(settings.viewport.0, settings.viewport.1),
            show_load: settings.show_load,
            frame_period: settings.frame_period(),
            next_ship: 0,
            next_projectile: 0,
        }
    }

    pub(crate) fn next_ship_id(&mut self) -> ShipId {
        self.next_ship += 1;
        ShipId(self.next_ship)
    }

    #[cfg(test)]
    pub(crate) fn next_projectile_id(&mut self) -> u32 {
        self.next_projectile += 1;
        self.next_projectile
    }

    /// Create a ship (plus the fighters it carries) and add it to the world
    ///
    /// Returns `None` if the model is not in the catalog.
    pub fn add_ship(
        &mut self,
        model_id: ModelId,
        government: GovernmentId,
        name: impl Into<String>,
        system: SystemId,
        position: DVec2,
        facing: Angle,
    ) -> Option<ShipId> {
        let data = Arc::clone(&self.data);
        let Some(model) = data.model(model_id) else {
            log::trace!("Skipping ship with missing model {}", model_id.0);
            return None;
        };
        let id = self.next_ship_id();
        let mut ship = Ship::from_model(id, model_id, model, &data, name, government);
        ship.place(system, position, facing);
        ship.is_yours = government == self.politics.player();
        self.ships.push(ship);

        let bays = model.attributes.fighter_bays as usize;
        for &fighter_model in model.fighters.iter().take(bays) {
            let Some(spec) = data.model(fighter_model) else {
                continue;
            };
            let fighter_id = self.next_ship_id();
            let mut fighter = Ship::from_model(
                fighter_id,
                fighter_model,
                spec,
                &data,
                spec.name.clone(),
                government,
            );
            fighter.position = position;
            fighter.facing = facing;
            fighter.parent = Some(id);
            fighter.is_yours = government == self.politics.player();
            self.ships.push(fighter);
        }
        Some(id)
    }

    /// Put the player's flagship into a system and enter it
    pub fn place_player(
        &mut self,
        model: ModelId,
        name: &str,
        system: SystemId,
        position: DVec2,
    ) -> Result<ShipId, EngineError> {
        if self.data.system(system).is_none() {
            return Err(EngineError::NoFlagship(format!("unknown system {}", system.0)));
        }
        let player = self.politics.player();
        let id = self
            .add_ship(model, player, name, system, position, Angle::default())
            .ok_or_else(|| EngineError::NoFlagship(format!("unknown ship model {}", model.0)))?;
        if let Some(ship) = self.ship_mut(id) {
            ship.is_flagship = true;
            ship.is_special = true;
        }
        self.flagship = Some(id);
        self.last_center = position;
        self.enter_system(system);
        log::info!("Placed flagship {name} in {}", self.data.system_name(system));
        Ok(id)
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id == id)
    }

    pub fn flagship(&self) -> Option<&Ship> {
        self.flagship.and_then(|id| self.ship(id))
    }

    /// Position and velocity of a ship that can currently be aimed at
    pub fn target_view(&self, id: ShipId) -> Option<TargetView> {
        target_view(&self.ships, self.current_system, id)
    }

    pub fn is_in_view(&self, ship: &Ship) -> bool {
        ship.system.is_some() && ship.system == self.current_system
    }

    /// Post a HUD message stamped with the current tick
    pub fn post(&mut self, text: impl Into<String>) {
        self.messages.add(text, self.step);
    }

    /// The world stops advancing while the flagship is on a planet
    pub fn is_frozen(&self) -> bool {
        self.landed_on.is_some()
    }

    pub fn landed_on(&self) -> Option<&PanelHandle> {
        self.landed_on.as_ref()
    }

    /// Flagship has finished landing
    pub(crate) fn set_landed(&mut self, handle: PanelHandle) {
        log::info!("Landed on {}", handle.name);
        self.transition = Some(SceneTransition::Landed(handle.clone()));
        self.landed_on = Some(handle);
    }

    /// Leave the planet with every parked player ship
    ///
    /// The rest of the system starts over: other ships are dropped and the
    /// system is entered again.
    pub fn take_off(&mut self) {
        let Some(handle) = self.landed_on.take() else {
            return;
        };
        let Some(system) = self.current_system else {
            return;
        };
        let planet = self
            .data
            .system(system)
            .and_then(|s| s.objects.iter().find(|o| o.planet == Some(handle.planet)))
            .map(|o| (o.position, o.radius))
            .unwrap_or((DVec2::ZERO, 0.0));

        self.ships.retain(|s| s.is_yours);
        let parked = std::mem::take(&mut self.roster);
        self.ships.extend(parked);

        for ship in &mut self.ships {
            if ship.system != Some(system) && !ship.is_flagship {
                continue;
            }
            let angle = Angle::random(&mut self.rng);
            let offset = angle.unit() * self.rng.random::<f64>() * planet.1;
            ship.place(system, planet.0 + offset, angle);
            ship.zoom = 0.0;
            ship.state = FlightState::TakingOff;
            ship.is_parked = false;
            ship.command = Default::default();
        }
        self.autopilot = Autopilot::Off;
        self.politics.reset_daily();
        log::info!("Taking off from {}", handle.name);
        self.enter_system(system);
    }

    /// Arrive in a system: reseed asteroids, drop in-flight objects, advance
    /// the date and announce it
    pub fn enter_system(&mut self, system: SystemId) {
        self.current_system = Some(system);
        self.visited.insert(system);
        self.projectiles.clear();
        self.effects.clear();
        self.asteroids.clear();

        let data = Arc::clone(&self.data);
        if let Some(descriptor) = data.system(system) {
            for belt in &descriptor.asteroids {
                self.asteroids.add(&data, belt, &mut self.rng);
            }
        } else {
            log::debug!("Entered unknown system {}", system.0);
        }

        self.date.increment();
        let name = data.system_name(system).to_string();
        let suffix = if data.is_inhabited(system) {
            "."
        } else {
            ". No inhabited planets detected."
        };
        self.post(format!("Entering the {name} system on {}{suffix}", self.date));
        self.flash = 1.0;
        log::info!("Entering {name} on {}", self.date);
        self.transition = Some(SceneTransition::EnteredSystem { system, name });
    }

    /// Ships that may be hit or targeted in the player's system
    pub fn ships_in_view(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter().filter(|s| self.is_in_view(s))
    }
}
