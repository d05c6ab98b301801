//! Ships: kinematics, regeneration, damage and the landing/hyperspace cycle

use std::collections::BTreeMap;

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::angle::Angle;
use super::command::Command;
use super::data::{
    Attributes, EffectId, GameData, GovernmentId, ModelId, Personality, PlanetId, ShipCategory,
    ShipModel, SpriteId, StarSystem, SystemId, Weapon, WeaponId,
};
use super::effect::Effect;
use crate::scene::draw::{DrawList, DrawSource, Placement};

/// Ticks spent accelerating into hyperspace (and decelerating out)
pub const HYPER_C: u32 = 100;
/// Hyperspace acceleration per tick
pub const HYPER_A: f64 = 2.0;
/// Zoom change per tick while landing or taking off
pub const LANDING_SPEED: f64 = 0.02;
/// Arrival distance short of the destination planet
const ARRIVAL_MARGIN: f64 = 1000.0;

/// Stable, never-reused ship identity
///
/// Holding an id does not keep the ship alive; resolve it through the world
/// each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u32);

/// Landing and hyperspace state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlightState {
    #[default]
    Flying,
    /// Heading for `target_planet`
    ApproachingPlanet,
    /// Shrinking toward the planet surface
    Landing,
    Landed,
    /// Growing back to full size
    TakingOff,
    /// Slowing down and lining up with `target_system`
    ChargingHyperdrive,
    /// In hyperspace; `arriving` flips once the system has changed
    Jumping { count: u32, arriving: bool },
}

/// A weapon mount with its firing counters
#[derive(Debug, Clone, PartialEq)]
pub struct Hardpoint {
    /// Offset from the ship center in the ship's frame
    pub point: DVec2,
    pub turret: bool,
    pub weapon: Option<WeaponId>,
    /// Aim relative to the ship's facing
    pub angle: Angle,
    pub reload: f64,
    pub burst_reload: f64,
    /// Shots left before a full reload
    pub burst_count: u32,
}

impl Hardpoint {
    pub fn new(point: DVec2, turret: bool, weapon: Option<WeaponId>, data: &GameData) -> Self {
        let stats = weapon.and_then(|id| data.weapon(id));
        let angle = match stats {
            Some(_) if turret => Angle::from_vector(point),
            Some(w) => harmonized_angle(point, w),
            None => Angle::default(),
        };
        Self {
            point,
            turret,
            weapon,
            angle,
            reload: 0.0,
            burst_reload: 0.0,
            burst_count: stats.map(Weapon::burst).unwrap_or(0),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.weapon.is_some() && self.burst_reload <= 0.0 && self.burst_count > 0
    }

    /// Count down reload timers by one tick
    pub fn step(&mut self, weapon: &Weapon) {
        if self.reload > 0.0 {
            self.reload -= 1.0;
        }
        if self.reload <= 0.0 {
            self.burst_count = weapon.burst();
        }
        if self.burst_reload > 0.0 {
            self.burst_reload -= 1.0;
        }
    }

    /// Charge the timers for one shot
    pub fn mark_fired(&mut self, weapon: &Weapon) {
        self.reload += weapon.reload;
        self.burst_reload += weapon.burst_reload;
        self.burst_count = self.burst_count.saturating_sub(1);
    }
}

/// Point fixed guns slightly inward so their shots converge at full range
fn harmonized_angle(point: DVec2, weapon: &Weapon) -> Angle {
    let range = weapon.velocity * f64::from(weapon.lifetime.max(0));
    if range <= 0.0 {
        return Angle::default();
    }
    Angle::new(-(point.y / range).clamp(-1.0, 1.0).asin().to_degrees())
}

/// Result of moving one ship for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Hull gone; explosion effects were emitted
    Destroyed,
    /// Finished shrinking onto a planet
    Landed(Option<PlanetId>),
    /// Dropped out of hyperspace into a new system
    Arrived { from: Option<SystemId>, to: SystemId },
}

/// What a single hit did to a ship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageReport {
    pub disabled: bool,
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: ShipId,
    pub name: String,
    pub model: ModelId,
    pub government: GovernmentId,
    pub sprite: Option<SpriteId>,
    pub flare_sprite: Option<SpriteId>,
    pub radius: f64,
    pub attributes: Attributes,
    pub personality: Personality,
    pub engine_points: Vec<DVec2>,
    pub explosion_effects: Vec<(EffectId, u32)>,
    pub explosion_total: u32,

    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: Angle,
    /// 1 in flight, shrinking to 0 while landing
    pub zoom: f64,

    pub shields: f64,
    pub hull: f64,
    pub fuel: f64,
    pub energy: f64,
    pub heat: f64,
    pub crew: u32,

    /// `None` while carried inside another ship
    pub system: Option<SystemId>,
    pub target: Option<ShipId>,
    /// Index into the current system's stellar objects
    pub target_planet: Option<usize>,
    pub target_system: Option<SystemId>,
    /// Escort leader or carrier
    pub parent: Option<ShipId>,

    pub is_disabled: bool,
    pub is_overheated: bool,
    pub is_parked: bool,
    pub is_flagship: bool,
    /// Owned by the player
    pub is_yours: bool,
    /// Never forgotten and never deleted on landing
    pub is_special: bool,

    /// Installed outfits and ammunition
    pub outfits: BTreeMap<String, i32>,
    pub hardpoints: Vec<Hardpoint>,
    pub cargo: BTreeMap<String, u32>,

    pub command: Command,
    pub state: FlightState,
    /// Ticks spent outside the player's system
    pub forget: u32,
}

impl Ship {
    /// Build a fresh ship from a catalog model
    pub fn from_model(
        id: ShipId,
        model_id: ModelId,
        model: &ShipModel,
        data: &GameData,
        name: impl Into<String>,
        government: GovernmentId,
    ) -> Self {
        let attributes = model.attributes.clone();
        let hardpoints = model
            .hardpoints
            .iter()
            .map(|spec| Hardpoint::new(spec.point, spec.turret, spec.weapon, data))
            .collect();
        Self {
            id,
            name: name.into(),
            model: model_id,
            government,
            sprite: model.sprite,
            flare_sprite: model.flare_sprite,
            radius: model.radius,
            personality: model.personality,
            engine_points: model.engine_points.clone(),
            explosion_effects: model.explosion_effects.clone(),
            explosion_total: model.explosion_total,

            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            facing: Angle::default(),
            zoom: 1.0,

            shields: attributes.shields,
            hull: attributes.hull,
            fuel: attributes.fuel_capacity,
            energy: attributes.energy_capacity,
            heat: 0.0,
            crew: attributes.required_crew,

            system: None,
            target: None,
            target_planet: None,
            target_system: None,
            parent: None,

            is_disabled: false,
            is_overheated: false,
            is_parked: false,
            is_flagship: false,
            is_yours: false,
            is_special: false,

            outfits: model.outfits.clone(),
            hardpoints,
            cargo: BTreeMap::new(),

            command: Command::default(),
            state: FlightState::Flying,
            forget: 0,
            attributes,
        }
    }

    /// Put the ship somewhere at rest
    pub fn place(&mut self, system: SystemId, position: DVec2, facing: Angle) {
        self.system = Some(system);
        self.position = position;
        self.velocity = DVec2::ZERO;
        self.facing = facing;
    }

    pub fn is_destroyed(&self) -> bool {
        self.hull <= 0.0
    }

    pub fn is_fighter(&self) -> bool {
        self.attributes.category == ShipCategory::Fighter
    }

    pub fn is_landing(&self) -> bool {
        matches!(
            self.state,
            FlightState::Landing | FlightState::Landed | FlightState::TakingOff
        )
    }

    pub fn is_hyperspacing(&self) -> bool {
        matches!(self.state, FlightState::Jumping { .. })
    }

    /// Whether other ships may pick this one as a target
    pub fn is_targetable(&self) -> bool {
        self.zoom >= 1.0 && !self.is_destroyed() && !self.is_hyperspacing() && self.system.is_some()
    }

    pub fn mass(&self) -> f64 {
        let cargo: u32 = self.cargo.values().sum();
        (self.attributes.mass + f64::from(cargo)).max(1.0)
    }

    /// Degrees per tick at full turn command
    pub fn turn_rate(&self) -> f64 {
        self.attributes.turn / self.mass()
    }

    pub fn acceleration(&self) -> f64 {
        self.attributes.thrust / self.mass()
    }

    pub fn max_velocity(&self) -> f64 {
        if self.attributes.drag > 0.0 {
            self.attributes.thrust / self.attributes.drag
        } else {
            f64::INFINITY
        }
    }

    /// Hull below which the ship is disabled
    pub fn minimum_hull(&self) -> f64 {
        let maximum = self.attributes.hull;
        (0.1 * maximum).max((0.5 * maximum).min(100.0))
    }

    /// Heat at which the ship overheats
    pub fn maximum_heat(&self) -> f64 {
        self.mass() * 100.0
    }

    pub fn free_cargo(&self) -> u32 {
        let used: u32 = self.cargo.values().sum();
        self.attributes.cargo_space.saturating_sub(used)
    }

    /// Add up to `tons` of a commodity; returns how much fit
    pub fn add_cargo(&mut self, commodity: &str, tons: u32) -> u32 {
        let tons = tons.min(self.free_cargo());
        if tons > 0 {
            *self.cargo.entry(commodity.to_string()).or_insert(0) += tons;
        }
        tons
    }

    pub fn outfit_count(&self, name: &str) -> i32 {
        self.outfits.get(name).copied().unwrap_or(0)
    }

    /// Push the ship, never beyond its top speed
    pub fn apply_force(&mut self, force: DVec2) {
        self.velocity += force / self.mass();
        let max = self.max_velocity();
        let speed = self.velocity.length();
        if speed > max && speed > 0.0 {
            self.velocity *= max / speed;
        }
    }

    /// Apply a weapon's damage; `push` is the direction of the hit force
    pub fn take_damage(&mut self, weapon: &Weapon, push: DVec2) -> DamageReport {
        let was_disabled = self.is_disabled || self.hull < self.minimum_hull();
        let was_destroyed = self.is_destroyed();

        let shield_damage = weapon.shield_damage;
        if self.shields > shield_damage {
            self.shields -= shield_damage;
        } else {
            let absorbed = if shield_damage > 0.0 {
                self.shields / shield_damage
            } else {
                0.0
            };
            self.hull -= weapon.hull_damage * (1.0 - absorbed);
            self.shields = 0.0;
        }
        if weapon.hit_force != 0.0 {
            self.apply_force(push.normalize_or_zero() * weapon.hit_force);
        }

        DamageReport {
            disabled: !was_disabled && self.hull < self.minimum_hull(),
            destroyed: !was_destroyed && self.is_destroyed(),
        }
    }

    /// Close enough and slow enough to begin landing on `object`
    pub fn can_land_on(&self, position: DVec2, radius: f64) -> bool {
        self.velocity.length() < 1.0 && self.position.distance(position) < radius
    }

    /// Slow enough and facing within one turn step of the destination
    pub fn can_hyperspace(&self, data: &GameData) -> bool {
        let (Some(here), Some(there)) = (
            self.system.and_then(|id| data.system(id)),
            self.target_system.and_then(|id| data.system(id)),
        ) else {
            return false;
        };
        if self.velocity.length() > self.attributes.jump_speed.max(0.2) {
            return false;
        }
        let direction = there.position - here.position;
        if direction == DVec2::ZERO {
            return true;
        }
        let error = (Angle::from_vector(direction) - self.facing).degrees().abs();
        error <= self.turn_rate().max(1e-6)
    }

    /// Advance the ship by one tick
    ///
    /// `system` is the catalog entry for the ship's current system.
    pub fn move_step(
        &mut self,
        data: &GameData,
        system: Option<&StarSystem>,
        fx_rng: &mut Pcg32,
        effects: &mut Vec<Effect>,
    ) -> MoveOutcome {
        let previous = self.position;
        let outcome = self.advance(data, system, fx_rng, effects);
        if !self.position.is_finite() {
            self.position = previous;
            self.velocity = DVec2::ZERO;
        }
        outcome
    }

    fn advance(
        &mut self,
        data: &GameData,
        system: Option<&StarSystem>,
        fx_rng: &mut Pcg32,
        effects: &mut Vec<Effect>,
    ) -> MoveOutcome {
        self.regenerate();

        if self.is_destroyed() {
            self.create_explosions(data, fx_rng, effects);
            self.energy = 0.0;
            self.heat = 0.0;
            self.fuel = 0.0;
            return MoveOutcome::Destroyed;
        }

        match self.state {
            FlightState::Jumping { count, arriving } => return self.hyperspace(data, count, arriving),
            FlightState::Landing => {
                self.zoom -= LANDING_SPEED;
                self.position += self.velocity * self.zoom.max(0.0);
                if self.zoom <= 0.0 {
                    self.zoom = 0.0;
                    self.velocity = DVec2::ZERO;
                    self.state = FlightState::Landed;
                    let planet = system
                        .zip(self.target_planet)
                        .and_then(|(s, index)| s.objects.get(index))
                        .and_then(|o| o.planet);
                    return MoveOutcome::Landed(planet);
                }
                return MoveOutcome::Moved;
            }
            FlightState::Landed => return MoveOutcome::Moved,
            FlightState::TakingOff => {
                self.zoom = (self.zoom + LANDING_SPEED).min(1.0);
                self.position += self.velocity * self.zoom;
                if self.zoom >= 1.0 {
                    self.state = FlightState::Flying;
                    self.target_planet = None;
                }
                return MoveOutcome::Moved;
            }
            FlightState::Flying | FlightState::ApproachingPlanet | FlightState::ChargingHyperdrive => {}
        }

        self.update_state(data, system);
        if let FlightState::Landing | FlightState::Jumping { .. } = self.state {
            // Begin next tick from the new state
            self.position += self.velocity;
            return MoveOutcome::Moved;
        }

        self.steer();
        self.position += self.velocity;
        MoveOutcome::Moved
    }

    /// Clamp stores, dissipate heat, regenerate
    fn regenerate(&mut self) {
        let attributes = &self.attributes;
        self.fuel = self.fuel.min(attributes.fuel_capacity);
        self.energy = self.energy.min(attributes.energy_capacity);

        self.heat *= 0.999;
        let mass = self.mass();
        if self.heat > mass * 100.0 {
            self.is_overheated = true;
        } else if self.heat < mass * 90.0 {
            self.is_overheated = false;
        }

        self.shields = self.shields.min(self.attributes.shields);
        self.hull = self.hull.min(self.attributes.hull);
        self.is_disabled = self.is_overheated || self.hull < self.minimum_hull();

        if !self.is_overheated && !self.is_destroyed() {
            self.hull += self.attributes.hull_repair_rate;
        }
        if !self.is_disabled {
            self.fuel += 0.03 * self.attributes.ramscoop.max(0.0).sqrt();
            self.energy += self.attributes.energy_generation;
            self.heat += self.attributes.heat_generation;
            self.shields += self.attributes.shield_generation;
        }
    }

    /// Flight-state transitions driven by the command register
    fn update_state(&mut self, data: &GameData, system: Option<&StarSystem>) {
        if self.is_disabled {
            if self.state != FlightState::Flying {
                self.state = FlightState::Flying;
            }
            return;
        }
        let planet = system
            .zip(self.target_planet)
            .and_then(|(s, index)| s.objects.get(index));

        match self.state {
            FlightState::Flying => {
                if self.command.land && planet.is_some() {
                    self.state = FlightState::ApproachingPlanet;
                } else if self.command.jump && self.target_system.is_some() {
                    self.state = FlightState::ChargingHyperdrive;
                }
            }
            FlightState::ApproachingPlanet => {
                if !self.command.land || planet.is_none() {
                    self.state = FlightState::Flying;
                }
            }
            FlightState::ChargingHyperdrive => {
                if !self.command.jump || self.target_system.is_none() {
                    self.state = FlightState::Flying;
                }
            }
            _ => {}
        }

        match self.state {
            FlightState::ApproachingPlanet => {
                if let Some(object) = planet
                    && self.can_land_on(object.position, object.radius)
                {
                    self.state = FlightState::Landing;
                }
            }
            FlightState::ChargingHyperdrive => {
                if self.can_hyperspace(data) {
                    if self.fuel >= self.attributes.jump_fuel {
                        self.fuel -= self.attributes.jump_fuel;
                        self.state = FlightState::Jumping {
                            count: 0,
                            arriving: false,
                        };
                    } else {
                        self.state = FlightState::Flying;
                    }
                }
            }
            _ => {}
        }
    }

    /// Apply thrust and turn commands
    fn steer(&mut self) {
        let mass = self.mass();
        let drag = self.attributes.drag / mass;
        if self.is_disabled {
            self.velocity *= 1.0 - drag;
            return;
        }

        let thrust_command = self.command.thrust;
        if thrust_command != 0.0 {
            let forward = thrust_command > 0.0;
            let (cost, heat, thrust) = if forward {
                (
                    self.attributes.thrusting_energy,
                    self.attributes.thrusting_heat,
                    self.attributes.thrust,
                )
            } else {
                (
                    self.attributes.reverse_thrusting_energy,
                    self.attributes.reverse_thrusting_heat,
                    self.attributes.reverse_thrust,
                )
            };
            if self.energy < cost || thrust <= 0.0 {
                self.command.thrust = 0.0;
            } else {
                self.energy -= cost;
                self.heat += heat;
                self.velocity += self.facing.unit() * (thrust_command * thrust / mass);
                self.velocity *= 1.0 - drag;
            }
        }

        let turn_command = self.command.turn;
        if turn_command != 0.0 {
            let cost = self.attributes.turning_energy;
            if self.energy < cost {
                self.command.turn = 0.0;
            } else {
                self.energy -= cost;
                self.heat += self.attributes.turning_heat;
                self.facing += Angle::new(turn_command * self.turn_rate());
            }
        }
    }

    fn hyperspace(&mut self, data: &GameData, mut count: u32, mut arriving: bool) -> MoveOutcome {
        let mut outcome = MoveOutcome::Moved;
        if arriving {
            count = count.saturating_sub(1);
            self.velocity -= self.facing.unit() * HYPER_A;
        } else {
            count += 1;
            self.velocity += self.facing.unit() * HYPER_A;
            if count >= HYPER_C {
                let from = self.system;
                match self.target_system {
                    Some(to) if data.system(to).is_some() => {
                        self.system = Some(to);
                        self.target_system = None;
                        self.target_planet = None;
                        let target = data
                            .system(to)
                            .and_then(|s| s.objects.iter().find(|o| o.planet.is_some()))
                            .map(|o| o.position)
                            .unwrap_or(DVec2::ZERO);
                        let c = f64::from(HYPER_C);
                        let distance = c * c * 0.5 * HYPER_A + ARRIVAL_MARGIN;
                        self.position = target - self.facing.unit() * distance;
                        outcome = MoveOutcome::Arrived { from, to };
                    }
                    _ => log::debug!("Ship {} lost its hyperspace destination", self.id.0),
                }
                arriving = true;
            }
        }
        self.position += self.velocity;

        let slow = self.velocity.dot(self.facing.unit()) <= self.max_velocity().min(1e9);
        if arriving && (slow || count == 0) {
            self.state = FlightState::Flying;
            let max = self.max_velocity();
            if self.velocity.length() > max {
                self.velocity = self.velocity.normalize_or_zero() * max;
            }
        } else {
            self.state = FlightState::Jumping { count, arriving };
        }
        outcome
    }

    /// Scatter the model's explosion effects over the hull
    pub fn create_explosions(&self, data: &GameData, rng: &mut Pcg32, effects: &mut Vec<Effect>) {
        let total_weight: u32 = self.explosion_effects.iter().map(|(_, w)| *w).sum();
        if total_weight == 0 {
            return;
        }
        for _ in 0..self.explosion_total {
            let mut roll = rng.random_range(0..total_weight);
            let Some(&(template, _)) = self.explosion_effects.iter().find(|(_, weight)| {
                if roll < *weight {
                    true
                } else {
                    roll -= weight;
                    false
                }
            }) else {
                continue;
            };
            let offset = Angle::random(rng).unit() * rng.random::<f64>() * self.radius * 0.5;
            if let Some(effect) = Effect::spawn(
                data,
                template,
                self.position + offset,
                self.velocity,
                self.facing,
                rng,
            ) {
                effects.push(effect);
            }
        }
    }

    /// Engine flares (when thrusting) then the hull
    pub fn draw(&self, data: &GameData, list: &mut DrawList, step: u64) {
        if self.zoom <= 0.0 {
            return;
        }
        let swizzle = data
            .government(self.government)
            .map(|g| g.swizzle)
            .unwrap_or(0);

        if self.command.thrust > 0.0
            && !self.is_disabled
            && let Some(flare) = self.flare_sprite
        {
            let frame_rate = data.sprite(flare).map(|s| s.frame_rate).unwrap_or(0.0);
            for point in &self.engine_points {
                let mut placement = Placement::new(
                    flare,
                    self.position + self.facing.rotate(*point * self.zoom),
                    self.facing,
                    DrawSource::Flare(self.id),
                );
                placement.velocity = self.velocity;
                placement.zoom = self.zoom;
                placement.frame = step as f64 * frame_rate;
                list.push(data, placement);
            }
        }

        let Some(sprite) = self.sprite else {
            log::trace!("Ship {} has no sprite", self.id.0);
            return;
        };
        let frame_rate = data.sprite(sprite).map(|s| s.frame_rate).unwrap_or(0.0);
        let mut placement =
            Placement::new(sprite, self.position, self.facing, DrawSource::Ship(self.id));
        placement.velocity = self.velocity;
        placement.zoom = self.zoom;
        placement.swizzle = swizzle;
        placement.frame = step as f64 * frame_rate;
        list.push(data, placement);
    }

    /// Radar blip radius scaled from the sprite size
    pub fn radar_size(&self, data: &GameData) -> f64 {
        let (width, height) = self
            .sprite
            .and_then(|id| data.sprite(id))
            .map(|s| (s.width, s.height))
            .unwrap_or((self.radius * 2.0, self.radius * 2.0));
        (width + height).max(0.0).sqrt() * 0.1 + 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::data::{EffectTemplate, StellarObject};
    use rand::SeedableRng;

    fn model() -> ShipModel {
        ShipModel {
            name: "Shuttle".into(),
            radius: 10.0,
            attributes: Attributes {
                mass: 100.0,
                drag: 1.0,
                thrust: 20.0,
                turn: 500.0,
                shields: 50.0,
                hull: 200.0,
                energy_capacity: 100.0,
                fuel_capacity: 300.0,
                jump_fuel: 100.0,
                ..Default::default()
            },
            explosion_effects: vec![(EffectId(0), 1)],
            explosion_total: 4,
            ..Default::default()
        }
    }

    fn data() -> GameData {
        GameData {
            effects: vec![EffectTemplate {
                name: "boom".into(),
                lifetime: 10,
                ..Default::default()
            }],
            models: vec![model()],
            ..Default::default()
        }
    }

    fn ship(data: &GameData) -> Ship {
        let mut ship = Ship::from_model(ShipId(1), ModelId(0), &data.models[0], data, "Test", GovernmentId(0));
        ship.place(SystemId(0), DVec2::ZERO, Angle::default());
        ship
    }

    #[test]
    fn test_thrust_and_drag() {
        let data = data();
        let mut ship = ship(&data);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effects = Vec::new();
        ship.command.thrust = 1.0;
        ship.move_step(&data, None, &mut rng, &mut effects);
        // (0 + 20/100) * (1 - 1/100)
        assert!((ship.velocity.x - 0.198).abs() < 1e-12);
        assert!((ship.position.x - 0.198).abs() < 1e-12);
    }

    #[test]
    fn test_apply_force_clamps_to_max_velocity() {
        let data = data();
        let mut ship = ship(&data);
        ship.apply_force(DVec2::new(1.0e6, 0.0));
        assert!((ship.velocity.length() - ship.max_velocity()).abs() < 1e-9);
    }

    #[test]
    fn test_shields_absorb_damage() {
        let data = data();
        let mut ship = ship(&data);
        let weapon = Weapon {
            shield_damage: 20.0,
            hull_damage: 40.0,
            ..Default::default()
        };
        ship.take_damage(&weapon, DVec2::X);
        assert_eq!(ship.shields, 30.0);
        assert_eq!(ship.hull, 200.0);

        ship.shields = 10.0;
        ship.take_damage(&weapon, DVec2::X);
        // Half the shot got through
        assert_eq!(ship.shields, 0.0);
        assert_eq!(ship.hull, 180.0);
    }

    #[test]
    fn test_ships_compare_by_value() {
        let data = data();
        let ship = ship(&data);
        let mut copy = ship.clone();
        assert_eq!(copy, ship);
        copy.attributes.thrust += 1.0;
        assert_ne!(copy, ship);
    }

    #[test]
    fn test_damage_report() {
        let data = data();
        let mut ship = ship(&data);
        ship.shields = 0.0;
        let weapon = Weapon {
            hull_damage: 150.0,
            ..Default::default()
        };
        let report = ship.take_damage(&weapon, DVec2::X);
        assert!(report.disabled);
        assert!(!report.destroyed);
        let report = ship.take_damage(&weapon, DVec2::X);
        assert!(!report.disabled);
        assert!(report.destroyed);
    }

    #[test]
    fn test_destroyed_ship_explodes() {
        let data = data();
        let mut ship = ship(&data);
        ship.hull = -1.0;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effects = Vec::new();
        let outcome = ship.move_step(&data, None, &mut rng, &mut effects);
        assert_eq!(outcome, MoveOutcome::Destroyed);
        assert_eq!(effects.len(), 4);
    }

    #[test]
    fn test_overheat_disables() {
        let data = data();
        let mut ship = ship(&data);
        ship.heat = ship.maximum_heat() * 2.0;
        let mut rng = Pcg32::seed_from_u64(1);
        ship.move_step(&data, None, &mut rng, &mut Vec::new());
        assert!(ship.is_overheated);
        assert!(ship.is_disabled);
    }

    #[test]
    fn test_minimum_hull() {
        let data = data();
        let ship = ship(&data);
        // max(20, min(100, 100))
        assert_eq!(ship.minimum_hull(), 100.0);
    }

    #[test]
    fn test_landing_sequence() {
        let data = data();
        let system = StarSystem {
            name: "Sol".into(),
            objects: vec![StellarObject {
                position: DVec2::new(5.0, 0.0),
                radius: 50.0,
                planet: Some(PlanetId(0)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut ship = ship(&data);
        ship.target_planet = Some(0);
        ship.command.land = true;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effects = Vec::new();

        ship.move_step(&data, Some(&system), &mut rng, &mut effects);
        assert_eq!(ship.state, FlightState::Landing);

        let mut landed = None;
        for _ in 0..60 {
            if let MoveOutcome::Landed(planet) =
                ship.move_step(&data, Some(&system), &mut rng, &mut effects)
            {
                landed = Some(planet);
                break;
            }
        }
        assert_eq!(landed, Some(Some(PlanetId(0))));
        assert_eq!(ship.state, FlightState::Landed);
        assert_eq!(ship.zoom, 0.0);
    }

    #[test]
    fn test_hyperspace_jump_changes_system() {
        let mut data = data();
        data.systems = vec![
            StarSystem {
                name: "A".into(),
                position: DVec2::ZERO,
                links: vec![SystemId(1)],
                ..Default::default()
            },
            StarSystem {
                name: "B".into(),
                position: DVec2::new(100.0, 0.0),
                links: vec![SystemId(0)],
                ..Default::default()
            },
        ];
        let mut ship = ship(&data);
        ship.target_system = Some(SystemId(1));
        ship.command.jump = true;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effects = Vec::new();

        let mut arrived = None;
        for _ in 0..(HYPER_C + 5) {
            let system = data.system(ship.system.unwrap_or(SystemId(0))).cloned();
            if let MoveOutcome::Arrived { from, to } =
                ship.move_step(&data, system.as_ref(), &mut rng, &mut effects)
            {
                arrived = Some((from, to));
                break;
            }
        }
        assert_eq!(arrived, Some((Some(SystemId(0)), SystemId(1))));
        assert_eq!(ship.system, Some(SystemId(1)));
        assert_eq!(ship.fuel, 200.0);

        // Decelerates back to normal flight
        for _ in 0..(HYPER_C + 5) {
            ship.move_step(&data, None, &mut rng, &mut effects);
        }
        assert_eq!(ship.state, FlightState::Flying);
        assert!(ship.velocity.length() <= ship.max_velocity() + 1e-9);
    }

    #[test]
    fn test_nan_position_restored() {
        let data = data();
        let mut ship = ship(&data);
        ship.position = DVec2::new(3.0, 4.0);
        ship.velocity = DVec2::new(f64::NAN, 0.0);
        let mut rng = Pcg32::seed_from_u64(1);
        ship.move_step(&data, None, &mut rng, &mut Vec::new());
        assert_eq!(ship.position, DVec2::new(3.0, 4.0));
        assert_eq!(ship.velocity, DVec2::ZERO);
    }
}
