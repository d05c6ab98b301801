//! Ship control
//!
//! Fills every ship's command register once per tick. The flagship's
//! register is built from the renderer's input plus the autopilot; every
//! other ship decides for itself from a read-only view of the world.

use std::f64::consts::PI;

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{rendezvous_time, segment_circle_entry};
use super::command::Command;
use super::data::{GameData, SystemId, Weapon};
use super::politics::Politics;
use super::ship::{FlightState, Ship, ShipId};
use super::state::{Autopilot, World};

/// Ships farther than this from the system center head back in
const WANDER_LIMIT: f64 = 10_000.0;
/// Boarding and docking distance
const BOARD_RANGE: f64 = 40.0;
/// Targets are re-evaluated once every this many ticks
const TARGET_PERIOD: u64 = 32;

/// Read-only view shared by every decision in one AI pass
struct Context<'a> {
    data: &'a GameData,
    politics: &'a Politics,
    ships: &'a [Ship],
    step: u64,
    current_system: Option<SystemId>,
    flagship: Option<ShipId>,
}

impl Context<'_> {
    fn find(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    fn is_enemy(&self, a: &Ship, b: &Ship) -> bool {
        self.politics.is_enemy(a.government, b.government)
    }
}

/// The part of a ship the AI may change
#[derive(Debug, Clone)]
struct Decision {
    command: Command,
    target: Option<ShipId>,
    target_planet: Option<usize>,
    target_system: Option<SystemId>,
    parent: Option<ShipId>,
}

impl Decision {
    fn from_ship(ship: &Ship) -> Self {
        Self {
            command: Command::default(),
            target: ship.target,
            target_planet: ship.target_planet,
            target_system: ship.target_system,
            parent: ship.parent,
        }
    }

    fn apply(self, ship: &mut Ship) {
        ship.command = self.command;
        ship.target = self.target;
        ship.target_planet = self.target_planet;
        ship.target_system = self.target_system;
        ship.parent = self.parent;
    }
}

/// Run the AI for every ship
pub fn step(world: &mut World, input: &Command) {
    let mut input = input.clone();
    input.clamp();
    if let Some(text) = input.message.take() {
        world.post(text);
    }

    let mut messages = Vec::new();
    for index in 0..world.ships.len() {
        let decision = {
            let ctx = Context {
                data: &world.data,
                politics: &world.politics,
                ships: &world.ships,
                step: world.step,
                current_system: world.current_system,
                flagship: world.flagship,
            };
            let ship = &world.ships[index];
            if Some(ship.id) == ctx.flagship {
                move_player(&ctx, ship, &input, &mut world.autopilot, &mut messages)
            } else {
                decide(&ctx, index, &mut world.rng)
            }
        };
        decision.apply(&mut world.ships[index]);
    }
    for text in messages {
        world.post(text);
    }
}

fn decide(ctx: &Context, index: usize, rng: &mut Pcg32) -> Decision {
    let ship = &ctx.ships[index];
    let mut decision = Decision::from_ship(ship);
    // Carried fighters and ships mid-manoeuvre take no orders
    if ship.system.is_none() || ship.is_disabled || ship.is_landing() || ship.is_hyperspacing() {
        decision.command = ship.command.clone();
        if ship.is_disabled || ship.system.is_none() {
            decision.command = Command::default();
        }
        return decision;
    }

    // Dead or departed targets resolve to nothing
    decision.target = decision
        .target
        .and_then(|id| ctx.find(id))
        .filter(|t| t.system == ship.system && t.is_targetable())
        .map(|t| t.id);
    if ship.is_yours && !ship.is_fighter() && decision.parent.is_none() {
        decision.parent = ctx.flagship;
    }

    let is_present = ship.system == ctx.current_system;
    if is_present {
        let current = decision.target.and_then(|id| ctx.find(id));
        let turn = (ctx.step + index as u64) % TARGET_PERIOD == 0;
        if turn
            || current.is_none()
            || current.is_some_and(|t| t.is_disabled && ship.personality.disables)
        {
            decision.target = find_target(ctx, ship);
        }
    }

    let parent = decision.parent.and_then(|id| ctx.find(id));
    if decision.parent.is_some() && parent.is_none() {
        decision.parent = None;
    }

    // Fighters go home unless the carrier has them deployed
    if ship.is_fighter()
        && let Some(carrier) = parent
        && !carrier.command.launch
    {
        decision.target = Some(carrier.id);
        move_to(ship, &mut decision.command, carrier.position, BOARD_RANGE, 0.8);
        decision.command.board = true;
        return decision;
    }

    let target = decision.target.and_then(|id| ctx.find(id));
    let target_distance = target
        .map(|t| t.position.distance(ship.position))
        .unwrap_or(f64::INFINITY);
    let escorting = parent.is_some_and(|parent| {
        !parent.is_disabled
            && (parent.command.land
                || parent.command.jump
                || parent.system != ship.system
                || target_distance > 2000.0
                || ship.personality.timid
                || target.is_none())
            && (parent.system != ship.system || !ctx.is_enemy(parent, ship))
            && !(ship.personality.staying && parent.system != ship.system)
    });
    match parent {
        Some(parent) if escorting => move_escort(ctx, ship, parent, &mut decision),
        _ => move_independent(ctx, ship, &mut decision, rng),
    }

    if is_present {
        decision.command.fire |= auto_fire(ctx, ship, decision.target, true);
    }
    decision
}

/// Sum of shield and hull fractions; 2 is pristine
fn health(ship: &Ship) -> f64 {
    let fraction = |value: f64, max: f64| if max > 0.0 { value / max } else { 0.0 };
    fraction(ship.shields, ship.attributes.shields) + fraction(ship.hull, ship.attributes.hull)
}

fn weapon_range(weapon: &Weapon) -> f64 {
    weapon.velocity * f64::from(weapon.lifetime.max(0))
}

fn weapons<'a>(ship: &'a Ship, data: &'a GameData) -> impl Iterator<Item = (usize, &'a Weapon)> + 'a {
    ship.hardpoints
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.weapon.and_then(|id| data.weapon(id)).map(|w| (i, w)))
}

fn has_cargo(ship: &Ship) -> bool {
    ship.cargo.values().any(|&tons| tons > 0)
}

/// Closest enemy worth fighting, or `None` to stand down
fn find_target(ctx: &Context, ship: &Ship) -> Option<ShipId> {
    if ship.is_yours
        && let Some(shared) = ctx.flagship.and_then(|id| ctx.find(id)).and_then(|f| f.target)
        && let Some(locked) = ctx.find(shared)
        && locked.system == ship.system
        && !locked.is_disabled
    {
        return Some(shared);
    }
    if weapons(ship, ctx.data).next().is_none() {
        return None;
    }

    let old_target = ship.target;
    let parent_target = ship.parent.and_then(|id| ctx.find(id)).and_then(|p| p.target);
    let personality = ship.personality;

    let mut closest = f64::INFINITY;
    let mut best: Option<&Ship> = None;
    for other in ctx.ships {
        if other.id == ship.id
            || other.system != ship.system
            || !other.is_targetable()
            || !ctx.is_enemy(ship, other)
        {
            continue;
        }
        // Timid ships only fight back
        if personality.timid && other.target != Some(ship.id) {
            continue;
        }
        if other.is_disabled && personality.disables && !personality.plunders {
            continue;
        }
        let mut range = other.position.distance(ship.position);
        if Some(other.id) == old_target || Some(other.id) == parent_target {
            range -= 500.0;
        }
        if !personality.plunders {
            range += if other.is_disabled { 5000.0 } else { 0.0 };
        } else if !has_cargo(other) {
            range += 2000.0;
        }
        range += 500.0 * health(other);
        if range < closest {
            closest = range;
            best = Some(other);
        }
    }

    // Run away when badly damaged, unless the target is helpless
    let target_disabled = best.is_some_and(|t| t.is_disabled);
    if !target_disabled && health(ship) < 1.0 {
        return None;
    }
    best.map(|t| t.id)
}

/// Where the ship would come to rest if it turned around and braked now
fn stopping_point(ship: &Ship) -> DVec2 {
    let speed = ship.velocity.length();
    let acceleration = ship.acceleration();
    let turn_rate = ship.turn_rate();
    if speed == 0.0 || acceleration <= 0.0 || turn_rate <= 0.0 {
        return ship.position;
    }
    let heading = ship.velocity / speed;
    let degrees_to_turn = (-heading.dot(ship.facing.unit())).clamp(-1.0, 1.0).acos().to_degrees();
    let distance = speed * (degrees_to_turn / turn_rate) + 0.5 * speed * speed / acceleration;
    ship.position + heading * distance
}

/// Turn command that swings the ship toward `vector`
///
/// Proportional within one tick's turn, full rate otherwise.
pub fn turn_toward(ship: &Ship, vector: DVec2) -> f64 {
    let length = vector.length();
    if length == 0.0 {
        return 0.0;
    }
    let facing = ship.facing.unit();
    let cross = vector.perp_dot(facing);
    let rate = ship.turn_rate();
    if vector.dot(facing) > 0.0 && rate > 0.0 {
        let angle = (cross / length).clamp(-1.0, 1.0).asin().to_degrees();
        if angle.abs() <= rate {
            return -angle / rate;
        }
    }
    if cross < 0.0 { 1.0 } else { -1.0 }
}

/// Returns true once the ship is within `radius` and slower than `slow`
fn move_to(ship: &Ship, command: &mut Command, target: DVec2, radius: f64, slow: f64) -> bool {
    let distance = target.distance(ship.position);
    let speed = ship.velocity.length();
    let is_close = distance < radius;
    if is_close && speed < slow {
        return true;
    }

    let is_very_close = distance < 0.5 * radius;
    let offset = target - stopping_point(ship);
    let facing = ship.facing.unit();
    let is_facing = offset.normalize_or_zero().dot(facing) > 0.8;
    if !is_very_close && (!is_close || !is_facing) {
        command.turn = turn_toward(ship, offset);
    }
    if is_facing || (is_very_close && ship.velocity.dot(facing) < 0.0) {
        command.thrust = 1.0;
    }
    false
}

/// Brake to below `slow`; returns true once there
fn stop(ship: &Ship, command: &mut Command, slow: f64) -> bool {
    let speed = ship.velocity.length();
    if speed <= slow {
        return true;
    }
    command.turn = turn_toward(ship, -ship.velocity);
    if (ship.velocity / speed).dot(ship.facing.unit()) < -0.8 {
        command.thrust = 1.0;
    }
    false
}

fn move_to_planet(ship: &Ship, data: &GameData, planet: usize, command: &mut Command) -> bool {
    let Some(object) = ship
        .system
        .and_then(|id| data.system(id))
        .and_then(|s| s.objects.get(planet))
    else {
        return false;
    };
    move_to(ship, command, object.position, object.radius, 1.0)
}

/// Slow down, then line up with the destination
fn prepare_for_hyperspace(ship: &Ship, data: &GameData, destination: SystemId, command: &mut Command) {
    let (Some(here), Some(there)) = (ship.system.and_then(|id| data.system(id)), data.system(destination))
    else {
        return;
    };
    let direction = there.position - here.position;
    if stop(ship, command, ship.attributes.jump_speed.max(0.2)) {
        command.turn = turn_toward(ship, direction);
    }
}

fn circle_around(ship: &Ship, command: &mut Command, target: &Ship) {
    let direction = target.position - ship.position;
    command.turn = turn_toward(ship, direction);
    if ship.facing.unit().dot(direction) >= 0.0 && direction.length() > 200.0 {
        command.thrust = 1.0;
    }
}

/// Direction that puts the most fixed-gun damage on the target
fn target_aim(ship: &Ship, data: &GameData, target: &Ship) -> DVec2 {
    let mut result = DVec2::ZERO;
    for (index, weapon) in weapons(ship, data) {
        let hardpoint = &ship.hardpoints[index];
        if weapon.is_homing() || hardpoint.turret || weapon.ammo.is_some() || weapon.is_anti_missile() {
            continue;
        }
        let start = ship.position + ship.facing.rotate(hardpoint.point);
        let mut p = target.position - start;
        let v = target.velocity - ship.velocity;
        let Some(steps) = rendezvous_time(p, v, weapon.velocity) else {
            continue;
        };
        p += v * steps.min(f64::from(weapon.lifetime.max(0)));
        result += p.normalize_or_zero() * weapon.total_damage();
    }
    if result == DVec2::ZERO {
        target.position - ship.position
    } else {
        result
    }
}

fn attack(ship: &Ship, data: &GameData, command: &mut Command, target: &Ship) {
    let d = target.position - ship.position;
    let shortest_range = weapons(ship, data)
        .filter(|(_, w)| !w.is_anti_missile())
        .map(|(_, w)| weapon_range(w))
        .fold(4000.0, f64::min);

    command.launch = true;
    // Long-range ships keep their distance
    if shortest_range > 1000.0 && d.length() < 0.5 * shortest_range {
        command.turn = turn_toward(ship, -d);
        if ship.facing.unit().dot(d) <= 0.0 {
            command.thrust = 1.0;
        }
        return;
    }

    command.turn = turn_toward(ship, target_aim(ship, data, target));

    let turn_rate = ship.turn_rate();
    let circumference = if turn_rate > 0.0 {
        360.0 / turn_rate * ship.velocity.length()
    } else {
        0.0
    };
    let diameter = (circumference / PI).max(200.0);
    let facing = ship.facing.unit();
    if (facing.dot(d) >= 0.0 && d.length() > diameter)
        || (ship.velocity.dot(d) < 0.0 && facing.dot(d.normalize_or_zero()) >= 0.9)
    {
        command.thrust = 1.0;
    }
}

/// Fire bits for every weapon that would hit an enemy right now
fn auto_fire(ctx: &Context, ship: &Ship, target: Option<ShipId>, secondary: bool) -> u32 {
    let target = target.and_then(|id| ctx.find(id));
    // Never shoot at a target that is not an enemy
    if let Some(t) = target
        && !ctx.is_enemy(ship, t)
    {
        return 0;
    }
    let spare_disabled = ship.personality.disables || ship.personality.plunders;

    let max_range = weapons(ship, ctx.data)
        .filter(|(i, w)| ship.hardpoints[*i].is_ready() && !w.is_homing() && (secondary || w.ammo.is_none()))
        .map(|(_, w)| weapon_range(w))
        .fold(0.0, f64::max)
        * 1.5;

    let enemies: Vec<&Ship> = ctx
        .ships
        .iter()
        .filter(|t| {
            t.is_targetable()
                && t.system == ship.system
                && ctx.is_enemy(ship, t)
                && t.velocity.length() < 20.0
                && t.position.distance(ship.position) < max_range
        })
        .collect();

    let mut fire = 0u32;
    for (index, weapon) in weapons(ship, ctx.data) {
        let hardpoint = &ship.hardpoints[index];
        if index >= 32
            || !hardpoint.is_ready()
            || weapon.is_anti_missile()
            || (target.is_none() && weapon.is_homing())
            || (!secondary && weapon.ammo.is_some())
        {
            continue;
        }
        if weapon.firing_fuel > 0.0 {
            let remaining = ship.fuel - weapon.firing_fuel;
            let reserve = if ship.personality.staying { 0.0 } else { ship.attributes.jump_fuel };
            if !secondary || remaining < reserve {
                continue;
            }
        }

        let start = ship.position + ship.facing.rotate(hardpoint.point);
        let lifetime = f64::from(weapon.lifetime.max(0));

        if let Some(t) = target
            && (weapon.is_homing() || hardpoint.turret)
        {
            let v = t.velocity - ship.velocity;
            // Both ships move once more before the shot exists
            let p = t.position - start + v;
            if p.length() < weapon.blast_radius {
                continue;
            }
            if rendezvous_time(p, v, weapon.velocity).is_some_and(|steps| steps <= lifetime) {
                fire |= 1 << index;
                continue;
            }
        }
        if weapon.is_homing() {
            continue;
        }

        for enemy in &enemies {
            if enemy.is_disabled && spare_disabled && has_cargo(enemy) {
                continue;
            }
            let v = enemy.velocity - ship.velocity;
            let p = enemy.position - start + v;
            let path = ((ship.facing + hardpoint.angle).unit() * weapon.velocity - v) * lifetime;
            if segment_circle_entry(-p, path, DVec2::ZERO, enemy.radius).is_some() {
                fire |= 1 << index;
                break;
            }
        }
    }
    fire
}

fn move_independent(ctx: &Context, ship: &Ship, decision: &mut Decision, rng: &mut Pcg32) {
    if ship.position.length() >= WANDER_LIMIT {
        move_to(ship, &mut decision.command, DVec2::ZERO, 40.0, 0.8);
        return;
    }

    if let Some(target) = decision.target.and_then(|id| ctx.find(id)) {
        if ctx.is_enemy(ship, target) {
            let should_board = ship.personality.plunders
                && ship.free_cargo() > 0
                && target.is_disabled
                && has_cargo(target);
            if should_board {
                move_to(ship, &mut decision.command, target.position, BOARD_RANGE, 0.8);
                decision.command.board = true;
            } else {
                attack(ship, ctx.data, &mut decision.command, target);
            }
            return;
        }
        decision.target = None;
    }

    let Some(system) = ship.system.and_then(|id| ctx.data.system(id)) else {
        return;
    };
    let staying = ship.personality.staying;
    if decision.target_system.is_none() && decision.target_planet.is_none() && !staying {
        choose_destination(ctx, ship, decision, rng);
    }

    if let Some(destination) = decision.target_system {
        prepare_for_hyperspace(ship, ctx.data, destination, &mut decision.command);
        // Wait for deployed fighters to come home
        let must_wait = ctx
            .ships
            .iter()
            .any(|s| s.parent == Some(ship.id) && s.is_fighter() && s.system.is_some());
        if !must_wait {
            decision.command.jump = true;
        }
    } else if let Some(planet) = decision.target_planet {
        move_to_planet(ship, ctx.data, planet, &mut decision.command);
        if !staying {
            decision.command.land = true;
        } else if system
            .objects
            .get(planet)
            .is_none_or(|o| o.position.distance(ship.position) < 100.0)
        {
            decision.target_planet = None;
        }
    } else if staying && !system.objects.is_empty() {
        decision.target_planet = Some(rng.random_range(0..system.objects.len()));
    }
}

/// Weighted pick between jumping out (favouring links ahead) and landing
fn choose_destination(ctx: &Context, ship: &Ship, decision: &mut Decision, rng: &mut Pcg32) {
    let Some(system) = ship.system.and_then(|id| ctx.data.system(id)) else {
        return;
    };
    let jumps = if ship.attributes.jump_fuel > 0.0 {
        (ship.fuel / ship.attributes.jump_fuel).floor() as u32
    } else {
        u32::MAX
    };
    let planet_weight = if jumps > 0 { 1 + 40 / jumps } else { 1 };

    let mut system_weights = Vec::new();
    if jumps > 0 {
        for &link in &system.links {
            let Some(other) = ctx.data.system(link) else {
                system_weights.push(0);
                continue;
            };
            let direction = (other.position - system.position).normalize_or_zero();
            let weight = (11.0 + 10.0 * ship.facing.unit().dot(direction)) as u32;
            system_weights.push(weight);
        }
    }
    let system_total: u32 = system_weights.iter().sum();

    let planets: Vec<usize> = system
        .objects
        .iter()
        .enumerate()
        .filter(|(_, o)| o.planet.and_then(|p| ctx.data.planet(p)).is_some_and(|p| p.has_spaceport))
        .map(|(i, _)| i)
        .collect();
    let total = system_total + planet_weight * planets.len() as u32;
    if total == 0 {
        return;
    }

    let mut choice = rng.random_range(0..total);
    if choice < system_total {
        for (link, weight) in system.links.iter().zip(&system_weights) {
            if choice < *weight {
                decision.target_system = Some(*link);
                break;
            }
            choice -= weight;
        }
    } else {
        let index = ((choice - system_total) / planet_weight) as usize;
        decision.target_planet = planets.get(index).copied();
    }
}

fn move_escort(ctx: &Context, ship: &Ship, parent: &Ship, decision: &mut Decision) {
    let staying = ship.personality.staying;
    let command = &mut decision.command;
    if ship.system != parent.system && !staying {
        // Follow only along a direct link
        let linked = ship
            .system
            .and_then(|id| ctx.data.system(id))
            .zip(parent.system)
            .is_some_and(|(here, there)| here.links.contains(&there));
        decision.target_system = if linked { parent.system } else { None };
        if let Some(destination) = decision.target_system {
            prepare_for_hyperspace(ship, ctx.data, destination, command);
            command.jump = true;
        }
    } else if parent.command.land && parent.target_planet.is_some() {
        decision.target_planet = parent.target_planet;
        if let Some(planet) = parent.target_planet {
            move_to_planet(ship, ctx.data, planet, command);
        }
        let parent_ready = parent.is_landing()
            || matches!(parent.state, FlightState::ApproachingPlanet)
                && parent.velocity.length() < 1.0;
        if parent_ready {
            command.land = true;
        }
    } else if parent.command.jump && parent.target_system.is_some() && !staying {
        decision.target_system = parent.target_system;
        if let Some(destination) = parent.target_system {
            prepare_for_hyperspace(ship, ctx.data, destination, command);
        }
        if parent.is_hyperspacing() || parent.can_hyperspace(ctx.data) {
            command.jump = true;
        }
    } else {
        circle_around(ship, command, parent);
    }
}

/// The flagship: renderer input plus the land/jump/board autopilot
fn move_player(
    ctx: &Context,
    ship: &Ship,
    input: &Command,
    autopilot: &mut Autopilot,
    messages: &mut Vec<String>,
) -> Decision {
    let mut decision = Decision::from_ship(ship);
    decision.target = decision
        .target
        .and_then(|id| ctx.find(id))
        .filter(|t| t.is_targetable())
        .map(|t| t.id);
    let system = ship.system.and_then(|id| ctx.data.system(id));

    if input.target_nearest {
        // Active enemies first, then disabled ones; never friendlies
        let mut best: Option<(u8, f64, ShipId)> = None;
        for other in ctx.ships {
            if other.id == ship.id || other.system != ship.system || !other.is_targetable() {
                continue;
            }
            if !ctx.is_enemy(ship, other) {
                continue;
            }
            let rank = if other.is_disabled { 1 } else { 2 };
            let distance = other.position.distance(ship.position);
            if best.is_none_or(|(r, d, _)| rank > r || (rank == r && distance < d)) {
                best = Some((rank, distance, other.id));
            }
        }
        if let Some((_, _, id)) = best {
            decision.target = Some(id);
        }
    } else if input.target_next {
        let current = decision.target;
        let mut select_next = current.is_none();
        let mut chosen = None;
        for other in ctx.ships {
            if Some(other.id) == current {
                select_next = true;
            } else if select_next
                && other.id != ship.id
                && other.system == ship.system
                && other.is_targetable()
                && !other.is_yours
            {
                chosen = Some(other.id);
                break;
            }
        }
        decision.target = chosen;
    } else if input.board {
        let target_ok = decision
            .target
            .and_then(|id| ctx.find(id))
            .is_some_and(|t| t.is_disabled && !t.is_destroyed());
        if !target_ok {
            let mut best: Option<(bool, f64, ShipId)> = None;
            for other in ctx.ships {
                if other.system != ship.system || !other.is_targetable() || !other.is_disabled {
                    continue;
                }
                let enemy = ctx.is_enemy(ship, other);
                let distance = other.position.distance(ship.position);
                if best.is_none_or(|(e, d, _)| (enemy && !e) || distance < d) {
                    best = Some((enemy, distance, other.id));
                }
            }
            decision.target = best.map(|(_, _, id)| id);
        }
        if decision.target.is_some() {
            *autopilot = Autopilot::Board;
        }
    } else if input.land {
        if let Some(system) = system {
            let in_range = decision
                .target_planet
                .and_then(|i| system.objects.get(i))
                .is_some_and(|o| o.position.distance(ship.position) < o.radius);
            if !in_range {
                let mut closest = f64::INFINITY;
                let mut count = 0;
                decision.target_planet = None;
                for (index, object) in system.objects.iter().enumerate() {
                    let Some(planet) = object.planet.and_then(|p| ctx.data.planet(p)) else {
                        continue;
                    };
                    count += 1;
                    let mut distance = object.position.distance(ship.position);
                    if !planet.has_spaceport {
                        distance += 10_000.0;
                    }
                    if distance < closest {
                        closest = distance;
                        decision.target_planet = Some(index);
                    }
                }
                match decision.target_planet {
                    None => messages
                        .push("There are no planets in this system that you can land on.".into()),
                    Some(index) if count > 1 => {
                        let name = system.objects[index]
                            .planet
                            .and_then(|p| ctx.data.planet(p))
                            .map(|p| p.name.as_str())
                            .unwrap_or("");
                        messages.push(format!(
                            "You can land on more than one planet in this system. Landing on {name}."
                        ));
                    }
                    Some(_) => {}
                }
            }
            if decision.target_planet.is_some() {
                *autopilot = Autopilot::Land;
            }
        }
    } else if input.jump {
        if decision.target_system.is_none()
            && let Some(system) = system
        {
            let mut best_match = -2.0;
            for &link in &system.links {
                let Some(other) = ctx.data.system(link) else {
                    continue;
                };
                let direction = (other.position - system.position).normalize_or_zero();
                let score = ship.facing.unit().dot(direction);
                if score > best_match {
                    best_match = score;
                    decision.target_system = Some(link);
                }
            }
        }
        if decision.target_system.is_some() {
            *autopilot = Autopilot::Jump;
        }
    }

    let command = &mut decision.command;
    command.turn = input.turn;
    command.thrust = input.thrust;
    command.fire = input.fire;
    command.secondary = input.secondary;
    command.launch = input.launch;
    if input.has_manual_input() {
        *autopilot = Autopilot::Off;
    }

    match *autopilot {
        Autopilot::Off => {}
        Autopilot::Land => match decision.target_planet {
            Some(planet) if !ship.is_landing() => {
                move_to_planet(ship, ctx.data, planet, command);
                command.land = true;
            }
            _ => *autopilot = Autopilot::Off,
        },
        Autopilot::Jump => match decision.target_system {
            Some(_) if ship.fuel < ship.attributes.jump_fuel && !ship.is_hyperspacing() => {
                messages.push("You do not have enough fuel to make a hyperspace jump.".into());
                *autopilot = Autopilot::Off;
            }
            Some(destination) => {
                prepare_for_hyperspace(ship, ctx.data, destination, command);
                command.jump = true;
            }
            None => *autopilot = Autopilot::Off,
        },
        Autopilot::Board => match decision.target.and_then(|id| ctx.find(id)) {
            Some(target) if target.is_disabled => {
                move_to(ship, command, target.position, BOARD_RANGE, 0.8);
                command.board = true;
            }
            _ => *autopilot = Autopilot::Off,
        },
    }
    decision
}
