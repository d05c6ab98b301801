//! Fixed-order simulation tick
//!
//! Advances the world by one step and writes the result into a scene
//! snapshot. Every substep finishes for all entities before the next one
//! starts: ships fire only after every ship has moved, and projectiles
//! collide only after every ship has fired.

use std::sync::Arc;
use std::time::Instant;

use glam::DVec2;
use rand::Rng;

use super::ai;
use super::angle::Angle;
use super::armament;
use super::collision::{self, CLEAR};
use super::command::Command;
use super::data::{GameData, PlanetId};
use super::ship::{FlightState, MoveOutcome, Ship, ShipId};
use super::state::{Autopilot, ShipEvent, ShipEventKind, World, target_view};
use crate::scene::draw::{DrawSource, Placement};
use crate::scene::radar::RadarColor;
use crate::scene::{PanelHandle, SceneSnapshot, SceneTransition};

/// Boarding and docking distance
const BOARD_RANGE: f64 = 40.0;
/// Spawned ships appear within this distance of their system's center
const SPAWN_SCATTER: f64 = 1000.0;

impl World {
    /// Advance the world by one tick and describe the result in `out`
    ///
    /// While the flagship sits on a planet the world is frozen: the snapshot
    /// is rebuilt from the unchanged state and nothing advances.
    pub fn tick(&mut self, input: &Command, out: &mut SceneSnapshot) {
        if self.is_frozen() {
            self.render_frozen(out);
            return;
        }
        let started = Instant::now();
        let data = Arc::clone(&self.data);

        // 1. Clear
        self.step += 1;
        self.events.clear();
        out.clear(self.step);
        out.draw.clear(self.step, self.last_center, self.last_center_velocity);
        out.radar.clear(self.last_center);

        // 2. AI
        ai::step(self, input);

        // 3. Move ships
        self.move_ships(&data);
        if let Some((position, velocity)) = self.flagship().map(|f| (f.position, f.velocity)) {
            self.last_center = position;
            self.last_center_velocity = velocity;
        }
        out.draw.set_center(self.last_center, self.last_center_velocity);
        out.radar.set_center(self.last_center);

        // 4. System change
        if let Some(system) = self.flagship().and_then(|f| f.system)
            && Some(system) != self.current_system
        {
            self.enter_system(system);
        }

        // 5. Stellar objects and link pointers
        self.draw_stellar(&data, out);

        // 6. Asteroids
        self.asteroids.step();
        self.asteroids
            .draw(&data, &mut out.draw, self.last_center, self.viewport);

        // 7. Projectiles
        self.move_projectiles(&data);

        // 8. Launch, board, fire
        self.launch_fighters();
        self.board_ships();
        let anti_missile = self.fire_weapons(&data, out);

        // 9. Collisions
        self.resolve_collisions(&data, &anti_missile, out);

        // 10. Effects
        for effect in &self.effects {
            effect.draw(&data, &mut out.draw);
        }
        self.effects.retain_mut(|effect| effect.move_step());

        // 11. Spawn
        self.spawn(&data);

        // 12. Load telemetry
        self.load.record(started.elapsed(), self.frame_period);

        self.finish(out);
    }

    /// Rebuild a snapshot of the unchanged world
    fn render_frozen(&mut self, out: &mut SceneSnapshot) {
        let data = Arc::clone(&self.data);
        out.clear(self.step);
        out.draw.clear(self.step, self.last_center, DVec2::ZERO);
        out.radar.clear(self.last_center);
        self.draw_stellar(&data, out);
        self.finish(out);
    }

    /// HUD, messages and events for the snapshot
    fn finish(&mut self, out: &mut SceneSnapshot) {
        self.flash *= 0.95;
        if self.flash < 0.01 {
            self.flash = 0.0;
        }
        self.messages.prune(self.step, self.message_lifetime);
        out.messages = self.messages.recent(self.step, self.message_lifetime);
        out.events.extend_from_slice(&self.events);
        out.ships_in_view.extend(self.ships_in_view().map(|s| s.id));
        out.hud.update(self);
    }

    fn move_ships(&mut self, data: &GameData) {
        let mut ships = std::mem::take(&mut self.ships);
        // Effects of ships outside the player's system are never shown
        let mut hidden = Vec::new();
        let current = self.current_system;

        ships.retain_mut(|ship| {
            let in_view = ship.system.is_some() && ship.system == current;
            let system = ship.system.and_then(|id| data.system(id));
            let effects = if in_view { &mut self.effects } else { &mut hidden };
            let outcome = ship.move_step(data, system, &mut self.fx_rng, effects);
            hidden.clear();

            match outcome {
                MoveOutcome::Destroyed => {
                    if ship.is_flagship {
                        log::info!("Flagship {} destroyed", ship.name);
                        self.flagship = None;
                        self.transition = Some(SceneTransition::FlagshipDestroyed);
                    }
                    return false;
                }
                MoveOutcome::Landed(planet) => return self.on_landed(ship, planet, data),
                MoveOutcome::Arrived { from, .. } => {
                    // Leaving the player's system takes a ship out of play
                    if !ship.is_yours && from.is_some() && from == current {
                        log::trace!("Ship {} jumped out", ship.id.0);
                        return false;
                    }
                }
                MoveOutcome::Moved => {}
            }

            if ship.is_flagship {
                if ship.is_overheated && !self.was_overheated {
                    self.messages.add("Your ship has overheated.", self.step);
                }
                self.was_overheated = ship.is_overheated;
            }

            if ship.system.is_some() && ship.system != current && !ship.is_special && !ship.is_yours {
                ship.forget += 1;
                if ship.forget > self.forget_after {
                    log::trace!("Forgetting ship {}", ship.id.0);
                    return false;
                }
            } else {
                ship.forget = 0;
            }
            true
        });

        // Carried fighters follow their carrier into the roster, or out of
        // the world when the carrier is gone
        let parked: Vec<ShipId> = self.roster.iter().map(|s| s.id).collect();
        let (stowed, active): (Vec<Ship>, Vec<Ship>) = ships
            .into_iter()
            .partition(|s| s.system.is_none() && s.parent.is_some_and(|p| parked.contains(&p)));
        self.roster.extend(stowed);
        let alive: Vec<ShipId> = active.iter().map(|s| s.id).collect();
        self.ships = active;
        self.ships
            .retain(|s| s.system.is_some() || s.parent.is_some_and(|p| alive.contains(&p)));
    }

    /// Returns whether the ship stays in the active list
    fn on_landed(&mut self, ship: &mut Ship, planet: Option<PlanetId>, data: &GameData) -> bool {
        if ship.is_flagship {
            match planet {
                Some(planet) => {
                    let name = data
                        .planet(planet)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    self.autopilot = Autopilot::Off;
                    self.set_landed(PanelHandle { planet, name });
                }
                None => {
                    log::debug!("Flagship landed on an object with no planet");
                    ship.state = FlightState::TakingOff;
                }
            }
            return true;
        }
        if ship.is_yours {
            ship.is_parked = true;
            ship.command = Command::default();
            self.roster.push(ship.clone());
        }
        false
    }

    fn draw_stellar(&self, data: &GameData, out: &mut SceneSnapshot) {
        let Some(system) = self.current_system.and_then(|id| data.system(id)) else {
            return;
        };
        for object in &system.objects {
            if let Some(sprite) = object.sprite {
                let frame_rate = data.sprite(sprite).map(|s| s.frame_rate).unwrap_or(0.0);
                // Bodies face away from the system center
                let facing = Angle::from_vector(object.position);
                let mut placement = Placement::new(sprite, object.position, facing, DrawSource::Stellar);
                placement.frame = self.step as f64 * frame_rate;
                out.draw.push(data, placement);
            }
            let color = if object.is_star {
                RadarColor::Special
            } else if object.planet.is_some() {
                RadarColor::Friendly
            } else {
                RadarColor::Inactive
            };
            let outer = (object.radius * 0.03 + 0.5).max(2.0);
            out.radar.add(color, object.position, outer, outer - 1.0);
        }

        let selected = self.flagship().and_then(|f| f.target_system);
        for &link in &system.links {
            let Some(other) = data.system(link) else {
                continue;
            };
            let color = if Some(link) == selected {
                RadarColor::Special
            } else {
                RadarColor::Inactive
            };
            out.radar.add_pointer(color, other.position - system.position);
        }
    }

    fn move_projectiles(&mut self, data: &GameData) {
        let World {
            ships,
            projectiles,
            effects,
            rng,
            fx_rng,
            current_system,
            next_projectile,
            ..
        } = self;

        // Sub-munitions wait for the next tick
        let mut released = Vec::new();
        projectiles.retain_mut(|projectile| {
            let Some(weapon) = data.weapon(projectile.weapon) else {
                log::trace!("Dropping projectile with missing weapon {}", projectile.weapon.0);
                return false;
            };
            let target = projectile
                .target
                .and_then(|id| target_view(ships, *current_system, id));
            if projectile.move_step(data, weapon, target, rng, fx_rng, effects) {
                return true;
            }
            for &(child_id, count) in &weapon.submunitions {
                let Some(child) = data.weapon(child_id) else {
                    continue;
                };
                for _ in 0..count {
                    *next_projectile += 1;
                    released.push(projectile.submunition(*next_projectile, child_id, child, rng));
                }
            }
            false
        });
        projectiles.extend(released);
    }

    /// Release carried fighters from carriers that asked for it
    fn launch_fighters(&mut self) {
        let current = self.current_system;
        let launching: Vec<(ShipId, DVec2, DVec2, Angle)> = self
            .ships
            .iter()
            .filter(|s| {
                s.command.launch && s.system.is_some() && s.system == current && !s.is_disabled
            })
            .map(|s| (s.id, s.position, s.velocity, s.facing))
            .collect();
        let Some(system) = current else {
            return;
        };
        for fighter in self.ships.iter_mut().filter(|s| s.system.is_none()) {
            let Some(&(_, position, velocity, facing)) = launching
                .iter()
                .find(|(id, ..)| Some(*id) == fighter.parent)
            else {
                continue;
            };
            fighter.place(system, position, facing);
            fighter.velocity = velocity;
            fighter.state = FlightState::Flying;
            fighter.zoom = 1.0;
        }
    }

    /// Dock fighters and plunder disabled ships
    fn board_ships(&mut self) {
        let current = self.current_system;
        for index in 0..self.ships.len() {
            let ship = &self.ships[index];
            if !ship.command.board || ship.system.is_none() || ship.system != current {
                continue;
            }
            let Some(target_index) = ship
                .target
                .and_then(|id| self.ships.iter().position(|s| s.id == id))
            else {
                continue;
            };
            let target = &self.ships[target_index];
            let close = target.position.distance(ship.position) <= BOARD_RANGE.max(target.radius)
                && (target.velocity - ship.velocity).length() < 1.0;
            if !close || target.system != ship.system || target_index == index {
                continue;
            }

            if ship.is_fighter() && ship.parent == Some(target.id) {
                let fighter = &mut self.ships[index];
                fighter.system = None;
                fighter.velocity = DVec2::ZERO;
                fighter.target = None;
                fighter.command = Command::default();
                continue;
            }
            if !target.is_disabled || target.is_destroyed() {
                continue;
            }

            let loot: Vec<(String, u32)> = target.cargo.iter().map(|(k, v)| (k.clone(), *v)).collect();
            let mut taken = 0;
            for (commodity, tons) in loot {
                let moved = self.ships[index].add_cargo(&commodity, tons);
                if let Some(left) = self.ships[target_index].cargo.get_mut(&commodity) {
                    *left -= moved;
                }
                taken += moved;
            }
            self.ships[target_index].cargo.retain(|_, tons| *tons > 0);

            let (actor, victim) = (self.ships[index].government, self.ships[target_index].id);
            self.events.push(ShipEvent {
                kind: ShipEventKind::Boarded,
                actor,
                target: victim,
            });
            if self.ships[index].is_flagship {
                let name = self.ships[target_index].name.clone();
                self.post(format!("You boarded the {name} and took {taken} tons of cargo."));
                self.autopilot = Autopilot::Off;
            } else {
                self.ships[index].target = None;
            }
            log::debug!("Ship {} boarded ship {}", self.ships[index].id.0, victim.0);
        }
    }

    /// Fire every in-system ship and draw it
    ///
    /// Returns the indices of ships with an anti-missile system ready.
    fn fire_weapons(&mut self, data: &GameData, out: &mut SceneSnapshot) -> Vec<usize> {
        let World {
            ships,
            projectiles,
            effects,
            politics,
            rng,
            fx_rng,
            current_system,
            next_projectile,
            step,
            ..
        } = self;
        let player = politics.player();

        let mut anti_missile = Vec::new();
        for index in 0..ships.len() {
            if ships[index].system.is_none() || ships[index].system != *current_system {
                continue;
            }
            let target = ships[index]
                .target
                .and_then(|id| target_view(ships, *current_system, id));
            let ship = &mut ships[index];
            if armament::fire(ship, data, target, rng, fx_rng, projectiles, effects, next_projectile) {
                anti_missile.push(index);
            }
        }

        for ship in ships.iter().filter(|s| s.system.is_some() && s.system == *current_system) {
            ship.draw(data, &mut out.draw, *step);

            let targets_player = ship
                .target
                .and_then(|id| ships.iter().find(|s| s.id == id))
                .is_some_and(|t| t.government == player);
            let color = if ship.government == player {
                RadarColor::Player
            } else if ship.is_disabled || ship.is_overheated {
                RadarColor::Inactive
            } else if !politics.is_enemy(player, ship.government) {
                RadarColor::Friendly
            } else if targets_player {
                RadarColor::Hostile
            } else {
                RadarColor::Unfriendly
            };
            out.radar.add(color, ship.position, ship.radar_size(data), 0.0);
        }
        anti_missile
    }

    fn resolve_collisions(&mut self, data: &GameData, anti_missile: &[usize], out: &mut SceneSnapshot) {
        let World {
            ships,
            projectiles,
            effects,
            asteroids,
            politics,
            rng,
            fx_rng,
            current_system,
            events,
            ..
        } = self;
        let current = *current_system;
        // Ships jumping out can still be shot until they leave the system
        let in_play = |ship: &Ship| ship.system.is_some() && ship.system == current && !ship.is_landing();

        projectiles.retain_mut(|projectile| {
            let Some(weapon) = data.weapon(projectile.weapon) else {
                return false;
            };
            let start = projectile.position;
            let delta = projectile.velocity;

            let mut closest = asteroids.collide(start, delta);
            let mut hit = None;
            for (index, ship) in ships.iter().enumerate() {
                if !in_play(ship) {
                    continue;
                }
                let eligible = projectile.target == Some(ship.id)
                    || politics.is_enemy(projectile.government, ship.government);
                if !eligible {
                    continue;
                }
                let range = collision::sweep_circle(start, delta, ship.position, ship.radius, weapon.trigger_radius);
                if range < closest {
                    closest = range;
                    hit = Some(index);
                }
            }

            if closest < CLEAR {
                let impact = projectile.explode(data, weapon, closest, fx_rng, effects);
                let mut damage = |ship: &mut Ship, push: DVec2| {
                    let report = ship.take_damage(weapon, push);
                    let mut raise = |kind| {
                        events.push(ShipEvent {
                            kind,
                            actor: projectile.government,
                            target: ship.id,
                        })
                    };
                    if report.disabled {
                        raise(ShipEventKind::Disabled);
                    }
                    if report.destroyed {
                        raise(ShipEventKind::Destroyed);
                    }
                };
                if weapon.blast_radius > 0.0 {
                    // Blasts hit everyone in range, friend or foe
                    for ship in ships.iter_mut().filter(|s| in_play(s)) {
                        if collision::within_blast(ship.position, impact, weapon.blast_radius) {
                            let push = ship.position - impact;
                            damage(ship, push);
                        }
                    }
                } else if let Some(index) = hit {
                    damage(&mut ships[index], delta);
                }
                if let Some(index) = hit {
                    let victim = &ships[index];
                    if victim.government != projectile.government {
                        politics.provoke(victim.government, projectile.government);
                        events.push(ShipEvent {
                            kind: ShipEventKind::Provoked,
                            actor: projectile.government,
                            target: victim.id,
                        });
                    }
                }
                projectile.draw(data, weapon, &mut out.draw, closest);
                return false;
            }

            let mut intercepted = false;
            if projectile.missile_strength > 0 {
                out.radar.add(RadarColor::Special, projectile.position, 1.0, 0.0);
                for &index in anti_missile {
                    let defender = &ships[index];
                    let interested = projectile.target == Some(defender.id)
                        || politics.is_enemy(defender.government, projectile.government);
                    if !interested {
                        continue;
                    }
                    if armament::fire_anti_missile(&mut ships[index], data, projectile, rng, fx_rng, effects) {
                        log::trace!("Projectile {} intercepted", projectile.id);
                        intercepted = true;
                        break;
                    }
                }
            }
            projectile.draw(data, weapon, &mut out.draw, CLEAR);
            !intercepted
        });
    }

    /// Maybe bring in a ship from a neighbouring system
    fn spawn(&mut self, data: &GameData) {
        let Some(system) = self.current_system else {
            return;
        };
        let Some(order) = self.spawner.roll(&mut self.rng, data, system) else {
            return;
        };
        let (Some(origin), Some(destination)) = (data.system(order.origin), data.system(system)) else {
            return;
        };
        let offset = Angle::random(&mut self.rng).unit() * (self.rng.random::<f64>() * SPAWN_SCATTER);
        let facing = Angle::from_vector(destination.position - origin.position);
        let Some(id) = self.add_ship(order.model, order.government, order.name, order.origin, offset, facing)
        else {
            return;
        };

        let cargo = if data.commodities.is_empty() {
            None
        } else {
            Some(data.commodities[self.rng.random_range(0..data.commodities.len())].clone())
        };
        let tons = self.rng.random::<f64>();
        if let Some(ship) = self.ship_mut(id) {
            ship.target_system = Some(system);
            if let Some(commodity) = cargo {
                let tons = (tons * f64::from(ship.free_cargo())) as u32;
                ship.add_cargo(&commodity, tons);
            }
        }
    }
}
