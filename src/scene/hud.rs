//! HUD overlay data
//!
//! A tagged mapping of names to sprites, strings and bars, plus the few
//! structured rows the overlay draws on its own (escorts, ammo, markers).

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sim::data::SpriteId;
use crate::sim::ship::{Ship, ShipId};
use crate::sim::state::World;

/// A gauge in [0, 1], optionally split into segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub value: f64,
    pub segments: u32,
}

/// One row of the escort panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscortStatus {
    pub id: ShipId,
    pub sprite: Option<SpriteId>,
    pub shields: f64,
    pub hull: f64,
    pub energy: f64,
    pub heat: f64,
    pub fuel: f64,
    /// In the player's system (not parked, carried or elsewhere)
    pub in_system: bool,
}

/// Crosshair drawn around the flagship's target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMarker {
    /// Offset from the view center
    pub position: DVec2,
    pub radius: f64,
    /// Rotation of the brackets, advancing each tick
    pub angle: f64,
    pub hostile: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HudInfo {
    pub sprites: BTreeMap<String, Option<SpriteId>>,
    pub strings: BTreeMap<String, String>,
    pub bars: BTreeMap<String, Bar>,
    /// Step of the radar list this HUD belongs with
    pub radar_step: u64,
    /// (ammo outfit, count) for the flagship's ammo-using weapons
    pub ammo: Vec<(String, i32)>,
    pub escorts: Vec<EscortStatus>,
    pub markers: Vec<TargetMarker>,
    /// System arrival flash, 1 on arrival decaying to 0
    pub flash: f64,
    /// CPU load as a fraction of the frame budget, when shown
    pub load: Option<f64>,
}

fn fraction(value: f64, max: f64) -> f64 {
    if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 }
}

impl HudInfo {
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.strings.clear();
        self.bars.clear();
        self.ammo.clear();
        self.escorts.clear();
        self.markers.clear();
        self.flash = 0.0;
        self.load = None;
    }

    pub fn set_sprite(&mut self, key: &str, sprite: Option<SpriteId>) {
        self.sprites.insert(key.to_string(), sprite);
    }

    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.strings.insert(key.to_string(), value.into());
    }

    pub fn set_bar(&mut self, key: &str, value: f64, segments: u32) {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        self.bars.insert(key.to_string(), Bar { value, segments });
    }

    pub fn sprite(&self, key: &str) -> Option<SpriteId> {
        self.sprites.get(key).copied().flatten()
    }

    /// Empty string for unknown keys
    pub fn string(&self, key: &str) -> &str {
        self.strings.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn bar(&self, key: &str) -> Option<Bar> {
        self.bars.get(key).copied()
    }

    /// Rebuild everything from the world at the end of a tick
    pub fn update(&mut self, world: &World) {
        self.clear();
        self.radar_step = world.step;
        self.flash = world.flash;
        self.load = world.show_load.then(|| world.load.load());

        let Some(flagship) = world.flagship() else {
            return;
        };
        let data = &world.data;

        self.set_sprite("player sprite", flagship.sprite);
        let location = flagship
            .system
            .map(|id| data.system_name(id))
            .unwrap_or("");
        self.set_string("location", location);
        self.set_string("date", world.date.to_string());
        self.set_string("credits", format!("{} credits", world.credits));

        let planet_name = flagship
            .system
            .and_then(|id| data.system(id))
            .zip(flagship.target_planet)
            .and_then(|(system, index)| system.objects.get(index))
            .and_then(|object| object.planet)
            .and_then(|id| data.planet(id))
            .map(|planet| planet.name.clone());
        if let Some(name) = planet_name {
            self.set_string("navigation mode", "Landing on:");
            self.set_string("destination", name);
        } else if let Some(system) = flagship.target_system {
            self.set_string("navigation mode", "Hyperspace:");
            let name = if world.visited.contains(&system) {
                data.system_name(system)
            } else {
                "unexplored system"
            };
            self.set_string("destination", name);
        } else {
            self.set_string("navigation mode", "Navigation:");
            self.set_string("destination", "no destination");
        }

        let attributes = &flagship.attributes;
        let fuel_segments = if attributes.jump_fuel > 0.0 {
            (attributes.fuel_capacity / attributes.jump_fuel).round() as u32
        } else {
            0
        };
        self.set_bar("fuel", fraction(flagship.fuel, attributes.fuel_capacity), fuel_segments);
        self.set_bar("energy", fraction(flagship.energy, attributes.energy_capacity), 0);
        self.set_bar("heat", fraction(flagship.heat, flagship.maximum_heat()), 0);
        self.set_bar("shields", fraction(flagship.shields, attributes.shields), 0);
        self.set_bar("hull", fraction(flagship.hull, attributes.hull), 0);

        self.update_target(world, flagship);
        self.update_ammo(world, flagship);
        self.update_escorts(world);
    }

    fn update_target(&mut self, world: &World, flagship: &Ship) {
        let data = &world.data;
        let target = flagship
            .target
            .and_then(|id| world.ship(id))
            .filter(|t| t.system.is_some() && t.system == flagship.system);
        let Some(target) = target else {
            self.set_sprite("target sprite", None);
            for key in ["target name", "target type", "target government"] {
                self.set_string(key, "");
            }
            self.set_bar("target shields", 0.0, 0);
            self.set_bar("target hull", 0.0, 0);
            return;
        };

        self.set_sprite("target sprite", target.sprite);
        self.set_string("target name", target.name.clone());
        let model = data.model(target.model).map(|m| m.name.as_str()).unwrap_or("");
        self.set_string("target type", model);
        self.set_string("target government", data.government_name(target.government));
        self.set_bar("target shields", fraction(target.shields, target.attributes.shields), 0);
        self.set_bar("target hull", fraction(target.hull, target.attributes.hull), 0);

        let center = world.last_center;
        self.markers.push(TargetMarker {
            position: target.position - center,
            radius: target.radius,
            angle: (world.step % 360) as f64,
            hostile: world.politics.is_enemy(flagship.government, target.government),
        });
    }

    fn update_ammo(&mut self, world: &World, flagship: &Ship) {
        for hardpoint in &flagship.hardpoints {
            let Some(ammo) = hardpoint
                .weapon
                .and_then(|id| world.data.weapon(id))
                .and_then(|w| w.ammo.as_ref())
            else {
                continue;
            };
            if self.ammo.iter().any(|(name, _)| name == ammo) {
                continue;
            }
            self.ammo.push((ammo.clone(), flagship.outfit_count(ammo)));
        }
    }

    fn update_escorts(&mut self, world: &World) {
        let parked = world.roster.iter().map(|s| (s, false));
        let active = world
            .ships
            .iter()
            .map(|s| (s, s.system.is_some() && s.system == world.current_system));
        for (ship, in_system) in active.chain(parked) {
            if !ship.is_yours || ship.is_flagship {
                continue;
            }
            let attributes = &ship.attributes;
            self.escorts.push(EscortStatus {
                id: ship.id,
                sprite: ship.sprite,
                shields: fraction(ship.shields, attributes.shields),
                hull: fraction(ship.hull, attributes.hull),
                energy: fraction(ship.energy, attributes.energy_capacity),
                heat: fraction(ship.heat, ship.maximum_heat()),
                fuel: fraction(ship.fuel, attributes.fuel_capacity),
                in_system,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fixtures;

    #[test]
    fn test_required_keys_present() {
        let mut world = fixtures::world();
        fixtures::place_player(&mut world, DVec2::ZERO);
        let mut hud = HudInfo::default();
        hud.update(&world);

        for key in ["player sprite", "target sprite"] {
            assert!(hud.sprites.contains_key(key), "missing sprite {key}");
        }
        for key in [
            "location",
            "date",
            "navigation mode",
            "destination",
            "credits",
            "target name",
            "target type",
            "target government",
        ] {
            assert!(hud.strings.contains_key(key), "missing string {key}");
        }
        for key in [
            "fuel",
            "energy",
            "heat",
            "shields",
            "hull",
            "target shields",
            "target hull",
        ] {
            assert!(hud.bars.contains_key(key), "missing bar {key}");
        }
        assert_eq!(hud.string("location"), "Home");
        assert_eq!(hud.string("navigation mode"), "Navigation:");
        assert_eq!(hud.bar("fuel").unwrap().segments, 3);
        assert_eq!(hud.bar("hull").unwrap().value, 1.0);
    }

    #[test]
    fn test_hyperspace_destination_unexplored() {
        let mut world = fixtures::world();
        let id = fixtures::place_player(&mut world, DVec2::ZERO);
        world.ship_mut(id).unwrap().target_system = Some(fixtures::AWAY);
        let mut hud = HudInfo::default();
        hud.update(&world);
        assert_eq!(hud.string("navigation mode"), "Hyperspace:");
        assert_eq!(hud.string("destination"), "unexplored system");

        world.visited.insert(fixtures::AWAY);
        hud.update(&world);
        assert_eq!(hud.string("destination"), "Away");
    }

    #[test]
    fn test_target_fields() {
        let mut world = fixtures::world();
        let player = fixtures::place_player(&mut world, DVec2::ZERO);
        let pirate = fixtures::add(&mut world, fixtures::GUNBOAT, fixtures::PIRATE, DVec2::new(100.0, 0.0));
        world.ship_mut(player).unwrap().target = Some(pirate);
        let mut hud = HudInfo::default();
        hud.update(&world);
        assert_eq!(hud.string("target type"), "Gunboat");
        assert_eq!(hud.string("target government"), "Pirate");
        assert_eq!(hud.markers.len(), 1);
        assert!(hud.markers[0].hostile);
    }

    #[test]
    fn test_no_flagship_leaves_keys_empty() {
        let world = fixtures::world();
        let mut hud = HudInfo::default();
        hud.set_string("location", "stale");
        hud.update(&world);
        assert!(hud.strings.is_empty());
        assert_eq!(hud.string("location"), "");
    }
}
