//! Read-only game catalog
//!
//! Everything the simulation needs to know about sprites, governments,
//! weapons, ship models and star systems. The world holds this behind an
//! `Arc` and never mutates it. Every reference between entries is a typed
//! index; a dangling index resolves to `None` and the caller skips whatever
//! it was about to do.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

catalog_id!(
    /// Index into [`GameData::sprites`]
    SpriteId
);
catalog_id!(
    /// Index into [`GameData::governments`]
    GovernmentId
);
catalog_id!(
    /// Index into [`GameData::weapons`]
    WeaponId
);
catalog_id!(
    /// Index into [`GameData::effects`]
    EffectId
);
catalog_id!(
    /// Index into [`GameData::models`]
    ModelId
);
catalog_id!(
    /// Index into [`GameData::systems`]
    SystemId
);
catalog_id!(
    /// Index into [`GameData::planets`]
    PlanetId
);

/// Sprite metadata (texture upload happens elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sprite {
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// Animation frame count (at least 1)
    pub frames: u32,
    /// Animation frames advanced per tick
    pub frame_rate: f64,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: 1.0,
            height: 1.0,
            frames: 1,
            frame_rate: 0.0,
        }
    }
}

/// A political faction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Government {
    pub name: String,
    /// Colour-channel permutation applied to this government's ships
    pub swizzle: u8,
    /// Attitude toward other governments; negative means hostile
    pub attitudes: Vec<(GovernmentId, f64)>,
}

/// Weapon outfit stats
///
/// Distances are in world units, times in ticks, angles in degrees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Weapon {
    pub name: String,
    pub sprite: Option<SpriteId>,
    pub velocity: f64,
    pub random_velocity: f64,
    pub lifetime: i32,
    pub random_lifetime: i32,
    pub reload: f64,
    pub burst_count: u32,
    pub burst_reload: f64,
    pub inaccuracy: f64,
    /// Turret traverse per tick; zero for fixed guns
    pub turret_turn: f64,
    pub firing_energy: f64,
    pub firing_fuel: f64,
    pub firing_heat: f64,
    pub firing_force: f64,
    pub shield_damage: f64,
    pub hull_damage: f64,
    pub hit_force: f64,
    pub blast_radius: f64,
    pub trigger_radius: f64,
    /// 0 = unguided, 1..=4 increasingly smart
    pub homing: u8,
    pub turn: f64,
    pub acceleration: f64,
    pub drag: f64,
    pub split_range: f64,
    pub missile_strength: u32,
    pub anti_missile: u32,
    pub hardpoint_offset: f64,
    /// Outfit consumed per shot
    pub ammo: Option<String>,
    pub submunitions: Vec<(WeaponId, u32)>,
    pub fire_effects: Vec<(EffectId, u32)>,
    pub hit_effects: Vec<(EffectId, u32)>,
    pub die_effects: Vec<(EffectId, u32)>,
    /// (effect, period): one spawn on average every `period` ticks
    pub live_effects: Vec<(EffectId, u32)>,
}

impl Weapon {
    pub fn is_homing(&self) -> bool {
        self.homing > 0
    }

    pub fn is_anti_missile(&self) -> bool {
        self.anti_missile > 0
    }

    pub fn total_damage(&self) -> f64 {
        self.shield_damage + self.hull_damage
    }

    /// Effective burst size (a weapon with no burst setting fires singly)
    pub fn burst(&self) -> u32 {
        self.burst_count.max(1)
    }
}

/// A decorative particle template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTemplate {
    pub name: String,
    pub sprite: Option<SpriteId>,
    pub lifetime: i32,
    pub random_lifetime: i32,
    /// Fraction of the source velocity the effect inherits
    pub velocity_scale: f64,
    pub random_velocity: f64,
    pub random_angle: f64,
    pub random_spin: f64,
    /// Fade out over the last part of the lifetime
    pub fade: bool,
}

/// Per-chassis physical and energy characteristics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub category: ShipCategory,
    pub mass: f64,
    pub drag: f64,
    pub thrust: f64,
    pub reverse_thrust: f64,
    pub turn: f64,
    pub thrusting_energy: f64,
    pub thrusting_heat: f64,
    pub reverse_thrusting_energy: f64,
    pub reverse_thrusting_heat: f64,
    pub turning_energy: f64,
    pub turning_heat: f64,
    pub shields: f64,
    pub hull: f64,
    pub energy_capacity: f64,
    pub fuel_capacity: f64,
    pub shield_generation: f64,
    pub hull_repair_rate: f64,
    pub energy_generation: f64,
    pub heat_generation: f64,
    pub ramscoop: f64,
    pub cargo_space: u32,
    pub required_crew: u32,
    pub bunks: u32,
    pub fighter_bays: u32,
    /// Fuel burned per hyperspace jump
    pub jump_fuel: f64,
    /// Maximum speed at which the hyperdrive may engage
    pub jump_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipCategory {
    #[default]
    Ship,
    Fighter,
}

/// A weapon mount on a chassis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HardpointSpec {
    /// Offset from ship center in the ship's frame (facing = +x)
    pub point: DVec2,
    pub turret: bool,
    pub weapon: Option<WeaponId>,
}

/// Personality flags steering the AI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    /// Only attacks ships that target it
    pub timid: bool,
    /// Never leaves its system on its own
    pub staying: bool,
    /// Boards and strips disabled ships
    pub plunders: bool,
    /// Does not shoot disabled ships
    pub disables: bool,
}

/// A ship chassis with its default loadout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipModel {
    pub name: String,
    pub sprite: Option<SpriteId>,
    pub flare_sprite: Option<SpriteId>,
    /// Hull collision radius around the ship center
    pub radius: f64,
    pub attributes: Attributes,
    pub personality: Personality,
    pub engine_points: Vec<DVec2>,
    pub hardpoints: Vec<HardpointSpec>,
    /// Installed outfits and ammunition by name
    pub outfits: BTreeMap<String, i32>,
    /// Weighted explosion effects for the dying sequence
    pub explosion_effects: Vec<(EffectId, u32)>,
    /// Number of explosions in the final blast
    pub explosion_total: u32,
    /// Carried fighters created alongside this ship
    pub fighters: Vec<ModelId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
    pub name: String,
    pub has_spaceport: bool,
}

/// An astronomical body placed in a system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StellarObject {
    pub sprite: Option<SpriteId>,
    pub position: DVec2,
    pub radius: f64,
    pub is_star: bool,
    pub planet: Option<PlanetId>,
}

/// Asteroid belt descriptor used to seed a field on system entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidBelt {
    pub sprite: Option<SpriteId>,
    pub count: u32,
    pub energy: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StarSystem {
    pub name: String,
    /// Position on the galaxy map
    pub position: DVec2,
    pub links: Vec<SystemId>,
    pub objects: Vec<StellarObject>,
    pub asteroids: Vec<AsteroidBelt>,
}

/// The complete catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameData {
    pub sprites: Vec<Sprite>,
    pub governments: Vec<Government>,
    pub weapons: Vec<Weapon>,
    pub effects: Vec<EffectTemplate>,
    pub models: Vec<ShipModel>,
    pub planets: Vec<Planet>,
    pub systems: Vec<StarSystem>,
    pub player_government: GovernmentId,
    /// Weighted governments for incoming ships
    pub spawn_governments: Vec<(GovernmentId, u32)>,
    /// Archetypes the spawner draws from (empty = every non-fighter model)
    pub spawn_models: Vec<ModelId>,
    pub ship_names: Vec<String>,
    /// Cargo types spawned ships may carry
    pub commodities: Vec<String>,
}

impl Default for GovernmentId {
    fn default() -> Self {
        GovernmentId(0)
    }
}

impl GameData {
    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::Catalog)
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.index())
    }

    pub fn government(&self, id: GovernmentId) -> Option<&Government> {
        self.governments.get(id.index())
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Weapon> {
        self.weapons.get(id.index())
    }

    pub fn effect(&self, id: EffectId) -> Option<&EffectTemplate> {
        self.effects.get(id.index())
    }

    pub fn model(&self, id: ModelId) -> Option<&ShipModel> {
        self.models.get(id.index())
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.index())
    }

    pub fn system(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.get(id.index())
    }

    pub fn system_name(&self, id: SystemId) -> &str {
        self.system(id).map(|s| s.name.as_str()).unwrap_or("unknown system")
    }

    pub fn government_name(&self, id: GovernmentId) -> &str {
        self.government(id).map(|g| g.name.as_str()).unwrap_or("No Government")
    }

    /// A system is inhabited when any of its planets has a spaceport
    pub fn is_inhabited(&self, id: SystemId) -> bool {
        self.system(id).is_some_and(|system| {
            system
                .objects
                .iter()
                .filter_map(|o| o.planet)
                .filter_map(|p| self.planet(p))
                .any(|p| p.has_spaceport)
        })
    }

    /// Models the spawner may pick from
    pub fn spawnable_models(&self) -> Vec<ModelId> {
        if !self.spawn_models.is_empty() {
            return self.spawn_models.clone();
        }
        self.models
            .iter()
            .enumerate()
            .filter(|(_, m)| m.attributes.category != ShipCategory::Fighter)
            .map(|(i, _)| ModelId(i as u32))
            .collect()
    }
}
