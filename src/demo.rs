//! Built-in demo catalog
//!
//! A handful of linked systems with traders, pirates and a carrier group so
//! the headless runner has something to simulate without loading assets.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::DVec2;

use crate::error::EngineError;
use crate::settings::Settings;
use crate::sim::data::{
    AsteroidBelt, Attributes, EffectId, EffectTemplate, GameData, Government, GovernmentId,
    HardpointSpec, ModelId, Personality, Planet, PlanetId, ShipCategory, ShipModel, Sprite,
    SpriteId, StarSystem, StellarObject, SystemId, Weapon, WeaponId,
};
use crate::sim::state::World;

pub const REPUBLIC: GovernmentId = GovernmentId(0);
pub const MERCHANT: GovernmentId = GovernmentId(1);
pub const PIRATE: GovernmentId = GovernmentId(2);

pub const SHUTTLE: ModelId = ModelId(0);
pub const FREIGHTER: ModelId = ModelId(1);
pub const CORVETTE: ModelId = ModelId(2);
pub const CARRIER: ModelId = ModelId(3);
pub const FIGHTER: ModelId = ModelId(4);

pub const SOL: SystemId = SystemId(0);
pub const ALPHA_CENTAURI: SystemId = SystemId(1);
pub const BARNARD: SystemId = SystemId(2);
pub const WOLF_359: SystemId = SystemId(3);

const LASER: WeaponId = WeaponId(0);
const MISSILE: WeaponId = WeaponId(1);
const ANTI_MISSILE: WeaponId = WeaponId(2);
const FLAK: WeaponId = WeaponId(3);
const CLUSTER: WeaponId = WeaponId(4);
const SHARD: WeaponId = WeaponId(5);

const EXPLOSION: EffectId = EffectId(0);
const SPARK: EffectId = EffectId(1);
const SMOKE: EffectId = EffectId(2);

mod sprites {
    use super::SpriteId;

    pub const SHUTTLE: SpriteId = SpriteId(0);
    pub const FREIGHTER: SpriteId = SpriteId(1);
    pub const CORVETTE: SpriteId = SpriteId(2);
    pub const CARRIER: SpriteId = SpriteId(3);
    pub const FIGHTER: SpriteId = SpriteId(4);
    pub const FLARE: SpriteId = SpriteId(5);
    pub const STAR: SpriteId = SpriteId(6);
    pub const PLANET: SpriteId = SpriteId(7);
    pub const ASTEROID: SpriteId = SpriteId(8);
    pub const LASER: SpriteId = SpriteId(9);
    pub const MISSILE: SpriteId = SpriteId(10);
    pub const EXPLOSION: SpriteId = SpriteId(11);
    pub const SPARK: SpriteId = SpriteId(12);
}

fn sprite(name: &str, width: f64, height: f64, frames: u32, frame_rate: f64) -> Sprite {
    Sprite {
        name: name.to_string(),
        width,
        height,
        frames,
        frame_rate,
    }
}

fn sprite_table() -> Vec<Sprite> {
    vec![
        sprite("ship/shuttle", 40.0, 40.0, 1, 0.0),
        sprite("ship/freighter", 70.0, 50.0, 1, 0.0),
        sprite("ship/corvette", 50.0, 40.0, 1, 0.0),
        sprite("ship/carrier", 120.0, 80.0, 1, 0.0),
        sprite("ship/fighter", 20.0, 20.0, 1, 0.0),
        sprite("effect/flare", 16.0, 16.0, 4, 0.5),
        sprite("star/g-dwarf", 300.0, 300.0, 8, 0.05),
        sprite("planet/rock", 150.0, 150.0, 1, 0.0),
        sprite("asteroid/small", 30.0, 30.0, 16, 0.1),
        sprite("projectile/laser", 6.0, 2.0, 1, 0.0),
        sprite("projectile/missile", 10.0, 4.0, 2, 0.5),
        sprite("effect/explosion", 40.0, 40.0, 6, 0.4),
        sprite("effect/spark", 8.0, 8.0, 3, 0.5),
    ]
}

fn weapon_table() -> Vec<Weapon> {
    let laser = Weapon {
        name: "Laser".into(),
        sprite: Some(sprites::LASER),
        velocity: 20.0,
        lifetime: 30,
        reload: 8.0,
        inaccuracy: 1.0,
        firing_energy: 5.0,
        firing_heat: 8.0,
        shield_damage: 6.0,
        hull_damage: 4.0,
        hit_effects: vec![(SPARK, 1)],
        ..Default::default()
    };
    let missile = Weapon {
        name: "Missile".into(),
        sprite: Some(sprites::MISSILE),
        velocity: 12.0,
        lifetime: 120,
        reload: 60.0,
        homing: 3,
        turn: 4.0,
        firing_heat: 10.0,
        shield_damage: 20.0,
        hull_damage: 30.0,
        hit_force: 40.0,
        missile_strength: 10,
        ammo: Some("Missile".into()),
        hit_effects: vec![(EXPLOSION, 1)],
        die_effects: vec![(SMOKE, 2)],
        live_effects: vec![(SMOKE, 4)],
        ..Default::default()
    };
    let anti_missile = Weapon {
        name: "Anti-Missile Turret".into(),
        velocity: 150.0,
        reload: 10.0,
        turret_turn: 20.0,
        firing_energy: 3.0,
        anti_missile: 20,
        hit_effects: vec![(SPARK, 1)],
        ..Default::default()
    };
    let flak = Weapon {
        name: "Flak Turret".into(),
        sprite: Some(sprites::LASER),
        velocity: 14.0,
        random_velocity: 2.0,
        lifetime: 40,
        random_lifetime: 10,
        reload: 20.0,
        inaccuracy: 3.0,
        turret_turn: 4.0,
        firing_energy: 4.0,
        firing_heat: 6.0,
        shield_damage: 10.0,
        hull_damage: 10.0,
        blast_radius: 30.0,
        trigger_radius: 10.0,
        die_effects: vec![(EXPLOSION, 1)],
        ..Default::default()
    };
    let cluster = Weapon {
        name: "Cluster Rocket".into(),
        sprite: Some(sprites::MISSILE),
        velocity: 10.0,
        lifetime: 40,
        reload: 90.0,
        firing_force: 20.0,
        split_range: 100.0,
        missile_strength: 4,
        ammo: Some("Cluster Rocket".into()),
        submunitions: vec![(SHARD, 6)],
        ..Default::default()
    };
    let shard = Weapon {
        name: "Cluster Shard".into(),
        sprite: Some(sprites::LASER),
        velocity: 10.0,
        lifetime: 20,
        inaccuracy: 30.0,
        shield_damage: 5.0,
        hull_damage: 5.0,
        ..Default::default()
    };
    vec![laser, missile, anti_missile, flak, cluster, shard]
}

fn effect_table() -> Vec<EffectTemplate> {
    vec![
        EffectTemplate {
            name: "explosion".into(),
            sprite: Some(sprites::EXPLOSION),
            lifetime: 15,
            random_lifetime: 5,
            velocity_scale: 0.5,
            random_velocity: 1.0,
            random_angle: 360.0,
            random_spin: 5.0,
            fade: true,
        },
        EffectTemplate {
            name: "spark".into(),
            sprite: Some(sprites::SPARK),
            lifetime: 6,
            random_velocity: 2.0,
            random_angle: 360.0,
            ..Default::default()
        },
        EffectTemplate {
            name: "smoke".into(),
            sprite: Some(sprites::EXPLOSION),
            lifetime: 20,
            velocity_scale: 0.2,
            random_velocity: 0.3,
            fade: true,
            ..Default::default()
        },
    ]
}

fn hardpoint(x: f64, y: f64, weapon: WeaponId, turret: bool) -> HardpointSpec {
    HardpointSpec {
        point: DVec2::new(x, y),
        turret,
        weapon: Some(weapon),
    }
}

fn model_table() -> Vec<ShipModel> {
    let explosions = vec![(EXPLOSION, 3), (SPARK, 1)];

    let shuttle = ShipModel {
        name: "Shuttle".into(),
        sprite: Some(sprites::SHUTTLE),
        flare_sprite: Some(sprites::FLARE),
        radius: 18.0,
        attributes: Attributes {
            mass: 70.0,
            drag: 0.7,
            thrust: 14.0,
            reverse_thrust: 6.0,
            turn: 800.0,
            thrusting_energy: 0.5,
            thrusting_heat: 0.5,
            reverse_thrusting_energy: 0.3,
            reverse_thrusting_heat: 0.3,
            turning_energy: 0.3,
            turning_heat: 0.2,
            shields: 500.0,
            hull: 400.0,
            energy_capacity: 600.0,
            fuel_capacity: 400.0,
            shield_generation: 0.6,
            hull_repair_rate: 0.2,
            energy_generation: 6.0,
            heat_generation: 1.0,
            ramscoop: 0.05,
            cargo_space: 20,
            required_crew: 1,
            bunks: 4,
            jump_fuel: 100.0,
            jump_speed: 0.2,
            ..Default::default()
        },
        engine_points: vec![DVec2::new(-18.0, 0.0)],
        hardpoints: vec![
            hardpoint(10.0, -6.0, LASER, false),
            hardpoint(10.0, 6.0, LASER, false),
            hardpoint(0.0, 0.0, MISSILE, false),
            hardpoint(-6.0, 0.0, ANTI_MISSILE, true),
        ],
        outfits: BTreeMap::from([("Missile".to_string(), 20)]),
        explosion_effects: explosions.clone(),
        explosion_total: 8,
        ..Default::default()
    };

    let freighter = ShipModel {
        name: "Freighter".into(),
        sprite: Some(sprites::FREIGHTER),
        flare_sprite: Some(sprites::FLARE),
        radius: 30.0,
        attributes: Attributes {
            mass: 200.0,
            drag: 2.0,
            thrust: 40.0,
            turn: 1200.0,
            thrusting_energy: 1.0,
            thrusting_heat: 1.0,
            turning_energy: 0.5,
            turning_heat: 0.3,
            shields: 600.0,
            hull: 900.0,
            energy_capacity: 800.0,
            fuel_capacity: 500.0,
            shield_generation: 0.4,
            hull_repair_rate: 0.1,
            energy_generation: 5.0,
            heat_generation: 2.0,
            cargo_space: 120,
            required_crew: 3,
            bunks: 5,
            jump_fuel: 100.0,
            ..Default::default()
        },
        personality: Personality {
            timid: true,
            ..Default::default()
        },
        engine_points: vec![DVec2::new(-32.0, -8.0), DVec2::new(-32.0, 8.0)],
        hardpoints: vec![hardpoint(0.0, 0.0, FLAK, true)],
        explosion_effects: explosions.clone(),
        explosion_total: 14,
        ..Default::default()
    };

    let corvette = ShipModel {
        name: "Corvette".into(),
        sprite: Some(sprites::CORVETTE),
        flare_sprite: Some(sprites::FLARE),
        radius: 22.0,
        attributes: Attributes {
            mass: 100.0,
            drag: 1.0,
            thrust: 28.0,
            reverse_thrust: 12.0,
            turn: 1000.0,
            thrusting_energy: 0.8,
            thrusting_heat: 0.8,
            reverse_thrusting_energy: 0.5,
            reverse_thrusting_heat: 0.5,
            turning_energy: 0.4,
            turning_heat: 0.3,
            shields: 700.0,
            hull: 500.0,
            energy_capacity: 700.0,
            fuel_capacity: 300.0,
            shield_generation: 0.8,
            hull_repair_rate: 0.2,
            energy_generation: 8.0,
            heat_generation: 1.5,
            cargo_space: 30,
            required_crew: 4,
            bunks: 6,
            jump_fuel: 100.0,
            ..Default::default()
        },
        personality: Personality {
            plunders: true,
            disables: true,
            ..Default::default()
        },
        engine_points: vec![DVec2::new(-22.0, 0.0)],
        hardpoints: vec![
            hardpoint(14.0, -8.0, LASER, false),
            hardpoint(14.0, 8.0, LASER, false),
            hardpoint(0.0, 0.0, CLUSTER, false),
        ],
        outfits: BTreeMap::from([("Cluster Rocket".to_string(), 6)]),
        explosion_effects: explosions.clone(),
        explosion_total: 10,
        ..Default::default()
    };

    let carrier = ShipModel {
        name: "Carrier".into(),
        sprite: Some(sprites::CARRIER),
        flare_sprite: Some(sprites::FLARE),
        radius: 55.0,
        attributes: Attributes {
            mass: 400.0,
            drag: 4.0,
            thrust: 100.0,
            turn: 2400.0,
            thrusting_energy: 2.0,
            thrusting_heat: 2.0,
            turning_energy: 1.0,
            turning_heat: 1.0,
            shields: 2000.0,
            hull: 2500.0,
            energy_capacity: 1500.0,
            fuel_capacity: 600.0,
            shield_generation: 1.5,
            hull_repair_rate: 0.5,
            energy_generation: 14.0,
            heat_generation: 4.0,
            cargo_space: 60,
            required_crew: 20,
            bunks: 30,
            fighter_bays: 2,
            jump_fuel: 100.0,
            ..Default::default()
        },
        engine_points: vec![DVec2::new(-58.0, -20.0), DVec2::new(-58.0, 20.0)],
        hardpoints: vec![
            hardpoint(30.0, -20.0, FLAK, true),
            hardpoint(30.0, 20.0, FLAK, true),
            hardpoint(0.0, 0.0, ANTI_MISSILE, true),
        ],
        explosion_effects: explosions.clone(),
        explosion_total: 24,
        fighters: vec![FIGHTER, FIGHTER],
        ..Default::default()
    };

    let fighter = ShipModel {
        name: "Fighter".into(),
        sprite: Some(sprites::FIGHTER),
        flare_sprite: Some(sprites::FLARE),
        radius: 9.0,
        attributes: Attributes {
            category: ShipCategory::Fighter,
            mass: 20.0,
            drag: 0.3,
            thrust: 6.0,
            turn: 300.0,
            thrusting_energy: 0.3,
            thrusting_heat: 0.2,
            turning_energy: 0.1,
            turning_heat: 0.1,
            shields: 150.0,
            hull: 100.0,
            energy_capacity: 200.0,
            shield_generation: 0.2,
            energy_generation: 3.0,
            heat_generation: 0.5,
            ..Default::default()
        },
        engine_points: vec![DVec2::new(-9.0, 0.0)],
        hardpoints: vec![hardpoint(6.0, 0.0, LASER, false)],
        explosion_effects: explosions,
        explosion_total: 4,
        ..Default::default()
    };

    vec![shuttle, freighter, corvette, carrier, fighter]
}

fn star(radius: f64) -> StellarObject {
    StellarObject {
        sprite: Some(sprites::STAR),
        position: DVec2::ZERO,
        radius,
        is_star: true,
        planet: None,
    }
}

fn world_at(x: f64, y: f64, radius: f64, planet: PlanetId) -> StellarObject {
    StellarObject {
        sprite: Some(sprites::PLANET),
        position: DVec2::new(x, y),
        radius,
        is_star: false,
        planet: Some(planet),
    }
}

fn belt(count: u32) -> AsteroidBelt {
    AsteroidBelt {
        sprite: Some(sprites::ASTEROID),
        count,
        energy: 1.5,
    }
}

fn system_table() -> Vec<StarSystem> {
    vec![
        StarSystem {
            name: "Sol".into(),
            position: DVec2::ZERO,
            links: vec![ALPHA_CENTAURI, BARNARD],
            objects: vec![
                star(150.0),
                world_at(600.0, 0.0, 120.0, PlanetId(0)),
                world_at(900.0, 300.0, 40.0, PlanetId(1)),
            ],
            asteroids: vec![belt(20)],
        },
        StarSystem {
            name: "Alpha Centauri".into(),
            position: DVec2::new(-60.0, 40.0),
            links: vec![SOL, BARNARD],
            objects: vec![star(180.0), world_at(-500.0, 300.0, 100.0, PlanetId(2))],
            asteroids: Vec::new(),
        },
        StarSystem {
            name: "Barnard's Star".into(),
            position: DVec2::new(40.0, 70.0),
            links: vec![SOL, ALPHA_CENTAURI, WOLF_359],
            objects: vec![star(90.0), world_at(350.0, -400.0, 80.0, PlanetId(3))],
            asteroids: vec![belt(10)],
        },
        StarSystem {
            name: "Wolf 359".into(),
            position: DVec2::new(120.0, 20.0),
            links: vec![BARNARD],
            objects: vec![star(70.0)],
            asteroids: vec![belt(40)],
        },
    ]
}

/// The demo catalog
pub fn galaxy() -> GameData {
    let government = |name: &str, attitudes: Vec<(GovernmentId, f64)>| Government {
        name: name.to_string(),
        swizzle: 0,
        attitudes,
    };
    let planet = |name: &str, has_spaceport: bool| Planet {
        name: name.to_string(),
        has_spaceport,
    };

    GameData {
        sprites: sprite_table(),
        governments: vec![
            government("Republic", vec![(MERCHANT, 0.5), (PIRATE, -1.0)]),
            Government {
                swizzle: 4,
                ..government("Merchant", vec![(REPUBLIC, 0.5)])
            },
            Government {
                swizzle: 2,
                ..government("Pirate", vec![(REPUBLIC, -1.0), (MERCHANT, -1.0)])
            },
        ],
        weapons: weapon_table(),
        effects: effect_table(),
        models: model_table(),
        planets: vec![
            planet("Earth", true),
            planet("Luna", false),
            planet("New Boston", true),
            planet("Rust", false),
        ],
        systems: system_table(),
        player_government: REPUBLIC,
        spawn_governments: vec![(MERCHANT, 3), (PIRATE, 1)],
        spawn_models: vec![FREIGHTER, CORVETTE, CARRIER],
        ship_names: ["Argosy", "Bright Horizon", "Cormorant", "Dust Devil", "Esperance", "Fair Wind"]
            .into_iter()
            .map(String::from)
            .collect(),
        commodities: ["Food", "Metal", "Medical", "Electronics"]
            .into_iter()
            .map(String::from)
            .collect(),
    }
}

/// A demo world with the player's shuttle and one escort near Earth
pub fn world(settings: &Settings) -> Result<World, EngineError> {
    let mut world = World::new(Arc::new(galaxy()), settings);
    world.place_player(SHUTTLE, "Pathfinder", SOL, DVec2::new(400.0, 200.0))?;
    world.add_ship(
        CORVETTE,
        REPUBLIC,
        "Wayfarer",
        SOL,
        DVec2::new(300.0, 260.0),
        Default::default(),
    );
    world.credits = 25_000;
    Ok(world)
}
