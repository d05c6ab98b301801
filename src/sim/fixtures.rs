//! Small catalog shared by the simulation tests
//!
//! Two linked systems, three governments and a handful of ships and weapons
//! with round numbers so test expectations can be worked out by hand.

use std::sync::Arc;

use glam::DVec2;

use super::angle::Angle;
use super::data::{
    AsteroidBelt, Attributes, EffectId, EffectTemplate, GameData, Government, GovernmentId,
    HardpointSpec, ModelId, Personality, Planet, PlanetId, ShipCategory, ShipModel, Sprite,
    SpriteId, StarSystem, StellarObject, SystemId, Weapon, WeaponId,
};
use super::ship::ShipId;
use super::state::World;
use crate::settings::Settings;

pub const PLAYER: GovernmentId = GovernmentId(0);
pub const MERCHANT: GovernmentId = GovernmentId(1);
pub const PIRATE: GovernmentId = GovernmentId(2);

pub const BLASTER: WeaponId = WeaponId(0);
pub const HOMING: WeaponId = WeaponId(1);
pub const ROCKET: WeaponId = WeaponId(2);
pub const ANTI_MISSILE: WeaponId = WeaponId(3);
pub const BOMB: WeaponId = WeaponId(4);
pub const CLUSTER: WeaponId = WeaponId(5);

pub const BANG: EffectId = EffectId(0);
pub const SPARK: EffectId = EffectId(1);

pub const SHUTTLE: ModelId = ModelId(0);
pub const GUNBOAT: ModelId = ModelId(1);
pub const DRONE: ModelId = ModelId(2);
pub const PICKET: ModelId = ModelId(3);
pub const CARRIER: ModelId = ModelId(4);
pub const FIGHTER: ModelId = ModelId(5);

pub const HOME: SystemId = SystemId(0);
pub const AWAY: SystemId = SystemId(1);

const SHIP_SPRITE: SpriteId = SpriteId(0);
const PLANET_SPRITE: SpriteId = SpriteId(1);
const BOLT_SPRITE: SpriteId = SpriteId(2);
const FLARE_SPRITE: SpriteId = SpriteId(3);
const ROCK_SPRITE: SpriteId = SpriteId(4);

fn sprite(name: &str, size: f64) -> Sprite {
    Sprite {
        name: name.to_string(),
        width: size,
        height: size,
        ..Default::default()
    }
}

fn government(name: &str, attitudes: Vec<(GovernmentId, f64)>) -> Government {
    Government {
        name: name.to_string(),
        swizzle: 0,
        attitudes,
    }
}

fn weapons() -> Vec<Weapon> {
    let blaster = Weapon {
        name: "Blaster".into(),
        sprite: Some(BOLT_SPRITE),
        velocity: 10.0,
        lifetime: 40,
        reload: 10.0,
        shield_damage: 10.0,
        hull_damage: 10.0,
        ..Default::default()
    };
    let homing = Weapon {
        name: "Homing Missile".into(),
        sprite: Some(BOLT_SPRITE),
        velocity: 10.0,
        lifetime: 100,
        reload: 60.0,
        homing: 1,
        turn: 5.0,
        hull_damage: 100.0,
        hit_effects: vec![(BANG, 1)],
        ..Default::default()
    };
    let rocket = Weapon {
        name: "Rocket".into(),
        sprite: Some(BOLT_SPRITE),
        velocity: 10.0,
        lifetime: 120,
        reload: 60.0,
        hull_damage: 50.0,
        missile_strength: 1,
        ..Default::default()
    };
    let anti_missile = Weapon {
        name: "Anti-Missile Turret".into(),
        velocity: 100.0,
        reload: 5.0,
        turret_turn: 10.0,
        anti_missile: 1000,
        hit_effects: vec![(SPARK, 1)],
        ..Default::default()
    };
    let bomb = Weapon {
        name: "Bomb".into(),
        sprite: Some(BOLT_SPRITE),
        velocity: 10.0,
        lifetime: 100,
        reload: 30.0,
        blast_radius: 50.0,
        shield_damage: 20.0,
        hull_damage: 20.0,
        ..Default::default()
    };
    // Bursts into three blaster bolts after two ticks
    let cluster = Weapon {
        name: "Cluster Shell".into(),
        sprite: Some(BOLT_SPRITE),
        velocity: 10.0,
        lifetime: 2,
        reload: 60.0,
        submunitions: vec![(BLASTER, 3)],
        ..Default::default()
    };
    vec![blaster, homing, rocket, anti_missile, bomb, cluster]
}

fn effects() -> Vec<EffectTemplate> {
    vec![
        EffectTemplate {
            name: "bang".into(),
            lifetime: 5,
            ..Default::default()
        },
        EffectTemplate {
            name: "spark".into(),
            lifetime: 3,
            ..Default::default()
        },
    ]
}

/// Mid-sized ship with full tanks and no regeneration beyond energy
fn attributes() -> Attributes {
    Attributes {
        mass: 100.0,
        drag: 1.0,
        thrust: 20.0,
        reverse_thrust: 0.0,
        turn: 500.0,
        shields: 100.0,
        hull: 100.0,
        energy_capacity: 100.0,
        energy_generation: 1.0,
        fuel_capacity: 300.0,
        jump_fuel: 100.0,
        cargo_space: 20,
        ..Default::default()
    }
}

fn gun(weapon: WeaponId, turret: bool) -> HardpointSpec {
    HardpointSpec {
        point: DVec2::ZERO,
        turret,
        weapon: Some(weapon),
    }
}

fn model(name: &str) -> ShipModel {
    ShipModel {
        name: name.to_string(),
        sprite: Some(SHIP_SPRITE),
        flare_sprite: Some(FLARE_SPRITE),
        radius: 10.0,
        attributes: attributes(),
        ..Default::default()
    }
}

fn models() -> Vec<ShipModel> {
    let shuttle = ShipModel {
        hardpoints: vec![gun(BLASTER, false)],
        ..model("Shuttle")
    };
    let gunboat = ShipModel {
        hardpoints: vec![gun(BLASTER, false)],
        ..model("Gunboat")
    };
    // Targets that never move or leave
    let stationary = Attributes {
        thrust: 0.0,
        turn: 0.0,
        shields: 50.0,
        ..attributes()
    };
    let staying = Personality {
        staying: true,
        ..Default::default()
    };
    let drone = ShipModel {
        attributes: stationary.clone(),
        personality: staying,
        ..model("Drone")
    };
    let picket = ShipModel {
        attributes: stationary,
        personality: staying,
        hardpoints: vec![gun(ANTI_MISSILE, true)],
        ..model("Picket")
    };
    let carrier = ShipModel {
        attributes: Attributes {
            fighter_bays: 2,
            ..attributes()
        },
        fighters: vec![FIGHTER, FIGHTER],
        ..model("Carrier")
    };
    let fighter = ShipModel {
        radius: 5.0,
        attributes: Attributes {
            category: ShipCategory::Fighter,
            mass: 20.0,
            fuel_capacity: 0.0,
            jump_fuel: 0.0,
            cargo_space: 0,
            ..attributes()
        },
        hardpoints: vec![gun(BLASTER, false)],
        ..model("Fighter")
    };
    vec![shuttle, gunboat, drone, picket, carrier, fighter]
}

fn planet(name: &str, has_spaceport: bool) -> Planet {
    Planet {
        name: name.to_string(),
        has_spaceport,
    }
}

fn body(position: DVec2, radius: f64, planet: Option<PlanetId>) -> StellarObject {
    StellarObject {
        sprite: Some(PLANET_SPRITE),
        position,
        radius,
        is_star: planet.is_none(),
        planet,
    }
}

fn systems() -> Vec<StarSystem> {
    let home = StarSystem {
        name: "Home".into(),
        position: DVec2::ZERO,
        links: vec![AWAY],
        objects: vec![
            body(DVec2::ZERO, 100.0, None),
            body(DVec2::new(1000.0, 0.0), 100.0, Some(PlanetId(0))),
            body(DVec2::new(200.0, 200.0), 50.0, Some(PlanetId(1))),
        ],
        asteroids: Vec::new(),
    };
    let away = StarSystem {
        name: "Away".into(),
        position: DVec2::new(100.0, 0.0),
        links: vec![HOME],
        objects: vec![body(DVec2::new(500.0, 0.0), 80.0, Some(PlanetId(2)))],
        asteroids: vec![AsteroidBelt {
            sprite: Some(ROCK_SPRITE),
            count: 5,
            energy: 1.0,
        }],
    };
    vec![home, away]
}

pub fn data() -> GameData {
    GameData {
        sprites: vec![
            sprite("ship", 20.0),
            sprite("planet", 200.0),
            sprite("bolt", 4.0),
            sprite("flare", 8.0),
            sprite("asteroid", 20.0),
        ],
        governments: vec![
            government("Player", vec![(MERCHANT, 0.5), (PIRATE, -1.0)]),
            government("Merchant", vec![(PLAYER, 0.5)]),
            government("Pirate", vec![(PLAYER, -1.0), (MERCHANT, -1.0)]),
        ],
        weapons: weapons(),
        effects: effects(),
        models: models(),
        planets: vec![
            planet("Earth", true),
            planet("Moon", false),
            planet("Outpost", false),
        ],
        systems: systems(),
        player_government: PLAYER,
        spawn_governments: vec![(MERCHANT, 1), (PIRATE, 1)],
        spawn_models: vec![GUNBOAT],
        ship_names: vec!["Wanderer".into()],
        commodities: vec!["Food".into()],
    }
}

/// A world with no spawning and nobody in it
pub fn world() -> World {
    let settings = Settings {
        spawn_period: 0,
        ..Default::default()
    };
    World::new(Arc::new(data()), &settings)
}

pub fn place_player(world: &mut World, position: DVec2) -> ShipId {
    world
        .place_player(SHUTTLE, "Falcon", HOME, position)
        .expect("fixture flagship")
}

/// Add a ship named after its government and model to the home system
pub fn add(world: &mut World, model: ModelId, government: GovernmentId, position: DVec2) -> ShipId {
    let name = format!(
        "{} {}",
        world.data.government_name(government),
        world.data.models[model.index()].name
    );
    world
        .add_ship(model, government, name, HOME, position, Angle::default())
        .expect("fixture model")
}
