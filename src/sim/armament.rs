//! Weapon firing: guns, turrets and anti-missile systems

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::angle::Angle;
use super::collision::rendezvous_time;
use super::data::{GameData, Weapon};
use super::effect::{self, Effect};
use super::projectile::{Projectile, TargetView};
use super::ship::Ship;

/// Room for ammo, energy and fuel to fire `weapon` once
pub fn can_fire(ship: &Ship, weapon: &Weapon) -> bool {
    if let Some(ammo) = &weapon.ammo
        && ship.outfit_count(ammo) <= 0
    {
        return false;
    }
    ship.energy >= weapon.firing_energy && ship.fuel >= weapon.firing_fuel
}

/// Pay for one shot and apply its kick
fn expend(ship: &mut Ship, weapon: &Weapon, aim: Angle) {
    if weapon.firing_force != 0.0 {
        ship.apply_force(aim.unit() * -weapon.firing_force);
    }
    if let Some(ammo) = &weapon.ammo
        && let Some(count) = ship.outfits.get_mut(ammo)
    {
        *count -= 1;
    }
    ship.energy -= weapon.firing_energy;
    ship.fuel -= weapon.firing_fuel;
    ship.heat += weapon.firing_heat;
}

/// Where a shot from `start` must be aimed to meet the target
pub fn intercept_point(start: DVec2, shooter_velocity: DVec2, speed: f64, target: TargetView) -> DVec2 {
    let offset = target.position - start;
    let relative = target.velocity - shooter_velocity;
    match rendezvous_time(offset, relative, speed) {
        Some(t) => target.position + relative * t,
        None => target.position,
    }
}

/// Rotate every turret toward the target, limited by its traverse rate
pub fn aim_turrets(ship: &mut Ship, data: &GameData, target: Option<TargetView>) {
    let (position, velocity, facing) = (ship.position, ship.velocity, ship.facing);
    for hardpoint in ship.hardpoints.iter_mut().filter(|h| h.turret) {
        let Some(weapon) = hardpoint.weapon.and_then(|id| data.weapon(id)) else {
            continue;
        };
        let start = position + facing.rotate(hardpoint.point);
        let desired = match target {
            Some(target) => {
                let point = intercept_point(start, velocity, weapon.velocity, target);
                Angle::from_vector(point - start) - facing
            }
            // Idle turrets point outward
            None => Angle::from_vector(hardpoint.point),
        };
        let delta = (desired - hardpoint.angle).degrees();
        let step = weapon.turret_turn.max(0.0);
        hardpoint.angle += Angle::new(delta.clamp(-step, step));
    }
}

/// Fire every hardpoint selected in the ship's command register
///
/// Anti-missile hardpoints never fire here; the return value says whether
/// the ship has one ready so the collision pass can offer it missiles.
#[allow(clippy::too_many_arguments)]
pub fn fire(
    ship: &mut Ship,
    data: &GameData,
    target: Option<TargetView>,
    rng: &mut Pcg32,
    fx_rng: &mut Pcg32,
    projectiles: &mut Vec<Projectile>,
    effects: &mut Vec<Effect>,
    next_id: &mut u32,
) -> bool {
    if ship.zoom < 1.0 || ship.is_disabled || ship.is_hyperspacing() || ship.is_destroyed() {
        return false;
    }
    aim_turrets(ship, data, target);

    let mut has_anti_missile = false;
    for index in 0..ship.hardpoints.len() {
        let Some(weapon_id) = ship.hardpoints[index].weapon else {
            continue;
        };
        let Some(weapon) = data.weapon(weapon_id) else {
            log::trace!("Hardpoint {index} on ship {} has a missing weapon", ship.id.0);
            continue;
        };
        if !ship.hardpoints[index].is_ready() || !can_fire(ship, weapon) {
            continue;
        }
        if weapon.is_anti_missile() {
            has_anti_missile = true;
            continue;
        }
        let wants_fire =
            ship.command.fires(index) || ship.command.secondary == Some(index);
        if !wants_fire {
            continue;
        }

        let hardpoint = &ship.hardpoints[index];
        let aim = ship.facing + hardpoint.angle;
        let start = ship.position
            + ship.facing.rotate(hardpoint.point)
            + aim.unit() * weapon.hardpoint_offset;

        *next_id += 1;
        let projectile = Projectile::new(
            *next_id,
            weapon_id,
            weapon,
            ship.government,
            ship.target,
            start,
            aim,
            ship.velocity,
            rng,
        );
        projectiles.push(projectile);
        effect::emit(effects, data, &weapon.fire_effects, start, ship.velocity, aim, fx_rng);

        ship.hardpoints[index].mark_fired(weapon);
        expend(ship, weapon, aim);
    }

    for hardpoint in &mut ship.hardpoints {
        if let Some(weapon) = hardpoint.weapon.and_then(|id| data.weapon(id)) {
            hardpoint.step(weapon);
        }
    }
    has_anti_missile
}

/// Offer a missile to the ship's anti-missile systems
///
/// Returns true if one of them destroyed it. Only the first hardpoint that
/// gets a shot off matters.
pub fn fire_anti_missile(
    ship: &mut Ship,
    data: &GameData,
    missile: &Projectile,
    rng: &mut Pcg32,
    fx_rng: &mut Pcg32,
    effects: &mut Vec<Effect>,
) -> bool {
    if ship.zoom < 1.0 || ship.is_disabled || ship.is_destroyed() {
        return false;
    }
    for index in 0..ship.hardpoints.len() {
        let Some(weapon) = ship.hardpoints[index].weapon.and_then(|id| data.weapon(id)) else {
            continue;
        };
        let strength = weapon.anti_missile;
        if strength == 0 || !ship.hardpoints[index].is_ready() || !can_fire(ship, weapon) {
            continue;
        }

        // Anti-missile shots last a single tick, so range equals velocity
        let range = weapon.velocity;
        let start = ship.position + ship.facing.rotate(ship.hardpoints[index].point);
        let offset = missile.position - start;
        if offset.length() > range {
            continue;
        }

        let aim = Angle::from_vector(offset);
        ship.hardpoints[index].angle = aim - ship.facing;
        let start = start + aim.unit() * weapon.hardpoint_offset;
        effect::emit(effects, data, &weapon.fire_effects, start, ship.velocity, aim, fx_rng);
        effect::emit(
            effects,
            data,
            &weapon.hit_effects,
            start + aim.unit() * (0.5 * range),
            ship.velocity,
            aim,
            fx_rng,
        );
        effect::emit(effects, data, &weapon.die_effects, missile.position, missile.velocity, aim, fx_rng);

        ship.hardpoints[index].mark_fired(weapon);
        expend(ship, weapon, aim);

        return rng.random_range(0..strength) > rng.random_range(0..missile.missile_strength.max(1));
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::data::{
        Attributes, EffectId, EffectTemplate, GovernmentId, HardpointSpec, ModelId, ShipModel,
        SystemId, WeaponId,
    };
    use crate::sim::ship::ShipId;
    use rand::SeedableRng;

    fn data() -> GameData {
        GameData {
            effects: vec![EffectTemplate {
                name: "flash".into(),
                lifetime: 2,
                ..Default::default()
            }],
            weapons: vec![
                Weapon {
                    name: "blaster".into(),
                    velocity: 20.0,
                    lifetime: 30,
                    reload: 10.0,
                    firing_energy: 5.0,
                    firing_heat: 2.0,
                    hull_damage: 10.0,
                    fire_effects: vec![(EffectId(0), 1)],
                    ..Default::default()
                },
                Weapon {
                    name: "anti-missile".into(),
                    velocity: 100.0,
                    reload: 5.0,
                    anti_missile: 1000,
                    hit_effects: vec![(EffectId(0), 1)],
                    ..Default::default()
                },
                Weapon {
                    name: "rocket".into(),
                    velocity: 8.0,
                    lifetime: 60,
                    missile_strength: 1,
                    ammo: Some("rocket".into()),
                    ..Default::default()
                },
            ],
            models: vec![ShipModel {
                name: "Gunboat".into(),
                radius: 10.0,
                attributes: Attributes {
                    mass: 100.0,
                    drag: 1.0,
                    thrust: 10.0,
                    hull: 100.0,
                    energy_capacity: 100.0,
                    ..Default::default()
                },
                hardpoints: vec![
                    HardpointSpec {
                        point: DVec2::ZERO,
                        turret: false,
                        weapon: Some(WeaponId(0)),
                    },
                    HardpointSpec {
                        point: DVec2::ZERO,
                        turret: true,
                        weapon: Some(WeaponId(1)),
                    },
                    HardpointSpec {
                        point: DVec2::ZERO,
                        turret: false,
                        weapon: Some(WeaponId(2)),
                    },
                ],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn gunboat(data: &GameData) -> Ship {
        let mut ship = Ship::from_model(ShipId(1), ModelId(0), &data.models[0], data, "Gunboat", GovernmentId(0));
        ship.place(SystemId(0), DVec2::ZERO, Angle::default());
        ship
    }

    #[test]
    fn test_fire_costs_and_reload() {
        let data = data();
        let mut ship = gunboat(&data);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fx = Pcg32::seed_from_u64(2);
        let (mut projectiles, mut effects, mut next_id) = (Vec::new(), Vec::new(), 0);
        ship.command.set_fire(0);

        let anti = fire(&mut ship, &data, None, &mut rng, &mut fx, &mut projectiles, &mut effects, &mut next_id);
        assert!(anti);
        assert_eq!(projectiles.len(), 1);
        assert_eq!(effects.len(), 1);
        assert_eq!(ship.energy, 95.0);
        assert_eq!(ship.heat, 2.0);
        assert_eq!(projectiles[0].velocity, DVec2::new(20.0, 0.0));

        // Reloading
        fire(&mut ship, &data, None, &mut rng, &mut fx, &mut projectiles, &mut effects, &mut next_id);
        assert_eq!(projectiles.len(), 1);
        for _ in 0..10 {
            fire(&mut ship, &data, None, &mut rng, &mut fx, &mut projectiles, &mut effects, &mut next_id);
        }
        assert_eq!(projectiles.len(), 2);
    }

    #[test]
    fn test_ammo_required() {
        let data = data();
        let mut ship = gunboat(&data);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fx = Pcg32::seed_from_u64(2);
        let (mut projectiles, mut effects, mut next_id) = (Vec::new(), Vec::new(), 0);
        ship.command.set_fire(2);
        fire(&mut ship, &data, None, &mut rng, &mut fx, &mut projectiles, &mut effects, &mut next_id);
        assert!(projectiles.is_empty());

        ship.outfits.insert("rocket".into(), 1);
        fire(&mut ship, &data, None, &mut rng, &mut fx, &mut projectiles, &mut effects, &mut next_id);
        assert_eq!(projectiles.len(), 1);
        assert_eq!(ship.outfit_count("rocket"), 0);
    }

    #[test]
    fn test_anti_missile_range_and_kill() {
        let data = data();
        let mut ship = gunboat(&data);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fx = Pcg32::seed_from_u64(2);
        let mut effects = Vec::new();
        let far = Projectile::new(
            1,
            WeaponId(2),
            &data.weapons[2],
            GovernmentId(1),
            None,
            DVec2::new(500.0, 0.0),
            Angle::new(180.0),
            DVec2::ZERO,
            &mut rng,
        );
        assert!(!fire_anti_missile(&mut ship, &data, &far, &mut rng, &mut fx, &mut effects));
        assert!(effects.is_empty());

        let near = Projectile {
            position: DVec2::new(50.0, 0.0),
            ..far
        };
        fire_anti_missile(&mut ship, &data, &near, &mut rng, &mut fx, &mut effects);
        assert_eq!(effects.len(), 1);
        assert!(ship.hardpoints[1].reload > 0.0);
        // Reloading now
        assert!(!fire_anti_missile(&mut ship, &data, &near, &mut rng, &mut fx, &mut effects));
    }

    #[test]
    fn test_turret_tracks_target() {
        let data = data();
        let mut ship = gunboat(&data);
        let target = TargetView {
            position: DVec2::new(0.0, 100.0),
            velocity: DVec2::ZERO,
        };
        aim_turrets(&mut ship, &data, Some(target));
        // Zero traverse rate: stays put
        assert_eq!(ship.hardpoints[1].angle.degrees(), 0.0);
    }
}
