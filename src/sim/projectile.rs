//! Projectiles: flight, homing, expiry and sub-munitions

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::angle::Angle;
use super::data::{GameData, GovernmentId, Weapon, WeaponId};
use super::effect::{self, Effect};
use super::ship::ShipId;
use crate::scene::draw::{DrawList, DrawSource, Placement};

/// What a projectile knows about its target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub position: DVec2,
    pub velocity: DVec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub weapon: WeaponId,
    pub government: GovernmentId,
    pub target: Option<ShipId>,
    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: Angle,
    /// Ticks left; the projectile expires when this reaches zero
    pub lifetime: i32,
    /// Ticks since launch
    pub age: u32,
    pub missile_strength: u32,
}

impl Projectile {
    /// Launch a projectile from `start` along `aim`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        weapon_id: WeaponId,
        weapon: &Weapon,
        government: GovernmentId,
        target: Option<ShipId>,
        start: DVec2,
        aim: Angle,
        inherited_velocity: DVec2,
        rng: &mut Pcg32,
    ) -> Self {
        let mut facing = aim;
        if weapon.inaccuracy > 0.0 {
            facing += Angle::random_within(rng, weapon.inaccuracy)
                - Angle::random_within(rng, weapon.inaccuracy);
        }
        let speed = weapon.velocity + rng.random::<f64>() * weapon.random_velocity;
        let mut lifetime = weapon.lifetime;
        if weapon.random_lifetime > 0 {
            lifetime += rng.random_range(0..=weapon.random_lifetime);
        }
        Self {
            id,
            weapon: weapon_id,
            government,
            target,
            position: start,
            velocity: inherited_velocity + facing.unit() * speed,
            facing,
            lifetime,
            age: 0,
            missile_strength: weapon.missile_strength,
        }
    }

    /// A child projectile released when this one expires
    pub fn submunition(&self, id: u32, weapon_id: WeaponId, weapon: &Weapon, rng: &mut Pcg32) -> Self {
        Self::new(
            id,
            weapon_id,
            weapon,
            self.government,
            self.target,
            self.position + self.velocity,
            self.facing,
            self.velocity,
            rng,
        )
    }

    /// Advance one tick; returns false when the projectile has expired
    ///
    /// On expiry the weapon's die effects are emitted here; the caller is
    /// responsible for sub-munitions.
    pub fn move_step(
        &mut self,
        data: &GameData,
        weapon: &Weapon,
        target: Option<TargetView>,
        rng: &mut Pcg32,
        fx_rng: &mut Pcg32,
        effects: &mut Vec<Effect>,
    ) -> bool {
        self.lifetime -= 1;
        self.age += 1;
        if self.lifetime <= 0 {
            effect::emit(effects, data, &weapon.die_effects, self.position, self.velocity, self.facing, fx_rng);
            return false;
        }

        for &(template, period) in &weapon.live_effects {
            if period == 0 || fx_rng.random_range(0..period) == 0 {
                effect::emit(effects, data, &[(template, 1)], self.position, self.velocity, self.facing, fx_rng);
            }
        }

        let previous = self.position;
        let (turn, accelerate) = self.steer(weapon, target);
        if turn != 0.0 {
            let rotation = Angle::new(turn);
            self.facing += rotation;
            if weapon.acceleration == 0.0 {
                // Unpowered shots keep their speed along the new heading
                self.velocity = rotation.rotate(self.velocity);
            }
        }
        if accelerate && weapon.acceleration != 0.0 {
            self.velocity *= 1.0 - weapon.drag;
            self.velocity += self.facing.unit() * weapon.acceleration;
        }
        self.position += self.velocity;
        if !self.position.is_finite() {
            self.position = previous;
            self.velocity = DVec2::ZERO;
        }

        if let Some(target) = target
            && weapon.split_range > 0.0
            && self.position.distance(target.position) < weapon.split_range
            && rng.random_range(0..10) == 0
        {
            self.lifetime = 0;
        }
        true
    }

    /// Homing turn for this tick and whether the motor may fire
    fn steer(&mut self, weapon: &Weapon, target: Option<TargetView>) -> (f64, bool) {
        let mut turn = weapon.turn;
        let mut accelerate = true;
        let homing = weapon.homing;

        let Some(target) = target.filter(|_| homing > 0 && self.target.is_some()) else {
            if homing > 0 {
                turn = 0.0;
            }
            return (turn, accelerate);
        };

        let mut d = target.position - self.position;
        let distance = d.length();
        if distance < 1e-9 {
            return (0.0, accelerate);
        }
        let true_velocity = if weapon.drag > 0.0 {
            weapon.acceleration / weapon.drag
        } else {
            self.velocity.length()
        };
        let mut steps_to_reach = if true_velocity > 0.0 {
            distance / true_velocity
        } else {
            f64::INFINITY
        };
        let facing_unit = self.facing.unit();
        let facing_away = d.dot(facing_unit) < 0.0;

        if homing >= 4 && steps_to_reach.is_finite() {
            let unit = d / distance;
            if unit.dot(target.velocity) < 0.0 {
                // Target closing in: match its velocity normal to the line
                let normal = DVec2::new(unit.y, -unit.x);
                let v_normal = normal.dot(target.velocity);
                let v_tangent = (true_velocity * true_velocity - v_normal * v_normal).max(0.0).sqrt();
                d = unit * v_tangent + normal * v_normal;
            } else {
                d += target.velocity * steps_to_reach;
                steps_to_reach = d.length() / true_velocity;
            }
        }

        let unit = d.normalize_or_zero();
        if unit == DVec2::ZERO {
            return (0.0, accelerate);
        }

        if facing_away && homing == 1 {
            self.target = None;
            return (0.0, accelerate);
        }

        let desired = facing_unit.perp_dot(unit).clamp(-1.0, 1.0).asin().to_degrees();
        let desired = if facing_away {
            // asin cannot see past 90 degrees
            weapon.turn.copysign(desired)
        } else {
            desired
        };
        turn = if desired.abs() > weapon.turn {
            weapon.turn.copysign(desired)
        } else {
            desired
        };

        if homing >= 3 && turn != 0.0 {
            let steps_to_face = desired / turn;
            if steps_to_face * 1.5 > steps_to_reach {
                accelerate = false;
            }
        }
        (turn, accelerate)
    }

    /// Impact: hit effects at the point `fraction` along this tick's motion
    pub fn explode(
        &mut self,
        data: &GameData,
        weapon: &Weapon,
        fraction: f64,
        fx_rng: &mut Pcg32,
        effects: &mut Vec<Effect>,
    ) -> DVec2 {
        let point = self.impact_point(fraction);
        effect::emit(effects, data, &weapon.hit_effects, point, self.velocity, self.facing, fx_rng);
        self.lifetime = 0;
        point
    }

    pub fn impact_point(&self, fraction: f64) -> DVec2 {
        self.position + self.velocity * fraction
    }

    pub fn draw(&self, data: &GameData, weapon: &Weapon, list: &mut DrawList, clip: f64) {
        let Some(sprite) = weapon.sprite else {
            return;
        };
        let frame_rate = data.sprite(sprite).map(|s| s.frame_rate).unwrap_or(0.0);
        let mut placement = Placement::new(
            sprite,
            self.position + self.velocity * 0.5,
            self.facing,
            DrawSource::Projectile(self.id),
        );
        placement.velocity = self.velocity;
        placement.clip = clip;
        placement.frame = f64::from(self.age) * frame_rate;
        list.push(data, placement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::data::{EffectId, EffectTemplate};
    use rand::SeedableRng;

    fn data() -> GameData {
        GameData {
            effects: vec![EffectTemplate {
                name: "fizzle".into(),
                lifetime: 5,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn missile(homing: u8) -> Weapon {
        Weapon {
            name: "missile".into(),
            velocity: 10.0,
            lifetime: 100,
            homing,
            turn: 5.0,
            missile_strength: 10,
            die_effects: vec![(EffectId(0), 2)],
            ..Default::default()
        }
    }

    fn launch(weapon: &Weapon, rng: &mut Pcg32) -> Projectile {
        Projectile::new(
            1,
            WeaponId(0),
            weapon,
            GovernmentId(0),
            Some(ShipId(9)),
            DVec2::ZERO,
            Angle::default(),
            DVec2::ZERO,
            rng,
        )
    }

    #[test]
    fn test_unguided_flight_and_expiry() {
        let data = data();
        let weapon = Weapon {
            lifetime: 3,
            turn: 0.0,
            ..missile(0)
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = Pcg32::seed_from_u64(4);
        let mut effects = Vec::new();
        let mut shot = launch(&weapon, &mut rng);
        assert!(shot.move_step(&data, &weapon, None, &mut rng, &mut fx, &mut effects));
        assert!(shot.move_step(&data, &weapon, None, &mut rng, &mut fx, &mut effects));
        assert_eq!(shot.position, DVec2::new(20.0, 0.0));
        assert!(!shot.move_step(&data, &weapon, None, &mut rng, &mut fx, &mut effects));
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_homing_turns_toward_target() {
        let data = data();
        let weapon = missile(2);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = Pcg32::seed_from_u64(4);
        let mut shot = launch(&weapon, &mut rng);
        let target = TargetView {
            position: DVec2::new(100.0, 100.0),
            velocity: DVec2::ZERO,
        };
        shot.move_step(&data, &weapon, Some(target), &mut rng, &mut fx, &mut Vec::new());
        assert!((shot.facing.degrees() - 5.0).abs() < 1e-9);
        assert!((shot.velocity.length() - 10.0).abs() < 1e-9);
        assert!(shot.velocity.y > 0.0);
    }

    #[test]
    fn test_dumb_homing_loses_target_behind() {
        let data = data();
        let weapon = missile(1);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = Pcg32::seed_from_u64(4);
        let mut shot = launch(&weapon, &mut rng);
        let target = TargetView {
            position: DVec2::new(-100.0, 0.0),
            velocity: DVec2::ZERO,
        };
        shot.move_step(&data, &weapon, Some(target), &mut rng, &mut fx, &mut Vec::new());
        assert!(shot.target.is_none());
        assert_eq!(shot.facing.degrees(), 0.0);
    }

    #[test]
    fn test_target_on_top_means_no_steer() {
        let data = data();
        let weapon = missile(4);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = Pcg32::seed_from_u64(4);
        let mut shot = launch(&weapon, &mut rng);
        shot.velocity = DVec2::ZERO;
        let target = TargetView {
            position: DVec2::ZERO,
            velocity: DVec2::new(1.0, 1.0),
        };
        shot.move_step(&data, &weapon, Some(target), &mut rng, &mut fx, &mut Vec::new());
        assert_eq!(shot.facing.degrees(), 0.0);
        assert!(shot.position.is_finite());
    }

    #[test]
    fn test_explode_reports_impact_point() {
        let data = data();
        let weapon = missile(0);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut fx = Pcg32::seed_from_u64(4);
        let mut shot = launch(&weapon, &mut rng);
        let point = shot.explode(&data, &weapon, 0.5, &mut fx, &mut Vec::new());
        assert_eq!(point, DVec2::new(5.0, 0.0));
        assert_eq!(shot.lifetime, 0);
    }
}
