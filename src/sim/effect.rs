//! Decorative particles
//!
//! Effects draw from their own random stream and are never read back by
//! gameplay code.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::angle::Angle;
use super::data::{EffectId, GameData, SpriteId};
use crate::scene::draw::{DrawList, DrawSource, Placement};

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub template: EffectId,
    pub sprite: Option<SpriteId>,
    pub position: DVec2,
    pub velocity: DVec2,
    pub angle: Angle,
    pub spin: f64,
    pub lifetime: i32,
    total_lifetime: i32,
    frame: f64,
    frame_rate: f64,
    fade: bool,
}

impl Effect {
    /// Instantiate a template at a point, inheriting part of `velocity`
    ///
    /// Returns `None` if the template is missing from the catalog.
    pub fn spawn(
        data: &GameData,
        template: EffectId,
        position: DVec2,
        velocity: DVec2,
        angle: Angle,
        rng: &mut Pcg32,
    ) -> Option<Self> {
        let Some(tpl) = data.effect(template) else {
            log::trace!("Skipping missing effect template {}", template.0);
            return None;
        };
        let mut lifetime = tpl.lifetime;
        if tpl.random_lifetime > 0 {
            lifetime += rng.random_range(0..tpl.random_lifetime);
        }
        let angle = angle + Angle::new((rng.random::<f64>() - 0.5) * 2.0 * tpl.random_angle);
        let speed = if tpl.random_velocity > 0.0 {
            rng.random::<f64>() * tpl.random_velocity
        } else {
            0.0
        };
        let spin = (rng.random::<f64>() - 0.5) * 2.0 * tpl.random_spin;
        let frame_rate = tpl
            .sprite
            .and_then(|id| data.sprite(id))
            .map(|sprite| sprite.frame_rate)
            .unwrap_or(0.0);

        Some(Self {
            template,
            sprite: tpl.sprite,
            position,
            velocity: velocity * tpl.velocity_scale + angle.unit() * speed,
            angle,
            spin,
            lifetime: lifetime.max(1),
            total_lifetime: lifetime.max(1),
            frame: 0.0,
            frame_rate,
            fade: tpl.fade,
        })
    }

    /// Age by one tick; returns false once expired
    pub fn move_step(&mut self) -> bool {
        self.position += self.velocity;
        self.angle += Angle::new(self.spin);
        self.frame += self.frame_rate;
        self.lifetime -= 1;
        self.lifetime > 0
    }

    pub fn draw(&self, data: &GameData, list: &mut DrawList) {
        let Some(sprite) = self.sprite else {
            return;
        };
        let mut placement = Placement::new(sprite, self.position, self.angle, DrawSource::Effect);
        placement.velocity = self.velocity;
        placement.frame = self.frame;
        if self.fade {
            placement.alpha = f64::from(self.lifetime) / f64::from(self.total_lifetime);
        }
        list.push(data, placement);
    }
}

/// Spawn every effect in a weighted list (`count` copies each)
pub fn emit(
    effects: &mut Vec<Effect>,
    data: &GameData,
    list: &[(EffectId, u32)],
    position: DVec2,
    velocity: DVec2,
    angle: Angle,
    rng: &mut Pcg32,
) {
    for &(template, count) in list {
        for _ in 0..count {
            if let Some(effect) = Effect::spawn(data, template, position, velocity, angle, rng) {
                effects.push(effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::data::EffectTemplate;
    use rand::SeedableRng;

    fn data() -> GameData {
        GameData {
            effects: vec![EffectTemplate {
                name: "spark".into(),
                lifetime: 3,
                velocity_scale: 0.5,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_effect_expires() {
        let data = data();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effect = Effect::spawn(
            &data,
            EffectId(0),
            DVec2::ZERO,
            DVec2::new(4.0, 0.0),
            Angle::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(effect.velocity, DVec2::new(2.0, 0.0));
        assert!(effect.move_step());
        assert!(effect.move_step());
        assert!(!effect.move_step());
        assert_eq!(effect.position, DVec2::new(6.0, 0.0));
    }

    #[test]
    fn test_emit_counts_and_skips_missing() {
        let data = data();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut effects = Vec::new();
        emit(
            &mut effects,
            &data,
            &[(EffectId(0), 3), (EffectId(7), 2)],
            DVec2::ZERO,
            DVec2::ZERO,
            Angle::default(),
            &mut rng,
        );
        assert_eq!(effects.len(), 3);
    }
}
