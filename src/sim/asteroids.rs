//! Ambient asteroid field
//!
//! Asteroids live in a square of side [`WRAP`] that tiles the whole plane,
//! so a handful of rocks fill every view.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::angle::Angle;
use super::collision::{self, CLEAR};
use super::data::{AsteroidBelt, GameData, SpriteId};
use crate::scene::draw::{DrawList, DrawSource, Placement};

/// Side of the tiling square
pub const WRAP: f64 = 4096.0;

/// Collision radius used when a rock has no sprite
const DEFAULT_RADIUS: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub sprite: Option<SpriteId>,
    /// Always inside [0, WRAP) on both axes
    pub position: DVec2,
    pub velocity: DVec2,
    pub angle: Angle,
    pub spin: Angle,
    pub radius: f64,
    frame: f64,
    frame_rate: f64,
}

impl Asteroid {
    fn new(data: &GameData, belt: &AsteroidBelt, rng: &mut Pcg32) -> Self {
        let energy = belt.energy;
        let sprite = belt.sprite.and_then(|id| data.sprite(id).map(|s| (id, s)));
        let radius = sprite
            .map(|(_, s)| 0.5 * s.width.min(s.height))
            .unwrap_or(DEFAULT_RADIUS);

        // Frames per second at 60 ticks per second
        let frame_rate = (rng.random::<f64>() * 4.0 * energy + 5.0) / 60.0;
        let position = DVec2::new(rng.random::<f64>() * WRAP, rng.random::<f64>() * WRAP);
        let angle = Angle::random(rng);
        let spin = Angle::random_within(rng, energy) - Angle::random_within(rng, energy);
        let velocity = angle.unit() * rng.random::<f64>() * energy;

        Self {
            sprite: sprite.map(|(id, _)| id),
            position,
            velocity,
            angle,
            spin,
            radius,
            frame: 0.0,
            frame_rate,
        }
    }

    fn step(&mut self) {
        self.angle += self.spin;
        self.position = wrap(self.position + self.velocity);
        self.frame += self.frame_rate;
    }
}

#[derive(Debug, Clone, Default)]
pub struct AsteroidField {
    asteroids: Vec<Asteroid>,
}

impl AsteroidField {
    pub fn clear(&mut self) {
        self.asteroids.clear();
    }

    /// Seed rocks for one belt
    pub fn add(&mut self, data: &GameData, belt: &AsteroidBelt, rng: &mut Pcg32) {
        for _ in 0..belt.count {
            self.asteroids.push(Asteroid::new(data, belt, rng));
        }
    }

    pub fn step(&mut self) {
        for asteroid in &mut self.asteroids {
            asteroid.step();
        }
    }

    /// Draw every visible instance around `center`
    pub fn draw(&self, data: &GameData, list: &mut DrawList, center: DVec2, viewport: DVec2) {
        for asteroid in &self.asteroids {
            let Some(sprite) = asteroid.sprite else {
                continue;
            };
            let size = DVec2::splat(asteroid.radius);
            let top_left = center - viewport * 0.5 - size;
            let bottom_right = center + viewport * 0.5 + size;

            // First instance right of and below the top left corner
            let start = top_left + (asteroid.position - top_left).rem_euclid(DVec2::splat(WRAP));
            let mut y = start.y;
            while y < bottom_right.y {
                let mut x = start.x;
                while x < bottom_right.x {
                    let mut placement = Placement::new(
                        sprite,
                        DVec2::new(x, y),
                        asteroid.angle,
                        DrawSource::Asteroid,
                    );
                    placement.velocity = asteroid.velocity;
                    placement.frame = asteroid.frame;
                    list.push(data, placement);
                    x += WRAP;
                }
                y += WRAP;
            }
        }
    }

    /// Fraction along `start..start + delta` of the first asteroid hit, or
    /// [`CLEAR`] if the segment is unobstructed
    pub fn collide(&self, start: DVec2, delta: DVec2) -> f64 {
        let mut closest = CLEAR;
        let middle = start + delta * 0.5;
        for asteroid in &self.asteroids {
            // Nearest tiled copy of this rock to the segment
            let offset = wrap(asteroid.position - middle + DVec2::splat(WRAP * 0.5))
                - DVec2::splat(WRAP * 0.5);
            let center = middle + offset;
            if let Some(t) = collision::segment_circle_entry(start, delta, center, asteroid.radius) {
                closest = closest.min(t);
            }
        }
        closest
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn len(&self) -> usize {
        self.asteroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asteroids.is_empty()
    }
}

/// Map a point into the wrap square
fn wrap(position: DVec2) -> DVec2 {
    let wrapped = position.rem_euclid(DVec2::splat(WRAP));
    // rem_euclid may round up to exactly WRAP for tiny negative inputs
    DVec2::new(
        if wrapped.x >= WRAP { 0.0 } else { wrapped.x },
        if wrapped.y >= WRAP { 0.0 } else { wrapped.y },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::data::Sprite;
    use rand::SeedableRng;

    fn data() -> GameData {
        GameData {
            sprites: vec![Sprite {
                name: "rock".into(),
                width: 20.0,
                height: 20.0,
                frames: 1,
                frame_rate: 0.0,
            }],
            ..Default::default()
        }
    }

    fn rock(position: DVec2, velocity: DVec2) -> Asteroid {
        Asteroid {
            sprite: Some(SpriteId(0)),
            position,
            velocity,
            angle: Angle::default(),
            spin: Angle::default(),
            radius: 10.0,
            frame: 0.0,
            frame_rate: 0.0,
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let data = data();
        let belt = AsteroidBelt {
            sprite: Some(SpriteId(0)),
            count: 12,
            energy: 2.0,
        };
        let mut a = AsteroidField::default();
        let mut b = AsteroidField::default();
        a.add(&data, &belt, &mut Pcg32::seed_from_u64(5));
        b.add(&data, &belt, &mut Pcg32::seed_from_u64(5));
        assert_eq!(a.asteroids(), b.asteroids());
        assert_eq!(a.len(), 12);
        assert!(a.asteroids().iter().all(|r| r.radius == 10.0));
    }

    #[test]
    fn test_step_wraps() {
        let mut field = AsteroidField {
            asteroids: vec![rock(DVec2::new(WRAP - 1.0, 0.5), DVec2::new(3.0, -1.0))],
        };
        field.step();
        let p = field.asteroids()[0].position;
        assert!((p.x - 2.0).abs() < 1e-9);
        assert!((p.y - (WRAP - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_collide_across_tiles() {
        let field = AsteroidField {
            asteroids: vec![rock(DVec2::new(100.0, 100.0), DVec2::ZERO)],
        };
        // Same rock, one tile over
        let start = DVec2::new(WRAP + 80.0, 100.0);
        let t = field.collide(start, DVec2::new(20.0, 0.0));
        assert!((t - 0.5).abs() < 1e-9);
        assert_eq!(field.collide(DVec2::new(500.0, 500.0), DVec2::new(10.0, 0.0)), CLEAR);
    }

    #[test]
    fn test_draw_visible_instances() {
        let data = data();
        let field = AsteroidField {
            asteroids: vec![rock(DVec2::new(10.0, 10.0), DVec2::ZERO)],
        };
        let mut list = DrawList::default();
        field.draw(&data, &mut list, DVec2::ZERO, DVec2::new(200.0, 200.0));
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].source, DrawSource::Asteroid);

        // A view far away in another tile still sees a copy
        let mut list = DrawList::default();
        let center = DVec2::new(WRAP * 3.0, -WRAP);
        field.draw(&data, &mut list, center, DVec2::new(200.0, 200.0));
        assert_eq!(list.len(), 1);
    }
}
