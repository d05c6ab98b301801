//! Draw list: an ordered batch of textured quads
//!
//! Items are stored back to front. Positions are relative to the view center
//! (the flagship) so the renderer only has to scale them to the screen.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sim::angle::Angle;
use crate::sim::data::{GameData, SpriteId};
use crate::sim::ship::ShipId;

/// Which kind of simulation object produced a draw item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawSource {
    Stellar,
    Asteroid,
    Ship(ShipId),
    /// Engine flare of the given ship
    Flare(ShipId),
    Projectile(u32),
    Effect,
}

/// One animation frame of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    pub sprite: SpriteId,
    pub frame: u32,
}

/// A textured quad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawItem {
    /// Current and next animation frame, blended by `frame_blend`
    pub textures: [TextureRef; 2],
    pub frame_blend: f64,
    /// Center relative to the view center
    pub position: DVec2,
    /// Column-major 2x2 orientation and scale
    pub transform: [f64; 4],
    pub swizzle: u8,
    /// Fraction of the sprite's height to show, from the top
    pub clip: f64,
    pub fade: f64,
    /// Motion blur in texture space
    pub blur: DVec2,
    pub source: DrawSource,
}

/// Everything needed to place one sprite
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub sprite: SpriteId,
    /// Fractional animation frame
    pub frame: f64,
    pub position: DVec2,
    pub velocity: DVec2,
    pub facing: Angle,
    pub zoom: f64,
    pub swizzle: u8,
    pub clip: f64,
    pub alpha: f64,
    pub source: DrawSource,
}

impl Placement {
    pub fn new(sprite: SpriteId, position: DVec2, facing: Angle, source: DrawSource) -> Self {
        Self {
            sprite,
            frame: 0.0,
            position,
            velocity: DVec2::ZERO,
            facing,
            zoom: 1.0,
            swizzle: 0,
            clip: 1.0,
            alpha: 1.0,
            source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    items: Vec<DrawItem>,
    step: u64,
    center: DVec2,
    center_velocity: DVec2,
}

impl DrawList {
    /// Empty the list and set the view for the coming tick
    pub fn clear(&mut self, step: u64, center: DVec2, center_velocity: DVec2) {
        self.items.clear();
        self.step = step;
        self.center = center;
        self.center_velocity = center_velocity;
    }

    /// Move the view center without touching the items
    pub fn set_center(&mut self, center: DVec2, center_velocity: DVec2) {
        self.center = center;
        self.center_velocity = center_velocity;
    }

    /// Append a sprite; returns false when the sprite is not in the catalog
    pub fn push(&mut self, data: &GameData, placement: Placement) -> bool {
        let Some(sprite) = data.sprite(placement.sprite) else {
            log::trace!("Skipping draw of missing sprite {}", placement.sprite.0);
            return false;
        };
        let width = sprite.width.max(1e-6);
        let height = sprite.height.max(1e-6);

        let unit = placement.facing.unit() * placement.zoom;
        let uw = unit * width;
        let uh = unit * height;

        let relative_velocity = placement.velocity - self.center_velocity;
        let blur = DVec2::new(
            unit.perp_dot(relative_velocity) / (4.0 * width),
            -unit.dot(relative_velocity) / (4.0 * height),
        );

        let frames = sprite.frames.max(1);
        let frame = if placement.frame.is_finite() {
            placement.frame.rem_euclid(f64::from(frames))
        } else {
            0.0
        };
        let first = (frame.floor() as u32).min(frames - 1);
        let second = (first + 1) % frames;

        self.items.push(DrawItem {
            textures: [
                TextureRef {
                    sprite: placement.sprite,
                    frame: first,
                },
                TextureRef {
                    sprite: placement.sprite,
                    frame: second,
                },
            ],
            frame_blend: frame.fract(),
            position: placement.position - self.center,
            transform: [-uw.y, uw.x, -uh.x, -uh.y],
            swizzle: placement.swizzle,
            clip: placement.clip.clamp(0.0, 1.0),
            fade: placement.alpha.clamp(0.0, 1.0),
            blur,
            source: placement.source,
        });
        true
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }
}
