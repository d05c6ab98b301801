//! Radar list: dots, rings and direction pointers
//!
//! Colors are classes, not RGB; the renderer owns the palette.

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadarColor {
    Player,
    Friendly,
    Unfriendly,
    Hostile,
    Inactive,
    Special,
}

/// A dot (inner = 0) or ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarBlip {
    pub color: RadarColor,
    /// World-scale offset from the radar center
    pub position: DVec2,
    pub outer: f64,
    pub inner: f64,
}

/// Direction-only marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub color: RadarColor,
    /// Unit vector
    pub direction: DVec2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarList {
    center: DVec2,
    blips: Vec<RadarBlip>,
    pointers: Vec<Pointer>,
}

impl RadarList {
    pub fn clear(&mut self, center: DVec2) {
        self.center = center;
        self.blips.clear();
        self.pointers.clear();
    }

    pub fn set_center(&mut self, center: DVec2) {
        self.center = center;
    }

    /// Add a blip at a world position
    pub fn add(&mut self, color: RadarColor, position: DVec2, outer: f64, inner: f64) {
        self.blips.push(RadarBlip {
            color,
            position: position - self.center,
            outer,
            inner: inner.clamp(0.0, outer.max(0.0)),
        });
    }

    /// Add a pointer toward a direction; zero directions are dropped
    pub fn add_pointer(&mut self, color: RadarColor, direction: DVec2) {
        let direction = direction.normalize_or_zero();
        if direction != DVec2::ZERO {
            self.pointers.push(Pointer { color, direction });
        }
    }

    pub fn blips(&self) -> &[RadarBlip] {
        &self.blips
    }

    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blips_are_relative() {
        let mut radar = RadarList::default();
        radar.clear(DVec2::new(10.0, 10.0));
        radar.add(RadarColor::Special, DVec2::new(20.0, 10.0), 3.0, 2.0);
        assert_eq!(radar.blips()[0].position, DVec2::new(10.0, 0.0));
        assert_eq!(radar.blips()[0].inner, 2.0);
    }

    #[test]
    fn test_pointer_normalized() {
        let mut radar = RadarList::default();
        radar.add_pointer(RadarColor::Inactive, DVec2::new(0.0, 5.0));
        radar.add_pointer(RadarColor::Inactive, DVec2::ZERO);
        assert_eq!(radar.pointers().len(), 1);
        assert_eq!(radar.pointers()[0].direction, DVec2::new(0.0, 1.0));
    }

    #[test]
    fn test_clear() {
        let mut radar = RadarList::default();
        radar.add(RadarColor::Player, DVec2::ZERO, 1.0, 0.0);
        radar.clear(DVec2::ZERO);
        assert!(radar.blips().is_empty());
    }
}
