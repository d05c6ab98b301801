//! Wrap-around directions
//!
//! Angles are stored in degrees and kept in [-180, 180). Zero degrees points
//! along +x and positive angles turn counterclockwise.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub};

/// A direction in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub fn new(degrees: f64) -> Self {
        Self(normalize_degrees(degrees))
    }

    /// Direction of the given vector (zero vector maps to zero degrees)
    pub fn from_vector(v: DVec2) -> Self {
        if v == DVec2::ZERO {
            return Self(0.0);
        }
        Self::new(v.y.atan2(v.x).to_degrees())
    }

    /// Uniformly random direction
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random_within(rng, 360.0)
    }

    /// Random angle in [0, sector) degrees
    pub fn random_within<R: Rng + ?Sized>(rng: &mut R, sector: f64) -> Self {
        if sector <= 0.0 {
            return Self(0.0);
        }
        Self::new(rng.random::<f64>() * sector)
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn unit(self) -> DVec2 {
        let r = self.0.to_radians();
        DVec2::new(r.cos(), r.sin())
    }

    /// Rotate a vector by this angle
    #[inline]
    pub fn rotate(self, v: DVec2) -> DVec2 {
        self.unit().rotate(v)
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle::new(self.0 + rhs.0)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle::new(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle::new(-self.0)
    }
}

/// Wrap degrees into [-180, 180)
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}
