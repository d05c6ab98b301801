//! Swept collision primitives
//!
//! Projectiles are tested as line segments covering their motion for one
//! tick; targets are circles. Results are parametric fractions along the
//! segment so callers can compare hits from different sources and keep the
//! earliest one.

use glam::DVec2;

/// Returned by sweeps that hit nothing
pub const CLEAR: f64 = 1.0;

/// Closest point to `point` on the segment `start..end`
pub fn closest_point_on_segment(point: DVec2, start: DVec2, end: DVec2) -> DVec2 {
    let line = end - start;
    let len_sq = line.length_squared();
    if len_sq < 1e-12 {
        return start;
    }
    let t = ((point - start).dot(line) / len_sq).clamp(0.0, 1.0);
    start + line * t
}

/// Fraction along `start..start + delta` at which the segment first enters
/// the circle, or `None` if it never does
///
/// A segment that starts inside the circle hits at 0.
pub fn segment_circle_entry(start: DVec2, delta: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    if radius <= 0.0 {
        return None;
    }
    let offset = start - center;
    let c = offset.length_squared() - radius * radius;
    if c < 0.0 {
        return Some(0.0);
    }
    let a = delta.length_squared();
    if a < 1e-12 {
        return None;
    }
    let b = 2.0 * offset.dot(delta);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.max(0.0).sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Sweep a segment against a circle, also honoring a proximity trigger
///
/// Passing within `trigger` of the circle's edge counts as a hit at the
/// start of the segment. Returns [`CLEAR`] when nothing is hit.
pub fn sweep_circle(start: DVec2, delta: DVec2, center: DVec2, radius: f64, trigger: f64) -> f64 {
    if trigger > 0.0 {
        let closest = closest_point_on_segment(center, start, start + delta);
        if closest.distance(center) < radius + trigger {
            return 0.0;
        }
    }
    segment_circle_entry(start, delta, center, radius).unwrap_or(CLEAR)
}

/// Whether a point lies inside a blast
///
/// The boundary is exclusive: a hull center exactly `radius` away is outside.
#[inline]
pub fn within_blast(center: DVec2, impact: DVec2, radius: f64) -> bool {
    radius > 0.0 && center.distance(impact) < radius
}

/// Smallest non-negative time at which a shot fired at `speed` meets a
/// target at relative position `offset` moving with relative `velocity`
pub fn rendezvous_time(offset: DVec2, velocity: DVec2, speed: f64) -> Option<f64> {
    let a = velocity.length_squared() - speed * speed;
    let b = 2.0 * offset.dot(velocity);
    let c = offset.length_squared();
    if a.abs() < 1e-9 {
        if b.abs() < 1e-12 {
            return None;
        }
        let t = -c / b;
        return (t >= 0.0).then_some(t);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.max(0.0).sqrt();
    let (t0, t1) = ((-b - root) / (2.0 * a), (-b + root) / (2.0 * a));
    let (low, high) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
    if low >= 0.0 {
        Some(low)
    } else if high >= 0.0 {
        Some(high)
    } else {
        None
    }
}
