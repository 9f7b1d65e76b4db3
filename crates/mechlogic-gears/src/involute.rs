//! # Involute Curve
//!
//! The involute of a base circle of radius `r_b`:
//!
//! ```text
//! x = r_b * (cos(t) + t * sin(t))
//! y = r_b * (sin(t) - t * cos(t))
//! ```
//!
//! `t = 0` lies on the base circle and the radius grows as
//! `r = r_b * sqrt(1 + t^2)`.

use nalgebra::Point2;

/// Point on the involute at roll parameter `t` (radians, `t >= 0`).
pub fn point(base_radius: f64, t: f64) -> Point2<f64> {
    Point2::new(
        base_radius * (t.cos() + t * t.sin()),
        base_radius * (t.sin() - t * t.cos()),
    )
}

/// Roll parameter at which the involute reaches `radius`.
///
/// Returns 0 for radii on or inside the base circle.
pub fn param_at_radius(base_radius: f64, radius: f64) -> f64 {
    if radius <= base_radius {
        return 0.0;
    }
    ((radius / base_radius).powi(2) - 1.0).sqrt()
}

/// The involute function `inv(a) = tan(a) - a`.
pub fn involute_function(angle: f64) -> f64 {
    angle.tan() - angle
}

/// Polar angle of the involute point at `radius`.
pub fn polar_angle(base_radius: f64, radius: f64) -> f64 {
    let p = point(base_radius, param_at_radius(base_radius, radius));
    p.y.atan2(p.x)
}
