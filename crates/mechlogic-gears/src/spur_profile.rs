//! # Spur Tooth Profile
//!
//! Closed 2D outline of an involute spur gear.
//!
//! Each tooth is traced counter-clockwise: root, left flank (root to tip),
//! a short tip arc, right flank (tip to root), root valley. The flank is the
//! involute rotated so the tooth has the requested thickness at the pitch
//! circle:
//!
//! ```text
//! angle = center ± (half_tooth + inv(alpha) - theta)
//! ```
//!
//! Where the dedendum reaches below the flank start, radial drop points are
//! added under each flank so a mating tip has room.

use crate::involute;
use crate::mesh_geometry::GearMeshGeometry;
use crate::spec::GearSpec;
use mechlogic_core::DegenerateProfileError;
use nalgebra::Point2;
use std::f64::consts::PI;

/// Default samples per flank.
pub const DEFAULT_FLANK_POINTS: usize = 8;

/// Fewest samples that still give a usable flank.
pub const MIN_FLANK_POINTS: usize = 6;

/// Interior points of the tip arc.
const TIP_ARC_POINTS: usize = 3;

/// A closed gear outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothProfile {
    points: Vec<Point2<f64>>,
    teeth: usize,
    points_per_tooth: usize,
}

impl ToothProfile {
    pub(crate) fn from_parts(
        points: Vec<Point2<f64>>,
        teeth: usize,
        points_per_tooth: usize,
    ) -> Self {
        Self {
            points,
            teeth,
            points_per_tooth,
        }
    }

    /// Every point; the last one repeats the first.
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn teeth(&self) -> usize {
        self.teeth
    }

    /// Points of tooth `index`, from the preceding valley to its own valley.
    pub fn tooth(&self, index: usize) -> Option<&[Point2<f64>]> {
        if index >= self.teeth {
            return None;
        }
        let start = index * self.points_per_tooth;
        self.points.get(start..=start + self.points_per_tooth)
    }

    /// Whether the first and last point coincide.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => self.points.len() > 3 && (a - b).norm() < 1e-9,
            _ => false,
        }
    }

    /// Copy scaled about the gear center.
    pub fn scaled(&self, factor: f64) -> ToothProfile {
        ToothProfile {
            points: self.points.iter().map(|p| Point2::from(p.coords * factor)).collect(),
            teeth: self.teeth,
            points_per_tooth: self.points_per_tooth,
        }
    }

    /// Copy rotated about the gear center.
    pub fn rotated(&self, degrees: f64) -> ToothProfile {
        let (s, c) = degrees.to_radians().sin_cos();
        ToothProfile {
            points: self
                .points
                .iter()
                .map(|p| Point2::new(c * p.x - s * p.y, s * p.x + c * p.y))
                .collect(),
            teeth: self.teeth,
            points_per_tooth: self.points_per_tooth,
        }
    }

    /// Shoelace area of the outline.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// Generator for spur gear outlines.
#[derive(Debug, Clone)]
pub struct SpurToothProfile {
    geometry: GearMeshGeometry,
    flank_points: usize,
}

/// Flank sample: radius and angular offset from the tooth centerline.
#[derive(Debug, Clone, Copy)]
struct FlankSample {
    radius: f64,
    offset: f64,
}

impl SpurToothProfile {
    /// Generator for a gear spec.
    pub fn new(spec: &GearSpec) -> Self {
        Self::from_geometry(GearMeshGeometry::spur(spec))
    }

    /// Generator for precomputed geometry, including fractional tooth counts.
    pub fn from_geometry(geometry: GearMeshGeometry) -> Self {
        Self {
            geometry,
            flank_points: DEFAULT_FLANK_POINTS,
        }
    }

    /// Change the number of samples per flank.
    pub fn with_flank_points(mut self, flank_points: usize) -> Self {
        self.flank_points = flank_points;
        self
    }

    pub fn geometry(&self) -> &GearMeshGeometry {
        &self.geometry
    }

    /// Whole gear outline with tooth 0 centered on +X.
    pub fn generate(&self) -> Result<ToothProfile, DegenerateProfileError> {
        let flank = self.flank()?;
        let g = &self.geometry;
        let teeth = g.teeth.round().max(1.0) as usize;
        let pitch = 2.0 * PI / teeth as f64;

        let mut points = Vec::with_capacity(1 + teeth * (2 * self.flank_points + 6));
        points.push(polar(g.root_radius, -pitch / 2.0));
        let mut points_per_tooth = 0;
        for i in 0..teeth {
            let before = points.len();
            self.push_tooth(&flank, i as f64 * pitch, pitch, &mut points);
            points_per_tooth = points.len() - before;
        }
        // the final valley is the first point one turn later
        if let Some(first) = points.first().copied() {
            if let Some(last) = points.last_mut() {
                *last = first;
            }
        }

        Ok(ToothProfile {
            points,
            teeth,
            points_per_tooth,
        })
    }

    /// One tooth, from the valley before it to the valley after it.
    pub fn tooth(&self, center_angle: f64) -> Result<Vec<Point2<f64>>, DegenerateProfileError> {
        let flank = self.flank()?;
        let pitch = self.geometry.tooth_pitch_angle();
        let mut points = vec![polar(self.geometry.root_radius, center_angle - pitch / 2.0)];
        self.push_tooth(&flank, center_angle, pitch, &mut points);
        Ok(points)
    }

    /// Star-shaped polygon of the teeth around angle 0.
    ///
    /// The nearest tooth is centered at `-phase * pitch`; `teeth_each_side`
    /// further teeth are added on both sides. The outline starts and ends at
    /// the gear center. Works for fractional tooth counts.
    pub fn window(
        &self,
        phase: f64,
        teeth_each_side: usize,
    ) -> Result<Vec<Point2<f64>>, DegenerateProfileError> {
        let flank = self.flank()?;
        let g = &self.geometry;
        let pitch = g.tooth_pitch_angle();
        // keep the window shorter than a full turn
        let max_side = ((g.teeth - 1.5) / 2.0).floor().max(0.0) as usize;
        let side = teeth_each_side.min(max_side) as i64;
        let base = -phase * pitch;

        let mut points = vec![Point2::origin()];
        points.push(polar(g.root_radius, base - (side as f64 + 0.5) * pitch));
        for j in -side..=side {
            self.push_tooth(&flank, base + j as f64 * pitch, pitch, &mut points);
        }
        points.push(Point2::origin());
        Ok(points)
    }

    fn flank(&self) -> Result<Vec<FlankSample>, DegenerateProfileError> {
        let g = &self.geometry;
        if self.flank_points < MIN_FLANK_POINTS {
            return Err(DegenerateProfileError::TooFewSamples {
                count: self.flank_points,
                min: MIN_FLANK_POINTS,
            });
        }
        if g.tooth_thickness <= 0.0 {
            return Err(DegenerateProfileError::NonPositiveThickness {
                thickness: g.tooth_thickness,
                backlash: g.circular_pitch() / 2.0 - g.tooth_thickness,
            });
        }
        if g.root_radius <= 0.0 {
            return Err(DegenerateProfileError::NonPositiveRoot {
                root: g.root_radius,
            });
        }
        let start = g.flank_start_radius;
        let tip = g.tip_sample_radius();
        if start >= tip {
            return Err(DegenerateProfileError::NoFlankRange { start, tip });
        }

        let inv_alpha = involute::involute_function(g.pressure_angle_deg.to_radians());
        let t0 = involute::param_at_radius(g.base_radius, start);
        let t1 = involute::param_at_radius(g.base_radius, tip);
        let n = self.flank_points;
        let samples: Vec<FlankSample> = (0..n)
            .map(|i| {
                let t = t0 + (t1 - t0) * i as f64 / (n - 1) as f64;
                let p = involute::point(g.base_radius, t);
                FlankSample {
                    radius: p.coords.norm(),
                    offset: g.half_tooth_angle + inv_alpha - p.y.atan2(p.x),
                }
            })
            .collect();

        let tip_half_angle = samples.last().map_or(0.0, |s| s.offset);
        if tip_half_angle <= 0.0 {
            return Err(DegenerateProfileError::PointedTooth { tip_half_angle });
        }
        Ok(samples)
    }

    fn push_tooth(
        &self,
        flank: &[FlankSample],
        center: f64,
        pitch: f64,
        points: &mut Vec<Point2<f64>>,
    ) {
        let g = &self.geometry;
        let (Some(root_sample), Some(tip_sample)) = (flank.first(), flank.last()) else {
            return;
        };
        let drop = g.root_radius < root_sample.radius - 1e-9;

        if drop {
            points.push(polar(g.root_radius, center - root_sample.offset));
        }
        for s in flank {
            points.push(polar(s.radius, center - s.offset));
        }
        for k in 0..TIP_ARC_POINTS {
            let fraction = (k + 1) as f64 / (TIP_ARC_POINTS + 1) as f64;
            let angle = center - tip_sample.offset + 2.0 * tip_sample.offset * fraction;
            points.push(polar(g.outer_radius, angle));
        }
        for s in flank.iter().rev() {
            points.push(polar(s.radius, center + s.offset));
        }
        if drop {
            points.push(polar(g.root_radius, center + root_sample.offset));
        }
        points.push(polar(g.root_radius, center + pitch / 2.0));
    }
}

fn polar(radius: f64, angle: f64) -> Point2<f64> {
    Point2::new(radius * angle.cos(), radius * angle.sin())
}

/// Signed shoelace area, positive for counter-clockwise outlines.
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}
