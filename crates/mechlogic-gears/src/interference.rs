//! # Mesh Interference
//!
//! Overlap of meshing tooth bodies, measured on cross sections.
//!
//! Spur pairs intersect their full outlines in the first gear's body frame
//! and multiply by the shared face width. Bevel pairs are measured in the
//! back cone development: at every section the two teeth are the virtual
//! spur gears of their back cones, shrunk for backlash, tangent at the pitch
//! point. The section areas are integrated along the cone element.

use crate::alignment::MeshAlignmentSolver;
use crate::bevel_profile::BevelToothProfile;
use crate::mesh_geometry::GearMeshGeometry;
use crate::spec::{BevelGearSpec, GearSpec};
use crate::spur_profile::SpurToothProfile;
use geo::{Area, BooleanOps, Coord, LineString, Polygon};
use mechlogic_core::{DegenerateProfileError, MeshError, PartPose};
use nalgebra::{Point2, Vector3};
use std::f64::consts::PI;
use tracing::debug;

/// Axial extent of a gear body along its own axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxialSpan {
    pub start: f64,
    pub end: f64,
}

impl AxialSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Span of `width` centered on the body origin.
    pub fn centered(width: f64) -> Self {
        Self::new(-width / 2.0, width / 2.0)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Length shared with `other`.
    pub fn overlap(&self, other: &AxialSpan) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }
}

fn to_polygon(points: &[Point2<f64>]) -> Polygon<f64> {
    let ring: LineString<f64> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    Polygon::new(ring, vec![])
}

/// Area shared by two simple outlines.
pub fn overlap_area(a: &[Point2<f64>], b: &[Point2<f64>]) -> f64 {
    if a.len() < 3 || b.len() < 3 {
        return 0.0;
    }
    to_polygon(a).intersection(&to_polygon(b)).unsigned_area()
}

fn degenerate(err: DegenerateProfileError) -> MeshError {
    MeshError::Degenerate(err.to_string())
}

/// Intersection volume of two spur gears on parallel axes.
///
/// Each gear occupies `span` along its own body Z axis.
pub fn spur_mesh_interference(
    a: &GearSpec,
    pose_a: &PartPose,
    span_a: AxialSpan,
    b: &GearSpec,
    pose_b: &PartPose,
    span_b: AxialSpan,
) -> Result<f64, MeshError> {
    let to_a = pose_a.rotation().inverse();
    let relative = to_a * pose_b.rotation();
    let axis = relative * Vector3::z();
    if (axis.z.abs() - 1.0).abs() > 1e-6 {
        return Err(MeshError::Degenerate(
            "spur gears are not on parallel axes".to_string(),
        ));
    }
    let offset = to_a * (pose_b.origin_point() - pose_a.origin_point());
    let span_b_in_a = AxialSpan::new(
        offset.z + axis.z * span_b.start,
        offset.z + axis.z * span_b.end,
    );
    let shared = span_a.overlap(&span_b_in_a);
    let planar = offset.x.hypot(offset.y);
    if shared <= 0.0 || planar >= a.outer_radius() + b.outer_radius() {
        return Ok(0.0);
    }

    let outline_a = SpurToothProfile::new(a).generate().map_err(degenerate)?;
    let outline_b = SpurToothProfile::new(b).generate().map_err(degenerate)?;
    let moved: Vec<Point2<f64>> = outline_b
        .points()
        .iter()
        .map(|p| {
            let q = relative * Vector3::new(p.x, p.y, 0.0);
            Point2::new(q.x + offset.x, q.y + offset.y)
        })
        .collect();
    let area = overlap_area(outline_a.points(), &moved);
    debug!(area, shared, "Spur mesh overlap");
    Ok(area * shared)
}

/// Intersection volume of two posed bevel gears sharing an apex.
///
/// `sections` stations from the back face to the front face are sampled
/// (at least two).
pub fn bevel_mesh_interference(
    a: &BevelGearSpec,
    pose_a: &PartPose,
    b: &BevelGearSpec,
    pose_b: &PartPose,
    mesh_distance: f64,
    sections: usize,
) -> Result<f64, MeshError> {
    let contact = MeshAlignmentSolver::bevel_contact(a, pose_a, b, pose_b, mesh_distance)?;
    let cone_distance = a.cone_distance();
    if (cone_distance - b.cone_distance()).abs() > 1e-6 {
        return Err(MeshError::Degenerate(format!(
            "cone distances differ: {} vs {}",
            cone_distance,
            b.cone_distance()
        )));
    }

    let bevel_a = BevelToothProfile::new(a).with_sections(sections);
    let bevel_b = BevelToothProfile::new(b).with_sections(sections);
    let scales = bevel_a.section_scales().map_err(degenerate)?;
    let virtual_a = GearMeshGeometry::virtual_spur(a);
    let virtual_b = GearMeshGeometry::virtual_spur(b);
    let spur_a = bevel_a.virtual_generator();
    let spur_b = bevel_b.virtual_generator();
    let (phase_a, phase_b) = (
        centered_phase(contact.phases.0),
        centered_phase(-contact.sense * contact.phases.1),
    );

    let mut areas = Vec::with_capacity(scales.len());
    for &scale in &scales {
        let factor_a = scale * bevel_a.backlash_factor(scale);
        let factor_b = scale * bevel_b.backlash_factor(scale);
        let center_distance = scale * (virtual_a.pitch_radius + virtual_b.pitch_radius);
        let outer_a = virtual_a.outer_radius * factor_a;
        let outer_b = virtual_b.outer_radius * factor_b;
        if outer_a + outer_b <= center_distance {
            areas.push(0.0);
            continue;
        }
        let side_a = window_teeth(outer_a, outer_b, center_distance, virtual_a.tooth_pitch_angle());
        let side_b = window_teeth(outer_b, outer_a, center_distance, virtual_b.tooth_pitch_angle());

        let window_a: Vec<Point2<f64>> = spur_a
            .window(phase_a, side_a)
            .map_err(degenerate)?
            .into_iter()
            .map(|p| Point2::from(p.coords * factor_a))
            .collect();
        // the mate faces back along -X from its own center
        let window_b: Vec<Point2<f64>> = spur_b
            .window(phase_b, side_b)
            .map_err(degenerate)?
            .into_iter()
            .map(|p| Point2::new(center_distance - p.x * factor_b, -p.y * factor_b))
            .collect();
        areas.push(overlap_area(&window_a, &window_b));
    }

    let volume = scales
        .windows(2)
        .zip(areas.windows(2))
        .map(|(s, area)| (area[0] + area[1]) / 2.0 * (s[0] - s[1]) * cone_distance)
        .sum();
    debug!(volume, ?areas, "Bevel mesh overlap");
    Ok(volume)
}

/// Phase folded into (-0.5, 0.5].
fn centered_phase(phase: f64) -> f64 {
    let folded = phase.rem_euclid(1.0);
    if folded > 0.5 {
        folded - 1.0
    } else {
        folded
    }
}

/// Teeth each side of the contact needed to cover the lens where the two
/// tip circles overlap.
fn window_teeth(outer: f64, other_outer: f64, center_distance: f64, pitch: f64) -> usize {
    let cos_half = (outer.powi(2) + center_distance.powi(2) - other_outer.powi(2))
        / (2.0 * outer * center_distance);
    let half = cos_half.clamp(-1.0, 1.0).acos().min(PI);
    (half / pitch).ceil() as usize + 1
}
