//! # Pairwise Interference
//!
//! Checks every pair of placed parts for shared volume without a solid
//! kernel. Parts are flattened into primitive leaves and every leaf pair whose
//! bounding boxes overlap is resolved by the first rule that applies:
//!
//! 1. meshing gears: tooth cross-section overlap from the gear crate
//! 2. coaxial revolved shapes: exact ring sector intersection
//! 3. cylinders whose axes are too far apart to touch
//! 4. a rod through a bore, with the axes close to parallel
//!
//! Pairs no rule covers are reported as unresolved rather than guessed.
//! Part pairs the layout marks as guided are reported separately; they are
//! clear when the lever can move the fork inside the groove.

use crate::layout::{AssemblyLayout, MeshKind};
use crate::shape::{GearBody, Leaf, RingSector, Shape};
use mechlogic_core::{AxisLine, Result};
use mechlogic_gears::{bevel_mesh_interference, spur_mesh_interference, AxialSpan, GearKind};
use mechlogic_settings::Tunables;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Distance, in mm, within which two axes count as the same line.
const COAXIAL_TOLERANCE: f64 = 1e-4;

/// Smallest |cos| between axes for the through-bore rule.
const THROUGH_BORE_MIN_COS: f64 = 0.9;

/// How a collision volume was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMethod {
    SpurMesh,
    BevelMesh,
    Coaxial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub part_a: String,
    pub part_b: String,
    /// Shared volume in mm³.
    pub volume: f64,
    pub method: OverlapMethod,
}

/// Result of checking every part pair of a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterferenceReport {
    pub collisions: Vec<Collision>,
    /// Pairs with overlapping bounds that no rule could decide.
    pub unresolved: Vec<(String, String)>,
    /// Guided pairs found clear.
    pub guided: Vec<(String, String)>,
    pub checked_pairs: usize,
}

impl InterferenceReport {
    pub fn is_clear(&self) -> bool {
        self.collisions.is_empty() && self.unresolved.is_empty()
    }

    pub fn collides(&self, a: &str, b: &str) -> bool {
        self.collision(a, b).is_some()
    }

    pub fn collision(&self, a: &str, b: &str) -> Option<&Collision> {
        self.collisions
            .iter()
            .find(|c| (c.part_a == a && c.part_b == b) || (c.part_a == b && c.part_b == a))
    }

    /// Colliding volume between two parts, zero when clear.
    pub fn volume_between(&self, a: &str, b: &str) -> f64 {
        self.collision(a, b).map_or(0.0, |c| c.volume)
    }
}

enum LeafOutcome {
    Volume(f64, OverlapMethod),
    Clear,
    Unresolved,
}

/// Pairwise interference checker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterferenceChecker {
    /// Volumes at or below this are treated as touching, not colliding.
    pub epsilon: f64,
    /// Bevel stations sampled along the face width.
    pub sections: usize,
}

impl InterferenceChecker {
    pub fn new(epsilon: f64, sections: usize) -> Self {
        Self {
            epsilon,
            sections: sections.max(2),
        }
    }

    pub fn from_tunables(tunables: &Tunables) -> Self {
        Self::new(tunables.interference_epsilon, tunables.bevel_sections)
    }

    pub fn check(&self, layout: &AssemblyLayout) -> Result<InterferenceReport> {
        let mut report = InterferenceReport::default();
        let ids: Vec<&String> = layout.parts.keys().collect();
        for (i, id_a) in ids.iter().enumerate() {
            for id_b in &ids[i + 1..] {
                report.checked_pairs += 1;
                let (part_a, part_b) = (&layout.parts[*id_a], &layout.parts[*id_b]);
                if layout.is_guided(id_a, id_b) {
                    let pair = ((*id_a).clone(), (*id_b).clone());
                    if layout.checks.lever_feasible {
                        report.guided.push(pair);
                    } else {
                        report.unresolved.push(pair);
                    }
                    continue;
                }
                let meshing = layout.mesh_pair(id_a, id_b).map(|pair| pair.kind);
                let leaves_a = part_a.shape.leaves(&part_a.pose);
                let leaves_b = part_b.shape.leaves(&part_b.pose);

                let mut volume = 0.0;
                let mut method = None;
                let mut unresolved = false;
                for leaf_a in &leaves_a {
                    for leaf_b in &leaves_b {
                        match self.leaf_pair(leaf_a, leaf_b, meshing)? {
                            LeafOutcome::Volume(v, m) => {
                                volume += v;
                                if v > 0.0 && method.is_none() {
                                    method = Some(m);
                                }
                            }
                            LeafOutcome::Clear => {}
                            LeafOutcome::Unresolved => unresolved = true,
                        }
                    }
                }
                if let Some(method) = method.filter(|_| volume > self.epsilon) {
                    debug!(a = %id_a, b = %id_b, volume, ?method, "Parts collide");
                    report.collisions.push(Collision {
                        part_a: (*id_a).clone(),
                        part_b: (*id_b).clone(),
                        volume,
                        method,
                    });
                } else if unresolved {
                    debug!(a = %id_a, b = %id_b, "Overlapping bounds left unresolved");
                    report.unresolved.push(((*id_a).clone(), (*id_b).clone()));
                }
            }
        }
        info!(
            state = %layout.state,
            pairs = report.checked_pairs,
            collisions = report.collisions.len(),
            unresolved = report.unresolved.len(),
            "Interference check"
        );
        Ok(report)
    }

    fn leaf_pair(
        &self,
        a: &Leaf<'_>,
        b: &Leaf<'_>,
        meshing: Option<MeshKind>,
    ) -> Result<LeafOutcome> {
        if !a.bounds().overlaps(&b.bounds(), 0.0) {
            return Ok(LeafOutcome::Clear);
        }
        if let (Some(kind), Shape::Gear(gear_a), Shape::Gear(gear_b)) =
            (meshing, a.shape, b.shape)
        {
            if let Some(outcome) = self.mesh_overlap(kind, a, gear_a, b, gear_b)? {
                return Ok(outcome);
            }
        }
        let (Some(ring_a), Some(ring_b)) = (a.shape.envelope(), b.shape.envelope()) else {
            return Ok(LeafOutcome::Unresolved);
        };
        if let Some(volume) = coaxial_overlap(a, &ring_a, b, &ring_b) {
            return Ok(LeafOutcome::Volume(volume, OverlapMethod::Coaxial));
        }
        if axes_apart(a, &ring_a, b, &ring_b)
            || passes_through(a, &ring_a, b, &ring_b)
            || passes_through(b, &ring_b, a, &ring_a)
        {
            return Ok(LeafOutcome::Clear);
        }
        Ok(LeafOutcome::Unresolved)
    }

    fn mesh_overlap(
        &self,
        kind: MeshKind,
        a: &Leaf<'_>,
        gear_a: &GearBody,
        b: &Leaf<'_>,
        gear_b: &GearBody,
    ) -> Result<Option<LeafOutcome>> {
        let outcome = match (kind, gear_a.kind, gear_b.kind) {
            (MeshKind::Spur, GearKind::Spur(spec_a), GearKind::Spur(spec_b)) => {
                let volume = spur_mesh_interference(
                    &spec_a,
                    &a.pose,
                    gear_a.span,
                    &spec_b,
                    &b.pose,
                    gear_b.span,
                )?;
                Some(LeafOutcome::Volume(volume, OverlapMethod::SpurMesh))
            }
            (MeshKind::Bevel, GearKind::Bevel(spec_a), GearKind::Bevel(spec_b)) => {
                match gear_a.mesh_distance {
                    Some(distance) => {
                        let volume = bevel_mesh_interference(
                            &spec_a,
                            &a.pose,
                            &spec_b,
                            &b.pose,
                            distance,
                            self.sections,
                        )?;
                        Some(LeafOutcome::Volume(volume, OverlapMethod::BevelMesh))
                    }
                    None => None,
                }
            }
            _ => None,
        };
        Ok(outcome)
    }
}

fn axis_line(leaf: &Leaf<'_>) -> AxisLine {
    AxisLine::new(leaf.pose.origin_point(), leaf.axis())
}

/// Angle shared by two arcs given as `(start, sweep)` in degrees.
fn arc_overlap(a_start: f64, a_sweep: f64, b_start: f64, b_sweep: f64) -> f64 {
    if a_sweep >= 360.0 {
        return b_sweep.min(360.0);
    }
    if b_sweep >= 360.0 {
        return a_sweep;
    }
    let d = (b_start - a_start).rem_euclid(360.0);
    (a_sweep.min(d + b_sweep) - d).max(0.0) + a_sweep.min(d + b_sweep - 360.0).max(0.0)
}

/// Shared volume of two revolved leaves on the same axis line, `None` when
/// the axes differ.
fn coaxial_overlap(
    a: &Leaf<'_>,
    ring_a: &RingSector,
    b: &Leaf<'_>,
    ring_b: &RingSector,
) -> Option<f64> {
    let line_a = axis_line(a);
    let line_b = axis_line(b);
    let direction = if line_a.coincides_with(&line_b, COAXIAL_TOLERANCE) {
        1.0
    } else if line_a.coincides_with(&line_b.reversed(), COAXIAL_TOLERANCE) {
        -1.0
    } else {
        return None;
    };

    let to_a = a.pose.rotation().inverse();
    let offset = to_a * (b.pose.origin_point() - a.pose.origin_point());
    let span_b = AxialSpan::new(
        offset.z + direction * ring_b.span.start,
        offset.z + direction * ring_b.span.end,
    );
    let axial = ring_a.span.overlap(&span_b);
    let inner = ring_a.inner_radius.max(ring_b.inner_radius);
    let outer = ring_a.outer_radius.min(ring_b.outer_radius);
    if axial <= 0.0 || outer <= inner {
        return Some(0.0);
    }

    // B's angular origin seen from A's frame
    let x_b = to_a * b.pose.rotation() * Vector3::x();
    let phi = x_b.y.atan2(x_b.x).to_degrees();
    let sweep: f64 = ring_a
        .sectors
        .iter()
        .flat_map(|&(start_a, sweep_a)| {
            ring_b.sectors.iter().map(move |&(start_b, sweep_b)| {
                let start = if direction > 0.0 {
                    phi + start_b
                } else {
                    phi - start_b - sweep_b
                };
                arc_overlap(start_a, sweep_a, start, sweep_b)
            })
        })
        .sum();
    Some(sweep.to_radians() / 2.0 * (outer * outer - inner * inner) * axial)
}

/// Infinite cylinders around the two axes cannot touch.
fn axes_apart(a: &Leaf<'_>, ring_a: &RingSector, b: &Leaf<'_>, ring_b: &RingSector) -> bool {
    let line_a = axis_line(a);
    let line_b = axis_line(b);
    let da = line_a.direction.into_inner();
    let db = line_b.direction.into_inner();
    let cross = da.cross(&db);
    let gap = if cross.norm() < 1e-9 {
        line_a.distance_to(&line_b.origin)
    } else {
        (line_b.origin - line_a.origin).dot(&cross).abs() / cross.norm()
    };
    gap >= ring_a.outer_radius + ring_b.outer_radius
}

/// A solid rod `rod` stays inside the bore of `ring`.
///
/// The rod is bounded by a cylinder around its axis; within the ring's
/// axial slab that cylinder drifts from the ring axis by at most the tilt
/// terms below.
fn passes_through(
    rod_leaf: &Leaf<'_>,
    rod: &RingSector,
    ring_leaf: &Leaf<'_>,
    ring: &RingSector,
) -> bool {
    if rod.inner_radius > 0.0 || ring.inner_radius <= 0.0 {
        return false;
    }
    let rod_line = axis_line(rod_leaf);
    let cos = rod_line
        .direction
        .dot(&ring_leaf.axis().normalize())
        .abs()
        .min(1.0);
    if cos < THROUGH_BORE_MIN_COS {
        return false;
    }
    let sin = (1.0 - cos * cos).sqrt();
    let tan = sin / cos;
    let mid = ring_leaf.pose.transform_point(&Point3::new(
        0.0,
        0.0,
        (ring.span.start + ring.span.end) / 2.0,
    ));
    let d = rod_line.distance_to(&mid);
    let half = ring.span.length() / 2.0;
    let reach = d * (1.0 + tan) + half * tan + rod.outer_radius * (1.0 + sin * tan);
    reach < ring.inner_radius
}
