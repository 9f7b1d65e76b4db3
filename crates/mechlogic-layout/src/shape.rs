//! # Shape Models
//!
//! Analytic shapes of placed parts, expressed in each part's body frame.
//! Revolved shapes turn about body +Z and their angles run from body +X
//! toward body +Y. A part is a tree of shapes; the leaves are the primitives
//! that interference checks and the solid kernel work on.

use mechlogic_core::{Aabb, PartPose};
use mechlogic_gears::{AxialSpan, BevelGearSpec, GearKind, GearSpec};
use nalgebra::{Point3, Vector3};

/// Annular prism about body Z, optionally limited to angular sectors.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSector {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub span: AxialSpan,
    /// `(start, sweep)` pairs in degrees. A 360° sweep is a full ring.
    pub sectors: Vec<(f64, f64)>,
}

impl RingSector {
    /// Full annulus. An inner radius of zero gives a solid cylinder.
    pub fn full(inner_radius: f64, outer_radius: f64, span: AxialSpan) -> Self {
        Self {
            inner_radius,
            outer_radius,
            span,
            sectors: vec![(0.0, 360.0)],
        }
    }

    /// Annulus limited to the given sectors.
    pub fn sectors(
        inner_radius: f64,
        outer_radius: f64,
        span: AxialSpan,
        sectors: Vec<(f64, f64)>,
    ) -> Self {
        Self {
            inner_radius,
            outer_radius,
            span,
            sectors,
        }
    }

    pub fn is_full(&self) -> bool {
        self.sectors.iter().any(|(_, sweep)| *sweep >= 360.0 - 1e-9)
    }

    /// Total angular sweep in degrees, capped at a full turn.
    pub fn total_sweep_deg(&self) -> f64 {
        self.sectors
            .iter()
            .map(|(_, sweep)| *sweep)
            .sum::<f64>()
            .min(360.0)
    }

    pub fn volume(&self) -> f64 {
        self.total_sweep_deg().to_radians() / 2.0
            * (self.outer_radius.powi(2) - self.inner_radius.powi(2))
            * self.span.length()
    }
}

/// Toothed gear body around a bore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearBody {
    pub kind: GearKind,
    pub bore_radius: f64,
    /// Axial extent of the toothed body along body Z.
    pub span: AxialSpan,
    /// Reference face to pitch cone apex; bevel gears only.
    pub mesh_distance: Option<f64>,
}

impl GearBody {
    /// Spur gear occupying `span`.
    pub fn spur(spec: GearSpec, bore_radius: f64, span: AxialSpan) -> Self {
        Self {
            kind: GearKind::Spur(spec),
            bore_radius,
            span,
            mesh_distance: None,
        }
    }

    /// Bevel gear with its reference face at `z = 0` and the pitch cone apex
    /// at `z = mesh_distance`. The teeth run from the back face toward the
    /// apex for one face width.
    pub fn bevel(spec: BevelGearSpec, bore_radius: f64, mesh_distance: f64) -> Self {
        let back = mesh_distance - spec.back_cone_axial();
        let front = back + spec.face_width() * spec.cone_angle_deg().to_radians().cos();
        Self {
            kind: GearKind::Bevel(spec),
            bore_radius,
            span: AxialSpan::new(back, front),
            mesh_distance: Some(mesh_distance),
        }
    }

    /// Tip radius at the back face.
    pub fn outer_radius(&self) -> f64 {
        self.kind.gear().outer_radius()
    }

    /// Revolved envelope of the teeth and web.
    pub fn envelope(&self) -> RingSector {
        RingSector::full(self.bore_radius, self.outer_radius(), self.span)
    }
}

/// Shape of a part or of one of its bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Ring(RingSector),
    /// Box in the body frame.
    Block(Aabb),
    Gear(GearBody),
    /// Sub-bodies placed relative to the parent body frame.
    Composite(Vec<(PartPose, Shape)>),
}

/// A primitive shape placed in the assembly frame.
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    pub pose: PartPose,
    pub shape: &'a Shape,
}

impl Shape {
    /// Flatten composites into primitives placed by `pose`.
    pub fn leaves(&self, pose: &PartPose) -> Vec<Leaf<'_>> {
        let mut out = Vec::new();
        self.collect_leaves(pose, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, pose: &PartPose, out: &mut Vec<Leaf<'a>>) {
        match self {
            Shape::Composite(children) => {
                for (local, child) in children {
                    child.collect_leaves(&pose.compose(local), out);
                }
            }
            _ => out.push(Leaf {
                pose: *pose,
                shape: self,
            }),
        }
    }

    /// Revolved envelope, for rings and gears.
    pub fn envelope(&self) -> Option<RingSector> {
        match self {
            Shape::Ring(ring) => Some(ring.clone()),
            Shape::Gear(gear) => Some(gear.envelope()),
            _ => None,
        }
    }

    /// First gear body in the tree.
    pub fn gear(&self) -> Option<&GearBody> {
        match self {
            Shape::Gear(gear) => Some(gear),
            Shape::Composite(children) => children.iter().find_map(|(_, child)| child.gear()),
            _ => None,
        }
    }

    /// Assembly frame bounding box of the whole tree.
    pub fn world_bounds(&self, pose: &PartPose) -> Option<Aabb> {
        self.leaves(pose)
            .iter()
            .map(Leaf::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

impl Leaf<'_> {
    /// Assembly frame bounding box.
    ///
    /// Revolved shapes use the exact box of their full cylinder, so sector
    /// limits are ignored.
    pub fn bounds(&self) -> Aabb {
        match self.shape.envelope() {
            Some(ring) => cylinder_bounds(&self.pose, ring.outer_radius, ring.span),
            None => match self.shape {
                Shape::Block(block) => block.transformed(&self.pose),
                // composites never appear as leaves
                _ => Aabb::new(self.pose.origin, self.pose.origin),
            },
        }
    }

    /// Unit axis of a revolved leaf in the assembly frame.
    pub fn axis(&self) -> Vector3<f64> {
        self.pose.transform_vector(&Vector3::z())
    }
}

fn cylinder_bounds(pose: &PartPose, radius: f64, span: AxialSpan) -> Aabb {
    let axis = pose.transform_vector(&Vector3::z());
    let c0 = pose.transform_point(&Point3::new(0.0, 0.0, span.start));
    let c1 = pose.transform_point(&Point3::new(0.0, 0.0, span.end));
    let mut min = [0.0; 3];
    let mut max = [0.0; 3];
    for i in 0..3 {
        let extent = radius * (1.0 - axis[i] * axis[i]).max(0.0).sqrt();
        min[i] = c0[i].min(c1[i]) - extent;
        max[i] = c0[i].max(c1[i]) + extent;
    }
    Aabb { min, max }
}
