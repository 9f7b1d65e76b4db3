//! # Bevel Control Zone
//!
//! The select input turns a bevel gear on an X-parallel axle above the
//! clutch. It drives a second bevel fixed to the lever, whose apex sits on
//! the lever pivot. Turning the lever by its shift angle turns the driven
//! bevel with it.

use crate::bom::{PartKind, PartMetadata};
use crate::layout::PlacedPart;
use crate::selector::SelectorZone;
use crate::shape::{GearBody, Shape};
use mechlogic_core::{MeshError, PartPose, Result};
use mechlogic_gears::{BevelGearSpec, BevelMeshAlignment, MeshAlignmentSolver};
use mechlogic_settings::Tunables;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Height of the lever pivot above the clutch axis.
pub fn pivot_height(selector: &SelectorZone, tunables: &Tunables) -> f64 {
    selector.clutch_radius + tunables.pivot_offset
}

/// Bevel pair placement around the lever pivot.
#[derive(Debug, Clone, PartialEq)]
pub struct BevelControlZone {
    pub bevel: BevelGearSpec,
    /// Shared pitch cone apex, on the pivot axis.
    pub pivot: Point3<f64>,
    pub pivot_height: f64,
    pub mesh_distance: f64,
    /// Shortest mesh distance that keeps the reference face behind the teeth.
    pub min_mesh_distance: f64,
    pub lever_angle_deg: f64,
    pub bore_radius: f64,
    pub alignment: BevelMeshAlignment,
}

impl BevelControlZone {
    /// Place the pair with the driven bevel turned to `lever_angle_deg`.
    pub fn compute(
        selector: &SelectorZone,
        tunables: &Tunables,
        bevel: BevelGearSpec,
        lever_angle_deg: f64,
    ) -> Result<Self> {
        let pivot_height = pivot_height(selector, tunables);
        let pivot = Point3::new(selector.clutch_neutral, pivot_height, 0.0);
        let mesh_distance = tunables.mesh_distance_factor * bevel.cone_distance();
        let min_mesh_distance = bevel.back_cone_axial();
        if mesh_distance < min_mesh_distance {
            return Err(MeshError::MeshDistanceBehindBackCone {
                mesh_distance,
                back_cone_axial: min_mesh_distance,
            }
            .into());
        }

        // driven bevel on the pivot axis below the lever, driving bevel on
        // the X-parallel axle through the same apex
        let alignment = MeshAlignmentSolver::bevel_pair(
            &bevel,
            &bevel,
            pivot,
            Vector3::z(),
            Vector3::x(),
            mesh_distance,
            lever_angle_deg,
        )?;
        debug!(
            pivot_height,
            mesh_distance,
            min_mesh_distance,
            apex_error = alignment.apex_error(),
            "Bevel control zone"
        );
        Ok(Self {
            bevel,
            pivot,
            pivot_height,
            mesh_distance,
            min_mesh_distance,
            lever_angle_deg,
            bore_radius: selector.bore_radius,
            alignment,
        })
    }

    pub fn driven_pose(&self) -> PartPose {
        self.alignment.reference_pose
    }

    pub fn driving_pose(&self) -> PartPose {
        self.alignment.mate_pose
    }

    pub fn body(&self) -> GearBody {
        GearBody::bevel(self.bevel, self.bore_radius, self.mesh_distance)
    }

    /// X coordinate of the driving bevel's front face.
    pub fn driving_front_x(&self) -> f64 {
        self.driving_pose()
            .transform_point(&Point3::new(0.0, 0.0, self.body().span.end))
            .x
    }

    /// Lowest Z reached by the driven bevel's reference face.
    pub fn driven_base_z(&self) -> f64 {
        self.driven_pose().origin[2]
    }

    fn metadata(&self, id: &str, name: &str) -> PartMetadata {
        let gear = self.bevel.gear();
        PartMetadata::new(id, PartKind::BevelGear, name)
            .with_dimension("teeth", gear.teeth() as f64)
            .with_dimension("module", gear.module())
            .with_dimension("pitch_diameter", gear.pitch_diameter())
            .with_dimension("cone_angle_deg", self.bevel.cone_angle_deg())
            .with_dimension("cone_distance", self.bevel.cone_distance())
            .with_dimension("face_width", self.bevel.face_width())
            .with_dimension("mesh_distance", self.mesh_distance)
            .with_dimension("bore_diameter", 2.0 * self.bore_radius)
    }

    pub fn parts(&self) -> Vec<(String, PlacedPart)> {
        vec![
            (
                "bevel_driving".to_string(),
                PlacedPart::new(
                    self.driving_pose(),
                    Shape::Gear(self.body()),
                    self.metadata("bevel_driving", "Select bevel gear"),
                ),
            ),
            (
                "bevel_driven".to_string(),
                PlacedPart::new(
                    self.driven_pose(),
                    Shape::Gear(self.body()),
                    self.metadata("bevel_driven", "Lever bevel gear"),
                ),
            ),
        ]
    }
}
