//! # Input Shaft Zone
//!
//! Inputs A and B each drive their selector gear through an equal spur gear
//! on a parallel shaft: input A one pitch diameter toward +Z from gear A,
//! input B one pitch diameter toward -Z from gear B.

use crate::bom::{PartKind, PartMetadata};
use crate::layout::PlacedPart;
use crate::selector::SelectorZone;
use crate::shape::{GearBody, Shape};
use mechlogic_core::PartPose;
use mechlogic_gears::{AxialSpan, GearSpec, MeshAlignmentSolver, SpurMeshAlignment};
use nalgebra::Vector3;
use tracing::debug;

/// Mesh direction, in the selector gear's body frame, that points toward +Z.
const TOWARD_POSITIVE_Z_DEG: f64 = 180.0;
const TOWARD_NEGATIVE_Z_DEG: f64 = 0.0;

/// One input gear meshed with its selector gear.
#[derive(Debug, Clone, PartialEq)]
pub struct InputMesh {
    pub part_id: String,
    pub input: String,
    /// Selector gear it drives.
    pub mate_id: String,
    pub alignment: SpurMeshAlignment,
    pub pose: PartPose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputShaftZone {
    pub gear: GearSpec,
    pub face_width: f64,
    pub bore_radius: f64,
    pub input_a: InputMesh,
    pub input_b: InputMesh,
}

fn mesh_with(
    part_id: &str,
    input: &str,
    mate_id: &str,
    gear: &GearSpec,
    mate_pose: &PartPose,
    direction_deg: f64,
) -> InputMesh {
    let alignment = MeshAlignmentSolver::spur_pair(gear, gear, 0.0, direction_deg);
    let [tx, ty] = alignment.translation;
    let pose = mate_pose
        .translated(&mate_pose.transform_vector(&Vector3::new(tx, ty, 0.0)))
        .spun(alignment.relative_rotation_deg);
    InputMesh {
        part_id: part_id.to_string(),
        input: input.to_string(),
        mate_id: mate_id.to_string(),
        alignment,
        pose,
    }
}

impl InputShaftZone {
    pub fn compute(selector: &SelectorZone) -> Self {
        let gear = selector.gear;
        let input_a = mesh_with(
            "input_gear_a",
            "a",
            "gear_a",
            &gear,
            &selector.gear_a_pose(),
            TOWARD_POSITIVE_Z_DEG,
        );
        let input_b = mesh_with(
            "input_gear_b",
            "b",
            "gear_b",
            &gear,
            &selector.gear_b_pose(),
            TOWARD_NEGATIVE_Z_DEG,
        );
        debug!(
            center_distance = input_a.alignment.center_distance,
            spin_deg = input_a.alignment.relative_rotation_deg,
            "Input shaft zone"
        );
        Self {
            gear,
            face_width: selector.face_width,
            bore_radius: selector.bore_radius,
            input_a,
            input_b,
        }
    }

    pub fn meshes(&self) -> [&InputMesh; 2] {
        [&self.input_a, &self.input_b]
    }

    pub fn shape(&self) -> Shape {
        Shape::Gear(GearBody::spur(
            self.gear,
            self.bore_radius,
            AxialSpan::new(0.0, self.face_width),
        ))
    }

    pub fn parts(&self) -> Vec<(String, PlacedPart)> {
        self.meshes()
            .into_iter()
            .map(|mesh| {
                let metadata = PartMetadata::new(
                    mesh.part_id.as_str(),
                    PartKind::SpurGear,
                    "Input spur gear",
                )
                .with_dimension("teeth", self.gear.teeth() as f64)
                .with_dimension("module", self.gear.module())
                .with_dimension("pitch_diameter", self.gear.pitch_diameter())
                .with_dimension("outer_diameter", self.gear.outer_diameter())
                .with_dimension("face_width", self.face_width)
                .with_dimension("bore_diameter", 2.0 * self.bore_radius)
                .with_notes(format!("drives {} from input {}", mesh.mate_id, mesh.input));
                (
                    mesh.part_id.clone(),
                    PlacedPart::new(mesh.pose, self.shape(), metadata),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::SelectorState;
    use mechlogic_settings::MechanismSpec;

    #[test]
    fn test_input_gears_one_pitch_diameter_away() {
        let spec = MechanismSpec::default_mux();
        let gear = GearSpec::new(1.5, 24, 20.0, 0.15).unwrap();
        let selector = SelectorZone::compute(&spec, &gear, SelectorState::Idle).unwrap();
        let zone = InputShaftZone::compute(&selector);

        let a = zone.input_a.pose.origin;
        assert!(a[0].abs() < 1e-9 && a[1].abs() < 1e-9);
        assert!((a[2] - 36.0).abs() < 1e-9);
        let b = zone.input_b.pose.origin;
        assert!((b[0] - 32.0).abs() < 1e-9);
        assert!((b[2] + 36.0).abs() < 1e-9);
        assert!((zone.input_a.alignment.relative_rotation_deg - 7.5).abs() < 1e-9);
    }
}
