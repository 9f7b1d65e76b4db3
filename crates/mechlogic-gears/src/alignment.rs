//! # Mesh Alignment Solver
//!
//! Computes relative rotations and placements that make meshing teeth
//! interleave: one gear's tooth centerline lands on the other's gap
//! centerline.
//!
//! Gears are authored with their axis on body +Z and tooth 0 centered on
//! body +X. Bevel gears point their teeth toward +Z, with the pitch cone apex
//! at `z = mesh_distance` from the reference face at the body origin.
//! Solutions rotate in the body frame first, then translate.

use crate::dog_clutch::DogClutchGeometry;
use crate::mesh_geometry::GearMeshGeometry;
use crate::spec::{BevelGearSpec, GearSpec};
use mechlogic_core::{rotation_between, wrap_deg, MeshError, PartPose};
use nalgebra::{Point3, Rotation3, Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tolerance for apex coincidence, millimetres.
pub const APEX_TOLERANCE: f64 = 1e-6;

/// Tolerance for shaft angle checks, degrees.
pub const SHAFT_ANGLE_TOLERANCE_DEG: f64 = 1e-3;

/// Placement of a dog clutch against a gear's dog teeth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DogClutchAlignment {
    /// Reference relative rotation: half the dog pitch.
    pub relative_rotation_deg: f64,
    pub pitch_angle_deg: f64,
    /// Relative rotations (mod pitch) that interleave safely.
    pub safe_window_deg: (f64, f64),
}

/// Placement of a spur gear against another on a parallel axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpurMeshAlignment {
    pub center_distance: f64,
    /// Direction from the driver's center to the driven center, driver body frame.
    pub direction_deg: f64,
    /// Driven center relative to the driver center.
    pub translation: [f64; 2],
    /// Spin of the driven gear about its own axis, wrapped into one tooth pitch.
    pub relative_rotation_deg: f64,
    pub tooth_pitch_angle_deg: f64,
    pub half_tooth_offset_deg: f64,
}

impl SpurMeshAlignment {
    pub fn translation_vector(&self) -> Vector2<f64> {
        Vector2::new(self.translation[0], self.translation[1])
    }
}

/// Placement of two bevel gears sharing a pitch cone apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BevelMeshAlignment {
    pub reference_pose: PartPose,
    pub mate_pose: PartPose,
    /// Spin of the mate about its own axis after the flip.
    pub relative_rotation_deg: f64,
    /// Half turn that turns the mate's teeth toward the reference gear.
    pub flip_deg: f64,
    pub mesh_distance: f64,
    /// Apex of each gear recomputed from its pose.
    pub reference_apex: Point3<f64>,
    pub mate_apex: Point3<f64>,
    pub tooth_pitch_angle_deg: f64,
    pub half_tooth_offset_deg: f64,
}

impl BevelMeshAlignment {
    /// Largest per-axis difference between the two apex points.
    pub fn apex_error(&self) -> f64 {
        let d = self.reference_apex - self.mate_apex;
        d.x.abs().max(d.y.abs()).max(d.z.abs())
    }
}

/// Where two bevel gears touch along their shared pitch cone element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BevelContact {
    /// Shared apex.
    pub apex: Point3<f64>,
    /// Unit direction of the shared pitch cone element, from the apex outward.
    pub element: Vector3<f64>,
    /// Tooth phase of each gear at the element, as a fraction of its pitch.
    pub phases: (f64, f64),
    /// -1 when the gears' angular senses oppose at the contact, +1 otherwise.
    pub sense: f64,
}

/// Stateless solver for the three mesh types.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshAlignmentSolver;

impl MeshAlignmentSolver {
    /// Coaxial dog clutch: half a dog pitch is the reference safe pose.
    pub fn dog_clutch(dog: &DogClutchGeometry) -> DogClutchAlignment {
        let pitch = dog.pitch_angle_deg();
        DogClutchAlignment {
            relative_rotation_deg: pitch / 2.0,
            pitch_angle_deg: pitch,
            safe_window_deg: dog.safe_window_deg(),
        }
    }

    /// Spur pair on parallel axes.
    ///
    /// `direction_deg` points from the driver's center to the driven center in
    /// the driver's body frame; `driver_spin_deg` is the driver's own spin.
    pub fn spur_pair(
        driver: &GearSpec,
        driven: &GearSpec,
        driver_spin_deg: f64,
        direction_deg: f64,
    ) -> SpurMeshAlignment {
        let a = GearMeshGeometry::spur(driver);
        let b = GearMeshGeometry::spur(driven);
        let center_distance = a.center_distance(&b);
        let phase = wrap_deg(direction_deg - driver_spin_deg, a.tooth_pitch_angle_deg)
            / a.tooth_pitch_angle_deg;
        let spin = wrap_deg(
            direction_deg + 180.0 + (phase + 0.5) * b.tooth_pitch_angle_deg,
            b.tooth_pitch_angle_deg,
        );
        let (s, c) = direction_deg.to_radians().sin_cos();
        debug!(
            center_distance,
            direction_deg,
            driven_spin_deg = spin,
            "Solved spur mesh"
        );
        SpurMeshAlignment {
            center_distance,
            direction_deg,
            translation: [c * center_distance, s * center_distance],
            relative_rotation_deg: spin,
            tooth_pitch_angle_deg: b.tooth_pitch_angle_deg,
            half_tooth_offset_deg: b.half_tooth_offset_deg,
        }
    }

    /// Bevel pair meeting at `apex`.
    ///
    /// `reference_axis` and `mate_axis` point from each gear toward the apex.
    /// The reference gear keeps `reference_spin_deg`; the mate is flipped and
    /// spun so that its gap faces the reference tooth on the shared pitch
    /// element.
    pub fn bevel_pair(
        reference: &BevelGearSpec,
        mate: &BevelGearSpec,
        apex: Point3<f64>,
        reference_axis: Vector3<f64>,
        mate_axis: Vector3<f64>,
        mesh_distance: f64,
        reference_spin_deg: f64,
    ) -> Result<BevelMeshAlignment, MeshError> {
        for spec in [reference, mate] {
            let back_cone_axial = spec.back_cone_axial();
            if mesh_distance < back_cone_axial - APEX_TOLERANCE {
                return Err(MeshError::MeshDistanceBehindBackCone {
                    mesh_distance,
                    back_cone_axial,
                });
            }
        }
        let z1 = unit(reference_axis)?;
        let z2 = unit(mate_axis)?;
        let expected = reference.cone_angle_deg() + mate.cone_angle_deg();
        let actual = z1.dot(&z2).clamp(-1.0, 1.0).acos().to_degrees();
        if (expected - actual).abs() > SHAFT_ANGLE_TOLERANCE_DEG {
            return Err(MeshError::ShaftAngleMismatch {
                expected_deg: expected,
                actual_deg: actual,
            });
        }

        let reference_rot = rotation_between(&Vector3::z(), &z1)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), reference_spin_deg.to_radians());
        let flip = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
        let mate_base = rotation_between(&-Vector3::z(), &z2) * flip;

        let element = pitch_element(&z1, &z2, reference.cone_angle_deg())?;
        let p1 = 360.0 / reference.gear().teeth() as f64;
        let p2 = 360.0 / mate.gear().teeth() as f64;
        let psi1 = body_angle_deg(&reference_rot, &element);
        let psi2 = body_angle_deg(&mate_base, &element);
        let f1 = wrap_deg(psi1, p1) / p1;
        let sense = contact_sense(&z1, &z2, &element);
        let spin = wrap_deg(psi2 - sense * f1 * p2 + p2 / 2.0, p2);
        let mate_rot =
            mate_base * Rotation3::from_axis_angle(&Vector3::z_axis(), spin.to_radians());

        let reference_pose = PartPose::from_parts(apex - z1 * mesh_distance, &reference_rot);
        let mate_pose = PartPose::from_parts(apex - z2 * mesh_distance, &mate_rot);
        let alignment = BevelMeshAlignment {
            reference_apex: apex_of(&reference_pose, mesh_distance),
            mate_apex: apex_of(&mate_pose, mesh_distance),
            reference_pose,
            mate_pose,
            relative_rotation_deg: spin,
            flip_deg: 180.0,
            mesh_distance,
            tooth_pitch_angle_deg: p2,
            half_tooth_offset_deg: p2 / 2.0,
        };
        debug!(
            mesh_distance,
            relative_rotation_deg = spin,
            apex_error = alignment.apex_error(),
            "Solved bevel mesh"
        );
        Ok(alignment)
    }

    /// Contact description of two posed bevel gears.
    ///
    /// Fails when the apexes recomputed from the poses do not coincide.
    pub fn bevel_contact(
        first: &BevelGearSpec,
        first_pose: &PartPose,
        second: &BevelGearSpec,
        second_pose: &PartPose,
        mesh_distance: f64,
    ) -> Result<BevelContact, MeshError> {
        let apex1 = apex_of(first_pose, mesh_distance);
        let apex2 = apex_of(second_pose, mesh_distance);
        let distance = (apex1 - apex2).norm();
        if distance > 1e-3 {
            return Err(MeshError::ApexMismatch { distance });
        }
        let r1 = first_pose.rotation();
        let r2 = second_pose.rotation();
        let z1 = r1 * Vector3::z();
        let z2 = r2 * Vector3::z();
        let element = pitch_element(&z1, &z2, first.cone_angle_deg())?;
        let p1 = 360.0 / first.gear().teeth() as f64;
        let p2 = 360.0 / second.gear().teeth() as f64;
        Ok(BevelContact {
            apex: Point3::from((apex1.coords + apex2.coords) / 2.0),
            element,
            phases: (
                wrap_deg(body_angle_deg(&r1, &element), p1) / p1,
                wrap_deg(body_angle_deg(&r2, &element), p2) / p2,
            ),
            sense: contact_sense(&z1, &z2, &element),
        })
    }
}

/// Apex of a bevel gear placed at `pose`.
pub fn apex_of(pose: &PartPose, mesh_distance: f64) -> Point3<f64> {
    pose.transform_point(&Point3::new(0.0, 0.0, mesh_distance))
}

fn unit(v: Vector3<f64>) -> Result<Vector3<f64>, MeshError> {
    Unit::try_new(v, 1e-12)
        .map(|u| u.into_inner())
        .ok_or_else(|| MeshError::Degenerate("zero length shaft axis".to_string()))
}

/// Direction of the shared pitch cone element, from the apex outward.
fn pitch_element(
    z1: &Vector3<f64>,
    z2: &Vector3<f64>,
    first_cone_angle_deg: f64,
) -> Result<Vector3<f64>, MeshError> {
    let u1 = -z1;
    let u2 = -z2;
    let across = u2 - u1 * u2.dot(&u1);
    let across = Unit::try_new(across, 1e-9)
        .ok_or_else(|| MeshError::Degenerate("bevel shafts are parallel".to_string()))?;
    let gamma = first_cone_angle_deg.to_radians();
    Ok(u1 * gamma.cos() + across.into_inner() * gamma.sin())
}

/// Body frame polar angle of a world direction, degrees.
fn body_angle_deg(rotation: &Rotation3<f64>, world: &Vector3<f64>) -> f64 {
    let local = rotation.inverse() * world;
    local.y.atan2(local.x).to_degrees()
}

/// Sign of the dot product of the two gears' counter-clockwise tangents at
/// the contact point.
fn contact_sense(z1: &Vector3<f64>, z2: &Vector3<f64>, element: &Vector3<f64>) -> f64 {
    let tangent = |z: &Vector3<f64>| {
        let radial = element - z * element.dot(z);
        z.cross(&radial)
    };
    if tangent(z1).dot(&tangent(z2)) < 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_bevel() -> BevelGearSpec {
        let gear = GearSpec::new(1.5, 16, 20.0, 0.15).unwrap();
        BevelGearSpec::new(gear, 45.0, None).unwrap()
    }

    #[test]
    fn test_dog_clutch_half_pitch() {
        let dog = DogClutchGeometry::new(6, 2.0, 4.6, 7.8).unwrap();
        let alignment = MeshAlignmentSolver::dog_clutch(&dog);
        assert!((alignment.relative_rotation_deg - 30.0).abs() < 1e-12);
        assert!(dog.is_safe(alignment.relative_rotation_deg));
    }

    #[test]
    fn test_spur_pair_equal_even_gears() {
        let gear = GearSpec::standard(1.5, 24).unwrap();
        let alignment = MeshAlignmentSolver::spur_pair(&gear, &gear, 0.0, 0.0);
        assert!((alignment.center_distance - 36.0).abs() < 1e-12);
        assert!((alignment.relative_rotation_deg - alignment.half_tooth_offset_deg).abs() < 1e-9);
        assert!((alignment.translation[0] - 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_spur_pair_tracks_driver_spin() {
        let gear = GearSpec::standard(1.5, 24).unwrap();
        let base = MeshAlignmentSolver::spur_pair(&gear, &gear, 0.0, 0.0);
        let turned = MeshAlignmentSolver::spur_pair(&gear, &gear, 5.0, 0.0);
        // driver turns CCW, driven must turn CW by the same amount
        let delta = wrap_deg(base.relative_rotation_deg - turned.relative_rotation_deg, 15.0);
        assert!((delta - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bevel_pair_half_tooth_offset() {
        let spec = default_bevel();
        let apex = Point3::new(20.0, 34.8, 0.0);
        let distance = 0.79 * spec.cone_distance();
        let alignment = MeshAlignmentSolver::bevel_pair(
            &spec,
            &spec,
            apex,
            Vector3::x(),
            Vector3::z(),
            distance,
            0.0,
        )
        .unwrap();
        assert!((alignment.relative_rotation_deg - 11.25).abs() < 1e-9);
        assert!((alignment.flip_deg - 180.0).abs() < 1e-12);
        assert!(alignment.apex_error() < 1e-6);
        assert!((alignment.reference_apex - apex).norm() < 1e-6);
    }

    #[test]
    fn test_bevel_pair_rejects_wrong_shaft_angle() {
        let spec = default_bevel();
        let err = MeshAlignmentSolver::bevel_pair(
            &spec,
            &spec,
            Point3::origin(),
            Vector3::x(),
            Vector3::new(1.0, 1.0, 0.0),
            14.0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::ShaftAngleMismatch { .. }));
    }

    #[test]
    fn test_bevel_pair_rejects_short_mesh_distance() {
        let spec = default_bevel();
        let err = MeshAlignmentSolver::bevel_pair(
            &spec,
            &spec,
            Point3::origin(),
            Vector3::x(),
            Vector3::z(),
            10.0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::MeshDistanceBehindBackCone { .. }));
    }

    #[test]
    fn test_bevel_contact_phases_interleave() {
        let spec = default_bevel();
        let distance = 0.79 * spec.cone_distance();
        let alignment = MeshAlignmentSolver::bevel_pair(
            &spec,
            &spec,
            Point3::origin(),
            Vector3::x(),
            Vector3::z(),
            distance,
            0.0,
        )
        .unwrap();
        let contact = MeshAlignmentSolver::bevel_contact(
            &spec,
            &alignment.reference_pose,
            &spec,
            &alignment.mate_pose,
            distance,
        )
        .unwrap();
        let (f1, f2) = contact.phases;
        // tooth on the element for one gear, gap for the other
        let f1 = if f1 > 0.5 { f1 - 1.0 } else { f1 };
        assert!(f1.abs() < 1e-6);
        assert!((f2 - 0.5).abs() < 1e-6);
        assert_eq!(contact.sense, -1.0);
    }
}
