use mechlogic_core::PartPose;
use mechlogic_gears::{
    bevel_mesh_interference, spur_mesh_interference, AxialSpan, BevelGearSpec, DogClutchGeometry,
    GearSpec, MeshAlignmentSolver,
};
use nalgebra::{Point3, Vector3};

fn coaxial() -> GearSpec {
    GearSpec::new(1.5, 24, 20.0, 0.15).unwrap()
}

fn bevel() -> BevelGearSpec {
    let gear = GearSpec::new(1.5, 16, 20.0, 0.15).unwrap();
    let (gamma, _) = mechlogic_gears::pair_cone_angles(90.0, 16, 16).unwrap();
    BevelGearSpec::new(gear, gamma, None).unwrap()
}

#[test]
fn test_dog_clutch_window_brackets_reference() {
    let dog = DogClutchGeometry::new(6, 2.0, 4.6, 7.8).unwrap();
    let alignment = MeshAlignmentSolver::dog_clutch(&dog);
    let (lo, hi) = alignment.safe_window_deg;
    assert!(lo < alignment.relative_rotation_deg && alignment.relative_rotation_deg < hi);
    // a quarter pitch off the reference pose clashes
    assert!(!dog.is_safe(alignment.relative_rotation_deg + alignment.pitch_angle_deg / 4.0));
}

#[test]
fn test_input_pair_along_z_is_clear() {
    let gear = coaxial();
    // gear A lies on the X axis; its body frame sees world +Z at local 180°
    let base = PartPose::new([0.0, 0.0, 0.0], [0.0, 90.0, 0.0]);
    let mesh = MeshAlignmentSolver::spur_pair(&gear, &gear, 0.0, 180.0);
    let offset = base.transform_vector(&Vector3::new(
        mesh.translation[0],
        mesh.translation[1],
        0.0,
    ));
    assert!((offset - Vector3::new(0.0, 0.0, 36.0)).norm() < 1e-9);
    let mate = base.translated(&offset).spun(mesh.relative_rotation_deg);

    let volume = spur_mesh_interference(
        &gear,
        &base,
        AxialSpan::centered(8.0),
        &gear,
        &mate,
        AxialSpan::centered(8.0),
    )
    .unwrap();
    assert!(volume < 1e-3, "volume {volume}");

    let off = base.translated(&offset).spun(mesh.relative_rotation_deg + 3.75);
    let clash = spur_mesh_interference(
        &gear,
        &base,
        AxialSpan::centered(8.0),
        &gear,
        &off,
        AxialSpan::centered(8.0),
    )
    .unwrap();
    assert!(clash > 0.1);
}

#[test]
fn test_default_bevel_pair_is_half_tooth_and_clear() {
    let spec = bevel();
    let distance = 0.79 * spec.cone_distance();
    let apex = Point3::new(20.0, 34.8, 0.0);
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
    assert!((alignment.relative_rotation_deg - alignment.half_tooth_offset_deg).abs() < 1e-9);
    let error = alignment.reference_apex - alignment.mate_apex;
    assert!(error.x.abs() < 1.0 && error.y.abs() < 1.0 && error.z.abs() < 1.0);

    let volume = bevel_mesh_interference(
        &spec,
        &alignment.reference_pose,
        &spec,
        &alignment.mate_pose,
        distance,
        5,
    )
    .unwrap();
    assert!(volume < 1e-3, "volume {volume}");
}

#[test]
fn test_reference_spin_is_followed_by_mate() {
    let spec = bevel();
    let distance = 0.79 * spec.cone_distance();
    for spin in [0.0, 4.0, 9.5] {
        let alignment = MeshAlignmentSolver::bevel_pair(
            &spec,
            &spec,
            Point3::origin(),
            Vector3::x(),
            Vector3::z(),
            distance,
            spin,
        )
        .unwrap();
        let volume = bevel_mesh_interference(
            &spec,
            &alignment.reference_pose,
            &spec,
            &alignment.mate_pose,
            distance,
            3,
        )
        .unwrap();
        assert!(volume < 1e-3, "spin {spin}: volume {volume}");
    }
}

#[test]
fn test_unequal_bevel_pair_meets_at_apex() {
    let driving = GearSpec::new(1.5, 16, 20.0, 0.15).unwrap();
    let driven = GearSpec::new(1.5, 24, 20.0, 0.15).unwrap();
    let (a, b) = BevelGearSpec::pair(driving, driven, 90.0).unwrap();
    let distance = 0.79 * a.cone_distance();
    let alignment = MeshAlignmentSolver::bevel_pair(
        &a,
        &b,
        Point3::origin(),
        Vector3::x(),
        Vector3::z(),
        distance.max(a.back_cone_axial()).max(b.back_cone_axial()),
        0.0,
    )
    .unwrap();
    assert!(alignment.apex_error() < 1e-6);
}
