use mechlogic_core::PartPose;
use mechlogic_layout::{
    AssemblyLayout, AssemblyLayoutCalculator, InterferenceChecker, InterferenceReport,
    OverlapMethod, SelectorState,
};
use mechlogic_settings::MechanismSpec;

fn layout(state: SelectorState) -> AssemblyLayout {
    AssemblyLayoutCalculator::new(&MechanismSpec::default_mux())
        .unwrap()
        .calculate(state)
        .unwrap()
}

fn check(layout: &AssemblyLayout) -> InterferenceReport {
    InterferenceChecker::from_tunables(&MechanismSpec::default_mux().tunables)
        .check(layout)
        .unwrap()
}

fn spin_part(layout: &AssemblyLayout, part_id: &str, degrees: f64) -> AssemblyLayout {
    let pose = layout.part(part_id).unwrap().pose.spun(degrees);
    layout.with_pose(part_id, pose).unwrap()
}

#[test]
fn test_every_state_is_clear() {
    for state in SelectorState::ALL {
        let report = check(&layout(state));
        assert!(
            report.is_clear(),
            "{}: collisions {:?}, unresolved {:?}",
            state,
            report.collisions,
            report.unresolved
        );
        assert_eq!(report.checked_pairs, 13 * 12 / 2);
        assert_eq!(report.guided.len(), 1);
    }
}

#[test]
fn test_misaligned_clutch_collides_with_engaged_gear() {
    let engaged = layout(SelectorState::EngagedA);
    for degrees in [15.0, 30.0] {
        let report = check(&spin_part(&engaged, "dog_clutch", degrees));
        let collision = report.collision("dog_clutch", "gear_a").unwrap();
        assert_eq!(collision.method, OverlapMethod::Coaxial);
        assert!(collision.volume > 1.0, "{degrees}: {}", collision.volume);
        assert!(!report.collides("dog_clutch", "gear_b"));
    }
}

#[test]
fn test_misaligned_clutch_is_harmless_when_idle() {
    let idle = layout(SelectorState::Idle);
    let report = check(&spin_part(&idle, "dog_clutch", 30.0));
    assert!(report.is_clear());
}

#[test]
fn test_clutch_overtravel_collides() {
    let engaged = layout(SelectorState::EngagedA);
    let pose = engaged.part("dog_clutch").unwrap().pose;
    let pushed = pose.translated(&nalgebra::Vector3::new(-1.0, 0.0, 0.0));
    let report = check(&engaged.with_pose("dog_clutch", pushed).unwrap());
    assert!(report.collides("dog_clutch", "gear_a"));
}

#[test]
fn test_misaligned_bevel_collides() {
    let engaged = layout(SelectorState::EngagedB);
    for degrees in [11.25, 5.625] {
        let report = check(&spin_part(&engaged, "bevel_driving", degrees));
        let collision = report.collision("bevel_driving", "bevel_driven").unwrap();
        assert_eq!(collision.method, OverlapMethod::BevelMesh);
        assert!(collision.volume > 0.0);
    }
}

#[test]
fn test_misaligned_input_gear_collides() {
    let idle = layout(SelectorState::Idle);
    let report = check(&spin_part(&idle, "input_gear_a", 3.75));
    let collision = report.collision("gear_a", "input_gear_a").unwrap();
    assert_eq!(collision.method, OverlapMethod::SpurMesh);
    assert!(!report.collides("gear_b", "input_gear_b"));
}

#[test]
fn test_moving_a_part_away_clears_its_mesh() {
    let idle = layout(SelectorState::Idle);
    let pose = idle.part("input_gear_a").unwrap().pose;
    let moved = PartPose::new([pose.origin[0], pose.origin[1], 80.0], pose.rotation_deg);
    let report = check(&spin_part(
        &idle.with_pose("input_gear_a", moved).unwrap(),
        "input_gear_a",
        3.75,
    ));
    assert!(!report.collides("gear_a", "input_gear_a"));
}

#[test]
fn test_infeasible_lever_leaves_guided_pair_unresolved() {
    let mut spec = MechanismSpec::default_mux();
    // pivot 15 mm above the axle swings the fork past the groove walls
    spec.tunables.pivot_offset = 7.2;
    let layout = AssemblyLayoutCalculator::new(&spec)
        .unwrap()
        .calculate(SelectorState::EngagedA)
        .unwrap();
    assert!(!layout.checks.lever_feasible);
    let report = InterferenceChecker::from_tunables(&spec.tunables)
        .check(&layout)
        .unwrap();
    assert!(report
        .unresolved
        .iter()
        .any(|(a, b)| a == "dog_clutch" && b == "shift_lever"));
    assert!(!report.is_clear());
}
