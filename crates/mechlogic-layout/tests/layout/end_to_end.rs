use mechlogic_layout::{
    AssemblyLayoutCalculator, KinematicModel, LogicValue, MeshKind, SelectorState,
};
use mechlogic_settings::MechanismSpec;

fn calculator() -> AssemblyLayoutCalculator {
    AssemblyLayoutCalculator::new(&MechanismSpec::default_mux()).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_default_selector_positions() {
    let layout = calculator().calculate(SelectorState::Idle).unwrap();
    let derived = &layout.derived;
    assert!(close(derived.clutch_neutral, 20.0));
    assert!(close(derived.clutch_position, 20.0));
    assert!(close(derived.gear_b_center, 32.0));
    assert!(close(derived.engagement_travel, 5.0));
    assert!(close(layout.part("gear_b").unwrap().pose.origin[0], 32.0));
}

#[test]
fn test_clutch_moves_by_travel() {
    let calculator = calculator();
    let a = calculator.calculate(SelectorState::EngagedA).unwrap();
    let b = calculator.calculate(SelectorState::EngagedB).unwrap();
    assert!(close(a.part("dog_clutch").unwrap().pose.origin[0], 15.0));
    assert!(close(b.part("dog_clutch").unwrap().pose.origin[0], 25.0));
    assert!(a.checks.engagement_is_aligned);
    assert!(b.checks.engagement_is_aligned);
}

#[test]
fn test_pivot_and_lever_angle() {
    let calculator = calculator();
    let idle = calculator.calculate(SelectorState::Idle).unwrap();
    let [x, y, z] = idle.derived.pivot;
    assert!(close(x, 20.0));
    assert!((y - 34.8).abs() < 1e-6);
    assert!(close(z, 0.0));
    assert!(close(idle.derived.lever_angle_deg, 0.0));

    let theta = (5.0f64 / 34.8).asin().to_degrees();
    let a = calculator.calculate(SelectorState::EngagedA).unwrap();
    let b = calculator.calculate(SelectorState::EngagedB).unwrap();
    assert!((a.derived.lever_angle_deg + theta).abs() < 1e-6);
    assert!((b.derived.lever_angle_deg - theta).abs() < 1e-6);
}

#[test]
fn test_bevel_apexes_meet_in_every_state() {
    for layout in calculator().calculate_all().unwrap() {
        assert!(
            layout.checks.apex_error < 1.0,
            "{}: apex error {}",
            layout.state,
            layout.checks.apex_error
        );
        let pair = layout.mesh_pair("bevel_driving", "bevel_driven").unwrap();
        assert_eq!(pair.kind, MeshKind::Bevel);
        assert!(layout.derived.bevel_mesh_distance > layout.derived.min_mesh_distance);
    }
}

#[test]
fn test_input_gears_mesh_with_selector_gears() {
    let layout = calculator().calculate(SelectorState::Idle).unwrap();
    let input_a = layout.part("input_gear_a").unwrap().pose;
    let input_b = layout.part("input_gear_b").unwrap().pose;
    assert!(close(input_a.origin[0], 0.0));
    assert!(close(input_a.origin[2], 36.0));
    assert!(close(input_b.origin[0], 32.0));
    assert!(close(input_b.origin[2], -36.0));
    for (a, b) in [("gear_a", "input_gear_a"), ("gear_b", "input_gear_b")] {
        let pair = layout.mesh_pair(a, b).unwrap();
        assert_eq!(pair.kind, MeshKind::Spur);
        assert!(close(pair.distance, 36.0));
        assert!(close(pair.relative_rotation_deg, 7.5));
    }
}

#[test]
fn test_axles_span_the_selector_features() {
    let layout = calculator().calculate(SelectorState::Idle).unwrap();
    assert!(close(layout.derived.axle_length, 58.0));
    let axle = layout.part("axle_selector").unwrap().world_bounds().unwrap();
    assert!(close(axle.min[0], -9.0));
    assert!(close(axle.max[0], 49.0));
    let bounds = layout.bounds().unwrap();
    assert!(bounds.max[1] > 34.8);
    assert!(bounds.min[2] < -36.0);
}

#[test]
fn test_layouts_for_every_state() {
    let layouts = calculator().calculate_all().unwrap();
    let states: Vec<_> = layouts.iter().map(|l| l.state).collect();
    assert_eq!(states, SelectorState::ALL.to_vec());
    for layout in &layouts {
        assert_eq!(layout.parts.len(), 13);
        assert!(layout.checks.lever_feasible);
        assert_eq!(layout.element, "mux_2to1");
    }
}

#[test]
fn test_select_input_drives_the_engaged_path() {
    let model = KinematicModel::mux();
    assert!(model.verify().is_empty());
    for s in LogicValue::ALL {
        let state = SelectorState::from_select(s);
        assert_eq!(state.select_value(), Some(s));
        let path = model.active_path(s).unwrap();
        let layout = calculator().calculate(state).unwrap();
        // the engaged gear is the one the clutch moved toward
        let gear = &path.gear_stages[0];
        let gear_x = layout.part(gear).unwrap().pose.origin[0];
        let clutch_x = layout.derived.clutch_position;
        assert!((clutch_x - gear_x).abs() < (layout.derived.clutch_neutral - gear_x).abs());
        for a in LogicValue::ALL {
            for b in LogicValue::ALL {
                let expected = if path.input == "a" { a } else { b };
                assert_eq!(model.output(a, b, s), Some(expected));
            }
        }
    }
}

#[test]
fn test_wider_spacing_lengthens_travel() {
    let mut spec = MechanismSpec::default_mux();
    spec.geometry.gear_spacing = 5.0;
    let layout = AssemblyLayoutCalculator::new(&spec)
        .unwrap()
        .calculate(SelectorState::EngagedB)
        .unwrap();
    assert!(close(layout.derived.engagement_travel, 7.0));
    assert!(close(
        layout.derived.clutch_position,
        layout.derived.clutch_neutral + 7.0
    ));
}
