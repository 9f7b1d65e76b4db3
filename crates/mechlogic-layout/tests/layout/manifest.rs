use mechlogic_layout::{
    bill_of_materials, to_manifest_json, AssemblyLayoutCalculator, Manifest, PartKind,
    SelectorState,
};
use mechlogic_settings::MechanismSpec;
use tempfile::TempDir;

fn layout(state: SelectorState) -> mechlogic_layout::AssemblyLayout {
    AssemblyLayoutCalculator::new(&MechanismSpec::default_mux())
        .unwrap()
        .calculate(state)
        .unwrap()
}

#[test]
fn test_bill_of_materials_groups_identical_parts() {
    let bom = bill_of_materials(&layout(SelectorState::Idle));
    assert_eq!(bom.iter().map(|line| line.quantity).sum::<u32>(), 13);
    assert_eq!(bom.len(), 12);

    let inputs = bom
        .iter()
        .find(|line| line.name == "Input spur gear")
        .unwrap();
    assert_eq!(inputs.kind, PartKind::SpurGear);
    assert_eq!(inputs.quantity, 2);
    assert_eq!(inputs.part_ids, ["input_gear_a", "input_gear_b"]);

    let axles = bom.iter().filter(|line| line.kind == PartKind::Axle).count();
    assert_eq!(axles, 5);
    for line in &bom {
        let expected = if line.kind == PartKind::Axle { "steel" } else { "PLA" };
        assert_eq!(line.material, expected, "{}", line.name);
    }
}

#[test]
fn test_manifest_json_carries_parts_and_checks() {
    let layout = layout(SelectorState::EngagedA);
    let json = to_manifest_json(&layout, "2026-01-01").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["generator"], "mechlogic");
    assert_eq!(value["build_date"], "2026-01-01");
    assert_eq!(value["element"], "mux_2to1");
    assert_eq!(value["state"], "engaged_a");
    assert_eq!(value["checks"]["lever_feasible"], true);
    assert_eq!(value["parts"].as_object().unwrap().len(), 13);
    assert_eq!(value["parts"]["gear_a"]["metadata"]["kind"], "spur_gear");
    assert_eq!(value["parts"]["gear_a"]["metadata"]["dimensions"]["teeth"], 24.0);
    let clutch_x = value["parts"]["dog_clutch"]["pose"]["origin"][0]
        .as_f64()
        .unwrap();
    assert!((clutch_x - 15.0).abs() < 1e-6);
}

#[test]
fn test_manifest_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mux_2to1.json");
    let manifest = Manifest::new(&layout(SelectorState::EngagedB), "2026-01-01");
    manifest.save_to_file(&path).unwrap();

    let loaded: Manifest =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded.state, SelectorState::EngagedB);
    assert_eq!(loaded.parts.len(), manifest.parts.len());
    assert_eq!(loaded.bill_of_materials, manifest.bill_of_materials);
}

#[test]
fn test_manifest_save_to_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("manifest.json");
    let manifest = Manifest::new(&layout(SelectorState::Idle), "2026-01-01");
    let err = manifest.save_to_file(&path).unwrap_err();
    assert!(matches!(err, mechlogic_core::Error::Io(_)));
}
