use anyhow::Context;
use mechlogic::{
    init_logging, AssemblyLayoutCalculator, InterferenceChecker, Manifest, MechanismSpec,
    BUILD_DATE, VERSION,
};
use mechlogic_layout::flexure::{analyze_straight, straight_beam_depth, Material};
use std::path::PathBuf;
use tracing::{info, warn};

/// `mechlogic [SPEC] [OUT_DIR]`
///
/// Lays out every selector state of the element described by SPEC (the
/// reference MUX when omitted), checks it for interference and, when OUT_DIR
/// is given, writes one manifest per state there.
fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!(version = VERSION, build_date = BUILD_DATE, "MechLogic");

    let mut args = std::env::args_os().skip(1);
    let spec = match args.next().map(PathBuf::from) {
        Some(path) => MechanismSpec::load_from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MechanismSpec::default_mux(),
    };
    let out_dir = args.next().map(PathBuf::from);

    let calculator = AssemblyLayoutCalculator::new(&spec)?;
    let checker = InterferenceChecker::from_tunables(&spec.tunables);
    let mut clear = true;
    for layout in calculator.calculate_all()? {
        let report = checker.check(&layout)?;
        for collision in &report.collisions {
            warn!(
                state = %layout.state,
                a = %collision.part_a,
                b = %collision.part_b,
                volume = collision.volume,
                "Collision"
            );
        }
        for (a, b) in &report.unresolved {
            warn!(state = %layout.state, %a, %b, "Unresolved overlap");
        }
        clear &= report.is_clear();
        println!(
            "{} {}: {} parts, {} pairs, {} collisions, {} unresolved",
            layout.element,
            layout.state,
            layout.parts.len(),
            report.checked_pairs,
            report.collisions.len(),
            report.unresolved.len()
        );

        if let Some(dir) = &out_dir {
            let path = dir.join(format!("{}_{}.json", layout.element, layout.state));
            Manifest::new(&layout, BUILD_DATE)
                .save_to_file(&path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    let flexure = analyze_straight(
        &spec.flexure,
        straight_beam_depth(&spec),
        &Material::default(),
    )?;
    println!(
        "flexure: max deflection {:.3} mm for {:.3} mm required",
        flexure.max_deflection, flexure.required_deflection
    );

    if !clear {
        anyhow::bail!("layout has collisions or unresolved overlaps");
    }
    Ok(())
}
