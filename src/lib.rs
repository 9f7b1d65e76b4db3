//! # MechLogic
//!
//! A parametric generator for 3D-printable mechanical logic elements. Logic
//! values are shaft rotation directions; a 2:1 multiplexer routes one of two
//! input shafts to its output through a sliding dog clutch.
//!
//! ## Architecture
//!
//! MechLogic is organized as a workspace with multiple crates:
//!
//! 1. **mechlogic-core** - Errors, part poses and shared 3D geometry
//! 2. **mechlogic-gears** - Involute math, spur and bevel profiles, mesh
//!    geometry, alignment and cross-section interference
//! 3. **mechlogic-settings** - The mechanism specification, its defaults and
//!    validation
//! 4. **mechlogic-layout** - Assembly layout, interference checks, part
//!    realization, bill of materials
//! 5. **mechlogic** - Logging bootstrap and the command line entry point
//!
//! ## Features
//!
//! - **Gears**: 20° involute spur profiles and Tredgold bevel profiles
//! - **Alignment**: tooth-into-gap rotations for spur, bevel and dog pairs
//! - **Layout**: every part of an element placed for each selector state
//! - **Checks**: pairwise interference without a solid kernel
//! - **Export**: a JSON manifest with poses, derived scalars and a BOM

pub use mechlogic_core::{Aabb, Error, PartPose, Result};
pub use mechlogic_gears::{
    BevelGearSpec, BevelToothProfile, GearKind, GearMeshGeometry, GearSpec, MeshAlignmentSolver,
    SpurToothProfile,
};
pub use mechlogic_layout::{
    realize_parts, to_manifest_json, AssemblyLayout, AssemblyLayoutCalculator,
    InterferenceChecker, InterferenceReport, KinematicModel, Manifest, SelectorState,
    SolidKernel,
};
pub use mechlogic_settings::MechanismSpec;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_date_is_a_utc_timestamp() {
        let stamp = BUILD_DATE.strip_suffix(" UTC").unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn test_manifest_carries_build_date() {
        let spec = MechanismSpec::default_mux();
        let layout = AssemblyLayoutCalculator::new(&spec)
            .unwrap()
            .calculate(SelectorState::Idle)
            .unwrap();
        let manifest = Manifest::new(&layout, BUILD_DATE);
        assert_eq!(manifest.build_date, BUILD_DATE);
    }
}
