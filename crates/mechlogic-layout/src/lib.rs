//! # MechLogic Layout
//!
//! Places the parts of a mechanical logic element in one assembly frame and
//! checks that they fit together.
//!
//! ## Core Components
//!
//! - **Zones**: selector axle, bevel control, lever, input shafts, extents
//! - **Layout**: `AssemblyLayoutCalculator` producing an `AssemblyLayout`
//! - **Shapes**: analytic part shapes used for checks and realization
//! - **Interference**: pairwise overlap of placed parts
//! - **Kernel**: the `SolidKernel` interface and per-part realization
//! - **Bill of materials**: part metadata, BOM lines and the JSON manifest
//! - **Kinematics**: the multiplexer truth table and its gear paths
//! - **Flexure**: first-order beam estimates
//!
//! ## Usage
//!
//! ```rust
//! use mechlogic_layout::{AssemblyLayoutCalculator, InterferenceChecker, SelectorState};
//! use mechlogic_settings::MechanismSpec;
//!
//! let spec = MechanismSpec::default_mux();
//! let calculator = AssemblyLayoutCalculator::new(&spec).unwrap();
//! let layout = calculator.calculate(SelectorState::EngagedA).unwrap();
//! assert_eq!(layout.derived.engagement_travel, 5.0);
//!
//! let report = InterferenceChecker::from_tunables(&spec.tunables)
//!     .check(&layout)
//!     .unwrap();
//! assert!(report.is_clear());
//! ```

pub mod bevel_control;
pub mod bom;
pub mod extents;
pub mod flexure;
pub mod input_shaft;
pub mod interference;
pub mod kernel;
pub mod kinematic;
pub mod layout;
pub mod lever;
pub mod selector;
pub mod shape;

pub use bevel_control::BevelControlZone;
pub use bom::{
    bill_of_materials, to_manifest_json, BomLine, Manifest, ManifestPart, PartKind, PartMetadata,
    AXLE_MATERIAL, DEFAULT_MATERIAL,
};
pub use extents::{AxleSpec, Extents};
pub use flexure::{
    analyze_straight, beam_max_deflection, beam_stiffness, FlexureAnalysis, Material,
    SerpentineFlexure,
};
pub use input_shaft::{InputMesh, InputShaftZone};
pub use interference::{Collision, InterferenceChecker, InterferenceReport, OverlapMethod};
pub use kernel::{
    realize_part, realize_parts, LoftSection, RealizedAssembly, RealizedPart, SolidKernel,
};
pub use kinematic::{GearPath, KinematicModel, LogicValue};
pub use layout::{
    AssemblyLayout, AssemblyLayoutCalculator, DerivedScalars, LayoutChecks, MeshKind, MeshPair,
    PlacedPart,
};
pub use lever::{LeverGeometry, FORK_AXIAL_CLEARANCE};
pub use selector::{SelectorState, SelectorZone};
pub use shape::{GearBody, RingSector, Shape};
