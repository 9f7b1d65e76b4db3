//! # MechLogic Gears
//!
//! Gear tooth geometry and mesh alignment for the MechLogic gear trains.
//!
//! ## Core Components
//!
//! - **Involute**: base circle involute sampling and inversion
//! - **Specs**: validated spur and straight bevel gear specs
//! - **Profiles**: closed spur outlines and Tredgold bevel loft sections
//! - **Mesh geometry**: derived radii, pitches and cone quantities
//! - **Alignment**: dog clutch, spur pair and bevel pair placement
//! - **Interference**: cross-section overlap of meshing teeth
//!
//! ## Architecture
//!
//! ```text
//! GearSpec / BevelGearSpec
//!   ├── GearMeshGeometry (derived values)
//!   ├── SpurToothProfile ── BevelToothProfile (virtual back cone gear)
//!   └── MeshAlignmentSolver (poses) ── interference (overlap checks)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use mechlogic_gears::{GearSpec, MeshAlignmentSolver, SpurToothProfile};
//!
//! let gear = GearSpec::standard(1.5, 24).unwrap();
//! let outline = SpurToothProfile::new(&gear).generate().unwrap();
//! assert!(outline.is_closed());
//!
//! let mesh = MeshAlignmentSolver::spur_pair(&gear, &gear, 0.0, 0.0);
//! assert_eq!(mesh.center_distance, 36.0);
//! ```

pub mod alignment;
pub mod bevel_profile;
pub mod dog_clutch;
pub mod generator;
pub mod interference;
pub mod involute;
pub mod mesh_geometry;
pub mod spec;
pub mod spur_profile;

pub use alignment::{
    apex_of, BevelContact, BevelMeshAlignment, DogClutchAlignment, MeshAlignmentSolver,
    SpurMeshAlignment, APEX_TOLERANCE,
};
pub use bevel_profile::{BevelSection, BevelToothProfile};
pub use dog_clutch::{DogClutchGeometry, DOG_TOOTH_ARC_FRACTION};
pub use generator::{GearKind, GearProfile, ToothSolidProfile};
pub use interference::{
    bevel_mesh_interference, overlap_area, spur_mesh_interference, AxialSpan,
};
pub use mesh_geometry::{BevelMeshGeometry, GearMeshGeometry};
pub use spec::{pair_cone_angles, BevelGearSpec, GearSpec, DEFAULT_PRESSURE_ANGLE_DEG};
pub use spur_profile::{
    polygon_area, SpurToothProfile, ToothProfile, DEFAULT_FLANK_POINTS, MIN_FLANK_POINTS,
};
