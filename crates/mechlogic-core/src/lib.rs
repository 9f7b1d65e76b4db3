//! # MechLogic Core
//!
//! Core types shared by the MechLogic crates: the error taxonomy, part poses,
//! bounding boxes and shaft axis lines.

pub mod error;
pub mod geometry;

pub use error::{
    DegenerateProfileError, Error, KernelError, MeshError, PartError, PartFailure, Result,
    SpecValidationError,
};

pub use geometry::{rotation_between, wrap_deg, Aabb, AxisLine, PartPose};
