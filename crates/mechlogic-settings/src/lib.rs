//! MechLogic Settings Crate
//!
//! Handles the mechanism specification: defaults, JSON/TOML persistence and
//! validation.

pub mod config;

pub use config::{
    DogClutchSpec, ElementInfo, ElementType, FlexureSpec, GearTrainSpec, GeometrySpec,
    MechanismSpec, ShaftSpec, ToleranceSpec, Tunables,
};
