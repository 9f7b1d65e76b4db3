//! # Gear Generator
//!
//! Tagged dispatch over the gear kinds a mechanism uses.

use crate::bevel_profile::{BevelSection, BevelToothProfile};
use crate::mesh_geometry::GearMeshGeometry;
use crate::spec::{BevelGearSpec, GearSpec};
use crate::spur_profile::{SpurToothProfile, ToothProfile};
use mechlogic_core::DegenerateProfileError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Kind of gear to generate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GearKind {
    Spur(GearSpec),
    Bevel(BevelGearSpec),
}

/// Generated cross sections, ready for a solid kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum GearProfile {
    /// Outline to extrude along the axis.
    Spur(ToothProfile),
    /// Sections to loft, back face first.
    Bevel(Vec<BevelSection>),
}

/// Cross sections of a single tooth.
#[derive(Debug, Clone, PartialEq)]
pub enum ToothSolidProfile {
    Spur(Vec<Point2<f64>>),
    Bevel(Vec<BevelSection>),
}

impl GearKind {
    /// Spur and bevel gears share the underlying tooth spec.
    pub fn gear(&self) -> &GearSpec {
        match self {
            GearKind::Spur(spec) => spec,
            GearKind::Bevel(spec) => spec.gear(),
        }
    }

    pub fn teeth(&self) -> u32 {
        self.gear().teeth()
    }

    pub fn is_bevel(&self) -> bool {
        matches!(self, GearKind::Bevel(_))
    }

    pub fn mesh_geometry(&self) -> GearMeshGeometry {
        match self {
            GearKind::Spur(spec) => GearMeshGeometry::spur(spec),
            GearKind::Bevel(spec) => GearMeshGeometry::bevel(spec),
        }
    }

    /// Whole-gear profile: an outline for spur gears, loft sections for bevels.
    pub fn generate_profile(&self) -> Result<GearProfile, DegenerateProfileError> {
        let profile = match self {
            GearKind::Spur(spec) => GearProfile::Spur(SpurToothProfile::new(spec).generate()?),
            GearKind::Bevel(spec) => GearProfile::Bevel(BevelToothProfile::new(spec).sections()?),
        };
        debug!(kind = self.label(), teeth = self.teeth(), "Generated gear profile");
        Ok(profile)
    }

    /// Profile of tooth `index` alone, valley to valley.
    pub fn tooth_profile(&self, index: usize) -> Result<ToothSolidProfile, DegenerateProfileError> {
        match self {
            GearKind::Spur(spec) => {
                let center = index as f64 * 2.0 * PI / spec.teeth() as f64;
                Ok(ToothSolidProfile::Spur(
                    SpurToothProfile::new(spec).tooth(center)?,
                ))
            }
            GearKind::Bevel(spec) => Ok(ToothSolidProfile::Bevel(
                BevelToothProfile::new(spec).tooth_sections(index)?,
            )),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GearKind::Spur(_) => "spur",
            GearKind::Bevel(_) => "bevel",
        }
    }
}
