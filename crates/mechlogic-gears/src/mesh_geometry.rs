//! # Gear Mesh Geometry
//!
//! Derived quantities of a gear that the alignment solver and the layout
//! depend on. Pure values, recomputed from the spec whenever needed.

use crate::spec::{BevelGearSpec, GearSpec};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cone quantities of a bevel gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BevelMeshGeometry {
    pub cone_angle_deg: f64,
    /// Apex to back face pitch circle, along the cone.
    pub cone_distance: f64,
    pub face_width: f64,
    /// Back cone spur tooth count, fractional.
    pub virtual_teeth: f64,
    pub virtual_pitch_radius: f64,
    /// Front face size relative to the back face.
    pub front_scale: f64,
    /// Apex to back face pitch circle, along the axis.
    pub back_cone_axial: f64,
}

/// Radii, pitch angles and tooth thickness of a gear.
///
/// `teeth` is fractional so the same value describes the virtual spur gear
/// of a bevel back cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearMeshGeometry {
    pub module: f64,
    pub teeth: f64,
    pub pressure_angle_deg: f64,
    pub pitch_radius: f64,
    pub base_radius: f64,
    pub outer_radius: f64,
    /// Root radius from the dedendum.
    pub root_radius: f64,
    /// Where the involute flank begins, at least 1% above the base circle.
    pub flank_start_radius: f64,
    /// 360° / teeth.
    pub tooth_pitch_angle_deg: f64,
    /// Half of the tooth pitch: the rotation that puts a tooth on a gap.
    pub half_tooth_offset_deg: f64,
    /// Circular tooth thickness at the pitch circle after backlash.
    pub tooth_thickness: f64,
    /// Half of the tooth thickness as an angle at the pitch circle, radians.
    pub half_tooth_angle: f64,
    pub bevel: Option<BevelMeshGeometry>,
}

impl GearMeshGeometry {
    /// Geometry of a spur gear.
    pub fn spur(spec: &GearSpec) -> Self {
        Self::from_parts(
            spec.module(),
            spec.teeth() as f64,
            spec.pressure_angle_deg(),
            spec.backlash(),
        )
    }

    /// Geometry of a bevel gear at its back face.
    pub fn bevel(spec: &BevelGearSpec) -> Self {
        let mut geometry = Self::spur(spec.gear());
        geometry.bevel = Some(BevelMeshGeometry {
            cone_angle_deg: spec.cone_angle_deg(),
            cone_distance: spec.cone_distance(),
            face_width: spec.face_width(),
            virtual_teeth: spec.virtual_teeth(),
            virtual_pitch_radius: spec.virtual_pitch_radius(),
            front_scale: spec.front_scale(),
            back_cone_axial: spec.back_cone_axial(),
        });
        geometry
    }

    /// The Tredgold virtual spur gear on the back cone, without backlash.
    pub fn virtual_spur(spec: &BevelGearSpec) -> Self {
        let gear = spec.gear();
        Self::from_parts(
            gear.module(),
            spec.virtual_teeth(),
            gear.pressure_angle_deg(),
            0.0,
        )
    }

    /// Geometry for a possibly fractional tooth count.
    pub fn from_parts(module: f64, teeth: f64, pressure_angle_deg: f64, backlash: f64) -> Self {
        let pitch_radius = module * teeth / 2.0;
        let base_radius = pitch_radius * pressure_angle_deg.to_radians().cos();
        let root_radius = pitch_radius - 1.25 * module;
        let tooth_pitch_angle_deg = 360.0 / teeth;
        let tooth_thickness = PI * module / 2.0 - backlash;
        Self {
            module,
            teeth,
            pressure_angle_deg,
            pitch_radius,
            base_radius,
            outer_radius: pitch_radius + module,
            root_radius,
            flank_start_radius: root_radius.max(base_radius * 1.01),
            tooth_pitch_angle_deg,
            half_tooth_offset_deg: tooth_pitch_angle_deg / 2.0,
            tooth_thickness,
            half_tooth_angle: tooth_thickness / (2.0 * pitch_radius),
            bevel: None,
        }
    }

    /// Tooth pitch in radians.
    pub fn tooth_pitch_angle(&self) -> f64 {
        2.0 * PI / self.teeth
    }

    /// Radius at which flank sampling stops, just inside the tip.
    pub fn tip_sample_radius(&self) -> f64 {
        0.99 * self.outer_radius
    }

    /// Operating center distance to a mating spur gear.
    pub fn center_distance(&self, other: &GearMeshGeometry) -> f64 {
        self.pitch_radius + other.pitch_radius
    }

    /// Circular pitch at the pitch circle.
    pub fn circular_pitch(&self) -> f64 {
        PI * self.module
    }
}
