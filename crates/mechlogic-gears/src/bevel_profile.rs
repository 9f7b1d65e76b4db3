//! # Bevel Tooth Profile
//!
//! Straight bevel teeth by the Tredgold approximation: the tooth seen on the
//! back cone is the tooth of a spur gear with `N / cos(cone_angle)` teeth
//! (kept fractional) and pitch radius `r_p / cos(cone_angle)`.
//!
//! The virtual tooth is mapped onto the real back face by keeping its radial
//! heights and its arc length at the pitch circle. Sections toward the front
//! face are the back face section scaled about the axis, so every profile
//! point runs along a line through the apex.

use crate::mesh_geometry::GearMeshGeometry;
use crate::spec::BevelGearSpec;
use crate::spur_profile::{SpurToothProfile, ToothProfile, DEFAULT_FLANK_POINTS};
use mechlogic_core::DegenerateProfileError;
use nalgebra::Point2;
use std::f64::consts::PI;

/// One loft section of a bevel gear or tooth.
#[derive(Debug, Clone, PartialEq)]
pub struct BevelSection {
    /// Geometric scale relative to the back face (1 at the back face).
    pub scale: f64,
    /// Extra radial shrink applied for backlash.
    pub backlash_factor: f64,
    /// Axial distance from the back face toward the apex.
    pub axial_offset: f64,
    /// Section outline in the plane normal to the axis.
    pub points: Vec<Point2<f64>>,
}

/// Generator for bevel gear sections.
#[derive(Debug, Clone)]
pub struct BevelToothProfile {
    spec: BevelGearSpec,
    flank_points: usize,
    sections: usize,
}

impl BevelToothProfile {
    /// Generator with a straight loft (back and front sections).
    pub fn new(spec: &BevelGearSpec) -> Self {
        Self {
            spec: *spec,
            flank_points: DEFAULT_FLANK_POINTS,
            sections: 2,
        }
    }

    /// Use `sections` evenly spaced sections from back to front.
    pub fn with_sections(mut self, sections: usize) -> Self {
        self.sections = sections;
        self
    }

    /// Change the number of samples per flank.
    pub fn with_flank_points(mut self, flank_points: usize) -> Self {
        self.flank_points = flank_points;
        self
    }

    pub fn spec(&self) -> &BevelGearSpec {
        &self.spec
    }

    /// Spur generator for the virtual back cone gear.
    pub fn virtual_generator(&self) -> SpurToothProfile {
        SpurToothProfile::from_geometry(GearMeshGeometry::virtual_spur(&self.spec))
            .with_flank_points(self.flank_points)
    }

    /// Back face tooth centered at `center_angle` (radians), valley to valley.
    pub fn back_face_tooth(
        &self,
        center_angle: f64,
    ) -> Result<Vec<Point2<f64>>, DegenerateProfileError> {
        let virtual_tooth = self.virtual_generator().tooth(0.0)?;
        Ok(self.map_to_real(&virtual_tooth, center_angle))
    }

    /// Closed back face outline of the whole gear.
    pub fn back_face_profile(&self) -> Result<ToothProfile, DegenerateProfileError> {
        let virtual_tooth = self.virtual_generator().tooth(0.0)?;
        let teeth = self.spec.gear().teeth() as usize;
        let pitch = 2.0 * PI / teeth as f64;

        let mut points = Vec::with_capacity(teeth * virtual_tooth.len());
        let mut points_per_tooth = 0;
        for i in 0..teeth {
            let mapped = self.map_to_real(&virtual_tooth, i as f64 * pitch);
            let skip = if i == 0 { 0 } else { 1 };
            points_per_tooth = mapped.len() - 1;
            points.extend(mapped.into_iter().skip(skip));
        }
        if let Some(first) = points.first().copied() {
            if let Some(last) = points.last_mut() {
                *last = first;
            }
        }
        Ok(ToothProfile::from_parts(points, teeth, points_per_tooth))
    }

    /// Loft sections of the whole gear, back face first.
    pub fn sections(&self) -> Result<Vec<BevelSection>, DegenerateProfileError> {
        let back = self.back_face_profile()?;
        self.scale_sections(back.points())
    }

    /// Loft sections of a single tooth, back face first.
    pub fn tooth_sections(
        &self,
        tooth_index: usize,
    ) -> Result<Vec<BevelSection>, DegenerateProfileError> {
        let pitch = 2.0 * PI / self.spec.gear().teeth() as f64;
        let tooth = self.back_face_tooth(tooth_index as f64 * pitch)?;
        self.scale_sections(&tooth)
    }

    /// Section scales from the back face (1.0) to the front face.
    pub fn section_scales(&self) -> Result<Vec<f64>, DegenerateProfileError> {
        if self.sections < 2 {
            return Err(DegenerateProfileError::TooFewSections {
                count: self.sections,
            });
        }
        let cone_distance = self.spec.cone_distance();
        let face_width = self.spec.face_width();
        if face_width <= 0.0 || face_width >= cone_distance {
            return Err(DegenerateProfileError::InvalidFaceWidth {
                face_width,
                cone_distance,
            });
        }
        let front = self.spec.front_scale();
        let n = self.sections;
        Ok((0..n)
            .map(|i| 1.0 - (1.0 - front) * i as f64 / (n - 1) as f64)
            .collect())
    }

    /// Radial backlash shrink for a section at `scale`.
    pub fn backlash_factor(&self, scale: f64) -> f64 {
        let pitch_radius = self.spec.gear().pitch_radius() * scale;
        1.0 - self.spec.gear().backlash() / (2.0 * pitch_radius)
    }

    fn scale_sections(
        &self,
        outline: &[Point2<f64>],
    ) -> Result<Vec<BevelSection>, DegenerateProfileError> {
        let back_axial = self.spec.back_cone_axial();
        self.section_scales()?
            .into_iter()
            .map(|scale| {
                let backlash_factor = self.backlash_factor(scale);
                if backlash_factor <= 0.0 {
                    return Err(DegenerateProfileError::NonPositiveThickness {
                        thickness: self.spec.gear().pitch_radius() * scale * backlash_factor,
                        backlash: self.spec.gear().backlash(),
                    });
                }
                let factor = scale * backlash_factor;
                Ok(BevelSection {
                    scale,
                    backlash_factor,
                    axial_offset: (1.0 - scale) * back_axial,
                    points: outline
                        .iter()
                        .map(|p| Point2::from(p.coords * factor))
                        .collect(),
                })
            })
            .collect()
    }

    /// Tredgold mapping from the virtual plane onto the real back face.
    fn map_to_real(&self, virtual_points: &[Point2<f64>], center_angle: f64) -> Vec<Point2<f64>> {
        let real_pitch = self.spec.gear().pitch_radius();
        let virtual_pitch = self.spec.virtual_pitch_radius();
        let angle_scale = virtual_pitch / real_pitch;
        virtual_points
            .iter()
            .map(|p| {
                let radius = real_pitch + (p.coords.norm() - virtual_pitch);
                let angle = center_angle + p.y.atan2(p.x) * angle_scale;
                Point2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect()
    }
}
