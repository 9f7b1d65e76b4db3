//! # Dog Clutch Geometry
//!
//! Face dog teeth shared by the sliding clutch and the gears it engages.
//! Teeth are annular sectors starting at `i * pitch` and spanning a fixed
//! fraction of the dog pitch.

use mechlogic_core::{wrap_deg, SpecValidationError};
use serde::{Deserialize, Serialize};

/// Fraction of the dog pitch covered by one tooth.
pub const DOG_TOOTH_ARC_FRACTION: f64 = 0.45;

/// Dog teeth on one clutch face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DogClutchGeometry {
    pub teeth: u32,
    /// Axial height of a tooth.
    pub tooth_height: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Fraction of the pitch occupied by a tooth, below 0.5.
    pub arc_fraction: f64,
}

impl DogClutchGeometry {
    /// Create validated dog tooth geometry.
    pub fn new(
        teeth: u32,
        tooth_height: f64,
        inner_radius: f64,
        outer_radius: f64,
    ) -> Result<Self, SpecValidationError> {
        Self::with_arc_fraction(
            teeth,
            tooth_height,
            inner_radius,
            outer_radius,
            DOG_TOOTH_ARC_FRACTION,
        )
    }

    /// Create dog tooth geometry with a custom tooth arc fraction.
    pub fn with_arc_fraction(
        teeth: u32,
        tooth_height: f64,
        inner_radius: f64,
        outer_radius: f64,
        arc_fraction: f64,
    ) -> Result<Self, SpecValidationError> {
        if teeth == 0 {
            return Err(SpecValidationError::InvalidValue {
                name: "dog_clutch.teeth".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        SpecValidationError::check_positive("dog_clutch.tooth_height", tooth_height)?;
        SpecValidationError::check_positive("dog_clutch.inner_radius", inner_radius)?;
        if outer_radius <= inner_radius {
            return Err(SpecValidationError::Incompatible(format!(
                "dog tooth outer radius {} must exceed inner radius {}",
                outer_radius, inner_radius
            )));
        }
        if !(arc_fraction > 0.0 && arc_fraction < 0.5) {
            return Err(SpecValidationError::OutOfRange {
                name: "dog_tooth_arc_fraction".to_string(),
                value: arc_fraction,
                min: 0.0,
                max: 0.5,
            });
        }
        Ok(Self {
            teeth,
            tooth_height,
            inner_radius,
            outer_radius,
            arc_fraction,
        })
    }

    /// Angle between neighboring teeth.
    pub fn pitch_angle_deg(&self) -> f64 {
        360.0 / self.teeth as f64
    }

    /// Angular width of one tooth.
    pub fn tooth_arc_deg(&self) -> f64 {
        self.pitch_angle_deg() * self.arc_fraction
    }

    /// `(start, sweep)` of every tooth, in degrees, for a part spun by `spin_deg`.
    pub fn tooth_sectors(&self, spin_deg: f64) -> Vec<(f64, f64)> {
        let pitch = self.pitch_angle_deg();
        let arc = self.tooth_arc_deg();
        (0..self.teeth)
            .map(|i| (spin_deg + i as f64 * pitch, arc))
            .collect()
    }

    /// Face area of one tooth.
    pub fn tooth_face_area(&self) -> f64 {
        self.tooth_arc_deg().to_radians() / 2.0
            * (self.outer_radius.powi(2) - self.inner_radius.powi(2))
    }

    /// Total angular overlap, in degrees, of two facing tooth rings whose
    /// spins differ by `relative_rotation_deg`.
    pub fn angular_overlap_deg(&self, relative_rotation_deg: f64) -> f64 {
        let pitch = self.pitch_angle_deg();
        let arc = self.tooth_arc_deg();
        let offset = wrap_deg(relative_rotation_deg, pitch);
        let per_tooth = (arc - offset).max(0.0) + (arc - (pitch - offset)).max(0.0);
        per_tooth * self.teeth as f64
    }

    /// Whether the two rings interleave without touching material.
    pub fn is_safe(&self, relative_rotation_deg: f64) -> bool {
        self.angular_overlap_deg(relative_rotation_deg) <= 1e-9
    }

    /// Relative rotations that interleave safely, within one pitch.
    pub fn safe_window_deg(&self) -> (f64, f64) {
        let pitch = self.pitch_angle_deg();
        (self.tooth_arc_deg(), pitch - self.tooth_arc_deg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog() -> DogClutchGeometry {
        DogClutchGeometry::new(6, 2.0, 4.6, 7.8).unwrap()
    }

    #[test]
    fn test_half_pitch_is_safe() {
        let dog = dog();
        assert!(dog.is_safe(30.0));
        assert!(dog.is_safe(27.0));
        assert!(dog.is_safe(33.0));
    }

    #[test]
    fn test_misalignment_overlaps() {
        let dog = dog();
        assert!(!dog.is_safe(0.0));
        assert!(!dog.is_safe(15.0));
        // quarter pitch past the safe pose
        assert!((dog.angular_overlap_deg(45.0) - 6.0 * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_safe_window() {
        let (lo, hi) = dog().safe_window_deg();
        assert!((lo - 27.0).abs() < 1e-9);
        assert!((hi - 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_fraction() {
        assert!(DogClutchGeometry::with_arc_fraction(6, 2.0, 4.0, 8.0, 0.5).is_err());
        assert!(DogClutchGeometry::new(6, 2.0, 8.0, 4.0).is_err());
    }
}
