//! Gear specifications.
//!
//! Both spec types are validated on construction and immutable afterwards.

use mechlogic_core::SpecValidationError;
use serde::{Deserialize, Serialize};

/// Default pressure angle in degrees.
pub const DEFAULT_PRESSURE_ANGLE_DEG: f64 = 20.0;

/// Minimum tooth count for a usable involute gear.
pub const MIN_TEETH: u32 = 3;

/// Default bevel face width as a fraction of the cone distance.
pub const BEVEL_FACE_WIDTH_RATIO: f64 = 0.30;

/// Default bevel face width limit in modules.
pub const BEVEL_FACE_WIDTH_MODULES: f64 = 10.0;

/// Absolute ceiling for an explicit bevel face width, fraction of cone distance.
pub const BEVEL_FACE_WIDTH_CEILING: f64 = 0.40;

/// A standard full-depth involute spur gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGearSpec")]
pub struct GearSpec {
    module: f64,
    pressure_angle_deg: f64,
    teeth: u32,
    backlash: f64,
}

/// Unchecked serialized form of [`GearSpec`].
#[derive(Deserialize)]
struct RawGearSpec {
    module: f64,
    pressure_angle_deg: f64,
    teeth: u32,
    backlash: f64,
}

impl TryFrom<RawGearSpec> for GearSpec {
    type Error = SpecValidationError;

    fn try_from(raw: RawGearSpec) -> Result<Self, Self::Error> {
        GearSpec::new(raw.module, raw.teeth, raw.pressure_angle_deg, raw.backlash)
    }
}

impl GearSpec {
    /// Create a validated gear spec.
    pub fn new(
        module: f64,
        teeth: u32,
        pressure_angle_deg: f64,
        backlash: f64,
    ) -> Result<Self, SpecValidationError> {
        SpecValidationError::check_positive("module", module)?;
        if teeth < MIN_TEETH {
            return Err(SpecValidationError::InvalidValue {
                name: "teeth".to_string(),
                reason: format!("must be >= {}, got {}", MIN_TEETH, teeth),
            });
        }
        if !pressure_angle_deg.is_finite()
            || pressure_angle_deg <= 0.0
            || pressure_angle_deg >= 45.0
        {
            return Err(SpecValidationError::OutOfRange {
                name: "pressure_angle_deg".to_string(),
                value: pressure_angle_deg,
                min: 0.0,
                max: 45.0,
            });
        }
        if !backlash.is_finite() || backlash < 0.0 {
            return Err(SpecValidationError::InvalidValue {
                name: "backlash".to_string(),
                reason: format!("must be >= 0, got {}", backlash),
            });
        }
        Ok(Self {
            module,
            pressure_angle_deg,
            teeth,
            backlash,
        })
    }

    /// Standard 20° gear without backlash.
    pub fn standard(module: f64, teeth: u32) -> Result<Self, SpecValidationError> {
        Self::new(module, teeth, DEFAULT_PRESSURE_ANGLE_DEG, 0.0)
    }

    /// Same gear with a different backlash.
    pub fn with_backlash(&self, backlash: f64) -> Result<Self, SpecValidationError> {
        Self::new(self.module, self.teeth, self.pressure_angle_deg, backlash)
    }

    pub fn module(&self) -> f64 {
        self.module
    }

    pub fn teeth(&self) -> u32 {
        self.teeth
    }

    pub fn pressure_angle_deg(&self) -> f64 {
        self.pressure_angle_deg
    }

    pub fn backlash(&self) -> f64 {
        self.backlash
    }

    /// Addendum, equal to the module.
    pub fn addendum(&self) -> f64 {
        self.module
    }

    /// Dedendum, 1.25 modules.
    pub fn dedendum(&self) -> f64 {
        1.25 * self.module
    }

    pub fn pitch_radius(&self) -> f64 {
        self.module * self.teeth as f64 / 2.0
    }

    pub fn pitch_diameter(&self) -> f64 {
        self.module * self.teeth as f64
    }

    pub fn base_radius(&self) -> f64 {
        self.pitch_radius() * self.pressure_angle_deg.to_radians().cos()
    }

    pub fn outer_radius(&self) -> f64 {
        self.pitch_radius() + self.addendum()
    }

    pub fn outer_diameter(&self) -> f64 {
        2.0 * self.outer_radius()
    }

    /// Root radius from the dedendum alone.
    pub fn root_radius(&self) -> f64 {
        self.pitch_radius() - self.dedendum()
    }

    /// Radius where the involute flank starts: never on or below the base circle.
    pub fn flank_start_radius(&self) -> f64 {
        self.root_radius().max(self.base_radius() * 1.01)
    }
}

/// A straight bevel gear: a spur spec on a pitch cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBevelGearSpec")]
pub struct BevelGearSpec {
    gear: GearSpec,
    cone_angle_deg: f64,
    face_width: f64,
}

/// Unchecked serialized form of [`BevelGearSpec`]; the nested gear is
/// validated by its own conversion.
#[derive(Deserialize)]
struct RawBevelGearSpec {
    gear: GearSpec,
    cone_angle_deg: f64,
    face_width: f64,
}

impl TryFrom<RawBevelGearSpec> for BevelGearSpec {
    type Error = SpecValidationError;

    fn try_from(raw: RawBevelGearSpec) -> Result<Self, Self::Error> {
        BevelGearSpec::new(raw.gear, raw.cone_angle_deg, Some(raw.face_width))
    }
}

impl BevelGearSpec {
    /// Create a bevel spec. `face_width` of `None` picks
    /// `min(0.30 * A, 10 * module)`; an explicit width is capped at `0.40 * A`.
    pub fn new(
        gear: GearSpec,
        cone_angle_deg: f64,
        face_width: Option<f64>,
    ) -> Result<Self, SpecValidationError> {
        if !cone_angle_deg.is_finite() || cone_angle_deg <= 0.0 || cone_angle_deg >= 90.0 {
            return Err(SpecValidationError::OutOfRange {
                name: "cone_angle_deg".to_string(),
                value: cone_angle_deg,
                min: 0.0,
                max: 90.0,
            });
        }
        let cone_distance = gear.pitch_radius() / cone_angle_deg.to_radians().sin();
        let face_width = match face_width {
            Some(width) => {
                SpecValidationError::check_positive("face_width", width)?;
                width.min(BEVEL_FACE_WIDTH_CEILING * cone_distance)
            }
            None => (BEVEL_FACE_WIDTH_RATIO * cone_distance)
                .min(BEVEL_FACE_WIDTH_MODULES * gear.module()),
        };
        Ok(Self {
            gear,
            cone_angle_deg,
            face_width,
        })
    }

    /// Both gears of a pair meeting at `shaft_angle_deg`.
    pub fn pair(
        driving: GearSpec,
        driven: GearSpec,
        shaft_angle_deg: f64,
    ) -> Result<(Self, Self), SpecValidationError> {
        let (g1, g2) = pair_cone_angles(shaft_angle_deg, driving.teeth(), driven.teeth())?;
        Ok((Self::new(driving, g1, None)?, Self::new(driven, g2, None)?))
    }

    pub fn gear(&self) -> &GearSpec {
        &self.gear
    }

    pub fn cone_angle_deg(&self) -> f64 {
        self.cone_angle_deg
    }

    pub fn face_width(&self) -> f64 {
        self.face_width
    }

    /// Distance from the apex to the back face pitch circle along the cone.
    pub fn cone_distance(&self) -> f64 {
        self.gear.pitch_radius() / self.cone_angle_deg.to_radians().sin()
    }

    /// Axial distance from the apex to the back face pitch circle.
    pub fn back_cone_axial(&self) -> f64 {
        self.cone_distance() * self.cone_angle_deg.to_radians().cos()
    }

    /// Virtual spur tooth count on the back cone, kept fractional.
    pub fn virtual_teeth(&self) -> f64 {
        self.gear.teeth() as f64 / self.cone_angle_deg.to_radians().cos()
    }

    /// Pitch radius of the virtual back cone spur gear.
    pub fn virtual_pitch_radius(&self) -> f64 {
        self.gear.pitch_radius() / self.cone_angle_deg.to_radians().cos()
    }

    /// Scale of the front face relative to the back face.
    pub fn front_scale(&self) -> f64 {
        let a = self.cone_distance();
        (a - self.face_width) / a
    }
}

/// Pitch cone angles for a pair of bevel gears.
///
/// `tan(g1) = sin(S) / (i + cos(S))` with `i = n2 / n1`, and `g2 = S - g1`.
pub fn pair_cone_angles(
    shaft_angle_deg: f64,
    driving_teeth: u32,
    driven_teeth: u32,
) -> Result<(f64, f64), SpecValidationError> {
    SpecValidationError::check_range("shaft_angle_deg", shaft_angle_deg, 1.0, 179.0)?;
    if driving_teeth == 0 || driven_teeth == 0 {
        return Err(SpecValidationError::InvalidValue {
            name: "teeth".to_string(),
            reason: "bevel pair needs teeth on both gears".to_string(),
        });
    }
    let sigma = shaft_angle_deg.to_radians();
    let ratio = driven_teeth as f64 / driving_teeth as f64;
    let g1 = sigma.sin().atan2(ratio + sigma.cos()).to_degrees();
    Ok((g1, shaft_angle_deg - g1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gear_spec_rejects_bad_values() {
        assert!(GearSpec::new(0.0, 24, 20.0, 0.0).is_err());
        assert!(GearSpec::new(1.5, 2, 20.0, 0.0).is_err());
        assert!(GearSpec::new(1.5, 24, 50.0, 0.0).is_err());
        assert!(GearSpec::new(1.5, 24, 20.0, -0.1).is_err());
    }

    #[test]
    fn test_gear_spec_radii() {
        let gear = GearSpec::standard(1.5, 24).unwrap();
        assert!((gear.pitch_radius() - 18.0).abs() < 1e-12);
        assert!((gear.outer_radius() - 19.5).abs() < 1e-12);
        assert!((gear.root_radius() - 16.125).abs() < 1e-12);
        // clamped above the base circle
        assert!(gear.flank_start_radius() > gear.base_radius());
        assert!(gear.flank_start_radius() > gear.root_radius());
    }

    #[test]
    fn test_large_gear_keeps_dedendum_root() {
        let gear = GearSpec::standard(1.0, 100).unwrap();
        assert_eq!(gear.flank_start_radius(), gear.root_radius());
    }

    #[test]
    fn test_pair_cone_angles_one_to_one() {
        let (g1, g2) = pair_cone_angles(90.0, 16, 16).unwrap();
        assert!((g1 - 45.0).abs() < 1e-9);
        assert!((g2 - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_pair_cone_angles_two_to_one() {
        let (g1, g2) = pair_cone_angles(90.0, 15, 30).unwrap();
        assert!((g1 - 0.5f64.atan().to_degrees()).abs() < 1e-9);
        assert!((g1 + g2 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_bevel_default_face_width() {
        let gear = GearSpec::standard(1.5, 16).unwrap();
        let bevel = BevelGearSpec::new(gear, 45.0, None).unwrap();
        let a = bevel.cone_distance();
        assert!((a - 16.970_562_748).abs() < 1e-6);
        assert!((bevel.face_width() - 0.3 * a).abs() < 1e-9);
        assert!((bevel.front_scale() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_bevel_explicit_face_width_is_capped() {
        let gear = GearSpec::standard(1.5, 16).unwrap();
        let bevel = BevelGearSpec::new(gear, 45.0, Some(100.0)).unwrap();
        assert!((bevel.face_width() - 0.4 * bevel.cone_distance()).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_gear() {
        let json = r#"{"module":-1.0,"pressure_angle_deg":80.0,"teeth":1,"backlash":-5.0}"#;
        let err = serde_json::from_str::<GearSpec>(json).unwrap_err();
        assert!(err.to_string().contains("module"), "{err}");

        let json = r#"{"module":1.5,"pressure_angle_deg":20.0,"teeth":2,"backlash":0.0}"#;
        assert!(serde_json::from_str::<GearSpec>(json).is_err());
    }

    #[test]
    fn test_deserialize_accepts_valid_gear() {
        let gear = GearSpec::new(1.5, 24, 20.0, 0.15).unwrap();
        let json = serde_json::to_string(&gear).unwrap();
        assert_eq!(serde_json::from_str::<GearSpec>(&json).unwrap(), gear);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_bevel() {
        let gear = r#"{"module":1.5,"pressure_angle_deg":20.0,"teeth":16,"backlash":0.0}"#;
        let json = format!(r#"{{"gear":{gear},"cone_angle_deg":95.0,"face_width":5.0}}"#);
        assert!(serde_json::from_str::<BevelGearSpec>(&json).is_err());

        let json = format!(r#"{{"gear":{gear},"cone_angle_deg":45.0,"face_width":-1.0}}"#);
        assert!(serde_json::from_str::<BevelGearSpec>(&json).is_err());

        let bad_gear = r#"{"module":0.0,"pressure_angle_deg":20.0,"teeth":16,"backlash":0.0}"#;
        let json = format!(r#"{{"gear":{bad_gear},"cone_angle_deg":45.0,"face_width":5.0}}"#);
        assert!(serde_json::from_str::<BevelGearSpec>(&json).is_err());

        let json = format!(r#"{{"gear":{gear},"cone_angle_deg":45.0,"face_width":5.0}}"#);
        let bevel = serde_json::from_str::<BevelGearSpec>(&json).unwrap();
        assert!((bevel.face_width() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_virtual_teeth_fractional() {
        let gear = GearSpec::standard(1.5, 16).unwrap();
        let bevel = BevelGearSpec::new(gear, 45.0, None).unwrap();
        assert!((bevel.virtual_teeth() - 16.0 * 2f64.sqrt()).abs() < 1e-9);
    }
}
