//! # Flexure Estimates
//!
//! First-order cantilever estimates for the compliant supports: stiffness
//! and the deflection at which the outer fibre reaches yield. A guided
//! beam bends in S shape, which doubles the stiffness of a plain
//! cantilever of the same length.

use mechlogic_core::{Result, SpecValidationError};
use mechlogic_settings::{FlexureSpec, MechanismSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Elastic properties of a print material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Young's modulus, MPa.
    pub youngs_modulus: f64,
    /// Yield strength, MPa.
    pub yield_strength: f64,
}

impl Material {
    pub const PLA: Material = Material {
        youngs_modulus: 2000.0,
        yield_strength: 50.0,
    };
}

impl Default for Material {
    fn default() -> Self {
        Self::PLA
    }
}

/// Stiffness in N/mm of a guided beam.
pub fn beam_stiffness(material: &Material, depth: f64, thickness: f64, length: f64) -> f64 {
    2.0 * material.youngs_modulus * depth * thickness.powi(3) / length.powi(3)
}

/// Deflection in mm at which the beam starts to yield.
pub fn beam_max_deflection(material: &Material, thickness: f64, length: f64) -> f64 {
    material.yield_strength * length.powi(2) / (6.0 * material.youngs_modulus * thickness)
}

/// Folded beam path between a floating platform and its frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerpentineFlexure {
    /// Width of each beam segment, the bending thickness.
    pub beam_width: f64,
    /// Gap between parallel segments.
    pub spacing: f64,
    pub folds: u32,
    pub segment_length: f64,
    /// Out of plane thickness of the part.
    pub depth: f64,
}

impl Default for SerpentineFlexure {
    fn default() -> Self {
        Self {
            beam_width: 0.8,
            spacing: 2.5,
            folds: 4,
            segment_length: 15.0,
            depth: 5.0,
        }
    }
}

impl SerpentineFlexure {
    pub fn validate(&self) -> Result<()> {
        SpecValidationError::check_positive("serpentine.beam_width", self.beam_width)?;
        SpecValidationError::check_positive("serpentine.spacing", self.spacing)?;
        SpecValidationError::check_positive("serpentine.segment_length", self.segment_length)?;
        SpecValidationError::check_positive("serpentine.depth", self.depth)?;
        if self.folds == 0 {
            return Err(SpecValidationError::InvalidValue {
                name: "serpentine.folds".to_string(),
                reason: "at least one fold is needed".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Unfolded beam length, counting the connectors between segments.
    pub fn effective_length(&self) -> f64 {
        let folds = self.folds as f64;
        folds * self.segment_length + (folds - 1.0) * (self.beam_width + self.spacing)
    }

    pub fn stiffness(&self, material: &Material) -> f64 {
        beam_stiffness(
            material,
            self.depth,
            self.beam_width,
            self.effective_length(),
        )
    }

    pub fn max_deflection(&self, material: &Material) -> f64 {
        beam_max_deflection(material, self.beam_width, self.effective_length())
    }

    pub fn analyze(
        &self,
        material: &Material,
        required_deflection: f64,
    ) -> Result<FlexureAnalysis> {
        self.validate()?;
        Ok(FlexureAnalysis::new(
            self.effective_length(),
            self.stiffness(material),
            self.max_deflection(material),
            required_deflection,
        ))
    }
}

/// Estimates for one flexure against the deflection it must allow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlexureAnalysis {
    pub effective_length: f64,
    /// N/mm
    pub stiffness: f64,
    pub max_deflection: f64,
    pub required_deflection: f64,
}

impl FlexureAnalysis {
    fn new(
        effective_length: f64,
        stiffness: f64,
        max_deflection: f64,
        required_deflection: f64,
    ) -> Self {
        let analysis = Self {
            effective_length,
            stiffness,
            max_deflection,
            required_deflection,
        };
        debug!(?analysis, "Flexure estimate");
        analysis
    }

    /// Deflection available per unit of deflection required.
    pub fn safety_factor(&self) -> f64 {
        self.max_deflection / self.required_deflection
    }

    pub fn is_adequate(&self) -> bool {
        self.max_deflection >= self.required_deflection
    }

    /// Force needed for the required deflection, N.
    pub fn required_force(&self) -> f64 {
        self.stiffness * self.required_deflection
    }
}

/// Width of the straight flexure beam, sized to the bevel face plus margin.
pub fn straight_beam_depth(spec: &MechanismSpec) -> f64 {
    2.5 * spec.gears.module + 4.0
}

/// Straight beam flexure described by `flexure`.
pub fn analyze_straight(
    flexure: &FlexureSpec,
    depth: f64,
    material: &Material,
) -> Result<FlexureAnalysis> {
    SpecValidationError::check_positive("flexure.thickness", flexure.thickness)?;
    SpecValidationError::check_positive("flexure.length", flexure.length)?;
    SpecValidationError::check_positive("flexure depth", depth)?;
    let analysis = FlexureAnalysis::new(
        flexure.length,
        beam_stiffness(material, depth, flexure.thickness, flexure.length),
        beam_max_deflection(material, flexure.thickness, flexure.length),
        flexure.max_deflection,
    );
    if !analysis.is_adequate() {
        warn!(
            max_deflection = analysis.max_deflection,
            required = flexure.max_deflection,
            "Straight flexure yields before reaching the required deflection"
        );
    }
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_straight_beam_is_too_stiff() {
        let spec = MechanismSpec::default_mux();
        let analysis =
            analyze_straight(&spec.flexure, straight_beam_depth(&spec), &Material::PLA).unwrap();
        assert!((analysis.max_deflection - 0.78125).abs() < 1e-9);
        assert!(!analysis.is_adequate());
        assert!(analysis.safety_factor() < 1.0);
    }

    #[test]
    fn test_default_serpentine_is_adequate() {
        let flexure = SerpentineFlexure::default();
        assert!((flexure.effective_length() - 69.9).abs() < 1e-9);
        let analysis = flexure.analyze(&Material::PLA, 2.0).unwrap();
        assert!(analysis.is_adequate());
        assert!((analysis.max_deflection - 50.0 * 69.9f64.powi(2) / 9600.0).abs() < 1e-9);
        let k = 2.0 * 2000.0 * 5.0 * 0.8f64.powi(3) / 69.9f64.powi(3);
        assert!((analysis.stiffness - k).abs() < 1e-12);
        assert!((analysis.required_force() - 2.0 * k).abs() < 1e-12);
    }

    #[test]
    fn test_stiffness_falls_with_cube_of_length() {
        let short = beam_stiffness(&Material::PLA, 5.0, 1.0, 10.0);
        let long = beam_stiffness(&Material::PLA, 5.0, 1.0, 20.0);
        assert!((short / long - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_serpentine_without_folds_rejected() {
        let flexure = SerpentineFlexure {
            folds: 0,
            ..Default::default()
        };
        assert!(flexure.analyze(&Material::PLA, 1.0).unwrap_err().is_spec_error());
    }
}
