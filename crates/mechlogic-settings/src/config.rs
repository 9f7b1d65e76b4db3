//! Mechanism specification for MechLogic
//!
//! Declarative description of a logic element: gear sizes, dog clutch,
//! assembly geometry, flexure, manufacturing tolerances and layout tunables.
//! Supports JSON and TOML files.
//!
//! Specification is organized into logical sections:
//! - Element identity and shafts (inputs and outputs)
//! - Gear train (module, tooth counts, dog clutch)
//! - Assembly geometry (axles, housing, clutch, spacing)
//! - Flexure beam dimensions
//! - Tolerances for FDM printing
//! - Tunables (empirical layout constants)

use mechlogic_core::{Error, Result, SpecValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Kind of logic element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 2:1 multiplexer, `O = S ? B : A`
    #[default]
    Mux,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mux => write!(f, "mux"),
        }
    }
}

/// Element identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Element identifier
    pub name: String,
    /// Element type
    #[serde(rename = "type", default)]
    pub element_type: ElementType,
}

/// A named input or output shaft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaftSpec {
    /// Per-shaft diameter override in mm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shaft_diameter: Option<f64>,
}

/// Dog clutch teeth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogClutchSpec {
    /// Number of dog teeth
    pub teeth: u32,
    /// Axial height of a dog tooth in mm
    pub tooth_height: f64,
    /// Depth of tooth engagement in mm
    pub engagement_depth: f64,
}

/// Gear train parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearTrainSpec {
    /// Gear module in mm
    pub module: f64,
    /// Pressure angle in degrees
    #[serde(default = "default_pressure_angle")]
    pub pressure_angle: f64,
    /// Teeth on the A/B coaxial gears and their input gears
    pub coaxial_teeth: u32,
    /// Teeth on each gear of the selector bevel pair
    pub bevel_teeth: u32,
    /// Dog clutch teeth
    pub dog_clutch: DogClutchSpec,
}

fn default_pressure_angle() -> f64 {
    20.0
}

/// Assembly geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySpec {
    /// Configured axle length in mm
    pub axle_length: f64,
    /// Housing plate thickness in mm
    pub housing_thickness: f64,
    /// Total lever travel in mm
    pub lever_throw: f64,
    /// Width of the sliding clutch body in mm
    pub clutch_width: f64,
    /// Face width of spur gears in mm
    pub gear_face_width: f64,
    /// Gap between a coaxial gear and the clutch in mm
    pub gear_spacing: f64,
    /// Device length along X in mm
    #[serde(default = "default_device_length")]
    pub device_length_x: f64,
    /// How far axles extend past the housing plates in mm
    #[serde(default = "default_axle_overhang")]
    pub axle_overhang: f64,
}

fn default_device_length() -> f64 {
    60.0
}

fn default_axle_overhang() -> f64 {
    5.0
}

/// Compliant flexure beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexureSpec {
    /// Beam thickness in mm
    pub thickness: f64,
    /// Beam length in mm
    pub length: f64,
    /// Target maximum deflection in mm
    pub max_deflection: f64,
}

/// Manufacturing tolerances (FDM defaults)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    /// Clearance added to shaft holes in mm
    pub shaft_clearance: f64,
    /// Backlash allowance for gear meshing in mm
    pub gear_backlash: f64,
    /// Interference for press fits in mm (negative)
    pub press_fit_interference: f64,
    /// Depth of the D-flat on keyed shafts in mm
    pub d_flat_depth: f64,
}

impl Default for ToleranceSpec {
    fn default() -> Self {
        Self {
            shaft_clearance: 0.2,
            gear_backlash: 0.15,
            press_fit_interference: -0.1,
            d_flat_depth: 0.5,
        }
    }
}

/// Empirical layout constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Bevel mesh distance as a fraction of the cone distance
    pub mesh_distance_factor: f64,
    /// Lever pivot height above the clutch surface in mm
    pub pivot_offset: f64,
    /// Fraction of the dog pitch covered by a dog tooth
    pub dog_tooth_arc_fraction: f64,
    /// Clutch outer diameter as a fraction of the coaxial gear outer diameter
    pub clutch_od_fraction: f64,
    /// Radial wall between the bore and the dog teeth in mm
    pub dog_ring_wall: f64,
    /// Axial width of the clutch fork groove in mm
    pub groove_width: f64,
    /// Radial depth of the clutch fork groove in mm
    pub groove_depth: f64,
    /// Radial clearance between the fork and the groove in mm
    pub fork_clearance: f64,
    /// Radius of the lever pivot boss in mm
    pub pivot_boss_radius: f64,
    /// Length of the lever pivot boss along the pivot axis in mm
    pub pivot_boss_length: f64,
    /// Sections sampled per bevel pair interference check
    pub bevel_sections: usize,
    /// Volume below which two parts count as clear, mm³
    pub interference_epsilon: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            mesh_distance_factor: 0.79,
            pivot_offset: 27.0,
            dog_tooth_arc_fraction: 0.45,
            clutch_od_fraction: 0.4,
            dog_ring_wall: 1.5,
            groove_width: 4.0,
            groove_depth: 2.0,
            fork_clearance: 0.5,
            pivot_boss_radius: 6.0,
            pivot_boss_length: 6.0,
            bevel_sections: 4,
            interference_epsilon: 1e-3,
        }
    }
}

/// Complete mechanism specification
///
/// Aggregates all sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismSpec {
    /// Primary shaft diameter in mm, used for every shaft without an override
    pub shaft_diameter: f64,
    /// Element identity
    pub element: ElementInfo,
    /// Input shafts by name
    pub inputs: BTreeMap<String, ShaftSpec>,
    /// Output shafts by name
    #[serde(alias = "output")]
    pub outputs: BTreeMap<String, ShaftSpec>,
    /// Gear train
    pub gears: GearTrainSpec,
    /// Assembly geometry
    pub geometry: GeometrySpec,
    /// Flexure beam
    pub flexure: FlexureSpec,
    /// Manufacturing tolerances
    #[serde(default)]
    pub tolerances: ToleranceSpec,
    /// Layout tunables
    #[serde(default)]
    pub tunables: Tunables,
}

impl Default for MechanismSpec {
    fn default() -> Self {
        Self::default_mux()
    }
}

impl MechanismSpec {
    /// Reference 2:1 MUX specification
    pub fn default_mux() -> Self {
        let shafts = |names: &[&str]| {
            names
                .iter()
                .map(|n| (n.to_string(), ShaftSpec::default()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            shaft_diameter: 6.0,
            element: ElementInfo {
                name: "mux_2to1".to_string(),
                element_type: ElementType::Mux,
            },
            inputs: shafts(&["a", "b", "s"]),
            outputs: shafts(&["o"]),
            gears: GearTrainSpec {
                module: 1.5,
                pressure_angle: 20.0,
                coaxial_teeth: 24,
                bevel_teeth: 16,
                dog_clutch: DogClutchSpec {
                    teeth: 6,
                    tooth_height: 2.0,
                    engagement_depth: 1.5,
                },
            },
            geometry: GeometrySpec {
                axle_length: 60.0,
                housing_thickness: 4.0,
                lever_throw: 8.0,
                clutch_width: 10.0,
                gear_face_width: 8.0,
                gear_spacing: 3.0,
                device_length_x: 60.0,
                axle_overhang: 5.0,
            },
            flexure: FlexureSpec {
                thickness: 1.2,
                length: 15.0,
                max_deflection: 2.0,
            },
            tolerances: ToleranceSpec::default(),
            tunables: Tunables::default(),
        }
    }

    /// Load a specification from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read spec file: {}", e)))?;

        let spec: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid JSON spec: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid TOML spec: {}", e)))?
        } else {
            return Err(Error::other("Spec file must be .json or .toml".to_string()));
        };

        spec.validate()?;
        debug!(path = %path.display(), element = %spec.element.name, "Loaded mechanism spec");
        Ok(spec)
    }

    /// Save the specification to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize spec: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize spec: {}", e)))?
        } else {
            return Err(Error::other("Spec file must be .json or .toml".to_string()));
        };

        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write spec file: {}", e)))?;

        Ok(())
    }

    /// Validate the specification
    pub fn validate(&self) -> Result<()> {
        if self.element.name.is_empty() {
            return Err(SpecValidationError::Missing("element.name".to_string()).into());
        }
        SpecValidationError::check_positive("shaft_diameter", self.shaft_diameter)?;
        for (name, shaft) in self.inputs.iter().chain(&self.outputs) {
            if let Some(diameter) = shaft.shaft_diameter {
                SpecValidationError::check_positive(&format!("shafts.{}", name), diameter)?;
            }
        }

        // Gear train
        let gears = &self.gears;
        if !(gears.module > 0.0 && gears.module <= 5.0) {
            return Err(SpecValidationError::OutOfRange {
                name: "gears.module".to_string(),
                value: gears.module,
                min: 0.0,
                max: 5.0,
            }
            .into());
        }
        SpecValidationError::check_range("gears.pressure_angle", gears.pressure_angle, 14.5, 25.0)?;
        SpecValidationError::check_range(
            "gears.coaxial_teeth",
            gears.coaxial_teeth as f64,
            12.0,
            100.0,
        )?;
        SpecValidationError::check_range(
            "gears.bevel_teeth",
            gears.bevel_teeth as f64,
            10.0,
            50.0,
        )?;

        let dog = &gears.dog_clutch;
        SpecValidationError::check_range("gears.dog_clutch.teeth", dog.teeth as f64, 3.0, 12.0)?;
        SpecValidationError::check_positive("gears.dog_clutch.tooth_height", dog.tooth_height)?;
        SpecValidationError::check_positive(
            "gears.dog_clutch.engagement_depth",
            dog.engagement_depth,
        )?;
        if dog.engagement_depth > dog.tooth_height {
            return Err(SpecValidationError::Incompatible(
                "engagement_depth cannot exceed tooth_height".to_string(),
            )
            .into());
        }

        // Geometry
        let geo = &self.geometry;
        for (name, value) in [
            ("geometry.axle_length", geo.axle_length),
            ("geometry.housing_thickness", geo.housing_thickness),
            ("geometry.lever_throw", geo.lever_throw),
            ("geometry.clutch_width", geo.clutch_width),
            ("geometry.gear_face_width", geo.gear_face_width),
            ("geometry.device_length_x", geo.device_length_x),
        ] {
            SpecValidationError::check_positive(name, value)?;
        }
        for (name, value) in [
            ("geometry.gear_spacing", geo.gear_spacing),
            ("geometry.axle_overhang", geo.axle_overhang),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SpecValidationError::InvalidValue {
                    name: name.to_string(),
                    reason: format!("must be >= 0, got {}", value),
                }
                .into());
            }
        }
        let min_travel = dog.engagement_depth + geo.gear_spacing + 1.0;
        if geo.lever_throw < min_travel {
            return Err(SpecValidationError::Incompatible(format!(
                "lever_throw ({}) must be >= engagement_depth + gear_spacing + clearance ({})",
                geo.lever_throw, min_travel
            ))
            .into());
        }

        // Flexure
        let flexure = &self.flexure;
        SpecValidationError::check_positive("flexure.thickness", flexure.thickness)?;
        SpecValidationError::check_positive("flexure.length", flexure.length)?;
        SpecValidationError::check_positive("flexure.max_deflection", flexure.max_deflection)?;
        if flexure.max_deflection > flexure.length / 4.0 {
            return Err(SpecValidationError::Incompatible(
                "max_deflection too large relative to length".to_string(),
            )
            .into());
        }

        // Tolerances
        let tol = &self.tolerances;
        if !(tol.shaft_clearance >= 0.0 && tol.gear_backlash >= 0.0 && tol.d_flat_depth >= 0.0) {
            return Err(SpecValidationError::InvalidValue {
                name: "tolerances".to_string(),
                reason: "clearance, backlash and D-flat depth must be >= 0".to_string(),
            }
            .into());
        }
        if !(tol.press_fit_interference <= 0.0) {
            return Err(SpecValidationError::InvalidValue {
                name: "tolerances.press_fit_interference".to_string(),
                reason: format!("must be <= 0, got {}", tol.press_fit_interference),
            }
            .into());
        }

        self.validate_tunables()?;

        // Element
        match self.element.element_type {
            ElementType::Mux => {
                let missing: Vec<&str> = ["a", "b", "s"]
                    .into_iter()
                    .filter(|name| !self.inputs.contains_key(*name))
                    .collect();
                if !missing.is_empty() {
                    return Err(SpecValidationError::Missing(format!(
                        "MUX element requires inputs: {}",
                        missing.join(", ")
                    ))
                    .into());
                }
                if !self.outputs.contains_key("o") {
                    return Err(SpecValidationError::Missing(
                        "MUX element requires output 'o'".to_string(),
                    )
                    .into());
                }
            }
        }

        Ok(())
    }

    fn validate_tunables(&self) -> Result<()> {
        let t = &self.tunables;
        if !(t.mesh_distance_factor > 0.0 && t.mesh_distance_factor <= 1.0) {
            return Err(SpecValidationError::OutOfRange {
                name: "tunables.mesh_distance_factor".to_string(),
                value: t.mesh_distance_factor,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        if !(t.dog_tooth_arc_fraction > 0.0 && t.dog_tooth_arc_fraction < 0.5) {
            return Err(SpecValidationError::OutOfRange {
                name: "tunables.dog_tooth_arc_fraction".to_string(),
                value: t.dog_tooth_arc_fraction,
                min: 0.0,
                max: 0.5,
            }
            .into());
        }
        if !(t.clutch_od_fraction > 0.0 && t.clutch_od_fraction < 1.0) {
            return Err(SpecValidationError::OutOfRange {
                name: "tunables.clutch_od_fraction".to_string(),
                value: t.clutch_od_fraction,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        for (name, value) in [
            ("tunables.pivot_offset", t.pivot_offset),
            ("tunables.dog_ring_wall", t.dog_ring_wall),
            ("tunables.groove_width", t.groove_width),
            ("tunables.groove_depth", t.groove_depth),
            ("tunables.pivot_boss_radius", t.pivot_boss_radius),
            ("tunables.pivot_boss_length", t.pivot_boss_length),
            ("tunables.interference_epsilon", t.interference_epsilon),
        ] {
            SpecValidationError::check_positive(name, value)?;
        }
        if !(t.fork_clearance >= 0.0) {
            return Err(SpecValidationError::InvalidValue {
                name: "tunables.fork_clearance".to_string(),
                reason: format!("must be >= 0, got {}", t.fork_clearance),
            }
            .into());
        }
        if t.bevel_sections < 2 {
            return Err(SpecValidationError::InvalidValue {
                name: "tunables.bevel_sections".to_string(),
                reason: "at least two sections are needed".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Bore diameter for the primary shaft, with running clearance
    pub fn bore_diameter(&self) -> f64 {
        self.shaft_diameter + self.tolerances.shaft_clearance
    }

    /// Diameter of the named shaft, falling back to the primary diameter
    pub fn shaft_diameter_for(&self, name: &str) -> f64 {
        self.inputs
            .get(name)
            .or_else(|| self.outputs.get(name))
            .and_then(|s| s.shaft_diameter)
            .unwrap_or(self.shaft_diameter)
    }
}
