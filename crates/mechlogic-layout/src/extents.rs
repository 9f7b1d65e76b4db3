//! # Extents and Axles
//!
//! Axle spans, housing plate positions and the axle parts. Every axle runs
//! past the outermost feature it carries by the housing thickness plus the
//! axle overhang.

use crate::bevel_control::BevelControlZone;
use crate::bom::{PartKind, PartMetadata, AXLE_MATERIAL};
use crate::input_shaft::InputShaftZone;
use crate::layout::PlacedPart;
use crate::lever::LeverGeometry;
use crate::selector::{selector_axis_pose, SelectorZone};
use crate::shape::{RingSector, Shape};
use mechlogic_core::PartPose;
use mechlogic_gears::AxialSpan;
use mechlogic_settings::MechanismSpec;
use tracing::{debug, warn};

/// One axle: a solid rod along body Z.
#[derive(Debug, Clone, PartialEq)]
pub struct AxleSpec {
    pub part_id: String,
    pub name: String,
    pub pose: PartPose,
    pub span: AxialSpan,
    pub radius: f64,
}

impl AxleSpec {
    fn new(part_id: &str, name: &str, pose: PartPose, span: AxialSpan, radius: f64) -> Self {
        Self {
            part_id: part_id.to_string(),
            name: name.to_string(),
            pose,
            span,
            radius,
        }
    }

    pub fn length(&self) -> f64 {
        self.span.length()
    }

    pub fn part(&self) -> (String, PlacedPart) {
        (
            self.part_id.clone(),
            PlacedPart::new(
                self.pose,
                Shape::Ring(RingSector::full(0.0, self.radius, self.span)),
                PartMetadata::new(self.part_id.as_str(), PartKind::Axle, self.name.as_str())
                    .with_material(AXLE_MATERIAL)
                    .with_dimension("diameter", 2.0 * self.radius)
                    .with_dimension("length", self.length()),
            ),
        )
    }
}

/// Axle spans and housing plate positions along X.
#[derive(Debug, Clone, PartialEq)]
pub struct Extents {
    /// Selector and input axle span along X.
    pub axle_start: f64,
    pub axle_end: f64,
    pub housing_thickness: f64,
    /// Inner faces of the two end plates along X.
    pub plates: (f64, f64),
    pub axles: Vec<AxleSpec>,
}

impl Extents {
    pub fn compute(
        spec: &MechanismSpec,
        selector: &SelectorZone,
        inputs: &InputShaftZone,
        bevel: &BevelControlZone,
        lever: &LeverGeometry,
    ) -> Self {
        let geometry = &spec.geometry;
        let margin = geometry.housing_thickness + geometry.axle_overhang;
        let (first, last) = selector.feature_extent();
        let axle_start = first - margin;
        let axle_end = last + margin;
        let derived = axle_end - axle_start;
        if geometry.axle_length < derived {
            warn!(
                configured = geometry.axle_length,
                derived, "Configured axle length is shorter than the selector axle span"
            );
        }
        let plate_span = last - first + 2.0 * geometry.housing_thickness;
        if plate_span > geometry.device_length_x {
            warn!(
                plate_span,
                device_length = geometry.device_length_x,
                "Housing is longer than the device length"
            );
        }

        let along_x = AxialSpan::new(axle_start, axle_end);
        let shaft_radius = spec.shaft_diameter / 2.0;
        let mut axles = vec![AxleSpec::new(
            "axle_selector",
            "Selector axle",
            selector_axis_pose(0.0),
            along_x,
            spec.shaft_diameter_for("o") / 2.0,
        )];
        for mesh in inputs.meshes() {
            let [_, y, z] = mesh.pose.origin;
            axles.push(AxleSpec::new(
                &format!("axle_{}", mesh.input),
                &format!("Input {} axle", mesh.input.to_uppercase()),
                PartPose::new([0.0, y, z], [0.0, 90.0, 0.0]),
                along_x,
                spec.shaft_diameter_for(&mesh.input) / 2.0,
            ));
        }

        // pivot axle runs from below the driven bevel to above the lever boss
        let pivot = bevel.pivot;
        axles.push(AxleSpec::new(
            "axle_pivot",
            "Lever pivot axle",
            PartPose::new([pivot.x, pivot.y, 0.0], [0.0; 3]),
            AxialSpan::new(
                bevel.driven_base_z() - margin,
                lever.boss_length / 2.0 + margin,
            ),
            shaft_radius,
        ));

        // the driving axle stops short of the lever boss
        let driving_end = bevel
            .driving_front_x()
            .min(pivot.x - lever.boss_radius - spec.tunables.fork_clearance);
        axles.push(AxleSpec::new(
            "axle_s",
            "Select axle",
            PartPose::new([0.0, pivot.y, pivot.z], [0.0, 90.0, 0.0]),
            AxialSpan::new(axle_start, driving_end),
            spec.shaft_diameter_for("s") / 2.0,
        ));

        debug!(axle_start, axle_end, driving_end, "Extents");
        Self {
            axle_start,
            axle_end,
            housing_thickness: geometry.housing_thickness,
            plates: (first, last),
            axles,
        }
    }

    /// Selector axle length derived from the features it carries.
    pub fn axle_length(&self) -> f64 {
        self.axle_end - self.axle_start
    }

    /// Outer faces of the end plates along X.
    pub fn housing_span(&self) -> (f64, f64) {
        (
            self.plates.0 - self.housing_thickness,
            self.plates.1 + self.housing_thickness,
        )
    }

    pub fn axle(&self, part_id: &str) -> Option<&AxleSpec> {
        self.axles.iter().find(|a| a.part_id == part_id)
    }

    pub fn parts(&self) -> Vec<(String, PlacedPart)> {
        self.axles.iter().map(AxleSpec::part).collect()
    }
}
