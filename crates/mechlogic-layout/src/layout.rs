//! # Assembly Layout
//!
//! `AssemblyLayoutCalculator` places every part of a logic element in one
//! assembly frame for a given selector state. Zones are solved in order and
//! each depends only on the zones before it:
//!
//! 1. selector axle (gears A and B, sliding clutch)
//! 2. lever pivot height, then the lever angle for the state
//! 3. bevel pair around the pivot, turned with the lever
//! 4. input spur gears
//! 5. axles and housing extents
//!
//! A layout is a value. Changing the state means calculating a new one.

use crate::bevel_control::{pivot_height, BevelControlZone};
use crate::bom::{PartKind, PartMetadata};
use crate::extents::Extents;
use crate::input_shaft::InputShaftZone;
use crate::lever::LeverGeometry;
use crate::selector::{SelectorState, SelectorZone};
use crate::shape::Shape;
use mechlogic_core::{Aabb, Error, PartPose, Result};
use mechlogic_gears::{BevelGearSpec, GearSpec};
use mechlogic_settings::MechanismSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Kind of gear mesh between two parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshKind {
    Spur,
    Bevel,
}

/// Two parts whose teeth are meant to interleave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshPair {
    pub part_a: String,
    pub part_b: String,
    pub kind: MeshKind,
    /// Center distance for spur pairs, reference face to apex for bevel pairs.
    pub distance: f64,
    pub relative_rotation_deg: f64,
}

impl MeshPair {
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.part_a == a && self.part_b == b) || (self.part_a == b && self.part_b == a)
    }
}

/// A part placed in the assembly frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPart {
    pub pose: PartPose,
    pub kind: PartKind,
    pub shape: Shape,
    pub metadata: PartMetadata,
}

impl PlacedPart {
    pub fn new(pose: PartPose, shape: Shape, metadata: PartMetadata) -> Self {
        Self {
            pose,
            kind: metadata.kind,
            shape,
            metadata,
        }
    }

    pub fn world_bounds(&self) -> Option<Aabb> {
        self.shape.world_bounds(&self.pose)
    }
}

/// Scalars derived while laying out the assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedScalars {
    pub engagement_travel: f64,
    pub lever_throw: f64,
    pub lever_angle_deg: f64,
    pub axle_length: f64,
    pub clutch_neutral: f64,
    pub clutch_position: f64,
    pub gear_b_center: f64,
    pub pivot: [f64; 3],
    pub cone_distance: f64,
    pub bevel_mesh_distance: f64,
    /// Back cone axial distance; the mesh distance may not fall below it.
    pub min_mesh_distance: f64,
    pub spur_center_distance: f64,
    pub bevel_teeth_per_shift: f64,
}

/// Invariant checks published with the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutChecks {
    /// Largest per-axis distance between the bevel apexes.
    pub apex_error: f64,
    /// Clutch at its expected position and spun into the dog safe window.
    pub engagement_is_aligned: bool,
    pub lever_feasible: bool,
}

/// Every placed part of one logic element in one selector state.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyLayout {
    pub element: String,
    pub state: SelectorState,
    pub parts: BTreeMap<String, PlacedPart>,
    pub derived: DerivedScalars,
    pub mesh_pairs: Vec<MeshPair>,
    /// Pairs that touch by design and are kept apart by their guide geometry.
    pub guided_pairs: Vec<(String, String)>,
    pub checks: LayoutChecks,
}

impl AssemblyLayout {
    pub fn part(&self, part_id: &str) -> Option<&PlacedPart> {
        self.parts.get(part_id)
    }

    /// Copy of the layout with one part moved.
    pub fn with_pose(&self, part_id: &str, pose: PartPose) -> Result<Self> {
        let mut layout = self.clone();
        let part = layout
            .parts
            .get_mut(part_id)
            .ok_or_else(|| Error::other(format!("Unknown part '{}'", part_id)))?;
        part.pose = pose;
        Ok(layout)
    }

    pub fn mesh_pair(&self, a: &str, b: &str) -> Option<&MeshPair> {
        self.mesh_pairs.iter().find(|pair| pair.involves(a, b))
    }

    pub fn is_guided(&self, a: &str, b: &str) -> bool {
        self.guided_pairs
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Bounding box of every part.
    pub fn bounds(&self) -> Option<Aabb> {
        self.parts
            .values()
            .filter_map(PlacedPart::world_bounds)
            .reduce(|a, b| a.union(&b))
    }
}

/// Lays out a validated mechanism specification.
#[derive(Debug, Clone)]
pub struct AssemblyLayoutCalculator {
    spec: MechanismSpec,
    gear: GearSpec,
    bevel: BevelGearSpec,
}

impl AssemblyLayoutCalculator {
    /// Validate `spec` and build the gear specs it names.
    pub fn new(spec: &MechanismSpec) -> Result<Self> {
        spec.validate()?;
        let gears = &spec.gears;
        let backlash = spec.tolerances.gear_backlash;
        let gear = GearSpec::new(
            gears.module,
            gears.coaxial_teeth,
            gears.pressure_angle,
            backlash,
        )?;
        let bevel_gear =
            GearSpec::new(gears.module, gears.bevel_teeth, gears.pressure_angle, backlash)?;
        let (bevel, _) = BevelGearSpec::pair(bevel_gear, bevel_gear, 90.0)?;
        Ok(Self {
            spec: spec.clone(),
            gear,
            bevel,
        })
    }

    pub fn spec(&self) -> &MechanismSpec {
        &self.spec
    }

    pub fn gear(&self) -> &GearSpec {
        &self.gear
    }

    pub fn bevel(&self) -> &BevelGearSpec {
        &self.bevel
    }

    /// Lay out the assembly for `state`.
    pub fn calculate(&self, state: SelectorState) -> Result<AssemblyLayout> {
        let spec = &self.spec;
        let selector = SelectorZone::compute(spec, &self.gear, state)?;
        let height = pivot_height(&selector, &spec.tunables);
        let lever = LeverGeometry::new(
            &selector,
            height,
            &spec.tunables,
            self.bevel.gear().teeth(),
        )?;
        let lever_angle = lever.angle_for(state);
        let bevel =
            BevelControlZone::compute(&selector, &spec.tunables, self.bevel, lever_angle)?;
        let inputs = InputShaftZone::compute(&selector);
        let extents = Extents::compute(spec, &selector, &inputs, &bevel, &lever);

        if spec.geometry.lever_throw < selector.engagement_travel {
            warn!(
                configured = spec.geometry.lever_throw,
                travel = selector.engagement_travel,
                "Configured lever throw is shorter than the engagement travel"
            );
        }

        let mut parts = BTreeMap::new();
        parts.extend(selector.parts());
        parts.extend(bevel.parts());
        parts.extend(inputs.parts());
        parts.extend(extents.parts());
        let (lever_id, lever_part) = lever.part(&bevel.pivot, state);
        parts.insert(lever_id.clone(), lever_part);

        let mut mesh_pairs: Vec<MeshPair> = inputs
            .meshes()
            .into_iter()
            .map(|mesh| MeshPair {
                part_a: mesh.part_id.clone(),
                part_b: mesh.mate_id.clone(),
                kind: MeshKind::Spur,
                distance: mesh.alignment.center_distance,
                relative_rotation_deg: mesh.alignment.relative_rotation_deg,
            })
            .collect();
        mesh_pairs.push(MeshPair {
            part_a: "bevel_driven".to_string(),
            part_b: "bevel_driving".to_string(),
            kind: MeshKind::Bevel,
            distance: bevel.mesh_distance,
            relative_rotation_deg: bevel.alignment.relative_rotation_deg,
        });

        let checks = LayoutChecks {
            apex_error: bevel.alignment.apex_error(),
            engagement_is_aligned: selector.dog.is_safe(selector.clutch_spin_deg)
                && (selector.clutch_position - selector.clutch_position_for(state)).abs() < 1e-9,
            lever_feasible: lever.is_feasible(),
        };
        if !checks.lever_feasible {
            warn!(
                footprint = lever.fork_footprint(),
                lift = lever.fork_lift(),
                groove_width = lever.groove_width,
                "Lever fork does not fit the clutch groove"
            );
        }

        let derived = DerivedScalars {
            engagement_travel: selector.engagement_travel,
            lever_throw: lever.lever_throw(),
            lever_angle_deg: lever.angle_deg,
            axle_length: extents.axle_length(),
            clutch_neutral: selector.clutch_neutral,
            clutch_position: selector.clutch_position,
            gear_b_center: selector.gear_b_center,
            pivot: [bevel.pivot.x, bevel.pivot.y, bevel.pivot.z],
            cone_distance: self.bevel.cone_distance(),
            bevel_mesh_distance: bevel.mesh_distance,
            min_mesh_distance: bevel.min_mesh_distance,
            spur_center_distance: inputs.input_a.alignment.center_distance,
            bevel_teeth_per_shift: lever.teeth_per_shift(),
        };
        debug!(?derived, "Derived scalars");
        info!(
            element = %spec.element.name,
            %state,
            parts = parts.len(),
            apex_error = checks.apex_error,
            lever_feasible = checks.lever_feasible,
            "Calculated assembly layout"
        );

        Ok(AssemblyLayout {
            element: spec.element.name.clone(),
            state,
            parts,
            derived,
            mesh_pairs,
            guided_pairs: vec![("dog_clutch".to_string(), lever_id)],
            checks,
        })
    }

    /// Layouts for every selector state.
    pub fn calculate_all(&self) -> Result<Vec<AssemblyLayout>> {
        SelectorState::ALL
            .iter()
            .map(|state| self.calculate(*state))
            .collect()
    }
}
