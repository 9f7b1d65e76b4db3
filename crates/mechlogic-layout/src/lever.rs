//! # Lever Zone
//!
//! The shift lever hangs from the pivot above the clutch. Turning it about
//! the pivot's Z axis swings the fork along X and slides the clutch. The fork
//! is a half ring riding in the clutch groove; it tilts and lifts as the
//! lever turns, which limits how far the lever may swing.

use crate::bom::{PartKind, PartMetadata};
use crate::layout::PlacedPart;
use crate::selector::{SelectorState, SelectorZone};
use crate::shape::{RingSector, Shape};
use mechlogic_core::{Aabb, PartPose, Result, SpecValidationError};
use mechlogic_gears::AxialSpan;
use mechlogic_settings::Tunables;
use nalgebra::Point3;
use tracing::debug;

/// Axial play of the fork in the groove, both sides together.
pub const FORK_AXIAL_CLEARANCE: f64 = 1.5;

/// Radial overlap of the connector with the arm.
const CONNECTOR_OVERLAP: f64 = 0.5;

/// Lever arm, fork and pivot boss dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct LeverGeometry {
    /// Pivot axis to clutch axis.
    pub arm_length: f64,
    /// Fork travel at the clutch axis for one shift.
    pub offset: f64,
    /// Lever angle for one shift, degrees.
    pub angle_deg: f64,
    pub fork_thickness: f64,
    pub fork_inner_radius: f64,
    pub fork_outer_radius: f64,
    pub groove_width: f64,
    pub groove_inner_radius: f64,
    pub boss_radius: f64,
    pub boss_length: f64,
    pub bore_radius: f64,
    /// Tooth pitch angle of the bevel gear that turns with the lever.
    pub bevel_pitch_deg: f64,
}

impl LeverGeometry {
    /// Size the lever for a pivot `pivot_height` above the clutch axis.
    pub fn new(
        selector: &SelectorZone,
        pivot_height: f64,
        tunables: &Tunables,
        bevel_teeth: u32,
    ) -> Result<Self> {
        let offset = selector.engagement_travel;
        if offset >= pivot_height {
            return Err(SpecValidationError::Incompatible(format!(
                "engagement travel {} needs a lever longer than {}",
                offset, pivot_height
            ))
            .into());
        }
        let fork_thickness = selector.groove_width - FORK_AXIAL_CLEARANCE;
        if fork_thickness <= 0.0 {
            return Err(SpecValidationError::InvalidValue {
                name: "tunables.groove_width".to_string(),
                reason: format!("leaves no room for a fork ({} mm)", fork_thickness),
            }
            .into());
        }
        let fork_inner_radius = selector.groove_inner_radius + tunables.fork_clearance;
        let fork_outer_radius = selector.clutch_radius - tunables.fork_clearance;
        if fork_outer_radius <= fork_inner_radius {
            return Err(SpecValidationError::Incompatible(format!(
                "groove depth {} is too shallow for fork clearance {}",
                tunables.groove_depth, tunables.fork_clearance
            ))
            .into());
        }
        let lever = Self {
            arm_length: pivot_height,
            offset,
            angle_deg: (offset / pivot_height).asin().to_degrees(),
            fork_thickness,
            fork_inner_radius,
            fork_outer_radius,
            groove_width: selector.groove_width,
            groove_inner_radius: selector.groove_inner_radius,
            boss_radius: tunables.pivot_boss_radius,
            boss_length: tunables.pivot_boss_length,
            bore_radius: selector.bore_radius,
            bevel_pitch_deg: 360.0 / bevel_teeth as f64,
        };
        if lever.arm_bottom() >= lever.arm_top() {
            return Err(SpecValidationError::Incompatible(format!(
                "pivot height {} leaves no room for the lever arm",
                pivot_height
            ))
            .into());
        }
        debug!(
            angle_deg = lever.angle_deg,
            lift = lever.fork_lift(),
            footprint = lever.fork_footprint(),
            "Lever geometry"
        );
        Ok(lever)
    }

    pub fn rotation_range_deg(&self) -> f64 {
        2.0 * self.angle_deg
    }

    /// Rise of the fork center when the lever is turned a full shift.
    pub fn fork_lift(&self) -> f64 {
        self.arm_length * (1.0 - self.angle_deg.to_radians().cos())
    }

    /// Axial width taken up by the tilted fork.
    pub fn fork_footprint(&self) -> f64 {
        let theta = self.angle_deg.to_radians();
        self.fork_thickness * theta.cos() + self.fork_outer_radius * theta.sin().abs()
    }

    /// Radial depth of the fork inside the groove.
    pub fn radial_engagement(&self) -> f64 {
        self.fork_outer_radius - self.groove_inner_radius
    }

    /// Tilted fork fits the groove and does not lift out of it.
    pub fn is_feasible(&self) -> bool {
        self.fork_footprint() <= self.groove_width && self.fork_lift() < self.radial_engagement()
    }

    /// Bevel teeth passing the mesh for one shift.
    pub fn teeth_per_shift(&self) -> f64 {
        self.angle_deg / self.bevel_pitch_deg
    }

    /// Fork travel from engaged A to engaged B.
    pub fn lever_throw(&self) -> f64 {
        2.0 * self.offset
    }

    /// Lever angle about +Z for `state`; engaging A swings the fork toward -X.
    pub fn angle_for(&self, state: SelectorState) -> f64 {
        state.direction() * self.angle_deg
    }

    pub fn pose(&self, pivot: &Point3<f64>, state: SelectorState) -> PartPose {
        PartPose::new([pivot.x, pivot.y, pivot.z], [0.0, 0.0, self.angle_for(state)])
    }

    fn arm_bottom(&self) -> f64 {
        -self.arm_length + self.fork_outer_radius + 1.0
    }

    fn arm_top(&self) -> f64 {
        -(self.boss_radius - 1.0)
    }

    /// Lever in its own frame: pivot at the origin, arm hanging along -Y,
    /// fork axis along X.
    pub fn shape(&self) -> Shape {
        let fork_pose = PartPose::new([0.0, -self.arm_length, 0.0], [0.0, 90.0, 0.0]);
        let t = AxialSpan::centered(self.fork_thickness);
        let half_t = self.fork_thickness / 2.0;
        let half_w = self.boss_length / 2.0;
        Shape::Composite(vec![
            (
                fork_pose,
                Shape::Ring(RingSector::sectors(
                    self.fork_inner_radius,
                    self.fork_outer_radius,
                    t,
                    vec![(0.0, 180.0)],
                )),
            ),
            (
                fork_pose,
                Shape::Ring(RingSector::sectors(
                    self.fork_inner_radius,
                    self.fork_outer_radius + 1.0 + CONNECTOR_OVERLAP,
                    t,
                    vec![(70.0, 40.0)],
                )),
            ),
            (
                PartPose::identity(),
                Shape::Block(Aabb::new(
                    [-half_t, self.arm_bottom(), -half_w],
                    [half_t, self.arm_top(), half_w],
                )),
            ),
            (
                PartPose::identity(),
                Shape::Ring(RingSector::full(
                    self.bore_radius,
                    self.boss_radius,
                    AxialSpan::centered(self.boss_length),
                )),
            ),
        ])
    }

    pub fn part(&self, pivot: &Point3<f64>, state: SelectorState) -> (String, PlacedPart) {
        (
            "shift_lever".to_string(),
            PlacedPart::new(
                self.pose(pivot, state),
                self.shape(),
                PartMetadata::new("shift_lever", PartKind::ShiftLever, "Shift lever")
                    .with_dimension("arm_length", self.arm_length)
                    .with_dimension("fork_thickness", self.fork_thickness)
                    .with_dimension("fork_inner_radius", self.fork_inner_radius)
                    .with_dimension("fork_outer_radius", self.fork_outer_radius)
                    .with_dimension("rotation_range_deg", self.rotation_range_deg())
                    .with_dimension("pivot_bore_diameter", 2.0 * self.bore_radius),
            ),
        )
    }
}
