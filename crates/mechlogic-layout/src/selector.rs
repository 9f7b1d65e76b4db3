//! # Selector Zone
//!
//! Gear A, the sliding dog clutch and gear B on the selector axle, which runs
//! along the assembly X axis. Parts in this zone are authored with their axis
//! on body Z and rotated a quarter turn about Y, so body Z points along +X.

use crate::bom::{PartKind, PartMetadata};
use crate::kinematic::LogicValue;
use crate::layout::PlacedPart;
use crate::shape::{GearBody, RingSector, Shape};
use mechlogic_core::{PartPose, Result, SpecValidationError};
use mechlogic_gears::{AxialSpan, DogClutchGeometry, GearSpec, MeshAlignmentSolver};
use mechlogic_settings::MechanismSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Position of the sliding clutch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorState {
    /// Clutch centered between the gears, nothing engaged
    #[default]
    Idle,
    /// Clutch slid onto gear A's dog teeth
    EngagedA,
    /// Clutch slid onto gear B's dog teeth
    EngagedB,
}

impl SelectorState {
    pub const ALL: [SelectorState; 3] = [
        SelectorState::Idle,
        SelectorState::EngagedA,
        SelectorState::EngagedB,
    ];

    /// State selected by the S input.
    pub fn from_select(s: LogicValue) -> Self {
        match s {
            LogicValue::Zero => SelectorState::EngagedA,
            LogicValue::One => SelectorState::EngagedB,
        }
    }

    /// S value that produces this state, `None` for idle.
    pub fn select_value(&self) -> Option<LogicValue> {
        match self {
            SelectorState::Idle => None,
            SelectorState::EngagedA => Some(LogicValue::Zero),
            SelectorState::EngagedB => Some(LogicValue::One),
        }
    }

    /// Direction of clutch travel along +X.
    pub fn direction(&self) -> f64 {
        match self {
            SelectorState::Idle => 0.0,
            SelectorState::EngagedA => -1.0,
            SelectorState::EngagedB => 1.0,
        }
    }
}

impl fmt::Display for SelectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorState::Idle => write!(f, "idle"),
            SelectorState::EngagedA => write!(f, "engaged_a"),
            SelectorState::EngagedB => write!(f, "engaged_b"),
        }
    }
}

/// Pose of a selector axis part whose body origin sits at `x`.
pub fn selector_axis_pose(x: f64) -> PartPose {
    PartPose::new([x, 0.0, 0.0], [0.0, 90.0, 0.0])
}

/// Positions and sizes of the selector zone.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorZone {
    pub state: SelectorState,
    pub gear: GearSpec,
    pub dog: DogClutchGeometry,
    pub face_width: f64,
    pub bore_radius: f64,
    pub gear_a_center: f64,
    /// Face width plus dog tooth height.
    pub gear_teeth_end: f64,
    /// Half the clutch width plus dog tooth height.
    pub clutch_half_span: f64,
    pub clutch_neutral: f64,
    pub engagement_travel: f64,
    pub gear_b_center: f64,
    pub clutch_position: f64,
    /// Clutch spin relative to gears A and B.
    pub clutch_spin_deg: f64,
    pub clutch_width: f64,
    pub clutch_radius: f64,
    pub groove_width: f64,
    pub groove_inner_radius: f64,
}

impl SelectorZone {
    /// Lay out the selector axle for `state`.
    pub fn compute(spec: &MechanismSpec, gear: &GearSpec, state: SelectorState) -> Result<Self> {
        let geometry = &spec.geometry;
        let tunables = &spec.tunables;
        let dog_spec = &spec.gears.dog_clutch;

        let bore_radius = spec.bore_diameter() / 2.0;
        let clutch_radius = tunables.clutch_od_fraction * gear.outer_diameter() / 2.0;
        let groove_inner_radius = clutch_radius - tunables.groove_depth;
        if groove_inner_radius <= bore_radius {
            return Err(SpecValidationError::Incompatible(format!(
                "clutch groove bottom radius {:.3} does not clear the bore radius {:.3}",
                groove_inner_radius, bore_radius
            ))
            .into());
        }
        if tunables.groove_width >= geometry.clutch_width {
            return Err(SpecValidationError::Incompatible(format!(
                "groove width {} must be narrower than the clutch width {}",
                tunables.groove_width, geometry.clutch_width
            ))
            .into());
        }
        let dog = DogClutchGeometry::with_arc_fraction(
            dog_spec.teeth,
            dog_spec.tooth_height,
            bore_radius + tunables.dog_ring_wall,
            clutch_radius,
            tunables.dog_tooth_arc_fraction,
        )?;

        let h = dog_spec.tooth_height;
        let face_width = geometry.gear_face_width;
        let gear_a_center = 0.0;
        let gear_teeth_end = face_width + h;
        let clutch_half_span = geometry.clutch_width / 2.0 + h;
        let clutch_neutral =
            gear_a_center + gear_teeth_end + geometry.gear_spacing + clutch_half_span;
        let engagement_travel = geometry.gear_spacing + h;
        let gear_b_center = clutch_neutral + engagement_travel + clutch_half_span;
        let clutch_position = clutch_neutral + state.direction() * engagement_travel;
        let clutch_spin_deg = MeshAlignmentSolver::dog_clutch(&dog).relative_rotation_deg;

        debug!(
            %state,
            clutch_neutral,
            clutch_position,
            gear_b_center,
            engagement_travel,
            "Selector zone"
        );
        Ok(Self {
            state,
            gear: *gear,
            dog,
            face_width,
            bore_radius,
            gear_a_center,
            gear_teeth_end,
            clutch_half_span,
            clutch_neutral,
            engagement_travel,
            gear_b_center,
            clutch_position,
            clutch_spin_deg,
            clutch_width: geometry.clutch_width,
            clutch_radius,
            groove_width: tunables.groove_width,
            groove_inner_radius,
        })
    }

    pub fn gear_a_pose(&self) -> PartPose {
        selector_axis_pose(self.gear_a_center)
    }

    pub fn gear_b_pose(&self) -> PartPose {
        selector_axis_pose(self.gear_b_center)
    }

    pub fn clutch_pose(&self) -> PartPose {
        selector_axis_pose(self.clutch_position).spun(self.clutch_spin_deg)
    }

    /// Expected clutch position for `state`.
    pub fn clutch_position_for(&self, state: SelectorState) -> f64 {
        self.clutch_neutral + state.direction() * self.engagement_travel
    }

    /// Outermost selector features along X.
    pub fn feature_extent(&self) -> (f64, f64) {
        (self.gear_a_center, self.gear_b_center + self.face_width)
    }

    fn dog_ring(&self, span: AxialSpan) -> Shape {
        Shape::Ring(RingSector::sectors(
            self.dog.inner_radius,
            self.dog.outer_radius,
            span,
            self.dog.tooth_sectors(0.0),
        ))
    }

    fn selector_gear(&self, dog_span: AxialSpan) -> Shape {
        Shape::Composite(vec![
            (
                PartPose::identity(),
                Shape::Gear(GearBody::spur(
                    self.gear,
                    self.bore_radius,
                    AxialSpan::new(0.0, self.face_width),
                )),
            ),
            (PartPose::identity(), self.dog_ring(dog_span)),
        ])
    }

    /// Gear A: body from its origin toward +X, dog teeth on the clutch side.
    pub fn gear_a_shape(&self) -> Shape {
        self.selector_gear(AxialSpan::new(self.face_width, self.gear_teeth_end))
    }

    /// Gear B: body from its origin toward +X, dog teeth behind the origin.
    pub fn gear_b_shape(&self) -> Shape {
        self.selector_gear(AxialSpan::new(-self.dog.tooth_height, 0.0))
    }

    /// Clutch body with the fork groove and dog teeth on both faces.
    pub fn clutch_shape(&self) -> Shape {
        let w = self.clutch_width / 2.0;
        let g = self.groove_width / 2.0;
        let h = self.dog.tooth_height;
        let ring = |inner, outer, start, end| {
            (
                PartPose::identity(),
                Shape::Ring(RingSector::full(inner, outer, AxialSpan::new(start, end))),
            )
        };
        Shape::Composite(vec![
            ring(self.bore_radius, self.groove_inner_radius, -w, w),
            ring(self.groove_inner_radius, self.clutch_radius, -w, -g),
            ring(self.groove_inner_radius, self.clutch_radius, g, w),
            (PartPose::identity(), self.dog_ring(AxialSpan::new(w, w + h))),
            (PartPose::identity(), self.dog_ring(AxialSpan::new(-w - h, -w))),
        ])
    }

    /// Gear A, gear B and the clutch.
    pub fn parts(&self) -> Vec<(String, PlacedPart)> {
        let gear_metadata = |id: &str, name: &str| {
            PartMetadata::new(id, PartKind::SpurGear, name)
                .with_dimension("teeth", self.gear.teeth() as f64)
                .with_dimension("module", self.gear.module())
                .with_dimension("pitch_diameter", self.gear.pitch_diameter())
                .with_dimension("outer_diameter", self.gear.outer_diameter())
                .with_dimension("face_width", self.face_width)
                .with_dimension("bore_diameter", 2.0 * self.bore_radius)
                .with_dimension("dog_teeth", self.dog.teeth as f64)
                .with_dimension("dog_tooth_height", self.dog.tooth_height)
        };
        vec![
            (
                "gear_a".to_string(),
                PlacedPart::new(
                    self.gear_a_pose(),
                    self.gear_a_shape(),
                    gear_metadata("gear_a", "Selector gear A"),
                ),
            ),
            (
                "gear_b".to_string(),
                PlacedPart::new(
                    self.gear_b_pose(),
                    self.gear_b_shape(),
                    gear_metadata("gear_b", "Selector gear B"),
                ),
            ),
            (
                "dog_clutch".to_string(),
                PlacedPart::new(
                    self.clutch_pose(),
                    self.clutch_shape(),
                    PartMetadata::new("dog_clutch", PartKind::DogClutch, "Sliding dog clutch")
                        .with_dimension("outer_diameter", 2.0 * self.clutch_radius)
                        .with_dimension("width", self.clutch_width)
                        .with_dimension("groove_width", self.groove_width)
                        .with_dimension("groove_diameter", 2.0 * self.groove_inner_radius)
                        .with_dimension("bore_diameter", 2.0 * self.bore_radius)
                        .with_dimension("dog_teeth", self.dog.teeth as f64),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(state: SelectorState) -> SelectorZone {
        let spec = MechanismSpec::default_mux();
        let gear = GearSpec::new(1.5, 24, 20.0, 0.15).unwrap();
        SelectorZone::compute(&spec, &gear, state).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_positions() {
        let z = zone(SelectorState::Idle);
        assert!(close(z.gear_teeth_end, 10.0));
        assert!(close(z.clutch_half_span, 7.0));
        assert!(close(z.clutch_neutral, 20.0));
        assert!(close(z.engagement_travel, 5.0));
        assert!(close(z.gear_b_center, 32.0));
        assert!(close(z.clutch_radius, 7.8));
        assert!(close(z.dog.inner_radius, 4.6));
        assert!(close(z.clutch_spin_deg, 30.0));
    }

    #[test]
    fn test_engaged_positions() {
        assert!(close(zone(SelectorState::EngagedA).clutch_position, 15.0));
        assert!(close(zone(SelectorState::EngagedB).clutch_position, 25.0));
        let z = zone(SelectorState::Idle);
        assert!(close(z.clutch_position_for(SelectorState::EngagedA), 15.0));
    }

    #[test]
    fn test_state_select_mapping() {
        for s in LogicValue::ALL {
            assert_eq!(SelectorState::from_select(s).select_value(), Some(s));
        }
        assert_eq!(SelectorState::Idle.select_value(), None);
        assert_eq!(SelectorState::EngagedB.to_string(), "engaged_b");
    }

    #[test]
    fn test_narrow_clutch_rejected() {
        let mut spec = MechanismSpec::default_mux();
        spec.geometry.clutch_width = 3.0;
        let gear = GearSpec::new(1.5, 24, 20.0, 0.15).unwrap();
        let err = SelectorZone::compute(&spec, &gear, SelectorState::Idle).unwrap_err();
        assert!(err.is_spec_error());
    }

    #[test]
    fn test_clutch_teeth_sit_outside_body() {
        let z = zone(SelectorState::Idle);
        let bounds = z.clutch_shape().world_bounds(&z.clutch_pose()).unwrap();
        assert!((bounds.min[0] - 13.0).abs() < 1e-6);
        assert!((bounds.max[0] - 27.0).abs() < 1e-6);
    }
}
