//! Realization against a kernel whose solids are bounding boxes.

use mechlogic_core::{Aabb, KernelError, PartFailure, PartPose};
use mechlogic_layout::{
    realize_part, realize_parts, AssemblyLayout, AssemblyLayoutCalculator, LoftSection,
    SelectorState, SolidKernel,
};
use mechlogic_settings::MechanismSpec;
use nalgebra::{Point2, Point3};
use std::cell::{Cell, RefCell};

/// Records every call and can be told to fail lofts or revolves.
#[derive(Default)]
struct RecordingKernel {
    calls: RefCell<Vec<&'static str>>,
    lofts: Cell<usize>,
    /// Fail every loft whose call index is a multiple of this.
    fail_every_loft: Option<usize>,
    /// Fail revolves whose outer radius exceeds this.
    fail_revolve_above: Option<f64>,
}

impl RecordingKernel {
    fn record(&self, op: &'static str) {
        self.calls.borrow_mut().push(op);
    }

    fn count(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == op).count()
    }
}

fn outline(points: &[Point2<f64>], z0: f64, z1: f64) -> Result<Aabb, KernelError> {
    Aabb::from_points(
        points
            .iter()
            .flat_map(|p| [Point3::new(p.x, p.y, z0), Point3::new(p.x, p.y, z1)])
            .collect::<Vec<_>>()
            .iter(),
    )
    .ok_or_else(|| KernelError::failed("outline", "empty profile"))
}

impl SolidKernel for RecordingKernel {
    type Solid = Aabb;

    fn extrude(
        &self,
        profile: &[Point2<f64>],
        length: f64,
        _taper_deg: f64,
    ) -> Result<Aabb, KernelError> {
        self.record("extrude");
        outline(profile, 0.0, length)
    }

    fn revolve(&self, profile: &[Point2<f64>], _degrees: f64) -> Result<Aabb, KernelError> {
        self.record("revolve");
        let r = profile.iter().map(|p| p.x).fold(0.0, f64::max);
        if self.fail_revolve_above.is_some_and(|limit| r > limit) {
            return Err(KernelError::failed("revolve", "profile too large"));
        }
        let z0 = profile.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let z1 = profile.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Ok(Aabb::new([-r, -r, z0], [r, r, z1]))
    }

    fn loft(&self, sections: &[LoftSection]) -> Result<Aabb, KernelError> {
        self.record("loft");
        let index = self.lofts.get();
        self.lofts.set(index + 1);
        if self.fail_every_loft.is_some_and(|n| index % n == 0) {
            return Err(KernelError::failed("loft", "self-intersecting section"));
        }
        let boxes = sections
            .iter()
            .map(|s| outline(&s.points, s.z, s.z))
            .collect::<Result<Vec<_>, _>>()?;
        boxes
            .into_iter()
            .reduce(|a, b| a.union(&b))
            .ok_or_else(|| KernelError::failed("loft", "no sections"))
    }

    fn union(&self, a: &Aabb, b: &Aabb) -> Result<Aabb, KernelError> {
        self.record("union");
        Ok(a.union(b))
    }

    fn intersect(&self, a: &Aabb, b: &Aabb) -> Result<Aabb, KernelError> {
        self.record("intersect");
        let min: [f64; 3] = std::array::from_fn(|i| a.min[i].max(b.min[i]));
        // disjoint boxes collapse to an empty box
        let max: [f64; 3] = std::array::from_fn(|i| a.max[i].min(b.max[i]).max(min[i]));
        Ok(Aabb::new(min, max))
    }

    fn cut(&self, a: &Aabb, _b: &Aabb) -> Result<Aabb, KernelError> {
        self.record("cut");
        Ok(*a)
    }

    fn transform(&self, solid: &Aabb, pose: &PartPose) -> Result<Aabb, KernelError> {
        self.record("transform");
        Ok(solid.transformed(pose))
    }

    fn bounding_box(&self, solid: &Aabb) -> Result<Aabb, KernelError> {
        Ok(*solid)
    }

    fn volume(&self, solid: &Aabb) -> Result<f64, KernelError> {
        Ok(solid.size().iter().product())
    }
}

fn layout() -> AssemblyLayout {
    AssemblyLayoutCalculator::new(&MechanismSpec::default_mux())
        .unwrap()
        .calculate(SelectorState::Idle)
        .unwrap()
}

#[test]
fn test_every_part_is_realized() {
    let kernel = RecordingKernel::default();
    let layout = layout();
    let assembly = realize_parts(&kernel, &layout);
    assert!(assembly.is_complete());
    assert_eq!(assembly.parts.len(), 13);
    assert_eq!(assembly.skipped_teeth(), 0);
    // one loft per tooth on each of the two bevel gears
    assert_eq!(kernel.count("loft"), 32);
    for (id, part) in &assembly.parts {
        assert_eq!(part.metadata.part_id, *id);
        assert_eq!(part.pose, layout.part(id).unwrap().pose);
    }
}

#[test]
fn test_realized_gear_sits_on_its_pose() {
    let kernel = RecordingKernel::default();
    let layout = layout();
    let gear_b = realize_part(&kernel, "gear_b", layout.part("gear_b").unwrap()).unwrap();
    let bounds = kernel.bounding_box(&gear_b.solid).unwrap();
    // body from 32 to 40 along X, dog teeth reaching back to 30
    assert!((bounds.min[0] - 30.0).abs() < 1e-6);
    assert!((bounds.max[0] - 40.0).abs() < 1e-6);
    assert!(bounds.max[1] > 18.0 && bounds.max[1] < 19.6);
}

#[test]
fn test_failed_teeth_are_skipped_and_counted() {
    let kernel = RecordingKernel {
        fail_every_loft: Some(4),
        ..Default::default()
    };
    let assembly = realize_parts(&kernel, &layout());
    assert!(assembly.is_complete());
    assert_eq!(assembly.skipped_teeth(), 8);
    assert_eq!(assembly.parts["bevel_driving"].skipped_teeth, 4);
    assert_eq!(assembly.parts["bevel_driven"].skipped_teeth, 4);
    assert_eq!(assembly.parts["gear_a"].skipped_teeth, 0);
}

#[test]
fn test_gear_without_any_tooth_fails_alone() {
    let kernel = RecordingKernel {
        fail_every_loft: Some(1),
        ..Default::default()
    };
    let assembly = realize_parts(&kernel, &layout());
    assert!(!assembly.is_complete());
    assert_eq!(assembly.failures.len(), 2);
    let failure = assembly.failure("bevel_driven").unwrap();
    assert!(matches!(
        &failure.source,
        PartFailure::Kernel(KernelError::OperationFailed { operation, .. }) if operation == "loft"
    ));
    assert!(assembly.failure("bevel_driving").is_some());
    assert_eq!(assembly.parts.len(), 11);
    assert!(assembly.parts.contains_key("shift_lever"));
}

#[test]
fn test_kernel_failure_is_isolated_to_its_part() {
    // only the bevel webs revolve wider than 10 mm
    let kernel = RecordingKernel {
        fail_revolve_above: Some(10.0),
        ..Default::default()
    };
    let layout = layout();
    let assembly = realize_parts(&kernel, &layout);
    let failed: Vec<_> = assembly.failures.iter().map(|f| f.part_id.as_str()).collect();
    assert_eq!(failed, ["bevel_driven", "bevel_driving"]);
    assert_eq!(assembly.parts.len() + failed.len(), layout.parts.len());
    assert!(assembly.parts.contains_key("axle_selector"));
    assert!(assembly.parts.contains_key("dog_clutch"));
}

#[test]
fn test_overlap_volume_goes_through_the_kernel() {
    let kernel = RecordingKernel::default();
    let assembly = realize_parts(&kernel, &layout());
    let before = kernel.count("intersect");

    // the gear bore rides on the selector axle
    let shared = assembly
        .overlap_volume(&kernel, "gear_a", "axle_selector")
        .unwrap()
        .unwrap();
    assert!(shared > 0.0);
    assert_eq!(kernel.count("intersect"), before + 1);

    let ids: Vec<&String> = assembly.parts.keys().collect();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            let box_a = kernel.bounding_box(&assembly.parts[*a].solid).unwrap();
            let box_b = kernel.bounding_box(&assembly.parts[*b].solid).unwrap();
            let volume = assembly.overlap_volume(&kernel, a, b).unwrap().unwrap();
            assert!((volume - box_a.overlap_volume(&box_b)).abs() < 1e-6, "{a} / {b}");
        }
    }
}

#[test]
fn test_overlap_volume_of_missing_part_is_none() {
    let kernel = RecordingKernel {
        fail_revolve_above: Some(10.0),
        ..Default::default()
    };
    let assembly = realize_parts(&kernel, &layout());
    let volume = assembly.overlap_volume(&kernel, "bevel_driven", "axle_selector");
    assert_eq!(volume.unwrap(), None);
    assert_eq!(kernel.count("intersect"), 0);
}
