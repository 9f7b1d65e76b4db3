//! # Solid Kernel
//!
//! The interface a solid modeling kernel offers, and part realization on top
//! of it. Realization turns each placed part's shape into kernel solids, one
//! part at a time. A part that fails is logged and reported and the rest of
//! the assembly carries on. Bevel teeth are lofted one by one; a failed tooth
//! is skipped and counted.

use crate::bom::PartMetadata;
use crate::layout::{AssemblyLayout, PlacedPart};
use crate::shape::{GearBody, RingSector, Shape};
use mechlogic_core::{Aabb, KernelError, PartError, PartFailure, PartPose};
use mechlogic_gears::{BevelGearSpec, GearKind, SpurToothProfile, ToothSolidProfile};
use nalgebra::Point2;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One loft station: a closed XY outline at height `z`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoftSection {
    pub z: f64,
    pub points: Vec<Point2<f64>>,
}

/// Operations a solid modeling kernel provides.
///
/// Profiles are closed outlines in the body XY plane. Revolve profiles lie in
/// the XZ half plane (`x` is the radius) and turn about Z, starting at +X.
pub trait SolidKernel {
    type Solid: Clone;

    /// Extrude `profile` from `z = 0` to `z = length`, narrowing by `taper_deg`.
    fn extrude(
        &self,
        profile: &[Point2<f64>],
        length: f64,
        taper_deg: f64,
    ) -> Result<Self::Solid, KernelError>;

    fn revolve(&self, profile: &[Point2<f64>], degrees: f64) -> Result<Self::Solid, KernelError>;

    fn loft(&self, sections: &[LoftSection]) -> Result<Self::Solid, KernelError>;

    fn union(&self, a: &Self::Solid, b: &Self::Solid) -> Result<Self::Solid, KernelError>;

    /// Common volume of `a` and `b`; may be empty. Used for exact overlap
    /// checks between realized parts.
    fn intersect(&self, a: &Self::Solid, b: &Self::Solid) -> Result<Self::Solid, KernelError>;

    /// `a` with `b` removed.
    fn cut(&self, a: &Self::Solid, b: &Self::Solid) -> Result<Self::Solid, KernelError>;

    /// Rotate then translate by `pose`.
    fn transform(&self, solid: &Self::Solid, pose: &PartPose) -> Result<Self::Solid, KernelError>;

    fn bounding_box(&self, solid: &Self::Solid) -> Result<Aabb, KernelError>;

    fn volume(&self, solid: &Self::Solid) -> Result<f64, KernelError>;
}

/// A part realized as a kernel solid in the assembly frame.
#[derive(Debug, Clone)]
pub struct RealizedPart<S> {
    pub solid: S,
    pub pose: PartPose,
    pub metadata: PartMetadata,
    /// Bevel teeth the kernel could not loft.
    pub skipped_teeth: usize,
}

/// Solids for every part that could be built, plus the failures.
#[derive(Debug, Clone)]
pub struct RealizedAssembly<S> {
    pub parts: BTreeMap<String, RealizedPart<S>>,
    pub failures: Vec<PartError>,
}

impl<S> RealizedAssembly<S> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn skipped_teeth(&self) -> usize {
        self.parts.values().map(|p| p.skipped_teeth).sum()
    }

    pub fn failure(&self, part_id: &str) -> Option<&PartError> {
        self.failures.iter().find(|f| f.part_id == part_id)
    }

    /// Volume the kernel finds shared by two realized parts.
    ///
    /// `None` when either part was not realized. This is the solid-level
    /// counterpart of the layout's shape-based interference check.
    pub fn overlap_volume<K>(
        &self,
        kernel: &K,
        a: &str,
        b: &str,
    ) -> Result<Option<f64>, KernelError>
    where
        K: SolidKernel<Solid = S>,
    {
        let (Some(part_a), Some(part_b)) = (self.parts.get(a), self.parts.get(b)) else {
            return Ok(None);
        };
        let common = kernel.intersect(&part_a.solid, &part_b.solid)?;
        let volume = kernel.volume(&common)?;
        debug!(a, b, volume, "Kernel overlap");
        Ok(Some(volume))
    }
}

/// Realize every part of `layout`.
pub fn realize_parts<K: SolidKernel>(
    kernel: &K,
    layout: &AssemblyLayout,
) -> RealizedAssembly<K::Solid> {
    let mut parts = BTreeMap::new();
    let mut failures = Vec::new();
    for (part_id, part) in &layout.parts {
        match realize_part(kernel, part_id, part) {
            Ok(realized) => {
                parts.insert(part_id.clone(), realized);
            }
            Err(err) => {
                warn!(part_id = %part_id, error = %err.source, "Part realization failed");
                failures.push(err);
            }
        }
    }
    info!(
        realized = parts.len(),
        failed = failures.len(),
        "Realized assembly"
    );
    RealizedAssembly { parts, failures }
}

/// Realize one placed part in the assembly frame.
pub fn realize_part<K: SolidKernel>(
    kernel: &K,
    part_id: &str,
    part: &PlacedPart,
) -> Result<RealizedPart<K::Solid>, PartError> {
    let mut builder = ShapeBuilder {
        kernel,
        part_id,
        skipped_teeth: 0,
    };
    let body = builder
        .build(&part.shape)
        .map_err(|e| PartError::new(part_id, e))?;
    let solid = kernel
        .transform(&body, &part.pose)
        .map_err(|e| PartError::new(part_id, e))?;
    debug!(part_id, skipped_teeth = builder.skipped_teeth, "Realized part");
    Ok(RealizedPart {
        solid,
        pose: part.pose,
        metadata: part.metadata.clone(),
        skipped_teeth: builder.skipped_teeth,
    })
}

struct ShapeBuilder<'a, K> {
    kernel: &'a K,
    part_id: &'a str,
    skipped_teeth: usize,
}

impl<K: SolidKernel> ShapeBuilder<'_, K> {
    fn build(&mut self, shape: &Shape) -> Result<K::Solid, PartFailure> {
        match shape {
            Shape::Ring(ring) => self.ring(ring),
            Shape::Block(block) => {
                let [x0, y0, z0] = block.min;
                let [x1, y1, z1] = block.max;
                let outline = [
                    Point2::new(x0, y0),
                    Point2::new(x1, y0),
                    Point2::new(x1, y1),
                    Point2::new(x0, y1),
                ];
                let solid = self.kernel.extrude(&outline, z1 - z0, 0.0)?;
                Ok(self
                    .kernel
                    .transform(&solid, &PartPose::new([0.0, 0.0, z0], [0.0; 3]))?)
            }
            Shape::Gear(gear) => match gear.kind {
                GearKind::Spur(_) => self.spur(gear),
                GearKind::Bevel(spec) => self.bevel(gear, &spec),
            },
            Shape::Composite(children) => {
                let mut result: Option<K::Solid> = None;
                for (local, child) in children {
                    let solid = self.build(child)?;
                    let placed = self.kernel.transform(&solid, local)?;
                    result = Some(match result {
                        Some(acc) => self.kernel.union(&acc, &placed)?,
                        None => placed,
                    });
                }
                result.ok_or_else(|| KernelError::failed("union", "empty composite").into())
            }
        }
    }

    fn annulus(
        &self,
        inner: f64,
        outer: f64,
        z0: f64,
        z1: f64,
        degrees: f64,
    ) -> Result<K::Solid, KernelError> {
        let profile = [
            Point2::new(inner, z0),
            Point2::new(outer, z0),
            Point2::new(outer, z1),
            Point2::new(inner, z1),
        ];
        self.kernel.revolve(&profile, degrees)
    }

    fn ring(&self, ring: &RingSector) -> Result<K::Solid, PartFailure> {
        let (z0, z1) = (ring.span.start, ring.span.end);
        if ring.is_full() {
            return Ok(self.annulus(ring.inner_radius, ring.outer_radius, z0, z1, 360.0)?);
        }
        let mut result: Option<K::Solid> = None;
        for &(start, sweep) in &ring.sectors {
            let sector = self.annulus(ring.inner_radius, ring.outer_radius, z0, z1, sweep)?;
            let placed = self
                .kernel
                .transform(&sector, &PartPose::new([0.0; 3], [0.0, 0.0, start]))?;
            result = Some(match result {
                Some(acc) => self.kernel.union(&acc, &placed)?,
                None => placed,
            });
        }
        result.ok_or_else(|| KernelError::failed("revolve", "ring without sectors").into())
    }

    fn bore(&self, gear: &GearBody) -> Result<K::Solid, KernelError> {
        // run the bore past both faces so the cut leaves no skin
        let margin = 1.0;
        self.annulus(
            0.0,
            gear.bore_radius,
            gear.span.start - margin,
            gear.span.end + margin,
            360.0,
        )
    }

    fn spur(&self, gear: &GearBody) -> Result<K::Solid, PartFailure> {
        let outline = SpurToothProfile::new(gear.kind.gear()).generate()?;
        let body = self
            .kernel
            .extrude(outline.points(), gear.span.length(), 0.0)?;
        let body = self
            .kernel
            .transform(&body, &PartPose::new([0.0, 0.0, gear.span.start], [0.0; 3]))?;
        Ok(self.kernel.cut(&body, &self.bore(gear)?)?)
    }

    fn bevel(&mut self, gear: &GearBody, spec: &BevelGearSpec) -> Result<K::Solid, PartFailure> {
        let (back, front) = (gear.span.start, gear.span.end);
        let root_back = spec.gear().root_radius();
        let root_front = root_back * spec.front_scale();
        let web = [
            Point2::new(gear.bore_radius, back),
            Point2::new(root_back, back),
            Point2::new(root_front, front),
            Point2::new(gear.bore_radius, front),
        ];
        let mut body = self.kernel.revolve(&web, 360.0)?;

        let teeth = gear.kind.teeth() as usize;
        let mut built = 0;
        for index in 0..teeth {
            match self.bevel_tooth(&gear.kind, index, back) {
                Ok(tooth) => {
                    body = self.kernel.union(&body, &tooth)?;
                    built += 1;
                }
                Err(err) => {
                    warn!(
                        part_id = %err.part_id,
                        tooth = index,
                        error = %err.source,
                        "Skipping bevel tooth"
                    );
                    self.skipped_teeth += 1;
                }
            }
        }
        if built == 0 {
            return Err(KernelError::failed(
                "loft",
                format!("none of {} bevel teeth could be lofted", teeth),
            )
            .into());
        }
        Ok(self.kernel.cut(&body, &self.bore(gear)?)?)
    }

    fn bevel_tooth(
        &self,
        kind: &GearKind,
        index: usize,
        back: f64,
    ) -> Result<K::Solid, PartError> {
        let sections = match kind.tooth_profile(index) {
            Ok(ToothSolidProfile::Bevel(sections)) => sections,
            Ok(ToothSolidProfile::Spur(_)) => {
                return Err(PartError::new(
                    self.part_id,
                    KernelError::failed("loft", "spur profile given to a bevel gear"),
                ))
            }
            Err(err) => return Err(PartError::new(self.part_id, err)),
        };
        let stations: Vec<LoftSection> = sections
            .into_iter()
            .map(|section| LoftSection {
                z: back + section.axial_offset,
                points: section.points,
            })
            .collect();
        self.kernel
            .loft(&stations)
            .map_err(|e| PartError::new(self.part_id, e))
    }
}
