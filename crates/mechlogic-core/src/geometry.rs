//! # Shared Geometry
//!
//! Poses, bounding boxes and axis lines used by every crate. All lengths are
//! millimetres, all public angles are degrees.

use nalgebra::{Isometry3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Placement of a part in the assembly frame.
///
/// `rotation_deg` holds Euler angles about the fixed X, Y and Z axes, applied
/// in that order. The rotation is therefore `Rz * Ry * Rx`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartPose {
    /// Translation of the part's body frame origin.
    pub origin: [f64; 3],
    /// Rotation about X, then Y, then Z, in degrees.
    pub rotation_deg: [f64; 3],
}

impl Default for PartPose {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartPose {
    /// Pose at the origin with no rotation.
    pub fn identity() -> Self {
        Self {
            origin: [0.0; 3],
            rotation_deg: [0.0; 3],
        }
    }

    /// Create a pose from origin and Euler angles.
    pub fn new(origin: [f64; 3], rotation_deg: [f64; 3]) -> Self {
        Self {
            origin,
            rotation_deg,
        }
    }

    /// Create a pose from a point and a rotation matrix.
    pub fn from_parts(origin: Point3<f64>, rotation: &Rotation3<f64>) -> Self {
        let (roll, pitch, yaw) = euler_xyz(rotation);
        Self {
            origin: [origin.x, origin.y, origin.z],
            rotation_deg: [roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees()],
        }
    }

    /// Create a pose from an isometry.
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self::from_parts(
            Point3::from(iso.translation.vector),
            &iso.rotation.to_rotation_matrix(),
        )
    }

    /// Rotation matrix of this pose.
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(
            self.rotation_deg[0].to_radians(),
            self.rotation_deg[1].to_radians(),
            self.rotation_deg[2].to_radians(),
        )
    }

    /// Origin as a point.
    pub fn origin_point(&self) -> Point3<f64> {
        Point3::new(self.origin[0], self.origin[1], self.origin[2])
    }

    /// Rigid transform of this pose.
    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.origin[0], self.origin[1], self.origin[2]),
            UnitQuaternion::from_rotation_matrix(&self.rotation()),
        )
    }

    /// Map a body-frame point into the assembly frame.
    pub fn transform_point(&self, local: &Point3<f64>) -> Point3<f64> {
        self.origin_point() + self.rotation() * local.coords
    }

    /// Map a body-frame direction into the assembly frame.
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.rotation() * local
    }

    /// Same rotation, origin moved by `delta`.
    pub fn translated(&self, delta: &Vector3<f64>) -> Self {
        Self {
            origin: [
                self.origin[0] + delta.x,
                self.origin[1] + delta.y,
                self.origin[2] + delta.z,
            ],
            rotation_deg: self.rotation_deg,
        }
    }

    /// Pose of a sub-body given relative to this pose.
    pub fn compose(&self, local: &PartPose) -> Self {
        Self::from_parts(
            self.transform_point(&local.origin_point()),
            &(self.rotation() * local.rotation()),
        )
    }

    /// Apply an extra rotation about the body's own Z axis.
    pub fn spun(&self, degrees: f64) -> Self {
        let spin = Rotation3::from_axis_angle(&Vector3::z_axis(), degrees.to_radians());
        Self::from_parts(self.origin_point(), &(self.rotation() * spin))
    }
}

/// Fixed-axis X, Y, Z angles of a rotation, radians.
///
/// Near a quarter turn about Y the X and Z angles are indistinguishable, so
/// Z is folded into X there.
fn euler_xyz(rotation: &Rotation3<f64>) -> (f64, f64, f64) {
    let m = rotation.matrix();
    let r20 = m[(2, 0)];
    if r20.abs() < 1.0 - 1e-9 {
        let roll = m[(2, 1)].atan2(m[(2, 2)]);
        let pitch = (-r20).asin();
        let yaw = m[(1, 0)].atan2(m[(0, 0)]);
        (roll, pitch, yaw)
    } else if r20 < 0.0 {
        (m[(0, 1)].atan2(m[(0, 2)]), std::f64::consts::FRAC_PI_2, 0.0)
    } else {
        ((-m[(0, 1)]).atan2(-m[(0, 2)]), -std::f64::consts::FRAC_PI_2, 0.0)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: [f64; 3],
    /// Maximum corner.
    pub max: [f64; 3],
}

impl Aabb {
    /// Create a box from two corners in any order.
    pub fn new(a: [f64; 3], b: [f64; 3]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
            max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
        }
    }

    /// Smallest box containing every point, `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(
            [first.x, first.y, first.z],
            [first.x, first.y, first.z],
        );
        for p in iter {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3<f64>) {
        let c = [p.x, p.y, p.z];
        for i in 0..3 {
            self.min[i] = self.min[i].min(c[i]);
            self.max[i] = self.max[i].max(c[i]);
        }
    }

    /// Box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }

    /// Whether the interiors overlap by more than `tol` on every axis.
    pub fn overlaps(&self, other: &Aabb, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] + tol < other.max[i] && other.min[i] + tol < self.max[i])
    }

    /// Volume of the overlap of two boxes.
    pub fn overlap_volume(&self, other: &Aabb) -> f64 {
        (0..3)
            .map(|i| (self.max[i].min(other.max[i]) - self.min[i].max(other.min[i])).max(0.0))
            .product()
    }

    /// Edge lengths.
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// The eight corners.
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], a[1], a[2]),
            Point3::new(a[0], b[1], a[2]),
            Point3::new(b[0], b[1], a[2]),
            Point3::new(a[0], a[1], b[2]),
            Point3::new(b[0], a[1], b[2]),
            Point3::new(a[0], b[1], b[2]),
            Point3::new(b[0], b[1], b[2]),
        ]
    }

    /// Bounding box of this box after a rigid transform.
    pub fn transformed(&self, pose: &PartPose) -> Aabb {
        let corners = self.corners().map(|c| pose.transform_point(&c));
        // eight corners, never empty
        let mut aabb = Aabb::new(
            [corners[0].x, corners[0].y, corners[0].z],
            [corners[0].x, corners[0].y, corners[0].z],
        );
        for c in &corners[1..] {
            aabb.include(c);
        }
        aabb
    }
}

/// An infinite line used as a shaft axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLine {
    /// A point on the axis; axial coordinates are measured from here.
    pub origin: Point3<f64>,
    /// Unit direction of the axis.
    pub direction: Unit<Vector3<f64>>,
}

impl AxisLine {
    /// Create an axis through `origin` along `direction`.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: Unit::new_normalize(direction),
        }
    }

    /// Axis parallel to X through `(0, y, z)`.
    pub fn along_x(y: f64, z: f64) -> Self {
        Self::new(Point3::new(0.0, y, z), Vector3::x())
    }

    /// Axis parallel to Z through `(x, y, 0)`.
    pub fn along_z(x: f64, y: f64) -> Self {
        Self::new(Point3::new(x, y, 0.0), Vector3::z())
    }

    /// Signed distance of the projection of `p` along the axis.
    pub fn axial_coordinate(&self, p: &Point3<f64>) -> f64 {
        (p - self.origin).dot(self.direction.as_ref())
    }

    /// Perpendicular distance from `p` to the axis.
    pub fn distance_to(&self, p: &Point3<f64>) -> f64 {
        let v = p - self.origin;
        let d = self.direction.into_inner();
        (v - d * v.dot(&d)).norm()
    }

    /// Whether both lines coincide and point the same way.
    pub fn coincides_with(&self, other: &AxisLine, tol: f64) -> bool {
        self.direction.dot(other.direction.as_ref()) > 1.0 - tol * tol
            && self.distance_to(&other.origin) < tol
    }

    /// Same line, opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            direction: Unit::new_unchecked(-self.direction.into_inner()),
        }
    }

    /// Point at axial coordinate `t`.
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }
}

/// Minimal rotation taking `from` onto `to`, with a half turn fallback for
/// opposite vectors.
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> Rotation3<f64> {
    if let Some(rot) = Rotation3::rotation_between(from, to) {
        return rot;
    }
    // antiparallel: any axis perpendicular to `from` works
    let helper = if from.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let axis = Unit::new_normalize(from.cross(&helper));
    Rotation3::from_axis_angle(&axis, std::f64::consts::PI)
}

/// Wrap an angle in degrees into `[0, period)`.
pub fn wrap_deg(angle: f64, period: f64) -> f64 {
    let wrapped = angle.rem_euclid(period);
    if (period - wrapped).abs() < 1e-9 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pose_rotation_order_x_then_y_then_z() {
        let pose = PartPose::new([0.0; 3], [90.0, 0.0, 90.0]);
        // Rx(90) takes Y to Z, then Rz(90) leaves Z alone
        let v = pose.transform_vector(&Vector3::y());
        assert!(close(v.x, 0.0) && close(v.y, 0.0) && close(v.z, 1.0));
        // Rx(90) leaves X alone, then Rz(90) takes X to Y
        let v = pose.transform_vector(&Vector3::x());
        assert!(close(v.x, 0.0) && close(v.y, 1.0) && close(v.z, 0.0));
    }

    #[test]
    fn test_pose_from_parts_round_trip() {
        let rot = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.3)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2);
        let pose = PartPose::from_parts(Point3::new(1.0, 2.0, 3.0), &rot);
        let probe = Vector3::new(0.2, -0.7, 1.1);
        let diff = pose.rotation() * probe - rot * probe;
        assert!(diff.norm() < 1e-9);
    }

    #[test]
    fn test_pose_round_trip_at_quarter_turn_about_y() {
        for spin in [0.0, 0.4, -1.2, 2.9] {
            let rot = Rotation3::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2)
                * Rotation3::from_axis_angle(&Vector3::z_axis(), spin);
            let pose = PartPose::from_parts(Point3::origin(), &rot);
            for probe in [Vector3::x(), Vector3::y(), Vector3::z()] {
                assert!((pose.rotation() * probe - rot * probe).norm() < 1e-6);
            }
        }
    }

    #[test]
    fn test_spun_turns_about_body_z() {
        let pose = PartPose::new([5.0, 0.0, 0.0], [0.0, 90.0, 0.0]);
        let spun = pose.spun(90.0);
        let axis = spun.transform_vector(&Vector3::z());
        assert!(close(axis.x, 1.0));
        assert_eq!(spun.origin, pose.origin);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
        let b = Aabb::new([1.0, 1.0, 1.0], [3.0, 3.0, 3.0]);
        let c = Aabb::new([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]);
        assert!(a.overlaps(&b, 0.0));
        assert!(close(a.overlap_volume(&b), 1.0));
        // touching faces do not overlap
        assert!(!a.overlaps(&c, 0.0));
        assert!(close(a.overlap_volume(&c), 0.0));
    }

    #[test]
    fn test_axis_line_coincidence() {
        let a = AxisLine::along_x(0.0, 0.0);
        let b = AxisLine::new(Point3::new(12.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0));
        let c = AxisLine::along_x(0.0, 36.0);
        assert!(a.coincides_with(&b, 1e-6));
        assert!(!a.coincides_with(&c, 1e-6));
        assert!(close(a.axial_coordinate(&Point3::new(7.0, 3.0, 1.0)), 7.0));
        assert!(close(c.distance_to(&Point3::new(4.0, 0.0, 0.0)), 36.0));
    }

    #[test]
    fn test_rotation_between_antiparallel() {
        let rot = rotation_between(&-Vector3::z(), &Vector3::z());
        let v = rot * -Vector3::z();
        assert!(close(v.z, 1.0));
    }

    #[test]
    fn test_wrap_deg() {
        assert!(close(wrap_deg(370.0, 360.0), 10.0));
        assert!(close(wrap_deg(-7.5, 15.0), 7.5));
        assert!(close(wrap_deg(15.0 - 1e-12, 15.0), 0.0));
    }

    #[test]
    fn test_compose_places_sub_body() {
        let part = PartPose::new([20.0, 34.8, 0.0], [0.0, 0.0, 90.0]);
        let local = PartPose::new([0.0, -10.0, 0.0], [0.0, 90.0, 0.0]);
        let world = part.compose(&local);
        // Rz(90) maps local -Y onto +X
        assert!(close(world.origin[0], 30.0) && close(world.origin[1], 34.8));
        let axis = world.transform_vector(&Vector3::z());
        assert!(close(axis.y, 1.0));
    }

    #[test]
    fn test_reversed_axis_still_collinear() {
        let a = AxisLine::along_z(1.0, 2.0);
        assert!(!a.coincides_with(&a.reversed(), 1e-6));
        assert!(a.reversed().reversed().coincides_with(&a, 1e-6));
    }
}
