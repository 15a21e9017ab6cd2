//! Axis-aligned bounding boxes

use super::intersection::NearestHit;
use super::ray::Ray;
use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box
///
/// A box is valid when `min <= max` on every axis. [`AABB::empty`] uses
/// `+inf`/`-inf` sentinels so that expanding it by any point yields that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

impl AABB {
    /// Create a new AABB from min and max points
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A box containing nothing
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// The box from `(-1, -1, -1)` to `(1, 1, 1)`
    pub fn unit() -> Self {
        Self::new(Vec3::repeat(-1.0), Vec3::repeat(1.0))
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Tight box around a set of points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_point(point);
        }
        aabb
    }

    /// True for boxes built by [`AABB::empty`] and never expanded
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Half the length of the diagonal
    pub fn radius(&self) -> f32 {
        self.size().norm() * 0.5
    }

    /// Grow to include a point
    pub fn expand_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Grow to include another box
    pub fn expand_box(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Copy grown by `padding` on every face
    #[must_use]
    pub fn expanded_by(&self, padding: Vec3) -> Self {
        Self::new(self.min - padding, self.max + padding)
    }

    /// Check if this AABB contains a point (bounds are inclusive on every axis)
    pub fn contains(&self, point: &Vec3) -> bool {
        self.min.x <= point.x && point.x <= self.max.x &&
        self.min.y <= point.y && point.y <= self.max.y &&
        self.min.z <= point.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Slab test against a ray, committing the entry point into `nearest`.
    ///
    /// The entry distance is clamped to 0 when the origin is inside the box.
    /// Fails without touching `nearest` when the ray misses, when the box is
    /// entirely behind the origin, or when the entry is not strictly closer
    /// than `nearest.t()`.
    ///
    /// Zero direction components are divided through unguarded: the
    /// resulting signed infinities still produce the correct slab interval.
    /// This needs IEEE-754 default (non-trapping) floating point semantics.
    pub fn intersects<H: NearestHit>(&self, ray: &Ray, nearest: &mut H) -> bool {
        let mut tmin = (self.min.x - ray.origin.x) / ray.direction.x;
        let mut tmax = (self.max.x - ray.origin.x) / ray.direction.x;
        if tmin > tmax {
            std::mem::swap(&mut tmin, &mut tmax);
        }

        let mut tymin = (self.min.y - ray.origin.y) / ray.direction.y;
        let mut tymax = (self.max.y - ray.origin.y) / ray.direction.y;
        if tymin > tymax {
            std::mem::swap(&mut tymin, &mut tymax);
        }

        if tmin > tymax || tymin > tmax {
            return false;
        }
        if tymin > tmin {
            tmin = tymin;
        }
        if tymax < tmax {
            tmax = tymax;
        }

        let mut tzmin = (self.min.z - ray.origin.z) / ray.direction.z;
        let mut tzmax = (self.max.z - ray.origin.z) / ray.direction.z;
        if tzmin > tzmax {
            std::mem::swap(&mut tzmin, &mut tzmax);
        }

        if tmin > tzmax || tzmin > tmax {
            return false;
        }
        if tzmin > tmin {
            tmin = tzmin;
        }
        if tzmax < tmax {
            tmax = tzmax;
        }

        if tmax < 0.0 {
            return false;
        }

        let t = tmin.max(0.0);
        if t >= nearest.t() {
            return false;
        }

        let position = ray.at(t);
        nearest.commit(t, position, self.face_normal(&position, &ray.direction));
        true
    }

    /// Outward normal of the face a point on the surface lies on.
    ///
    /// Picks the axis with the greatest penetration relative to the box size,
    /// preferring X, then Y, then Z on ties. A zero-thickness axis counts as
    /// full penetration and faces against `direction`.
    fn face_normal(&self, position: &Vec3, direction: &Vec3) -> Vec3 {
        let offset = self.center() - position;
        let size = self.size();

        let penetration = |axis: usize| {
            if size[axis] > 0.0 {
                (offset[axis] / size[axis]).abs()
            } else {
                f32::INFINITY
            }
        };
        let (fx, fy, fz) = (penetration(0), penetration(1), penetration(2));

        let axis = if fx >= fy && fx >= fz {
            0
        } else if fy >= fz {
            1
        } else {
            2
        };

        let mut normal = Vec3::zeros();
        normal[axis] = if size[axis] > 0.0 {
            if offset[axis] > 0.0 { -1.0 } else { 1.0 }
        } else {
            -direction[axis].signum()
        };
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Intersection;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_box_round_trip() {
        let aabb = AABB::unit();
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let mut hit = Intersection::none();

        assert!(aabb.intersects(&ray, &mut hit));
        assert_relative_eq!(hit.t, 4.0);
        assert_relative_eq!(hit.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(hit.normal, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_normals_on_every_face() {
        let aabb = AABB::unit();
        let cases = [
            (Vec3::new(-5.0, 0.1, 0.2), Vec3::x(), Vec3::new(-1.0, 0.0, 0.0)),
            (Vec3::new(0.1, 5.0, 0.2), -Vec3::y(), Vec3::new(0.0, 1.0, 0.0)),
            (Vec3::new(0.1, -5.0, 0.2), Vec3::y(), Vec3::new(0.0, -1.0, 0.0)),
            (Vec3::new(0.1, 0.2, 5.0), -Vec3::z(), Vec3::new(0.0, 0.0, 1.0)),
            (Vec3::new(0.1, 0.2, -5.0), Vec3::z(), Vec3::new(0.0, 0.0, -1.0)),
        ];

        for (origin, direction, expected) in cases {
            let mut hit = Intersection::none();
            assert!(AABB::intersects(&aabb, &Ray::new(origin, direction), &mut hit));
            assert_eq!(hit.normal, expected, "ray from {origin:?}");
            assert_relative_eq!(hit.t, 4.0);
        }
    }

    #[test]
    fn test_non_cubic_box_uses_relative_penetration() {
        // Wide flat box: hitting the top face must report +Y even though the
        // absolute X offset of the hit point is larger than its Y offset
        let aabb = AABB::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 1.0, 10.0));
        let ray = Ray::new(Vec3::new(3.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut hit = Intersection::none();

        assert!(aabb.intersects(&ray, &mut hit));
        assert_eq!(hit.normal, Vec3::y());
    }

    #[test]
    fn test_flat_box_faces_the_ray() {
        let aabb = AABB::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));

        let mut from_below = Intersection::none();
        let up = Ray::new(Vec3::new(0.2, 0.3, -5.0), Vec3::z());
        assert!(aabb.intersects(&up, &mut from_below));
        assert_relative_eq!(from_below.t, 5.0);
        assert_eq!(from_below.normal, -Vec3::z());

        let mut from_above = Intersection::none();
        let down = Ray::new(Vec3::new(0.2, 0.3, 5.0), -Vec3::z());
        assert!(aabb.intersects(&down, &mut from_above));
        assert_eq!(from_above.normal, Vec3::z());

        // Slanted ray still reports the flat face
        let mut slanted = Intersection::none();
        let tilted = Ray::new(Vec3::new(-0.5, 0.1, -2.0), Vec3::new(0.3, 0.2, 1.0));
        assert!(aabb.intersects(&tilted, &mut slanted));
        assert_eq!(slanted.normal, -Vec3::z());
    }

    #[test]
    fn test_miss_and_behind() {
        let aabb = AABB::unit();
        let mut hit = Intersection::none();

        let beside = Ray::new(Vec3::new(5.0, 3.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert!(!aabb.intersects(&beside, &mut hit));

        let away = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!aabb.intersects(&away, &mut hit));
        assert!(!hit.valid());
    }

    #[test]
    fn test_origin_inside_clamps_to_zero() {
        let aabb = AABB::unit();
        let ray = Ray::new(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let mut hit = Intersection::none();

        assert!(aabb.intersects(&ray, &mut hit));
        assert_eq!(hit.t, 0.0);
    }

    #[test]
    fn test_requires_strict_improvement() {
        let aabb = AABB::unit();
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        let mut equal = Intersection::with_far(4.0);
        assert!(!aabb.intersects(&ray, &mut equal));
        assert_eq!(equal.t, 4.0);

        let mut closer = Intersection::with_far(3.0);
        assert!(!aabb.intersects(&ray, &mut closer));

        let mut farther = Intersection::with_far(4.5);
        assert!(aabb.intersects(&ray, &mut farther));
        assert_relative_eq!(farther.t, 4.0);
    }

    #[test]
    fn test_axis_aligned_ray_relies_on_infinities() {
        // Direction has zero Y and Z components; the divisions yield +-inf
        let aabb = AABB::unit();
        let mut hit = Intersection::none();
        let inside_slab = Ray::new(Vec3::new(-3.0, 0.5, -0.5), Vec3::new(2.0, 0.0, 0.0));
        assert!(aabb.intersects(&inside_slab, &mut hit));
        assert_relative_eq!(hit.t, 1.0);

        let mut miss = Intersection::none();
        let outside_slab = Ray::new(Vec3::new(-3.0, 1.5, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert!(!aabb.intersects(&outside_slab, &mut miss));
    }

    #[test]
    fn test_contains_is_closed() {
        let aabb = AABB::unit();
        assert!(aabb.contains(&Vec3::new(1.0, -1.0, 0.0)));
        assert!(aabb.contains(&Vec3::zeros()));
        assert!(!aabb.contains(&Vec3::new(1.0001, 0.0, 0.0)));
    }

    #[test]
    fn test_expand_and_derived_values() {
        let mut aabb = AABB::empty();
        assert!(aabb.is_empty());

        aabb.expand_point(&Vec3::new(1.0, 2.0, 3.0));
        aabb.expand_point(&Vec3::new(-1.0, 0.0, 1.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(aabb.radius(), 3.0_f32.sqrt());

        let mut union = AABB::unit();
        union.expand_box(&aabb);
        assert_eq!(union.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(union.overlaps(&AABB::unit()));
    }
}
