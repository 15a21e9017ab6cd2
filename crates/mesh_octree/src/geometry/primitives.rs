//! Analytic spheres and planes
//!
//! Both follow the same nearest-hit contract as boxes and triangles, so they
//! can be mixed with mesh queries against one accumulator.

use super::intersection::NearestHit;
use super::ray::Ray;
use crate::foundation::math::Vec3;

/// A sphere given by center and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Geometric ray/sphere test.
    ///
    /// Reports the entry point when the origin is outside the sphere and the
    /// exit point when it is inside. The normal points away from the center.
    pub fn is_intersecting<H: NearestHit>(&self, ray: &Ray, nearest: &mut H) -> bool {
        let length = ray.direction.norm();
        if length == 0.0 {
            return false;
        }
        let direction = ray.direction / length;

        let l = self.center - ray.origin;
        let s = l.dot(&direction);
        let l2 = l.dot(&l);
        let r2 = self.radius * self.radius;

        // Sphere behind an origin that lies outside it
        if s < 0.0 && l2 > r2 {
            return false;
        }

        let m2 = l2 - s * s;
        if m2 > r2 {
            return false;
        }

        let q = (r2 - m2).sqrt();
        let distance = if l2 > r2 { s - q } else { s + q };
        let t = distance / length;

        if !(t >= nearest.near() && t < nearest.t()) {
            return false;
        }

        let position = ray.at(t);
        nearest.commit(t, position, (position - self.center).normalize());
        true
    }
}

/// An infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point on the plane
    pub point: Vec3,
    /// Unit normal, reported unchanged for hits from either side
    pub normal: Vec3,
}

impl Plane {
    /// Creates a plane, normalizing `normal`
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Ray/plane test; rays within `f32::EPSILON` of parallel never hit
    pub fn is_intersecting<H: NearestHit>(&self, ray: &Ray, nearest: &mut H) -> bool {
        let denominator = self.normal.dot(&ray.direction);
        if denominator.abs() <= f32::EPSILON {
            return false;
        }

        let t = (self.point - ray.origin).dot(&self.normal) / denominator;
        if !(t >= nearest.near() && t < nearest.t()) {
            return false;
        }

        nearest.commit(t, ray.at(t), self.normal);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Intersection, MeshIntersection};
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_entry_from_outside() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::z());
        let mut hit = Intersection::none();

        assert!(sphere.is_intersecting(&ray, &mut hit));
        assert_relative_eq!(hit.t, 4.0);
        assert_relative_eq!(hit.normal, -Vec3::z());
    }

    #[test]
    fn test_sphere_exit_from_inside() {
        let sphere = Sphere::new(Vec3::zeros(), 2.0);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 0.0), Vec3::x());
        let mut hit = Intersection::none();

        assert!(sphere.is_intersecting(&ray, &mut hit));
        assert_relative_eq!(hit.t, 1.5);
        assert_relative_eq!(hit.normal, Vec3::x());
    }

    #[test]
    fn test_sphere_t_in_ray_units() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 2.0));
        let mut hit = Intersection::none();

        assert!(sphere.is_intersecting(&ray, &mut hit));
        assert_relative_eq!(hit.t, 2.0);
        assert_relative_eq!(hit.position, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_sphere_miss_behind_and_bound() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0);
        let mut hit = Intersection::none();

        let behind = Ray::new(Vec3::zeros(), -Vec3::z());
        assert!(!sphere.is_intersecting(&behind, &mut hit));

        let beside = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::z());
        assert!(!sphere.is_intersecting(&beside, &mut hit));

        let mut closer = Intersection::with_far(3.0);
        assert!(!sphere.is_intersecting(&Ray::new(Vec3::zeros(), Vec3::z()), &mut closer));
        assert_eq!(closer.t, 3.0);
    }

    #[test]
    fn test_plane_from_both_sides() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(plane.normal, Vec3::y());

        for (origin, direction) in [
            (Vec3::new(0.0, 4.0, 0.0), -Vec3::y()),
            (Vec3::new(0.0, -2.0, 0.0), Vec3::y()),
        ] {
            let mut hit = Intersection::none();
            assert!(plane.is_intersecting(&Ray::new(origin, direction), &mut hit));
            assert_relative_eq!(hit.t, 3.0);
            assert_eq!(hit.normal, Vec3::y());
        }
    }

    #[test]
    fn test_plane_parallel_behind_and_near_clip() {
        let plane = Plane::new(Vec3::zeros(), Vec3::y());
        let mut hit = Intersection::none();

        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::x());
        assert!(!plane.is_intersecting(&parallel, &mut hit));

        let away = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::y());
        assert!(!plane.is_intersecting(&away, &mut hit));

        let toward = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::y());
        let mut clipped = MeshIntersection::new(2.0);
        assert!(!plane.is_intersecting(&toward, &mut clipped));
    }
}
