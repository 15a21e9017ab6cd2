//! Index triangles
//!
//! A [`Triangle`] stores three indices into a vertex buffer owned by its mesh
//! plus a cached face normal. It never copies vertex data; every method that
//! needs positions borrows the buffer from the caller.

use super::intersection::NearestHit;
use super::ray::Ray;
use crate::foundation::math::Vec3;
use crate::mesh::Vertex;

/// A triangle referencing three vertices of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Indices into the owning mesh's vertex buffer
    pub vertex_indices: [u32; 3],
    /// Unit face normal, `normalize((v2 - v0) x (v1 - v0))`
    pub normal: Vec3,
}

impl Triangle {
    /// Creates a triangle and caches its face normal.
    ///
    /// Zero-area triangles get a NaN normal and can never be hit.
    ///
    /// # Panics
    /// Panics if an index is out of range for `vertices`. [`crate::mesh::Mesh`]
    /// validates indices before building triangles.
    pub fn new(vertex_indices: [u32; 3], vertices: &[Vertex]) -> Self {
        let mut triangle = Self {
            vertex_indices,
            normal: Vec3::zeros(),
        };
        triangle.compute_normal(vertices);
        triangle
    }

    /// Recompute the cached normal from the vertex buffer
    pub fn compute_normal(&mut self, vertices: &[Vertex]) {
        let [v0, v1, v2] = self.corners(vertices);
        self.normal = (v2 - v0).cross(&(v1 - v0)).normalize();
    }

    /// Positions of the three vertices
    pub fn corners(&self, vertices: &[Vertex]) -> [Vec3; 3] {
        self.vertex_indices.map(|index| vertices[index as usize].position)
    }

    /// Average of the three vertex positions
    pub fn centroid(&self, vertices: &[Vertex]) -> Vec3 {
        let [v0, v1, v2] = self.corners(vertices);
        (v0 + v1 + v2) / 3.0
    }

    /// Ray/plane intersection followed by an inside test.
    ///
    /// Accepts hits with `nearest.near() <= t < nearest.t()`. Rays within
    /// `f32::EPSILON` of parallel to the plane are ignored. The inside test
    /// requires every edge function to be strictly positive, so a ray passing
    /// exactly through an edge or a vertex is a miss.
    pub fn is_intersecting<H: NearestHit>(
        &self,
        vertices: &[Vertex],
        ray: &Ray,
        nearest: &mut H,
    ) -> bool {
        let denominator = self.normal.dot(&ray.direction);
        if denominator.abs() <= f32::EPSILON {
            return false;
        }

        let [v0, v1, v2] = self.corners(vertices);

        let d = -self.normal.dot(&v0);
        let t = -(self.normal.dot(&ray.origin) + d) / denominator;
        if !(t >= nearest.near() && t < nearest.t()) {
            return false;
        }

        let p = ray.at(t);

        let edge01 = v0 - v1;
        let edge12 = v1 - v2;
        let edge20 = v2 - v0;

        let inside = self.normal.dot(&edge01.cross(&(p - v0))) > 0.0
            && self.normal.dot(&edge12.cross(&(p - v1))) > 0.0
            && self.normal.dot(&edge20.cross(&(p - v2))) > 0.0;
        if !inside {
            return false;
        }

        nearest.commit(t, p, self.normal);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Intersection, MeshIntersection};
    use approx::assert_relative_eq;

    fn vertices() -> Vec<Vertex> {
        vec![
            Vertex::from_position(Vec3::new(0.0, 0.0, 0.0)),
            Vertex::from_position(Vec3::new(1.0, 0.0, 0.0)),
            Vertex::from_position(Vec3::new(0.0, 1.0, 0.0)),
        ]
    }

    #[test]
    fn test_normal_follows_winding() {
        let vertices = vertices();
        let triangle = Triangle::new([0, 1, 2], &vertices);
        assert_relative_eq!(triangle.normal, Vec3::new(0.0, 0.0, -1.0));

        let flipped = Triangle::new([0, 2, 1], &vertices);
        assert_relative_eq!(flipped.normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_hit_from_either_side() {
        let vertices = vertices();
        let triangle = Triangle::new([0, 1, 2], &vertices);

        for (origin, direction) in [
            (Vec3::new(0.25, 0.25, 3.0), Vec3::new(0.0, 0.0, -1.0)),
            (Vec3::new(0.25, 0.25, -3.0), Vec3::new(0.0, 0.0, 1.0)),
        ] {
            let mut hit = Intersection::none();
            assert!(triangle.is_intersecting(&vertices, &Ray::new(origin, direction), &mut hit));
            assert_relative_eq!(hit.t, 3.0);
            assert_relative_eq!(hit.position, Vec3::new(0.25, 0.25, 0.0));
            assert_eq!(hit.normal, triangle.normal);
        }
    }

    #[test]
    fn test_outside_and_parallel_miss() {
        let vertices = vertices();
        let triangle = Triangle::new([0, 1, 2], &vertices);
        let mut hit = Intersection::none();

        let outside = Ray::new(Vec3::new(0.8, 0.8, 1.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!triangle.is_intersecting(&vertices, &outside, &mut hit));

        let parallel = Ray::new(Vec3::new(-1.0, 0.2, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!triangle.is_intersecting(&vertices, &parallel, &mut hit));

        let behind = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!triangle.is_intersecting(&vertices, &behind, &mut hit));
        assert!(!hit.valid());
    }

    #[test]
    fn test_edge_and_vertex_hits_are_misses() {
        let vertices = vertices();
        let triangle = Triangle::new([0, 1, 2], &vertices);
        let down = Vec3::new(0.0, 0.0, -1.0);

        for point in [
            Vec3::new(0.5, 0.0, 1.0),  // on edge v0-v1
            Vec3::new(0.0, 0.5, 1.0),  // on edge v2-v0
            Vec3::new(0.5, 0.5, 1.0),  // on hypotenuse
            Vec3::new(0.0, 0.0, 1.0),  // on v0
            Vec3::new(1.0, 0.0, 1.0),  // on v1
        ] {
            let mut hit = Intersection::none();
            assert!(
                !triangle.is_intersecting(&vertices, &Ray::new(point, down), &mut hit),
                "edge point {point:?} should be classified as a miss"
            );
        }
    }

    #[test]
    fn test_nearest_bound_and_near_clip() {
        let vertices = vertices();
        let triangle = Triangle::new([0, 1, 2], &vertices);
        let ray = Ray::new(Vec3::new(0.25, 0.25, 3.0), Vec3::new(0.0, 0.0, -1.0));

        let mut closer_known = Intersection::with_far(2.0);
        assert!(!triangle.is_intersecting(&vertices, &ray, &mut closer_known));
        assert_eq!(closer_known.t, 2.0);

        let mut clipped = MeshIntersection::new(3.5);
        assert!(!triangle.is_intersecting(&vertices, &ray, &mut clipped));

        let mut unclipped = MeshIntersection::new(2.5);
        assert!(triangle.is_intersecting(&vertices, &ray, &mut unclipped));
        assert_relative_eq!(unclipped.t, 3.0);
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let vertices = vec![
            Vertex::from_position(Vec3::zeros()),
            Vertex::from_position(Vec3::new(1.0, 1.0, 1.0)),
            Vertex::from_position(Vec3::new(2.0, 2.0, 2.0)),
        ];
        let triangle = Triangle::new([0, 1, 2], &vertices);
        assert!(triangle.normal.x.is_nan());

        let mut hit = Intersection::none();
        let ray = Ray::new(Vec3::new(1.0, 1.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!triangle.is_intersecting(&vertices, &ray, &mut hit));
    }
}
