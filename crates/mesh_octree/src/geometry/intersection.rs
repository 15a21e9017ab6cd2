//! Ray hit records
//!
//! A hit record doubles as the running "best so far" accumulator of a query:
//! it starts at `t = +inf` (or a caller-supplied upper bound) and each
//! successful test overwrites it with a strictly closer hit.

use crate::foundation::math::Vec3;

/// Accumulator written by ray intersection tests
///
/// Implementors only need to expose the current best distance and accept a
/// closer hit. Tests must check `t < self.t()` before calling [`commit`].
///
/// [`commit`]: NearestHit::commit
pub trait NearestHit {
    /// Parametric distance of the best hit so far (`+inf` when none)
    fn t(&self) -> f32;

    /// Hits closer than this are clipped away
    fn near(&self) -> f32 {
        0.0
    }

    /// Replace the stored hit
    fn commit(&mut self, t: f32, position: Vec3, normal: Vec3);
}

/// Generic ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Parametric distance along the ray
    pub t: f32,
    /// Hit position
    pub position: Vec3,
    /// Surface normal at the hit
    pub normal: Vec3,
}

impl Default for Intersection {
    fn default() -> Self {
        Self::none()
    }
}

impl Intersection {
    /// An empty record that any hit improves on
    pub fn none() -> Self {
        Self::with_far(f32::INFINITY)
    }

    /// An empty record that only accepts hits closer than `far`
    pub fn with_far(far: f32) -> Self {
        Self {
            t: far,
            position: Vec3::zeros(),
            normal: Vec3::zeros(),
        }
    }

    /// Forget the stored hit
    pub fn reset(&mut self) {
        self.t = f32::INFINITY;
    }

    /// True when a hit has been recorded
    pub fn valid(&self) -> bool {
        self.t.is_finite()
    }
}

impl NearestHit for Intersection {
    fn t(&self) -> f32 {
        self.t
    }

    fn commit(&mut self, t: f32, position: Vec3, normal: Vec3) {
        self.t = t;
        self.position = position;
        self.normal = normal;
    }
}

/// Ray hit against a mesh, carrying the near clip and the hit triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshIntersection {
    /// Parametric distance along the ray
    pub t: f32,
    /// Hit position in mesh space
    pub position: Vec3,
    /// Face normal of the hit triangle
    pub normal: Vec3,
    /// Lower bound on accepted `t`, used to skip self-intersection at the origin
    pub near: f32,
    /// Index of the hit triangle in the mesh's triangle list
    pub triangle: u32,
}

impl Default for MeshIntersection {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MeshIntersection {
    /// An empty record accepting hits from `near` to infinity
    pub fn new(near: f32) -> Self {
        Self::with_range(near, f32::INFINITY)
    }

    /// An empty record accepting hits in `[near, far)`
    pub fn with_range(near: f32, far: f32) -> Self {
        Self {
            t: far,
            position: Vec3::zeros(),
            normal: Vec3::zeros(),
            near,
            triangle: 0,
        }
    }

    /// Forget the stored hit and set a new accepted range
    pub fn reset(&mut self, near: f32, far: f32) {
        self.near = near;
        self.t = far;
    }

    /// True when a hit has been recorded
    pub fn valid(&self) -> bool {
        self.t.is_finite()
    }

    /// Drop the mesh-specific fields
    pub fn to_intersection(&self) -> Intersection {
        Intersection {
            t: self.t,
            position: self.position,
            normal: self.normal,
        }
    }
}

impl NearestHit for MeshIntersection {
    fn t(&self) -> f32 {
        self.t
    }

    fn near(&self) -> f32 {
        self.near
    }

    fn commit(&mut self, t: f32, position: Vec3, normal: Vec3) {
        self.t = t;
        self.position = position;
        self.normal = normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_records_are_invalid() {
        assert!(!Intersection::none().valid());
        assert!(!MeshIntersection::new(0.5).valid());
        assert_eq!(MeshIntersection::new(0.5).near(), 0.5);
        assert_eq!(Intersection::none().near(), 0.0);
    }

    #[test]
    fn test_commit_and_reset() {
        let mut hit = Intersection::none();
        hit.commit(2.0, Vec3::x(), Vec3::y());
        assert!(hit.valid());
        assert_eq!(hit.position, Vec3::x());

        hit.reset();
        assert!(!hit.valid());
    }

    #[test]
    fn test_mesh_reset_sets_range() {
        let mut hit = MeshIntersection::new(0.0);
        hit.commit(3.0, Vec3::zeros(), Vec3::z());
        hit.reset(1.0, 10.0);

        assert_eq!(hit.near, 1.0);
        assert_eq!(hit.t, 10.0);
        // A finite far bound alone counts as valid; callers reset to +inf to mean "no hit"
        assert!(hit.valid());
    }
}
