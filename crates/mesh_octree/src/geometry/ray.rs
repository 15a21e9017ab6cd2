//! Parametric rays

use crate::foundation::math::{self, Mat4, Vec3};

/// A ray for ray casting and picking
///
/// The direction is not normalized on construction. Distances reported by
/// intersection tests are in units of `direction`, so callers that need
/// `t` to be a metric distance build the ray with [`Ray::normalized`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Vec3,
    /// The traversal vector of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Creates a ray pointing from `origin` toward `target` with a unit direction
    pub fn from_points(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin).normalized()
    }

    /// Returns a copy of this ray with a unit-length direction
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            origin: self.origin,
            direction: self.direction.normalize(),
        }
    }

    /// Get a point along the ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Map the ray through an affine transform.
    ///
    /// The direction is not renormalized: a point at parameter
    /// `t` on this ray maps to the point at the same `t` on the result.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: math::transform_point(matrix, &self.origin),
            direction: math::transform_vector(matrix, &self.direction),
        }
    }
}
