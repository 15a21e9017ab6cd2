//! Math utilities and types
//!
//! Provides the vector and matrix aliases used by the geometry code.

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Transform a position by an affine matrix (w = 1)
pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(*point)).coords
}

/// Transform a direction by an affine matrix (w = 0)
pub fn transform_vector(matrix: &Mat4, vector: &Vec3) -> Vec3 {
    matrix.transform_vector(vector)
}

/// Transform a surface normal given the inverse of the matrix that moved the surface.
///
/// Uses the inverse-transpose so normals stay perpendicular under
/// non-uniform scale. The result is renormalized.
pub fn transform_normal(inverse: &Mat4, normal: &Vec3) -> Vec3 {
    let linear = inverse.fixed_view::<3, 3>(0, 0);
    (linear.transpose() * normal).normalize()
}
