//! Models: meshes placed under per-mesh transforms

use super::{Mesh, MeshError};
use crate::foundation::math::{self, Mat4, Vec3};
use crate::geometry::{Intersection, MeshIntersection, NearestHit, Ray, AABB};

/// Relative padding of the model box used to reject rays before any mesh query
const BROAD_PHASE_PADDING: f32 = 1e-4;

/// A mesh together with its placement inside a model
#[derive(Debug, Clone)]
pub struct ModelMesh {
    /// The geometry
    pub mesh: Mesh,
    /// Mesh space to model space
    pub mesh_to_model: Mat4,
    /// Cached inverse of `mesh_to_model`
    pub model_to_mesh: Mat4,
}

/// Named group of meshes sharing one model space
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    meshes: Vec<ModelMesh>,
    bounding_box: AABB,
}

impl Model {
    /// Creates an empty model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
            bounding_box: AABB::empty(),
        }
    }

    /// Add a mesh placed by `mesh_to_model` and return its index.
    ///
    /// Fails if the transform cannot be inverted.
    pub fn add_mesh(&mut self, mesh: Mesh, mesh_to_model: Mat4) -> Result<usize, MeshError> {
        let model_to_mesh = mesh_to_model
            .try_inverse()
            .ok_or_else(|| MeshError::SingularTransform(mesh.name().to_string()))?;

        if !mesh.bounding_box().is_empty() {
            self.bounding_box.expand_box(&transformed_box(mesh.bounding_box(), &mesh_to_model));
        }

        self.meshes.push(ModelMesh {
            mesh,
            mesh_to_model,
            model_to_mesh,
        });
        Ok(self.meshes.len() - 1)
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Meshes in insertion order
    pub fn meshes(&self) -> &[ModelMesh] {
        &self.meshes
    }

    /// Model-space box enclosing every mesh
    pub const fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    /// Nearest hit of a model-space ray across all meshes.
    ///
    /// `nearest` is read as the current bound and, on success, overwritten
    /// with the model-space hit. Because affine maps preserve the ray
    /// parameter, `t` is comparable across meshes. Returns the mesh index and
    /// triangle index of the hit, or None if nothing closer was found.
    ///
    /// Rays that miss the model bounding box, or enter it no closer than the
    /// current bound, skip every mesh.
    pub fn intersect(&self, model_ray: &Ray, nearest: &mut Intersection) -> Option<(usize, u32)> {
        if !self.may_hit(model_ray, nearest.t()) {
            return None;
        }

        let mut best = None;

        for (mesh_index, placed) in self.meshes.iter().enumerate() {
            let mesh_ray = model_ray.transformed(&placed.model_to_mesh);
            let mut local = MeshIntersection::with_range(0.0, nearest.t());
            if !placed.mesh.intersect(&mesh_ray, &mut local) {
                continue;
            }

            nearest.commit(
                local.t,
                model_ray.at(local.t),
                math::transform_normal(&placed.model_to_mesh, &local.normal),
            );
            best = Some((mesh_index, local.triangle));
        }

        best
    }

    /// Broad-phase test against the padded model box
    fn may_hit(&self, model_ray: &Ray, bound: f32) -> bool {
        if self.bounding_box.is_empty() {
            return false;
        }
        let padding = self.bounding_box.radius().max(1.0) * BROAD_PHASE_PADDING;
        let bounds = self.bounding_box.expanded_by(Vec3::repeat(padding));
        bounds.intersects(model_ray, &mut Intersection::with_far(bound))
    }
}

/// Box enclosing the eight transformed corners of `aabb`
fn transformed_box(aabb: &AABB, matrix: &Mat4) -> AABB {
    let mut result = AABB::empty();
    for corner in 0..8 {
        let point = Vec3::new(
            if corner & 1 == 0 { aabb.min.x } else { aabb.max.x },
            if corner & 2 == 0 { aabb.min.y } else { aabb.max.y },
            if corner & 4 == 0 { aabb.min.z } else { aabb.max.z },
        );
        result.expand_point(&math::transform_point(matrix, &point));
    }
    result
}
