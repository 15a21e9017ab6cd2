//! Ray picking across placed model instances
//!
//! A [`PickScene`] holds model instances with world transforms and layer
//! bits. [`PickScene::pick`] moves a world-space ray into each instance's
//! model space, lets [`Model::intersect`] reject it against the model box or
//! query every mesh octree, and keeps the hit with the smallest world-space
//! distance.
//!
//! Affine maps preserve the ray parameter, so the best world distance found
//! so far can be handed to the next mesh query as an upper bound on `t`
//! without converting between spaces.

use std::sync::Arc;

use slotmap::SlotMap;

use crate::foundation::math::{self, Mat4};
use crate::geometry::{Intersection, Ray};
use crate::mesh::Model;

slotmap::new_key_type! {
    /// Stable handle to an instance in a [`PickScene`]
    pub struct InstanceId;
}

/// Layer bits matching every instance
pub const ALL_LAYERS: u32 = u32::MAX;

/// Picking errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PickingError {
    /// The model-to-world transform has no inverse
    #[error("Instance transform is not invertible")]
    SingularTransform,

    /// The handle does not refer to a live instance
    #[error("Unknown instance: {0:?}")]
    UnknownInstance(InstanceId),
}

/// A model placed in the world
#[derive(Debug, Clone)]
pub struct Instance {
    model: Arc<Model>,
    model_to_world: Mat4,
    world_to_model: Mat4,
    layers: u32,
}

impl Instance {
    /// Shared model data
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Model space to world space
    pub const fn model_to_world(&self) -> &Mat4 {
        &self.model_to_world
    }

    /// Cached inverse of the world transform
    pub const fn world_to_model(&self) -> &Mat4 {
        &self.world_to_model
    }

    /// Layer bits tested against the pick mask
    pub const fn layers(&self) -> u32 {
        self.layers
    }
}

/// Result of a successful pick
#[derive(Debug, Clone, Copy)]
pub struct PickHit {
    /// Instance that was hit
    pub instance: InstanceId,
    /// Index of the mesh within the instance's model
    pub mesh_index: usize,
    /// Index of the triangle within that mesh
    pub triangle: u32,
    /// World-space hit; `t` is the distance from the ray origin
    pub intersection: Intersection,
    /// World transform of the hit instance at pick time
    pub model_to_world: Mat4,
}

/// Collection of pickable model instances
#[derive(Debug, Default)]
pub struct PickScene {
    instances: SlotMap<InstanceId, Instance>,
}

fn invert(model_to_world: &Mat4) -> Result<Mat4, PickingError> {
    model_to_world.try_inverse().ok_or(PickingError::SingularTransform)
}

impl PickScene {
    /// Creates an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `model` in the world
    pub fn add_instance(
        &mut self,
        model: Arc<Model>,
        model_to_world: Mat4,
        layers: u32,
    ) -> Result<InstanceId, PickingError> {
        let world_to_model = invert(&model_to_world)?;
        let id = self.instances.insert(Instance {
            model,
            model_to_world,
            world_to_model,
            layers,
        });
        log::debug!("PickScene: added instance {:?}", id);
        Ok(id)
    }

    /// Move an instance
    pub fn set_transform(
        &mut self,
        id: InstanceId,
        model_to_world: Mat4,
    ) -> Result<(), PickingError> {
        let world_to_model = invert(&model_to_world)?;
        let instance = self.instances.get_mut(id).ok_or(PickingError::UnknownInstance(id))?;
        instance.model_to_world = model_to_world;
        instance.world_to_model = world_to_model;
        Ok(())
    }

    /// Change which layers an instance belongs to
    pub fn set_layers(&mut self, id: InstanceId, layers: u32) -> Result<(), PickingError> {
        let instance = self.instances.get_mut(id).ok_or(PickingError::UnknownInstance(id))?;
        instance.layers = layers;
        Ok(())
    }

    /// Remove an instance, returning it if it existed
    pub fn remove_instance(&mut self, id: InstanceId) -> Option<Instance> {
        self.instances.remove(id)
    }

    /// Look up an instance
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    /// All instances with their handles
    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances.iter()
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when the scene holds no instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Nearest hit of a world-space ray among instances sharing a bit with `layer_mask`
    pub fn pick(&self, ray: &Ray, layer_mask: u32) -> Option<PickHit> {
        let direction_length = ray.direction.norm();
        if direction_length == 0.0 {
            return None;
        }

        let mut best: Option<PickHit> = None;
        let mut best_distance = f32::INFINITY;

        for (id, instance) in &self.instances {
            if instance.layers & layer_mask == 0 {
                continue;
            }

            let model_ray = ray.transformed(&instance.world_to_model);
            let mut model_hit = Intersection::with_far(best_distance / direction_length);
            let Some((mesh_index, triangle)) =
                instance.model.intersect(&model_ray, &mut model_hit)
            else {
                continue;
            };

            let position = ray.at(model_hit.t);
            let distance = (position - ray.origin).norm();
            if distance >= best_distance {
                continue;
            }

            log::trace!(
                "pick: instance {:?} mesh {} triangle {} at distance {}",
                id,
                mesh_index,
                triangle,
                distance
            );

            best_distance = distance;
            best = Some(PickHit {
                instance: id,
                mesh_index,
                triangle,
                intersection: Intersection {
                    t: distance,
                    position,
                    normal: math::transform_normal(&instance.world_to_model, &model_hit.normal),
                },
                model_to_world: instance.model_to_world,
            });
        }

        best
    }
}
