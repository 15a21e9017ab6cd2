//! # Mesh Octree
//!
//! Nearest-hit ray queries against triangle meshes, answered by an adaptive
//! octree that every mesh builds once from its own geometry.
//!
//! ## Features
//!
//! - **Geometry primitives**: boxes, rays, triangles, spheres and planes sharing
//!   one "improve-or-no-op" nearest-hit accumulator contract
//! - **Triangle octree**: lazy 8-way subdivision with elongated child boxes so
//!   triangles straddling a split plane are neither lost nor duplicated
//! - **Sorted traversal**: children visited by entry distance with dynamic
//!   pruning, returning the nearest hit rather than the first
//! - **Picking**: world-space rays resolved against many transformed model
//!   instances
//!
//! ## Quick Start
//!
//! ```rust
//! use mesh_octree::prelude::*;
//!
//! let sphere = shapes::unit_sphere(12);
//! let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
//!
//! let mut nearest = MeshIntersection::new(0.0);
//! if sphere.intersect(&ray, &mut nearest) {
//!     println!("hit triangle {} at t = {}", nearest.triangle, nearest.t);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod mesh;
pub mod picking;
pub mod spatial;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, OctreeConfig},
        foundation::math::{Mat4, Point3, Vec2, Vec3},
        geometry::{Intersection, MeshIntersection, NearestHit, Plane, Ray, Sphere, Triangle, AABB},
        mesh::{shapes, Mesh, MeshError, Model, ModelMesh, Vertex},
        picking::{InstanceId, PickHit, PickScene, PickingError},
        spatial::{MeshOctree, OctreeStats, TriangleOctree},
    };
}
