//! Geometric primitives and ray intersection tests
//!
//! Every intersection test in this module follows the same contract: it takes
//! the ray and a mutable "nearest so far" record, and only writes to the
//! record when it found a hit strictly closer than the one already stored.
//! Chaining many tests against one record therefore yields the nearest hit.
//!
//! # Module Organization
//!
//! - [`aabb`] - Axis-aligned boxes and the slab test
//! - [`ray`] - Parametric rays
//! - [`intersection`] - Hit records and the [`NearestHit`] accumulator trait
//! - [`triangle`] - Index triangles referencing a mesh's vertex buffer
//! - [`primitives`] - Analytic spheres and planes

pub mod aabb;
pub mod intersection;
pub mod primitives;
pub mod ray;
pub mod triangle;

pub use aabb::AABB;
pub use intersection::{Intersection, MeshIntersection, NearestHit};
pub use primitives::{Plane, Sphere};
pub use ray::Ray;
pub use triangle::Triangle;
