//! Spatial acceleration structures

pub mod octree;

pub use octree::{MeshOctree, OctreeNode, OctreeStats, TriangleOctree};
