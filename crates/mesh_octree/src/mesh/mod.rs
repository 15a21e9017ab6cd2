//! Triangle meshes and models
//!
//! A [`Mesh`] owns its vertex buffer, its index triangles and the octree built
//! over them. The octree is derived data: it is built eagerly when the mesh is
//! created and rebuilt from scratch whenever the geometry is replaced.
//!
//! A [`Model`] groups meshes under per-mesh transforms; [`shapes`] builds the
//! procedural meshes used by tests and the demo.

pub mod model;
pub mod shapes;

pub use model::{Model, ModelMesh};

use crate::config::{ConfigError, OctreeConfig};
use crate::foundation::math::{Vec2, Vec3};
use crate::geometry::{MeshIntersection, Ray, Triangle, AABB};
use crate::spatial::{MeshOctree, TriangleOctree};

/// Vertex data with position, normal, and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in mesh space
    pub position: Vec3,
    /// Shading normal
    pub normal: Vec3,
    /// Texture coordinates
    pub tex_coord: Vec2,
}

impl Vertex {
    /// Creates a vertex from all of its attributes
    pub const fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Creates a vertex with only a position; normal and texture coordinates are zero
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec3::zeros(), Vec2::zeros())
    }
}

/// Errors raised while building meshes and models
#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    /// Index buffer does not describe whole triangles
    #[error("Index count {0} is not a multiple of 3")]
    IndexCount(usize),

    /// An index refers past the end of the vertex buffer
    #[error("Index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Position of the offending entry in the index buffer
        position: usize,
        /// The offending index
        index: u32,
        /// Length of the vertex buffer
        vertex_count: usize,
    },

    /// A mesh transform has no inverse
    #[error("Mesh transform for '{0}' is not invertible")]
    SingularTransform(String),

    /// Octree settings failed validation
    #[error("Invalid octree configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Triangle mesh with its own octree
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    bounding_box: AABB,
    octree: TriangleOctree,
}

impl Mesh {
    /// Build a mesh from a vertex buffer and a triangle index list, using the
    /// default octree settings
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: &[u32],
    ) -> Result<Self, MeshError> {
        Self::with_config(name, vertices, indices, &OctreeConfig::default())
    }

    /// Build a mesh with explicit octree settings
    pub fn with_config(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: &[u32],
        config: &OctreeConfig,
    ) -> Result<Self, MeshError> {
        config.validate()?;
        let triangles = build_triangles(&vertices, indices)?;
        Ok(Self::assemble(name.into(), vertices, triangles, config))
    }

    /// Build an unindexed mesh: every triangle gets three vertices of its own
    pub fn from_triangle_soup(name: impl Into<String>, positions: &[[Vec3; 3]]) -> Self {
        let (vertices, triangles) = soup_geometry(positions);
        Self::assemble(name.into(), vertices, triangles, &OctreeConfig::default())
    }

    /// Unindexed mesh with explicit octree settings
    pub fn from_triangle_soup_with_config(
        name: impl Into<String>,
        positions: &[[Vec3; 3]],
        config: &OctreeConfig,
    ) -> Result<Self, MeshError> {
        config.validate()?;
        let (vertices, triangles) = soup_geometry(positions);
        Ok(Self::assemble(name.into(), vertices, triangles, config))
    }

    fn assemble(
        name: String,
        vertices: Vec<Vertex>,
        triangles: Vec<Triangle>,
        config: &OctreeConfig,
    ) -> Self {
        let bounding_box = AABB::from_points(vertices.iter().map(|vertex| &vertex.position));
        let octree = TriangleOctree::build(&vertices, &triangles, &bounding_box, config);

        log::debug!(
            "Mesh '{}': {} vertices, {} triangles, bounds {:?}..{:?}",
            name,
            vertices.len(),
            triangles.len(),
            bounding_box.min,
            bounding_box.max
        );

        Self {
            name,
            vertices,
            triangles,
            bounding_box,
            octree,
        }
    }

    /// Replace the geometry and rebuild the octree with the current settings.
    ///
    /// On error the mesh is left unchanged.
    pub fn set_geometry(
        &mut self,
        vertices: Vec<Vertex>,
        indices: &[u32],
    ) -> Result<(), MeshError> {
        let triangles = build_triangles(&vertices, indices)?;
        let config = self.octree.config().clone();
        let name = std::mem::take(&mut self.name);
        *self = Self::assemble(name, vertices, triangles, &config);
        Ok(())
    }

    /// Nearest hit of a mesh-space ray.
    ///
    /// Only hits with `nearest.near <= t < nearest.t` are accepted. On success
    /// `nearest` holds the hit and the index of the triangle in
    /// [`Mesh::triangles`].
    pub fn intersect(&self, ray: &Ray, nearest: &mut MeshIntersection) -> bool {
        self.octree().intersect(ray, nearest)
    }

    /// Borrowed view pairing the octree with this mesh's geometry
    pub fn octree(&self) -> MeshOctree<'_> {
        MeshOctree::new(self)
    }

    /// The octree itself
    pub const fn triangle_octree(&self) -> &TriangleOctree {
        &self.octree
    }

    /// Mesh name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex buffer
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index triangles in input order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Tight box around all vertices
    pub const fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }
}

fn build_triangles(vertices: &[Vertex], indices: &[u32]) -> Result<Vec<Triangle>, MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::IndexCount(indices.len()));
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertices.len())
    {
        return Err(MeshError::IndexOutOfRange {
            position,
            index,
            vertex_count: vertices.len(),
        });
    }

    Ok(indices
        .chunks_exact(3)
        .map(|chunk| Triangle::new([chunk[0], chunk[1], chunk[2]], vertices))
        .collect())
}

fn soup_geometry(positions: &[[Vec3; 3]]) -> (Vec<Vertex>, Vec<Triangle>) {
    let vertices: Vec<Vertex> = positions
        .iter()
        .flat_map(|corners| corners.iter().copied().map(Vertex::from_position))
        .collect();

    let triangles = (0..positions.len())
        .map(|triangle| {
            let first = (triangle * 3) as u32;
            Triangle::new([first, first + 1, first + 2], &vertices)
        })
        .collect();

    (vertices, triangles)
}
