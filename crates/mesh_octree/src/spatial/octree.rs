//! Triangle octree for nearest-hit ray queries
//!
//! Each mesh owns one [`TriangleOctree`] built from its own triangles. Nodes
//! split lazily into 8 octants once they hold more than the preferred number
//! of triangles. A triangle is stored in the first node whose strict box holds
//! its centroid and whose elongated box holds all three corners; triangles no
//! child accepts stay behind as residuals in the parent.
//!
//! The tree stores triangle indices only. Vertex and triangle data are
//! borrowed from the mesh at build and query time, so an octree can never
//! outlive or diverge from the geometry it indexes.

use crate::config::OctreeConfig;
use crate::foundation::math::Vec3;
use crate::geometry::{MeshIntersection, Ray, Triangle, AABB};
use crate::mesh::{Mesh, Vertex};

/// Borrowed geometry the tree indexes into
#[derive(Clone, Copy)]
struct TriangleSource<'a> {
    vertices: &'a [Vertex],
    triangles: &'a [Triangle],
}

impl TriangleSource<'_> {
    fn corners(&self, index: u32) -> [Vec3; 3] {
        self.triangles[index as usize].corners(self.vertices)
    }
}

fn centroid(corners: &[Vec3; 3]) -> Vec3 {
    (corners[0] + corners[1] + corners[2]) / 3.0
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Region this node owns; a triangle's centroid must lie inside it
    strict_box: AABB,

    /// Strict box stretched across the parent's split planes; a triangle's
    /// corners must lie inside it. Also the box rays are tested against.
    elongated_box: AABB,

    /// Triangle indices held here (leaf content, or residuals of an internal node)
    triangles: Vec<u32>,

    /// Child nodes (8 octants), None if this is a leaf
    children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    depth: u32,
}

impl OctreeNode {
    fn root(bounds: AABB) -> Self {
        Self {
            strict_box: bounds,
            elongated_box: bounds,
            triangles: Vec::new(),
            children: None,
            depth: 0,
        }
    }

    /// Build one octant of `parent`.
    ///
    /// Octant layout (bit set = upper half on that axis):
    /// bit 0 = +X, bit 1 = +Y, bit 2 = +Z.
    fn child(parent: &AABB, center: &Vec3, octant: usize, depth: u32, stretch_ratio: f32) -> Self {
        let mut strict_box = *parent;
        for axis in 0..3 {
            if octant & (1 << axis) == 0 {
                strict_box.max[axis] = center[axis];
            } else {
                strict_box.min[axis] = center[axis];
            }
        }

        // Only the faces lying on the parent's split planes are stretched
        let elongation = strict_box.size() * (stretch_ratio - 1.0);
        let mut elongated_box = strict_box;
        for axis in 0..3 {
            if octant & (1 << axis) == 0 {
                elongated_box.max[axis] += elongation[axis];
            } else {
                elongated_box.min[axis] -= elongation[axis];
            }
        }

        Self {
            strict_box,
            elongated_box,
            triangles: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Region owned by this node
    pub const fn strict_box(&self) -> &AABB {
        &self.strict_box
    }

    /// Region tested against rays and triangle corners
    pub const fn elongated_box(&self) -> &AABB {
        &self.elongated_box
    }

    /// Triangle indices stored directly in this node
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// The 8 children, if this node has been split
    pub fn children(&self) -> Option<&[Self; 8]> {
        self.children.as_deref()
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Depth in the tree (0 = root)
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    fn accepts(&self, corners: &[Vec3; 3], centroid: &Vec3) -> bool {
        self.strict_box.contains(centroid)
            && corners.iter().all(|corner| self.elongated_box.contains(corner))
    }

    /// Insert a triangle into this node or one of its descendants
    fn add_triangle(
        &mut self,
        index: u32,
        corners: &[Vec3; 3],
        centroid: &Vec3,
        source: TriangleSource<'_>,
        config: &OctreeConfig,
    ) -> bool {
        if !self.accepts(corners, centroid) {
            return false;
        }

        if self.is_leaf() {
            let full = self.triangles.len() >= config.preferred_triangle_count;
            if !full || self.depth >= config.max_depth {
                self.triangles.push(index);
                return true;
            }
            self.subdivide(source, config);
        }

        if !self.add_to_children(index, corners, centroid, source, config) {
            self.triangles.push(index);
        }
        true
    }

    /// Offer a triangle to the children in octant order
    fn add_to_children(
        &mut self,
        index: u32,
        corners: &[Vec3; 3],
        centroid: &Vec3,
        source: TriangleSource<'_>,
        config: &OctreeConfig,
    ) -> bool {
        self.children.as_mut().is_some_and(|children| {
            children
                .iter_mut()
                .any(|child| child.add_triangle(index, corners, centroid, source, config))
        })
    }

    /// Split into 8 children and push the held triangles down where they fit
    fn subdivide(&mut self, source: TriangleSource<'_>, config: &OctreeConfig) {
        let center = self.strict_box.center();
        let children: [Self; 8] = std::array::from_fn(|octant| {
            Self::child(&self.strict_box, &center, octant, self.depth + 1, config.stretch_ratio)
        });
        self.children = Some(Box::new(children));

        let held = std::mem::take(&mut self.triangles);
        for index in held {
            let corners = source.corners(index);
            let centroid = centroid(&corners);
            if !self.add_to_children(index, &corners, &centroid, source, config) {
                self.triangles.push(index);
            }
        }
    }

    /// Nearest-hit traversal below this node
    fn intersect(
        &self,
        source: TriangleSource<'_>,
        ray: &Ray,
        nearest: &mut MeshIntersection,
    ) -> bool {
        let mut found = false;

        for &index in &self.triangles {
            if source.triangles[index as usize].is_intersecting(source.vertices, ray, nearest) {
                nearest.triangle = index;
                found = true;
            }
        }

        let Some(children) = self.children.as_deref() else {
            return found;
        };

        // Entry distance per child; None marks a child the ray misses or
        // cannot reach before the current best
        let mut entries: [(usize, Option<f32>); 8] = std::array::from_fn(|octant| {
            let child = &children[octant];
            if child.elongated_box.contains(&ray.origin) {
                return (octant, Some(0.0));
            }
            let mut probe = *nearest;
            let entry = child.elongated_box.intersects(ray, &mut probe).then_some(probe.t);
            (octant, entry)
        });

        entries.sort_by(|(_, a), (_, b)| {
            a.unwrap_or(f32::INFINITY).total_cmp(&b.unwrap_or(f32::INFINITY))
        });

        for (octant, entry) in entries {
            let Some(entry) = entry else {
                continue;
            };
            if entry > nearest.t {
                continue;
            }
            if children[octant].intersect(source, ray, nearest) {
                found = true;
            }
        }

        found
    }

    fn collect_stats(&self, stats: &mut OctreeStats) {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(self.depth);
        stats.triangle_count += self.triangles.len();

        match self.children.as_deref() {
            None => stats.leaf_count += 1,
            Some(children) => {
                stats.residual_count += self.triangles.len();
                for child in children {
                    child.collect_stats(stats);
                }
            }
        }
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Self>) {
        match self.children.as_deref() {
            None => leaves.push(self),
            Some(children) => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }
}

/// Shape summary of a built octree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    /// Total nodes including the root
    pub node_count: usize,
    /// Nodes without children
    pub leaf_count: usize,
    /// Deepest node depth (root = 0)
    pub max_depth: u32,
    /// Triangle indices stored across all nodes
    pub triangle_count: usize,
    /// Triangle indices stored in internal nodes
    pub residual_count: usize,
}

/// Octree over the triangles of one mesh
#[derive(Debug, Clone)]
pub struct TriangleOctree {
    /// Root node covering the padded mesh bounding box
    root: OctreeNode,

    /// Number of triangles indexed
    triangle_count: usize,

    /// Settings the tree was built with
    config: OctreeConfig,
}

impl TriangleOctree {
    /// Build the tree over `triangles`, inserting them in slice order.
    ///
    /// `bounding_box` must enclose every vertex the triangles reference; the
    /// root box is that box padded by `config.root_epsilon` on every face.
    pub fn build(
        vertices: &[Vertex],
        triangles: &[Triangle],
        bounding_box: &AABB,
        config: &OctreeConfig,
    ) -> Self {
        let padding = Vec3::repeat(config.root_epsilon);
        let mut root = OctreeNode::root(bounding_box.expanded_by(padding));
        let source = TriangleSource { vertices, triangles };

        for index in 0..triangles.len() {
            // Triangle indices are stored as u32, matching the vertex index width
            let index = index as u32;
            let corners = source.corners(index);
            let centroid = centroid(&corners);

            if !root.add_triangle(index, &corners, &centroid, source, config) {
                log::warn!(
                    "TriangleOctree: triangle {} ({:?}) is outside the bounds, kept at the root",
                    index,
                    corners
                );
                root.triangles.push(index);
            }
        }

        let octree = Self {
            root,
            triangle_count: triangles.len(),
            config: config.clone(),
        };

        if log::log_enabled!(log::Level::Debug) {
            let stats = octree.stats();
            log::debug!(
                "TriangleOctree: {} triangles in {} nodes ({} leaves, depth {}, {} residual)",
                octree.triangle_count,
                stats.node_count,
                stats.leaf_count,
                stats.max_depth,
                stats.residual_count
            );
        }

        octree
    }

    /// Find the nearest triangle hit along `ray`.
    ///
    /// `nearest` is both input and output: only hits with
    /// `nearest.near <= t < nearest.t` are accepted, and each accepted hit
    /// overwrites it along with the mesh index of the triangle. Returns true
    /// iff `nearest` was updated.
    ///
    /// `vertices` and `triangles` must be the data the tree was built from.
    pub fn intersect(
        &self,
        vertices: &[Vertex],
        triangles: &[Triangle],
        ray: &Ray,
        nearest: &mut MeshIntersection,
    ) -> bool {
        if self.triangle_count == 0 {
            return false;
        }

        let mut probe = *nearest;
        if !self.root.elongated_box.intersects(ray, &mut probe) {
            return false;
        }

        self.root.intersect(TriangleSource { vertices, triangles }, ray, nearest)
    }

    /// Root node
    pub const fn root(&self) -> &OctreeNode {
        &self.root
    }

    /// Number of triangles indexed
    pub const fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Settings the tree was built with
    pub const fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Count nodes, leaves and stored triangles
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats::default();
        self.root.collect_stats(&mut stats);
        stats
    }

    /// Get all leaf nodes (for visualization)
    pub fn leaves(&self) -> Vec<&OctreeNode> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }
}

/// A mesh's octree together with the geometry it indexes
#[derive(Debug, Clone, Copy)]
pub struct MeshOctree<'a> {
    octree: &'a TriangleOctree,
    vertices: &'a [Vertex],
    triangles: &'a [Triangle],
}

impl<'a> MeshOctree<'a> {
    /// Borrow the octree of `mesh`
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            octree: mesh.triangle_octree(),
            vertices: mesh.vertices(),
            triangles: mesh.triangles(),
        }
    }

    /// Find the nearest triangle hit along a mesh-space ray.
    ///
    /// See [`TriangleOctree::intersect`].
    pub fn intersect(&self, ray: &Ray, nearest: &mut MeshIntersection) -> bool {
        self.octree.intersect(self.vertices, self.triangles, ray, nearest)
    }

    /// The underlying tree
    pub const fn tree(&self) -> &'a TriangleOctree {
        self.octree
    }

    /// Count nodes, leaves and stored triangles
    pub fn stats(&self) -> OctreeStats {
        self.octree.stats()
    }
}
