//! Procedural meshes
//!
//! Both shapes are wound so that every triangle's face normal points away
//! from the origin.

use std::collections::HashMap;

use super::{Mesh, MeshError, Vertex};
use crate::config::OctreeConfig;
use crate::foundation::math::{Vec2, Vec3};
use crate::geometry::Triangle;

/// Default grid resolution of [`unit_sphere`] faces
pub const SPHERE_GRID_SIZE: u32 = 12;

/// Positions closer than this share one averaged normal
const WELD_DISTANCE: f32 = 1e-4;

/// Point on the cube face perpendicular to `axis` at `sign`, with in-face
/// coordinates `(u, v)` along the next two axes in cyclic order
fn face_point(axis: usize, sign: f32, u: f32, v: f32) -> Vec3 {
    let mut point = Vec3::zeros();
    point[axis] = sign;
    point[(axis + 1) % 3] = u;
    point[(axis + 2) % 3] = v;
    point
}

fn grid_coordinate(step: u32, grid_size: u32) -> f32 {
    step as f32 / grid_size as f32 * 2.0 - 1.0
}

/// Corner triples for one grid cell, ordered so the face normal points along `sign`
fn cell_triangles(corners: [(Vec3, Vec2); 4], sign: f32) -> [[(Vec3, Vec2); 3]; 2] {
    let [c00, c10, c01, c11] = corners;
    if sign > 0.0 {
        [[c00, c11, c10], [c00, c01, c11]]
    } else {
        [[c00, c10, c11], [c00, c11, c01]]
    }
}

/// Every cell of every cube face, `grid_size` cells per side
fn cube_cells(grid_size: u32) -> Vec<[(Vec3, Vec2); 3]> {
    let mut cells = Vec::with_capacity(6 * 2 * (grid_size * grid_size) as usize);

    for axis in 0..3 {
        for sign in [1.0_f32, -1.0] {
            for row in 0..grid_size {
                for col in 0..grid_size {
                    let corner = |c: u32, r: u32| {
                        let (u, v) = (grid_coordinate(c, grid_size), grid_coordinate(r, grid_size));
                        let tex_coord =
                            Vec2::new(c as f32 / grid_size as f32, r as f32 / grid_size as f32);
                        (face_point(axis, sign, u, v), tex_coord)
                    };
                    let corners = [
                        corner(col, row),
                        corner(col + 1, row),
                        corner(col, row + 1),
                        corner(col + 1, row + 1),
                    ];
                    cells.extend(cell_triangles(corners, sign));
                }
            }
        }
    }

    cells
}

/// Cube spanning `[-1, 1]` on every axis, four vertices per face with flat normals
pub fn unit_cube() -> Mesh {
    let (vertices, triangles) = cube_geometry();
    Mesh::assemble("UNIT_CUBE".to_string(), vertices, triangles, &OctreeConfig::default())
}

/// [`unit_cube`] with explicit octree settings
pub fn unit_cube_with_config(config: &OctreeConfig) -> Result<Mesh, MeshError> {
    config.validate()?;
    let (vertices, triangles) = cube_geometry();
    Ok(Mesh::assemble("UNIT_CUBE".to_string(), vertices, triangles, config))
}

fn cube_geometry() -> (Vec<Vertex>, Vec<Triangle>) {
    let mut vertices = Vec::with_capacity(24);
    let mut triangles = Vec::with_capacity(12);

    for axis in 0..3 {
        for sign in [1.0_f32, -1.0] {
            let first = vertices.len() as u32;
            let mut normal = Vec3::zeros();
            normal[axis] = sign;

            for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
                let tex_coord = Vec2::new((u + 1.0) * 0.5, (v + 1.0) * 0.5);
                vertices.push(Vertex::new(face_point(axis, sign, u, v), normal, tex_coord));
            }

            let [c00, c10, c01, c11] = [first, first + 1, first + 2, first + 3];
            let quads = if sign > 0.0 {
                [[c00, c11, c10], [c00, c01, c11]]
            } else {
                [[c00, c10, c11], [c00, c11, c01]]
            };
            triangles.extend(quads.map(|indices| Triangle::new(indices, &vertices)));
        }
    }

    (vertices, triangles)
}

/// Flat-shaded sphere of radius 1 built by projecting a subdivided cube.
///
/// Each cube face is split into `grid_size x grid_size` cells of two
/// triangles; every triangle owns its three vertices. Vertex normals are the
/// average of the face normals of all triangles meeting at that position.
pub fn unit_sphere(grid_size: u32) -> Mesh {
    let grid_size = grid_size.max(1);
    let (vertices, triangles) = sphere_geometry(grid_size);
    Mesh::assemble(sphere_name(grid_size), vertices, triangles, &OctreeConfig::default())
}

/// [`unit_sphere`] with explicit octree settings
pub fn unit_sphere_with_config(grid_size: u32, config: &OctreeConfig) -> Result<Mesh, MeshError> {
    config.validate()?;
    let grid_size = grid_size.max(1);
    let (vertices, triangles) = sphere_geometry(grid_size);
    Ok(Mesh::assemble(sphere_name(grid_size), vertices, triangles, config))
}

fn sphere_name(grid_size: u32) -> String {
    format!("UNIT_SPHERE_FLAT_{grid_size}")
}

fn sphere_geometry(grid_size: u32) -> (Vec<Vertex>, Vec<Triangle>) {
    let cells = cube_cells(grid_size);

    let mut vertices: Vec<Vertex> = cells
        .iter()
        .flatten()
        .map(|&(corner, tex_coord)| Vertex::new(corner.normalize(), Vec3::zeros(), tex_coord))
        .collect();

    let triangles: Vec<Triangle> = (0..cells.len())
        .map(|cell| {
            let first = (cell * 3) as u32;
            Triangle::new([first, first + 1, first + 2], &vertices)
        })
        .collect();

    average_normals(&mut vertices, &triangles);

    log::debug!(
        "unit_sphere: grid {} -> {} triangles, {} vertices",
        grid_size,
        triangles.len(),
        vertices.len()
    );

    (vertices, triangles)
}

fn weld_key(position: &Vec3) -> [i64; 3] {
    [0, 1, 2].map(|axis| (position[axis] / WELD_DISTANCE).round() as i64)
}

/// Set each vertex normal to the normalized sum of the face normals of every
/// triangle that has a vertex at the same position
fn average_normals(vertices: &mut [Vertex], triangles: &[Triangle]) {
    let mut sums: HashMap<[i64; 3], Vec3> = HashMap::new();
    for triangle in triangles {
        for &index in &triangle.vertex_indices {
            let key = weld_key(&vertices[index as usize].position);
            *sums.entry(key).or_insert_with(Vec3::zeros) += triangle.normal;
        }
    }

    for vertex in vertices.iter_mut() {
        if let Some(sum) = sums.get(&weld_key(&vertex.position)) {
            vertex.normal = sum.normalize();
        }
    }
}
