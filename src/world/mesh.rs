use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use super::chunk::VoxelChunk;

/// Render buffer for one chunk: unshared quad vertices with flat normals,
/// a unit UV square per quad, and a triangle index list. This is the full
/// boundary contract with the render backend.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every face is 4 vertices.
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Convert to a Bevy mesh for rendering.
    pub fn to_render_mesh(&self) -> Mesh {
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone())
        .with_inserted_indices(Indices::U32(self.indices.clone()))
    }
}

/// Face-adjacent neighbor chunks consulted during meshing. Diagonal
/// neighbors never matter here: a face can only cross one boundary.
pub struct NeighborData<'a> {
    pub west: Option<&'a VoxelChunk>,  // -X
    pub east: Option<&'a VoxelChunk>,  // +X
    pub north: Option<&'a VoxelChunk>, // -Z
    pub south: Option<&'a VoxelChunk>, // +Z
}

impl<'a> NeighborData<'a> {
    pub fn none() -> Self {
        Self {
            west: None,
            east: None,
            north: None,
            south: None,
        }
    }
}

/// Index patterns for one quad, relative to its first vertex. Combined
/// with the per-direction vertex orders below, both wind counter-clockwise
/// seen from outside the solid cell.
const QUAD_INDICES_XY: [u32; 6] = [0, 2, 1, 2, 3, 1];
const QUAD_INDICES_Z: [u32; 6] = [1, 2, 0, 1, 3, 2];

/// Unit UV square applied to every face.
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

fn emit_quad(mesh: &mut MeshData, corners: [[f32; 3]; 4], normal: [f32; 3], pattern: [u32; 6]) {
    let base = mesh.positions.len() as u32;
    mesh.positions.extend_from_slice(&corners);
    mesh.normals.extend_from_slice(&[normal; 4]);
    mesh.uvs.extend_from_slice(&QUAD_UVS);
    mesh.indices.extend(pattern.iter().map(|i| base + i));
}

/// Whether the cell at (nx, ny, nz) — one step from a solid voxel — is
/// empty, looking through linked neighbors at the side boundaries. A side
/// boundary with no linked neighbor counts as exposed: the face stays
/// visible until the neighbor chunk arrives and triggers a rebuild. The
/// grid is one chunk tall, so the ±Y boundaries are always exposed.
fn face_exposed(chunk: &VoxelChunk, neighbors: &NeighborData, nx: i32, ny: i32, nz: i32) -> bool {
    let dims = chunk.dims();
    let (w, h, d) = (
        dims.width as i32,
        dims.height as i32,
        dims.depth as i32,
    );

    if ny < 0 || ny >= h {
        return true;
    }
    if nx >= 0 && nx < w && nz >= 0 && nz < d {
        return !chunk.voxel(nx as usize, ny as usize, nz as usize).is_solid();
    }

    // Across a side boundary: wrap the coordinate to the opposite edge of
    // the linked neighbor, if there is one.
    if nx < 0 {
        return match neighbors.west {
            Some(other) => !other.voxel(dims.width - 1, ny as usize, nz as usize).is_solid(),
            None => true,
        };
    }
    if nx >= w {
        return match neighbors.east {
            Some(other) => !other.voxel(0, ny as usize, nz as usize).is_solid(),
            None => true,
        };
    }
    if nz < 0 {
        return match neighbors.north {
            Some(other) => !other.voxel(nx as usize, ny as usize, dims.depth - 1).is_solid(),
            None => true,
        };
    }
    match neighbors.south {
        Some(other) => !other.voxel(nx as usize, ny as usize, 0).is_solid(),
        None => true,
    }
}

/// Rebuild the full mesh buffer for a chunk: visit every voxel in fixed
/// x, then y, then z order and emit a quad for each of its 6 faces that
/// borders empty space. Face-culling surface extraction, O(voxel count);
/// coplanar faces are not merged.
pub fn build_chunk_mesh(chunk: &VoxelChunk, neighbors: &NeighborData) -> MeshData {
    let mut mesh = MeshData::default();
    let dims = chunk.dims();

    for x in 0..dims.width {
        for y in 0..dims.height {
            for z in 0..dims.depth {
                if !chunk.voxel(x, y, z).is_solid() {
                    continue;
                }

                let (xi, yi, zi) = (x as i32, y as i32, z as i32);
                let (fx, fy, fz) = (x as f32, y as f32, z as f32);

                // Top (+Y)
                if face_exposed(chunk, neighbors, xi, yi + 1, zi) {
                    emit_quad(
                        &mut mesh,
                        [
                            [fx, fy + 1.0, fz],
                            [fx + 1.0, fy + 1.0, fz],
                            [fx, fy + 1.0, fz + 1.0],
                            [fx + 1.0, fy + 1.0, fz + 1.0],
                        ],
                        [0.0, 1.0, 0.0],
                        QUAD_INDICES_XY,
                    );
                }

                // Bottom (-Y)
                if face_exposed(chunk, neighbors, xi, yi - 1, zi) {
                    emit_quad(
                        &mut mesh,
                        [
                            [fx, fy, fz],
                            [fx, fy, fz + 1.0],
                            [fx + 1.0, fy, fz],
                            [fx + 1.0, fy, fz + 1.0],
                        ],
                        [0.0, -1.0, 0.0],
                        QUAD_INDICES_XY,
                    );
                }

                // East (+X)
                if face_exposed(chunk, neighbors, xi + 1, yi, zi) {
                    emit_quad(
                        &mut mesh,
                        [
                            [fx + 1.0, fy, fz],
                            [fx + 1.0, fy, fz + 1.0],
                            [fx + 1.0, fy + 1.0, fz],
                            [fx + 1.0, fy + 1.0, fz + 1.0],
                        ],
                        [1.0, 0.0, 0.0],
                        QUAD_INDICES_XY,
                    );
                }

                // West (-X)
                if face_exposed(chunk, neighbors, xi - 1, yi, zi) {
                    emit_quad(
                        &mut mesh,
                        [
                            [fx, fy, fz],
                            [fx, fy + 1.0, fz],
                            [fx, fy, fz + 1.0],
                            [fx, fy + 1.0, fz + 1.0],
                        ],
                        [-1.0, 0.0, 0.0],
                        QUAD_INDICES_XY,
                    );
                }

                // South (+Z)
                if face_exposed(chunk, neighbors, xi, yi, zi + 1) {
                    emit_quad(
                        &mut mesh,
                        [
                            [fx, fy, fz + 1.0],
                            [fx + 1.0, fy, fz + 1.0],
                            [fx, fy + 1.0, fz + 1.0],
                            [fx + 1.0, fy + 1.0, fz + 1.0],
                        ],
                        [0.0, 0.0, 1.0],
                        QUAD_INDICES_Z,
                    );
                }

                // North (-Z)
                if face_exposed(chunk, neighbors, xi, yi, zi - 1) {
                    emit_quad(
                        &mut mesh,
                        [
                            [fx, fy, fz],
                            [fx, fy + 1.0, fz],
                            [fx + 1.0, fy, fz],
                            [fx + 1.0, fy + 1.0, fz],
                        ],
                        [0.0, 0.0, -1.0],
                        QUAD_INDICES_Z,
                    );
                }
            }
        }
    }

    mesh
}
