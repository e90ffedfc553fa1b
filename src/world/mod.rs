mod chunk;
mod grid;
pub mod mesh;
mod terrain;

pub use chunk::{ChunkCoord, ChunkDims, Direction, Voxel, VoxelChunk};
pub use grid::{
    setup_spawn_area, track_viewer_chunks, upload_chunk_meshes, ChunkGrid, GridConfig,
    TerrainChunk, TerrainMaterial,
};
pub use terrain::{spawn_height, HeightField, NoiseHeightField};

#[cfg(test)]
pub use terrain::ConstantField;
