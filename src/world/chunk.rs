use bevy::prelude::*;

use super::mesh::MeshData;
use super::terrain::HeightField;

/// Grid coordinates of a chunk on the XZ plane (the world is one chunk tall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Coordinate of the chunk one step away in the given compass direction.
    pub fn step(&self, dir: Direction) -> Self {
        let (dx, dz) = dir.delta();
        Self::new(self.x + dx, self.z + dz)
    }

    pub fn from_world_pos(pos: Vec3, dims: ChunkDims) -> Self {
        Self {
            x: (pos.x / dims.width as f32).floor() as i32,
            z: (pos.z / dims.depth as f32).floor() as i32,
        }
    }

    /// World-space position of the chunk's origin corner (minimum x/z, y = 0).
    pub fn world_origin(&self, dims: ChunkDims) -> Vec3 {
        Vec3::new(
            self.x as f32 * dims.width as f32,
            0.0,
            self.z as f32 * dims.depth as f32,
        )
    }
}

/// The 8 horizontal compass directions used for chunk adjacency.
/// North is -Z, east is +X. Diagonal slots take part in linking and in
/// cross-boundary edit redirection, but meshing only ever consults the
/// 4 face-adjacent directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Chunk-coordinate offset for this direction as (dx, dz).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// The direction rotated 180 degrees. Linking a neighbor writes this
    /// slot on the far side so adjacency stays symmetric.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Canonical direction for a coordinate delta, if the delta is one of
    /// the 8 neighbor offsets.
    pub fn from_delta(dx: i32, dz: i32) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|dir| dir.delta() == (dx, dz))
    }
}

/// Fixed chunk dimensions in voxels, set once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDims {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl ChunkDims {
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }
}

/// A single cell of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voxel {
    Empty,
    Solid,
}

impl Voxel {
    pub fn is_solid(self) -> bool {
        self == Voxel::Solid
    }
}

/// One chunk of terrain: a dense solid/empty grid plus the mesh derived
/// from it. Neighbor slots hold coordinates resolved through the grid's
/// chunk map, never direct references.
pub struct VoxelChunk {
    pub coord: ChunkCoord,
    dims: ChunkDims,
    voxels: Vec<Voxel>,
    neighbors: [Option<ChunkCoord>; 8],
    /// Derived render buffer, fully regenerated on each rebuild.
    pub mesh: MeshData,
    /// Mesh is out of sync with voxel data; rebuilt on the next tick.
    pub dirty: bool,
}

impl VoxelChunk {
    pub fn new(coord: ChunkCoord, dims: ChunkDims) -> Self {
        Self {
            coord,
            dims,
            voxels: vec![Voxel::Empty; dims.volume()],
            neighbors: [None; 8],
            mesh: MeshData::default(),
            dirty: false,
        }
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn world_origin(&self) -> Vec3 {
        self.coord.world_origin(self.dims)
    }

    /// Convert 3D coordinates to 1D index.
    /// Layout: x + z * width + y * width * depth
    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + z * self.dims.width + y * self.dims.width * self.dims.depth
    }

    pub fn in_bounds(&self, at: IVec3) -> bool {
        at.x >= 0
            && (at.x as usize) < self.dims.width
            && at.y >= 0
            && (at.y as usize) < self.dims.height
            && at.z >= 0
            && (at.z as usize) < self.dims.depth
    }

    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Voxel {
        debug_assert!(
            x < self.dims.width && y < self.dims.height && z < self.dims.depth,
            "voxel read out of range: ({x}, {y}, {z})"
        );
        self.voxels[self.index(x, y, z)]
    }

    pub fn set_voxel(&mut self, x: usize, y: usize, z: usize, voxel: Voxel) {
        debug_assert!(
            x < self.dims.width && y < self.dims.height && z < self.dims.depth,
            "voxel write out of range: ({x}, {y}, {z})"
        );
        let idx = self.index(x, y, z);
        self.voxels[idx] = voxel;
    }

    pub fn is_solid(&self, at: IVec3) -> bool {
        self.voxel(at.x as usize, at.y as usize, at.z as usize)
            .is_solid()
    }

    /// Fill the voxel grid from the terrain height field. Every (x, z)
    /// column is solid below `noise * height` and empty above. The field is
    /// sampled at world coordinates, so adjacent chunks agree at their
    /// shared edge without knowing about each other.
    pub fn generate_voxels(&mut self, field: &dyn HeightField) {
        let origin = self.world_origin();
        for x in 0..self.dims.width {
            for z in 0..self.dims.depth {
                let world_x = origin.x as f64 + x as f64;
                let world_z = origin.z as f64 + z as f64;
                let height = field.column_height(world_x, world_z, self.dims.height);
                for y in 0..height {
                    self.set_voxel(x, y, z, Voxel::Solid);
                }
            }
        }
    }

    pub fn neighbor(&self, dir: Direction) -> Option<ChunkCoord> {
        self.neighbors[dir as usize]
    }

    pub fn set_neighbor(&mut self, dir: Direction, coord: ChunkCoord) {
        self.neighbors[dir as usize] = Some(coord);
    }

    /// Number of linked adjacency slots (0..=8).
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.iter().filter(|slot| slot.is_some()).count()
    }

    /// Up to two edge directions whose face-adjacent neighbor sees the
    /// given cell across the boundary. Diagonal neighbors are never
    /// returned; visibility across an edge depends only on the orthogonal
    /// neighbor.
    pub fn edge_directions(&self, at: IVec3) -> [Option<Direction>; 2] {
        let along_x = if at.x == 0 {
            Some(Direction::West)
        } else if at.x == self.dims.width as i32 - 1 {
            Some(Direction::East)
        } else {
            None
        };
        let along_z = if at.z == 0 {
            Some(Direction::North)
        } else if at.z == self.dims.depth as i32 - 1 {
            Some(Direction::South)
        } else {
            None
        };
        [along_x, along_z]
    }

    fn floor_local(&self, hit_point: Vec3) -> IVec3 {
        let local = hit_point - self.world_origin();
        IVec3::new(
            local.x.floor() as i32,
            local.y.floor() as i32,
            local.z.floor() as i32,
        )
    }

    /// Local coordinate of the voxel a surface hit belongs to. The hit
    /// point lies on the face plane and the normal is one of the 6
    /// axis-aligned unit directions. A voxel's mesh spans [x, x+1) per
    /// axis, so hits on the +Y/+Z/+X faces floor into the cell beyond the
    /// surface and need a -1 correction along the hit axis.
    pub fn remove_target(&self, hit_point: Vec3, normal: IVec3) -> IVec3 {
        let offset = if normal == IVec3::Y {
            IVec3::new(0, -1, 0)
        } else if normal == IVec3::Z {
            IVec3::new(0, 0, -1)
        } else if normal == IVec3::X {
            IVec3::new(-1, 0, 0)
        } else {
            IVec3::ZERO
        };
        self.floor_local(hit_point) + offset
    }

    /// Local coordinate of the empty voxel on the outward side of a hit
    /// face. Mirror of `remove_target`: the -1 correction applies to the
    /// -Y/-Z/-X normals instead. The result may be one step outside this
    /// chunk on x/z, in which case the edit is redirected to a neighbor.
    pub fn add_target(&self, hit_point: Vec3, normal: IVec3) -> IVec3 {
        let offset = if normal == IVec3::NEG_Y {
            IVec3::new(0, -1, 0)
        } else if normal == IVec3::NEG_Z {
            IVec3::new(0, 0, -1)
        } else if normal == IVec3::NEG_X {
            IVec3::new(-1, 0, 0)
        } else {
            IVec3::ZERO
        };
        self.floor_local(hit_point) + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: ChunkDims = ChunkDims {
        width: 4,
        height: 4,
        depth: 4,
    };

    #[test]
    fn test_direction_opposites_pair_up() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dz) = dir.delta();
            assert_eq!(dir.opposite().delta(), (-dx, -dz));
        }
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(1, 0), Some(Direction::East));
        assert_eq!(Direction::from_delta(-1, -1), Some(Direction::NorthWest));
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(2, 0), None);
        for dir in Direction::ALL {
            let (dx, dz) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dz), Some(dir));
        }
    }

    #[test]
    fn test_voxel_get_set() {
        let mut chunk = VoxelChunk::new(ChunkCoord::new(0, 0), DIMS);
        assert_eq!(chunk.voxel(1, 2, 3), Voxel::Empty);
        chunk.set_voxel(1, 2, 3, Voxel::Solid);
        assert_eq!(chunk.voxel(1, 2, 3), Voxel::Solid);
        assert_eq!(chunk.voxel(3, 2, 1), Voxel::Empty);
    }

    #[test]
    fn test_world_origin_scales_with_coord() {
        let chunk = VoxelChunk::new(ChunkCoord::new(2, -1), DIMS);
        assert_eq!(chunk.world_origin(), Vec3::new(8.0, 0.0, -4.0));
    }

    #[test]
    fn test_edge_directions() {
        let chunk = VoxelChunk::new(ChunkCoord::new(0, 0), DIMS);
        assert_eq!(
            chunk.edge_directions(IVec3::new(0, 1, 2)),
            [Some(Direction::West), None]
        );
        assert_eq!(
            chunk.edge_directions(IVec3::new(3, 1, 3)),
            [Some(Direction::East), Some(Direction::South)]
        );
        assert_eq!(chunk.edge_directions(IVec3::new(1, 0, 2)), [None, None]);
    }

    #[test]
    fn test_remove_target_offsets() {
        let chunk = VoxelChunk::new(ChunkCoord::new(0, 0), DIMS);
        // Top face of voxel (1,1,1): hit plane at y = 2.
        let target = chunk.remove_target(Vec3::new(1.5, 2.0, 1.5), IVec3::Y);
        assert_eq!(target, IVec3::new(1, 1, 1));
        // Bottom face: hit plane at y = 1, no correction.
        let target = chunk.remove_target(Vec3::new(1.5, 1.0, 1.5), IVec3::NEG_Y);
        assert_eq!(target, IVec3::new(1, 1, 1));
        // East face: hit plane at x = 2.
        let target = chunk.remove_target(Vec3::new(2.0, 1.5, 1.5), IVec3::X);
        assert_eq!(target, IVec3::new(1, 1, 1));
        // West face: hit plane at x = 1, no correction.
        let target = chunk.remove_target(Vec3::new(1.0, 1.5, 1.5), IVec3::NEG_X);
        assert_eq!(target, IVec3::new(1, 1, 1));
    }

    #[test]
    fn test_add_target_offsets() {
        let chunk = VoxelChunk::new(ChunkCoord::new(0, 0), DIMS);
        // Top face of voxel (1,1,1) places above it.
        let target = chunk.add_target(Vec3::new(1.5, 2.0, 1.5), IVec3::Y);
        assert_eq!(target, IVec3::new(1, 2, 1));
        // Bottom face places below it.
        let target = chunk.add_target(Vec3::new(1.5, 1.0, 1.5), IVec3::NEG_Y);
        assert_eq!(target, IVec3::new(1, 0, 1));
        // West face of an edge voxel reaches out of the chunk.
        let target = chunk.add_target(Vec3::new(0.0, 1.5, 1.5), IVec3::NEG_X);
        assert_eq!(target, IVec3::new(-1, 1, 1));
        // East face of an edge voxel reaches out of the chunk.
        let target = chunk.add_target(Vec3::new(4.0, 1.5, 1.5), IVec3::X);
        assert_eq!(target, IVec3::new(4, 1, 1));
    }

    #[test]
    fn test_targets_account_for_chunk_origin() {
        let chunk = VoxelChunk::new(ChunkCoord::new(1, 1), DIMS);
        // World (5.5, 2.0, 5.5) is local (1.5, 2.0, 1.5) in this chunk.
        let target = chunk.remove_target(Vec3::new(5.5, 2.0, 5.5), IVec3::Y);
        assert_eq!(target, IVec3::new(1, 1, 1));
    }

    #[test]
    fn test_neighbor_slots_and_count() {
        let mut chunk = VoxelChunk::new(ChunkCoord::new(0, 0), DIMS);
        assert_eq!(chunk.neighbor_count(), 0);
        chunk.set_neighbor(Direction::East, ChunkCoord::new(1, 0));
        chunk.set_neighbor(Direction::NorthWest, ChunkCoord::new(-1, -1));
        assert_eq!(chunk.neighbor(Direction::East), Some(ChunkCoord::new(1, 0)));
        assert_eq!(chunk.neighbor(Direction::West), None);
        assert_eq!(chunk.neighbor_count(), 2);
    }
}
