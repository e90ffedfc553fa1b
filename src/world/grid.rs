use bevy::prelude::*;
use bevy::render::primitives::Aabb;
use std::collections::HashMap;

use super::chunk::{ChunkCoord, ChunkDims, Direction, Voxel, VoxelChunk};
use super::mesh::{build_chunk_mesh, NeighborData};
use super::terrain::{HeightField, NoiseHeightField};
use crate::components::CameraController;

/// Immutable world configuration, validated once at startup.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub chunk_width: usize,
    pub chunk_height: usize,
    pub chunk_depth: usize,
    /// Half-width, in chunks, of the streaming window around the nearest chunk.
    pub render_distance: i32,
    /// Side length, in chunks, of the square spawn area at the origin.
    pub spawn_area: i32,
    /// Divisor applied to world coordinates before noise sampling.
    pub noise_frequency: f64,
    pub seed: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            chunk_width: 16,
            chunk_height: 16,
            chunk_depth: 16,
            render_distance: 3,
            spawn_area: 3,
            noise_frequency: 10.0,
            seed: 42,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_width == 0 || self.chunk_height == 0 || self.chunk_depth == 0 {
            return Err(format!(
                "chunk dimensions must be positive, got {}x{}x{}",
                self.chunk_width, self.chunk_height, self.chunk_depth
            ));
        }
        if self.spawn_area <= 0 {
            return Err(format!("spawn area must be positive, got {}", self.spawn_area));
        }
        if self.render_distance < 0 {
            return Err(format!(
                "render distance must not be negative, got {}",
                self.render_distance
            ));
        }
        if self.noise_frequency <= 0.0 {
            return Err(format!(
                "noise frequency must be positive, got {}",
                self.noise_frequency
            ));
        }
        Ok(())
    }

    pub fn dims(&self) -> ChunkDims {
        ChunkDims {
            width: self.chunk_width,
            height: self.chunk_height,
            depth: self.chunk_depth,
        }
    }
}

/// Marker component for spawned terrain chunk entities.
#[derive(Component)]
pub struct TerrainChunk;

/// Shared material handle applied to every chunk mesh.
#[derive(Resource)]
pub struct TerrainMaterial(pub Handle<StandardMaterial>);

/// Owns every live chunk, keyed by grid coordinate, plus a creation-order
/// scan list so per-tick iteration stays deterministic. Chunks are created
/// on demand around the viewer and never unloaded.
#[derive(Resource)]
pub struct ChunkGrid {
    config: GridConfig,
    dims: ChunkDims,
    field: Box<dyn HeightField>,
    chunks: HashMap<ChunkCoord, VoxelChunk>,
    scan_order: Vec<ChunkCoord>,
    entities: HashMap<ChunkCoord, Entity>,
    /// Chunk closest to the viewer, recomputed every tick.
    pub nearest: Option<ChunkCoord>,
}

impl ChunkGrid {
    pub fn new(config: GridConfig) -> Result<Self, String> {
        let field = NoiseHeightField::new(config.seed, config.noise_frequency);
        Self::with_field(config, Box::new(field))
    }

    /// Construct with an explicit height field (tests use fixed fields).
    pub fn with_field(config: GridConfig, field: Box<dyn HeightField>) -> Result<Self, String> {
        config.validate()?;
        let dims = config.dims();
        Ok(Self {
            config,
            dims,
            field,
            chunks: HashMap::new(),
            scan_order: Vec::new(),
            entities: HashMap::new(),
            nearest: None,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn height_field(&self) -> &dyn HeightField {
        self.field.as_ref()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&VoxelChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// All chunk coordinates in creation order.
    pub fn coords(&self) -> &[ChunkCoord] {
        &self.scan_order
    }

    pub fn entity(&self, coord: ChunkCoord) -> Option<Entity> {
        self.entities.get(&coord).copied()
    }

    pub fn set_entity(&mut self, coord: ChunkCoord, entity: Entity) {
        self.entities.insert(coord, entity);
    }

    /// Create the square spawn block of chunks at the origin.
    pub fn initialize(&mut self) {
        for x in 0..self.config.spawn_area {
            for z in 0..self.config.spawn_area {
                self.create_chunk(ChunkCoord::new(x, z));
            }
        }
        info!(
            "spawn area ready: {} chunks of {}x{}x{}",
            self.chunks.len(),
            self.dims.width,
            self.dims.height,
            self.dims.depth
        );
    }

    /// Create one chunk: generate its voxel data and first mesh, then make
    /// it visible to the rest of the grid and link adjacency. Generation
    /// completes before linking, so neighbors marked dirty here can already
    /// read this chunk's cells during their own rebuild.
    fn create_chunk(&mut self, coord: ChunkCoord) {
        debug_assert!(
            !self.chunks.contains_key(&coord),
            "chunk ({}, {}) already exists",
            coord.x,
            coord.z
        );

        let mut chunk = VoxelChunk::new(coord, self.dims);
        chunk.generate_voxels(self.field.as_ref());
        chunk.mesh = build_chunk_mesh(&chunk, &NeighborData::none());

        self.chunks.insert(coord, chunk);
        self.scan_order.push(coord);
        self.link_neighbors(coord);
    }

    /// Link the new chunk to every existing chunk within one cell of it,
    /// 8-connected. Both slots are written so adjacency stays symmetric,
    /// and both sides are marked dirty: their boundary faces can now be
    /// culled against real neighbor data.
    fn link_neighbors(&mut self, coord: ChunkCoord) {
        for dir in Direction::ALL {
            let other = coord.step(dir);
            if !self.chunks.contains_key(&other) {
                continue;
            }
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.set_neighbor(dir, other);
                chunk.dirty = true;
            }
            if let Some(neighbor) = self.chunks.get_mut(&other) {
                neighbor.set_neighbor(dir.opposite(), coord);
                neighbor.dirty = true;
            }
        }
        if let Some(chunk) = self.chunks.get(&coord) {
            debug!(
                "chunk ({}, {}) linked {} neighbors",
                coord.x,
                coord.z,
                chunk.neighbor_count()
            );
        }
    }

    /// Recompute the chunk nearest to the viewer by linear scan in creation
    /// order, minimizing distance to the chunk's world origin. Ties keep
    /// the first minimal value found.
    pub fn update_nearest(&mut self, viewer: Vec3) {
        let mut best: Option<(ChunkCoord, f32)> = None;
        for &coord in &self.scan_order {
            let dist = viewer.distance(coord.world_origin(self.dims));
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((coord, dist));
            }
        }
        self.nearest = best.map(|(coord, _)| coord);
    }

    /// Create every missing chunk in the streaming window around the
    /// nearest chunk. Returns how many chunks were created.
    pub fn stream_around_nearest(&mut self) -> usize {
        let Some(center) = self.nearest else {
            return 0;
        };
        let rd = self.config.render_distance;
        let mut created = 0;
        for x in (center.x - rd)..(center.x + rd) {
            for z in (center.z - rd)..(center.z + rd) {
                let coord = ChunkCoord::new(x, z);
                if !self.chunks.contains_key(&coord) {
                    self.create_chunk(coord);
                    created += 1;
                }
            }
        }
        created
    }

    /// Remove the voxel at an in-range local coordinate of a chunk. No-op
    /// with a diagnostic if the cell is already empty.
    pub fn remove_voxel(&mut self, coord: ChunkCoord, at: IVec3) {
        let Some(chunk) = self.chunks.get(&coord) else {
            warn!("remove targets unknown chunk ({}, {})", coord.x, coord.z);
            return;
        };
        debug_assert!(chunk.in_bounds(at), "remove target out of range: {at}");
        if !chunk.is_solid(at) {
            info!("no voxel at {} in chunk ({}, {})", at, coord.x, coord.z);
            return;
        }

        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.set_voxel(at.x as usize, at.y as usize, at.z as usize, Voxel::Empty);
            chunk.dirty = true;
        }
        self.mark_edge_neighbors(coord, at);
        info!("removed voxel at {} in chunk ({}, {})", at, coord.x, coord.z);
    }

    /// Place a voxel at a local coordinate of a chunk. A coordinate one
    /// step outside the chunk on x/z is redirected to the matching
    /// adjacency slot with the coordinate wrapped to the opposite edge; if
    /// that slot is unlinked the edit is dropped. No-op with a diagnostic
    /// if the destination cell is already solid.
    pub fn add_voxel(&mut self, coord: ChunkCoord, at: IVec3) {
        let Some(chunk) = self.chunks.get(&coord) else {
            warn!("add targets unknown chunk ({}, {})", coord.x, coord.z);
            return;
        };
        let (w, h, d) = (
            self.dims.width as i32,
            self.dims.height as i32,
            self.dims.depth as i32,
        );

        let dx = if at.x == -1 {
            -1
        } else if at.x == w {
            1
        } else {
            0
        };
        let dz = if at.z == -1 {
            -1
        } else if at.z == d {
            1
        } else {
            0
        };

        let (target, local) = if dx == 0 && dz == 0 {
            (coord, at)
        } else {
            let Some(dir) = Direction::from_delta(dx, dz) else {
                return;
            };
            match chunk.neighbor(dir) {
                Some(neighbor) => {
                    let x = if dx == -1 { w - 1 } else if dx == 1 { 0 } else { at.x };
                    let z = if dz == -1 { d - 1 } else if dz == 1 { 0 } else { at.z };
                    (neighbor, IVec3::new(x, at.y, z))
                }
                None => {
                    warn!(
                        "target chunk not yet generated: {:?} of ({}, {})",
                        dir, coord.x, coord.z
                    );
                    return;
                }
            }
        };

        // y is never redirected; placing on top of a max-height column
        // reaches outside the world and is dropped.
        if local.y < 0 || local.y >= h {
            warn!("cannot place voxel outside the world column at {local}");
            return;
        }

        let Some(chunk) = self.chunks.get_mut(&target) else {
            return;
        };
        if chunk.is_solid(local) {
            info!("voxel already at {} in chunk ({}, {})", local, target.x, target.z);
            return;
        }
        chunk.set_voxel(
            local.x as usize,
            local.y as usize,
            local.z as usize,
            Voxel::Solid,
        );
        chunk.dirty = true;
        self.mark_edge_neighbors(target, local);
        info!("added voxel at {} in chunk ({}, {})", local, target.x, target.z);
    }

    /// After an edit on an edge cell, mark the 1-2 face-adjacent linked
    /// neighbors dirty; their boundary faces depend on this cell.
    fn mark_edge_neighbors(&mut self, coord: ChunkCoord, at: IVec3) {
        let marks: Vec<ChunkCoord> = match self.chunks.get(&coord) {
            Some(chunk) => chunk
                .edge_directions(at)
                .iter()
                .flatten()
                .filter_map(|&dir| chunk.neighbor(dir))
                .collect(),
            None => return,
        };
        for mark in marks {
            if let Some(neighbor) = self.chunks.get_mut(&mark) {
                neighbor.dirty = true;
            }
        }
    }

    /// Rebuild the mesh of every dirty chunk, each at most once, in
    /// creation order. The dirty flag is cleared before the buffer is
    /// read, so an edit landing mid-rebuild leaves the chunk marked for
    /// the next pass. Returns the rebuilt coordinates.
    pub fn rebuild_dirty(&mut self) -> Vec<ChunkCoord> {
        let dirty: Vec<ChunkCoord> = self
            .scan_order
            .iter()
            .copied()
            .filter(|coord| self.chunks.get(coord).is_some_and(|chunk| chunk.dirty))
            .collect();

        for &coord in &dirty {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.dirty = false;
            }
            let mesh = match self.chunks.get(&coord) {
                Some(chunk) => build_chunk_mesh(chunk, &self.face_neighbors(chunk)),
                None => continue,
            };
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                debug!(
                    "updating chunk ({}, {}): {} quads",
                    coord.x,
                    coord.z,
                    mesh.quad_count()
                );
                chunk.mesh = mesh;
            }
        }
        dirty
    }

    /// Resolve the 4 face-adjacent neighbor slots of a chunk through the
    /// owning map.
    fn face_neighbors(&self, chunk: &VoxelChunk) -> NeighborData<'_> {
        NeighborData {
            west: self.resolve(chunk, Direction::West),
            east: self.resolve(chunk, Direction::East),
            north: self.resolve(chunk, Direction::North),
            south: self.resolve(chunk, Direction::South),
        }
    }

    fn resolve(&self, chunk: &VoxelChunk, dir: Direction) -> Option<&VoxelChunk> {
        chunk.neighbor(dir).and_then(|coord| self.chunks.get(&coord))
    }
}

/// Startup: build the spawn area before the first frame.
pub fn setup_spawn_area(mut grid: ResMut<ChunkGrid>) {
    grid.initialize();
}

/// Per-tick viewer tracking: find the nearest chunk and create any missing
/// chunks in the streaming window around it.
pub fn track_viewer_chunks(
    mut grid: ResMut<ChunkGrid>,
    camera_query: Query<&Transform, With<CameraController>>,
) {
    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };

    grid.update_nearest(camera_transform.translation);
    let created = grid.stream_around_nearest();
    if created > 0 {
        let nearest = grid.nearest.unwrap_or(ChunkCoord::new(0, 0));
        info!(
            "streamed {} chunks around ({}, {}), {} total",
            created,
            nearest.x,
            nearest.z,
            grid.chunk_count()
        );
    }
}

/// Per-tick mesh upload: run the dirty rebuild pass, then push changed
/// buffers into the render world. Runs in PostUpdate so it observes every
/// edit made during the frame. Chunks whose buffer is empty carry no mesh
/// components at all (the render backend rejects empty vertex buffers).
pub fn upload_chunk_meshes(
    mut commands: Commands,
    mut grid: ResMut<ChunkGrid>,
    mut meshes: ResMut<Assets<Mesh>>,
    material: Res<TerrainMaterial>,
    mesh_query: Query<&Mesh3d>,
) {
    let rebuilt = grid.rebuild_dirty();

    // Newly created chunks have a fresh mesh but no entity yet.
    let mut targets: Vec<ChunkCoord> = grid
        .coords()
        .iter()
        .copied()
        .filter(|&coord| grid.entity(coord).is_none())
        .collect();
    for coord in rebuilt {
        if !targets.contains(&coord) {
            targets.push(coord);
        }
    }

    for coord in targets {
        let (origin, render_mesh) = {
            let Some(chunk) = grid.chunk(coord) else {
                continue;
            };
            let render_mesh = if chunk.mesh.is_empty() {
                None
            } else {
                Some(chunk.mesh.to_render_mesh())
            };
            (chunk.world_origin(), render_mesh)
        };

        match grid.entity(coord) {
            Some(entity) => match render_mesh {
                Some(new_mesh) => {
                    if let Ok(mesh3d) = mesh_query.get(entity) {
                        if let Some(asset) = meshes.get_mut(&mesh3d.0) {
                            *asset = new_mesh;
                        }
                        // Force the bounding volume to be recomputed.
                        commands.entity(entity).remove::<Aabb>();
                    } else {
                        let handle = meshes.add(new_mesh);
                        commands
                            .entity(entity)
                            .insert((Mesh3d(handle), MeshMaterial3d(material.0.clone())));
                    }
                }
                None => {
                    commands
                        .entity(entity)
                        .remove::<(Mesh3d, MeshMaterial3d<StandardMaterial>, Aabb)>();
                }
            },
            None => {
                let mut entity = commands.spawn((
                    Transform::from_translation(origin),
                    Visibility::default(),
                    TerrainChunk,
                ));
                if let Some(new_mesh) = render_mesh {
                    let handle = meshes.add(new_mesh);
                    entity.insert((Mesh3d(handle), MeshMaterial3d(material.0.clone())));
                }
                let id = entity.id();
                grid.set_entity(coord, id);
            }
        }
    }
}
