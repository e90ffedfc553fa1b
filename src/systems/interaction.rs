use bevy::prelude::*;

use crate::components::CameraController;
use crate::world::{ChunkCoord, ChunkGrid};

/// Step size for the terrain ray march.
const RAY_STEP: f32 = 0.05;
/// Maximum edit reach from the camera, in world units.
const REACH: f32 = 8.0;

/// Result of a terrain raycast.
#[derive(Debug, Clone, Copy)]
pub struct TerrainHit {
    /// Chunk containing the hit voxel.
    pub chunk: ChunkCoord,
    /// World coordinates of the hit voxel.
    pub voxel: IVec3,
    /// Outward normal of the hit face, one of the 6 axis-aligned units.
    pub normal: IVec3,
    /// Hit point projected onto the face plane, as the face-targeting
    /// helpers expect.
    pub point: Vec3,
}

/// March a ray through the chunk grids until it enters a solid voxel.
/// The hit face is the nearest face plane to the sample position inside
/// the voxel.
pub fn raycast_terrain(
    grid: &ChunkGrid,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<TerrainHit> {
    let dims = grid.dims();
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    let mut current = origin;
    let steps = (max_distance / RAY_STEP) as i32;

    for _ in 0..steps {
        current += direction * RAY_STEP;

        if current.y < 0.0 || current.y >= dims.height as f32 {
            continue;
        }

        let block = IVec3::new(
            current.x.floor() as i32,
            current.y.floor() as i32,
            current.z.floor() as i32,
        );
        let coord = ChunkCoord::from_world_pos(current, dims);
        let Some(chunk) = grid.chunk(coord) else {
            continue;
        };

        let chunk_origin = chunk.world_origin();
        let local = IVec3::new(
            block.x - chunk_origin.x as i32,
            block.y,
            block.z - chunk_origin.z as i32,
        );
        if !chunk.in_bounds(local) {
            continue;
        }

        if chunk.is_solid(local) {
            let frac = current - block.as_vec3();
            let normal = nearest_face_normal(frac);
            let point = snap_to_face(current, block, normal);
            return Some(TerrainHit {
                chunk: coord,
                voxel: block,
                normal,
                point,
            });
        }
    }

    None
}

/// Face of the unit cube closest to a point inside it, as an outward
/// normal.
fn nearest_face_normal(frac: Vec3) -> IVec3 {
    let faces = [
        (IVec3::NEG_X, frac.x),
        (IVec3::X, 1.0 - frac.x),
        (IVec3::NEG_Y, frac.y),
        (IVec3::Y, 1.0 - frac.y),
        (IVec3::NEG_Z, frac.z),
        (IVec3::Z, 1.0 - frac.z),
    ];

    let mut normal = IVec3::ZERO;
    let mut min_dist = f32::MAX;
    for (candidate, dist) in faces {
        if dist < min_dist {
            min_dist = dist;
            normal = candidate;
        }
    }
    normal
}

/// Project a sample position onto the plane of the hit face. Positive
/// normals face the voxel's far plane (coordinate + 1), negative normals
/// its near plane.
fn snap_to_face(current: Vec3, block: IVec3, normal: IVec3) -> Vec3 {
    let mut point = current;
    if normal.x != 0 {
        point.x = (block.x + normal.x.max(0)) as f32;
    }
    if normal.y != 0 {
        point.y = (block.y + normal.y.max(0)) as f32;
    }
    if normal.z != 0 {
        point.z = (block.z + normal.z.max(0)) as f32;
    }
    point
}

/// Left click removes the voxel behind the hit face; right click places a
/// voxel on its outward side.
pub fn terrain_interaction(
    mouse_button: Res<ButtonInput<MouseButton>>,
    camera_query: Query<&Transform, With<CameraController>>,
    mut grid: ResMut<ChunkGrid>,
) {
    let remove = mouse_button.just_pressed(MouseButton::Left);
    let add = mouse_button.just_pressed(MouseButton::Right);
    if !remove && !add {
        return;
    }

    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };

    let origin = camera_transform.translation;
    let forward = *camera_transform.forward();
    let Some(hit) = raycast_terrain(&grid, origin, forward, REACH) else {
        return;
    };
    debug!("hit voxel {} through face {}", hit.voxel, hit.normal);
    let Some(chunk) = grid.chunk(hit.chunk) else {
        return;
    };

    if remove {
        let target = chunk.remove_target(hit.point, hit.normal);
        grid.remove_voxel(hit.chunk, target);
    } else {
        let target = chunk.add_target(hit.point, hit.normal);
        grid.add_voxel(hit.chunk, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ConstantField, GridConfig};

    fn flat_grid() -> ChunkGrid {
        let config = GridConfig {
            chunk_width: 4,
            chunk_height: 4,
            chunk_depth: 4,
            spawn_area: 1,
            ..GridConfig::default()
        };
        let mut grid = ChunkGrid::with_field(config, Box::new(ConstantField(0.5))).unwrap();
        grid.initialize();
        grid
    }

    #[test]
    fn test_ray_down_hits_surface_top_face() {
        let grid = flat_grid();
        // Terrain is solid at y = 0,1; the surface plane is y = 2.
        let hit = raycast_terrain(&grid, Vec3::new(1.5, 3.5, 1.5), Vec3::NEG_Y, 8.0)
            .expect("ray should hit the surface");

        assert_eq!(hit.chunk, ChunkCoord::new(0, 0));
        assert_eq!(hit.voxel, IVec3::new(1, 1, 1));
        assert_eq!(hit.normal, IVec3::Y);
        assert_eq!(hit.point.y, 2.0);

        let chunk = grid.chunk(hit.chunk).unwrap();
        assert_eq!(chunk.remove_target(hit.point, hit.normal), IVec3::new(1, 1, 1));
        assert_eq!(chunk.add_target(hit.point, hit.normal), IVec3::new(1, 2, 1));
    }

    #[test]
    fn test_horizontal_ray_hits_side_face() {
        let grid = flat_grid();
        // Approach the chunk's west wall from outside.
        let hit = raycast_terrain(&grid, Vec3::new(-1.0, 1.5, 1.5), Vec3::X, 8.0)
            .expect("ray should hit the west wall");

        assert_eq!(hit.voxel, IVec3::new(0, 1, 1));
        assert_eq!(hit.normal, IVec3::NEG_X);
        assert_eq!(hit.point.x, 0.0);

        let chunk = grid.chunk(hit.chunk).unwrap();
        assert_eq!(chunk.remove_target(hit.point, hit.normal), IVec3::new(0, 1, 1));
        // Placing against the west wall reaches out of the chunk.
        assert_eq!(chunk.add_target(hit.point, hit.normal), IVec3::new(-1, 1, 1));
    }

    #[test]
    fn test_ray_away_from_terrain_misses() {
        let grid = flat_grid();
        assert!(raycast_terrain(&grid, Vec3::new(1.5, 3.0, 1.5), Vec3::Y, 8.0).is_none());
    }

    #[test]
    fn test_ray_beyond_reach_misses() {
        let grid = flat_grid();
        assert!(raycast_terrain(&grid, Vec3::new(1.5, 20.0, 1.5), Vec3::NEG_Y, 8.0).is_none());
    }

    #[test]
    fn test_nearest_face_normal_prefers_closest_plane() {
        assert_eq!(nearest_face_normal(Vec3::new(0.5, 0.95, 0.5)), IVec3::Y);
        assert_eq!(nearest_face_normal(Vec3::new(0.02, 0.5, 0.5)), IVec3::NEG_X);
        assert_eq!(nearest_face_normal(Vec3::new(0.5, 0.5, 0.97)), IVec3::Z);
    }
}
