use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use crate::components::{CameraController, ChunkFrame};
use crate::world::{ChunkCoord, ChunkDims, ChunkGrid};

/// Show frame markers within this many chunks of the viewer.
const FRAME_RANGE: i32 = 2;
/// Corner lines run from the ground to this height.
const FRAME_HEIGHT: f32 = 50.0;

#[derive(Resource, Default)]
pub struct ChunkFrameState {
    pub enabled: bool,
}

pub fn toggle_chunk_frames(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<ChunkFrameState>,
) {
    if keyboard_input.just_pressed(KeyCode::F3) {
        state.enabled = !state.enabled;
        info!(
            "chunk frames {}",
            if state.enabled { "on" } else { "off" }
        );
    }
}

/// Red vertical lines at the corners of generated chunks near the viewer.
/// The markers are respawned each frame while enabled.
pub fn update_chunk_frames(
    mut commands: Commands,
    state: Res<ChunkFrameState>,
    grid: Res<ChunkGrid>,
    camera_query: Query<&Transform, With<CameraController>>,
    existing_frames: Query<Entity, With<ChunkFrame>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for entity in existing_frames.iter() {
        commands.entity(entity).despawn();
    }
    if !state.enabled {
        return;
    }

    let Ok(camera_transform) = camera_query.get_single() else {
        return;
    };

    let dims = grid.dims();
    let center = ChunkCoord::from_world_pos(camera_transform.translation, dims);

    let red_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 0.0, 0.0, 0.8),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let corner_mesh_handle = meshes.add(corner_mesh(dims));

    for dx in -FRAME_RANGE..=FRAME_RANGE {
        for dz in -FRAME_RANGE..=FRAME_RANGE {
            let coord = ChunkCoord::new(center.x + dx, center.z + dz);
            if grid.chunk(coord).is_none() {
                continue;
            }
            commands.spawn((
                Mesh3d(corner_mesh_handle.clone()),
                MeshMaterial3d(red_material.clone()),
                Transform::from_translation(coord.world_origin(dims)),
                ChunkFrame,
            ));
        }
    }
}

/// 4 vertical lines at the chunk's corners, as a line-list mesh.
fn corner_mesh(dims: ChunkDims) -> Mesh {
    let width = dims.width as f32;
    let depth = dims.depth as f32;

    let positions = vec![
        [0.0, 0.0, 0.0],
        [0.0, FRAME_HEIGHT, 0.0],
        [width, 0.0, 0.0],
        [width, FRAME_HEIGHT, 0.0],
        [width, 0.0, depth],
        [width, FRAME_HEIGHT, depth],
        [0.0, 0.0, depth],
        [0.0, FRAME_HEIGHT, depth],
    ];
    let indices: Vec<u32> = vec![0, 1, 2, 3, 4, 5, 6, 7];
    let normals = vec![[0.0, 1.0, 0.0]; 8];

    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_indices(Indices::U32(indices))
}
