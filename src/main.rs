mod components;
mod systems;
mod world;

use bevy::prelude::*;

use components::CameraController;
use systems::{
    camera_look_controls, camera_movement_controls, setup_cursor_grab, terrain_interaction,
    toggle_chunk_frames, update_chunk_frames, ChunkFrameState,
};
use world::{
    setup_spawn_area, spawn_height, track_viewer_chunks, upload_chunk_meshes, ChunkGrid,
    GridConfig, TerrainMaterial,
};

fn main() {
    let config = GridConfig::default();
    let grid = ChunkGrid::new(config).expect("invalid chunk grid configuration");

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "VoxelMap".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(grid)
        .init_resource::<ChunkFrameState>()
        .add_systems(
            Startup,
            (setup_spawn_area, setup_scene, setup_cursor_grab).chain(),
        )
        .add_systems(
            Update,
            (
                camera_movement_controls,
                camera_look_controls,
                track_viewer_chunks,
                terrain_interaction,
                toggle_chunk_frames,
                update_chunk_frames,
            ),
        )
        // The rebuild pass runs after every edit made during the frame.
        .add_systems(PostUpdate, upload_chunk_meshes)
        .run();
}

fn setup_scene(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    grid: Res<ChunkGrid>,
) {
    // Shared material applied to every chunk mesh.
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.65, 0.35),
        perceptual_roughness: 0.9,
        ..default()
    });
    commands.insert_resource(TerrainMaterial(material));

    commands.spawn((
        DirectionalLight {
            illuminance: 12000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(50.0, 80.0, 30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.95, 1.0),
        brightness: 300.0,
    });
    commands.insert_resource(ClearColor(Color::srgb(0.5, 0.7, 0.95)));

    // Spawn the camera above the terrain at the center of the spawn area.
    let dims = grid.dims();
    let spawn_x = grid.config().spawn_area as f32 * dims.width as f32 / 2.0;
    let spawn_z = grid.config().spawn_area as f32 * dims.depth as f32 / 2.0;
    let spawn_y = spawn_height(
        grid.height_field(),
        spawn_x as f64,
        spawn_z as f64,
        dims.height,
    );

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(spawn_x, spawn_y, spawn_z),
        CameraController::default(),
    ));
}
