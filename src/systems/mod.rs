mod camera;
mod frames;
mod interaction;

pub use camera::{camera_look_controls, camera_movement_controls, setup_cursor_grab};
pub use frames::{toggle_chunk_frames, update_chunk_frames, ChunkFrameState};
pub use interaction::{raycast_terrain, terrain_interaction, TerrainHit};
