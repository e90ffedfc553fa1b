use bevy::prelude::*;

/// Marker for the chunk corner line entities spawned while the chunk
/// frame overlay is enabled.
#[derive(Component)]
pub struct ChunkFrame;
