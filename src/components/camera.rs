use bevy::prelude::*;

/// First-person fly camera. Its translation is the viewer position the
/// chunk grid tracks every tick.
#[derive(Component)]
pub struct CameraController {
    pub yaw: f32,   // Horizontal rotation (left/right)
    pub pitch: f32, // Vertical rotation (up/down)
    pub move_speed: f32,
    pub sprint_multiplier: f32,
    pub look_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 8.0,
            sprint_multiplier: 2.5,
            look_sensitivity: 0.003,
        }
    }
}
