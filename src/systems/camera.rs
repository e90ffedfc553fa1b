use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::components::CameraController;

pub fn setup_cursor_grab(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = windows.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

/// Free-fly movement: WASD on the horizontal plane, Space/Shift for
/// vertical, left Ctrl to sprint.
pub fn camera_movement_controls(
    mut query: Query<(&mut Transform, &CameraController)>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (mut transform, controller) in query.iter_mut() {
        let mut speed = controller.move_speed;
        if keyboard_input.pressed(KeyCode::ControlLeft) {
            speed *= controller.sprint_multiplier;
        }

        let forward =
            Vec3::new(transform.forward().x, 0.0, transform.forward().z).normalize_or_zero();
        let right = Vec3::new(transform.right().x, 0.0, transform.right().z).normalize_or_zero();

        let mut velocity = Vec3::ZERO;
        if keyboard_input.pressed(KeyCode::KeyW) {
            velocity += forward;
        }
        if keyboard_input.pressed(KeyCode::KeyS) {
            velocity -= forward;
        }
        if keyboard_input.pressed(KeyCode::KeyA) {
            velocity -= right;
        }
        if keyboard_input.pressed(KeyCode::KeyD) {
            velocity += right;
        }
        if velocity.length() > 0.0 {
            velocity = velocity.normalize();
        }

        if keyboard_input.pressed(KeyCode::Space) {
            velocity += Vec3::Y;
        }
        if keyboard_input.pressed(KeyCode::ShiftLeft) {
            velocity -= Vec3::Y;
        }

        transform.translation += velocity * speed * dt;
    }
}

/// FPS-style mouse look; pitch is clamped so the camera never flips.
pub fn camera_look_controls(
    mut query: Query<(&mut Transform, &mut CameraController)>,
    mut mouse_motion_events: EventReader<MouseMotion>,
) {
    for (mut transform, mut controller) in query.iter_mut() {
        for event in mouse_motion_events.read() {
            controller.yaw -= event.delta.x * controller.look_sensitivity;
            controller.pitch -= event.delta.y * controller.look_sensitivity;
            controller.pitch = controller.pitch.clamp(
                -std::f32::consts::FRAC_PI_2 + 0.01,
                std::f32::consts::FRAC_PI_2 - 0.01,
            );
        }

        transform.rotation = Quat::from_euler(EulerRot::YXZ, controller.yaw, controller.pitch, 0.0);
    }
}
