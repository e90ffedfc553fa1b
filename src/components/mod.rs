mod camera;
mod debug;

pub use camera::CameraController;
pub use debug::ChunkFrame;
