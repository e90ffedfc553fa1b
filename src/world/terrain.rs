use noise::{NoiseFn, Perlin};

/// 2D height field driving terrain generation. Implementations must be
/// deterministic and continuous in world space: two chunks sampling the
/// same world column always see the same value, which is what keeps
/// terrain seamless across chunk boundaries.
pub trait HeightField: Send + Sync {
    /// Normalized height in [0, 1] at a world-space column.
    fn sample(&self, world_x: f64, world_z: f64) -> f64;

    /// Number of solid cells in a column of a chunk `max_height` cells
    /// tall: `noise * max_height`, floored and capped.
    fn column_height(&self, world_x: f64, world_z: f64, max_height: usize) -> usize {
        let scaled = self.sample(world_x, world_z) * max_height as f64;
        (scaled.min(max_height as f64)) as usize
    }
}

/// Perlin-noise height field. Sample coordinates are divided by a fixed
/// frequency constant (10 in the default configuration); Perlin output in
/// [-1, 1] is remapped to the unit interval.
pub struct NoiseHeightField {
    perlin: Perlin,
    frequency: f64,
}

impl NoiseHeightField {
    pub fn new(seed: u32, frequency: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            frequency,
        }
    }
}

impl HeightField for NoiseHeightField {
    fn sample(&self, world_x: f64, world_z: f64) -> f64 {
        let value = self
            .perlin
            .get([world_x / self.frequency, world_z / self.frequency]);
        (value * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Camera Y for spawning above the terrain surface at a world column:
/// top of the surface cell plus standing clearance and eye height.
pub fn spawn_height(field: &dyn HeightField, world_x: f64, world_z: f64, max_height: usize) -> f32 {
    let surface = field.column_height(world_x, world_z, max_height);
    surface as f32 + 1.5 + 1.6
}

/// Fixed-value field for deterministic test scenarios.
#[cfg(test)]
pub struct ConstantField(pub f64);

#[cfg(test)]
impl HeightField for ConstantField {
    fn sample(&self, _world_x: f64, _world_z: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_height_scales_and_floors() {
        assert_eq!(ConstantField(0.5).column_height(0.0, 0.0, 4), 2);
        assert_eq!(ConstantField(0.0).column_height(0.0, 0.0, 4), 0);
        assert_eq!(ConstantField(1.0).column_height(0.0, 0.0, 4), 4);
        // 0.9 * 4 = 3.6 floors to 3.
        assert_eq!(ConstantField(0.9).column_height(0.0, 0.0, 4), 3);
    }

    #[test]
    fn test_noise_field_stays_in_unit_interval() {
        let field = NoiseHeightField::new(42, 10.0);
        for i in -50..50 {
            for j in -50..50 {
                let value = field.sample(i as f64 * 1.7, j as f64 * 2.3);
                assert!((0.0..=1.0).contains(&value), "sample out of range: {value}");
            }
        }
    }

    #[test]
    fn test_noise_field_is_deterministic() {
        let a = NoiseHeightField::new(42, 10.0);
        let b = NoiseHeightField::new(42, 10.0);
        for i in 0..100 {
            let (x, z) = (i as f64 * 3.1, i as f64 * -1.3);
            assert_eq!(a.sample(x, z), b.sample(x, z));
        }
    }

    #[test]
    fn test_spawn_height_clears_surface() {
        let field = ConstantField(0.5);
        // Surface cell tops out at y = 2; the camera must spawn above it.
        assert!(spawn_height(&field, 0.0, 0.0, 4) > 2.0);
    }
}
