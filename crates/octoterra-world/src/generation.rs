//! Terrain height sources.
//!
//! A height source is the 2D oracle the heightmap pyramid samples once per voxel column.
//! The value it returns is the number of solid voxels in that column: voxel `z` is solid
//! iff `z < height`.

use noise::{MultiFractal, NoiseFn, OpenSimplex, RidgedMulti};

use crate::config::NoiseConfig;
use crate::WorldSeed;

/// Deterministic column height oracle.
pub trait HeightSource {
    /// Solid voxel count of column `(x, y)`.
    fn height(&self, x: u32, y: u32) -> u32;
}

impl<F> HeightSource for F
where
    F: Fn(u32, u32) -> u32,
{
    fn height(&self, x: u32, y: u32) -> u32 {
        self(x, y)
    }
}

/// Flat world at a fixed height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantHeight(pub u32);

impl HeightSource for ConstantHeight {
    fn height(&self, _x: u32, _y: u32) -> u32 {
        self.0
    }
}

/// Ridged fractal terrain spanning the middle half of the world's vertical extent.
pub struct NoiseHeight {
    noise: RidgedMulti<OpenSimplex>,
    sample_scale: f64,
    width: f64,
}

impl NoiseHeight {
    /// Create a height source for a world `width` voxels tall.
    pub fn new(config: &NoiseConfig, seed: WorldSeed, width: u32) -> Self {
        let noise = RidgedMulti::<OpenSimplex>::new(seed as u32)
            .set_octaves(config.octaves)
            .set_frequency(config.frequency);

        Self {
            noise,
            sample_scale: config.sample_scale,
            width: f64::from(width),
        }
    }

    /// Noise at a column remapped from [-1, 1] to [0, 1].
    fn normalized(&self, x: u32, y: u32) -> f64 {
        let sample = self.noise.get([
            f64::from(x) * self.sample_scale,
            f64::from(y) * self.sample_scale,
        ]);
        (sample * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl HeightSource for NoiseHeight {
    fn height(&self, x: u32, y: u32) -> u32 {
        (0.25 * self.width + 0.5 * self.width * self.normalized(x, y)) as u32
    }
}
