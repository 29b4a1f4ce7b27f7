//! Terrain configuration.

use octoterra_core::constants::MAX_DEPTH;
use octoterra_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::WorldSeed;

/// Height noise configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Number of ridged fractal octaves.
    pub octaves: usize,
    /// Base frequency of the fractal.
    pub frequency: f64,
    /// Factor applied to voxel column coordinates before sampling.
    pub sample_scale: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 3,
            frequency: 1.0,
            sample_scale: 0.005,
        }
    }
}

/// Terrain generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Octree depth. The world is `8 * 2^depth` voxels per axis.
    pub depth: u32,
    /// Seed for noise generation.
    pub seed: WorldSeed,
    /// Slots reserved up front in each pool. Pools grow past this on demand.
    pub initial_pool_capacity: u32,
    /// Height noise parameters.
    pub noise: NoiseConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            seed: 41_233_125,
            initial_pool_capacity: 128 * 1024,
            noise: NoiseConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// Set the octree depth.
    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Set the noise seed.
    #[must_use]
    pub fn with_seed(mut self, seed: WorldSeed) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of slots each pool starts with.
    #[must_use]
    pub fn with_initial_pool_capacity(mut self, slots: u32) -> Self {
        self.initial_pool_capacity = slots;
        self
    }

    /// Reject configurations generation cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.depth < 1 {
            return Err(Error::InvalidConfig("minimum SVO depth is 1".to_string()));
        }
        if self.depth > MAX_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "SVO depth {} exceeds the maximum of {MAX_DEPTH}",
                self.depth
            )));
        }
        Ok(())
    }
}
