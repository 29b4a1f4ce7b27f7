//! Heightmap-driven sparse voxel octree terrain for the Octoterra engine.
//!
//! Generation runs in two passes. [`HeightPyramid::build`] samples a [`HeightSource`] once
//! per voxel column and aggregates min/max bounds level by level up to the root. The
//! [`SvoGenerator`] then walks the tree top down, collapsing uniform cells into tag words
//! and allocating nodes and chunks only where the surface passes through.

pub mod config;
pub mod fill;
pub mod generation;
pub mod heightmap;
pub mod svo;
pub mod terrain;
pub mod upload;

pub use config::{NoiseConfig, TerrainConfig};
pub use fill::{ChunkFill, EmptyFill, SurfaceFill};
pub use generation::{ConstantHeight, HeightSource, NoiseHeight};
pub use heightmap::{HeightApprox, HeightLevel, HeightPyramid, Heightmap};
pub use svo::{classify, CellKind, GenerationStats, SvoGenerator};
pub use terrain::Terrain;
pub use upload::{PoolKind, PoolUploader, UploadTarget};

/// World seed for procedural generation.
pub type WorldSeed = u64;
