//! Core types and addressing for the Octoterra voxel terrain.
//!
//! This crate provides the foundational types shared by storage and generation:
//! - Material values used by chunk voxels and node tags
//! - Packed 8-bit tag + 24-bit address node words and typed pool ids
//! - Common error types

pub mod address;
pub mod error;
pub mod types;

pub use address::{ChunkId, NodeId, TaggedAddress};
pub use error::{Error, Result};
pub use types::Material;

/// Terrain-wide constants
pub mod constants {
    /// Size of a chunk in voxels per axis
    pub const CHUNK_WIDTH: u32 = 8;
    /// Total voxels in a chunk (8^3)
    pub const CHUNK_VOXELS: usize = (CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_WIDTH) as usize;
    /// Branching factor per axis between two tree levels
    pub const NODE_WIDTH: u32 = 2;
    /// Words in a node record (4x4x4)
    pub const NODE_CHILDREN: usize = 64;
    /// Bits available for a child address in a node word
    pub const ADDRESS_BITS: u32 = 24;
    /// Mask selecting the child address of a node word
    pub const ADDRESS_MASK: u32 = (1 << ADDRESS_BITS) - 1;
    /// Deepest tree whose world width still fits in a `u32` voxel coordinate
    pub const MAX_DEPTH: u32 = 28;
}
