//! GPU record layouts stored in the node and chunk pools.

use bytemuck::{Pod, Zeroable};
use octoterra_core::constants::{CHUNK_VOXELS, CHUNK_WIDTH, NODE_CHILDREN, NODE_WIDTH};
use octoterra_core::{Material, TaggedAddress};

/// Internal tree record: 64 tagged words laid out 4x4x4.
///
/// The generator only writes the 2x2x2 children addressed by [`Node::child_index`];
/// every other word stays zero, i.e. air.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Node {
    pub children: [TaggedAddress; NODE_CHILDREN],
}

impl Default for Node {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Node {
    /// Word index of child `(dx, dy, dz)`, each component in `0..NODE_WIDTH`.
    #[inline]
    pub const fn child_index(dx: u32, dy: u32, dz: u32) -> usize {
        debug_assert!(dx < NODE_WIDTH && dy < NODE_WIDTH && dz < NODE_WIDTH);
        (dx + dy * NODE_WIDTH + dz * NODE_WIDTH * NODE_WIDTH) as usize
    }

    #[inline]
    pub fn child(&self, dx: u32, dy: u32, dz: u32) -> TaggedAddress {
        self.children[Self::child_index(dx, dy, dz)]
    }

    #[inline]
    pub fn set_child(&mut self, dx: u32, dy: u32, dz: u32, word: TaggedAddress) {
        self.children[Self::child_index(dx, dy, dz)] = word;
    }
}

/// Leaf block of 8x8x8 material bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Chunk {
    pub voxels: [Material; CHUNK_VOXELS],
}

impl Default for Chunk {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Chunk {
    /// Linear index of a local voxel position, x fastest.
    #[inline]
    pub const fn voxel_index(x: u32, y: u32, z: u32) -> usize {
        debug_assert!(x < CHUNK_WIDTH && y < CHUNK_WIDTH && z < CHUNK_WIDTH);
        (x + y * CHUNK_WIDTH + z * CHUNK_WIDTH * CHUNK_WIDTH) as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> Material {
        self.voxels[Self::voxel_index(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, z: u32, material: Material) {
        self.voxels[Self::voxel_index(x, y, z)] = material;
    }

    /// Check if every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|v| v.is_air())
    }
}
